//! CLI entry point (§6). Thin argument parsing that wires a `Configuration`
//! into a running Supervisor; owns process exit codes (§6, §7) and nothing
//! else — all other logic lives in `riskd-config`/`riskd-daemon`.
//!
//! Exit codes: 0 success, 1 fatal error, 2 config error, 3 SDK unavailable.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use riskd_config::{Configuration, Credentials};
use riskd_daemon::http::build_router;
use riskd_daemon::state::{spawn_heartbeat, AppState};
use riskd_daemon::supervisor::Supervisor;

const EXIT_FATAL: i32 = 1;
const EXIT_CONFIG: i32 = 2;
const EXIT_SDK_UNAVAILABLE: i32 = 3;

const ENV_DB_PATH: &str = "RISKD_DB_PATH";
const ENV_HTTP_ADDR: &str = "RISKD_HTTP_ADDR";
const DEFAULT_DB_PATH: &str = "./riskd.sqlite";
const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:7420";

/// Run the daemon against a directory of config YAML files.
#[derive(Parser, Debug)]
#[command(name = "run_dev", about = "Run the risk-enforcement daemon")]
struct Cli {
    /// Directory containing risk_config.yaml, timers_config.yaml, accounts.yaml.
    #[arg(long, default_value = "./config")]
    config: PathBuf,

    /// Account id to monitor. Falls back to accounts.yaml's monitored_account.
    #[arg(long)]
    account: Option<String>,

    /// Keep the ambient HTTP surface (§6) running after boot instead of
    /// exiting once the dry-run tour completes.
    #[arg(long)]
    interactive: bool,

    /// Boot against the simulated paper broker and drive a scripted event
    /// tour through the full pipeline. Currently required: no live broker
    /// SDK is built into this binary (see DESIGN.md decision 4).
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:#}");
            EXIT_FATAL
        }
    };
    std::process::exit(code);
}

async fn run() -> Result<i32> {
    let _ = dotenvy::from_filename(".env.local");
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive("riskd=info".parse().unwrap()))
        .init();

    let cli = Cli::parse();

    let (config, config_hash) = match Configuration::load(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("config error: {e:#}");
            return Ok(EXIT_CONFIG);
        }
    };
    tracing::info!(config_hash, "configuration loaded");

    if !cli.dry_run {
        match Credentials::resolve() {
            Ok(_) => eprintln!(
                "SDK unavailable: credentials resolved, but no live broker adapter is built \
                 into this binary; pass --dry-run to run against the simulated broker"
            ),
            Err(e) => eprintln!("SDK unavailable: {e:#}"),
        }
        return Ok(EXIT_SDK_UNAVAILABLE);
    }

    let account_id = cli
        .account
        .clone()
        .or_else(|| config.accounts.monitored_account.as_ref().map(|m| m.account_id.clone()))
        .ok_or_else(|| anyhow!("no account configured: pass --account or set accounts.yaml's monitored_account"))?;

    let root = config
        .general
        .instruments
        .first()
        .cloned()
        .unwrap_or_else(|| "MNQ".to_string());
    let contract_id = format!("CON.F.US.{root}.DRYRUN");

    let db_path = std::env::var(ENV_DB_PATH).unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    let mut supervisor = Supervisor::boot(
        config,
        std::path::Path::new(&db_path),
        riskd_broker_sim::PaperBroker::new(),
    )
    .await
    .context("supervisor boot failed")?;

    let reports = supervisor.run_dry_run(&account_id, &contract_id).await?;
    let dispatched = reports.iter().filter(|r| r.risk_event_dispatched).count();
    let outcomes: usize = reports.iter().map(|r| r.outcomes.len()).sum();
    println!(
        "dry_run_complete account={account_id} events_dispatched={dispatched} \
         enforcement_outcomes={outcomes} active_lockouts={}",
        supervisor.active_lockout_count()
    );

    if cli.interactive {
        serve_until_ctrl_c().await?;
    }

    Ok(0)
}

async fn serve_until_ctrl_c() -> Result<()> {
    let state = Arc::new(AppState::new());
    spawn_heartbeat(state.bus.clone(), std::time::Duration::from_secs(5));

    let addr_str = std::env::var(ENV_HTTP_ADDR).unwrap_or_else(|_| DEFAULT_HTTP_ADDR.to_string());
    let addr: SocketAddr = addr_str.parse().context("invalid RISKD_HTTP_ADDR")?;

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await.context("binding HTTP listener")?;
    tracing::info!(%addr, "serving HTTP surface; press ctrl-c to stop");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("http server error")?;

    Ok(())
}
