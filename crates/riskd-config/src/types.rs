//! Typed configuration model for the four YAML files (§6).
//!
//! Deserialized straight off the merged, env-interpolated config JSON
//! (`yaml::load_layered_yaml`); `lib.rs::Configuration::load` is the only
//! place that constructs these from untyped JSON, via `serde_json::from_value`.

use std::collections::HashMap;

use riskd_schemas::{Micros, SymbolSpec, UnknownSymbolPolicy};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// risk_config.yaml
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub instruments: Vec<String>,
    pub timezone: String,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Per-symbol tick size/value, consumed by the Unrealized P&L Calculator
    /// and rules 004/005/012 (§3A, §4.5, §4.11).
    #[serde(default)]
    pub symbols: HashMap<String, SymbolSpec>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig { level: default_log_level() }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MaxContractsConfig {
    pub enabled: bool,
    pub limit: i64,
    #[serde(default)]
    pub per_instrument: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MaxContractsPerInstrumentConfig {
    pub enabled: bool,
    #[serde(default)]
    pub limits: HashMap<String, u32>,
    #[serde(default = "default_unknown_symbol_policy")]
    pub unknown_symbol_policy: UnknownSymbolPolicy,
}

fn default_unknown_symbol_policy() -> UnknownSymbolPolicy {
    UnknownSymbolPolicy::Block
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DailyRealizedLossConfig {
    pub enabled: bool,
    pub limit: Micros,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DailyUnrealizedLossConfig {
    pub enabled: bool,
    pub loss_limit: Micros,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MaxUnrealizedProfitConfig {
    pub enabled: bool,
    pub target: Micros,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TradeFrequencyLimitConfig {
    pub enabled: bool,
    pub per_minute: u32,
    pub per_hour: u32,
    pub per_session: u32,
    pub cooldown_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LossTier {
    pub loss_amount: Micros,
    pub duration_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CooldownAfterLossConfig {
    pub enabled: bool,
    pub tiers: Vec<LossTier>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NoStopLossGraceConfig {
    pub enabled: bool,
    pub grace_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionBlockOutsideConfig {
    pub enabled: bool,
    #[serde(default)]
    pub block_weekends: bool,
    #[serde(default)]
    pub respect_holidays: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthLossGuardConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SymbolBlocksConfig {
    pub enabled: bool,
    #[serde(default)]
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TicksSpec {
    pub ticks: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrailSpec {
    pub trail_ticks: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TradeManagementConfig {
    pub enabled: bool,
    #[serde(default)]
    pub auto_stop_loss: Option<TicksSpec>,
    #[serde(default)]
    pub auto_take_profit: Option<TicksSpec>,
    #[serde(default)]
    pub trailing_stop: Option<TrailSpec>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DailyRealizedProfitConfig {
    pub enabled: bool,
    pub target: Micros,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RulesConfig {
    pub max_contracts: MaxContractsConfig,
    pub max_contracts_per_instrument: MaxContractsPerInstrumentConfig,
    pub daily_realized_loss: DailyRealizedLossConfig,
    pub daily_unrealized_loss: DailyUnrealizedLossConfig,
    pub max_unrealized_profit: MaxUnrealizedProfitConfig,
    pub trade_frequency_limit: TradeFrequencyLimitConfig,
    pub cooldown_after_loss: CooldownAfterLossConfig,
    pub no_stop_loss_grace: NoStopLossGraceConfig,
    pub session_block_outside: SessionBlockOutsideConfig,
    pub auth_loss_guard: AuthLossGuardConfig,
    pub symbol_blocks: SymbolBlocksConfig,
    pub trade_management: TradeManagementConfig,
    pub daily_realized_profit: DailyRealizedProfitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RiskConfig {
    pub general: GeneralConfig,
    pub rules: RulesConfig,
}

// ---------------------------------------------------------------------------
// timers_config.yaml
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DailyResetConfig {
    pub enabled: bool,
    pub time: String,
    pub timezone: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionHoursConfig {
    pub enabled: bool,
    pub start: String,
    pub end: String,
    pub timezone: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HolidaysConfig {
    pub enabled: bool,
    #[serde(default)]
    pub list: Vec<chrono::NaiveDate>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LockoutDurationsConfig {
    /// Raw tokens per rule id (`"until_reset"`, `"until_session_start"`,
    /// `"permanent"`, `"\d+[smh]"`); parsed by `lockout_duration::parse`.
    pub hard_lockout: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimersConfig {
    pub daily_reset: DailyResetConfig,
    pub session_hours: SessionHoursConfig,
    pub holidays: HolidaysConfig,
    pub lockout_durations: LockoutDurationsConfig,
}

// ---------------------------------------------------------------------------
// accounts.yaml
// ---------------------------------------------------------------------------

/// Non-secret TopstepX connection metadata. `username`/`api_key` are
/// resolved exclusively from the environment (`secrets::Credentials`), never
/// stored or read back out of this struct — keeping the one place secrets
/// can leak into a log line to a single module.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TopstepXConfig {
    pub api_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitoredAccount {
    pub account_id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountEntry {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountsConfig {
    pub topstepx: TopstepXConfig,
    #[serde(default)]
    pub monitored_account: Option<MonitoredAccount>,
    #[serde(default)]
    pub accounts: Option<Vec<AccountEntry>>,
}

// ---------------------------------------------------------------------------
// api_config.yaml (optional)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_cache_ttl_ms() -> u64 {
    5_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            connect_timeout_ms: default_connect_timeout_ms(),
            retry_attempts: default_retry_attempts(),
            cache_ttl_ms: default_cache_ttl_ms(),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Configuration {
    pub general: GeneralConfig,
    pub rules: RulesConfig,
    pub timers: TimersConfig,
    pub accounts: AccountsConfig,
    #[serde(default)]
    pub api: ApiConfig,
}
