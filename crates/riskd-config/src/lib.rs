//! riskd-config
//!
//! Typed configuration loading for the four YAML files (§6), credential
//! resolution (§6 "Credentials"), and the cross-config invariants (§6, §4.11)
//! that must hold before the Supervisor starts any other component.

pub mod env_interp;
pub mod lockout_duration;
pub mod secrets;
pub mod types;
pub mod validate;
pub mod yaml;

use std::path::Path;

use anyhow::{Context, Result};

pub use secrets::Credentials;
pub use types::Configuration;
pub use yaml::LoadedConfig;

/// `risk_config.yaml`, `timers_config.yaml`, `accounts.yaml` are required;
/// `api_config.yaml` is optional and defaults apply if absent (§6).
pub const RISK_CONFIG_FILE: &str = "risk_config.yaml";
pub const TIMERS_CONFIG_FILE: &str = "timers_config.yaml";
pub const ACCOUNTS_CONFIG_FILE: &str = "accounts.yaml";
pub const API_CONFIG_FILE: &str = "api_config.yaml";

impl Configuration {
    /// Load all config files from `config_dir`, merge, env-interpolate,
    /// validate cross-config invariants, and return the typed configuration
    /// plus a content hash for audit/log correlation (§6A).
    ///
    /// A missing required file, a YAML parse error, or a failed invariant is
    /// a fatal configuration error — the caller is expected to exit with
    /// code 2 (§7).
    pub fn load(config_dir: &Path) -> Result<(Configuration, String)> {
        let required = [
            config_dir.join(RISK_CONFIG_FILE),
            config_dir.join(TIMERS_CONFIG_FILE),
            config_dir.join(ACCOUNTS_CONFIG_FILE),
        ];
        let mut paths: Vec<&Path> = required.iter().map(|p| p.as_path()).collect();

        let optional_api = config_dir.join(API_CONFIG_FILE);
        if optional_api.exists() {
            paths.push(optional_api.as_path());
        }

        let loaded = yaml::load_layered_yaml(&paths).context("loading layered YAML config")?;
        let config: Configuration =
            serde_json::from_value(loaded.config_json).context("deserializing typed configuration")?;

        validate::validate(&config).context("validating cross-config invariants")?;

        Ok((config, loaded.config_hash))
    }
}
