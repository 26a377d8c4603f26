//! Cross-config invariants (§6 "Cross-config invariants", §4.11 001/002 and
//! 006 hierarchies). Validated once at load; any violation is a fatal
//! configuration error (exit code 2, §7) before the Supervisor starts.

use std::str::FromStr;

use anyhow::{bail, Result};
use chrono_tz::Tz;

use crate::lockout_duration::{self, LockoutDuration};
use crate::types::Configuration;

pub fn validate(config: &Configuration) -> Result<()> {
    validate_timezones_known(config)?;
    validate_lockout_duration_prerequisites(config)?;
    validate_per_instrument_instruments_known(config)?;
    validate_holidays_prerequisite(config)?;
    validate_frequency_hierarchy(config)?;
    validate_contract_limit_hierarchy(config)?;
    Ok(())
}

fn validate_timezones_known(config: &Configuration) -> Result<()> {
    for (label, tz) in [
        ("general.timezone", &config.general.timezone),
        ("timers.daily_reset.timezone", &config.timers.daily_reset.timezone),
        ("timers.session_hours.timezone", &config.timers.session_hours.timezone),
    ] {
        if Tz::from_str(tz).is_err() {
            bail!("CONFIG_INVALID: {label} = '{tz}' is not a recognized IANA timezone name");
        }
    }
    Ok(())
}

fn validate_lockout_duration_prerequisites(config: &Configuration) -> Result<()> {
    for (rule_id, token) in &config.timers.lockout_durations.hard_lockout {
        let parsed = lockout_duration::parse(token)
            .map_err(|e| anyhow::anyhow!("CONFIG_INVALID: lockout duration for rule '{rule_id}': {e}"))?;
        match parsed {
            LockoutDuration::UntilDailyReset if !config.timers.daily_reset.enabled => {
                bail!(
                    "CONFIG_CROSS_REFERENCE: rule '{rule_id}' uses until_reset but timers.daily_reset.enabled is false"
                );
            }
            LockoutDuration::UntilSessionStart if !config.timers.session_hours.enabled => {
                bail!(
                    "CONFIG_CROSS_REFERENCE: rule '{rule_id}' uses until_session_start but timers.session_hours.enabled is false"
                );
            }
            _ => {}
        }
    }
    Ok(())
}

fn validate_per_instrument_instruments_known(config: &Configuration) -> Result<()> {
    for symbol in config.rules.max_contracts_per_instrument.limits.keys() {
        if !config.general.instruments.iter().any(|i| i == symbol) {
            bail!(
                "CONFIG_CROSS_REFERENCE: max_contracts_per_instrument references unknown instrument '{symbol}' (not in general.instruments)"
            );
        }
    }
    Ok(())
}

fn validate_holidays_prerequisite(config: &Configuration) -> Result<()> {
    if config.rules.session_block_outside.respect_holidays && !config.timers.holidays.enabled {
        bail!("CONFIG_CROSS_REFERENCE: session_block_outside.respect_holidays requires timers.holidays.enabled");
    }
    Ok(())
}

fn validate_frequency_hierarchy(config: &Configuration) -> Result<()> {
    let freq = &config.rules.trade_frequency_limit;
    if !freq.enabled {
        return Ok(());
    }
    if u64::from(freq.per_minute) * 60 > u64::from(freq.per_hour) {
        bail!(
            "CONFIG_CROSS_REFERENCE: trade_frequency_limit.per_minute × 60 ({}) exceeds per_hour ({})",
            freq.per_minute as u64 * 60,
            freq.per_hour
        );
    }
    if u64::from(freq.per_hour) * 8 > u64::from(freq.per_session) {
        bail!(
            "CONFIG_CROSS_REFERENCE: trade_frequency_limit.per_hour × 8 ({}) exceeds per_session ({})",
            freq.per_hour as u64 * 8,
            freq.per_session
        );
    }
    Ok(())
}

fn validate_contract_limit_hierarchy(config: &Configuration) -> Result<()> {
    let account_limit = config.rules.max_contracts.limit;
    for (symbol, limit) in &config.rules.max_contracts_per_instrument.limits {
        if i64::from(*limit) > account_limit {
            bail!(
                "CONFIG_CROSS_REFERENCE: max_contracts_per_instrument limit for '{symbol}' ({limit}) exceeds account-wide max_contracts.limit ({account_limit})"
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::yaml::load_layered_yaml_from_strings;

    fn minimal_valid_yaml() -> &'static str {
        r#"
general:
  instruments: ["MNQ"]
  timezone: "America/New_York"
rules:
  max_contracts: { enabled: true, limit: 10 }
  max_contracts_per_instrument: { enabled: true, limits: { MNQ: 5 }, unknown_symbol_policy: block }
  daily_realized_loss: { enabled: true, limit: -500 }
  daily_unrealized_loss: { enabled: true, loss_limit: -200 }
  max_unrealized_profit: { enabled: true, target: 400 }
  trade_frequency_limit: { enabled: true, per_minute: 3, per_hour: 180, per_session: 1440 }
  cooldown_after_loss: { enabled: true, tiers: [] }
  no_stop_loss_grace: { enabled: true, grace_seconds: 60 }
  session_block_outside: { enabled: true, block_weekends: true, respect_holidays: true }
  auth_loss_guard: { enabled: true }
  symbol_blocks: { enabled: false, patterns: [] }
  trade_management: { enabled: false }
  daily_realized_profit: { enabled: true, target: 1000 }
timers:
  daily_reset: { enabled: true, time: "17:00", timezone: "America/New_York" }
  session_hours: { enabled: true, start: "09:30", end: "16:00", timezone: "America/New_York" }
  holidays: { enabled: true, list: [] }
  lockout_durations:
    hard_lockout:
      daily_realized_loss: "until_reset"
      session_block_outside: "until_session_start"
accounts:
  topstepx: { api_url: "https://api.topstepx.com/api" }
  monitored_account: { account_id: "ACC-001" }
"#
    }

    fn load(yaml: &str) -> Configuration {
        let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
        serde_json::from_value(loaded.config_json).unwrap()
    }

    #[test]
    fn minimal_config_passes_validation() {
        let config = load(minimal_valid_yaml());
        validate(&config).unwrap();
    }

    #[test]
    fn until_reset_without_daily_reset_enabled_fails() {
        let yaml = minimal_valid_yaml().replace(
            "daily_reset: { enabled: true,",
            "daily_reset: { enabled: false,",
        );
        let config = load(&yaml);
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("until_reset"));
    }

    #[test]
    fn per_instrument_limit_referencing_unknown_symbol_fails() {
        let yaml = minimal_valid_yaml().replace(
            "limits: { MNQ: 5 }",
            "limits: { ES: 5 }",
        );
        let config = load(&yaml);
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("unknown instrument"));
    }

    #[test]
    fn per_instrument_limit_exceeding_account_limit_fails() {
        let yaml = minimal_valid_yaml().replace(
            "limits: { MNQ: 5 }",
            "limits: { MNQ: 50 }",
        );
        let config = load(&yaml);
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("exceeds account-wide"));
    }

    #[test]
    fn frequency_hierarchy_violation_fails() {
        let yaml = minimal_valid_yaml().replace(
            "per_minute: 3, per_hour: 180, per_session: 1440",
            "per_minute: 10, per_hour: 20, per_session: 1440",
        );
        let config = load(&yaml);
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("per_minute"));
    }

    #[test]
    fn respect_holidays_without_holidays_enabled_fails() {
        let yaml = minimal_valid_yaml().replace("holidays: { enabled: true,", "holidays: { enabled: false,");
        let config = load(&yaml);
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("respect_holidays"));
    }

    #[test]
    fn unrecognized_timezone_name_fails() {
        let yaml = minimal_valid_yaml().replace("America/New_York", "Mars/Olympus_Mons");
        let config = load(&yaml);
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("timezone"));
    }
}
