//! Parses the `lockout_durations.hard_lockout.*` tokens from `timers_config.yaml`
//! (§6.2): `"until_reset"`, `"until_session_start"`, `"permanent"`, or a bare
//! duration like `"300s"` / `"15m"` / `"2h"`.

use std::time::Duration;

use anyhow::{bail, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutDuration {
    UntilDailyReset,
    UntilSessionStart,
    Permanent,
    Fixed(Duration),
}

pub fn parse(token: &str) -> Result<LockoutDuration> {
    match token {
        "until_reset" => Ok(LockoutDuration::UntilDailyReset),
        "until_session_start" => Ok(LockoutDuration::UntilSessionStart),
        "permanent" => Ok(LockoutDuration::Permanent),
        other => parse_fixed(other),
    }
}

fn parse_fixed(token: &str) -> Result<LockoutDuration> {
    let Some((digits, unit)) = split_trailing_unit(token) else {
        bail!("CONFIG_INVALID_LOCKOUT_DURATION: '{token}' is not one of until_reset/until_session_start/permanent/<N>[smh]");
    };
    let n: u64 = digits
        .parse()
        .map_err(|_| anyhow::anyhow!("CONFIG_INVALID_LOCKOUT_DURATION: '{token}' has a non-numeric amount"))?;
    let seconds = match unit {
        's' => n,
        'm' => n * 60,
        'h' => n * 3600,
        _ => unreachable!(),
    };
    Ok(LockoutDuration::Fixed(Duration::from_secs(seconds)))
}

fn split_trailing_unit(token: &str) -> Option<(&str, char)> {
    let unit = token.chars().last()?;
    if !matches!(unit, 's' | 'm' | 'h') {
        return None;
    }
    let digits = &token[..token.len() - 1];
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((digits, unit))
}
