//! Timer Wheel (§4.2): a map of active timers, ticked cooperatively at ≥1 Hz.
//!
//! Timers don't own closures — the wheel only tracks *when* something expires
//! and *what it was for* (`TimerPurpose`); `tick` hands expired entries back
//! to the caller (Lockout Manager / rule state machines) to act on. This
//! keeps the wheel itself free of dynamic dispatch and easy to drive from a
//! fake clock in tests.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::clock::Clock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerPurpose {
    /// Lockout Manager's auto-unlock for `account_id` (§4.3).
    LockoutAutoUnlock { account_id: String },
    /// Rule 006/007 cooldown expiry for `account_id`.
    Cooldown { account_id: String, rule_id: &'static str },
    /// Rule 008 no-stop-loss grace expiry for a contract.
    NoStopLossGrace { account_id: String, contract_id: String },
}

struct ScheduledTimer {
    expires_at: DateTime<Utc>,
    purpose: TimerPurpose,
}

#[derive(Default)]
pub struct TimerWheel {
    timers: HashMap<String, ScheduledTimer>,
}

impl TimerWheel {
    pub fn new() -> Self {
        Self { timers: HashMap::new() }
    }

    /// Replaces any existing timer of the same name.
    pub fn start_timer(&mut self, name: impl Into<String>, expires_at: DateTime<Utc>, purpose: TimerPurpose) {
        self.timers.insert(name.into(), ScheduledTimer { expires_at, purpose });
    }

    pub fn cancel_timer(&mut self, name: &str) -> bool {
        self.timers.remove(name).is_some()
    }

    pub fn has_timer(&self, name: &str) -> bool {
        self.timers.contains_key(name)
    }

    pub fn get_remaining_time(&self, name: &str, clock: &dyn Clock) -> Option<chrono::Duration> {
        self.timers.get(name).map(|t| t.expires_at - clock.now())
    }

    /// Removes and returns every timer whose `expires_at` is at or before
    /// `clock.now()`, ordered by expiry (oldest first) so the caller fires
    /// them in the order the spec requires.
    pub fn tick(&mut self, clock: &dyn Clock) -> Vec<(String, TimerPurpose)> {
        let now = clock.now();
        let mut expired_names: Vec<String> = self
            .timers
            .iter()
            .filter(|(_, t)| t.expires_at <= now)
            .map(|(name, _)| name.clone())
            .collect();
        expired_names.sort_by_key(|name| self.timers[name].expires_at);

        expired_names
            .into_iter()
            .map(|name| {
                let t = self.timers.remove(&name).expect("just observed in the map");
                (name, t.purpose)
            })
            .collect()
    }
}
