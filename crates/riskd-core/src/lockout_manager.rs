//! Lockout Manager (§4.3): in-memory `account_id -> Lockout` map, backed by
//! `riskd-db`. Mutation is synchronous here; persistence round-trips happen
//! at the runtime boundary so the hot rule-evaluation path never awaits.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use riskd_schemas::model::{Lockout, UnlockCondition};

use crate::clock::Clock;
use crate::timer_wheel::{TimerPurpose, TimerWheel};

fn timer_name(account_id: &str) -> String {
    format!("lockout_{account_id}")
}

#[derive(Default)]
pub struct LockoutManager {
    lockouts: HashMap<String, Lockout>,
}

impl LockoutManager {
    pub fn new() -> Self {
        Self { lockouts: HashMap::new() }
    }

    /// Sets a lockout for `account_id`, replacing any prior one, and (if
    /// `expires_at` is set) schedules the `lockout_<account>` auto-unlock
    /// timer. Returns the row the caller should persist via `riskd-db`.
    pub fn set_lockout(
        &mut self,
        timers: &mut TimerWheel,
        account_id: &str,
        rule_id: &str,
        reason: &str,
        expires_at: Option<DateTime<Utc>>,
        unlock_condition: UnlockCondition,
        now: DateTime<Utc>,
    ) -> Lockout {
        let lockout = Lockout {
            account_id: account_id.to_string(),
            rule_id: rule_id.to_string(),
            reason: reason.to_string(),
            locked_at: now,
            expires_at,
            unlock_condition,
            active: true,
        };

        if let Some(at) = expires_at {
            timers.start_timer(
                timer_name(account_id),
                at,
                TimerPurpose::LockoutAutoUnlock { account_id: account_id.to_string() },
            );
        } else {
            timers.cancel_timer(&timer_name(account_id));
        }

        self.lockouts.insert(account_id.to_string(), lockout.clone());
        lockout
    }

    /// §4.3: locked-out status is computed lazily against `expires_at`, not
    /// against whether the auto-unlock timer has actually fired yet.
    pub fn is_locked_out(&self, account_id: &str, clock: &dyn Clock) -> bool {
        match self.lockouts.get(account_id) {
            None => false,
            Some(l) if !l.active => false,
            Some(l) => match l.expires_at {
                Some(at) => at > clock.now(),
                None => true,
            },
        }
    }

    pub fn get_lockout_info(&self, account_id: &str) -> Option<&Lockout> {
        self.lockouts.get(account_id)
    }

    pub fn clear_lockout(&mut self, timers: &mut TimerWheel, account_id: &str) {
        if let Some(l) = self.lockouts.get_mut(account_id) {
            l.active = false;
        }
        timers.cancel_timer(&timer_name(account_id));
    }

    /// Startup recovery (§4.3): rows already past expiry are marked inactive
    /// immediately (returned as `to_deactivate`, for the caller to persist);
    /// rows still in the future get their auto-unlock timer rescheduled.
    pub fn load_from_rows(
        &mut self,
        timers: &mut TimerWheel,
        clock: &dyn Clock,
        rows: Vec<Lockout>,
    ) -> Vec<String> {
        let mut to_deactivate = Vec::new();
        let now = clock.now();
        for mut row in rows {
            match row.expires_at {
                Some(at) if at <= now => {
                    row.active = false;
                    to_deactivate.push(row.account_id.clone());
                }
                Some(at) => {
                    timers.start_timer(
                        timer_name(&row.account_id),
                        at,
                        TimerPurpose::LockoutAutoUnlock { account_id: row.account_id.clone() },
                    );
                }
                None => {}
            }
            self.lockouts.insert(row.account_id.clone(), row);
        }
        to_deactivate
    }
}
