//! P&L Tracker (§4.4): per-account cumulative realized P&L for the current
//! trading day, reset idempotently at the configured daily-reset wall time.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use riskd_schemas::money::Micros;

use crate::daytime::current_trading_day;

struct DailyTotal {
    trading_day: NaiveDate,
    realized_total: Micros,
}

pub struct PnlTracker {
    totals: HashMap<String, DailyTotal>,
    reset_time: NaiveTime,
    tz: Tz,
}

impl PnlTracker {
    pub fn new(reset_time: NaiveTime, tz: Tz) -> Self {
        Self { totals: HashMap::new(), reset_time, tz }
    }

    /// Rolls `account_id`'s bucket forward to the trading day `now` belongs
    /// to, resetting the running total if the boundary has been crossed
    /// since the last access. Idempotent: calling this repeatedly across the
    /// boundary only resets once.
    fn roll(&mut self, account_id: &str, now: DateTime<Utc>) -> &mut DailyTotal {
        let day = current_trading_day(self.tz, self.reset_time, now);
        let entry = self.totals.entry(account_id.to_string()).or_insert_with(|| DailyTotal {
            trading_day: day,
            realized_total: Micros::ZERO,
        });
        if entry.trading_day != day {
            entry.trading_day = day;
            entry.realized_total = Micros::ZERO;
        }
        entry
    }

    /// Adds `delta` (may be negative) to the running total and returns the
    /// new cumulative value. Half-turn fills (no realized P&L) should never
    /// call this — the caller passes `None` straight through instead.
    pub fn add_trade_pnl(&mut self, account_id: &str, delta: Micros, now: DateTime<Utc>) -> Micros {
        let entry = self.roll(account_id, now);
        entry.realized_total = entry.realized_total.saturating_add(delta);
        entry.realized_total
    }

    pub fn get_daily_pnl(&mut self, account_id: &str, now: DateTime<Utc>) -> Micros {
        self.roll(account_id, now).realized_total
    }

    pub fn reset_daily(&mut self, account_id: &str, now: DateTime<Utc>) {
        let day = current_trading_day(self.tz, self.reset_time, now);
        self.totals.insert(
            account_id.to_string(),
            DailyTotal { trading_day: day, realized_total: Micros::ZERO },
        );
    }

    /// Hydrates a bucket from a persisted `riskd-db` row at startup, without
    /// re-triggering reset logic.
    pub fn seed(&mut self, account_id: &str, trading_day: NaiveDate, realized_total: Micros) {
        self.totals.insert(account_id.to_string(), DailyTotal { trading_day, realized_total });
    }
}
