//! Rule 003 — Daily Realized Loss. Hard lockout: close all, lock until the
//! next daily reset. Cannot fire the same day as rule 013 (§4.11 detail) —
//! they bound opposite sides of the same cumulative scalar, so only one of
//! the two thresholds can ever be crossed first.

use chrono::NaiveTime;
use chrono_tz::Tz;
use std::str::FromStr;

use riskd_schemas::events::RiskEvent;
use riskd_schemas::model::UnlockCondition;

use crate::daytime::next_daily_reset;
use crate::rule_engine::{ActionKind, Rule, RuleContext, Violation};

pub struct DailyRealizedLossRule;

impl DailyRealizedLossRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DailyRealizedLossRule {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_tz(timezone: &str) -> Tz {
    Tz::from_str(timezone).unwrap_or(chrono_tz::UTC)
}

impl Rule for DailyRealizedLossRule {
    fn id(&self) -> &'static str {
        "003_daily_realized_loss"
    }

    fn evaluate(&mut self, event: &RiskEvent, ctx: &mut RuleContext) -> Vec<Violation> {
        let cfg = &ctx.config.rules.daily_realized_loss;
        if !cfg.enabled {
            return vec![];
        }

        let (account_id, realized_pnl) = match event {
            RiskEvent::TradeExecuted { trade, .. } => (trade.account_id.clone(), trade.realized_pnl),
            RiskEvent::PositionClosed { account_id, realized_pnl, .. } => (account_id.clone(), *realized_pnl),
            _ => return vec![],
        };
        if realized_pnl.is_none() {
            return vec![];
        }

        // The P&L Tracker is booked exactly once, by the Supervisor alongside
        // the trade's persistence write — this rule only reads the total.
        let now = ctx.now();
        let total = ctx.pnl.get_daily_pnl(&account_id, now);
        if total > cfg.limit {
            return vec![];
        }

        // Already locked by this rule today — do not re-fire or re-extend.
        if let Some(existing) = ctx.lockouts.get_lockout_info(&account_id) {
            if existing.active && existing.rule_id == self.id() {
                return vec![];
            }
        }

        let reset_time = parse_daily_reset_time(&ctx.config.timers.daily_reset.time);
        let tz = parse_tz(&ctx.config.timers.daily_reset.timezone);
        let unlock_at = next_daily_reset(tz, reset_time, now);

        ctx.lockouts.set_lockout(
            ctx.timers,
            &account_id,
            self.id(),
            &format!("daily realized loss {total} breached limit {}", cfg.limit),
            Some(unlock_at),
            UnlockCondition::UntilDailyReset,
            now,
        );

        vec![Violation {
            rule: self.id(),
            account_id,
            symbol: None,
            contract_id: None,
            action: ActionKind::CloseAll,
            lockout_required: true,
            cooldown_duration: None,
            next_unlock: Some(unlock_at),
            message: format!("daily realized loss {total} breached limit {}", cfg.limit),
            order_directive: None,
        }]
    }
}

fn parse_daily_reset_time(time: &str) -> NaiveTime {
    NaiveTime::parse_from_str(time, "%H:%M").unwrap_or_else(|_| NaiveTime::from_hms_opt(17, 0, 0).unwrap())
}
