//! Rule 013 — Daily Realized Profit. Hard lockout, symmetric to rule 003:
//! once cumulative realized P&L for the day reaches the target, trading
//! locks until the next daily reset — "quit while ahead" rather than a
//! penalty. Mutually exclusive with rule 003 on the same day (§4.11 detail):
//! the two rules bound opposite sides of the same cumulative scalar tracked
//! by the P&L Tracker, so only one threshold can ever be crossed first.

use chrono::NaiveTime;
use chrono_tz::Tz;
use std::str::FromStr;

use riskd_schemas::events::RiskEvent;
use riskd_schemas::model::UnlockCondition;

use crate::daytime::next_daily_reset;
use crate::rule_engine::{ActionKind, Rule, RuleContext, Violation};

pub struct DailyRealizedProfitRule;

impl DailyRealizedProfitRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DailyRealizedProfitRule {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_tz(timezone: &str) -> Tz {
    Tz::from_str(timezone).unwrap_or(chrono_tz::UTC)
}

fn parse_daily_reset_time(time: &str) -> NaiveTime {
    NaiveTime::parse_from_str(time, "%H:%M").unwrap_or_else(|_| NaiveTime::from_hms_opt(17, 0, 0).unwrap())
}

impl Rule for DailyRealizedProfitRule {
    fn id(&self) -> &'static str {
        "013_daily_realized_profit"
    }

    fn evaluate(&mut self, event: &RiskEvent, ctx: &mut RuleContext) -> Vec<Violation> {
        let cfg = &ctx.config.rules.daily_realized_profit;
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
        if total < cfg.target {
            return vec![];
        }

        if let Some(existing) = ctx.lockouts.get_lockout_info(&account_id) {
            if existing.active {
                // Rule 003 and this rule are mutually exclusive on the same
                // cumulative total, and neither re-fires over its own lockout.
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
            &format!("daily realized profit {total} reached target {}", cfg.target),
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
            message: format!("daily realized profit {total} reached target {}", cfg.target),
            order_directive: None,
        }]
    }
}
