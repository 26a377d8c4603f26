//! Rule 006 — Trade Frequency Limit. Cooldown: too many trades in a rolling
//! window locks the account out for `cooldown_seconds`, persisted through the
//! same lockout mechanism as a hard lockout (distinguished only by `rule_id`
//! and `UnlockCondition::AfterDuration`).
//!
//! The per-minute/per-hour/per-session counts are not tracked in memory here
//! — the Supervisor fetches them from the trade store (`Store::get_trades_in_window`,
//! `Store::get_session_trade_count`) before dispatch and hands them in as
//! `ctx.trade_window_count`, so the count this rule acts on survives a
//! restart and matches what's actually persisted.
//!
//! Three windows are checked every trade — minute, hour, session — and the
//! tightest one that's breached wins, since `per_minute * 60 <= per_hour` and
//! `per_hour * (session length / hour) <= per_session` by construction: the
//! minute window always breaches first if any window breaches at all.

use chrono::Duration;

use riskd_schemas::events::RiskEvent;
use riskd_schemas::model::UnlockCondition;

use crate::rule_engine::{ActionKind, Rule, RuleContext, Violation};

pub struct TradeFrequencyLimitRule;

impl TradeFrequencyLimitRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TradeFrequencyLimitRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for TradeFrequencyLimitRule {
    fn id(&self) -> &'static str {
        "006_trade_frequency_limit"
    }

    fn evaluate(&mut self, event: &RiskEvent, ctx: &mut RuleContext) -> Vec<Violation> {
        let cfg = &ctx.config.rules.trade_frequency_limit;
        if !cfg.enabled {
            return vec![];
        }

        let account_id = match event {
            RiskEvent::TradeExecuted { trade, .. } => trade.account_id.clone(),
            _ => return vec![],
        };

        let Some(counts) = ctx.trade_window_count else { return vec![] };

        let breach = if counts.per_minute > cfg.per_minute {
            Some(("per-minute", counts.per_minute, cfg.per_minute))
        } else if counts.per_hour > cfg.per_hour {
            Some(("per-hour", counts.per_hour, cfg.per_hour))
        } else if counts.per_session > cfg.per_session {
            Some(("per-session", counts.per_session, cfg.per_session))
        } else {
            None
        };

        let Some((window, observed, limit)) = breach else { return vec![] };

        if let Some(existing) = ctx.lockouts.get_lockout_info(&account_id) {
            if existing.active && existing.rule_id == self.id() {
                return vec![];
            }
        }

        let now = ctx.now();
        let unlock_at = now + Duration::seconds(cfg.cooldown_seconds as i64);
        ctx.lockouts.set_lockout(
            ctx.timers,
            &account_id,
            self.id(),
            &format!("{observed} trades exceeds {window} limit {limit}"),
            Some(unlock_at),
            UnlockCondition::AfterDuration,
            now,
        );

        vec![Violation {
            rule: self.id(),
            account_id,
            symbol: None,
            contract_id: None,
            action: ActionKind::Cooldown,
            lockout_required: true,
            cooldown_duration: Some(std::time::Duration::from_secs(cfg.cooldown_seconds)),
            next_unlock: Some(unlock_at),
            message: format!("{observed} trades exceeds {window} limit {limit}"),
            order_directive: None,
        }]
    }
}
