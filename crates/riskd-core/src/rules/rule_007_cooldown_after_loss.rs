//! Rule 007 — Cooldown After Loss. A losing trade selects the deepest
//! qualifying tier (§4.11 detail: filter tiers where `pnl <= loss_amount`,
//! then take the tier with the most negative `loss_amount` among those) and
//! locks the account out for that tier's duration and flattens the account's
//! open positions. Already cooling down from this rule: never restart or
//! extend, even if a deeper tier would now qualify — the first breach's
//! timer runs to completion.

use chrono::Duration;

use riskd_schemas::events::RiskEvent;
use riskd_schemas::model::UnlockCondition;

use crate::rule_engine::{ActionKind, Rule, RuleContext, Violation};

pub struct CooldownAfterLossRule;

impl CooldownAfterLossRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CooldownAfterLossRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for CooldownAfterLossRule {
    fn id(&self) -> &'static str {
        "007_cooldown_after_loss"
    }

    fn evaluate(&mut self, event: &RiskEvent, ctx: &mut RuleContext) -> Vec<Violation> {
        let cfg = &ctx.config.rules.cooldown_after_loss;
        if !cfg.enabled {
            return vec![];
        }

        let (account_id, realized_pnl) = match event {
            RiskEvent::TradeExecuted { trade, .. } => (trade.account_id.clone(), trade.realized_pnl),
            RiskEvent::PositionClosed { account_id, realized_pnl, .. } => (account_id.clone(), *realized_pnl),
            _ => return vec![],
        };
        let Some(pnl) = realized_pnl else { return vec![] };

        let tier = cfg
            .tiers
            .iter()
            .filter(|t| pnl <= t.loss_amount)
            .min_by_key(|t| t.loss_amount);
        let Some(tier) = tier else { return vec![] };

        if let Some(existing) = ctx.lockouts.get_lockout_info(&account_id) {
            if existing.active && existing.rule_id == self.id() {
                return vec![];
            }
        }

        let now = ctx.now();
        let unlock_at = now + Duration::seconds(tier.duration_seconds as i64);
        ctx.lockouts.set_lockout(
            ctx.timers,
            &account_id,
            self.id(),
            &format!("loss {pnl} reached cooldown tier {}", tier.loss_amount),
            Some(unlock_at),
            UnlockCondition::AfterDuration,
            now,
        );

        vec![
            Violation {
                rule: self.id(),
                account_id: account_id.clone(),
                symbol: None,
                contract_id: None,
                action: ActionKind::Cooldown,
                lockout_required: true,
                cooldown_duration: Some(std::time::Duration::from_secs(tier.duration_seconds)),
                next_unlock: Some(unlock_at),
                message: format!("loss {pnl} reached cooldown tier {}", tier.loss_amount),
                order_directive: None,
            },
            Violation {
                rule: self.id(),
                account_id,
                symbol: None,
                contract_id: None,
                action: ActionKind::Flatten,
                lockout_required: false,
                cooldown_duration: None,
                next_unlock: None,
                message: format!("flattening positions after cooldown tier {}", tier.loss_amount),
                order_directive: None,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule_engine::riskd_config_test_fixture::sample_configuration;
    use chrono::Utc;
    use riskd_schemas::model::{OrderSide, Trade};
    use riskd_schemas::money::Micros;
    use std::collections::HashMap;

    fn trade(realized: Micros) -> Trade {
        Trade {
            trade_id: "T".into(),
            account_id: "ACC".into(),
            contract_id: "CON".into(),
            symbol: "MNQ".into(),
            side: OrderSide::Sell,
            quantity: 1,
            price: Micros::ZERO,
            realized_pnl: Some(realized),
            timestamp: Utc::now(),
        }
    }

    fn ctx_parts() -> (
        crate::clock::UtcClock,
        HashMap<String, riskd_schemas::model::Position>,
        crate::unrealized_pnl::UnrealizedPnlCalculator,
        crate::lockout_manager::LockoutManager,
        crate::timer_wheel::TimerWheel,
        crate::pnl_tracker::PnlTracker,
    ) {
        (
            crate::clock::UtcClock,
            HashMap::new(),
            crate::unrealized_pnl::UnrealizedPnlCalculator::new(HashMap::new()),
            crate::lockout_manager::LockoutManager::new(),
            crate::timer_wheel::TimerWheel::new(),
            crate::pnl_tracker::PnlTracker::new(
                chrono::NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                chrono_tz::America::New_York,
            ),
        )
    }

    #[test]
    fn selects_the_deepest_qualifying_tier() {
        // Fixture tiers: -100 -> 120s, -200 -> 300s, -400 -> 900s.
        // A -250 loss qualifies for -100 and -200, not -400. Deepest of those
        // that qualify is -200 -> 300s.
        let mut rule = CooldownAfterLossRule::new();
        let config = sample_configuration();
        let (clock, positions, pnl_calc, mut lockouts, mut timers, mut pnl) = ctx_parts();
        let mut ctx = RuleContext {
            clock: &clock,
            config: &config,
            positions: &positions,
            pnl_calc: &pnl_calc,
            lockouts: &mut lockouts,
            timers: &mut timers,
            pnl: &mut pnl,
            trade_window_count: None,
        };
        let event = RiskEvent::TradeExecuted { trade: trade(Micros::new(-250_000_000)), timestamp: Utc::now() };
        let violations = rule.evaluate(&event, &mut ctx);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].cooldown_duration, Some(std::time::Duration::from_secs(300)));
        assert_eq!(violations[1].action, ActionKind::Flatten);
    }

    #[test]
    fn an_active_cooldown_is_not_extended_by_a_deeper_loss() {
        let mut rule = CooldownAfterLossRule::new();
        let config = sample_configuration();
        let (clock, positions, pnl_calc, mut lockouts, mut timers, mut pnl) = ctx_parts();

        let mut fire = |event: &RiskEvent| {
            let mut ctx = RuleContext {
                clock: &clock,
                config: &config,
                positions: &positions,
                pnl_calc: &pnl_calc,
                lockouts: &mut lockouts,
                timers: &mut timers,
                pnl: &mut pnl,
                trade_window_count: None,
            };
            rule.evaluate(event, &mut ctx)
        };

        let first = fire(&RiskEvent::TradeExecuted { trade: trade(Micros::new(-150_000_000)), timestamp: Utc::now() });
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].cooldown_duration, Some(std::time::Duration::from_secs(120)));
        assert_eq!(first[1].action, ActionKind::Flatten);

        let second = fire(&RiskEvent::TradeExecuted { trade: trade(Micros::new(-500_000_000)), timestamp: Utc::now() });
        assert!(second.is_empty());
    }

    #[test]
    fn a_small_loss_below_every_tier_does_not_fire() {
        let mut rule = CooldownAfterLossRule::new();
        let config = sample_configuration();
        let (clock, positions, pnl_calc, mut lockouts, mut timers, mut pnl) = ctx_parts();
        let mut ctx = RuleContext {
            clock: &clock,
            config: &config,
            positions: &positions,
            pnl_calc: &pnl_calc,
            lockouts: &mut lockouts,
            timers: &mut timers,
            pnl: &mut pnl,
            trade_window_count: None,
        };
        let event = RiskEvent::TradeExecuted { trade: trade(Micros::new(-10_000_000)), timestamp: Utc::now() };
        assert!(rule.evaluate(&event, &mut ctx).is_empty());
    }
}
