//! Rule 005 — Max Unrealized Profit. Trade-by-trade: close the position once
//! its mark-to-market profit reaches the configured target, locking in the
//! gain rather than letting it give back. Symmetric to rule 004, opposite
//! sign, no lockout.

use riskd_schemas::events::RiskEvent;

use crate::rule_engine::{ActionKind, Rule, RuleContext, Violation};

pub struct MaxUnrealizedProfitRule;

impl MaxUnrealizedProfitRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MaxUnrealizedProfitRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for MaxUnrealizedProfitRule {
    fn id(&self) -> &'static str {
        "005_max_unrealized_profit"
    }

    fn evaluate(&mut self, event: &RiskEvent, ctx: &mut RuleContext) -> Vec<Violation> {
        let cfg = &ctx.config.rules.max_unrealized_profit;
        if !cfg.enabled {
            return vec![];
        }

        let position = match event {
            RiskEvent::PositionOpened { position, .. } | RiskEvent::PositionUpdated { position, .. } => position,
            _ => return vec![],
        };

        let Some(unrealized) = ctx.pnl_calc.get_unrealized(&position.contract_id) else {
            return vec![];
        };

        if unrealized >= cfg.target {
            return vec![Violation {
                rule: self.id(),
                account_id: position.account_id.clone(),
                symbol: Some(position.symbol_root.clone()),
                contract_id: Some(position.contract_id.clone()),
                action: ActionKind::ClosePosition,
                lockout_required: false,
                cooldown_duration: None,
                next_unlock: None,
                message: format!(
                    "unrealized profit {unrealized} on {} reached target {}",
                    position.symbol_root, cfg.target
                ),
                order_directive: None,
            }];
        }
        vec![]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule_engine::riskd_config_test_fixture::sample_configuration;
    use chrono::Utc;
    use riskd_schemas::model::{OrderSide, Position, SymbolSpec};
    use riskd_schemas::money::Micros;
    use std::collections::HashMap;

    fn position() -> Position {
        Position {
            contract_id: "CON.MNQ.1".into(),
            symbol_root: "MNQ".into(),
            account_id: "ACC".into(),
            size: 2,
            avg_entry_price: Micros::new(20_000_000_000),
            opened_at: Utc::now(),
        }
    }

    #[test]
    fn reaching_the_profit_target_closes_the_position() {
        let mut rule = MaxUnrealizedProfitRule::new();
        let mut config = sample_configuration();
        config.rules.max_unrealized_profit.target = Micros::new(100_000_000);

        let mut symbols = HashMap::new();
        symbols.insert(
            "MNQ".to_string(),
            SymbolSpec { tick_size: Micros::new(250_000), tick_value: Micros::new(500_000) },
        );
        let mut pnl_calc = crate::unrealized_pnl::UnrealizedPnlCalculator::new(symbols);
        pnl_calc.update_position(
            "CON.MNQ.1",
            crate::unrealized_pnl::TrackedPosition {
                entry_price: Micros::new(20_000_000_000),
                size: 2,
                side: OrderSide::Buy,
                symbol: "MNQ".into(),
                opened_at: Utc::now(),
            },
        );
        pnl_calc.update_quote("MNQ", Micros::new(20_050_000_000)); // +50.00 = 200 ticks * 2 * 0.5 = $200

        let mut positions = HashMap::new();
        positions.insert("CON.MNQ.1".to_string(), position());
        let mut lockouts = crate::lockout_manager::LockoutManager::new();
        let mut timers = crate::timer_wheel::TimerWheel::new();
        let mut pnl = crate::pnl_tracker::PnlTracker::new(
            chrono::NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            chrono_tz::America::New_York,
        );
        let clock = crate::clock::UtcClock;
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

        let event = RiskEvent::PositionUpdated { position: position(), timestamp: Utc::now() };
        let violations = rule.evaluate(&event, &mut ctx);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].action, ActionKind::ClosePosition);
    }

    #[test]
    fn profit_below_target_does_not_fire() {
        let mut rule = MaxUnrealizedProfitRule::new();
        let mut config = sample_configuration();
        config.rules.max_unrealized_profit.target = Micros::new(1_000_000_000);

        let mut symbols = HashMap::new();
        symbols.insert(
            "MNQ".to_string(),
            SymbolSpec { tick_size: Micros::new(250_000), tick_value: Micros::new(500_000) },
        );
        let mut pnl_calc = crate::unrealized_pnl::UnrealizedPnlCalculator::new(symbols);
        pnl_calc.update_position(
            "CON.MNQ.1",
            crate::unrealized_pnl::TrackedPosition {
                entry_price: Micros::new(20_000_000_000),
                size: 2,
                side: OrderSide::Buy,
                symbol: "MNQ".into(),
                opened_at: Utc::now(),
            },
        );
        pnl_calc.update_quote("MNQ", Micros::new(20_001_000_000));

        let mut positions = HashMap::new();
        positions.insert("CON.MNQ.1".to_string(), position());
        let mut lockouts = crate::lockout_manager::LockoutManager::new();
        let mut timers = crate::timer_wheel::TimerWheel::new();
        let mut pnl = crate::pnl_tracker::PnlTracker::new(
            chrono::NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            chrono_tz::America::New_York,
        );
        let clock = crate::clock::UtcClock;
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
        let event = RiskEvent::PositionUpdated { position: position(), timestamp: Utc::now() };
        assert!(rule.evaluate(&event, &mut ctx).is_empty());
    }
}
