//! Rule 011 — Symbol Blocks. Trade-by-trade: a position on a symbol matching
//! any configured blocklist pattern (case-insensitive glob, e.g. `*CRYPTO*`)
//! is closed immediately.

use riskd_schemas::events::RiskEvent;

use crate::rule_engine::{ActionKind, Rule, RuleContext, Violation};
use crate::rules::glob;

pub struct SymbolBlocksRule;

impl SymbolBlocksRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SymbolBlocksRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for SymbolBlocksRule {
    fn id(&self) -> &'static str {
        "011_symbol_blocks"
    }

    fn evaluate(&mut self, event: &RiskEvent, ctx: &mut RuleContext) -> Vec<Violation> {
        let cfg = &ctx.config.rules.symbol_blocks;
        if !cfg.enabled {
            return vec![];
        }

        let position = match event {
            RiskEvent::PositionOpened { position, .. } | RiskEvent::PositionUpdated { position, .. } => position,
            _ => return vec![],
        };

        let blocked = cfg.patterns.iter().any(|p| glob::matches(p, &position.symbol_root));
        if blocked {
            return vec![Violation {
                rule: self.id(),
                account_id: position.account_id.clone(),
                symbol: Some(position.symbol_root.clone()),
                contract_id: Some(position.contract_id.clone()),
                action: ActionKind::ClosePosition,
                lockout_required: false,
                cooldown_duration: None,
                next_unlock: None,
                message: format!("{} matches a blocked symbol pattern", position.symbol_root),
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
    use riskd_schemas::model::Position;
    use riskd_schemas::money::Micros;
    use std::collections::HashMap;

    fn position(symbol_root: &str) -> Position {
        Position {
            contract_id: "CON-1".into(),
            symbol_root: symbol_root.into(),
            account_id: "ACC".into(),
            size: 1,
            avg_entry_price: Micros::ZERO,
            opened_at: Utc::now(),
        }
    }

    fn ctx_parts() -> (
        crate::clock::UtcClock,
        HashMap<String, Position>,
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
    fn a_blocked_symbol_pattern_closes_the_position() {
        let mut rule = SymbolBlocksRule::new();
        let config = sample_configuration(); // fixture patterns: ["*CRYPTO*"]
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
        let event = RiskEvent::PositionOpened { position: position("BTCCRYPTOUSD"), timestamp: Utc::now() };
        let violations = rule.evaluate(&event, &mut ctx);
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn an_unblocked_symbol_is_left_alone() {
        let mut rule = SymbolBlocksRule::new();
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
        let event = RiskEvent::PositionOpened { position: position("MNQ"), timestamp: Utc::now() };
        assert!(rule.evaluate(&event, &mut ctx).is_empty());
    }
}
