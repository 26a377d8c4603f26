//! Rule 002 — Max Contracts Per Instrument. Trade-by-trade: close one
//! position. Limits are keyed by symbol root; an unconfigured symbol falls
//! back to the configured unknown-symbol policy (§4.11 detail, §9 Open
//! Question 1).

use riskd_schemas::events::RiskEvent;
use riskd_schemas::model::UnknownSymbolPolicy;

use crate::rule_engine::{ActionKind, Rule, RuleContext, Violation};

pub struct MaxContractsPerInstrumentRule;

impl MaxContractsPerInstrumentRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MaxContractsPerInstrumentRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for MaxContractsPerInstrumentRule {
    fn id(&self) -> &'static str {
        "002_max_contracts_per_instrument"
    }

    fn evaluate(&mut self, event: &RiskEvent, ctx: &mut RuleContext) -> Vec<Violation> {
        let cfg = &ctx.config.rules.max_contracts_per_instrument;
        if !cfg.enabled {
            return vec![];
        }

        let position = match event {
            RiskEvent::PositionOpened { position, .. } | RiskEvent::PositionUpdated { position, .. } => position,
            _ => return vec![],
        };

        let size = position.size.abs();
        let limit = match cfg.limits.get(&position.symbol_root) {
            Some(&n) => n as i64,
            None => match cfg.unknown_symbol_policy {
                UnknownSymbolPolicy::AllowUnlimited => return vec![],
                UnknownSymbolPolicy::AllowWithLimit(n) => n as i64,
                UnknownSymbolPolicy::Block => 0,
            },
        };

        if size > limit {
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
                    "{} contracts on {} exceeds per-instrument limit {}",
                    size, position.symbol_root, limit
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
    use riskd_schemas::model::Position;
    use riskd_schemas::money::Micros;
    use std::collections::HashMap;

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

    fn position(symbol_root: &str, size: i64) -> Position {
        Position {
            contract_id: "CON-1".into(),
            symbol_root: symbol_root.into(),
            account_id: "ACC".into(),
            size,
            avg_entry_price: Micros::ZERO,
            opened_at: Utc::now(),
        }
    }

    #[test]
    fn configured_symbol_limit_is_enforced() {
        let mut rule = MaxContractsPerInstrumentRule::new();
        let mut config = sample_configuration();
        config.rules.max_contracts_per_instrument.limits.insert("MNQ".into(), 2);
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
        let event = RiskEvent::PositionOpened { position: position("MNQ", 3), timestamp: Utc::now() };
        let violations = rule.evaluate(&event, &mut ctx);
        assert_eq!(violations.len(), 1);
        let _ = &positions;
    }

    #[test]
    fn unknown_symbol_with_block_policy_blocks_any_size() {
        let mut rule = MaxContractsPerInstrumentRule::new();
        let config = sample_configuration(); // fixture's unknown_symbol_policy is Block, no limits configured
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
        let event = RiskEvent::PositionOpened { position: position("UNKNOWN", 1), timestamp: Utc::now() };
        let violations = rule.evaluate(&event, &mut ctx);
        assert_eq!(violations.len(), 1);
    }
}
