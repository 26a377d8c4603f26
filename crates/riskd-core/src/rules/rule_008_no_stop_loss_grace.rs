//! Rule 008 — No Stop-Loss Grace. Starts a grace timer when a position opens
//! without a recognized stop order on file, and cancels it the moment a
//! qualifying stop is placed on that contract. The grace timer's own expiry
//! is handled by the Timer Wheel's caller (the Runtime Supervisor), which
//! closes the position when a `NoStopLossGrace` purpose fires — this rule
//! only owns starting and cancelling it (§3, §4.11 rule 008 detail: a stop
//! requires both a stop-family order type AND a `stop_price`).

use chrono::Duration;

use riskd_schemas::events::RiskEvent;

use crate::rule_engine::{Rule, RuleContext, Violation};
use crate::timer_wheel::TimerPurpose;

fn timer_name(contract_id: &str) -> String {
    format!("no_stop_loss_grace_{contract_id}")
}

pub struct NoStopLossGraceRule;

impl NoStopLossGraceRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoStopLossGraceRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for NoStopLossGraceRule {
    fn id(&self) -> &'static str {
        "008_no_stop_loss_grace"
    }

    fn evaluate(&mut self, event: &RiskEvent, ctx: &mut RuleContext) -> Vec<Violation> {
        let cfg = &ctx.config.rules.no_stop_loss_grace;
        if !cfg.enabled {
            return vec![];
        }

        match event {
            RiskEvent::PositionOpened { position, .. } => {
                let now = ctx.now();
                ctx.timers.start_timer(
                    timer_name(&position.contract_id),
                    now + Duration::seconds(cfg.grace_seconds as i64),
                    TimerPurpose::NoStopLossGrace {
                        account_id: position.account_id.clone(),
                        contract_id: position.contract_id.clone(),
                    },
                );
            }
            RiskEvent::OrderPlaced { order, .. } if order.is_stop_loss() => {
                ctx.timers.cancel_timer(&timer_name(&order.contract_id));
            }
            RiskEvent::PositionClosed { contract_id, .. } => {
                ctx.timers.cancel_timer(&timer_name(contract_id));
            }
            _ => {}
        }
        vec![]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule_engine::riskd_config_test_fixture::sample_configuration;
    use chrono::Utc;
    use riskd_schemas::model::{Order, OrderSide, OrderStatus, OrderType, Position};
    use riskd_schemas::money::Micros;
    use std::collections::HashMap;

    fn position() -> Position {
        Position {
            contract_id: "CON-1".into(),
            symbol_root: "MNQ".into(),
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
    fn opening_a_position_starts_the_grace_timer() {
        let mut rule = NoStopLossGraceRule::new();
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
        let event = RiskEvent::PositionOpened { position: position(), timestamp: Utc::now() };
        rule.evaluate(&event, &mut ctx);
        assert!(ctx.timers.has_timer("no_stop_loss_grace_CON-1"));
    }

    #[test]
    fn a_qualifying_stop_order_cancels_the_grace_timer() {
        let mut rule = NoStopLossGraceRule::new();
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
        rule.evaluate(&RiskEvent::PositionOpened { position: position(), timestamp: Utc::now() }, &mut ctx);
        assert!(ctx.timers.has_timer("no_stop_loss_grace_CON-1"));

        let stop_order = Order {
            order_id: "O-1".into(),
            contract_id: "CON-1".into(),
            account_id: "ACC".into(),
            order_type: OrderType::Stop,
            side: OrderSide::Sell,
            size: 1,
            stop_price: Some(Micros::new(19_000_000_000)),
            limit_price: None,
            status: OrderStatus::Working,
            placed_at: Utc::now(),
        };
        rule.evaluate(&RiskEvent::OrderPlaced { order: stop_order, timestamp: Utc::now() }, &mut ctx);
        assert!(!ctx.timers.has_timer("no_stop_loss_grace_CON-1"));
    }

    #[test]
    fn a_stop_type_order_without_a_stop_price_does_not_cancel_the_timer() {
        let mut rule = NoStopLossGraceRule::new();
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
        rule.evaluate(&RiskEvent::PositionOpened { position: position(), timestamp: Utc::now() }, &mut ctx);

        let non_stop = Order {
            order_id: "O-2".into(),
            contract_id: "CON-1".into(),
            account_id: "ACC".into(),
            order_type: OrderType::Stop,
            side: OrderSide::Sell,
            size: 1,
            stop_price: None,
            limit_price: None,
            status: OrderStatus::Working,
            placed_at: Utc::now(),
        };
        rule.evaluate(&RiskEvent::OrderPlaced { order: non_stop, timestamp: Utc::now() }, &mut ctx);
        assert!(ctx.timers.has_timer("no_stop_loss_grace_CON-1"));
    }
}
