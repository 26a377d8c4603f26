//! Rule 012 — Trade Management. Automation: places a stop-loss/take-profit
//! bracket when a position opens, and trails the stop behind the market as it
//! moves favorably (§4.11 rule 012 detail: `stop = entry - sign(size) *
//! stop_ticks * tick_size`, `target = entry + sign(size) * target_ticks *
//! tick_size`; the trailing stop only ever tightens, never loosens).

use std::collections::HashMap;

use riskd_schemas::events::RiskEvent;
use riskd_schemas::model::OrderSide;
use riskd_schemas::money::Micros;

use crate::rule_engine::{ActionKind, OrderDirective, Rule, RuleContext, Violation};

#[derive(Default)]
struct TrailState {
    stop_order_id: Option<String>,
    last_stop_price: Option<Micros>,
}

#[derive(Default)]
pub struct TradeManagementRule {
    trailing: HashMap<String, TrailState>,
}

impl TradeManagementRule {
    pub fn new() -> Self {
        Self { trailing: HashMap::new() }
    }

    fn side_of(size: i64) -> OrderSide {
        if size >= 0 {
            OrderSide::Buy
        } else {
            OrderSide::Sell
        }
    }
}

impl Rule for TradeManagementRule {
    fn id(&self) -> &'static str {
        "012_trade_management"
    }

    fn evaluate(&mut self, event: &RiskEvent, ctx: &mut RuleContext) -> Vec<Violation> {
        let cfg = &ctx.config.rules.trade_management;
        if !cfg.enabled {
            return vec![];
        }

        match event {
            RiskEvent::PositionOpened { position, .. } => {
                let Some(spec) = ctx.config.general.symbols.get(&position.symbol_root) else {
                    return vec![];
                };
                let sign = position.size.signum();

                let stop_price = cfg.auto_stop_loss.as_ref().map(|ticks| {
                    let offset = spec.tick_size.checked_mul_qty(ticks.ticks as i64).unwrap_or(Micros::ZERO);
                    position
                        .avg_entry_price
                        .checked_sub(offset.checked_mul_qty(sign).unwrap_or(Micros::ZERO))
                        .unwrap_or(position.avg_entry_price)
                });
                let target_price = cfg.auto_take_profit.as_ref().map(|ticks| {
                    let offset = spec.tick_size.checked_mul_qty(ticks.ticks as i64).unwrap_or(Micros::ZERO);
                    position.avg_entry_price.saturating_add(offset.checked_mul_qty(sign).unwrap_or(Micros::ZERO))
                });

                if cfg.trailing_stop.is_some() {
                    if let Some(stop_price) = stop_price {
                        self.trailing.insert(
                            position.contract_id.clone(),
                            TrailState { stop_order_id: None, last_stop_price: Some(stop_price) },
                        );
                    }
                }

                // Both sides configured: one bracket order rather than two
                // independent directives (§4.11 rule 012 detail).
                match (stop_price, target_price) {
                    (Some(stop_price), Some(target_price)) => vec![Violation {
                        rule: self.id(),
                        account_id: position.account_id.clone(),
                        symbol: Some(position.symbol_root.clone()),
                        contract_id: Some(position.contract_id.clone()),
                        action: ActionKind::PlaceBracketOrder,
                        lockout_required: false,
                        cooldown_duration: None,
                        next_unlock: None,
                        message: format!("placing automated bracket order: stop {stop_price}, target {target_price}"),
                        order_directive: Some(OrderDirective::PlaceBracketOrder {
                            contract_id: position.contract_id.clone(),
                            stop_price,
                            target_price,
                            side: Self::side_of(-sign),
                            size: position.size.abs(),
                        }),
                    }],
                    (Some(stop_price), None) => vec![Violation {
                        rule: self.id(),
                        account_id: position.account_id.clone(),
                        symbol: Some(position.symbol_root.clone()),
                        contract_id: Some(position.contract_id.clone()),
                        action: ActionKind::PlaceStopLoss,
                        lockout_required: false,
                        cooldown_duration: None,
                        next_unlock: None,
                        message: format!("placing automated stop-loss at {stop_price}"),
                        order_directive: Some(OrderDirective::PlaceStopLoss {
                            contract_id: position.contract_id.clone(),
                            price: stop_price,
                            side: Self::side_of(-sign),
                            size: position.size.abs(),
                        }),
                    }],
                    (None, Some(target_price)) => vec![Violation {
                        rule: self.id(),
                        account_id: position.account_id.clone(),
                        symbol: Some(position.symbol_root.clone()),
                        contract_id: Some(position.contract_id.clone()),
                        action: ActionKind::PlaceTakeProfit,
                        lockout_required: false,
                        cooldown_duration: None,
                        next_unlock: None,
                        message: format!("placing automated take-profit at {target_price}"),
                        order_directive: Some(OrderDirective::PlaceTakeProfit {
                            contract_id: position.contract_id.clone(),
                            price: target_price,
                            side: Self::side_of(-sign),
                            size: position.size.abs(),
                        }),
                    }],
                    (None, None) => vec![],
                }
            }

            RiskEvent::OrderPlaced { order, .. } if order.is_stop_loss() => {
                if let Some(state) = self.trailing.get_mut(&order.contract_id) {
                    state.stop_order_id = Some(order.order_id.clone());
                }
                vec![]
            }

            RiskEvent::PositionUpdated { position, .. } => {
                let Some(trail_ticks) = &cfg.trailing_stop else { return vec![] };
                let Some(spec) = ctx.config.general.symbols.get(&position.symbol_root) else {
                    return vec![];
                };
                let Some(mark) = ctx.pnl_calc.last_price(&position.symbol_root) else {
                    return vec![];
                };

                let Some(state) = self.trailing.get(&position.contract_id) else { return vec![] };
                let Some(order_id) = state.stop_order_id.clone() else { return vec![] };
                let Some(last_stop) = state.last_stop_price else { return vec![] };

                let sign = position.size.signum();
                let trail_offset = spec.tick_size.checked_mul_qty(trail_ticks.trail_ticks as i64).unwrap_or(Micros::ZERO);
                let candidate = mark
                    .checked_sub(trail_offset.checked_mul_qty(sign).unwrap_or(Micros::ZERO))
                    .unwrap_or(last_stop);

                let tightens = if sign > 0 { candidate > last_stop } else { candidate < last_stop };
                if !tightens {
                    return vec![];
                }

                if let Some(state) = self.trailing.get_mut(&position.contract_id) {
                    state.last_stop_price = Some(candidate);
                }

                vec![Violation {
                    rule: self.id(),
                    account_id: position.account_id.clone(),
                    symbol: Some(position.symbol_root.clone()),
                    contract_id: Some(position.contract_id.clone()),
                    action: ActionKind::AdjustTrailingStop,
                    lockout_required: false,
                    cooldown_duration: None,
                    next_unlock: None,
                    message: format!("trailing stop tightened to {candidate}"),
                    order_directive: Some(OrderDirective::AdjustTrailingStop { order_id, new_price: candidate }),
                }]
            }

            RiskEvent::PositionClosed { contract_id, .. } => {
                self.trailing.remove(contract_id);
                vec![]
            }

            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule_engine::riskd_config_test_fixture::sample_configuration;
    use chrono::Utc;
    use riskd_schemas::model::Position;
    use std::collections::HashMap as StdHashMap;

    fn position(size: i64, entry: Micros) -> Position {
        Position {
            contract_id: "CON-1".into(),
            symbol_root: "MNQ".into(),
            account_id: "ACC".into(),
            size,
            avg_entry_price: entry,
            opened_at: Utc::now(),
        }
    }

    #[test]
    fn opening_a_long_position_with_both_sides_configured_places_one_bracket_order() {
        let mut rule = TradeManagementRule::new();
        let config = sample_configuration(); // auto_stop_loss 20 ticks, auto_take_profit 40 ticks, MNQ tick_size 0.25
        let positions = StdHashMap::new();
        let pnl_calc = crate::unrealized_pnl::UnrealizedPnlCalculator::new(StdHashMap::new());
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

        let entry = Micros::new(20_000_000_000);
        let event = RiskEvent::PositionOpened { position: position(2, entry), timestamp: Utc::now() };
        let violations = rule.evaluate(&event, &mut ctx);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].action, ActionKind::PlaceBracketOrder);
        // 20 ticks * 0.25 = 5.00 below entry for the stop, 40 ticks * 0.25 = 10.00 above for the target.
        assert!(matches!(
            &violations[0].order_directive,
            Some(OrderDirective::PlaceBracketOrder { stop_price, target_price, .. })
            if *stop_price == Micros::new(19_995_000_000) && *target_price == Micros::new(20_010_000_000)
        ));
    }

    #[test]
    fn opening_a_position_with_only_a_stop_loss_configured_places_a_single_sided_order() {
        let mut rule = TradeManagementRule::new();
        let mut config = sample_configuration();
        config.rules.trade_management.auto_take_profit = None;
        let positions = StdHashMap::new();
        let pnl_calc = crate::unrealized_pnl::UnrealizedPnlCalculator::new(StdHashMap::new());
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

        let entry = Micros::new(20_000_000_000);
        let event = RiskEvent::PositionOpened { position: position(2, entry), timestamp: Utc::now() };
        let violations = rule.evaluate(&event, &mut ctx);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].action, ActionKind::PlaceStopLoss);
        assert!(matches!(
            &violations[0].order_directive,
            Some(OrderDirective::PlaceStopLoss { price, .. }) if *price == Micros::new(19_995_000_000)
        ));
    }

    #[test]
    fn disabled_rule_places_nothing() {
        let mut rule = TradeManagementRule::new();
        let mut config = sample_configuration();
        config.rules.trade_management.enabled = false;
        let positions = StdHashMap::new();
        let pnl_calc = crate::unrealized_pnl::UnrealizedPnlCalculator::new(StdHashMap::new());
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
        let event = RiskEvent::PositionOpened { position: position(2, Micros::new(20_000_000_000)), timestamp: Utc::now() };
        assert!(rule.evaluate(&event, &mut ctx).is_empty());
    }

    #[test]
    fn a_favorable_move_tightens_the_trailing_stop_once_a_stop_order_id_is_known() {
        let mut rule = TradeManagementRule::new();
        let config = sample_configuration();
        let mut positions = StdHashMap::new();
        let mut pnl_calc = crate::unrealized_pnl::UnrealizedPnlCalculator::new(StdHashMap::new());
        let mut lockouts = crate::lockout_manager::LockoutManager::new();
        let mut timers = crate::timer_wheel::TimerWheel::new();
        let mut pnl = crate::pnl_tracker::PnlTracker::new(
            chrono::NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            chrono_tz::America::New_York,
        );
        let clock = crate::clock::UtcClock;
        let entry = Micros::new(20_000_000_000);
        let pos = position(2, entry);
        positions.insert(pos.contract_id.clone(), pos.clone());

        {
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
            rule.evaluate(&RiskEvent::PositionOpened { position: pos.clone(), timestamp: Utc::now() }, &mut ctx);
        }

        let stop_order = riskd_schemas::model::Order {
            order_id: "STOP-1".into(),
            contract_id: pos.contract_id.clone(),
            account_id: "ACC".into(),
            order_type: riskd_schemas::model::OrderType::Stop,
            side: riskd_schemas::model::OrderSide::Sell,
            size: 2,
            stop_price: Some(Micros::new(19_995_000_000)),
            limit_price: None,
            status: riskd_schemas::model::OrderStatus::Working,
            placed_at: Utc::now(),
        };
        {
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
            rule.evaluate(&RiskEvent::OrderPlaced { order: stop_order, timestamp: Utc::now() }, &mut ctx);
        }

        pnl_calc.update_quote("MNQ", Micros::new(20_010_000_000)); // +10.00
        let violations = {
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
            rule.evaluate(&RiskEvent::PositionUpdated { position: pos.clone(), timestamp: Utc::now() }, &mut ctx)
        };

        assert_eq!(violations.len(), 1);
        assert!(matches!(
            &violations[0].order_directive,
            Some(OrderDirective::AdjustTrailingStop { order_id, new_price })
            if order_id == "STOP-1" && *new_price == Micros::new(20_007_500_000)
        ));
    }
}
