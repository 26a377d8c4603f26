//! Event Router (§4.8): the boundary between raw broker SDK payloads and the
//! canonical internal `RiskEvent` stream. Owns the dedup cache, the
//! protective-order cache, and the order correlator exclusively (§5 "Shared
//! resources") — nothing else touches them.

use chrono::{DateTime, Utc};

use riskd_schemas::events::{BrokerEvent, FillKind, RiskEvent};
use riskd_schemas::model::{Order, OrderSide};
use riskd_schemas::money::Micros;

use crate::dedup::DedupCache;
use crate::order_correlator::OrderCorrelator;
use crate::protective_order_cache::{ProtectiveOrderCache, ProtectiveOrders};
use crate::unrealized_pnl::UnrealizedPnlCalculator;

pub struct EventRouter {
    dedup: DedupCache,
    protective_orders: ProtectiveOrderCache,
    correlator: OrderCorrelator,
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRouter {
    pub fn new() -> Self {
        Self {
            dedup: DedupCache::new(std::time::Duration::from_secs(5)),
            protective_orders: ProtectiveOrderCache::default(),
            correlator: OrderCorrelator::default(),
        }
    }

    /// Routes one raw broker payload into an enriched `RiskEvent`, or `None`
    /// if it was a duplicate. `symbol_root_of` resolves a contract id to its
    /// symbol root (config-provided); `refresh_protective_orders` is only
    /// invoked if the protective-order cache entry for this contract is
    /// stale.
    pub fn route(
        &mut self,
        event: BrokerEvent,
        now: DateTime<Utc>,
        symbol_root_of: impl Fn(&str) -> String,
        refresh_protective_orders: impl FnOnce() -> ProtectiveOrders,
        pnl_calc: &UnrealizedPnlCalculator,
    ) -> Option<RiskEvent> {
        // Legacy raw streams carry no entity id: bypass dedup and enrichment.
        if let Some(passthrough) = Self::passthrough(&event, now) {
            return Some(passthrough);
        }

        // Step 2: protective-order cache is consulted pre-dedup for position
        // events, so a silently placed stop is detected even on a duplicate.
        if matches!(
            event,
            BrokerEvent::PositionOpened(_) | BrokerEvent::PositionUpdated(_) | BrokerEvent::PositionClosed { .. }
        ) {
            if let Some(contract_id) = Self::contract_id(&event) {
                self.protective_orders.get(&contract_id, now, refresh_protective_orders);
            }
        }

        // Step 1: dedup.
        if let Some((kind, entity_id)) = event.dedup_key() {
            if self.dedup.check_and_record(kind, &entity_id, now) {
                return None;
            }
        }

        // Step 3/4: enrich and publish.
        Some(self.enrich(event, now, &symbol_root_of, pnl_calc))
    }

    fn passthrough(event: &BrokerEvent, now: DateTime<Utc>) -> Option<RiskEvent> {
        match event {
            BrokerEvent::SdkConnected => Some(RiskEvent::SdkConnected { timestamp: now }),
            BrokerEvent::SdkDisconnected { reason } => {
                Some(RiskEvent::SdkDisconnected { reason: reason.clone(), timestamp: now })
            }
            BrokerEvent::AuthFailed { message } => {
                Some(RiskEvent::AuthFailed { message: message.clone(), timestamp: now })
            }
            _ => None,
        }
    }

    fn contract_id(event: &BrokerEvent) -> Option<String> {
        match event {
            BrokerEvent::PositionOpened(p) | BrokerEvent::PositionUpdated(p) => Some(p.contract_id.clone()),
            BrokerEvent::PositionClosed { contract_id, .. } => Some(contract_id.clone()),
            _ => None,
        }
    }

    fn enrich(
        &mut self,
        event: BrokerEvent,
        now: DateTime<Utc>,
        symbol_root_of: &impl Fn(&str) -> String,
        pnl_calc: &UnrealizedPnlCalculator,
    ) -> RiskEvent {
        match event {
            BrokerEvent::OrderPlaced(order) => {
                self.protective_orders.update_from_order_placed(&order.contract_id, order.clone(), now);
                RiskEvent::OrderPlaced { order, timestamp: now }
            }
            BrokerEvent::OrderFilled { order, fill_price } => {
                self.correlator.record_fill(
                    &order.contract_id,
                    &order.order_id,
                    order.order_type,
                    order.stop_price.is_some(),
                    order.side,
                    fill_price,
                    now,
                );
                RiskEvent::OrderFilled { order, fill_price, timestamp: now }
            }
            BrokerEvent::OrderPartialFill { order, fill_price, filled_qty } => {
                RiskEvent::OrderPartialFill { order, fill_price, filled_qty, timestamp: now }
            }
            BrokerEvent::OrderCancelled { order_id, account_id } => {
                RiskEvent::OrderCancelled { order_id, account_id, timestamp: now }
            }
            BrokerEvent::OrderRejected { order_id, account_id, reason } => {
                RiskEvent::OrderRejected { order_id, account_id, reason, timestamp: now }
            }
            BrokerEvent::OrderModified(order) => {
                self.protective_orders.invalidate(&order.contract_id);
                RiskEvent::OrderModified { order, timestamp: now }
            }
            BrokerEvent::OrderExpired { order_id, account_id } => {
                RiskEvent::OrderExpired { order_id, account_id, timestamp: now }
            }
            BrokerEvent::PositionOpened(position) => RiskEvent::PositionOpened { position, timestamp: now },
            BrokerEvent::PositionUpdated(position) => RiskEvent::PositionUpdated { position, timestamp: now },
            BrokerEvent::PositionClosed { contract_id, account_id, exit_price } => {
                let correlated = self.correlator.take(&contract_id, now);
                let (fill_kind, side, resolved_exit) = match &correlated {
                    Some(f) => (Some(f.fill_kind), f.side, exit_price.or(Some(f.fill_price))),
                    None => (None::<FillKind>, OrderSide::Buy, exit_price),
                };
                let realized_pnl = resolved_exit.and_then(|price| pnl_calc.calculate_realized_pnl(&contract_id, price));
                RiskEvent::PositionClosed {
                    symbol_root: symbol_root_of(&contract_id),
                    contract_id,
                    account_id,
                    side,
                    exit_price: resolved_exit,
                    fill_kind,
                    realized_pnl,
                    timestamp: now,
                }
            }
            BrokerEvent::SdkConnected | BrokerEvent::SdkDisconnected { .. } | BrokerEvent::AuthFailed { .. } => {
                unreachable!("handled by passthrough")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use riskd_schemas::model::{OrderStatus, OrderType};
    use std::collections::HashMap;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn order(id: &str) -> Order {
        Order {
            order_id: id.into(),
            contract_id: "CON-1".into(),
            account_id: "ACC".into(),
            order_type: OrderType::Market,
            side: OrderSide::Buy,
            size: 1,
            stop_price: None,
            limit_price: None,
            status: OrderStatus::Working,
            placed_at: at(0),
        }
    }

    #[test]
    fn duplicate_order_filled_is_dropped_the_second_time() {
        let mut router = EventRouter::new();
        let calc = UnrealizedPnlCalculator::new(HashMap::new());
        let symbol_root = |_: &str| "MNQ".to_string();

        let first = router.route(
            BrokerEvent::OrderFilled { order: order("ORD-1"), fill_price: Micros::new(1) },
            at(0),
            symbol_root,
            ProtectiveOrders::default,
            &calc,
        );
        assert!(first.is_some());

        let second = router.route(
            BrokerEvent::OrderFilled { order: order("ORD-1"), fill_price: Micros::new(1) },
            at(1),
            symbol_root,
            ProtectiveOrders::default,
            &calc,
        );
        assert!(second.is_none());
    }

    #[test]
    fn connection_state_events_bypass_dedup_every_time() {
        let mut router = EventRouter::new();
        let calc = UnrealizedPnlCalculator::new(HashMap::new());
        let symbol_root = |_: &str| String::new();

        for _ in 0..3 {
            let evt = router.route(BrokerEvent::SdkConnected, at(0), symbol_root, ProtectiveOrders::default, &calc);
            assert!(matches!(evt, Some(RiskEvent::SdkConnected { .. })));
        }
    }
}
