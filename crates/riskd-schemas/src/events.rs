//! Broker event ingestion types and the canonical internal `RiskEvent`.
//!
//! `BrokerEvent` is what the SDK emits, before dedup/enrichment. `RiskEvent`
//! is what the Event Router publishes onto the internal Event Bus (§4.8) —
//! one tagged variant per event kind, replacing the source's string-keyed
//! dict dispatch with exhaustive pattern matching (§9 redesign note).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Order, OrderSide, Position};
use crate::money::Micros;

/// Raw broker SDK payload, as received on the event bus subjects enumerated
/// in §4.8, before dedup/enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BrokerEvent {
    OrderPlaced(Order),
    OrderFilled { order: Order, fill_price: Micros },
    OrderPartialFill { order: Order, fill_price: Micros, filled_qty: i64 },
    OrderCancelled { order_id: String, account_id: String },
    OrderRejected { order_id: String, account_id: String, reason: String },
    OrderModified(Order),
    OrderExpired { order_id: String, account_id: String },
    PositionOpened(Position),
    PositionUpdated(Position),
    PositionClosed { contract_id: String, account_id: String, exit_price: Option<Micros> },
    SdkConnected,
    SdkDisconnected { reason: String },
    AuthFailed { message: String },
}

impl BrokerEvent {
    /// Dedup key per §4.8 step 1: `(event_kind, entity_id)`. Events with no
    /// natural entity id (connection-state events) are never deduplicated —
    /// returns `None`.
    pub fn dedup_key(&self) -> Option<(&'static str, String)> {
        match self {
            BrokerEvent::OrderPlaced(o) => Some(("order_placed", o.order_id.clone())),
            BrokerEvent::OrderFilled { order, .. } => Some(("order_filled", order.order_id.clone())),
            BrokerEvent::OrderPartialFill { order, .. } => {
                Some(("order_partial_fill", order.order_id.clone()))
            }
            BrokerEvent::OrderCancelled { order_id, .. } => {
                Some(("order_cancelled", order_id.clone()))
            }
            BrokerEvent::OrderRejected { order_id, .. } => {
                Some(("order_rejected", order_id.clone()))
            }
            BrokerEvent::OrderModified(o) => Some(("order_modified", o.order_id.clone())),
            BrokerEvent::OrderExpired { order_id, .. } => Some(("order_expired", order_id.clone())),
            BrokerEvent::PositionOpened(p) => Some(("position_opened", p.contract_id.clone())),
            BrokerEvent::PositionUpdated(p) => Some(("position_updated", p.contract_id.clone())),
            BrokerEvent::PositionClosed { contract_id, .. } => {
                Some(("position_closed", contract_id.clone()))
            }
            BrokerEvent::SdkConnected | BrokerEvent::SdkDisconnected { .. } | BrokerEvent::AuthFailed { .. } => {
                None
            }
        }
    }

    pub fn account_id(&self) -> Option<&str> {
        match self {
            BrokerEvent::OrderPlaced(o) | BrokerEvent::OrderModified(o) => Some(&o.account_id),
            BrokerEvent::OrderFilled { order, .. } | BrokerEvent::OrderPartialFill { order, .. } => {
                Some(&order.account_id)
            }
            BrokerEvent::OrderCancelled { account_id, .. }
            | BrokerEvent::OrderRejected { account_id, .. }
            | BrokerEvent::OrderExpired { account_id, .. }
            | BrokerEvent::PositionClosed { account_id, .. } => Some(account_id),
            BrokerEvent::PositionOpened(p) | BrokerEvent::PositionUpdated(p) => Some(&p.account_id),
            BrokerEvent::SdkConnected | BrokerEvent::SdkDisconnected { .. } | BrokerEvent::AuthFailed { .. } => {
                None
            }
        }
    }
}

/// Classification of a correlated fill, produced by the Order Correlator
/// (§4.7) and attached to `PositionClosed` enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillKind {
    StopLoss,
    TakeProfit,
    Manual,
}

/// The canonical, enriched internal event (§4.8). One variant per event
/// kind; downstream consumers (Rule Engine, rules) match exhaustively and
/// never touch a raw `BrokerEvent` again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RiskEvent {
    OrderPlaced {
        order: Order,
        timestamp: DateTime<Utc>,
    },
    OrderFilled {
        order: Order,
        fill_price: Micros,
        timestamp: DateTime<Utc>,
    },
    OrderPartialFill {
        order: Order,
        fill_price: Micros,
        filled_qty: i64,
        timestamp: DateTime<Utc>,
    },
    OrderCancelled {
        order_id: String,
        account_id: String,
        timestamp: DateTime<Utc>,
    },
    OrderRejected {
        order_id: String,
        account_id: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },
    OrderModified {
        order: Order,
        timestamp: DateTime<Utc>,
    },
    OrderExpired {
        order_id: String,
        account_id: String,
        timestamp: DateTime<Utc>,
    },
    PositionOpened {
        position: Position,
        timestamp: DateTime<Utc>,
    },
    PositionUpdated {
        position: Position,
        timestamp: DateTime<Utc>,
    },
    PositionClosed {
        contract_id: String,
        account_id: String,
        symbol_root: String,
        side: OrderSide,
        exit_price: Option<Micros>,
        fill_kind: Option<FillKind>,
        realized_pnl: Option<Micros>,
        timestamp: DateTime<Utc>,
    },
    TradeExecuted {
        trade: crate::model::Trade,
        timestamp: DateTime<Utc>,
    },
    SdkConnected {
        timestamp: DateTime<Utc>,
    },
    SdkDisconnected {
        reason: String,
        timestamp: DateTime<Utc>,
    },
    AuthFailed {
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl RiskEvent {
    pub fn account_id(&self) -> Option<&str> {
        match self {
            RiskEvent::OrderPlaced { order, .. }
            | RiskEvent::OrderFilled { order, .. }
            | RiskEvent::OrderPartialFill { order, .. }
            | RiskEvent::OrderModified { order, .. } => Some(&order.account_id),
            RiskEvent::OrderCancelled { account_id, .. }
            | RiskEvent::OrderRejected { account_id, .. }
            | RiskEvent::OrderExpired { account_id, .. }
            | RiskEvent::PositionClosed { account_id, .. } => Some(account_id),
            RiskEvent::PositionOpened { position, .. } | RiskEvent::PositionUpdated { position, .. } => {
                Some(&position.account_id)
            }
            RiskEvent::TradeExecuted { trade, .. } => Some(&trade.account_id),
            RiskEvent::SdkConnected { .. }
            | RiskEvent::SdkDisconnected { .. }
            | RiskEvent::AuthFailed { .. } => None,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            RiskEvent::OrderPlaced { timestamp, .. }
            | RiskEvent::OrderFilled { timestamp, .. }
            | RiskEvent::OrderPartialFill { timestamp, .. }
            | RiskEvent::OrderCancelled { timestamp, .. }
            | RiskEvent::OrderRejected { timestamp, .. }
            | RiskEvent::OrderModified { timestamp, .. }
            | RiskEvent::OrderExpired { timestamp, .. }
            | RiskEvent::PositionOpened { timestamp, .. }
            | RiskEvent::PositionUpdated { timestamp, .. }
            | RiskEvent::PositionClosed { timestamp, .. }
            | RiskEvent::TradeExecuted { timestamp, .. }
            | RiskEvent::SdkConnected { timestamp }
            | RiskEvent::SdkDisconnected { timestamp, .. }
            | RiskEvent::AuthFailed { timestamp, .. } => *timestamp,
        }
    }
}
