//! Order Correlator (§4.7): short-lived `contract_id -> fill` cache,
//! populated on `order_filled` and consulted on `position_closed` to
//! classify the close (stop/take-profit/manual) and obtain the exit price —
//! position-closed events carry `avg_entry_price`, never the exit price.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use riskd_schemas::events::FillKind;
use riskd_schemas::money::Micros;
use riskd_schemas::model::{OrderSide, OrderType};

const DEFAULT_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct CorrelatedFill {
    pub fill_kind: FillKind,
    pub fill_price: Micros,
    pub side: OrderSide,
    pub order_id: String,
    pub recorded_at: DateTime<Utc>,
}

pub struct OrderCorrelator {
    ttl: Duration,
    fills: HashMap<String, CorrelatedFill>,
}

impl Default for OrderCorrelator {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl OrderCorrelator {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, fills: HashMap::new() }
    }

    fn classify(order_type: OrderType, has_stop_price: bool) -> FillKind {
        if order_type.is_stop_family() && has_stop_price {
            FillKind::StopLoss
        } else if order_type == OrderType::Limit {
            FillKind::TakeProfit
        } else {
            FillKind::Manual
        }
    }

    pub fn record_fill(
        &mut self,
        contract_id: &str,
        order_id: &str,
        order_type: OrderType,
        has_stop_price: bool,
        side: OrderSide,
        fill_price: Micros,
        now: DateTime<Utc>,
    ) {
        self.fills.insert(
            contract_id.to_string(),
            CorrelatedFill {
                fill_kind: Self::classify(order_type, has_stop_price),
                fill_price,
                side,
                order_id: order_id.to_string(),
                recorded_at: now,
            },
        );
    }

    /// Consulted on `position_closed`; returns `None` if no fill was
    /// correlated within the TTL (caller then has no exit price and no
    /// classification — it falls back to treating the close as manual with
    /// an unknown exit price).
    pub fn take(&mut self, contract_id: &str, now: DateTime<Utc>) -> Option<CorrelatedFill> {
        self.sweep(now);
        self.fills.remove(contract_id)
    }

    fn sweep(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.fills
            .retain(|_, f| now.signed_duration_since(f.recorded_at).to_std().map(|age| age < ttl).unwrap_or(true));
    }
}
