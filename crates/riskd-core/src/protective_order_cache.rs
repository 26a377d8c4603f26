//! Protective-Order Cache (§4.6): per-contract stop-loss/take-profit order
//! state with a TTL, so the Event Router doesn't need to query the broker
//! SDK's position/order state on every event.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use riskd_schemas::model::Order;

const DEFAULT_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Default)]
pub struct ProtectiveOrders {
    pub stop_loss_order: Option<Order>,
    pub take_profit_order: Option<Order>,
}

struct CacheEntry {
    orders: ProtectiveOrders,
    cached_at: DateTime<Utc>,
}

pub struct ProtectiveOrderCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl Default for ProtectiveOrderCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ProtectiveOrderCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: HashMap::new() }
    }

    fn is_stale(&self, contract_id: &str, now: DateTime<Utc>) -> bool {
        match self.entries.get(contract_id) {
            None => true,
            Some(e) => now.signed_duration_since(e.cached_at).to_std().map(|age| age >= self.ttl).unwrap_or(true),
        }
    }

    /// Returns the cached entry if fresh; otherwise calls `refresh` (an SDK
    /// position/order query supplied by the caller) and stores the result.
    pub fn get(
        &mut self,
        contract_id: &str,
        now: DateTime<Utc>,
        refresh: impl FnOnce() -> ProtectiveOrders,
    ) -> ProtectiveOrders {
        if self.is_stale(contract_id, now) {
            let orders = refresh();
            self.entries.insert(contract_id.to_string(), CacheEntry { orders: orders.clone(), cached_at: now });
            orders
        } else {
            self.entries[contract_id].orders.clone()
        }
    }

    pub fn invalidate(&mut self, contract_id: &str) {
        self.entries.remove(contract_id);
    }

    pub fn invalidate_for_order(&mut self, order_id: &str) {
        self.entries.retain(|_, e| {
            e.orders.stop_loss_order.as_ref().map(|o| o.order_id.as_str()) != Some(order_id)
                && e.orders.take_profit_order.as_ref().map(|o| o.order_id.as_str()) != Some(order_id)
        });
    }

    /// §4.6: update from a freshly observed `order_placed` event, without
    /// waiting for the next stale-triggered refresh — this is how a silently
    /// placed stop is detected even while the cache entry is still "fresh".
    pub fn update_from_order_placed(&mut self, contract_id: &str, order: Order, now: DateTime<Utc>) {
        let entry = self.entries.entry(contract_id.to_string()).or_insert_with(|| CacheEntry {
            orders: ProtectiveOrders::default(),
            cached_at: now,
        });
        if order.is_stop_loss() {
            entry.orders.stop_loss_order = Some(order);
        } else if order.order_type == riskd_schemas::model::OrderType::Limit {
            entry.orders.take_profit_order = Some(order);
        }
        entry.cached_at = now;
    }

    pub fn remove_stop_loss(&mut self, contract_id: &str) {
        if let Some(e) = self.entries.get_mut(contract_id) {
            e.orders.stop_loss_order = None;
        }
    }

    pub fn remove_take_profit(&mut self, contract_id: &str) {
        if let Some(e) = self.entries.get_mut(contract_id) {
            e.orders.take_profit_order = None;
        }
    }
}
