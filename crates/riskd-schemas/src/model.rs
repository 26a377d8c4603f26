//! Canonical Position/Order/Trade/Lockout/DailyPnl entities (§3).
//!
//! These are the structured values the Event Router produces once at its
//! boundary; nothing downstream touches a raw broker payload again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Micros;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    Limit,
    Stop,
    StopLimit,
    TrailingStop,
}

impl OrderType {
    /// An order is a stop-loss iff its type is one of these AND it carries a
    /// stop price (§3, §4.11 rule 008 detail). Type alone is not sufficient.
    pub fn is_stop_family(self) -> bool {
        matches!(self, OrderType::Stop | OrderType::StopLimit | OrderType::TrailingStop)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Working,
    Filled,
    Cancelled,
    Rejected,
    Expired,
    Modified,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub contract_id: String,
    pub account_id: String,
    pub order_type: OrderType,
    pub side: OrderSide,
    pub size: i64,
    pub stop_price: Option<Micros>,
    pub limit_price: Option<Micros>,
    pub status: OrderStatus,
    pub placed_at: DateTime<Utc>,
}

impl Order {
    /// §3: stop-loss classification, §4.11 rule 008: type alone never
    /// qualifies — `stop_price` must also be present.
    pub fn is_stop_loss(&self) -> bool {
        self.order_type.is_stop_family() && self.stop_price.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub contract_id: String,
    pub symbol_root: String,
    pub account_id: String,
    /// Signed: sign is side, magnitude is contract count. Zero means the
    /// position is absent from the live map (§3 invariant).
    pub size: i64,
    pub avg_entry_price: Micros,
    pub opened_at: DateTime<Utc>,
}

impl Position {
    pub fn side_sign(&self) -> i64 {
        self.size.signum()
    }

    pub fn is_long(&self) -> bool {
        self.size > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: String,
    pub account_id: String,
    pub contract_id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: i64,
    pub price: Micros,
    /// Present only for closing fills (§3).
    pub realized_pnl: Option<Micros>,
    pub timestamp: DateTime<Utc>,
}

/// How a lockout's `expires_at` was derived — carried alongside the row so
/// the Lockout Manager can recompute it if config-driven schedule offsets
/// change between restarts (§4.2/§4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UnlockCondition {
    UntilDailyReset,
    UntilSessionStart,
    Permanent,
    AfterDuration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lockout {
    pub account_id: String,
    pub rule_id: String,
    pub reason: String,
    pub locked_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub unlock_condition: UnlockCondition,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyPnl {
    pub account_id: String,
    pub trading_day: chrono::NaiveDate,
    pub realized_total: Micros,
    pub updated_at: DateTime<Utc>,
}

/// Per-symbol tick metadata from config (§3 Configuration, §4.5).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SymbolSpec {
    pub tick_size: Micros,
    pub tick_value: Micros,
}

/// §4.11 rule 002: unknown-symbol policy. Malformed `allow_with_limit:`
/// values degrade to `Block` (see DESIGN.md Open Question 1) — representing
/// the parsed policy as a structured enum means that degradation happens
/// once, at config-load, not at every rule-evaluation call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownSymbolPolicy {
    Block,
    AllowWithLimit(u32),
    AllowUnlimited,
}

impl Serialize for UnknownSymbolPolicy {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            UnknownSymbolPolicy::Block => serializer.serialize_str("block"),
            UnknownSymbolPolicy::AllowUnlimited => serializer.serialize_str("allow_unlimited"),
            UnknownSymbolPolicy::AllowWithLimit(n) => {
                serializer.serialize_str(&format!("allow_with_limit:{n}"))
            }
        }
    }
}

impl<'de> Deserialize<'de> for UnknownSymbolPolicy {
    /// Config wire format is `"block"` / `"allow_unlimited"` / `"allow_with_limit:N"`.
    /// A malformed `allow_with_limit:` value (missing or non-numeric suffix)
    /// degrades to `Block` rather than failing config load.
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "allow_unlimited" => UnknownSymbolPolicy::AllowUnlimited,
            "block" => UnknownSymbolPolicy::Block,
            other => match other.strip_prefix("allow_with_limit:") {
                Some(n) => n.trim().parse().map(UnknownSymbolPolicy::AllowWithLimit).unwrap_or(UnknownSymbolPolicy::Block),
                None => UnknownSymbolPolicy::Block,
            },
        })
    }
}
