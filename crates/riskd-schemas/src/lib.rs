//! riskd-schemas
//!
//! Canonical data model and event types shared across the risk-enforcement
//! engine: the fixed-point money representation (`Micros`), the
//! Position/Order/Trade/Lockout/DailyPnl entities (§3), and the tagged
//! `RiskEvent`/`BrokerEvent` sum types the Event Router consumes and
//! publishes (§4.8).
//!
//! No IO, no time source, no broker calls — this crate holds only the
//! canonical structured values everything downstream depends on.

pub mod events;
pub mod model;
pub mod money;

pub use events::{BrokerEvent, FillKind, RiskEvent};
pub use model::{
    DailyPnl, Lockout, Order, OrderSide, OrderStatus, OrderType, Position, SymbolSpec, Trade,
    UnknownSymbolPolicy, UnlockCondition,
};
pub use money::Micros;
