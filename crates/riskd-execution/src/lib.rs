//! riskd-execution
//!
//! The Enforcement Executor (§4.12): the only component that mutates broker
//! state. Every other component reaches the broker only by producing a
//! `riskd_core::Violation`, which this crate translates into a broker call
//! through a single gated choke-point (`BrokerGateway`).

mod executor;
mod gateway;
pub mod id_map;
mod order_router;
mod prices;
mod types;

pub use executor::{EnforcementExecutor, EnforcementOutcome};
pub use gateway::{BrokerGateway, GateRefusal};
pub use id_map::BrokerOrderMap;
pub use order_router::BrokerAdapter;
pub use prices::{micros_to_price, price_to_micros, PricingError};
pub use types::{
    AdjustTrailingStopRequest, BrokerAck, CancelOrderRequest, CloseAllRequest,
    ClosePositionRequest, PlaceBracketOrderRequest, PlaceStopLossRequest, PlaceTakeProfitRequest,
};
