//! Broker-agnostic request/response types for the enforcement boundary.
//!
//! Mirrors §4.12: every SDK call the Enforcement Executor makes is expressed
//! here as a plain struct, independent of whatever wire format the live SDK
//! or a simulated broker happens to use.

use riskd_schemas::model::OrderSide;
use riskd_schemas::money::Micros;

#[derive(Debug, Clone)]
pub struct ClosePositionRequest {
    pub contract_id: String,
}

#[derive(Debug, Clone)]
pub struct CloseAllRequest {
    pub account_id: String,
}

#[derive(Debug, Clone)]
pub struct CancelOrderRequest {
    pub order_id: String,
}

#[derive(Debug, Clone)]
pub struct PlaceStopLossRequest {
    pub contract_id: String,
    pub price: Micros,
    pub side: OrderSide,
    pub size: i64,
}

#[derive(Debug, Clone)]
pub struct PlaceTakeProfitRequest {
    pub contract_id: String,
    pub price: Micros,
    pub side: OrderSide,
    pub size: i64,
}

#[derive(Debug, Clone)]
pub struct PlaceBracketOrderRequest {
    pub contract_id: String,
    pub stop_price: Micros,
    pub target_price: Micros,
    pub side: OrderSide,
    pub size: i64,
}

#[derive(Debug, Clone)]
pub struct AdjustTrailingStopRequest {
    pub order_id: String,
    pub new_price: Micros,
}

/// A broker acknowledgment. `order_id` is present for calls that create or
/// touch a single order (stop/take-profit/bracket placements, trailing-stop
/// adjustment); absent for account-wide closes and cancellations.
#[derive(Debug, Clone)]
pub struct BrokerAck {
    pub order_id: Option<String>,
    pub acked_at: i64,
}
