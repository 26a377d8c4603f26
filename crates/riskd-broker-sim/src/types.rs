use riskd_schemas::model::OrderSide;
use riskd_schemas::money::Micros;

/// An order the paper broker is holding, keyed by its own generated id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimOrder {
    pub order_id: String,
    pub contract_id: String,
    pub side: OrderSide,
    pub size: i64,
    pub price: Micros,
    pub status: SimOrderStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimOrderStatus {
    Working,
    Cancelled,
}
