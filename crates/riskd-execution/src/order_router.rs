//! Order Router: deterministic boundary between the Enforcement Executor and
//! broker adapters.
//!
//! # Purpose
//! Defines the thin boundary through which every broker mutation must pass.
//! It isolates the executor from broker-specific wiring so a live SDK adapter
//! and a simulated paper broker satisfy the exact same contract.
//!
//! # Why it stays thin
//! The router performs no risk logic and no retries — it only forwards a
//! broker-agnostic request to whichever `BrokerAdapter` was injected. All
//! enforcement-action derivation (which request to build, from which
//! violation) belongs to `executor`, not here.

use crate::types::{
    AdjustTrailingStopRequest, BrokerAck, CancelOrderRequest, CloseAllRequest,
    ClosePositionRequest, PlaceBracketOrderRequest, PlaceStopLossRequest, PlaceTakeProfitRequest,
};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Trait every broker adapter must implement (§4.12).
///
/// Implementations handle the actual communication with broker systems
/// (SDK calls, REST, or an in-memory simulation) while remaining opaque to
/// the router and executor.
pub trait BrokerAdapter {
    fn close_position(&self, req: ClosePositionRequest) -> Result<BrokerAck>;
    fn close_all(&self, req: CloseAllRequest) -> Result<BrokerAck>;
    fn cancel_order(&self, req: CancelOrderRequest) -> Result<BrokerAck>;
    fn place_stop_loss(&self, req: PlaceStopLossRequest) -> Result<BrokerAck>;
    fn place_take_profit(&self, req: PlaceTakeProfitRequest) -> Result<BrokerAck>;
    fn place_bracket_order(&self, req: PlaceBracketOrderRequest) -> Result<BrokerAck>;
    fn adjust_trailing_stop(&self, req: AdjustTrailingStopRequest) -> Result<BrokerAck>;
}

/// Deterministic router that delegates to a broker adapter without adding
/// any policy of its own. `pub(crate)`: the only way external code reaches
/// a broker adapter is through `BrokerGateway`.
pub(crate) struct OrderRouter<B: BrokerAdapter> {
    broker: B,
}

impl<B: BrokerAdapter> OrderRouter<B> {
    pub(crate) fn new(broker: B) -> Self {
        Self { broker }
    }

    pub(crate) fn route_close_position(&self, req: ClosePositionRequest) -> Result<BrokerAck> {
        self.broker.close_position(req)
    }

    pub(crate) fn route_close_all(&self, req: CloseAllRequest) -> Result<BrokerAck> {
        self.broker.close_all(req)
    }

    pub(crate) fn route_cancel_order(&self, req: CancelOrderRequest) -> Result<BrokerAck> {
        self.broker.cancel_order(req)
    }

    pub(crate) fn route_place_stop_loss(&self, req: PlaceStopLossRequest) -> Result<BrokerAck> {
        self.broker.place_stop_loss(req)
    }

    pub(crate) fn route_place_take_profit(&self, req: PlaceTakeProfitRequest) -> Result<BrokerAck> {
        self.broker.place_take_profit(req)
    }

    pub(crate) fn route_place_bracket_order(
        &self,
        req: PlaceBracketOrderRequest,
    ) -> Result<BrokerAck> {
        self.broker.place_bracket_order(req)
    }

    pub(crate) fn route_adjust_trailing_stop(
        &self,
        req: AdjustTrailingStopRequest,
    ) -> Result<BrokerAck> {
        self.broker.adjust_trailing_stop(req)
    }
}
