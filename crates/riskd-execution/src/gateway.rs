//! Broker Gateway — the SINGLE choke-point for all broker mutations.
//!
//! # Invariant
//!
//! `OrderRouter` is `pub(crate)` and never re-exported from `lib.rs`. There is
//! no way to construct one, or reach a `BrokerAdapter`, from outside this
//! crate. The only public surface that reaches a broker adapter is
//! `BrokerGateway`, and `BrokerGateway` itself only dispatches when armed.
//!
//! A `halt` (the CLI command, or the Runtime Supervisor reacting to a fatal
//! post-condition at startup) clears the armed flag; nothing reaches the
//! broker while it's clear. This is the fail-closed boundary named in §4.12:
//! "the Enforcement Executor is the only component that mutates broker
//! state."

use crate::order_router::{BrokerAdapter, OrderRouter};
use crate::types::{
    AdjustTrailingStopRequest, BrokerAck, CancelOrderRequest, CloseAllRequest,
    ClosePositionRequest, PlaceBracketOrderRequest, PlaceStopLossRequest, PlaceTakeProfitRequest,
};

/// Reason a broker operation was refused at the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRefusal {
    Halted,
}

impl std::fmt::Display for GateRefusal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateRefusal::Halted => write!(f, "GATE_REFUSED: execution is halted"),
        }
    }
}

impl std::error::Error for GateRefusal {}

/// The SINGLE choke-point through which all broker operations flow.
///
/// Owns a **private** `OrderRouter<B>`. Because `OrderRouter` is
/// `pub(crate)`, nothing outside this crate can construct or reach one
/// directly — the only way in is through the public methods here, all of
/// which check the armed flag first.
pub struct BrokerGateway<B: BrokerAdapter> {
    router: OrderRouter<B>,
    armed: bool,
}

impl<B: BrokerAdapter> BrokerGateway<B> {
    /// Create a gateway wrapping the given broker adapter, armed by default.
    pub fn new(broker: B) -> Self {
        Self { router: OrderRouter::new(broker), armed: true }
    }

    /// Disarm the gateway. Every subsequent call refuses with
    /// `GateRefusal::Halted` until `arm` is called again.
    pub fn halt(&mut self) {
        self.armed = false;
    }

    /// Re-arm the gateway after a `halt`.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    fn enforce_gate(&self) -> Result<(), GateRefusal> {
        if !self.armed {
            return Err(GateRefusal::Halted);
        }
        Ok(())
    }

    pub fn close_position(
        &self,
        req: ClosePositionRequest,
    ) -> Result<BrokerAck, Box<dyn std::error::Error>> {
        self.enforce_gate()?;
        self.router.route_close_position(req)
    }

    pub fn close_all(&self, req: CloseAllRequest) -> Result<BrokerAck, Box<dyn std::error::Error>> {
        self.enforce_gate()?;
        self.router.route_close_all(req)
    }

    pub fn cancel_order(
        &self,
        req: CancelOrderRequest,
    ) -> Result<BrokerAck, Box<dyn std::error::Error>> {
        self.enforce_gate()?;
        self.router.route_cancel_order(req)
    }

    pub fn place_stop_loss(
        &self,
        req: PlaceStopLossRequest,
    ) -> Result<BrokerAck, Box<dyn std::error::Error>> {
        self.enforce_gate()?;
        self.router.route_place_stop_loss(req)
    }

    pub fn place_take_profit(
        &self,
        req: PlaceTakeProfitRequest,
    ) -> Result<BrokerAck, Box<dyn std::error::Error>> {
        self.enforce_gate()?;
        self.router.route_place_take_profit(req)
    }

    pub fn place_bracket_order(
        &self,
        req: PlaceBracketOrderRequest,
    ) -> Result<BrokerAck, Box<dyn std::error::Error>> {
        self.enforce_gate()?;
        self.router.route_place_bracket_order(req)
    }

    pub fn adjust_trailing_stop(
        &self,
        req: AdjustTrailingStopRequest,
    ) -> Result<BrokerAck, Box<dyn std::error::Error>> {
        self.enforce_gate()?;
        self.router.route_adjust_trailing_stop(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;

    struct AlwaysOkBroker;

    impl BrokerAdapter for AlwaysOkBroker {
        fn close_position(&self, _req: ClosePositionRequest) -> Result<BrokerAck, Box<dyn std::error::Error>> {
            Ok(BrokerAck { order_id: None, acked_at: 1 })
        }
        fn close_all(&self, _req: CloseAllRequest) -> Result<BrokerAck, Box<dyn std::error::Error>> {
            Ok(BrokerAck { order_id: None, acked_at: 1 })
        }
        fn cancel_order(&self, _req: CancelOrderRequest) -> Result<BrokerAck, Box<dyn std::error::Error>> {
            Ok(BrokerAck { order_id: None, acked_at: 1 })
        }
        fn place_stop_loss(&self, _req: PlaceStopLossRequest) -> Result<BrokerAck, Box<dyn std::error::Error>> {
            Ok(BrokerAck { order_id: Some("s-1".into()), acked_at: 1 })
        }
        fn place_take_profit(&self, _req: PlaceTakeProfitRequest) -> Result<BrokerAck, Box<dyn std::error::Error>> {
            Ok(BrokerAck { order_id: Some("t-1".into()), acked_at: 1 })
        }
        fn place_bracket_order(&self, _req: PlaceBracketOrderRequest) -> Result<BrokerAck, Box<dyn std::error::Error>> {
            Ok(BrokerAck { order_id: Some("b-1".into()), acked_at: 1 })
        }
        fn adjust_trailing_stop(&self, req: AdjustTrailingStopRequest) -> Result<BrokerAck, Box<dyn std::error::Error>> {
            Ok(BrokerAck { order_id: Some(req.order_id), acked_at: 1 })
        }
    }

    #[test]
    fn armed_gateway_dispatches() {
        let gw = BrokerGateway::new(AlwaysOkBroker);
        let res = gw.close_position(ClosePositionRequest { contract_id: "CON.MNQ.1".into() });
        assert!(res.is_ok());
    }

    #[test]
    fn halted_gateway_refuses_every_operation() {
        let mut gw = BrokerGateway::new(AlwaysOkBroker);
        gw.halt();
        let err = gw
            .close_all(CloseAllRequest { account_id: "ACC".into() })
            .unwrap_err();
        assert!(err.to_string().contains("halted"));
    }

    #[test]
    fn re_arming_restores_dispatch() {
        let mut gw = BrokerGateway::new(AlwaysOkBroker);
        gw.halt();
        gw.arm();
        let res = gw.cancel_order(CancelOrderRequest { order_id: "ord-1".into() });
        assert!(res.is_ok());
    }
}
