//! Deterministic in-memory "paper" broker adapter.
//!
//! Implements `riskd_execution::BrokerAdapter` against plain in-memory maps,
//! for the Runtime Supervisor's dry-run mode and for scenario tests that
//! need to observe exactly what the Enforcement Executor sent without
//! talking to a live SDK.
//!
//! Design decisions (kept intentionally simple/deterministic):
//! - Generated order ids are `"SIM-{n}"`, a monotonic counter — no
//!   randomness, no timestamps.
//! - `close_position`/`close_all` don't fabricate fills; they only record
//!   that the call was made (`positions`/`closed_accounts`), for assertions
//!   in tests. A scenario that needs a filled-quantity view should layer
//!   that on top rather than this adapter guessing at fill prices.

use std::cell::RefCell;
use std::collections::BTreeMap;

use riskd_execution::{
    AdjustTrailingStopRequest, BrokerAck, BrokerAdapter, CancelOrderRequest, CloseAllRequest,
    ClosePositionRequest, PlaceBracketOrderRequest, PlaceStopLossRequest, PlaceTakeProfitRequest,
};

pub mod types;

use types::{SimOrder, SimOrderStatus};

#[derive(Default)]
pub struct PaperBroker {
    orders: RefCell<BTreeMap<String, SimOrder>>,
    closed_positions: RefCell<Vec<String>>,
    closed_accounts: RefCell<Vec<String>>,
    cancelled_orders: RefCell<Vec<String>>,
    next_id: RefCell<u64>,
}

impl PaperBroker {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_order_id(&self) -> String {
        let mut n = self.next_id.borrow_mut();
        *n += 1;
        format!("SIM-{n}")
    }

    /// Deterministic listing: `BTreeMap` iteration order is stable.
    pub fn open_orders(&self) -> Vec<SimOrder> {
        self.orders
            .borrow()
            .values()
            .filter(|o| o.status == SimOrderStatus::Working)
            .cloned()
            .collect()
    }

    pub fn closed_position_contract_ids(&self) -> Vec<String> {
        self.closed_positions.borrow().clone()
    }

    pub fn closed_accounts(&self) -> Vec<String> {
        self.closed_accounts.borrow().clone()
    }

    pub fn cancelled_order_ids(&self) -> Vec<String> {
        self.cancelled_orders.borrow().clone()
    }
}

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

impl BrokerAdapter for PaperBroker {
    fn close_position(&self, req: ClosePositionRequest) -> Result<BrokerAck> {
        self.closed_positions.borrow_mut().push(req.contract_id);
        Ok(BrokerAck { order_id: None, acked_at: 0 })
    }

    fn close_all(&self, req: CloseAllRequest) -> Result<BrokerAck> {
        self.closed_accounts.borrow_mut().push(req.account_id);
        Ok(BrokerAck { order_id: None, acked_at: 0 })
    }

    fn cancel_order(&self, req: CancelOrderRequest) -> Result<BrokerAck> {
        if let Some(ord) = self.orders.borrow_mut().get_mut(&req.order_id) {
            ord.status = SimOrderStatus::Cancelled;
        }
        self.cancelled_orders.borrow_mut().push(req.order_id);
        Ok(BrokerAck { order_id: None, acked_at: 0 })
    }

    fn place_stop_loss(&self, req: PlaceStopLossRequest) -> Result<BrokerAck> {
        let order_id = self.next_order_id();
        self.orders.borrow_mut().insert(
            order_id.clone(),
            SimOrder {
                order_id: order_id.clone(),
                contract_id: req.contract_id,
                side: req.side,
                size: req.size,
                price: req.price,
                status: SimOrderStatus::Working,
            },
        );
        Ok(BrokerAck { order_id: Some(order_id), acked_at: 0 })
    }

    fn place_take_profit(&self, req: PlaceTakeProfitRequest) -> Result<BrokerAck> {
        let order_id = self.next_order_id();
        self.orders.borrow_mut().insert(
            order_id.clone(),
            SimOrder {
                order_id: order_id.clone(),
                contract_id: req.contract_id,
                side: req.side,
                size: req.size,
                price: req.price,
                status: SimOrderStatus::Working,
            },
        );
        Ok(BrokerAck { order_id: Some(order_id), acked_at: 0 })
    }

    fn place_bracket_order(&self, req: PlaceBracketOrderRequest) -> Result<BrokerAck> {
        let order_id = self.next_order_id();
        self.orders.borrow_mut().insert(
            order_id.clone(),
            SimOrder {
                order_id: order_id.clone(),
                contract_id: req.contract_id,
                side: req.side,
                size: req.size,
                price: req.stop_price,
                status: SimOrderStatus::Working,
            },
        );
        Ok(BrokerAck { order_id: Some(order_id), acked_at: 0 })
    }

    fn adjust_trailing_stop(&self, req: AdjustTrailingStopRequest) -> Result<BrokerAck> {
        if let Some(ord) = self.orders.borrow_mut().get_mut(&req.order_id) {
            ord.price = req.new_price;
        }
        Ok(BrokerAck { order_id: Some(req.order_id), acked_at: 0 })
    }
}
