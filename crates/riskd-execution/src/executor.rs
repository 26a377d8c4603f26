//! Enforcement Executor (§4.12): translates `riskd_core::Violation` /
//! `OrderDirective` values into broker calls through the gateway.
//!
//! This is the only component that mutates broker state — every other
//! component reaches the broker only by producing a `Violation` the executor
//! consumes. A failed broker call is logged at ERROR and reported back as
//! `EnforcementOutcome::failure`; it never panics and never stops the
//! executor from processing the next violation (fail-loud, not fail-crash).

use riskd_core::{ActionKind, OrderDirective, Violation};

use crate::gateway::BrokerGateway;
use crate::order_router::BrokerAdapter;
use crate::types::{
    AdjustTrailingStopRequest, CancelOrderRequest, CloseAllRequest, ClosePositionRequest,
    PlaceBracketOrderRequest, PlaceStopLossRequest, PlaceTakeProfitRequest,
};

#[derive(Debug, Clone)]
pub struct EnforcementOutcome {
    pub rule: &'static str,
    pub action: ActionKind,
    pub success: bool,
    pub error: Option<String>,
}

impl EnforcementOutcome {
    fn ok(rule: &'static str, action: ActionKind) -> Self {
        Self { rule, action, success: true, error: None }
    }

    fn failed(rule: &'static str, action: ActionKind, error: impl std::fmt::Display) -> Self {
        Self { rule, action, success: false, error: Some(error.to_string()) }
    }
}

/// Rule 012 tracks a stop order's id directly off the `OrderPlaced` event the
/// broker sends back, so `AdjustTrailingStop.order_id` already is the
/// broker's own id by the time it reaches here — no internal→broker mapping
/// is needed on this path.
pub struct EnforcementExecutor<B: BrokerAdapter> {
    gateway: BrokerGateway<B>,
}

impl<B: BrokerAdapter> EnforcementExecutor<B> {
    pub fn new(broker: B) -> Self {
        Self { gateway: BrokerGateway::new(broker) }
    }

    pub fn halt(&mut self) {
        self.gateway.halt();
    }

    pub fn arm(&mut self) {
        self.gateway.arm();
    }

    pub fn is_armed(&self) -> bool {
        self.gateway.is_armed()
    }

    /// Dispatch every violation in a rule engine's output, in order. A
    /// close-all for an account subsumes any close-position for the same
    /// account dispatched earlier in the same batch — §4.10's "deduplication
    /// of enforcement is the Enforcement Executor's job."
    pub fn dispatch_all(&mut self, violations: &[Violation]) -> Vec<EnforcementOutcome> {
        let accounts_closed_all: std::collections::HashSet<&str> = violations
            .iter()
            .filter(|v| v.action == ActionKind::CloseAll)
            .map(|v| v.account_id.as_str())
            .collect();

        let mut outcomes = Vec::with_capacity(violations.len());
        for violation in violations {
            if violation.action == ActionKind::ClosePosition
                && accounts_closed_all.contains(violation.account_id.as_str())
            {
                continue;
            }
            outcomes.push(self.dispatch(violation));
        }
        outcomes
    }

    fn dispatch(&mut self, violation: &Violation) -> EnforcementOutcome {
        match violation.action {
            ActionKind::ClosePosition => self.close_position(violation),
            ActionKind::CloseAll | ActionKind::Flatten => self.close_all(violation),
            ActionKind::CancelOrder => self.cancel_order(violation),
            ActionKind::Cooldown | ActionKind::AlertOnly => {
                // No broker call: cooldown is enforced entirely by the
                // Lockout Manager; alerts carry no enforcement.
                EnforcementOutcome::ok(violation.rule, violation.action)
            }
            ActionKind::PlaceStopLoss
            | ActionKind::PlaceTakeProfit
            | ActionKind::PlaceBracketOrder
            | ActionKind::AdjustTrailingStop => self.dispatch_order_directive(violation),
        }
    }

    fn close_position(&mut self, violation: &Violation) -> EnforcementOutcome {
        let Some(contract_id) = violation.contract_id.clone() else {
            return EnforcementOutcome::failed(
                violation.rule,
                violation.action,
                "close_position violation carried no contract_id",
            );
        };
        match self.gateway.close_position(ClosePositionRequest { contract_id }) {
            Ok(_) => EnforcementOutcome::ok(violation.rule, violation.action),
            Err(e) => {
                tracing::error!(rule = violation.rule, error = %e, "close_position failed");
                EnforcementOutcome::failed(violation.rule, violation.action, e)
            }
        }
    }

    fn close_all(&mut self, violation: &Violation) -> EnforcementOutcome {
        match self.gateway.close_all(CloseAllRequest { account_id: violation.account_id.clone() }) {
            Ok(_) => EnforcementOutcome::ok(violation.rule, violation.action),
            Err(e) => {
                tracing::error!(rule = violation.rule, error = %e, "close_all failed");
                EnforcementOutcome::failed(violation.rule, violation.action, e)
            }
        }
    }

    fn cancel_order(&mut self, violation: &Violation) -> EnforcementOutcome {
        let Some(order_id) = violation.contract_id.clone() else {
            return EnforcementOutcome::failed(
                violation.rule,
                violation.action,
                "cancel_order violation carried no order_id",
            );
        };
        match self.gateway.cancel_order(CancelOrderRequest { order_id }) {
            Ok(_) => EnforcementOutcome::ok(violation.rule, violation.action),
            Err(e) => {
                tracing::error!(rule = violation.rule, error = %e, "cancel_order failed");
                EnforcementOutcome::failed(violation.rule, violation.action, e)
            }
        }
    }

    fn dispatch_order_directive(&mut self, violation: &Violation) -> EnforcementOutcome {
        let Some(directive) = violation.order_directive.clone() else {
            return EnforcementOutcome::failed(
                violation.rule,
                violation.action,
                "automation violation carried no order_directive",
            );
        };
        let result = match directive {
            OrderDirective::PlaceStopLoss { contract_id, price, side, size } => {
                self.gateway.place_stop_loss(PlaceStopLossRequest { contract_id, price, side, size })
            }
            OrderDirective::PlaceTakeProfit { contract_id, price, side, size } => {
                self.gateway.place_take_profit(PlaceTakeProfitRequest { contract_id, price, side, size })
            }
            OrderDirective::PlaceBracketOrder { contract_id, stop_price, target_price, side, size } => {
                self.gateway.place_bracket_order(PlaceBracketOrderRequest {
                    contract_id,
                    stop_price,
                    target_price,
                    side,
                    size,
                })
            }
            OrderDirective::AdjustTrailingStop { order_id, new_price } => {
                self.gateway.adjust_trailing_stop(AdjustTrailingStopRequest { order_id, new_price })
            }
        };

        match result {
            Ok(_) => EnforcementOutcome::ok(violation.rule, violation.action),
            Err(e) => {
                tracing::error!(rule = violation.rule, error = %e, "order directive failed");
                EnforcementOutcome::failed(violation.rule, violation.action, e)
            }
        }
    }
}
