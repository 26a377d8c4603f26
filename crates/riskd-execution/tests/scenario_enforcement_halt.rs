//! Scenario: an operator halt takes effect immediately and blocks every
//! subsequent enforcement dispatch, regardless of which violation triggered
//! it — mirrors the CLI `halt` command stopping execution end to end.

use riskd_core::{ActionKind, Violation};
use riskd_execution::{
    AdjustTrailingStopRequest, BrokerAck, BrokerAdapter, CancelOrderRequest, CloseAllRequest,
    ClosePositionRequest, EnforcementExecutor, PlaceBracketOrderRequest, PlaceStopLossRequest,
    PlaceTakeProfitRequest,
};

struct FakeBroker;

impl BrokerAdapter for FakeBroker {
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

fn violation(action: ActionKind, account_id: &str) -> Violation {
    Violation {
        rule: "009_session_block_outside",
        account_id: account_id.to_string(),
        symbol: Some("MNQ".into()),
        contract_id: Some("CON.MNQ.1".into()),
        action,
        lockout_required: true,
        cooldown_duration: None,
        next_unlock: None,
        message: "outside session".into(),
        order_directive: None,
    }
}

#[test]
fn halt_blocks_all_pending_enforcement_across_accounts() {
    let mut executor = EnforcementExecutor::new(FakeBroker);

    let before = executor.dispatch_all(&[violation(ActionKind::CloseAll, "ACC-1")]);
    assert!(before[0].success);

    executor.halt();
    assert!(!executor.is_armed());

    let violations = vec![
        violation(ActionKind::CloseAll, "ACC-1"),
        violation(ActionKind::CloseAll, "ACC-2"),
    ];
    let outcomes = executor.dispatch_all(&violations);
    assert!(outcomes.iter().all(|o| !o.success));
    assert!(outcomes.iter().all(|o| o.error.as_deref() == Some("GATE_REFUSED: execution is halted")));
}

#[test]
fn re_arming_after_halt_resumes_enforcement() {
    let mut executor = EnforcementExecutor::new(FakeBroker);
    executor.halt();
    executor.arm();

    let outcomes = executor.dispatch_all(&[violation(ActionKind::CloseAll, "ACC-1")]);
    assert!(outcomes[0].success);
}
