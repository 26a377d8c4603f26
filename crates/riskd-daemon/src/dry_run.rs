//! Scripted event generator for dry-run mode (§4.13 "replays a scripted or
//! generated event sequence through the same pipeline against a simulated
//! broker, for local development and scenario tests, without live market
//! connectivity").
//!
//! No randomness, no wall-clock reads: every event's timestamp is derived
//! from the supplied clock so a dry run is reproducible across invocations.

use chrono::{DateTime, Utc};

use riskd_schemas::events::BrokerEvent;
use riskd_schemas::model::{Order, OrderSide, OrderStatus, OrderType, Position};
use riskd_schemas::money::Micros;

/// A small, deterministic tour through the happy path: connect, open a
/// position, place a protective stop, then close the position. Enough to
/// exercise the Event Router, the Rule Engine, and the Enforcement Executor
/// end to end without a live broker.
pub fn scripted_sequence(account_id: &str, contract_id: &str, now: DateTime<Utc>) -> Vec<BrokerEvent> {
    let entry_price = Micros::new(20_000_000_000);
    let exit_price = Micros::new(20_050_000_000);

    vec![
        BrokerEvent::SdkConnected,
        BrokerEvent::PositionOpened(Position {
            contract_id: contract_id.to_string(),
            symbol_root: "MNQ".to_string(),
            account_id: account_id.to_string(),
            size: 1,
            avg_entry_price: entry_price,
            opened_at: now,
        }),
        BrokerEvent::OrderPlaced(Order {
            order_id: "DRYRUN-STOP-1".to_string(),
            contract_id: contract_id.to_string(),
            account_id: account_id.to_string(),
            order_type: OrderType::Stop,
            side: OrderSide::Sell,
            size: 1,
            stop_price: Some(Micros::new(19_950_000_000)),
            limit_price: None,
            status: OrderStatus::Working,
            placed_at: now,
        }),
        BrokerEvent::PositionClosed {
            contract_id: contract_id.to_string(),
            account_id: account_id.to_string(),
            exit_price: Some(exit_price),
        },
    ]
}
