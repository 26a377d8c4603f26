//! Shared fixtures for end-to-end scenario tests (§8): config YAML builders
//! and small `BrokerEvent` constructors, so a scenario test reads as the
//! scenario itself rather than boilerplate setup.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

use riskd_schemas::events::BrokerEvent;
use riskd_schemas::model::{Order, OrderSide, OrderStatus, OrderType, Position};
use riskd_schemas::money::Micros;

pub mod config_fixture;

/// A position ready for `BrokerEvent::PositionOpened`.
pub fn position(
    contract_id: &str,
    symbol_root: &str,
    account_id: &str,
    size: i64,
    entry_price: &str,
    opened_at: DateTime<Utc>,
) -> Position {
    Position {
        contract_id: contract_id.to_string(),
        symbol_root: symbol_root.to_string(),
        account_id: account_id.to_string(),
        size,
        avg_entry_price: Micros::from_decimal_str(entry_price).expect("valid decimal price"),
        opened_at,
    }
}

/// A working stop order, for exercising the no-stop-loss-grace and
/// order-correlator paths.
pub fn stop_order(
    order_id: &str,
    contract_id: &str,
    account_id: &str,
    side: OrderSide,
    stop_price: &str,
    placed_at: DateTime<Utc>,
) -> Order {
    Order {
        order_id: order_id.to_string(),
        contract_id: contract_id.to_string(),
        account_id: account_id.to_string(),
        order_type: OrderType::Stop,
        side,
        size: 1,
        stop_price: Some(Micros::from_decimal_str(stop_price).expect("valid decimal price")),
        limit_price: None,
        status: OrderStatus::Working,
        placed_at,
    }
}

/// A position-closed broker payload carrying a known exit price, for driving
/// realized P&L through the Event Router.
pub fn position_closed_event(contract_id: &str, account_id: &str, exit_price: &str) -> BrokerEvent {
    BrokerEvent::PositionClosed {
        contract_id: contract_id.to_string(),
        account_id: account_id.to_string(),
        exit_price: Some(Micros::from_decimal_str(exit_price).expect("valid decimal price")),
    }
}

/// Writes `risk_config.yaml`, `timers_config.yaml`, and `accounts.yaml` into
/// `dir`, applying `patch` to the risk config's rendered YAML before writing
/// it — scenario tests use this to flip on exactly the rule(s) they exercise
/// rather than hand-writing a full config document each time.
pub fn write_scenario_config(dir: &Path, patch: impl FnOnce(&str) -> String) -> anyhow::Result<()> {
    let risk_config = patch(config_fixture::BASE_RISK_CONFIG);
    fs::write(dir.join("risk_config.yaml"), risk_config)?;
    fs::write(dir.join("timers_config.yaml"), config_fixture::BASE_TIMERS_CONFIG)?;
    fs::write(dir.join("accounts.yaml"), config_fixture::BASE_ACCOUNTS_CONFIG)?;
    Ok(())
}
