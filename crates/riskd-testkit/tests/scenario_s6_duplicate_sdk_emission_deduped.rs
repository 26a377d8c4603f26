//! S6 (§8): a duplicate SDK emission — the same close reported three times
//! within the Event Router's dedup TTL, as a flaky SDK subscription might —
//! is collapsed to exactly one dispatched `RiskEvent`, so the realized P&L
//! it carries is only ever added to the tracker once.

use chrono::{TimeZone, Utc};

use riskd_config::Configuration;
use riskd_daemon::supervisor::Supervisor;
use riskd_testkit::{position, position_closed_event, write_scenario_config};

const ACCOUNT: &str = "ACC-001";
const CONTRACT: &str = "CON.F.US.MNQ.Z25";

#[tokio::test]
async fn three_duplicate_position_closed_events_dispatch_exactly_once() {
    let config_dir = tempfile::tempdir().unwrap();
    write_scenario_config(config_dir.path(), |c| c.to_string()).unwrap();
    let (config, _hash) = Configuration::load(config_dir.path()).unwrap();

    let db_dir = tempfile::tempdir().unwrap();
    let mut supervisor = Supervisor::boot(config, &db_dir.path().join("riskd.sqlite"), riskd_broker_sim::PaperBroker::new())
        .await
        .unwrap();

    let now = Utc.with_ymd_and_hms(2026, 3, 10, 14, 30, 0).unwrap();
    supervisor
        .process_broker_event(riskd_schemas::events::BrokerEvent::PositionOpened(position(
            CONTRACT, "MNQ", ACCOUNT, 1, "21000.00", now,
        )))
        .await
        .unwrap();

    // Three instrument subscriptions all report the same close within
    // milliseconds of each other, well inside the dedup window.
    let mut dispatched_count = 0;
    for _ in 0..3 {
        let report = supervisor
            .process_broker_event(position_closed_event(CONTRACT, ACCOUNT, "20900.00"))
            .await
            .unwrap();
        if report.risk_event_dispatched {
            dispatched_count += 1;
        }
    }

    assert_eq!(dispatched_count, 1, "only the first of three duplicate close events should dispatch");
}
