//! Audit hash chain integrity, exercised through a realistic violation +
//! enforcement sequence rather than synthetic payloads.

use riskd_audit::{AuditWriter, VerifyResult};
use serde_json::json;

fn temp_path(suffix: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "riskd_audit_scenario_{suffix}_{}",
        std::process::id()
    ))
}

#[test]
fn daily_loss_breach_writes_a_verifiable_violation_then_enforcement_pair() {
    let path = temp_path("daily_loss");
    {
        let mut writer = AuditWriter::new(&path, true).unwrap();
        writer
            .log_violation(
                "ACC-001",
                json!({"rule": "DailyRealizedLoss", "current_pnl": "-550.000000", "action": "flatten"}),
            )
            .unwrap();
        writer
            .log_enforcement_action("ACC-001", json!({"action": "flatten", "contract_id": "CON.F.US.MNQ.Z25"}))
            .unwrap();
    }

    let result = riskd_audit::verify_hash_chain(&path).unwrap();
    assert_eq!(result, VerifyResult::Valid { lines: 2 });

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("RULE_VIOLATED"));
    assert!(lines[1].contains("ENFORCEMENT_ACTION"));

    std::fs::remove_file(&path).ok();
}

#[test]
fn tampering_with_an_entry_after_the_fact_is_detected() {
    let path = temp_path("tamper");
    {
        let mut writer = AuditWriter::new(&path, true).unwrap();
        for i in 0..3 {
            writer
                .log_violation("ACC-001", json!({"seq": i}))
                .unwrap();
        }
    }

    let content = std::fs::read_to_string(&path).unwrap();
    let mut lines: Vec<&str> = content.lines().collect();
    let mut ev: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    ev["payload"]["seq"] = json!("forged");
    let tampered = serde_json::to_string(&ev).unwrap();
    lines[1] = &tampered;
    std::fs::write(&path, lines.join("\n") + "\n").unwrap();

    let result = riskd_audit::verify_hash_chain(&path).unwrap();
    assert!(matches!(result, VerifyResult::Broken { line: 2, .. }));

    std::fs::remove_file(&path).ok();
}
