//! JSONL audit trail.
//!
//! Every order decision (validated, submitted, rejected, closed) is appended
//! to the audit file, one JSON object per line.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use igkit::OrderIntent;
use igkit_broker::{Account, BrokerError, DealReference};
use serde::Serialize;

use crate::error::Result;

/// An audit event written to the JSONL trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub event: &'static str,
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub data: serde_json::Value,
}

/// Append-only audit logger.
pub struct AuditLog {
    writer: BufWriter<std::fs::File>,
}

impl AuditLog {
    /// Open (or create) the audit log file for appending.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Log an event with arbitrary JSON data.
    pub fn log(&mut self, event: &'static str, data: serde_json::Value) -> Result<()> {
        let entry = AuditEvent {
            event,
            ts: Utc::now(),
            data,
        };
        let json = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(self.writer, "{json}")?;
        self.writer.flush()?;
        Ok(())
    }
}

fn intent_json(epic: &str, intent: &OrderIntent) -> serde_json::Value {
    serde_json::json!({
        "epic": epic,
        "direction": intent.direction.as_str(),
        "size": intent.size,
        "limit_level": intent.limit_level(),
        "limit_distance": intent.limit_distance(),
        "stop_level": intent.stop_level(),
        "stop_distance": intent.stop_distance(),
        "stop_increment": intent.stop_increment,
    })
}

/// Log a successful login.
pub fn log_session(audit: &mut AuditLog, account: &Account) -> Result<()> {
    audit.log(
        "session_started",
        serde_json::json!({
            "account": account.id,
            "account_type": account.account_type.to_string(),
        }),
    )
}

/// Log an order that passed local validation.
pub fn log_order_validated(audit: &mut AuditLog, epic: &str, intent: &OrderIntent) -> Result<()> {
    audit.log("order_validated", intent_json(epic, intent))
}

/// Log an order sent to the broker.
pub fn log_order_submitted(
    audit: &mut AuditLog,
    epic: &str,
    intent: &OrderIntent,
    reference: &DealReference,
) -> Result<()> {
    let mut data = intent_json(epic, intent);
    data["deal_reference"] = serde_json::json!(reference.deal_reference);
    audit.log("order_submitted", data)
}

/// Log an order refused locally or by the broker.
pub fn log_order_rejected(audit: &mut AuditLog, epic: &str, error: &BrokerError) -> Result<()> {
    audit.log(
        "order_rejected",
        serde_json::json!({
            "epic": epic,
            "local": error.is_validation(),
            "reason": error.to_string(),
        }),
    )
}

/// Log a (partial) close.
pub fn log_position_closed(
    audit: &mut AuditLog,
    deal_id: &str,
    size: f64,
    reference: &DealReference,
) -> Result<()> {
    audit.log(
        "position_closed",
        serde_json::json!({
            "deal_id": deal_id,
            "size": size,
            "deal_reference": reference.deal_reference,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use igkit::{Direction, LimitLeg, StopLeg};

    #[test]
    fn audit_log_writes_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_audit.jsonl");

        {
            let mut log = AuditLog::open(&path).unwrap();
            log.log("test_event", serde_json::json!({})).unwrap();
            log.log("test_data", serde_json::json!({"key": "value"}))
                .unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        for line in &lines {
            let _: serde_json::Value = serde_json::from_str(line).unwrap();
        }

        assert!(lines[0].contains("\"event\":\"test_event\""));
    }

    #[test]
    fn audit_log_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subdir").join("deep").join("audit.jsonl");

        let mut log = AuditLog::open(&path).unwrap();
        log.log("test", serde_json::json!({})).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn submitted_order_carries_legs_and_reference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let intent = OrderIntent::new(Direction::Buy, 1.0)
            .with_limit(LimitLeg::Distance(10.0))
            .with_stop(StopLeg::Level(95.0));
        let reference = DealReference {
            deal_reference: "REF1".into(),
        };

        {
            let mut log = AuditLog::open(&path).unwrap();
            log_order_submitted(&mut log, "IX.D.FTSE.DAILY.IP", &intent, &reference).unwrap();
        }

        let line = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(value["event"], "order_submitted");
        assert_eq!(value["direction"], "BUY");
        assert_eq!(value["limit_distance"], 10.0);
        assert_eq!(value["stop_level"], 95.0);
        assert!(value["stop_distance"].is_null());
        assert_eq!(value["deal_reference"], "REF1");
        assert!(value["ts"].is_string());
    }
}
