//! Attendance record and its check-in/check-out lifecycle.
//!
//! # Responsibility
//! - Capture one employee's presence at one event.
//! - Enforce the `CheckedIn -> CheckedOut` transition.
//!
//! # Invariants
//! - `timestamp` is the check-in instant and is never rewritten.
//! - `checked_out_at` is set exactly when `status == CheckedOut`.

use crate::model::employee::Employee;
use crate::model::validation::trim_in_place;
use crate::persist::snapshot::SnapshotItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Record lifecycle state.
///
/// Serialized with the labels the mobile app renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    #[serde(rename = "Checked In")]
    CheckedIn,
    #[serde(rename = "Checked Out")]
    CheckedOut,
}

impl AttendanceStatus {
    /// User-facing label, identical to the persisted value.
    pub fn label(self) -> &'static str {
        match self {
            Self::CheckedIn => "Checked In",
            Self::CheckedOut => "Checked Out",
        }
    }
}

/// One attendance log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    /// Employee code at write time; rewritten when the employee is edited.
    pub employee_id: String,
    /// Denormalized display name.
    pub employee_name: String,
    pub event_id: String,
    /// Check-in instant.
    pub timestamp: DateTime<Utc>,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_out_at: Option<DateTime<Utc>>,
}

/// Rejected lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordTransitionError {
    AlreadyCheckedOut(String),
}

impl Display for RecordTransitionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyCheckedOut(id) => write!(f, "attendance record already checked out: {id}"),
        }
    }
}

impl Error for RecordTransitionError {}

impl AttendanceRecord {
    /// Opens a new session for `employee` at `event_id`.
    pub fn check_in(employee: &Employee, event_id: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            employee_id: employee.employee_id.clone(),
            employee_name: employee.name.clone(),
            event_id: event_id.into(),
            timestamp: at,
            status: AttendanceStatus::CheckedIn,
            checked_out_at: None,
        }
    }

    /// Closes this session. Fails when it is already closed.
    pub fn check_out(&mut self, at: DateTime<Utc>) -> Result<(), RecordTransitionError> {
        if self.status == AttendanceStatus::CheckedOut {
            return Err(RecordTransitionError::AlreadyCheckedOut(self.id.clone()));
        }
        self.status = AttendanceStatus::CheckedOut;
        self.checked_out_at = Some(at);
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.status == AttendanceStatus::CheckedIn
    }

    /// Returns whether this record is the open session for the pair.
    pub fn is_open_session_for(&self, employee_id: &str, event_id: &str) -> bool {
        self.is_open() && self.employee_id == employee_id && self.event_id == event_id
    }
}

impl SnapshotItem for AttendanceRecord {
    fn migrate_legacy(&mut self) {
        trim_in_place(&mut self.employee_id);
        trim_in_place(&mut self.employee_name);
        trim_in_place(&mut self.event_id);
    }
}

#[cfg(test)]
mod tests {
    use super::{AttendanceRecord, AttendanceStatus, RecordTransitionError};
    use crate::model::employee::{Employee, EmployeeInput};
    use chrono::{TimeZone, Utc};

    fn employee() -> Employee {
        Employee::new(EmployeeInput::parse("Jane Smith", "E1").unwrap(), None)
    }

    #[test]
    fn check_out_is_a_one_way_transition() {
        let start = Utc.with_ymd_and_hms(2025, 5, 15, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 5, 15, 17, 0, 0).unwrap();
        let mut record = AttendanceRecord::check_in(&employee(), "Standup", start);
        assert!(record.is_open_session_for("E1", "Standup"));

        record.check_out(end).expect("first check-out succeeds");
        assert_eq!(record.status, AttendanceStatus::CheckedOut);
        assert_eq!(record.timestamp, start);
        assert_eq!(record.checked_out_at, Some(end));

        let err = record.check_out(end).expect_err("second check-out must fail");
        assert!(matches!(err, RecordTransitionError::AlreadyCheckedOut(_)));
    }

    #[test]
    fn parses_legacy_app_record() {
        let raw = r#"{
            "id": "att-1715763600000",
            "employeeId": "E1",
            "employeeName": "Jane Smith",
            "eventId": "Standup",
            "timestamp": "2024-05-15T09:00:00.000Z",
            "status": "Checked In"
        }"#;
        let record: AttendanceRecord = serde_json::from_str(raw).unwrap();
        assert!(record.is_open());
        assert_eq!(record.checked_out_at, None);
        assert_eq!(record.status.label(), "Checked In");
    }
}
