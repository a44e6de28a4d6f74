//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose attendance commands and admin queries to Dart via FRB.
//! - Translate core errors into stable, human-readable envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Store actions run one at a time per process.
//! - The host runs the OS biometric prompt and passes its outcome in.

use attendance_core::db::open_db;
use attendance_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AttendanceRecord, AttendanceStore, Employee, EventFilter, PresetGate, SqliteKeyValueStore,
    StoreConfig,
};
use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

const ATTENDANCE_DB_FILE_NAME: &str = "attendance.sqlite3";
static ATTENDANCE_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static STORE_CONFIG: OnceLock<StoreConfig> = OnceLock::new();
static ACTION_LOCK: Mutex<()> = Mutex::new(());

type FfiStore<'conn> = AttendanceStore<SqliteKeyValueStore<'conn>, PresetGate>;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Roster row for list screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeItem {
    pub id: String,
    pub employee_id: String,
    pub name: String,
    pub enrolled: bool,
}

/// Attendance row for admin and history screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordItem {
    pub record_id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub event_id: String,
    /// RFC 3339 check-in instant.
    pub timestamp: String,
    /// `Checked In` or `Checked Out`.
    pub status: String,
    pub checked_out_at: Option<String>,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceActionResponse {
    /// Whether the action succeeded.
    pub ok: bool,
    /// Affected employee or record ID on success.
    pub id: Option<String>,
    /// Human-readable message suitable for an alert dialog.
    pub message: String,
}

impl AttendanceActionResponse {
    fn success(message: impl Into<String>, id: String) -> Self {
        Self {
            ok: true,
            id: Some(id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

/// Registers an employee after the host's registration prompt.
///
/// `biometric_key_ref` carries the credential the host issued, when the
/// per-employee credential policy is active.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_register_employee(
    name: String,
    employee_id: String,
    gate_granted: bool,
    biometric_key_ref: Option<String>,
) -> AttendanceActionResponse {
    let mut gate = PresetGate::from_host(gate_granted);
    if let Some(key_ref) = biometric_key_ref {
        gate = gate.with_credential(key_ref);
    }
    respond(
        with_store(gate, |store| {
            store
                .register_employee(&name, &employee_id)
                .map(|employee| employee.id)
        }),
        "Employee registered.",
        "attendance_register_employee",
    )
}

/// Edits name and code of one employee.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_edit_employee(
    id: String,
    name: String,
    employee_id: String,
) -> AttendanceActionResponse {
    respond(
        with_store(PresetGate::denied(), |store| {
            store
                .edit_employee(&id, &name, &employee_id)
                .map(|employee| employee.id)
        }),
        "Employee updated.",
        "attendance_edit_employee",
    )
}

/// Deletes one employee and their attendance records.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_delete_employee(id: String) -> AttendanceActionResponse {
    respond(
        with_store(PresetGate::denied(), |store| {
            store
                .delete_employee(&id)
                .map(|removed| removed.employee.id)
        }),
        "Employee deleted.",
        "attendance_delete_employee",
    )
}

/// Checks an employee in after the host's attendance prompt.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_check_in(
    employee_id: String,
    event_id: String,
    gate_granted: bool,
) -> AttendanceActionResponse {
    respond(
        with_store(PresetGate::from_host(gate_granted), |store| {
            store
                .check_in(&employee_id, &event_id)
                .map(|record| record.id)
        }),
        "Checked in.",
        "attendance_check_in",
    )
}

/// Checks an employee out of their open session.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_check_out(employee_id: String, event_id: String) -> AttendanceActionResponse {
    respond(
        with_store(PresetGate::denied(), |store| {
            store
                .check_out(&employee_id, &event_id)
                .map(|record| record.id)
        }),
        "Checked out.",
        "attendance_check_out",
    )
}

/// Deletes one attendance record (admin).
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_delete_record(record_id: String) -> AttendanceActionResponse {
    respond(
        with_store(PresetGate::denied(), |store| {
            store.delete_record(&record_id).map(|record| record.id)
        }),
        "Record deleted.",
        "attendance_delete_record",
    )
}

/// Lists the roster. Returns an empty list when storage is unavailable.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_list_employees() -> Vec<EmployeeItem> {
    query_or_empty(
        "list_employees",
        with_store(PresetGate::denied(), |store| {
            Ok(store
                .employees()
                .iter()
                .map(to_employee_item)
                .collect::<Vec<_>>())
        }),
    )
}

/// Admin search; `event_label` may be the `All Events` sentinel.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_filter_records(query: String, event_label: String) -> Vec<RecordItem> {
    let event = EventFilter::from_label(&event_label);
    query_or_empty(
        "filter_records",
        with_store(PresetGate::denied(), |store| {
            Ok(store
                .filter(&query, &event)
                .into_iter()
                .map(to_record_item)
                .collect::<Vec<_>>())
        }),
    )
}

/// Distinct event labels for the admin picker.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_event_ids() -> Vec<String> {
    query_or_empty(
        "event_ids",
        with_store(PresetGate::denied(), |store| Ok(store.event_ids())),
    )
}

// Read-only screens render an empty list rather than an error dialog.
fn query_or_empty<T>(op: &str, result: Result<Vec<T>, String>) -> Vec<T> {
    result.unwrap_or_else(|err| {
        warn!("event=ffi_query module=ffi status=error op={op} error={err}");
        Vec::new()
    })
}

fn respond(
    result: Result<String, String>,
    success_message: &str,
    op: &str,
) -> AttendanceActionResponse {
    match result {
        Ok(id) => AttendanceActionResponse::success(success_message, id),
        Err(err) => AttendanceActionResponse::failure(format!("{op} failed: {err}")),
    }
}

fn resolve_db_path() -> PathBuf {
    ATTENDANCE_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("ATTENDANCE_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(ATTENDANCE_DB_FILE_NAME)
        })
        .clone()
}

fn resolve_store_config() -> StoreConfig {
    STORE_CONFIG
        .get_or_init(|| {
            let enrollment = std::env::var("ATTENDANCE_ENROLLMENT").ok();
            let duplicate = std::env::var("ATTENDANCE_DUPLICATE_CHECK_IN").ok();
            StoreConfig::from_settings(enrollment.as_deref(), duplicate.as_deref())
                .unwrap_or_else(|err| {
                    warn!("event=config_load module=ffi status=error error={err}; using defaults");
                    StoreConfig::default()
                })
        })
        .clone()
}

fn with_store<T>(
    gate: PresetGate,
    f: impl FnOnce(&mut FfiStore<'_>) -> attendance_core::StoreResult<T>,
) -> Result<T, String> {
    let _guard = ACTION_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let conn = open_db(resolve_db_path()).map_err(|err| format!("attendance DB open failed: {err}"))?;
    let kv = SqliteKeyValueStore::try_new(&conn)
        .map_err(|err| format!("attendance storage init failed: {err}"))?;
    let mut store = AttendanceStore::open(kv, gate, resolve_store_config());
    f(&mut store).map_err(|err| err.to_string())
}

fn to_employee_item(employee: &Employee) -> EmployeeItem {
    EmployeeItem {
        id: employee.id.clone(),
        employee_id: employee.employee_id.clone(),
        name: employee.name.clone(),
        enrolled: employee.is_enrolled(),
    }
}

fn to_record_item(record: &AttendanceRecord) -> RecordItem {
    RecordItem {
        record_id: record.id.clone(),
        employee_id: record.employee_id.clone(),
        employee_name: record.employee_name.clone(),
        event_id: record.event_id.clone(),
        timestamp: record.timestamp.to_rfc3339(),
        status: record.status.label().to_string(),
        checked_out_at: record.checked_out_at.map(|at| at.to_rfc3339()),
    }
}
