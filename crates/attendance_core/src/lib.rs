//! Core domain logic for the biometric attendance app.
//! This crate is the single source of truth for roster and attendance invariants.

pub mod config;
pub mod db;
pub mod gate;
pub mod kv;
pub mod logging;
pub mod model;
pub mod persist;
pub mod service;

pub use config::{ConfigError, DuplicateCheckInPolicy, EnrollmentPolicy, PromptMessages, StoreConfig};
pub use gate::{BiometricGate, GateError, PresetGate, PromptOutcome};
pub use kv::{KeyValueStore, KvError, KvResult, MemoryKeyValueStore, SqliteKeyValueStore};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::employee::{BiometricKeyRef, Employee, EmployeeInput, EmployeeKey};
pub use model::record::{AttendanceRecord, AttendanceStatus, RecordTransitionError};
pub use model::validation::ValidationError;
pub use persist::snapshot::{SnapshotError, SNAPSHOT_VERSION};
pub use persist::{ATTENDANCE_KEY, EMPLOYEES_KEY};
pub use service::attendance_store::{AttendanceStore, CollectionLoad, LoadReport, RemovedEmployee};
pub use service::record_filter::{EventFilter, ALL_EVENTS};
pub use service::store_error::{AuthFailure, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
