//! Error surface of `AttendanceStore` commands.

use crate::gate::GateError;
use crate::kv::KvError;
use crate::model::validation::ValidationError;
use crate::persist::snapshot::SnapshotError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Why authentication was not granted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// The user failed or cancelled the prompt.
    Denied,
    /// The gate could not prompt or could not issue a credential.
    Gate(GateError),
}

impl Display for AuthFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Denied => write!(f, "biometric authentication was not granted"),
            Self::Gate(err) => write!(f, "{err}"),
        }
    }
}

#[derive(Debug)]
pub enum StoreError {
    Validation(ValidationError),
    /// Employee code already taken by another roster entry.
    DuplicateEmployeeId(String),
    Authentication(AuthFailure),
    /// No roster entry for the given id or code.
    EmployeeNotFound(String),
    /// Per-employee credential policy is active and the employee has none.
    NotEnrolled(String),
    SessionAlreadyOpen {
        employee_id: String,
        event_id: String,
    },
    NoOpenSession {
        employee_id: String,
        event_id: String,
    },
    RecordNotFound(String),
    /// Key could not be read safely at load and is protected from writes.
    CollectionUnavailable { key: &'static str },
    /// Write failed; in-memory state was left unchanged.
    Persistence(KvError),
    Snapshot(SnapshotError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateEmployeeId(code) => write!(f, "employee id already exists: {code}"),
            Self::Authentication(failure) => write!(f, "authentication failed: {failure}"),
            Self::EmployeeNotFound(key) => write!(f, "employee not found: {key}"),
            Self::NotEnrolled(code) => {
                write!(f, "employee has no registered biometric credential: {code}")
            }
            Self::SessionAlreadyOpen {
                employee_id,
                event_id,
            } => write!(f, "employee {employee_id} is already checked in to {event_id}"),
            Self::NoOpenSession {
                employee_id,
                event_id,
            } => write!(f, "employee {employee_id} is not checked in to {event_id}"),
            Self::RecordNotFound(id) => write!(f, "attendance record not found: {id}"),
            Self::CollectionUnavailable { key } => write!(
                f,
                "stored `{key}` data could not be loaded; refusing to overwrite it"
            ),
            Self::Persistence(err) => write!(f, "failed to save attendance data: {err}"),
            Self::Snapshot(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Authentication(AuthFailure::Gate(err)) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::Snapshot(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<KvError> for StoreError {
    fn from(value: KvError) -> Self {
        Self::Persistence(value)
    }
}

impl From<SnapshotError> for StoreError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value)
    }
}
