//! Employee roster entry.
//!
//! # Invariants
//! - `id` is generated once and never changes, even when the code is edited.
//! - `biometric_key_ref` presence is the only enrollment signal.

use crate::model::validation::{require_non_blank, trim_in_place, ValidationError};
use crate::persist::snapshot::SnapshotItem;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque roster identity. Legacy rosters use `emp-<millis>` strings.
pub type EmployeeKey = String;

/// Opaque handle to a biometric credential issued by the device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BiometricKeyRef(String);

impl BiometricKeyRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// One registered employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Stable roster identity used by edit/delete commands.
    pub id: EmployeeKey,
    /// Human-assigned code, referenced by attendance records.
    pub employee_id: String,
    /// Display name copied into records at write time.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biometric_key_ref: Option<BiometricKeyRef>,
}

impl Employee {
    /// Creates an employee with a freshly generated roster id.
    pub fn new(input: EmployeeInput, biometric_key_ref: Option<BiometricKeyRef>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            employee_id: input.employee_id,
            name: input.name,
            biometric_key_ref,
        }
    }

    /// Returns whether a per-employee credential was issued.
    pub fn is_enrolled(&self) -> bool {
        self.biometric_key_ref.is_some()
    }

    /// Replaces mutable fields, keeping `id` and enrollment.
    pub fn apply(&mut self, input: EmployeeInput) {
        self.name = input.name;
        self.employee_id = input.employee_id;
    }
}

impl SnapshotItem for Employee {
    fn migrate_legacy(&mut self) {
        trim_in_place(&mut self.name);
        trim_in_place(&mut self.employee_id);
    }
}

/// Normalized name/code pair accepted by register and edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeInput {
    pub name: String,
    pub employee_id: String,
}

impl EmployeeInput {
    /// Trims both fields; blank values are rejected, name first.
    pub fn parse(name: &str, employee_id: &str) -> Result<Self, ValidationError> {
        let name = require_non_blank(name, ValidationError::EmptyName)?;
        let employee_id = require_non_blank(employee_id, ValidationError::EmptyEmployeeId)?;
        Ok(Self { name, employee_id })
    }
}
