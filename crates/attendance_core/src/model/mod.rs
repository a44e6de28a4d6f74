//! Attendance domain model.
//!
//! # Responsibility
//! - Define the roster (`Employee`) and log (`AttendanceRecord`) shapes.
//! - Keep persisted field names aligned with the mobile app's JSON layout.
//!
//! # Invariants
//! - `Employee::employee_id` is unique within one roster.
//! - An `AttendanceRecord` only moves `CheckedIn -> CheckedOut`, never back.
//! - Records carry a denormalized copy of the employee name.

pub mod employee;
pub mod record;
pub mod validation;
