//! Persisted layout of the roster and attendance log.
//!
//! # Responsibility
//! - Encode each collection as a versioned JSON snapshot under a fixed key.
//! - Accept the legacy bare-array layout and migrate it on read.
//!
//! # Invariants
//! - New writes always use `SNAPSHOT_VERSION`.
//! - A snapshot newer than `SNAPSHOT_VERSION` is reported, never coerced.

pub mod snapshot;

/// Storage key for the employee roster.
pub const EMPLOYEES_KEY: &str = "employees";
/// Storage key for the attendance log.
pub const ATTENDANCE_KEY: &str = "attendance";
