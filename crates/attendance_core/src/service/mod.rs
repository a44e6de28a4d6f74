//! Attendance use-case services.
//!
//! # Responsibility
//! - Expose the store commands and admin queries to FFI/CLI callers.
//! - Keep callers decoupled from storage and gate implementations.

pub mod attendance_store;
pub mod record_filter;
pub mod store_error;
