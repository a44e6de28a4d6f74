//! Flutter bridge for the attendance core.

pub mod api;
