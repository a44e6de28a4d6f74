//! Input normalization shared by roster and attendance commands.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Required-field violations detected before any state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    EmptyName,
    EmptyEmployeeId,
    EmptyEventId,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "employee name must not be blank"),
            Self::EmptyEmployeeId => write!(f, "employee id must not be blank"),
            Self::EmptyEventId => write!(f, "event id must not be blank"),
        }
    }
}

impl Error for ValidationError {}

/// Trims `value` and rejects it with `error` when nothing is left.
pub fn require_non_blank(value: &str, error: ValidationError) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(error);
    }
    Ok(trimmed.to_string())
}

/// Trims `value` in place; used when repairing stored data, where blank
/// values are kept rather than rejected.
pub fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// Normalizes a free-text event label.
pub fn normalize_event_id(value: &str) -> Result<String, ValidationError> {
    require_non_blank(value, ValidationError::EmptyEventId)
}

#[cfg(test)]
mod tests {
    use super::{normalize_event_id, require_non_blank, trim_in_place, ValidationError};

    #[test]
    fn require_non_blank_trims_surrounding_whitespace() {
        let value = require_non_blank("  E-17 ", ValidationError::EmptyEmployeeId)
            .expect("non-blank input should pass");
        assert_eq!(value, "E-17");
    }

    #[test]
    fn whitespace_only_event_is_rejected() {
        let err = normalize_event_id(" \t ").expect_err("blank event must fail");
        assert_eq!(err, ValidationError::EmptyEventId);
    }

    #[test]
    fn trim_in_place_keeps_blank_values() {
        let mut padded = "  E1\t".to_string();
        trim_in_place(&mut padded);
        assert_eq!(padded, "E1");

        let mut blank = "   ".to_string();
        trim_in_place(&mut blank);
        assert_eq!(blank, "");
    }
}
