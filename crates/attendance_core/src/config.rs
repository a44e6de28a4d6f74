//! Store policies resolved by the host at startup.
//!
//! # Invariants
//! - Defaults reproduce presence-only gating with duplicate check-ins rejected.
//! - Parsing accepts case-insensitive, whitespace-padded tokens.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// What a granted biometric prompt is taken to prove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnrollmentPolicy {
    /// Prompt is a device presence check; no per-employee credential.
    #[default]
    PresenceOnly,
    /// Registration issues a credential; check-in requires one.
    PerEmployeeCredential,
}

impl EnrollmentPolicy {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "presence" | "presence_only" => Ok(Self::PresenceOnly),
            "credential" | "per_employee_credential" => Ok(Self::PerEmployeeCredential),
            other => Err(ConfigError::UnsupportedValue {
                setting: "enrollment",
                value: other.to_string(),
                expected: "presence|credential",
            }),
        }
    }
}

/// Behavior when checking in while a session for the same event is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateCheckInPolicy {
    #[default]
    Reject,
    /// Check out the open session, then open a new one.
    CloseOpenSession,
}

impl DuplicateCheckInPolicy {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "close" | "close_open_session" => Ok(Self::CloseOpenSession),
            other => Err(ConfigError::UnsupportedValue {
                setting: "duplicate_check_in",
                value: other.to_string(),
                expected: "reject|close",
            }),
        }
    }
}

/// Texts shown by the OS biometric prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessages {
    pub register: String,
    pub attendance: String,
}

impl Default for PromptMessages {
    fn default() -> Self {
        Self {
            register: "Register your fingerprint".to_string(),
            attendance: "Authenticate for attendance".to_string(),
        }
    }
}

/// Policy bundle injected into `AttendanceStore`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoreConfig {
    pub enrollment: EnrollmentPolicy,
    pub duplicate_check_in: DuplicateCheckInPolicy,
    pub prompts: PromptMessages,
}

impl StoreConfig {
    /// Builds a config from optional raw settings; `None` keeps the default.
    pub fn from_settings(
        enrollment: Option<&str>,
        duplicate_check_in: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = enrollment {
            config.enrollment = EnrollmentPolicy::parse(value)?;
        }
        if let Some(value) = duplicate_check_in {
            config.duplicate_check_in = DuplicateCheckInPolicy::parse(value)?;
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnsupportedValue {
        setting: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedValue {
                setting,
                value,
                expected,
            } => write!(
                f,
                "unsupported {setting} setting `{value}`; expected {expected}"
            ),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{DuplicateCheckInPolicy, EnrollmentPolicy, StoreConfig};

    #[test]
    fn defaults_are_presence_only_and_reject() {
        let config = StoreConfig::default();
        assert_eq!(config.enrollment, EnrollmentPolicy::PresenceOnly);
        assert_eq!(config.duplicate_check_in, DuplicateCheckInPolicy::Reject);
        assert_eq!(config.prompts.attendance, "Authenticate for attendance");
    }

    #[test]
    fn from_settings_parses_tokens_case_insensitively() {
        let config = StoreConfig::from_settings(Some(" Credential "), Some("CLOSE")).unwrap();
        assert_eq!(config.enrollment, EnrollmentPolicy::PerEmployeeCredential);
        assert_eq!(
            config.duplicate_check_in,
            DuplicateCheckInPolicy::CloseOpenSession
        );
    }

    #[test]
    fn unknown_token_names_the_setting() {
        let err = StoreConfig::from_settings(None, Some("merge")).unwrap_err();
        assert!(err.to_string().contains("duplicate_check_in"));
    }
}
