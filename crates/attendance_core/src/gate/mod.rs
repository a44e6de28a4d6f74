//! Biometric gate contract.
//!
//! # Responsibility
//! - Model the device biometric prompt as a binary gate.
//! - Model optional per-employee credential issuance.
//!
//! # Invariants
//! - A granted prompt proves device-level presence, not employee identity.
//! - Callers treat `Denied` and `Err(GateError)` identically.

use crate::model::employee::BiometricKeyRef;
use std::cell::{Cell, RefCell};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result of one biometric prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptOutcome {
    Granted,
    Denied,
}

/// Gate could not run or could not issue a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    /// No sensor, no enrollment, or the platform call threw.
    Unavailable(String),
    /// Credential issuance failed.
    CredentialRejected(String),
}

impl Display for GateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "biometric prompt unavailable: {reason}"),
            Self::CredentialRejected(reason) => {
                write!(f, "biometric credential rejected: {reason}")
            }
        }
    }
}

impl Error for GateError {}

/// Device biometric capability.
pub trait BiometricGate {
    fn prompt(&self, message: &str) -> Result<PromptOutcome, GateError>;
    fn create_credential(&self, label: &str) -> Result<BiometricKeyRef, GateError>;
}

impl<T: BiometricGate + ?Sized> BiometricGate for &T {
    fn prompt(&self, message: &str) -> Result<PromptOutcome, GateError> {
        (**self).prompt(message)
    }

    fn create_credential(&self, label: &str) -> Result<BiometricKeyRef, GateError> {
        (**self).create_credential(label)
    }
}

/// Gate whose outcome was decided by the host before the call.
///
/// The Flutter host runs the OS prompt itself and hands the result to core
/// through FFI; this type replays that result to the store.
#[derive(Debug)]
pub struct PresetGate {
    outcome: Result<PromptOutcome, GateError>,
    credential: Option<BiometricKeyRef>,
    prompts: Cell<u32>,
    last_message: RefCell<Option<String>>,
}

impl PresetGate {
    pub fn granted() -> Self {
        Self::from_outcome(Ok(PromptOutcome::Granted))
    }

    pub fn denied() -> Self {
        Self::from_outcome(Ok(PromptOutcome::Denied))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::from_outcome(Err(GateError::Unavailable(reason.into())))
    }

    /// Maps a host-reported boolean onto a gate.
    pub fn from_host(granted: bool) -> Self {
        if granted {
            Self::granted()
        } else {
            Self::denied()
        }
    }

    /// Attaches the credential returned by `create_credential`.
    pub fn with_credential(mut self, key_ref: impl Into<String>) -> Self {
        self.credential = Some(BiometricKeyRef::new(key_ref));
        self
    }

    /// Number of prompts issued so far.
    pub fn prompt_count(&self) -> u32 {
        self.prompts.get()
    }

    pub fn last_message(&self) -> Option<String> {
        self.last_message.borrow().clone()
    }

    fn from_outcome(outcome: Result<PromptOutcome, GateError>) -> Self {
        Self {
            outcome,
            credential: None,
            prompts: Cell::new(0),
            last_message: RefCell::new(None),
        }
    }
}

impl BiometricGate for PresetGate {
    fn prompt(&self, message: &str) -> Result<PromptOutcome, GateError> {
        self.prompts.set(self.prompts.get() + 1);
        *self.last_message.borrow_mut() = Some(message.to_string());
        self.outcome.clone()
    }

    fn create_credential(&self, _label: &str) -> Result<BiometricKeyRef, GateError> {
        self.credential.clone().ok_or_else(|| {
            GateError::CredentialRejected("host did not issue a credential".to_string())
        })
    }
}
