// File: src/error.rs
// Purpose: Error types for validation wiring and remote checks

use thiserror::Error;

/// Wiring errors. These signal a mismatch between page configuration and
/// code, never a user input condition.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("A validation manager for form '{0}' needs to be created first")]
    FormNotRegistered(String),

    #[error("No form is registered for validation")]
    NoFormsRegistered,

    #[error("Validator '{validator}' has an invalid expression: {source}")]
    InvalidPattern {
        validator: String,
        #[source]
        source: regex::Error,
    },

    #[error("Validator '{0}' is not registered")]
    UnknownValidator(String),
}

/// Failure of a remote (callback) validation request
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Remote validation request failed: {0}")]
    Transport(String),

    #[error("Remote validation response could not be read: {0}")]
    InvalidResponse(String),
}

pub type Result<T, E = ValidationError> = std::result::Result<T, E>;
