//! Error types for Pushcart operations.
//!
//! This module defines [`PushcartError`], the primary error type used
//! throughout the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `PushcartError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `PushcartError::Other`) for unexpected errors
//! - Step handlers raise errors; they never retry internally. Retry policy
//!   lives in the orchestrator.

use std::path::PathBuf;
use thiserror::Error;

use crate::steps::StepId;

/// Core error type for Pushcart operations.
#[derive(Debug, Error)]
pub enum PushcartError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// A step id outside the known pipeline range was requested.
    #[error("Unknown step id: {step} (valid range 0-14)")]
    UnknownStep { step: u8 },

    /// A step handler failed. Fatal to the current phase attempt.
    #[error("Step {step} ({name}) failed: {message}")]
    StepFailed {
        step: StepId,
        name: &'static str,
        message: String,
    },

    /// A step ran before the step that produces one of its inputs.
    #[error("Step {step} needs `{field}` but no earlier step produced it")]
    ContextMissing { step: StepId, field: &'static str },

    /// A phase failed past its retry budget. Fatal to the run.
    #[error("Phase '{phase}' failed after {attempts} attempt(s), last failing step {step}")]
    RetryExhausted {
        phase: &'static str,
        attempts: u32,
        step: StepId,
    },

    /// Remote record table rejected a request or returned bad data.
    #[error("Record store error: {message}")]
    RecordStore { message: String },

    /// Storefront console rejected a request.
    #[error("Storefront error: {message}")]
    Storefront { message: String },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Pushcart operations.
pub type Result<T> = std::result::Result<T, PushcartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_not_found_displays_path() {
        let err = PushcartError::ConfigNotFound {
            path: PathBuf::from("/foo/pushcart.yml"),
        };
        assert!(err.to_string().contains("/foo/pushcart.yml"));
    }

    #[test]
    fn unknown_step_displays_range() {
        let err = PushcartError::UnknownStep { step: 99 };
        let msg = err.to_string();
        assert!(msg.contains("99"));
        assert!(msg.contains("0-14"));
    }

    #[test]
    fn step_failed_displays_step_and_message() {
        let err = PushcartError::StepFailed {
            step: StepId::new(5).unwrap(),
            name: "upload-main-images",
            message: "image folder empty".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("5"));
        assert!(msg.contains("upload-main-images"));
        assert!(msg.contains("image folder empty"));
    }

    #[test]
    fn context_missing_displays_field() {
        let err = PushcartError::ContextMissing {
            step: StepId::new(5).unwrap(),
            field: "editor_session",
        };
        assert!(err.to_string().contains("editor_session"));
    }

    #[test]
    fn retry_exhausted_displays_phase_and_attempts() {
        let err = PushcartError::RetryExhausted {
            phase: "publish",
            attempts: 3,
            step: StepId::new(7).unwrap(),
        };
        let msg = err.to_string();
        assert!(msg.contains("publish"));
        assert!(msg.contains("3"));
        assert!(msg.contains("7"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: PushcartError = io_err.into();
        assert!(matches!(err, PushcartError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(PushcartError::ConfigValidationError {
                message: "test".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}
