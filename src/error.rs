//! Error types for pipeline operations.
//!
//! This module defines [`PipelineError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Step-level failures that abort the sample are `PipelineError`s
//! - Best-effort failures never become errors; they are reported through
//!   [`StepResult`](crate::steps::StepResult) instead
//! - Use `anyhow::Error` (via `PipelineError::Other`) for unexpected errors

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Exit code for a fatal step failure.
pub const EXIT_FAILURE: u8 = 1;

/// Exit code for configuration problems.
pub const EXIT_CONFIG: u8 = 2;

/// Exit code when the user interrupted the run.
pub const EXIT_INTERRUPTED: u8 = 130;

/// Core error type for pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// External tool exited non-zero.
    #[error("Step '{step}' failed with exit code {code:?}: {command}")]
    ToolFailure {
        step: String,
        command: String,
        code: Option<i32>,
    },

    /// Another execution held the lock for longer than allowed.
    #[error("Timed out after {waited:?} waiting for lock '{lock}'")]
    LockTimeout { lock: String, waited: Duration },

    /// A declared input artifact is absent when a step is about to run.
    #[error("Step '{step}' is missing prerequisite {}", path.display())]
    MissingPrerequisite { step: String, path: PathBuf },

    /// A command exited zero without producing its declared output.
    #[error("Step '{step}' exited successfully but did not produce {}", path.display())]
    MissingOutput { step: String, path: PathBuf },

    /// The run was interrupted by a signal.
    #[error("Interrupted while running step '{step}'")]
    Interrupted { step: String },

    /// Deleting a disposable artifact failed.
    #[error("Failed to remove {}: {message}", path.display())]
    CleanupFailure { path: PathBuf, message: String },

    /// Handoff document not found at expected location.
    #[error("Configuration not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse handoff document.
    #[error("Failed to parse config at {}: {message}", path.display())]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipelineError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Interrupted { .. } => EXIT_INTERRUPTED,
            PipelineError::ConfigNotFound { .. }
            | PipelineError::ConfigParseError { .. }
            | PipelineError::ConfigValidationError { .. } => EXIT_CONFIG,
            _ => EXIT_FAILURE,
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
