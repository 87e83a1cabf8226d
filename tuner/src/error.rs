//! Error types for tuner
//!
//! Every error raised by a leaf step aborts its enclosing composed step and,
//! transitively, the whole workflow plan. Nothing here is retried.

use crate::workflow::SeriesFailure;
use std::path::PathBuf;
use thiserror::Error;
use tuner_common::events::TunerCommand;

/// Engine error type
#[derive(Debug, Error)]
pub enum TunerError {
    /// A directory could not be read during discovery
    #[error("Cannot read directory {path}: {message}")]
    Discovery { path: PathBuf, message: String },

    /// No supported cover image where one is required
    #[error("No supported cover image in {directory} (looked for {looked_for})")]
    MissingArtwork { directory: PathBuf, looked_for: String },

    /// An external tool reported failure
    #[error("{tool} failed ({status}): {diagnostic}")]
    Collaborator {
        tool: String,
        status: String,
        diagnostic: String,
    },

    /// An external tool did not finish within the configured timeout
    #[error("{tool} timed out after {seconds}s")]
    Timeout { tool: String, seconds: u64 },

    /// A guarded command ran without a completion marker
    #[error("Refusing to {command} {directory}: no completion marker, convert the directory first")]
    Precondition {
        command: TunerCommand,
        directory: PathBuf,
    },

    /// A step of a workflow plan failed
    #[error("step '{}' failed: {}", .0.label, .0.error)]
    StepFailed(Box<SeriesFailure>),

    /// Filesystem operation failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// tuner-common error (configuration, invalid input)
    #[error(transparent)]
    Common(#[from] tuner_common::Error),
}

/// Result type for engine operations
pub type TunerResult<T> = Result<T, TunerError>;

impl TunerError {
    /// Filesystem error tagged with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TunerError::Io {
            path: path.into(),
            source,
        }
    }

    /// The leaf error, looking through nested step failures
    pub fn root_cause(&self) -> &TunerError {
        match self {
            TunerError::StepFailed(failure) => failure.root_cause(),
            other => other,
        }
    }

    /// Whether the root cause is an external tool failure (including timeouts)
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self.root_cause(),
            TunerError::Collaborator { .. } | TunerError::Timeout { .. }
        )
    }
}
