//! Directory completion marker
//!
//! A zero-length file whose existence proves that a convert pass finished on
//! the directory. Written only as the last step of a successful convert and
//! consulted by the destructive commands before they touch anything.

use crate::error::{TunerError, TunerResult};
use std::path::{Path, PathBuf};
use tuner_common::events::TunerCommand;

/// Marker file for one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionMarker {
    path: PathBuf,
}

impl CompletionMarker {
    pub fn new(directory: &Path, name: &str) -> Self {
        Self {
            path: directory.join(name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the marker exists as a regular file
    pub async fn exists(&self) -> bool {
        tokio::fs::metadata(&self.path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    /// Create (or truncate) the marker
    pub async fn write(&self) -> TunerResult<()> {
        tokio::fs::write(&self.path, b"")
            .await
            .map_err(|e| TunerError::io(&self.path, e))?;
        tracing::debug!(marker = %self.path.display(), "Completion marker written");
        Ok(())
    }

    /// Delete the marker; a missing marker is not an error
    pub async fn remove(&self) -> TunerResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TunerError::io(&self.path, e)),
        }
    }

    /// Gate for a destructive command
    ///
    /// # Errors
    /// [`TunerError::Precondition`] if the marker is absent.
    pub async fn require(&self, command: TunerCommand) -> TunerResult<()> {
        if self.exists().await {
            return Ok(());
        }
        Err(TunerError::Precondition {
            command,
            directory: self
                .path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        })
    }
}
