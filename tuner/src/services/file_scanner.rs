//! Recursive file discovery
//!
//! Walks a directory tree and returns a [`FileDescriptor`] for every entry
//! whose *name* matches a pattern. Non-matching subdirectories are descended
//! into; non-matching plain files are dropped. A matching entry is emitted
//! as-is and never descended into, even when it is a directory.
//!
//! Symlinks are not followed and recursion stops at `max_depth`, so a link
//! loop cannot make discovery run forever. Entries are visited in file-name
//! order within each directory, which makes discovery order deterministic.
//! An unreadable directory fails the whole discovery; nothing is skipped
//! silently.

use crate::error::{TunerError, TunerResult};
use regex::Regex;
use std::path::Path;
use tuner_common::FileDescriptor;
use walkdir::WalkDir;

/// Default recursion cap
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Pattern-driven directory scanner
#[derive(Debug, Clone)]
pub struct FileScanner {
    pattern: Regex,
    target_extension: Option<String>,
    max_depth: usize,
}

impl FileScanner {
    /// Scanner emitting entries whose name matches `pattern`
    pub fn new(pattern: Regex) -> Self {
        Self {
            pattern,
            target_extension: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Derive each descriptor's target path by swapping in `extension`
    pub fn with_target_extension(mut self, extension: impl Into<String>) -> Self {
        self.target_extension = Some(extension.into());
        self
    }

    /// Limit how many directory levels below the root are visited
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Discover matching entries under `root`
    ///
    /// # Errors
    /// [`TunerError::Discovery`] when `root` is missing, is not a directory, or
    /// any directory below it cannot be read.
    pub fn discover(&self, root: &Path) -> TunerResult<Vec<FileDescriptor>> {
        if !root.exists() {
            return Err(TunerError::Discovery {
                path: root.to_path_buf(),
                message: "path not found".to_string(),
            });
        }
        if !root.is_dir() {
            return Err(TunerError::Discovery {
                path: root.to_path_buf(),
                message: "not a directory".to_string(),
            });
        }

        let mut found = Vec::new();
        let mut walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(self.max_depth)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = entry.map_err(|e| TunerError::Discovery {
                path: e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf()),
                message: e
                    .io_error()
                    .map(|io| io.to_string())
                    .unwrap_or_else(|| e.to_string()),
            })?;

            let name = entry.file_name().to_string_lossy();
            if self.pattern.is_match(&name) {
                found.push(FileDescriptor::new(
                    entry.path(),
                    self.target_extension.as_deref(),
                ));
                if entry.file_type().is_dir() {
                    walker.skip_current_dir();
                }
            }
        }

        tracing::debug!(
            root = %root.display(),
            pattern = %self.pattern,
            count = found.len(),
            "Discovery complete"
        );

        Ok(found)
    }
}

/// Discover entries under `root` whose name matches `pattern`
pub fn discover(root: &Path, pattern: &Regex) -> TunerResult<Vec<FileDescriptor>> {
    FileScanner::new(pattern.clone()).discover(root)
}
