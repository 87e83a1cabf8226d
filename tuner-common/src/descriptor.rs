//! File descriptors produced by discovery

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A discovered file and where its converted counterpart will live
///
/// Immutable once created. `target_path` equals `source_path` when discovery
/// was not asked to derive a target extension (clean, add).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Path of the discovered file
    pub source_path: PathBuf,
    /// Path the transcoder is expected to write
    pub target_path: PathBuf,
    /// Directory containing the source file
    pub directory: PathBuf,
    /// File name of the source, without directory
    pub filename: String,
}

impl FileDescriptor {
    /// Describe `path`, replacing its extension with `target_extension` for the target
    pub fn new(path: &Path, target_extension: Option<&str>) -> Self {
        let target_path = match target_extension {
            Some(ext) => path.with_extension(ext),
            None => path.to_path_buf(),
        };

        Self {
            source_path: path.to_path_buf(),
            target_path,
            directory: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            filename: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }

    /// File name of the target path
    pub fn target_filename(&self) -> String {
        self.target_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
