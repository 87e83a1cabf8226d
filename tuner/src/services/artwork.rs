//! Cover artwork resolution

use crate::error::{TunerError, TunerResult};
use std::path::{Path, PathBuf};

/// Cover image and generated thumbnail for one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkDescriptor {
    /// First supported cover found, `None` when the directory has none
    pub source_cover: Option<PathBuf>,
    /// Where the thumbnail used for embedding is written
    pub target_thumbnail: PathBuf,
}

impl ArtworkDescriptor {
    /// Look up a cover in `directory`
    ///
    /// `cover_names` is tried in order; names compare case-insensitively so
    /// `Cover.JPG` counts as `cover.jpg`. Only regular files qualify.
    pub fn resolve(
        directory: &Path,
        cover_names: &[String],
        thumbnail_name: &str,
    ) -> TunerResult<Self> {
        let mut files = Vec::new();
        let entries = std::fs::read_dir(directory).map_err(|e| TunerError::Discovery {
            path: directory.to_path_buf(),
            message: e.to_string(),
        })?;
        for entry in entries {
            let entry = entry.map_err(|e| TunerError::io(directory, e))?;
            if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                files.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        let source_cover = cover_names.iter().find_map(|wanted| {
            files
                .iter()
                .find(|name| name.eq_ignore_ascii_case(wanted))
                .map(|name| directory.join(name))
        });

        Ok(Self {
            source_cover,
            target_thumbnail: directory.join(thumbnail_name),
        })
    }

    /// The cover, or [`TunerError::MissingArtwork`] naming what was looked for
    pub fn require_cover(&self, directory: &Path, cover_names: &[String]) -> TunerResult<&Path> {
        self.source_cover
            .as_deref()
            .ok_or_else(|| TunerError::MissingArtwork {
                directory: directory.to_path_buf(),
                looked_for: cover_names.join(", "),
            })
    }
}
