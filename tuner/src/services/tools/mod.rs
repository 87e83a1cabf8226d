//! External tool collaborators
//!
//! The engine treats every tool as opaque: a call either succeeds or reports
//! failure. Each seam is a trait so the orchestrator can be driven by test
//! doubles, while the default implementations shell out through
//! [`ToolCommand`].

mod artwork;
mod command;
mod library;
mod transcoder;

pub use artwork::{Mp4ArtEmbedder, SipsResizer};
pub use command::{ToolCommand, ToolOutput};
pub use library::CommandLibraryAdder;
pub use transcoder::XldTranscoder;

use crate::error::{TunerError, TunerResult};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tuner_common::config::TomlConfig;
use tuner_common::AudioFormat;

/// Converts one source track
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Transcode `source` into `format`, writing into `output_directory`
    async fn transcode(
        &self,
        source: &Path,
        format: AudioFormat,
        output_directory: &Path,
    ) -> TunerResult<()>;
}

/// Produces the thumbnail embedded into every track
#[async_trait]
pub trait ArtworkResizer: Send + Sync {
    async fn resize(&self, source: &Path, target: &Path) -> TunerResult<()>;

    /// Remove a generated thumbnail; already gone is fine
    async fn discard(&self, thumbnail: &Path) -> TunerResult<()> {
        match tokio::fs::remove_file(thumbnail).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TunerError::io(thumbnail, e)),
        }
    }
}

/// Embeds artwork into a transcoded track
#[async_trait]
pub trait ArtworkEmbedder: Send + Sync {
    async fn embed(&self, artwork: &Path, track: &Path) -> TunerResult<()>;
}

/// Hands a finished track to the music library
#[async_trait]
pub trait LibraryAdder: Send + Sync {
    async fn add(&self, file: &Path) -> TunerResult<()>;
}

/// The full set of collaborators used by one orchestrator
#[derive(Clone)]
pub struct Collaborators {
    pub transcoder: Arc<dyn Transcoder>,
    pub resizer: Arc<dyn ArtworkResizer>,
    pub embedder: Arc<dyn ArtworkEmbedder>,
    pub library: Arc<dyn LibraryAdder>,
}

impl Collaborators {
    /// Command-line tools as named in the config
    pub fn from_config(config: &TomlConfig) -> Self {
        let timeout = config.tool_timeout();
        Self {
            transcoder: Arc::new(XldTranscoder::new(&config.tools.transcoder, timeout)),
            resizer: Arc::new(SipsResizer::new(
                &config.tools.resizer,
                config.thumbnail_width,
                timeout,
            )),
            embedder: Arc::new(Mp4ArtEmbedder::new(&config.tools.embedder, timeout)),
            library: Arc::new(CommandLibraryAdder::new(
                config.tools.library_add.clone(),
                timeout,
            )),
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
