//! Artwork resize and embed tools

use super::{ArtworkEmbedder, ArtworkResizer, ToolCommand};
use crate::error::TunerResult;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Runs `<program> --resampleWidth <width> <source> --out <target>`
#[derive(Debug, Clone)]
pub struct SipsResizer {
    program: String,
    width: u32,
    timeout: Option<Duration>,
}

impl SipsResizer {
    pub fn new(program: impl Into<String>, width: u32, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            width,
            timeout,
        }
    }

    pub(crate) fn command(&self, source: &Path, target: &Path) -> ToolCommand {
        ToolCommand::new(&self.program)
            .arg("--resampleWidth")
            .arg(self.width.to_string())
            .arg(source)
            .arg("--out")
            .arg(target)
            .timeout(self.timeout)
    }
}

#[async_trait]
impl ArtworkResizer for SipsResizer {
    async fn resize(&self, source: &Path, target: &Path) -> TunerResult<()> {
        self.command(source, target).run().await?.log("resizer");
        Ok(())
    }
}

/// Runs `<program> --add <artwork> <track>`
#[derive(Debug, Clone)]
pub struct Mp4ArtEmbedder {
    program: String,
    timeout: Option<Duration>,
}

impl Mp4ArtEmbedder {
    pub fn new(program: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub(crate) fn command(&self, artwork: &Path, track: &Path) -> ToolCommand {
        ToolCommand::new(&self.program)
            .arg("--add")
            .arg(artwork)
            .arg(track)
            .timeout(self.timeout)
    }
}

#[async_trait]
impl ArtworkEmbedder for Mp4ArtEmbedder {
    async fn embed(&self, artwork: &Path, track: &Path) -> TunerResult<()> {
        self.command(artwork, track).run().await?.log("embedder");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_argv() {
        let sips = SipsResizer::new("sips", 500, None);
        let cmd = sips.command(Path::new("/a/cover.jpg"), Path::new("/a/cover500.jpg"));
        assert_eq!(
            cmd.display(),
            "sips --resampleWidth 500 /a/cover.jpg --out /a/cover500.jpg"
        );
    }

    #[test]
    fn test_embed_argv() {
        let mp4art = Mp4ArtEmbedder::new("mp4art", None);
        let cmd = mp4art.command(Path::new("/a/cover500.jpg"), Path::new("/a/1.m4a"));
        assert_eq!(cmd.display(), "mp4art --add /a/cover500.jpg /a/1.m4a");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_discard_tolerates_missing_thumbnail() {
        let dir = tempfile::TempDir::new().unwrap();
        let thumb = dir.path().join("cover500.jpg");
        std::fs::write(&thumb, b"x").unwrap();

        let sips = SipsResizer::new("sips", 500, None);
        sips.discard(&thumb).await.unwrap();
        assert!(!thumb.exists());
        sips.discard(&thumb).await.unwrap();
    }
}
