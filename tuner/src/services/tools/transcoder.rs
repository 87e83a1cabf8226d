//! XLD transcoder

use super::{ToolCommand, Transcoder};
use crate::error::TunerResult;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tuner_common::AudioFormat;

/// Runs `<program> -f <format> -o <output_directory> <source>`
#[derive(Debug, Clone)]
pub struct XldTranscoder {
    program: String,
    timeout: Option<Duration>,
}

impl XldTranscoder {
    pub fn new(program: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub(crate) fn command(
        &self,
        source: &Path,
        format: AudioFormat,
        output_directory: &Path,
    ) -> ToolCommand {
        ToolCommand::new(&self.program)
            .arg("-f")
            .arg(format.as_str())
            .arg("-o")
            .arg(output_directory)
            .arg(source)
            .timeout(self.timeout)
    }
}

#[async_trait]
impl Transcoder for XldTranscoder {
    async fn transcode(
        &self,
        source: &Path,
        format: AudioFormat,
        output_directory: &Path,
    ) -> TunerResult<()> {
        self.command(source, format, output_directory)
            .run()
            .await?
            .log("transcoder");
        Ok(())
    }
}
