//! Music library hand-off

use super::{LibraryAdder, ToolCommand};
use crate::error::{TunerError, TunerResult};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tuner_common::config::FILE_PLACEHOLDER;

/// Runs a configured argv template with `{file}` replaced by the track path
#[derive(Debug, Clone)]
pub struct CommandLibraryAdder {
    template: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandLibraryAdder {
    pub fn new(template: Vec<String>, timeout: Option<Duration>) -> Self {
        Self { template, timeout }
    }

    pub(crate) fn command(&self, file: &Path) -> TunerResult<ToolCommand> {
        let path = file.to_string_lossy();
        let mut argv = self
            .template
            .iter()
            .map(|part| part.replace(FILE_PLACEHOLDER, &path));

        let program = argv.next().ok_or_else(|| {
            TunerError::Common(tuner_common::Error::Config(
                "tools.library_add must name a program".to_string(),
            ))
        })?;

        Ok(ToolCommand::new(program).args(argv).timeout(self.timeout))
    }
}

#[async_trait]
impl LibraryAdder for CommandLibraryAdder {
    async fn add(&self, file: &Path) -> TunerResult<()> {
        self.command(file)?.run().await?.log("library");
        Ok(())
    }
}
