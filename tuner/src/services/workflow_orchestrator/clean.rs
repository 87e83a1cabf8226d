//! `clean`: delete source material from a converted directory

use super::WorkflowOrchestrator;
use crate::error::{TunerError, TunerResult};
use crate::models::{ConversionSession, WorkflowState};
use crate::workflow::{Step, StepOutput, WorkflowPlan};
use std::path::Path;
use tuner_common::events::{TunerCommand, TunerEvent};

impl WorkflowOrchestrator {
    /// Delete every file matching the clean pattern set
    ///
    /// Refuses to run unless the completion marker exists: a
    /// `cleanDirectoryError` event is published, nothing is deleted and a
    /// `Precondition` error is returned. The marker itself is deleted last,
    /// so an interrupted clean can simply be run again.
    pub async fn clean(&self, directory: &Path) -> TunerResult<ConversionSession> {
        let session = self.start(TunerCommand::Clean, directory);
        let marker = self.marker(directory);

        if let Err(error) = marker.require(TunerCommand::Clean).await {
            tracing::warn!(directory = %directory.display(), "Clean refused: {}", error);
            session.enter(WorkflowState::Failed);
            self.event_bus.emit(TunerEvent::CleanDirectoryError {
                directory: directory.to_path_buf(),
                message: error.to_string(),
            });
            return Err(error);
        }

        let mut files = match self.scanner(&self.clean_pattern).discover(directory) {
            Ok(files) => files,
            Err(e) => return Err(self.fail(&session, e)),
        };
        if let Some(pos) = files.iter().position(|f| f.source_path == marker.path()) {
            let marker_file = files.remove(pos);
            files.push(marker_file);
        }
        session.set_total_files(files.len());

        tracing::info!(
            directory = %directory.display(),
            files = files.len(),
            dry_run = self.dry_run,
            "Cleaning directory"
        );

        let mut plan = WorkflowPlan::new();
        for (index, file) in files.into_iter().enumerate() {
            let events = self.event_bus.clone();
            let dry_run = self.dry_run;
            let marker = marker.clone();
            let step = Step::new(format!("remove {}", file.filename), move || async move {
                if !dry_run {
                    if file.source_path == marker.path() {
                        marker.remove().await?;
                    } else {
                        tokio::fs::remove_file(&file.source_path)
                            .await
                            .map_err(|e| TunerError::io(&file.source_path, e))?;
                    }
                }
                tracing::debug!(file = %file.source_path.display(), dry_run, "Removed");
                events.emit(TunerEvent::FileRemoved {
                    file: file.clone(),
                    dry_run,
                });
                Ok(StepOutput::Removed(file))
            });

            if index == 0 {
                let session = session.clone();
                plan.push(step.with_prelude(move || {
                    session.enter(WorkflowState::ProcessingFiles);
                }));
            } else {
                plan.push(step);
            }
        }

        self.execute(session, plan).await
    }
}
