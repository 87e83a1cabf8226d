//! `add`: hand converted tracks to the music library

use super::WorkflowOrchestrator;
use crate::error::TunerResult;
use crate::models::{ConversionSession, WorkflowState};
use crate::workflow::{Step, StepOutput, WorkflowPlan};
use std::path::Path;
use tuner_common::events::{TunerCommand, TunerEvent};

impl WorkflowOrchestrator {
    /// Add every transcoded track to the library, one at a time
    ///
    /// Guarded by the completion marker; a missing marker fails with a
    /// `Precondition` error reported through the `error` event.
    pub async fn add_to_library(&self, directory: &Path) -> TunerResult<ConversionSession> {
        let session = self.start(TunerCommand::Add, directory);

        if let Err(error) = self.marker(directory).require(TunerCommand::Add).await {
            return Err(self.fail(&session, error));
        }

        let files = match self.scanner(&self.target_pattern).discover(directory) {
            Ok(files) => files,
            Err(e) => return Err(self.fail(&session, e)),
        };
        session.set_total_files(files.len());

        tracing::info!(
            directory = %directory.display(),
            files = files.len(),
            dry_run = self.dry_run,
            "Adding to library"
        );

        let mut plan = WorkflowPlan::new();
        for (index, file) in files.into_iter().enumerate() {
            let events = self.event_bus.clone();
            let library = self.collaborators.library.clone();
            let dry_run = self.dry_run;
            let step = Step::new(format!("add {}", file.filename), move || async move {
                if !dry_run {
                    library.add(&file.source_path).await?;
                }
                events.emit(TunerEvent::FileAdded {
                    file: file.clone(),
                    dry_run,
                });
                Ok(StepOutput::Added(file))
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
