//! PROCESSING_FILES: one composed step per track

use super::WorkflowOrchestrator;
use crate::models::{SessionHandle, WorkflowState};
use crate::workflow::{build_track_step, Step, StepOutput, TrackContext};
use std::path::Path;
use tuner_common::FileDescriptor;

impl WorkflowOrchestrator {
    /// Track steps in discovery order
    ///
    /// The first track's prelude enters PROCESSING_FILES. A directory without
    /// tracks goes straight from artwork to clean-up.
    pub(super) fn phase_tracks(
        &self,
        session: &SessionHandle,
        directory: &Path,
        files: Vec<FileDescriptor>,
    ) -> Vec<Step<StepOutput>> {
        let ctx = TrackContext {
            events: self.event_bus.clone(),
            transcoder: self.collaborators.transcoder.clone(),
            embedder: self.collaborators.embedder.clone(),
            format: self.config.target_format,
            thumbnail: directory.join(&self.config.thumbnail_name),
            dry_run: self.dry_run,
        };

        let total = files.len();
        files
            .into_iter()
            .enumerate()
            .map(|(index, file)| {
                let step = build_track_step(&ctx, file, index, total);
                if index == 0 {
                    let session = session.clone();
                    step.with_prelude(move || {
                        session.enter(WorkflowState::ProcessingFiles);
                    })
                } else {
                    step
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConversionSession;
    use crate::services::tools::Collaborators;
    use tuner_common::config::TomlConfig;
    use tuner_common::events::{EventBus, TunerCommand};

    fn orchestrator() -> WorkflowOrchestrator {
        let config = TomlConfig::default();
        let collaborators = Collaborators::from_config(&config);
        WorkflowOrchestrator::new(config, collaborators, EventBus::new(8)).unwrap()
    }

    #[test]
    fn test_no_tracks_never_enters_processing() {
        let directory = Path::new("/music/album");
        let session = SessionHandle::new(ConversionSession::new(
            TunerCommand::Convert,
            directory.to_path_buf(),
        ));

        let steps = orchestrator().phase_tracks(&session, directory, Vec::new());

        assert!(steps.is_empty());
        assert_eq!(session.state(), WorkflowState::Idle);
    }

    #[test]
    fn test_first_track_enters_processing() {
        let directory = Path::new("/music/album");
        let session = SessionHandle::new(ConversionSession::new(
            TunerCommand::Convert,
            directory.to_path_buf(),
        ));
        let files = vec![
            FileDescriptor::new(&directory.join("1.flac"), Some("m4a")),
            FileDescriptor::new(&directory.join("2.flac"), Some("m4a")),
        ];

        let mut steps = orchestrator().phase_tracks(&session, directory, files);
        assert_eq!(steps.len(), 2);
        assert_eq!(session.state(), WorkflowState::Idle);

        let _first = steps.remove(0).invoke();
        assert_eq!(session.state(), WorkflowState::ProcessingFiles);
    }
}
