//! CLEANING_UP: completion marker and thumbnail removal

use super::WorkflowOrchestrator;
use crate::models::{SessionHandle, WorkflowState};
use crate::workflow::{Step, StepOutput};
use std::path::Path;

impl WorkflowOrchestrator {
    /// Marker write, then thumbnail removal
    ///
    /// The marker step only runs once every track succeeded, so the marker
    /// never exists for a partially converted directory.
    pub(super) fn phase_cleanup(
        &self,
        session: &SessionHandle,
        directory: &Path,
    ) -> Vec<Step<StepOutput>> {
        let marker = self.marker(directory);
        let thumbnail = directory.join(&self.config.thumbnail_name);
        let resizer = self.collaborators.resizer.clone();
        let dry_run = self.dry_run;
        let session = session.clone();

        let write_marker = Step::new("write completion marker", move || async move {
            if !dry_run {
                marker.write().await?;
            }
            Ok(StepOutput::Marker(marker.path().to_path_buf()))
        })
        .with_prelude(move || {
            session.enter(WorkflowState::CleaningUp);
        });

        let remove_thumbnail = Step::new("remove thumbnail", move || async move {
            if !dry_run {
                resizer.discard(&thumbnail).await?;
            }
            Ok(StepOutput::ThumbnailRemoved(thumbnail))
        });

        vec![write_marker, remove_thumbnail]
    }
}
