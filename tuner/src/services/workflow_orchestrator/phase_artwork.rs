//! PREPARING_ARTWORK: cover resolution and thumbnail generation

use super::WorkflowOrchestrator;
use crate::models::{SessionHandle, WorkflowState};
use crate::services::ArtworkDescriptor;
use crate::workflow::{Step, StepOutput};
use std::path::Path;
use tuner_common::events::TunerEvent;

impl WorkflowOrchestrator {
    /// Step resolving the cover and producing the shared thumbnail
    ///
    /// Fails with `MissingArtwork` when the directory has no supported cover.
    pub(super) fn phase_artwork(&self, session: &SessionHandle, directory: &Path) -> Step<StepOutput> {
        let session = session.clone();
        let directory = directory.to_path_buf();
        let cover_names = self.config.cover_names.clone();
        let thumbnail_name = self.config.thumbnail_name.clone();
        let resizer = self.collaborators.resizer.clone();
        let events = self.event_bus.clone();
        let dry_run = self.dry_run;

        Step::new("prepare artwork", move || async move {
            let artwork = ArtworkDescriptor::resolve(&directory, &cover_names, &thumbnail_name)?;
            let cover = artwork.require_cover(&directory, &cover_names)?.to_path_buf();

            events.emit(TunerEvent::PreparingDirectory {
                directory: directory.clone(),
                artwork: cover.clone(),
                thumbnail: artwork.target_thumbnail.clone(),
            });

            if !dry_run {
                resizer.resize(&cover, &artwork.target_thumbnail).await?;
            }
            tracing::debug!(thumbnail = %artwork.target_thumbnail.display(), "Artwork prepared");
            Ok(StepOutput::Thumbnail(artwork.target_thumbnail))
        })
        .with_prelude(move || {
            session.enter(WorkflowState::PreparingArtwork);
        })
    }
}
