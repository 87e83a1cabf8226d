//! Per-track sub-pipeline
//!
//! Every discovered track becomes one composed step running three inner
//! steps in order: announce, transcode, embed artwork. The outer plan sees
//! the track as a single unit; a failure in any inner step fails the track
//! and, with it, the whole plan. Nothing is rolled back.

use super::{Step, StepOutput, WorkflowPlan};
use crate::error::TunerError;
use crate::services::tools::{ArtworkEmbedder, Transcoder};
use std::path::PathBuf;
use std::sync::Arc;
use tuner_common::events::{EventBus, TunerEvent};
use tuner_common::{AudioFormat, FileDescriptor};

/// Everything a track step needs, shared by all tracks of a directory
#[derive(Clone)]
pub struct TrackContext {
    pub events: EventBus,
    pub transcoder: Arc<dyn Transcoder>,
    pub embedder: Arc<dyn ArtworkEmbedder>,
    pub format: AudioFormat,
    /// Thumbnail embedded into every track
    pub thumbnail: PathBuf,
    /// Skip every collaborator call, keep the events
    pub dry_run: bool,
}

/// Build the composed step for the `index`-th of `total` tracks
pub fn build_track_step(
    ctx: &TrackContext,
    file: FileDescriptor,
    index: usize,
    total: usize,
) -> Step<StepOutput> {
    let mut inner = WorkflowPlan::new();

    let announce = ctx.clone();
    let announced = file.clone();
    inner.push(Step::new("announce", move || async move {
        announce.events.emit(TunerEvent::PreparingTrack {
            file: announced,
            index,
            total,
        });
        Ok(StepOutput::Announced)
    }));

    let transcode = ctx.clone();
    let transcoded = file.clone();
    inner.push(Step::new("transcode", move || async move {
        if !transcode.dry_run {
            transcode
                .transcoder
                .transcode(
                    &transcoded.source_path,
                    transcode.format,
                    &transcoded.directory,
                )
                .await?;

            // The transcoder's exit status alone is not trusted
            let exists = tokio::fs::try_exists(&transcoded.target_path)
                .await
                .unwrap_or(false);
            if !exists {
                return Err(TunerError::Collaborator {
                    tool: "transcoder".to_string(),
                    status: "missing output".to_string(),
                    diagnostic: format!(
                        "expected {} after transcoding {}",
                        transcoded.target_path.display(),
                        transcoded.source_path.display()
                    ),
                });
            }
        }
        let target = transcoded.target_path.clone();
        transcode
            .events
            .emit(TunerEvent::TrackConverted { file: transcoded });
        Ok(StepOutput::Transcoded(target))
    }));

    let embed = ctx.clone();
    let embedded = file.clone();
    inner.push(Step::new("embed artwork", move || async move {
        if !embed.dry_run {
            embed
                .embedder
                .embed(&embed.thumbnail, &embedded.target_path)
                .await?;
        }
        let target = embedded.target_path.clone();
        embed
            .events
            .emit(TunerEvent::ArtworkEmbedded { file: embedded });
        Ok(StepOutput::Embedded(target))
    }));

    let finish = ctx.events.clone();
    let label = format!("track {}", file.filename);
    Step::compose(label, inner, move |_| {
        tracing::info!(
            file = %file.source_path.display(),
            target = %file.target_filename(),
            "Track processed"
        );
        finish.emit(TunerEvent::TrackProcessed { file: file.clone() });
        Ok(StepOutput::Track(file))
    })
}
