//! Workflow orchestrator
//!
//! Assembles the plan for one command on one directory, drives it through
//! the serial step runner and publishes lifecycle events.
//!
//! # State Progression (convert)
//! IDLE → PREPARING_ARTWORK → PROCESSING_FILES → CLEANING_UP → DONE
//!
//! Any failing step moves the session to FAILED; nothing after it runs.
//!
//! # Architecture
//! Each state contributes steps through a dedicated `phase_*` method. Every
//! step entering a new state does so in its prelude, so the session state
//! always names the stage the running step belongs to:
//!
//! - **PREPARING_ARTWORK** (`phase_artwork`): resolve the cover, make the thumbnail
//! - **PROCESSING_FILES** (`phase_tracks`): one composed step per track
//! - **CLEANING_UP** (`phase_cleanup`): write the completion marker, drop the thumbnail
//!
//! `clean` and `add` are guarded by the completion marker and live in their
//! own modules.

mod clean;
mod library;
mod phase_artwork;
mod phase_cleanup;
mod phase_tracks;

use crate::error::{TunerError, TunerResult};
use crate::models::{ConversionSession, SessionHandle, WorkflowState};
use crate::services::file_scanner::FileScanner;
use crate::services::tools::Collaborators;
use crate::services::CompletionMarker;
use crate::workflow::{StepOutput, WorkflowPlan};
use chrono::Utc;
use regex::Regex;
use std::path::Path;
use tuner_common::config::TomlConfig;
use tuner_common::events::{EventBus, EventKind, TunerCommand, TunerEvent};
use tuner_common::human_time::format_elapsed_ms;

/// Workflow orchestrator service
pub struct WorkflowOrchestrator {
    config: TomlConfig,
    collaborators: Collaborators,
    event_bus: EventBus,
    source_pattern: Regex,
    clean_pattern: Regex,
    target_pattern: Regex,
    dry_run: bool,
}

impl WorkflowOrchestrator {
    /// Create new workflow orchestrator
    ///
    /// # Errors
    /// A `Common` error if the config does not validate.
    pub fn new(
        config: TomlConfig,
        collaborators: Collaborators,
        event_bus: EventBus,
    ) -> TunerResult<Self> {
        config.validate()?;
        Ok(Self {
            source_pattern: config.source_regex()?,
            clean_pattern: config.clean_regex()?,
            target_pattern: config.target_regex()?,
            config,
            collaborators,
            event_bus,
            dry_run: false,
        })
    }

    /// Suppress every mutating call while keeping discovery and events
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Register an event handler for one event kind
    pub fn on<F>(&self, kind: EventKind, handler: F)
    where
        F: Fn(&TunerEvent) + Send + Sync + 'static,
    {
        self.event_bus.on(kind, handler);
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn config(&self) -> &TomlConfig {
        &self.config
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Run `command` against `directory`
    pub async fn run(
        &self,
        command: TunerCommand,
        directory: &Path,
    ) -> TunerResult<ConversionSession> {
        match command {
            TunerCommand::Convert => self.convert(directory).await,
            TunerCommand::Clean => self.clean(directory).await,
            TunerCommand::Add => self.add_to_library(directory).await,
        }
    }

    /// Convert every source track in `directory`
    ///
    /// Plan: prepare artwork → one step per track → write marker → remove
    /// thumbnail. A directory without a supported cover fails in the first
    /// step, before any track is touched.
    pub async fn convert(&self, directory: &Path) -> TunerResult<ConversionSession> {
        let session = self.start(TunerCommand::Convert, directory);

        let files = match self
            .scanner(&self.source_pattern)
            .with_target_extension(self.config.target_format.extension())
            .discover(directory)
        {
            Ok(files) => files,
            Err(e) => return Err(self.fail(&session, e)),
        };
        session.set_total_files(files.len());

        tracing::info!(
            directory = %directory.display(),
            tracks = files.len(),
            format = %self.config.target_format,
            dry_run = self.dry_run,
            "Converting directory"
        );

        let mut plan = WorkflowPlan::new();
        plan.push(self.phase_artwork(&session, directory));
        plan.extend(self.phase_tracks(&session, directory, files));
        plan.extend(self.phase_cleanup(&session, directory));

        self.execute(session, plan).await
    }

    fn start(&self, command: TunerCommand, directory: &Path) -> SessionHandle {
        let session = ConversionSession::new(command, directory.to_path_buf());
        tracing::info!(
            session_id = %session.session_id,
            command = %command,
            directory = %directory.display(),
            "Starting"
        );
        let handle = SessionHandle::new(session);
        self.event_bus.emit(TunerEvent::Start {
            command,
            directory: directory.to_path_buf(),
            dry_run: self.dry_run,
            timestamp: Utc::now(),
        });
        handle
    }

    fn scanner(&self, pattern: &Regex) -> FileScanner {
        FileScanner::new(pattern.clone()).with_max_depth(self.config.max_depth)
    }

    fn marker(&self, directory: &Path) -> CompletionMarker {
        CompletionMarker::new(directory, &self.config.marker_name)
    }

    /// Drive `plan` to completion and publish the outcome
    async fn execute(
        &self,
        session: SessionHandle,
        plan: WorkflowPlan<StepOutput>,
    ) -> TunerResult<ConversionSession> {
        match plan.run().await {
            Ok(_) => Ok(self.complete(&session)),
            Err(failure) => Err(self.fail(&session, TunerError::StepFailed(Box::new(failure)))),
        }
    }

    fn complete(&self, session: &SessionHandle) -> ConversionSession {
        session.enter(WorkflowState::Done);
        let done = session.snapshot();
        let ended_at = done.ended_at.unwrap_or_else(Utc::now);

        tracing::info!(
            session_id = %done.session_id,
            total_files = done.total_files,
            elapsed = %format_elapsed_ms(done.elapsed_ms()),
            "Finished"
        );
        self.event_bus.emit(TunerEvent::End {
            command: done.command,
            directory: done.directory.clone(),
            started_at: done.started_at,
            ended_at,
            elapsed_ms: done.elapsed_ms(),
            total_files: done.total_files,
        });
        done
    }

    /// Move to FAILED and publish the first failure verbatim
    fn fail(&self, session: &SessionHandle, error: TunerError) -> TunerError {
        let stage = session.state();
        session.enter(WorkflowState::Failed);
        let failed = session.snapshot();

        let (step, location) = match &error {
            TunerError::StepFailed(failure) => (failure.labels(), failure.location()),
            _ => (Vec::new(), Vec::new()),
        };
        let message = error.root_cause().to_string();

        tracing::error!(
            session_id = %failed.session_id,
            stage = %stage,
            step = ?step,
            location = ?location,
            "Failed: {}",
            message
        );
        self.event_bus.emit(TunerEvent::Error {
            command: failed.command,
            directory: failed.directory,
            stage: stage.to_string(),
            step,
            location,
            message,
        });
        error
    }
}
