//! Conversion workflow state machine
//!
//! A session progresses through:
//! IDLE → PREPARING_ARTWORK → PROCESSING_FILES → CLEANING_UP → DONE
//!
//! Any failure moves it straight to FAILED. `clean` and `add` only use
//! IDLE → PROCESSING_FILES → DONE | FAILED.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tuner_common::events::TunerCommand;
use uuid::Uuid;

/// Workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowState {
    /// Nothing has run yet
    Idle,
    /// Cover resolution and thumbnail generation
    PreparingArtwork,
    /// Per-file steps
    ProcessingFiles,
    /// Completion marker and thumbnail removal
    CleaningUp,
    /// Finished successfully
    Done,
    /// Stopped at the first failing step
    Failed,
}

impl WorkflowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "IDLE",
            WorkflowState::PreparingArtwork => "PREPARING_ARTWORK",
            WorkflowState::ProcessingFiles => "PROCESSING_FILES",
            WorkflowState::CleaningUp => "CLEANING_UP",
            WorkflowState::Done => "DONE",
            WorkflowState::Failed => "FAILED",
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State transition record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub session_id: Uuid,
    pub old_state: WorkflowState,
    pub new_state: WorkflowState,
    pub transitioned_at: DateTime<Utc>,
}

/// One command run against one directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionSession {
    /// Unique session identifier
    pub session_id: Uuid,

    /// Command being run
    pub command: TunerCommand,

    /// Directory the command operates on
    pub directory: PathBuf,

    /// Current workflow state
    pub state: WorkflowState,

    /// Files discovered for the command
    pub total_files: usize,

    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl ConversionSession {
    pub fn new(command: TunerCommand, directory: PathBuf) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            command,
            directory,
            state: WorkflowState::Idle,
            total_files: 0,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Transition to new state
    pub fn transition_to(&mut self, new_state: WorkflowState) -> StateTransition {
        let transition = StateTransition {
            session_id: self.session_id,
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        self.state = new_state;

        // Set end time for terminal states
        if self.is_terminal() {
            self.ended_at = Some(transition.transitioned_at);
        }

        transition
    }

    /// Check if session is terminal (finished)
    pub fn is_terminal(&self) -> bool {
        matches!(self.state, WorkflowState::Done | WorkflowState::Failed)
    }

    /// Milliseconds from start to end (or to now while running)
    pub fn elapsed_ms(&self) -> i64 {
        let end = self.ended_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds()
    }
}

/// Session shared between the orchestrator and its steps
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<ConversionSession>>,
}

impl SessionHandle {
    pub fn new(session: ConversionSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Move to `state`, logging the transition
    pub fn enter(&self, state: WorkflowState) -> StateTransition {
        let mut session = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let transition = session.transition_to(state);
        tracing::info!(
            session_id = %transition.session_id,
            command = %session.command,
            directory = %session.directory.display(),
            "State: {} → {}",
            transition.old_state,
            transition.new_state
        );
        transition
    }

    pub fn set_total_files(&self, total: usize) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .total_files = total;
    }

    pub fn state(&self) -> WorkflowState {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).state
    }

    /// Copy of the current session
    pub fn snapshot(&self) -> ConversionSession {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
