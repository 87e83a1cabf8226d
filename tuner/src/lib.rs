//! tuner - batch audio conversion engine
//!
//! Converts a directory of lossless tracks: regenerates a thumbnail cover,
//! transcodes every track through an external codec tool, embeds the
//! thumbnail and records completion so source material can later be removed
//! safely.
//!
//! # Modules
//! - [`workflow`]: step, plan and the serial fail-fast runner
//! - [`services`]: discovery, artwork, completion marker, tools, orchestrator
//! - [`models`]: per-command session state machine
//! - [`reporters`]: console consumers of the event stream

pub mod error;
pub mod models;
pub mod reporters;
pub mod services;
pub mod workflow;

pub use error::{TunerError, TunerResult};
pub use models::{ConversionSession, WorkflowState};
pub use services::{Collaborators, WorkflowOrchestrator};
pub use workflow::{run_series, SeriesFailure, Step, StepOutput, WorkflowPlan};
