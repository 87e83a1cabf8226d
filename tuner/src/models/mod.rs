//! Data models

pub mod session;

pub use session::{ConversionSession, SessionHandle, StateTransition, WorkflowState};
