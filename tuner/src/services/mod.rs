//! Engine services
//!
//! - Discovery of the files a command operates on
//! - Cover artwork resolution
//! - The completion marker guarding destructive commands
//! - External tool collaborators
//! - The workflow orchestrator tying them together

pub mod artwork;
pub mod completion_marker;
pub mod file_scanner;
pub mod tools;
pub mod workflow_orchestrator;

pub use artwork::ArtworkDescriptor;
pub use completion_marker::CompletionMarker;
pub use file_scanner::{discover, FileScanner};
pub use tools::{
    ArtworkEmbedder, ArtworkResizer, Collaborators, LibraryAdder, ToolCommand, Transcoder,
};
pub use workflow_orchestrator::WorkflowOrchestrator;
