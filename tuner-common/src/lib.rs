//! # Tuner Common Library
//!
//! Shared code for the tuner engine and its command-line front end:
//! - Error type shared by all layers
//! - Configuration loading (TOML + environment + compiled defaults)
//! - Event types (TunerEvent enum) and the EventBus
//! - File descriptors produced by discovery
//! - Audio format table
//! - Human-readable time formatting

pub mod config;
pub mod descriptor;
pub mod error;
pub mod events;
pub mod formats;
pub mod human_time;

pub use descriptor::FileDescriptor;
pub use error::{Error, Result};
pub use formats::AudioFormat;
