//! Event names used for per-kind subscription

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a [`TunerEvent`](super::TunerEvent), named the way reporters subscribe to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Start,
    PreparingDirectory,
    PreparingTrack,
    TrackConverted,
    ArtworkEmbedded,
    TrackProcessed,
    FileRemoved,
    FileAdded,
    CleanDirectoryError,
    End,
    Error,
}

impl EventKind {
    /// All event kinds
    pub const ALL: [EventKind; 11] = [
        EventKind::Start,
        EventKind::PreparingDirectory,
        EventKind::PreparingTrack,
        EventKind::TrackConverted,
        EventKind::ArtworkEmbedded,
        EventKind::TrackProcessed,
        EventKind::FileRemoved,
        EventKind::FileAdded,
        EventKind::CleanDirectoryError,
        EventKind::End,
        EventKind::Error,
    ];

    /// Event name
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Start => "start",
            EventKind::PreparingDirectory => "preparingDirectory",
            EventKind::PreparingTrack => "preparingTrack",
            EventKind::TrackConverted => "trackConverted",
            EventKind::ArtworkEmbedded => "artworkEmbedded",
            EventKind::TrackProcessed => "trackProcessed",
            EventKind::FileRemoved => "fileRemoved",
            EventKind::FileAdded => "fileAdded",
            EventKind::CleanDirectoryError => "cleanDirectoryError",
            EventKind::End => "end",
            EventKind::Error => "error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        EventKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown event name: {}", s)))
    }
}
