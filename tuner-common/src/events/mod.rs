//! Event types for the tuner event system
//!
//! The engine never writes to the console. Everything a user sees is derived
//! from the [`TunerEvent`] stream published on an [`EventBus`].

mod kind;

pub use kind::EventKind;

use crate::FileDescriptor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

/// Top-level command an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TunerCommand {
    /// Transcode a directory and embed artwork
    Convert,
    /// Delete source material after a successful conversion
    Clean,
    /// Hand converted tracks to the music library
    Add,
}

impl TunerCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            TunerCommand::Convert => "convert",
            TunerCommand::Clean => "clean",
            TunerCommand::Add => "add",
        }
    }
}

impl fmt::Display for TunerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tuner lifecycle events
///
/// Serialized with a `type` tag carrying the event name, e.g.
/// `{"type":"trackProcessed","file":{...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TunerEvent {
    /// A command started on a directory
    Start {
        command: TunerCommand,
        directory: PathBuf,
        dry_run: bool,
        timestamp: DateTime<Utc>,
    },

    /// Shared artwork is being prepared
    PreparingDirectory {
        directory: PathBuf,
        /// Cover image the thumbnail is made from
        artwork: PathBuf,
        /// Thumbnail written for embedding
        thumbnail: PathBuf,
    },

    /// A track's sub-pipeline started
    PreparingTrack {
        file: FileDescriptor,
        /// 0-based position among the directory's tracks
        index: usize,
        total: usize,
    },

    /// The transcoder finished a track
    TrackConverted { file: FileDescriptor },

    /// Artwork was embedded into the transcoded track
    ArtworkEmbedded { file: FileDescriptor },

    /// A track's sub-pipeline finished
    TrackProcessed { file: FileDescriptor },

    /// A file was deleted by `clean` (or would have been, in dry-run)
    FileRemoved { file: FileDescriptor, dry_run: bool },

    /// A file was handed to the music library (or would have been, in dry-run)
    FileAdded { file: FileDescriptor, dry_run: bool },

    /// `clean` refused to run
    CleanDirectoryError { directory: PathBuf, message: String },

    /// A command finished successfully
    End {
        command: TunerCommand,
        directory: PathBuf,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        elapsed_ms: i64,
        total_files: usize,
    },

    /// A command failed; nothing after the failing step ran
    Error {
        command: TunerCommand,
        directory: PathBuf,
        /// Workflow state the failure happened in
        stage: String,
        /// Labels of the failing step, outermost first
        step: Vec<String>,
        /// Indexes of the failing step, outermost first
        location: Vec<usize>,
        /// Root-cause message
        message: String,
    },
}

impl TunerEvent {
    /// Kind used to route the event to per-kind handlers
    pub fn kind(&self) -> EventKind {
        match self {
            TunerEvent::Start { .. } => EventKind::Start,
            TunerEvent::PreparingDirectory { .. } => EventKind::PreparingDirectory,
            TunerEvent::PreparingTrack { .. } => EventKind::PreparingTrack,
            TunerEvent::TrackConverted { .. } => EventKind::TrackConverted,
            TunerEvent::ArtworkEmbedded { .. } => EventKind::ArtworkEmbedded,
            TunerEvent::TrackProcessed { .. } => EventKind::TrackProcessed,
            TunerEvent::FileRemoved { .. } => EventKind::FileRemoved,
            TunerEvent::FileAdded { .. } => EventKind::FileAdded,
            TunerEvent::CleanDirectoryError { .. } => EventKind::CleanDirectoryError,
            TunerEvent::End { .. } => EventKind::End,
            TunerEvent::Error { .. } => EventKind::Error,
        }
    }

    /// File the event is about, if any
    pub fn file(&self) -> Option<&FileDescriptor> {
        match self {
            TunerEvent::PreparingTrack { file, .. }
            | TunerEvent::TrackConverted { file }
            | TunerEvent::ArtworkEmbedded { file }
            | TunerEvent::TrackProcessed { file }
            | TunerEvent::FileRemoved { file, .. }
            | TunerEvent::FileAdded { file, .. } => Some(file),
            _ => None,
        }
    }
}

/// Handler invoked for each event of a subscribed kind
pub type EventHandler = Arc<dyn Fn(&TunerEvent) + Send + Sync>;

/// Event distribution
///
/// Two ways to listen:
/// - [`EventBus::on`] registers a handler for one event kind. Handlers run on
///   the emitting task, in registration order, before `emit` returns, so they
///   observe events in exactly the order the engine produced them.
/// - [`EventBus::subscribe`] returns a broadcast receiver of every event for
///   consumers living on another task.
///
/// Cloning is cheap; clones share handlers and the broadcast channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<TunerEvent>,
    capacity: usize,
    handlers: Arc<RwLock<HashMap<EventKind, Vec<EventHandler>>>>,
}

impl EventBus {
    /// Creates a new EventBus whose broadcast channel buffers `capacity` events
    ///
    /// # Examples
    ///
    /// ```
    /// use tuner_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// assert_eq!(event_bus.capacity(), 100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            capacity,
            handlers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a handler for one event kind
    ///
    /// # Examples
    ///
    /// ```
    /// use tuner_common::events::{EventBus, EventKind};
    ///
    /// let event_bus = EventBus::new(16);
    /// event_bus.on(EventKind::TrackProcessed, |event| {
    ///     println!("done: {:?}", event.file());
    /// });
    /// assert_eq!(event_bus.handler_count(EventKind::TrackProcessed), 1);
    /// ```
    pub fn on<F>(&self, kind: EventKind, handler: F)
    where
        F: Fn(&TunerEvent) + Send + Sync + 'static,
    {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(kind)
            .or_default()
            .push(Arc::new(handler));
    }

    /// Register one handler for every event kind
    pub fn on_all<F>(&self, handler: F)
    where
        F: Fn(&TunerEvent) + Send + Sync + 'static,
    {
        let handler: EventHandler = Arc::new(handler);
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        for kind in EventKind::ALL {
            handlers.entry(kind).or_default().push(Arc::clone(&handler));
        }
    }

    /// Subscribe to all future events on a broadcast channel
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<TunerEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to registered handlers and broadcast subscribers
    ///
    /// Returns how many handlers and subscribers received it. Having no
    /// listener at all is not an error.
    pub fn emit(&self, event: TunerEvent) -> usize {
        // Handlers are cloned out so a handler may itself call `on`
        let handlers: Vec<EventHandler> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&event.kind())
            .cloned()
            .unwrap_or_default();

        for handler in &handlers {
            handler(&event);
        }

        let receivers = self.tx.send(event).unwrap_or(0);
        handlers.len() + receivers
    }

    /// Number of handlers registered for a kind
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Current number of broadcast subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured broadcast channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
