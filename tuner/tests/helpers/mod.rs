//! Test Helper Utilities
//!
//! Shared utilities for testing tuner: recording collaborator doubles, event
//! capture and album directory fixtures.

#![allow(dead_code)]

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tuner::services::tools::{ArtworkEmbedder, ArtworkResizer, LibraryAdder, Transcoder};
use tuner::{Collaborators, TunerError, TunerResult, WorkflowOrchestrator};
use tuner_common::config::TomlConfig;
use tuner_common::events::{EventBus, EventKind, TunerEvent};
use tuner_common::AudioFormat;

/// Collaborator call recorded by [`RecordingTools`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Transcode { source: PathBuf, format: AudioFormat },
    Resize { source: PathBuf, target: PathBuf },
    Embed { artwork: PathBuf, track: PathBuf },
    Add { file: PathBuf },
}

/// Which collaborator an injected failure applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Transcoder,
    Embedder,
    Library,
}

/// Collaborator double that records calls and fakes their file effects
///
/// The transcoder writes the expected output file, the resizer writes the
/// thumbnail. A failure can be injected for one tool and file name.
#[derive(Default)]
pub struct RecordingTools {
    calls: Mutex<Vec<Call>>,
    fail_on: Mutex<Option<(Tool, String)>>,
    skip_output: Mutex<bool>,
}

impl RecordingTools {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make `tool` fail when called for a file named `filename`
    pub fn fail_on(&self, tool: Tool, filename: &str) {
        *self.fail_on.lock().unwrap() = Some((tool, filename.to_string()));
    }

    /// Make the transcoder report success without writing its output
    pub fn skip_transcoder_output(&self) {
        *self.skip_output.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn collaborators(self: &Arc<Self>) -> Collaborators {
        Collaborators {
            transcoder: self.clone(),
            resizer: self.clone(),
            embedder: self.clone(),
            library: self.clone(),
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, tool: Tool, path: &Path) -> TunerResult<()> {
        let name = path.file_name().unwrap().to_string_lossy();
        match &*self.fail_on.lock().unwrap() {
            Some((t, f)) if *t == tool && *f == name => Err(TunerError::Collaborator {
                tool: format!("{:?}", tool).to_lowercase(),
                status: "exit status: 1".to_string(),
                diagnostic: format!("injected failure for {}", name),
            }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Transcoder for RecordingTools {
    async fn transcode(
        &self,
        source: &Path,
        format: AudioFormat,
        output_directory: &Path,
    ) -> TunerResult<()> {
        self.record(Call::Transcode {
            source: source.to_path_buf(),
            format,
        });
        self.check(Tool::Transcoder, source)?;
        if !*self.skip_output.lock().unwrap() {
            let name = source.file_stem().unwrap();
            let target = output_directory
                .join(name)
                .with_extension(format.extension());
            fs::write(target, b"transcoded").unwrap();
        }
        Ok(())
    }
}

#[async_trait]
impl ArtworkResizer for RecordingTools {
    async fn resize(&self, source: &Path, target: &Path) -> TunerResult<()> {
        self.record(Call::Resize {
            source: source.to_path_buf(),
            target: target.to_path_buf(),
        });
        fs::write(target, b"thumbnail").unwrap();
        Ok(())
    }
}

#[async_trait]
impl ArtworkEmbedder for RecordingTools {
    async fn embed(&self, artwork: &Path, track: &Path) -> TunerResult<()> {
        self.record(Call::Embed {
            artwork: artwork.to_path_buf(),
            track: track.to_path_buf(),
        });
        self.check(Tool::Embedder, track)
    }
}

#[async_trait]
impl LibraryAdder for RecordingTools {
    async fn add(&self, file: &Path) -> TunerResult<()> {
        self.record(Call::Add {
            file: file.to_path_buf(),
        });
        self.check(Tool::Library, file)
    }
}

/// Every event emitted on a bus, in order
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<TunerEvent>>>,
}

impl EventLog {
    pub fn attach(bus: &EventBus) -> Self {
        let log = Self::default();
        let sink = log.events.clone();
        bus.on_all(move |event| sink.lock().unwrap().push(event.clone()));
        log
    }

    pub fn events(&self) -> Vec<TunerEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events().iter().map(TunerEvent::kind).collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.kinds().into_iter().filter(|k| *k == kind).count()
    }

    /// File names carried by events of `kind`, in order
    pub fn filenames(&self, kind: EventKind) -> Vec<String> {
        self.events()
            .iter()
            .filter(|e| e.kind() == kind)
            .filter_map(|e| e.file().map(|f| f.filename.clone()))
            .collect()
    }

    /// Event sequence with everything run-specific stripped
    pub fn shape(&self) -> Vec<String> {
        self.events()
            .iter()
            .map(|e| match e.file() {
                Some(file) => format!("{}:{}", e.kind(), file.filename),
                None => e.kind().to_string(),
            })
            .collect()
    }
}

/// Temporary album directory
pub struct Album {
    pub dir: TempDir,
}

impl Album {
    /// Album containing `files` (relative paths, parent dirs created)
    pub fn with_files(files: &[&str]) -> Self {
        let dir = TempDir::new().unwrap();
        for name in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, b"data").unwrap();
        }
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.join(name).exists()
    }

    /// All file names below the album, sorted, relative to its root
    pub fn listing(&self) -> Vec<String> {
        let mut names = Vec::new();
        collect(self.path(), self.path(), &mut names);
        names.sort();
        names
    }
}

fn collect(root: &Path, dir: &Path, names: &mut Vec<String>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect(root, &path, names);
        } else {
            let rel = path.strip_prefix(root).unwrap();
            names.push(rel.to_string_lossy().replace('\\', "/"));
        }
    }
}

/// Orchestrator wired to recording doubles, with an event log attached
pub fn orchestrator(tools: &Arc<RecordingTools>, dry_run: bool) -> (WorkflowOrchestrator, EventLog) {
    let config = TomlConfig::default();
    let bus = EventBus::new(64);
    let log = EventLog::attach(&bus);
    let orchestrator = WorkflowOrchestrator::new(config, tools.collaborators(), bus)
        .unwrap()
        .with_dry_run(dry_run);
    (orchestrator, log)
}
