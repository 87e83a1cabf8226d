//! Human-oriented progress reporter

use super::Sink;
use chrono::{DateTime, Local, Utc};
use std::sync::{Arc, Mutex, PoisonError};
use tuner_common::events::{EventBus, EventKind, TunerEvent};
use tuner_common::human_time::format_clock;

const OK: &str = "✓";

/// Counters collected while a command runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportStats {
    pub files: usize,
    pub converted: usize,
    pub removed: usize,
    pub added: usize,
    pub errors: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// Prints one line per track and a summary at the end
///
/// ```text
///  > 01 Intro.flac ✓
///  > 02 Song.flac ✓
///
/// Total Files: 2
/// Total Time: 0:00:41
/// Finished on: Monday 19 October 2026 21:04:11
/// ```
#[derive(Clone)]
pub struct DetailedReporter {
    sink: Sink,
    stats: Arc<Mutex<ReportStats>>,
}

impl DetailedReporter {
    pub fn new(sink: Sink) -> Self {
        Self {
            sink,
            stats: Arc::new(Mutex::new(ReportStats::default())),
        }
    }

    /// Register handlers on `bus`
    pub fn attach(&self, bus: &EventBus) {
        let handlers: [(EventKind, fn(&DetailedReporter, &TunerEvent)); 7] = [
            (EventKind::Start, Self::on_start),
            (EventKind::PreparingTrack, Self::on_preparing_track),
            (EventKind::TrackProcessed, Self::on_track_processed),
            (EventKind::FileRemoved, Self::on_file_removed),
            (EventKind::FileAdded, Self::on_file_added),
            (EventKind::End, Self::on_end),
            (EventKind::Error, Self::on_error),
        ];
        for (kind, handler) in handlers {
            let reporter = self.clone();
            bus.on(kind, move |event| handler(&reporter, event));
        }

        let reporter = self.clone();
        bus.on(EventKind::CleanDirectoryError, move |event| reporter.on_error(event));
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> ReportStats {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn update(&self, f: impl FnOnce(&mut ReportStats)) {
        f(&mut self.stats.lock().unwrap_or_else(PoisonError::into_inner));
    }

    fn on_start(&self, event: &TunerEvent) {
        if let TunerEvent::Start {
            timestamp, dry_run, ..
        } = event
        {
            self.update(|s| s.started_at = Some(*timestamp));
            if *dry_run {
                self.sink.write("(dry run, nothing will be changed)\n");
            }
        }
    }

    fn on_preparing_track(&self, event: &TunerEvent) {
        if let Some(file) = event.file() {
            self.update(|s| s.files += 1);
            self.sink.write(&format!(" > {}", file.filename));
        }
    }

    fn on_track_processed(&self, _event: &TunerEvent) {
        self.update(|s| s.converted += 1);
        self.sink.write(&format!(" {}\n", OK));
    }

    fn on_file_removed(&self, event: &TunerEvent) {
        if let TunerEvent::FileRemoved { file, dry_run } = event {
            self.update(|s| {
                s.files += 1;
                s.removed += 1;
            });
            let verb = if *dry_run { "would remove" } else { "removed" };
            self.sink
                .write(&format!(" {} {}\n", verb, file.source_path.display()));
        }
    }

    fn on_file_added(&self, event: &TunerEvent) {
        if let TunerEvent::FileAdded { file, dry_run } = event {
            self.update(|s| {
                s.files += 1;
                s.added += 1;
            });
            let verb = if *dry_run { "would add" } else { "added" };
            self.sink
                .write(&format!(" {} {}\n", verb, file.source_path.display()));
        }
    }

    fn on_error(&self, event: &TunerEvent) {
        let message = match event {
            TunerEvent::Error { step, message, .. } if !step.is_empty() => {
                format!("{} ({})", message, step.join(" / "))
            }
            TunerEvent::Error { message, .. } => message.clone(),
            TunerEvent::CleanDirectoryError { message, .. } => message.clone(),
            _ => return,
        };
        self.update(|s| s.errors += 1);
        self.sink.write(&format!("\nerror: {}\n", message));
    }

    fn on_end(&self, event: &TunerEvent) {
        if let TunerEvent::End {
            ended_at,
            elapsed_ms,
            total_files,
            ..
        } = event
        {
            self.update(|s| s.ended_at = Some(*ended_at));
            self.sink
                .write(&summary(*total_files, *elapsed_ms, *ended_at));
        }
    }
}

fn summary(files: usize, elapsed_ms: i64, ended_at: DateTime<Utc>) -> String {
    format!(
        "\nTotal Files: {}\nTotal Time: {}\nFinished on: {}\n\n",
        files,
        format_clock(elapsed_ms / 1000),
        ended_at
            .with_timezone(&Local)
            .format("%A %d %B %Y %H:%M:%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::SharedBuffer;
    use std::path::{Path, PathBuf};
    use tuner_common::events::TunerCommand;
    use tuner_common::FileDescriptor;

    fn track(name: &str) -> FileDescriptor {
        FileDescriptor::new(&Path::new("/music/album").join(name), Some("m4a"))
    }

    #[test]
    fn test_track_lines_and_summary() {
        let bus = EventBus::new(16);
        let buffer = SharedBuffer::new();
        let reporter = DetailedReporter::new(Sink::new(buffer.clone()));
        reporter.attach(&bus);

        let now = Utc::now();
        bus.emit(TunerEvent::Start {
            command: TunerCommand::Convert,
            directory: PathBuf::from("/music/album"),
            dry_run: false,
            timestamp: now,
        });
        for name in ["1.flac", "2.flac"] {
            bus.emit(TunerEvent::PreparingTrack {
                file: track(name),
                index: 0,
                total: 2,
            });
            bus.emit(TunerEvent::TrackProcessed { file: track(name) });
        }
        bus.emit(TunerEvent::End {
            command: TunerCommand::Convert,
            directory: PathBuf::from("/music/album"),
            started_at: now,
            ended_at: now,
            elapsed_ms: 3_723_000,
            total_files: 2,
        });

        let out = buffer.contents();
        assert!(out.starts_with(" > 1.flac ✓\n > 2.flac ✓\n"));
        assert!(out.contains("Total Files: 2\n"));
        assert!(out.contains("Total Time: 1:02:03\n"));
        assert!(out.contains("Finished on: "));

        let stats = reporter.stats();
        assert_eq!(stats.files, 2);
        assert_eq!(stats.converted, 2);
        assert_eq!(stats.errors, 0);
    }

    #[test]
    fn test_summary_uses_engine_total() {
        let bus = EventBus::new(16);
        let buffer = SharedBuffer::new();
        let reporter = DetailedReporter::new(Sink::new(buffer.clone()));
        reporter.attach(&bus);

        let now = Utc::now();
        bus.emit(TunerEvent::End {
            command: TunerCommand::Clean,
            directory: PathBuf::from("/music/album"),
            started_at: now,
            ended_at: now,
            elapsed_ms: 0,
            total_files: 5,
        });

        assert!(buffer.contents().contains("Total Files: 5\n"));
        assert_eq!(reporter.stats().files, 0);
    }

    #[test]
    fn test_errors_printed() {
        let bus = EventBus::new(16);
        let buffer = SharedBuffer::new();
        let reporter = DetailedReporter::new(Sink::new(buffer.clone()));
        reporter.attach(&bus);

        bus.emit(TunerEvent::CleanDirectoryError {
            directory: PathBuf::from("/music/album"),
            message: "no marker".to_string(),
        });
        bus.emit(TunerEvent::Error {
            command: TunerCommand::Convert,
            directory: PathBuf::from("/music/album"),
            stage: "PROCESSING_FILES".to_string(),
            step: vec!["track 1.flac".to_string(), "transcode".to_string()],
            location: vec![1, 1],
            message: "xld failed".to_string(),
        });

        let out = buffer.contents();
        assert!(out.contains("error: no marker\n"));
        assert!(out.contains("error: xld failed (track 1.flac / transcode)\n"));
        assert_eq!(reporter.stats().errors, 2);
    }
}
