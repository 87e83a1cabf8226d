//! Add-to-library command

mod helpers;

use helpers::{orchestrator, Album, Call, RecordingTools, Tool};
use tuner::TunerError;
use tuner_common::events::{EventKind, TunerCommand, TunerEvent};

#[tokio::test]
async fn test_requires_marker() {
    let album = Album::with_files(&["track1.m4a"]);
    let tools = RecordingTools::new();
    let (orchestrator, log) = orchestrator(&tools, false);

    let err = orchestrator.add_to_library(album.path()).await.unwrap_err();

    assert!(matches!(
        err,
        TunerError::Precondition {
            command: TunerCommand::Add,
            ..
        }
    ));
    assert_eq!(tools.call_count(), 0);
    assert_eq!(log.kinds(), vec![EventKind::Start, EventKind::Error]);
}

#[tokio::test]
async fn test_adds_each_transcoded_track_in_order() {
    let album = Album::with_files(&[".processed", "cover.jpg", "a.m4a", "a.flac", "b.M4A"]);
    let tools = RecordingTools::new();
    let (orchestrator, log) = orchestrator(&tools, false);

    let session = orchestrator.add_to_library(album.path()).await.unwrap();

    assert_eq!(session.total_files, 2);
    assert_eq!(
        tools.calls(),
        vec![
            Call::Add {
                file: album.join("a.m4a")
            },
            Call::Add {
                file: album.join("b.M4A")
            },
        ]
    );
    assert_eq!(log.filenames(EventKind::FileAdded), vec!["a.m4a", "b.M4A"]);
    assert_eq!(log.count(EventKind::End), 1);
}

#[tokio::test]
async fn test_library_failure_stops_adding() {
    let album = Album::with_files(&[".processed", "a.m4a", "b.m4a", "c.m4a"]);
    let tools = RecordingTools::new();
    tools.fail_on(Tool::Library, "b.m4a");
    let (orchestrator, log) = orchestrator(&tools, false);

    let err = orchestrator.add_to_library(album.path()).await.unwrap_err();

    assert!(err.is_collaborator_failure());
    assert_eq!(tools.call_count(), 2);
    assert_eq!(log.filenames(EventKind::FileAdded), vec!["a.m4a"]);
}

#[tokio::test]
async fn test_dry_run_skips_library() {
    let files = [".processed", "a.m4a", "b.m4a"];

    let live_album = Album::with_files(&files);
    let (live, live_log) = orchestrator(&RecordingTools::new(), false);
    live.add_to_library(live_album.path()).await.unwrap();

    let dry_album = Album::with_files(&files);
    let dry_tools = RecordingTools::new();
    let (dry, dry_log) = orchestrator(&dry_tools, true);
    dry.add_to_library(dry_album.path()).await.unwrap();

    assert_eq!(dry_tools.call_count(), 0);
    assert_eq!(dry_log.shape(), live_log.shape());
    assert!(matches!(
        dry_log.events().first(),
        Some(TunerEvent::Start { dry_run: true, .. })
    ));
}
