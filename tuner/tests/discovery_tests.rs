//! Recursive discovery

mod helpers;

use helpers::Album;
use regex::Regex;
use std::collections::BTreeSet;
use tuner::services::{discover, FileScanner};
use tuner::TunerError;

#[test]
fn test_returns_exactly_the_matching_entries() {
    let album = Album::with_files(&[
        "cover.jpg",
        "01 Intro.flac",
        "02 Song.FLAC",
        "notes.txt",
        "disc2/01 Outro.flac",
        "disc2/scans/booklet.pdf",
        "disc2/scans/hidden.flac",
    ]);

    let found = discover(album.path(), &Regex::new(r"(?i)\.flac$").unwrap()).unwrap();

    let found: BTreeSet<_> = found.into_iter().map(|d| d.source_path).collect();
    let expected: BTreeSet<_> = [
        "01 Intro.flac",
        "02 Song.FLAC",
        "disc2/01 Outro.flac",
        "disc2/scans/hidden.flac",
    ]
    .iter()
    .map(|name| album.join(name))
    .collect();
    assert_eq!(found, expected);
}

#[test]
fn test_descriptors_carry_directory_and_target() {
    let album = Album::with_files(&["disc1/01 Intro.flac"]);

    let found = FileScanner::new(Regex::new(r"\.flac$").unwrap())
        .with_target_extension("m4a")
        .discover(album.path())
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].directory, album.join("disc1"));
    assert_eq!(found[0].filename, "01 Intro.flac");
    assert_eq!(found[0].target_path, album.join("disc1/01 Intro.m4a"));
}

#[test]
fn test_order_is_deterministic() {
    let album = Album::with_files(&["b.flac", "c.flac", "a.flac"]);
    let pattern = Regex::new(r"\.flac$").unwrap();

    let names: Vec<_> = discover(album.path(), &pattern)
        .unwrap()
        .into_iter()
        .map(|d| d.filename)
        .collect();
    assert_eq!(names, vec!["a.flac", "b.flac", "c.flac"]);
}

#[test]
fn test_missing_directory_is_an_error() {
    let album = Album::with_files(&[]);
    let err = discover(&album.join("absent"), &Regex::new(".").unwrap()).unwrap_err();
    assert!(matches!(err, TunerError::Discovery { .. }));
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_not_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let album = Album::with_files(&["locked/01.flac"]);
    let locked = album.join("locked");
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

    // Root ignores permission bits
    let readable = std::fs::read_dir(&locked).is_ok();
    let result = discover(album.path(), &Regex::new(r"\.flac$").unwrap());
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

    if !readable {
        match result.unwrap_err() {
            TunerError::Discovery { path, .. } => assert_eq!(path, locked),
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[cfg(unix)]
#[test]
fn test_symlink_loops_are_not_followed() {
    let album = Album::with_files(&["01.flac"]);
    std::os::unix::fs::symlink(album.path(), album.join("loop")).unwrap();

    let found = discover(album.path(), &Regex::new(r"\.flac$").unwrap()).unwrap();
    assert_eq!(found.len(), 1);
}
