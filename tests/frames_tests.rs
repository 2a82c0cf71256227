//! Integration tests for frame discovery: ordering, extension filtering,
//! and the annotated-preview exclusion.

use std::fs;

use poselabel::error::Error;
use poselabel::frames::FrameSequence;
use tempfile::TempDir;

fn exts(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Discovery sorts lexicographically and that order is the navigation
/// order; identifiers carry the directory name.
#[test]
fn discovery_sorts_lexicographically() {
    let dir = TempDir::new().unwrap();
    for name in ["img010.png", "img002.png", "img001.png"] {
        fs::write(dir.path().join(name), b"png").unwrap();
    }

    let frames = FrameSequence::discover(dir.path(), &exts(&["png"])).unwrap();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames.dir(), dir.path());
    let dirname = dir.path().file_name().unwrap().to_str().unwrap();
    assert_eq!(frames.id(0).unwrap(), format!("{dirname}/img001.png"));
    assert_eq!(frames.id(1).unwrap(), format!("{dirname}/img002.png"));
    assert_eq!(frames.id(2).unwrap(), format!("{dirname}/img010.png"));
    assert_eq!(frames.index_of(&frames.id(2).unwrap()), Some(2));
}

/// Extensions match case-insensitively and anything else is ignored.
#[test]
fn discovery_filters_extensions_case_insensitively() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.png"), b"png").unwrap();
    fs::write(dir.path().join("b.PNG"), b"png").unwrap();
    fs::write(dir.path().join("c.jpg"), b"jpg").unwrap();
    fs::write(dir.path().join("notes.txt"), b"txt").unwrap();

    let frames = FrameSequence::discover(dir.path(), &exts(&["png"])).unwrap();
    assert_eq!(frames.len(), 2);

    let frames = FrameSequence::discover(dir.path(), &exts(&["png", "jpg"])).unwrap();
    assert_eq!(frames.len(), 3);
}

/// Already-rendered annotation previews never enter the sequence.
#[test]
fn discovery_skips_annotated_previews() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("img001.png"), b"png").unwrap();
    fs::write(dir.path().join("img001labeled.png"), b"png").unwrap();
    fs::write(dir.path().join("img001_labeled.png"), b"png").unwrap();

    let frames = FrameSequence::discover(dir.path(), &exts(&["png"])).unwrap();
    assert_eq!(frames.len(), 1);
    assert!(frames.id(0).unwrap().ends_with("/img001.png"));
}

/// A directory with no matching images is an error, not an empty sequence.
#[test]
fn discovery_of_an_empty_directory_errors() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("notes.txt"), b"txt").unwrap();

    assert!(matches!(
        FrameSequence::discover(dir.path(), &exts(&["png"])),
        Err(Error::NoFrames { .. })
    ));
}

/// Deleting a frame removes the file and the slot; the rest keep their
/// order.
#[test]
fn delete_drops_the_file_and_the_slot() {
    let dir = TempDir::new().unwrap();
    for name in ["img001.png", "img002.png", "img003.png"] {
        fs::write(dir.path().join(name), b"png").unwrap();
    }

    let mut frames = FrameSequence::discover(dir.path(), &exts(&["png"])).unwrap();
    let deleted_path = frames.path(1).unwrap();
    frames.delete(1).unwrap();

    assert!(!deleted_path.exists());
    assert_eq!(frames.len(), 2);
    assert!(frames.id(0).unwrap().ends_with("/img001.png"));
    assert!(frames.id(1).unwrap().ends_with("/img003.png"));
    assert!(matches!(frames.delete(5), Err(Error::FrameIndex(5))));
}
