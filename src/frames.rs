//! Frame discovery and ordering.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Error;

/// The ordered frames of one extracted-frames directory.
///
/// Frame identifiers are `<directory-name>/<file-name>`, matching how the
/// annotation table keys its rows. Lexicographic file-name order doubles as
/// the navigation order.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    dir: PathBuf,
    label: String,
    names: Vec<String>,
}

impl FrameSequence {
    /// Scan `dir` for frame images with any of `extensions`, matched
    /// case-insensitively. Already-rendered annotation previews (file stems
    /// ending in `labeled`) are skipped. An empty result is an error.
    pub fn discover(dir: &Path, extensions: &[String]) -> Result<Self, Error> {
        let entries = fs::read_dir(dir).map_err(|e| Error::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::Io {
                path: dir.to_path_buf(),
                source: e,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            if !extensions.iter().any(|a| a.eq_ignore_ascii_case(ext)) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if stem.ends_with("labeled") {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }

        if names.is_empty() {
            return Err(Error::NoFrames {
                dir: dir.to_path_buf(),
                extensions: extensions.to_vec(),
            });
        }

        // Sort for consistent ordering; this is also the navigation order.
        names.sort();

        let label = dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("frames")
            .to_string();
        info!(dir = %dir.display(), frames = names.len(), "discovered frames");

        Ok(FrameSequence { dir: dir.to_path_buf(), label, names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Frame identifier at `index`.
    pub fn id(&self, index: usize) -> Option<String> {
        self.names.get(index).map(|n| format!("{}/{}", self.label, n))
    }

    /// All frame identifiers, in navigation order.
    pub fn ids(&self) -> Vec<String> {
        (0..self.names.len()).filter_map(|i| self.id(i)).collect()
    }

    /// Absolute path of the frame image at `index`.
    pub fn path(&self, index: usize) -> Option<PathBuf> {
        self.names.get(index).map(|n| self.dir.join(n))
    }

    pub fn index_of(&self, frame_id: &str) -> Option<usize> {
        (0..self.names.len()).position(|i| self.id(i).as_deref() == Some(frame_id))
    }

    /// Remove the frame image at `index` from disk and drop it from the
    /// sequence. The file is removed first so a failed delete leaves the
    /// sequence intact.
    pub fn delete(&mut self, index: usize) -> Result<(), Error> {
        let Some(name) = self.names.get(index) else {
            return Err(Error::FrameIndex(index));
        };
        let path = self.dir.join(name);
        fs::remove_file(&path).map_err(|e| Error::Io {
            path: path.clone(),
            source: e,
        })?;
        self.names.remove(index);
        Ok(())
    }
}
