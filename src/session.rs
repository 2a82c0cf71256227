//! The labeling session: explicit state for one editing run.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::ProjectConfig;
use crate::editor::PointEditor;
use crate::error::Error;
use crate::frames::FrameSequence;
use crate::store::AnnotationStore;

/// One editing run over one directory of extracted frames.
///
/// Owns the frame sequence, the annotation store, the live point editor and
/// the current position. Navigation and save commit the editor's working
/// positions into the store row for the displayed frame; no other frame's
/// row is ever touched by editing.
pub struct LabelingSession {
    config: ProjectConfig,
    frames_dir: PathBuf,
    frames: FrameSequence,
    store: AnnotationStore,
    editor: Option<PointEditor>,
    current: usize,
}

impl LabelingSession {
    /// Open a session over `frames_dir`.
    ///
    /// Validates the configuration (duplicate bodyparts abort here),
    /// discovers frames, loads and reconciles any persisted annotations,
    /// and resumes at the first frame with no data yet.
    pub fn open(config: ProjectConfig, frames_dir: &Path) -> Result<Self, Error> {
        config.validate()?;
        let frames = FrameSequence::discover(frames_dir, &config.image_extensions)?;
        let ids = frames.ids();
        let store = AnnotationStore::load(frames_dir, &config.scorer, &config.bodyparts, &ids);
        let current = store.first_unlabeled(&ids);
        let editor = frames
            .id(current)
            .map(|id| PointEditor::from_store(&store, &id));
        info!(frames = frames.len(), start = current, "labeling session opened");
        Ok(LabelingSession {
            config,
            frames_dir: frames_dir.to_path_buf(),
            frames,
            store,
            editor,
            current,
        })
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Identifier of the displayed frame, if any frames remain.
    pub fn current_frame(&self) -> Option<String> {
        self.frames.id(self.current)
    }

    /// Absolute path of the displayed frame's image.
    pub fn current_frame_path(&self) -> Option<PathBuf> {
        self.frames.path(self.current)
    }

    pub fn editor(&self) -> Option<&PointEditor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut PointEditor> {
        self.editor.as_mut()
    }

    /// Commit the live edits, then move to the next frame. Returns whether
    /// the position changed; the last frame saturates.
    pub fn next(&mut self) -> Result<bool, Error> {
        self.step(1)
    }

    /// Commit the live edits, then move to the previous frame. Returns
    /// whether the position changed; the first frame saturates.
    pub fn previous(&mut self) -> Result<bool, Error> {
        self.step(-1)
    }

    fn step(&mut self, delta: i64) -> Result<bool, Error> {
        self.commit_current()?;
        let target = self.current as i64 + delta;
        if target < 0 || target >= self.frames.len() as i64 {
            return Ok(false);
        }
        self.current = target as usize;
        self.rebuild_editor();
        Ok(true)
    }

    fn commit_current(&mut self) -> Result<(), Error> {
        if let Some(editor) = &self.editor {
            editor.commit(&mut self.store)?;
        }
        Ok(())
    }

    fn rebuild_editor(&mut self) {
        self.editor = self
            .frames
            .id(self.current)
            .map(|id| PointEditor::from_store(&self.store, &id));
    }

    /// Commit the live edits and persist the store to the frames directory.
    pub fn save(&mut self) -> Result<(), Error> {
        self.commit_current()?;
        self.store.save(&self.frames_dir)
    }

    /// Copy all bodypart positions from the immediately preceding frame's
    /// stored row over the current editor state. Rejected on the first
    /// frame.
    pub fn duplicate_previous(&mut self) -> Result<(), Error> {
        if self.current == 0 || self.frames.is_empty() {
            return Err(Error::NoPreviousFrame);
        }
        let prev = self
            .frames
            .id(self.current - 1)
            .ok_or(Error::NoPreviousFrame)?;
        let Some(editor) = self.editor.as_mut() else {
            return Err(Error::NoPreviousFrame);
        };
        editor.duplicate_from(&self.store, &prev)
    }

    /// Delete the displayed frame: drop its store row, remove the image
    /// file from disk, and advance to the frame that takes its place.
    /// Deleting the last remaining frame leaves an empty session.
    pub fn delete_current_frame(&mut self) -> Result<(), Error> {
        let Some(frame_id) = self.frames.id(self.current) else {
            return Ok(());
        };
        if let Some(editor) = self.editor.as_mut() {
            editor.clear_all();
        }
        self.store.clear_frame(&frame_id);
        self.store.remove_frame(&frame_id);
        self.frames.delete(self.current)?;
        if self.current >= self.frames.len() {
            self.current = self.frames.len().saturating_sub(1);
        }
        self.rebuild_editor();
        info!(frame = %frame_id, remaining = self.frames.len(), "frame deleted");
        Ok(())
    }
}
