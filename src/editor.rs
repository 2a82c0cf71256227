//! Per-frame point editing.
//!
//! A [`PointEditor`] holds the working positions for the displayed frame,
//! one handle per configured bodypart. Edits stay local until
//! [`PointEditor::commit`] flushes them into the store row, which the
//! session does on every navigation and save.

use crate::error::Error;
use crate::store::{AnnotationStore, Point};

/// Working position of one bodypart on the displayed frame.
#[derive(Debug, Clone)]
pub struct PointHandle {
    bodypart: String,
    point: Point,
}

impl PointHandle {
    pub fn bodypart(&self) -> &str {
        &self.bodypart
    }

    pub fn point(&self) -> Point {
        self.point
    }

    /// True when a marker is placed for this bodypart.
    pub fn is_set(&self) -> bool {
        self.point.is_set()
    }
}

/// Editing state for one displayed frame.
///
/// Tracks a selection cursor over the bodyparts so one label is always
/// armed for the next placement. The editor always has at least one handle:
/// configurations without bodyparts are rejected before a session starts.
#[derive(Debug, Clone)]
pub struct PointEditor {
    frame_id: String,
    handles: Vec<PointHandle>,
    selected: usize,
}

impl PointEditor {
    /// Build handles for `frame_id` from its stored row.
    pub fn from_store(store: &AnnotationStore, frame_id: &str) -> Self {
        let row = store.row(frame_id);
        let handles = store
            .bodyparts()
            .iter()
            .enumerate()
            .map(|(i, bp)| PointHandle {
                bodypart: bp.clone(),
                point: row
                    .and_then(|r| r.get(i).copied())
                    .unwrap_or(Point::UNSET),
            })
            .collect();
        PointEditor {
            frame_id: frame_id.to_string(),
            handles,
            selected: 0,
        }
    }

    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    pub fn handles(&self) -> &[PointHandle] {
        &self.handles
    }

    /// Name of the currently selected bodypart.
    pub fn selected(&self) -> &str {
        &self.handles[self.selected].bodypart
    }

    pub fn select(&mut self, bodypart: &str) -> Result<(), Error> {
        self.selected = self.index_of(bodypart)?;
        Ok(())
    }

    /// Step the selection cursor down the configured list, saturating.
    pub fn select_next(&mut self) {
        if self.selected + 1 < self.handles.len() {
            self.selected += 1;
        }
    }

    /// Step the selection cursor up the configured list, saturating.
    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn index_of(&self, bodypart: &str) -> Result<usize, Error> {
        self.handles
            .iter()
            .position(|h| h.bodypart == bodypart)
            .ok_or_else(|| Error::UnknownBodypart(bodypart.to_string()))
    }

    /// Place a new point for `bodypart`.
    ///
    /// Placing over an already-set bodypart is a conflict and leaves the
    /// editor unchanged. On success the selection advances to the next
    /// unset bodypart in configured order, if any remain.
    pub fn place(&mut self, bodypart: &str, x: f64, y: f64) -> Result<(), Error> {
        let i = self.index_of(bodypart)?;
        if self.handles[i].is_set() {
            return Err(Error::AlreadyPlaced(bodypart.to_string()));
        }
        self.handles[i].point = Point::new(x, y);
        self.advance_selection(i);
        Ok(())
    }

    fn advance_selection(&mut self, from: usize) {
        let n = self.handles.len();
        for step in 1..=n {
            let i = (from + step) % n;
            if !self.handles[i].is_set() {
                self.selected = i;
                return;
            }
        }
        // everything placed; selection stays put
    }

    /// Move an existing point; rejected when the bodypart has no point.
    pub fn move_to(&mut self, bodypart: &str, x: f64, y: f64) -> Result<(), Error> {
        let i = self.index_of(bodypart)?;
        if !self.handles[i].is_set() {
            return Err(Error::NotPlaced(bodypart.to_string()));
        }
        self.handles[i].point = Point::new(x, y);
        Ok(())
    }

    /// Remove an existing point, returning the bodypart to unset.
    pub fn delete(&mut self, bodypart: &str) -> Result<(), Error> {
        let i = self.index_of(bodypart)?;
        if !self.handles[i].is_set() {
            return Err(Error::NotPlaced(bodypart.to_string()));
        }
        self.handles[i].point = Point::UNSET;
        Ok(())
    }

    /// Reset every handle to unset.
    pub fn clear_all(&mut self) {
        for h in &mut self.handles {
            h.point = Point::UNSET;
        }
    }

    /// Overwrite every handle from another frame's stored row.
    pub fn duplicate_from(
        &mut self,
        store: &AnnotationStore,
        source_frame: &str,
    ) -> Result<(), Error> {
        let row = store
            .row(source_frame)
            .ok_or_else(|| Error::UnknownFrame(source_frame.to_string()))?;
        for (h, p) in self.handles.iter_mut().zip(row) {
            h.point = *p;
        }
        Ok(())
    }

    /// Flush the working positions into the store row for this frame.
    pub fn commit(&self, store: &mut AnnotationStore) -> Result<(), Error> {
        for h in &self.handles {
            store.set(&self.frame_id, &h.bodypart, h.point.x, h.point.y)?;
        }
        Ok(())
    }
}
