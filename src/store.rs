//! The annotation store: one row per frame, one (x, y) column pair per
//! bodypart.
//!
//! Persists to `CollectedData_<scorer>.json` plus a comma-separated mirror
//! with the same logical content. Loading reconciles the persisted table
//! against the current bodypart and frame lists; a missing or unreadable
//! file is treated as "no prior annotations".

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::Error;

/// One bodypart position on one frame; either axis may be unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl Point {
    pub const UNSET: Point = Point { x: None, y: None };

    pub fn new(x: f64, y: f64) -> Self {
        Point {
            x: Some(x),
            y: Some(y),
        }
    }

    /// True when neither axis holds a value.
    pub fn is_unset(&self) -> bool {
        self.x.is_none() && self.y.is_none()
    }

    /// True when both axes hold a value.
    pub fn is_set(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }
}

/// Serialized form of the table: `points` aligns with `bodyparts`.
#[derive(Debug, Serialize, Deserialize)]
struct CollectedData {
    scorer: String,
    bodyparts: Vec<String>,
    frames: Vec<FrameRow>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FrameRow {
    frame: String,
    points: Vec<Point>,
}

/// In-memory annotation table for one frame directory.
///
/// Rows are keyed by frame identifier and kept in ascending order; each row
/// holds one [`Point`] per configured bodypart, in configured order.
#[derive(Debug, Clone)]
pub struct AnnotationStore {
    scorer: String,
    bodyparts: Vec<String>,
    rows: BTreeMap<String, Vec<Point>>,
}

impl AnnotationStore {
    /// File stem shared by the persisted table and its CSV mirror.
    pub fn data_file_stem(scorer: &str) -> String {
        format!("CollectedData_{scorer}")
    }

    /// Fresh all-unset table covering `frame_ids`.
    pub fn new(scorer: &str, bodyparts: &[String], frame_ids: &[String]) -> Self {
        let mut store = AnnotationStore {
            scorer: scorer.to_string(),
            bodyparts: bodyparts.to_vec(),
            rows: BTreeMap::new(),
        };
        store.add_missing_rows(frame_ids);
        store
    }

    /// Load the persisted table from `dir`, reconciled against the current
    /// bodypart list and frame list.
    ///
    /// New bodyparts gain an all-unset column on every row; frames without a
    /// row gain an all-unset row. Rows for frames no longer on disk are kept
    /// until save-time pruning. A missing or unparseable file falls back to
    /// an all-unset table.
    pub fn load(dir: &Path, scorer: &str, bodyparts: &[String], frame_ids: &[String]) -> Self {
        let mut store = AnnotationStore {
            scorer: scorer.to_string(),
            bodyparts: bodyparts.to_vec(),
            rows: BTreeMap::new(),
        };

        let path = dir.join(format!("{}.json", Self::data_file_stem(scorer)));
        match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<CollectedData>(&text) {
                Ok(data) => store.absorb(data),
                Err(e) => warn!(
                    path = %path.display(),
                    error = %e,
                    "could not parse existing annotations; starting empty"
                ),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %path.display(),
                error = %e,
                "could not read existing annotations; starting empty"
            ),
        }

        store.add_missing_rows(frame_ids);
        store
    }

    /// Remap a persisted table onto the configured bodypart order.
    fn absorb(&mut self, data: CollectedData) {
        let new_parts: Vec<&String> = self
            .bodyparts
            .iter()
            .filter(|bp| !data.bodyparts.contains(bp))
            .collect();
        if !new_parts.is_empty() {
            info!(bodyparts = ?new_parts, "new bodyparts; adding unset columns");
        }

        for row in data.frames {
            let mut points = vec![Point::UNSET; self.bodyparts.len()];
            for (i, bp) in self.bodyparts.iter().enumerate() {
                if let Some(j) = data.bodyparts.iter().position(|b| b == bp) {
                    if let Some(p) = row.points.get(j) {
                        points[i] = *p;
                    }
                }
            }
            self.rows.insert(row.frame, points);
        }
    }

    fn add_missing_rows(&mut self, frame_ids: &[String]) {
        let columns = self.bodyparts.len();
        let mut added = 0usize;
        for id in frame_ids {
            if !self.rows.contains_key(id) {
                self.rows.insert(id.clone(), vec![Point::UNSET; columns]);
                added += 1;
            }
        }
        if added > 0 && added < frame_ids.len() {
            info!(frames = added, "found new frames; adding unset rows");
        }
    }

    pub fn scorer(&self) -> &str {
        &self.scorer
    }

    pub fn bodyparts(&self) -> &[String] {
        &self.bodyparts
    }

    /// Number of rows currently held, including all-unset ones.
    pub fn frame_count(&self) -> usize {
        self.rows.len()
    }

    fn part_index(&self, bodypart: &str) -> Option<usize> {
        self.bodyparts.iter().position(|bp| bp == bodypart)
    }

    /// Current value; `None` for an unknown frame or bodypart.
    pub fn get(&self, frame_id: &str, bodypart: &str) -> Option<Point> {
        let i = self.part_index(bodypart)?;
        self.rows.get(frame_id).map(|row| row[i])
    }

    /// Full row for a frame, in configured bodypart order.
    pub fn row(&self, frame_id: &str) -> Option<&[Point]> {
        self.rows.get(frame_id).map(|row| row.as_slice())
    }

    /// Overwrite one value; either axis may be set to unset, which clears
    /// that coordinate.
    pub fn set(
        &mut self,
        frame_id: &str,
        bodypart: &str,
        x: Option<f64>,
        y: Option<f64>,
    ) -> Result<(), Error> {
        let i = self
            .part_index(bodypart)
            .ok_or_else(|| Error::UnknownBodypart(bodypart.to_string()))?;
        let row = self
            .rows
            .get_mut(frame_id)
            .ok_or_else(|| Error::UnknownFrame(frame_id.to_string()))?;
        row[i] = Point { x, y };
        Ok(())
    }

    /// Reset every bodypart of a frame's row to unset.
    pub fn clear_frame(&mut self, frame_id: &str) {
        if let Some(row) = self.rows.get_mut(frame_id) {
            row.fill(Point::UNSET);
        }
    }

    /// Drop a frame's row entirely; subsequent `get` calls return `None`.
    pub fn remove_frame(&mut self, frame_id: &str) {
        self.rows.remove(frame_id);
    }

    /// Index of the first frame in `frame_ids` whose row holds no data yet,
    /// or 0 when every frame has some.
    pub fn first_unlabeled(&self, frame_ids: &[String]) -> usize {
        frame_ids
            .iter()
            .position(|id| {
                self.rows
                    .get(id)
                    .is_none_or(|row| row.iter().all(Point::is_unset))
            })
            .unwrap_or(0)
    }

    /// Write the table to `CollectedData_<scorer>.json` and its CSV mirror
    /// under `dir`.
    ///
    /// Rows with no data at all are dropped; remaining rows are written in
    /// ascending frame order with columns in configured bodypart order. An
    /// existing file of either name is first renamed to `<name>.backup`,
    /// best-effort.
    pub fn save(&self, dir: &Path) -> Result<(), Error> {
        let stem = Self::data_file_stem(&self.scorer);
        let json_path = dir.join(format!("{stem}.json"));
        let csv_path = dir.join(format!("{stem}.csv"));

        let kept: Vec<(&String, &Vec<Point>)> = self
            .rows
            .iter()
            .filter(|(_, row)| !row.iter().all(Point::is_unset))
            .collect();

        backup_existing(&json_path);
        backup_existing(&csv_path);

        let data = CollectedData {
            scorer: self.scorer.clone(),
            bodyparts: self.bodyparts.clone(),
            frames: kept
                .iter()
                .map(|(frame, points)| FrameRow {
                    frame: (*frame).clone(),
                    points: (*points).clone(),
                })
                .collect(),
        };
        let json = serde_json::to_string_pretty(&data)?;
        fs::write(&json_path, json).map_err(|e| Error::Io {
            path: json_path.clone(),
            source: e,
        })?;

        fs::write(&csv_path, self.to_csv(&kept)).map_err(|e| Error::Io {
            path: csv_path,
            source: e,
        })?;

        info!(frames = kept.len(), path = %json_path.display(), "annotations saved");
        Ok(())
    }

    /// Three header rows (scorer, bodyparts, coords), then one data row per
    /// frame; unset cells are left empty.
    fn to_csv(&self, rows: &[(&String, &Vec<Point>)]) -> String {
        let mut out = String::from("scorer");
        for _ in &self.bodyparts {
            out.push_str(&format!(",{0},{0}", self.scorer));
        }
        out.push_str("\nbodyparts");
        for bp in &self.bodyparts {
            out.push_str(&format!(",{bp},{bp}"));
        }
        out.push_str("\ncoords");
        for _ in &self.bodyparts {
            out.push_str(",x,y");
        }
        out.push('\n');

        for (frame, points) in rows {
            out.push_str(frame);
            for p in points.iter() {
                out.push(',');
                if let Some(x) = p.x {
                    out.push_str(&x.to_string());
                }
                out.push(',');
                if let Some(y) = p.y {
                    out.push_str(&y.to_string());
                }
            }
            out.push('\n');
        }
        out
    }
}

/// Best-effort rename of a previous save to `<name>.backup`; failure is
/// logged and the save proceeds.
fn backup_existing(path: &Path) {
    if !path.exists() {
        return;
    }
    let backup = backup_path(path);
    if backup.exists() {
        // Windows cannot rename over an existing file.
        let _ = fs::remove_file(&backup);
    }
    if let Err(e) = fs::rename(path, &backup) {
        warn!(
            path = %path.display(),
            error = %e,
            "could not back up previous annotations; overwriting in place"
        );
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".backup");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn store() -> AnnotationStore {
        AnnotationStore::new(
            "alice",
            &parts(&["snout", "leftear", "tailbase"]),
            &parts(&["v1/img000.png", "v1/img001.png"]),
        )
    }

    #[test]
    fn set_then_get_returns_value() {
        let mut s = store();
        s.set("v1/img000.png", "leftear", Some(12.5), Some(30.25))
            .unwrap();
        assert_eq!(
            s.get("v1/img000.png", "leftear"),
            Some(Point::new(12.5, 30.25))
        );
    }

    #[test]
    fn set_with_none_clears_a_point() {
        let mut s = store();
        s.set("v1/img000.png", "snout", Some(1.0), Some(2.0)).unwrap();
        s.set("v1/img000.png", "snout", None, None).unwrap();
        assert_eq!(s.get("v1/img000.png", "snout"), Some(Point::UNSET));
    }

    #[test]
    fn set_on_unknown_frame_or_bodypart_errors() {
        let mut s = store();
        assert!(matches!(
            s.set("v1/nope.png", "snout", Some(1.0), Some(2.0)),
            Err(Error::UnknownFrame(_))
        ));
        assert!(matches!(
            s.set("v1/img000.png", "wing", Some(1.0), Some(2.0)),
            Err(Error::UnknownBodypart(_))
        ));
    }

    #[test]
    fn removed_frame_is_inaccessible() {
        let mut s = store();
        s.set("v1/img000.png", "snout", Some(1.0), Some(2.0)).unwrap();
        s.remove_frame("v1/img000.png");
        assert_eq!(s.get("v1/img000.png", "snout"), None);
    }

    #[test]
    fn first_unlabeled_skips_rows_with_data() {
        let mut s = store();
        let ids = parts(&["v1/img000.png", "v1/img001.png"]);
        assert_eq!(s.first_unlabeled(&ids), 0);
        s.set("v1/img000.png", "snout", Some(1.0), Some(2.0)).unwrap();
        assert_eq!(s.first_unlabeled(&ids), 1);
        s.set("v1/img001.png", "snout", Some(3.0), Some(4.0)).unwrap();
        assert_eq!(s.first_unlabeled(&ids), 0);
    }

    #[test]
    fn csv_leaves_unset_cells_empty() {
        let mut s = store();
        s.set("v1/img000.png", "snout", Some(10.0), None).unwrap();
        let kept: Vec<_> = s
            .rows
            .iter()
            .filter(|(_, row)| !row.iter().all(Point::is_unset))
            .collect();
        let csv = s.to_csv(&kept);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "scorer,alice,alice,alice,alice,alice,alice");
        assert_eq!(
            lines[1],
            "bodyparts,snout,snout,leftear,leftear,tailbase,tailbase"
        );
        assert_eq!(lines[2], "coords,x,y,x,y,x,y");
        assert_eq!(lines[3], "v1/img000.png,10,,,,,");
        assert_eq!(lines.len(), 4);
    }
}
