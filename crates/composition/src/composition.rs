//! The composition document: tracks, elements, and mutation operations.
//!
//! The composition is a flat arena addressed by id. Other components hold
//! `ElementId`/`TrackId` values and resolve them through `find_element` /
//! `find_track`; a missing id makes the operation a silent no-op.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use cutreel_common::track_id;

use crate::element::{Element, ElementId, ElementKind, MIN_DURATION};

/// Identifier of a track within a composition.
pub type TrackId = String;

/// An ordered lane of elements with its own mute/lock/visibility state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier.
    pub id: TrackId,

    /// Human-readable name shown in the timeline.
    pub name: String,

    /// Track kind; gates which elements may live here.
    #[serde(rename = "type")]
    pub kind: TrackKind,

    /// Muted tracks contribute zero gain for their elements.
    #[serde(default)]
    pub muted: bool,

    /// Locked tracks reject interactive edits.
    #[serde(default)]
    pub locked: bool,

    /// Invisible tracks are skipped by the compositor.
    #[serde(default = "default_true")]
    pub visible: bool,

    /// Elements in declared order.
    #[serde(default)]
    pub elements: Vec<Element>,
}

fn default_true() -> bool {
    true
}

/// Kind of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Overlay,
    Audio,
}

impl TrackKind {
    fn default_name(&self) -> &'static str {
        match self {
            TrackKind::Video => "Video",
            TrackKind::Overlay => "Overlay",
            TrackKind::Audio => "Audio",
        }
    }

    /// Whether an element of the given kind may live on this track.
    /// Audio elements only on audio tracks, visual elements never there.
    pub fn accepts(&self, kind: &ElementKind) -> bool {
        let is_audio = matches!(kind, ElementKind::Audio { .. });
        match self {
            TrackKind::Audio => is_audio,
            _ => !is_audio,
        }
    }
}

impl Track {
    /// Create an empty track of the given kind.
    pub fn new(kind: TrackKind, name: impl Into<String>) -> Self {
        Self {
            id: track_id(),
            name: name.into(),
            kind,
            muted: false,
            locked: false,
            visible: true,
            elements: Vec::new(),
        }
    }
}

/// Which edge a trim operation adjusts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimEdge {
    Start,
    End,
}

/// The full editable document.
///
/// Track order is compositing order: index 0 is the topmost visual layer,
/// so renderers iterate in reverse list order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Composition {
    /// Schema version.
    pub version: u32,

    /// Canvas size in pixels.
    pub width: u32,
    pub height: u32,

    /// Preview/export frame rate.
    pub fps: u32,

    /// Canvas background as a hex color string.
    #[serde(default = "default_background")]
    pub background_color: String,

    /// Creation timestamp (ISO 8601).
    #[serde(default)]
    pub created_at: String,

    /// Last modified timestamp (ISO 8601).
    #[serde(default)]
    pub modified_at: String,

    /// Tracks in compositing order.
    #[serde(default)]
    pub tracks: Vec<Track>,

    /// Coalesces rapid mutations for the external autosave collaborator.
    /// Excluded from serialization and equality.
    #[serde(skip)]
    dirty: bool,
}

fn default_background() -> String {
    "#000000".to_string()
}

// Timestamps and the dirty flag are metadata, not content; history and
// no-op checks compare content only.
impl PartialEq for Composition {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.width == other.width
            && self.height == other.height
            && self.fps == other.fps
            && self.background_color == other.background_color
            && self.tracks == other.tracks
    }
}

impl Composition {
    /// Create an empty composition.
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            version: 1,
            width,
            height,
            fps,
            background_color: default_background(),
            created_at: now.clone(),
            modified_at: now,
            tracks: Vec::new(),
            dirty: false,
        }
    }

    // === Dirty flag ===

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.modified_at = chrono::Utc::now().to_rfc3339();
    }

    /// Read and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // === Queries ===

    /// Total timeline duration: the latest element end, 0 when empty.
    pub fn duration(&self) -> f64 {
        self.tracks
            .iter()
            .flat_map(|t| &t.elements)
            .map(|e| e.end())
            .fold(0.0, f64::max)
    }

    pub fn find_track(&self, track_id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == track_id)
    }

    pub fn find_track_mut(&mut self, track_id: &str) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == track_id)
    }

    pub fn find_element(&self, element_id: &str) -> Option<&Element> {
        self.tracks
            .iter()
            .flat_map(|t| &t.elements)
            .find(|e| e.id == element_id)
    }

    pub fn find_element_mut(&mut self, element_id: &str) -> Option<&mut Element> {
        self.tracks
            .iter_mut()
            .flat_map(|t| &mut t.elements)
            .find(|e| e.id == element_id)
    }

    /// The track holding the given element.
    pub fn track_of(&self, element_id: &str) -> Option<&Track> {
        self.tracks
            .iter()
            .find(|t| t.elements.iter().any(|e| e.id == element_id))
    }

    /// Elements active at timeline time `t`, with their tracks, in
    /// declared (topmost-first) track order.
    pub fn active_elements(&self, t: f64) -> Vec<(&Track, &Element)> {
        self.tracks
            .iter()
            .flat_map(|track| {
                track
                    .elements
                    .iter()
                    .filter(move |e| e.is_active(t))
                    .map(move |e| (track, e))
            })
            .collect()
    }

    /// Every element paired with its owning track id.
    pub fn all_elements(&self) -> impl Iterator<Item = (&TrackId, &Element)> {
        self.tracks
            .iter()
            .flat_map(|t| t.elements.iter().map(move |e| (&t.id, e)))
    }

    // === Track operations ===

    /// Add a track. Audio tracks append at the bottom; visual tracks
    /// insert at index 0 (top of timeline = topmost visual layer).
    pub fn add_track(&mut self, kind: TrackKind, name: Option<&str>) -> TrackId {
        let track = Track::new(kind, name.unwrap_or(kind.default_name()));
        let id = track.id.clone();
        match kind {
            TrackKind::Audio => self.tracks.push(track),
            _ => self.tracks.insert(0, track),
        }
        self.mark_dirty();
        id
    }

    pub fn remove_track(&mut self, track_id: &str) {
        let before = self.tracks.len();
        self.tracks.retain(|t| t.id != track_id);
        if self.tracks.len() != before {
            self.mark_dirty();
        }
    }

    pub fn reorder_tracks(&mut self, from: usize, to: usize) {
        if from >= self.tracks.len() || to >= self.tracks.len() || from == to {
            return;
        }
        let track = self.tracks.remove(from);
        self.tracks.insert(to, track);
        self.mark_dirty();
    }

    pub fn move_track_up(&mut self, track_id: &str) {
        if let Some(idx) = self.tracks.iter().position(|t| t.id == track_id) {
            if idx > 0 {
                self.reorder_tracks(idx, idx - 1);
            }
        }
    }

    pub fn move_track_down(&mut self, track_id: &str) {
        if let Some(idx) = self.tracks.iter().position(|t| t.id == track_id) {
            if idx + 1 < self.tracks.len() {
                self.reorder_tracks(idx, idx + 1);
            }
        }
    }

    pub fn toggle_track_mute(&mut self, track_id: &str) {
        if let Some(track) = self.find_track_mut(track_id) {
            track.muted = !track.muted;
            self.mark_dirty();
        }
    }

    pub fn toggle_track_lock(&mut self, track_id: &str) {
        if let Some(track) = self.find_track_mut(track_id) {
            track.locked = !track.locked;
            self.mark_dirty();
        }
    }

    pub fn toggle_track_visibility(&mut self, track_id: &str) {
        if let Some(track) = self.find_track_mut(track_id) {
            track.visible = !track.visible;
            self.mark_dirty();
        }
    }

    // === Element operations ===

    /// Add an element to a track. Returns its id, or `None` when the
    /// track does not exist.
    pub fn add_element(&mut self, track_id: &str, element: Element) -> Option<ElementId> {
        debug_assert!(element.duration > 0.0, "element duration must be positive");
        let track = self.find_track_mut(track_id)?;
        let id = element.id.clone();
        track.elements.push(element);
        self.mark_dirty();
        Some(id)
    }

    pub fn delete_element(&mut self, element_id: &str) {
        for track in &mut self.tracks {
            if let Some(idx) = track.elements.iter().position(|e| e.id == element_id) {
                track.elements.remove(idx);
                self.mark_dirty();
                return;
            }
        }
    }

    pub fn remove_elements(&mut self, ids: &[ElementId]) {
        if ids.is_empty() {
            return;
        }
        let mut removed = false;
        for track in &mut self.tracks {
            let before = track.elements.len();
            track.elements.retain(|e| !ids.contains(&e.id));
            removed |= track.elements.len() != before;
        }
        if removed {
            self.mark_dirty();
        }
    }

    /// Move an element to a new timeline start, clamped to 0.
    pub fn move_element(&mut self, element_id: &str, new_time: f64) {
        if let Some(el) = self.find_element_mut(element_id) {
            el.time = new_time.max(0.0);
            self.mark_dirty();
        }
    }

    /// Shift several elements by the same delta, each clamped to 0.
    pub fn move_elements(&mut self, ids: &[ElementId], delta: f64) {
        let mut moved = false;
        for id in ids {
            if let Some(el) = self.find_element_mut(id) {
                el.time = (el.time + delta).max(0.0);
                moved = true;
            }
        }
        if moved {
            self.mark_dirty();
        }
    }

    /// Reassign an element to another track. No kind compatibility check
    /// here; interactive cross-track moves are gated by the caller.
    pub fn move_element_to_track(&mut self, element_id: &str, target_track_id: &str) {
        if self.find_track(target_track_id).is_none() {
            return;
        }
        let mut taken = None;
        for track in &mut self.tracks {
            if let Some(idx) = track.elements.iter().position(|e| e.id == element_id) {
                taken = Some(track.elements.remove(idx));
                break;
            }
        }
        if let Some(element) = taken {
            if let Some(target) = self.find_track_mut(target_track_id) {
                target.elements.push(element);
                self.mark_dirty();
            }
        }
    }

    /// Trim one edge of an element to a new timeline time.
    ///
    /// Trimming the start shifts `time` and `trim_start` together so the
    /// media content under the playhead stays put; duration is clamped to
    /// the minimum floor and time to 0.
    pub fn trim_element(&mut self, element_id: &str, edge: TrimEdge, new_time: f64) {
        if let Some(el) = self.find_element_mut(element_id) {
            match edge {
                TrimEdge::Start => {
                    let delta = new_time - el.time;
                    el.time = new_time.max(0.0);
                    el.duration = (el.duration - delta).max(MIN_DURATION);
                    el.trim_start = (el.trim_start + delta).max(0.0);
                }
                TrimEdge::End => {
                    el.duration = (new_time - el.time).max(MIN_DURATION);
                }
            }
            self.mark_dirty();
        }
    }

    /// Split an element at a timeline time strictly inside it. Returns the
    /// id of the second half, or `None` if the split point is outside.
    pub fn split_element(&mut self, element_id: &str, at: f64) -> Option<ElementId> {
        let el = self.find_element(element_id)?;
        if at <= el.time || at >= el.end() {
            return None;
        }
        let track_id = self.track_of(element_id)?.id.clone();

        let el = self.find_element_mut(element_id)?;
        let relative = at - el.time;
        let original_duration = el.duration;
        el.duration = relative;

        let mut second = el.clone();
        second.id = cutreel_common::element_id();
        second.name = format!("{} (split)", second.name);
        second.time = at;
        second.duration = original_duration - relative;
        second.trim_start += relative;
        let id = second.id.clone();

        if let Some(track) = self.find_track_mut(&track_id) {
            track.elements.push(second);
        }
        self.mark_dirty();
        Some(id)
    }

    /// Duplicate an element onto the same track, placed right after the
    /// original. Returns the copy's id.
    pub fn duplicate_element(&mut self, element_id: &str) -> Option<ElementId> {
        let el = self.find_element(element_id)?;
        let track_id = self.track_of(element_id)?.id.clone();

        let mut copy = el.clone();
        copy.id = cutreel_common::element_id();
        copy.name = format!("{} (copy)", copy.name);
        copy.time = el.end();
        let id = copy.id.clone();

        if let Some(track) = self.find_track_mut(&track_id) {
            track.elements.push(copy);
            self.mark_dirty();
        }
        Some(id)
    }

    /// Resize the canvas.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.mark_dirty();
    }

    // === Template substitution ===

    /// Apply a modification map to elements carrying a `modification_key`.
    ///
    /// A string value replaces the media source (or the text for text
    /// elements); an object value merges its fields over the serialized
    /// element.
    pub fn resolve_modifications(&mut self, modifications: &HashMap<String, serde_json::Value>) {
        let mut changed = false;
        for track in &mut self.tracks {
            for el in &mut track.elements {
                let Some(key) = el.modification_key.clone() else {
                    continue;
                };
                let Some(modification) = modifications.get(&key) else {
                    continue;
                };
                match modification {
                    serde_json::Value::String(s) => {
                        if let ElementKind::Text { text, .. } = &mut el.kind {
                            *text = s.clone();
                        } else {
                            el.set_source(s.clone());
                        }
                        changed = true;
                    }
                    serde_json::Value::Object(fields) => {
                        if let Ok(serde_json::Value::Object(mut base)) = serde_json::to_value(&*el)
                        {
                            for (k, v) in fields {
                                base.insert(k.clone(), v.clone());
                            }
                            match serde_json::from_value(serde_json::Value::Object(base)) {
                                Ok(merged) => {
                                    *el = merged;
                                    changed = true;
                                }
                                Err(e) => {
                                    tracing::warn!(
                                        key,
                                        "ignoring modification that breaks the element: {}",
                                        e
                                    );
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        if changed {
            self.mark_dirty();
        }
    }

    // === Validation ===

    /// Validate structural invariants of a parsed document.
    pub fn validate(&self) -> Result<(), DocumentError> {
        if self.width == 0 || self.height == 0 {
            return Err(DocumentError::ValidationError {
                message: "composition dimensions must be non-zero".to_string(),
            });
        }
        let mut seen = std::collections::HashSet::new();
        for track in &self.tracks {
            if !seen.insert(track.id.as_str()) {
                return Err(DocumentError::ValidationError {
                    message: format!("duplicate track id {:?}", track.id),
                });
            }
            for el in &track.elements {
                if !seen.insert(el.id.as_str()) {
                    return Err(DocumentError::ValidationError {
                        message: format!("duplicate element id {:?}", el.id),
                    });
                }
                if el.duration <= 0.0 {
                    return Err(DocumentError::ValidationError {
                        message: format!("element {:?} has non-positive duration", el.id),
                    });
                }
                if el.time < 0.0 || el.trim_start < 0.0 {
                    return Err(DocumentError::ValidationError {
                        message: format!("element {:?} has negative time or trim", el.id),
                    });
                }
            }
        }
        Ok(())
    }

    // === Document I/O ===

    /// Load and validate a composition document from a JSON file.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path).map_err(|source| DocumentError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        let composition: Composition =
            serde_json::from_str(&content).map_err(|source| DocumentError::ParseError {
                path: path.to_path_buf(),
                source,
            })?;
        composition.validate()?;
        Ok(composition)
    }

    /// Save the composition document as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        let json =
            serde_json::to_string_pretty(self).map_err(|source| DocumentError::ParseError {
                path: path.to_path_buf(),
                source,
            })?;
        std::fs::write(path, json).map_err(|source| DocumentError::IoError {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Errors from loading, parsing, or validating a composition document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid composition: {message}")]
    ValidationError { message: String },
}
