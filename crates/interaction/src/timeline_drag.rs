//! Timeline gestures: clip move, edge trims, cross-track drags, and media
//! drops.

use serde::{Deserialize, Serialize};

use cutreel_common::InteractionDefaults;
use cutreel_composition::{
    Composition, Element, ElementId, ElementKind, History, TimelineScale, TrimEdge,
};

use crate::selection::Selection;

/// What a timeline drag manipulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Move,
    TrimStart,
    TrimEnd,
}

/// A media item dragged in from the library, as serialized in the drop
/// payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaDescriptor {
    pub name: String,
    #[serde(flatten)]
    pub kind: ElementKind,
    #[serde(default = "default_drop_duration")]
    pub duration: f64,
}

fn default_drop_duration() -> f64 {
    5.0
}

struct TimelineDrag {
    kind: DragKind,
    element_id: ElementId,
    start_x_px: f64,
    /// Dragged edge's original time (element end for trim-end drags).
    start_time: f64,
    /// Original start time per selected element for group moves.
    group_times: Vec<(ElementId, f64)>,
}

/// Stateful timeline gesture controller. Holds the view scale used for
/// pixel/time conversion and snapping.
pub struct TimelineController {
    pub scale: TimelineScale,
    drag: Option<TimelineDrag>,
}

impl Default for TimelineController {
    fn default() -> Self {
        Self::new(TimelineScale::default())
    }
}

impl TimelineController {
    pub fn new(scale: TimelineScale) -> Self {
        Self { scale, drag: None }
    }

    /// Controller at default zoom with the configured snap capture
    /// distance.
    pub fn with_config(config: &InteractionDefaults) -> Self {
        let mut scale = TimelineScale::default();
        scale.snap_threshold_px = config.snap_threshold_px;
        Self::new(scale)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Begin a clip drag at the given screen x. Snapshots history first.
    /// A move drag of a selected element carries the whole selection.
    pub fn begin_drag(
        &mut self,
        composition: &mut Composition,
        history: &mut History,
        selection: &Selection,
        element_id: &str,
        kind: DragKind,
        start_x_px: f64,
    ) {
        let Some(el) = composition.find_element(element_id) else {
            return;
        };
        if composition
            .track_of(element_id)
            .is_some_and(|track| track.locked)
        {
            return;
        }
        history.snapshot(composition);

        let start_time = match kind {
            DragKind::TrimEnd => el.end(),
            _ => el.time,
        };
        let group_times = if kind == DragKind::Move
            && selection.len() > 1
            && selection.contains(element_id)
        {
            selection
                .ids()
                .iter()
                .filter_map(|id| composition.find_element(id).map(|e| (id.clone(), e.time)))
                .collect()
        } else {
            Vec::new()
        };

        tracing::debug!(element = element_id, ?kind, "begin timeline drag");
        self.drag = Some(TimelineDrag {
            kind,
            element_id: element_id.to_string(),
            start_x_px,
            start_time,
            group_times,
        });
    }

    /// Apply the drag at a new screen x, snapping each moved edge.
    pub fn drag_to(&mut self, composition: &mut Composition, playhead: f64, x_px: f64) {
        let Some(drag) = &self.drag else { return };
        let delta = self.scale.pixel_to_time(x_px - drag.start_x_px);

        match drag.kind {
            DragKind::Move => {
                if drag.group_times.len() > 1 {
                    let group = drag.group_times.clone();
                    for (id, start) in group {
                        let new_time =
                            self.scale
                                .snap(start + delta, Some(&id), playhead, composition);
                        composition.move_element(&id, new_time);
                    }
                } else {
                    let id = drag.element_id.clone();
                    let new_time = self.scale.snap(
                        drag.start_time + delta,
                        Some(&id),
                        playhead,
                        composition,
                    );
                    composition.move_element(&id, new_time);
                }
            }
            DragKind::TrimStart => {
                let id = drag.element_id.clone();
                let new_time =
                    self.scale
                        .snap(drag.start_time + delta, Some(&id), playhead, composition);
                composition.trim_element(&id, TrimEdge::Start, new_time);
            }
            DragKind::TrimEnd => {
                let id = drag.element_id.clone();
                let new_time =
                    self.scale
                        .snap(drag.start_time + delta, Some(&id), playhead, composition);
                composition.trim_element(&id, TrimEdge::End, new_time);
            }
        }
    }

    /// Reassign the dragged element when the pointer crosses into another
    /// track's row. Incompatible kinds leave the assignment unchanged:
    /// audio elements move only between audio tracks and visual elements
    /// never onto them.
    pub fn drag_to_track(&mut self, composition: &mut Composition, target_track_id: &str) {
        let Some(drag) = &self.drag else { return };
        if drag.kind != DragKind::Move || drag.group_times.len() > 1 {
            return;
        }
        let element_id = drag.element_id.clone();
        let Some(el) = composition.find_element(&element_id) else {
            return;
        };
        let Some(target) = composition.find_track(target_track_id) else {
            return;
        };
        if target.locked || !target.kind.accepts(&el.kind) {
            tracing::debug!(element = %element_id, track = target_track_id, "cross-track move rejected");
            return;
        }
        if composition
            .track_of(&element_id)
            .is_some_and(|t| t.id == target_track_id)
        {
            return;
        }
        composition.move_element_to_track(&element_id, target_track_id);
    }

    /// Finish the drag; the mutation already applied incrementally.
    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Drop a media item onto a track at a screen x. Creates a snapped
    /// element after a history snapshot; incompatible or locked tracks
    /// reject the drop.
    pub fn media_drop(
        &mut self,
        composition: &mut Composition,
        history: &mut History,
        track_id: &str,
        media: &MediaDescriptor,
        x_px: f64,
        playhead: f64,
    ) -> Option<ElementId> {
        let track = composition.find_track(track_id)?;
        if track.locked || !track.kind.accepts(&media.kind) {
            return None;
        }

        let time = self
            .scale
            .snap(self.scale.pixel_to_time(x_px), None, playhead, composition);

        history.snapshot(composition);
        let mut el = Element::new(
            media.name.clone(),
            media.kind.clone(),
            composition.width,
            composition.height,
        );
        el.time = time.max(0.0);
        el.duration = media.duration.max(0.1);
        composition.add_element(track_id, el)
    }
}
