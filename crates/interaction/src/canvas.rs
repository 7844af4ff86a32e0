//! Canvas gestures: selection, move, and corner resize in composition
//! space.
//!
//! Pointer coordinates arrive in screen space and are converted through
//! the current view size; handle hit radii are fixed screen pixels, so
//! their composition-space tolerance scales with the view.

use cutreel_common::InteractionDefaults;
use cutreel_composition::{Composition, Dim, Element, ElementId, History};

use crate::selection::Selection;

/// Screen size of the canvas viewport, for coordinate conversion.
#[derive(Debug, Clone, Copy)]
pub struct CanvasView {
    pub width: f64,
    pub height: f64,
}

impl CanvasView {
    /// Convert screen coordinates to composition space.
    pub fn to_composition(&self, composition: &Composition, sx: f64, sy: f64) -> (f64, f64) {
        (
            sx * composition.width as f64 / self.width,
            sy * composition.height as f64 / self.height,
        )
    }

    /// A fixed screen-pixel radius expressed in composition units.
    fn tolerance(&self, composition: &Composition, screen_px: f64) -> f64 {
        screen_px * composition.width as f64 / self.width
    }
}

/// Corner resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Corner {
    const ALL: [Corner; 4] = [
        Corner::NorthWest,
        Corner::NorthEast,
        Corner::SouthWest,
        Corner::SouthEast,
    ];

    fn is_west(&self) -> bool {
        matches!(self, Corner::NorthWest | Corner::SouthWest)
    }

    fn is_north(&self) -> bool {
        matches!(self, Corner::NorthWest | Corner::NorthEast)
    }
}

/// Axis-aligned element bounds in composition space, top-left anchored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    fn corner(&self, corner: Corner) -> (f64, f64) {
        match corner {
            Corner::NorthWest => (self.x, self.y),
            Corner::NorthEast => (self.x + self.width, self.y),
            Corner::SouthWest => (self.x, self.y + self.height),
            Corner::SouthEast => (self.x + self.width, self.y + self.height),
        }
    }
}

/// Resolve an element's box to composition-space bounds.
pub fn element_bounds(el: &Element, comp_w: f64, comp_h: f64) -> Bounds {
    let cx = el.x.resolve(comp_w);
    let cy = el.y.resolve(comp_h);
    let width = el.width.resolve_size(comp_w);
    let height = el.height.resolve_size(comp_h);
    Bounds {
        x: cx - width / 2.0,
        y: cy - height / 2.0,
        width,
        height,
    }
}

enum Gesture {
    Move {
        start: (f64, f64),
        /// Original center of every moving element; the same delta is
        /// applied to each.
        origins: Vec<(ElementId, f64, f64)>,
    },
    Resize {
        corner: Corner,
        element_id: ElementId,
        start: (f64, f64),
        original: Bounds,
    },
}

/// Stateful canvas gesture controller.
#[derive(Default)]
pub struct CanvasController {
    config: InteractionDefaults,
    gesture: Option<Gesture>,
    pub hovered_element: Option<ElementId>,
    pub hovered_corner: Option<Corner>,
}

impl CanvasController {
    pub fn new(config: InteractionDefaults) -> Self {
        Self {
            config,
            gesture: None,
            hovered_element: None,
            hovered_corner: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    /// Begin a gesture. Handles of selected elements are tested before
    /// element bodies; hitting empty space clears the selection.
    #[allow(clippy::too_many_arguments)]
    pub fn pointer_down(
        &mut self,
        composition: &mut Composition,
        history: &mut History,
        selection: &mut Selection,
        view: &CanvasView,
        playhead: f64,
        sx: f64,
        sy: f64,
        toggle_modifier: bool,
    ) {
        let (cx, cy) = view.to_composition(composition, sx, sy);
        let comp_w = composition.width as f64;
        let comp_h = composition.height as f64;
        let tolerance = view.tolerance(composition, self.config.handle_px);

        // Corner handles of the selection take priority over bodies.
        for id in selection.ids() {
            let Some(el) = composition.find_element(id) else {
                continue;
            };
            let bounds = element_bounds(el, comp_w, comp_h);
            let Some(corner) = hit_corner(&bounds, cx, cy, tolerance) else {
                continue;
            };
            tracing::debug!(element = %id, ?corner, "begin resize");
            history.snapshot(composition);
            self.gesture = Some(Gesture::Resize {
                corner,
                element_id: id.clone(),
                start: (cx, cy),
                original: bounds,
            });
            return;
        }

        let Some(hit) = hit_test(composition, playhead, cx, cy) else {
            selection.clear();
            return;
        };

        if toggle_modifier {
            selection.toggle(hit.clone());
        } else if !selection.contains(&hit) {
            selection.select(hit.clone());
        }

        history.snapshot(composition);
        let mut origins: Vec<(ElementId, f64, f64)> = Vec::new();
        for id in selection.ids().iter().chain(std::iter::once(&hit)) {
            if origins.iter().any(|(o, _, _)| o == id) {
                continue;
            }
            if let Some(el) = composition.find_element(id) {
                origins.push((id.clone(), el.x.resolve(comp_w), el.y.resolve(comp_h)));
            }
        }
        tracing::debug!(element = %hit, count = origins.len(), "begin move");
        self.gesture = Some(Gesture::Move {
            start: (cx, cy),
            origins,
        });
    }

    /// Continue a gesture, or update hover state when idle.
    pub fn pointer_move(
        &mut self,
        composition: &mut Composition,
        selection: &Selection,
        view: &CanvasView,
        playhead: f64,
        sx: f64,
        sy: f64,
    ) {
        let (cx, cy) = view.to_composition(composition, sx, sy);
        let comp_w = composition.width as f64;
        let comp_h = composition.height as f64;

        match &self.gesture {
            None => {
                let tolerance = view.tolerance(composition, self.config.handle_px);
                self.hovered_corner = selection.ids().iter().find_map(|id| {
                    let el = composition.find_element(id)?;
                    hit_corner(&element_bounds(el, comp_w, comp_h), cx, cy, tolerance)
                });
                self.hovered_element = if self.hovered_corner.is_some() {
                    None
                } else {
                    hit_test(composition, playhead, cx, cy)
                };
            }
            Some(Gesture::Move { start, origins }) => {
                let dx = cx - start.0;
                let dy = cy - start.1;
                let origins = origins.clone();
                let mut moved = false;
                for (id, ox, oy) in &origins {
                    if let Some(el) = composition.find_element_mut(id) {
                        el.x = Dim::Percent((ox + dx) / comp_w * 100.0);
                        el.y = Dim::Percent((oy + dy) / comp_h * 100.0);
                        moved = true;
                    }
                }
                if moved {
                    composition.mark_dirty();
                }
            }
            Some(Gesture::Resize {
                corner,
                element_id,
                start,
                original,
            }) => {
                let dx = cx - start.0;
                let dy = cy - start.1;
                let (corner, element_id, original) = (*corner, element_id.clone(), *original);
                let min = self.config.min_element_px;

                // Each corner resizes toward itself; the opposite edge
                // stays fixed, including when the minimum floor clamps.
                let (new_x, new_w) = if corner.is_west() {
                    let w = (original.width - dx).max(min);
                    (original.x + original.width - w, w)
                } else {
                    ((original.x), (original.width + dx).max(min))
                };
                let (new_y, new_h) = if corner.is_north() {
                    let h = (original.height - dy).max(min);
                    (original.y + original.height - h, h)
                } else {
                    ((original.y), (original.height + dy).max(min))
                };

                if let Some(el) = composition.find_element_mut(&element_id) {
                    el.x = Dim::Percent((new_x + new_w / 2.0) / comp_w * 100.0);
                    el.y = Dim::Percent((new_y + new_h / 2.0) / comp_h * 100.0);
                    el.width = Dim::Percent(new_w / comp_w * 100.0);
                    el.height = Dim::Percent(new_h / comp_h * 100.0);
                    composition.mark_dirty();
                }
            }
        }
    }

    /// Commit the gesture. The mutation already applied incrementally, so
    /// there is nothing further to change.
    pub fn pointer_up(&mut self) {
        self.gesture = None;
    }
}

/// Selection rectangles for overlay drawing: selected, non-audio elements
/// active at the playhead.
pub fn selection_overlays(
    composition: &Composition,
    selection: &Selection,
    playhead: f64,
) -> Vec<(ElementId, Bounds)> {
    let comp_w = composition.width as f64;
    let comp_h = composition.height as f64;
    selection
        .ids()
        .iter()
        .filter_map(|id| {
            let el = composition.find_element(id)?;
            if el.is_audio() || !el.is_active(playhead) {
                return None;
            }
            Some((id.clone(), element_bounds(el, comp_w, comp_h)))
        })
        .collect()
}

fn hit_corner(bounds: &Bounds, cx: f64, cy: f64, tolerance: f64) -> Option<Corner> {
    Corner::ALL.into_iter().find(|corner| {
        let (px, py) = bounds.corner(*corner);
        (cx - px).abs() <= tolerance && (cy - py).abs() <= tolerance
    })
}

/// Topmost-first body hit test over the active, visible element set.
fn hit_test(composition: &Composition, playhead: f64, cx: f64, cy: f64) -> Option<ElementId> {
    let comp_w = composition.width as f64;
    let comp_h = composition.height as f64;
    for track in &composition.tracks {
        if !track.visible {
            continue;
        }
        // Later elements paint later within a track, so test them first.
        for el in track.elements.iter().rev() {
            if el.is_audio() || !el.is_active(playhead) {
                continue;
            }
            if element_bounds(el, comp_w, comp_h).contains(cx, cy) {
                return Some(el.id.clone());
            }
        }
    }
    None
}
