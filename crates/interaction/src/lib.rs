//! CutReel Interaction Layer
//!
//! Direct-manipulation editing over the composition model:
//! - **Selection:** The ordered set of selected element ids
//! - **Canvas:** Screen-space pointer gestures (select, move, corner
//!   resize) with handle hit testing scaled by the view
//! - **Timeline:** Clip move/trim drags with snapping, gated cross-track
//!   reassignment, and media drops
//!
//! Every mutating gesture records a history snapshot before it changes
//! the composition.

pub mod canvas;
pub mod selection;
pub mod timeline_drag;

pub use canvas::{element_bounds, selection_overlays, Bounds, CanvasController, CanvasView, Corner};
pub use selection::Selection;
pub use timeline_drag::{DragKind, MediaDescriptor, TimelineController};
