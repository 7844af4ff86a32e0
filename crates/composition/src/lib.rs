//! CutReel Composition Model
//!
//! Defines the core data contracts for CutReel compositions:
//! - **Composition:** Tracks, elements, and the pure mutation operations
//! - **Element:** Timed, positioned items (video/image/text/shape/audio)
//! - **Timeline:** Time/pixel conversion, snapping, adaptive grid
//! - **History:** Snapshot-based linear undo/redo
//!
//! The document is a flat arena addressed by string ids; mutations that
//! target a missing id are silent no-ops, never errors.

pub mod composition;
pub mod element;
pub mod history;
pub mod timeline;

pub use composition::*;
pub use element::*;
pub use history::*;
pub use timeline::*;
