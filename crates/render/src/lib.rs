//! CutReel Canvas Compositor
//!
//! Software rasterization of a composition at a timeline time:
//! - **Geometry:** Percentage box resolution and cover/contain fit math
//! - **Surface:** RGBA8 pixel buffer with blended drawing primitives
//! - **Text:** Compact embedded bitmap glyph rendering
//! - **Compositor:** Track-ordered element painting with last-good-frame
//!   fallback and caching

pub mod color;
pub mod compositor;
pub mod geometry;
pub mod surface;
pub mod text;

pub use color::{parse_hex, Rgba};
pub use compositor::{Compositor, FrameSource};
pub use geometry::{calculate_fit, element_box, FitBox};
pub use surface::{Frame, Surface};
