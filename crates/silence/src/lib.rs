//! CutReel Silence Removal
//!
//! Offline re-segmentation of a composition around detected speech:
//! - **Intervals:** Padding, sorting, and merging of detector output
//! - **Remove:** Cutting clip groups to their speech sub-ranges and
//!   re-laying the segments contiguously on the timeline
//!
//! Speech detection itself happens in an external collaborator; this
//! crate only consumes its `{start, end}` intervals.

pub mod intervals;
pub mod remove;

pub use intervals::*;
pub use remove::*;
