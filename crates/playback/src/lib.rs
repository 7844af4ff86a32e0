//! CutReel Playback Engine
//!
//! Synchronized preview playback over a composition:
//! - **Media:** The decode backend abstraction and per-session media pool
//! - **Mixer:** Per-source gain with audio-priority, mute, and fades
//! - **Engine:** The playhead state machine (idle / timer-driven /
//!   primary-driven), seek guards, and the debug surface
//!
//! The engine decodes nothing itself; the host supplies a
//! [`DecodeBackend`] and drives [`PlaybackEngine::tick`] from its render
//! loop.

pub mod engine;
pub mod media;
pub mod mixer;

pub use engine::*;
pub use media::*;
pub use mixer::*;
