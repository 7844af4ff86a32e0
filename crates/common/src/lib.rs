//! CutReel Common Utilities
//!
//! Shared infrastructure for all CutReel crates:
//! - Error types and result aliases
//! - Editor configuration loading
//! - Stable id generation for tracks and elements
//! - Tracing/logging initialization

pub mod config;
pub mod error;
pub mod id;
pub mod logging;

pub use config::*;
pub use error::*;
pub use id::*;
