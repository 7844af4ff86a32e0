//! Stable id generation for tracks and elements.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique id with the given prefix (e.g. "el", "track").
///
/// Ids combine a nanosecond timestamp with a process-local counter so
/// that two ids minted within the same nanosecond still differ.
pub fn new_id(prefix: &str) -> String {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}_{:012x}{:04x}", prefix, seed & 0xFFFF_FFFF_FFFF, count & 0xFFFF)
}

/// Generate a new element id.
pub fn element_id() -> String {
    new_id("el")
}

/// Generate a new track id.
pub fn track_id() -> String {
    new_id("track")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = element_id();
        let b = element_id();
        assert_ne!(a, b);
    }

    #[test]
    fn ids_carry_prefix() {
        assert!(element_id().starts_with("el_"));
        assert!(track_id().starts_with("track_"));
    }
}
