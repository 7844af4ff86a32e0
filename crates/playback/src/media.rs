//! Decode handles and the per-session media pool.

use std::collections::HashMap;

/// Identifier of a media source, opaque to the engine.
pub type SourceId = String;

/// Token attached to a seek request. Completions carry it back; a stale
/// token means the seek was superseded and its completion is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeekToken(pub u64);

/// Host-side decoding abstraction.
///
/// The engine never decodes media itself; it drives the host's decode
/// elements through this trait and reads their reported positions. Seeks
/// are asynchronous: the host calls back into the engine with the token
/// once the decoder has settled.
pub trait DecodeBackend {
    /// Create the decode handle for a source. Called once per source.
    fn open(&mut self, source: &str);

    /// Release the decode handle and its mixing node.
    fn close(&mut self, source: &str);

    fn play(&mut self, source: &str);

    fn pause(&mut self, source: &str);

    /// Request an asynchronous seek to a media-local position.
    fn seek(&mut self, source: &str, position: f64, token: SeekToken);

    /// Current media-local decode position in seconds.
    fn position(&self, source: &str) -> f64;

    /// Apply an audible gain in [0, 1] to the source's mixing node.
    fn set_gain(&mut self, source: &str, gain: f64);

    /// Apply the master gain downstream of every per-source node.
    fn set_master_gain(&mut self, _gain: f64) {}

    /// Whether this source delivers `frame_ready` callbacks; when false
    /// the engine polls `position` once per tick instead.
    fn supports_frame_callback(&self, source: &str) -> bool;
}

/// Maps opaque source ids to locators the decode backend can fetch.
///
/// Composition documents store `media://` ids so that they stay portable
/// across hosts; each host resolves them to its own storage at playback
/// time. Resolution must be stable for the lifetime of a session, since
/// the pool keys handles by the unresolved id.
pub trait SourceResolver {
    fn resolve(&self, source: &str) -> String;
}

/// Resolver that hands sources through unchanged. Suitable for hosts
/// whose backend understands `media://` ids natively.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughResolver;

impl SourceResolver for PassthroughResolver {
    fn resolve(&self, source: &str) -> String {
        source.to_string()
    }
}

/// State the engine tracks per open source.
#[derive(Debug, Clone, Default)]
pub struct MediaHandle {
    /// Last gain applied to the mixing node.
    pub gain: f64,

    /// Whether the source is currently decoding.
    pub playing: bool,
}

/// Owns exactly one decode handle per unique source, created lazily and
/// released together on session teardown.
#[derive(Debug, Default)]
pub struct MediaPool {
    handles: HashMap<SourceId, MediaHandle>,
}

impl MediaPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or lazily create the handle for a source.
    pub fn ensure(&mut self, backend: &mut impl DecodeBackend, source: &str) -> &mut MediaHandle {
        self.handles.entry(source.to_string()).or_insert_with(|| {
            tracing::debug!(source, "opening decode handle");
            backend.open(source);
            MediaHandle::default()
        })
    }

    pub fn get(&self, source: &str) -> Option<&MediaHandle> {
        self.handles.get(source)
    }

    pub fn get_mut(&mut self, source: &str) -> Option<&mut MediaHandle> {
        self.handles.get_mut(source)
    }

    pub fn sources(&self) -> impl Iterator<Item = &SourceId> {
        self.handles.keys()
    }

    pub fn gains(&self) -> HashMap<SourceId, f64> {
        self.handles
            .iter()
            .map(|(source, handle)| (source.clone(), handle.gain))
            .collect()
    }

    /// Release every handle. The pool is empty afterwards.
    pub fn release_all(&mut self, backend: &mut impl DecodeBackend) {
        for source in self.handles.keys() {
            backend.close(source);
        }
        self.handles.clear();
    }
}
