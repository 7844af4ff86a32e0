//! The playback clock: a state machine that drives the playhead from the
//! primary video element's decode position, falling back to a wall-clock
//! timer when no video element is active.
//!
//! The engine is single-threaded and cooperative. The host calls `tick`
//! from its render loop and forwards `frame_ready` / `seek_completed`
//! notifications from the decode backend. Seeks are asynchronous: every
//! engine-issued seek carries a token and the host must report its
//! completion, otherwise position reports for that source stay discarded.

use std::collections::HashMap;

use cutreel_common::PlaybackDefaults;
use cutreel_composition::{Composition, Element, ElementId};

use crate::media::{DecodeBackend, MediaPool, SeekToken, SourceId};
use crate::mixer::compute_gains;

/// Discontinuity above which a primary transition issues a corrective
/// seek, in seconds.
const SEEK_EPSILON: f64 = 0.05;

/// What the host should do after a clock update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Nothing to do (paused, or waiting on a pending seek).
    Idle,
    /// Draw the frame at this timeline time.
    Render(f64),
    /// Playback reached the end; playhead was reset, draw a blank frame.
    Stopped,
}

/// Clock state, reported through the debug surface.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum TransportState {
    Idle,
    Timer,
    Primary { element_id: ElementId },
}

enum Transport {
    Idle,
    Timer { last_tick: f64, last_resync: f64 },
    Primary { element_id: ElementId },
}

/// Read-only snapshot of the audio graph for tests and diagnostics.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AudioDebugInfo {
    pub gains: HashMap<SourceId, f64>,
    pub master_volume: f64,
    pub transport: TransportState,
    pub open_sources: usize,
}

/// Seeks issued by one paused-seek request. A newer request supersedes
/// the batch; completions for the old one are discarded.
struct PausedSeekBatch {
    pending: HashMap<SourceId, SeekToken>,
}

/// The playback engine instance for one editing session.
pub struct PlaybackEngine<B: DecodeBackend> {
    backend: B,
    pool: MediaPool,
    config: PlaybackDefaults,
    playhead: f64,
    master_volume: f64,
    transport: Transport,
    /// Sources with an unresolved engine-issued seek; their position and
    /// frame reports are discarded until the matching completion arrives.
    pending_seeks: HashMap<SourceId, SeekToken>,
    paused_seek: Option<PausedSeekBatch>,
    next_token: u64,
}

impl<B: DecodeBackend> PlaybackEngine<B> {
    pub fn new(backend: B, config: PlaybackDefaults) -> Self {
        Self {
            backend,
            pool: MediaPool::new(),
            config,
            playhead: 0.0,
            master_volume: 1.0,
            transport: Transport::Idle,
            pending_seeks: HashMap::new(),
            paused_seek: None,
            next_token: 0,
        }
    }

    pub fn playhead(&self) -> f64 {
        self.playhead
    }

    pub fn is_playing(&self) -> bool {
        !matches!(self.transport, Transport::Idle)
    }

    pub fn master_volume(&self) -> f64 {
        self.master_volume
    }

    pub fn set_master_volume(&mut self, volume: f64) {
        self.master_volume = volume.clamp(0.0, 1.0);
        self.backend.set_master_gain(self.master_volume);
    }

    pub fn transport_state(&self) -> TransportState {
        match &self.transport {
            Transport::Idle => TransportState::Idle,
            Transport::Timer { .. } => TransportState::Timer,
            Transport::Primary { element_id } => TransportState::Primary {
                element_id: element_id.clone(),
            },
        }
    }

    // === Transport control ===

    /// Begin playback at the current playhead. `now` is the host's wall
    /// clock in seconds.
    pub fn play(&mut self, composition: &Composition, now: f64) {
        if self.is_playing() {
            return;
        }
        tracing::debug!(playhead = self.playhead, "play");

        if let Some(primary) = find_active_video(composition, self.playhead) {
            let primary_id = primary.id.clone();
            let primary_source = primary.source().map(str::to_string);
            self.start_primary(composition, &primary_id, self.playhead);
            // Other active media start decoding alongside the primary.
            self.start_other_active_media(composition, self.playhead, primary_source.as_deref());
        } else {
            self.sync_active_audio(composition, self.playhead);
            self.transport = Transport::Timer {
                last_tick: now,
                last_resync: now,
            };
        }

        self.apply_gains(composition, self.playhead);
    }

    /// Stop decoding everywhere and hold the playhead. Returns the time
    /// the host should render one final frame at.
    pub fn pause(&mut self, _composition: &Composition) -> f64 {
        tracing::debug!(playhead = self.playhead, "pause");
        let sources: Vec<SourceId> = self.pool.sources().cloned().collect();
        for source in sources {
            self.backend.pause(&source);
            self.backend.set_gain(&source, 0.0);
            if let Some(handle) = self.pool.get_mut(&source) {
                handle.playing = false;
                handle.gain = 0.0;
            }
        }
        self.transport = Transport::Idle;
        self.pending_seeks.clear();
        self.paused_seek = None;
        self.playhead
    }

    /// One step of the host's render loop.
    pub fn tick(&mut self, composition: &Composition, now: f64) -> TickOutcome {
        match &self.transport {
            Transport::Idle => TickOutcome::Idle,
            Transport::Primary { element_id } => {
                let element_id = element_id.clone();
                let Some(el) = composition.find_element(&element_id) else {
                    // Primary was deleted mid-playback; pick a successor.
                    return self.advance(composition, self.playhead, now);
                };
                let Some(source) = el.source().map(str::to_string) else {
                    return self.advance(composition, self.playhead, now);
                };
                if self.backend.supports_frame_callback(&source) {
                    // frame_ready drives the clock for this source.
                    return TickOutcome::Render(self.playhead);
                }
                if self.pending_seeks.contains_key(&source) {
                    // Stale position until the seek settles.
                    return TickOutcome::Render(self.playhead);
                }
                let media_time = self.backend.position(&source);
                let timeline = media_time - el.trim_start + el.time;
                self.advance(composition, timeline, now)
            }
            Transport::Timer {
                last_tick,
                last_resync,
            } => {
                let (last_tick, last_resync) = (*last_tick, *last_resync);
                let new_time = self.playhead + (now - last_tick);

                if let Some(video) = find_active_video(composition, new_time) {
                    let video_id = video.id.clone();
                    self.playhead = new_time;
                    self.start_primary(composition, &video_id, new_time);
                    self.apply_gains(composition, new_time);
                    return TickOutcome::Render(new_time);
                }

                if new_time >= composition.duration() {
                    return self.stop_at_end(composition);
                }

                self.playhead = new_time;
                let resync = now - last_resync > self.config.resync_interval;
                if resync {
                    self.sync_active_audio(composition, new_time);
                }
                self.transport = Transport::Timer {
                    last_tick: now,
                    last_resync: if resync { now } else { last_resync },
                };
                self.apply_gains(composition, new_time);
                TickOutcome::Render(new_time)
            }
        }
    }

    /// Decoded-frame notification from a backend that supports frame
    /// callbacks. `media_time` is the presented frame's media-local time.
    pub fn frame_ready(
        &mut self,
        composition: &Composition,
        source: &str,
        media_time: f64,
        now: f64,
    ) -> TickOutcome {
        let Transport::Primary { element_id } = &self.transport else {
            return TickOutcome::Idle;
        };
        let element_id = element_id.clone();
        let Some(el) = composition.find_element(&element_id) else {
            return TickOutcome::Idle;
        };
        if el.source() != Some(source) {
            return TickOutcome::Idle;
        }
        if self.pending_seeks.contains_key(source) {
            // Stale frame delivered before the pending seek completed.
            return TickOutcome::Render(self.playhead);
        }
        let timeline = media_time - el.trim_start + el.time;
        self.advance(composition, timeline, now)
    }

    /// Completion notification for an engine-issued seek.
    ///
    /// Returns the time to render when this completion finishes a
    /// paused-seek batch; superseded completions are discarded.
    pub fn seek_completed(&mut self, source: &str, token: SeekToken) -> Option<f64> {
        if self.pending_seeks.get(source) == Some(&token) {
            self.pending_seeks.remove(source);
        }

        if let Some(batch) = &mut self.paused_seek {
            if batch.pending.get(source) == Some(&token) {
                batch.pending.remove(source);
                if batch.pending.is_empty() {
                    self.paused_seek = None;
                    return Some(self.playhead);
                }
            }
        }
        None
    }

    /// Explicit seek while paused. Seeks every active decodable element's
    /// source; returns `Some(time)` when nothing needed seeking and the
    /// host can render immediately, otherwise the render request arrives
    /// through `seek_completed` once the whole batch settles.
    pub fn seek_paused(&mut self, composition: &Composition, time: f64) -> Option<f64> {
        debug_assert!(!self.is_playing(), "seek_paused requires a paused engine");
        let time = time.max(0.0);
        self.playhead = time;

        let targets: Vec<(SourceId, f64)> = composition
            .active_elements(time)
            .into_iter()
            .filter(|(_, el)| el.is_decodable())
            .filter_map(|(_, el)| {
                el.source()
                    .map(|s| (s.to_string(), el.local_time(time).max(0.0)))
            })
            .collect();

        let mut pending = HashMap::new();
        for (source, local) in targets {
            self.pool.ensure(&mut self.backend, &source);
            let token = self.mint_token();
            self.backend.seek(&source, local, token);
            pending.insert(source, token);
        }

        if pending.is_empty() {
            self.paused_seek = None;
            Some(time)
        } else {
            // A new batch supersedes any unresolved previous one.
            self.paused_seek = Some(PausedSeekBatch { pending });
            None
        }
    }

    // === Debug / introspection surface ===

    /// Get or lazily create the decode handle for a source.
    pub fn ensure_handle(&mut self, source: &str) {
        self.pool.ensure(&mut self.backend, source);
    }

    /// Recompute and apply every source's gain at an arbitrary time, then
    /// read the results back.
    pub fn force_gain_update(
        &mut self,
        composition: &Composition,
        t: f64,
    ) -> HashMap<SourceId, f64> {
        self.apply_gains(composition, t);
        self.pool.gains()
    }

    pub fn debug_info(&self) -> AudioDebugInfo {
        AudioDebugInfo {
            gains: self.pool.gains(),
            master_volume: self.master_volume,
            transport: self.transport_state(),
            open_sources: self.pool.sources().count(),
        }
    }

    /// Release every decode handle and mixing node. The engine is reusable
    /// afterwards but starts from an empty pool.
    pub fn dispose(&mut self) {
        self.transport = Transport::Idle;
        self.pending_seeks.clear();
        self.paused_seek = None;
        self.pool.release_all(&mut self.backend);
    }

    // === Internals ===

    /// Shared per-frame logic: end-of-timeline stop, playhead update,
    /// primary handoff, gains before render.
    fn advance(&mut self, composition: &Composition, timeline: f64, now: f64) -> TickOutcome {
        if timeline >= composition.duration() {
            return self.stop_at_end(composition);
        }

        self.playhead = timeline;

        if let Transport::Primary { element_id } = &self.transport {
            let still_active = composition
                .find_element(element_id)
                .is_some_and(|el| el.is_active(timeline));
            if !still_active {
                self.handle_primary_transition(composition, timeline, now);
            }
        }

        self.apply_gains(composition, timeline);
        TickOutcome::Render(timeline)
    }

    fn stop_at_end(&mut self, composition: &Composition) -> TickOutcome {
        tracing::debug!("end of timeline, stopping");
        self.pause(composition);
        self.playhead = 0.0;
        TickOutcome::Stopped
    }

    /// Hand the clock to the next active video element, or fall back to
    /// the wall-clock timer.
    fn handle_primary_transition(&mut self, composition: &Composition, t: f64, now: f64) {
        let old_source = match &self.transport {
            Transport::Primary { element_id } => composition
                .find_element(element_id)
                .and_then(|el| el.source())
                .map(str::to_string),
            _ => None,
        };

        if let Some(next) = find_active_video(composition, t) {
            let next_id = next.id.clone();
            let next_source = next.source().map(str::to_string);
            if old_source != next_source {
                if let Some(old) = &old_source {
                    self.backend.pause(old);
                    if let Some(handle) = self.pool.get_mut(old) {
                        handle.playing = false;
                    }
                }
            }
            self.start_primary(composition, &next_id, t);
        } else {
            if let Some(old) = &old_source {
                self.backend.pause(old);
                if let Some(handle) = self.pool.get_mut(old) {
                    handle.playing = false;
                }
                self.pending_seeks.remove(old);
            }
            self.sync_active_audio(composition, t);
            self.transport = Transport::Timer {
                last_tick: now,
                last_resync: now,
            };
        }
    }

    /// Make an element the primary clock source: seek its media if the
    /// mapping is discontinuous (guarding reports until the seek settles)
    /// and start it decoding.
    fn start_primary(&mut self, composition: &Composition, element_id: &str, t: f64) {
        let Some(el) = composition.find_element(element_id) else {
            return;
        };
        let Some(source) = el.source().map(str::to_string) else {
            return;
        };
        let local = el.local_time(t).max(0.0);

        self.pool.ensure(&mut self.backend, &source);
        if (self.backend.position(&source) - local).abs() > SEEK_EPSILON {
            let token = self.mint_token();
            self.pending_seeks.insert(source.clone(), token);
            self.backend.seek(&source, local, token);
        }
        if let Some(handle) = self.pool.get_mut(&source) {
            if !handle.playing {
                handle.playing = true;
                self.backend.play(&source);
            }
        }
        self.transport = Transport::Primary {
            element_id: element_id.to_string(),
        };
    }

    /// Seek and start every other active decodable source alongside a new
    /// primary.
    fn start_other_active_media(
        &mut self,
        composition: &Composition,
        t: f64,
        exclude: Option<&str>,
    ) {
        let targets: Vec<(SourceId, f64)> = composition
            .active_elements(t)
            .into_iter()
            .filter(|(_, el)| el.is_decodable())
            .filter_map(|(_, el)| el.source().map(|s| (s.to_string(), el.local_time(t).max(0.0))))
            .filter(|(s, _)| Some(s.as_str()) != exclude)
            .collect();
        for (source, local) in targets {
            self.pool.ensure(&mut self.backend, &source);
            let token = self.mint_token();
            self.pending_seeks.insert(source.clone(), token);
            self.backend.seek(&source, local, token);
            if let Some(handle) = self.pool.get_mut(&source) {
                if !handle.playing {
                    handle.playing = true;
                    self.backend.play(&source);
                }
            }
        }
    }

    /// Keep active audio-only sources decoding and drift-corrected.
    fn sync_active_audio(&mut self, composition: &Composition, t: f64) {
        let targets: Vec<(SourceId, f64)> = composition
            .active_elements(t)
            .into_iter()
            .filter(|(_, el)| el.is_audio() && el.is_decodable())
            .filter_map(|(_, el)| el.source().map(|s| (s.to_string(), el.local_time(t).max(0.0))))
            .collect();
        for (source, local) in targets {
            self.pool.ensure(&mut self.backend, &source);
            if (self.backend.position(&source) - local).abs() > self.config.resync_tolerance {
                tracing::trace!(source = %source, "audio drift resync");
                let token = self.mint_token();
                self.pending_seeks.insert(source.clone(), token);
                self.backend.seek(&source, local, token);
            }
            if let Some(handle) = self.pool.get_mut(&source) {
                if !handle.playing {
                    handle.playing = true;
                    self.backend.play(&source);
                }
            }
        }
    }

    /// Recompute per-source gains and push them to the mixing nodes.
    /// Only opened sources carry a node; others keep their zero entry in
    /// `compute_gains` output until first use.
    fn apply_gains(&mut self, composition: &Composition, t: f64) {
        let gains = compute_gains(composition, t);
        let sources: Vec<SourceId> = self.pool.sources().cloned().collect();
        for source in sources {
            let gain = gains.get(&source).copied().unwrap_or(0.0);
            self.backend.set_gain(&source, gain);
            if let Some(handle) = self.pool.get_mut(&source) {
                handle.gain = gain;
            }
        }
    }

    fn mint_token(&mut self) -> SeekToken {
        self.next_token += 1;
        SeekToken(self.next_token)
    }
}

/// The active video element that should drive the clock, searching tracks
/// bottom-up so the main video bed wins over overlay clips.
fn find_active_video<'a>(composition: &'a Composition, t: f64) -> Option<&'a Element> {
    composition
        .tracks
        .iter()
        .rev()
        .filter(|track| track.visible)
        .flat_map(|track| &track.elements)
        .find(|el| el.is_video() && el.source().is_some() && el.is_active(t))
}
