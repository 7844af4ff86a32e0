//! Per-source audio gain computation.
//!
//! One gain value per unique media source, recomputed every tick and
//! after every seek so audio stays consistent with the drawn frame.

use std::collections::{HashMap, HashSet};

use cutreel_composition::{Composition, Element};

use crate::media::SourceId;

/// Linear fade factor at an element-local time (seconds since the
/// element's timeline start), clamped to [0, 1]. Defaults to 1 when no
/// fade is configured.
pub fn fade_factor(element: &Element, local: f64) -> f64 {
    let mut factor: f64 = 1.0;
    if element.fade_in > 0.0 && local < element.fade_in {
        factor = factor.min(local / element.fade_in);
    }
    let remaining = element.duration - local;
    if element.fade_out > 0.0 && remaining < element.fade_out {
        factor = factor.min(remaining / element.fade_out);
    }
    factor.clamp(0.0, 1.0)
}

/// Compute the effective gain of every known source at timeline time `t`.
///
/// For each source the controlling element is chosen by the audio-priority
/// rule: if any audio element anywhere in the composition references the
/// source, audio elements govern it exclusively; the gain is 0 whenever no
/// audio element is active, even if a video element on the same source is.
/// Sources with no dedicated audio element fall back to the active video
/// element's volume. A muted or invisible track forces 0; otherwise
/// `volume * fade`, clamped to [0, 1]. Master volume is applied downstream
/// of these per-source gains.
pub fn compute_gains(composition: &Composition, t: f64) -> HashMap<SourceId, f64> {
    // Composition-wide dedicated-audio existence, not just active elements.
    let dedicated: HashSet<&str> = composition
        .tracks
        .iter()
        .flat_map(|track| &track.elements)
        .filter(|el| el.is_audio())
        .filter_map(|el| el.source())
        .collect();

    let mut gains: HashMap<SourceId, f64> = HashMap::new();

    // Every referenced source gets an entry so inactive ones mute.
    for (_, el) in composition.all_elements() {
        if el.is_decodable() {
            if let Some(source) = el.source() {
                gains.entry(source.to_string()).or_insert(0.0);
            }
        }
    }

    for track in &composition.tracks {
        if !track.visible {
            continue;
        }
        for el in &track.elements {
            if !el.is_active(t) || !el.is_decodable() {
                continue;
            }
            let Some(source) = el.source() else { continue };

            let governs = if dedicated.contains(source) {
                el.is_audio()
            } else {
                el.is_video()
            };
            if !governs {
                continue;
            }

            let gain = if track.muted {
                0.0
            } else {
                (el.volume * fade_factor(el, t - el.time)).clamp(0.0, 1.0)
            };
            gains.insert(source.to_string(), gain);
        }
    }

    gains
}

#[cfg(test)]
mod tests {
    use super::*;
    use cutreel_composition::{ElementKind, TrackKind};

    fn element(kind: ElementKind, time: f64, duration: f64, volume: f64) -> Element {
        let mut el = Element::new("clip", kind, 1080, 1920);
        el.time = time;
        el.duration = duration;
        el.volume = volume;
        el
    }

    fn video(source: &str, time: f64, duration: f64, volume: f64) -> Element {
        element(
            ElementKind::Video {
                source: Some(source.to_string()),
            },
            time,
            duration,
            volume,
        )
    }

    fn audio(source: &str, time: f64, duration: f64, volume: f64) -> Element {
        element(
            ElementKind::Audio {
                source: Some(source.to_string()),
            },
            time,
            duration,
            volume,
        )
    }

    const SRC: &str = "media://talk.mp4";

    #[test]
    fn dedicated_audio_element_wins_over_video() {
        let mut comp = Composition::new(1080, 1920, 30);
        let vt = comp.add_track(TrackKind::Video, None);
        let at = comp.add_track(TrackKind::Audio, None);
        comp.add_element(&vt, video(SRC, 0.0, 30.0, 0.0));
        comp.add_element(&at, audio(SRC, 0.0, 30.0, 0.8));

        let gains = compute_gains(&comp, 15.0);
        assert_eq!(gains[SRC], 0.8);
    }

    #[test]
    fn muted_video_track_never_leaks_through() {
        let mut comp = Composition::new(1080, 1920, 30);
        let vt = comp.add_track(TrackKind::Video, None);
        let at = comp.add_track(TrackKind::Audio, None);
        comp.add_element(&vt, video(SRC, 0.0, 30.0, 0.5));
        comp.add_element(&at, audio(SRC, 0.0, 30.0, 0.7));
        comp.find_track_mut(&vt).unwrap().muted = true;

        let gains = compute_gains(&comp, 15.0);
        assert_eq!(gains[SRC], 0.7);
    }

    #[test]
    fn muted_audio_track_silences_the_source() {
        let mut comp = Composition::new(1080, 1920, 30);
        let vt = comp.add_track(TrackKind::Video, None);
        let at = comp.add_track(TrackKind::Audio, None);
        comp.add_element(&vt, video(SRC, 0.0, 30.0, 1.0));
        comp.add_element(&at, audio(SRC, 0.0, 30.0, 0.7));
        comp.find_track_mut(&at).unwrap().muted = true;

        let gains = compute_gains(&comp, 15.0);
        assert_eq!(gains[SRC], 0.0);
    }

    #[test]
    fn inactive_dedicated_audio_mutes_even_active_video() {
        let mut comp = Composition::new(1080, 1920, 30);
        let vt = comp.add_track(TrackKind::Video, None);
        let at = comp.add_track(TrackKind::Audio, None);
        comp.add_element(&vt, video(SRC, 0.0, 30.0, 1.0));
        // Dedicated audio only covers the first 10 seconds.
        comp.add_element(&at, audio(SRC, 0.0, 10.0, 0.9));

        let gains = compute_gains(&comp, 15.0);
        assert_eq!(gains[SRC], 0.0);
        let gains = compute_gains(&comp, 5.0);
        assert_eq!(gains[SRC], 0.9);
    }

    #[test]
    fn video_volume_governs_without_dedicated_audio() {
        let mut comp = Composition::new(1080, 1920, 30);
        let vt = comp.add_track(TrackKind::Video, None);
        comp.add_element(&vt, video(SRC, 0.0, 30.0, 0.6));

        let gains = compute_gains(&comp, 15.0);
        assert_eq!(gains[SRC], 0.6);
    }

    #[test]
    fn inactive_source_gets_zero_entry() {
        let mut comp = Composition::new(1080, 1920, 30);
        let vt = comp.add_track(TrackKind::Video, None);
        comp.add_element(&vt, video(SRC, 10.0, 5.0, 1.0));

        let gains = compute_gains(&comp, 2.0);
        assert_eq!(gains[SRC], 0.0);
    }

    #[test]
    fn fade_ramp_is_linear() {
        let mut el = audio(SRC, 0.0, 20.0, 1.0);
        el.fade_in = 3.0;
        el.fade_out = 3.0;

        assert!((fade_factor(&el, 1.5) - 0.5).abs() < 1e-9);
        assert_eq!(fade_factor(&el, 10.0), 1.0);
        assert!((fade_factor(&el, 19.9) - 0.1 / 3.0).abs() < 1e-9);
        assert_eq!(fade_factor(&el, 0.0), 0.0);
    }

    #[test]
    fn invisible_track_contributes_no_gain() {
        let mut comp = Composition::new(1080, 1920, 30);
        let vt = comp.add_track(TrackKind::Video, None);
        comp.add_element(&vt, video(SRC, 0.0, 30.0, 0.8));
        comp.find_track_mut(&vt).unwrap().visible = false;

        let gains = compute_gains(&comp, 15.0);
        assert_eq!(gains[SRC], 0.0);
    }
}
