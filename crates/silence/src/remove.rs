//! Re-segments composition elements around detected speech.
//!
//! Elements on different tracks that reference the same media source form
//! a clip group. Every segment of a group gets identical `time`,
//! `duration`, and `trim_start` at matching segment index, so paired
//! audio/video stay frame-synchronized after the cut.

use std::collections::HashMap;

use cutreel_common::element_id;
use cutreel_composition::Composition;

use crate::intervals::{intersect, normalize, SpeechInterval};

/// Speech intervals per media source, as supplied by the external
/// detection collaborator.
pub type SpeechMap = HashMap<String, Vec<SpeechInterval>>;

/// Cut silence out of every clip group that has speech data.
///
/// Returns whether the composition was modified. Sources absent from the
/// map are left untouched; when the result is identical to the input the
/// composition stays unmodified and no dirty state is recorded.
pub fn remove_silence(composition: &mut Composition, speech: &SpeechMap, padding: f64) -> bool {
    // Sources in first-appearance order for deterministic processing.
    let mut sources: Vec<String> = Vec::new();
    for (_, el) in composition.all_elements() {
        if let Some(src) = el.source() {
            if speech.contains_key(src) && !sources.iter().any(|s| s == src) {
                sources.push(src.to_string());
            }
        }
    }

    let mut changed = false;
    for source in sources {
        let normalized = normalize(&speech[&source], padding);
        if resegment_group(composition, &source, &normalized) {
            tracing::debug!(source = %source, "re-segmented clip group");
            changed = true;
        }
    }
    if changed {
        composition.mark_dirty();
    }
    changed
}

/// Re-segment one clip group. Returns whether anything changed.
fn resegment_group(
    composition: &mut Composition,
    source: &str,
    speech: &[SpeechInterval],
) -> bool {
    // Per track: element positions of the group, in chronological order.
    let mut group_tracks: Vec<(usize, Vec<usize>)> = Vec::new();
    for (track_idx, track) in composition.tracks.iter().enumerate() {
        let mut positions: Vec<usize> = track
            .elements
            .iter()
            .enumerate()
            .filter(|(_, el)| el.source() == Some(source))
            .map(|(i, _)| i)
            .collect();
        if positions.is_empty() {
            continue;
        }
        positions.sort_by(|&a, &b| {
            track.elements[a]
                .time
                .total_cmp(&track.elements[b].time)
        });
        group_tracks.push((track_idx, positions));
    }
    if group_tracks.is_empty() {
        return false;
    }

    // Earliest original start of the group anchors the re-laid segments.
    let anchor = group_tracks
        .iter()
        .flat_map(|(ti, positions)| {
            positions
                .iter()
                .map(|&p| composition.tracks[*ti].elements[p].time)
        })
        .fold(f64::INFINITY, f64::min);

    // Canonical media sub-ranges, taken from the first (topmost) track of
    // the group; every track is laid out against these.
    let canonical = {
        let (track_idx, positions) = &group_tracks[0];
        segment_ranges(composition, *track_idx, positions, speech)
    };
    let mut segment_times = Vec::with_capacity(canonical.len());
    let mut t = anchor;
    for sub in &canonical {
        segment_times.push(t);
        t += sub.len();
    }

    // Unchanged groups stay untouched, ids included.
    let unchanged = group_tracks.iter().all(|(track_idx, positions)| {
        positions.len() == canonical.len()
            && positions.iter().enumerate().all(|(k, &p)| {
                let el = &composition.tracks[*track_idx].elements[p];
                el.time == segment_times[k]
                    && el.duration == canonical[k].len()
                    && el.trim_start == canonical[k].start
            })
    });
    if unchanged {
        return false;
    }

    for (track_idx, positions) in &group_tracks {
        // This track's own sub-ranges map each canonical segment back to
        // the template element it was cut from.
        let own_templates = segment_templates(composition, *track_idx, positions, speech);

        let mut replacements = Vec::with_capacity(canonical.len());
        let mut used_templates: Vec<usize> = Vec::new();
        for (k, sub) in canonical.iter().enumerate() {
            let template_pos = own_templates
                .get(k)
                .copied()
                .unwrap_or_else(|| own_templates.last().copied().unwrap_or(0))
                .min(positions.len() - 1);
            let mut el =
                composition.tracks[*track_idx].elements[positions[template_pos]].clone();
            if used_templates.contains(&template_pos) {
                el.id = element_id();
            } else {
                used_templates.push(template_pos);
            }
            el.time = segment_times[k];
            el.duration = sub.len();
            el.trim_start = sub.start;
            replacements.push(el);
        }

        // Splice the replacements in at the first group position.
        let track = &mut composition.tracks[*track_idx];
        let first_pos = positions.iter().copied().min().unwrap_or(0);
        let insert_at = (0..first_pos).filter(|i| !positions.contains(i)).count();
        let mut kept: Vec<_> = track
            .elements
            .drain(..)
            .enumerate()
            .filter(|(i, _)| !positions.contains(i))
            .map(|(_, el)| el)
            .collect();
        kept.splice(insert_at..insert_at, replacements);
        track.elements = kept;
    }
    true
}

/// The media sub-ranges the group's elements on one track keep.
fn segment_ranges(
    composition: &Composition,
    track_idx: usize,
    positions: &[usize],
    speech: &[SpeechInterval],
) -> Vec<SpeechInterval> {
    positions
        .iter()
        .flat_map(|&p| {
            let el = &composition.tracks[track_idx].elements[p];
            intersect(el.trim_start, el.trim_start + el.duration, speech)
        })
        .collect()
}

/// For each sub-range on this track, the index (into `positions`) of the
/// element it was cut from.
fn segment_templates(
    composition: &Composition,
    track_idx: usize,
    positions: &[usize],
    speech: &[SpeechInterval],
) -> Vec<usize> {
    positions
        .iter()
        .enumerate()
        .flat_map(|(elem_idx, &p)| {
            let el = &composition.tracks[track_idx].elements[p];
            let count = intersect(el.trim_start, el.trim_start + el.duration, speech).len();
            std::iter::repeat(elem_idx).take(count)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cutreel_composition::{Element, ElementKind, TrackKind};

    fn media_element(kind: ElementKind, time: f64, duration: f64) -> Element {
        let mut el = Element::new("clip", kind, 1080, 1920);
        el.time = time;
        el.duration = duration;
        el
    }

    fn video(source: &str, time: f64, duration: f64) -> Element {
        media_element(
            ElementKind::Video {
                source: Some(source.to_string()),
            },
            time,
            duration,
        )
    }

    fn audio(source: &str, time: f64, duration: f64) -> Element {
        media_element(
            ElementKind::Audio {
                source: Some(source.to_string()),
            },
            time,
            duration,
        )
    }

    fn speech_map(source: &str, intervals: &[(f64, f64)]) -> SpeechMap {
        let mut map = SpeechMap::new();
        map.insert(
            source.to_string(),
            intervals
                .iter()
                .map(|&(s, e)| SpeechInterval::new(s, e))
                .collect(),
        );
        map
    }

    #[test]
    fn untouched_source_stays_put() {
        let mut comp = Composition::new(1080, 1920, 30);
        let track = comp.add_track(TrackKind::Video, None);
        comp.add_element(&track, video("media://other.mp4", 0.0, 20.0));
        comp.take_dirty();
        let before = comp.clone();

        let speech = speech_map("media://a.mp4", &[(2.0, 5.0)]);
        assert!(!remove_silence(&mut comp, &speech, 0.0));
        assert_eq!(comp, before);
        assert!(!comp.is_dirty());
    }

    #[test]
    fn full_speech_coverage_is_a_noop() {
        let mut comp = Composition::new(1080, 1920, 30);
        let track = comp.add_track(TrackKind::Video, None);
        comp.add_element(&track, video("media://a.mp4", 0.0, 20.0));
        comp.take_dirty();
        let before = comp.clone();

        let speech = speech_map("media://a.mp4", &[(0.0, 20.0)]);
        assert!(!remove_silence(&mut comp, &speech, 0.0));
        assert_eq!(comp, before);
        assert!(!comp.is_dirty());
    }

    #[test]
    fn no_speech_at_all_removes_elements() {
        let mut comp = Composition::new(1080, 1920, 30);
        let track = comp.add_track(TrackKind::Video, None);
        comp.add_element(&track, video("media://a.mp4", 0.0, 20.0));
        comp.take_dirty();

        let speech = speech_map("media://a.mp4", &[]);
        assert!(remove_silence(&mut comp, &speech, 0.0));
        assert!(comp.tracks[0].elements.is_empty());
        assert!(comp.is_dirty());
    }

    #[test]
    fn anchor_is_the_group_start() {
        let mut comp = Composition::new(1080, 1920, 30);
        let track = comp.add_track(TrackKind::Video, None);
        comp.add_element(&track, video("media://a.mp4", 3.0, 20.0));
        comp.take_dirty();

        let speech = speech_map("media://a.mp4", &[(5.0, 8.0)]);
        assert!(remove_silence(&mut comp, &speech, 0.0));
        let el = &comp.tracks[0].elements[0];
        assert_eq!(el.time, 3.0);
        assert_eq!(el.duration, 3.0);
        assert_eq!(el.trim_start, 5.0);
    }

    #[test]
    fn trimmed_element_intersects_its_visible_range() {
        let mut comp = Composition::new(1080, 1920, 30);
        let track = comp.add_track(TrackKind::Video, None);
        let mut el = video("media://a.mp4", 0.0, 10.0);
        el.trim_start = 4.0;
        comp.add_element(&track, el);
        comp.take_dirty();

        // Visible media range is [4, 14]; the first interval is invisible.
        let speech = speech_map("media://a.mp4", &[(0.0, 2.0), (6.0, 9.0)]);
        assert!(remove_silence(&mut comp, &speech, 0.0));
        assert_eq!(comp.tracks[0].elements.len(), 1);
        let el = &comp.tracks[0].elements[0];
        assert_eq!(el.time, 0.0);
        assert_eq!(el.duration, 3.0);
        assert_eq!(el.trim_start, 6.0);
    }

    #[test]
    fn original_id_survives_first_segment() {
        let mut comp = Composition::new(1080, 1920, 30);
        let track = comp.add_track(TrackKind::Video, None);
        let id = comp
            .add_element(&track, video("media://a.mp4", 0.0, 20.0))
            .unwrap();
        let speech = speech_map("media://a.mp4", &[(2.0, 5.0), (10.0, 13.0)]);
        assert!(remove_silence(&mut comp, &speech, 0.0));
        assert_eq!(comp.tracks[0].elements[0].id, id);
        assert_ne!(comp.tracks[0].elements[1].id, id);
    }

    #[test]
    fn group_spans_audio_and_video_tracks() {
        let mut comp = Composition::new(1080, 1920, 30);
        let video_track = comp.add_track(TrackKind::Video, None);
        let audio_track = comp.add_track(TrackKind::Audio, None);
        comp.add_element(&video_track, video("media://a.mp4", 0.0, 20.0));
        comp.add_element(&audio_track, audio("media://a.mp4", 0.0, 20.0));

        let speech = speech_map("media://a.mp4", &[(2.0, 5.0), (10.0, 13.0)]);
        assert!(remove_silence(&mut comp, &speech, 0.0));

        let video_track = comp.find_track(&video_track).unwrap();
        let audio_track = comp.find_track(&audio_track).unwrap();
        assert_eq!(video_track.elements.len(), 2);
        assert_eq!(audio_track.elements.len(), 2);
        for k in 0..2 {
            let v = &video_track.elements[k];
            let a = &audio_track.elements[k];
            assert_eq!(v.time, a.time);
            assert_eq!(v.duration, a.duration);
            assert_eq!(v.trim_start, a.trim_start);
        }
    }

    #[test]
    fn padding_widens_kept_ranges() {
        let mut comp = Composition::new(1080, 1920, 30);
        let track = comp.add_track(TrackKind::Video, None);
        comp.add_element(&track, video("media://a.mp4", 0.0, 20.0));

        let speech = speech_map("media://a.mp4", &[(5.0, 8.0)]);
        assert!(remove_silence(&mut comp, &speech, 0.5));
        let el = &comp.tracks[0].elements[0];
        assert_eq!(el.trim_start, 4.5);
        assert_eq!(el.duration, 4.0);
    }

    #[test]
    fn other_elements_keep_their_track_position() {
        let mut comp = Composition::new(1080, 1920, 30);
        let track = comp.add_track(TrackKind::Overlay, None);
        let mut logo = Element::new(
            "logo",
            ElementKind::Image {
                source: Some("media://logo.png".to_string()),
            },
            1080,
            1920,
        );
        logo.duration = 30.0;
        comp.add_element(&track, logo);
        let video_track = comp.add_track(TrackKind::Video, None);
        comp.add_element(&video_track, video("media://a.mp4", 0.0, 20.0));

        let speech = speech_map("media://a.mp4", &[(2.0, 5.0)]);
        assert!(remove_silence(&mut comp, &speech, 0.0));
        let overlay = comp.find_track(&track).unwrap();
        assert_eq!(overlay.elements.len(), 1);
        assert_eq!(overlay.elements[0].name, "logo");
    }
}
