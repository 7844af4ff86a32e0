//! Timeline math: time/pixel conversion, snapping, and the adaptive grid.

use crate::composition::Composition;

/// Default snap capture distance in screen pixels.
pub const SNAP_THRESHOLD_PX: f64 = 8.0;

/// View scale of the timeline, mapping seconds to screen pixels.
#[derive(Debug, Clone)]
pub struct TimelineScale {
    /// Pixels per second.
    pub zoom: f64,

    /// Whether snapping is enabled.
    pub snap_enabled: bool,

    /// Snap capture distance in screen pixels.
    pub snap_threshold_px: f64,
}

/// One ruler tick mark.
#[derive(Debug, Clone, PartialEq)]
pub struct TickMark {
    pub time: f64,
    pub x: f64,
    pub label: String,
    pub is_major: bool,
}

impl TimelineScale {
    pub fn new(zoom: f64) -> Self {
        Self {
            zoom,
            snap_enabled: true,
            snap_threshold_px: SNAP_THRESHOLD_PX,
        }
    }

    /// Clamp zoom to the usable range of 10..=200 px/s.
    pub fn set_zoom(&mut self, px_per_sec: f64) {
        self.zoom = px_per_sec.clamp(10.0, 200.0);
    }

    pub fn time_to_pixel(&self, time: f64) -> f64 {
        time * self.zoom
    }

    pub fn pixel_to_time(&self, px: f64) -> f64 {
        px / self.zoom
    }

    /// Grid step in seconds for the current zoom; finer at higher zoom.
    pub fn grid_size(&self) -> f64 {
        if self.zoom >= 100.0 {
            0.1
        } else if self.zoom >= 50.0 {
            0.5
        } else if self.zoom >= 25.0 {
            1.0
        } else if self.zoom >= 10.0 {
            5.0
        } else {
            10.0
        }
    }

    /// Snap a time to element edges or the playhead, falling back to the
    /// adaptive grid.
    ///
    /// Edge candidates are the playhead plus every element's start and end,
    /// excluding the element being dragged. The closest candidate within
    /// the pixel threshold (converted to seconds at current zoom) wins;
    /// otherwise the time rounds to the nearest grid multiple.
    pub fn snap(
        &self,
        time: f64,
        exclude_element: Option<&str>,
        playhead: f64,
        composition: &Composition,
    ) -> f64 {
        if !self.snap_enabled {
            return time;
        }

        let threshold = self.snap_threshold_px / self.zoom;
        let mut closest: Option<f64> = None;
        let mut closest_dist = threshold;

        let mut consider = |point: f64| {
            let dist = (time - point).abs();
            if dist < closest_dist {
                closest_dist = dist;
                closest = Some(point);
            }
        };

        consider(playhead);
        for track in &composition.tracks {
            for el in &track.elements {
                if exclude_element == Some(el.id.as_str()) {
                    continue;
                }
                consider(el.time);
                consider(el.end());
            }
        }

        if let Some(point) = closest {
            return point;
        }

        let grid = self.grid_size();
        (time / grid).round() * grid
    }

    /// Generate ruler tick marks covering a view of the given pixel width.
    /// Every fifth grid line is major.
    pub fn tick_marks(&self, view_width_px: f64) -> Vec<TickMark> {
        let grid = self.grid_size();
        let total_time = view_width_px / self.zoom;
        let count = (total_time / grid).floor() as usize;
        (0..=count)
            .map(|i| {
                let time = i as f64 * grid;
                TickMark {
                    time,
                    x: self.time_to_pixel(time),
                    label: format_time(time),
                    is_major: i % 5 == 0,
                }
            })
            .collect()
    }
}

impl Default for TimelineScale {
    fn default() -> Self {
        Self::new(50.0)
    }
}

/// Compact ruler label, e.g. `"3.5s"` or `"1:02.0"`.
pub fn format_time(seconds: f64) -> String {
    let mins = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    let frac = ((seconds % 1.0) * 10.0).round() as u64;
    if mins > 0 {
        format!("{}:{:02}.{}", mins, secs, frac)
    } else {
        format!("{}.{}s", secs, frac)
    }
}

/// Full `HH:MM:SS:FF` timecode at the given frame rate.
pub fn format_timecode(seconds: f64, fps: u32) -> String {
    let hrs = (seconds / 3600.0).floor() as u64;
    let mins = ((seconds % 3600.0) / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    let frames = ((seconds % 1.0) * fps.max(1) as f64).floor() as u64;
    format!("{:02}:{:02}:{:02}:{:02}", hrs, mins, secs, frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::TrackKind;
    use crate::element::{Element, ElementKind};
    use proptest::prelude::*;

    fn comp_with_clip(time: f64, duration: f64) -> Composition {
        let mut comp = Composition::new(1080, 1920, 30);
        let track = comp.add_track(TrackKind::Video, None);
        let mut el = Element::new(
            "clip",
            ElementKind::Video {
                source: Some("media://a.mp4".to_string()),
            },
            1080,
            1920,
        );
        el.time = time;
        el.duration = duration;
        comp.add_element(&track, el);
        comp
    }

    #[test]
    fn pixel_conversion_is_inverse() {
        let scale = TimelineScale::new(50.0);
        assert_eq!(scale.time_to_pixel(2.0), 100.0);
        assert_eq!(scale.pixel_to_time(100.0), 2.0);
    }

    #[test]
    fn grid_follows_zoom_table() {
        let mut scale = TimelineScale::new(120.0);
        assert_eq!(scale.grid_size(), 0.1);
        scale.zoom = 50.0;
        assert_eq!(scale.grid_size(), 0.5);
        scale.zoom = 25.0;
        assert_eq!(scale.grid_size(), 1.0);
        scale.zoom = 10.0;
        assert_eq!(scale.grid_size(), 5.0);
        scale.zoom = 5.0;
        assert_eq!(scale.grid_size(), 10.0);
    }

    #[test]
    fn snap_falls_back_to_grid() {
        // zoom 50 means grid 0.5s and no edges near 1.23.
        let comp = comp_with_clip(20.0, 5.0);
        let scale = TimelineScale::new(50.0);
        assert_eq!(scale.snap(1.23, None, 30.0, &comp), 1.0);
    }

    #[test]
    fn snap_prefers_element_edges() {
        let comp = comp_with_clip(5.0, 5.0);
        let scale = TimelineScale::new(50.0);
        // 8px / 50 px/s = 0.16s capture range around the edge at 10.0.
        assert_eq!(scale.snap(10.1, None, 30.0, &comp), 10.0);
    }

    #[test]
    fn snap_excludes_dragged_element() {
        let comp = comp_with_clip(5.0, 5.0);
        let id = comp.tracks[0].elements[0].id.clone();
        let scale = TimelineScale::new(50.0);
        // With the element excluded, 5.1 rounds to the grid instead.
        assert_eq!(scale.snap(5.1, Some(&id), 30.0, &comp), 5.0);
        assert_eq!(scale.snap(5.2, Some(&id), 30.0, &comp), 5.0);
        assert_eq!(scale.snap(5.3, Some(&id), 30.0, &comp), 5.5);
    }

    #[test]
    fn snap_captures_playhead() {
        let comp = Composition::new(1080, 1920, 30);
        let scale = TimelineScale::new(50.0);
        assert_eq!(scale.snap(7.35, None, 7.4, &comp), 7.4);
    }

    #[test]
    fn snap_disabled_passes_through() {
        let comp = comp_with_clip(5.0, 5.0);
        let mut scale = TimelineScale::new(50.0);
        scale.snap_enabled = false;
        assert_eq!(scale.snap(5.01, None, 0.0, &comp), 5.01);
    }

    #[test]
    fn zoom_clamps_to_range() {
        let mut scale = TimelineScale::new(50.0);
        scale.set_zoom(500.0);
        assert_eq!(scale.zoom, 200.0);
        scale.set_zoom(1.0);
        assert_eq!(scale.zoom, 10.0);
    }

    #[test]
    fn tick_marks_cover_view() {
        let scale = TimelineScale::new(50.0);
        let ticks = scale.tick_marks(500.0);
        // 10 seconds of view at 0.5s grid.
        assert_eq!(ticks.len(), 21);
        assert_eq!(ticks[0].time, 0.0);
        assert!(ticks[0].is_major);
        assert!(!ticks[1].is_major);
        assert!(ticks[5].is_major);
        assert_eq!(ticks.last().unwrap().time, 10.0);
    }

    #[test]
    fn time_labels() {
        assert_eq!(format_time(3.5), "3.5s");
        assert_eq!(format_time(62.0), "1:02.0");
        assert_eq!(format_timecode(3661.5, 30), "01:01:01:15");
    }

    proptest! {
        #[test]
        fn pixel_conversion_round_trips(
            zoom in 10.0f64..200.0,
            time in 0.0f64..3600.0,
        ) {
            let scale = TimelineScale::new(zoom);
            let back = scale.pixel_to_time(scale.time_to_pixel(time));
            prop_assert!((back - time).abs() < 1e-9);
        }

        #[test]
        fn snap_lands_on_a_candidate_or_the_grid(
            zoom in 10.0f64..200.0,
            time in 0.0f64..60.0,
            playhead in 0.0f64..60.0,
        ) {
            let comp = comp_with_clip(5.0, 5.0);
            let scale = TimelineScale::new(zoom);
            let snapped = scale.snap(time, None, playhead, &comp);
            let grid = scale.grid_size();
            let on_grid = ((snapped / grid).round() * grid - snapped).abs() < 1e-9;
            let on_candidate = [playhead, 5.0, 10.0]
                .iter()
                .any(|c| (snapped - c).abs() < 1e-9);
            prop_assert!(on_grid || on_candidate);
        }
    }
}
