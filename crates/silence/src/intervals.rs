//! Speech interval normalization and range intersection.

use serde::{Deserialize, Serialize};

/// One detected speech region, in absolute media-source seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeechInterval {
    pub start: f64,
    pub end: f64,
}

impl SpeechInterval {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Pad every interval symmetrically, then sort and merge overlaps.
///
/// Input from the external detector may be unsorted or overlapping; it is
/// normalized rather than rejected. Empty and inverted intervals are
/// dropped, padded starts clamp to 0.
pub fn normalize(intervals: &[SpeechInterval], padding: f64) -> Vec<SpeechInterval> {
    let mut padded: Vec<SpeechInterval> = intervals
        .iter()
        .filter(|iv| !iv.is_empty())
        .map(|iv| SpeechInterval::new((iv.start - padding).max(0.0), iv.end + padding))
        .collect();
    padded.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged: Vec<SpeechInterval> = Vec::with_capacity(padded.len());
    for iv in padded {
        match merged.last_mut() {
            Some(last) if iv.start <= last.end => {
                last.end = last.end.max(iv.end);
            }
            _ => merged.push(iv),
        }
    }
    merged
}

/// Intersect a visible media range against normalized speech intervals,
/// producing the sub-ranges that survive silence removal in order.
pub fn intersect(range_start: f64, range_end: f64, speech: &[SpeechInterval]) -> Vec<SpeechInterval> {
    speech
        .iter()
        .filter_map(|iv| {
            let start = iv.start.max(range_start);
            let end = iv.end.min(range_end);
            (end > start).then(|| SpeechInterval::new(start, end))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn padding_expands_and_merges() {
        let speech = [
            SpeechInterval::new(2.0, 5.0),
            SpeechInterval::new(5.5, 8.0),
        ];
        let normalized = normalize(&speech, 0.3);
        assert_eq!(normalized, vec![SpeechInterval::new(1.7, 8.3)]);
    }

    #[test]
    fn unsorted_overlapping_input_is_normalized() {
        let speech = [
            SpeechInterval::new(6.0, 9.0),
            SpeechInterval::new(1.0, 4.0),
            SpeechInterval::new(3.0, 7.0),
        ];
        let normalized = normalize(&speech, 0.0);
        assert_eq!(normalized, vec![SpeechInterval::new(1.0, 9.0)]);
    }

    #[test]
    fn inverted_intervals_are_dropped() {
        let speech = [
            SpeechInterval::new(5.0, 2.0),
            SpeechInterval::new(1.0, 3.0),
        ];
        let normalized = normalize(&speech, 0.0);
        assert_eq!(normalized, vec![SpeechInterval::new(1.0, 3.0)]);
    }

    #[test]
    fn padding_clamps_start_to_zero() {
        let speech = [SpeechInterval::new(0.1, 2.0)];
        let normalized = normalize(&speech, 0.5);
        assert_eq!(normalized, vec![SpeechInterval::new(0.0, 2.5)]);
    }

    #[test]
    fn intersect_clips_to_range() {
        let speech = [
            SpeechInterval::new(2.0, 5.0),
            SpeechInterval::new(10.0, 13.0),
            SpeechInterval::new(17.0, 20.0),
        ];
        let subs = intersect(4.0, 18.0, &speech);
        assert_eq!(
            subs,
            vec![
                SpeechInterval::new(4.0, 5.0),
                SpeechInterval::new(10.0, 13.0),
                SpeechInterval::new(17.0, 18.0),
            ]
        );
    }

    #[test]
    fn intersect_outside_range_is_empty() {
        let speech = [SpeechInterval::new(2.0, 5.0)];
        assert!(intersect(6.0, 10.0, &speech).is_empty());
    }

    proptest! {
        #[test]
        fn normalized_intervals_are_sorted_and_disjoint(
            raw in prop::collection::vec((0.0f64..100.0, 0.0f64..100.0), 0..20),
            padding in 0.0f64..2.0,
        ) {
            let intervals: Vec<SpeechInterval> = raw
                .iter()
                .map(|&(a, b)| SpeechInterval::new(a, b))
                .collect();
            let normalized = normalize(&intervals, padding);
            for window in normalized.windows(2) {
                prop_assert!(window[0].end < window[1].start);
            }
            for iv in &normalized {
                prop_assert!(iv.start >= 0.0);
                prop_assert!(iv.end > iv.start);
            }
        }

        #[test]
        fn normalize_is_idempotent(
            raw in prop::collection::vec((0.0f64..100.0, 0.0f64..100.0), 0..20),
        ) {
            let intervals: Vec<SpeechInterval> = raw
                .iter()
                .map(|&(a, b)| SpeechInterval::new(a, b))
                .collect();
            let once = normalize(&intervals, 0.0);
            let twice = normalize(&once, 0.0);
            prop_assert_eq!(once, twice);
        }
    }
}
