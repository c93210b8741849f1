//! Remapping compacted-timeline timestamps onto the original media timeline.
//!
//! Silence removal splices intervals out of the audio, so every timestamp
//! the model produces is measured against a shorter, compacted timeline.
//! The silence-removal step records one breakpoint per excised interval;
//! the cumulative offset of the rightmost breakpoint at or before a
//! timestamp is the amount to add back.

use serde::{Deserialize, Serialize};

/// A timeline coordinate past which a fixed cumulative shift applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentOffset {
    pub min_time: f64,
    pub offset: f64,
}

/// Piecewise-constant map from compacted time back to original time.
///
/// Both ends of every segment from one analysis run must go through the same
/// map; mixing maps from different runs produces silently wrong timestamps.
#[derive(Debug, Clone, Default)]
pub struct OffsetMap {
    breakpoints: Vec<SegmentOffset>,
}

impl OffsetMap {
    /// Build from a breakpoint list already sorted ascending by `min_time`.
    pub fn new(breakpoints: Vec<SegmentOffset>) -> Self {
        Self { breakpoints }
    }

    /// Map a compacted-timeline timestamp to the original timeline.
    ///
    /// Applies the offset of the rightmost breakpoint whose `min_time <= t`,
    /// or zero when no breakpoint qualifies.
    pub fn remap(&self, t: f64) -> f64 {
        let idx = self.breakpoints.partition_point(|b| b.min_time <= t);
        if idx == 0 {
            t
        } else {
            t + self.breakpoints[idx - 1].offset
        }
    }

    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bp(min_time: f64, offset: f64) -> SegmentOffset {
        SegmentOffset { min_time, offset }
    }

    #[test]
    fn test_remap_empty_map_is_identity() {
        let map = OffsetMap::default();
        assert_eq!(map.remap(12.5), 12.5);
    }

    #[test]
    fn test_remap_before_first_breakpoint() {
        let map = OffsetMap::new(vec![bp(10.0, 4.0)]);
        assert_eq!(map.remap(5.0), 5.0);
    }

    #[test]
    fn test_remap_picks_rightmost_breakpoint() {
        let map = OffsetMap::new(vec![bp(0.0, 0.0), bp(30.0, 5.0), bp(60.0, 12.0)]);
        assert_eq!(map.remap(20.0), 20.0);
        assert_eq!(map.remap(30.0), 35.0);
        assert_eq!(map.remap(40.0), 45.0);
        assert_eq!(map.remap(90.0), 102.0);
    }

    #[test]
    fn test_remap_is_monotonic() {
        let map = OffsetMap::new(vec![bp(0.0, 0.0), bp(15.0, 3.0), bp(45.0, 9.5)]);
        let mut prev = f64::NEG_INFINITY;
        for i in 0..100 {
            let t = i as f64;
            let mapped = map.remap(t);
            assert!(mapped >= prev, "remap not monotonic at t={}", t);
            prev = mapped;
        }
    }
}
