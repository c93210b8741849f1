//! Silence intervals and the segment filter that consumes them.

use serde::{Deserialize, Serialize};

use super::TranscriptSegment;

/// One detected stretch of silence on the original media timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SilenceInterval {
    pub start: f64,
    pub end: f64,
    pub duration: f64,
}

impl SilenceInterval {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            duration: end - start,
        }
    }
}

/// Drop segments whose full extent lies inside a silence interval.
///
/// A segment that only partially overlaps silence likely still carries real
/// speech at its edges, so partial overlap is preserved. Applied once after
/// remapping, before persistence; not re-applied on edits.
pub fn filter_silent_segments(
    segments: &[TranscriptSegment],
    intervals: &[SilenceInterval],
) -> Vec<TranscriptSegment> {
    segments
        .iter()
        .filter(|seg| {
            let start = seg.start_secs();
            let end = seg.end_secs();
            !intervals
                .iter()
                .any(|iv| start >= iv.start && end <= iv.end)
        })
        .cloned()
        .collect()
}
