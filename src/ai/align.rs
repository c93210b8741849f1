//! Seam for forced-alignment backends.
//!
//! Model timestamps are approximate; an aligner refines them against the
//! actual audio. [`SilenceSnapAligner`] ships as the built-in backend; a
//! heavier acoustic-model aligner plugs in through the same trait. The
//! pipeline degrades cleanly when a backend fails or none is configured.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::Result;
use crate::media::silence::detect_silence;
use crate::timecode;
use crate::timeline::silence::SilenceInterval;
use crate::timeline::TranscriptSegment;

/// Refines segment timestamps against the audio they were transcribed from.
///
/// Implementations must return the same number of segments in the same
/// order, with only `start` and `end` changed.
#[async_trait]
pub trait Aligner: Send + Sync {
    async fn align(
        &self,
        audio_path: &Path,
        segments: &[TranscriptSegment],
    ) -> Result<Vec<TranscriptSegment>>;
}

/// Refines boundaries by snapping them out of detected silence.
///
/// A segment whose start falls inside a silent stretch almost certainly
/// begins where the silence ends, and likewise for ends; model timestamps
/// drift into pauses routinely. This does not inspect the waveform itself,
/// only ffmpeg's `silencedetect` output.
pub struct SilenceSnapAligner {
    min_silence: f64,
}

impl SilenceSnapAligner {
    pub fn new() -> Self {
        Self { min_silence: 0.3 }
    }

    /// Minimum silence length worth snapping to, in seconds.
    pub fn with_min_silence(mut self, min_silence: f64) -> Self {
        self.min_silence = min_silence;
        self
    }
}

impl Default for SilenceSnapAligner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Aligner for SilenceSnapAligner {
    async fn align(
        &self,
        audio_path: &Path,
        segments: &[TranscriptSegment],
    ) -> Result<Vec<TranscriptSegment>> {
        let intervals = detect_silence(audio_path, self.min_silence)?;
        debug!(
            "Snapping {} segment boundaries against {} silence interval(s)",
            segments.len(),
            intervals.len()
        );
        Ok(snap_to_speech(segments, &intervals))
    }
}

/// Move boundaries that land strictly inside a silence interval to its
/// nearest speech edge: starts forward to the interval's end, ends back to
/// its start. Never inverts a segment and never changes the count or order.
fn snap_to_speech(
    segments: &[TranscriptSegment],
    intervals: &[SilenceInterval],
) -> Vec<TranscriptSegment> {
    segments
        .iter()
        .map(|seg| {
            let start = seg.start_secs();
            let end = seg.end_secs();
            let mut seg = seg.clone();

            if let Some(iv) = intervals
                .iter()
                .find(|iv| start > iv.start && start < iv.end)
            {
                let snapped = iv.end.min(end);
                if snapped != start {
                    seg.start = timecode::format(snapped);
                }
            }
            if let Some(iv) = intervals.iter().find(|iv| end > iv.start && end < iv.end) {
                let snapped = iv.start.max(seg.start_secs());
                if snapped != end {
                    seg.end = timecode::format(snapped);
                }
            }
            seg
        })
        .collect()
}

/// Run the aligner if one is present, keeping the unaligned segments when
/// it is absent or fails. Alignment is an enhancement, never a gate.
pub async fn align_or_keep(
    aligner: Option<&dyn Aligner>,
    audio_path: &Path,
    segments: Vec<TranscriptSegment>,
) -> Vec<TranscriptSegment> {
    let Some(aligner) = aligner else {
        return segments;
    };

    match aligner.align(audio_path, &segments).await {
        Ok(aligned) if aligned.len() == segments.len() => aligned,
        Ok(aligned) => {
            warn!(
                "Aligner returned {} segments for {} inputs, keeping originals",
                aligned.len(),
                segments.len()
            );
            segments
        }
        Err(e) => {
            warn!("Alignment failed, keeping model timestamps: {}", e);
            segments
        }
    }
}
