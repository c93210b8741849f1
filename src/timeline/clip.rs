//! Clip shapes and the assembler that turns a clip into an export plan.

use serde::{Deserialize, Serialize};

use crate::subtitle::SubtitleCue;
use crate::timecode;

use super::TranscriptSegment;

/// One source time range of a clip, in original-timeline time codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipRange {
    pub start: String,
    pub end: String,
}

/// An ordered group of source time ranges assembled into one short export.
///
/// The ranges may be disjoint and non-chronological; their order in
/// `segments` is the intended playback order. Legacy payloads carrying a
/// single top-level `start`/`end` pair normalize into a one-element
/// `segments` array at deserialization, so nothing downstream ever branches
/// on the clip shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ClipPayload")]
pub struct Clip {
    pub segments: Vec<ClipRange>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ClipPayload {
    Spliced {
        segments: Vec<ClipRange>,
        #[serde(default)]
        title: String,
        #[serde(default)]
        reason: String,
    },
    Legacy {
        start: String,
        end: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        reason: String,
    },
}

impl From<ClipPayload> for Clip {
    fn from(payload: ClipPayload) -> Self {
        match payload {
            ClipPayload::Spliced {
                segments,
                title,
                reason,
            } => Clip {
                segments,
                title,
                reason,
            },
            ClipPayload::Legacy {
                start,
                end,
                title,
                reason,
            } => Clip {
                segments: vec![ClipRange { start, end }],
                title,
                reason,
            },
        }
    }
}

/// One padded, bounds-clamped cut range in original-timeline seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRange {
    pub start: f64,
    pub end: f64,
}

/// Everything the external cutters need for one clip: the ranges to cut and
/// a subtitle track in clip-local time.
#[derive(Debug, Clone)]
pub struct ExportPlan {
    pub title: String,
    pub reason: String,
    pub ranges: Vec<ExportRange>,
    pub cues: Vec<SubtitleCue>,
}

/// Assemble a clip into a padded, timeline-correct export plan.
///
/// Each range is widened by `pre_pad`/`post_pad` and clamped to
/// `[0, media_duration]`. Cues are generated per transcript segment that
/// intersects a clamped range; their clip-local times are measured from the
/// unclamped padded start, so padding lost to the origin clamp still shifts
/// the cue, and the running offset advances by each range's clamped duration
/// rather than by the intersection extent.
pub fn assemble(
    clip: &Clip,
    transcript: &[TranscriptSegment],
    pre_pad: f64,
    post_pad: f64,
    media_duration: f64,
) -> ExportPlan {
    let mut ranges = Vec::with_capacity(clip.segments.len());
    let mut cues = Vec::new();
    let mut offset = 0.0;

    for range in &clip.segments {
        let start = timecode::parse(&range.start);
        let end = timecode::parse(&range.end);

        let padded_start = start - pre_pad;
        let clamped_start = padded_start.max(0.0);
        let clamped_end = (end + post_pad).min(media_duration);
        if clamped_end < clamped_start {
            continue;
        }

        for seg in transcript {
            let seg_start = seg.start_secs();
            let seg_end = seg.end_secs();
            let isect_start = seg_start.max(clamped_start);
            let isect_end = seg_end.min(clamped_end);
            if isect_start < isect_end {
                cues.push(SubtitleCue {
                    start: offset + (isect_start - padded_start),
                    end: offset + (isect_end - padded_start),
                    speaker: seg.speaker.clone(),
                    text: seg.text.clone(),
                });
            }
        }

        offset += clamped_end - clamped_start;
        ranges.push(ExportRange {
            start: clamped_start,
            end: clamped_end,
        });
    }

    ExportPlan {
        title: clip.title.clone(),
        reason: clip.reason.clone(),
        ranges,
        cues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: &str, end: &str, text: &str) -> TranscriptSegment {
        TranscriptSegment::new(start, end, text, "Speaker 1")
    }

    fn one_range_clip(start: &str, end: &str) -> Clip {
        Clip {
            segments: vec![ClipRange {
                start: start.to_string(),
                end: end.to_string(),
            }],
            title: "Test".to_string(),
            reason: String::new(),
        }
    }

    #[test]
    fn test_deserialize_spliced_form() {
        let clip: Clip = serde_json::from_str(
            r#"{"segments":[{"start":"00:10","end":"00:20"}],"title":"Intro","reason":"hook"}"#,
        )
        .unwrap();
        assert_eq!(clip.segments.len(), 1);
        assert_eq!(clip.title, "Intro");
    }

    #[test]
    fn test_deserialize_legacy_form() {
        let clip: Clip =
            serde_json::from_str(r#"{"start":"00:10","end":"00:20","title":"Intro"}"#).unwrap();
        assert_eq!(
            clip.segments,
            vec![ClipRange {
                start: "00:10".to_string(),
                end: "00:20".to_string(),
            }]
        );
        assert_eq!(clip.title, "Intro");
        assert_eq!(clip.reason, "");
    }

    #[test]
    fn test_assemble_without_padding() {
        let transcript = vec![seg("00:02", "00:08", "hello")];
        let plan = assemble(&one_range_clip("00:00", "00:10"), &transcript, 0.0, 0.0, 60.0);

        assert_eq!(plan.ranges, vec![ExportRange { start: 0.0, end: 10.0 }]);
        assert_eq!(plan.cues.len(), 1);
        assert_eq!(plan.cues[0].start, 2.0);
        assert_eq!(plan.cues[0].end, 8.0);
    }

    #[test]
    fn test_assemble_pre_padding_shifts_cue_origin() {
        // Padding clamped away at the origin still shifts cue-local time.
        let transcript = vec![seg("00:02", "00:08", "hello")];
        let plan = assemble(&one_range_clip("00:00", "00:10"), &transcript, 1.0, 0.0, 60.0);

        assert_eq!(plan.ranges, vec![ExportRange { start: 0.0, end: 10.0 }]);
        assert_eq!(plan.cues[0].start, 3.0);
        assert_eq!(plan.cues[0].end, 9.0);
    }

    #[test]
    fn test_assemble_clamps_to_media_duration() {
        let transcript = vec![seg("00:55", "01:05", "tail")];
        let plan = assemble(&one_range_clip("00:55", "01:05"), &transcript, 0.0, 5.0, 60.0);

        assert_eq!(plan.ranges, vec![ExportRange { start: 55.0, end: 60.0 }]);
        assert_eq!(plan.cues[0].start, 0.0);
        assert_eq!(plan.cues[0].end, 5.0);
    }

    #[test]
    fn test_assemble_spliced_offsets_accumulate() {
        let transcript = vec![seg("00:02", "00:08", "first"), seg("00:32", "00:38", "second")];
        let clip = Clip {
            segments: vec![
                ClipRange {
                    start: "00:00".to_string(),
                    end: "00:10".to_string(),
                },
                ClipRange {
                    start: "00:30".to_string(),
                    end: "00:40".to_string(),
                },
            ],
            title: String::new(),
            reason: String::new(),
        };
        let plan = assemble(&clip, &transcript, 0.0, 0.0, 120.0);

        assert_eq!(plan.cues.len(), 2);
        assert_eq!(plan.cues[0].start, 2.0);
        // Second range starts at clip-local 10.0.
        assert_eq!(plan.cues[1].start, 12.0);
        assert_eq!(plan.cues[1].end, 18.0);
    }

    #[test]
    fn test_assemble_partial_overlap_does_not_skew_later_ranges() {
        // First range only half-covers its segment; the offset must still
        // advance by the full range duration.
        let transcript = vec![seg("00:05", "00:15", "spill"), seg("00:22", "00:24", "clean")];
        let clip = Clip {
            segments: vec![
                ClipRange {
                    start: "00:00".to_string(),
                    end: "00:10".to_string(),
                },
                ClipRange {
                    start: "00:20".to_string(),
                    end: "00:30".to_string(),
                },
            ],
            title: String::new(),
            reason: String::new(),
        };
        let plan = assemble(&clip, &transcript, 0.0, 0.0, 120.0);

        assert_eq!(plan.cues[0].start, 5.0);
        assert_eq!(plan.cues[0].end, 10.0);
        assert_eq!(plan.cues[1].start, 12.0);
        assert_eq!(plan.cues[1].end, 14.0);
    }
}
