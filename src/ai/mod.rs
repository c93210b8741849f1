pub mod align;
pub mod gemini;

use regex::Regex;

use crate::error::{MediacutError, Result};
use crate::timecode;
use crate::timeline::clip::Clip;
use crate::timeline::offset::OffsetMap;
use crate::timeline::TranscriptSegment;

/// Locate the first `[...]` region in free-form model output.
///
/// Models wrap their JSON in prose, code fences, or apologies; a greedy
/// match from the first `[` to the last `]` recovers the array. Failure is
/// a [`MediacutError::ResponseFormat`] that callers surface to the user,
/// never swallow.
pub fn extract_json_array(text: &str) -> Result<&str> {
    let re = Regex::new(r"(?s)\[.*\]").expect("Invalid regex");
    re.find(text).map(|m| m.as_str()).ok_or_else(|| {
        // Truncate the preview on a char boundary; responses are often
        // non-ASCII prose.
        let preview: String = text.chars().take(200).collect();
        MediacutError::ResponseFormat(format!("no JSON array in response: {}", preview))
    })
}

/// Extract and parse a transcript segment array from raw model output.
pub fn parse_segments(text: &str) -> Result<Vec<TranscriptSegment>> {
    let json = extract_json_array(text)?;
    serde_json::from_str(json)
        .map_err(|e| MediacutError::ResponseFormat(format!("invalid segment array: {e}")))
}

/// Extract and parse a clip suggestion array from raw model output.
///
/// Legacy single `start`/`end` clip objects normalize to the spliced form
/// during deserialization.
pub fn parse_clips(text: &str) -> Result<Vec<Clip>> {
    let json = extract_json_array(text)?;
    serde_json::from_str(json)
        .map_err(|e| MediacutError::ResponseFormat(format!("invalid clip array: {e}")))
}

/// Re-time a parsed batch from the compacted timeline onto the original one.
///
/// Both ends of every segment go through the same map; remapping a batch
/// with a map from a different analysis run is a correctness bug, which is
/// why this takes the whole batch rather than exposing per-timestamp calls
/// at the ingestion layer.
pub fn remap_segments(segments: &[TranscriptSegment], map: &OffsetMap) -> Vec<TranscriptSegment> {
    segments
        .iter()
        .map(|seg| {
            let mut seg = seg.clone();
            seg.start = timecode::format(map.remap(timecode::parse(&seg.start)));
            seg.end = timecode::format(map.remap(timecode::parse(&seg.end)));
            seg
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::offset::SegmentOffset;

    #[test]
    fn test_extract_json_array_from_prose() {
        let text = "Sure! Here is the transcript:\n```json\n[{\"a\":1}]\n```\nHope that helps.";
        assert_eq!(extract_json_array(text).unwrap(), "[{\"a\":1}]");
    }

    #[test]
    fn test_extract_json_array_greedy() {
        let text = "[1, 2] and also [3, 4]";
        assert_eq!(extract_json_array(text).unwrap(), "[1, 2] and also [3, 4]");
    }

    #[test]
    fn test_extract_json_array_missing() {
        assert!(matches!(
            extract_json_array("no brackets here"),
            Err(MediacutError::ResponseFormat(_))
        ));
    }

    #[test]
    fn test_extract_json_array_missing_multibyte_prose() {
        // Error previews must truncate on char boundaries, not bytes.
        let text = format!("Désolé, {}", "é".repeat(300));
        assert!(matches!(
            extract_json_array(&text),
            Err(MediacutError::ResponseFormat(_))
        ));

        let text = format!("申し訳ありません。{}", "音声が聞き取れませんでした。".repeat(30));
        assert!(matches!(
            extract_json_array(&text),
            Err(MediacutError::ResponseFormat(_))
        ));
    }

    #[test]
    fn test_parse_segments() {
        let text = r#"Transcript below.
[
  {"start": "00:00", "end": "00:04", "text": "hello", "speaker": "Speaker 1"},
  {"start": "00:04", "end": "00:09", "text": "world"}
]"#;
        let segments = parse_segments(text).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].speaker, "Speaker 1");
        assert_eq!(segments[1].speaker, "");
    }

    #[test]
    fn test_parse_segments_not_an_array_of_segments() {
        assert!(parse_segments("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_parse_clips_mixed_shapes() {
        let text = r#"[
  {"start": "00:10", "end": "00:20", "title": "Intro", "reason": "hook"},
  {"segments": [{"start": "01:00", "end": "01:15"}], "title": "Punchline", "reason": ""}
]"#;
        let clips = parse_clips(text).unwrap();
        assert_eq!(clips.len(), 2);
        assert_eq!(clips[0].segments.len(), 1);
        assert_eq!(clips[0].segments[0].start, "00:10");
        assert_eq!(clips[1].segments[0].end, "01:15");
    }

    #[test]
    fn test_remap_segments() {
        let map = OffsetMap::new(vec![
            SegmentOffset {
                min_time: 0.0,
                offset: 0.0,
            },
            SegmentOffset {
                min_time: 30.0,
                offset: 5.0,
            },
        ]);
        let segments = vec![TranscriptSegment::new("00:20", "00:40", "x", "")];

        let remapped = remap_segments(&segments, &map);

        assert_eq!(remapped[0].start, "00:20.000");
        assert_eq!(remapped[0].end, "00:45.000");
    }
}
