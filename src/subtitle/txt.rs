// Plain-text transcript format
use super::{SubtitleCue, SubtitleFormatter};
use crate::timecode;

pub struct TxtFormatter;

impl SubtitleFormatter for TxtFormatter {
    fn format(&self, cues: &[SubtitleCue]) -> String {
        cues.iter()
            .map(|cue| {
                let label = if cue.speaker.is_empty() {
                    cue.text.clone()
                } else {
                    format!("{}: {}", cue.speaker, cue.text)
                };
                format!(
                    "[{} - {}] {}\n",
                    timecode::format(cue.start),
                    timecode::format(cue.end),
                    label
                )
            })
            .collect()
    }

    fn extension(&self) -> &'static str {
        "txt"
    }
}
