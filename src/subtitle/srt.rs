// SubRip subtitle format
use super::{SubtitleCue, SubtitleFormatter};

pub struct SrtFormatter;

impl SubtitleFormatter for SrtFormatter {
    fn format(&self, cues: &[SubtitleCue]) -> String {
        cues.iter()
            .enumerate()
            .map(|(i, cue)| {
                format!(
                    "{}\n{} --> {}\n{}\n",
                    i + 1,
                    format_timestamp(cue.start),
                    format_timestamp(cue.end),
                    label(cue)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn extension(&self) -> &'static str {
        "srt"
    }
}

fn label(cue: &SubtitleCue) -> String {
    if cue.speaker.is_empty() {
        cue.text.clone()
    } else {
        format!("{}: {}", cue.speaker, cue.text)
    }
}

fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}
