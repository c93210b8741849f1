pub mod srt;
pub mod txt;
pub mod vtt;

use crate::config::OutputFormat;

/// One subtitle cue in clip-local (or media-local) seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCue {
    pub start: f64,
    pub end: f64,
    pub speaker: String,
    pub text: String,
}

pub trait SubtitleFormatter {
    fn format(&self, cues: &[SubtitleCue]) -> String;
    fn extension(&self) -> &'static str;
}

pub fn create_formatter(format: OutputFormat) -> Box<dyn SubtitleFormatter> {
    match format {
        OutputFormat::Srt => Box::new(srt::SrtFormatter),
        OutputFormat::Vtt => Box::new(vtt::VttFormatter),
        OutputFormat::Txt => Box::new(txt::TxtFormatter),
    }
}

/// Build cues straight from a transcript track, in media-local time.
pub fn cues_from_segments(segments: &[crate::timeline::TranscriptSegment]) -> Vec<SubtitleCue> {
    segments
        .iter()
        .map(|seg| SubtitleCue {
            start: seg.start_secs(),
            end: seg.end_secs(),
            speaker: seg.speaker.clone(),
            text: seg.text.clone(),
        })
        .collect()
}
