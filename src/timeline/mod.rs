pub mod clip;
pub mod offset;
pub mod overlay;
pub mod silence;
pub mod store;

use serde::{Deserialize, Serialize};

/// One time-coded, speaker-attributed transcript line.
///
/// `start` and `end` stay in their textual time-code form because that is
/// what the model emits, what the sidecar file stores, and what the user
/// edits; numeric comparisons go through [`crate::timecode::parse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: String,
    pub end: String,
    pub text: String,
    #[serde(default)]
    pub speaker: String,
}

impl TranscriptSegment {
    pub fn new(
        start: impl Into<String>,
        end: impl Into<String>,
        text: impl Into<String>,
        speaker: impl Into<String>,
    ) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            text: text.into(),
            speaker: speaker.into(),
        }
    }

    /// Start time in seconds; malformed time codes read as 0.
    pub fn start_secs(&self) -> f64 {
        crate::timecode::parse(&self.start)
    }

    /// End time in seconds; malformed time codes read as 0.
    pub fn end_secs(&self) -> f64 {
        crate::timecode::parse(&self.end)
    }
}
