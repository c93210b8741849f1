//! Transcript sidecar persistence.
//!
//! Every analyzed media file gets a `<name>.transcript.json` sidecar next
//! to it holding the segments plus the analysis settings that produced
//! them, so editing can resume without re-transcribing. Older sidecars were
//! a bare segment array; those still load.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::timeline::TranscriptSegment;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptSession {
    pub segments: Vec<TranscriptSegment>,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub glossary: String,
    #[serde(default)]
    pub speaker_count: Option<u32>,
    #[serde(default)]
    pub remove_filler_words: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SidecarPayload {
    Session(TranscriptSession),
    // Early sidecars stored only the segment array.
    Legacy(Vec<TranscriptSegment>),
}

impl TranscriptSession {
    pub fn new(segments: Vec<TranscriptSegment>) -> Self {
        Self {
            segments,
            ..Default::default()
        }
    }

    /// Sidecar location for a media file: the full file name plus a
    /// `.transcript.json` suffix, so `talk.mp4` and `talk.wav` in the same
    /// directory keep distinct sidecars.
    pub fn sidecar_path(media_path: &Path) -> PathBuf {
        PathBuf::from(format!("{}.transcript.json", media_path.display()))
    }

    pub fn save(&self, media_path: &Path) -> Result<()> {
        let path = Self::sidecar_path(media_path);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        info!("Session saved to {}", path.display());
        Ok(())
    }

    /// Load the sidecar for a media file, or `None` when there is none.
    pub fn load(media_path: &Path) -> Result<Option<Self>> {
        let path = Self::sidecar_path(media_path);
        if !path.exists() {
            debug!("No session sidecar at {}", path.display());
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)?;
        let payload: SidecarPayload = serde_json::from_str(&contents)?;

        let session = match payload {
            SidecarPayload::Session(session) => session,
            SidecarPayload::Legacy(segments) => {
                debug!("Upgrading legacy sidecar {}", path.display());
                Self::new(segments)
            }
        };

        Ok(Some(session))
    }
}
