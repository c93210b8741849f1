//! Per-language parallel copies of the segment sequence.
//!
//! The original transcript lives under the `"Original"` key; each completed
//! translation adds one more track. Exactly one track is active: reads
//! resolve to it (falling back to Original when the requested track does not
//! exist yet) and writes commit to it, so edits made while viewing a
//! translation can never corrupt the source-of-truth track.

use std::collections::BTreeMap;

use super::store::SegmentStore;

/// Key of the source-of-truth track.
pub const ORIGINAL_TRACK: &str = "Original";

#[derive(Debug, Clone)]
pub struct LanguageOverlay {
    tracks: BTreeMap<String, SegmentStore>,
    active: String,
}

impl LanguageOverlay {
    pub fn new(original: SegmentStore) -> Self {
        let mut tracks = BTreeMap::new();
        tracks.insert(ORIGINAL_TRACK.to_string(), original);
        Self {
            tracks,
            active: ORIGINAL_TRACK.to_string(),
        }
    }

    pub fn active_key(&self) -> &str {
        &self.active
    }

    pub fn has(&self, language: &str) -> bool {
        self.tracks.contains_key(language)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.tracks.keys().map(String::as_str)
    }

    /// The store currently being edited and displayed.
    pub fn active(&self) -> &SegmentStore {
        self.tracks
            .get(&self.active)
            .unwrap_or_else(|| &self.tracks[ORIGINAL_TRACK])
    }

    /// Read a specific track, falling back to Original when absent.
    pub fn get(&self, language: &str) -> &SegmentStore {
        self.tracks
            .get(language)
            .unwrap_or_else(|| &self.tracks[ORIGINAL_TRACK])
    }

    /// Switch the active track. Returns false (leaving the active track
    /// unchanged) when no such track exists.
    pub fn activate(&mut self, language: &str) -> bool {
        if self.tracks.contains_key(language) {
            self.active = language.to_string();
            true
        } else {
            false
        }
    }

    /// Add a translation track and activate it.
    ///
    /// Idempotent against re-fetch: when the track already exists the new
    /// store is discarded and the existing track is simply selected, so a
    /// repeated translation request never clobbers prior edits. Returns true
    /// only when the track was newly added.
    pub fn add_language(&mut self, language: &str, store: SegmentStore) -> bool {
        if self.tracks.contains_key(language) {
            self.active = language.to_string();
            return false;
        }
        self.tracks.insert(language.to_string(), store);
        self.active = language.to_string();
        true
    }

    /// Replace the active track with a new snapshot.
    pub fn commit(&mut self, store: SegmentStore) {
        self.tracks.insert(self.active.clone(), store);
    }
}
