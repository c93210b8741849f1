//! The editable, ordered collection of transcript segments.
//!
//! Every mutating operation consumes the current sequence by reference and
//! returns a new `SegmentStore` snapshot. Nothing here mutates shared state,
//! so an in-flight collaborator response can still be validated against the
//! snapshot it was issued for.

use crate::error::{MediacutError, Result};

use super::TranscriptSegment;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentStore {
    segments: Vec<TranscriptSegment>,
}

impl SegmentStore {
    pub fn new(segments: Vec<TranscriptSegment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[TranscriptSegment] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<TranscriptSegment> {
        self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Distinct speaker names in first-appearance order.
    pub fn speakers(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for seg in &self.segments {
            if !seg.speaker.is_empty() && !seen.contains(&seg.speaker.as_str()) {
                seen.push(seg.speaker.as_str());
            }
        }
        seen
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.segments.len() {
            Err(MediacutError::IndexOutOfRange {
                index,
                len: self.segments.len(),
            })
        } else {
            Ok(())
        }
    }

    /// Replace one segment in place. No automatic re-sort: a caller that
    /// moves `start` out of order follows up with [`sorted_by_start`].
    ///
    /// [`sorted_by_start`]: SegmentStore::sorted_by_start
    pub fn edit(&self, index: usize, segment: TranscriptSegment) -> Result<SegmentStore> {
        self.check_index(index)?;
        let mut segments = self.segments.clone();
        segments[index] = segment;
        Ok(SegmentStore::new(segments))
    }

    pub fn delete(&self, index: usize) -> Result<SegmentStore> {
        self.check_index(index)?;
        let mut segments = self.segments.clone();
        segments.remove(index);
        Ok(SegmentStore::new(segments))
    }

    /// Remove several indices atomically. Indices are validated up front,
    /// then processed in descending order so earlier removals do not shift
    /// the positions of later ones.
    pub fn delete_many(&self, indices: &[usize]) -> Result<SegmentStore> {
        for &index in indices {
            self.check_index(index)?;
        }

        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let mut segments = self.segments.clone();
        for &index in sorted.iter().rev() {
            segments.remove(index);
        }
        Ok(SegmentStore::new(segments))
    }

    /// Combine segment `index` with the one after it. No-op on the last
    /// index.
    pub fn merge_down(&self, index: usize) -> Result<SegmentStore> {
        self.check_index(index)?;
        if index + 1 == self.segments.len() {
            return Ok(self.clone());
        }

        let mut segments = self.segments.clone();
        let next = segments.remove(index + 1);
        let current = &mut segments[index];
        current.end = next.end;
        current.text = format!("{} {}", current.text, next.text);
        Ok(SegmentStore::new(segments))
    }

    /// Merge an arbitrary selection of segments into one.
    ///
    /// The merged segment spans from the first selected segment's start to
    /// the last selected segment's end and keeps the first one's speaker;
    /// text is the selected segments' text joined in index order. Unselected
    /// segments lying between selected ones are absorbed into the merged time
    /// range and their text is dropped — a deliberate editing behavior, not
    /// an accident. Fewer than two distinct indices is a no-op.
    pub fn merge_selected(&self, indices: &[usize]) -> Result<SegmentStore> {
        for &index in indices {
            self.check_index(index)?;
        }

        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() < 2 {
            return Ok(self.clone());
        }

        let first = sorted[0];
        let last = *sorted.last().unwrap();
        let merged = TranscriptSegment {
            start: self.segments[first].start.clone(),
            end: self.segments[last].end.clone(),
            speaker: self.segments[first].speaker.clone(),
            text: sorted
                .iter()
                .map(|&i| self.segments[i].text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        };

        let mut segments = self.segments.clone();
        for &index in sorted.iter().rev() {
            segments.remove(index);
        }
        segments.insert(first, merged);
        Ok(SegmentStore::new(segments))
    }

    /// Relabel every segment spoken by `old_name`.
    ///
    /// Performed unconditionally: when `new_name` already labels another
    /// speaker this is a lossy merge, and confirming it is the caller's
    /// (UI's) responsibility before invoking the operation.
    pub fn rename_speaker(&self, old_name: &str, new_name: &str) -> SegmentStore {
        let segments = self
            .segments
            .iter()
            .map(|seg| {
                let mut seg = seg.clone();
                if seg.speaker == old_name {
                    seg.speaker = new_name.to_string();
                }
                seg
            })
            .collect();
        SegmentStore::new(segments)
    }

    /// New snapshot with segments in non-decreasing start order.
    ///
    /// The sort is stable, so overlapping or equal-start segments keep their
    /// relative input order.
    pub fn sorted_by_start(&self) -> SegmentStore {
        let mut segments = self.segments.clone();
        segments.sort_by(|a, b| {
            a.start_secs()
                .partial_cmp(&b.start_secs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        SegmentStore::new(segments)
    }
}
