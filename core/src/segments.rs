//! Segmented conversion buffer.
//!
//! This module provides:
//! - `Candidate`: A ranked conversion choice with POS ids and costs
//! - `Segment`: A contiguous region of the reading with its candidate lists
//! - `Segments`: The ordered buffer split into a history prefix and a
//!   conversion suffix

use serde::{Deserialize, Serialize};

/// A ranked conversion choice for a segment.
///
/// Costs are on an additive scale; lower is better. `lid`/`rid` are the
/// left/right part-of-speech connection classes used by the decoder's bigram
/// costs; zero means "not assigned yet".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Reading consumed by this candidate.
    pub key: String,
    /// Surface form.
    pub value: String,
    /// Reading of the content part (equals `key` for simple words).
    pub content_key: String,
    /// Surface of the content part (equals `value` for simple words).
    pub content_value: String,
    /// Left POS connection id.
    pub lid: u16,
    /// Right POS connection id.
    pub rid: u16,
    /// Total path cost.
    pub cost: i32,
    /// Word cost.
    pub wcost: i32,
    /// Cost of the internal segmentation structure.
    pub structure_cost: i32,
    /// Attribute bitmask, see the associated constants.
    pub attributes: u32,
    /// Codepoint count of the key prefix this candidate consumes.
    /// Only meaningful while `PARTIALLY_KEY_CONSUMED` is set.
    pub consumed_key_size: usize,
}

impl Candidate {
    /// The user selected this candidate from a non-top position.
    pub const RERANKED: u32 = 1 << 0;
    /// This candidate must not be fed back into learning.
    pub const NO_LEARNING: u32 = 1 << 1;
    /// This candidate consumes only `consumed_key_size` codepoints of the
    /// segment key.
    pub const PARTIALLY_KEY_CONSUMED: u32 = 1 << 2;
    /// Produced from the user history store.
    pub const USER_HISTORY: u32 = 1 << 3;

    /// Create a candidate whose content part equals the whole word.
    pub fn new<K: Into<String>, V: Into<String>>(key: K, value: V) -> Self {
        let key = key.into();
        let value = value.into();
        Candidate {
            content_key: key.clone(),
            content_value: value.clone(),
            key,
            value,
            ..Default::default()
        }
    }

    pub fn has_attribute(&self, attr: u32) -> bool {
        self.attributes & attr != 0
    }
}

/// How much of a segment the user has pinned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SegmentType {
    /// Boundary and value both free; the decoder may redo everything.
    #[default]
    Free,
    /// The user fixed the boundary; re-decoding must keep the key length.
    FixedBoundary,
    /// The user fixed the selected value.
    FixedValue,
    /// Submitted ahead of the rest of the buffer; counts as history.
    Submitted,
    /// Previously committed, retained as context only.
    History,
}

/// A contiguous region of the reading and its ranked candidates.
///
/// `meta_candidates` is a parallel, fixed-length list of transliteration
/// variants; public APIs address it with negative candidate indices
/// (`-1` is the first meta candidate).
#[derive(Debug, Clone, Default)]
pub struct Segment {
    key: String,
    segment_type: SegmentType,
    candidates: Vec<Candidate>,
    meta_candidates: Vec<Candidate>,
}

impl Segment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn set_key<K: Into<String>>(&mut self, key: K) {
        self.key = key.into();
    }

    pub fn segment_type(&self) -> SegmentType {
        self.segment_type
    }

    pub fn set_segment_type(&mut self, segment_type: SegmentType) {
        self.segment_type = segment_type;
    }

    pub fn candidates_size(&self) -> usize {
        self.candidates.len()
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn candidate(&self, i: usize) -> &Candidate {
        &self.candidates[i]
    }

    pub fn candidate_mut(&mut self, i: usize) -> &mut Candidate {
        &mut self.candidates[i]
    }

    /// Append a default-constructed candidate and return it for filling.
    pub fn add_candidate(&mut self) -> &mut Candidate {
        self.candidates.push(Candidate::default());
        self.candidates.last_mut().unwrap()
    }

    pub fn push_candidate(&mut self, candidate: Candidate) {
        self.candidates.push(candidate);
    }

    pub fn insert_candidate(&mut self, i: usize, candidate: Candidate) {
        let i = i.min(self.candidates.len());
        self.candidates.insert(i, candidate);
    }

    pub fn erase_candidate(&mut self, i: usize) {
        if i < self.candidates.len() {
            self.candidates.remove(i);
        }
    }

    /// Erase `n` candidates starting at `i`, truncated at the end.
    pub fn erase_candidates(&mut self, i: usize, n: usize) {
        if i >= self.candidates.len() {
            return;
        }
        let end = (i + n).min(self.candidates.len());
        self.candidates.drain(i..end);
    }

    pub fn clear_candidates(&mut self) {
        self.candidates.clear();
    }

    pub fn meta_candidates_size(&self) -> usize {
        self.meta_candidates.len()
    }

    pub fn meta_candidates(&self) -> &[Candidate] {
        &self.meta_candidates
    }

    pub fn meta_candidate(&self, i: usize) -> &Candidate {
        &self.meta_candidates[i]
    }

    pub fn meta_candidate_mut(&mut self, i: usize) -> &mut Candidate {
        &mut self.meta_candidates[i]
    }

    /// Append a default-constructed meta candidate and return it for filling.
    pub fn add_meta_candidate(&mut self) -> &mut Candidate {
        self.meta_candidates.push(Candidate::default());
        self.meta_candidates.last_mut().unwrap()
    }

    /// Replace the meta-candidate list with transliteration variants of the
    /// segment key, in `t13n` kind order.
    pub fn set_transliterations(&mut self, values: Vec<String>) {
        self.meta_candidates.clear();
        for value in values {
            let mut candidate = Candidate::new(self.key.clone(), value);
            candidate.attributes |= Candidate::NO_LEARNING;
            self.meta_candidates.push(candidate);
        }
    }

    /// Candidate addressed by a public index, negative meta indices included.
    pub fn candidate_at(&self, i: i32) -> Option<&Candidate> {
        if i < 0 {
            self.meta_candidates.get((-i - 1) as usize)
        } else {
            self.candidates.get(i as usize)
        }
    }

    /// Whether `i` addresses an existing candidate. Negative indices address
    /// meta candidates: `-1` is `meta_candidate(0)`.
    pub fn is_valid_index(&self, i: i32) -> bool {
        if i < 0 {
            ((-i - 1) as usize) < self.meta_candidates.len()
        } else {
            (i as usize) < self.candidates.len()
        }
    }

    /// Move the candidate at `from` to position `to`, shifting the others.
    /// A negative `from` copies the addressed meta candidate into the primary
    /// list at `to`. Returns false when `from` is out of range.
    pub fn move_candidate(&mut self, from: i32, to: usize) -> bool {
        if from < 0 {
            let meta_index = (-from - 1) as usize;
            let Some(meta) = self.meta_candidates.get(meta_index) else {
                return false;
            };
            let candidate = meta.clone();
            self.insert_candidate(to, candidate);
            return true;
        }
        let from = from as usize;
        if from >= self.candidates.len() {
            return false;
        }
        if from == to {
            return true;
        }
        let candidate = self.candidates.remove(from);
        let to = to.min(self.candidates.len());
        self.candidates.insert(to, candidate);
        true
    }

    pub fn clear(&mut self) {
        self.key.clear();
        self.segment_type = SegmentType::Free;
        self.candidates.clear();
        self.meta_candidates.clear();
    }
}

/// Book-keeping for undoing learning triggered by a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevertEntry {
    pub id: u32,
    pub key: String,
    pub value: String,
}

/// The mutable conversion buffer of one session.
///
/// Segments are ordered: a history prefix (the leading run of `History` and
/// `Submitted` segments) followed by the conversion suffix currently being
/// edited. Public orchestrator operations index into the suffix; the split is
/// derived from segment types, never stored.
#[derive(Debug, Clone)]
pub struct Segments {
    segments: Vec<Segment>,
    max_history_segments_size: usize,
    resized: bool,
    revert_entries: Vec<RevertEntry>,
}

/// Hard ceiling for the retained history, independent of configuration.
pub const MAX_HISTORY_SEGMENTS_SIZE: usize = 32;

impl Default for Segments {
    fn default() -> Self {
        Self::new()
    }
}

impl Segments {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            max_history_segments_size: 4,
            resized: false,
            revert_entries: Vec::new(),
        }
    }

    /// Buffer with the configured history retention.
    pub fn from_config(config: &crate::Config) -> Self {
        let mut segments = Self::new();
        segments.set_max_history_segments_size(config.max_history_segments_size);
        segments
    }

    pub fn segments_size(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segment(&self, i: usize) -> &Segment {
        &self.segments[i]
    }

    pub fn segment_mut(&mut self, i: usize) -> &mut Segment {
        &mut self.segments[i]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Segment> {
        self.segments.iter_mut()
    }

    /// Append a default-constructed segment and return it for filling.
    pub fn add_segment(&mut self) -> &mut Segment {
        self.segments.push(Segment::default());
        self.segments.last_mut().unwrap()
    }

    /// Insert a default-constructed segment at `i` and return it.
    pub fn insert_segment(&mut self, i: usize) -> &mut Segment {
        let i = i.min(self.segments.len());
        self.segments.insert(i, Segment::default());
        &mut self.segments[i]
    }

    pub fn erase_segment(&mut self, i: usize) {
        if i < self.segments.len() {
            self.segments.remove(i);
        }
    }

    /// Erase `n` segments starting at `i`, truncated at the end.
    pub fn erase_segments(&mut self, i: usize, n: usize) {
        if i >= self.segments.len() {
            return;
        }
        let end = (i + n).min(self.segments.len());
        self.segments.drain(i..end);
    }

    pub fn pop_front_segment(&mut self) {
        if !self.segments.is_empty() {
            self.segments.remove(0);
        }
    }

    /// Length of the leading run of `History`/`Submitted` segments.
    pub fn history_segments_size(&self) -> usize {
        self.segments
            .iter()
            .take_while(|s| {
                matches!(
                    s.segment_type(),
                    SegmentType::History | SegmentType::Submitted
                )
            })
            .count()
    }

    pub fn conversion_segments_size(&self) -> usize {
        self.segments.len() - self.history_segments_size()
    }

    pub fn history_segments(&self) -> &[Segment] {
        &self.segments[..self.history_segments_size()]
    }

    pub fn conversion_segments(&self) -> &[Segment] {
        &self.segments[self.history_segments_size()..]
    }

    pub fn conversion_segments_mut(&mut self) -> &mut [Segment] {
        let history = self.history_segments_size();
        &mut self.segments[history..]
    }

    pub fn history_segment(&self, i: usize) -> &Segment {
        &self.history_segments()[i]
    }

    pub fn conversion_segment(&self, i: usize) -> &Segment {
        &self.conversion_segments()[i]
    }

    pub fn conversion_segment_mut(&mut self, i: usize) -> &mut Segment {
        let history = self.history_segments_size();
        &mut self.segments[history + i]
    }

    /// Drop the conversion suffix, keeping the history prefix. Pending revert
    /// entries refer to the dropped suffix and are cleared with it.
    pub fn clear_conversion_segments(&mut self) {
        let history = self.history_segments_size();
        self.revert_entries.clear();
        self.segments.truncate(history);
    }

    pub fn clear(&mut self) {
        self.segments.clear();
        self.revert_entries.clear();
        self.resized = false;
    }

    pub fn max_history_segments_size(&self) -> usize {
        self.max_history_segments_size
    }

    pub fn set_max_history_segments_size(&mut self, size: usize) {
        self.max_history_segments_size = size.min(MAX_HISTORY_SEGMENTS_SIZE);
    }

    pub fn resized(&self) -> bool {
        self.resized
    }

    pub fn set_resized(&mut self, resized: bool) {
        self.resized = resized;
    }

    pub fn revert_entries(&self) -> &[RevertEntry] {
        &self.revert_entries
    }

    pub fn push_revert_entry(&mut self, entry: RevertEntry) {
        self.revert_entries.push(entry);
    }

    pub fn clear_revert_entries(&mut self) {
        self.revert_entries.clear();
    }
}
