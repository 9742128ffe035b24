//! Reading lookup and the dictionary-backed decoder.
//!
//! `Lexicon` maps a reading (e.g. "あい") to surface entries. Dynamic entries
//! live in an in-memory map; bulk data comes from FST + bincode artifacts
//! built by the `build-lexicon` tool.
//!
//! `LexiconDecoder` is the shippable `LatticeDecoder`: it decodes each
//! conversion segment independently (exact lexicon hits plus a composed
//! best path over the key's codepoints), which is enough to honor pinned
//! boundaries without a full lattice search.

use fst::automaton::Str;
use fst::{Automaton, IntoStreamer, Map, Streamer};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::decoder::LatticeDecoder;
use crate::request::{ConversionRequest, RequestType};
use crate::segments::{Candidate, Segments};
use crate::utils;

/// Failures while reading or writing lexicon artifacts.
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("lexicon artifact io: {0}")]
    Io(#[from] std::io::Error),
    #[error("lexicon key index: {0}")]
    KeyIndex(#[from] fst::Error),
    #[error("lexicon payload codec: {0}")]
    PayloadCodec(#[from] bincode::Error),
    #[error("key index holds {keys} readings but the payload holds {payloads}")]
    EntryCountMismatch { keys: usize, payloads: usize },
}

/// One surface entry for a reading.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LexEntry {
    pub value: String,
    pub cost: i32,
    pub lid: u16,
    pub rid: u16,
}

impl LexEntry {
    pub fn new<V: Into<String>>(value: V, cost: i32) -> Self {
        Self {
            value: value.into(),
            cost,
            lid: 0,
            rid: 0,
        }
    }

    pub fn with_pos<V: Into<String>>(value: V, cost: i32, lid: u16, rid: u16) -> Self {
        Self {
            value: value.into(),
            cost,
            lid,
            rid,
        }
    }
}

/// Reading → entries dictionary. Uses FST for key indexing and bincode for
/// payload storage; dynamic insertions live in an in-memory map consulted
/// first.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    map: BTreeMap<String, Vec<LexEntry>>,
    fst_map: Option<Map<Vec<u8>>>,
    payloads: Option<Vec<Vec<LexEntry>>>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a dynamic entry.
    pub fn insert<K: Into<String>>(&mut self, key: K, entry: LexEntry) {
        let key = utils::normalize(&key.into());
        self.map.entry(key).or_default().push(entry);
    }

    /// All entries for an exact reading.
    pub fn lookup(&self, key: &str) -> Vec<LexEntry> {
        let key = utils::normalize(key);
        let mut out = self.map.get(&key).cloned().unwrap_or_default();

        if let (Some(map), Some(payloads)) = (&self.fst_map, &self.payloads) {
            if let Some(idx) = map.get(&key) {
                if let Some(entries) = payloads.get(idx as usize) {
                    out.extend(entries.iter().cloned());
                }
            }
        }
        out
    }

    pub fn has_key(&self, key: &str) -> bool {
        let key = utils::normalize(key);
        if self.map.contains_key(&key) {
            return true;
        }
        self.fst_map
            .as_ref()
            .map(|m| m.get(&key).is_some())
            .unwrap_or(false)
    }

    /// Readings starting with `prefix`, at most `limit`, with their entries.
    /// An empty prefix matches every reading.
    pub fn prefix_search(&self, prefix: &str, limit: usize) -> Vec<(String, Vec<LexEntry>)> {
        let mut out: Vec<(String, Vec<LexEntry>)> = Vec::new();
        for (k, v) in self.map.range(prefix.to_string()..) {
            if !k.starts_with(prefix) {
                break;
            }
            out.push((k.clone(), v.clone()));
            if out.len() >= limit {
                return out;
            }
        }

        if let (Some(map), Some(payloads)) = (&self.fst_map, &self.payloads) {
            let automaton = Str::new(prefix).starts_with();
            let mut stream = map.search(automaton).into_stream();
            while let Some((k, idx)) = stream.next() {
                if out.len() >= limit {
                    break;
                }
                let key = String::from_utf8_lossy(k).to_string();
                if out.iter().any(|(existing, _)| *existing == key) {
                    continue;
                }
                if let Some(entries) = payloads.get(idx as usize) {
                    out.push((key, entries.clone()));
                }
            }
        }
        out
    }

    /// Visit every entry, artifact-backed ones included.
    pub fn for_each_entry<F: FnMut(&str, &LexEntry)>(&self, mut f: F) {
        for (k, v) in &self.map {
            for e in v {
                f(k, e);
            }
        }
        if let (Some(map), Some(payloads)) = (&self.fst_map, &self.payloads) {
            let mut stream = map.stream();
            while let Some((k, idx)) = stream.next() {
                let key = String::from_utf8_lossy(k).to_string();
                if let Some(entries) = payloads.get(idx as usize) {
                    for e in entries {
                        f(&key, e);
                    }
                }
            }
        }
    }

    /// Load a lexicon from its two artifacts: the key index (`lexicon.fst`,
    /// reading to payload position) and the payload (`lexicon.bincode`,
    /// `Vec<Vec<LexEntry>>`). The pair is rejected when the two disagree on
    /// the number of readings.
    pub fn load_from_artifacts<P: AsRef<Path>>(
        fst_path: P,
        bincode_path: P,
    ) -> Result<Self, LexiconError> {
        let index = Map::new(std::fs::read(fst_path)?)?;
        let payloads: Vec<Vec<LexEntry>> = bincode::deserialize(&std::fs::read(bincode_path)?)?;
        if index.len() != payloads.len() {
            return Err(LexiconError::EntryCountMismatch {
                keys: index.len(),
                payloads: payloads.len(),
            });
        }

        Ok(Self {
            map: BTreeMap::new(),
            fst_map: Some(index),
            payloads: Some(payloads),
        })
    }

    /// Write the dynamic entries out as the artifact pair accepted by
    /// `load_from_artifacts`.
    pub fn write_artifacts<P: AsRef<Path>>(
        &self,
        fst_path: P,
        bincode_path: P,
    ) -> Result<(), LexiconError> {
        // The payload position doubles as the index value, so both files are
        // driven by one pass over the map (already in the sorted order the
        // index builder insists on).
        let mut builder = fst::MapBuilder::memory();
        for (position, reading) in self.map.keys().enumerate() {
            builder.insert(reading, position as u64)?;
        }
        std::fs::write(fst_path, builder.into_inner()?)?;

        let payloads: Vec<&Vec<LexEntry>> = self.map.values().collect();
        std::fs::write(bincode_path, bincode::serialize(&payloads)?)?;
        Ok(())
    }
}

// Cost added between composed entries; discourages over-segmentation of a key
// that also has a whole-key entry.
const SEGMENT_JOIN_COST: i32 = 2000;
// Longest reading span tried when composing, in codepoints.
const MAX_WORD_SPAN: usize = 8;
const DECODE_CACHE_CAPACITY: usize = 1000;

/// Dictionary-backed decoder.
pub struct LexiconDecoder {
    lexicon: Arc<Lexicon>,
    // surface -> readings, for reverse conversion
    reverse: BTreeMap<String, Vec<String>>,
    cache: Mutex<LruCache<String, Vec<Candidate>>>,
}

impl LexiconDecoder {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        let mut reverse: BTreeMap<String, Vec<String>> = BTreeMap::new();
        lexicon.for_each_entry(|key, entry| {
            let readings = reverse.entry(entry.value.clone()).or_default();
            if !readings.iter().any(|r| r == key) {
                readings.push(key.to_string());
            }
        });
        Self {
            lexicon,
            reverse,
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(DECODE_CACHE_CAPACITY).unwrap(),
            )),
        }
    }

    /// Candidates for one segment key: exact lexicon hits plus the best
    /// composed path, sorted by ascending cost and capped at `limit`.
    fn decode_key(&self, key: &str, limit: usize) -> Vec<Candidate> {
        if let Some(cached) = self.cache.lock().expect("decoder cache").get(key) {
            let mut out = cached.clone();
            out.truncate(limit.max(1));
            return out;
        }

        let mut out: Vec<Candidate> = Vec::new();
        for entry in self.lexicon.lookup(key) {
            let mut candidate = Candidate::new(key, entry.value);
            candidate.cost = entry.cost;
            candidate.wcost = entry.cost;
            candidate.lid = entry.lid;
            candidate.rid = entry.rid;
            out.push(candidate);
        }

        if let Some(composed) = self.compose_key(key) {
            if !out.iter().any(|c| c.value == composed.value) {
                out.push(composed);
            }
        }

        out.sort_by_key(|c| c.cost);
        self.cache
            .lock()
            .expect("decoder cache")
            .put(key.to_string(), out.clone());
        out.truncate(limit.max(1));
        out
    }

    /// Best path covering `key` with two or more lexicon entries.
    fn compose_key(&self, key: &str) -> Option<Candidate> {
        let chars: Vec<char> = key.chars().collect();
        let n = chars.len();
        if n < 2 {
            return None;
        }

        // best[i]: lowest-cost entry sequence covering chars[0..i]
        type Path = Vec<LexEntry>;
        let mut best: Vec<Option<(i32, Path)>> = vec![None; n + 1];
        best[0] = Some((0, Vec::new()));

        for i in 0..n {
            let Some((base_cost, base_path)) = best[i].clone() else {
                continue;
            };
            for len in 1..=MAX_WORD_SPAN.min(n - i) {
                let word: String = chars[i..i + len].iter().collect();
                for entry in self.lexicon.lookup(&word) {
                    let join = if i > 0 { SEGMENT_JOIN_COST } else { 0 };
                    let cost = base_cost + entry.cost + join;
                    let end = i + len;
                    let better = match &best[end] {
                        None => true,
                        Some((existing, _)) => cost < *existing,
                    };
                    if better {
                        let mut path = base_path.clone();
                        path.push(entry);
                        best[end] = Some((cost, path));
                    }
                }
            }
        }

        let (cost, path) = best[n].take()?;
        if path.len() < 2 {
            return None;
        }
        let value: String = path.iter().map(|e| e.value.as_str()).collect();
        let mut candidate = Candidate::new(key, value);
        candidate.cost = cost;
        candidate.wcost = path.iter().map(|e| e.cost).sum();
        candidate.structure_cost = (path.len() as i32 - 1) * SEGMENT_JOIN_COST;
        candidate.lid = path.first().map(|e| e.lid).unwrap_or(0);
        candidate.rid = path.last().map(|e| e.rid).unwrap_or(0);
        Some(candidate)
    }

    /// Greedy longest-match decomposition of a surface string into readings.
    fn reverse_decode(&self, surface: &str) -> Option<String> {
        let chars: Vec<char> = surface.chars().collect();
        let n = chars.len();
        if n == 0 {
            return None;
        }
        let mut reading = String::new();
        let mut i = 0;
        while i < n {
            let mut matched = false;
            for len in (1..=MAX_WORD_SPAN.min(n - i)).rev() {
                let piece: String = chars[i..i + len].iter().collect();
                if let Some(readings) = self.reverse.get(&piece) {
                    if let Some(first) = readings.first() {
                        reading.push_str(first);
                        i += len;
                        matched = true;
                        break;
                    }
                }
            }
            if !matched {
                return None;
            }
        }
        Some(reading)
    }
}

impl LatticeDecoder for LexiconDecoder {
    fn convert_for_request(&self, request: &ConversionRequest, segments: &mut Segments) -> bool {
        if request.request_type() == RequestType::ReverseConversion {
            if segments.segments_size() == 0 {
                return false;
            }
            let surface = segments.segment(0).key().to_string();
            let Some(reading) = self.reverse_decode(&surface) else {
                return false;
            };
            let segment = segments.segment_mut(0);
            segment.clear_candidates();
            segment.push_candidate(Candidate::new(surface, reading));
            return true;
        }

        let limit = request.max_conversion_candidates_size();
        let history = segments.history_segments_size();
        if history == segments.segments_size() {
            return false;
        }
        let mut all_filled = true;
        for i in history..segments.segments_size() {
            let key = segments.segment(i).key().to_string();
            if key.is_empty() {
                all_filled = false;
                continue;
            }
            let candidates = self.decode_key(&key, limit);
            let segment = segments.segment_mut(i);
            segment.clear_candidates();
            all_filled &= !candidates.is_empty();
            for candidate in candidates {
                segment.push_candidate(candidate);
            }
        }
        all_filled
    }
}
