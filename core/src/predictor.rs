//! Prediction seam and the dictionary-backed default predictor.

use std::sync::Arc;

use crate::lexicon::Lexicon;
use crate::request::ConversionRequest;
use crate::segments::{Candidate, RevertEntry, SegmentType, Segments};
use crate::userdict::UserDict;

/// Suggestion/completion engine over user history and the dictionary.
///
/// `predict_for_request` appends candidates to the first conversion segment
/// and never clears it; the orchestrator decides when the segment is reset.
pub trait Predictor: Send + Sync {
    fn predict_for_request(&self, request: &ConversionRequest, segments: &mut Segments) -> bool;

    /// The conversion was finished; learn from the committed result.
    fn finish(&self, _request: &ConversionRequest, _segments: &mut Segments) {}

    /// Undo the learning recorded by the latest `finish`.
    fn revert(&self, _segments: &mut Segments) {}

    /// Remove one learned (reading, surface) pair.
    fn clear_history_entry(&self, _key: &str, _value: &str) -> bool {
        false
    }

    fn sync(&self) -> bool {
        true
    }

    fn reload(&self) -> bool {
        true
    }

    /// Block until background workers quiesce.
    fn wait(&self) -> bool {
        true
    }
}

/// Default predictor: user-history matches first, then dictionary
/// completions, both prefix-matched on the request key.
pub struct DictionaryPredictor {
    lexicon: Arc<Lexicon>,
    userdict: UserDict,
}

impl DictionaryPredictor {
    pub fn new(lexicon: Arc<Lexicon>, userdict: UserDict) -> Self {
        Self { lexicon, userdict }
    }

    pub fn userdict(&self) -> &UserDict {
        &self.userdict
    }

    fn history_candidates(&self, request: &ConversionRequest) -> Vec<Candidate> {
        let key = request.key();
        let limit = if key.is_empty() {
            request.max_user_history_prediction_candidates_size_for_zero_query()
        } else {
            request.max_user_history_prediction_candidates_size()
        };
        self.userdict
            .lookup_prefix(key, limit)
            .into_iter()
            .map(|(k, v, _freq)| {
                let mut candidate = Candidate::new(k, v);
                candidate.attributes |= Candidate::USER_HISTORY;
                candidate
            })
            .collect()
    }

    fn dictionary_candidates(&self, request: &ConversionRequest) -> Vec<Candidate> {
        let key = request.key();
        if key.is_empty() {
            return Vec::new();
        }
        let limit = request.max_dictionary_prediction_candidates_size();
        let mut out = Vec::new();
        for (reading, entries) in self.lexicon.prefix_search(key, limit) {
            for entry in entries {
                if out.len() >= limit {
                    return out;
                }
                let mut candidate = Candidate::new(reading.clone(), entry.value);
                candidate.cost = entry.cost;
                candidate.wcost = entry.cost;
                candidate.lid = entry.lid;
                candidate.rid = entry.rid;
                out.push(candidate);
            }
        }
        out
    }
}

impl Predictor for DictionaryPredictor {
    fn predict_for_request(&self, request: &ConversionRequest, segments: &mut Segments) -> bool {
        if segments.conversion_segments_size() == 0 {
            return false;
        }
        if request.key().is_empty() && !request.client().zero_query_suggestion {
            return false;
        }

        let mut fresh = self.history_candidates(request);
        fresh.extend(self.dictionary_candidates(request));

        let segment = segments.conversion_segment_mut(0);
        let mut added = false;
        for candidate in fresh {
            let duplicate = segment
                .candidates()
                .iter()
                .any(|c| c.key == candidate.key && c.value == candidate.value);
            if !duplicate {
                segment.push_candidate(candidate);
                added = true;
            }
        }
        added
    }

    fn finish(&self, _request: &ConversionRequest, segments: &mut Segments) {
        let mut id = segments.revert_entries().len() as u32;
        let mut learned = Vec::new();
        for segment in segments.iter() {
            // Freshly committed segments are FixedValue here; retained
            // history segments are already History.
            if segment.segment_type() != SegmentType::FixedValue {
                continue;
            }
            if segment.candidates_size() == 0 {
                continue;
            }
            let candidate = segment.candidate(0);
            if candidate.has_attribute(Candidate::NO_LEARNING) {
                continue;
            }
            if candidate.key.is_empty() || candidate.value.is_empty() {
                continue;
            }
            self.userdict.learn(&candidate.key, &candidate.value);
            learned.push(RevertEntry {
                id,
                key: candidate.key.clone(),
                value: candidate.value.clone(),
            });
            id += 1;
        }
        for entry in learned {
            segments.push_revert_entry(entry);
        }
    }

    fn revert(&self, segments: &mut Segments) {
        for entry in segments.revert_entries() {
            self.userdict.forget(&entry.key, &entry.value);
        }
    }

    fn clear_history_entry(&self, key: &str, value: &str) -> bool {
        self.userdict.remove(key, value)
    }
}
