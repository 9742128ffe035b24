//! The conversion orchestrator.
//!
//! `Converter` drives the state machine over a `Segments` buffer: it asks the
//! decoder and predictor for candidates, runs the rewrite/suppress/trim
//! pipeline, manages commits and segment resizing, and promotes finished
//! segments to conversation history.
//!
//! All operations take `&self` and mutate only the caller's buffer; one
//! `Converter` can serve many sessions as long as each call carries its own
//! `Segments`.

use std::sync::Arc;

use tracing::{debug, error};

use crate::decoder::LatticeDecoder;
use crate::history::HistoryReconstructor;
use crate::modules::Modules;
use crate::predictor::Predictor;
use crate::request::{ConversionRequest, RequestOptions, RequestType};
use crate::reverse::ReverseConverter;
use crate::rewriter::Rewriter;
use crate::segments::{Candidate, Segment, SegmentType, Segments};
use crate::stats::{names, NullUsageStats, UsageStats};
use crate::t13n::NUM_T13N_TYPES;
use crate::utils;

// POS back-fill re-decode budget: widen geometrically, stop before 80.
const POS_EXPAND_SIZE_START: usize = 5;
const POS_EXPAND_SIZE_DIFF: usize = 50;
const POS_EXPAND_SIZE_MAX: usize = 80;

/// Translate a conversion-relative segment index to an absolute one.
fn absolute_segment_index(segments: &Segments, segment_index: usize) -> Option<usize> {
    let index = segments.history_segments_size() + segment_index;
    (index < segments.segments_size()).then_some(index)
}

/// Reset the conversion suffix to a single free segment holding `key`.
fn set_key(segments: &mut Segments, key: &str) {
    segments.set_max_history_segments_size(4);
    segments.clear_conversion_segments();

    let segment = segments.add_segment();
    segment.set_key(key);
    segment.set_segment_type(SegmentType::Free);
}

// The key is reset only when the buffer is unprepared or carries a different
// key. Keeping the segment alive preserves suggestion results while the user
// expands them with the tab key; for roman input the conversion key of an
// incomplete composition does not change ("あ" for "a" stays "あ" for "ak"),
// which is why suggestion always resets before reaching this check.
fn should_set_key_for_prediction(key: &str, segments: &Segments) -> bool {
    segments.conversion_segments_size() == 0 || segments.conversion_segment(0).key() != key
}

/// Every conversion segment has a candidate; on mobile a meta candidate is
/// enough.
fn is_valid_segments(request: &ConversionRequest, segments: &Segments) -> bool {
    let is_mobile = request.client().is_mobile();
    for segment in segments.iter() {
        if segment.candidates_size() != 0 {
            continue;
        }
        if is_mobile && segment.meta_candidates_size() != 0 {
            continue;
        }
        return false;
    }
    true
}

fn maybe_set_consumed_key_size_to_candidate(consumed_key_size: usize, candidate: &mut Candidate) {
    if candidate.has_attribute(Candidate::PARTIALLY_KEY_CONSUMED) {
        // The predictor already set an appropriate size.
        return;
    }
    candidate.attributes |= Candidate::PARTIALLY_KEY_CONSUMED;
    candidate.consumed_key_size = consumed_key_size;
}

fn maybe_set_consumed_key_size_to_segment(consumed_key_size: usize, segment: &mut Segment) {
    for i in 0..segment.candidates_size() {
        maybe_set_consumed_key_size_to_candidate(consumed_key_size, segment.candidate_mut(i));
    }
    for i in 0..segment.meta_candidates_size() {
        maybe_set_consumed_key_size_to_candidate(consumed_key_size, segment.meta_candidate_mut(i));
    }
}

/// Orchestrator over decoder, predictor and rewriter.
pub struct Converter {
    modules: Modules,
    immutable_converter: Box<dyn LatticeDecoder>,
    predictor: Box<dyn Predictor>,
    rewriter: Box<dyn Rewriter>,
    history_reconstructor: HistoryReconstructor,
    usage_stats: Arc<dyn UsageStats>,
    general_noun_id: u16,
}

impl Converter {
    /// Build a converter from constructed collaborators.
    pub fn new(
        modules: Modules,
        immutable_converter: Box<dyn LatticeDecoder>,
        predictor: Box<dyn Predictor>,
        rewriter: Box<dyn Rewriter>,
    ) -> Self {
        let general_noun_id = modules.pos_matcher.general_noun_id();
        let history_reconstructor = HistoryReconstructor::new(modules.pos_matcher);
        Self {
            modules,
            immutable_converter,
            predictor,
            rewriter,
            history_reconstructor,
            usage_stats: Arc::new(NullUsageStats),
            general_noun_id,
        }
    }

    /// Build a converter from factories so the collaborators can share the
    /// same `Modules` (and the predictor can see the decoder).
    pub fn with_factories(
        modules: Modules,
        immutable_converter_factory: impl FnOnce(&Modules) -> Box<dyn LatticeDecoder>,
        predictor_factory: impl FnOnce(&Modules, &dyn LatticeDecoder) -> Box<dyn Predictor>,
        rewriter_factory: impl FnOnce(&Modules) -> Box<dyn Rewriter>,
    ) -> Self {
        let immutable_converter = immutable_converter_factory(&modules);
        let predictor = predictor_factory(&modules, immutable_converter.as_ref());
        let rewriter = rewriter_factory(&modules);
        Self::new(modules, immutable_converter, predictor, rewriter)
    }

    /// Replace the usage-counter sink.
    pub fn with_usage_stats(mut self, sink: Arc<dyn UsageStats>) -> Self {
        self.usage_stats = sink;
        self
    }

    pub fn modules(&self) -> &Modules {
        &self.modules
    }

    pub fn predictor(&self) -> &dyn Predictor {
        self.predictor.as_ref()
    }

    pub fn rewriter(&self) -> &dyn Rewriter {
        self.rewriter.as_ref()
    }

    pub fn immutable_converter(&self) -> &dyn LatticeDecoder {
        self.immutable_converter.as_ref()
    }

    /// Start a conversion of `request.key()` from scratch.
    pub fn start_conversion(&self, request: &ConversionRequest, segments: &mut Segments) -> bool {
        if request.request_type() != RequestType::Conversion {
            return false;
        }
        let key = request.key();
        if key.is_empty() {
            return false;
        }

        set_key(segments, key);
        self.apply_conversion(request, segments);
        is_valid_segments(request, segments)
    }

    /// Start prediction or suggestion, partial variants included.
    pub fn start_prediction(&self, request: &ConversionRequest, segments: &mut Segments) -> bool {
        match request.request_type() {
            RequestType::Prediction | RequestType::Suggestion => {}
            RequestType::PartialPrediction | RequestType::PartialSuggestion => {
                // Applicable only while the cursor is strictly inside the
                // composition.
                let cursor = request.composer().cursor();
                if cursor == 0 || cursor >= request.composer().len() {
                    return false;
                }
            }
            _ => return false,
        }

        let key = request.key();
        if should_set_key_for_prediction(key, segments) {
            set_key(segments, key);
        }

        if !self.predictor.predict_for_request(request, segments) {
            // Prediction can fail for keys like "12". Rewriters (number,
            // variant, ...) can still populate candidates, so keep going.
            debug!(key, "predict_for_request found nothing");
        }
        self.rewrite_and_suppress_candidates(request, segments, 0);
        self.trim_candidates(request, segments);
        if matches!(
            request.request_type(),
            RequestType::PartialPrediction | RequestType::PartialSuggestion
        ) {
            // The first segment's key is the query string before the cursor,
            // e.g. "わた" for the composition "わた|しは". Submitting one of
            // these candidates must consume exactly that prefix, so every
            // candidate gets PARTIALLY_KEY_CONSUMED and the prefix length,
            // rewriter-made candidates included.
            let consumed = utils::char_len(key);
            if segments.conversion_segments_size() > 0 {
                maybe_set_consumed_key_size_to_segment(
                    consumed,
                    segments.conversion_segment_mut(0),
                );
            }
        }
        is_valid_segments(request, segments)
    }

    /// Convert a surface string back to its reading.
    pub fn start_reverse_conversion(&self, segments: &mut Segments, key: &str) -> bool {
        segments.clear();
        if key.is_empty() {
            return false;
        }
        set_key(segments, key);

        ReverseConverter::new(self.immutable_converter.as_ref()).reverse_convert(key, segments)
    }

    /// Commit the whole buffer: emit counters, learn, promote to history.
    pub fn finish_conversion(&self, request: &ConversionRequest, segments: &mut Segments) {
        self.commit_usage_stats(
            segments,
            segments.history_segments_size(),
            segments.conversion_segments_size(),
        );

        for i in 0..segments.segments_size() {
            let segment = segments.segment_mut(i);
            // SUBMITTED segments were created by submit-first-segment
            // operations; turn them into FIXED_VALUE so they can be learned.
            if segment.segment_type() == SegmentType::Submitted {
                segment.set_segment_type(SegmentType::FixedValue);
            }
            if segment.candidates_size() > 0 {
                self.complete_pos_ids(segment.candidate_mut(0));
            }
        }

        segments.clear_revert_entries();
        self.rewriter.finish(request, segments);
        self.predictor.finish(request, segments);

        // Evict the oldest segments; the remainder is retained as history.
        let evict = segments
            .segments_size()
            .saturating_sub(segments.max_history_segments_size());
        for _ in 0..evict {
            segments.pop_front_segment();
        }

        for segment in segments.iter_mut() {
            segment.set_segment_type(SegmentType::History);
        }
    }

    /// Drop the conversion suffix, keeping history.
    pub fn cancel_conversion(&self, segments: &mut Segments) {
        segments.clear_conversion_segments();
    }

    /// Drop everything, history included.
    pub fn reset_conversion(&self, segments: &mut Segments) {
        segments.clear();
    }

    /// Undo the learning of the latest finished conversion, if any.
    pub fn revert_conversion(&self, segments: &mut Segments) {
        if segments.revert_entries().is_empty() {
            return;
        }
        self.rewriter.revert(segments);
        self.predictor.revert(segments);
        segments.clear_revert_entries();
    }

    /// Remove the learned history entry behind a candidate. `segment_index`
    /// is absolute here; history segments are valid targets.
    pub fn delete_candidate_from_history(
        &self,
        segments: &Segments,
        segment_index: usize,
        candidate_index: i32,
    ) -> bool {
        if segment_index >= segments.segments_size() {
            return false;
        }
        let segment = segments.segment(segment_index);
        let Some(candidate) = segment.candidate_at(candidate_index) else {
            return false;
        };
        let mut result = false;
        result |= self
            .rewriter
            .clear_history_entry(segments, segment_index, candidate_index);
        result |= self
            .predictor
            .clear_history_entry(&candidate.key, &candidate.value);
        result
    }

    /// Clear the buffer and rebuild one history segment from the text
    /// preceding the composition.
    pub fn reconstruct_history(&self, segments: &mut Segments, preceding_text: &str) -> bool {
        segments.clear();
        self.history_reconstructor
            .reconstruct_history(preceding_text, segments)
    }

    fn commit_segment_value_internal(
        &self,
        segments: &mut Segments,
        segment_index: usize,
        candidate_index: i32,
        segment_type: SegmentType,
    ) -> bool {
        let Some(segment_index) = absolute_segment_index(segments, segment_index) else {
            return false;
        };

        let segment = segments.segment_mut(segment_index);
        let values_size = segment.candidates_size() as i32;
        if candidate_index < -(NUM_T13N_TYPES as i32) || candidate_index >= values_size {
            return false;
        }

        segment.set_segment_type(segment_type);
        if !segment.move_candidate(candidate_index, 0) {
            return false;
        }

        if candidate_index != 0 {
            segment.candidate_mut(0).attributes |= Candidate::RERANKED;
        }

        true
    }

    /// Fix the selected candidate of a conversion segment.
    pub fn commit_segment_value(
        &self,
        segments: &mut Segments,
        segment_index: usize,
        candidate_index: i32,
    ) -> bool {
        self.commit_segment_value_internal(
            segments,
            segment_index,
            candidate_index,
            SegmentType::FixedValue,
        )
    }

    /// Submit a candidate that consumes only part of the segment key, then
    /// open a fresh segment for the rest.
    pub fn commit_partial_suggestion_segment_value(
        &self,
        segments: &mut Segments,
        segment_index: usize,
        candidate_index: i32,
        current_segment_key: &str,
        new_segment_key: &str,
    ) -> bool {
        if segments.conversion_segments_size() == 0 {
            return false;
        }

        let Some(raw_segment_index) = absolute_segment_index(segments, segment_index) else {
            return false;
        };
        if !self.commit_segment_value_internal(
            segments,
            segment_index,
            candidate_index,
            SegmentType::Submitted,
        ) {
            return false;
        }
        self.commit_usage_stats(segments, raw_segment_index, 1);

        let segment = segments.segment_mut(raw_segment_index);
        let submitted_key_len = utils::char_len(&segment.candidate(0).key);
        let auto_partial_suggestion = submitted_key_len != utils::char_len(segment.key());
        segment.set_key(current_segment_key);

        let new_segment = segments.insert_segment(raw_segment_index + 1);
        new_segment.set_key(new_segment_key);

        if auto_partial_suggestion {
            self.usage_stats
                .increment_count(names::COMMIT_AUTO_PARTIAL_SUGGESTION);
        } else {
            self.usage_stats
                .increment_count(names::COMMIT_PARTIAL_SUGGESTION);
        }

        true
    }

    /// Tell the rewriter which candidate has focus so it can restyle
    /// neighbouring segments.
    pub fn focus_segment_value(
        &self,
        segments: &mut Segments,
        segment_index: usize,
        candidate_index: i32,
    ) -> bool {
        let Some(segment_index) = absolute_segment_index(segments, segment_index) else {
            return false;
        };
        self.rewriter.focus(segments, segment_index, candidate_index)
    }

    /// Submit the leading conversion segments, one candidate index each.
    /// Each sub-commit shifts the first conversion segment into the history
    /// prefix, so the relative index stays 0 throughout.
    pub fn commit_segments(&self, segments: &mut Segments, candidate_indices: &[i32]) -> bool {
        let conversion_segment_index = segments.history_segments_size();
        for &candidate_index in candidate_indices {
            if !self.commit_segment_value_internal(
                segments,
                0,
                candidate_index,
                SegmentType::Submitted,
            ) {
                return false;
            }
        }
        self.commit_usage_stats(segments, conversion_segment_index, candidate_indices.len());
        true
    }

    /// Grow or shrink one conversion segment by `offset_length` codepoints.
    pub fn resize_segment(
        &self,
        segments: &mut Segments,
        request: &ConversionRequest,
        segment_index: usize,
        offset_length: i32,
    ) -> bool {
        if request.request_type() != RequestType::Conversion {
            return false;
        }

        // invalid request
        if offset_length == 0 {
            return false;
        }

        if segment_index >= segments.conversion_segments_size() {
            return false;
        }

        let key = segments.conversion_segment(segment_index).key();
        if key.is_empty() {
            return false;
        }

        let key_len = utils::char_len(key) as i64;
        let new_size = key_len + offset_length as i64;
        if new_size <= 0 || new_size > u8::MAX as i64 {
            return false;
        }

        self.resize_segments(segments, request, segment_index, &[new_size as u8])
    }

    /// Re-segment the conversion suffix starting at `start_segment_index`
    /// into the given sizes (in key codepoints), pinning the new boundaries
    /// and re-decoding.
    pub fn resize_segments(
        &self,
        segments: &mut Segments,
        request: &ConversionRequest,
        start_segment_index: usize,
        new_size_array: &[u8],
    ) -> bool {
        self.resize_segments_internal(segments, request, start_segment_index, new_size_array, 1)
    }

    // `depth` is the recursion depth handed to the re-decode that follows the
    // boundary repair; at depth >= 1 the rewriter's resize request is no
    // longer consulted, which bounds the resize feedback loop to one round.
    fn resize_segments_internal(
        &self,
        segments: &mut Segments,
        request: &ConversionRequest,
        start_segment_index: usize,
        new_size_array: &[u8],
        depth: usize,
    ) -> bool {
        if request.request_type() != RequestType::Conversion {
            return false;
        }

        let Some(start_segment_index) = absolute_segment_index(segments, start_segment_index)
        else {
            return false;
        };

        let total_size: usize = new_size_array.iter().map(|&s| s as usize).sum();
        if total_size == 0 {
            return false;
        }

        // Collect the source key across as many segments as the new sizes
        // need.
        let mut key = String::new();
        let mut key_len = 0;
        let mut consumed_segments = 0;
        for segment in segments.iter().skip(start_segment_index) {
            key.push_str(segment.key());
            key_len += utils::char_len(segment.key());
            consumed_segments += 1;
            if key_len >= total_size {
                break;
            }
        }

        if key_len == 0 || key_len < total_size {
            return false;
        }

        let mut consumed = 0;
        let mut new_keys: Vec<String> = Vec::with_capacity(new_size_array.len());
        for &new_size in new_size_array {
            let new_size = new_size as usize;
            if new_size != 0 && consumed < key_len {
                new_keys.push(utils::utf8_substring(&key, consumed, new_size));
                consumed += new_size;
            }
        }

        segments.erase_segments(start_segment_index, consumed_segments);

        for (i, new_key) in new_keys.iter().enumerate() {
            let segment = segments.insert_segment(start_segment_index + i);
            segment.set_segment_type(SegmentType::FixedBoundary);
            segment.set_key(new_key.clone());
        }

        // Any remaining codepoints are prepended to the following segment,
        // which reverts to FREE; without a following segment they become a
        // fresh FREE segment.
        if consumed < key_len {
            let mut next_segment_key = utils::utf8_substring(&key, consumed, key_len - consumed);
            let next_segment_index = start_segment_index + new_keys.len();
            if next_segment_index < segments.segments_size() {
                next_segment_key.push_str(segments.segment(next_segment_index).key());
                segments.erase_segment(next_segment_index);
            }
            let segment = segments.insert_segment(next_segment_index);
            segment.set_segment_type(SegmentType::Free);
            segment.set_key(next_segment_key);
        }

        segments.set_resized(true);

        self.apply_conversion_internal(request, segments, depth);
        true
    }

    /// Run decoder, rewriters and suppression over an already prepared
    /// buffer. Unlike `start_conversion` this does not reset the key.
    pub fn apply_conversion(&self, request: &ConversionRequest, segments: &mut Segments) {
        self.apply_conversion_internal(request, segments, 0);
    }

    fn apply_conversion_internal(
        &self,
        request: &ConversionRequest,
        segments: &mut Segments,
        depth: usize,
    ) {
        if !self
            .immutable_converter
            .convert_for_request(request, segments)
        {
            // Conversion can fail for keys like "12". Rewriters (number,
            // variant, ...) can still populate candidates, so keep going.
            debug!(key = request.key(), "convert_for_request found nothing");
        }
        self.rewrite_and_suppress_candidates(request, segments, depth);
        self.trim_candidates(request, segments);
    }

    fn rewrite_and_suppress_candidates(
        &self,
        request: &ConversionRequest,
        segments: &mut Segments,
        depth: usize,
    ) {
        // 1. Resize the segments if the rewriter asks for it. A successful
        // resize re-enters this pipeline on the repaired buffer, so the outer
        // call must stop here or candidates would be rewritten twice. Only
        // consulted at depth 0.
        if depth == 0 {
            if let Some(resize_request) =
                self.rewriter.check_resize_segments_request(request, segments)
            {
                if self.resize_segments_internal(
                    segments,
                    request,
                    resize_request.segment_index,
                    &resize_request.segment_sizes,
                    depth + 1,
                ) {
                    return;
                }
            }
        }

        // 2. Rewrite candidates in each segment.
        if !self.rewriter.rewrite(request, segments) {
            return;
        }

        // 3. Suppress candidates. Most users have an empty suppression
        // dictionary, so the common case returns here.
        if self.modules.suppression_dictionary.is_empty() {
            return;
        }
        // The dictionary is applied at node level inside the decoder, but bad
        // words can still be assembled from multiple nodes or by rewriters,
        // so it is applied once more at the end.
        let suppression = &self.modules.suppression_dictionary;
        for segment in segments.conversion_segments_mut() {
            let mut j = 0;
            while j < segment.candidates_size() {
                let candidate = segment.candidate(j);
                if suppression.suppress_entry(&candidate.key, &candidate.value) {
                    segment.erase_candidate(j);
                } else {
                    j += 1;
                }
            }
        }
    }

    /// Cap each conversion segment's primary candidates to the client limit.
    /// Meta candidates are never trimmed.
    fn trim_candidates(&self, request: &ConversionRequest, segments: &mut Segments) {
        let Some(limit) = request.client().candidates_size_limit else {
            return;
        };

        for segment in segments.conversion_segments_mut() {
            let candidates_size = segment.candidates_size();
            // A segment keeps at least one candidate.
            let candidates_limit = 1.max(limit.saturating_sub(segment.meta_candidates_size()));
            if candidates_size < candidates_limit {
                continue;
            }
            segment.erase_candidates(candidates_limit, candidates_size - candidates_limit);
        }
    }

    // Counters for committed text. `begin_segment_index` is absolute.
    fn commit_usage_stats(
        &self,
        segments: &Segments,
        begin_segment_index: usize,
        segment_length: usize,
    ) {
        if segment_length == 0 {
            return;
        }
        if begin_segment_index + segment_length > segments.segments_size() {
            error!(
                segments_size = segments.segments_size(),
                required = begin_segment_index + segment_length,
                "invalid segment range for usage stats"
            );
            return;
        }

        // Timing values are scaled by 1,000 to keep sub-unit averages in an
        // integer histogram.
        let mut submitted_total_length: u64 = 0;
        for segment in segments
            .iter()
            .skip(begin_segment_index)
            .take(segment_length)
        {
            let Some(candidate) = segment.candidates().first() else {
                error!("committed segment without candidates");
                return;
            };
            let submitted_length = utils::char_len(&candidate.value) as u64;
            self.usage_stats
                .update_timing(names::SUBMITTED_SEGMENT_LENGTH, submitted_length * 1000);
            submitted_total_length += submitted_length;
        }

        self.usage_stats
            .update_timing(names::SUBMITTED_LENGTH, submitted_total_length * 1000);
        self.usage_stats
            .update_timing(names::SUBMITTED_SEGMENT_NUMBER, segment_length as u64 * 1000);
        self.usage_stats
            .increment_count_by(names::SUBMITTED_TOTAL_LENGTH, submitted_total_length);
    }

    // Complete left/right POS ids if they are not set. Users who commit a
    // directly typed reading never ran conversion, so the committed candidate
    // has no ids; estimate them by re-decoding the key and looking for the
    // same surface.
    fn complete_pos_ids(&self, candidate: &mut Candidate) {
        if candidate.value.is_empty() || candidate.key.is_empty() {
            return;
        }

        if candidate.lid != 0 && candidate.rid != 0 {
            return;
        }

        // General noun. Unknown words classified as sahen tend to attract
        // "する/して", which is not acceptable for non-sahen words.
        candidate.lid = self.general_noun_id;
        candidate.rid = self.general_noun_id;

        // Most users commit the top candidate, so the first narrow decode
        // usually resolves it; widen only when it does not.
        let mut size = POS_EXPAND_SIZE_START;
        while size < POS_EXPAND_SIZE_MAX {
            let mut segments = Segments::new();
            set_key(&mut segments, &candidate.key);
            // PREDICTION mode keeps the result to a single segment thanks to
            // realtime conversion.
            let request = ConversionRequest::new(
                Default::default(),
                Default::default(),
                RequestOptions {
                    request_type: RequestType::Prediction,
                    key: candidate.key.clone(),
                    max_conversion_candidates_size: size,
                    ..Default::default()
                },
            );
            if !self
                .immutable_converter
                .convert_for_request(&request, &mut segments)
            {
                error!("decoder failed during POS id completion");
                return;
            }
            for reference in segments.segment(0).candidates() {
                if reference.value == candidate.value {
                    candidate.lid = reference.lid;
                    candidate.rid = reference.rid;
                    candidate.cost = reference.cost;
                    candidate.wcost = reference.wcost;
                    candidate.structure_cost = reference.structure_cost;
                    return;
                }
            }
            size += POS_EXPAND_SIZE_DIFF;
        }
        debug!(
            key = %candidate.key,
            value = %candidate.value,
            "no POS ids found; keeping general noun defaults"
        );
    }

    /// Reload internal data (user dictionary and collaborator models).
    pub fn reload(&self) -> bool {
        if let Some(user_dictionary) = &self.modules.user_dictionary {
            user_dictionary.reload();
        }
        self.rewriter.reload() && self.predictor.reload()
    }

    /// Synchronize internal data to storage.
    pub fn sync(&self) -> bool {
        if let Some(user_dictionary) = &self.modules.user_dictionary {
            user_dictionary.sync();
        }
        self.rewriter.sync() && self.predictor.sync()
    }

    /// Wait for pending background work in the collaborators.
    pub fn wait(&self) -> bool {
        if let Some(user_dictionary) = &self.modules.user_dictionary {
            user_dictionary.wait_for_reloader();
        }
        self.predictor.wait()
    }
}
