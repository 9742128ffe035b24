//! Candidate post-processing seam.
//!
//! Rewriters run after the decoder (and after the predictor) and may reorder,
//! annotate or augment candidates. A rewriter may also ask the orchestrator to
//! re-segment the buffer before rewriting; see
//! `Rewriter::check_resize_segments_request`.

use crate::request::ConversionRequest;
use crate::segments::Segments;
use crate::t13n;

/// A rewriter's request to re-segment the conversion suffix before rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeSegmentsRequest {
    /// First conversion segment to resize (conversion-relative).
    pub segment_index: usize,
    /// New segment sizes in key codepoints.
    pub segment_sizes: Vec<u8>,
}

/// Post-processor over the conversion buffer.
///
/// A rewriter must not request a resize for a buffer that was already resized;
/// the orchestrator additionally honors at most one resize per operation.
pub trait Rewriter: Send + Sync {
    /// Rewrite candidates in place. Returning false means "no changes, no
    /// further processing needed" and skips the suppression pass.
    fn rewrite(&self, request: &ConversionRequest, segments: &mut Segments) -> bool;

    /// Ask whether the buffer should be re-segmented before rewriting.
    fn check_resize_segments_request(
        &self,
        _request: &ConversionRequest,
        _segments: &Segments,
    ) -> Option<ResizeSegmentsRequest> {
        None
    }

    /// Focus moved to (segment, candidate); adjacent-segment-aware rewriters
    /// restyle neighbours here. `segment_index` is absolute.
    fn focus(&self, _segments: &mut Segments, _segment_index: usize, _candidate_index: i32) -> bool {
        true
    }

    /// Remove a learned entry backing the addressed candidate.
    fn clear_history_entry(
        &self,
        _segments: &Segments,
        _segment_index: usize,
        _candidate_index: i32,
    ) -> bool {
        false
    }

    /// The conversion was finished; learn from the committed result.
    fn finish(&self, _request: &ConversionRequest, _segments: &mut Segments) {}

    /// Undo the learning of the latest finished conversion.
    fn revert(&self, _segments: &mut Segments) {}

    fn sync(&self) -> bool {
        true
    }

    fn reload(&self) -> bool {
        true
    }
}

/// Fills each conversion segment's meta-candidate list with transliteration
/// variants of its key.
///
/// Skipped under `skip_slow_rewriters` like the other expansion rewriters.
#[derive(Debug, Default)]
pub struct TransliterationRewriter;

impl TransliterationRewriter {
    pub fn new() -> Self {
        Self
    }
}

impl Rewriter for TransliterationRewriter {
    fn rewrite(&self, request: &ConversionRequest, segments: &mut Segments) -> bool {
        if request.skip_slow_rewriters() {
            return false;
        }
        let mut modified = false;
        for segment in segments.conversion_segments_mut() {
            if segment.key().is_empty() {
                continue;
            }
            let variants = t13n::expand(segment.key());
            segment.set_transliterations(variants);
            modified = true;
        }
        modified
    }
}
