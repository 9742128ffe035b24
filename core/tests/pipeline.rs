//! Rewriter-driven pipeline behavior: the resize feedback loop and its
//! recursion bound, focus forwarding, and the collaborator control surface.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use libjapanese_core::lexicon::LexiconDecoder;
use libjapanese_core::{
    ConversionRequest, Converter, DictionaryPredictor, Modules, RequestType, ResizeSegmentsRequest,
    Rewriter, SegmentType, Segments,
};

/// Rewriter that always asks to split the buffer into single-codepoint
/// segments. A correct orchestrator honors it exactly once per operation.
struct GreedyResizeRewriter {
    resize_checks: AtomicUsize,
    rewrites: AtomicUsize,
}

impl GreedyResizeRewriter {
    fn new() -> Self {
        Self {
            resize_checks: AtomicUsize::new(0),
            rewrites: AtomicUsize::new(0),
        }
    }
}

impl Rewriter for GreedyResizeRewriter {
    fn rewrite(&self, _: &ConversionRequest, _: &mut Segments) -> bool {
        self.rewrites.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn check_resize_segments_request(
        &self,
        _: &ConversionRequest,
        segments: &Segments,
    ) -> Option<ResizeSegmentsRequest> {
        self.resize_checks.fetch_add(1, Ordering::SeqCst);
        let key_len: usize = segments
            .conversion_segments()
            .iter()
            .map(|s| s.key().chars().count())
            .sum();
        if key_len < 2 {
            return None;
        }
        Some(ResizeSegmentsRequest {
            segment_index: 0,
            segment_sizes: vec![1; key_len],
        })
    }
}

fn converter_with_rewriter(rewriter: Arc<GreedyResizeRewriter>) -> Converter {
    struct Forward(Arc<GreedyResizeRewriter>);
    impl Rewriter for Forward {
        fn rewrite(&self, request: &ConversionRequest, segments: &mut Segments) -> bool {
            self.0.rewrite(request, segments)
        }
        fn check_resize_segments_request(
            &self,
            request: &ConversionRequest,
            segments: &Segments,
        ) -> Option<ResizeSegmentsRequest> {
            self.0.check_resize_segments_request(request, segments)
        }
    }

    let lexicon = common::toy_lexicon();
    let userdict = common::temp_userdict("pipeline");
    Converter::new(
        Modules::new(),
        Box::new(LexiconDecoder::new(lexicon.clone())),
        Box::new(DictionaryPredictor::new(lexicon, userdict)),
        Box::new(Forward(rewriter)),
    )
}

#[test]
fn rewriter_resize_request_is_honored_once() {
    let rewriter = Arc::new(GreedyResizeRewriter::new());
    let converter = converter_with_rewriter(rewriter.clone());

    let request = ConversionRequest::with_type_and_key(RequestType::Conversion, "あい");
    let mut segments = Segments::new();
    assert!(converter.start_conversion(&request, &mut segments));

    // The buffer was re-segmented as requested, with pinned boundaries.
    assert!(segments.resized());
    assert_eq!(segments.conversion_segments_size(), 2);
    assert_eq!(segments.conversion_segment(0).key(), "あ");
    assert_eq!(segments.conversion_segment(1).key(), "い");
    assert_eq!(
        segments.conversion_segment(0).segment_type(),
        SegmentType::FixedBoundary
    );

    // Even though the rewriter asks for a resize on every check, the nested
    // pipeline does not consult it again: one check, one rewrite.
    assert_eq!(rewriter.resize_checks.load(Ordering::SeqCst), 1);
    assert_eq!(rewriter.rewrites.load(Ordering::SeqCst), 1);
}

#[test]
fn focus_translates_the_segment_index() {
    struct FocusRecorder(AtomicUsize, AtomicUsize);
    impl Rewriter for FocusRecorder {
        fn rewrite(&self, _: &ConversionRequest, _: &mut Segments) -> bool {
            false
        }
        fn focus(&self, _: &mut Segments, segment_index: usize, _: i32) -> bool {
            self.0.store(segment_index, Ordering::SeqCst);
            self.1.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    let recorder = Arc::new(FocusRecorder(AtomicUsize::new(0), AtomicUsize::new(0)));
    struct Forward(Arc<FocusRecorder>);
    impl Rewriter for Forward {
        fn rewrite(&self, r: &ConversionRequest, s: &mut Segments) -> bool {
            self.0.rewrite(r, s)
        }
        fn focus(&self, s: &mut Segments, i: usize, c: i32) -> bool {
            self.0.focus(s, i, c)
        }
    }

    let lexicon = common::toy_lexicon();
    let converter = Converter::new(
        Modules::new(),
        Box::new(LexiconDecoder::new(lexicon.clone())),
        Box::new(DictionaryPredictor::new(
            lexicon,
            common::temp_userdict("focus"),
        )),
        Box::new(Forward(recorder.clone())),
    );

    let mut segments = Segments::new();
    segments.add_segment().set_segment_type(SegmentType::History);
    let segment = segments.add_segment();
    segment.set_key("あ");
    segment.add_candidate().value = "亜".to_string();

    // Conversion-relative 0 is absolute 1 behind one history segment.
    assert!(converter.focus_segment_value(&mut segments, 0, 0));
    assert_eq!(recorder.0.load(Ordering::SeqCst), 1);

    // Out of range.
    assert!(!converter.focus_segment_value(&mut segments, 3, 0));
    assert_eq!(recorder.1.load(Ordering::SeqCst), 1);
}

#[test]
fn reload_sync_wait_combine_collaborator_results() {
    let t = common::test_converter("control");
    assert!(t.converter.reload());
    assert!(t.converter.sync());
    assert!(t.converter.wait());
}

#[test]
fn failing_collaborator_fails_the_control_call() {
    struct FailingRewriter;
    impl Rewriter for FailingRewriter {
        fn rewrite(&self, _: &ConversionRequest, _: &mut Segments) -> bool {
            false
        }
        fn reload(&self) -> bool {
            false
        }
    }

    let lexicon = common::toy_lexicon();
    let converter = Converter::new(
        Modules::new(),
        Box::new(LexiconDecoder::new(lexicon.clone())),
        Box::new(DictionaryPredictor::new(
            lexicon,
            common::temp_userdict("failing_reload"),
        )),
        Box::new(FailingRewriter),
    );
    assert!(!converter.reload());
    assert!(converter.sync());
}
