//! Prediction and suggestion flows, the rewrite/suppress/trim pipeline and
//! partial-key consumption.

mod common;

use libjapanese_core::{
    Candidate, ClientRequest, ComposerData, ConversionRequest, Modules, RequestOptions,
    RequestType, Segments, SuppressionDictionary, NUM_T13N_TYPES,
};
use std::sync::Arc;

fn prediction_request(request_type: RequestType, key: &str) -> ConversionRequest {
    ConversionRequest::with_type_and_key(request_type, key)
}

#[test]
fn suggestion_then_prediction_keeps_the_segment() {
    let t = common::test_converter("tab_expansion");
    let mut segments = Segments::new();

    assert!(t.converter.start_prediction(
        &prediction_request(RequestType::Suggestion, "あ"),
        &mut segments
    ));
    assert_eq!(segments.conversion_segments_size(), 1);
    let first_run: Vec<String> = segments
        .conversion_segment(0)
        .candidates()
        .iter()
        .map(|c| c.value.clone())
        .collect();
    assert!(!first_run.is_empty());

    // Same key, prediction: the candidate list is extended, not cleared.
    assert!(t.converter.start_prediction(
        &prediction_request(RequestType::Prediction, "あ"),
        &mut segments
    ));
    assert_eq!(segments.conversion_segment(0).key(), "あ");
    let second_run: Vec<String> = segments
        .conversion_segment(0)
        .candidates()
        .iter()
        .map(|c| c.value.clone())
        .collect();
    assert!(second_run.starts_with(&first_run[..]));

    // Different key resets the segment.
    assert!(t.converter.start_prediction(
        &prediction_request(RequestType::Prediction, "あい"),
        &mut segments
    ));
    assert_eq!(segments.conversion_segment(0).key(), "あい");
}

#[test]
fn prediction_rejects_conversion_requests() {
    let t = common::test_converter("predict_type");
    let mut segments = Segments::new();
    assert!(!t.converter.start_prediction(
        &prediction_request(RequestType::Conversion, "あ"),
        &mut segments
    ));
}

#[test]
fn partial_prediction_requires_cursor_strictly_inside() {
    let t = common::test_converter("partial_guard");

    for cursor in [0, 4] {
        let composer = ComposerData::with_cursor("わたしは", "", cursor);
        let request = ConversionRequest::new(
            composer,
            ClientRequest::default(),
            RequestOptions {
                request_type: RequestType::PartialPrediction,
                ..Default::default()
            },
        );
        let mut segments = Segments::new();
        assert!(
            !t.converter.start_prediction(&request, &mut segments),
            "cursor {} must fail",
            cursor
        );
        assert!(segments.is_empty());
    }
}

#[test]
fn partial_prediction_marks_consumed_key_size() {
    let t = common::test_converter("partial_consume");
    let composer = ComposerData::with_cursor("わたしは", "", 3);
    let request = ConversionRequest::new(
        composer,
        ClientRequest::default(),
        RequestOptions {
            request_type: RequestType::PartialSuggestion,
            ..Default::default()
        },
    );
    let mut segments = Segments::new();
    assert!(t.converter.start_prediction(&request, &mut segments));

    let segment = segments.conversion_segment(0);
    assert_eq!(segment.key(), "わたし");
    assert!(segment.candidates_size() > 0);
    for candidate in segment.candidates() {
        assert!(candidate.has_attribute(Candidate::PARTIALLY_KEY_CONSUMED));
        assert_eq!(candidate.consumed_key_size, 3);
    }
    // Rewriter-made meta candidates are marked as well.
    for i in 0..segment.meta_candidates_size() {
        let meta = segment.meta_candidate(i);
        assert!(meta.has_attribute(Candidate::PARTIALLY_KEY_CONSUMED));
        assert_eq!(meta.consumed_key_size, 3);
    }
}

#[test]
fn prediction_for_numeric_key_comes_from_rewriters() {
    let t = common::test_converter("numeric");
    // "12" finds nothing in the lexicon or history; the transliteration
    // rewriter still contributes meta candidates, which is enough for a
    // mobile client.
    let request = ConversionRequest::new(
        ComposerData::default(),
        ClientRequest {
            zero_query_suggestion: true,
            mixed_conversion: true,
            ..Default::default()
        },
        RequestOptions {
            request_type: RequestType::Suggestion,
            key: "12".to_string(),
            ..Default::default()
        },
    );
    let mut segments = Segments::new();
    assert!(t.converter.start_prediction(&request, &mut segments));
    let segment = segments.conversion_segment(0);
    assert_eq!(segment.candidates_size(), 0);
    assert_eq!(segment.meta_candidates_size(), NUM_T13N_TYPES);
    assert!(segment
        .meta_candidates()
        .iter()
        .any(|c| c.value == "１２"));
}

#[test]
fn desktop_client_needs_primary_candidates() {
    let t = common::test_converter("numeric_desktop");
    // Same numeric key, but a desktop client: meta candidates alone do not
    // satisfy the result invariant.
    let mut segments = Segments::new();
    assert!(!t.converter.start_prediction(
        &prediction_request(RequestType::Suggestion, "12"),
        &mut segments
    ));
}

#[test]
fn suppression_removes_blocked_pairs() {
    let suppression = SuppressionDictionary::new();
    suppression.add_entry("あい", "愛");
    let modules = Modules {
        suppression_dictionary: Arc::new(suppression),
        ..Modules::new()
    };
    let t = common::test_converter_with_modules("suppression", modules);

    let request = ConversionRequest::with_type_and_key(RequestType::Conversion, "あい");
    let mut segments = Segments::new();
    assert!(t.converter.start_conversion(&request, &mut segments));

    let segment = segments.conversion_segment(0);
    assert!(segment.candidates().iter().all(|c| c.value != "愛"));
    assert_eq!(segment.candidate(0).value, "亜胃");
}

#[test]
fn trim_caps_primary_candidates_but_not_meta() {
    let t = common::test_converter("trim");
    let request = ConversionRequest::new(
        ComposerData::default(),
        ClientRequest {
            // With five meta candidates this leaves room for exactly one
            // primary candidate.
            candidates_size_limit: Some(6),
            ..Default::default()
        },
        RequestOptions {
            request_type: RequestType::Conversion,
            key: "あい".to_string(),
            ..Default::default()
        },
    );
    let mut segments = Segments::new();
    assert!(t.converter.start_conversion(&request, &mut segments));

    let segment = segments.conversion_segment(0);
    assert_eq!(segment.candidates_size(), 1);
    assert_eq!(segment.meta_candidates_size(), NUM_T13N_TYPES);
}

#[test]
fn zero_query_suggestion_serves_user_history() {
    let t = common::test_converter("zero_query");
    t.userdict.learn("あい", "愛");
    t.userdict.learn("あい", "愛");

    let request = ConversionRequest::new(
        ComposerData::default(),
        ClientRequest {
            zero_query_suggestion: true,
            mixed_conversion: true,
            ..Default::default()
        },
        RequestOptions {
            request_type: RequestType::Suggestion,
            key: String::new(),
            ..Default::default()
        },
    );
    let mut segments = Segments::new();
    assert!(t.converter.start_prediction(&request, &mut segments));
    let segment = segments.conversion_segment(0);
    assert!(segment
        .candidates()
        .iter()
        .any(|c| c.value == "愛" && c.has_attribute(Candidate::USER_HISTORY)));
}
