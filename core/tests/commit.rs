//! Commit operations: reranking, multi-commit, partial commit, finish,
//! revert and the emitted usage counters.

mod common;

use libjapanese_core::stats::names;
use libjapanese_core::{
    Candidate, ConversionRequest, RequestType, SegmentType, Segments,
};

fn conversion_request(key: &str) -> ConversionRequest {
    ConversionRequest::with_type_and_key(RequestType::Conversion, key)
}

fn add_segment_with_values(segments: &mut Segments, key: &str, values: &[(&str, &str)]) {
    let segment = segments.add_segment();
    segment.set_key(key);
    for (candidate_key, value) in values {
        let candidate = segment.add_candidate();
        candidate.key = candidate_key.to_string();
        candidate.content_key = candidate_key.to_string();
        candidate.value = value.to_string();
        candidate.content_value = value.to_string();
    }
}

#[test]
fn commit_segment_value_moves_and_marks() {
    let t = common::test_converter("commit_value");
    let mut segments = Segments::new();
    add_segment_with_values(&mut segments, "", &[("", "1"), ("", "2")]);
    add_segment_with_values(&mut segments, "", &[("", "3"), ("", "4")]);

    // Commit the candidate whose value is "2".
    assert!(t.converter.commit_segment_value(&mut segments, 0, 1));
    assert_eq!(segments.segments_size(), 2);
    assert_eq!(segments.history_segments_size(), 0);
    assert_eq!(segments.conversion_segments_size(), 2);
    {
        let segment = segments.conversion_segment(0);
        assert_eq!(segment.segment_type(), SegmentType::FixedValue);
        assert_eq!(segment.candidate(0).value, "2");
        assert!(segment.candidate(0).has_attribute(Candidate::RERANKED));
    }

    // Submitting the first segment shifts it into the history prefix, so the
    // relative index 0 now addresses the second segment.
    segments
        .conversion_segment_mut(0)
        .set_segment_type(SegmentType::Submitted);
    assert_eq!(segments.history_segments_size(), 1);
    assert_eq!(segments.conversion_segments_size(), 1);

    assert!(t.converter.commit_segment_value(&mut segments, 0, 0));
    {
        let segment = segments.conversion_segment(0);
        assert_eq!(segment.segment_type(), SegmentType::FixedValue);
        assert_eq!(segment.candidate(0).value, "3");
        // Index 0 does not rerank.
        assert!(!segment.candidate(0).has_attribute(Candidate::RERANKED));
    }
}

#[test]
fn commit_segment_value_rejects_bad_indices() {
    let t = common::test_converter("commit_bad");
    let mut segments = Segments::new();
    add_segment_with_values(&mut segments, "", &[("", "1")]);

    assert!(!t.converter.commit_segment_value(&mut segments, 1, 0));
    assert!(!t.converter.commit_segment_value(&mut segments, 0, 1));
    assert!(!t.converter.commit_segment_value(&mut segments, 0, -6));
}

#[test]
fn commit_meta_candidate_by_negative_index() {
    let t = common::test_converter("commit_meta");
    let mut segments = Segments::new();
    let request = conversion_request("あい");
    assert!(t.converter.start_conversion(&request, &mut segments));

    // -2 is the full-katakana transliteration.
    assert!(t.converter.commit_segment_value(&mut segments, 0, -2));
    let segment = segments.conversion_segment(0);
    assert_eq!(segment.candidate(0).value, "アイ");
    assert!(segment.candidate(0).has_attribute(Candidate::RERANKED));
}

#[test]
fn commit_segments_emits_aggregate_counters() {
    let t = common::test_converter("commit_multi");
    let mut segments = Segments::new();

    // History segment.
    add_segment_with_values(&mut segments, "あした", &[("あした", "今日")]);
    segments
        .segment_mut(0)
        .set_segment_type(SegmentType::History);

    add_segment_with_values(&mut segments, "かつこうに", &[("がっこうに", "学校に")]);
    add_segment_with_values(&mut segments, "いく", &[("いく", "行く")]);

    // Commit the first conversion segment only.
    assert!(t.converter.commit_segments(&mut segments, &[0]));
    assert_eq!(segments.history_segments_size(), 2);
    assert_eq!(segments.conversion_segments_size(), 1);
    assert_eq!(
        segments.history_segment(0).segment_type(),
        SegmentType::History
    );
    assert_eq!(
        segments.history_segment(1).segment_type(),
        SegmentType::Submitted
    );
    assert_eq!(t.stats.timings(names::SUBMITTED_SEGMENT_LENGTH), vec![3000]);
    assert_eq!(t.stats.timings(names::SUBMITTED_LENGTH), vec![3000]);
    assert_eq!(t.stats.timings(names::SUBMITTED_SEGMENT_NUMBER), vec![1000]);
    assert_eq!(t.stats.count(names::SUBMITTED_TOTAL_LENGTH), 3);

    // Reset and commit the two remaining segments in one call.
    segments
        .segment_mut(1)
        .set_segment_type(SegmentType::Free);
    assert!(t.converter.commit_segments(&mut segments, &[0, 0]));
    assert_eq!(segments.history_segments_size(), 3);
    assert_eq!(segments.conversion_segments_size(), 0);
    assert_eq!(
        segments.history_segment(2).segment_type(),
        SegmentType::Submitted
    );

    assert_eq!(t.stats.timing_total(names::SUBMITTED_SEGMENT_LENGTH), 8000);
    assert_eq!(t.stats.timings(names::SUBMITTED_LENGTH), vec![3000, 5000]);
    assert_eq!(
        t.stats.timings(names::SUBMITTED_SEGMENT_NUMBER),
        vec![1000, 2000]
    );
    assert_eq!(t.stats.count(names::SUBMITTED_TOTAL_LENGTH), 8);
}

#[test]
fn commit_segments_aborts_on_first_failure() {
    let t = common::test_converter("commit_abort");
    let mut segments = Segments::new();
    add_segment_with_values(&mut segments, "あ", &[("あ", "亜")]);

    // Second index has no segment to commit.
    assert!(!t.converter.commit_segments(&mut segments, &[0, 0]));
    // The first commit stays in place.
    assert_eq!(segments.history_segments_size(), 1);
    // The aborted call emits no aggregate counters.
    assert!(t.stats.timings(names::SUBMITTED_SEGMENT_NUMBER).is_empty());
}

#[test]
fn commit_partial_suggestion_splits_the_segment() {
    let t = common::test_converter("commit_partial");
    let mut segments = Segments::new();
    add_segment_with_values(&mut segments, "", &[("", "1"), ("", "2")]);
    add_segment_with_values(&mut segments, "", &[("", "3"), ("", "4")]);

    assert!(t.converter.commit_partial_suggestion_segment_value(
        &mut segments,
        0,
        1,
        "left2",
        "right2"
    ));
    assert_eq!(segments.segments_size(), 3);
    assert_eq!(segments.history_segments_size(), 1);
    assert_eq!(segments.conversion_segments_size(), 2);
    {
        // The submitted segment keeps the chosen value under the rewritten
        // key.
        let segment = segments.history_segment(0);
        assert_eq!(segment.segment_type(), SegmentType::Submitted);
        assert_eq!(segment.candidate(0).value, "2");
        assert_eq!(segment.key(), "left2");
        assert!(segment.candidate(0).has_attribute(Candidate::RERANKED));
    }
    {
        // The rest of the reading goes on as a fresh free segment.
        let segment = segments.conversion_segment(0);
        assert_eq!(segment.segment_type(), SegmentType::Free);
        assert_eq!(segment.key(), "right2");
    }
    // Candidate key length equals the (empty) segment key length, so this was
    // not an automatic partial suggestion.
    assert_eq!(t.stats.count(names::COMMIT_PARTIAL_SUGGESTION), 1);
    assert_eq!(t.stats.count(names::COMMIT_AUTO_PARTIAL_SUGGESTION), 0);
}

#[test]
fn commit_partial_suggestion_detects_auto_commit() {
    let t = common::test_converter("commit_auto_partial");
    let mut segments = Segments::new();
    // The candidate consumes only "あ" of the two-codepoint key.
    add_segment_with_values(&mut segments, "あい", &[("あ", "亜")]);

    assert!(t.converter.commit_partial_suggestion_segment_value(
        &mut segments,
        0,
        0,
        "あ",
        "い"
    ));
    assert_eq!(t.stats.count(names::COMMIT_AUTO_PARTIAL_SUGGESTION), 1);
    assert_eq!(segments.history_segment(0).key(), "あ");
    assert_eq!(segments.conversion_segment(0).key(), "い");
}

#[test]
fn commit_partial_suggestion_requires_conversion_segments() {
    let t = common::test_converter("commit_partial_empty");
    let mut segments = Segments::new();
    assert!(!t.converter.commit_partial_suggestion_segment_value(
        &mut segments,
        0,
        0,
        "あ",
        "い"
    ));
}

#[test]
fn finish_promotes_to_history_and_learns() {
    let t = common::test_converter("finish");
    let request = conversion_request("あい");
    let mut segments = Segments::new();
    assert!(t.converter.start_conversion(&request, &mut segments));
    assert!(t.converter.resize_segment(&mut segments, &request, 0, -1));
    assert!(t.converter.commit_segment_value(&mut segments, 0, 0));

    t.converter.finish_conversion(&request, &mut segments);

    assert_eq!(segments.history_segments_size(), 2);
    assert_eq!(segments.conversion_segments_size(), 0);
    for segment in segments.iter() {
        assert_eq!(segment.segment_type(), SegmentType::History);
    }
    assert!(segments.history_segments_size() <= segments.max_history_segments_size());
    // One sample covering both submitted segments.
    assert_eq!(t.stats.timings(names::SUBMITTED_SEGMENT_NUMBER), vec![2000]);
    // The committed first segment was learned for prediction.
    assert_eq!(t.userdict.frequency("あ", "亜"), 1);
}

#[test]
fn finish_evicts_oldest_history() {
    let t = common::test_converter("finish_evict");
    let request = conversion_request("あ");
    let mut segments = Segments::new();

    for _ in 0..6 {
        assert!(t.converter.start_conversion(&request, &mut segments));
        t.converter.finish_conversion(&request, &mut segments);
    }
    assert_eq!(segments.segments_size(), 4);
    assert_eq!(segments.history_segments_size(), 4);
}

#[test]
fn revert_undoes_learning_once() {
    let t = common::test_converter("revert");
    let request = conversion_request("あい");
    let mut segments = Segments::new();
    assert!(t.converter.start_conversion(&request, &mut segments));
    assert!(t.converter.commit_segment_value(&mut segments, 0, 0));
    t.converter.finish_conversion(&request, &mut segments);

    assert_eq!(t.userdict.frequency("あい", "愛"), 1);
    assert!(!segments.revert_entries().is_empty());

    t.converter.revert_conversion(&mut segments);
    assert_eq!(t.userdict.frequency("あい", "愛"), 0);
    assert!(segments.revert_entries().is_empty());

    // A second revert is a no-op.
    t.converter.revert_conversion(&mut segments);
    assert_eq!(t.userdict.frequency("あい", "愛"), 0);
}

#[test]
fn cancel_keeps_history_reset_drops_it() {
    let t = common::test_converter("cancel_reset");
    let request = conversion_request("あい");
    let mut segments = Segments::new();
    assert!(t.converter.start_conversion(&request, &mut segments));
    t.converter.finish_conversion(&request, &mut segments);
    assert!(t.converter.start_conversion(&request, &mut segments));

    t.converter.cancel_conversion(&mut segments);
    assert_eq!(segments.conversion_segments_size(), 0);
    assert_eq!(segments.history_segments_size(), 1);

    t.converter.reset_conversion(&mut segments);
    assert!(segments.is_empty());
}

#[test]
fn delete_candidate_from_history_clears_learning() {
    let t = common::test_converter("delete_history");
    let request = conversion_request("あい");
    let mut segments = Segments::new();
    assert!(t.converter.start_conversion(&request, &mut segments));
    assert!(t.converter.commit_segment_value(&mut segments, 0, 0));
    t.converter.finish_conversion(&request, &mut segments);
    assert_eq!(t.userdict.frequency("あい", "愛"), 1);

    // The promoted history segment still carries the committed candidate.
    assert!(t.converter.delete_candidate_from_history(&segments, 0, 0));
    assert_eq!(t.userdict.frequency("あい", "愛"), 0);

    // Out-of-range indices are rejected.
    assert!(!t.converter.delete_candidate_from_history(&segments, 9, 0));
    assert!(!t.converter.delete_candidate_from_history(&segments, 0, 99));
}
