//! Usage-counter sink.
//!
//! The orchestrator only emits named counters; where they go (metrics file,
//! nothing at all, a test recorder) is up to the sink implementation.

use std::collections::HashMap;
use std::sync::Mutex;

/// Counter names emitted by commit operations. Timing values are scaled by
/// 1,000 so integer histograms keep sub-unit averages.
pub mod names {
    pub const SUBMITTED_SEGMENT_LENGTH: &str = "SubmittedSegmentLengthx1000";
    pub const SUBMITTED_LENGTH: &str = "SubmittedLengthx1000";
    pub const SUBMITTED_SEGMENT_NUMBER: &str = "SubmittedSegmentNumberx1000";
    pub const SUBMITTED_TOTAL_LENGTH: &str = "SubmittedTotalLength";
    pub const COMMIT_PARTIAL_SUGGESTION: &str = "CommitPartialSuggestion";
    pub const COMMIT_AUTO_PARTIAL_SUGGESTION: &str = "CommitAutoPartialSuggestion";
}

/// Abstract sink for usage counters.
pub trait UsageStats: Send + Sync {
    /// Record one sample of a timing histogram.
    fn update_timing(&self, name: &str, value: u64);
    /// Increment an event counter by one.
    fn increment_count(&self, name: &str) {
        self.increment_count_by(name, 1);
    }
    /// Increment an event counter by `n`.
    fn increment_count_by(&self, name: &str, n: u64);
}

/// Sink that drops everything.
#[derive(Debug, Default)]
pub struct NullUsageStats;

impl UsageStats for NullUsageStats {
    fn update_timing(&self, _name: &str, _value: u64) {}
    fn increment_count_by(&self, _name: &str, _n: u64) {}
}

/// In-memory sink for tests and diagnostics.
#[derive(Debug, Default)]
pub struct RecordingUsageStats {
    timings: Mutex<HashMap<String, Vec<u64>>>,
    counts: Mutex<HashMap<String, u64>>,
}

impl RecordingUsageStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// All samples recorded for a timing histogram, in order.
    pub fn timings(&self, name: &str) -> Vec<u64> {
        self.timings
            .lock()
            .expect("stats lock")
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Sum of all samples recorded for a timing histogram.
    pub fn timing_total(&self, name: &str) -> u64 {
        self.timings(name).iter().sum()
    }

    pub fn count(&self, name: &str) -> u64 {
        self.counts
            .lock()
            .expect("stats lock")
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    pub fn reset(&self) {
        self.timings.lock().expect("stats lock").clear();
        self.counts.lock().expect("stats lock").clear();
    }
}

impl UsageStats for RecordingUsageStats {
    fn update_timing(&self, name: &str, value: u64) {
        self.timings
            .lock()
            .expect("stats lock")
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn increment_count_by(&self, name: &str, n: u64) {
        *self
            .counts
            .lock()
            .expect("stats lock")
            .entry(name.to_string())
            .or_default() += n;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_accumulates() {
        let stats = RecordingUsageStats::new();
        stats.update_timing(names::SUBMITTED_LENGTH, 3000);
        stats.update_timing(names::SUBMITTED_LENGTH, 5000);
        stats.increment_count(names::COMMIT_PARTIAL_SUGGESTION);
        stats.increment_count_by(names::SUBMITTED_TOTAL_LENGTH, 8);
        assert_eq!(stats.timings(names::SUBMITTED_LENGTH), vec![3000, 5000]);
        assert_eq!(stats.timing_total(names::SUBMITTED_LENGTH), 8000);
        assert_eq!(stats.count(names::COMMIT_PARTIAL_SUGGESTION), 1);
        assert_eq!(stats.count(names::SUBMITTED_TOTAL_LENGTH), 8);
    }
}
