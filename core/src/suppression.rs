//! Blocklist of (reading, surface) pairs.
//!
//! The suppression dictionary is shared process-wide and consulted at the end
//! of the rewrite pipeline; the decoder may also consult it at node level, but
//! this pass catches strings assembled across nodes or added by rewriters.

use std::collections::HashSet;
use std::sync::RwLock;

use crate::SuppressedEntry;

/// Thread-safe set of blocked (reading, surface) pairs.
#[derive(Debug, Default)]
pub struct SuppressionDictionary {
    entries: RwLock<HashSet<(String, String)>>,
}

impl SuppressionDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the dictionary from configured entries.
    pub fn from_entries(entries: &[SuppressedEntry]) -> Self {
        let dict = Self::new();
        for e in entries {
            dict.add_entry(&e.key, &e.value);
        }
        dict
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("suppression lock").is_empty()
    }

    /// Whether the (reading, surface) pair is blocked.
    pub fn suppress_entry(&self, key: &str, value: &str) -> bool {
        self.entries
            .read()
            .expect("suppression lock")
            .contains(&(key.to_string(), value.to_string()))
    }

    pub fn add_entry(&self, key: &str, value: &str) {
        self.entries
            .write()
            .expect("suppression lock")
            .insert((key.to_string(), value.to_string()));
    }

    pub fn remove_entry(&self, key: &str, value: &str) -> bool {
        self.entries
            .write()
            .expect("suppression lock")
            .remove(&(key.to_string(), value.to_string()))
    }

    pub fn clear(&self) {
        self.entries.write().expect("suppression lock").clear();
    }
}
