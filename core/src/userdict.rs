//! Redb-backed user history store.
//!
//! Stores (reading, surface) pairs with commit frequencies. The predictor
//! learns into it on finish and unlearns on revert; the public API stays small
//! and test-friendly.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use redb::{Database, ReadOnlyTable, ReadableTable, TableDefinition};

const HISTORY_TABLE: TableDefinition<&str, u64> = TableDefinition::new("user_history");

// Composite key: reading and surface joined by a unit separator, which cannot
// appear in either part.
const PAIR_SEPARATOR: char = '\u{001F}';

fn pair_key(key: &str, value: &str) -> String {
    format!("{}{}{}", key, PAIR_SEPARATOR, value)
}

fn split_pair(raw: &str) -> Option<(String, String)> {
    let (k, v) = raw.split_once(PAIR_SEPARATOR)?;
    Some((k.to_string(), v.to_string()))
}

/// Metadata for user history storage format versioning and compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDictMetadata {
    pub version: String,
    pub entry_count: usize,
    pub total_frequency: u64,
}

/// User history store backed by `redb`. `UserDict::new()` creates a temp redb
/// file so tests can construct one without a path.
#[derive(Clone, Debug)]
pub struct UserDict {
    inner: Arc<RedbUserDict>,
}

impl Default for UserDict {
    fn default() -> Self {
        Self::new()
    }
}

impl UserDict {
    /// Create a redb-backed store in a temporary file.
    pub fn new() -> Self {
        let mut p = std::env::temp_dir();
        let now_nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let pid = std::process::id();
        p.push(format!("libjapanese_userdict_{}_{}.redb", pid, now_nanos));
        Self::open(p).expect("create temp redb for userdict")
    }

    /// Create/open a store at the given path.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self, redb::Error> {
        if let Some(dir) = path.as_ref().parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        let db = Database::create(path.as_ref())?;
        Ok(UserDict {
            inner: Arc::new(RedbUserDict {
                db,
                path: path.as_ref().to_path_buf(),
            }),
        })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.inner.path
    }

    /// Record one commit of (reading, surface).
    pub fn learn(&self, key: &str, value: &str) {
        let _ = self.inner.adjust(&pair_key(key, value), 1);
    }

    /// Undo one commit; the entry disappears when its count reaches zero.
    pub fn forget(&self, key: &str, value: &str) {
        let _ = self.inner.adjust(&pair_key(key, value), -1);
    }

    /// Drop the entry entirely. Returns whether it existed.
    pub fn remove(&self, key: &str, value: &str) -> bool {
        self.inner.remove(&pair_key(key, value)).unwrap_or(false)
    }

    /// Commit count for (reading, surface).
    pub fn frequency(&self, key: &str, value: &str) -> u64 {
        self.inner.frequency(&pair_key(key, value)).unwrap_or(0)
    }

    /// Entries whose reading starts with `prefix`, most frequent first,
    /// at most `limit`.
    pub fn lookup_prefix(&self, prefix: &str, limit: usize) -> Vec<(String, String, u64)> {
        let mut out: Vec<(String, String, u64)> = self
            .snapshot()
            .into_iter()
            .filter(|((k, _), _)| k.starts_with(prefix))
            .map(|((k, v), freq)| (k, v, freq))
            .collect();
        out.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
        out.truncate(limit);
        out
    }

    /// Snapshot full contents.
    pub fn snapshot(&self) -> HashMap<(String, String), u64> {
        self.inner.snapshot().unwrap_or_default()
    }

    pub fn metadata(&self) -> UserDictMetadata {
        let snapshot = self.snapshot();
        UserDictMetadata {
            version: "1.0".to_string(),
            entry_count: snapshot.len(),
            total_frequency: snapshot.values().sum(),
        }
    }

    /// Export metadata to a JSON file.
    pub fn export_metadata_json<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(&self.metadata())?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[derive(Debug)]
struct RedbUserDict {
    db: Database,
    path: PathBuf,
}

impl RedbUserDict {
    // The table only exists once something was learned; reads against a
    // fresh database must behave like an empty store, so every read funnels
    // through here.
    fn read_table<T>(
        &self,
        empty: T,
        read: impl FnOnce(ReadOnlyTable<&'static str, u64>) -> Result<T, redb::Error>,
    ) -> Result<T, redb::Error> {
        let txn = self.db.begin_read()?;
        match txn.open_table(HISTORY_TABLE) {
            Ok(table) => read(table),
            Err(redb::TableError::TableDoesNotExist(_)) => Ok(empty),
            Err(other) => Err(other.into()),
        }
    }

    fn adjust(&self, raw_key: &str, delta: i64) -> Result<(), redb::Error> {
        let cur = self.frequency(raw_key)?;
        let new = if delta >= 0 {
            cur.saturating_add(delta as u64)
        } else {
            cur.saturating_sub((-delta) as u64)
        };
        let w = self.db.begin_write()?;
        {
            let mut table = w.open_table(HISTORY_TABLE)?;
            if new == 0 {
                table.remove(raw_key)?;
            } else {
                table.insert(raw_key, new)?;
            }
        }
        w.commit()?;
        Ok(())
    }

    fn remove(&self, raw_key: &str) -> Result<bool, redb::Error> {
        let w = self.db.begin_write()?;
        let existed;
        {
            let mut table = w.open_table(HISTORY_TABLE)?;
            existed = table.remove(raw_key)?.is_some();
        }
        w.commit()?;
        Ok(existed)
    }

    fn frequency(&self, raw_key: &str) -> Result<u64, redb::Error> {
        self.read_table(0, |table| {
            Ok(table.get(raw_key)?.map(|freq| freq.value()).unwrap_or(0))
        })
    }

    fn snapshot(&self) -> Result<HashMap<(String, String), u64>, redb::Error> {
        self.read_table(HashMap::new(), |table| {
            let mut out = HashMap::new();
            for row in table.iter()? {
                let (raw, freq) = row?;
                if let Some(pair) = split_pair(raw.value()) {
                    out.insert(pair, freq.value());
                }
            }
            Ok(out)
        })
    }
}
