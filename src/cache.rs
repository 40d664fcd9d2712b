//! Parsed-report cache for long-lived callers such as the tool server.
//!
//! Entries are keyed by canonical report path and its modification time, so
//! a rewritten report is re-parsed on the next lookup. The cache is bounded;
//! when full, the oldest insertion is evicted first. It is an ordinary value
//! owned by whoever needs it.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::debug;

use crate::detect;
use crate::error::Result;
use crate::model::FileTally;
use crate::parsers::lcov;

/// A parsed report and the metadata it was parsed from.
#[derive(Debug, Clone)]
pub struct CachedReport {
    pub path: PathBuf,
    pub modified: SystemTime,
    pub files: Arc<[FileTally]>,
}

#[derive(Debug)]
pub struct ReportCache {
    capacity: usize,
    entries: HashMap<PathBuf, CachedReport>,
    /// Insertion order, oldest first.
    order: VecDeque<PathBuf>,
    hits: u64,
    misses: u64,
}

impl ReportCache {
    /// A cache holding at most `capacity` reports; `0` disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (hits, misses) since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    /// Return the parsed report at `path`, parsing it only when it is not
    /// cached or its modification time changed.
    pub fn get_or_load(&mut self, path: &Path) -> Result<CachedReport> {
        let key = path.canonicalize()?;
        let modified = std::fs::metadata(&key)?.modified()?;

        if let Some(entry) = self.entries.get(&key) {
            if entry.modified == modified {
                self.hits += 1;
                debug!(path = %key.display(), "report cache hit");
                return Ok(entry.clone());
            }
        }

        self.misses += 1;
        let text = detect::read_report(&key)?;
        let report = CachedReport {
            path: key.clone(),
            modified,
            files: lcov::parse(&text).into(),
        };
        debug!(path = %key.display(), files = report.files.len(), "parsed report");
        self.insert(key, report.clone());
        Ok(report)
    }

    fn insert(&mut self, key: PathBuf, report: CachedReport) {
        if self.capacity == 0 {
            return;
        }
        // A stale entry for the same path is replaced in place and keeps its
        // queue position.
        if self.entries.insert(key.clone(), report).is_some() {
            return;
        }
        self.order.push_back(key);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                debug!(path = %oldest.display(), "evicting cached report");
                self.entries.remove(&oldest);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}
