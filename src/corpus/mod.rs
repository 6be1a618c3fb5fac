//! Run corpus: the date-keyed collection of ingested run batches.
//!
//! The loader produces one batch per log file, keyed by the file's
//! `/`-joined path relative to the log root (which is date-structured, e.g.
//! `2024/05/12.log`). Bucketing collapses that mapping to a coarser key
//! granularity by concatenating batches sharing a key prefix; level 0 yields
//! one flat list.

mod cache;
mod loader;

pub use cache::{load_cache, save_cache};
pub use loader::load_directory;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Run;

/// Errors that can occur while loading or caching the corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache serialization error: {0}")]
    Cache(#[from] bincode::Error),

    #[error("log directory not found: {0}")]
    MissingDirectory(PathBuf),
}

/// All ingested runs, keyed by date-structured batch path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunCorpus {
    pub batches: BTreeMap<String, Vec<Run>>,
}

impl RunCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch under a key, extending any existing batch.
    pub fn insert_batch(&mut self, key: impl Into<String>, runs: Vec<Run>) {
        self.batches.entry(key.into()).or_default().extend(runs);
    }

    /// Key-wise concatenation of another corpus into this one.
    pub fn merge(&mut self, other: RunCorpus) {
        for (key, runs) in other.batches {
            self.batches.entry(key).or_default().extend(runs);
        }
    }

    /// Collapse keys to their first `level` `/`-separated segments, merging
    /// the run lists of keys that share the prefix. No records are dropped
    /// or duplicated; level 0 leaves a single batch under the empty key.
    pub fn bucket(&self, level: usize) -> RunCorpus {
        let mut merged = RunCorpus::new();
        for (key, runs) in &self.batches {
            let rounded: String = key
                .split('/')
                .take(level)
                .collect::<Vec<_>>()
                .join("/");
            merged.insert_batch(rounded, runs.clone());
        }
        merged
    }

    /// Flatten every batch into one run list.
    pub fn into_runs(self) -> Vec<Run> {
        self.batches.into_values().flatten().collect()
    }

    /// Total run count across all batches.
    pub fn total_runs(&self) -> usize {
        self.batches.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_runs() == 0
    }
}
