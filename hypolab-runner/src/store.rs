//! JSONL append-only store — one JSON object per line, idempotent keys.
//!
//! The store never updates or deletes. Writes are keyed by
//! (hypothesis id, params hash, window label); re-appending an existing key
//! is a no-op, so retried writes are harmless — at-least-once delivery with
//! idempotent keys.

use chrono::NaiveDateTime;
use hypolab_core::lifecycle::HypothesisStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::runner::EvaluationResult;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Idempotency key: one logical write per (hypothesis, params, window).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreKey {
    pub hypothesis_id: String,
    pub params_hash: String,
    /// Window label, e.g. "evaluation", "shadow-3", "transition-promoted".
    pub window: String,
}

impl StoreKey {
    pub fn new(hypothesis_id: &str, params_hash: &str, window: &str) -> Self {
        Self {
            hypothesis_id: hypothesis_id.to_string(),
            params_hash: params_hash.to_string(),
            window: window.to_string(),
        }
    }

    fn dedup_string(&self) -> String {
        format!("{}:{}:{}", self.hypothesis_id, self.params_hash, self.window)
    }
}

/// A lifecycle transition event, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionEntry {
    pub key: StoreKey,
    pub from: HypothesisStatus,
    pub to: HypothesisStatus,
    pub timestamp: NaiveDateTime,
    pub reason: Option<String>,
}

/// One stored line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreRecord {
    Evaluation {
        key: StoreKey,
        result: EvaluationResult,
    },
    Transition(TransitionEntry),
}

impl StoreRecord {
    pub fn key(&self) -> &StoreKey {
        match self {
            StoreRecord::Evaluation { key, .. } => key,
            StoreRecord::Transition(entry) => &entry.key,
        }
    }
}

/// Append-only JSONL sink.
pub struct EvaluationStore {
    path: PathBuf,
    seen: HashSet<String>,
}

impl EvaluationStore {
    /// Open (or create) a store, loading existing keys for deduplication.
    ///
    /// Malformed lines are skipped — the format tolerates partial writes.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let mut seen = HashSet::new();
        if path.exists() {
            let file = fs::File::open(path)?;
            for line in BufReader::new(file).lines() {
                let line = line?;
                if let Ok(record) = serde_json::from_str::<StoreRecord>(&line) {
                    seen.insert(record.key().dedup_string());
                }
            }
        }
        Ok(Self {
            path: path.to_path_buf(),
            seen,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Append a record unless its key was already written.
    ///
    /// Returns `Ok(true)` if written, `Ok(false)` if deduplicated. Failures
    /// propagate to the caller; nothing is retried or dropped here.
    pub fn append(&mut self, record: &StoreRecord) -> Result<bool, StoreError> {
        let dedup = record.key().dedup_string();
        if self.seen.contains(&dedup) {
            return Ok(false);
        }

        let json = serde_json::to_string(record)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{json}")?;
        file.flush()?;

        self.seen.insert(dedup);
        Ok(true)
    }

    /// Read every well-formed record back, in write order.
    pub fn read_all(&self) -> Result<Vec<StoreRecord>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let file = fs::File::open(&self.path)?;
        let mut records = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if let Ok(record) = serde_json::from_str::<StoreRecord>(&line) {
                records.push(record);
            }
        }
        Ok(records)
    }
}
