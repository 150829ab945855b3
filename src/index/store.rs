// src/index/store.rs
//! Durable storage for [`DictionaryIndex`].
//!
//! One JSON file per (unit table, n) under the configured directory:
//! `<dir>/<n>-gram/<table>.json`. Coordinates are list positions, so the
//! file is a plain ordered list and reloading it reproduces every coordinate.

use super::DictionaryIndex;
use crate::error::{JsgramError, Result};
use crate::ngram::NGram;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct IndexFileRef<'a> {
    table: &'a str,
    n: usize,
    ngrams: &'a [NGram],
}

#[derive(Deserialize)]
struct IndexFile {
    table: String,
    n: usize,
    ngrams: Vec<NGram>,
}

/// Location of the persisted index for a (table, n) pair.
#[must_use]
pub fn index_path(dir: &Path, table: &str, n: usize) -> PathBuf {
    dir.join(format!("{n}-gram")).join(format!("{table}.json"))
}

impl DictionaryIndex {
    /// Loads the index for `(table, n)` from `dir`, or starts an empty one
    /// that will be created there on `persist()`.
    ///
    /// # Errors
    /// Returns error if an existing file cannot be read, is corrupt, or was
    /// built for a different table or `n`.
    pub fn open(dir: &Path, table: &str, n: usize, capacity: usize) -> Result<Self> {
        let path = index_path(dir, table, n);
        if !path.exists() {
            tracing::info!(path = %path.display(), "No n-gram index yet; starting empty");
            let mut index = Self::new(table, n, capacity);
            index.path = Some(path);
            return Ok(index);
        }
        let index = Self::load(&path, capacity)?;
        if index.table != table || index.n != n {
            return Err(JsgramError::IndexMismatch {
                expected: format!("{table}, n={n}"),
                found: format!("{}, n={}", index.table, index.n),
            });
        }
        Ok(index)
    }

    /// Reads a persisted index file.
    ///
    /// # Errors
    /// Returns error on I/O failure, malformed JSON, wrong n-gram arity, or
    /// duplicate n-grams.
    pub fn load(path: &Path, capacity: usize) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| JsgramError::io(e, path))?;
        let file: IndexFile =
            serde_json::from_str(&content).map_err(|e| corrupt(path, e.to_string()))?;

        if file.n == 0 {
            return Err(corrupt(path, "n must be at least 1".into()));
        }
        let mut seen = HashSet::with_capacity(file.ngrams.len());
        for (coordinate, ngram) in file.ngrams.iter().enumerate() {
            if ngram.len() != file.n {
                return Err(corrupt(
                    path,
                    format!("coordinate {coordinate} holds {ngram}, expected {} codes", file.n),
                ));
            }
            if !seen.insert(ngram) {
                return Err(corrupt(path, format!("{ngram} appears twice")));
            }
        }
        if file.ngrams.len() > capacity {
            tracing::warn!(
                path = %path.display(),
                stored = file.ngrams.len(),
                capacity,
                "Persisted index is larger than the configured vector space"
            );
        }

        tracing::debug!(path = %path.display(), ngrams = file.ngrams.len(), "Loaded n-gram index");
        Ok(Self::from_ngrams(
            file.table,
            file.n,
            capacity,
            file.ngrams,
            Some(path.to_path_buf()),
        ))
    }

    /// Serialized form; identical bytes for identical contents.
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        let file = IndexFileRef {
            table: &self.table,
            n: self.n,
            ngrams: &self.ngrams,
        };
        serde_json::to_string_pretty(&file)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| JsgramError::IndexFormat {
                path: self.path.clone().unwrap_or_default(),
                reason: e.to_string(),
            })
    }

    /// Writes the whole table back to its file (temp file + rename).
    /// In-memory indexes (no backing file) are left untouched.
    ///
    /// # Errors
    /// Returns error if the directory or file cannot be written.
    pub fn persist(&self) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| JsgramError::io(e, parent))?;
        }
        atomic_write(path, &self.to_json()?)?;
        tracing::info!(
            path = %path.display(),
            ngrams = self.len(),
            added = self.added(),
            "Persisted n-gram index"
        );
        Ok(())
    }
}

fn corrupt(path: &Path, reason: String) -> JsgramError {
    JsgramError::IndexFormat {
        path: path.to_path_buf(),
        reason,
    }
}

/// Temp file + rename.
pub(crate) fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let temp_path = path.with_extension("json.tmp");

    fs::write(&temp_path, content).map_err(|e| JsgramError::io(e, &temp_path))?;
    fs::rename(&temp_path, path).map_err(|e| JsgramError::io(e, path))?;

    Ok(())
}
