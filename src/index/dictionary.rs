// src/index/dictionary.rs
//! Exact, append-only n-gram dictionary.

use super::Assignment;
use crate::ngram::NGram;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Growable n-gram ↔ coordinate table.
///
/// Coordinates are positions in `ngrams` and never change once assigned.
/// Assignment stops at `capacity`; later n-grams are rejected, never wrapped.
/// Not safe for concurrent writers across processes: the last persist wins.
#[derive(Debug, Clone)]
pub struct DictionaryIndex {
    pub(super) table: String,
    pub(super) n: usize,
    capacity: usize,
    pub(super) ngrams: Vec<NGram>,
    coords: HashMap<NGram, usize>,
    pub(super) path: Option<PathBuf>,
    loaded_len: usize,
    rejected: usize,
}

impl DictionaryIndex {
    /// Creates an empty, in-memory index (nothing to persist to).
    #[must_use]
    pub fn new(table: impl Into<String>, n: usize, capacity: usize) -> Self {
        Self {
            table: table.into(),
            n,
            capacity,
            ngrams: Vec::new(),
            coords: HashMap::new(),
            path: None,
            loaded_len: 0,
            rejected: 0,
        }
    }

    /// Rebuilds an index from persisted n-grams, in coordinate order.
    pub(super) fn from_ngrams(
        table: String,
        n: usize,
        capacity: usize,
        ngrams: Vec<NGram>,
        path: Option<PathBuf>,
    ) -> Self {
        let coords = ngrams
            .iter()
            .enumerate()
            .map(|(i, g)| (g.clone(), i))
            .collect();
        let loaded_len = ngrams.len();
        Self {
            table,
            n,
            capacity,
            ngrams,
            coords,
            path,
            loaded_len,
            rejected: 0,
        }
    }

    /// Coordinate of a known n-gram; `None` means it still needs assignment.
    #[must_use]
    pub fn lookup(&self, ngram: &[u32]) -> Option<usize> {
        self.coords.get(ngram).copied()
    }

    /// Returns the existing coordinate, appends at the next free one, or rejects.
    pub fn lookup_or_assign(&mut self, ngram: &[u32]) -> Assignment {
        if let Some(c) = self.lookup(ngram) {
            if c < self.capacity {
                return Assignment::Found(c);
            }
            return self.reject(ngram, c);
        }

        let next = self.ngrams.len();
        if next >= self.capacity {
            return self.reject(ngram, next);
        }

        let g = NGram::from(ngram);
        self.coords.insert(g.clone(), next);
        self.ngrams.push(g);
        Assignment::Assigned(next)
    }

    fn reject(&mut self, ngram: &[u32], coordinate: usize) -> Assignment {
        self.rejected += 1;
        tracing::warn!(
            ngram = %NGram::from(ngram),
            coordinate,
            capacity = self.capacity,
            "Vector space exhausted; n-gram dropped (raise [features] sizes for this n)"
        );
        Assignment::Rejected
    }

    /// Reverse lookup: the n-gram holding `coordinate`.
    #[must_use]
    pub fn ngram_at(&self, coordinate: usize) -> Option<&NGram> {
        self.ngrams.get(coordinate)
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn n(&self) -> usize {
        self.n
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of assigned coordinates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ngrams.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ngrams.is_empty()
    }

    /// N-grams appended since the index was created or loaded.
    #[must_use]
    pub fn added(&self) -> usize {
        self.ngrams.len() - self.loaded_len
    }

    /// Occurrences refused because the vector space was exhausted.
    #[must_use]
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Where `persist()` writes, if this index is backed by a file.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
