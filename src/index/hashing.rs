// src/index/hashing.rs
//! Fixed-width hashed projection of n-grams.

use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Maps an n-gram to `hash(ngram) mod n_features`.
///
/// Pure and stateless: the same n-gram always lands on the same coordinate,
/// across runs and machines. Distinct n-grams may collide; collisions are
/// neither detected nor resolved here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingIndex {
    n_features: usize,
}

impl HashingIndex {
    /// A zero width is clamped to 1.
    #[must_use]
    pub fn new(n_features: usize) -> Self {
        Self {
            n_features: n_features.max(1),
        }
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Coordinate in `[0, n_features)`.
    #[must_use]
    pub fn coordinate(&self, ngram: &[u32]) -> usize {
        let mut hasher = Sha256::new();
        for code in ngram {
            hasher.update(code.to_le_bytes());
        }
        let digest = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        let h = u64::from_le_bytes(head);
        #[allow(clippy::cast_possible_truncation)]
        let coordinate = (h % self.n_features as u64) as usize;
        coordinate
    }
}

/// Diagnostic: distinct n-grams observed per hashed coordinate.
#[derive(Debug, Default)]
pub struct CollisionTracker {
    seen: HashMap<Vec<u32>, usize>,
    per_coordinate: HashMap<usize, usize>,
}

impl CollisionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, ngram: &[u32], coordinate: usize) {
        if self.seen.contains_key(ngram) {
            return;
        }
        self.seen.insert(ngram.to_vec(), coordinate);
        *self.per_coordinate.entry(coordinate).or_insert(0) += 1;
    }

    /// Distinct n-grams that share a coordinate with an earlier n-gram.
    #[must_use]
    pub fn collisions(&self) -> usize {
        self.per_coordinate.values().map(|k| k - 1).sum()
    }

    #[must_use]
    pub fn distinct_ngrams(&self) -> usize {
        self.seen.len()
    }
}
