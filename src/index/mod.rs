// src/index/mod.rs
//! Corpus-wide mapping from n-grams to vector-space coordinates.
//!
//! Two strategies:
//! - [`DictionaryIndex`]: exact, append-only, persisted, bounded by a capacity.
//! - [`HashingIndex`]: `hash(ngram) mod n_features`, stateless, collisions accepted.

pub mod dictionary;
pub mod hashing;
pub mod store;

pub use dictionary::DictionaryIndex;
pub use hashing::HashingIndex;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Outcome of asking the dictionary for an n-gram's coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// Already known; the coordinate assigned in an earlier file or run.
    Found(usize),
    /// Newly appended at the next free coordinate.
    Assigned(usize),
    /// Vector space exhausted; the n-gram has no coordinate.
    Rejected,
}

impl Assignment {
    #[must_use]
    pub fn coordinate(self) -> Option<usize> {
        match self {
            Self::Found(c) | Self::Assigned(c) => Some(c),
            Self::Rejected => None,
        }
    }
}

/// How n-grams are mapped to coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Dictionary,
    Hash,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dictionary => write!(f, "dictionary"),
            Self::Hash => write!(f, "hash"),
        }
    }
}

/// Vector-space size per `n`: a lookup table for small `n` and a default beyond it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSizes {
    #[serde(default = "default_sizes")]
    pub sizes: Vec<usize>,
    #[serde(default = "default_size")]
    pub default_size: usize,
}

impl Default for FeatureSizes {
    fn default() -> Self {
        Self {
            sizes: default_sizes(),
            default_size: default_size(),
        }
    }
}

fn default_sizes() -> Vec<usize> {
    vec![19, 361, 1000, 4000, 15000, 40000, 100_000]
}
const fn default_size() -> usize {
    200_000
}

impl FeatureSizes {
    /// Vector-space size for windows of width `n` (`n >= 1`).
    #[must_use]
    pub fn for_n(&self, n: usize) -> usize {
        n.checked_sub(1)
            .and_then(|i| self.sizes.get(i))
            .copied()
            .unwrap_or(self.default_size)
    }
}

/// The index a corpus analysis writes into.
#[derive(Debug)]
pub enum FeatureIndex {
    Dictionary(DictionaryIndex),
    Hashing(HashingIndex),
}

impl FeatureIndex {
    /// Opens the index for `strategy`: the persisted dictionary for
    /// `(table, n)` under `dir`, or a stateless hasher.
    ///
    /// # Errors
    /// Returns error if an existing dictionary file cannot be read or does not match.
    pub fn open(
        strategy: Strategy,
        dir: &Path,
        table: &str,
        n: usize,
        n_features: usize,
    ) -> Result<Self> {
        Ok(match strategy {
            Strategy::Dictionary => {
                Self::Dictionary(DictionaryIndex::open(dir, table, n, n_features)?)
            }
            Strategy::Hash => Self::Hashing(HashingIndex::new(n_features)),
        })
    }

    /// Width of every feature vector/row produced against this index.
    #[must_use]
    pub fn n_features(&self) -> usize {
        match self {
            Self::Dictionary(d) => d.capacity(),
            Self::Hashing(h) => h.n_features(),
        }
    }

    #[must_use]
    pub fn strategy(&self) -> Strategy {
        match self {
            Self::Dictionary(_) => Strategy::Dictionary,
            Self::Hashing(_) => Strategy::Hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_follow_table_then_default() {
        let s = FeatureSizes::default();
        assert_eq!(s.for_n(1), 19);
        assert_eq!(s.for_n(2), 361);
        assert_eq!(s.for_n(4), 4000);
        assert_eq!(s.for_n(7), 100_000);
        assert_eq!(s.for_n(8), 200_000);
        assert_eq!(s.for_n(40), 200_000);
    }

    #[test]
    fn sizes_are_configurable() {
        let s = FeatureSizes {
            sizes: vec![5],
            default_size: 7,
        };
        assert_eq!(s.for_n(1), 5);
        assert_eq!(s.for_n(2), 7);
    }

    #[test]
    fn assignment_coordinates() {
        assert_eq!(Assignment::Found(3).coordinate(), Some(3));
        assert_eq!(Assignment::Assigned(0).coordinate(), Some(0));
        assert_eq!(Assignment::Rejected.coordinate(), None);
    }
}
