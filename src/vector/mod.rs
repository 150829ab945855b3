// src/vector/mod.rs
//! Turns per-file profiles into fixed-width feature vectors and rows.

pub mod sparse;

pub use sparse::{concatenate_rows, SparseMatrix};

use crate::index::{DictionaryIndex, HashingIndex};
use crate::ngram::FileProfile;

/// Dense vector of width `index.capacity()`.
///
/// Each profile n-gram is placed at its dictionary coordinate; n-grams the
/// index rejects are omitted, so at capacity the vector sums to less than 1.
#[must_use]
pub fn materialize_dense(profile: &FileProfile, index: &mut DictionaryIndex) -> Vec<f64> {
    let mut vector = vec![0.0; index.capacity()];
    for (ngram, freq) in profile.iter() {
        if let Some(c) = index.lookup_or_assign(ngram.codes()).coordinate() {
            vector[c] = freq;
        }
    }
    vector
}

/// One CSR row of width `index.n_features()`, colliding frequencies summed.
#[must_use]
pub fn materialize_sparse(profile: &FileProfile, index: &HashingIndex) -> SparseMatrix {
    SparseMatrix::row(
        profile
            .iter()
            .map(|(ngram, freq)| (index.coordinate(ngram.codes()), freq)),
        index.n_features(),
    )
}

/// Rows for every analyzed file, in processing order.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureMatrix {
    Dense { rows: Vec<Vec<f64>>, n_cols: usize },
    Sparse(SparseMatrix),
}

impl FeatureMatrix {
    #[must_use]
    pub fn n_rows(&self) -> usize {
        match self {
            Self::Dense { rows, .. } => rows.len(),
            Self::Sparse(m) => m.n_rows(),
        }
    }

    #[must_use]
    pub fn n_cols(&self) -> usize {
        match self {
            Self::Dense { n_cols, .. } => *n_cols,
            Self::Sparse(m) => m.n_cols(),
        }
    }

    /// Row `i` as a dense vector.
    #[must_use]
    pub fn dense_row(&self, i: usize) -> Option<Vec<f64>> {
        match self {
            Self::Dense { rows, .. } => rows.get(i).cloned(),
            Self::Sparse(m) => m.dense_row(i),
        }
    }
}
