// src/model/mod.rs
//! Classifiers trained on feature matrices.

pub mod forest;
pub mod score;

pub use forest::{ForestSettings, RandomForest};
pub use score::{predict_with_threshold, score, Score};

use crate::analysis::Label;
use crate::error::{JsgramError, Result};
use crate::index::Strategy;
use crate::vector::FeatureMatrix;
use aprender::primitives::Matrix;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The feature space a model was trained in. Vectors from any other space
/// are refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpace {
    pub table: String,
    pub n: usize,
    pub strategy: Strategy,
    pub n_features: usize,
}

impl FeatureSpace {
    /// # Errors
    /// Returns `Model` when `other` differs.
    pub fn ensure_matches(&self, other: &Self) -> Result<()> {
        if self == other {
            return Ok(());
        }
        Err(JsgramError::Model(format!(
            "model was trained on table '{}', n = {}, {} strategy, {} features; \
             got table '{}', n = {}, {} strategy, {} features",
            self.table,
            self.n,
            self.strategy,
            self.n_features,
            other.table,
            other.n,
            other.strategy,
            other.n_features
        )))
    }
}

pub trait Classifier: Sized {
    /// Fits from scratch.
    ///
    /// # Errors
    /// Returns `Model` on width mismatch or when a class is missing.
    fn train(&mut self, matrix: &FeatureMatrix, labels: &[Label]) -> Result<()>;

    /// Adds samples to an already trained model.
    ///
    /// # Errors
    /// Returns `Model` on width mismatch.
    fn update(&mut self, matrix: &FeatureMatrix, labels: &[Label]) -> Result<()>;

    /// Probability of `malicious` for every row.
    ///
    /// # Errors
    /// Returns `Model` on width mismatch or when untrained.
    fn predict_proba(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>>;

    /// # Errors
    /// Returns error if the model cannot be serialized or written.
    fn save(&self, path: &Path) -> Result<()>;

    /// # Errors
    /// Returns error if the file cannot be read or is not a model.
    fn load(path: &Path) -> Result<Self>;
}

/// The given rows of `matrix` as an `f32` sample matrix.
///
/// # Errors
/// Returns `Model` if a row index is out of range.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn to_samples(matrix: &FeatureMatrix, rows: &[usize]) -> Result<Matrix<f32>> {
    let n_cols = matrix.n_cols();
    let mut data = Vec::with_capacity(rows.len() * n_cols);
    for &i in rows {
        let row = matrix
            .dense_row(i)
            .ok_or_else(|| JsgramError::Model(format!("no sample at row {i}")))?;
        data.extend(row.iter().map(|&v| v as f32));
    }
    Matrix::from_vec(rows.len(), n_cols, data).map_err(|e| JsgramError::Model(e.to_string()))
}
