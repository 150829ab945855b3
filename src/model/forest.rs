// src/model/forest.rs
//! Random forest classifier, grown by adding trees on new batches.

use super::{to_samples, Classifier, FeatureSpace};
use crate::analysis::Label;
use crate::config::ModelConfig;
use crate::error::{JsgramError, Result};
use crate::vector::FeatureMatrix;
use aprender::tree::RandomForestClassifier;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const BENIGN: usize = 0;
const MALICIOUS: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestSettings {
    pub estimators: usize,
    pub add_trees: usize,
    pub max_depth: usize,
    pub seed: u64,
}

impl From<&ModelConfig> for ForestSettings {
    fn from(config: &ModelConfig) -> Self {
        Self {
            estimators: config.estimators,
            add_trees: config.add_trees,
            max_depth: config.max_depth,
            seed: config.seed,
        }
    }
}

/// Trees fitted on one batch of samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Grove {
    trees: usize,
    forest: RandomForestClassifier,
}

/// Votes are pooled over every grove, so each update weighs in by its tree count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    space: FeatureSpace,
    settings: ForestSettings,
    groves: Vec<Grove>,
}

impl RandomForest {
    #[must_use]
    pub fn new(space: FeatureSpace, settings: ForestSettings) -> Self {
        Self {
            space,
            settings,
            groves: Vec::new(),
        }
    }

    /// Trees added by the next `update`.
    #[must_use]
    pub fn with_add_trees(mut self, add_trees: usize) -> Self {
        self.settings.add_trees = add_trees;
        self
    }

    #[must_use]
    pub fn space(&self) -> &FeatureSpace {
        &self.space
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.groves.iter().map(|g| g.trees).sum()
    }

    fn check_width(&self, matrix: &FeatureMatrix) -> Result<()> {
        if matrix.n_cols() != self.space.n_features {
            return Err(JsgramError::Model(format!(
                "expected {} features per sample, got {}",
                self.space.n_features,
                matrix.n_cols()
            )));
        }
        Ok(())
    }

    /// Known-label rows and their class indices.
    fn labelled(
        &self,
        matrix: &FeatureMatrix,
        labels: &[Label],
    ) -> Result<(Vec<usize>, Vec<usize>)> {
        self.check_width(matrix)?;
        if labels.len() != matrix.n_rows() {
            return Err(JsgramError::Model(format!(
                "{} labels for {} samples",
                labels.len(),
                matrix.n_rows()
            )));
        }
        let mut rows = Vec::new();
        let mut classes = Vec::new();
        for (i, label) in labels.iter().enumerate() {
            let class = match label {
                Label::Benign => BENIGN,
                Label::Malicious => MALICIOUS,
                Label::Unknown => continue,
            };
            rows.push(i);
            classes.push(class);
        }
        let skipped = labels.len() - rows.len();
        if skipped > 0 {
            tracing::warn!(skipped, "Ignoring samples without a label");
        }
        Ok((rows, classes))
    }

    fn grow(
        &self,
        matrix: &FeatureMatrix,
        rows: &[usize],
        classes: &[usize],
        trees: usize,
    ) -> Result<Grove> {
        let x = to_samples(matrix, rows)?;
        let seed = self.settings.seed.wrapping_add(self.n_trees() as u64);
        let mut forest = RandomForestClassifier::new(trees)
            .with_max_depth(self.settings.max_depth)
            .with_random_state(seed);
        forest
            .fit(&x, classes)
            .map_err(|e| JsgramError::Model(format!("cannot fit forest: {e}")))?;
        Ok(Grove { trees, forest })
    }
}

impl Classifier for RandomForest {
    fn train(&mut self, matrix: &FeatureMatrix, labels: &[Label]) -> Result<()> {
        let (rows, classes) = self.labelled(matrix, labels)?;
        if !classes.contains(&BENIGN) || !classes.contains(&MALICIOUS) {
            return Err(JsgramError::Model(
                "training needs at least one benign and one malicious sample".to_string(),
            ));
        }
        self.groves.clear();
        let grove = self.grow(matrix, &rows, &classes, self.settings.estimators)?;
        self.groves.push(grove);
        tracing::info!(samples = rows.len(), trees = self.n_trees(), "Trained random forest");
        Ok(())
    }

    fn update(&mut self, matrix: &FeatureMatrix, labels: &[Label]) -> Result<()> {
        if self.groves.is_empty() {
            return Err(JsgramError::Model("model has not been trained".to_string()));
        }
        let (rows, classes) = self.labelled(matrix, labels)?;
        if rows.is_empty() {
            return Err(JsgramError::Model("no labelled samples to add".to_string()));
        }
        let grove = self.grow(matrix, &rows, &classes, self.settings.add_trees)?;
        self.groves.push(grove);
        tracing::info!(
            samples = rows.len(),
            trees = self.n_trees(),
            "Added trees to random forest"
        );
        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    fn predict_proba(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>> {
        self.check_width(matrix)?;
        let total = self.n_trees();
        if total == 0 {
            return Err(JsgramError::Model("model has not been trained".to_string()));
        }
        let mut probas = Vec::with_capacity(matrix.n_rows());
        for i in 0..matrix.n_rows() {
            let x = to_samples(matrix, &[i])?;
            let mut votes = 0.0;
            for grove in &self.groves {
                let p = grove.forest.predict_proba(&x);
                // A grove fitted on benign samples only has a single column.
                if p.shape().1 > MALICIOUS {
                    votes += f64::from(p.get(0, MALICIOUS)) * grove.trees as f64;
                }
            }
            probas.push(votes / total as f64);
        }
        Ok(probas)
    }

    fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self)
            .map_err(|e| JsgramError::Model(format!("cannot serialize model: {e}")))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| JsgramError::io(e, parent))?;
        }
        crate::index::store::atomic_write(path, &json)
    }

    fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| JsgramError::io(e, path))?;
        let model: Self = serde_json::from_str(&content)
            .map_err(|e| JsgramError::Model(format!("{}: {e}", path.display())))?;
        if model.groves.is_empty() {
            return Err(JsgramError::Model(format!("{}: model has no trees", path.display())));
        }
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Strategy;
    use Label::{Benign, Malicious, Unknown};

    fn space(width: usize) -> FeatureSpace {
        FeatureSpace {
            table: "t".into(),
            n: 2,
            strategy: Strategy::Dictionary,
            n_features: width,
        }
    }

    fn settings() -> ForestSettings {
        ForestSettings {
            estimators: 15,
            add_trees: 5,
            max_depth: 5,
            seed: 7,
        }
    }

    /// Benign rows lean on column 0, malicious rows on column 1.
    fn corpus(per_class: usize) -> (FeatureMatrix, Vec<Label>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..per_class {
            let jitter = i as f64 * 0.01;
            rows.push(vec![0.9 - jitter, 0.1 + jitter]);
            labels.push(Benign);
            rows.push(vec![0.1 + jitter, 0.9 - jitter]);
            labels.push(Malicious);
        }
        (FeatureMatrix::Dense { rows, n_cols: 2 }, labels)
    }

    fn trained() -> RandomForest {
        let (matrix, labels) = corpus(8);
        let mut m = RandomForest::new(space(2), settings());
        m.train(&matrix, &labels).unwrap();
        m
    }

    #[test]
    fn separates_the_classes() {
        let m = trained();
        let samples = FeatureMatrix::Dense {
            rows: vec![vec![0.05, 0.95], vec![0.95, 0.05]],
            n_cols: 2,
        };
        let p = m.predict_proba(&samples).unwrap();
        assert!(p[0] > 0.5, "{p:?}");
        assert!(p[1] < 0.5, "{p:?}");
        assert!(p.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn training_needs_both_classes() {
        let mut m = RandomForest::new(space(2), settings());
        let matrix = FeatureMatrix::Dense {
            rows: vec![vec![1.0, 0.0], vec![0.5, 0.5]],
            n_cols: 2,
        };
        let r = m.train(&matrix, &[Benign, Unknown]);
        assert!(matches!(r, Err(JsgramError::Model(_))));
    }

    #[test]
    fn width_mismatch_is_refused() {
        let (matrix, labels) = corpus(2);
        let mut m = RandomForest::new(space(3), settings());
        assert!(matches!(m.train(&matrix, &labels), Err(JsgramError::Model(_))));
    }

    #[test]
    fn update_adds_trees() {
        let mut m = trained();
        assert_eq!(m.n_trees(), 15);
        let (matrix, labels) = corpus(3);
        m.update(&matrix, &labels).unwrap();
        assert_eq!(m.n_trees(), 20);
    }

    #[test]
    fn add_trees_can_be_changed_after_loading() {
        let mut m = trained().with_add_trees(2);
        let (matrix, labels) = corpus(2);
        m.update(&matrix, &labels).unwrap();
        assert_eq!(m.n_trees(), 17);
    }

    #[test]
    fn update_needs_a_trained_model() {
        let (matrix, labels) = corpus(2);
        let mut m = RandomForest::new(space(2), settings());
        assert!(m.update(&matrix, &labels).is_err());
    }

    #[test]
    fn save_and_load_keep_predictions() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("models").join("m.json");
        let m = trained();
        m.save(&path).unwrap();
        let loaded = RandomForest::load(&path).unwrap();
        let (matrix, _) = corpus(4);
        assert_eq!(loaded.space(), m.space());
        assert_eq!(loaded.n_trees(), m.n_trees());
        assert_eq!(
            loaded.predict_proba(&matrix).unwrap(),
            m.predict_proba(&matrix).unwrap()
        );
    }
}
