//! Batch orchestration over a corpus.

use std::time::Instant;

use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

use crate::config::UnknownUnitPolicy;
use crate::error::{JsgramError, Result};
use crate::extract::UnitExtractor;
use crate::index::hashing::CollisionTracker;
use crate::index::{DictionaryIndex, FeatureIndex, HashingIndex};
use crate::ngram::{check_size, FileProfile};
use crate::units::UnitTable;
use crate::vector::{
    concatenate_rows, materialize_dense, materialize_sparse, FeatureMatrix, SparseMatrix,
};

use super::input::{Label, LabeledPath};
use super::summary::{AnalysisSummary, Exclusion, ExclusionReason};
use super::worker;

/// Result of one batch: three lists zipped by position, plus counts.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub file_names: Vec<String>,
    pub matrix: FeatureMatrix,
    pub labels: Vec<Label>,
    pub summary: AnalysisSummary,
}

type Outcome = std::result::Result<FileProfile, ExclusionReason>;

/// Runs the per-file pipeline over a queue and writes the index.
///
/// Phase 1 (parallel when enabled) builds profiles without touching the index.
/// Phase 2 (sequential, queue order) assigns coordinates and builds rows; a
/// dictionary index is persisted once at the end.
pub struct Analyzer<E> {
    extractor: E,
    table: UnitTable,
    n: usize,
    policy: UnknownUnitPolicy,
    parallel: bool,
}

impl<E: UnitExtractor> Analyzer<E> {
    /// # Errors
    /// Returns `InvalidNgramSize` when `n < 1`.
    pub fn new(extractor: E, table: UnitTable, n: usize) -> Result<Self> {
        Ok(Self {
            extractor,
            table,
            n: check_size(n)?,
            policy: UnknownUnitPolicy::default(),
            parallel: true,
        })
    }

    #[must_use]
    pub fn with_policy(mut self, policy: UnknownUnitPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub fn table(&self) -> &UnitTable {
        &self.table
    }

    #[must_use]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Analyzes `inputs` in order against `index`.
    ///
    /// # Errors
    /// Returns error if the index belongs to another table or `n`, if an
    /// unknown unit is met under the `abort` policy (before any index
    /// mutation), or if persisting the index fails.
    pub fn analyze(&self, inputs: &[LabeledPath], index: &mut FeatureIndex) -> Result<Analysis> {
        let start = Instant::now();
        if let FeatureIndex::Dictionary(dict) = &*index {
            self.check_index(dict)?;
        }

        let outcomes = self.profile_all(inputs);
        if self.policy == UnknownUnitPolicy::Abort {
            abort_on_unknown_unit(inputs, &outcomes)?;
        }

        let mut summary = AnalysisSummary::default();
        let mut kept: Vec<(&LabeledPath, FileProfile)> = Vec::new();
        for (input, outcome) in inputs.iter().zip(outcomes) {
            match outcome {
                Ok(profile) => kept.push((input, profile)),
                Err(reason) => {
                    tracing::warn!(
                        file = %input.path.display(),
                        reason = %reason,
                        "Excluding file from the analysis"
                    );
                    summary.excluded.push(Exclusion {
                        path: input.path.clone(),
                        reason,
                    });
                }
            }
        }
        summary.analyzed = kept.len();

        let profiles = kept.iter().map(|(_, p)| p);
        let matrix = match index {
            FeatureIndex::Dictionary(dict) => dense_rows(profiles, dict, &mut summary)?,
            FeatureIndex::Hashing(hash) => sparse_rows(profiles, hash, &mut summary),
        };

        tracing::info!(
            strategy = %index.strategy(),
            analyzed = summary.analyzed,
            excluded = summary.excluded_count(),
            dropped_ngrams = summary.dropped_ngrams,
            elapsed_ms = start.elapsed().as_millis(),
            "Analysis complete"
        );

        Ok(Analysis {
            file_names: kept
                .iter()
                .map(|(input, _)| input.path.display().to_string())
                .collect(),
            labels: kept.iter().map(|(input, _)| input.label).collect(),
            matrix,
            summary,
        })
    }

    fn check_index(&self, dict: &DictionaryIndex) -> Result<()> {
        if dict.table() != self.table.name() || dict.n() != self.n {
            return Err(JsgramError::IndexMismatch {
                expected: format!("table '{}', n = {}", self.table.name(), self.n),
                found: format!("table '{}', n = {}", dict.table(), dict.n()),
            });
        }
        Ok(())
    }

    fn profile_all(&self, inputs: &[LabeledPath]) -> Vec<Outcome> {
        let run = |input: &LabeledPath| {
            tracing::debug!(file = %input.path.display(), "Analyzing");
            worker::profile_file(&input.path, &self.extractor, &self.table, self.n)
        };
        if self.parallel {
            inputs.par_iter().map(run).collect()
        } else {
            inputs.iter().map(run).collect()
        }
    }
}

fn abort_on_unknown_unit(inputs: &[LabeledPath], outcomes: &[Outcome]) -> Result<()> {
    for (input, outcome) in inputs.iter().zip(outcomes) {
        if let Err(ExclusionReason::UnknownUnit(label)) = outcome {
            return Err(JsgramError::UnknownUnit {
                file: input.path.clone(),
                label: label.clone(),
            });
        }
    }
    Ok(())
}

fn dense_rows<'a>(
    profiles: impl Iterator<Item = &'a FileProfile>,
    dict: &mut DictionaryIndex,
    summary: &mut AnalysisSummary,
) -> Result<FeatureMatrix> {
    let rejected_before = dict.rejected();
    let len_before = dict.len();
    let rows: Vec<Vec<f64>> = profiles.map(|p| materialize_dense(p, dict)).collect();
    summary.dropped_ngrams = dict.rejected() - rejected_before;
    summary.new_ngrams = dict.len() - len_before;
    if summary.dropped_ngrams > 0 {
        tracing::warn!(
            dropped = summary.dropped_ngrams,
            capacity = dict.capacity(),
            "Vector space exhausted; n-gram occurrences were dropped"
        );
    }
    dict.persist()?;
    Ok(FeatureMatrix::Dense {
        rows,
        n_cols: dict.capacity(),
    })
}

fn sparse_rows<'a>(
    profiles: impl Iterator<Item = &'a FileProfile>,
    hash: &HashingIndex,
    summary: &mut AnalysisSummary,
) -> FeatureMatrix {
    let n_cols = hash.n_features();
    let mut tracker = CollisionTracker::new();
    let mut matrix: Option<SparseMatrix> = None;
    for profile in profiles {
        for (ngram, _) in profile.iter() {
            tracker.observe(ngram.codes(), hash.coordinate(ngram.codes()));
        }
        matrix = concatenate_rows(matrix, Some(materialize_sparse(profile, hash)), n_cols);
    }
    summary.collisions = Some(tracker.collisions());
    tracing::debug!(
        distinct = tracker.distinct_ngrams(),
        collisions = tracker.collisions(),
        "Hashed n-grams"
    );
    FeatureMatrix::Sparse(matrix.unwrap_or_else(|| SparseMatrix::empty(n_cols)))
}
