// src/cluster.rs
//! k-means families of analyzed files.

use crate::config::ClusterConfig;
use crate::error::{JsgramError, Result};
use crate::model::to_samples;
use crate::vector::FeatureMatrix;
use aprender::cluster::KMeans;
use aprender::primitives::Matrix;
use aprender::traits::UnsupervisedEstimator;

#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// Cluster of each row, in row order.
    pub assignments: Vec<usize>,
    /// Total squared distance of the rows to their centroid.
    pub inertia: f64,
}

impl Clustering {
    /// Rows per cluster, indexed by cluster.
    #[must_use]
    pub fn sizes(&self, k: usize) -> Vec<usize> {
        let mut sizes = vec![0; k];
        for &c in &self.assignments {
            if let Some(slot) = sizes.get_mut(c) {
                *slot += 1;
            }
        }
        sizes
    }
}

fn samples(matrix: &FeatureMatrix) -> Result<Matrix<f32>> {
    let rows: Vec<usize> = (0..matrix.n_rows()).collect();
    to_samples(matrix, &rows)
}

fn fit(x: &Matrix<f32>, k: usize, config: &ClusterConfig) -> Result<Clustering> {
    let mut best: Option<Clustering> = None;
    for restart in 0..config.restarts {
        let mut kmeans = KMeans::new(k)
            .with_max_iter(config.max_iter)
            .with_random_state(config.seed.wrapping_add(restart as u64));
        kmeans
            .fit(x)
            .map_err(|e| JsgramError::Model(format!("k-means with k = {k}: {e}")))?;
        let run = Clustering {
            assignments: kmeans.predict(x),
            inertia: f64::from(kmeans.inertia()),
        };
        if best.as_ref().map_or(true, |b| run.inertia < b.inertia) {
            best = Some(run);
        }
    }
    best.ok_or_else(|| JsgramError::Config("cluster restarts must be at least 1".to_string()))
}

/// Splits the rows of `matrix` into `k` families with k-means++.
///
/// # Errors
/// Returns `Config` if `k` is zero and `Model` if there are fewer rows than clusters.
pub fn cluster(matrix: &FeatureMatrix, k: usize, config: &ClusterConfig) -> Result<Clustering> {
    if k == 0 {
        return Err(JsgramError::Config("the number of clusters must be at least 1".to_string()));
    }
    if matrix.n_rows() < k {
        return Err(JsgramError::Model(format!(
            "cannot form {k} clusters from {} files",
            matrix.n_rows()
        )));
    }
    let clustering = fit(&samples(matrix)?, k, config)?;
    tracing::info!(k, inertia = clustering.inertia, "Clustered files");
    Ok(clustering)
}

/// Inertia for every k in `1..=max_k`, capped at the number of rows.
///
/// # Errors
/// Returns `Model` if a k-means run fails.
pub fn elbow(matrix: &FeatureMatrix, max_k: usize, config: &ClusterConfig) -> Result<Vec<(usize, f64)>> {
    let n_rows = matrix.n_rows();
    if max_k > n_rows {
        tracing::warn!(max_k, n_rows, "Cannot form more clusters than there are files");
    }
    let x = samples(matrix)?;
    (1..=max_k.min(n_rows))
        .map(|k| fit(&x, k, config).map(|c| (k, c.inertia)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two tight groups far apart.
    fn two_groups() -> FeatureMatrix {
        FeatureMatrix::Dense {
            rows: vec![
                vec![1.0, 0.0, 0.0],
                vec![0.9, 0.1, 0.0],
                vec![0.0, 0.0, 1.0],
                vec![0.95, 0.05, 0.0],
                vec![0.0, 0.1, 0.9],
            ],
            n_cols: 3,
        }
    }

    fn config() -> ClusterConfig {
        ClusterConfig {
            max_iter: 100,
            restarts: 3,
            seed: 0,
        }
    }

    #[test]
    fn groups_are_recovered() {
        let c = cluster(&two_groups(), 2, &config()).unwrap();
        let a = &c.assignments;
        assert_eq!(a.len(), 5);
        assert_eq!(a[0], a[1]);
        assert_eq!(a[0], a[3]);
        assert_eq!(a[2], a[4]);
        assert_ne!(a[0], a[2]);
        let mut sizes = c.sizes(2);
        sizes.sort_unstable();
        assert_eq!(sizes, vec![2, 3]);
    }

    #[test]
    fn too_many_clusters() {
        assert!(matches!(
            cluster(&two_groups(), 6, &config()),
            Err(JsgramError::Model(_))
        ));
        assert!(matches!(
            cluster(&two_groups(), 0, &config()),
            Err(JsgramError::Config(_))
        ));
    }

    #[test]
    fn elbow_is_capped_and_decreasing() {
        let curve = elbow(&two_groups(), 9, &config()).unwrap();
        let ks: Vec<usize> = curve.iter().map(|(k, _)| *k).collect();
        assert_eq!(ks, vec![1, 2, 3, 4, 5]);
        assert!(curve[1].1 < curve[0].1);
    }
}
