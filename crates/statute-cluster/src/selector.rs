//! Model-order selection: how many clusters a feature matrix should get.

use ndarray::ArrayView2;
use statute_core::{ClusterStrategy, Error, Result};
use tracing::{debug, warn};

use crate::gmm::fit_gmm;
use crate::kmeans::fit_kmeans;

/// Count returned when fitting fails numerically, bounded by the caller's maximum.
pub const FALLBACK_CLUSTERS: usize = 3;

/// Picks a cluster count for a feature matrix and partitions it.
pub trait ClusterCountSelector: Send + Sync {
    fn name(&self) -> &'static str;

    /// Choose among `1..=candidates`; `candidates` is at least 1 and below the sample count.
    fn try_select(&self, features: ArrayView2<f64>, candidates: usize) -> Result<usize>;

    /// Assign each row to one of `k` clusters.
    fn partition(&self, features: ArrayView2<f64>, k: usize) -> Result<Vec<usize>>;

    /// Cluster count in `[1, max_clusters]`. Never fails.
    fn select_count(&self, features: ArrayView2<f64>, max_clusters: usize) -> usize {
        let max_clusters = max_clusters.max(1);
        let n = features.nrows();
        if n < 3 {
            return 1;
        }
        let candidates = max_clusters.min(n - 1);
        match self.try_select(features, candidates) {
            Ok(k) => {
                let k = k.clamp(1, max_clusters);
                debug!("{} selected k={} of {} candidates (n={})", self.name(), k, candidates, n);
                k
            }
            Err(e) => {
                let k = FALLBACK_CLUSTERS.min(max_clusters);
                warn!("{} selection failed, using k={}: {}", self.name(), k, e);
                k
            }
        }
    }
}

/// Minimum BIC over diagonal Gaussian mixtures with `1..=candidates` components.
#[derive(Debug, Clone, Copy, Default)]
pub struct BicSelector;

impl ClusterCountSelector for BicSelector {
    fn name(&self) -> &'static str {
        "bic"
    }

    fn try_select(&self, features: ArrayView2<f64>, candidates: usize) -> Result<usize> {
        let mut best: Option<(usize, f64)> = None;
        for k in 1..=candidates {
            let bic = fit_gmm(features, k)?.bic;
            if best.map_or(true, |(_, b)| bic < b) {
                best = Some((k, bic));
            }
        }
        best.map(|(k, _)| k)
            .ok_or_else(|| Error::Clustering("no candidate cluster counts".into()))
    }

    fn partition(&self, features: ArrayView2<f64>, k: usize) -> Result<Vec<usize>> {
        Ok(fit_gmm(features, k)?.labels)
    }
}

/// Maximum curvature of the k-means inertia curve.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElbowSelector;

impl ElbowSelector {
    /// Index of the largest second difference, offset by two to a count.
    pub fn elbow_of(inertias: &[f64]) -> usize {
        let second: Vec<f64> = inertias
            .windows(3)
            .map(|w| (w[2] - w[1]) - (w[1] - w[0]))
            .collect();
        let mut best = 0;
        for (i, &d) in second.iter().enumerate() {
            if d > second[best] {
                best = i;
            }
        }
        best + 2
    }
}

impl ClusterCountSelector for ElbowSelector {
    fn name(&self) -> &'static str {
        "elbow"
    }

    fn try_select(&self, features: ArrayView2<f64>, candidates: usize) -> Result<usize> {
        if candidates < 3 {
            return Ok(candidates.min(2));
        }
        let inertias = (1..=candidates)
            .map(|k| fit_kmeans(features, k).map(|fit| fit.inertia))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::elbow_of(&inertias))
    }

    fn partition(&self, features: ArrayView2<f64>, k: usize) -> Result<Vec<usize>> {
        Ok(fit_kmeans(features, k)?.labels)
    }
}

/// Selector implementing the configured strategy.
pub fn selector_for(strategy: ClusterStrategy) -> Box<dyn ClusterCountSelector> {
    match strategy {
        ClusterStrategy::Bic => Box::new(BicSelector),
        ClusterStrategy::Elbow => Box::new(ElbowSelector),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn three_blobs() -> Array2<f64> {
        array![
            [0.0, 0.0],
            [0.1, 0.1],
            [0.0, 0.2],
            [5.0, 0.0],
            [5.1, 0.1],
            [5.0, 0.2],
            [0.0, 5.0],
            [0.1, 5.1],
            [0.2, 5.0],
        ]
    }

    #[test]
    fn test_small_samples_get_one_cluster() {
        let data = array![[0.0, 0.0], [9.0, 9.0]];
        assert_eq!(BicSelector.select_count(data.view(), 10), 1);
        assert_eq!(ElbowSelector.select_count(data.view(), 10), 1);
    }

    #[test]
    fn test_count_within_bounds() {
        let data = three_blobs();
        for max in [0, 1, 2, 4, 20] {
            for strategy in [ClusterStrategy::Bic, ClusterStrategy::Elbow] {
                let selector = selector_for(strategy);
                let k = selector.select_count(data.view(), max);
                assert!(k >= 1 && k <= max.max(1), "{} gave {k} for max {max}", selector.name());
            }
        }
    }

    #[test]
    fn test_bic_splits_separated_blobs() {
        let k = BicSelector.select_count(three_blobs().view(), 5);
        assert!((3..=5).contains(&k), "got {k}");
    }

    #[test]
    fn test_elbow_of() {
        // Sharp bend after k=3.
        assert_eq!(ElbowSelector::elbow_of(&[100.0, 60.0, 5.0, 4.0, 3.5]), 3);
        assert_eq!(ElbowSelector::elbow_of(&[10.0, 5.0, 4.0]), 2);
    }

    #[test]
    fn test_elbow_few_candidates() {
        let data = array![[0.0], [1.0], [2.0]];
        assert_eq!(ElbowSelector.select_count(data.view(), 10), 2);
        assert_eq!(ElbowSelector.select_count(data.view(), 1), 1);
    }

    #[test]
    fn test_numerical_failure_falls_back() {
        let mut data = three_blobs();
        data[[4, 1]] = f64::NAN;
        assert_eq!(BicSelector.select_count(data.view(), 10), 3);
        assert_eq!(ElbowSelector.select_count(data.view(), 10), 3);
        assert_eq!(BicSelector.select_count(data.view(), 2), 2);
    }
}
