//! Structure-blind two-level clustering over record embeddings alone.

use ndarray::{Array1, Array2};
use statute_core::{Cluster, ConceptRecord, Error, Result, StatuteConfig};
use statute_infer::{EmbeddingCache, EmbeddingResolver, EmbeddingSource, ResolvedEmbeddings};
use tracing::{debug, info, warn};

use crate::report::ClusterReport;
use crate::selector::{ClusterCountSelector, ElbowSelector};
use crate::types::{split_by_labels, ClusteringOutcome};

/// Upper bound on first-level groups.
pub const COARSE_MAX_GROUPS: usize = 5;
/// Upper bound on second-level groups per coarse group.
pub const FINE_MAX_GROUPS: usize = 3;

/// Stack equally sized vectors into a row-per-record matrix.
pub fn feature_matrix(vectors: &[Array1<f32>]) -> Result<Array2<f64>> {
    let dim = vectors.first().map_or(0, |v| v.len());
    if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
        return Err(Error::Clustering(format!(
            "mixed embedding dimensions {} and {}",
            dim,
            bad.len()
        )));
    }
    let mut out = Array2::zeros((vectors.len(), dim));
    for (i, v) in vectors.iter().enumerate() {
        out.row_mut(i).assign(&v.mapv(f64::from));
    }
    Ok(out)
}

/// Two-level clustering that ignores document structure.
pub struct SemanticClusterer {
    min_cluster_size: usize,
    top_k: usize,
    selector: Box<dyn ClusterCountSelector>,
}

impl SemanticClusterer {
    /// Uses the elbow selector regardless of the configured strategy.
    pub fn new(config: &StatuteConfig) -> Self {
        Self {
            min_cluster_size: config.clustering.min_cluster_size,
            top_k: config.clustering.embedding_top_k,
            selector: Box::new(ElbowSelector),
        }
    }

    pub fn with_selector(mut self, selector: Box<dyn ClusterCountSelector>) -> Self {
        self.selector = selector;
        self
    }

    /// Cluster `records` by embedding alone. Every record lands in exactly one cluster.
    pub async fn cluster<E: EmbeddingSource>(
        &self,
        source: &E,
        cache: Option<&EmbeddingCache>,
        records: Vec<ConceptRecord>,
    ) -> ClusteringOutcome {
        let n = records.len();
        if n == 0 || n < self.min_cluster_size {
            let clusters: Vec<Cluster> = if n == 0 {
                Vec::new()
            } else {
                vec![Cluster::new(records)]
            };
            return ClusteringOutcome {
                report: ClusterReport::from_clusters(&clusters),
                group_count: clusters.len(),
                clusters,
                fallback_embeddings: Vec::new(),
            };
        }

        let mut resolver = EmbeddingResolver::new(source, self.top_k);
        if let Some(cache) = cache {
            resolver = resolver.with_cache(cache);
        }
        let embeddings = resolver.resolve(&records).await;

        let coarse = self.split(records, &embeddings, COARSE_MAX_GROUPS.min(n / 2));
        let group_count = coarse.len();

        let mut clusters = Vec::new();
        for group in coarse {
            let m = group.len();
            if m >= self.min_cluster_size {
                let fine = self.split(group.records, &embeddings, FINE_MAX_GROUPS.min(m / 2));
                clusters.extend(fine);
            } else {
                clusters.push(group);
            }
        }
        let report = ClusterReport::from_clusters(&clusters);

        info!(
            "Semantic clustering: {} records, {} coarse groups, {} clusters",
            n,
            group_count,
            clusters.len()
        );

        ClusteringOutcome {
            clusters,
            report,
            group_count,
            fallback_embeddings: embeddings.fallbacks,
        }
    }

    /// Split into at most `max_groups` clusters. Groups no larger than
    /// `max_groups` become singletons; failures keep the group whole.
    fn split(
        &self,
        records: Vec<ConceptRecord>,
        embeddings: &ResolvedEmbeddings,
        max_groups: usize,
    ) -> Vec<Cluster> {
        if records.len() <= max_groups {
            return records.into_iter().map(|r| Cluster::new(vec![r])).collect();
        }

        let vectors: Vec<Array1<f32>> =
            records.iter().map(|r| embeddings.vector_for(r)).collect();
        let features = match feature_matrix(&vectors) {
            Ok(features) => features,
            Err(e) => {
                warn!("Keeping {} records together: {}", records.len(), e);
                return vec![Cluster::new(records)];
            }
        };

        let k = self.selector.select_count(features.view(), max_groups);
        debug!("Semantic split of {} records: k={}", records.len(), k);
        if k <= 1 {
            return vec![Cluster::new(records)];
        }
        match self.selector.partition(features.view(), k) {
            Ok(labels) => split_by_labels(records, &labels),
            Err(e) => {
                warn!("Keeping {} records together: {}", records.len(), e);
                vec![Cluster::new(records)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statute_core::Level;
    use statute_infer::NoopEmbedder;

    fn record(name: &str, v: [f32; 2]) -> ConceptRecord {
        ConceptRecord::new(name, "concept", Some(Level::Article), "article-1")
            .with_embedding(v.to_vec())
    }

    fn two_topics() -> Vec<ConceptRecord> {
        let mut records = Vec::new();
        for i in 0..6 {
            let jitter = i as f32 * 0.01;
            records.push(record(&format!("tax{i}"), [1.0, jitter]));
            records.push(record(&format!("court{i}"), [jitter, -1.0]));
        }
        records
    }

    fn names(cluster: &Cluster) -> Vec<&str> {
        cluster.records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_feature_matrix() {
        let rows = [
            Array1::from_vec(vec![1.0, 2.0]),
            Array1::from_vec(vec![3.0, 4.0]),
        ];
        let m = feature_matrix(&rows).unwrap();
        assert_eq!(m[[1, 0]], 3.0);
        assert!(feature_matrix(&[Array1::zeros(2), Array1::zeros(3)]).is_err());
    }

    #[tokio::test]
    async fn test_below_minimum_is_one_cluster() {
        let clusterer = SemanticClusterer::new(&StatuteConfig::default());
        let records = vec![record("a", [1.0, 0.0]), record("b", [0.0, 1.0])];
        let outcome = clusterer.cluster(&NoopEmbedder::new(2), None, records).await;
        assert_eq!(outcome.clusters.len(), 1);
        assert_eq!(outcome.clusters[0].len(), 2);
    }

    #[tokio::test]
    async fn test_topics_are_not_mixed() {
        let clusterer = SemanticClusterer::new(&StatuteConfig::default());
        let outcome = clusterer.cluster(&NoopEmbedder::new(2), None, two_topics()).await;

        assert_eq!(outcome.report.total_records, 12);
        assert!(outcome.fallback_embeddings.is_empty());
        for cluster in &outcome.clusters {
            let members = names(cluster);
            let taxes = members.iter().filter(|n| n.starts_with("tax")).count();
            assert!(taxes == 0 || taxes == members.len(), "mixed cluster {members:?}");
        }
    }

    #[tokio::test]
    async fn test_pair_is_never_split() {
        let mut config = StatuteConfig::default();
        config.clustering.min_cluster_size = 1;
        let clusterer = SemanticClusterer::new(&config);
        let records = vec![record("a", [1.0, 0.0]), record("b", [0.0, 1.0])];
        // Two samples are too few for model selection at either level.
        let outcome = clusterer.cluster(&NoopEmbedder::new(2), None, records).await;
        assert_eq!(outcome.clusters.len(), 1);
        assert_eq!(outcome.group_count, 1);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let clusterer = SemanticClusterer::new(&StatuteConfig::default());
        let outcome = clusterer.cluster(&NoopEmbedder::new(2), None, Vec::new()).await;
        assert!(outcome.clusters.is_empty());
    }
}
