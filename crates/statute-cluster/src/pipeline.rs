//! Structure-aware clustering: structural pre-grouping, then per-group
//! hybrid-similarity clustering.

use std::time::Instant;

use ndarray::Array1;
use statute_core::{Cluster, ClusteringConfig, ConceptRecord, Provision, StatuteConfig};
use statute_infer::{EmbeddingCache, EmbeddingResolver, EmbeddingSource, ResolvedEmbeddings};
use tracing::{debug, info, warn};

use crate::report::ClusterReport;
use crate::selector::{selector_for, ClusterCountSelector};
use crate::similarity::{provision_lookup, HybridSimilarity, ProvisionLookup};
use crate::structural::group_by_structure;
use crate::types::{split_by_labels, ClusteringOutcome, StructuralGroup};

/// Clusters concept records within their structural neighbourhoods.
pub struct LegalClusterer {
    config: ClusteringConfig,
    similarity: HybridSimilarity,
    selector: Box<dyn ClusterCountSelector>,
}

impl LegalClusterer {
    /// Clusterer with the configured weights and cluster-count strategy.
    pub fn new(config: &StatuteConfig) -> Self {
        Self {
            config: config.clustering.clone(),
            similarity: HybridSimilarity::from_config(config),
            selector: selector_for(config.clustering.strategy),
        }
    }

    /// Replace the configured cluster-count strategy.
    pub fn with_selector(mut self, selector: Box<dyn ClusterCountSelector>) -> Self {
        self.selector = selector;
        self
    }

    /// Cluster `records` whose `source_id`s point into `provisions`.
    ///
    /// Embeddings are resolved only for groups large enough to be split.
    /// Every input record appears in exactly one output cluster.
    pub async fn cluster<E: EmbeddingSource>(
        &self,
        source: &E,
        cache: Option<&EmbeddingCache>,
        records: Vec<ConceptRecord>,
        provisions: &[Provision],
    ) -> ClusteringOutcome {
        let start = Instant::now();
        let total = records.len();
        let lookup = provision_lookup(provisions);
        let groups = group_by_structure(records, &lookup);
        let group_count = groups.len();

        let to_embed: Vec<ConceptRecord> = groups
            .iter()
            .filter(|g| self.is_splittable(g))
            .flat_map(|g| g.records.iter().cloned())
            .collect();
        let embeddings = if to_embed.is_empty() {
            ResolvedEmbeddings::default()
        } else {
            let mut resolver = EmbeddingResolver::new(source, self.config.embedding_top_k);
            if let Some(cache) = cache {
                resolver = resolver.with_cache(cache);
            }
            resolver.resolve(&to_embed).await
        };

        let clusters: Vec<Cluster> = groups
            .into_iter()
            .flat_map(|group| self.cluster_group(group, &lookup, &embeddings))
            .collect();
        let report = ClusterReport::from_clusters(&clusters);

        info!(
            "Clustered {} records into {} clusters from {} structural groups ({}, {}ms)",
            total,
            clusters.len(),
            group_count,
            self.selector.name(),
            start.elapsed().as_millis()
        );

        ClusteringOutcome {
            clusters,
            report,
            group_count,
            fallback_embeddings: embeddings.fallbacks,
        }
    }

    fn is_splittable(&self, group: &StructuralGroup) -> bool {
        group.records.len() >= self.config.min_cluster_size.max(1)
    }

    /// Split one structural group. Numerical failures keep the group whole.
    pub fn cluster_group(
        &self,
        group: StructuralGroup,
        provisions: &ProvisionLookup<'_>,
        embeddings: &ResolvedEmbeddings,
    ) -> Vec<Cluster> {
        if !self.is_splittable(&group) {
            return vec![Cluster::new(group.records)];
        }

        let vectors: Vec<Array1<f32>> = group
            .records
            .iter()
            .map(|r| embeddings.vector_for(r))
            .collect();
        let distances = self
            .similarity
            .distance_matrix(&group.records, &vectors, provisions);

        let k = self
            .selector
            .select_count(distances.view(), self.config.max_clusters);
        debug!("Group {} ({} records): k={}", group.key, group.records.len(), k);
        if k <= 1 {
            return vec![Cluster::new(group.records)];
        }

        match self.selector.partition(distances.view(), k) {
            Ok(labels) => split_by_labels(group.records, &labels),
            Err(e) => {
                warn!("Keeping group {} whole: {}", group.key, e);
                vec![Cluster::new(group.records)]
            }
        }
    }
}
