//! Summary statistics over a set of clusters.

use std::collections::BTreeMap;

use serde::Serialize;
use statute_core::Cluster;

/// Aggregate statistics of one clustering result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusterReport {
    pub total_clusters: usize,
    pub total_records: usize,
    pub avg_cluster_size: f64,
    pub min_cluster_size: usize,
    pub max_cluster_size: usize,
    /// Record count per level tag.
    pub level_distribution: BTreeMap<String, usize>,
    /// Record count per entity type.
    pub type_distribution: BTreeMap<String, usize>,
}

impl ClusterReport {
    pub fn from_clusters(clusters: &[Cluster]) -> Self {
        if clusters.is_empty() {
            return Self::default();
        }

        let sizes: Vec<usize> = clusters.iter().map(Cluster::len).collect();
        let total_records: usize = sizes.iter().sum();
        let mut level_distribution = BTreeMap::new();
        let mut type_distribution = BTreeMap::new();
        for record in clusters.iter().flat_map(|c| &c.records) {
            *level_distribution
                .entry(record.level_tag().to_string())
                .or_insert(0) += 1;
            *type_distribution
                .entry(record.entity_type.clone())
                .or_insert(0) += 1;
        }

        Self {
            total_clusters: clusters.len(),
            total_records,
            avg_cluster_size: total_records as f64 / clusters.len() as f64,
            min_cluster_size: sizes.iter().copied().min().unwrap_or(0),
            max_cluster_size: sizes.iter().copied().max().unwrap_or(0),
            level_distribution,
            type_distribution,
        }
    }
}
