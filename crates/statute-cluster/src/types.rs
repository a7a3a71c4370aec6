//! Result types shared by the clustering paths.

use serde::Serialize;
use statute_core::{Cluster, ConceptRecord};

use crate::report::ClusterReport;

/// Key a record is pre-grouped under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    /// Hierarchy path of the source provision, truncated per record level.
    Path(Vec<String>),
    /// Level tag, used when the source provision is unknown.
    Level(String),
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.join("/")),
            Self::Level(tag) => write!(f, "level:{tag}"),
        }
    }
}

/// Records sharing one structural key, in input order.
#[derive(Debug, Clone)]
pub struct StructuralGroup {
    pub key: GroupKey,
    pub records: Vec<ConceptRecord>,
}

/// Clusters plus the bookkeeping of one clustering request.
#[derive(Debug, Clone, Serialize)]
pub struct ClusteringOutcome {
    pub clusters: Vec<Cluster>,
    pub report: ClusterReport,
    /// Number of structural groups the input was split into.
    pub group_count: usize,
    /// Record names that were clustered with a zero vector.
    pub fallback_embeddings: Vec<String>,
}

/// Split `records` by parallel cluster labels. Clusters come out in order of
/// first appearance; a label count that does not match keeps `records` whole.
pub(crate) fn split_by_labels(records: Vec<ConceptRecord>, labels: &[usize]) -> Vec<Cluster> {
    if records.len() != labels.len() {
        tracing::warn!(
            "{} labels for {} records; keeping them in one cluster",
            labels.len(),
            records.len()
        );
        return vec![Cluster::new(records)];
    }
    let mut order: Vec<usize> = Vec::new();
    let mut clusters: Vec<Cluster> = Vec::new();
    for (record, &label) in records.into_iter().zip(labels) {
        match order.iter().position(|&l| l == label) {
            Some(i) => clusters[i].records.push(record),
            None => {
                order.push(label);
                clusters.push(Cluster::new(vec![record]));
            }
        }
    }
    clusters
}
