//! Statute Cluster: groups concept records extracted from legal provisions.
//!
//! Records are first pre-grouped by where their source provision sits in the
//! document hierarchy. Each large enough group is then split using a hybrid
//! of embedding cosine and legal-structure similarity, with the number of
//! clusters chosen by BIC over Gaussian mixtures or by the k-means elbow.

pub mod gmm;
pub mod kmeans;
pub mod pipeline;
pub mod report;
pub mod selector;
pub mod semantic;
pub mod similarity;
pub mod structural;
pub mod types;

pub use pipeline::LegalClusterer;
pub use report::ClusterReport;
pub use selector::{selector_for, BicSelector, ClusterCountSelector, ElbowSelector};
pub use semantic::SemanticClusterer;
pub use similarity::{
    cosine_similarity_matrix, path_similarity, provision_lookup, HybridSimilarity,
};
pub use structural::{group_by_structure, group_key};
pub use types::{ClusteringOutcome, GroupKey, StructuralGroup};
