//! Statute Core: level taxonomy, provision and concept record types, configuration.

pub mod config;
pub mod error;
pub mod level;
pub mod provision;
pub mod record;

pub use config::{ClusterStrategy, ClusteringConfig, ParserConfig, SimilarityWeights, StatuteConfig};
pub use error::{Error, Result};
pub use level::Level;
pub use provision::{CrossReference, HierarchyIndex, HierarchyNode, Provision};
pub use record::{Cluster, ConceptRecord};
