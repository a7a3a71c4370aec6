//! Parser, similarity and clustering configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Smallest number of leading lines the title scan may look at.
pub const MIN_TITLE_SCAN_LINES: usize = 10;

/// Settings for turning raw text into provisions and chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// How many leading lines are searched for a document title.
    pub title_scan_lines: usize,
    /// Title used when no unmarked line is found.
    pub default_title: String,
    /// Type tag stamped on parsed documents.
    pub document_type: String,
    /// Part/Chapter/Section bodies longer than this are split into several chunks.
    pub max_chunk_chars: usize,
    /// Characters shared between consecutive chunks of one provision.
    pub chunk_overlap_chars: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            title_scan_lines: MIN_TITLE_SCAN_LINES,
            default_title: "Legal Document".to_string(),
            document_type: "legal_code".to_string(),
            max_chunk_chars: 2048,
            chunk_overlap_chars: 256,
        }
    }
}

/// Which model-order policy picks the number of clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterStrategy {
    /// Gaussian mixture fits, minimum BIC.
    Bic,
    /// K-means inertia curve, maximum curvature.
    Elbow,
}

impl std::str::FromStr for ClusterStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "bic" | "gmm" => Ok(Self::Bic),
            "elbow" | "kmeans" => Ok(Self::Elbow),
            other => Err(Error::Config(format!("unknown cluster strategy: {other}"))),
        }
    }
}

/// Weights of the legal-structure similarity terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityWeights {
    pub level_match: f64,
    pub path: f64,
    pub cross_reference: f64,
    /// Multiplier applied to `cross_reference` when one provision cites the other.
    pub cross_reference_boost: f64,
    pub entity_type: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            level_match: 0.3,
            path: 0.4,
            cross_reference: 0.2,
            cross_reference_boost: 1.5,
            entity_type: 0.1,
        }
    }
}

/// Settings for grouping concept records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Upper bound on clusters per structural group.
    pub max_clusters: usize,
    /// Groups smaller than this are kept whole.
    pub min_cluster_size: usize,
    pub strategy: ClusterStrategy,
    /// Share of cosine similarity in the blended score.
    pub semantic_weight: f64,
    /// Share of legal-structure similarity in the blended score.
    pub legal_weight: f64,
    /// Candidates requested from the nearest-neighbour lookup per record.
    pub embedding_top_k: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            max_clusters: 10,
            min_cluster_size: 3,
            strategy: ClusterStrategy::Bic,
            semantic_weight: 0.6,
            legal_weight: 0.4,
            embedding_top_k: 1,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatuteConfig {
    pub parser: ParserConfig,
    pub clustering: ClusteringConfig,
    pub similarity: SimilarityWeights,
}

impl StatuteConfig {
    /// Load from a JSON file; absent fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `STATUTE_*` environment overrides on top of `self`.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(v) = env_usize("STATUTE_MAX_CLUSTERS")? {
            self.clustering.max_clusters = v;
        }
        if let Some(v) = env_usize("STATUTE_MIN_CLUSTER_SIZE")? {
            self.clustering.min_cluster_size = v;
        }
        if let Ok(v) = std::env::var("STATUTE_CLUSTER_STRATEGY") {
            self.clustering.strategy = v.parse()?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Create configuration from defaults and environment.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    pub fn validate(&self) -> Result<()> {
        if self.parser.title_scan_lines < MIN_TITLE_SCAN_LINES {
            return Err(Error::Config(format!(
                "title_scan_lines must be at least {MIN_TITLE_SCAN_LINES}, got {}",
                self.parser.title_scan_lines
            )));
        }
        if self.parser.max_chunk_chars == 0 {
            return Err(Error::Config("max_chunk_chars must be positive".into()));
        }
        let w = &self.similarity;
        let c = &self.clustering;
        let weights = [
            ("level_match", w.level_match),
            ("path", w.path),
            ("cross_reference", w.cross_reference),
            ("cross_reference_boost", w.cross_reference_boost),
            ("entity_type", w.entity_type),
            ("semantic_weight", c.semantic_weight),
            ("legal_weight", c.legal_weight),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!("{name} must be a non-negative number")));
            }
        }
        Ok(())
    }
}

fn env_usize(key: &str) -> Result<Option<usize>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{key} must be an unsigned integer, got {raw:?}"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = StatuteConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.clustering.max_clusters, 10);
        assert_eq!(config.similarity.cross_reference_boost, 1.5);
        assert_eq!(config.parser.default_title, "Legal Document");
    }

    #[test]
    fn test_partial_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"clustering": {{"max_clusters": 4, "strategy": "elbow"}}}}"#
        )
        .unwrap();
        let config = StatuteConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.clustering.max_clusters, 4);
        assert_eq!(config.clustering.strategy, ClusterStrategy::Elbow);
        assert_eq!(config.clustering.min_cluster_size, 3);
        assert_eq!(config.parser.title_scan_lines, 10);
    }

    #[test]
    fn test_rejects_short_title_scan() {
        let mut config = StatuteConfig::default();
        config.parser.title_scan_lines = 3;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_negative_weight() {
        let mut config = StatuteConfig::default();
        config.similarity.path = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("BIC".parse::<ClusterStrategy>().unwrap(), ClusterStrategy::Bic);
        assert_eq!("kmeans".parse::<ClusterStrategy>().unwrap(), ClusterStrategy::Elbow);
        assert!("dbscan".parse::<ClusterStrategy>().is_err());
    }
}
