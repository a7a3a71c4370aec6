//! Concept records produced by the external extractor, and clusters of them.

use serde::{Deserialize, Serialize};

use crate::level::Level;

/// An extracted entity or concept tied to the provision it came from.
///
/// Only the named fields are read by this workspace; anything else the
/// extractor emits travels through `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    pub source_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ConceptRecord {
    pub fn new(
        name: impl Into<String>,
        entity_type: impl Into<String>,
        level: Option<Level>,
        source_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            level,
            source_id: source_id.into(),
            embedding: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Level tag for grouping and reports; `unknown` when the extractor gave none.
    pub fn level_tag(&self) -> &'static str {
        self.level.map(Level::as_str).unwrap_or("unknown")
    }
}

/// A group of records. Ephemeral: recomputed on every clustering request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cluster {
    pub records: Vec<ConceptRecord>,
}

impl Cluster {
    pub fn new(records: Vec<ConceptRecord>) -> Self {
        Self { records }
    }

    /// Number of records in the cluster.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
