//! The injected embedding capability.

use std::future::Future;

use serde::{Deserialize, Serialize};
use statute_core::{Error, Result};

/// A nearest-neighbour hit, optionally carrying its stored vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    pub name: String,
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// Vector store lookup plus on-demand embedding generation.
///
/// No latency guarantee; every call may fail and callers treat failures as
/// per-record soft errors.
pub trait EmbeddingSource: Send + Sync {
    /// Up to `top_k` stored entries closest to `name`.
    fn query(&self, name: &str, top_k: usize) -> impl Future<Output = Result<Vec<VectorMatch>>> + Send;

    /// Generate one vector per text.
    fn embed(&self, texts: &[String]) -> impl Future<Output = Result<Vec<Vec<f32>>>> + Send;

    /// Vector dimension, or 0 when unknown.
    fn dimension(&self) -> usize;
}

/// Source with nothing stored and no generator behind it.
pub struct NoopEmbedder {
    dim: usize,
}

impl NoopEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl EmbeddingSource for NoopEmbedder {
    async fn query(&self, _name: &str, _top_k: usize) -> Result<Vec<VectorMatch>> {
        Ok(Vec::new())
    }

    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(Error::Embedding("no embedding backend configured".into()))
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_embedder() {
        let noop = NoopEmbedder::new(8);
        assert!(noop.query("anything", 3).await.unwrap().is_empty());
        assert!(noop.embed(&["x".to_string()]).await.is_err());
        assert_eq!(noop.dimension(), 8);
    }
}
