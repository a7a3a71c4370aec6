//! Concurrent per-record embedding resolution with a zero-vector fallback.

use std::collections::HashMap;

use futures::future::join_all;
use ndarray::Array1;
use statute_core::ConceptRecord;
use tracing::{debug, info, warn};

use crate::cache::EmbeddingCache;
use crate::embedder::EmbeddingSource;

/// Vectors for every distinct record name of a request, fully materialised.
#[derive(Debug, Clone, Default)]
pub struct ResolvedEmbeddings {
    vectors: HashMap<String, Array1<f32>>,
    /// Names that received the zero-vector fallback.
    pub fallbacks: Vec<String>,
    pub dimension: usize,
}

impl ResolvedEmbeddings {
    /// Vector for a record; zeros when the name was never resolved.
    pub fn vector_for(&self, record: &ConceptRecord) -> Array1<f32> {
        self.vectors
            .get(&record.name)
            .cloned()
            .unwrap_or_else(|| Array1::zeros(self.dimension))
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

/// Looks up record vectors through an [`EmbeddingSource`].
///
/// Order of preference per name: vector carried on the record, cache,
/// nearest-neighbour hit carrying a vector, on-demand generation.
pub struct EmbeddingResolver<'a, E: EmbeddingSource> {
    source: &'a E,
    cache: Option<&'a EmbeddingCache>,
    top_k: usize,
}

impl<'a, E: EmbeddingSource> EmbeddingResolver<'a, E> {
    pub fn new(source: &'a E, top_k: usize) -> Self {
        Self {
            source,
            cache: None,
            top_k: top_k.max(1),
        }
    }

    pub fn with_cache(mut self, cache: &'a EmbeddingCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub async fn resolve(&self, records: &[ConceptRecord]) -> ResolvedEmbeddings {
        let mut vectors: HashMap<String, Array1<f32>> = HashMap::new();
        let mut pending: Vec<&str> = Vec::new();

        for record in records {
            if vectors.contains_key(&record.name) || pending.contains(&record.name.as_str()) {
                continue;
            }
            match &record.embedding {
                Some(v) if !v.is_empty() => {
                    vectors.insert(record.name.clone(), Array1::from_vec(v.clone()));
                }
                _ => pending.push(&record.name),
            }
        }

        let looked_up = join_all(pending.iter().map(|name| self.lookup(name))).await;

        let mut fallbacks = Vec::new();
        for (name, found) in pending.iter().zip(looked_up) {
            match found {
                Some(v) => {
                    if let Some(cache) = self.cache {
                        cache.put(name.to_string(), v.clone());
                    }
                    vectors.insert(name.to_string(), v);
                }
                None => fallbacks.push(name.to_string()),
            }
        }

        let dimension = match self.source.dimension() {
            0 => dominant_dimension(&vectors),
            d => d,
        };
        for name in &fallbacks {
            vectors.insert(name.clone(), Array1::zeros(dimension));
        }
        if !fallbacks.is_empty() {
            warn!(
                "{} of {} record names have no embedding; using zero vectors",
                fallbacks.len(),
                vectors.len()
            );
        }
        info!("Resolved embeddings for {} record names (dim={})", vectors.len(), dimension);

        ResolvedEmbeddings {
            vectors,
            fallbacks,
            dimension,
        }
    }

    async fn lookup(&self, name: &str) -> Option<Array1<f32>> {
        if let Some(v) = self.cache.and_then(|c| c.get(name)) {
            return Some(v);
        }

        match self.source.query(name, self.top_k).await {
            Ok(matches) => {
                if let Some(v) = matches.into_iter().next().and_then(|m| m.embedding) {
                    if !v.is_empty() {
                        return Some(Array1::from_vec(v));
                    }
                }
            }
            Err(e) => debug!("Vector lookup failed for {:?}: {}", name, e),
        }

        match self.source.embed(&[name.to_string()]).await {
            Ok(mut generated) if !generated.is_empty() && !generated[0].is_empty() => {
                Some(Array1::from_vec(generated.swap_remove(0)))
            }
            Ok(_) => {
                debug!("Embedding generator returned nothing for {:?}", name);
                None
            }
            Err(e) => {
                debug!("Embedding generation failed for {:?}: {}", name, e);
                None
            }
        }
    }
}

/// Most common vector length, 0 when there are no vectors.
fn dominant_dimension(vectors: &HashMap<String, Array1<f32>>) -> usize {
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for v in vectors.values() {
        *counts.entry(v.len()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by_key(|&(dim, count)| (count, dim))
        .map(|(dim, _)| dim)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::{NoopEmbedder, VectorMatch};
    use statute_core::{Error, Level, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Stores vectors for some names and generates for names starting with "gen".
    struct TableSource {
        queries: AtomicUsize,
    }

    impl EmbeddingSource for TableSource {
        async fn query(&self, name: &str, _top_k: usize) -> Result<Vec<VectorMatch>> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            match name {
                "stored" => Ok(vec![VectorMatch {
                    name: name.into(),
                    score: 1.0,
                    embedding: Some(vec![1.0, 0.0, 0.0]),
                }]),
                "broken" => Err(Error::Embedding("store offline".into())),
                _ => Ok(vec![VectorMatch {
                    name: "neighbour".into(),
                    score: 0.4,
                    embedding: None,
                }]),
            }
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if texts[0].starts_with("gen") {
                Ok(vec![vec![0.0, 1.0, 0.0]])
            } else {
                Err(Error::Embedding("generator refused".into()))
            }
        }

        fn dimension(&self) -> usize {
            3
        }
    }

    fn record(name: &str) -> ConceptRecord {
        ConceptRecord::new(name, "legal_concept", Some(Level::Clause), "clause-1")
    }

    #[tokio::test]
    async fn test_resolution_order_and_fallback() {
        let source = TableSource {
            queries: AtomicUsize::new(0),
        };
        let records = vec![
            record("stored"),
            record("generated"),
            record("broken"),
            record("carried").with_embedding(vec![0.0, 0.0, 1.0]),
            record("stored"),
        ];
        let resolved = EmbeddingResolver::new(&source, 1).resolve(&records).await;

        assert_eq!(resolved.len(), 4);
        assert_eq!(resolved.vector_for(&records[0]).to_vec(), vec![1.0, 0.0, 0.0]);
        assert_eq!(resolved.vector_for(&records[1]).to_vec(), vec![0.0, 1.0, 0.0]);
        assert_eq!(resolved.vector_for(&records[2]).to_vec(), vec![0.0, 0.0, 0.0]);
        assert_eq!(resolved.vector_for(&records[3]).to_vec(), vec![0.0, 0.0, 1.0]);
        assert_eq!(resolved.fallbacks, vec!["broken".to_string()]);
        // Duplicate and carried names are not queried.
        assert_eq!(source.queries.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_cache_short_circuits_lookup() {
        let source = TableSource {
            queries: AtomicUsize::new(0),
        };
        let cache = EmbeddingCache::default();
        let records = vec![record("stored")];
        EmbeddingResolver::new(&source, 1)
            .with_cache(&cache)
            .resolve(&records)
            .await;
        EmbeddingResolver::new(&source, 1)
            .with_cache(&cache)
            .resolve(&records)
            .await;
        assert_eq!(source.queries.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_no_backend_all_zero() {
        let records: Vec<ConceptRecord> = (0..5).map(|i| record(&format!("c{i}"))).collect();
        let resolved = EmbeddingResolver::new(&NoopEmbedder::new(4), 1)
            .resolve(&records)
            .await;
        assert_eq!(resolved.fallbacks.len(), 5);
        assert!(records
            .iter()
            .all(|r| resolved.vector_for(r).iter().all(|&x| x == 0.0)));
        assert_eq!(resolved.dimension, 4);
    }

    #[test]
    fn test_dominant_dimension() {
        let mut vectors = HashMap::new();
        vectors.insert("a".to_string(), Array1::zeros(3));
        vectors.insert("b".to_string(), Array1::zeros(3));
        vectors.insert("c".to_string(), Array1::zeros(5));
        assert_eq!(dominant_dimension(&vectors), 3);
        assert_eq!(dominant_dimension(&HashMap::new()), 0);
    }
}
