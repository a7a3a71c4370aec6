//! Statute Infer: embedding capability, vector cache, record embedding resolution.
//!
//! Embeddings are never generated here. Callers inject an [`EmbeddingSource`]
//! (nearest-neighbour lookup plus on-demand generation) and records without a
//! usable vector fall back to zeros.

pub mod cache;
pub mod embedder;
pub mod resolve;

pub use cache::EmbeddingCache;
pub use embedder::{EmbeddingSource, NoopEmbedder, VectorMatch};
pub use resolve::{EmbeddingResolver, ResolvedEmbeddings};
