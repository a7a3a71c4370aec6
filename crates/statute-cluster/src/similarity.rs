//! Hybrid similarity: cosine of embeddings blended with legal-structure terms.

use std::collections::HashMap;

use ndarray::{Array1, Array2};
use statute_core::{ConceptRecord, Level, Provision, SimilarityWeights, StatuteConfig};

/// Source provisions keyed by id.
pub type ProvisionLookup<'a> = HashMap<&'a str, &'a Provision>;

/// Index provisions by id for the duration of one request.
pub fn provision_lookup(provisions: &[Provision]) -> ProvisionLookup<'_> {
    provisions.iter().map(|p| (p.id.as_str(), p)).collect()
}

/// Length of the common prefix over the length of the longer path.
/// Zero when either path is empty.
pub fn path_similarity(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let common = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    common as f64 / a.len().max(b.len()) as f64
}

/// Scale to unit L2 norm; a zero vector is left as is.
fn normalized(v: &Array1<f32>) -> Array1<f64> {
    let v = v.mapv(f64::from);
    let norm = v.dot(&v).sqrt();
    if norm > 0.0 {
        v / norm
    } else {
        v
    }
}

/// Pairwise cosine similarity. Vectors of differing dimension score 0.
pub fn cosine_similarity_matrix(vectors: &[Array1<f32>]) -> Array2<f64> {
    let n = vectors.len();
    let unit: Vec<Array1<f64>> = vectors.iter().map(normalized).collect();
    let mut out = Array2::zeros((n, n));
    for i in 0..n {
        for j in i..n {
            let s = if unit[i].len() == unit[j].len() {
                unit[i].dot(&unit[j])
            } else {
                0.0
            };
            out[[i, j]] = s;
            out[[j, i]] = s;
        }
    }
    out
}

/// Blends embedding cosine with the legal-structure score of record pairs.
#[derive(Debug, Clone)]
pub struct HybridSimilarity {
    weights: SimilarityWeights,
    semantic_weight: f64,
    legal_weight: f64,
}

impl Default for HybridSimilarity {
    fn default() -> Self {
        Self::from_config(&StatuteConfig::default())
    }
}

impl HybridSimilarity {
    pub fn new(weights: SimilarityWeights, semantic_weight: f64, legal_weight: f64) -> Self {
        Self {
            weights,
            semantic_weight,
            legal_weight,
        }
    }

    /// Weights from the `similarity` and `clustering` config sections.
    pub fn from_config(config: &StatuteConfig) -> Self {
        Self::new(
            config.similarity.clone(),
            config.clustering.semantic_weight,
            config.clustering.legal_weight,
        )
    }

    /// Structure-only similarity of two records, capped at 1.0.
    ///
    /// `pa`/`pb` are the records' source provisions when known; the path and
    /// cross-reference terms need both.
    pub fn legal_similarity(
        &self,
        a: &ConceptRecord,
        b: &ConceptRecord,
        pa: Option<&Provision>,
        pb: Option<&Provision>,
    ) -> f64 {
        let w = &self.weights;
        let mut score = 0.0;

        if let (Some(la), Some(lb)) = (a.level, b.level) {
            if la == lb {
                score += w.level_match * la.weight() / Level::max_weight();
            }
        }

        if let (Some(pa), Some(pb)) = (pa, pb) {
            score += w.path * path_similarity(&pa.hierarchy_path, &pb.hierarchy_path);
            if pa.references(&pb.id) || pb.references(&pa.id) {
                score += w.cross_reference * w.cross_reference_boost;
            }
        }

        if a.entity_type == b.entity_type {
            score += w.entity_type;
        }

        score.min(1.0)
    }

    /// Blended similarity for every pair, in `[0, 1]` with a unit diagonal.
    pub fn combined_matrix(
        &self,
        records: &[ConceptRecord],
        vectors: &[Array1<f32>],
        provisions: &ProvisionLookup<'_>,
    ) -> Array2<f64> {
        let n = records.len();
        let semantic = cosine_similarity_matrix(vectors);
        let sources: Vec<Option<&Provision>> = records
            .iter()
            .map(|r| provisions.get(r.source_id.as_str()).copied())
            .collect();

        let mut out = Array2::zeros((n, n));
        for i in 0..n {
            out[[i, i]] = 1.0;
            for j in (i + 1)..n {
                let legal =
                    self.legal_similarity(&records[i], &records[j], sources[i], sources[j]);
                let sem = semantic.get((i, j)).copied().unwrap_or(0.0);
                let s = (self.semantic_weight * sem + self.legal_weight * legal).clamp(0.0, 1.0);
                out[[i, j]] = s;
                out[[j, i]] = s;
            }
        }
        out
    }

    /// `1 - combined`, zero on the diagonal.
    pub fn distance_matrix(
        &self,
        records: &[ConceptRecord],
        vectors: &[Array1<f32>],
        provisions: &ProvisionLookup<'_>,
    ) -> Array2<f64> {
        self.combined_matrix(records, vectors, provisions)
            .mapv(|s| 1.0 - s)
    }
}
