//! Whole-document parsing: provisions, hierarchy, references, title, statistics.

use std::collections::BTreeMap;

use serde::Serialize;
use sha2::{Digest, Sha256};
use statute_core::{HierarchyIndex, Level, ParserConfig, Provision};
use tracing::info;

use crate::extract::{extract_provisions, extract_title};
use crate::hierarchy::build_hierarchy;
use crate::references::{extract_cross_references, resolve_references};

/// Aggregate shape of a parsed document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentStatistics {
    pub provision_count: usize,
    pub level_counts: BTreeMap<Level, usize>,
    pub max_depth: usize,
    pub root_count: usize,
    pub cross_reference_count: usize,
}

impl DocumentStatistics {
    pub fn compute(provisions: &[Provision]) -> Self {
        let mut stats = Self {
            provision_count: provisions.len(),
            ..Default::default()
        };
        for p in provisions {
            *stats.level_counts.entry(p.level).or_insert(0) += 1;
            stats.max_depth = stats.max_depth.max(p.depth());
            stats.cross_reference_count += p.cross_references.len();
            if p.is_root() {
                stats.root_count += 1;
            }
        }
        stats
    }
}

/// A parsed legal document.
#[derive(Debug, Clone, Serialize)]
pub struct LegalDocument {
    pub id: String,
    pub title: String,
    pub document_type: String,
    pub provisions: Vec<Provision>,
    pub hierarchy: HierarchyIndex,
    pub statistics: DocumentStatistics,
}

impl LegalDocument {
    pub fn provision(&self, id: &str) -> Option<&Provision> {
        self.provisions.iter().find(|p| p.id == id)
    }
}

/// Parse `text` into provisions linked by hierarchy and cross-references.
pub fn parse_document(text: &str, document_id: &str, config: &ParserConfig) -> LegalDocument {
    let mut provisions = extract_provisions(text);
    for provision in provisions.iter_mut() {
        provision.document_id = document_id.to_string();
        provision.cross_references = extract_cross_references(&provision.body);
    }
    let hierarchy = build_hierarchy(&mut provisions);
    resolve_references(&mut provisions);
    let statistics = DocumentStatistics::compute(&provisions);

    info!(
        "Parsed document {}: {} provisions, max depth {}",
        document_id, statistics.provision_count, statistics.max_depth
    );

    LegalDocument {
        id: document_id.to_string(),
        title: extract_title(text, config.title_scan_lines, &config.default_title),
        document_type: config.document_type.clone(),
        provisions,
        hierarchy,
        statistics,
    }
}

/// Stable document id from the SHA-256 of the text.
pub fn document_id_for(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("doc-{}", &digest[..16])
}
