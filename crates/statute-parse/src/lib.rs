//! Statute Parse: flat legal text to linked provisions.
//!
//! Lines are classified against the level taxonomy, split into provisions,
//! and nested into a hierarchy with a single stack-based pass.

pub mod chunking;
pub mod document;
pub mod extract;
pub mod hierarchy;
pub mod normalize;
pub mod patterns;
pub mod references;

pub use chunking::{LegalChunk, LegalChunker};
pub use document::{document_id_for, parse_document, DocumentStatistics, LegalDocument};
pub use extract::{extract_provisions, extract_title};
pub use hierarchy::build_hierarchy;
pub use normalize::normalize_legal_text;
pub use patterns::{match_marker, MarkerMatch};
pub use references::{
    extract_cross_references, find_references, resolve_references, ReferenceMatch,
};
