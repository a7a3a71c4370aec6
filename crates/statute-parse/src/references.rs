//! Cross-reference detection in provision bodies.
//!
//! A fixed catalogue of phrasings, one per level. Scanning captures only the
//! ordinal text; [`resolve_references`] later maps it to concrete provisions.

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use statute_core::provision::provision_id;
use statute_core::{CrossReference, Level, Provision};
use tracing::debug;

use crate::patterns::{ORDINAL_WORDS, ROMAN};

/// One reference occurrence with its byte span in the scanned text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceMatch {
    pub level: Level,
    pub ordinal: String,
    /// Matched text including any "pursuant to" lead-in.
    pub text: String,
    pub start: usize,
    pub end: usize,
    /// Whether the reference was introduced as an authority ("pursuant to Article 5").
    pub pursuant: bool,
}

impl ReferenceMatch {
    pub fn to_cross_reference(&self) -> CrossReference {
        CrossReference::new(self.level, self.ordinal.clone())
    }
}

const PURSUANT: &str = r"(?i:(pursuant\s+to|in\s+accordance\s+with|theo\s+quy\s+định\s+tại|quy\s+định\s+tại)\s+)?";

static REFERENCE_PATTERNS: Lazy<Vec<(Level, Regex)>> = Lazy::new(|| {
    let compile = |body: &str| Regex::new(&format!("{PURSUANT}{body}")).expect("reference pattern");
    vec![
        (Level::Article, compile(r"(?i:\barticles?|\bđiều)\s+(\d+)")),
        (Level::Clause, compile(r"(?i:\bclauses?|\bkhoản)\s+(\d+)")),
        (
            Level::Chapter,
            compile(&format!(r"(?i:\bchapters?|\bchương)\s+({ROMAN}\b|\d+)")),
        ),
        (
            Level::Section,
            compile(&format!(r"(?i:\bsections?|\bmục)\s+({ROMAN}\b|\d+)")),
        ),
        (
            Level::Part,
            compile(&format!(
                r"(?i:\bparts?|\bphần)\s+({ROMAN}\b|\d+|(?i:thứ)\s+\p{{Lu}}+|(?i:{ORDINAL_WORDS})\b)"
            )),
        ),
    ]
});

/// Every reference occurrence in `text`, grouped by level in catalogue order
/// and by position within a level.
pub fn find_references(text: &str) -> Vec<ReferenceMatch> {
    let mut found = Vec::new();
    for (level, re) in REFERENCE_PATTERNS.iter() {
        for caps in re.captures_iter(text) {
            let (Some(whole), Some(ordinal)) = (caps.get(0), caps.get(2)) else {
                continue;
            };
            found.push(ReferenceMatch {
                level: *level,
                ordinal: ordinal.as_str().to_string(),
                text: whole.as_str().to_string(),
                start: whole.start(),
                end: whole.end(),
                pursuant: caps.get(1).is_some(),
            });
        }
    }
    found
}

/// De-duplicated references in `text`, each tagged with the level of the
/// phrasing that matched it.
pub fn extract_cross_references(text: &str) -> BTreeSet<CrossReference> {
    find_references(text)
        .iter()
        .map(ReferenceMatch::to_cross_reference)
        .collect()
}

fn common_prefix(a: &[String], b: &[String]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Point every provision's `cross_references` at provision ids.
///
/// Among the provisions with the named level and ordinal, the one sharing the
/// longest hierarchy-path prefix with the referring provision wins, so a
/// sibling under the same parent is preferred; ties go to the earliest in
/// document order. A reference that lands on the referring provision itself
/// (its own marker line) is removed. References with no matching provision
/// are kept but resolve to nothing.
///
/// Paths must already be set by the hierarchy builder.
pub fn resolve_references(provisions: &mut [Provision]) {
    let mut by_target: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, p) in provisions.iter().enumerate() {
        by_target
            .entry(provision_id(p.level, &p.ordinal))
            .or_default()
            .push(i);
    }

    let mut resolved = Vec::with_capacity(provisions.len());
    for p in provisions.iter() {
        let mut kept = BTreeSet::new();
        let mut ids = BTreeSet::new();
        for reference in &p.cross_references {
            let mut best: Option<(usize, usize)> = None;
            for &i in by_target.get(&reference.target_id()).into_iter().flatten() {
                let shared = common_prefix(&p.hierarchy_path, &provisions[i].hierarchy_path);
                if best.map_or(true, |(_, s)| shared > s) {
                    best = Some((i, shared));
                }
            }
            match best.map(|(i, _)| &provisions[i]) {
                Some(target) if target.id == p.id => continue,
                Some(target) => {
                    ids.insert(target.id.clone());
                }
                None => debug!("{}: {} names no provision here", p.id, reference.target_id()),
            }
            kept.insert(reference.clone());
        }
        resolved.push((kept, ids));
    }

    for (p, (kept, ids)) in provisions.iter_mut().zip(resolved) {
        p.cross_references = kept;
        p.reference_ids = ids;
    }
}
