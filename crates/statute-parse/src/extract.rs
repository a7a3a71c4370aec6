//! Line-by-line provision extraction and document title detection.

use std::collections::HashMap;

use statute_core::provision::provision_id;
use statute_core::Provision;
use tracing::{debug, warn};

use crate::patterns::{match_marker, MarkerMatch};

/// The provision currently receiving body lines.
struct OpenProvision<'a> {
    provision: Provision,
    lines: Vec<&'a str>,
}

impl<'a> OpenProvision<'a> {
    fn close(self) -> Provision {
        let mut provision = self.provision;
        provision.body = self.lines.join("\n").trim().to_string();
        provision
    }
}

/// Hands out `<level>-<ordinal>` ids, suffixing repeats with `#<n>`.
#[derive(Default)]
struct IdAllocator {
    seen: HashMap<String, usize>,
}

impl IdAllocator {
    fn allocate(&mut self, marker: &MarkerMatch) -> String {
        let base = provision_id(marker.level, &marker.ordinal);
        let count = self.seen.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base
        } else {
            format!("{base}#{count}")
        }
    }
}

/// Split document text into provisions in document order.
///
/// Blank lines are skipped. Each recognised marker closes the open provision
/// and opens a new one whose body starts with the marker line. Text before
/// the first marker is dropped.
pub fn extract_provisions(text: &str) -> Vec<Provision> {
    let mut provisions = Vec::new();
    let mut ids = IdAllocator::default();
    let mut open: Option<OpenProvision<'_>> = None;
    let mut dropped_preamble = 0usize;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match match_marker(line) {
            Some(marker) => {
                if let Some(prev) = open.take() {
                    provisions.push(prev.close());
                }
                let id = ids.allocate(&marker);
                if id.contains('#') {
                    debug!("Repeated marker {} {}, assigned id {}", marker.level, marker.ordinal, id);
                }
                open = Some(OpenProvision {
                    provision: Provision::new(id, marker.level, marker.ordinal, marker.heading),
                    lines: vec![line],
                });
            }
            None => match open.as_mut() {
                Some(current) => current.lines.push(line),
                None => dropped_preamble += 1,
            },
        }
    }

    if let Some(last) = open.take() {
        provisions.push(last.close());
    }

    if provisions.is_empty() && dropped_preamble > 0 {
        warn!("No structural markers recognised in {} non-blank lines", dropped_preamble);
    } else if dropped_preamble > 0 {
        debug!("Dropped {} preamble lines before the first marker", dropped_preamble);
    }

    provisions
}

/// First non-blank, non-marker line among the first `scan_lines` lines.
pub fn extract_title(text: &str, scan_lines: usize, default_title: &str) -> String {
    text.lines()
        .take(scan_lines)
        .map(str::trim)
        .find(|line| !line.is_empty() && match_marker(line).is_none())
        .map(String::from)
        .unwrap_or_else(|| default_title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use statute_core::Level;

    #[test]
    fn test_two_articles() {
        let text = "Article 1. Scope\nThis code governs civil relations.\nArticle 2. Equality\nAll persons are equal.";
        let provisions = extract_provisions(text);
        assert_eq!(provisions.len(), 2);
        assert_eq!(provisions[0].id, "article-1");
        assert_eq!(provisions[0].title.as_deref(), Some("Scope"));
        assert_eq!(
            provisions[0].body,
            "Article 1. Scope\nThis code governs civil relations."
        );
        assert_eq!(provisions[1].id, "article-2");
        assert_eq!(provisions[1].body, "Article 2. Equality\nAll persons are equal.");
    }

    #[test]
    fn test_blank_lines_and_preamble_dropped() {
        let text = "CIVIL CODE\n\nPreamble text\n\nArticle 1. Scope\n\n  Body line.  \n\n";
        let provisions = extract_provisions(text);
        assert_eq!(provisions.len(), 1);
        assert_eq!(provisions[0].body, "Article 1. Scope\nBody line.");
    }

    #[test]
    fn test_repeated_ordinals_get_unique_ids() {
        let text = "Article 1. A\n1. one\n2. two\nArticle 2. B\n1. one again";
        let ids: Vec<String> = extract_provisions(text).into_iter().map(|p| p.id).collect();
        assert_eq!(
            ids,
            vec!["article-1", "clause-1", "clause-2", "article-2", "clause-1#2"]
        );
    }

    #[test]
    fn test_no_markers() {
        assert!(extract_provisions("just prose\nmore prose").is_empty());
        assert!(extract_provisions("").is_empty());
    }

    #[test]
    fn test_clause_level_and_title() {
        let provisions = extract_provisions("a) the first point");
        assert_eq!(provisions[0].level, Level::Clause);
        assert_eq!(provisions[0].ordinal, "a");
        assert_eq!(provisions[0].title.as_deref(), Some("the first point"));
    }

    #[test]
    fn test_title_extraction() {
        let text = "\nCIVIL CODE\nChapter I: General\nArticle 1. Scope";
        assert_eq!(extract_title(text, 10, "Legal Document"), "CIVIL CODE");

        let only_markers = "Chapter I: General\nArticle 1. Scope";
        assert_eq!(extract_title(only_markers, 10, "Legal Document"), "Legal Document");
    }

    #[test]
    fn test_title_scan_limit() {
        let mut text = "Article 1. A\n".repeat(10);
        text.push_str("Late title");
        assert_eq!(extract_title(&text, 10, "Untitled"), "Untitled");
        assert_eq!(extract_title(&text, 11, "Untitled"), "Late title");
    }
}
