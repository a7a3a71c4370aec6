//! End-to-end parsing over a small code with every level present.

use statute_core::{Level, ParserConfig};
use statute_parse::{parse_document, LegalChunker};

const CODE: &str = "\
CIVIL CODE

PART I: GENERAL PROVISIONS
Chapter I: Scope and principles
Article 1. Scope
This code governs civil relations.
Article 2. Principles
1. All persons are equal.
2. Rights are exercised pursuant to Article 1.
a) in good faith;
b) without harming others.
Chapter II: Persons
Section 1: Capacity
Article 3. Civil capacity
Capacity is defined in Chapter I and Article 2.
PART II: PROPERTY
Article 4. Ownership
Owners may use property.
";

#[test]
fn test_two_article_scenario() {
    let doc = parse_document(
        "Article 1. Scope\nThis code governs civil relations.\nArticle 2. Equality\nAll persons are equal.",
        "scenario",
        &ParserConfig::default(),
    );
    assert_eq!(doc.provisions.len(), 2);
    assert_eq!(doc.provisions[0].id, "article-1");
    assert_eq!(doc.provisions[1].id, "article-2");
    assert!(doc.provisions.iter().all(|p| p.parent_id.is_none()));
    assert_eq!(doc.provisions[0].title.as_deref(), Some("Scope"));
    assert_eq!(doc.provisions[1].title.as_deref(), Some("Equality"));
}

#[test]
fn test_full_structure() {
    let doc = parse_document(CODE, "civil-code", &ParserConfig::default());
    assert_eq!(doc.title, "CIVIL CODE");

    let ids: Vec<&str> = doc.provisions.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "part-I", "chapter-I", "article-1", "article-2", "clause-1", "clause-2", "clause-a",
            "clause-b", "chapter-II", "section-1", "article-3", "part-II", "article-4",
        ]
    );

    // Lettered points sit beside numbered clauses: both are Clause level.
    let point = doc.provision("clause-a").unwrap();
    assert_eq!(point.parent_id.as_deref(), Some("article-2"));

    let article3 = doc.provision("article-3").unwrap();
    assert_eq!(
        article3.hierarchy_path,
        vec!["part-I", "chapter-II", "section-1", "article-3"]
    );
    assert!(article3.references("chapter-I"));
    assert!(article3.references("article-2"));

    let article4 = doc.provision("article-4").unwrap();
    assert_eq!(article4.parent_id.as_deref(), Some("part-II"));

    assert_eq!(doc.hierarchy.roots().count(), 2);
    assert_eq!(doc.hierarchy.children("article-2").len(), 4);
    assert_eq!(doc.statistics.level_counts[&Level::Part], 2);
    assert_eq!(doc.statistics.max_depth, 4);
}

#[test]
fn test_every_path_is_well_formed() {
    let doc = parse_document(CODE, "civil-code", &ParserConfig::default());
    for p in &doc.provisions {
        assert_eq!(p.hierarchy_path.last(), Some(&p.id));
        let levels: Vec<usize> = p
            .hierarchy_path
            .iter()
            .map(|id| doc.hierarchy.get(id).unwrap().level.index())
            .collect();
        assert!(levels.windows(2).all(|w| w[0] < w[1]));
        let node = doc.hierarchy.get(&p.id).unwrap();
        assert_eq!(node.hierarchy_path, p.hierarchy_path);
        assert_eq!(node.parent_id, p.parent_id);
    }
}

#[test]
fn test_parsing_is_idempotent() {
    let a = parse_document(CODE, "x", &ParserConfig::default());
    let b = parse_document(CODE, "x", &ParserConfig::default());
    assert_eq!(a.hierarchy, b.hierarchy);
    for (p, q) in a.provisions.iter().zip(&b.provisions) {
        assert_eq!(p.id, q.id);
        assert_eq!(p.hierarchy_path, q.hierarchy_path);
        assert_eq!(p.body, q.body);
        assert_eq!(p.cross_references, q.cross_references);
    }
}

#[test]
fn test_chunk_parsed_document() {
    let doc = parse_document(CODE, "civil-code", &ParserConfig::default());
    let chunks = LegalChunker::default().chunk_document(&doc.provisions, &doc.id);
    assert_eq!(chunks.len(), doc.provisions.len());
    assert!(chunks.iter().all(|c| c.id == format!("chunk-{}", c.provision_id)));
}
