//! Provisions and the structural index built over them.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::level::Level;

/// Identifier for the provision at `level` with the given ordinal, e.g. `article-5`.
///
/// Inner whitespace in the ordinal ("THỨ NHẤT") becomes `-`.
pub fn provision_id(level: Level, ordinal: &str) -> String {
    let ordinal: Vec<&str> = ordinal.split_whitespace().collect();
    format!("{}-{}", level.as_str(), ordinal.join("-"))
}

/// A textual mention of another provision by level and ordinal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CrossReference {
    pub level: Level,
    /// Ordinal exactly as written in the referring text.
    pub ordinal: String,
}

impl CrossReference {
    pub fn new(level: Level, ordinal: impl Into<String>) -> Self {
        Self {
            level,
            ordinal: ordinal.into(),
        }
    }

    /// Base id of the provision this reference names, without any duplicate
    /// suffix. Several provisions may share it.
    pub fn target_id(&self) -> String {
        provision_id(self.level, &self.ordinal)
    }
}

/// One structural unit of a document with its full text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provision {
    pub id: String,
    pub level: Level,
    pub ordinal: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Full text including the marker line.
    pub body: String,
    pub document_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Ancestor ids from the root down to and including this provision.
    pub hierarchy_path: Vec<String>,
    pub cross_references: BTreeSet<CrossReference>,
    /// Ids of the provisions `cross_references` resolved to within the document.
    #[serde(default)]
    pub reference_ids: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
}

impl Provision {
    /// Open a provision for a recognised marker. Parent and path are set later
    /// by the hierarchy builder; until then the path holds only the own id.
    pub fn new(id: String, level: Level, ordinal: String, title: Option<String>) -> Self {
        Self {
            hierarchy_path: vec![id.clone()],
            id,
            level,
            ordinal,
            title,
            body: String::new(),
            document_id: String::new(),
            parent_id: None,
            cross_references: BTreeSet::new(),
            reference_ids: BTreeSet::new(),
            created_at: Utc::now(),
        }
    }

    /// Whether this provision's body mentions the provision with id `other_id`.
    pub fn references(&self, other_id: &str) -> bool {
        self.reference_ids.contains(other_id)
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn depth(&self) -> usize {
        self.hierarchy_path.len()
    }
}

/// Structural record of one provision inside a [`HierarchyIndex`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub id: String,
    pub level: Level,
    pub ordinal: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub hierarchy_path: Vec<String>,
    pub children: Vec<String>,
}

/// Id-addressed arena of hierarchy nodes in document order.
///
/// Built once per document and read-only afterwards; a changed document needs
/// a full rebuild.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<HierarchyNode>", into = "Vec<HierarchyNode>")]
pub struct HierarchyIndex {
    nodes: Vec<HierarchyNode>,
    by_id: HashMap<String, usize>,
}

impl HierarchyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node. A node whose id is already present replaces the
    /// lookup entry but keeps its arena slot.
    pub fn insert(&mut self, node: HierarchyNode) {
        let slot = self.nodes.len();
        self.by_id.insert(node.id.clone(), slot);
        self.nodes.push(node);
    }

    /// Append `child_id` to the children of `parent_id`. Returns false when
    /// the parent is unknown.
    pub fn add_child(&mut self, parent_id: &str, child_id: &str) -> bool {
        match self.by_id.get(parent_id) {
            Some(&slot) => {
                self.nodes[slot].children.push(child_id.to_string());
                true
            }
            None => false,
        }
    }

    /// Node with the given id.
    pub fn get(&self, id: &str) -> Option<&HierarchyNode> {
        self.by_id.get(id).map(|&slot| &self.nodes[slot])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Child ids of `id` in document order; empty for unknown ids.
    pub fn children(&self, id: &str) -> &[String] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, id: &str) -> Option<&HierarchyNode> {
        self.get(id)
            .and_then(|n| n.parent_id.as_deref())
            .and_then(|p| self.get(p))
    }

    /// Nodes without a parent, in document order.
    pub fn roots(&self) -> impl Iterator<Item = &HierarchyNode> {
        self.nodes.iter().filter(|n| n.parent_id.is_none())
    }

    /// All nodes below `id`, depth-first in document order.
    pub fn descendants(&self, id: &str) -> Vec<&HierarchyNode> {
        let mut out = Vec::new();
        let mut stack: Vec<&str> = self.children(id).iter().rev().map(String::as_str).collect();
        while let Some(next) = stack.pop() {
            if let Some(node) = self.get(next) {
                out.push(node);
                stack.extend(node.children.iter().rev().map(String::as_str));
            }
        }
        out
    }

    /// Nodes in document order.
    pub fn iter(&self) -> impl Iterator<Item = &HierarchyNode> {
        self.nodes.iter()
    }

    /// Number of nodes in the index.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl From<Vec<HierarchyNode>> for HierarchyIndex {
    fn from(nodes: Vec<HierarchyNode>) -> Self {
        let mut index = HierarchyIndex::new();
        for node in nodes {
            index.insert(node);
        }
        index
    }
}

impl From<HierarchyIndex> for Vec<HierarchyNode> {
    fn from(index: HierarchyIndex) -> Self {
        index.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, level: Level, parent: Option<&str>, path: &[&str]) -> HierarchyNode {
        HierarchyNode {
            id: id.into(),
            level,
            ordinal: id.rsplit('-').next().unwrap_or_default().into(),
            title: None,
            parent_id: parent.map(String::from),
            hierarchy_path: path.iter().map(|s| s.to_string()).collect(),
            children: Vec::new(),
        }
    }

    #[test]
    fn test_provision_id_formatting() {
        assert_eq!(provision_id(Level::Article, "5"), "article-5");
        assert_eq!(provision_id(Level::Part, "THỨ NHẤT"), "part-THỨ-NHẤT");
        assert_eq!(CrossReference::new(Level::Chapter, "IV").target_id(), "chapter-IV");
    }

    #[test]
    fn test_provision_references() {
        let mut p = Provision::new("article-1".into(), Level::Article, "1".into(), None);
        p.cross_references.insert(CrossReference::new(Level::Article, "5"));
        p.reference_ids.insert("article-5#2".into());
        assert!(p.references("article-5#2"));
        assert!(!p.references("article-5"));
        assert!(!p.references("clause-5"));
        assert_eq!(p.hierarchy_path, vec!["article-1".to_string()]);
    }

    #[test]
    fn test_index_children_and_descendants() {
        let mut index = HierarchyIndex::new();
        index.insert(node("chapter-I", Level::Chapter, None, &["chapter-I"]));
        index.insert(node("article-1", Level::Article, Some("chapter-I"), &["chapter-I", "article-1"]));
        assert!(index.add_child("chapter-I", "article-1"));
        index.insert(node(
            "clause-1",
            Level::Clause,
            Some("article-1"),
            &["chapter-I", "article-1", "clause-1"],
        ));
        assert!(index.add_child("article-1", "clause-1"));
        assert!(!index.add_child("missing", "clause-1"));

        assert_eq!(index.children("chapter-I"), ["article-1".to_string()]);
        let below: Vec<&str> = index.descendants("chapter-I").iter().map(|n| n.id.as_str()).collect();
        assert_eq!(below, vec!["article-1", "clause-1"]);
        assert_eq!(index.parent("clause-1").map(|n| n.id.as_str()), Some("article-1"));
        assert_eq!(index.roots().count(), 1);
    }

    #[test]
    fn test_index_serde_roundtrip_keeps_lookup() {
        let mut index = HierarchyIndex::new();
        index.insert(node("article-1", Level::Article, None, &["article-1"]));
        let json = serde_json::to_string(&index).unwrap();
        let back: HierarchyIndex = serde_json::from_str(&json).unwrap();
        assert!(back.contains("article-1"));
        assert_eq!(back, index);
    }
}
