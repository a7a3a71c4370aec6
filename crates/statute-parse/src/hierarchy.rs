//! Nesting reconstruction over a flat provision list.
//!
//! One left-to-right pass with an explicit stack of open ancestors. Parent
//! and child links are ids into the resulting [`HierarchyIndex`]; nothing
//! holds a pointer to anything else.

use statute_core::{HierarchyIndex, HierarchyNode, Level, Provision};
use tracing::{debug, info, warn};

/// An ancestor that may still receive children.
struct Frame {
    level: Level,
    id: String,
    path: Vec<String>,
}

/// Assign `parent_id` and `hierarchy_path` to every provision, in document
/// order, and return the structural index. Several roots yield a forest.
pub fn build_hierarchy(provisions: &mut [Provision]) -> HierarchyIndex {
    let mut index = HierarchyIndex::new();
    let mut stack: Vec<Frame> = Vec::new();

    for provision in provisions.iter_mut() {
        while stack
            .last()
            .is_some_and(|top| !top.level.can_contain(provision.level))
        {
            stack.pop();
        }

        let (parent_id, path) = match stack.last() {
            Some(parent) => {
                let mut path = parent.path.clone();
                path.push(provision.id.clone());
                (Some(parent.id.clone()), path)
            }
            None => {
                if provision.level == Level::Clause {
                    warn!("Clause {} has no enclosing provision; kept as a root", provision.id);
                } else if provision.level != Level::Part {
                    debug!("{} {} starts a new root", provision.level, provision.id);
                }
                (None, vec![provision.id.clone()])
            }
        };

        provision.parent_id = parent_id.clone();
        provision.hierarchy_path = path.clone();

        if index.contains(&provision.id) {
            warn!("Duplicate provision id {} in hierarchy", provision.id);
        }
        index.insert(HierarchyNode {
            id: provision.id.clone(),
            level: provision.level,
            ordinal: provision.ordinal.clone(),
            title: provision.title.clone(),
            parent_id: parent_id.clone(),
            hierarchy_path: path.clone(),
            children: Vec::new(),
        });
        if let Some(parent) = parent_id.as_deref() {
            index.add_child(parent, &provision.id);
        }

        stack.push(Frame {
            level: provision.level,
            id: provision.id.clone(),
            path,
        });
    }

    info!(
        "Built hierarchy: {} provisions, {} roots",
        index.len(),
        index.roots().count()
    );
    index
}
