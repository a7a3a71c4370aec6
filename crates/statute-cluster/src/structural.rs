//! Structural pre-clustering: records are first grouped by where their
//! source provision sits in the document.

use std::collections::HashMap;

use statute_core::{ConceptRecord, Level};
use tracing::debug;

use crate::similarity::ProvisionLookup;
use crate::types::{GroupKey, StructuralGroup};

/// Grouping key for one record.
///
/// A Clause record drops the last path element of its provision (leaving the
/// owning Article), an Article record with a path longer than two drops the
/// last two, and any other record drops one element unless its path has a
/// single entry. Records whose source provision is unknown group by level tag.
pub fn group_key(record: &ConceptRecord, provisions: &ProvisionLookup<'_>) -> GroupKey {
    let Some(provision) = provisions.get(record.source_id.as_str()) else {
        return GroupKey::Level(record.level_tag().to_string());
    };
    let path = &provision.hierarchy_path;
    if path.is_empty() {
        return GroupKey::Level(record.level_tag().to_string());
    }
    let len = path.len();
    let prefix = match record.level {
        Some(Level::Clause) if len > 1 => len - 1,
        Some(Level::Article) if len > 2 => len - 2,
        _ if len > 1 => len - 1,
        _ => len,
    };
    GroupKey::Path(path[..prefix].to_vec())
}

/// Partition `records` by [`group_key`]. Groups come out in order of first
/// appearance and every record lands in exactly one group.
pub fn group_by_structure(
    records: Vec<ConceptRecord>,
    provisions: &ProvisionLookup<'_>,
) -> Vec<StructuralGroup> {
    let mut groups: Vec<StructuralGroup> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for record in records {
        let key = group_key(&record, provisions);
        match index.get(&key) {
            Some(&i) => groups[i].records.push(record),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(StructuralGroup {
                    key,
                    records: vec![record],
                });
            }
        }
    }

    debug!("Pre-clustered into {} structural groups", groups.len());
    groups
}
