//! Catalog filtering for the "add category" selection.

use std::collections::HashSet;

use spend_domain::{CatalogEntry, CategoryAssignment, CategoryId};

/// Returns catalog entries not yet represented in `assignments`.
///
/// An entry is excluded when its id equals any assignment's category id or
/// any assignment's parent id. Catalog order is preserved.
pub fn eligible(catalog: &[CatalogEntry], assignments: &[CategoryAssignment]) -> Vec<CatalogEntry> {
    let excluded = excluded_ids(assignments);
    catalog
        .iter()
        .filter(|entry| !excluded.contains(&entry.id))
        .cloned()
        .collect()
}

fn excluded_ids(assignments: &[CategoryAssignment]) -> HashSet<CategoryId> {
    assignments
        .iter()
        .flat_map(|record| [record.category_id, record.parent_category_id])
        .flatten()
        .collect()
}
