//! Folds the flat assignment list into the two-level category tree.
//!
//! Input order is not trusted: a child may arrive before its parent's own
//! record. Such parents are synthesized as placeholders during the main pass
//! and patched from the input afterwards.

use spend_domain::{CategoryAssignment, CategoryId, CategoryTree, ChildNode, ParentNode};

use crate::error::DataConsistencyError;

/// Tree plus the inconsistencies met while building it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub tree: CategoryTree,
    pub issues: Vec<DataConsistencyError>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Builds the category tree, discarding diagnostics.
pub fn reconcile(assignments: &[CategoryAssignment]) -> CategoryTree {
    reconcile_with_report(assignments).tree
}

/// Builds the category tree and reports skipped or unresolved records.
pub fn reconcile_with_report(assignments: &[CategoryAssignment]) -> ReconcileReport {
    let mut tree = CategoryTree::new();
    let mut issues = Vec::new();

    for (position, record) in assignments.iter().enumerate() {
        let Some(id) = record.valid_id() else {
            tracing::warn!(position, "skipping category record without an id");
            issues.push(DataConsistencyError::MissingId { position });
            continue;
        };

        match record.parent_category_id {
            None => {
                // Overwrites a placeholder in place, keeping its position and children.
                let parent = tree.entry_or_placeholder(id);
                parent.name = record.name.clone();
                parent.notes = record.notes.clone();
            }
            Some(parent_id) => {
                let parent = tree.entry_or_placeholder(parent_id);
                upsert_child(parent, id, record);
            }
        }
    }

    for parent in tree.iter_mut().filter(|parent| parent.is_placeholder()) {
        let defining = assignments
            .iter()
            .find(|record| record.valid_id() == Some(parent.id));
        if let Some(record) = defining {
            parent.name = record.name.clone();
            parent.notes = record.notes.clone();
        }
        if parent.is_placeholder() {
            tracing::warn!(parent_id = parent.id, "parent category could not be resolved");
            issues.push(DataConsistencyError::UnresolvedParent {
                parent_id: parent.id,
            });
        }
    }

    tracing::debug!(
        parents = tree.len(),
        nodes = tree.node_count(),
        issues = issues.len(),
        "reconciled category tree"
    );

    ReconcileReport { tree, issues }
}

fn upsert_child(parent: &mut ParentNode, id: CategoryId, record: &CategoryAssignment) {
    match parent.children.iter_mut().find(|child| child.id == id) {
        Some(existing) => {
            existing.name = record.name.clone();
            existing.notes = record.notes.clone();
        }
        None => parent.children.push(ChildNode {
            id,
            name: record.name.clone(),
            notes: record.notes.clone(),
        }),
    }
}
