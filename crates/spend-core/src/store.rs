//! Single-writer holder of the authoritative assignment list.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use spend_domain::{CategoryAssignment, CategoryTree};

use crate::{error::DataConsistencyError, reconcile::reconcile_with_report};

/// Immutable view of one fetched assignment list and its derived tree.
#[derive(Debug, Default)]
pub struct StoreSnapshot {
    generation: u64,
    replaced_at: Option<DateTime<Utc>>,
    assignments: Vec<CategoryAssignment>,
    tree: CategoryTree,
    issues: Vec<DataConsistencyError>,
}

impl StoreSnapshot {
    /// Increments on every list change; zero means nothing was loaded yet.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// When this content was first fetched. Unchanged refreshes keep it.
    pub fn replaced_at(&self) -> Option<DateTime<Utc>> {
        self.replaced_at
    }

    pub fn assignments(&self) -> &[CategoryAssignment] {
        &self.assignments
    }

    pub fn tree(&self) -> &CategoryTree {
        &self.tree
    }

    pub fn issues(&self) -> &[DataConsistencyError] {
        &self.issues
    }
}

/// Holds the current snapshot and swaps it whole on every change.
///
/// Readers clone the `Arc` and keep a consistent list/tree pair even while
/// a newer fetch is applied.
#[derive(Debug, Default)]
pub struct CategoryRecordStore {
    current: Arc<StoreSnapshot>,
    last_fetch: Option<DateTime<Utc>>,
}

impl CategoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<StoreSnapshot> {
        Arc::clone(&self.current)
    }

    pub fn assignments(&self) -> &[CategoryAssignment] {
        self.current.assignments()
    }

    pub fn tree(&self) -> &CategoryTree {
        self.current.tree()
    }

    pub fn generation(&self) -> u64 {
        self.current.generation
    }

    pub fn is_loaded(&self) -> bool {
        self.last_fetch.is_some()
    }

    /// Time of the most recent successful fetch, changed or not.
    pub fn last_fetch(&self) -> Option<DateTime<Utc>> {
        self.last_fetch
    }

    /// Replaces the list wholesale. Returns `true` when the content changed
    /// and the tree was rebuilt.
    pub fn replace(&mut self, assignments: Vec<CategoryAssignment>) -> bool {
        let now = Utc::now();
        let first_load = self.last_fetch.is_none();
        self.last_fetch = Some(now);

        if !first_load && self.current.assignments == assignments {
            tracing::debug!(
                generation = self.current.generation,
                "assignment list unchanged"
            );
            return false;
        }

        let report = reconcile_with_report(&assignments);
        self.current = Arc::new(StoreSnapshot {
            generation: self.current.generation + 1,
            replaced_at: Some(now),
            assignments,
            tree: report.tree,
            issues: report.issues,
        });
        true
    }
}
