//! Catalog of categories that can be attached to a spending profile.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::common::*;

/// A category available for selection, transported as an `[id, label]` pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "(CategoryId, String)", into = "(CategoryId, String)")]
pub struct CatalogEntry {
    pub id: CategoryId,
    pub label: String,
}

impl CatalogEntry {
    pub fn new(id: CategoryId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

impl From<(CategoryId, String)> for CatalogEntry {
    fn from((id, label): (CategoryId, String)) -> Self {
        Self { id, label }
    }
}

impl From<CatalogEntry> for (CategoryId, String) {
    fn from(entry: CatalogEntry) -> Self {
        (entry.id, entry.label)
    }
}

impl Identifiable for CatalogEntry {
    fn id(&self) -> CategoryId {
        self.id
    }
}

impl NamedEntity for CatalogEntry {
    fn name(&self) -> Option<&str> {
        Some(&self.label)
    }
}

/// Response body of the category form-choices endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryChoices {
    #[serde(default)]
    pub choices: Vec<CatalogEntry>,
}

/// Orders entries case-insensitively by label, falling back to the id.
pub fn sort_catalog(entries: &mut [CatalogEntry]) {
    entries.sort_by(compare_labels);
}

fn compare_labels(a: &CatalogEntry, b: &CatalogEntry) -> Ordering {
    a.label
        .to_lowercase()
        .cmp(&b.label.to_lowercase())
        .then_with(|| a.id.cmp(&b.id))
}
