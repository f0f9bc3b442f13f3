//! Category assignments as delivered by the spending backend.

use serde::{Deserialize, Serialize};

use crate::common::*;

/// One category attached to the user's spending profile.
///
/// Every field tolerates absence because the backend list is consumed
/// as-is; the reconciler decides what to do with incomplete records.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryAssignment {
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// `None` marks a top-level (parent) category.
    #[serde(
        default,
        rename = "parent_categories_id",
        alias = "parent_category_id"
    )]
    pub parent_category_id: Option<CategoryId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CategoryAssignment {
    /// Builds a top-level assignment.
    pub fn parent(id: CategoryId, name: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            category_id: Some(id),
            parent_category_id: None,
            name: Some(name.into()),
            notes: Some(notes.into()),
        }
    }

    /// Builds an assignment nested under `parent_id`.
    pub fn child(
        id: CategoryId,
        parent_id: CategoryId,
        name: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            category_id: Some(id),
            parent_category_id: Some(parent_id),
            name: Some(name.into()),
            notes: Some(notes.into()),
        }
    }

    /// Returns the usable identifier, treating absent or zero ids as missing.
    pub fn valid_id(&self) -> Option<CategoryId> {
        self.category_id.filter(|id| *id != 0)
    }
}

impl NamedEntity for CategoryAssignment {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Response body of the user-spending endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSpending {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub categories: Vec<CategoryAssignment>,
}

/// Request body for attaching a category to the spending profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewCategoryAssignment {
    pub category_id: CategoryId,
    pub notes: String,
}

/// Request body for replacing the notes of an assignment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotesUpdate {
    pub notes: String,
}
