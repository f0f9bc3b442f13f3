//! Per-node inline notes editing.

use std::collections::HashMap;

use spend_domain::{CategoryId, CategoryTree};

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Viewing,
    Editing,
}

/// Draft buffers keyed by node id. A node is editing iff it owns a draft.
#[derive(Debug, Clone, Default)]
pub struct EditSessions {
    drafts: HashMap<CategoryId, String>,
}

impl EditSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, id: CategoryId) -> EditState {
        if self.drafts.contains_key(&id) {
            EditState::Editing
        } else {
            EditState::Viewing
        }
    }

    pub fn is_editing(&self, id: CategoryId) -> bool {
        self.state(id) == EditState::Editing
    }

    pub fn draft(&self, id: CategoryId) -> Option<&str> {
        self.drafts.get(&id).map(String::as_str)
    }

    /// Enters editing with the node's current notes as the draft.
    ///
    /// A node that is already editing keeps its existing draft.
    pub fn begin(&mut self, id: CategoryId, current_notes: Option<&str>) -> &str {
        self.drafts
            .entry(id)
            .or_insert_with(|| current_notes.unwrap_or_default().to_string())
    }

    pub fn update(&mut self, id: CategoryId, text: impl Into<String>) -> CoreResult<()> {
        let draft = self.drafts.get_mut(&id).ok_or_else(|| not_editing(id))?;
        *draft = text.into();
        Ok(())
    }

    /// Discards the draft. Returns `false` if the node was not editing.
    pub fn cancel(&mut self, id: CategoryId) -> bool {
        self.drafts.remove(&id).is_some()
    }

    /// Leaves editing after a successful save.
    pub fn finish(&mut self, id: CategoryId) {
        self.drafts.remove(&id);
    }

    /// Drops drafts whose node no longer exists in `tree`.
    pub fn retain_present(&mut self, tree: &CategoryTree) -> usize {
        let before = self.drafts.len();
        self.drafts.retain(|id, _| tree.contains(*id));
        before - self.drafts.len()
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }
}

fn not_editing(id: CategoryId) -> CoreError {
    CoreError::InvalidOperation(format!("category {id} is not being edited"))
}
