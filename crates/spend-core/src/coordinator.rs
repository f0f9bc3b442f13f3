//! Sequences loads and mutations against the backend and owns the view state.
//!
//! Every mutation is followed by a full re-fetch; the tree is never patched
//! locally. A failed call leaves the last reconciled snapshot in place.
//!
//! Operations take `&mut self`, so one coordinator never runs two at once.
//! Separate clients acting on the same category can still race at the
//! backend; the last response to complete wins.

use std::sync::Arc;

use spend_domain::{
    sort_catalog, CatalogEntry, CategoryAssignment, CategoryId, CategoryTree,
    NewCategoryAssignment, MAX_NOTES_LEN,
};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    backend::SpendingBackend,
    edit_session::EditSessions,
    eligibility::eligible,
    error::{BackendError, CoreError, CoreResult, FormField},
    store::{CategoryRecordStore, StoreSnapshot},
};

pub const LOAD_ERROR_MESSAGE: &str = "An error occurred while fetching data.";
pub const ADD_ERROR_MESSAGE: &str = "An error occurred while adding the category.";
pub const EDIT_ERROR_MESSAGE: &str = "An error occurred while updating the notes.";
pub const REMOVE_ERROR_MESSAGE: &str = "An error occurred while removing the category.";
pub const SELECT_CATEGORY_MESSAGE: &str = "Please select a category.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    /// Terminal: the view can only be left.
    Failed(String),
}

/// Transient state of the "add category" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddCategoryForm {
    pub open: bool,
    pub selected: Option<CategoryId>,
    pub notes: String,
    /// Field-level message shown next to the category selector.
    pub error: Option<String>,
}

pub struct MutationCoordinator<B> {
    backend: B,
    store: CategoryRecordStore,
    catalog: Vec<CatalogEntry>,
    eligible: Vec<CatalogEntry>,
    edits: EditSessions,
    add_form: AddCategoryForm,
    pending_removal: Option<CategoryId>,
    last_error: Option<String>,
    status: LoadStatus,
}

impl<B: SpendingBackend> MutationCoordinator<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            store: CategoryRecordStore::new(),
            catalog: Vec::new(),
            eligible: Vec::new(),
            edits: EditSessions::new(),
            add_form: AddCategoryForm::default(),
            pending_removal: None,
            last_error: None,
            status: LoadStatus::Loading,
        }
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn tree(&self) -> &CategoryTree {
        self.store.tree()
    }

    pub fn assignments(&self) -> &[CategoryAssignment] {
        self.store.assignments()
    }

    pub fn snapshot(&self) -> Arc<StoreSnapshot> {
        self.store.snapshot()
    }

    pub fn store(&self) -> &CategoryRecordStore {
        &self.store
    }

    /// Full catalog, sorted by label.
    pub fn catalog(&self) -> &[CatalogEntry] {
        &self.catalog
    }

    /// Catalog entries that may still be added.
    pub fn eligible(&self) -> &[CatalogEntry] {
        &self.eligible
    }

    pub fn edits(&self) -> &EditSessions {
        &self.edits
    }

    pub fn add_form(&self) -> &AddCategoryForm {
        &self.add_form
    }

    pub fn pending_removal(&self) -> Option<CategoryId> {
        self.pending_removal
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn take_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    /// Initial load: assignments first, then the catalog.
    ///
    /// If `cancel` fires before the catalog arrives, the catalog is discarded
    /// and the status is left untouched.
    pub async fn load(&mut self, cancel: &CancellationToken) -> CoreResult<()> {
        let span = operation_span("load");
        async {
            self.status = LoadStatus::Loading;
            let assignments = match self.backend.fetch_assignments().await {
                Ok(list) => list,
                Err(err) => return Err(self.fail_load(err, cancel)),
            };
            self.apply_assignments(assignments);

            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = self.backend.fetch_catalog() => Some(result),
            };
            let result = match fetched {
                Some(result) if !cancel.is_cancelled() => result,
                _ => {
                    tracing::debug!("load cancelled; catalog discarded");
                    return Err(CoreError::Cancelled);
                }
            };

            match result {
                Ok(mut entries) => {
                    sort_catalog(&mut entries);
                    self.catalog = entries;
                    self.eligible = eligible(&self.catalog, self.store.assignments());
                    self.status = LoadStatus::Ready;
                    tracing::info!(
                        parents = self.store.tree().len(),
                        catalog = self.catalog.len(),
                        "spending view loaded"
                    );
                    Ok(())
                }
                Err(err) => Err(self.fail_load(err, cancel)),
            }
        }
        .instrument(span)
        .await
    }

    /// Re-fetches the assignment list. Returns whether it changed.
    pub async fn refresh(&mut self) -> CoreResult<bool> {
        match self.backend.fetch_assignments().await {
            Ok(list) => Ok(self.apply_assignments(list)),
            Err(err) => {
                tracing::error!(error = %err, "refresh failed; keeping previous tree");
                self.last_error = Some(LOAD_ERROR_MESSAGE.into());
                Err(err.into())
            }
        }
    }

    pub fn toggle_add_form(&mut self) -> bool {
        self.add_form.open = !self.add_form.open;
        self.add_form.open
    }

    pub fn select_category(&mut self, category_id: Option<CategoryId>) {
        self.add_form.selected = category_id;
    }

    pub fn set_add_notes(&mut self, notes: impl Into<String>) {
        self.add_form.notes = notes.into();
    }

    /// Submits the add form. Validation failures never reach the backend.
    pub async fn submit_add(&mut self) -> CoreResult<CategoryAssignment> {
        let Some(category_id) = self.add_form.selected else {
            self.add_form.error = Some(SELECT_CATEGORY_MESSAGE.into());
            return Err(CoreError::validation(
                FormField::Category,
                SELECT_CATEGORY_MESSAGE,
            ));
        };
        let notes = self.add_form.notes.trim().to_string();
        validate_notes(&notes)?;
        self.add_form.error = None;

        let span = operation_span("add");
        async {
            let request = NewCategoryAssignment { category_id, notes };
            match self.backend.add_category(&request).await {
                Ok(created) => {
                    tracing::info!(category_id, "category added");
                    self.add_form = AddCategoryForm::default();
                    self.refresh().await?;
                    Ok(created)
                }
                Err(err) => Err(self.fail_mutation(err, ADD_ERROR_MESSAGE)),
            }
        }
        .instrument(span)
        .await
    }

    /// Enters editing for `id` and returns the draft.
    pub fn begin_edit(&mut self, id: CategoryId) -> CoreResult<String> {
        let node = self
            .store
            .tree()
            .find(id)
            .ok_or(CoreError::CategoryNotFound(id))?;
        Ok(self.edits.begin(id, node.notes()).to_string())
    }

    pub fn update_draft(&mut self, id: CategoryId, text: impl Into<String>) -> CoreResult<()> {
        self.edits.update(id, text)
    }

    pub fn cancel_edit(&mut self, id: CategoryId) -> bool {
        self.edits.cancel(id)
    }

    /// Saves the draft of `id`. The node leaves editing only on success.
    pub async fn save_notes(&mut self, id: CategoryId) -> CoreResult<()> {
        let notes = self
            .edits
            .draft(id)
            .ok_or_else(|| CoreError::InvalidOperation(format!("category {id} is not being edited")))?
            .trim()
            .to_string();
        validate_notes(&notes)?;

        let span = operation_span("edit_notes");
        async {
            match self.backend.edit_notes(id, &notes).await {
                Ok(_) => {
                    tracing::info!(category_id = id, "notes updated");
                    self.edits.finish(id);
                    self.refresh().await?;
                    Ok(())
                }
                Err(err) => Err(self.fail_mutation(err, EDIT_ERROR_MESSAGE)),
            }
        }
        .instrument(span)
        .await
    }

    /// First step of removal: remembers `id` until confirmed or dismissed.
    pub fn request_removal(&mut self, id: CategoryId) -> CoreResult<()> {
        if !self.store.tree().contains(id) {
            return Err(CoreError::CategoryNotFound(id));
        }
        self.pending_removal = Some(id);
        Ok(())
    }

    pub fn dismiss_removal(&mut self) -> Option<CategoryId> {
        self.pending_removal.take()
    }

    /// Second step of removal. On failure the request stays pending.
    pub async fn confirm_removal(&mut self) -> CoreResult<CategoryId> {
        let id = self.pending_removal.ok_or_else(|| {
            CoreError::InvalidOperation("no removal is awaiting confirmation".into())
        })?;

        let span = operation_span("remove");
        async {
            match self.backend.remove_category(id).await {
                Ok(()) => {
                    tracing::info!(category_id = id, "category removed");
                    self.pending_removal = None;
                    self.edits.finish(id);
                    self.refresh().await?;
                    Ok(id)
                }
                Err(err) => Err(self.fail_mutation(err, REMOVE_ERROR_MESSAGE)),
            }
        }
        .instrument(span)
        .await
    }

    fn apply_assignments(&mut self, assignments: Vec<CategoryAssignment>) -> bool {
        if !self.store.replace(assignments) {
            return false;
        }
        self.eligible = eligible(&self.catalog, self.store.assignments());
        let dropped = self.edits.retain_present(self.store.tree());
        if dropped > 0 {
            tracing::debug!(dropped, "discarded drafts of removed categories");
        }
        if let Some(id) = self.pending_removal {
            if !self.store.tree().contains(id) {
                self.pending_removal = None;
            }
        }
        true
    }

    fn fail_load(&mut self, err: BackendError, cancel: &CancellationToken) -> CoreError {
        if cancel.is_cancelled() {
            return CoreError::Cancelled;
        }
        tracing::error!(error = %err, "loading spending data failed");
        self.status = LoadStatus::Failed(LOAD_ERROR_MESSAGE.into());
        err.into()
    }

    fn fail_mutation(&mut self, err: BackendError, message: &str) -> CoreError {
        tracing::error!(error = %err, "{message}");
        self.last_error = Some(message.to_string());
        err.into()
    }
}

/// Rejects notes longer than [`MAX_NOTES_LEN`] characters.
pub fn validate_notes(notes: &str) -> CoreResult<()> {
    if notes.chars().count() > MAX_NOTES_LEN {
        return Err(CoreError::validation(
            FormField::Notes,
            format!("Notes must be at most {MAX_NOTES_LEN} characters."),
        ));
    }
    Ok(())
}

fn operation_span(op: &'static str) -> tracing::Span {
    tracing::info_span!("mutation", op, operation_id = %Uuid::new_v4())
}
