use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use spend_domain::{
    CatalogEntry, CategoryAssignment, CategoryId, NewCategoryAssignment, MAX_NOTES_LEN,
};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::{
    AddCategoryForm, BackendError, CoreError, EditState, FormField, LoadStatus, MutationCoordinator,
    SpendingBackend, ADD_ERROR_MESSAGE, EDIT_ERROR_MESSAGE, LOAD_ERROR_MESSAGE,
    REMOVE_ERROR_MESSAGE, SELECT_CATEGORY_MESSAGE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Op {
    FetchAssignments,
    FetchCatalog,
    Add,
    Edit,
    Remove,
}

#[derive(Default)]
struct FakeState {
    assignments: Vec<CategoryAssignment>,
    catalog: Vec<CatalogEntry>,
    failing: HashSet<Op>,
    calls: Vec<Op>,
}

/// In-memory backend that records calls and fails on demand.
#[derive(Clone, Default)]
struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
    catalog_gate: Option<Arc<Notify>>,
}

impl FakeBackend {
    fn seeded() -> Self {
        let backend = Self::default();
        {
            let mut state = backend.state.lock().unwrap();
            state.assignments = vec![
                CategoryAssignment::child(12, 5, "groceries", ""),
                CategoryAssignment::parent(5, "food", "x"),
                CategoryAssignment::parent(7, "travel", ""),
            ];
            state.catalog = vec![
                CatalogEntry::new(7, "travel"),
                CatalogEntry::new(5, "Food"),
                CatalogEntry::new(20, "gas"),
                CatalogEntry::new(12, "groceries"),
                CatalogEntry::new(30, "Entertainment"),
            ];
        }
        backend
    }

    fn fail(&self, op: Op) {
        self.state.lock().unwrap().failing.insert(op);
    }

    fn recover(&self, op: Op) {
        self.state.lock().unwrap().failing.remove(&op);
    }

    fn calls(&self) -> Vec<Op> {
        self.state.lock().unwrap().calls.clone()
    }

    fn count(&self, op: Op) -> usize {
        self.calls().into_iter().filter(|call| *call == op).count()
    }

    fn enter(&self, op: Op) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(op);
        if state.failing.contains(&op) {
            return Err(BackendError::Status {
                status: 500,
                message: "boom".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SpendingBackend for FakeBackend {
    async fn fetch_assignments(&self) -> Result<Vec<CategoryAssignment>, BackendError> {
        self.enter(Op::FetchAssignments)?;
        Ok(self.state.lock().unwrap().assignments.clone())
    }

    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, BackendError> {
        if let Some(gate) = &self.catalog_gate {
            gate.notified().await;
        }
        self.enter(Op::FetchCatalog)?;
        Ok(self.state.lock().unwrap().catalog.clone())
    }

    async fn add_category(
        &self,
        request: &NewCategoryAssignment,
    ) -> Result<CategoryAssignment, BackendError> {
        self.enter(Op::Add)?;
        let mut state = self.state.lock().unwrap();
        let label = state
            .catalog
            .iter()
            .find(|entry| entry.id == request.category_id)
            .map(|entry| entry.label.clone())
            .unwrap_or_default();
        let created = CategoryAssignment::parent(request.category_id, label, request.notes.clone());
        state.assignments.push(created.clone());
        Ok(created)
    }

    async fn edit_notes(
        &self,
        category_id: CategoryId,
        notes: &str,
    ) -> Result<CategoryAssignment, BackendError> {
        self.enter(Op::Edit)?;
        let mut state = self.state.lock().unwrap();
        let record = state
            .assignments
            .iter_mut()
            .find(|record| record.category_id == Some(category_id))
            .ok_or(BackendError::Status {
                status: 404,
                message: "not found".into(),
            })?;
        record.notes = Some(notes.to_string());
        Ok(record.clone())
    }

    async fn remove_category(&self, category_id: CategoryId) -> Result<(), BackendError> {
        self.enter(Op::Remove)?;
        self.state
            .lock()
            .unwrap()
            .assignments
            .retain(|record| record.category_id != Some(category_id));
        Ok(())
    }
}

async fn loaded(backend: &FakeBackend) -> MutationCoordinator<FakeBackend> {
    let mut coordinator = MutationCoordinator::new(backend.clone());
    coordinator
        .load(&CancellationToken::new())
        .await
        .expect("initial load");
    coordinator
}

fn eligible_ids(coordinator: &MutationCoordinator<FakeBackend>) -> Vec<CategoryId> {
    coordinator.eligible().iter().map(|entry| entry.id).collect()
}

#[tokio::test]
async fn load_builds_tree_and_sorted_eligible_catalog() {
    let backend = FakeBackend::seeded();
    let coordinator = loaded(&backend).await;

    assert_eq!(coordinator.status(), &LoadStatus::Ready);
    assert_eq!(coordinator.tree().parent_ids().collect::<Vec<_>>(), vec![5, 7]);
    assert_eq!(
        coordinator.tree().get(5).unwrap().name.as_deref(),
        Some("food")
    );
    let labels: Vec<_> = coordinator
        .catalog()
        .iter()
        .map(|entry| entry.label.as_str())
        .collect();
    assert_eq!(labels, ["Entertainment", "Food", "gas", "groceries", "travel"]);
    assert_eq!(eligible_ids(&coordinator), vec![30, 20]);
}

#[tokio::test]
async fn load_failure_is_terminal_and_reported() {
    let backend = FakeBackend::seeded();
    backend.fail(Op::FetchAssignments);
    let mut coordinator = MutationCoordinator::new(backend.clone());

    let err = coordinator
        .load(&CancellationToken::new())
        .await
        .expect_err("load fails");

    assert!(matches!(err, CoreError::Transport(_)));
    assert_eq!(
        coordinator.status(),
        &LoadStatus::Failed(LOAD_ERROR_MESSAGE.into())
    );
    assert_eq!(backend.count(Op::FetchCatalog), 0);
}

#[tokio::test]
async fn cancelled_load_discards_catalog() {
    let gate = Arc::new(Notify::new());
    let backend = FakeBackend {
        catalog_gate: Some(Arc::clone(&gate)),
        ..FakeBackend::seeded()
    };
    let mut coordinator = MutationCoordinator::new(backend.clone());
    let token = CancellationToken::new();

    let (result, ()) = tokio::join!(coordinator.load(&token), async {
        token.cancel();
        gate.notify_one();
    });

    assert!(matches!(result, Err(CoreError::Cancelled)));
    assert!(coordinator.catalog().is_empty());
    assert_eq!(coordinator.status(), &LoadStatus::Loading);
}

#[tokio::test]
async fn add_without_selection_never_hits_backend() {
    let backend = FakeBackend::seeded();
    let mut coordinator = loaded(&backend).await;
    let calls_before = backend.calls().len();
    coordinator.toggle_add_form();
    coordinator.set_add_notes("something");

    let err = coordinator.submit_add().await.expect_err("validation");

    assert!(matches!(
        err,
        CoreError::Validation {
            field: FormField::Category,
            ..
        }
    ));
    assert_eq!(
        coordinator.add_form().error.as_deref(),
        Some(SELECT_CATEGORY_MESSAGE)
    );
    assert_eq!(backend.calls().len(), calls_before);
    assert!(coordinator.add_form().open);
}

#[tokio::test]
async fn add_trims_notes_closes_form_and_refreshes() {
    let backend = FakeBackend::seeded();
    let mut coordinator = loaded(&backend).await;
    coordinator.toggle_add_form();
    coordinator.select_category(Some(20));
    coordinator.set_add_notes("  fill ups  ");

    let created = coordinator.submit_add().await.expect("add succeeds");

    assert_eq!(created.notes.as_deref(), Some("fill ups"));
    assert_eq!(coordinator.add_form(), &AddCategoryForm::default());
    assert!(coordinator.tree().get(20).is_some());
    assert_eq!(eligible_ids(&coordinator), vec![30]);
    assert_eq!(backend.count(Op::FetchAssignments), 2);
}

#[tokio::test]
async fn failed_add_keeps_form_and_tree() {
    let backend = FakeBackend::seeded();
    let mut coordinator = loaded(&backend).await;
    let before = coordinator.tree().clone();
    coordinator.toggle_add_form();
    coordinator.select_category(Some(20));
    coordinator.set_add_notes("fuel");
    backend.fail(Op::Add);

    let err = coordinator.submit_add().await.expect_err("add fails");

    assert!(matches!(err, CoreError::Transport(_)));
    assert_eq!(coordinator.last_error(), Some(ADD_ERROR_MESSAGE));
    assert_eq!(coordinator.add_form().selected, Some(20));
    assert_eq!(coordinator.add_form().notes, "fuel");
    assert_eq!(coordinator.tree(), &before);
    assert_eq!(backend.count(Op::FetchAssignments), 1);
}

#[tokio::test]
async fn overlong_notes_are_rejected_locally() {
    let backend = FakeBackend::seeded();
    let mut coordinator = loaded(&backend).await;
    coordinator.select_category(Some(20));
    coordinator.set_add_notes("n".repeat(MAX_NOTES_LEN + 1));

    let err = coordinator.submit_add().await.expect_err("too long");

    assert!(matches!(
        err,
        CoreError::Validation {
            field: FormField::Notes,
            ..
        }
    ));
    assert_eq!(backend.count(Op::Add), 0);
}

#[tokio::test]
async fn edit_session_saves_trimmed_draft_and_exits_editing() {
    let backend = FakeBackend::seeded();
    let mut coordinator = loaded(&backend).await;

    let draft = coordinator.begin_edit(12).expect("child exists");
    assert_eq!(draft, "");
    coordinator.update_draft(12, "  weekly shop ").unwrap();
    coordinator.save_notes(12).await.expect("save");

    assert_eq!(coordinator.edits().state(12), EditState::Viewing);
    let node = coordinator.tree().find(12).expect("child");
    assert_eq!(node.notes(), Some("weekly shop"));
}

#[tokio::test]
async fn failed_save_keeps_draft_open() {
    let backend = FakeBackend::seeded();
    let mut coordinator = loaded(&backend).await;
    coordinator.begin_edit(5).unwrap();
    coordinator.update_draft(5, "changed").unwrap();
    backend.fail(Op::Edit);

    coordinator.save_notes(5).await.expect_err("save fails");

    assert_eq!(coordinator.last_error(), Some(EDIT_ERROR_MESSAGE));
    assert_eq!(coordinator.edits().draft(5), Some("changed"));
    assert_eq!(coordinator.tree().get(5).unwrap().notes.as_deref(), Some("x"));

    backend.recover(Op::Edit);
    coordinator.save_notes(5).await.expect("retry succeeds");
    assert_eq!(
        coordinator.tree().get(5).unwrap().notes.as_deref(),
        Some("changed")
    );
}

#[tokio::test]
async fn cancel_edit_leaves_record_untouched() {
    let backend = FakeBackend::seeded();
    let mut coordinator = loaded(&backend).await;
    coordinator.begin_edit(5).unwrap();
    coordinator.begin_edit(12).unwrap();
    coordinator.update_draft(5, "discard me").unwrap();

    assert!(coordinator.cancel_edit(5));

    assert_eq!(coordinator.edits().state(5), EditState::Viewing);
    assert_eq!(coordinator.edits().state(12), EditState::Editing);
    assert_eq!(coordinator.tree().get(5).unwrap().notes.as_deref(), Some("x"));
    assert_eq!(backend.count(Op::Edit), 0);
}

#[tokio::test]
async fn begin_edit_on_unknown_node_fails() {
    let backend = FakeBackend::seeded();
    let mut coordinator = loaded(&backend).await;
    assert!(matches!(
        coordinator.begin_edit(99),
        Err(CoreError::CategoryNotFound(99))
    ));
}

#[tokio::test]
async fn removal_requires_confirmation() {
    let backend = FakeBackend::seeded();
    let mut coordinator = loaded(&backend).await;

    let err = coordinator.confirm_removal().await.expect_err("nothing pending");
    assert!(matches!(err, CoreError::InvalidOperation(_)));

    coordinator.request_removal(7).unwrap();
    assert_eq!(coordinator.dismiss_removal(), Some(7));
    assert_eq!(backend.count(Op::Remove), 0);

    coordinator.request_removal(7).unwrap();
    let removed = coordinator.confirm_removal().await.expect("removed");

    assert_eq!(removed, 7);
    assert_eq!(coordinator.pending_removal(), None);
    assert!(coordinator.tree().get(7).is_none());
    assert_eq!(eligible_ids(&coordinator), vec![30, 20, 7]);
}

#[tokio::test]
async fn failed_removal_keeps_list_and_pending_request() {
    let backend = FakeBackend::seeded();
    let mut coordinator = loaded(&backend).await;
    coordinator.request_removal(12).unwrap();
    backend.fail(Op::Remove);

    coordinator.confirm_removal().await.expect_err("remove fails");

    assert_eq!(coordinator.last_error(), Some(REMOVE_ERROR_MESSAGE));
    assert_eq!(coordinator.pending_removal(), Some(12));
    assert!(coordinator.tree().contains(12));
    assert_eq!(coordinator.assignments().len(), 3);
}

#[tokio::test]
async fn refresh_failure_keeps_last_snapshot() {
    let backend = FakeBackend::seeded();
    let mut coordinator = loaded(&backend).await;
    let generation = coordinator.store().generation();
    backend.fail(Op::FetchAssignments);

    coordinator.refresh().await.expect_err("refresh fails");

    assert_eq!(coordinator.store().generation(), generation);
    assert_eq!(coordinator.tree().len(), 2);
    assert_eq!(coordinator.status(), &LoadStatus::Ready);
}

#[tokio::test]
async fn refresh_drops_drafts_for_removed_nodes() {
    let backend = FakeBackend::seeded();
    let mut coordinator = loaded(&backend).await;
    coordinator.begin_edit(12).unwrap();
    coordinator.request_removal(12).unwrap();
    backend
        .state
        .lock()
        .unwrap()
        .assignments
        .retain(|record| record.category_id != Some(12));

    assert!(coordinator.refresh().await.expect("refresh"));

    assert_eq!(coordinator.edits().state(12), EditState::Viewing);
    assert_eq!(coordinator.pending_removal(), None);
}
