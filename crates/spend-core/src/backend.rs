use async_trait::async_trait;
use spend_domain::{CatalogEntry, CategoryAssignment, CategoryId, NewCategoryAssignment};

use crate::error::BackendError;

/// Abstraction over the spending REST backend.
///
/// Every call is a suspension point; nothing else in the core awaits.
#[async_trait]
pub trait SpendingBackend: Send + Sync {
    /// Fetches the full assignment list of the current user.
    async fn fetch_assignments(&self) -> Result<Vec<CategoryAssignment>, BackendError>;

    /// Fetches the catalog of categories offered by the add form, unsorted.
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, BackendError>;

    async fn add_category(
        &self,
        request: &NewCategoryAssignment,
    ) -> Result<CategoryAssignment, BackendError>;

    async fn edit_notes(
        &self,
        category_id: CategoryId,
        notes: &str,
    ) -> Result<CategoryAssignment, BackendError>;

    async fn remove_category(&self, category_id: CategoryId) -> Result<(), BackendError>;
}
