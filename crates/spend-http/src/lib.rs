//! spend-http
//!
//! HTTP/JSON implementation of [`SpendingBackend`] for the spending REST API.
//! Wraps user-spending retrieval, the category form choices, and the
//! add/edit/remove category endpoints using [`reqwest`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use spend_core::{BackendError, SpendingBackend};
use spend_domain::{
    CatalogEntry, CategoryAssignment, CategoryChoices, CategoryId, NewCategoryAssignment,
    NotesUpdate, UserSpending,
};

const SPENDING_PATH: &str = "/api/spendings/session";
const CHOICES_PATH: &str = "/api/spendings/categories/form";
const CATEGORIES_PATH: &str = "/api/spendings/categories";

/// HTTP client for one spending backend.
#[derive(Debug, Clone)]
pub struct HttpSpendingBackend {
    client: reqwest::Client,
    base_url: String,
}

/// Error payload some endpoints return alongside a non-2xx status.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

impl HttpSpendingBackend {
    /// Creates a backend for `base_url`, e.g. `http://localhost:8000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Reuses an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Creates a backend whose requests give up after `timeout`.
    ///
    /// Without a timeout the transport's own behaviour applies.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(request_error)?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn category_url(&self, category_id: CategoryId) -> String {
        format!("{}{}/{}", self.base_url, CATEGORIES_PATH, category_id)
    }

    // ---- private helpers ----

    /// Returns the response unchanged on success, or a
    /// [`BackendError::Status`] carrying the backend's message.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(BackendError::Status {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await.map_err(request_error)?;
        serde_json::from_slice(&bytes).map_err(|err| BackendError::Decode(err.to_string()))
    }

    async fn check_status(response: reqwest::Response) -> Result<(), BackendError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl SpendingBackend for HttpSpendingBackend {
    async fn fetch_assignments(&self) -> Result<Vec<CategoryAssignment>, BackendError> {
        tracing::debug!(path = SPENDING_PATH, "GET");
        let response = self
            .client
            .get(self.url(SPENDING_PATH))
            .send()
            .await
            .map_err(request_error)?;
        let spending: UserSpending = Self::parse_response(response).await?;
        Ok(spending.categories)
    }

    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, BackendError> {
        tracing::debug!(path = CHOICES_PATH, "GET");
        let response = self
            .client
            .get(self.url(CHOICES_PATH))
            .send()
            .await
            .map_err(request_error)?;
        let choices: CategoryChoices = Self::parse_response(response).await?;
        Ok(choices.choices)
    }

    async fn add_category(
        &self,
        request: &NewCategoryAssignment,
    ) -> Result<CategoryAssignment, BackendError> {
        tracing::debug!(path = CATEGORIES_PATH, category_id = request.category_id, "POST");
        let response = self
            .client
            .post(self.url(CATEGORIES_PATH))
            .json(request)
            .send()
            .await
            .map_err(request_error)?;
        Self::parse_response(response).await
    }

    async fn edit_notes(
        &self,
        category_id: CategoryId,
        notes: &str,
    ) -> Result<CategoryAssignment, BackendError> {
        tracing::debug!(category_id, "PUT notes");
        let body = NotesUpdate {
            notes: notes.to_string(),
        };
        let response = self
            .client
            .put(self.category_url(category_id))
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;
        Self::parse_response(response).await
    }

    async fn remove_category(&self, category_id: CategoryId) -> Result<(), BackendError> {
        tracing::debug!(category_id, "DELETE");
        let response = self
            .client
            .delete(self.category_url(category_id))
            .send()
            .await
            .map_err(request_error)?;
        Self::check_status(response).await
    }
}

fn request_error(err: reqwest::Error) -> BackendError {
    BackendError::Request(err.to_string())
}

/// Prefers the JSON `error`/`message` field, falling back to the raw body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            error: Some(message),
            ..
        })
        | Ok(ErrorBody {
            error: None,
            message: Some(message),
        }) => message,
        _ => body.trim().to_string(),
    }
}
