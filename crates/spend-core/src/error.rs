use std::fmt;

use spend_domain::CategoryId;
use thiserror::Error;

/// Form control a validation failure is reported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Category,
    Notes,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FormField::Category => "category",
            FormField::Notes => "notes",
        };
        f.write_str(label)
    }
}

/// Failures raised while talking to the spending backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Malformed response: {0}")]
    Decode(String),
}

/// Inconsistencies found in backend data. Logged, never fatal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DataConsistencyError {
    #[error("record at position {position} has no category id")]
    MissingId { position: usize },
    #[error("parent category {parent_id} has no defining record")]
    UnresolvedParent { parent_id: CategoryId },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{message}")]
    Validation { field: FormField, message: String },
    #[error(transparent)]
    Transport(#[from] BackendError),
    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Operation cancelled")]
    Cancelled,
}

impl CoreError {
    pub fn validation(field: FormField, message: impl Into<String>) -> Self {
        CoreError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation { .. })
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
