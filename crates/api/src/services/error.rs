//! Errors shared by the store, rating and user services.

use thiserror::Error;

use super::validation::ValidationError;
use crate::db::RepositoryError;

/// Errors that can occur in non-auth service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The operation would violate a uniqueness rule.
    #[error("{0}")]
    Conflict(String),

    /// The target entity does not exist (or is not visible to the caller).
    #[error("{0}")]
    NotFound(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
