//! Authentication error types.
//!
//! The `Display` text of the client-facing variants is the message returned
//! in the response body.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::validation::ValidationError;

/// Errors that can occur during authentication and authorization.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Someone tried to self-register an admin account.
    #[error("Admin accounts cannot be self-registered")]
    AdminRegistration,

    /// Email already belongs to another account.
    #[error("Email already exists")]
    EmailTaken,

    /// Invalid credentials (wrong password or unknown email).
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No bearer token on a protected request.
    #[error("Unauthorized")]
    MissingToken,

    /// Token is malformed, tampered with, signed with another key or expired.
    #[error("Invalid token")]
    InvalidToken,

    /// Caller's role is not allowed to perform the operation.
    #[error("Access denied")]
    AccessDenied,

    /// Account no longer exists.
    #[error("User not found")]
    UserNotFound,

    /// Current password did not match on a password change.
    #[error("Current password is incorrect")]
    IncorrectPassword,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Token could not be signed.
    #[error("token signing error: {0}")]
    TokenSigning(#[source] jsonwebtoken::errors::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
