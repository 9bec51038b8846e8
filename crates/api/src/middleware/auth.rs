//! Authentication middleware and extractors.
//!
//! Provides extractors that verify the `Authorization: Bearer <token>` header
//! and apply the role gate before a handler runs.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use storerate_core::Role;

use crate::error::{AppError, set_sentry_user};
use crate::services::auth::{AuthError, Claims, authorize};
use crate::state::AppState;

/// Pull the raw token out of the `Authorization` header.
///
/// Returns `Ok(None)` when the header is absent and `Err` when it is present
/// but not a usable bearer credential.
fn bearer_token(parts: &Parts) -> Result<Option<&str>, AuthError> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = header.to_str().map_err(|_| AuthError::InvalidToken)?;
    let (scheme, token) = value.trim().split_once(' ').ok_or(AuthError::InvalidToken)?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::InvalidToken);
    }
    Ok(Some(token))
}

/// Verify the request's bearer token.
fn verify_request(parts: &Parts, state: &AppState) -> Result<Claims, AuthError> {
    let token = bearer_token(parts)?.ok_or(AuthError::MissingToken)?;
    state.tokens().verify(token)
}

/// Extractor that requires a valid session token.
///
/// Rejects with 401 when the token is missing, malformed or expired.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(claims): RequireAuth) -> impl IntoResponse {
///     format!("Hello, user {}!", claims.user_id)
/// }
/// ```
pub struct RequireAuth(pub Claims);

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let claims = verify_request(parts, &state)?;

        set_sentry_user(&claims.user_id, claims.role.as_str());
        Ok(Self(claims))
    }
}

/// Extractor that requires a valid token carrying the `admin` role.
///
/// Rejects with 401 without a valid token and 403 for other roles.
pub struct RequireAdmin(pub Claims);

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(claims) = RequireAuth::from_request_parts(parts, state).await?;
        authorize(&claims, &[Role::Admin])?;
        Ok(Self(claims))
    }
}

/// Extractor that requires a valid token carrying the `store_owner` role.
pub struct RequireStoreOwner(pub Claims);

impl<S> FromRequestParts<S> for RequireStoreOwner
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(claims) = RequireAuth::from_request_parts(parts, state).await?;
        authorize(&claims, &[Role::StoreOwner])?;
        Ok(Self(claims))
    }
}

/// Extractor that optionally gets the caller's claims.
///
/// Unlike `RequireAuth`, this never rejects: a missing or invalid token
/// simply yields `None`, so public endpoints keep working.
pub struct OptionalAuth(pub Option<Claims>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        Ok(Self(verify_request(parts, &state).ok()))
    }
}
