//! Authentication route handlers.
//!
//! Handles registration, login, logout, the current account and password changes.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post, put},
};
use serde::Serialize;

use super::{MessageResponse, json_body};
use crate::error::{Result, add_breadcrumb};
use crate::middleware::{RateLimiterLayer, RequireAuth};
use crate::models::user::User;
use crate::services::auth::{AuthService, LoginRequest, NewAccount, PasswordChange};
use crate::state::AppState;

/// Build the auth router.
///
/// The limiter, when given, covers only the endpoints that take a password.
pub fn router(limiter: Option<RateLimiterLayer>) -> Router<AppState> {
    let credentials = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/update-password", put(update_password));
    let credentials = match limiter {
        Some(layer) => credentials.layer(layer),
        None => credentials,
    };

    Router::new()
        .merge(credentials)
        .route("/logout", post(logout))
        .route("/me", get(me))
}

/// Response carrying a user record.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub message: &'static str,
    pub user: User,
}

/// Response to a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub user: User,
}

/// Register a `user` or `store_owner` account.
pub async fn register(
    State(state): State<AppState>,
    body: std::result::Result<Json<NewAccount>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let account = json_body(body)?;
    let user = AuthService::new(state.pool(), state.tokens())
        .register(&account)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            message: "User registered successfully",
            user,
        }),
    ))
}

/// Exchange email and password for a session token.
pub async fn login(
    State(state): State<AppState>,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let request = json_body(body)?;
    let (token, user) = AuthService::new(state.pool(), state.tokens())
        .login(&request)
        .await?;

    let user_id = user.id.to_string();
    let data: &[(&str, &str)] = &[("user_id", &user_id), ("role", user.role.as_str())];
    add_breadcrumb("auth", "Logged in", Some(data));

    Ok(Json(LoginResponse {
        message: "Login successful",
        token,
        user,
    }))
}

/// Tokens are stateless; the client discards its copy.
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Logout successful",
    })
}

/// The account behind the bearer token.
pub async fn me(
    RequireAuth(claims): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool(), state.tokens())
        .current_user(claims.user_id)
        .await?;
    Ok(Json(user))
}

/// Change the caller's password.
pub async fn update_password(
    RequireAuth(claims): RequireAuth,
    State(state): State<AppState>,
    body: std::result::Result<Json<PasswordChange>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let change = json_body(body)?;
    AuthService::new(state.pool(), state.tokens())
        .update_password(claims.user_id, &change)
        .await?;

    Ok(Json(MessageResponse {
        message: "Password updated successfully",
    }))
}
