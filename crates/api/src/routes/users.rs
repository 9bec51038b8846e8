//! User administration route handlers (admin only).

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::get,
};

use storerate_core::UserId;

use super::auth::UserResponse;
use super::{json_body, path_id};
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{ListQuery, User, UserDetails};
use crate::services::auth::{AuthService, NewAccount};
use crate::services::users::UserService;
use crate::state::AppState;

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show))
}

/// List accounts, filtered by name, email, address and role.
pub async fn list(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<User>>> {
    let users = UserService::new(state.pool()).list(&query).await?;
    Ok(Json(users))
}

/// Create an account of any role, including `admin`.
pub async fn create(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    body: std::result::Result<Json<NewAccount>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let account = json_body(body)?;
    let user = AuthService::new(state.pool(), state.tokens())
        .create_account(&account)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            message: "User created successfully",
            user,
        }),
    ))
}

pub async fn show(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    path: std::result::Result<Path<i32>, PathRejection>,
) -> Result<Json<UserDetails>> {
    let id = UserId::new(path_id(path)?);
    let details = UserService::new(state.pool()).details(id).await?;
    Ok(Json(details))
}
