//! Store route handlers.
//!
//! Listing and lookup are public; a valid bearer token additionally attaches
//! the caller's own rating to each store. Writes are admin-only.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::get,
};
use serde::Serialize;

use storerate_core::StoreId;

use super::{MessageResponse, json_body, path_id};
use crate::error::Result;
use crate::middleware::{OptionalAuth, RequireAdmin};
use crate::models::{ListQuery, Store, StoreWithRating};
use crate::services::stores::{CreateStore, StoreService, UpdateStore};
use crate::state::AppState;

/// Build the stores router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(destroy))
}

/// Response carrying a store record.
#[derive(Debug, Serialize)]
pub struct StoreResponse {
    pub message: &'static str,
    pub store: Store,
}

/// List stores, filtered by name and address.
pub async fn list(
    OptionalAuth(claims): OptionalAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<StoreWithRating>>> {
    let viewer = claims.map(|c| c.user_id);
    let stores = StoreService::new(state.pool()).list(&query, viewer).await?;
    Ok(Json(stores))
}

/// A single store with its rating aggregate.
pub async fn show(
    OptionalAuth(claims): OptionalAuth,
    State(state): State<AppState>,
    path: std::result::Result<Path<i32>, PathRejection>,
) -> Result<Json<StoreWithRating>> {
    let id = StoreId::new(path_id(path)?);
    let viewer = claims.map(|c| c.user_id);
    let store = StoreService::new(state.pool()).get(id, viewer).await?;
    Ok(Json(store))
}

pub async fn create(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    body: std::result::Result<Json<CreateStore>, JsonRejection>,
) -> Result<(StatusCode, Json<StoreResponse>)> {
    let request = json_body(body)?;
    let store = StoreService::new(state.pool()).create(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(StoreResponse {
            message: "Store added successfully",
            store,
        }),
    ))
}

pub async fn update(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    path: std::result::Result<Path<i32>, PathRejection>,
    body: std::result::Result<Json<UpdateStore>, JsonRejection>,
) -> Result<Json<StoreResponse>> {
    let id = StoreId::new(path_id(path)?);
    let request = json_body(body)?;
    let store = StoreService::new(state.pool()).update(id, &request).await?;

    Ok(Json(StoreResponse {
        message: "Store updated successfully",
        store,
    }))
}

/// Delete a store; its ratings go with it.
pub async fn destroy(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    path: std::result::Result<Path<i32>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    let id = StoreId::new(path_id(path)?);
    StoreService::new(state.pool()).delete(id).await?;

    Ok(Json(MessageResponse {
        message: "Store deleted successfully",
    }))
}
