//! Rating route handlers.
//!
//! Every route requires a bearer token; the owner report additionally
//! requires the `store_owner` role.

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::{get, post, put},
};
use serde::Serialize;

use storerate_core::{RatingId, StoreId};

use super::{json_body, path_id};
use crate::error::Result;
use crate::middleware::{RequireAuth, RequireStoreOwner};
use crate::models::{OwnerRatingReport, Rating};
use crate::services::ratings::{RatingService, SubmitRating, UpdateRating};
use crate::state::AppState;

/// Build the ratings router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit))
        .route("/store-owner", get(owner_report))
        .route("/user/{store_id}", get(own_rating))
        .route("/{id}", put(update))
}

/// Response carrying a rating record.
#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub message: &'static str,
    pub rating: Rating,
}

/// Submit the caller's first rating of a store.
pub async fn submit(
    RequireAuth(claims): RequireAuth,
    State(state): State<AppState>,
    body: std::result::Result<Json<SubmitRating>, JsonRejection>,
) -> Result<(StatusCode, Json<RatingResponse>)> {
    let request = json_body(body)?;
    let rating = RatingService::new(state.pool())
        .submit(claims.user_id, &request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RatingResponse {
            message: "Rating submitted successfully",
            rating,
        }),
    ))
}

/// Change one of the caller's ratings.
pub async fn update(
    RequireAuth(claims): RequireAuth,
    State(state): State<AppState>,
    path: std::result::Result<Path<i32>, PathRejection>,
    body: std::result::Result<Json<UpdateRating>, JsonRejection>,
) -> Result<Json<RatingResponse>> {
    let id = RatingId::new(path_id(path)?);
    let request = json_body(body)?;
    let rating = RatingService::new(state.pool())
        .update(id, claims.user_id, &request)
        .await?;

    Ok(Json(RatingResponse {
        message: "Rating updated successfully",
        rating,
    }))
}

/// The caller's rating of a store; `null` when they have not rated it.
pub async fn own_rating(
    RequireAuth(claims): RequireAuth,
    State(state): State<AppState>,
    path: std::result::Result<Path<i32>, PathRejection>,
) -> Result<Json<Option<Rating>>> {
    let store_id = StoreId::new(path_id(path)?);
    let rating = RatingService::new(state.pool())
        .for_user_and_store(claims.user_id, store_id)
        .await?;
    Ok(Json(rating))
}

/// Ratings and statistics for the caller's store.
pub async fn owner_report(
    RequireStoreOwner(claims): RequireStoreOwner,
    State(state): State<AppState>,
) -> Result<Json<OwnerRatingReport>> {
    let report = RatingService::new(state.pool())
        .owner_report(claims.user_id)
        .await?;
    Ok(Json(report))
}
