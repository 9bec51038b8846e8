//! Admin dashboard route.

use axum::{Json, Router, extract::State, routing::get};

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::DashboardStats;
use crate::services::ratings::RatingService;
use crate::state::AppState;

/// Build the admin router.
pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

/// Platform-wide counts of users, stores and ratings.
pub async fn dashboard(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>> {
    let stats = RatingService::new(state.pool()).dashboard_stats().await?;
    Ok(Json(stats))
}
