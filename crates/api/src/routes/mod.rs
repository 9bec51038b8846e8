//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST /auth/register          - Self-service registration (user, store_owner)
//! POST /auth/login             - Exchange credentials for a session token
//! POST /auth/logout            - Acknowledge logout (client drops the token)
//! GET  /auth/me                - Current account (bearer)
//! PUT  /auth/update-password   - Change password (bearer)
//!
//! # Stores
//! GET    /stores               - List with rating aggregates (optional bearer)
//! GET    /stores/{id}          - Single store (optional bearer)
//! POST   /stores               - Create (admin)
//! PUT    /stores/{id}          - Partial update (admin)
//! DELETE /stores/{id}          - Delete with its ratings (admin)
//!
//! # Ratings (bearer)
//! POST /ratings                - Submit first rating for a store
//! PUT  /ratings/{id}           - Change own rating
//! GET  /ratings/user/{storeId} - Own rating for a store, or null
//! GET  /ratings/store-owner    - Owner report (store_owner)
//!
//! # Users (admin)
//! GET  /users                  - List with filters
//! POST /users                  - Create an account of any role
//! GET  /users/{id}             - Details, with store rating for owners
//!
//! # Admin
//! GET  /admin/dashboard        - User, store and rating counts
//! ```

pub mod admin;
pub mod auth;
pub mod ratings;
pub mod stores;
pub mod users;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{HeaderValue, Method, StatusCode, header},
    routing::get,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::AppError;
use crate::middleware::{RateLimiterLayer, request_id_middleware};
use crate::state::AppState;

/// Body of responses that only carry a confirmation.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Unwrap a JSON body, turning extractor rejections into JSON errors.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for a missing or malformed body.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// Unwrap a numeric path parameter.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the segment is not an integer ID.
pub fn path_id<T>(path: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    path.map(|Path(id)| id)
        .map_err(|_| AppError::BadRequest("Invalid ID".to_owned()))
}

/// JSON 404 for unknown routes.
async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_owned())
}

/// Create all routes for the API.
///
/// `auth_limiter` throttles the endpoints that accept credentials; tests
/// pass `None`.
pub fn routes(auth_limiter: Option<RateLimiterLayer>) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router(auth_limiter))
        .nest("/stores", stores::router())
        .nest("/ratings", ratings::router())
        .nest("/users", users::router())
        .nest("/admin", admin::router())
        .fallback(not_found)
}

/// Build the full application: health checks, API routes and the
/// middleware stack below the Sentry layers.
pub fn app(state: AppState, auth_limiter: Option<RateLimiterLayer>) -> Router {
    let cors = cors_layer(&state.config().cors_origins);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes(auth_limiter))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(cors)
        .with_state(state)
}

/// CORS for the browser frontend. Unparseable origins are skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
