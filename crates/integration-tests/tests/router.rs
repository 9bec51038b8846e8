//! Router-level tests that need no database.
//!
//! Every request here is answered by an extractor, an auth gate or input
//! validation before any query runs; the server sits on a pool that cannot
//! connect, so a request that slipped through would fail with 500.

use reqwest::{Method, StatusCode};
use serde_json::json;

use storerate_core::Role;
use storerate_integration_tests::{TestServer, unreachable_pool};

async fn server() -> TestServer {
    TestServer::spawn(unreachable_pool()).await
}

// ============================================================================
// Infrastructure
// ============================================================================

#[tokio::test]
async fn test_health_is_ok_without_database() {
    let server = server().await;
    let resp = server.send(Method::GET, "/health", None, None).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, json!("ok"));
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let server = server().await;
    let resp = server.send(Method::GET, "/health/ready", None, None).await;

    assert_eq!(resp.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let server = server().await;
    let resp = server.send(Method::GET, "/nowhere", None, None).await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body, json!({ "message": "Route not found" }));
}

#[tokio::test]
async fn test_every_response_carries_request_id() {
    let server = server().await;
    let resp = server.send(Method::GET, "/nowhere", None, None).await;

    let id = resp.request_id.unwrap_or_default();
    assert_eq!(id.len(), 36, "expected a generated UUID, got {id:?}");
}

// ============================================================================
// Authentication gates
// ============================================================================

#[tokio::test]
async fn test_protected_route_without_token_is_401() {
    let server = server().await;
    let resp = server.send(Method::GET, "/auth/me", None, None).await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["message"], "Unauthorized");
}

#[tokio::test]
async fn test_garbage_token_is_401() {
    let server = server().await;
    let resp = server
        .send(Method::GET, "/auth/me", Some("not-a-token"), None)
        .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["message"], "Invalid token");
}

#[tokio::test]
async fn test_token_from_another_signer_is_401() {
    let server = server().await;
    let other = storerate_api::services::auth::TokenService::new(&secrecy::SecretString::from(
        "z8&Wq1!Er5#Ty9@Ui3$Op7^As2*Df6%Gh4",
    ));
    let token = other
        .issue(storerate_core::UserId::new(1), Role::Admin)
        .unwrap_or_default();

    let resp = server
        .send(Method::GET, "/admin/dashboard", Some(&token), None)
        .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_reject_other_roles() {
    let server = server().await;

    for role in [Role::User, Role::StoreOwner] {
        let token = server.token_for(7, role);
        for path in ["/admin/dashboard", "/users", "/users/1"] {
            let resp = server.send(Method::GET, path, Some(&token), None).await;
            assert_eq!(resp.status, StatusCode::FORBIDDEN, "{role} on {path}");
            assert_eq!(resp.body["message"], "Access denied");
        }
    }
}

#[tokio::test]
async fn test_store_writes_require_admin() {
    let server = server().await;
    let token = server.token_for(7, Role::User);
    let body = json!({ "name": "x", "email": "s@example.com", "address": "y" });

    let create = server
        .send(Method::POST, "/stores", Some(&token), Some(body.clone()))
        .await;
    let update = server
        .send(Method::PUT, "/stores/1", Some(&token), Some(body))
        .await;
    let delete = server
        .send(Method::DELETE, "/stores/1", Some(&token), None)
        .await;
    let anonymous = server.send(Method::DELETE, "/stores/1", None, None).await;

    assert_eq!(create.status, StatusCode::FORBIDDEN);
    assert_eq!(update.status, StatusCode::FORBIDDEN);
    assert_eq!(delete.status, StatusCode::FORBIDDEN);
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_owner_report_requires_store_owner() {
    let server = server().await;
    let token = server.token_for(7, Role::User);
    let resp = server
        .send(Method::GET, "/ratings/store-owner", Some(&token), None)
        .await;

    assert_eq!(resp.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_ratings_require_token() {
    let server = server().await;
    let resp = server
        .send(
            Method::POST,
            "/ratings",
            None,
            Some(json!({ "storeId": 1, "rating": 4 })),
        )
        .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Input validation
// ============================================================================

#[tokio::test]
async fn test_register_refuses_admin_role_first() {
    let server = server().await;
    let resp = server
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "role": "admin" })),
        )
        .await;

    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(resp.body["message"], "Admin accounts cannot be self-registered");
}

#[tokio::test]
async fn test_register_missing_fields() {
    let server = server().await;
    let resp = server
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "name": "Someone", "role": "user" })),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body, json!({ "message": "All fields are required" }));
}

#[tokio::test]
async fn test_register_reports_every_field_error() {
    let server = server().await;
    let resp = server
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "name": "Too Short",
                "email": "not-an-email",
                "password": "weak",
                "address": "1 Main Street",
                "role": "user",
            })),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "Validation failed");
    let errors = resp.body["errors"].as_array().cloned().unwrap_or_default();
    assert!(errors.contains(&json!("Name must be between 20 and 60 characters")));
    assert!(errors.contains(&json!("Invalid email address")));
    assert!(errors.contains(&json!("Password must be between 8 and 16 characters")));
    assert!(errors.contains(&json!("Password must contain at least one uppercase letter")));
}

#[tokio::test]
async fn test_register_unknown_role() {
    let server = server().await;
    let resp = server
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "name": "Alexandra Montgomery-Smith",
                "email": "alex@example.com",
                "password": "Secret#123",
                "address": "221B Baker Street",
                "role": "superuser",
            })),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "Invalid role specified");
}

#[tokio::test]
async fn test_login_missing_fields() {
    let server = server().await;
    let resp = server
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "alex@example.com" })),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "All fields are required");
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let server = server().await;
    let resp = server
        .client
        .post(format!("{}/auth/login", server.base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .map(|r| r.status())
        .ok();

    assert_eq!(resp, Some(StatusCode::BAD_REQUEST));
}

#[tokio::test]
async fn test_update_password_checks_policy_before_lookup() {
    let server = server().await;
    let token = server.token_for(7, Role::User);
    let resp = server
        .send(
            Method::PUT,
            "/auth/update-password",
            Some(&token),
            Some(json!({ "currentPassword": "Secret#123", "newPassword": "lowercase!" })),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.body["errors"],
        json!(["Password must contain at least one uppercase letter"])
    );
}

#[tokio::test]
async fn test_rating_out_of_range() {
    let server = server().await;
    let token = server.token_for(7, Role::User);

    for rating in [json!(0), json!(6), json!("seven"), json!(2.5)] {
        let resp = server
            .send(
                Method::POST,
                "/ratings",
                Some(&token),
                Some(json!({ "storeId": 1, "rating": rating })),
            )
            .await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "rating {rating}");
        assert_eq!(
            resp.body["message"],
            "Invalid rating. Must be between 1 and 5."
        );
    }
}

#[tokio::test]
async fn test_rating_requires_store_id() {
    let server = server().await;
    let token = server.token_for(7, Role::User);
    let resp = server
        .send(Method::POST, "/ratings", Some(&token), Some(json!({ "rating": 3 })))
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "Store ID is required");
}

#[tokio::test]
async fn test_non_numeric_id_is_400() {
    let server = server().await;
    let resp = server.send(Method::GET, "/stores/abc", None, None).await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "Invalid ID");
}

#[tokio::test]
async fn test_unknown_sort_field_is_400() {
    let server = server().await;
    let resp = server
        .send(Method::GET, "/stores?sortBy=password", None, None)
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "Invalid sort field: password");
}

#[tokio::test]
async fn test_store_create_missing_fields() {
    let server = server().await;
    let token = server.token_for(1, Role::Admin);
    let resp = server
        .send(
            Method::POST,
            "/stores",
            Some(&token),
            Some(json!({ "name": "Corner Shop" })),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "All fields are required");
}

#[tokio::test]
async fn test_logout_acknowledges() {
    let server = server().await;
    let resp = server.send(Method::POST, "/auth/logout", None, None).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, json!({ "message": "Logout successful" }));
}
