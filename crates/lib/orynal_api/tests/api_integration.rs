//! Integration tests: drive the full router against the in-memory store.
//!
//! The pool connects lazily and none of the routes exercised here reach it.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use orynal_api::config::ApiConfig;
use orynal_api::{AppState, routes};
use orynal_core::auth::jwt::{self, ACCESS_TOKEN_TTL};
use orynal_core::models::auth::{AccessClaims, Role};
use orynal_core::store::{IdentityStore, MemoryStore};
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

const SECRET: &str = "integration-secret";

fn app(store: &Arc<MemoryStore>) -> Router {
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(100))
        .connect_lazy("postgres://localhost:5432/orynal_test")
        .expect("lazy pool");
    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        pg_connection_url: "postgres://localhost:5432/orynal_test".into(),
        jwt_secret: SECRET.into(),
        shutdown_timeout: Duration::from_secs(1),
    };
    let state = AppState::with_stores(pool, config, store.clone(), store.clone(), store.clone());
    orynal_api::router(state)
}

fn access_token(user_id: i64, role: Role) -> String {
    jwt::sign(
        &AccessClaims {
            email: format!("{user_id}@example.com"),
            user_id,
            role,
        },
        SECRET.as_bytes(),
        ACCESS_TOKEN_TTL,
    )
    .expect("sign")
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get_with_auth(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).expect("request")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(request).await.expect("response");
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("parse JSON")
    };
    (status, json)
}

fn registration(email: &str, phone: &str) -> Value {
    json!({
        "name": "Malika",
        "surname": "Rashidova",
        "email": email,
        "phone": phone,
        "password": "correct-horse",
    })
}

async fn register_and_login(app: &Router, email: &str, phone: &str) -> Value {
    let (status, _) = send(app, json_request("POST", routes::AUTH_REGISTER, registration(email, phone))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(
        app,
        json_request(
            "POST",
            routes::AUTH_LOGIN,
            json!({"email": email, "password": "correct-horse"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"].clone()
}

// ---------------------------------------------------------------------------
// Auth flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_login_then_wrong_password() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);

    let pair = register_and_login(&app, "m@example.com", "+998 90 1").await;
    let access = pair["access_token"].as_str().expect("access token");
    let claims: AccessClaims = jwt::verify(access, SECRET.as_bytes()).expect("valid token");
    assert_eq!(claims.role, Role::User);
    assert_eq!(claims.email, "m@example.com");

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            routes::AUTH_LOGIN,
            json!({"email": "m@example.com", "password": "wrong-horse"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn registration_ignores_a_requested_role() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);

    let mut body = registration("sneaky@example.com", "+1");
    body["role"] = json!("admin");
    let (status, created) = send(&app, json_request("POST", routes::AUTH_REGISTER, body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], 201);

    let stored = store
        .find_by_email("sneaky@example.com")
        .await
        .unwrap()
        .expect("stored identity");
    assert_eq!(stored.role, Role::User);
    assert_eq!(created["data"]["id"], stored.id);
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);

    register_and_login(&app, "m@example.com", "+1").await;
    let (status, body) = send(
        &app,
        json_request("POST", routes::AUTH_REGISTER, registration("m@example.com", "+2")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn short_password_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);

    let mut body = registration("m@example.com", "+1");
    body["password"] = json!("short");
    let (status, body) = send(&app, json_request("POST", routes::AUTH_REGISTER, body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn refresh_token_issues_a_new_pair() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);

    let pair = register_and_login(&app, "m@example.com", "+1").await;
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            routes::AUTH_REFRESH,
            json!({"refresh_token": pair["refresh_token"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let access = body["data"]["access_token"].as_str().expect("access token");
    let claims: AccessClaims = jwt::verify(access, SECRET.as_bytes()).expect("valid token");
    assert_eq!(claims.role, Role::User);
}

#[tokio::test]
async fn garbage_refresh_token_is_unauthorized() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            routes::AUTH_REFRESH,
            json!({"refresh_token": "not-a-jwt"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

// ---------------------------------------------------------------------------
// Strict resolver
// ---------------------------------------------------------------------------

#[tokio::test]
async fn profile_requires_a_bearer_token() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);

    let (status, _) = send(&app, get_with_auth(routes::PROFILE, None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, get_with_auth(routes::PROFILE, Some("Basic dXNlcjpwYXNz"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);

    let stale = jwt::sign_at(
        &AccessClaims {
            email: "m@example.com".into(),
            user_id: 1,
            role: Role::User,
        },
        SECRET.as_bytes(),
        ACCESS_TOKEN_TTL,
        Utc::now() - chrono::Duration::hours(2),
    )
    .expect("sign");
    let (status, body) = send(
        &app,
        get_with_auth(routes::PROFILE, Some(&format!("Bearer {stale}"))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "token expired");
}

#[tokio::test]
async fn token_signed_with_another_secret_is_unauthorized() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);

    let forged = jwt::sign(
        &AccessClaims {
            email: "m@example.com".into(),
            user_id: 1,
            role: Role::Admin,
        },
        b"some-other-secret",
        ACCESS_TOKEN_TTL,
    )
    .expect("sign");
    let (status, _) = send(
        &app,
        get_with_auth(routes::PROFILE, Some(&format!("Bearer {forged}"))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_is_returned_for_a_valid_token() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);

    let pair = register_and_login(&app, "m@example.com", "+1").await;
    let bearer = format!("Bearer {}", pair["access_token"].as_str().expect("token"));
    let (status, body) = send(&app, get_with_auth(routes::PROFILE, Some(&bearer))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "m@example.com");
    assert_eq!(body["data"]["role"], "user");
    assert!(body["data"].get("password_hash").is_none());
}

// ---------------------------------------------------------------------------
// Role and ownership gates
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_routes_reject_other_roles() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);

    for role in [Role::User, Role::Owner] {
        let bearer = format!("Bearer {}", access_token(7, role));
        let uri = format!("{}{}", routes::ADMIN, routes::ADMIN_OWNERS);
        let (status, body) = send(&app, get_with_auth(&uri, Some(&bearer))).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{role} reached admin route");
        assert_eq!(body["error"], "forbidden");
    }

    let uri = format!("{}{}", routes::ADMIN, routes::ADMIN_CLIENTS);
    let (status, _) = send(&app, get_with_auth(&uri, None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn service_catalog_writes_are_admin_only() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);
    let catalogs = [routes::ADMIN_SERVICES, routes::ADMIN_RESTAURANT_SERVICES];

    for role in [Role::User, Role::Owner] {
        let token = access_token(7, role);
        for path in catalogs {
            let uri = format!("{}{path}", routes::ADMIN);
            let (status, _) =
                send(&app, authorized_json("POST", &uri, &token, json!({"name": "Wi-Fi"}))).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{role} created a service via {uri}");
        }
        let uri = format!("{}/services/3", routes::ADMIN);
        let (status, _) =
            send(&app, authorized_json("PUT", &uri, &token, json!({"name": "Parking"}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}

#[tokio::test]
async fn blank_service_names_are_rejected() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);
    let token = access_token(1, Role::Admin);

    for path in [routes::ADMIN_SERVICES, routes::ADMIN_RESTAURANT_SERVICES] {
        let uri = format!("{}{path}", routes::ADMIN);
        let (status, body) =
            send(&app, authorized_json("POST", &uri, &token, json!({"name": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["message"], "name is required");
    }
}

fn new_table() -> Value {
    json!({"name": "T1", "type": "terrace", "capacity": 4})
}

fn authorized_json(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn owner_cannot_add_tables_to_another_owners_restaurant() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);
    let restaurant_id = store.insert_restaurant(10);

    let uri = format!("/api/restaurants/{restaurant_id}/tables");
    let (status, body) = send(
        &app,
        authorized_json("POST", &uri, &access_token(11, Role::Owner), new_table()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "permission denied");
}

#[tokio::test]
async fn admin_is_held_to_ownership_on_table_writes() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);
    let restaurant_id = store.insert_restaurant(10);

    let uri = format!("/api/restaurants/{restaurant_id}/tables");
    let (status, _) = send(
        &app,
        authorized_json("POST", &uri, &access_token(1, Role::Admin), new_table()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn guests_cannot_edit_menus() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);
    let restaurant_id = store.insert_restaurant(10);

    let uri = format!("/api/restaurants/{restaurant_id}/menu");
    let (status, _) = send(
        &app,
        authorized_json(
            "POST",
            &uri,
            &access_token(10, Role::User),
            json!({"name": "Plov", "type": "main", "price": 45000.0}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn table_writes_on_a_missing_restaurant_are_not_found() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);

    let (status, _) = send(
        &app,
        authorized_json(
            "POST",
            "/api/restaurants/404/tables",
            &access_token(10, Role::Owner),
            new_table(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn plain_users_cannot_edit_restaurants() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);
    let restaurant_id = store.insert_restaurant(10);

    let (status, _) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/restaurants/{restaurant_id}"))
            .header(header::AUTHORIZATION, format!("Bearer {}", access_token(5, Role::User)))
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn restaurant_orders_require_the_owner_role() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);
    let restaurant_id = store.insert_restaurant(10);

    let uri = format!("/api/restaurants/{restaurant_id}/orders");
    let bearer = format!("Bearer {}", access_token(10, Role::User));
    let (status, _) = send(&app, get_with_auth(&uri, Some(&bearer))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let bearer = format!("Bearer {}", access_token(11, Role::Owner));
    let (status, _) = send(&app, get_with_auth(&uri, Some(&bearer))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn tolerant_listing_still_rejects_malformed_headers() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);

    let (status, _) = send(&app, get_with_auth(routes::RESTAURANTS, Some("Token abc"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
