//! API integration tests
//! Exercises login, the three gated areas, and the student CRUD handlers
//! through the full application router.
//!
//! Run with: cargo test --test api_crud_tests

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use zabfest::api::{create_router, AppState};
use zabfest::auth::hash_password;
use zabfest::config::{Config, UserConfig};
use zabfest::Error;

const ADMIN_EMAIL: &str = "admin@zab.edu";
const DESK_EMAIL: &str = "desk@zab.edu";
const PASSWORD: &str = "efest-2024";

fn user(email: &str, role: &str) -> UserConfig {
    UserConfig {
        id: None,
        email: email.to_string(),
        name: None,
        role: role.to_string(),
        password_hash: hash_password(PASSWORD, 4).unwrap(),
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.secret = Some("api-test-secret".to_string());
    config.users = vec![
        user(ADMIN_EMAIL, "admin"),
        user(DESK_EMAIL, "registrationTeam"),
    ];
    config
}

async fn test_app() -> Router {
    let state = AppState::new(test_config()).await.expect("valid config");
    create_router(Arc::new(state))
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    auth: Option<(&str, String)>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((name, value)) = auth {
        builder = builder.header(name, value);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn login(app: &Router, path: &str, email: &str) -> String {
    let (status, body) = call(
        app,
        "POST",
        path,
        None,
        Some(json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"].as_str().expect("token in body").to_string()
}

fn bearer(token: &str) -> Option<(&'static str, String)> {
    Some(("authorization", format!("Bearer {}", token)))
}

fn x_auth(token: &str) -> Option<(&'static str, String)> {
    Some(("x-auth-token", token.to_string()))
}

fn new_student(email: &str) -> Value {
    json!({
        "name": "Hamza Ali",
        "email": email,
        "roll_number": "2112150",
        "events": ["Speed Programming", "Robo Race"],
        "payment": { "status": "paid", "amount": 1500 }
    })
}

// ============================================================================
// Public routes
// ============================================================================

#[tokio::test]
async fn test_health_is_public() {
    let app = test_app().await;
    let (status, body) = call(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_dashboard_login_returns_bearer_claims() {
    let app = test_app().await;
    let (status, body) = call(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": ADMIN_EMAIL, "password": PASSWORD })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);
    assert_eq!(body["user"]["role"], "admin");
    assert!(body["user"].get("password_hash").is_none());

    let token = body["token"].as_str().unwrap();
    let (status, me) = call(&app, "GET", "/api/admin/me", bearer(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], ADMIN_EMAIL);
    assert_eq!(me["id"], ADMIN_EMAIL);
    assert_eq!(me["role"], "admin");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = test_app().await;
    for (email, password) in [(ADMIN_EMAIL, "wrong"), ("ghost@zab.edu", PASSWORD)] {
        let (status, body) = call(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "message": "Invalid email or password" }));
    }
}

// ============================================================================
// Gated areas
// ============================================================================

#[tokio::test]
async fn test_dashboard_requires_bearer() {
    let app = test_app().await;
    let (status, body) = call(&app, "GET", "/api/admin/students", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authorization header missing or malformed");
}

#[tokio::test]
async fn test_registration_requires_team_role() {
    let app = test_app().await;

    let (status, body) = call(&app, "GET", "/api/registration/students", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["msg"], "No token, authorization denied");

    let admin = login(&app, "/api/registration/login", ADMIN_EMAIL).await;
    let (status, body) = call(&app, "GET", "/api/registration/students", x_auth(&admin), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["msg"], "Access forbidden: insufficient role");

    let desk = login(&app, "/api/registration/login", DESK_EMAIL).await;
    let (status, body) = call(&app, "GET", "/api/registration/students", x_auth(&desk), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_permissions_require_admin_role() {
    let app = test_app().await;

    let desk = login(&app, "/api/registration/login", DESK_EMAIL).await;
    let (status, _) = call(&app, "GET", "/api/permissions/users", x_auth(&desk), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = login(&app, "/api/registration/login", ADMIN_EMAIL).await;
    let (status, body) = call(&app, "GET", "/api/permissions/users", x_auth(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["email"], ADMIN_EMAIL);
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));
}

#[tokio::test]
async fn test_bearer_token_not_accepted_in_custom_header_area() {
    let app = test_app().await;
    // Dashboard tokens carry no nested user claim
    let token = login(&app, "/api/auth/login", DESK_EMAIL).await;
    let (status, body) = call(&app, "GET", "/api/registration/students", x_auth(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["msg"], "Token is not valid");
}

// ============================================================================
// Student CRUD
// ============================================================================

#[tokio::test]
async fn test_student_lifecycle() {
    let app = test_app().await;
    let desk = login(&app, "/api/registration/login", DESK_EMAIL).await;
    let admin = login(&app, "/api/auth/login", ADMIN_EMAIL).await;

    // Register through the registration portal
    let (status, created) = call(
        &app,
        "POST",
        "/api/registration/students",
        x_auth(&desk),
        Some(new_student("Hamza@Zab.edu")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["email"], "hamza@zab.edu");
    assert_eq!(created["registered_by"], DESK_EMAIL);
    assert_eq!(created["payment"]["status"], "paid");
    let id = created["id"].as_str().unwrap().to_string();

    // Visible on the dashboard
    let (status, list) = call(&app, "GET", "/api/admin/students", bearer(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let uri = format!("/api/admin/students/{}", id);
    let (status, fetched) = call(&app, "GET", &uri, bearer(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    // Partial update
    let (status, updated) = call(
        &app,
        "PUT",
        &uri,
        bearer(&admin),
        Some(json!({ "phone": "0300-1234567", "events": ["Robo Race"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Hamza Ali");
    assert_eq!(updated["phone"], "0300-1234567");
    assert_eq!(updated["events"], json!(["Robo Race"]));

    // Delete
    let (status, body) = call(&app, "DELETE", &uri, bearer(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Student deleted");

    let (status, body) = call(&app, "GET", &uri, bearer(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_register_validation_and_duplicates() {
    let app = test_app().await;
    let desk = login(&app, "/api/registration/login", DESK_EMAIL).await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/registration/students",
        x_auth(&desk),
        Some(json!({ "name": "", "email": "x@zab.edu" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("name"));

    let (status, _) = call(
        &app,
        "POST",
        "/api/registration/students",
        x_auth(&desk),
        Some(new_student("dup@zab.edu")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = call(
        &app,
        "POST",
        "/api/registration/students",
        x_auth(&desk),
        Some(new_student("DUP@zab.edu")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_malformed_bodies_get_json_errors() {
    let app = test_app().await;

    let (status, body) = call(&app, "POST", "/api/auth/login", None, Some(json!({ "email": 1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Validation failed"));

    let desk = login(&app, "/api/registration/login", DESK_EMAIL).await;
    let (status, body) = call(&app, "POST", "/api/registration/students", x_auth(&desk), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let admin = login(&app, "/api/auth/login", ADMIN_EMAIL).await;
    let (status, body) = call(
        &app,
        "PUT",
        "/api/admin/students/any",
        bearer(&admin),
        Some(json!({ "events": "not-a-list" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_update_and_delete_missing_student() {
    let app = test_app().await;
    let admin = login(&app, "/api/auth/login", ADMIN_EMAIL).await;

    let (status, _) = call(
        &app,
        "PUT",
        "/api/admin/students/missing",
        bearer(&admin),
        Some(json!({ "name": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, "DELETE", "/api/admin/students/missing", bearer(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Startup validation
// ============================================================================

#[tokio::test]
async fn test_startup_fails_without_secret() {
    let mut config = test_config();
    config.auth.secret = None;
    assert!(matches!(AppState::new(config).await, Err(Error::MissingSecret)));

    let mut config = test_config();
    config.auth.secret = Some(String::new());
    assert!(matches!(AppState::new(config).await, Err(Error::MissingSecret)));
}

#[tokio::test]
async fn test_startup_fails_on_bad_header_name() {
    let mut config = test_config();
    config.auth.header_name = "not a header".to_string();
    assert!(matches!(AppState::new(config).await, Err(Error::Config(_))));
}

#[tokio::test]
async fn test_custom_header_name_from_config() {
    let mut config = test_config();
    config.auth.header_name = "x-fest-token".to_string();
    let app = create_router(Arc::new(AppState::new(config).await.unwrap()));

    let desk = login(&app, "/api/registration/login", DESK_EMAIL).await;
    let (status, _) = call(
        &app,
        "GET",
        "/api/registration/students",
        Some(("x-fest-token", desk)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
