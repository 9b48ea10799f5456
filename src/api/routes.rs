//! API route handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;

use super::extract::ApiJson;
use super::server::SharedState;
use crate::auth::{Identity, LoginRequest, LoginResponse, User, UserInfo};
use crate::error::{Error, Result};
use crate::store::{NewStudent, Student, StudentUpdate};

// Health check

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

// Login

async fn authenticate(state: &SharedState, req: LoginRequest) -> Result<User> {
    let users = state.users.clone();
    let email = req.email.clone();
    let user = tokio::task::spawn_blocking(move || users.authenticate(&req.email, &req.password))
        .await
        .map_err(|e| Error::Other(format!("login task failed: {}", e)))?;

    match &user {
        Ok(user) => tracing::info!("Login succeeded for {} ({})", user.email, user.role),
        Err(_) => tracing::warn!("Login failed for {}", email),
    }
    user
}

/// Admin dashboard login; returns a bearer token
pub async fn dashboard_login(
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let user = authenticate(&state, req).await?;
    let token = state.tokens.issue_bearer(&user)?;
    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

/// Registration portal login; returns a token for the custom header
pub async fn registration_login(
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let user = authenticate(&state, req).await?;
    let token = state.tokens.issue_scoped(&user)?;
    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

pub async fn me(Extension(identity): Extension<Identity>) -> Json<Identity> {
    Json(identity)
}

// Student routes

pub async fn list_students(State(state): State<SharedState>) -> Json<Vec<Student>> {
    Json(state.students.list().await)
}

pub async fn get_student(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Student>> {
    Ok(Json(state.students.get(&id).await?))
}

pub async fn register_student(
    State(state): State<SharedState>,
    Extension(identity): Extension<Identity>,
    ApiJson(req): ApiJson<NewStudent>,
) -> Result<(StatusCode, Json<Student>)> {
    let student = state.students.create(req, &identity.label()).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn update_student(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<StudentUpdate>,
) -> Result<Json<Student>> {
    Ok(Json(state.students.update(&id, req).await?))
}

pub async fn delete_student(
    State(state): State<SharedState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let student = state.students.delete(&id).await?;
    tracing::info!("Student {} deleted by {}", student.id, identity.label());
    Ok(Json(json!({ "message": "Student deleted", "id": student.id })))
}

// Permissions

pub async fn list_users(State(state): State<SharedState>) -> Json<Vec<UserInfo>> {
    Json(state.users.list())
}
