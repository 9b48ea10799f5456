//! HTTP API server

use axum::{
    http::HeaderName,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{require_auth, AuthGate, TokenService};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::{StudentStore, UserDirectory};

use super::routes;

/// Application state shared across handlers.
///
/// Built once at startup and never mutated; the student store synchronizes
/// internally.
pub struct AppState {
    pub config: Config,
    pub tokens: Arc<TokenService>,
    pub users: UserDirectory,
    pub students: StudentStore,
    pub token_header: HeaderName,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Validate configuration and open the stores.
    ///
    /// Fails when the secret is missing, so a misconfigured process never
    /// starts serving.
    pub async fn new(config: Config) -> Result<Self> {
        let tokens = Arc::new(TokenService::from_config(&config.auth)?);
        let token_header = HeaderName::try_from(config.auth.header_name.as_str()).map_err(|e| {
            Error::Config(format!(
                "invalid auth.header_name '{}': {}",
                config.auth.header_name, e
            ))
        })?;
        let users = UserDirectory::from_config(&config.users)?;
        let students = match &config.store.data_file {
            Some(path) => StudentStore::open(path).await?,
            None => StudentStore::new(),
        };

        Ok(Self {
            config,
            tokens,
            users,
            students,
            token_header,
        })
    }

    /// Gate for the admin dashboard: bearer token, any role
    pub fn dashboard_gate(&self) -> AuthGate {
        AuthGate::bearer(self.tokens.clone())
    }

    /// Gate for the registration-team portal
    pub fn registration_gate(&self) -> AuthGate {
        AuthGate::header(self.tokens.clone(), self.token_header.clone())
            .require_role(self.config.auth.registration_role.clone())
    }

    /// Gate for permission management
    pub fn admin_gate(&self) -> AuthGate {
        AuthGate::header(self.tokens.clone(), self.token_header.clone())
            .require_role(self.config.auth.admin_role.clone())
    }
}

/// Run the HTTP API server
pub async fn run_server(config: Config, host: &str, port: u16) -> Result<()> {
    let state = Arc::new(AppState::new(config).await?);

    if state.users.is_empty() {
        tracing::warn!("No [[users]] configured; logins will always fail");
    }

    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: SharedState) -> Router {
    let dashboard = Router::new()
        .route("/api/admin/me", get(routes::me))
        .route("/api/admin/students", get(routes::list_students))
        .route(
            "/api/admin/students/{id}",
            get(routes::get_student)
                .put(routes::update_student)
                .delete(routes::delete_student),
        )
        .route_layer(middleware::from_fn_with_state(
            state.dashboard_gate(),
            require_auth,
        ));

    let registration = Router::new()
        .route("/api/registration/me", get(routes::me))
        .route(
            "/api/registration/students",
            get(routes::list_students).post(routes::register_student),
        )
        .route_layer(middleware::from_fn_with_state(
            state.registration_gate(),
            require_auth,
        ));

    let permissions = Router::new()
        .route("/api/permissions/users", get(routes::list_users))
        .route_layer(middleware::from_fn_with_state(state.admin_gate(), require_auth));

    let cors = if state.config.server.cors_permissive {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/auth/login", post(routes::dashboard_login))
        .route("/api/registration/login", post(routes::registration_login))
        .merge(dashboard)
        .merge(registration)
        .merge(permissions)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
