//! Authentication gate middleware
//!
//! [`AuthGate`] verifies a signed token taken from either the standard
//! `Authorization: Bearer <token>` header or a custom header such as
//! `x-auth-token`, optionally requires an exact role, and attaches the decoded
//! [`Identity`] to the request extensions. Every failure ends the request with
//! a JSON error body; the downstream handler is never called.

use crate::auth::jwt::TokenService;
use crate::auth::models::Identity;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, HeaderName, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use thiserror::Error;

const BEARER_PREFIX: &str = "Bearer ";

/// Default custom header used by the registration-team area
pub const DEFAULT_TOKEN_HEADER: &str = "x-auth-token";

/// Where the gate looks for the credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// `Authorization: Bearer <token>`
    Bearer,
    /// Raw token in a named header
    Header(HeaderName),
}

/// JSON key carrying the error message in rejection bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    Message,
    Msg,
}

impl MessageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKey::Message => "message",
            MessageKey::Msg => "msg",
        }
    }
}

/// Reasons a gate refuses a request
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization header missing or malformed")]
    MissingOrMalformedHeader,

    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("No token, authorization denied")]
    MissingToken,

    #[error("Token is not valid")]
    InvalidToken,

    #[error("Access forbidden: insufficient role")]
    InsufficientRole,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InsufficientRole => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Render as a response using the given body key
    pub fn into_response_with(self, key: MessageKey) -> Response {
        let mut body = serde_json::Map::new();
        body.insert(key.as_str().to_string(), self.to_string().into());
        (self.status_code(), Json(serde_json::Value::Object(body))).into_response()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.into_response_with(MessageKey::Message)
    }
}

/// A configurable token gate.
///
/// Cheap to clone; the token service is shared behind an `Arc` and never
/// mutated after startup.
#[derive(Clone)]
pub struct AuthGate {
    tokens: Arc<TokenService>,
    source: CredentialSource,
    required_role: Option<String>,
    message_key: MessageKey,
}

impl AuthGate {
    /// Gate reading `Authorization: Bearer <token>`
    pub fn bearer(tokens: Arc<TokenService>) -> Self {
        Self {
            tokens,
            source: CredentialSource::Bearer,
            required_role: None,
            message_key: MessageKey::Message,
        }
    }

    /// Gate reading the raw token from a custom header
    pub fn header(tokens: Arc<TokenService>, name: HeaderName) -> Self {
        Self {
            tokens,
            source: CredentialSource::Header(name),
            required_role: None,
            message_key: MessageKey::Msg,
        }
    }

    /// Require the decoded role to equal `role` exactly
    pub fn require_role(mut self, role: impl Into<String>) -> Self {
        self.required_role = Some(role.into());
        self
    }

    /// Override the JSON key used in rejection bodies
    pub fn with_message_key(mut self, key: MessageKey) -> Self {
        self.message_key = key;
        self
    }

    pub fn source(&self) -> &CredentialSource {
        &self.source
    }

    pub fn required_role(&self) -> Option<&str> {
        self.required_role.as_deref()
    }

    /// Authenticate (and optionally authorize) a request from its headers
    pub fn check(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
        let identity = match &self.source {
            CredentialSource::Bearer => self.check_bearer(headers)?,
            CredentialSource::Header(name) => self.check_header(headers, name)?,
        };

        if let Some(required) = &self.required_role {
            if identity.role.as_deref() != Some(required.as_str()) {
                tracing::warn!(
                    "Role check failed for {}: required '{}', got {:?}",
                    identity.label(),
                    required,
                    identity.role
                );
                return Err(AuthError::InsufficientRole);
            }
        }

        Ok(identity)
    }

    fn check_bearer(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .ok_or(AuthError::MissingOrMalformedHeader)?;
        let token = token.split(' ').next().unwrap_or_default();

        let claims = self.tokens.verify(token).map_err(|e| {
            tracing::warn!("Bearer token verification failed: {}", e);
            AuthError::InvalidOrExpiredToken
        })?;

        Ok(claims.top_level_identity())
    }

    fn check_header(&self, headers: &HeaderMap, name: &HeaderName) -> Result<Identity, AuthError> {
        let token = headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let claims = self.tokens.verify(token).map_err(|e| {
            tracing::warn!("{} verification failed: {}", name, e);
            AuthError::InvalidToken
        })?;

        claims.user_identity().ok_or_else(|| {
            tracing::warn!("{} token has no user claim", name);
            AuthError::InvalidToken
        })
    }

    /// Terminal response for a rejection, in this gate's body convention
    pub fn reject(&self, error: AuthError) -> Response {
        error.into_response_with(self.message_key)
    }
}

/// Middleware for requiring a gate to pass.
///
/// Use with `axum::middleware::from_fn_with_state(gate, require_auth)`.
pub async fn require_auth(State(gate): State<AuthGate>, mut req: Request, next: Next) -> Response {
    match gate.check(req.headers()) {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(error) => gate.reject(error),
    }
}

/// Extract the identity attached by [`require_auth`]
pub fn extract_identity(req: &Request) -> Option<&Identity> {
    req.extensions().get::<Identity>()
}
