//! Error types for Zab E-Fest

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file not found. Run 'zabfest init' first.")]
    ConfigNotFound,

    #[error("JWT secret is not configured. Set JWT_SECRET or [auth].secret")]
    MissingSecret,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Student '{0}' not found")]
    StudentNotFound(String),

    #[error("Student with email '{0}' already registered")]
    StudentAlreadyExists(String),

    #[error("User '{0}' not found")]
    UserNotFound(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not logged in. Run 'zabfest login' first.")]
    NotLoggedIn,

    #[error("Server responded with {status}: {message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// HTTP status used when this error reaches a handler boundary
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::StudentNotFound(_) | Error::UserNotFound(_) => StatusCode::NOT_FOUND,
            Error::StudentAlreadyExists(_) => StatusCode::CONFLICT,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = Json(serde_json::json!({ "message": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
