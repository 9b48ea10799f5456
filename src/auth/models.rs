//! Authentication models

use serde::{Deserialize, Serialize};

/// A dashboard or registration-team account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: String,
    /// Login email
    pub email: String,
    /// Display name
    pub name: String,
    /// Role string, compared verbatim by role gates
    pub role: String,
    /// bcrypt hash of the password
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl User {
    /// Create a new user with a fresh identifier
    pub fn new(email: String, name: String, role: String, password_hash: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            name,
            role,
            password_hash,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }
}

/// Identity decoded from a verified token.
///
/// Built by the gate for each request and inserted into the request
/// extensions. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Identity {
    /// Best label for audit fields: email, then id
    pub fn label(&self) -> String {
        self.email
            .clone()
            .or_else(|| self.id.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Login credentials
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response with token
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// User information in responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}
