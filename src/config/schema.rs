//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub users: Vec<UserConfig>,
}

/// Server configuration for the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allow any origin (the dashboard is served from a separate dev server)
    #[serde(default = "default_cors_permissive")]
    pub cors_permissive: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_cors_permissive() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_permissive: default_cors_permissive(),
        }
    }
}

/// Token and role configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared HMAC secret; startup fails when missing or empty
    #[serde(default)]
    pub secret: Option<String>,

    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,

    /// Header carrying raw tokens for the registration-team area
    #[serde(default = "default_header_name")]
    pub header_name: String,

    #[serde(default = "default_admin_role")]
    pub admin_role: String,

    #[serde(default = "default_registration_role")]
    pub registration_role: String,

    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

fn default_token_ttl_secs() -> i64 {
    3600
}

fn default_header_name() -> String {
    crate::auth::DEFAULT_TOKEN_HEADER.to_string()
}

fn default_admin_role() -> String {
    "admin".to_string()
}

fn default_registration_role() -> String {
    "registrationTeam".to_string()
}

fn default_bcrypt_cost() -> u32 {
    crate::auth::password::DEFAULT_COST
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: None,
            token_ttl_secs: default_token_ttl_secs(),
            header_name: default_header_name(),
            admin_role: default_admin_role(),
            registration_role: default_registration_role(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

/// Student store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// JSON file for student records; in-memory only when unset
    #[serde(default)]
    pub data_file: Option<PathBuf>,
}

/// A login account entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    /// Stable identifier; defaults to the email
    #[serde(default)]
    pub id: Option<String>,

    pub email: String,

    #[serde(default)]
    pub name: Option<String>,

    pub role: String,

    /// bcrypt hash, as printed by `zabfest hash-password`
    pub password_hash: String,
}
