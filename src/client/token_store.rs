//! Local credential storage for the CLI client

use crate::error::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default file name for the stored credential
pub const DEFAULT_TOKEN_FILE: &str = ".zabfest-token.json";

/// Application area a credential belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Area {
    /// Admin dashboard (bearer tokens)
    Dashboard,
    /// Registration-team portal (custom header tokens)
    Registration,
}

impl Area {
    pub fn login_path(&self) -> &'static str {
        match self {
            Area::Dashboard => "/api/auth/login",
            Area::Registration => "/api/registration/login",
        }
    }

    pub fn students_path(&self) -> &'static str {
        match self {
            Area::Dashboard => "/api/admin/students",
            Area::Registration => "/api/registration/students",
        }
    }

    pub fn me_path(&self) -> &'static str {
        match self {
            Area::Dashboard => "/api/admin/me",
            Area::Registration => "/api/registration/me",
        }
    }
}

impl std::fmt::Display for Area {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Area::Dashboard => write!(f, "dashboard"),
            Area::Registration => write!(f, "registration"),
        }
    }
}

/// A token plus what is needed to present it again
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub base_url: String,
    pub area: Area,
    pub token: String,
    /// Header name used for registration tokens
    pub header_name: String,
    pub email: String,
    pub saved_at: chrono::DateTime<chrono::Utc>,
}

/// File-backed credential store
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored credential, if any
    pub fn load(&self) -> Result<Option<Credential>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn save(&self, credential: &Credential) -> Result<()> {
        let content = serde_json::to_string_pretty(credential)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    /// Remove the stored credential. Returns whether one existed.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)?;
        Ok(true)
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_FILE)
    }
}
