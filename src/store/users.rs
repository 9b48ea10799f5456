//! User directory loaded from configuration

use crate::auth::{password, User, UserInfo};
use crate::config::UserConfig;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Read-only set of login accounts, keyed by lowercase email
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Arc<HashMap<String, User>>,
}

impl UserDirectory {
    pub fn from_config(entries: &[UserConfig]) -> Result<Self> {
        let mut users = HashMap::new();
        for entry in entries {
            let key = entry.email.trim().to_lowercase();
            if key.is_empty() {
                return Err(Error::Config("user entry with empty email".to_string()));
            }
            let user = User {
                id: entry.id.clone().unwrap_or_else(|| key.clone()),
                email: entry.email.trim().to_string(),
                name: entry.name.clone().unwrap_or_else(|| entry.email.clone()),
                role: entry.role.clone(),
                password_hash: entry.password_hash.clone(),
            };
            if users.insert(key, user).is_some() {
                return Err(Error::Config(format!("duplicate user '{}'", entry.email)));
            }
        }

        tracing::info!("Loaded {} user account(s)", users.len());
        Ok(Self {
            users: Arc::new(users),
        })
    }

    pub fn get(&self, email: &str) -> Option<&User> {
        self.users.get(&email.trim().to_lowercase())
    }

    /// Accounts without password hashes, sorted by email
    pub fn list(&self) -> Vec<UserInfo> {
        let mut users: Vec<UserInfo> = self.users.values().cloned().map(UserInfo::from).collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Check a password. Unknown email and wrong password give the same error.
    ///
    /// bcrypt is CPU-bound; call from `spawn_blocking` in async contexts.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let user = self.get(email).ok_or(Error::InvalidCredentials)?;
        if password::verify_password(password, &user.password_hash)? {
            Ok(user.clone())
        } else {
            Err(Error::InvalidCredentials)
        }
    }
}
