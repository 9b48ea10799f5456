//! Configuration loading and environment variable interpolation

use crate::error::{Error, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;

pub const CONFIG_FILENAME: &str = "zabfest.toml";

/// Load configuration from zabfest.toml
pub fn load_config() -> Result<Config> {
    let config_path = find_config_file()?;
    load_config_from_path(&config_path)
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|_| Error::ConfigNotFound)?;
    let content = interpolate_env_vars(&content);
    let config: Config = toml::from_str(&content)?;
    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Find the configuration file, searching upward from current directory
fn find_config_file() -> Result<PathBuf> {
    let mut current = env::current_dir().map_err(|e| Error::Config(e.to_string()))?;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Ok(config_path);
        }

        if !current.pop() {
            return Err(Error::ConfigNotFound);
        }
    }
}

/// Interpolate environment variables in the format ${VAR_NAME} or ${VAR_NAME:-default}
pub fn interpolate_env_vars(content: &str) -> String {
    // Constant pattern; a failure here is a bug, not a runtime condition
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
        .expect("Invalid regex pattern - this is a bug in the codebase");

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        env::var(var_name).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

/// Write the default configuration to `path`, refusing to overwrite
pub fn save_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(Error::Config(format!("{} already exists", path.display())));
    }
    fs::write(path, default_config_content())?;
    Ok(())
}

/// Generate a default configuration file content
pub fn default_config_content() -> &'static str {
    r#"# Zab E-Fest Configuration

[server]
host = "0.0.0.0"
port = 5000
cors_permissive = true

[auth]
# Shared signing secret. Must be identical wherever tokens are issued and checked.
secret = "${JWT_SECRET}"
token_ttl_secs = 3600
header_name = "x-auth-token"
admin_role = "admin"
registration_role = "registrationTeam"
bcrypt_cost = 12

[store]
# data_file = "./data/students.json"

# Accounts. Generate hashes with: zabfest hash-password
# [[users]]
# email = "admin@zab.edu"
# name = "Admin"
# role = "admin"
# password_hash = "$2b$12$..."
"#
}
