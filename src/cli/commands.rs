//! CLI command implementations

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::auth::{hash_password, TokenService, User};
use crate::error::Error;
use crate::cli::{error, info, print_identity, print_student_table, success, warn, OutputFormat};
use crate::client::{ApiClient, Area, TokenStore};
use crate::config::{self, Config, CONFIG_FILENAME};
use crate::store::UserDirectory;

/// Load the configuration from an explicit path or by searching upward
fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => config::load_config_from_path(path),
        None => config::load_config(),
    }
    .context("Failed to load configuration")?;
    Ok(config)
}

/// Like `load_config`, but a missing config is not an error when no path was given
fn load_config_or_default(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(_) => load_config(path),
        None => match config::load_config() {
            Ok(config) => Ok(config),
            Err(Error::ConfigNotFound) => Ok(Config::default()),
            Err(e) => Err(anyhow::Error::new(e).context("Failed to load configuration")),
        },
    }
}

/// Command-line secret wins over the config file
fn apply_secret(config: &mut Config, secret: Option<String>) {
    if let Some(secret) = secret.filter(|s| !s.is_empty()) {
        config.auth.secret = Some(secret);
    }
}

fn read_password(password: Option<String>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => Ok(dialoguer::Password::new()
            .with_prompt("Password")
            .interact()?),
    }
}

/// Initialize a new zabfest.toml configuration file
pub async fn init(path: Option<PathBuf>) -> Result<()> {
    let config_path = path.unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));

    if config_path.exists() {
        warn(&format!("{} already exists", config_path.display()));
        return Ok(());
    }

    config::save_default_config(&config_path)?;

    success(&format!("Created {}", config_path.display()));
    info("Set JWT_SECRET, add [[users]] entries (see 'zabfest hash-password'), then run 'zabfest serve'");

    Ok(())
}

/// Start the HTTP API server
pub async fn serve(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
    secret: Option<String>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    apply_secret(&mut config, secret);

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info(&format!("Starting server at http://{}:{}", host, port));

    if let Err(e) = crate::api::run_server(config, &host, port).await {
        error(&format!("Server failed: {}", e));
        return Err(e.into());
    }
    Ok(())
}

/// Print a bcrypt hash for a config entry
pub async fn hash_password_cmd(
    config_path: Option<&Path>,
    password: Option<String>,
    cost: Option<u32>,
) -> Result<()> {
    let cost = match cost {
        Some(cost) => cost,
        None => load_config_or_default(config_path)?.auth.bcrypt_cost,
    };
    let password = read_password(password)?;
    if password.is_empty() {
        anyhow::bail!("Password must not be empty");
    }

    let hash = tokio::task::spawn_blocking(move || hash_password(&password, cost)).await??;
    println!("{}", hash);
    Ok(())
}

/// Sign a token with the configured secret
pub async fn issue_token(
    config_path: Option<&Path>,
    email: &str,
    role: &str,
    scoped: bool,
    secret: Option<String>,
) -> Result<()> {
    let mut config = load_config_or_default(config_path)?;
    apply_secret(&mut config, secret);

    let tokens = TokenService::from_config(&config.auth)?;
    let user = token_subject(&config, email, role)?;
    let token = if scoped {
        tokens.issue_scoped(&user)?
    } else {
        tokens.issue_bearer(&user)?
    };

    println!("{}", token);
    Ok(())
}

/// Subject for a minted token: the configured account if one matches, with the requested role
fn token_subject(config: &Config, email: &str, role: &str) -> Result<User> {
    let users = UserDirectory::from_config(&config.users)?;
    let user = match users.get(email) {
        Some(user) => User {
            role: role.to_string(),
            password_hash: String::new(),
            ..user.clone()
        },
        None => {
            let email = email.trim();
            User {
                id: email.to_lowercase(),
                email: email.to_string(),
                name: email.to_string(),
                role: role.to_string(),
                password_hash: String::new(),
            }
        }
    };
    Ok(user)
}

/// Log in and persist the token
pub async fn login(
    token_file: &Path,
    url: &str,
    email: &str,
    password: Option<String>,
    area: Area,
    header: &str,
) -> Result<()> {
    let password = read_password(password)?;
    let mut client = ApiClient::new(url);

    match client.login(area, email, &password, header).await {
        Ok(credential) => {
            TokenStore::new(token_file).save(&credential)?;
            success(&format!("Logged in to {} as {}", area, credential.email));
            Ok(())
        }
        Err(e) => {
            error(&format!("Login failed: {}", e));
            Err(e.into())
        }
    }
}

pub async fn logout(token_file: &Path) -> Result<()> {
    if TokenStore::new(token_file).clear()? {
        success("Logged out");
    } else {
        info("No stored login");
    }
    Ok(())
}

fn stored_client(token_file: &Path) -> Result<ApiClient> {
    let credential = TokenStore::new(token_file)
        .load()?
        .ok_or(crate::error::Error::NotLoggedIn)?;
    Ok(ApiClient::from_credential(credential))
}

pub async fn whoami(token_file: &Path) -> Result<()> {
    let client = stored_client(token_file)?;
    let identity = client.me().await?;
    print_identity(&identity);
    Ok(())
}

/// List registered students
pub async fn students(token_file: &Path, format: OutputFormat) -> Result<()> {
    let client = stored_client(token_file)?;
    let students = client.list_students().await?;

    match format {
        OutputFormat::Table => print_student_table(&students),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&students)?),
    }

    Ok(())
}
