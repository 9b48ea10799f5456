//! CLI interface for Zab E-Fest

pub mod commands;
mod output;

pub use output::*;

use crate::client::{Area, DEFAULT_TOKEN_FILE};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "zabfest")]
#[command(version)]
#[command(about = "Zab E-Fest registration backend", long_about = None)]
pub struct Cli {
    /// Path to zabfest.toml (searched upward from the current directory by default)
    #[arg(short, long, global = true, env = "ZABFEST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Where the client keeps its login token
    #[arg(long, global = true, env = "ZABFEST_TOKEN_FILE", default_value = DEFAULT_TOKEN_FILE)]
    pub token_file: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new zabfest.toml configuration file
    Init,

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (overrides [server].host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides [server].port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Signing secret (overrides [auth].secret)
        #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
        secret: Option<String>,
    },

    /// Print a bcrypt hash for a [[users]] entry
    HashPassword {
        /// Password to hash (prompted when omitted)
        #[arg(long)]
        password: Option<String>,

        /// bcrypt work factor (defaults to [auth].bcrypt_cost)
        #[arg(long)]
        cost: Option<u32>,
    },

    /// Sign a token directly with the configured secret
    IssueToken {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        role: String,

        /// Issue a registration-portal token (nested user claim)
        #[arg(long)]
        scoped: bool,

        /// Signing secret (overrides [auth].secret)
        #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
        secret: Option<String>,
    },

    /// Log in and store the token locally
    Login {
        /// Server base URL
        #[arg(long, default_value = "http://localhost:5000")]
        url: String,

        #[arg(short, long)]
        email: String,

        /// Password (prompted when omitted)
        #[arg(long, env = "ZABFEST_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Which area to log in to
        #[arg(short, long, value_enum, default_value = "dashboard")]
        area: Area,

        /// Header name for registration tokens
        #[arg(long, default_value = crate::auth::DEFAULT_TOKEN_HEADER)]
        header: String,
    },

    /// Forget the stored token
    Logout,

    /// Show the identity the server sees for the stored token
    Whoami,

    /// List registered students
    Students {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}
