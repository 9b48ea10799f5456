//! Zab E-Fest - event registration backend
//!
//! Library interface: role-scoped token gates for the REST API, token
//! issuance, the student store, and a client for the API.

pub mod api;
pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod store;

pub use auth::{AuthError, AuthGate, Identity, TokenService};
pub use config::Config;
pub use error::Error;
