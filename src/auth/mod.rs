//! Authentication and authorization

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;

pub use jwt::{Claims, TokenService, UserClaims};
pub use middleware::{
    extract_identity, require_auth, AuthError, AuthGate, CredentialSource, MessageKey,
    DEFAULT_TOKEN_HEADER,
};
pub use models::{Identity, LoginRequest, LoginResponse, User, UserInfo};
pub use password::{hash_password, verify_password};
