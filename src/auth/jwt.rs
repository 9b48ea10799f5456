//! JWT token handling

use crate::auth::models::{Identity, User};
use crate::config::AuthConfig;
use crate::error::{Error, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// JWT claims.
///
/// Dashboard tokens carry identity at the top level (`sub`, `email`, `role`).
/// Registration tokens nest it under `user`. Both shapes share this struct so
/// a single verifier serves every gate.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Legacy user ID claim, used when `sub` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Nested identity for registration-team tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserClaims>,
    /// Issued at
    #[serde(default)]
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

/// Identity object nested in registration-team tokens
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct UserClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Claims {
    /// Top-level claims for a dashboard token
    pub fn for_bearer(user: &User, ttl_secs: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: Some(user.id.clone()),
            email: Some(user.email.clone()),
            role: Some(user.role.clone()),
            iat: now,
            exp: now + ttl_secs,
            ..Default::default()
        }
    }

    /// Nested `user` claims for a registration-team token
    pub fn for_scoped(user: &User, ttl_secs: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            user: Some(UserClaims {
                id: Some(user.id.clone()),
                email: Some(user.email.clone()),
                role: Some(user.role.clone()),
                name: Some(user.name.clone()),
            }),
            iat: now,
            exp: now + ttl_secs,
            ..Default::default()
        }
    }

    /// Identity from top-level claims; `id` falls back from `sub` to `id`
    pub fn top_level_identity(&self) -> Identity {
        Identity {
            id: self.sub.clone().or_else(|| self.id.clone()),
            email: self.email.clone(),
            role: self.role.clone(),
            name: None,
        }
    }

    /// Identity from the nested `user` object, if present
    pub fn user_identity(&self) -> Option<Identity> {
        self.user.as_ref().map(|user| Identity {
            id: user.id.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            name: user.name.clone(),
        })
    }

    /// Check if token is expired
    pub fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp() > self.exp
    }
}

/// Signs and verifies tokens with the process-wide shared secret
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenService {
    /// Build from a secret; an empty secret is refused
    pub fn new(secret: &str, ttl_secs: i64) -> Result<Self> {
        if secret.trim().is_empty() {
            return Err(Error::MissingSecret);
        }
        if ttl_secs <= 0 {
            return Err(Error::Config(format!(
                "token_ttl_secs must be positive, got {}",
                ttl_secs
            )));
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            ttl_secs,
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        Self::new(config.secret.as_deref().unwrap_or(""), config.token_ttl_secs)
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Sign an arbitrary claims set
    pub fn issue(&self, claims: &Claims) -> Result<String> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }

    /// Issue a dashboard token (identity at top level)
    pub fn issue_bearer(&self, user: &User) -> Result<String> {
        tracing::debug!("Issuing bearer token for {}", user.email);
        self.issue(&Claims::for_bearer(user, self.ttl_secs))
    }

    /// Issue a registration-team token (identity under `user`)
    pub fn issue_scoped(&self, user: &User) -> Result<String> {
        tracing::debug!("Issuing scoped token for {}", user.email);
        self.issue(&Claims::for_scoped(user, self.ttl_secs))
    }

    /// Validate signature and expiry, then decode the claims
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"<redacted>")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(role: &str) -> User {
        User::new(
            "a@b.com".to_string(),
            "Alice".to_string(),
            role.to_string(),
            String::new(),
        )
    }

    #[test]
    fn test_issue_and_verify_bearer() {
        let service = TokenService::new("test-secret", 3600).unwrap();
        let user = test_user("admin");
        let token = service.issue_bearer(&user).expect("Failed to create token");
        let claims = service.verify(&token).expect("Failed to validate token");

        assert_eq!(claims.sub.as_deref(), Some(user.id.as_str()));
        assert_eq!(claims.email.as_deref(), Some("a@b.com"));
        assert_eq!(claims.role.as_deref(), Some("admin"));
        assert!(claims.user.is_none());
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_issue_and_verify_scoped() {
        let service = TokenService::new("test-secret", 3600).unwrap();
        let user = test_user("registrationTeam");
        let token = service.issue_scoped(&user).unwrap();
        let claims = service.verify(&token).unwrap();

        assert!(claims.sub.is_none());
        let identity = claims.user_identity().expect("user claim present");
        assert_eq!(identity.role.as_deref(), Some("registrationTeam"));
        assert_eq!(identity.name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_id_falls_back_from_sub() {
        let claims = Claims {
            id: Some("legacy".to_string()),
            ..Default::default()
        };
        assert_eq!(claims.top_level_identity().id.as_deref(), Some("legacy"));

        let claims = Claims {
            sub: Some("123".to_string()),
            id: Some("legacy".to_string()),
            ..Default::default()
        };
        assert_eq!(claims.top_level_identity().id.as_deref(), Some("123"));
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(TokenService::new("", 3600), Err(Error::MissingSecret)));
        assert!(matches!(TokenService::new("   ", 3600), Err(Error::MissingSecret)));
    }

    #[test]
    fn test_non_positive_ttl_rejected() {
        assert!(matches!(TokenService::new("s", 0), Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_token() {
        let service = TokenService::new("test-secret", 3600).unwrap();
        assert!(service.verify("invalid.token.here").is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenService::new("secret-one", 3600).unwrap();
        let verifier = TokenService::new("secret-two", 3600).unwrap();
        let token = issuer.issue_bearer(&test_user("admin")).unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = TokenService::new("test-secret", 3600).unwrap();
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: Some("123".to_string()),
            iat: now - 7200,
            exp: now - 3600,
            ..Default::default()
        };
        let token = service.issue(&claims).unwrap();
        assert!(service.verify(&token).is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let service = TokenService::new("super-secret-value", 60).unwrap();
        let debug = format!("{:?}", service);
        assert!(!debug.contains("super-secret-value"));
    }
}
