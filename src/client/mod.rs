//! HTTP client for the Zab E-Fest API
//!
//! Keeps the issued token in a local [`TokenStore`] and attaches it to every
//! outgoing request in the convention of the area it was issued for.

pub mod token_store;

pub use token_store::{Area, Credential, TokenStore, DEFAULT_TOKEN_FILE};

use crate::auth::{Identity, LoginRequest, LoginResponse};
use crate::error::{Error, Result};
use crate::store::Student;
use reqwest::{header::AUTHORIZATION, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

/// API client with optional stored credential
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credential: Option<Credential>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credential: None,
        }
    }

    /// Client for a stored credential, pointed at the server it came from
    pub fn from_credential(credential: Credential) -> Self {
        let mut client = Self::new(credential.base_url.clone());
        client.credential = Some(credential);
        client
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build a request with the stored credential attached
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.credential {
            Some(cred) => match cred.area {
                Area::Dashboard => builder.header(AUTHORIZATION, format!("Bearer {}", cred.token)),
                Area::Registration => builder.header(cred.header_name.as_str(), cred.token.as_str()),
            },
            None => builder,
        }
    }

    /// Log in to an area and keep the resulting credential
    pub async fn login(
        &mut self,
        area: Area,
        email: &str,
        password: &str,
        header_name: &str,
    ) -> Result<Credential> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .http
            .post(self.url(area.login_path()))
            .json(&body)
            .send()
            .await?;
        let login: LoginResponse = parse(response).await?;

        let credential = Credential {
            base_url: self.base_url.clone(),
            area,
            token: login.token,
            header_name: header_name.to_string(),
            email: login.user.email,
            saved_at: chrono::Utc::now(),
        };
        tracing::debug!("Logged in to {} as {}", area, credential.email);
        self.credential = Some(credential.clone());
        Ok(credential)
    }

    fn area(&self) -> Result<Area> {
        self.credential
            .as_ref()
            .map(|c| c.area)
            .ok_or(Error::NotLoggedIn)
    }

    pub async fn me(&self) -> Result<Identity> {
        let path = self.area()?.me_path();
        parse(self.request(Method::GET, path).send().await?).await
    }

    pub async fn list_students(&self) -> Result<Vec<Student>> {
        let path = self.area()?.students_path();
        parse(self.request(Method::GET, path).send().await?).await
    }
}

/// Decode a success body, or turn an error body into [`Error::Api`]
async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let text = response.text().await.unwrap_or_default();
    Err(Error::Api {
        status: status.as_u16(),
        message: error_message(&text),
    })
}

/// Pull the message out of either error body convention
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("msg"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}
