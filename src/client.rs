use crate::config::{Config, Credentials};
use crate::constants::LOGIN_PATH;
use crate::error::{Result, ScraperError};
use reqwest::RequestBuilder;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

/// Identity attached to outbound requests.
///
/// Authentication produces a whole new client value instead of mutating
/// shared header state, so workers can never observe a half-updated
/// identity.
#[derive(Debug, Clone)]
enum Identity {
    Anonymous,
    Bearer(String),
}

/// Shared HTTP client for the vendor's venue pages and REST API.
///
/// Cloning is cheap (`reqwest::Client` is an `Arc` internally) and every
/// clone carries the same immutable identity.
#[derive(Debug, Clone)]
pub struct VendorClient {
    http: reqwest::Client,
    base_url: String,
    identity: Identity,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

impl VendorClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .gzip(true)
            .timeout(Duration::from_secs(config.stubhub.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: config.stubhub.api_base_url.trim_end_matches('/').to_string(),
            identity: Identity::Anonymous,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.identity, Identity::Bearer(_))
    }

    /// GET an absolute URL (the venue page lives outside the API base).
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.attach_identity(self.http.get(url))
    }

    /// GET an API path relative to the configured base URL.
    pub fn get_api(&self, path: &str) -> RequestBuilder {
        self.get(&format!("{}{}", self.base_url, path))
    }

    fn attach_identity(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.identity {
            Identity::Anonymous => builder,
            Identity::Bearer(token) => builder.bearer_auth(token),
        }
    }

    /// Exchange credentials for an access token.
    ///
    /// Consumes the anonymous client and returns an authenticated one;
    /// callers must authenticate before spawning workers so the identity is
    /// fixed for the lifetime of the run.
    pub async fn authenticate(self, credentials: &Credentials) -> Result<VendorClient> {
        let body = [
            ("grant_type", "password"),
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
            ("scope", "PRODUCTION"),
        ];

        let response = self
            .http
            .post(format!("{}{}", self.base_url, LOGIN_PATH))
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ScraperError::Api {
                message: format!("login failed with status {}", response.status()),
            });
        }

        let login: LoginResponse = response.json().await?;
        info!("Authentication successful");

        Ok(VendorClient {
            identity: Identity::Bearer(login.access_token),
            ..self
        })
    }
}
