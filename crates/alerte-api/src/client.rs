//! REST client for the MonAlerte account service.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub user_id: String,
}

/// Seam between the session layer and the account service, so tests can
/// stub the network.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse>;
    async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse>;
    async fn request_password_reset(&self, email: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("monalerte-core/0.1")
            .use_rustls_tls()
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Pull the server's `error` field out of a non-2xx body.
    async fn error_from(res: reqwest::Response) -> anyhow::Error {
        let status = res.status();
        let body: serde_json::Value = res.json().await.unwrap_or_default();
        let msg = body
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or("request failed");
        warn!("account service returned {status} — {msg}");
        anyhow!("{status}: {msg}")
    }
}

#[async_trait]
impl AuthApi for AuthClient {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let url = format!("{}/api/auth/login", self.base_url);
        let res = self
            .client
            .post(url)
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(Self::error_from(res).await);
        }
        Ok(res.json().await?)
    }

    async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse> {
        let url = format!("{}/api/auth/register", self.base_url);
        let res = self.client.post(url).json(req).send().await?;
        if !res.status().is_success() {
            return Err(Self::error_from(res).await);
        }
        Ok(res.json().await?)
    }

    async fn request_password_reset(&self, email: &str) -> Result<()> {
        let url = format!("{}/api/auth/password-reset", self.base_url);
        let res = self
            .client
            .post(url)
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await?;
        // The server hides whether an account exists behind a 404; treat it
        // as accepted so the UI cannot be used to probe for addresses.
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        if !res.status().is_success() {
            return Err(Self::error_from(res).await);
        }
        Ok(())
    }
}
