//! Identity Toolkit REST provider (the hosted identity platform's public API).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::{AuthError, AuthUser, IdentityProvider};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityToolkitConfig {
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for IdentityToolkitConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl IdentityToolkitConfig {
    /// Apply `IDENTITY_API_KEY` and `IDENTITY_ENDPOINT`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("IDENTITY_API_KEY") {
            if !key.is_empty() {
                self.api_key = Some(key);
            }
        }
        if let Ok(endpoint) = std::env::var("IDENTITY_ENDPOINT") {
            if !endpoint.is_empty() {
                self.endpoint = endpoint;
            }
        }
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Identity provider speaking the Identity Toolkit `accounts:*` endpoints.
pub struct IdentityToolkitProvider {
    config: IdentityToolkitConfig,
    client: Client,
}

impl IdentityToolkitProvider {
    pub fn new(config: IdentityToolkitConfig) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AuthError::Http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    async fn call(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, AuthError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| AuthError::Provider("IDENTITY_API_KEY not set".to_string()))?;
        let url = format!(
            "{}/accounts:{}?key={}",
            self.config.endpoint.trim_end_matches('/'),
            method,
            api_key
        );

        debug!("Identity Toolkit call: accounts:{}", method);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Http(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        Err(match serde_json::from_str::<ErrorEnvelope>(&text) {
            Ok(envelope) => map_error_code(&envelope.error.message),
            Err(_) => AuthError::Provider(text),
        })
    }

    async fn account_call(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<AuthUser, AuthError> {
        let account: AccountResponse = self
            .call(method, body)
            .await?
            .json()
            .await
            .map_err(|e| AuthError::Provider(format!("Unexpected response: {}", e)))?;

        Ok(AuthUser {
            uid: account.local_id,
            email: account.email,
            display_name: account.display_name.filter(|s| !s.is_empty()),
            id_token: account.id_token,
        })
    }
}

/// Map a provider error code such as `EMAIL_EXISTS` or
/// `WEAK_PASSWORD : Password should be at least 6 characters`.
fn map_error_code(message: &str) -> AuthError {
    let (code, detail) = match message.split_once(':') {
        Some((code, detail)) => (code.trim(), detail.trim()),
        None => (message.trim(), ""),
    };
    match code {
        "EMAIL_EXISTS" => AuthError::EmailInUse,
        "EMAIL_NOT_FOUND" => AuthError::UserNotFound,
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED" => {
            AuthError::InvalidCredentials
        }
        "WEAK_PASSWORD" => AuthError::WeakPassword(detail.to_string()),
        _ => AuthError::Provider(message.to_string()),
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<AuthUser, AuthError> {
        let mut body = json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });
        if let Some(name) = display_name {
            body["displayName"] = json!(name);
        }
        self.account_call("signUp", body).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        self.account_call(
            "signInWithPassword",
            json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }),
        )
        .await
    }

    /// Tokens are stateless on this platform; dropping them is enough.
    async fn sign_out(&self, _user: &AuthUser) -> Result<(), AuthError> {
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        self.call(
            "sendOobCode",
            json!({
                "requestType": "PASSWORD_RESET",
                "email": email,
            }),
        )
        .await
        .map(|_| ())
    }
}
