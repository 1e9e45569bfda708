//! OAuth 2.0 device authorization flow
//!
//! A terminal has no popup to host a consent screen, so sign-in shows the
//! user a short code and a URL, then polls the token endpoint until they
//! approve on another device.

use std::time::Duration;

use serde::Deserialize;
use tokio::time::{sleep, Instant};

use crate::error::{TrackerError, TrackerResult};

use super::token::AccessToken;

const DEVICE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const SLOW_DOWN_STEP_SECS: u64 = 5;

/// Shows the pending sign-in code to the user
pub trait ConsentPrompt: Send + Sync {
    fn show_code(&self, verification_url: &str, user_code: &str);
}

/// Response of the device code endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceCode {
    pub device_code: String,
    pub user_code: String,
    #[serde(alias = "verification_uri")]
    pub verification_url: String,
    pub expires_in: u64,
    #[serde(default)]
    pub interval: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Client for the provider's OAuth endpoints
#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: Option<String>,
}

impl OAuthClient {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        client_id: impl Into<String>,
        client_secret: Option<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            client_secret,
        }
    }

    /// Run the whole flow: request a code, show it, wait for approval
    pub async fn authorize(
        &self,
        scope: &str,
        prompt: &dyn ConsentPrompt,
    ) -> TrackerResult<AccessToken> {
        let code = self.request_device_code(scope).await?;
        prompt.show_code(&code.verification_url, &code.user_code);
        self.poll_token(&code).await
    }

    pub async fn request_device_code(&self, scope: &str) -> TrackerResult<DeviceCode> {
        let url = format!("{}/device/code", self.base_url);
        log::debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .form(&[("client_id", self.client_id.as_str()), ("scope", scope)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(oauth_failure(status.as_u16(), &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| TrackerError::Auth(format!("Unexpected device code response: {}", e)))
    }

    /// Poll until the user approves, denies, or the code expires
    pub async fn poll_token(&self, code: &DeviceCode) -> TrackerResult<AccessToken> {
        let url = format!("{}/token", self.base_url);
        let deadline = Instant::now() + Duration::from_secs(code.expires_in);
        let mut interval = code.interval.unwrap_or(DEFAULT_POLL_INTERVAL_SECS);

        let mut form = vec![
            ("client_id", self.client_id.as_str()),
            ("device_code", code.device_code.as_str()),
            ("grant_type", DEVICE_GRANT_TYPE),
        ];
        if let Some(secret) = &self.client_secret {
            form.push(("client_secret", secret.as_str()));
        }

        loop {
            sleep(Duration::from_secs(interval)).await;
            if Instant::now() >= deadline {
                return Err(TrackerError::Auth(
                    "Sign-in code expired before it was approved".into(),
                ));
            }

            let response = self.http.post(&url).form(&form).send().await?;
            let status = response.status();
            let body = response.text().await?;

            if status.is_success() {
                let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
                    TrackerError::Auth(format!("Unexpected token response: {}", e))
                })?;
                let mut access = AccessToken::expiring_in(token.access_token, token.expires_in);
                access.scope = token.scope;
                if let Some(token_type) = token.token_type {
                    access.token_type = token_type;
                }
                return Ok(access);
            }

            let error = serde_json::from_str::<OAuthErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or_default();
            match error.as_str() {
                "authorization_pending" => {
                    log::debug!("Waiting for user to approve sign-in");
                }
                "slow_down" => {
                    interval += SLOW_DOWN_STEP_SECS;
                    log::debug!("Provider asked to slow down, polling every {}s", interval);
                }
                "access_denied" => {
                    return Err(TrackerError::Auth("Sign-in was denied".into()));
                }
                "expired_token" => {
                    return Err(TrackerError::Auth(
                        "Sign-in code expired before it was approved".into(),
                    ));
                }
                _ => return Err(oauth_failure(status.as_u16(), &body)),
            }
        }
    }

    /// Invalidate a token at the provider
    pub async fn revoke(&self, token: &str) -> TrackerResult<()> {
        let url = format!("{}/revoke", self.base_url);
        let response = self.http.post(&url).form(&[("token", token)]).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrackerError::http(status.as_u16(), body));
        }
        Ok(())
    }
}

fn oauth_failure(status: u16, body: &str) -> TrackerError {
    match serde_json::from_str::<OAuthErrorBody>(body) {
        Ok(err) => TrackerError::Auth(match err.error_description {
            Some(description) => format!("{}: {}", err.error, description),
            None => err.error,
        }),
        Err(_) => TrackerError::http(status, body.to_string()),
    }
}
