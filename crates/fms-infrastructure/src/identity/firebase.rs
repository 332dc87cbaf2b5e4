//! Firebase Authentication REST adapter.
//!
//! Uses the Identity Toolkit endpoints for password sign-in and sign-up and
//! the Secure Token endpoint for refresh. Provider error codes arrive as
//! `{"error": {"message": "CODE"}}` and are mapped onto [`FmsError`].

use async_trait::async_trait;
use fms_core::config::ClientConfig;
use fms_core::error::{FmsError, Result};
use fms_core::session::{IdentityProvider, IssuedCredential};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::http::classify::classify_transport;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'static str,
    refresh_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
    local_id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
    user_id: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Identity provider backed by Firebase Authentication.
pub struct FirebaseIdentityProvider {
    client: Client,
    api_key: String,
    identity_url: String,
    token_url: String,
    timeout: Duration,
}

impl FirebaseIdentityProvider {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let timeout = config.request_timeout();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FmsError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.identity.api_key.clone(),
            identity_url: config.identity.identity_url.trim_end_matches('/').to_string(),
            token_url: config.identity.token_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn ensure_api_key(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(FmsError::config(
                "Identity API key is not configured (set identity.api_key or FMS_IDENTITY_API_KEY)",
            ));
        }
        Ok(())
    }

    async fn post<B, R>(&self, url: String, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: for<'de> Deserialize<'de>,
    {
        self.ensure_api_key()?;

        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| classify_transport(&e, self.timeout))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| classify_transport(&e, self.timeout))?;

        if !status.is_success() {
            let code = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|env| env.error.message)
                .unwrap_or_default();
            tracing::warn!(
                "[FirebaseIdentity] Request rejected ({}): {}",
                status.as_u16(),
                if code.is_empty() { "no error code" } else { &code }
            );
            return Err(map_error_code(status.as_u16(), &code));
        }

        serde_json::from_str(&text).map_err(|e| {
            FmsError::server(
                Some(status.as_u16()),
                format!("Malformed identity response: {}", e),
            )
        })
    }

    async fn password_flow(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<IssuedCredential> {
        let url = format!("{}/accounts:{}", self.identity_url, endpoint);
        let response: PasswordResponse = self
            .post(
                url,
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        Ok(IssuedCredential {
            id_token: response.id_token,
            refresh_token: response.refresh_token,
            uid: response.local_id,
            email: response.email.unwrap_or_else(|| email.to_string()),
            expires_in: parse_expires_in(response.expires_in.as_deref()),
        })
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<IssuedCredential> {
        let issued = self
            .password_flow("signInWithPassword", email, password)
            .await?;
        tracing::info!("[FirebaseIdentity] Signed in uid={}", issued.uid);
        Ok(issued)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<IssuedCredential> {
        let issued = self.password_flow("signUp", email, password).await?;
        tracing::info!("[FirebaseIdentity] Created identity uid={}", issued.uid);
        Ok(issued)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<IssuedCredential> {
        let url = format!("{}/token", self.token_url);
        let response: RefreshResponse = self
            .post(
                url,
                &RefreshRequest {
                    grant_type: "refresh_token",
                    refresh_token,
                },
            )
            .await?;

        // The refresh endpoint does not echo the email; the caller keeps the
        // one from the previous session when the uid matches.
        Ok(IssuedCredential {
            id_token: response.id_token,
            refresh_token: response.refresh_token,
            uid: response.user_id,
            email: String::new(),
            expires_in: parse_expires_in(response.expires_in.as_deref()),
        })
    }
}

fn parse_expires_in(raw: Option<&str>) -> Option<Duration> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Maps a provider error code onto the shared taxonomy.
///
/// Codes may carry a suffix such as `WEAK_PASSWORD : Password should be at
/// least 6 characters`; only the part before the first space counts.
pub fn map_error_code(status: u16, raw: &str) -> FmsError {
    let code = raw.split_whitespace().next().unwrap_or_default();
    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED" => {
            FmsError::InvalidCredentials
        }
        "EMAIL_EXISTS" => FmsError::EmailInUse,
        "INVALID_EMAIL" | "MISSING_EMAIL" => {
            FmsError::validation("email", "must be a valid email address")
        }
        "WEAK_PASSWORD" | "MISSING_PASSWORD" => FmsError::validation(
            "password",
            raw.split_once(':')
                .map(|(_, msg)| msg.trim().to_string())
                .filter(|msg| !msg.is_empty())
                .unwrap_or_else(|| "is too weak".to_string()),
        ),
        "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND" | "INVALID_ID_TOKEN"
        | "MISSING_REFRESH_TOKEN" => FmsError::SessionExpired,
        "API_KEY_INVALID" | "INVALID_API_KEY" | "CONFIGURATION_NOT_FOUND" => {
            FmsError::config(format!("Identity provider rejected the API key ({})", code))
        }
        _ if raw.starts_with("API key not valid") => {
            FmsError::config("Identity provider rejected the API key")
        }
        "" => FmsError::server(Some(status), format!("Identity provider error (HTTP {})", status)),
        _ => FmsError::server(Some(status), raw.to_string()),
    }
}
