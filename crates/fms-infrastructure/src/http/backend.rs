//! reqwest implementation of [`ScholarshipBackend`].

use async_trait::async_trait;
use fms_core::backend::ScholarshipBackend;
use fms_core::config::ClientConfig;
use fms_core::error::{FmsError, Result};
use fms_core::profile::Profile;
use fms_core::reminder::{Reminder, SubscribeReceipt};
use fms_core::scholarship::Scholarship;
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

use super::classify;

const PROFILES_PATH: &str = "/profiles";
const PROFILE_ME_PATH: &str = "/profiles/me";
const ELIGIBLE_PATH: &str = "/scholarships/eligible";
const REMINDERS_PATH: &str = "/reminders/";
const SUBSCRIBE_PATH: &str = "/reminders/subscribe";

#[derive(Serialize)]
struct SubscribeRequest<'a> {
    #[serde(rename = "scholarshipId")]
    scholarship_id: &'a str,
}

/// HTTP client for the FundMyStudy backend.
///
/// Every request carries the bearer token and a fresh `X-Request-Id`, and is
/// bounded by the configured timeout.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let timeout = config.request_timeout();
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| FmsError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, url)
            .bearer_auth(token)
            .header("X-Request-Id", Uuid::new_v4().to_string())
            .header("Accept", "application/json")
    }

    /// Sends `request` and returns the success body, classifying every failure.
    async fn execute(&self, request: RequestBuilder, resource: &str) -> Result<String> {
        let response = request.send().await.map_err(|e| {
            let err = classify::classify_transport(&e, self.timeout);
            tracing::warn!("[HttpBackend] {} request failed: {}", resource, err);
            err
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify::classify_transport(&e, self.timeout))?;

        if !status.is_success() {
            let err = classify::classify_status(status.as_u16(), &body, resource, self.timeout);
            tracing::warn!(
                "[HttpBackend] {} answered {}: {}",
                resource,
                status.as_u16(),
                err
            );
            return Err(err);
        }

        tracing::debug!(
            "[HttpBackend] {} answered {} ({} bytes)",
            resource,
            status.as_u16(),
            body.len()
        );
        Ok(body)
    }
}

#[async_trait]
impl ScholarshipBackend for HttpBackend {
    async fn save_profile(&self, token: &str, profile: &Profile) -> Result<Option<Profile>> {
        let request = self.request(Method::POST, PROFILES_PATH, token).json(profile);
        let body = self.execute(request, "profile").await?;
        Ok(classify::parse_saved_profile(&body))
    }

    async fn fetch_profile(&self, token: &str) -> Result<Profile> {
        let request = self.request(Method::GET, PROFILE_ME_PATH, token);
        let body = self.execute(request, "profile").await?;
        classify::parse_profile(&body)
    }

    async fn fetch_eligible(&self, token: &str) -> Result<Vec<Scholarship>> {
        let request = self.request(Method::GET, ELIGIBLE_PATH, token);
        let body = self.execute(request, "scholarships").await?;
        classify::parse_eligible(&body)
    }

    async fn list_reminders(&self, token: &str) -> Result<Vec<Reminder>> {
        let request = self.request(Method::GET, REMINDERS_PATH, token);
        let body = self.execute(request, "reminders").await?;
        classify::parse_reminders(&body)
    }

    async fn subscribe_reminder(
        &self,
        token: &str,
        scholarship_id: &str,
    ) -> Result<SubscribeReceipt> {
        let request = self
            .request(Method::POST, SUBSCRIBE_PATH, token)
            .json(&SubscribeRequest { scholarship_id });
        let body = self
            .execute(request, "scholarship")
            .await?;
        Ok(classify::parse_subscribe(&body))
    }
}
