//! HTTP client for the StudyVault moderation and catalog API.
//!
//! Moderators drive the review queue through this client; the server is the only
//! component that talks to storage or the database.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use studyvault_core::models::{CatalogStats, DownloadResponse, ResourceResponse, SubmissionResponse};
use studyvault_core::Decision;
use uuid::Uuid;

/// API version prefix (e.g. "/api/v0"). Set STUDYVAULT_API_VERSION to match the server.
pub fn api_prefix() -> String {
    let version = std::env::var("STUDYVAULT_API_VERSION").unwrap_or_else(|_| "v0".to_string());
    format!("/api/{}", version)
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    prefix: String,
    /// Moderator key, sent as a Bearer token when present.
    api_key: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            prefix: api_prefix(),
            api_key,
        })
    }

    /// Create client from environment: STUDYVAULT_API_URL (or API_URL) and
    /// MODERATOR_API_KEY (or STUDYVAULT_API_KEY).
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("STUDYVAULT_API_URL")
            .or_else(|_| std::env::var("API_URL"))
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let api_key = std::env::var("MODERATOR_API_KEY")
            .or_else(|_| std::env::var("STUDYVAULT_API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self::new(base_url, api_key)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.prefix, path)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self
            .apply_auth(request)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "API request failed with status {}: {}",
                status,
                error_message(&error_text)
            ));
        }

        response
            .json()
            .await
            .context("Failed to parse response as JSON")
    }

    /// One page of the review queue, newest first.
    pub async fn list_pending(&self, limit: i64, offset: i64) -> Result<Vec<SubmissionResponse>> {
        let request = self
            .client
            .get(self.build_url("/moderation/pending"))
            .query(&[("limit", limit), ("offset", offset)]);
        self.send(request).await
    }

    pub async fn get_submission(&self, id: Uuid) -> Result<SubmissionResponse> {
        let request = self.client.get(self.build_url(&format!("/submissions/{}", id)));
        self.send(request).await
    }

    /// Approve or reject a pending submission. Rejection is sent confirmed; callers
    /// must have asked the moderator first.
    pub async fn decide(
        &self,
        id: Uuid,
        decision: Decision,
        note: Option<&str>,
        reviewer: Option<&str>,
    ) -> Result<SubmissionResponse> {
        let body = json!({
            "decision": decision,
            "note": note,
            "reviewer": reviewer,
            "confirm": decision == Decision::Reject,
        });
        let request = self
            .client
            .post(self.build_url(&format!("/moderation/{}/decision", id)))
            .json(&body);
        self.send(request).await
    }

    pub async fn list_resources(
        &self,
        search: Option<&str>,
        category: Option<&str>,
        limit: i64,
    ) -> Result<Vec<ResourceResponse>> {
        let mut query: Vec<(&str, String)> = vec![("limit", limit.to_string())];
        if let Some(s) = search {
            query.push(("search", s.to_string()));
        }
        if let Some(c) = category {
            query.push(("category", c.to_string()));
        }
        let request = self.client.get(self.build_url("/resources")).query(&query);
        self.send(request).await
    }

    pub async fn record_download(&self, id: Uuid) -> Result<DownloadResponse> {
        let request = self
            .client
            .post(self.build_url(&format!("/resources/{}/download", id)));
        self.send(request).await
    }

    pub async fn stats(&self) -> Result<CatalogStats> {
        let request = self.client.get(self.build_url("/admin/stats"));
        self.send(request).await
    }

    pub async fn delete_resource(&self, id: Uuid) -> Result<()> {
        let request = self
            .client
            .delete(self.build_url(&format!("/admin/resources/{}", id)));
        let response = self
            .apply_auth(request)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Delete failed with status {}: {}",
                status,
                error_message(&error_text)
            ));
        }
        Ok(())
    }
}

/// Pull `error` out of a JSON error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_trims_trailing_slash() {
        let client = ApiClient::new("http://vault.local:3000/".to_string(), None).unwrap();
        assert_eq!(client.base_url(), "http://vault.local:3000");
        assert!(client
            .build_url("/admin/stats")
            .starts_with("http://vault.local:3000/api/"));
        assert!(client.build_url("/admin/stats").ends_with("/admin/stats"));
    }

    #[test]
    fn bearer_header_is_sent_only_with_a_key() {
        let keyed = ApiClient::new("http://vault.local".to_string(), Some("k3y".to_string()))
            .unwrap();
        let request = keyed
            .apply_auth(keyed.client.get(keyed.build_url("/admin/stats")))
            .build()
            .unwrap();
        assert_eq!(request.headers()["authorization"], "Bearer k3y");

        let anonymous = ApiClient::new("http://vault.local".to_string(), None).unwrap();
        assert!(!anonymous.has_api_key());
        let request = anonymous
            .apply_auth(anonymous.client.get(anonymous.build_url("/resources")))
            .build()
            .unwrap();
        assert!(request.headers().get("authorization").is_none());
    }

    #[test]
    fn error_message_prefers_json_error_field() {
        let body = r#"{"error":"Submission is already published","code":"INVALID_STATE_TRANSITION"}"#;
        assert_eq!(error_message(body), "Submission is already published");
        assert_eq!(error_message("gateway timeout"), "gateway timeout");
    }
}
