//! HTTP clients for the DIAL API.
//!
//! [`ApiClient`] holds one `reqwest::Client` plus base URL and auth. The
//! `completions` module composes generation requests on top of it and the
//! `bucket` module turns attachment references into bytes.

pub mod bucket;
pub mod completions;

use anyhow::{Context, Result};
use imagegen_core::DialConfig;
use reqwest::Client;
use std::time::Duration;

pub use bucket::{BucketSession, DialBucketClient};

/// DIAL key, sent as `Api-Key: {key}`.
#[derive(Clone)]
pub struct ApiKey(pub String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// HTTP client for the DIAL API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: ApiKey,
    api_version: String,
}

impl ApiClient {
    pub fn new(
        base_url: String,
        api_key: ApiKey,
        api_version: String,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            api_version,
        })
    }

    /// Create a client from an explicit configuration value using `Api-Key` auth.
    pub fn from_config(config: &DialConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            ApiKey(config.api_key.clone()),
            config.api_version.clone(),
            config.request_timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Whether `url` points at the configured DIAL host. Credentials are only
    /// attached to such requests.
    pub fn is_own_url(&self, url: &str) -> bool {
        url == self.base_url
            || url
                .strip_prefix(self.base_url.as_str())
                .is_some_and(|rest| rest.starts_with('/') || rest.starts_with('?'))
    }

    pub(crate) fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.header("Api-Key", self.api_key.0.as_str())
    }

    /// Raw client for custom requests. Caller must apply auth via build_url and headers.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Read an error body for reporting, capped so huge HTML error pages stay readable.
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    const MAX_ERROR_BODY: usize = 512;

    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    if text.len() <= MAX_ERROR_BODY {
        text
    } else {
        let mut end = MAX_ERROR_BODY;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }
}
