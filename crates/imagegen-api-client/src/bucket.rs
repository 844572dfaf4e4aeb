//! DIAL bucket client: resolves attachment references to bytes.
//!
//! [`DialBucketClient`] is cheap to hold; each batch opens one
//! [`BucketSession`] that owns the HTTP connection pool and credentials until
//! it is closed or dropped.

use async_trait::async_trait;
use bytes::Bytes;
use imagegen_core::{ContentClient, ContentSession, DialConfig, RetrievalError};
use reqwest::StatusCode;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{error_body, ApiClient};

/// Opens authenticated bucket sessions from an explicit configuration.
#[derive(Clone, Debug)]
pub struct DialBucketClient {
    config: DialConfig,
}

impl DialBucketClient {
    pub fn new(config: DialConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ContentClient for DialBucketClient {
    async fn open_session(&self) -> Result<Box<dyn ContentSession>, RetrievalError> {
        let api = ApiClient::from_config(&self.config).map_err(|e| RetrievalError::Transport {
            reference: self.config.base_url.clone(),
            message: format!("{:#}", e),
        })?;

        tracing::debug!(base_url = %api.base_url(), "Bucket session opened");
        Ok(Box::new(BucketSession::new(api)))
    }
}

/// One batch's connection to the DIAL file API.
#[derive(Debug)]
pub struct BucketSession {
    api: ApiClient,
    closed: AtomicBool,
}

impl BucketSession {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            closed: AtomicBool::new(false),
        }
    }

    /// Absolute URL for a reference.
    ///
    /// DIAL references look like `files/<bucket>/<path>` and live under
    /// `<base_url>/v1/`. Absolute http(s) URLs are used as given.
    pub fn resolve_reference(&self, reference: &str) -> String {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            reference.to_string()
        } else {
            self.api
                .build_url(&format!("/v1/{}", reference.trim_start_matches('/')))
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl ContentSession for BucketSession {
    async fn fetch(&self, reference: &str) -> Result<Bytes, RetrievalError> {
        if self.is_closed() {
            return Err(RetrievalError::SessionClosed);
        }

        let url = self.resolve_reference(reference);
        let start = std::time::Instant::now();

        let mut request = self.api.client().get(&url);
        if self.api.is_own_url(&url) {
            request = self.api.apply_auth(request);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RetrievalError::Transport {
                reference: reference.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        match status {
            StatusCode::NOT_FOUND => return Err(RetrievalError::NotFound(reference.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(RetrievalError::Unauthorized(reference.to_string()))
            }
            s if !s.is_success() => {
                return Err(RetrievalError::Status {
                    reference: reference.to_string(),
                    status: s.as_u16(),
                    body: error_body(response).await,
                })
            }
            _ => {}
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| RetrievalError::Transport {
                reference: reference.to_string(),
                message: e.to_string(),
            })?;

        tracing::info!(
            reference = %reference,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Attachment download successful"
        );

        Ok(data)
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!(base_url = %self.api.base_url(), "Bucket session closed");
        }
    }
}

impl Drop for BucketSession {
    fn drop(&mut self) {
        if !self.is_closed() {
            tracing::warn!("Bucket session dropped without being closed");
        }
    }
}
