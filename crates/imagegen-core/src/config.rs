//! Configuration module
//!
//! Connection settings are an explicit value handed to the client constructors,
//! never process-wide state. `DialConfig::from_env` is the usual entry point;
//! the CLI overrides individual fields from its flags.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_API_VERSION, DEFAULT_DEPLOYMENT, DEFAULT_DIAL_URL, DEFAULT_MAX_CONCURRENT_DOWNLOADS,
    DEFAULT_OUTPUT_DIR, DEFAULT_REQUEST_TIMEOUT_SECS,
};

/// Settings for one generation run.
#[derive(Clone)]
pub struct DialConfig {
    pub api_key: String,
    pub base_url: String,
    pub deployment: String,
    pub api_version: String,
    pub output_dir: PathBuf,
    pub max_concurrent_downloads: usize,
    pub request_timeout_secs: u64,
}

// The API key must never end up in logs.
impl fmt::Debug for DialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .field("output_dir", &self.output_dir)
            .field("max_concurrent_downloads", &self.max_concurrent_downloads)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl DialConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            deployment: DEFAULT_DEPLOYMENT.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            max_concurrent_downloads: DEFAULT_MAX_CONCURRENT_DOWNLOADS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Load from the environment (and `.env`, if present).
    ///
    /// `DIAL_API_KEY` (or `API_KEY`) is required. `DIAL_URL`, `DIAL_DEPLOYMENT`,
    /// `DIAL_API_VERSION`, `IMAGEGEN_OUTPUT_DIR`, `IMAGEGEN_MAX_CONCURRENT_DOWNLOADS`
    /// and `DIAL_REQUEST_TIMEOUT_SECS` fall back to defaults when unset; a set
    /// but unparsable number is an error.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("DIAL_API_KEY")
            .or_else(|| lookup("API_KEY"))
            .ok_or_else(|| anyhow::anyhow!("Missing API key. Set DIAL_API_KEY or API_KEY"))?;

        let base_url = lookup("DIAL_URL").unwrap_or_else(|| DEFAULT_DIAL_URL.to_string());

        let mut config = Self::new(api_key, base_url);

        if let Some(deployment) = lookup("DIAL_DEPLOYMENT") {
            config.deployment = deployment;
        }
        if let Some(api_version) = lookup("DIAL_API_VERSION") {
            config.api_version = api_version;
        }
        if let Some(output_dir) = lookup("IMAGEGEN_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(output_dir);
        }

        if let Some(value) = lookup("IMAGEGEN_MAX_CONCURRENT_DOWNLOADS") {
            config.max_concurrent_downloads = value.trim().parse().map_err(|_| {
                anyhow::anyhow!(
                    "IMAGEGEN_MAX_CONCURRENT_DOWNLOADS must be a positive integer, got '{}'",
                    value
                )
            })?;
        }

        if let Some(value) = lookup("DIAL_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = value.trim().parse().map_err(|_| {
                anyhow::anyhow!(
                    "DIAL_REQUEST_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    value
                )
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.api_key.trim().is_empty() {
            return Err(anyhow::anyhow!("DIAL_API_KEY must not be empty"));
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "DIAL_URL must be an http(s) URL, got '{}'",
                self.base_url
            ));
        }

        if self.deployment.trim().is_empty() {
            return Err(anyhow::anyhow!("DIAL_DEPLOYMENT must not be empty"));
        }

        if self.max_concurrent_downloads == 0 {
            return Err(anyhow::anyhow!(
                "IMAGEGEN_MAX_CONCURRENT_DOWNLOADS must be at least 1"
            ));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
