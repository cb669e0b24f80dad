//! Client for the SnapTogether generation service.
//!
//! Provides a minimal HTTP client for `POST /api/generate`, the
//! [`MergeService`] seam the workflow driver talks to, the [`Session`] store
//! that runs the upload → pose → generate workflow, and result download.
//! The CLI uses this crate directly.

pub mod api;
pub mod config;
pub mod download;
pub mod error;
pub mod generator;
pub mod session;

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

pub use config::ClientConfig;
pub use download::result_file_name;
pub use error::ClientError;
pub use generator::MergeService;
pub use session::{GenerateOutcome, Session, GENERATION_CANCELLED};

/// HTTP client for the generation service.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    timeout_secs: u64,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_secs,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(config.api_url.clone(), config.request_timeout_secs)
    }

    /// Create client from environment: SNAPTOGETHER_API_URL, SNAPTOGETHER_REQUEST_TIMEOUT_SECS.
    pub fn from_env() -> Result<Self> {
        Self::from_config(&ClientConfig::from_env()?)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Raw client for custom requests.
    pub fn client(&self) -> &Client {
        &self.client
    }
}
