//! Describer core infrastructure
//!
//! This module provides the abstraction the generation service talks to,
//! keeping provider-specific HTTP details out of the handler.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};

use snaptogether_core::{AppError, DataUri, DataUriError};

/// One image sent inline to the upstream model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub media_type: String,
    /// Base64 payload, without the `data:` header
    pub data: String,
}

impl InlineImage {
    pub fn from_data_uri(uri: &str) -> Result<Self, DataUriError> {
        let parsed = DataUri::parse(uri)?;
        Ok(Self {
            media_type: parsed.media_type,
            data: parsed.data,
        })
    }
}

/// Input for one `describe_images` call
///
/// # Security Note
///
/// `api_key` is the upstream credential read for this request. It is redacted
/// from the `Debug` output and must never be logged.
#[derive(Clone)]
pub struct DescribeContext {
    pub api_key: String,
    pub instruction: String,
    pub images: Vec<InlineImage>,
}

impl Debug for DescribeContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("DescribeContext")
            .field("api_key", &"[redacted]")
            .field("instruction_len", &self.instruction.len())
            .field("images", &self.images.len())
            .finish()
    }
}

/// Token usage reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriberUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Textual analysis returned by the upstream model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    pub text: String,
    pub usage: Option<DescriberUsage>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("{provider} API request timed out after {seconds}s")]
    Timeout {
        provider: &'static str,
        seconds: u64,
    },

    #[error("Failed to reach {provider} API")]
    Transport {
        provider: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("{provider} API request failed: {status} - {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("Malformed {provider} API response: {message}")]
    Malformed {
        provider: &'static str,
        message: String,
    },
}

impl From<UpstreamError> for AppError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Timeout { seconds, .. } => AppError::UpstreamTimeout { seconds },
            UpstreamError::Status { status, .. } => AppError::Upstream {
                status: Some(status),
                message: err.to_string(),
            },
            UpstreamError::Malformed { .. } => AppError::Upstream {
                status: None,
                message: err.to_string(),
            },
            UpstreamError::Transport { provider, source } => AppError::UpstreamWithSource {
                message: format!("Failed to reach {} API", provider),
                source,
            },
        }
    }
}

/// Trait that all upstream describers must implement
#[async_trait]
pub trait ImageDescriber: Send + Sync + Debug {
    /// Provider identifier, e.g. `gemini`
    fn name(&self) -> &str;

    /// Reject empty or obviously placeholder credentials before calling out
    fn validate_api_key(&self, api_key: &str) -> anyhow::Result<()> {
        if api_key.trim().is_empty() {
            anyhow::bail!("{} API key is required but not provided", self.name());
        }
        if api_key == "your-api-key" || api_key.len() < 10 {
            anyhow::bail!(
                "{} API key appears to be invalid or a placeholder",
                self.name()
            );
        }
        Ok(())
    }

    /// Send the images plus instruction upstream and return the model's text
    async fn describe_images(&self, context: DescribeContext) -> Result<Description, UpstreamError>;
}

/// Classify a reqwest failure, keeping timeouts distinct
#[cfg(any(feature = "plugin-gemini-vision", feature = "plugin-claude-vision"))]
pub(crate) fn transport_error(
    provider: &'static str,
    timeout_secs: u64,
    err: reqwest::Error,
) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout {
            provider,
            seconds: timeout_secs,
        }
    } else {
        UpstreamError::Transport {
            provider,
            source: anyhow::Error::new(err)
                .context(format!("Failed to send request to {} API", provider)),
        }
    }
}

/// Read a non-2xx response into an error carrying status and body
#[cfg(any(feature = "plugin-gemini-vision", feature = "plugin-claude-vision"))]
pub(crate) async fn status_error(provider: &'static str, response: reqwest::Response) -> UpstreamError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    UpstreamError::Status {
        provider,
        status,
        body,
    }
}
