//! Claude describer using Anthropic's Messages API

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::describer::{
    status_error, transport_error, DescribeContext, DescriberUsage, Description, ImageDescriber,
    UpstreamError,
};

const PROVIDER: &str = "Claude";
const API_VERSION: &str = "2023-06-01";

/// Claude describer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeVisionConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Claude model to use (default: claude-sonnet-4-20250514)
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum tokens for response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for ClaudeVisionConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Claude describer implementation
pub struct ClaudeVisionDescriber {
    http_client: reqwest::Client,
    config: ClaudeVisionConfig,
}

impl Debug for ClaudeVisionDescriber {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ClaudeVisionDescriber")
            .field("model", &self.config.model)
            .finish()
    }
}

// Messages API request/response structures
#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<MessageParam>,
}

#[derive(Debug, Serialize)]
struct MessageParam {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    Image { source: ImageSource },
}

#[derive(Debug, Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    source_type: String,
    media_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlockResponse>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlockResponse {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

impl ClaudeVisionDescriber {
    pub fn new(config: ClaudeVisionConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client for Claude API")?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn build_request(&self, context: &DescribeContext) -> MessagesRequest {
        let mut content: Vec<ContentBlock> = context
            .images
            .iter()
            .map(|image| ContentBlock::Image {
                source: ImageSource {
                    source_type: "base64".to_string(),
                    media_type: normalize_media_type(&image.media_type),
                    data: image.data.clone(),
                },
            })
            .collect();
        content.push(ContentBlock::Text {
            text: context.instruction.clone(),
        });

        MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            messages: vec![MessageParam {
                role: "user".to_string(),
                content,
            }],
        }
    }
}

/// The Messages API only knows `image/jpeg`, not the `image/jpg` alias
fn normalize_media_type(media_type: &str) -> String {
    match media_type {
        "image/jpg" => "image/jpeg".to_string(),
        other => other.to_string(),
    }
}

#[async_trait]
impl ImageDescriber for ClaudeVisionDescriber {
    fn name(&self) -> &str {
        "claude"
    }

    async fn describe_images(&self, context: DescribeContext) -> Result<Description, UpstreamError> {
        tracing::info!(
            model = %self.config.model,
            images = context.images.len(),
            "Sending images to Claude API"
        );

        let body = self.build_request(&context);
        let response = self
            .http_client
            .post(format!(
                "{}/v1/messages",
                self.config.api_base.trim_end_matches('/')
            ))
            .header("x-api-key", &context.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, self.config.timeout_secs, e))?;

        if !response.status().is_success() {
            return Err(status_error(PROVIDER, response).await);
        }

        let parsed: MessagesResponse =
            response
                .json()
                .await
                .map_err(|e| UpstreamError::Malformed {
                    provider: PROVIDER,
                    message: e.to_string(),
                })?;

        let text = parsed
            .content
            .into_iter()
            .filter_map(|b| match b {
                ContentBlockResponse::Text { text } => Some(text),
                ContentBlockResponse::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n");

        if text.trim().is_empty() {
            return Err(UpstreamError::Malformed {
                provider: PROVIDER,
                message: "response contained no text".to_string(),
            });
        }

        Ok(Description {
            text,
            usage: parsed.usage.map(|u| DescriberUsage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            }),
        })
    }
}
