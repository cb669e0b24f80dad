//! Google Gemini describer using the `generateContent` REST endpoint

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::describer::{
    status_error, transport_error, DescribeContext, DescriberUsage, Description, ImageDescriber,
    UpstreamError,
};

const PROVIDER: &str = "Gemini";

/// Gemini describer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiVisionConfig {
    /// Base URL, e.g. `https://generativelanguage.googleapis.com`
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Gemini model to use (default: gemini-2.0-flash-exp)
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for GeminiVisionConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Gemini describer implementation
pub struct GeminiVisionDescriber {
    http_client: reqwest::Client,
    config: GeminiVisionConfig,
}

impl Debug for GeminiVisionDescriber {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiVisionDescriber")
            .field("model", &self.config.model)
            .finish()
    }
}

// generateContent request/response structures
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

impl GeminiVisionDescriber {
    pub fn new(config: GeminiVisionConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client for Gemini API")?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_request(context: &DescribeContext) -> GenerateContentRequest {
        let mut parts = vec![Part::Text {
            text: context.instruction.clone(),
        }];
        parts.extend(context.images.iter().map(|image| Part::Inline {
            inline_data: InlineData {
                mime_type: image.media_type.clone(),
                data: image.data.clone(),
            },
        }));

        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts,
            }],
        }
    }

    fn extract_text(response: GenerateContentResponse) -> Result<Description, UpstreamError> {
        let usage = response.usage_metadata.map(|u| DescriberUsage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
        });

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            let message = match response.prompt_feedback.and_then(|f| f.block_reason) {
                Some(reason) => format!("request was blocked ({})", reason),
                None => "response contained no text".to_string(),
            };
            return Err(UpstreamError::Malformed {
                provider: PROVIDER,
                message,
            });
        }

        Ok(Description { text, usage })
    }
}

#[async_trait]
impl ImageDescriber for GeminiVisionDescriber {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn describe_images(&self, context: DescribeContext) -> Result<Description, UpstreamError> {
        tracing::info!(
            model = %self.config.model,
            images = context.images.len(),
            instruction_len = context.instruction.len(),
            "Sending images to Gemini API"
        );

        let body = Self::build_request(&context);
        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", &context.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, self.config.timeout_secs, e))?;

        if !response.status().is_success() {
            return Err(status_error(PROVIDER, response).await);
        }

        let parsed: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| UpstreamError::Malformed {
                    provider: PROVIDER,
                    message: e.to_string(),
                })?;

        let description = Self::extract_text(parsed)?;
        tracing::info!(
            model = %self.config.model,
            analysis_len = description.text.len(),
            "Gemini analysis completed"
        );
        Ok(description)
    }
}
