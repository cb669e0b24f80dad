//! Describer registration and state assembly

use anyhow::{Context, Result};
use snaptogether_core::{Config, UpstreamProvider};
use snaptogether_plugins::{
    ClaudeVisionConfig, ClaudeVisionDescriber, DescriberInfo, DescriberRegistry,
    GeminiVisionConfig, GeminiVisionDescriber,
};
use std::sync::Arc;

use crate::state::{AppState, CredentialSource};

/// Register every describer and select the one named by `UPSTREAM_PROVIDER`
pub async fn initialize_services(
    config: &Config,
    credentials: CredentialSource,
) -> Result<Arc<AppState>> {
    let describers = DescriberRegistry::new();
    register_describers(config, &describers).await?;

    let describer = describers
        .get(config.provider().name())
        .await
        .with_context(|| {
            format!(
                "UPSTREAM_PROVIDER '{}' is not available in this build",
                config.provider()
            )
        })?;

    tracing::info!(
        describer = ?describer,
        credential_env = config.provider().api_key_env(),
        "Upstream describer selected"
    );

    Ok(Arc::new(AppState {
        config: config.clone(),
        describers,
        describer,
        credentials,
    }))
}

async fn register_describers(config: &Config, registry: &DescriberRegistry) -> Result<()> {
    let gemini = GeminiVisionDescriber::new(GeminiVisionConfig {
        api_base: config.gemini_api_base().to_string(),
        model: config.gemini_model().to_string(),
        timeout_secs: config.upstream_timeout_secs(),
    })?;
    registry
        .register(
            Arc::new(gemini),
            DescriberInfo {
                name: UpstreamProvider::Gemini.name().to_string(),
                description: format!("Google Gemini ({})", config.gemini_model()),
                credential_env: UpstreamProvider::Gemini.api_key_env().to_string(),
            },
        )
        .await?;

    let claude = ClaudeVisionDescriber::new(ClaudeVisionConfig {
        api_base: config.anthropic_api_base().to_string(),
        model: config.claude_model().to_string(),
        max_tokens: config.claude_max_tokens(),
        timeout_secs: config.upstream_timeout_secs(),
    })?;
    registry
        .register(
            Arc::new(claude),
            DescriberInfo {
                name: UpstreamProvider::Claude.name().to_string(),
                description: format!("Anthropic Claude ({})", config.claude_model()),
                credential_env: UpstreamProvider::Claude.api_key_env().to_string(),
            },
        )
        .await?;

    Ok(())
}
