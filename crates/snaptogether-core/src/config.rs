//! Configuration module
//!
//! Service configuration is read from the environment (and a `.env` file when
//! present). Upstream credentials are deliberately NOT part of this struct:
//! the generation handler reads them on every request so that a missing key
//! fails that request instead of the whole process.

use std::env;
use std::fmt;
use std::str::FromStr;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_CLAUDE_MAX_TOKENS: u32 = 2048;
const DEFAULT_ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
const UPSTREAM_TIMEOUT_SECS: u64 = 60;
const MAX_REQUEST_BODY_MB: usize = 32;

/// Which upstream multimodal model answers `describe_images`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamProvider {
    Gemini,
    Claude,
}

impl UpstreamProvider {
    pub fn name(self) -> &'static str {
        match self {
            UpstreamProvider::Gemini => "gemini",
            UpstreamProvider::Claude => "claude",
        }
    }

    /// Environment variable holding this provider's credential
    pub fn api_key_env(self) -> &'static str {
        match self {
            UpstreamProvider::Gemini => "GEMINI_API_KEY",
            UpstreamProvider::Claude => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for UpstreamProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UpstreamProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(UpstreamProvider::Gemini),
            "claude" | "anthropic" => Ok(UpstreamProvider::Claude),
            other => Err(anyhow::anyhow!(
                "UPSTREAM_PROVIDER must be 'gemini' or 'claude', got '{}'",
                other
            )),
        }
    }
}

/// Shape of the generation response.
///
/// `Merge` asks the model for a single cohesive image description; `Analysis`
/// asks it to describe both photos so a client can composite them itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    Merge,
    Analysis,
}

impl GenerationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            GenerationMode::Merge => "merge",
            GenerationMode::Analysis => "analysis",
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "merge" => Ok(GenerationMode::Merge),
            "analysis" | "client-side-merge" => Ok(GenerationMode::Analysis),
            other => Err(anyhow::anyhow!(
                "GENERATION_MODE must be 'merge' or 'analysis', got '{}'",
                other
            )),
        }
    }
}

/// Generation service configuration
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub provider: UpstreamProvider,
    pub generation_mode: GenerationMode,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub claude_model: String,
    pub claude_max_tokens: u32,
    pub anthropic_api_base: String,
    pub upstream_timeout_secs: u64,
    pub max_request_body_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_PORT,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
            provider: UpstreamProvider::Gemini,
            generation_mode: GenerationMode::Merge,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            claude_model: DEFAULT_CLAUDE_MODEL.to_string(),
            claude_max_tokens: DEFAULT_CLAUDE_MAX_TOKENS,
            anthropic_api_base: DEFAULT_ANTHROPIC_API_BASE.to_string(),
            upstream_timeout_secs: UPSTREAM_TIMEOUT_SECS,
            max_request_body_bytes: MAX_REQUEST_BODY_MB * 1024 * 1024,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins: Vec<String> = var("CORS_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_mb = var("MAX_REQUEST_BODY_MB", &MAX_REQUEST_BODY_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_REQUEST_BODY_MB);

        let config = Self {
            server_port: var("PORT", &DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            provider: var("UPSTREAM_PROVIDER", "gemini").parse()?,
            generation_mode: var("GENERATION_MODE", "merge").parse()?,
            gemini_model: var("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            gemini_api_base: var("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE),
            claude_model: var("CLAUDE_MODEL", DEFAULT_CLAUDE_MODEL),
            claude_max_tokens: var("CLAUDE_MAX_TOKENS", &DEFAULT_CLAUDE_MAX_TOKENS.to_string())
                .parse()
                .unwrap_or(DEFAULT_CLAUDE_MAX_TOKENS),
            anthropic_api_base: var("ANTHROPIC_API_BASE", DEFAULT_ANTHROPIC_API_BASE),
            upstream_timeout_secs: var("UPSTREAM_TIMEOUT_SECS", &UPSTREAM_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(UPSTREAM_TIMEOUT_SECS),
            max_request_body_bytes: max_request_body_mb.saturating_mul(1024 * 1024),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.cors_origins.is_empty() {
            return Err(anyhow::anyhow!("CORS_ORIGINS must not be empty"));
        }

        if self.upstream_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "UPSTREAM_TIMEOUT_SECS must be greater than zero"
            ));
        }

        if self.max_request_body_bytes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_REQUEST_BODY_MB must be greater than zero"
            ));
        }

        if self.claude_max_tokens == 0 {
            return Err(anyhow::anyhow!("CLAUDE_MAX_TOKENS must be greater than zero"));
        }

        Ok(())
    }
}

/// Application configuration (generation service).
#[derive(Clone, Debug)]
pub struct Config(pub Box<ServiceConfig>);

impl Config {
    fn as_service(&self) -> &ServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        self.as_service().is_production()
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_service().validate()
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.as_service().server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_service().cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_service().environment
    }

    pub fn provider(&self) -> UpstreamProvider {
        self.as_service().provider
    }

    pub fn generation_mode(&self) -> GenerationMode {
        self.as_service().generation_mode
    }

    pub fn gemini_model(&self) -> &str {
        &self.as_service().gemini_model
    }

    pub fn gemini_api_base(&self) -> &str {
        &self.as_service().gemini_api_base
    }

    pub fn claude_model(&self) -> &str {
        &self.as_service().claude_model
    }

    pub fn claude_max_tokens(&self) -> u32 {
        self.as_service().claude_max_tokens
    }

    pub fn anthropic_api_base(&self) -> &str {
        &self.as_service().anthropic_api_base
    }

    pub fn upstream_timeout_secs(&self) -> u64 {
        self.as_service().upstream_timeout_secs
    }

    pub fn max_request_body_bytes(&self) -> usize {
        self.as_service().max_request_body_bytes
    }
}

impl From<ServiceConfig> for Config {
    fn from(config: ServiceConfig) -> Self {
        Config(Box::new(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServiceConfig, anyhow::Error> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cors_origins, vec!["*".to_string()]);
        assert_eq!(config.provider, UpstreamProvider::Gemini);
        assert_eq!(config.generation_mode, GenerationMode::Merge);
        assert_eq!(config.gemini_model, "gemini-2.0-flash-exp");
        assert_eq!(config.upstream_timeout_secs, 60);
        assert_eq!(config.max_request_body_bytes, 32 * 1024 * 1024);
        assert!(!config.is_production());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PORT", "8080"),
            ("UPSTREAM_PROVIDER", "Claude"),
            ("GENERATION_MODE", "analysis"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
            ("MAX_REQUEST_BODY_MB", "4"),
        ])
        .unwrap();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.provider, UpstreamProvider::Claude);
        assert_eq!(config.generation_mode, GenerationMode::Analysis);
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.cors_origins[1], "https://b.example");
        assert_eq!(config.max_request_body_bytes, 4 * 1024 * 1024);
    }

    #[test]
    fn test_wildcard_cors_refused_in_production() {
        let err = load(&[("ENVIRONMENT", "production")]).unwrap_err();
        assert!(err.to_string().contains("CORS_ORIGINS"));

        let ok = load(&[
            ("APP_ENV", "prod"),
            ("CORS_ORIGINS", "https://snaptogether.example"),
        ])
        .unwrap();
        assert!(ok.is_production());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(load(&[("PORT", "not-a-port")]).is_err());
        assert!(load(&[("UPSTREAM_PROVIDER", "openai")]).is_err());
        assert!(load(&[("GENERATION_MODE", "paint")]).is_err());
        assert!(load(&[("UPSTREAM_TIMEOUT_SECS", "0")]).is_err());
    }

    #[test]
    fn test_provider_credentials() {
        assert_eq!(UpstreamProvider::Gemini.api_key_env(), "GEMINI_API_KEY");
        assert_eq!(UpstreamProvider::Claude.api_key_env(), "ANTHROPIC_API_KEY");
    }
}
