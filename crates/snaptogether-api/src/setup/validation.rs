//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use snaptogether_core::Config;

/// Validate critical configuration values
///
/// Fails fast on problems that would break every request. A missing upstream
/// credential is only a warning: it is read per request and reported to the
/// caller from there.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    for (name, base) in [
        ("GEMINI_API_BASE", config.gemini_api_base()),
        ("ANTHROPIC_API_BASE", config.anthropic_api_base()),
    ] {
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "{} must be an http(s) URL, got '{}'",
                name,
                base
            ));
        }
    }

    let env_var = config.provider().api_key_env();
    if std::env::var(env_var).map(|v| v.trim().is_empty()).unwrap_or(true) {
        tracing::warn!(
            env_var = env_var,
            "Upstream API key is not set - generate requests will fail until it is configured"
        );
    }

    if config.upstream_timeout_secs() > 300 {
        tracing::warn!(
            upstream_timeout_secs = config.upstream_timeout_secs(),
            "UPSTREAM_TIMEOUT_SECS is very high - clients may give up before the service does"
        );
    }

    Ok(())
}
