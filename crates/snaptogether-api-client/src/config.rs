//! Client configuration

use std::env;

const DEFAULT_API_URL: &str = "http://localhost:3000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 90;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    /// Upper bound for one generate call; the service's own upstream timeout is shorter
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("SNAPTOGETHER_API_URL")
            .or_else(|| lookup("API_URL"))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        validate_api_url(&api_url)?;

        let request_timeout_secs = match lookup("SNAPTOGETHER_REQUEST_TIMEOUT_SECS") {
            Some(value) => value.parse::<u64>().map_err(|_| {
                anyhow::anyhow!("SNAPTOGETHER_REQUEST_TIMEOUT_SECS must be a number of seconds")
            })?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        if request_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "SNAPTOGETHER_REQUEST_TIMEOUT_SECS must be greater than zero"
            ));
        }

        Ok(Self {
            api_url,
            request_timeout_secs,
        })
    }

    /// Replace the service URL, applying the same check as the environment value
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Result<Self, anyhow::Error> {
        let api_url = api_url.into();
        validate_api_url(&api_url)?;
        self.api_url = api_url;
        Ok(self)
    }
}

fn validate_api_url(api_url: &str) -> Result<(), anyhow::Error> {
    if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
        return Err(anyhow::anyhow!(
            "SNAPTOGETHER_API_URL must be an http(s) URL, got '{}'",
            api_url
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ClientConfig, anyhow::Error> {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        ClientConfig::from_lookup(|key| map.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults() {
        assert_eq!(load(&[]).unwrap(), ClientConfig::default());
    }

    #[test]
    fn test_overrides_and_fallback_variable() {
        let config = load(&[
            ("API_URL", "https://snaptogether.example"),
            ("SNAPTOGETHER_REQUEST_TIMEOUT_SECS", "30"),
        ])
        .unwrap();
        assert_eq!(config.api_url, "https://snaptogether.example");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_invalid_values() {
        assert!(load(&[("SNAPTOGETHER_API_URL", "localhost:3000")]).is_err());
        assert!(load(&[("SNAPTOGETHER_REQUEST_TIMEOUT_SECS", "soon")]).is_err());
        assert!(load(&[("SNAPTOGETHER_REQUEST_TIMEOUT_SECS", "0")]).is_err());
    }

    #[test]
    fn test_api_url_override_is_validated() {
        let err = ClientConfig::default()
            .with_api_url("localhost:3000")
            .unwrap_err();
        assert!(err.to_string().contains("http(s)"));

        let config = ClientConfig::default()
            .with_api_url("https://snap.example")
            .unwrap();
        assert_eq!(config.api_url, "https://snap.example");
        assert_eq!(config.request_timeout_secs, 90);
    }
}
