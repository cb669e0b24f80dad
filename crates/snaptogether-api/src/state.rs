//! Application state shared across handlers

use std::sync::Arc;

use snaptogether_core::Config;
use snaptogether_plugins::{DescriberRegistry, ImageDescriber};

/// Where the generation handler reads the upstream credential from.
///
/// The credential is looked up on every request rather than once at startup,
/// so a service started without a key still answers with a clear error.
#[derive(Clone)]
pub enum CredentialSource {
    /// Read the named variable from the process environment
    Environment,
    /// Fixed value, used by tests and embedders
    Fixed(Option<String>),
}

impl CredentialSource {
    pub fn api_key(&self, env_var: &str) -> Option<String> {
        let value = match self {
            CredentialSource::Environment => std::env::var(env_var).ok(),
            CredentialSource::Fixed(value) => value.clone(),
        };
        value.filter(|v| !v.trim().is_empty())
    }
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::Environment => f.write_str("Environment"),
            CredentialSource::Fixed(value) => f
                .debug_tuple("Fixed")
                .field(&value.as_ref().map(|_| "[redacted]"))
                .finish(),
        }
    }
}

pub struct AppState {
    pub config: Config,
    pub describers: DescriberRegistry,
    /// Describer selected by `UPSTREAM_PROVIDER`
    pub describer: Arc<dyn ImageDescriber>,
    pub credentials: CredentialSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_credentials() {
        let source = CredentialSource::Fixed(Some("AIza-test-key".to_string()));
        assert_eq!(source.api_key("GEMINI_API_KEY"), Some("AIza-test-key".to_string()));
        assert_eq!(CredentialSource::Fixed(None).api_key("GEMINI_API_KEY"), None);
    }

    #[test]
    fn test_blank_credential_counts_as_missing() {
        let source = CredentialSource::Fixed(Some("   ".to_string()));
        assert_eq!(source.api_key("GEMINI_API_KEY"), None);
    }

    #[test]
    fn test_debug_redacts_value() {
        let source = CredentialSource::Fixed(Some("super-secret-value".to_string()));
        let debug = format!("{:?}", source);
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("[redacted]"));
    }
}
