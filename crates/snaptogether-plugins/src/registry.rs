//! Describer registry for selecting the configured upstream provider

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::describer::ImageDescriber;

/// Describer information for listing available providers
#[derive(Debug, Clone, Serialize)]
pub struct DescriberInfo {
    /// Provider identifier
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Environment variable holding the provider credential
    pub credential_env: String,
}

/// Registry for managing and retrieving describers.
///
/// Thread-safe and async-compatible using tokio's RwLock.
#[derive(Clone)]
pub struct DescriberRegistry {
    describers: Arc<RwLock<HashMap<String, Arc<dyn ImageDescriber>>>>,
    describer_info: Arc<RwLock<HashMap<String, DescriberInfo>>>,
}

impl DescriberRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            describers: Arc::new(RwLock::new(HashMap::new())),
            describer_info: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a describer under its own name. Re-registering replaces the previous entry.
    pub async fn register(
        &self,
        describer: Arc<dyn ImageDescriber>,
        info: DescriberInfo,
    ) -> Result<()> {
        let name = describer.name().to_string();

        let mut describers = self.describers.write().await;
        let mut describer_info = self.describer_info.write().await;

        describers.insert(name.clone(), describer);
        describer_info.insert(name, info);

        Ok(())
    }

    /// Get a describer by name
    pub async fn get(&self, name: &str) -> Result<Arc<dyn ImageDescriber>> {
        let describers = self.describers.read().await;

        describers
            .get(name)
            .cloned()
            .with_context(|| format!("Describer '{}' not found", name))
    }

    /// List all registered describers
    pub async fn list(&self) -> Vec<DescriberInfo> {
        let describer_info = self.describer_info.read().await;

        let mut infos: Vec<DescriberInfo> = describer_info.values().cloned().collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.describers.read().await.contains_key(name)
    }
}

impl Default for DescriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describer::{DescribeContext, Description, UpstreamError};
    use async_trait::async_trait;

    #[derive(Debug)]
    struct MockDescriber {
        name: String,
    }

    impl MockDescriber {
        fn new(name: impl Into<String>) -> Self {
            Self { name: name.into() }
        }
    }

    #[async_trait]
    impl ImageDescriber for MockDescriber {
        fn name(&self) -> &str {
            &self.name
        }

        async fn describe_images(
            &self,
            _context: DescribeContext,
        ) -> Result<Description, UpstreamError> {
            Ok(Description {
                text: format!("described by {}", self.name),
                usage: None,
            })
        }
    }

    fn info(name: &str) -> DescriberInfo {
        DescriberInfo {
            name: name.to_string(),
            description: format!("{} describer", name),
            credential_env: "TEST_API_KEY".to_string(),
        }
    }

    #[tokio::test]
    async fn test_new_registry_is_empty() {
        let registry = DescriberRegistry::new();
        assert!(registry.list().await.is_empty());
        assert!(!registry.contains("gemini").await);
    }

    #[tokio::test]
    async fn test_register_and_get() {
        let registry = DescriberRegistry::new();
        registry
            .register(Arc::new(MockDescriber::new("gemini")), info("gemini"))
            .await
            .unwrap();

        let describer = registry.get("gemini").await.unwrap();
        assert_eq!(describer.name(), "gemini");
        assert!(registry.contains("gemini").await);
    }

    #[tokio::test]
    async fn test_get_nonexistent_describer() {
        let registry = DescriberRegistry::new();
        let err = registry.get("openai").await.unwrap_err();
        assert!(err.to_string().contains("Describer 'openai' not found"));
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_name() {
        let registry = DescriberRegistry::new();
        for name in ["gemini", "claude"] {
            registry
                .register(Arc::new(MockDescriber::new(name)), info(name))
                .await
                .unwrap();
        }

        let names: Vec<String> = registry.list().await.into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["claude".to_string(), "gemini".to_string()]);
    }

    #[tokio::test]
    async fn test_clone_shares_entries() {
        let registry = DescriberRegistry::new();
        let cloned = registry.clone();
        registry
            .register(Arc::new(MockDescriber::new("claude")), info("claude"))
            .await
            .unwrap();
        assert!(cloned.contains("claude").await);
    }
}
