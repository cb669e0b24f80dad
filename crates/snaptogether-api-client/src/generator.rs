//! Generation request client

use async_trait::async_trait;
use snaptogether_core::{build_instruction, GenerateRequest, GenerationResult};

use crate::ApiClient;

/// Anything that can turn two encoded photos and a pose into a result.
///
/// Never fails: transport and service errors come back as a failed
/// [`GenerationResult`].
#[async_trait]
pub trait MergeService: Send + Sync {
    async fn request_merge(&self, photo1: &str, photo2: &str, pose: &str) -> GenerationResult;
}

#[async_trait]
impl MergeService for ApiClient {
    async fn request_merge(&self, photo1: &str, photo2: &str, pose: &str) -> GenerationResult {
        let request = GenerateRequest::new(build_instruction(pose), photo1, photo2, pose);

        match self.generate(&request).await {
            Ok(response) => {
                let result = GenerationResult::from_response(response);
                if !result.success {
                    tracing::warn!(error = ?result.error_message, "Service reported a failed generation");
                }
                result
            }
            Err(err) => {
                tracing::warn!(error = %err, "Generation request failed");
                GenerationResult::failed(err.to_string())
            }
        }
    }
}
