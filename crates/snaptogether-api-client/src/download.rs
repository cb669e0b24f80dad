//! Saving a generation result to disk

use chrono::{DateTime, Utc};
use snaptogether_core::{DataUri, GenerationResult};
use std::path::{Path, PathBuf};

use crate::{ApiClient, ClientError};

/// `snaptogether-merged-<unix-millis>.jpg`
pub fn result_file_name(now: DateTime<Utc>) -> String {
    format!("snaptogether-merged-{}.jpg", now.timestamp_millis())
}

impl ApiClient {
    /// Write the result image into `dir` and return the file path.
    ///
    /// Data URIs are decoded locally; http(s) URLs are fetched.
    pub async fn download_result(
        &self,
        result: &GenerationResult,
        dir: &Path,
    ) -> Result<PathBuf, ClientError> {
        if !result.success || result.image_url.is_empty() {
            return Err(ClientError::Download(
                "there is no successful result to save".to_string(),
            ));
        }

        let bytes = self.fetch_image(&result.image_url).await?;
        let path = dir.join(result_file_name(Utc::now()));

        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|source| ClientError::Save {
                path: path.clone(),
                source,
            })?;

        tracing::info!(path = %path.display(), size = bytes.len(), "Result image saved");
        Ok(path)
    }

    async fn fetch_image(&self, image_url: &str) -> Result<Vec<u8>, ClientError> {
        if image_url.starts_with("data:") {
            let uri = DataUri::parse(image_url).map_err(|e| ClientError::Download(e.to_string()))?;
            return uri.decode().map_err(|e| ClientError::Download(e.to_string()));
        }

        if image_url.starts_with("http://") || image_url.starts_with("https://") {
            let response = self
                .client()
                .get(image_url)
                .send()
                .await
                .map_err(|e| ClientError::Download(e.to_string()))?;

            if !response.status().is_success() {
                return Err(ClientError::Download(format!(
                    "HTTP error! status: {}",
                    response.status().as_u16()
                )));
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| ClientError::Download(e.to_string()))?;
            return Ok(bytes.to_vec());
        }

        Err(ClientError::Download(format!(
            "unsupported image URL scheme: {}",
            image_url.split(':').next().unwrap_or_default()
        )))
    }
}
