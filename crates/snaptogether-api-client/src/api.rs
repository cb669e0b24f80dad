//! `POST /api/generate`

use snaptogether_core::{GenerateRequest, GenerateResponse};

use crate::{ApiClient, ClientError};

pub const GENERATE_PATH: &str = "/api/generate";
pub const HEALTH_PATH: &str = "/health";

impl ApiClient {
    /// Send one generate request and decode the reply.
    ///
    /// A 2xx reply is returned as-is, even when it says `success: false`;
    /// interpreting it is left to the caller. Non-2xx replies become
    /// [`ClientError::Service`] when the body carries an `error` text and
    /// [`ClientError::HttpStatus`] otherwise.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ClientError> {
        let url = self.build_url(GENERATE_PATH);
        tracing::debug!(url = %url, pose = ?request.pose, "Sending generate request");

        let response = self
            .client()
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(e, self.timeout_secs()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GenerateResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .filter(|e| !e.is_empty());

            tracing::warn!(status = status.as_u16(), error = ?message, "Generate request failed");

            return Err(match message {
                Some(message) => ClientError::Service {
                    status: status.as_u16(),
                    message,
                },
                None => ClientError::HttpStatus {
                    status: status.as_u16(),
                },
            });
        }

        response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// GET /health. Returns the service's JSON as-is.
    pub async fn health(&self) -> Result<serde_json::Value, ClientError> {
        let response = self
            .client()
            .get(self.build_url(HEALTH_PATH))
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(e, self.timeout_secs()))?;

        if !response.status().is_success() {
            return Err(ClientError::HttpStatus {
                status: response.status().as_u16(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}
