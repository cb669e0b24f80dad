use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate`.
///
/// Every field is optional at the wire level so a request with missing fields
/// still deserializes and can be rejected with the dedicated 400 message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose: Option<String>,
}

impl GenerateRequest {
    pub fn new(
        prompt: impl Into<String>,
        photo1: impl Into<String>,
        photo2: impl Into<String>,
        pose: impl Into<String>,
    ) -> Self {
        Self {
            prompt: Some(prompt.into()),
            photo1: Some(photo1.into()),
            photo2: Some(photo2.into()),
            pose: Some(pose.into()),
        }
    }
}

/// A request with every field present and non-blank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateParams {
    pub prompt: String,
    pub photo1: String,
    pub photo2: String,
    pub pose: String,
}

/// Names of the fields missing from a [`GenerateRequest`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Missing required parameters: {}", .0.join(", "))]
pub struct MissingFields(pub Vec<&'static str>);

impl TryFrom<GenerateRequest> for GenerateParams {
    type Error = MissingFields;

    fn try_from(req: GenerateRequest) -> Result<Self, Self::Error> {
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        let prompt = present(req.prompt);
        let photo1 = present(req.photo1);
        let photo2 = present(req.photo2);
        let pose = present(req.pose);

        match (prompt, photo1, photo2, pose) {
            (Some(prompt), Some(photo1), Some(photo2), Some(pose)) => Ok(Self {
                prompt,
                photo1,
                photo2,
                pose,
            }),
            (prompt, photo1, photo2, pose) => {
                let missing = [
                    ("prompt", prompt.is_none()),
                    ("photo1", photo1.is_none()),
                    ("photo2", photo2.is_none()),
                    ("pose", pose.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, missing)| missing.then_some(name))
                .collect();
                Err(MissingFields(missing))
            }
        }
    }
}

/// Body returned by `POST /api/generate`, on success and on failure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose: Option<String>,
}

/// Outcome of one settled generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub success: bool,
    pub image_url: String,
    pub analysis_text: String,
    pub error_message: Option<String>,
}

impl GenerationResult {
    pub const DEFAULT_FAILURE: &'static str = "Failed to generate image";

    pub fn succeeded(image_url: impl Into<String>, analysis_text: impl Into<String>) -> Self {
        Self {
            success: true,
            image_url: image_url.into(),
            analysis_text: analysis_text.into(),
            error_message: None,
        }
    }

    pub fn failed(error_message: impl Into<String>) -> Self {
        Self {
            success: false,
            image_url: String::new(),
            analysis_text: String::new(),
            error_message: Some(error_message.into()),
        }
    }

    /// Interpret a decoded reply from a 2xx response.
    ///
    /// Success requires `success == true` and a non-empty `imageUrl`; anything
    /// else becomes a failure carrying the service's `error` text.
    pub fn from_response(response: GenerateResponse) -> Self {
        let image_url = response.image_url.filter(|url| !url.is_empty());
        match (response.success, image_url) {
            (true, Some(image_url)) => {
                Self::succeeded(image_url, response.analysis.unwrap_or_default())
            }
            _ => Self::failed(
                response
                    .error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| Self::DEFAULT_FAILURE.to_string()),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_require_every_field() {
        let req = GenerateRequest {
            prompt: Some("p".to_string()),
            photo1: Some("data:image/png;base64,AA==".to_string()),
            photo2: None,
            pose: Some("   ".to_string()),
        };
        let err = GenerateParams::try_from(req).unwrap_err();
        assert_eq!(err.0, vec!["photo2", "pose"]);
        assert_eq!(err.to_string(), "Missing required parameters: photo2, pose");
    }

    #[test]
    fn test_params_accept_complete_request() {
        let req = GenerateRequest::new("p", "a", "b", "hugging");
        let params = GenerateParams::try_from(req).unwrap();
        assert_eq!(params.pose, "hugging");
    }

    #[test]
    fn test_response_uses_camel_case_and_skips_empty_fields() {
        let response = GenerateResponse {
            success: true,
            image_url: Some("data:image/png;base64,AA==".to_string()),
            analysis: Some("two friends".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["imageUrl"], "data:image/png;base64,AA==");
        assert!(json.get("error").is_none());
        assert!(json.get("photo1").is_none());
    }

    #[test]
    fn test_result_from_successful_response() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"success":true,"imageUrl":"data:image/png;base64,AA==","analysis":"ok"}"#,
        )
        .unwrap();
        let result = GenerationResult::from_response(response);
        assert!(result.success);
        assert_eq!(result.analysis_text, "ok");
        assert_eq!(result.error_message, None);
    }

    #[test]
    fn test_result_requires_image_url() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"success":true,"imageUrl":""}"#).unwrap();
        let result = GenerationResult::from_response(response);
        assert!(!result.success);
        assert_eq!(
            result.error_message.as_deref(),
            Some("Failed to generate image")
        );
    }

    #[test]
    fn test_result_carries_service_error() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"success":false,"error":"quota exceeded"}"#).unwrap();
        let result = GenerationResult::from_response(response);
        assert!(!result.success);
        assert_eq!(result.error_message.as_deref(), Some("quota exceeded"));
    }
}
