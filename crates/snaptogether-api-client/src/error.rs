use std::io;
use std::path::PathBuf;

use snaptogether_core::WorkflowError;
use snaptogether_processing::UploadError;

/// Everything that can go wrong on the client side.
///
/// The `Display` text of the request variants is what ends up in
/// `GenerationResult::error_message`.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("{0}")]
    Transport(String),

    #[error("HTTP error! status: {status}")]
    HttpStatus { status: u16 },

    /// The service answered with its own `error` text
    #[error("{message}")]
    Service { status: u16, message: String },

    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Failed to download image: {0}")]
    Download(String),

    #[error("Failed to save image to {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ClientError {
    /// Map a reqwest failure, keeping client-side timeouts distinct
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ClientError::Timeout {
                seconds: timeout_secs,
            }
        } else {
            ClientError::Transport(err.to_string())
        }
    }

    /// Message suitable for showing to the person at the keyboard
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Upload(err) => err.user_message().to_string(),
            ClientError::Download(_) | ClientError::Save { .. } => {
                "Failed to download image. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snaptogether_processing::ValidationError;

    #[test]
    fn test_display_matches_result_messages() {
        assert_eq!(
            ClientError::HttpStatus { status: 502 }.to_string(),
            "HTTP error! status: 502"
        );
        assert_eq!(
            ClientError::Timeout { seconds: 90 }.to_string(),
            "Request timed out after 90s"
        );
        assert_eq!(
            ClientError::Service {
                status: 500,
                message: "API key not configured".to_string()
            }
            .to_string(),
            "API key not configured"
        );
    }

    #[test]
    fn test_user_message_for_upload_errors() {
        let err = ClientError::from(UploadError::from(ValidationError::FileTooLarge {
            size: 15 * 1024 * 1024,
            max: 10 * 1024 * 1024,
        }));
        assert_eq!(err.user_message(), "Image size should be less than 10MB");
    }

    #[test]
    fn test_workflow_errors_pass_through() {
        let err = ClientError::from(WorkflowError::NotReady);
        assert_eq!(err.user_message(), "Please upload both photos and select a pose");
    }
}
