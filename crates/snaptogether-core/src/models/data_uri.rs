use base64::Engine;

/// Errors produced while parsing a `data:` URI
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataUriError {
    #[error("missing 'data:' scheme")]
    MissingScheme,

    #[error("missing ',' between header and payload")]
    MissingSeparator,

    #[error("payload is not base64-encoded")]
    NotBase64,

    #[error("empty payload")]
    EmptyPayload,

    #[error("invalid base64 payload: {0}")]
    InvalidPayload(String),
}

/// A parsed `data:<media-type>;base64,<payload>` URI.
///
/// The payload is kept in its base64 form; upstream providers want it that
/// way. Call [`DataUri::decode`] for raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub media_type: String,
    pub data: String,
}

impl DataUri {
    /// Encode raw bytes as a data URI string
    pub fn encode(media_type: &str, bytes: &[u8]) -> String {
        let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
        format!("data:{};base64,{}", media_type, payload)
    }

    pub fn parse(uri: &str) -> Result<Self, DataUriError> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or(DataUriError::MissingScheme)?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or(DataUriError::MissingSeparator)?;

        let mut params = header.split(';');
        let media_type = params.next().unwrap_or_default().trim().to_lowercase();
        if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
            return Err(DataUriError::NotBase64);
        }
        if payload.is_empty() {
            return Err(DataUriError::EmptyPayload);
        }

        // RFC 2397 default when the media type is omitted
        let media_type = if media_type.is_empty() {
            "text/plain".to_string()
        } else {
            media_type
        };

        Ok(Self {
            media_type,
            data: payload.to_string(),
        })
    }

    pub fn decode(&self) -> Result<Vec<u8>, DataUriError> {
        base64::engine::general_purpose::STANDARD
            .decode(self.data.as_bytes())
            .map_err(|e| DataUriError::InvalidPayload(e.to_string()))
    }

    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}
