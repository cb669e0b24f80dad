use std::path::Path;

/// 10 MiB; a file of exactly this size is accepted
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

pub const DEFAULT_ALLOWED_CONTENT_TYPES: [&str; 4] =
    ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Validation errors for photo uploads
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Empty file")]
    EmptyFile,
}

impl ValidationError {
    /// Notice shown to the user when a photo is refused
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::FileTooLarge { .. } => "Image size should be less than 10MB",
            ValidationError::InvalidContentType { .. } => {
                "Please upload a valid image file (JPG, PNG, or WebP)"
            }
            ValidationError::EmptyFile => "The selected file is empty",
        }
    }
}

/// Photo validator
///
/// Checks MIME type and size of a candidate photo before it is encoded.
#[derive(Debug, Clone)]
pub struct PhotoValidator {
    max_file_size: usize,
    allowed_content_types: Vec<String>,
}

impl Default for PhotoValidator {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_FILE_SIZE,
            DEFAULT_ALLOWED_CONTENT_TYPES
                .iter()
                .map(|ct| ct.to_string())
                .collect(),
        )
    }
}

impl PhotoValidator {
    pub fn new(max_file_size: usize, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|ct| ct.to_lowercase())
                .collect(),
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate content type
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        let normalized = content_type.trim().to_lowercase();

        if !self
            .allowed_content_types
            .iter()
            .any(|ct| ct == &normalized)
        {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }

    /// Type is checked before size, matching the order users see the notices in
    pub fn validate_all(&self, content_type: &str, file_size: usize) -> Result<(), ValidationError> {
        self.validate_content_type(content_type)?;
        self.validate_file_size(file_size)?;
        Ok(())
    }
}

/// Map a file name's extension to an image MIME type
pub fn content_type_for_extension(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())?;

    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "heic" => Some("image/heic"),
        "avif" => Some("image/avif"),
        _ => None,
    }
}

/// Detect media type from image data using magic numbers
pub fn detect_media_type(data: &[u8]) -> Option<&'static str> {
    if data.len() < 4 {
        return None;
    }

    // JPEG: FF D8 FF
    if data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
        return Some("image/jpeg");
    }

    // PNG: 89 50 4E 47
    if data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47 {
        return Some("image/png");
    }

    // GIF: 47 49 46
    if data[0] == 0x47 && data[1] == 0x49 && data[2] == 0x46 {
        return Some("image/gif");
    }

    // WebP: RIFF ... WEBP
    if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return Some("image/webp");
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_file_size_boundary() {
        let validator = PhotoValidator::default();
        assert!(validator.validate_file_size(DEFAULT_MAX_FILE_SIZE).is_ok());
        assert_eq!(
            validator.validate_file_size(DEFAULT_MAX_FILE_SIZE + 1),
            Err(ValidationError::FileTooLarge {
                size: DEFAULT_MAX_FILE_SIZE + 1,
                max: DEFAULT_MAX_FILE_SIZE,
            })
        );
    }

    #[test]
    fn test_validate_file_size_empty() {
        let validator = PhotoValidator::default();
        assert!(matches!(
            validator.validate_file_size(0),
            Err(ValidationError::EmptyFile)
        ));
    }

    #[test]
    fn test_validate_content_type_ok() {
        let validator = PhotoValidator::default();
        for ct in ["image/jpeg", "image/jpg", "IMAGE/PNG", "image/webp"] {
            assert!(validator.validate_content_type(ct).is_ok(), "{}", ct);
        }
    }

    #[test]
    fn test_validate_content_type_invalid() {
        let validator = PhotoValidator::default();
        assert!(validator.validate_content_type("image/gif").is_err());
        assert!(validator.validate_content_type("application/pdf").is_err());
    }

    #[test]
    fn test_user_messages() {
        let validator = PhotoValidator::default();
        let err = validator.validate_all("image/gif", 10).unwrap_err();
        assert_eq!(
            err.user_message(),
            "Please upload a valid image file (JPG, PNG, or WebP)"
        );
        let err = validator
            .validate_all("image/jpeg", 15 * 1024 * 1024)
            .unwrap_err();
        assert_eq!(err.user_message(), "Image size should be less than 10MB");
    }

    #[test]
    fn test_custom_limits() {
        let validator = PhotoValidator::new(1024, vec!["image/png".to_string()]);
        assert!(validator.validate_all("image/png", 1024).is_ok());
        assert!(validator.validate_all("image/jpeg", 10).is_err());
        assert!(validator.validate_all("image/png", 1025).is_err());
    }

    #[test]
    fn test_content_type_for_extension() {
        assert_eq!(content_type_for_extension("me.JPG"), Some("image/jpeg"));
        assert_eq!(content_type_for_extension("you.webp"), Some("image/webp"));
        assert_eq!(content_type_for_extension("notes.txt"), None);
        assert_eq!(content_type_for_extension("noextension"), None);
    }

    #[test]
    fn test_detect_media_type() {
        assert_eq!(detect_media_type(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(detect_media_type(&[0x89, 0x50, 0x4E, 0x47]), Some("image/png"));
        assert_eq!(detect_media_type(b"GIF89a"), Some("image/gif"));
        assert_eq!(detect_media_type(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
        assert_eq!(detect_media_type(b"%PDF-1.7"), None);
        assert_eq!(detect_media_type(&[0xFF]), None);
    }
}
