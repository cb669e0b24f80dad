//! Photo submission: validate, encode as a data URI, hand back an `UploadedPhoto`.

use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use snaptogether_core::{DataUri, PhotoSlot, UploadedPhoto};

use crate::validator::{content_type_for_extension, detect_media_type, PhotoValidator, ValidationError};

/// A candidate photo as picked by the user
#[derive(Debug, Clone)]
pub struct PhotoFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl PhotoFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode photo: {0}")]
    Encode(String),
}

impl UploadError {
    pub fn user_message(&self) -> &'static str {
        match self {
            UploadError::Validation(err) => err.user_message(),
            UploadError::Read { .. } | UploadError::Encode(_) => {
                "Failed to upload photo. Please try again."
            }
        }
    }
}

/// Validates and encodes photos. Holds no session state; the caller applies
/// the returned photo to its slot.
#[derive(Debug, Clone, Default)]
pub struct UploadGate {
    validator: PhotoValidator,
}

impl UploadGate {
    pub fn new(validator: PhotoValidator) -> Self {
        Self { validator }
    }

    pub fn validator(&self) -> &PhotoValidator {
        &self.validator
    }

    /// Validate `file` and encode it for `slot`.
    ///
    /// Errors leave nothing behind; encoding runs on the blocking pool.
    pub async fn submit_photo(
        &self,
        slot: PhotoSlot,
        file: PhotoFile,
    ) -> Result<UploadedPhoto, UploadError> {
        if let Err(err) = self
            .validator
            .validate_all(&file.content_type, file.bytes.len())
        {
            tracing::debug!(
                slot = slot.number(),
                file_name = %file.file_name,
                content_type = %file.content_type,
                size = file.bytes.len(),
                error = %err,
                "Photo rejected"
            );
            return Err(err.into());
        }

        let content_type = file.content_type.trim().to_lowercase();
        let size = file.bytes.len();
        let bytes = file.bytes;
        let media_type = content_type.clone();
        let encoded = tokio::task::spawn_blocking(move || DataUri::encode(&media_type, &bytes))
            .await
            .map_err(|e| UploadError::Encode(e.to_string()))?;

        tracing::debug!(
            slot = slot.number(),
            file_name = %file.file_name,
            content_type = %content_type,
            size,
            "Photo accepted"
        );

        Ok(UploadedPhoto {
            slot,
            file_name: file.file_name,
            content_type,
            size,
            encoded,
        })
    }

    /// Read a photo from disk and submit it.
    ///
    /// Type (from the extension) and size (from metadata) are checked before the
    /// file is read, so oversized files are never loaded into memory.
    pub async fn open_and_submit(
        &self,
        slot: PhotoSlot,
        path: &Path,
    ) -> Result<UploadedPhoto, UploadError> {
        let read_err = |source: io::Error| UploadError::Read {
            path: path.to_path_buf(),
            source,
        };

        let metadata = tokio::fs::metadata(path).await.map_err(read_err)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let declared = content_type_for_extension(&file_name);
        if let Some(content_type) = declared {
            self.validator.validate_content_type(content_type)?;
        }
        let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        self.validator.validate_file_size(size)?;

        let data = tokio::fs::read(path).await.map_err(read_err)?;
        let content_type = declared
            .or_else(|| detect_media_type(&data))
            .unwrap_or("application/octet-stream");

        self.submit_photo(slot, PhotoFile::new(file_name, content_type, data))
            .await
    }
}
