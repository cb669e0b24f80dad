//! Upload and validation gate for SnapTogether photos.
//!
//! Files are checked against the allowed image types and the size limit
//! before they are read in full or encoded; nothing here touches the network.

pub mod upload;
pub mod validator;

pub use upload::{PhotoFile, UploadError, UploadGate};
pub use validator::{
    content_type_for_extension, detect_media_type, PhotoValidator, ValidationError,
    DEFAULT_ALLOWED_CONTENT_TYPES, DEFAULT_MAX_FILE_SIZE,
};
