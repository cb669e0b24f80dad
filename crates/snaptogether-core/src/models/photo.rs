use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two upload slots. Serialized as `1` or `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PhotoSlot {
    First,
    Second,
}

impl PhotoSlot {
    pub const BOTH: [PhotoSlot; 2] = [PhotoSlot::First, PhotoSlot::Second];

    pub fn number(self) -> u8 {
        match self {
            PhotoSlot::First => 1,
            PhotoSlot::Second => 2,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(PhotoSlot::First),
            2 => Some(PhotoSlot::Second),
            _ => None,
        }
    }
}

impl TryFrom<u8> for PhotoSlot {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        PhotoSlot::from_number(value).ok_or_else(|| format!("invalid photo slot: {}", value))
    }
}

impl From<PhotoSlot> for u8 {
    fn from(slot: PhotoSlot) -> Self {
        slot.number()
    }
}

impl fmt::Display for PhotoSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "photo {}", self.number())
    }
}

/// A validated photo held by a session slot.
///
/// Only metadata and the data-URI encoding are kept; the encoding is what gets
/// previewed and transmitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedPhoto {
    pub slot: PhotoSlot,
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
    /// `data:<mime>;base64,<payload>`
    pub encoded: String,
}
