//! Data models for the application
//!
//! Everything here is transient: photos, pose selections and results live in
//! memory for one session and are never persisted.

mod data_uri;
mod generation;
mod photo;
mod pose;

pub use data_uri::*;
pub use generation::*;
pub use photo::*;
pub use pose::*;
