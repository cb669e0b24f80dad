//! SnapTogether API Library
//!
//! This crate provides the generation endpoint, its error mapping, and application setup.

mod handlers;
pub mod setup;
mod telemetry;

// Public modules
pub mod error;
pub mod state;

// Re-exports
pub use error::{ErrorDetailPolicy, ErrorResponse, HttpAppError, ValidatedJson};
pub use state::{AppState, CredentialSource};
