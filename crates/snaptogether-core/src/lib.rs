//! SnapTogether Core Library
//!
//! This crate provides the domain models, the photo workflow state machine,
//! error types and configuration shared by the service, the client library
//! and the CLI.

pub mod config;
pub mod error;
pub mod models;
pub mod workflow;

// Re-export commonly used types
pub use config::{Config, GenerationMode, ServiceConfig, UpstreamProvider};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    build_instruction, DataUri, DataUriError, GenerateParams, GenerateRequest, GenerateResponse,
    GenerationResult, MissingFields, PhotoSlot, Pose, UploadedPhoto,
};
pub use workflow::{
    derive_stage, failure_notice, present, transition, Command, MergeRequest, Presentation, SessionState,
    Transition, WorkflowError, WorkflowEvent, WorkflowStage,
};
