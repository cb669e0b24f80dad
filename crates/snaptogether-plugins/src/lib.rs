//! Upstream image describers
//!
//! One capability, `describe_images(photos, instruction) -> analysis`, with an
//! implementation per model provider. The generation service picks one by
//! configuration through the [`DescriberRegistry`].

pub mod describer;
pub mod prompt;
pub mod registry;

#[cfg(feature = "plugin-claude-vision")]
mod claude_vision;
#[cfg(feature = "plugin-gemini-vision")]
mod gemini_vision;

pub use describer::{
    DescribeContext, DescriberUsage, Description, ImageDescriber, InlineImage, UpstreamError,
};
pub use prompt::build_prompt;
pub use registry::{DescriberInfo, DescriberRegistry};

#[cfg(feature = "plugin-claude-vision")]
pub use claude_vision::{ClaudeVisionConfig, ClaudeVisionDescriber};
#[cfg(feature = "plugin-gemini-vision")]
pub use gemini_vision::{GeminiVisionConfig, GeminiVisionDescriber};
