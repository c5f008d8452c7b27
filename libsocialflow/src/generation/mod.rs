//! Generative services
//!
//! The composer asks an external model for captions, summaries, images and
//! videos through the [`ContentGenerator`] trait. [`GeminiClient`] talks to
//! the Gemini REST API; [`MockGenerator`] is a configurable stand-in for
//! tests and offline use.

use async_trait::async_trait;

use crate::error::GenerationError;
use crate::types::CaptionVariant;

pub mod gemini;
pub mod mock;

pub use gemini::GeminiClient;
pub use mock::{MockGenerator, MockGeneratorConfig};

/// Result type of every generator call
pub type GenerationResult<T> = std::result::Result<T, GenerationError>;

/// Callback receiving human-readable status lines during video generation
pub type ProgressFn = dyn Fn(&str) + Send + Sync;

/// Status lines reported while a video is produced
pub const VIDEO_STARTING: &str = "Initializing cinematic engine...";
pub const VIDEO_RENDERING: &str = "Veo is dreaming up your frames...";
pub const VIDEO_POLLING: &str = "Applying final motion details...";

/// Number of caption variations requested
pub const CAPTION_VARIANTS: usize = 3;

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Caption variations for `topic`, tailored to `platform_label`
    async fn captions(&self, topic: &str, platform_label: &str) -> GenerationResult<Vec<CaptionVariant>>;

    /// A shortened version of `content` (under 140 characters requested)
    async fn summarize(&self, content: &str) -> GenerationResult<String>;

    /// A `data:` URL holding an image generated from `prompt`
    async fn image(&self, prompt: &str) -> GenerationResult<String>;

    /// A media URL for a video generated from `prompt`
    ///
    /// `CredentialInvalid` means the key must be replaced before retrying.
    async fn video(&self, prompt: &str, progress: &ProgressFn) -> GenerationResult<String>;

    /// Name used in logs
    fn name(&self) -> &str;
}
