//! Mock generator for tests and offline use
//!
//! Every operation succeeds with deterministic output unless a failure is
//! configured for it. Calls are recorded so tests can assert on them.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio::time::sleep;

use crate::error::GenerationError;
use crate::events::GenerationKind;
use crate::generation::{
    ContentGenerator, GenerationResult, ProgressFn, CAPTION_VARIANTS, VIDEO_POLLING,
    VIDEO_RENDERING, VIDEO_STARTING,
};
use crate::types::CaptionVariant;

/// Configuration for mock generator behavior
#[derive(Debug, Clone, Default)]
pub struct MockGeneratorConfig {
    /// Captions to return instead of the derived ones
    pub captions: Option<Vec<CaptionVariant>>,

    /// Summary to return instead of the truncated content
    pub summary: Option<String>,

    pub captions_error: Option<GenerationError>,
    pub summary_error: Option<GenerationError>,
    pub image_error: Option<GenerationError>,
    pub video_error: Option<GenerationError>,

    /// Delay before completing any operation
    pub delay: Duration,
}

/// Mock generator
#[derive(Debug, Clone, Default)]
pub struct MockGenerator {
    config: MockGeneratorConfig,
    calls: Arc<Mutex<Vec<(GenerationKind, String)>>>,
}

impl MockGenerator {
    pub fn new(config: MockGeneratorConfig) -> Self {
        Self {
            config,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A generator where every operation succeeds
    pub fn success() -> Self {
        Self::default()
    }

    /// A generator where every operation fails with `error`
    pub fn failing(error: GenerationError) -> Self {
        Self::new(MockGeneratorConfig {
            captions_error: Some(error.clone()),
            summary_error: Some(error.clone()),
            image_error: Some(error.clone()),
            video_error: Some(error),
            ..Default::default()
        })
    }

    pub fn with_captions(captions: Vec<CaptionVariant>) -> Self {
        Self::new(MockGeneratorConfig {
            captions: Some(captions),
            ..Default::default()
        })
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self::new(MockGeneratorConfig {
            delay,
            ..Default::default()
        })
    }

    /// Number of calls made for `kind`
    pub fn call_count(&self, kind: GenerationKind) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    /// Inputs of every call, in order
    pub fn calls(&self) -> Vec<(GenerationKind, String)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn record(&self, kind: GenerationKind, input: &str) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((kind, input.to_string()));

        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }
    }
}

fn fail_if(error: &Option<GenerationError>) -> GenerationResult<()> {
    match error {
        Some(err) => Err(err.clone()),
        None => Ok(()),
    }
}

#[async_trait]
impl ContentGenerator for MockGenerator {
    async fn captions(&self, topic: &str, platform_label: &str) -> GenerationResult<Vec<CaptionVariant>> {
        self.record(GenerationKind::Captions, topic).await;
        fail_if(&self.config.captions_error)?;

        if let Some(captions) = &self.config.captions {
            return Ok(captions.clone());
        }
        Ok((1..=CAPTION_VARIANTS)
            .map(|n| CaptionVariant {
                text: format!("{} ({} take {})", topic, platform_label, n),
                hashtags: vec![format!("#{}", platform_label.replace(' ', "").to_lowercase())],
            })
            .collect())
    }

    async fn summarize(&self, content: &str) -> GenerationResult<String> {
        self.record(GenerationKind::Summary, content).await;
        fail_if(&self.config.summary_error)?;

        if let Some(summary) = &self.config.summary {
            return Ok(summary.clone());
        }
        if content.chars().count() < 140 {
            return Ok(content.to_string());
        }
        let truncated: String = content.chars().take(136).collect();
        Ok(format!("{}...", truncated.trim_end()))
    }

    async fn image(&self, prompt: &str) -> GenerationResult<String> {
        self.record(GenerationKind::Image, prompt).await;
        fail_if(&self.config.image_error)?;
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(prompt)))
    }

    async fn video(&self, prompt: &str, progress: &ProgressFn) -> GenerationResult<String> {
        progress(VIDEO_STARTING);
        self.record(GenerationKind::Video, prompt).await;
        progress(VIDEO_RENDERING);
        fail_if(&self.config.video_error)?;
        progress(VIDEO_POLLING);
        Ok(format!("data:video/mp4;base64,{}", STANDARD.encode(prompt)))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
