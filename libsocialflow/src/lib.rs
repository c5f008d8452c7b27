//! SocialFlow - multi-platform post composer core
//!
//! Compose one post for several social platforms at once: write a master
//! version, tune it per platform, preview it, ask a generative service for
//! captions, summaries, images and videos, then schedule it or save it as a
//! draft.

pub mod accounts;
pub mod composer;
pub mod config;
pub mod error;
pub mod events;
pub mod generation;
pub mod logging;
pub mod platforms;
pub mod preview;
pub mod queue;
pub mod scheduling;
pub mod types;
pub mod uploads;
pub mod validation;

// Re-export commonly used types
pub use accounts::AccountRegistry;
pub use composer::{Action, ComposerSession, ComposerState, GenerationOutcome, PostAction};
pub use config::Config;
pub use error::{ConfigError, GenerationError, Result, SocialFlowError};
pub use events::{Event, EventBus};
pub use generation::{ContentGenerator, GeminiClient, MockGenerator};
pub use queue::{PostQueue, PostSink};
pub use scheduling::ScheduleZone;
pub use types::{MediaItem, MediaKind, Platform, Post, PostStatus, SocialAccount};
