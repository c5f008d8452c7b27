//! Actions for the reducer pattern
//!
//! Every edit of the draft is expressed as an [`Action`]. Front ends turn
//! their input events into actions and feed them to
//! [`reduce`](super::reducer::reduce).

use crate::types::{CaptionVariant, MediaItem, Platform, SocialAccount};

/// Edits that can be applied to a [`ComposerState`](super::state::ComposerState)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // === Content ===
    /// Text changed in the editor (routes to master or override)
    SetContent(String),

    /// Attach media to the current edit target
    AddMedia(MediaItem),

    /// Remove media by id from the current edit target
    RemoveMedia(String),

    /// Simulated upload advanced
    UploadProgress { media_id: String, percent: u8 },

    // === Platforms ===
    TogglePlatform(Platform),

    /// Replace the targets with every connected account's platform
    SelectAllConnected(Vec<SocialAccount>),

    SetPreview(Platform),

    // === Tuning ===
    EnterTuning,
    LeaveTuning,

    // === Schedule ===
    SetScheduleDate(Option<String>),
    SetScheduleTime(Option<String>),

    // === Generator panels ===
    ToggleImageGenerator,
    ToggleVideoGenerator,
    SetImagePrompt(String),
    AppendImageStyle(String),
    SetVideoPrompt(String),
    VideoProgress(Option<String>),
    ShowSuggestions(Vec<CaptionVariant>),
    ApplySuggestion(usize),
    ClosePanels,

    // === Errors ===
    ShowError(String),
    DismissError,

    /// Throw the draft away
    Reset,
}
