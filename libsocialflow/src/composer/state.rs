//! Draft state of one composing session
//!
//! Nothing here is a [`Post`](crate::types::Post) yet: the composer edits a
//! master content string, a master media list, the platform selection and
//! the per-platform overrides. A post is only built when the draft is
//! finalized (see `finalize.rs`).

use tracing::{debug, trace};

use super::content::{effective_content, effective_media, OverrideMap};
use super::selection::PlatformSelection;
use crate::scheduling::ScheduleInput;
use crate::types::{CaptionVariant, MediaItem, Platform, SocialAccount};

/// Exclusive panel/editor mode
///
/// Only one generator panel or suggestion list can be open at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditorMode {
    #[default]
    Idle,
    ImageGen {
        prompt: String,
    },
    VideoGen {
        prompt: String,
        /// Latest status line reported by the video service
        progress: Option<String>,
    },
    ReviewingSuggestions(Vec<CaptionVariant>),
}

/// Where edits currently land
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditTarget {
    Master,
    Platform(Platform),
    /// Tuning is on but no platform is previewed; edits are dropped
    Nothing,
}

/// Composer draft state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposerState {
    content: String,
    media: Vec<MediaItem>,
    selection: PlatformSelection,
    overrides: OverrideMap,
    tuning: bool,
    mode: EditorMode,
    schedule: ScheduleInput,
    error: Option<String>,
}

impl ComposerState {
    pub fn new() -> Self {
        Self::default()
    }

    // === Reads ===

    /// Master content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Master media
    pub fn media(&self) -> &[MediaItem] {
        &self.media
    }

    pub fn selection(&self) -> &PlatformSelection {
        &self.selection
    }

    pub fn targets(&self) -> &[Platform] {
        self.selection.targets()
    }

    pub fn preview_platform(&self) -> Option<Platform> {
        self.selection.preview()
    }

    pub fn overrides(&self) -> &OverrideMap {
        &self.overrides
    }

    pub fn is_tuning(&self) -> bool {
        self.tuning
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn schedule(&self) -> &ScheduleInput {
        &self.schedule
    }

    /// User-visible error message, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn edit_target(&self) -> EditTarget {
        match (self.tuning, self.selection.preview()) {
            (false, _) => EditTarget::Master,
            (true, Some(platform)) => EditTarget::Platform(platform),
            (true, None) => EditTarget::Nothing,
        }
    }

    /// Override-aware content regardless of tuning
    pub fn effective_content(&self, platform: Platform) -> &str {
        effective_content(platform, &self.content, &self.overrides)
    }

    /// Override-aware media regardless of tuning
    pub fn effective_media(&self, platform: Platform) -> &[MediaItem] {
        effective_media(platform, &self.media, &self.overrides)
    }

    /// Content a platform would publish right now
    ///
    /// Overrides only count while tuning is on, matching what finalization
    /// attaches to the post.
    pub fn resolved_content(&self, platform: Platform) -> &str {
        if self.tuning {
            self.effective_content(platform)
        } else {
            &self.content
        }
    }

    /// Media a platform would publish right now
    pub fn resolved_media(&self, platform: Platform) -> &[MediaItem] {
        if self.tuning {
            self.effective_media(platform)
        } else {
            &self.media
        }
    }

    /// Content shown in the editor for the current edit target
    pub fn current_content(&self) -> &str {
        match self.edit_target() {
            EditTarget::Platform(p) => self.effective_content(p),
            EditTarget::Master | EditTarget::Nothing => &self.content,
        }
    }

    /// Media shown in the editor for the current edit target
    pub fn current_media(&self) -> &[MediaItem] {
        match self.edit_target() {
            EditTarget::Platform(p) => self.effective_media(p),
            EditTarget::Master | EditTarget::Nothing => &self.media,
        }
    }

    /// Whether any media item, master or override copy, is still uploading
    pub fn has_pending_uploads(&self) -> bool {
        self.media.iter().any(MediaItem::is_uploading)
            || self
                .overrides
                .iter()
                .any(|(_, o)| o.media.iter().any(MediaItem::is_uploading))
    }

    /// Whether the master or any override still holds the item
    pub fn contains_media(&self, id: &str) -> bool {
        self.media.iter().any(|m| m.id == id)
            || self
                .overrides
                .iter()
                .any(|(_, o)| o.media.iter().any(|m| m.id == id))
    }

    // === Content edits ===

    /// Write content to the current edit target
    ///
    /// A first write to a platform creates its override, seeded with the
    /// master media.
    pub fn set_content(&mut self, value: String) {
        match self.edit_target() {
            EditTarget::Master => self.content = value,
            EditTarget::Platform(platform) => {
                self.overrides
                    .entry(platform, &self.content, &self.media)
                    .content = value;
            }
            EditTarget::Nothing => {
                debug!("Tuning without a preview platform, content edit ignored");
            }
        }
    }

    /// Append media to the current edit target
    pub fn add_media(&mut self, item: MediaItem) {
        match self.edit_target() {
            EditTarget::Master => self.media.push(item),
            EditTarget::Platform(platform) => {
                self.overrides
                    .entry(platform, &self.content, &self.media)
                    .media
                    .push(item);
            }
            EditTarget::Nothing => {
                debug!(media_id = %item.id, "Tuning without a preview platform, media ignored");
            }
        }
    }

    /// Remove a media item by id from the current edit target
    ///
    /// Returns true if an item was removed. Removing from a platform without
    /// an override creates one (seeded from master) that lacks the item.
    pub fn remove_media(&mut self, id: &str) -> bool {
        let list = match self.edit_target() {
            EditTarget::Master => &mut self.media,
            EditTarget::Platform(platform) => {
                &mut self
                    .overrides
                    .entry(platform, &self.content, &self.media)
                    .media
            }
            EditTarget::Nothing => return false,
        };
        let before = list.len();
        list.retain(|m| m.id != id);
        before != list.len()
    }

    /// Apply an upload progress report to every copy of a media item
    pub fn apply_upload_progress(&mut self, media_id: &str, percent: u8) -> bool {
        let mut changed = false;
        for item in self.media.iter_mut().filter(|m| m.id == media_id) {
            changed |= item.apply_progress(percent);
        }
        changed |= self.overrides.apply_progress(media_id, percent);
        trace!(media_id, percent, changed, "Upload progress");
        changed
    }

    // === Tuning ===

    /// Switch edits to the preview platform's override
    ///
    /// Seeds the override from the master if the platform has none yet.
    pub fn enter_tuning(&mut self) {
        if self.selection.targets().is_empty() {
            debug!("No target platforms, tuning not entered");
            return;
        }
        if !self.tuning {
            if let Some(platform) = self.selection.preview() {
                if self.overrides.seed(platform, &self.content, &self.media) {
                    debug!(%platform, "Seeded override from master");
                }
            }
        }
        self.tuning = true;
    }

    /// Return edits to the master; overrides are kept
    pub fn leave_tuning(&mut self) {
        self.tuning = false;
    }

    // === Selection ===

    pub fn toggle_platform(&mut self, platform: Platform) -> bool {
        self.selection.toggle(platform)
    }

    pub fn select_all_connected(&mut self, accounts: &[SocialAccount]) {
        self.selection.select_all_connected(accounts);
    }

    pub fn set_preview(&mut self, platform: Platform) {
        self.selection.set_preview(platform);
    }

    // === Schedule ===

    pub fn set_schedule_date(&mut self, date: Option<String>) {
        self.schedule.date = date;
    }

    pub fn set_schedule_time(&mut self, time: Option<String>) {
        self.schedule.time = time;
    }

    // === Editor mode ===

    /// Open the image generator, or close it if already open
    pub fn toggle_image_generator(&mut self) {
        self.mode = match self.mode {
            EditorMode::ImageGen { .. } => EditorMode::Idle,
            _ => EditorMode::ImageGen {
                prompt: String::new(),
            },
        };
    }

    /// Open the video generator, or close it if already open
    pub fn toggle_video_generator(&mut self) {
        self.mode = match self.mode {
            EditorMode::VideoGen { .. } => EditorMode::Idle,
            _ => EditorMode::VideoGen {
                prompt: String::new(),
                progress: None,
            },
        };
    }

    /// Set the prompt of the open generator panel
    ///
    /// Opens the matching panel if a different one is shown.
    pub fn set_image_prompt(&mut self, value: String) {
        match &mut self.mode {
            EditorMode::ImageGen { prompt } => *prompt = value,
            _ => self.mode = EditorMode::ImageGen { prompt: value },
        }
    }

    pub fn set_video_prompt(&mut self, value: String) {
        match &mut self.mode {
            EditorMode::VideoGen { prompt, .. } => *prompt = value,
            _ => {
                self.mode = EditorMode::VideoGen {
                    prompt: value,
                    progress: None,
                }
            }
        }
    }

    /// Append a style hint to the image prompt (`"<prompt>, <style> style"`)
    ///
    /// No-op if the prompt already mentions the style.
    pub fn append_image_style(&mut self, style: &str) {
        let current = match &self.mode {
            EditorMode::ImageGen { prompt } => prompt.clone(),
            _ => String::new(),
        };
        if current.contains(style) {
            return;
        }
        let next = if current.is_empty() {
            format!("{} style", style)
        } else {
            format!("{}, {} style", current, style)
        };
        self.set_image_prompt(next);
    }

    pub fn image_prompt(&self) -> Option<&str> {
        match &self.mode {
            EditorMode::ImageGen { prompt } => Some(prompt),
            _ => None,
        }
    }

    pub fn video_prompt(&self) -> Option<&str> {
        match &self.mode {
            EditorMode::VideoGen { prompt, .. } => Some(prompt),
            _ => None,
        }
    }

    /// Record a status line from the video service
    ///
    /// Ignored unless the video panel is open.
    pub fn set_video_progress(&mut self, message: Option<String>) {
        if let EditorMode::VideoGen { progress, .. } = &mut self.mode {
            *progress = message;
        }
    }

    pub fn show_suggestions(&mut self, variants: Vec<CaptionVariant>) {
        self.mode = EditorMode::ReviewingSuggestions(variants);
    }

    pub fn suggestions(&self) -> &[CaptionVariant] {
        match &self.mode {
            EditorMode::ReviewingSuggestions(variants) => variants,
            _ => &[],
        }
    }

    /// Write the chosen suggestion through `set_content` and close the list
    ///
    /// Returns false if no suggestion exists at `index`.
    pub fn apply_suggestion(&mut self, index: usize) -> bool {
        let Some(text) = self.suggestions().get(index).map(|v| v.text.clone()) else {
            return false;
        };
        self.set_content(text);
        self.mode = EditorMode::Idle;
        true
    }

    /// Close whatever panel is open
    pub fn close_panels(&mut self) {
        self.mode = EditorMode::Idle;
    }

    // === Errors ===

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Discard the draft after a successful schedule
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
