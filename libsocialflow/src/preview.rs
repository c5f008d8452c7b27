//! Per-platform post previews
//!
//! A preview is a plain description of how the post would look on one
//! platform: the caption, the media layout and the limit checks. Rendering it
//! to a screen is up to the caller.

use serde::Serialize;

use crate::composer::ComposerState;
use crate::platforms::PlatformSpec;
use crate::types::{MediaItem, Platform};

const TWEET_PLACEHOLDER: &str = "Your tweet content...";
const POST_PLACEHOLDER: &str = "Post Preview";

/// How the media of a preview is arranged
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum MediaLayout {
    /// No media to show
    None,
    /// All items in a grid
    Grid { columns: u8, items: Vec<MediaItem> },
    /// A single full-width item
    Hero { item: MediaItem },
    /// The platform cannot publish without media and there is none
    MediaRequired,
}

impl MediaLayout {
    /// Media items visible in this layout
    pub fn items(&self) -> &[MediaItem] {
        match self {
            MediaLayout::Grid { items, .. } => items,
            MediaLayout::Hero { item } => std::slice::from_ref(item),
            MediaLayout::None | MediaLayout::MediaRequired => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformPreview {
    pub platform: Platform,
    /// Caption text, or the platform placeholder when the content is empty
    pub text: String,
    pub is_placeholder: bool,
    pub media: MediaLayout,
    /// Length in Unicode scalar values
    pub char_count: usize,
    pub max_chars: usize,
    pub over_limit: bool,
    /// Ids of media items the platform does not accept
    pub unsupported_media: Vec<String>,
    pub color: &'static str,
}

/// Build the preview of `content` and `media` on `platform`
pub fn render(platform: Platform, content: &str, media: &[MediaItem]) -> PlatformPreview {
    let spec: &PlatformSpec = platform.spec();

    let placeholder = match platform {
        Platform::Twitter => TWEET_PLACEHOLDER,
        _ => POST_PLACEHOLDER,
    };
    let is_placeholder = content.is_empty();
    let text = if is_placeholder { placeholder } else { content }.to_string();

    let layout = match platform {
        Platform::Twitter if media.is_empty() => MediaLayout::None,
        Platform::Twitter => MediaLayout::Grid {
            columns: if media.len() > 1 { 2 } else { 1 },
            items: media.to_vec(),
        },
        Platform::Instagram => match media.first() {
            Some(first) => MediaLayout::Hero {
                item: first.clone(),
            },
            None => MediaLayout::MediaRequired,
        },
        _ if media.is_empty() => MediaLayout::None,
        _ => MediaLayout::Grid {
            columns: 2,
            items: media.to_vec(),
        },
    };

    let char_count = content.chars().count();
    PlatformPreview {
        platform,
        text,
        is_placeholder,
        media: layout,
        char_count,
        max_chars: spec.max_chars,
        over_limit: char_count > spec.max_chars,
        unsupported_media: media
            .iter()
            .filter(|m| !spec.accepts(m.kind))
            .map(|m| m.id.clone())
            .collect(),
        color: spec.color,
    }
}

/// Preview of the draft on its preview platform, if one is set
pub fn render_draft(state: &ComposerState) -> Option<PlatformPreview> {
    let platform = state.preview_platform()?;
    Some(render(
        platform,
        state.resolved_content(platform),
        state.resolved_media(platform),
    ))
}
