//! Static platform catalogue
//!
//! Each [`Platform`] carries immutable metadata: its character limit, the
//! media kinds it accepts and its brand colour. The catalogue is a set of
//! constants, so it is available without any initialization.
//!
//! # Examples
//!
//! ```
//! use libsocialflow::platforms::spec;
//! use libsocialflow::types::{MediaKind, Platform};
//!
//! let twitter = spec(Platform::Twitter);
//! assert_eq!(twitter.max_chars, 280);
//! assert!(twitter.accepts(MediaKind::Gif));
//! assert!(!spec(Platform::Pinterest).accepts(MediaKind::Video));
//! ```

use crate::types::{MediaKind, Platform};

/// Immutable per-platform metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformSpec {
    pub platform: Platform,
    /// Maximum number of characters in a post
    pub max_chars: usize,
    /// Media kinds the platform will render
    pub media_kinds: &'static [MediaKind],
    /// Brand colour as a hex string
    pub color: &'static str,
}

impl PlatformSpec {
    pub fn accepts(&self, kind: MediaKind) -> bool {
        self.media_kinds.contains(&kind)
    }

    /// Whether media is mandatory for a post to render properly
    pub fn requires_media(&self) -> bool {
        matches!(self.platform, Platform::Instagram)
    }
}

const IMAGE_VIDEO: &[MediaKind] = &[MediaKind::Image, MediaKind::Video];
const IMAGE_VIDEO_GIF: &[MediaKind] = &[MediaKind::Image, MediaKind::Video, MediaKind::Gif];
const VIDEO_ONLY: &[MediaKind] = &[MediaKind::Video];
const IMAGE_ONLY: &[MediaKind] = &[MediaKind::Image];

const LINKEDIN: PlatformSpec = PlatformSpec {
    platform: Platform::LinkedIn,
    max_chars: 3000,
    media_kinds: IMAGE_VIDEO,
    color: "#0077b5",
};

const TWITTER: PlatformSpec = PlatformSpec {
    platform: Platform::Twitter,
    max_chars: 280,
    media_kinds: IMAGE_VIDEO_GIF,
    color: "#1DA1F2",
};

const FACEBOOK: PlatformSpec = PlatformSpec {
    platform: Platform::Facebook,
    max_chars: 63206,
    media_kinds: IMAGE_VIDEO,
    color: "#1877F2",
};

const INSTAGRAM: PlatformSpec = PlatformSpec {
    platform: Platform::Instagram,
    max_chars: 2200,
    media_kinds: IMAGE_VIDEO,
    color: "#E4405F",
};

const TIKTOK: PlatformSpec = PlatformSpec {
    platform: Platform::TikTok,
    max_chars: 2200,
    media_kinds: VIDEO_ONLY,
    color: "#000000",
};

const YOUTUBE: PlatformSpec = PlatformSpec {
    platform: Platform::YouTube,
    max_chars: 5000,
    media_kinds: VIDEO_ONLY,
    color: "#FF0000",
};

const PINTEREST: PlatformSpec = PlatformSpec {
    platform: Platform::Pinterest,
    max_chars: 500,
    media_kinds: IMAGE_ONLY,
    color: "#BD081C",
};

/// Look up the metadata for a platform
pub fn spec(platform: Platform) -> &'static PlatformSpec {
    match platform {
        Platform::LinkedIn => &LINKEDIN,
        Platform::Twitter => &TWITTER,
        Platform::Facebook => &FACEBOOK,
        Platform::Instagram => &INSTAGRAM,
        Platform::TikTok => &TIKTOK,
        Platform::YouTube => &YOUTUBE,
        Platform::Pinterest => &PINTEREST,
    }
}

impl Platform {
    /// Shorthand for [`spec`]
    pub fn spec(self) -> &'static PlatformSpec {
        spec(self)
    }
}
