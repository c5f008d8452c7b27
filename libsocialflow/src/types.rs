//! Core types for SocialFlow

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, SocialFlowError};

/// Supported social platforms, in catalogue order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Platform {
    LinkedIn,
    Twitter,
    Facebook,
    Instagram,
    TikTok,
    YouTube,
    Pinterest,
}

impl Platform {
    /// Every platform in catalogue order
    pub const ALL: [Platform; 7] = [
        Platform::LinkedIn,
        Platform::Twitter,
        Platform::Facebook,
        Platform::Instagram,
        Platform::TikTok,
        Platform::YouTube,
        Platform::Pinterest,
    ];

    /// Display name (e.g. "LinkedIn", "YouTube")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LinkedIn => "LinkedIn",
            Self::Twitter => "Twitter",
            Self::Facebook => "Facebook",
            Self::Instagram => "Instagram",
            Self::TikTok => "TikTok",
            Self::YouTube => "YouTube",
            Self::Pinterest => "Pinterest",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = SocialFlowError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str().to_lowercase() == wanted)
            .ok_or_else(|| {
                SocialFlowError::InvalidInput(format!(
                    "Unknown platform: '{}'. Valid options: linkedin, twitter, facebook, instagram, tiktok, youtube, pinterest",
                    s
                ))
            })
    }
}

/// Lifecycle status of a post, and of each platform within it
///
/// Draft -> Scheduled -> Published, with Failed reachable from Scheduled.
/// Published and Failed are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostStatus {
    Draft,
    Scheduled,
    Published,
    Failed,
}

impl PostStatus {
    /// Whether a post in this status may move to `next`
    pub fn can_transition_to(self, next: PostStatus) -> bool {
        matches!(
            (self, next),
            (PostStatus::Draft, PostStatus::Scheduled)
                | (PostStatus::Scheduled, PostStatus::Published)
                | (PostStatus::Scheduled, PostStatus::Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PostStatus::Published | PostStatus::Failed)
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "Draft"),
            Self::Scheduled => write!(f, "Scheduled"),
            Self::Published => write!(f, "Published"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

// ============================================================================
// Media
// ============================================================================

/// Kind of media a post can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Gif,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
            Self::Gif => write!(f, "gif"),
        }
    }
}

/// A media attachment referenced by URL
///
/// `upload_progress` is only present while the simulated upload runs; it is
/// cleared once the item reaches 100%.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    pub url: String,
    pub kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_progress: Option<u8>,
}

impl MediaItem {
    /// Create an item that is about to be uploaded (progress 0)
    pub fn uploading(url: String, kind: MediaKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            url,
            kind,
            upload_progress: Some(0),
        }
    }

    /// Create an item that needs no upload
    pub fn ready(url: String, kind: MediaKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            url,
            kind,
            upload_progress: None,
        }
    }

    pub fn is_uploading(&self) -> bool {
        self.upload_progress.is_some()
    }

    /// Apply a progress report
    ///
    /// Progress never decreases and is capped at 100. Reaching 100 finalizes
    /// the item, which clears the progress field. Returns true if the item
    /// changed.
    pub fn apply_progress(&mut self, percent: u8) -> bool {
        let Some(current) = self.upload_progress else {
            return false;
        };
        let next = percent.min(100);
        if next >= 100 {
            self.upload_progress = None;
            return true;
        }
        if next > current {
            self.upload_progress = Some(next);
            return true;
        }
        false
    }
}

/// Per-platform divergence from the master content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostOverride {
    pub content: String,
    pub media: Vec<MediaItem>,
}

// ============================================================================
// Post
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngagementMetrics {
    pub likes: u64,
    pub shares: u64,
    pub comments: u64,
}

/// A finalized post
///
/// Posts are immutable once built. Lifecycle changes (publishing, failure)
/// produce a new value via [`Post::published`] and [`Post::failed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub content: String,
    pub media: Vec<MediaItem>,
    pub platforms: Vec<Platform>,
    pub status: PostStatus,
    pub platform_statuses: BTreeMap<Platform, PostStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<BTreeMap<Platform, PostOverride>>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<EngagementMetrics>,
}

impl Post {
    /// Build a post where every target platform shares the overall status
    pub fn new(
        content: String,
        media: Vec<MediaItem>,
        platforms: Vec<Platform>,
        status: PostStatus,
    ) -> Self {
        let platform_statuses = platforms.iter().map(|p| (*p, status)).collect();
        Self {
            id: Uuid::new_v4().to_string(),
            content,
            media,
            platforms,
            status,
            platform_statuses,
            overrides: None,
            created_at: Utc::now(),
            scheduled_at: None,
            published_at: None,
            metrics: None,
        }
    }

    /// Content a given platform will show
    pub fn content_for(&self, platform: Platform) -> &str {
        self.overrides
            .as_ref()
            .and_then(|o| o.get(&platform))
            .map(|o| o.content.as_str())
            .unwrap_or(&self.content)
    }

    /// Media a given platform will show
    pub fn media_for(&self, platform: Platform) -> &[MediaItem] {
        self.overrides
            .as_ref()
            .and_then(|o| o.get(&platform))
            .map(|o| o.media.as_slice())
            .unwrap_or(&self.media)
    }

    /// Successor of this post in `next` status, applied to every platform
    pub fn transition(self, next: PostStatus) -> Result<Post> {
        if !self.status.can_transition_to(next) {
            return Err(SocialFlowError::InvalidInput(format!(
                "Post {} cannot move from {} to {}",
                self.id, self.status, next
            )));
        }
        let platform_statuses = self.platforms.iter().map(|p| (*p, next)).collect();
        Ok(Post {
            status: next,
            platform_statuses,
            ..self
        })
    }

    /// Successor of a scheduled post once it has gone out
    pub fn published(self, at: DateTime<Utc>, metrics: EngagementMetrics) -> Result<Post> {
        let post = self.transition(PostStatus::Published)?;
        Ok(Post {
            published_at: Some(at),
            metrics: Some(metrics),
            ..post
        })
    }

    /// Successor of a scheduled post whose publication failed
    pub fn failed(self) -> Result<Post> {
        self.transition(PostStatus::Failed)
    }
}

// ============================================================================
// Accounts and generation results
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKind {
    Personal,
    Business,
}

/// A social account known to the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialAccount {
    pub id: String,
    pub platform: Platform,
    pub username: String,
    #[serde(default)]
    pub avatar: String,
    pub is_connected: bool,
    pub kind: AccountKind,
    #[serde(default)]
    pub followers: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
}

/// One caption proposal returned by the generative service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionVariant {
    pub text: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_from_str_case_insensitive() {
        assert_eq!("twitter".parse::<Platform>().unwrap(), Platform::Twitter);
        assert_eq!("YouTube".parse::<Platform>().unwrap(), Platform::YouTube);
        assert_eq!(" TIKTOK ".parse::<Platform>().unwrap(), Platform::TikTok);
    }

    #[test]
    fn test_platform_from_str_invalid() {
        let result = "myspace".parse::<Platform>();
        assert!(matches!(result, Err(SocialFlowError::InvalidInput(_))));
    }

    #[test]
    fn test_platform_serializes_as_display_name() {
        let json = serde_json::to_string(&Platform::LinkedIn).unwrap();
        assert_eq!(json, r#""LinkedIn""#);
    }

    #[test]
    fn test_post_new_assigns_status_to_every_platform() {
        let post = Post::new(
            "hello".to_string(),
            Vec::new(),
            vec![Platform::Twitter, Platform::Facebook],
            PostStatus::Scheduled,
        );

        assert_eq!(post.platform_statuses.len(), 2);
        assert_eq!(post.platform_statuses[&Platform::Twitter], PostStatus::Scheduled);
        assert_eq!(post.platform_statuses[&Platform::Facebook], PostStatus::Scheduled);
        assert!(Uuid::parse_str(&post.id).is_ok());
    }

    #[test]
    fn test_status_transitions() {
        assert!(PostStatus::Draft.can_transition_to(PostStatus::Scheduled));
        assert!(PostStatus::Scheduled.can_transition_to(PostStatus::Published));
        assert!(PostStatus::Scheduled.can_transition_to(PostStatus::Failed));

        assert!(!PostStatus::Draft.can_transition_to(PostStatus::Published));
        assert!(!PostStatus::Published.can_transition_to(PostStatus::Failed));
        assert!(!PostStatus::Failed.can_transition_to(PostStatus::Scheduled));
        assert!(PostStatus::Published.is_terminal());
    }

    #[test]
    fn test_published_sets_metrics_and_timestamp() {
        let post = Post::new(
            "launch".to_string(),
            Vec::new(),
            vec![Platform::LinkedIn],
            PostStatus::Scheduled,
        );
        let now = Utc::now();
        let metrics = EngagementMetrics {
            likes: 10,
            shares: 2,
            comments: 1,
        };

        let published = post.published(now, metrics).unwrap();
        assert_eq!(published.status, PostStatus::Published);
        assert_eq!(published.platform_statuses[&Platform::LinkedIn], PostStatus::Published);
        assert_eq!(published.published_at, Some(now));
        assert_eq!(published.metrics, Some(metrics));
    }

    #[test]
    fn test_draft_cannot_fail() {
        let post = Post::new("x".to_string(), Vec::new(), vec![Platform::Twitter], PostStatus::Draft);
        assert!(post.failed().is_err());
    }

    #[test]
    fn test_media_progress_is_monotonic_and_clears_at_100() {
        let mut item = MediaItem::uploading("https://cdn/x.png".to_string(), MediaKind::Image);
        assert!(item.apply_progress(40));
        assert_eq!(item.upload_progress, Some(40));

        assert!(!item.apply_progress(20));
        assert_eq!(item.upload_progress, Some(40));

        assert!(item.apply_progress(130));
        assert_eq!(item.upload_progress, None);

        // Finalized items ignore further reports
        assert!(!item.apply_progress(50));
        assert!(!item.is_uploading());
    }

    #[test]
    fn test_content_for_falls_back_to_master() {
        let mut post = Post::new(
            "master".to_string(),
            Vec::new(),
            vec![Platform::Twitter, Platform::LinkedIn],
            PostStatus::Draft,
        );
        let mut overrides = BTreeMap::new();
        overrides.insert(
            Platform::Twitter,
            PostOverride {
                content: "short".to_string(),
                media: Vec::new(),
            },
        );
        post.overrides = Some(overrides);

        assert_eq!(post.content_for(Platform::Twitter), "short");
        assert_eq!(post.content_for(Platform::LinkedIn), "master");
    }
}
