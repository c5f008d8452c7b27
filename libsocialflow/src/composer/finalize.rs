//! Turning the draft into a [`Post`]

use std::fmt;

use tracing::{info, instrument};

use super::state::ComposerState;
use crate::scheduling::ScheduleZone;
use crate::types::{Post, PostStatus};
use crate::{Result, SocialFlowError};

/// The two ways a draft can be finalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostAction {
    /// Queue the post; the draft is discarded afterwards
    Schedule,
    /// Keep a copy in the draft list; the draft stays as it is
    SaveDraft,
}

impl PostAction {
    /// Status every target platform receives
    pub fn status(self) -> PostStatus {
        match self {
            PostAction::Schedule => PostStatus::Scheduled,
            PostAction::SaveDraft => PostStatus::Draft,
        }
    }
}

impl fmt::Display for PostAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostAction::Schedule => write!(f, "schedule"),
            PostAction::SaveDraft => write!(f, "save-draft"),
        }
    }
}

/// Build a post from the draft
///
/// - every target platform gets the action's status
/// - overrides are attached only while tuning is on, and only for targets
/// - a scheduled timestamp is set only when scheduling with both date and time
/// - a successful schedule resets the draft; saving a draft leaves it untouched
///
/// # Errors
///
/// - `ValidationBlocked` when no platform is targeted
/// - `InvalidInput` when the schedule date or time cannot be parsed
///
/// The draft is unchanged on error.
#[instrument(skip(state), fields(targets = state.targets().len(), tuning = state.is_tuning()))]
pub fn finalize(state: &mut ComposerState, action: PostAction, zone: &ScheduleZone) -> Result<Post> {
    if state.targets().is_empty() {
        return Err(SocialFlowError::ValidationBlocked(
            "Select at least one platform before posting".to_string(),
        ));
    }

    let scheduled_at = match action {
        PostAction::Schedule => state.schedule().resolve(zone)?,
        PostAction::SaveDraft => None,
    };

    let mut post = Post::new(
        state.content().to_string(),
        state.media().to_vec(),
        state.targets().to_vec(),
        action.status(),
    );
    post.scheduled_at = scheduled_at;
    if state.is_tuning() {
        post.overrides = Some(state.overrides().to_post_overrides(state.targets()));
    }

    info!(
        post_id = %post.id,
        status = %post.status,
        platforms = ?post.platforms,
        scheduled_at = ?post.scheduled_at,
        overrides = post.overrides.as_ref().map(|o| o.len()).unwrap_or(0),
        "Finalized post"
    );

    if action == PostAction::Schedule {
        state.reset();
    }

    Ok(post)
}
