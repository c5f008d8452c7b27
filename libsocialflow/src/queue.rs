//! Destinations for finalized posts
//!
//! A [`PostSink`] receives every post the composer finalizes. [`PostQueue`]
//! is the in-memory sink: scheduled posts go to the queue, drafts to the
//! draft list. The publishing collaborator later replaces scheduled posts
//! with their published or failed successors.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::types::{EngagementMetrics, Platform, Post, PostStatus};
use crate::{Result, SocialFlowError};

/// Receives finalized posts
#[async_trait]
pub trait PostSink: Send + Sync {
    async fn accept(&self, post: Post) -> Result<()>;
}

#[derive(Debug, Default)]
struct QueueState {
    scheduled: Vec<Post>,
    drafts: Vec<Post>,
}

/// In-memory scheduled queue and draft list
///
/// Cheap to clone; clones share the same posts.
#[derive(Debug, Clone, Default)]
pub struct PostQueue {
    state: Arc<RwLock<QueueState>>,
}

impl PostQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A queue holding two upcoming demo posts
    pub fn with_demo_posts() -> Self {
        let queue = Self::new();
        {
            let mut state = queue.write();
            state.scheduled = demo_posts(Utc::now());
        }
        queue
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, QueueState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, QueueState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Scheduled (and since published or failed) posts, soonest first
    ///
    /// Posts without a scheduled time come last, in insertion order.
    pub fn scheduled(&self) -> Vec<Post> {
        let mut posts = self.read().scheduled.clone();
        posts.sort_by_key(|p| (p.scheduled_at.is_none(), p.scheduled_at));
        posts
    }

    /// Saved drafts in the order they were saved
    pub fn drafts(&self) -> Vec<Post> {
        self.read().drafts.clone()
    }

    pub fn get(&self, id: &str) -> Option<Post> {
        let state = self.read();
        state
            .scheduled
            .iter()
            .chain(state.drafts.iter())
            .find(|p| p.id == id)
            .cloned()
    }

    /// Remove a post from the queue or the draft list
    ///
    /// Returns the removed post, if any.
    pub fn delete(&self, id: &str) -> Option<Post> {
        let mut state = self.write();
        let removed = take_by_id(&mut state.scheduled, id).or_else(|| take_by_id(&mut state.drafts, id));
        if removed.is_some() {
            debug!(post_id = id, "Deleted post");
        }
        removed
    }

    /// Replace a scheduled post with its published successor
    pub fn mark_published(&self, id: &str, metrics: EngagementMetrics, at: DateTime<Utc>) -> Result<Post> {
        self.replace_scheduled(id, |post| post.published(at, metrics))
    }

    /// Replace a scheduled post with its failed successor
    pub fn mark_failed(&self, id: &str) -> Result<Post> {
        self.replace_scheduled(id, Post::failed)
    }

    fn replace_scheduled<F>(&self, id: &str, successor: F) -> Result<Post>
    where
        F: FnOnce(Post) -> Result<Post>,
    {
        let mut state = self.write();
        let slot = state
            .scheduled
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| SocialFlowError::InvalidInput(format!("No scheduled post with id {}", id)))?;

        let next = successor(slot.clone()).map_err(|e| {
            warn!(post_id = id, error = %e, "Rejected status change");
            e
        })?;
        info!(post_id = id, status = %next.status, "Post status changed");
        *slot = next.clone();
        Ok(next)
    }
}

fn take_by_id(posts: &mut Vec<Post>, id: &str) -> Option<Post> {
    let index = posts.iter().position(|p| p.id == id)?;
    Some(posts.remove(index))
}

#[async_trait]
impl PostSink for PostQueue {
    async fn accept(&self, post: Post) -> Result<()> {
        let mut state = self.write();
        match post.status {
            PostStatus::Draft => state.drafts.push(post),
            PostStatus::Scheduled => state.scheduled.push(post),
            other => {
                return Err(SocialFlowError::InvalidInput(format!(
                    "Only drafts and scheduled posts can be queued, got {}",
                    other
                )))
            }
        }
        Ok(())
    }
}

fn demo_posts(now: DateTime<Utc>) -> Vec<Post> {
    let scheduled = |id: &str, content: &str, platforms: Vec<Platform>, ahead: Duration| {
        let mut post = Post::new(content.to_string(), Vec::new(), platforms, PostStatus::Scheduled);
        post.id = id.to_string();
        post.scheduled_at = Some(now + ahead);
        post
    };

    vec![
        scheduled(
            "s1",
            "Excited to announce our Q3 partnership with global tech giants! Stay tuned. #TechNews",
            vec![Platform::LinkedIn, Platform::Twitter],
            Duration::days(1),
        ),
        scheduled(
            "s2",
            "Customer spotlight of the week: How Sarah improved her workflow by 40%.",
            vec![Platform::Facebook],
            Duration::days(2),
        ),
    ]
}
