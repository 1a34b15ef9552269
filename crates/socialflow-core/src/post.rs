//! Post model and its publish state machine
//!
//! ```text
//! draft ──schedule(future)──→ scheduled ──due & process──→ published
//!   │                            │
//!   └────────publish now─────────┴──────────────────────→ published
//!                                 connector error ──→ failed
//! ```
//!
//! Nothing leaves `published`. A retryable failure stays due and is picked up
//! again by the next sweep; a permanent failure is terminal until the post is
//! edited and rescheduled or published by hand.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use socialflow_connectors::{Platform, PlatformOutcome, PublishError, PublishRequest};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::error::{ConflictKind, CoreError, CoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Published,
    Failed,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Scheduled => "scheduled",
            PostStatus::Published => "published",
            PostStatus::Failed => "failed",
        }
    }
}

/// Outcome of a successful publish across all target platforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishResult {
    pub outcomes: Vec<PlatformOutcome>,
    pub total_reach: u64,
}

impl PublishResult {
    pub fn new(outcomes: Vec<PlatformOutcome>) -> Self {
        let total_reach = outcomes.iter().map(|o| o.reach).sum();
        Self {
            outcomes,
            total_reach,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFailure {
    pub message: String,
    pub code: String,
    pub retryable: bool,

    /// Platform whose connector failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,

    pub failed_at: DateTime<Utc>,
}

/// Fields supplied when creating a post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPost {
    #[serde(default)]
    pub title: String,
    pub caption: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub platforms: BTreeSet<Platform>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Partial update; absent fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub caption: Option<String>,
    pub hashtags: Option<Vec<String>>,
    pub platforms: Option<BTreeSet<Platform>>,
    pub image_url: Option<String>,

    /// Move to this time (must be in the future)
    pub scheduled_at: Option<DateTime<Utc>>,

    /// Drop the schedule and return to draft
    #[serde(default)]
    pub unschedule: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub caption: String,

    /// In display order
    pub hashtags: Vec<String>,

    pub platforms: BTreeSet<Platform>,
    pub image_url: Option<String>,
    pub status: PostStatus,
    pub scheduled_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<PublishResult>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<PostFailure>,

    /// Publish attempts so far
    pub attempts: u32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Create a post. It is `scheduled` only when `scheduled_at` lies in the
    /// future; a past or present timestamp is dropped and the post is a draft.
    pub fn new(tenant_id: Uuid, author_id: Uuid, input: NewPost, now: DateTime<Utc>) -> CoreResult<Self> {
        if input.caption.trim().is_empty() {
            return Err(CoreError::invalid("caption must not be empty"));
        }

        let scheduled_at = input.scheduled_at.filter(|at| *at > now);
        let status = if scheduled_at.is_some() {
            PostStatus::Scheduled
        } else {
            PostStatus::Draft
        };

        Ok(Self {
            id: Uuid::now_v7(),
            tenant_id,
            author_id,
            title: input.title,
            caption: input.caption,
            hashtags: input.hashtags,
            platforms: input.platforms,
            image_url: input.image_url,
            status,
            scheduled_at,
            result: None,
            failure: None,
            attempts: 0,
            created_at: now,
            updated_at: now,
            published_at: None,
        })
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    fn ensure_editable(&self) -> CoreResult<()> {
        if self.is_published() {
            return Err(ConflictKind::AlreadyPublished.into());
        }
        Ok(())
    }

    /// Schedule for `when`, which must be strictly after `now`.
    pub fn schedule(&mut self, when: DateTime<Utc>, now: DateTime<Utc>) -> CoreResult<()> {
        self.ensure_editable()?;
        if when <= now {
            return Err(CoreError::InvalidSchedule(
                "scheduled time must be in the future".to_string(),
            ));
        }
        self.status = PostStatus::Scheduled;
        self.scheduled_at = Some(when);
        self.failure = None;
        self.updated_at = now;
        Ok(())
    }

    /// Apply an edit, then re-validate the schedule.
    pub fn apply(&mut self, update: PostUpdate, now: DateTime<Utc>) -> CoreResult<()> {
        self.ensure_editable()?;
        if update.scheduled_at.is_some() && update.unschedule {
            return Err(CoreError::invalid(
                "scheduled_at and unschedule are mutually exclusive",
            ));
        }
        if let Some(caption) = &update.caption {
            if caption.trim().is_empty() {
                return Err(CoreError::invalid("caption must not be empty"));
            }
        }

        let mut next = self.clone();
        if let Some(title) = update.title {
            next.title = title;
        }
        if let Some(caption) = update.caption {
            next.caption = caption;
        }
        if let Some(hashtags) = update.hashtags {
            next.hashtags = hashtags;
        }
        if let Some(platforms) = update.platforms {
            next.platforms = platforms;
        }
        if let Some(image_url) = update.image_url {
            next.image_url = Some(image_url).filter(|url| !url.is_empty());
        }

        if update.unschedule {
            next.status = PostStatus::Draft;
            next.scheduled_at = None;
            next.failure = None;
        } else if let Some(when) = update.scheduled_at {
            next.status = PostStatus::Scheduled;
            next.scheduled_at = Some(when);
            next.failure = None;
        }

        if next.status == PostStatus::Scheduled {
            match next.scheduled_at {
                Some(at) if at > now => {}
                _ => {
                    return Err(CoreError::InvalidSchedule(
                        "scheduled time must be in the future".to_string(),
                    ))
                }
            }
        }

        next.updated_at = now;
        *self = next;
        Ok(())
    }

    /// When the scheduler should consider this post.
    ///
    /// Retryable failures without a schedule become due at failure time.
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        match self.status {
            PostStatus::Scheduled => self.scheduled_at,
            PostStatus::Failed => match &self.failure {
                Some(failure) if failure.retryable => self.scheduled_at.or(Some(failure.failed_at)),
                _ => None,
            },
            PostStatus::Draft | PostStatus::Published => None,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due_at().is_some_and(|at| at <= now)
    }

    /// Whether a publish attempt may start from the current state.
    pub fn can_publish(&self) -> CoreResult<()> {
        self.ensure_editable()?;
        if self.platforms.is_empty() {
            return Err(CoreError::invalid("post has no target platforms"));
        }
        Ok(())
    }

    pub fn publish_request(&self, now: DateTime<Utc>) -> PublishRequest {
        PublishRequest::compose(self.id, &self.caption, &self.hashtags, self.image_url.clone(), now)
    }

    pub fn mark_published(&mut self, outcomes: Vec<PlatformOutcome>, now: DateTime<Utc>) {
        self.attempts += 1;
        self.status = PostStatus::Published;
        self.result = Some(PublishResult::new(outcomes));
        self.failure = None;
        self.published_at = Some(now);
        self.updated_at = now;
    }

    pub fn mark_failed(&mut self, error: &PublishError, platform: Option<Platform>, now: DateTime<Utc>) {
        self.attempts += 1;
        self.status = PostStatus::Failed;
        self.failure = Some(PostFailure {
            message: error.to_string(),
            code: error.error_code().to_string(),
            retryable: error.is_retryable(),
            platform,
            failed_at: now,
        });
        self.updated_at = now;
    }

    /// Record a failure that happened before any connector was called.
    pub fn mark_rejected(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        self.attempts += 1;
        self.status = PostStatus::Failed;
        self.failure = Some(PostFailure {
            message: message.into(),
            code: "INVALID_POST".to_string(),
            retryable: false,
            platform: None,
            failed_at: now,
        });
        self.updated_at = now;
    }
}
