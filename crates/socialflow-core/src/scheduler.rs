//! Due-post sweep and the per-workspace queue.
//!
//! The sweep is caller-triggered and sequential. Each post is handled under
//! its tenant lock and re-read first, so a post published by a concurrent
//! "publish now" is skipped rather than published twice.

use chrono::{DateTime, Utc};
use serde::Serialize;
use socialflow_org::GatedAction;
use socialflow_rbac::{Action, ResourceType};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::access::{load_tenant, Actor};
use crate::error::CoreResult;
use crate::post::{Post, PostStatus};
use crate::publisher::{Attempt, Publisher};
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Published,
    Failed,
    Skipped,
}

/// Per-post result of a sweep.
#[derive(Debug, Clone, Serialize)]
pub struct PostRun {
    pub post_id: Uuid,
    pub tenant_id: Uuid,
    pub status: RunStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessReport {
    /// Posts that reached a connector or were rejected before one
    pub attempted: usize,
    pub published: usize,
    pub failed: usize,
    pub skipped: usize,
    pub results: Vec<PostRun>,
}

impl ProcessReport {
    fn record(&mut self, post: &Post, status: RunStatus, error: Option<String>, retryable: Option<bool>) {
        match status {
            RunStatus::Published => {
                self.attempted += 1;
                self.published += 1;
            }
            RunStatus::Failed => {
                self.attempted += 1;
                self.failed += 1;
            }
            RunStatus::Skipped => self.skipped += 1,
        }
        self.results.push(PostRun {
            post_id: post.id,
            tenant_id: post.tenant_id,
            status,
            error,
            retryable,
        });
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueEntry {
    #[serde(flatten)]
    pub post: Post,
    pub due_at: Option<DateTime<Utc>>,
    pub is_due: bool,
}

/// Scheduled and retrying posts of one workspace.
#[derive(Debug, Clone, Serialize)]
pub struct QueueView {
    pub posts: Vec<QueueEntry>,
    pub total: usize,
    pub due: usize,
    pub retrying: usize,
}

#[derive(Clone)]
pub struct Scheduler {
    store: Arc<dyn Store>,
    publisher: Publisher,
}

fn by_due_time(posts: &mut [Post]) {
    posts.sort_by_key(|p| (p.due_at(), p.id));
}

impl Scheduler {
    pub fn new(store: Arc<dyn Store>, publisher: Publisher) -> Self {
        Self { store, publisher }
    }

    /// Posts due at `now`, earliest first, ties by id. Read-only.
    pub async fn list_due(&self, now: DateTime<Utc>, tenant_id: Option<Uuid>) -> CoreResult<Vec<Post>> {
        let mut due: Vec<Post> = self
            .store
            .due_posts(now)
            .await?
            .into_iter()
            .filter(|p| p.is_due(now))
            .filter(|p| tenant_id.map_or(true, |t| p.tenant_id == t))
            .collect();
        by_due_time(&mut due);
        Ok(due)
    }

    pub async fn queue(&self, actor: &Actor, now: DateTime<Utc>) -> CoreResult<QueueView> {
        actor.permit(ResourceType::Scheduler, Action::Read, GatedAction::ReadContent, now)?;

        let mut posts: Vec<Post> = self
            .store
            .list_posts(actor.tenant_id())
            .await?
            .into_iter()
            .filter(|p| p.due_at().is_some())
            .collect();
        by_due_time(&mut posts);

        let entries: Vec<QueueEntry> = posts
            .into_iter()
            .map(|post| QueueEntry {
                due_at: post.due_at(),
                is_due: post.is_due(now),
                post,
            })
            .collect();
        Ok(QueueView {
            total: entries.len(),
            due: entries.iter().filter(|e| e.is_due).count(),
            retrying: entries
                .iter()
                .filter(|e| e.post.status == PostStatus::Failed)
                .count(),
            posts: entries,
        })
    }

    /// Sweep the caller's workspace.
    pub async fn process_for(&self, actor: &Actor, now: DateTime<Utc>) -> CoreResult<ProcessReport> {
        actor.permit(ResourceType::Scheduler, Action::Execute, GatedAction::RunScheduler, now)?;
        self.process(now, Some(actor.tenant_id())).await
    }

    /// Publish every due post, optionally limited to one workspace.
    ///
    /// A connector error marks that post failed and the sweep moves on.
    #[instrument(skip(self))]
    pub async fn process(&self, now: DateTime<Utc>, tenant_id: Option<Uuid>) -> CoreResult<ProcessReport> {
        let due = self.list_due(now, tenant_id).await?;
        let mut report = ProcessReport::default();

        for candidate in due {
            let _guard = self.store.lock_tenant(candidate.tenant_id).await;

            let mut post = match self.store.get_post(candidate.tenant_id, candidate.id).await? {
                Some(post) if post.is_due(now) => post,
                _ => {
                    report.record(&candidate, RunStatus::Skipped, Some("no longer due".to_string()), None);
                    continue;
                }
            };

            let tenant = load_tenant(&*self.store, post.tenant_id).await?;
            if tenant.is_expired(now) {
                report.record(
                    &post,
                    RunStatus::Skipped,
                    Some("subscription expired".to_string()),
                    None,
                );
                continue;
            }

            if let Err(e) = post.can_publish() {
                post.mark_rejected(e.to_string(), now);
                self.store.save_post(post.clone()).await?;
                report.record(&post, RunStatus::Failed, Some(e.to_string()), Some(false));
                continue;
            }

            match self.publisher.attempt(&mut post, now).await? {
                Attempt::Published => report.record(&post, RunStatus::Published, None, None),
                Attempt::Failed(error) => {
                    warn!(post_id = %post.id, error = %error, "Scheduled post failed");
                    report.record(
                        &post,
                        RunStatus::Failed,
                        Some(error.to_string()),
                        Some(error.is_retryable()),
                    );
                }
            }
        }

        info!(
            attempted = report.attempted,
            published = report.published,
            failed = report.failed,
            skipped = report.skipped,
            "Scheduler sweep finished"
        );
        Ok(report)
    }
}
