//! Post CRUD, scheduling and "publish now".

use chrono::{DateTime, Utc};
use socialflow_events::{EventBus, PostEvent};
use socialflow_org::GatedAction;
use socialflow_rbac::{Action, ResourceType};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::access::{check, current_usage, emit, load_tenant, Actor};
use crate::error::{CoreError, CoreResult};
use crate::post::{NewPost, Post, PostStatus, PostUpdate};
use crate::publisher::{Attempt, Publisher};
use crate::store::Store;

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn Store>,
    events: Arc<dyn EventBus>,
    publisher: Publisher,
}

impl PostService {
    pub fn new(store: Arc<dyn Store>, events: Arc<dyn EventBus>, publisher: Publisher) -> Self {
        Self {
            store,
            events,
            publisher,
        }
    }

    /// Create a post, counted against `posts_per_month`.
    ///
    /// Empty hashtags fall back to the workspace defaults.
    #[instrument(skip(self, actor, input), fields(tenant_id = %actor.tenant_id()))]
    pub async fn create(&self, actor: &Actor, mut input: NewPost, now: DateTime<Utc>) -> CoreResult<Post> {
        actor.require(ResourceType::Post, Action::Create)?;

        let _guard = self.store.lock_tenant(actor.tenant_id()).await;
        let tenant = load_tenant(&*self.store, actor.tenant_id()).await?;
        let usage = current_usage(&*self.store, tenant.id, now).await?;
        check(&tenant, GatedAction::CreatePost, &usage, now)?;

        if input.hashtags.is_empty() {
            input.hashtags = tenant.settings.default_hashtags.clone();
        }
        let post = Post::new(tenant.id, actor.user_id, input, now)?;
        self.store.save_post(post.clone()).await?;
        drop(_guard);

        info!(post_id = %post.id, status = post.status.as_str(), "Post created");
        emit(
            &*self.events,
            PostEvent::Created {
                post_id: post.id,
                status: post.status.as_str().to_string(),
            }
            .to_event(post.tenant_id)
            .with_user(actor.user_id),
        )
        .await;
        Ok(post)
    }

    pub async fn get(&self, actor: &Actor, post_id: Uuid, now: DateTime<Utc>) -> CoreResult<Post> {
        actor.permit(ResourceType::Post, Action::Read, GatedAction::ReadContent, now)?;
        self.find(actor, post_id).await
    }

    async fn find(&self, actor: &Actor, post_id: Uuid) -> CoreResult<Post> {
        self.store
            .get_post(actor.tenant_id(), post_id)
            .await?
            .ok_or(CoreError::NotFound("Post"))
    }

    /// Newest first, optionally filtered by status.
    pub async fn list(
        &self,
        actor: &Actor,
        status: Option<PostStatus>,
        now: DateTime<Utc>,
    ) -> CoreResult<Vec<Post>> {
        actor.permit(ResourceType::Post, Action::Read, GatedAction::ReadContent, now)?;
        let posts = self.store.list_posts(actor.tenant_id()).await?;
        Ok(match status {
            Some(status) => posts.into_iter().filter(|p| p.status == status).collect(),
            None => posts,
        })
    }

    #[instrument(skip(self, actor, update), fields(tenant_id = %actor.tenant_id()))]
    pub async fn update(
        &self,
        actor: &Actor,
        post_id: Uuid,
        update: PostUpdate,
        now: DateTime<Utc>,
    ) -> CoreResult<Post> {
        actor.permit(ResourceType::Post, Action::Update, GatedAction::EditContent, now)?;

        let _guard = self.store.lock_tenant(actor.tenant_id()).await;
        let mut post = self.find(actor, post_id).await?;
        let rescheduled = update.scheduled_at.is_some();
        post.apply(update, now)?;
        self.store.save_post(post.clone()).await?;
        drop(_guard);

        if rescheduled {
            self.emit_scheduled(actor, &post).await;
        }
        Ok(post)
    }

    pub async fn delete(&self, actor: &Actor, post_id: Uuid, now: DateTime<Utc>) -> CoreResult<()> {
        actor.permit(ResourceType::Post, Action::Delete, GatedAction::EditContent, now)?;

        let _guard = self.store.lock_tenant(actor.tenant_id()).await;
        if !self.store.delete_post(actor.tenant_id(), post_id).await? {
            return Err(CoreError::NotFound("Post"));
        }
        drop(_guard);

        emit(
            &*self.events,
            PostEvent::Deleted { post_id }
                .to_event(actor.tenant_id())
                .with_user(actor.user_id),
        )
        .await;
        Ok(())
    }

    /// Schedule for `when`, strictly in the future.
    #[instrument(skip(self, actor), fields(tenant_id = %actor.tenant_id()))]
    pub async fn schedule(
        &self,
        actor: &Actor,
        post_id: Uuid,
        when: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> CoreResult<Post> {
        actor.permit(ResourceType::Post, Action::Update, GatedAction::EditContent, now)?;

        let _guard = self.store.lock_tenant(actor.tenant_id()).await;
        let mut post = self.find(actor, post_id).await?;
        post.schedule(when, now)?;
        self.store.save_post(post.clone()).await?;
        drop(_guard);

        self.emit_scheduled(actor, &post).await;
        Ok(post)
    }

    /// Publish immediately through the same connector path as the scheduler.
    ///
    /// A connector error is persisted on the post and returned as
    /// [`CoreError::Upstream`].
    #[instrument(skip(self, actor), fields(tenant_id = %actor.tenant_id()))]
    pub async fn publish_now(&self, actor: &Actor, post_id: Uuid, now: DateTime<Utc>) -> CoreResult<Post> {
        actor.permit(ResourceType::Post, Action::Publish, GatedAction::PublishPost, now)?;

        let _guard = self.store.lock_tenant(actor.tenant_id()).await;
        let mut post = self.find(actor, post_id).await?;
        post.can_publish()?;

        match self.publisher.attempt(&mut post, now).await? {
            Attempt::Published => Ok(post),
            Attempt::Failed(error) => Err(error.into()),
        }
    }

    async fn emit_scheduled(&self, actor: &Actor, post: &Post) {
        if let Some(scheduled_at) = post.scheduled_at {
            emit(
                &*self.events,
                PostEvent::Scheduled {
                    post_id: post.id,
                    scheduled_at,
                }
                .to_event(post.tenant_id)
                .with_user(actor.user_id),
            )
            .await;
        }
    }
}
