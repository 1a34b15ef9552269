//! Storage seam.
//!
//! Services talk to a [`Store`]; [`crate::MemoryStore`] is the in-process
//! implementation. Every creation path takes the tenant lock, recomputes usage
//! and writes before releasing it, so a backend only needs per-record writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use socialflow_org::{Invite, Membership, Tenant, UsageSnapshot, UserContext};
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use crate::account::SocialAccount;
use crate::content::{AiGeneration, LandingPage, Template};
use crate::error::CoreResult;
use crate::lead::Lead;
use crate::post::Post;
use crate::usage::MonthWindow;
use crate::user::User;

/// Held for the duration of a tenant-scoped check-then-write.
pub type TenantGuard = OwnedMutexGuard<()>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Serialize writers within one tenant.
    async fn lock_tenant(&self, tenant_id: Uuid) -> TenantGuard;

    // Users

    /// Fails with `DuplicateEmail` if the email is taken.
    async fn insert_user(&self, user: User) -> CoreResult<()>;
    async fn get_user(&self, id: Uuid) -> CoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> CoreResult<Option<User>>;

    async fn get_context(&self, user_id: Uuid) -> CoreResult<Option<UserContext>>;
    async fn save_context(&self, context: UserContext) -> CoreResult<()>;

    // Tenants and membership

    async fn save_tenant(&self, tenant: Tenant) -> CoreResult<()>;
    async fn get_tenant(&self, id: Uuid) -> CoreResult<Option<Tenant>>;

    async fn save_membership(&self, membership: Membership) -> CoreResult<()>;
    async fn get_membership(&self, tenant_id: Uuid, user_id: Uuid) -> CoreResult<Option<Membership>>;
    async fn list_memberships(&self, tenant_id: Uuid) -> CoreResult<Vec<Membership>>;
    async fn list_user_memberships(&self, user_id: Uuid) -> CoreResult<Vec<Membership>>;
    async fn delete_membership(&self, tenant_id: Uuid, user_id: Uuid) -> CoreResult<bool>;

    async fn save_invite(&self, invite: Invite) -> CoreResult<()>;
    async fn get_invite(&self, id: Uuid) -> CoreResult<Option<Invite>>;
    async fn list_invites(&self, tenant_id: Uuid) -> CoreResult<Vec<Invite>>;

    // Posts

    async fn save_post(&self, post: Post) -> CoreResult<()>;
    async fn get_post(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<Option<Post>>;
    async fn list_posts(&self, tenant_id: Uuid) -> CoreResult<Vec<Post>>;
    async fn delete_post(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<bool>;

    /// Posts of any tenant that are due at `now`, in no particular order.
    async fn due_posts(&self, now: DateTime<Utc>) -> CoreResult<Vec<Post>>;

    // Social accounts

    async fn save_account(&self, account: SocialAccount) -> CoreResult<()>;
    async fn get_account(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<Option<SocialAccount>>;
    async fn list_accounts(&self, tenant_id: Uuid) -> CoreResult<Vec<SocialAccount>>;

    // Templates, landing pages, AI

    async fn save_template(&self, template: Template) -> CoreResult<()>;
    async fn list_templates(&self, tenant_id: Uuid) -> CoreResult<Vec<Template>>;
    async fn delete_template(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<bool>;

    /// Fails with `DuplicateSlug` if another page owns the slug.
    async fn save_landing_page(&self, page: LandingPage) -> CoreResult<()>;
    async fn list_landing_pages(&self, tenant_id: Uuid) -> CoreResult<Vec<LandingPage>>;
    async fn delete_landing_page(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<bool>;

    /// Any tenant's page; slugs are global.
    async fn find_landing_page_by_slug(&self, slug: &str) -> CoreResult<Option<LandingPage>>;

    // Leads

    async fn save_lead(&self, lead: Lead) -> CoreResult<()>;
    async fn get_lead(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<Option<Lead>>;

    /// Newest first.
    async fn list_leads(&self, tenant_id: Uuid) -> CoreResult<Vec<Lead>>;

    async fn insert_generation(&self, generation: AiGeneration) -> CoreResult<()>;

    /// Counts derived from the collections above.
    async fn usage(&self, tenant_id: Uuid, month: MonthWindow) -> CoreResult<UsageSnapshot>;
}
