//! In-memory [`Store`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use socialflow_org::{normalize_email, Invite, Membership, Tenant, UsageSnapshot, UserContext};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::account::SocialAccount;
use crate::content::{AiGeneration, LandingPage, Template};
use crate::error::{ConflictKind, CoreResult};
use crate::lead::Lead;
use crate::post::Post;
use crate::store::{Store, TenantGuard};
use crate::usage::MonthWindow;
use crate::user::User;

/// Process-local store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    locks: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    contexts: Arc<RwLock<HashMap<Uuid, UserContext>>>,
    tenants: Arc<RwLock<HashMap<Uuid, Tenant>>>,
    memberships: Arc<RwLock<HashMap<(Uuid, Uuid), Membership>>>,
    invites: Arc<RwLock<HashMap<Uuid, Invite>>>,
    posts: Arc<RwLock<HashMap<Uuid, Post>>>,
    accounts: Arc<RwLock<HashMap<Uuid, SocialAccount>>>,
    templates: Arc<RwLock<HashMap<Uuid, Template>>>,
    landing_pages: Arc<RwLock<HashMap<Uuid, LandingPage>>>,
    leads: Arc<RwLock<HashMap<Uuid, Lead>>>,
    generations: Arc<RwLock<Vec<AiGeneration>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn scoped<T: Clone>(map: &HashMap<Uuid, T>, id: Uuid, tenant_id: Uuid, owner: impl Fn(&T) -> Uuid) -> Option<T> {
    map.get(&id).filter(|item| owner(item) == tenant_id).cloned()
}

fn remove_scoped<T>(map: &mut HashMap<Uuid, T>, id: Uuid, tenant_id: Uuid, owner: impl Fn(&T) -> Uuid) -> bool {
    if map.get(&id).is_some_and(|item| owner(item) == tenant_id) {
        map.remove(&id);
        true
    } else {
        false
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn lock_tenant(&self, tenant_id: Uuid) -> TenantGuard {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(tenant_id).or_default().clone()
        };
        lock.lock_owned().await
    }

    async fn insert_user(&self, user: User) -> CoreResult<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(ConflictKind::DuplicateEmail.into());
        }
        users.insert(user.id, user);
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> CoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let email = normalize_email(email);
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn get_context(&self, user_id: Uuid) -> CoreResult<Option<UserContext>> {
        Ok(self.contexts.read().await.get(&user_id).cloned())
    }

    async fn save_context(&self, context: UserContext) -> CoreResult<()> {
        self.contexts.write().await.insert(context.user_id, context);
        Ok(())
    }

    async fn save_tenant(&self, tenant: Tenant) -> CoreResult<()> {
        self.tenants.write().await.insert(tenant.id, tenant);
        Ok(())
    }

    async fn get_tenant(&self, id: Uuid) -> CoreResult<Option<Tenant>> {
        Ok(self.tenants.read().await.get(&id).cloned())
    }

    async fn save_membership(&self, membership: Membership) -> CoreResult<()> {
        self.memberships
            .write()
            .await
            .insert((membership.tenant_id, membership.user_id), membership);
        Ok(())
    }

    async fn get_membership(&self, tenant_id: Uuid, user_id: Uuid) -> CoreResult<Option<Membership>> {
        Ok(self.memberships.read().await.get(&(tenant_id, user_id)).cloned())
    }

    async fn list_memberships(&self, tenant_id: Uuid) -> CoreResult<Vec<Membership>> {
        let mut members: Vec<Membership> = self
            .memberships
            .read()
            .await
            .values()
            .filter(|m| m.tenant_id == tenant_id)
            .cloned()
            .collect();
        members.sort_by_key(|m| (m.joined_at, m.id));
        Ok(members)
    }

    async fn list_user_memberships(&self, user_id: Uuid) -> CoreResult<Vec<Membership>> {
        let mut memberships: Vec<Membership> = self
            .memberships
            .read()
            .await
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        memberships.sort_by_key(|m| (m.joined_at, m.id));
        Ok(memberships)
    }

    async fn delete_membership(&self, tenant_id: Uuid, user_id: Uuid) -> CoreResult<bool> {
        Ok(self
            .memberships
            .write()
            .await
            .remove(&(tenant_id, user_id))
            .is_some())
    }

    async fn save_invite(&self, invite: Invite) -> CoreResult<()> {
        self.invites.write().await.insert(invite.id, invite);
        Ok(())
    }

    async fn get_invite(&self, id: Uuid) -> CoreResult<Option<Invite>> {
        Ok(self.invites.read().await.get(&id).cloned())
    }

    async fn list_invites(&self, tenant_id: Uuid) -> CoreResult<Vec<Invite>> {
        let mut invites: Vec<Invite> = self
            .invites
            .read()
            .await
            .values()
            .filter(|i| i.tenant_id == tenant_id)
            .cloned()
            .collect();
        invites.sort_by_key(|i| (i.created_at, i.id));
        Ok(invites)
    }

    async fn save_post(&self, post: Post) -> CoreResult<()> {
        self.posts.write().await.insert(post.id, post);
        Ok(())
    }

    async fn get_post(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<Option<Post>> {
        Ok(scoped(&*self.posts.read().await, id, tenant_id, |p| p.tenant_id))
    }

    async fn list_posts(&self, tenant_id: Uuid) -> CoreResult<Vec<Post>> {
        let mut posts: Vec<Post> = self
            .posts
            .read()
            .await
            .values()
            .filter(|p| p.tenant_id == tenant_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }

    async fn delete_post(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<bool> {
        Ok(remove_scoped(&mut *self.posts.write().await, id, tenant_id, |p| p.tenant_id))
    }

    async fn due_posts(&self, now: DateTime<Utc>) -> CoreResult<Vec<Post>> {
        Ok(self
            .posts
            .read()
            .await
            .values()
            .filter(|p| p.is_due(now))
            .cloned()
            .collect())
    }

    async fn save_account(&self, account: SocialAccount) -> CoreResult<()> {
        self.accounts.write().await.insert(account.id, account);
        Ok(())
    }

    async fn get_account(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<Option<SocialAccount>> {
        Ok(scoped(&*self.accounts.read().await, id, tenant_id, |a| a.tenant_id))
    }

    async fn list_accounts(&self, tenant_id: Uuid) -> CoreResult<Vec<SocialAccount>> {
        let mut accounts: Vec<SocialAccount> = self
            .accounts
            .read()
            .await
            .values()
            .filter(|a| a.tenant_id == tenant_id)
            .cloned()
            .collect();
        accounts.sort_by_key(|a| (a.connected_at, a.id));
        Ok(accounts)
    }

    async fn save_template(&self, template: Template) -> CoreResult<()> {
        self.templates.write().await.insert(template.id, template);
        Ok(())
    }

    async fn list_templates(&self, tenant_id: Uuid) -> CoreResult<Vec<Template>> {
        let mut templates: Vec<Template> = self
            .templates
            .read()
            .await
            .values()
            .filter(|t| t.tenant_id == tenant_id)
            .cloned()
            .collect();
        templates.sort_by_key(|t| (t.created_at, t.id));
        Ok(templates)
    }

    async fn delete_template(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<bool> {
        Ok(remove_scoped(&mut *self.templates.write().await, id, tenant_id, |t| t.tenant_id))
    }

    async fn save_landing_page(&self, page: LandingPage) -> CoreResult<()> {
        let mut pages = self.landing_pages.write().await;
        if pages.values().any(|p| p.slug == page.slug && p.id != page.id) {
            return Err(ConflictKind::DuplicateSlug.into());
        }
        pages.insert(page.id, page);
        Ok(())
    }

    async fn list_landing_pages(&self, tenant_id: Uuid) -> CoreResult<Vec<LandingPage>> {
        let mut pages: Vec<LandingPage> = self
            .landing_pages
            .read()
            .await
            .values()
            .filter(|p| p.tenant_id == tenant_id)
            .cloned()
            .collect();
        pages.sort_by_key(|p| (p.created_at, p.id));
        Ok(pages)
    }

    async fn delete_landing_page(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<bool> {
        Ok(remove_scoped(&mut *self.landing_pages.write().await, id, tenant_id, |p| p.tenant_id))
    }

    async fn find_landing_page_by_slug(&self, slug: &str) -> CoreResult<Option<LandingPage>> {
        Ok(self
            .landing_pages
            .read()
            .await
            .values()
            .find(|p| p.slug == slug)
            .cloned())
    }

    async fn save_lead(&self, lead: Lead) -> CoreResult<()> {
        self.leads.write().await.insert(lead.id, lead);
        Ok(())
    }

    async fn get_lead(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<Option<Lead>> {
        Ok(scoped(&*self.leads.read().await, id, tenant_id, |l| l.tenant_id))
    }

    async fn list_leads(&self, tenant_id: Uuid) -> CoreResult<Vec<Lead>> {
        let mut leads: Vec<Lead> = self
            .leads
            .read()
            .await
            .values()
            .filter(|l| l.tenant_id == tenant_id)
            .cloned()
            .collect();
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(leads)
    }

    async fn insert_generation(&self, generation: AiGeneration) -> CoreResult<()> {
        self.generations.write().await.push(generation);
        Ok(())
    }

    async fn usage(&self, tenant_id: Uuid, month: MonthWindow) -> CoreResult<UsageSnapshot> {
        let posts_this_month = self
            .posts
            .read()
            .await
            .values()
            .filter(|p| p.tenant_id == tenant_id && month.contains(p.created_at))
            .count() as u64;
        let templates = self
            .templates
            .read()
            .await
            .values()
            .filter(|t| t.tenant_id == tenant_id)
            .count() as u64;
        let landing_pages = self
            .landing_pages
            .read()
            .await
            .values()
            .filter(|p| p.tenant_id == tenant_id)
            .count() as u64;
        let ai_generations_this_month = self
            .generations
            .read()
            .await
            .iter()
            .filter(|g| g.tenant_id == tenant_id && month.contains(g.created_at))
            .count() as u64;
        let social_accounts = self
            .accounts
            .read()
            .await
            .values()
            .filter(|a| a.tenant_id == tenant_id && a.is_connected())
            .count() as u64;
        let team_members = self
            .memberships
            .read()
            .await
            .values()
            .filter(|m| m.tenant_id == tenant_id)
            .count() as u64;

        Ok(UsageSnapshot {
            posts_this_month,
            templates,
            landing_pages,
            ai_generations_this_month,
            social_accounts,
            team_members,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::NewPost;
    use chrono::Duration;
    use socialflow_connectors::Platform;

    fn post(tenant: Uuid, created: DateTime<Utc>) -> Post {
        Post::new(
            tenant,
            Uuid::now_v7(),
            NewPost {
                caption: "hello".to_string(),
                platforms: [Platform::Facebook].into_iter().collect(),
                ..Default::default()
            },
            created,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_posts_are_tenant_scoped() {
        let store = MemoryStore::new();
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let p = post(a, Utc::now());
        store.save_post(p.clone()).await.unwrap();

        assert!(store.get_post(a, p.id).await.unwrap().is_some());
        assert!(store.get_post(b, p.id).await.unwrap().is_none());
        assert!(!store.delete_post(b, p.id).await.unwrap());
        assert!(store.delete_post(a, p.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_usage_counts_current_month_only() {
        let store = MemoryStore::new();
        let tenant = Uuid::now_v7();
        let now = Utc::now();
        let window = MonthWindow::containing(now);

        store.save_post(post(tenant, window.start)).await.unwrap();
        store.save_post(post(tenant, window.start - Duration::seconds(1))).await.unwrap();
        store.save_post(post(Uuid::now_v7(), now)).await.unwrap();

        let usage = store.usage(tenant, window).await.unwrap();
        assert_eq!(usage.posts_this_month, 1);
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.insert_user(User::new("a@b.c", "A", String::new(), now)).await.unwrap();
        let err = store
            .insert_user(User::new("A@B.C", "A2", String::new(), now))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "DUPLICATE_EMAIL");
        assert!(store.find_user_by_email(" a@B.c ").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_tenant_lock_serializes() {
        let store = MemoryStore::new();
        let tenant = Uuid::now_v7();
        let guard = store.lock_tenant(tenant).await;

        let other = store.clone();
        let handle = tokio::spawn(async move {
            let _guard = other.lock_tenant(tenant).await;
        });
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!handle.is_finished());

        drop(guard);
        handle.await.unwrap();
    }
}
