//! Workspaces, members and invites.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use socialflow_events::{EventBus, WorkspaceEvent};
use socialflow_org::{
    authorize_invite, normalize_email, Denial, GatedAction, Invite, Membership, SettingsPatch,
    Tenant, TenantSettings, TenantSummary, UserContext, WorkspaceRole,
};
use socialflow_rbac::{Action, ResourceType};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::access::{check, current_usage, emit, load_tenant, Actor};
use crate::error::{ConflictKind, CoreError, CoreResult};
use crate::store::Store;
use crate::user::User;

/// Member listing entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberView {
    #[serde(flatten)]
    pub membership: Membership,
    pub email: String,
    pub name: String,
}

/// The current workspace as seen by one member.
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceView {
    #[serde(flatten)]
    pub tenant: Tenant,
    pub role: WorkspaceRole,
    pub is_expired: bool,
    pub days_remaining: i64,
}

#[derive(Clone)]
pub struct WorkspaceService {
    store: Arc<dyn Store>,
    events: Arc<dyn EventBus>,
}

fn owner_protected(actor: &Actor, action: &str) -> CoreError {
    Denial {
        message: "The workspace owner cannot be changed or removed.".to_string(),
        ..Denial::insufficient_role(action, actor.role())
    }
    .into()
}

pub(crate) fn validate_email(email: &str) -> CoreResult<String> {
    let email = normalize_email(email);
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(CoreError::invalid("a valid email address is required")),
    }
}

impl WorkspaceService {
    pub fn new(store: Arc<dyn Store>, events: Arc<dyn EventBus>) -> Self {
        Self { store, events }
    }

    /// Create a workspace owned by `owner` on the free trial and make it
    /// the owner's current workspace.
    #[instrument(skip(self, owner), fields(owner_id = %owner.id))]
    pub async fn create_tenant(&self, owner: &User, name: &str, now: DateTime<Utc>) -> CoreResult<Tenant> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::invalid("workspace name must not be empty"));
        }

        let tenant = Tenant::new(name, owner.id, now);
        self.store.save_tenant(tenant.clone()).await?;
        self.store
            .save_membership(Membership::owner(tenant.id, owner.id, now))
            .await?;
        self.select(owner.id, tenant.id, now).await?;

        info!(tenant_id = %tenant.id, "Workspace created");
        emit(
            &*self.events,
            WorkspaceEvent::Created {
                name: tenant.name.clone(),
                owner_id: owner.id,
            }
            .to_event(tenant.id)
            .with_user(owner.id),
        )
        .await;
        Ok(tenant)
    }

    async fn select(&self, user_id: Uuid, tenant_id: Uuid, now: DateTime<Utc>) -> CoreResult<()> {
        let mut context = self
            .store
            .get_context(user_id)
            .await?
            .unwrap_or_else(|| UserContext::new(user_id, now));
        context.switch_workspace(tenant_id, now);
        self.store.save_context(context).await
    }

    /// Resolve the user's current workspace and membership.
    ///
    /// Falls back to the earliest membership when no workspace is selected or
    /// the selected one is no longer accessible.
    pub async fn actor(&self, user_id: Uuid, now: DateTime<Utc>) -> CoreResult<Actor> {
        let selected = self
            .store
            .get_context(user_id)
            .await?
            .and_then(|c| c.current_tenant_id);

        let membership = match selected {
            Some(tenant_id) => self.store.get_membership(tenant_id, user_id).await?,
            None => None,
        };
        let membership = match membership {
            Some(m) => m,
            None => {
                let first = self
                    .store
                    .list_user_memberships(user_id)
                    .await?
                    .into_iter()
                    .next()
                    .ok_or(CoreError::NotFound("Workspace"))?;
                self.select(user_id, first.tenant_id, now).await?;
                first
            }
        };

        let tenant = load_tenant(&*self.store, membership.tenant_id).await?;
        Ok(Actor {
            user_id,
            tenant,
            membership,
        })
    }

    pub async fn workspace(&self, actor: &Actor, now: DateTime<Utc>) -> CoreResult<WorkspaceView> {
        actor.permit(ResourceType::Settings, Action::Read, GatedAction::ReadSettings, now)?;
        Ok(WorkspaceView {
            tenant: actor.tenant.clone(),
            role: actor.role(),
            is_expired: actor.tenant.is_expired(now),
            days_remaining: actor.tenant.subscription.days_remaining(now),
        })
    }

    /// Every workspace the user belongs to, current one flagged.
    pub async fn list_workspaces(&self, user_id: Uuid, now: DateTime<Utc>) -> CoreResult<Vec<TenantSummary>> {
        let current = self
            .store
            .get_context(user_id)
            .await?
            .and_then(|c| c.current_tenant_id);

        let mut summaries = Vec::new();
        for membership in self.store.list_user_memberships(user_id).await? {
            if let Some(tenant) = self.store.get_tenant(membership.tenant_id).await? {
                let is_current = current == Some(tenant.id);
                summaries.push(tenant.summary(membership.role, is_current, now));
            }
        }
        Ok(summaries)
    }

    pub async fn switch_workspace(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
        now: DateTime<Utc>,
    ) -> CoreResult<TenantSummary> {
        let membership = self
            .store
            .get_membership(tenant_id, user_id)
            .await?
            .ok_or(CoreError::NotFound("Workspace"))?;
        let tenant = load_tenant(&*self.store, tenant_id).await?;
        self.select(user_id, tenant_id, now).await?;
        debug!(user_id = %user_id, tenant_id = %tenant_id, "Switched workspace");
        Ok(tenant.summary(membership.role, true, now))
    }

    /// Update settings. Branding requires the white-label feature.
    #[instrument(skip(self, actor, patch), fields(tenant_id = %actor.tenant_id()))]
    pub async fn update_settings(
        &self,
        actor: &Actor,
        patch: SettingsPatch,
        now: DateTime<Utc>,
    ) -> CoreResult<TenantSettings> {
        actor.permit(ResourceType::Settings, Action::Update, GatedAction::UpdateSettings, now)?;
        if patch.is_empty() {
            return Err(CoreError::invalid("no settings to update"));
        }
        if patch.branding.is_some() {
            actor.permit(ResourceType::Settings, Action::Update, GatedAction::WhiteLabel, now)?;
        }

        let _guard = self.store.lock_tenant(actor.tenant_id()).await;
        let mut tenant = load_tenant(&*self.store, actor.tenant_id()).await?;
        tenant.settings.apply(patch);
        tenant.touch(now);
        let settings = tenant.settings.clone();
        self.store.save_tenant(tenant).await?;
        drop(_guard);

        emit(
            &*self.events,
            WorkspaceEvent::SettingsUpdated
                .to_event(actor.tenant_id())
                .with_user(actor.user_id),
        )
        .await;
        Ok(settings)
    }

    /// Invite `email` with `role`.
    ///
    /// Runs the team gate (role, then team size, then expiry) under the tenant
    /// lock. Pending invites do not count toward the team limit.
    #[instrument(skip(self, actor), fields(tenant_id = %actor.tenant_id()))]
    pub async fn invite(
        &self,
        actor: &Actor,
        email: &str,
        role: WorkspaceRole,
        now: DateTime<Utc>,
    ) -> CoreResult<Invite> {
        if !role.is_assignable() {
            return Err(CoreError::invalid("role must be admin, editor or viewer"));
        }
        let email = validate_email(email)?;

        let _guard = self.store.lock_tenant(actor.tenant_id()).await;
        let tenant = load_tenant(&*self.store, actor.tenant_id()).await?;
        let usage = current_usage(&*self.store, tenant.id, now).await?;
        authorize_invite(actor.role(), &tenant.subscription, &usage, now)?;

        let invites = self.store.list_invites(tenant.id).await?;
        if invites.iter().any(|i| i.is_open(now) && i.is_for(&email)) {
            return Err(ConflictKind::DuplicateInvite.into());
        }
        if let Some(user) = self.store.find_user_by_email(&email).await? {
            if self.store.get_membership(tenant.id, user.id).await?.is_some() {
                return Err(ConflictKind::AlreadyMember.into());
            }
        }

        let invite = Invite::new(tenant.id, &email, role, actor.user_id, now);
        self.store.save_invite(invite.clone()).await?;
        drop(_guard);

        info!(invite_id = %invite.id, role = role.as_str(), "Member invited");
        emit(
            &*self.events,
            WorkspaceEvent::MemberInvited {
                invite_id: invite.id,
                email: invite.email.clone(),
                role: role.as_str().to_string(),
            }
            .to_event(tenant.id)
            .with_user(actor.user_id),
        )
        .await;
        Ok(invite)
    }

    /// Pending, unexpired invites of the current workspace.
    pub async fn list_invites(&self, actor: &Actor, now: DateTime<Utc>) -> CoreResult<Vec<Invite>> {
        actor.permit(ResourceType::Invite, Action::Read, GatedAction::ReadMembers, now)?;
        Ok(self
            .store
            .list_invites(actor.tenant_id())
            .await?
            .into_iter()
            .filter(|i| i.is_open(now))
            .collect())
    }

    /// Accept an invite addressed to `user_id`'s email.
    ///
    /// Under the tenant lock: the invite is resolved exactly once, the team
    /// limit is re-checked, and exactly one membership is created. A denied
    /// acceptance leaves the invite pending.
    #[instrument(skip(self))]
    pub async fn accept_invite(
        &self,
        user_id: Uuid,
        invite_id: Uuid,
        now: DateTime<Utc>,
    ) -> CoreResult<Membership> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(CoreError::NotFound("User"))?;
        let tenant_id = self
            .store
            .get_invite(invite_id)
            .await?
            .ok_or(CoreError::NotFound("Invite"))?
            .tenant_id;

        let _guard = self.store.lock_tenant(tenant_id).await;
        let mut invite = self
            .store
            .get_invite(invite_id)
            .await?
            .ok_or(CoreError::NotFound("Invite"))?;
        if !invite.is_for(&user.email) {
            return Err(CoreError::invalid("invite was sent to a different email"));
        }
        if let Err(e) = invite.accept(now) {
            if invite.is_expired(now) {
                self.store.save_invite(invite).await?;
            }
            return Err(e.into());
        }
        if self.store.get_membership(tenant_id, user.id).await?.is_some() {
            return Err(ConflictKind::AlreadyMember.into());
        }

        // the seat is taken on acceptance, not when the invite is sent
        let tenant = load_tenant(&*self.store, tenant_id).await?;
        let usage = current_usage(&*self.store, tenant_id, now).await?;
        check(&tenant, GatedAction::AcceptInvite, &usage, now)?;

        let membership =
            Membership::new(tenant_id, user.id, invite.role, now).with_inviter(invite.invited_by);
        self.store.save_membership(membership.clone()).await?;
        self.store.save_invite(invite).await?;
        drop(_guard);

        self.select(user.id, tenant_id, now).await?;
        info!(tenant_id = %tenant_id, "Invite accepted");
        emit(
            &*self.events,
            WorkspaceEvent::InviteAccepted {
                invite_id,
                user_id: user.id,
            }
            .to_event(tenant_id)
            .with_user(user.id),
        )
        .await;
        Ok(membership)
    }

    /// Decline an invite. Allowed for the invitee and for members who manage
    /// the inviting workspace.
    #[instrument(skip(self))]
    pub async fn decline_invite(&self, user_id: Uuid, invite_id: Uuid, now: DateTime<Utc>) -> CoreResult<Invite> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(CoreError::NotFound("User"))?;
        let tenant_id = self
            .store
            .get_invite(invite_id)
            .await?
            .ok_or(CoreError::NotFound("Invite"))?
            .tenant_id;

        let _guard = self.store.lock_tenant(tenant_id).await;
        let mut invite = self
            .store
            .get_invite(invite_id)
            .await?
            .ok_or(CoreError::NotFound("Invite"))?;
        let manages = self
            .store
            .get_membership(tenant_id, user.id)
            .await?
            .is_some_and(|m| m.role.can_manage_members());
        if !invite.is_for(&user.email) && !manages {
            return Err(CoreError::NotFound("Invite"));
        }

        if let Err(e) = invite.decline(now) {
            if invite.is_expired(now) {
                self.store.save_invite(invite).await?;
            }
            return Err(e.into());
        }
        self.store.save_invite(invite.clone()).await?;
        drop(_guard);

        emit(
            &*self.events,
            WorkspaceEvent::InviteDeclined { invite_id }
                .to_event(tenant_id)
                .with_user(user.id),
        )
        .await;
        Ok(invite)
    }

    pub async fn list_members(&self, actor: &Actor, now: DateTime<Utc>) -> CoreResult<Vec<MemberView>> {
        actor.permit(ResourceType::Member, Action::Read, GatedAction::ReadMembers, now)?;

        let mut members = Vec::new();
        for membership in self.store.list_memberships(actor.tenant_id()).await? {
            let (email, name) = match self.store.get_user(membership.user_id).await? {
                Some(user) => (user.email, user.name),
                None => (String::new(), String::new()),
            };
            members.push(MemberView {
                membership,
                email,
                name,
            });
        }
        Ok(members)
    }

    /// Change a member's role. The owner's role is fixed and nobody can be
    /// promoted to owner.
    #[instrument(skip(self, actor), fields(tenant_id = %actor.tenant_id()))]
    pub async fn update_role(
        &self,
        actor: &Actor,
        target_user_id: Uuid,
        role: WorkspaceRole,
        now: DateTime<Utc>,
    ) -> CoreResult<Membership> {
        actor.permit(ResourceType::Member, Action::Update, GatedAction::ManageMembers, now)?;
        if !role.is_assignable() {
            return Err(owner_protected(actor, "member:update"));
        }

        let _guard = self.store.lock_tenant(actor.tenant_id()).await;
        let mut membership = self
            .store
            .get_membership(actor.tenant_id(), target_user_id)
            .await?
            .ok_or(CoreError::NotFound("Member"))?;
        if membership.is_owner() {
            return Err(owner_protected(actor, "member:update"));
        }

        let from = membership.role;
        membership.role = role;
        self.store.save_membership(membership.clone()).await?;
        drop(_guard);

        emit(
            &*self.events,
            WorkspaceEvent::MemberRoleChanged {
                user_id: target_user_id,
                from: from.as_str().to_string(),
                to: role.as_str().to_string(),
            }
            .to_event(actor.tenant_id())
            .with_user(actor.user_id),
        )
        .await;
        Ok(membership)
    }

    /// Remove a member. The owner can never be removed.
    #[instrument(skip(self, actor), fields(tenant_id = %actor.tenant_id()))]
    pub async fn remove_member(&self, actor: &Actor, target_user_id: Uuid, now: DateTime<Utc>) -> CoreResult<()> {
        actor.permit(ResourceType::Member, Action::Delete, GatedAction::ManageMembers, now)?;

        let _guard = self.store.lock_tenant(actor.tenant_id()).await;
        let membership = self
            .store
            .get_membership(actor.tenant_id(), target_user_id)
            .await?
            .ok_or(CoreError::NotFound("Member"))?;
        if membership.is_owner() {
            return Err(owner_protected(actor, "member:delete"));
        }
        self.store
            .delete_membership(actor.tenant_id(), target_user_id)
            .await?;
        drop(_guard);

        if let Some(mut context) = self.store.get_context(target_user_id).await? {
            context.forget_workspace(actor.tenant_id(), now);
            self.store.save_context(context).await?;
        }

        emit(
            &*self.events,
            WorkspaceEvent::MemberRemoved {
                user_id: target_user_id,
            }
            .to_event(actor.tenant_id())
            .with_user(actor.user_id),
        )
        .await;
        Ok(())
    }
}
