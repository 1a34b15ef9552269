mod common;

use chrono::Duration;
use common::{start, Harness};
use socialflow_core::{ConflictKind, CoreError};
use socialflow_org::{
    BrandingSettings, DenialReason, InviteStatus, SettingsPatch, UsageCounter, WorkspaceRole,
    INVITE_TTL_DAYS,
};

#[tokio::test]
async fn test_register_creates_owned_workspace() {
    let h = Harness::new();
    let ana = h.register("ana@example.com", "Acme").await;

    let actor = h.actor(&ana, start()).await;
    assert_eq!(actor.tenant.name, "Acme");
    assert_eq!(actor.role(), WorkspaceRole::Owner);
    assert_eq!(actor.tenant.owner_id, ana.id);

    let workspaces = h.app.workspaces.list_workspaces(ana.id, start()).await.unwrap();
    assert_eq!(workspaces.len(), 1);
    assert!(workspaces[0].is_current);
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let h = Harness::new();
    h.register("ana@example.com", "Acme").await;

    let err = h
        .app
        .identity
        .register(
            socialflow_core::Registration {
                email: "ANA@example.com".to_string(),
                password: "another password".to_string(),
                name: "Ana Two".to_string(),
                company_name: None,
            },
            start(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(ConflictKind::DuplicateEmail)));
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn test_login_and_authenticate() {
    let h = Harness::new();
    let ana = h.register("ana@example.com", "Acme").await;

    let err = h
        .app
        .identity
        .login("ana@example.com", "wrong password")
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 401);

    let session = h
        .app
        .identity
        .login("Ana@Example.com", "correct horse battery")
        .await
        .unwrap();
    let user = h
        .app
        .identity
        .authenticate(&session.token.access_token)
        .await
        .unwrap();
    assert_eq!(user.id, ana.id);

    assert_eq!(h.app.identity.authenticate("garbage").await.unwrap_err().status_code(), 401);
}

#[tokio::test]
async fn test_team_limit_then_upgrade() {
    let h = Harness::new();
    let now = start();
    let ana = h.register("ana@example.com", "Acme").await;
    let bob = h.register("bob@example.com", "Bob Co").await;
    let cid = h.register("cid@example.com", "Cid Co").await;
    h.register("dee@example.com", "Dee Co").await;

    // free plan: the owner fills the single seat
    let owner = h.actor(&ana, now).await;
    let err = h
        .app
        .workspaces
        .invite(&owner, "bob@example.com", WorkspaceRole::Editor, now)
        .await
        .unwrap_err();
    let denial = err.denial().unwrap();
    assert_eq!(denial.reason, DenialReason::LimitReached);
    assert_eq!(denial.counter, Some(UsageCounter::TeamMembers));
    assert_eq!(denial.usage, Some(1));
    assert_eq!(denial.limit, Some(1));
    assert_eq!(err.status_code(), 403);

    h.app.billing.change_plan(&owner, "starter", now).await.unwrap();
    let owner = h.actor(&ana, now).await;

    for user in [&bob, &cid] {
        let invite = h
            .app
            .workspaces
            .invite(&owner, &user.email, WorkspaceRole::Editor, now)
            .await
            .unwrap();
        h.app
            .workspaces
            .accept_invite(user.id, invite.id, now)
            .await
            .unwrap();
    }

    let members = h.app.workspaces.list_members(&owner, now).await.unwrap();
    assert_eq!(members.len(), 3);

    let err = h
        .app
        .workspaces
        .invite(&owner, "dee@example.com", WorkspaceRole::Viewer, now)
        .await
        .unwrap_err();
    assert_eq!(err.denial().unwrap().limit, Some(3));
}

#[tokio::test]
async fn test_invite_accepted_exactly_once() {
    let h = Harness::new();
    let now = start();
    let ana = h.register("ana@example.com", "Acme").await;
    let bob = h.register("bob@example.com", "Bob Co").await;

    let owner = h.actor(&ana, now).await;
    h.app.billing.change_plan(&owner, "starter", now).await.unwrap();
    let owner = h.actor(&ana, now).await;

    let invite = h
        .app
        .workspaces
        .invite(&owner, "Bob@Example.com", WorkspaceRole::Editor, now)
        .await
        .unwrap();

    let (first, second) = tokio::join!(
        h.app.workspaces.accept_invite(bob.id, invite.id, now),
        h.app.workspaces.accept_invite(bob.id, invite.id, now),
    );
    assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
    let failed = first.err().or(second.err()).unwrap();
    assert!(matches!(
        failed,
        CoreError::Conflict(ConflictKind::InviteAlreadyResolved(InviteStatus::Accepted))
    ));
    assert_eq!(failed.status_code(), 409);

    // a later retry by the same member still reports the resolved invite
    let again = h
        .app
        .workspaces
        .accept_invite(bob.id, invite.id, now)
        .await
        .unwrap_err();
    assert!(matches!(
        again,
        CoreError::Conflict(ConflictKind::InviteAlreadyResolved(InviteStatus::Accepted))
    ));

    let members = h.app.workspaces.list_members(&owner, now).await.unwrap();
    assert_eq!(members.len(), 2);
    let bob_member = members.iter().find(|m| m.membership.user_id == bob.id).unwrap();
    assert_eq!(bob_member.membership.role, WorkspaceRole::Editor);
    assert_eq!(bob_member.membership.invited_by, Some(ana.id));

    // accepting switches bob into the workspace
    let bob_actor = h.actor(&bob, now).await;
    assert_eq!(bob_actor.tenant_id(), owner.tenant_id());
}

#[tokio::test]
async fn test_acceptance_rechecks_team_limit() {
    let h = Harness::new();
    let now = start();
    let ana = h.register("ana@example.com", "Acme").await;
    let mut invitees = Vec::new();
    for (email, company) in [
        ("bob@example.com", "Bob Co"),
        ("cid@example.com", "Cid Co"),
        ("dee@example.com", "Dee Co"),
        ("eve@example.com", "Eve Co"),
    ] {
        invitees.push(h.register(email, company).await);
    }

    let owner = h.actor(&ana, now).await;
    h.app.billing.change_plan(&owner, "starter", now).await.unwrap();
    let owner = h.actor(&ana, now).await;

    // open invites hold no seat, so all four go out while the team is 1 of 3
    let mut invites = Vec::new();
    for user in &invitees {
        invites.push(
            h.app
                .workspaces
                .invite(&owner, &user.email, WorkspaceRole::Viewer, now)
                .await
                .unwrap(),
        );
    }

    for (user, invite) in invitees.iter().zip(&invites).take(2) {
        h.app
            .workspaces
            .accept_invite(user.id, invite.id, now)
            .await
            .unwrap();
    }

    for (user, invite) in invitees.iter().zip(&invites).skip(2) {
        let err = h
            .app
            .workspaces
            .accept_invite(user.id, invite.id, now)
            .await
            .unwrap_err();
        let denial = err.denial().unwrap();
        assert_eq!(denial.reason, DenialReason::LimitReached);
        assert_eq!(denial.counter, Some(UsageCounter::TeamMembers));
        assert_eq!(denial.usage, Some(3));
        assert_eq!(denial.limit, Some(3));
    }

    let members = h.app.workspaces.list_members(&owner, now).await.unwrap();
    assert_eq!(members.len(), 3);

    // denied invites stay open and can be accepted after an upgrade
    let open = h.app.workspaces.list_invites(&owner, now).await.unwrap();
    assert_eq!(open.len(), 2);
    assert!(open.iter().all(|i| i.status == InviteStatus::Pending));

    h.app
        .billing
        .change_plan(&owner, "professional", now)
        .await
        .unwrap();
    h.app
        .workspaces
        .accept_invite(invitees[3].id, invites[3].id, now)
        .await
        .unwrap();
    let members = h.app.workspaces.list_members(&owner, now).await.unwrap();
    assert_eq!(members.len(), 4);
}

#[tokio::test]
async fn test_declined_invite_cannot_be_accepted() {
    let h = Harness::new();
    let now = start();
    let ana = h.register("ana@example.com", "Acme").await;
    let bob = h.register("bob@example.com", "Bob Co").await;

    let owner = h.actor(&ana, now).await;
    h.app.billing.change_plan(&owner, "starter", now).await.unwrap();
    let owner = h.actor(&ana, now).await;

    let invite = h
        .app
        .workspaces
        .invite(&owner, "bob@example.com", WorkspaceRole::Viewer, now)
        .await
        .unwrap();
    let declined = h.app.workspaces.decline_invite(bob.id, invite.id, now).await.unwrap();
    assert_eq!(declined.status, InviteStatus::Declined);

    let err = h
        .app
        .workspaces
        .accept_invite(bob.id, invite.id, now)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Conflict(ConflictKind::InviteAlreadyResolved(InviteStatus::Declined))
    ));
    assert!(h.app.workspaces.list_invites(&owner, now).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_expired_invite_is_marked_expired() {
    let h = Harness::new();
    let now = start();
    let ana = h.register("ana@example.com", "Acme").await;
    let bob = h.register("bob@example.com", "Bob Co").await;

    let owner = h.actor(&ana, now).await;
    h.app.billing.change_plan(&owner, "starter", now).await.unwrap();
    let owner = h.actor(&ana, now).await;
    let invite = h
        .app
        .workspaces
        .invite(&owner, "bob@example.com", WorkspaceRole::Viewer, now)
        .await
        .unwrap();

    let later = now + Duration::days(INVITE_TTL_DAYS) + Duration::hours(1);
    assert!(h.app.workspaces.list_invites(&owner, later).await.unwrap().is_empty());

    let err = h
        .app
        .workspaces
        .accept_invite(bob.id, invite.id, later)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 410);

    let err = h
        .app
        .workspaces
        .accept_invite(bob.id, invite.id, later)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Conflict(ConflictKind::InviteAlreadyResolved(InviteStatus::Expired))
    ));
}

#[tokio::test]
async fn test_invite_conflicts() {
    let h = Harness::new();
    let now = start();
    let ana = h.register("ana@example.com", "Acme").await;
    let bob = h.register("bob@example.com", "Bob Co").await;

    let owner = h.actor(&ana, now).await;
    h.app.billing.change_plan(&owner, "professional", now).await.unwrap();
    let owner = h.actor(&ana, now).await;

    let invite = h
        .app
        .workspaces
        .invite(&owner, "bob@example.com", WorkspaceRole::Editor, now)
        .await
        .unwrap();
    let err = h
        .app
        .workspaces
        .invite(&owner, "bob@example.com", WorkspaceRole::Admin, now)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(ConflictKind::DuplicateInvite)));

    h.app.workspaces.accept_invite(bob.id, invite.id, now).await.unwrap();
    let err = h
        .app
        .workspaces
        .invite(&owner, "bob@example.com", WorkspaceRole::Editor, now)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(ConflictKind::AlreadyMember)));

    let err = h
        .app
        .workspaces
        .invite(&owner, "new@example.com", WorkspaceRole::Owner, now)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);

    // editors cannot invite
    let editor = h.actor(&bob, now).await;
    let err = h
        .app
        .workspaces
        .invite(&editor, "new@example.com", WorkspaceRole::Viewer, now)
        .await
        .unwrap_err();
    assert_eq!(err.denial().unwrap().reason, DenialReason::InsufficientRole);
}

#[tokio::test]
async fn test_owner_is_protected() {
    let h = Harness::new();
    let now = start();
    let ana = h.register("ana@example.com", "Acme").await;
    let bob = h.register("bob@example.com", "Bob Co").await;
    let cid = h.register("cid@example.com", "Cid Co").await;

    let owner = h.actor(&ana, now).await;
    h.app.billing.change_plan(&owner, "starter", now).await.unwrap();
    let owner = h.actor(&ana, now).await;
    for (user, role) in [(&bob, WorkspaceRole::Admin), (&cid, WorkspaceRole::Editor)] {
        let invite = h.app.workspaces.invite(&owner, &user.email, role, now).await.unwrap();
        h.app.workspaces.accept_invite(user.id, invite.id, now).await.unwrap();
    }

    let admin = h.actor(&bob, now).await;
    let err = h
        .app
        .workspaces
        .update_role(&admin, ana.id, WorkspaceRole::Viewer, now)
        .await
        .unwrap_err();
    assert_eq!(err.denial().unwrap().reason, DenialReason::InsufficientRole);

    let err = h.app.workspaces.remove_member(&admin, ana.id, now).await.unwrap_err();
    assert_eq!(err.status_code(), 403);

    let err = h
        .app
        .workspaces
        .update_role(&owner, cid.id, WorkspaceRole::Owner, now)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);

    // editors cannot manage members at all
    let editor = h.actor(&cid, now).await;
    let err = h
        .app
        .workspaces
        .update_role(&editor, bob.id, WorkspaceRole::Viewer, now)
        .await
        .unwrap_err();
    assert_eq!(err.denial().unwrap().action, "member:update");

    // admins manage everyone else
    let updated = h
        .app
        .workspaces
        .update_role(&admin, cid.id, WorkspaceRole::Viewer, now)
        .await
        .unwrap();
    assert_eq!(updated.role, WorkspaceRole::Viewer);
    h.app.workspaces.remove_member(&admin, cid.id, now).await.unwrap();

    let members = h.app.workspaces.list_members(&owner, now).await.unwrap();
    assert_eq!(members.len(), 2);

    // cid falls back to their own workspace
    let cid_actor = h.actor(&cid, now).await;
    assert_eq!(cid_actor.tenant.name, "Cid Co");
}

#[tokio::test]
async fn test_switch_workspace() {
    let h = Harness::new();
    let now = start();
    let ana = h.register("ana@example.com", "Acme").await;
    let bob = h.register("bob@example.com", "Bob Co").await;

    let bob_home = h.actor(&bob, now).await.tenant_id();
    let owner = h.actor(&ana, now).await;
    h.app.billing.change_plan(&owner, "starter", now).await.unwrap();
    let owner = h.actor(&ana, now).await;
    let invite = h
        .app
        .workspaces
        .invite(&owner, "bob@example.com", WorkspaceRole::Viewer, now)
        .await
        .unwrap();
    h.app.workspaces.accept_invite(bob.id, invite.id, now).await.unwrap();

    let summary = h
        .app
        .workspaces
        .switch_workspace(bob.id, bob_home, now)
        .await
        .unwrap();
    assert_eq!(summary.role, WorkspaceRole::Owner);
    assert_eq!(h.actor(&bob, now).await.tenant_id(), bob_home);

    let listed = h.app.workspaces.list_workspaces(bob.id, now).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed.iter().filter(|w| w.is_current).count(), 1);

    let stranger = h.register("eve@example.com", "Eve Co").await;
    let err = h
        .app
        .workspaces
        .switch_workspace(stranger.id, bob_home, now)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_expired_workspace_allow_list() {
    let h = Harness::new();
    let ana = h.register("ana@example.com", "Acme").await;
    let later = start() + Duration::days(15);

    let owner = h.actor(&ana, later).await;
    let err = h
        .app
        .posts
        .create(
            &owner,
            socialflow_core::NewPost {
                caption: "Hi".to_string(),
                ..Default::default()
            },
            later,
        )
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 402);
    assert_eq!(err.denial().unwrap().reason, DenialReason::Expired);
    assert_eq!(h.app.posts.list(&owner, None, later).await.unwrap_err().status_code(), 402);
    assert_eq!(h.app.workspaces.list_members(&owner, later).await.unwrap_err().status_code(), 402);

    let subscription = h.app.billing.subscription(&owner, later).await.unwrap();
    assert!(subscription.is_expired);
    assert_eq!(subscription.days_remaining, 0);
    h.app.workspaces.workspace(&owner, later).await.unwrap();
    h.app
        .workspaces
        .update_settings(
            &owner,
            SettingsPatch {
                timezone: Some("Europe/Lisbon".to_string()),
                ..Default::default()
            },
            later,
        )
        .await
        .unwrap();

    h.app.billing.change_plan(&owner, "starter", later).await.unwrap();
    let owner = h.actor(&ana, later).await;
    assert_eq!(owner.tenant.settings.timezone, "Europe/Lisbon");
    h.app.posts.list(&owner, None, later).await.unwrap();
}

#[tokio::test]
async fn test_branding_requires_white_label() {
    let h = Harness::new();
    let now = start();
    let ana = h.register("ana@example.com", "Acme").await;
    let owner = h.actor(&ana, now).await;

    let patch = SettingsPatch {
        branding: Some(BrandingSettings {
            company_name: Some("Acme Inc".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    };
    let err = h
        .app
        .workspaces
        .update_settings(&owner, patch.clone(), now)
        .await
        .unwrap_err();
    assert_eq!(err.denial().unwrap().reason, DenialReason::FeatureDisabled);

    h.app.billing.change_plan(&owner, "enterprise", now).await.unwrap();
    let owner = h.actor(&ana, now).await;
    let settings = h.app.workspaces.update_settings(&owner, patch, now).await.unwrap();
    assert_eq!(settings.branding.company_name.as_deref(), Some("Acme Inc"));
}

#[tokio::test]
async fn test_only_owner_changes_plan() {
    let h = Harness::new();
    let now = start();
    let ana = h.register("ana@example.com", "Acme").await;
    let bob = h.register("bob@example.com", "Bob Co").await;

    let owner = h.actor(&ana, now).await;
    h.app.billing.change_plan(&owner, "starter", now).await.unwrap();
    let owner = h.actor(&ana, now).await;
    let invite = h
        .app
        .workspaces
        .invite(&owner, "bob@example.com", WorkspaceRole::Admin, now)
        .await
        .unwrap();
    h.app.workspaces.accept_invite(bob.id, invite.id, now).await.unwrap();

    let admin = h.actor(&bob, now).await;
    let err = h.app.billing.change_plan(&admin, "enterprise", now).await.unwrap_err();
    assert_eq!(err.status_code(), 403);
    h.app.billing.subscription(&admin, now).await.unwrap();

    let err = h.app.billing.change_plan(&owner, "platinum", now).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
}
