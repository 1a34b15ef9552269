mod common;

use chrono::{Duration, TimeZone, Utc};
use common::{platforms, start, Harness};
use socialflow_connectors::Platform;
use socialflow_core::{ConflictKind, CoreError, NewPost, PostStatus, PostUpdate};
use socialflow_org::{DenialReason, SettingsPatch, UsageCounter, WorkspaceRole};

fn post(caption: &str) -> NewPost {
    NewPost {
        caption: caption.to_string(),
        platforms: platforms(&[Platform::Instagram, Platform::Facebook]),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_monthly_post_limit_boundary_and_reset() {
    let h = Harness::new();
    let ana = h.register("ana@example.com", "Acme").await;
    let now = start();
    let owner = h.actor(&ana, now).await;

    for i in 0..10 {
        h.app
            .posts
            .create(&owner, post(&format!("post {i}")), now)
            .await
            .unwrap();
    }

    let err = h.app.posts.create(&owner, post("one too many"), now).await.unwrap_err();
    let denial = err.denial().unwrap();
    assert_eq!(denial.reason, DenialReason::LimitReached);
    assert_eq!(denial.counter, Some(UsageCounter::PostsThisMonth));
    assert_eq!(denial.usage, Some(10));
    assert_eq!(denial.limit, Some(10));
    assert!(denial.required_plan.is_some());

    // renew on free so April falls inside the paid period
    let renewal = Utc.with_ymd_and_hms(2026, 3, 23, 9, 0, 0).unwrap();
    let owner = h.actor(&ana, renewal).await;
    h.app.billing.change_plan(&owner, "free", renewal).await.unwrap();
    assert!(h.app.posts.create(&owner, post("still March"), renewal).await.is_err());

    let april = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
    let owner = h.actor(&ana, april).await;
    h.app.posts.create(&owner, post("fresh month"), april).await.unwrap();
}

#[tokio::test]
async fn test_concurrent_creates_cannot_exceed_limit() {
    let h = Harness::new();
    let ana = h.register("ana@example.com", "Acme").await;
    let now = start();
    let owner = h.actor(&ana, now).await;

    for i in 0..9 {
        h.app
            .posts
            .create(&owner, post(&format!("post {i}")), now)
            .await
            .unwrap();
    }

    let (first, second) = tokio::join!(
        h.app.posts.create(&owner, post("racer a"), now),
        h.app.posts.create(&owner, post("racer b"), now),
    );
    assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
    let err = first.err().or(second.err()).unwrap();
    assert_eq!(err.denial().unwrap().reason, DenialReason::LimitReached);
    assert_eq!(err.denial().unwrap().usage, Some(10));

    let posts = h.app.posts.list(&owner, None, now).await.unwrap();
    assert_eq!(posts.len(), 10);
}

#[tokio::test]
async fn test_viewer_cannot_create_posts() {
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
    h.app.workspaces.accept_invite(bob.id, invite.id, now).await.unwrap();

    let viewer = h.actor(&bob, now).await;
    let err = h.app.posts.create(&viewer, post("nope"), now).await.unwrap_err();
    let denial = err.denial().unwrap();
    assert_eq!(denial.reason, DenialReason::InsufficientRole);
    assert_eq!(denial.action, "post:create");

    let created = h.app.posts.create(&owner, post("visible"), now).await.unwrap();
    let seen = h.app.posts.get(&viewer, created.id, now).await.unwrap();
    assert_eq!(seen.caption, "visible");
    assert_eq!(
        h.app.posts.publish_now(&viewer, created.id, now).await.unwrap_err().status_code(),
        403
    );
}

#[tokio::test]
async fn test_status_follows_schedule() {
    let h = Harness::new();
    let now = start();
    let ana = h.register("ana@example.com", "Acme").await;
    let owner = h.actor(&ana, now).await;

    let past = NewPost {
        scheduled_at: Some(now - Duration::minutes(5)),
        ..post("past")
    };
    let created = h.app.posts.create(&owner, past, now).await.unwrap();
    assert_eq!(created.status, PostStatus::Draft);
    assert!(created.scheduled_at.is_none());

    let future = NewPost {
        scheduled_at: Some(now + Duration::hours(1)),
        ..post("future")
    };
    let created = h.app.posts.create(&owner, future, now).await.unwrap();
    assert_eq!(created.status, PostStatus::Scheduled);

    let err = h
        .app
        .posts
        .schedule(&owner, created.id, now, now)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidSchedule(_)));
    assert_eq!(err.status_code(), 400);

    let err = h
        .app
        .posts
        .update(
            &owner,
            created.id,
            PostUpdate {
                scheduled_at: Some(now - Duration::hours(1)),
                ..Default::default()
            },
            now,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidSchedule(_)));

    // a rejected edit leaves the post untouched
    let unchanged = h.app.posts.get(&owner, created.id, now).await.unwrap();
    assert_eq!(unchanged.scheduled_at, Some(now + Duration::hours(1)));

    let drafts = h
        .app
        .posts
        .list(&owner, Some(PostStatus::Draft), now)
        .await
        .unwrap();
    assert_eq!(drafts.len(), 1);
}

#[tokio::test]
async fn test_publish_now_is_terminal() {
    let h = Harness::new();
    let now = start();
    let ana = h.register("ana@example.com", "Acme").await;
    let owner = h.actor(&ana, now).await;

    let created = h.app.posts.create(&owner, post("launch"), now).await.unwrap();
    let published = h.app.posts.publish_now(&owner, created.id, now).await.unwrap();
    assert_eq!(published.status, PostStatus::Published);
    assert_eq!(published.attempts, 1);
    assert_eq!(published.published_at, Some(now));

    let result = published.result.unwrap();
    assert_eq!(result.outcomes.len(), 2);
    assert_eq!(result.total_reach, 2000);
    assert!(result.outcomes.iter().all(|o| o.simulated));
    assert!(result.outcomes.iter().all(|o| o.published_at == now));

    let err = h.app.posts.publish_now(&owner, created.id, now).await.unwrap_err();
    assert!(matches!(err, CoreError::Conflict(ConflictKind::AlreadyPublished)));

    let err = h
        .app
        .posts
        .update(
            &owner,
            created.id,
            PostUpdate {
                caption: Some("edited".to_string()),
                ..Default::default()
            },
            now,
        )
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 409);

    let err = h
        .app
        .posts
        .schedule(&owner, created.id, now + Duration::hours(1), now)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn test_publish_requires_platforms() {
    let h = Harness::new();
    let now = start();
    let ana = h.register("ana@example.com", "Acme").await;
    let owner = h.actor(&ana, now).await;

    let created = h
        .app
        .posts
        .create(
            &owner,
            NewPost {
                caption: "nowhere".to_string(),
                ..Default::default()
            },
            now,
        )
        .await
        .unwrap();
    let err = h.app.posts.publish_now(&owner, created.id, now).await.unwrap_err();
    assert_eq!(err.status_code(), 400);

    let unchanged = h.app.posts.get(&owner, created.id, now).await.unwrap();
    assert_eq!(unchanged.status, PostStatus::Draft);
    assert_eq!(unchanged.attempts, 0);
}

#[tokio::test]
async fn test_default_hashtags_applied() {
    let h = Harness::new();
    let now = start();
    let ana = h.register("ana@example.com", "Acme").await;
    let owner = h.actor(&ana, now).await;

    h.app
        .workspaces
        .update_settings(
            &owner,
            SettingsPatch {
                default_hashtags: Some(vec!["#acme".to_string()]),
                ..Default::default()
            },
            now,
        )
        .await
        .unwrap();

    let created = h.app.posts.create(&owner, post("tagged"), now).await.unwrap();
    assert_eq!(created.hashtags, vec!["#acme".to_string()]);

    let explicit = NewPost {
        hashtags: vec!["#own".to_string()],
        ..post("own tags")
    };
    let created = h.app.posts.create(&owner, explicit, now).await.unwrap();
    assert_eq!(created.hashtags, vec!["#own".to_string()]);
}

#[tokio::test]
async fn test_posts_are_tenant_scoped() {
    let h = Harness::new();
    let now = start();
    let ana = h.register("ana@example.com", "Acme").await;
    let bob = h.register("bob@example.com", "Bob Co").await;

    let acme = h.actor(&ana, now).await;
    let bob_co = h.actor(&bob, now).await;
    let created = h.app.posts.create(&acme, post("private"), now).await.unwrap();

    let err = h.app.posts.get(&bob_co, created.id, now).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound("Post")));
    assert!(h.app.posts.list(&bob_co, None, now).await.unwrap().is_empty());
    assert_eq!(
        h.app.posts.delete(&bob_co, created.id, now).await.unwrap_err().status_code(),
        404
    );

    h.app.posts.delete(&acme, created.id, now).await.unwrap();
    assert!(h.app.posts.list(&acme, None, now).await.unwrap().is_empty());
}
