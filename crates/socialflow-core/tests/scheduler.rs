mod common;

use chrono::Duration;
use common::{failing_registry, platforms, start, Harness};
use socialflow_connectors::{Platform, PublishError};
use socialflow_core::{NewPost, OauthConnection, PostStatus, RunStatus};
use socialflow_events::{EventBus, PostEvent};
use socialflow_org::WorkspaceRole;

fn scheduled(caption: &str, list: &[Platform], at: chrono::DateTime<chrono::Utc>) -> NewPost {
    NewPost {
        caption: caption.to_string(),
        platforms: platforms(list),
        scheduled_at: Some(at),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_schedule_then_process() {
    let h = Harness::new();
    let now = start();
    let ana = h.register("ana@example.com", "Acme").await;
    let owner = h.actor(&ana, now).await;

    let account = h
        .app
        .accounts
        .connect_mock(&owner, Platform::Instagram, "@acme", now)
        .await
        .unwrap();
    let post = h
        .app
        .posts
        .create(
            &owner,
            scheduled("launch", &[Platform::Instagram, Platform::Facebook], now + Duration::hours(1)),
            now,
        )
        .await
        .unwrap();

    let mut events = h.app.events().subscribe("post.published").await.unwrap();

    let early = h.app.scheduler.process(now, None).await.unwrap();
    assert_eq!(early.attempted, 0);
    assert!(early.results.is_empty());

    let later = now + Duration::hours(2);
    let report = h.app.scheduler.process(later, None).await.unwrap();
    assert_eq!(report.attempted, 1);
    assert_eq!(report.published, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.results[0].post_id, post.id);
    assert_eq!(report.results[0].status, RunStatus::Published);

    let published = h.app.posts.get(&owner, post.id, later).await.unwrap();
    assert_eq!(published.status, PostStatus::Published);
    let result = published.result.unwrap();
    assert_eq!(result.total_reach, 2000);
    let instagram = result
        .outcomes
        .iter()
        .find(|o| o.platform == Platform::Instagram)
        .unwrap();
    assert_eq!(instagram.account_id, Some(account.id));
    let facebook = result
        .outcomes
        .iter()
        .find(|o| o.platform == Platform::Facebook)
        .unwrap();
    assert_eq!(facebook.account_id, None);

    let event = events.try_recv().unwrap();
    let parsed: PostEvent = event.parse_payload().unwrap();
    assert!(matches!(parsed, PostEvent::Published { total_reach: 2000, .. }));

    // nothing left to do
    let again = h.app.scheduler.process(later, None).await.unwrap();
    assert_eq!(again.attempted, 0);
    assert_eq!(again.skipped, 0);
}

#[tokio::test]
async fn test_list_due_is_ordered_and_idempotent() {
    let h = Harness::new();
    let now = start();
    let ana = h.register("ana@example.com", "Acme").await;
    let owner = h.actor(&ana, now).await;

    let late = h
        .app
        .posts
        .create(&owner, scheduled("late", &[Platform::Twitter], now + Duration::hours(3)), now)
        .await
        .unwrap();
    let early = h
        .app
        .posts
        .create(&owner, scheduled("early", &[Platform::Twitter], now + Duration::hours(1)), now)
        .await
        .unwrap();
    let tie = h
        .app
        .posts
        .create(&owner, scheduled("tie", &[Platform::Twitter], now + Duration::hours(1)), now)
        .await
        .unwrap();
    h.app
        .posts
        .create(&owner, scheduled("future", &[Platform::Twitter], now + Duration::days(2)), now)
        .await
        .unwrap();

    let at = now + Duration::hours(4);
    let first: Vec<_> = h
        .app
        .scheduler
        .list_due(at, None)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    let second: Vec<_> = h
        .app
        .scheduler
        .list_due(at, None)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();

    let mut tied = [early.id, tie.id];
    tied.sort();
    assert_eq!(first, vec![tied[0], tied[1], late.id]);
    assert_eq!(first, second);

    let queue = h.app.scheduler.queue(&owner, at).await.unwrap();
    assert_eq!(queue.total, 4);
    assert_eq!(queue.due, 3);
    assert_eq!(queue.retrying, 0);
}

#[tokio::test]
async fn test_failure_does_not_abort_sweep() {
    let h = Harness::with_registry(failing_registry(PublishError::RateLimited(
        "slow down".to_string(),
    )));
    let now = start();
    let ana = h.register("ana@example.com", "Acme").await;
    let owner = h.actor(&ana, now).await;

    h.app
        .accounts
        .connect_oauth(
            &owner,
            OauthConnection {
                platform: Platform::Facebook,
                account_name: "Acme Page".to_string(),
                external_page_id: "1234".to_string(),
                access_token: "page-token".to_string(),
            },
            now,
        )
        .await
        .unwrap();

    let doomed = h
        .app
        .posts
        .create(&owner, scheduled("fb", &[Platform::Facebook], now + Duration::minutes(10)), now)
        .await
        .unwrap();
    let fine = h
        .app
        .posts
        .create(&owner, scheduled("ig", &[Platform::Instagram], now + Duration::minutes(20)), now)
        .await
        .unwrap();

    let at = now + Duration::hours(1);
    let report = h.app.scheduler.process(at, None).await.unwrap();
    assert_eq!(report.attempted, 2);
    assert_eq!(report.published, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.results[0].post_id, doomed.id);
    assert_eq!(report.results[0].retryable, Some(true));

    let failed = h.app.posts.get(&owner, doomed.id, at).await.unwrap();
    assert_eq!(failed.status, PostStatus::Failed);
    let failure = failed.failure.unwrap();
    assert!(failure.retryable);
    assert_eq!(failure.platform, Some(Platform::Facebook));
    assert_eq!(
        h.app.posts.get(&owner, fine.id, at).await.unwrap().status,
        PostStatus::Published
    );

    // retryable failures are picked up again
    let due = h.app.scheduler.list_due(at, None).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, doomed.id);
    let queue = h.app.scheduler.queue(&owner, at).await.unwrap();
    assert_eq!(queue.retrying, 1);

    let retry = h.app.scheduler.process(at, None).await.unwrap();
    assert_eq!(retry.failed, 1);
    assert_eq!(h.app.posts.get(&owner, doomed.id, at).await.unwrap().attempts, 2);
}

#[tokio::test]
async fn test_permanent_failure_is_terminal() {
    let h = Harness::with_registry(failing_registry(PublishError::Unauthorized(
        "token revoked".to_string(),
    )));
    let now = start();
    let ana = h.register("ana@example.com", "Acme").await;
    let owner = h.actor(&ana, now).await;

    h.app
        .accounts
        .connect_oauth(
            &owner,
            OauthConnection {
                platform: Platform::Instagram,
                account_name: "acme".to_string(),
                external_page_id: "17841".to_string(),
                access_token: "ig-token".to_string(),
            },
            now,
        )
        .await
        .unwrap();
    let post = h
        .app
        .posts
        .create(&owner, scheduled("ig", &[Platform::Instagram], now + Duration::minutes(5)), now)
        .await
        .unwrap();

    let at = now + Duration::hours(1);
    let report = h.app.scheduler.process(at, None).await.unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(report.results[0].retryable, Some(false));
    assert!(h.app.scheduler.list_due(at, None).await.unwrap().is_empty());

    // publish now surfaces the upstream error
    let err = h.app.posts.publish_now(&owner, post.id, at).await.unwrap_err();
    assert_eq!(err.status_code(), 502);
}

#[tokio::test]
async fn test_expired_tenants_are_skipped() {
    let h = Harness::new();
    let now = start();
    let ana = h.register("ana@example.com", "Acme").await;
    let bob = h.register("bob@example.com", "Bob Co").await;

    let acme = h.actor(&ana, now).await;
    let bob_co = h.actor(&bob, now).await;
    h.app.billing.change_plan(&bob_co, "starter", now).await.unwrap();

    let at = now + Duration::days(20);
    let stale = h
        .app
        .posts
        .create(&acme, scheduled("expired", &[Platform::Linkedin], at - Duration::hours(1)), now)
        .await
        .unwrap();
    let live = h
        .app
        .posts
        .create(&bob_co, scheduled("live", &[Platform::Linkedin], at - Duration::hours(1)), now)
        .await
        .unwrap();

    let report = h.app.scheduler.process(at, None).await.unwrap();
    assert_eq!(report.skipped, 1);
    assert_eq!(report.published, 1);
    let skipped = report
        .results
        .iter()
        .find(|r| r.status == RunStatus::Skipped)
        .unwrap();
    assert_eq!(skipped.post_id, stale.id);
    assert!(report.results.iter().any(|r| r.post_id == live.id));

    // scoped runs only touch the caller's workspace
    let scoped = h.app.scheduler.process(at, Some(bob_co.tenant_id())).await.unwrap();
    assert_eq!(scoped.skipped, 0);
    assert_eq!(scoped.attempted, 0);
}

#[tokio::test]
async fn test_process_for_requires_execute() {
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
    assert_eq!(
        h.app.scheduler.process_for(&viewer, now).await.unwrap_err().status_code(),
        403
    );
    h.app.scheduler.queue(&viewer, now).await.unwrap();

    h.app
        .posts
        .create(&owner, scheduled("soon", &[Platform::Tiktok], now + Duration::minutes(1)), now)
        .await
        .unwrap();
    let report = h
        .app
        .scheduler
        .process_for(&owner, now + Duration::minutes(2))
        .await
        .unwrap();
    assert_eq!(report.published, 1);
}
