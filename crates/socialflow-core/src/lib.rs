//! # SocialFlow Core
//!
//! Tenant-scoped services behind the HTTP API: registration, workspaces and
//! members, the subscription, posts and the publish scheduler, social
//! accounts, templates, landing pages with lead capture, AI generation and
//! the analytics overview.
//!
//! Every service method takes the resolved [`Actor`] and an explicit `now`.
//! Mutations that count against a plan limit run under the tenant lock:
//!
//! ```text
//! lock tenant ─→ reload tenant ─→ compute usage ─→ entitlement gate ─→ write ─→ unlock ─→ event
//! ```
//!
//! so concurrent requests in one process cannot jointly exceed a limit.
//!
//! ## Example
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use socialflow_auth::JwtService;
//! use socialflow_connectors::{ConnectorRegistry, MockConnector, StaticGenerator};
//! use socialflow_core::{MemoryStore, NewPost, Registration, SocialFlow};
//! use socialflow_events::MemoryEventBus;
//! use std::sync::Arc;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = SocialFlow::new(
//!         Arc::new(MemoryStore::new()),
//!         Arc::new(MemoryEventBus::new()),
//!         ConnectorRegistry::new(MockConnector::random()),
//!         Arc::new(StaticGenerator::default()),
//!         Arc::new(JwtService::with_secret("a-very-long-secret-for-signing-tokens")?),
//!     );
//!
//!     let now = Utc::now();
//!     let session = app
//!         .identity
//!         .register(
//!             Registration {
//!                 email: "ana@example.com".into(),
//!                 password: "correct horse".into(),
//!                 name: "Ana".into(),
//!                 company_name: Some("Acme".into()),
//!             },
//!             now,
//!         )
//!         .await?;
//!
//!     let actor = app.workspaces.actor(session.user.id, now).await?;
//!     let post = NewPost {
//!         caption: "Hello".into(),
//!         ..Default::default()
//!     };
//!     app.posts.create(&actor, post, now).await?;
//!     Ok(())
//! }
//! ```

pub mod access;
pub mod account;
pub mod ai;
pub mod analytics;
pub mod app;
pub mod billing;
pub mod content;
pub mod error;
pub mod identity;
pub mod lead;
pub mod leads;
pub mod library;
pub mod memory;
pub mod post;
pub mod posts;
pub mod publisher;
pub mod scheduler;
pub mod social;
pub mod store;
pub mod usage;
pub mod user;
pub mod workspace;

pub use access::Actor;
pub use account::{publishing_account, ConnectionState, SocialAccount};
pub use ai::{AiService, Generation};
pub use analytics::{AccountTotals, AnalyticsOverview, AnalyticsService, LeadTotals, PageTotals, PostTotals};
pub use app::SocialFlow;
pub use billing::{BillingService, SubscriptionView};
pub use content::{slugify, AiGeneration, LandingPage, NewLandingPage, NewTemplate, Template};
pub use error::{ConflictKind, CoreError, CoreResult};
pub use identity::{AuthSession, IdentityService, Profile, Registration};
pub use lead::{Lead, LeadStatus, NewLead};
pub use leads::{LeadService, PublicPage};
pub use library::LibraryService;
pub use memory::MemoryStore;
pub use post::{NewPost, Post, PostFailure, PostStatus, PostUpdate, PublishResult};
pub use posts::PostService;
pub use publisher::{Attempt, Publisher};
pub use scheduler::{PostRun, ProcessReport, QueueEntry, QueueView, RunStatus, Scheduler};
pub use social::{OauthConnection, SocialAccountService, TestPostResult};
pub use store::{Store, TenantGuard};
pub use usage::MonthWindow;
pub use user::User;
pub use workspace::{MemberView, WorkspaceService, WorkspaceView};
