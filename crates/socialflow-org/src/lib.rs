//! # SocialFlow Workspaces
//!
//! Multi-tenant workspace model for SocialFlow: tenants, members and invites,
//! plan tiers, subscription state, and the entitlement gate that decides what
//! a tenant may do right now.
//!
//! ## Architecture
//!
//! ```text
//! User
//!   ├─ Membership (role) ─→ Tenant
//!   │                         ├─ SubscriptionState ─→ Plan (limits, features)
//!   │                         ├─ TenantSettings
//!   │                         └─ Invites
//!   └─ UserContext (current workspace)
//! ```
//!
//! ## Entitlements
//!
//! The gate is a pure decision over a plan, a subscription state and a usage
//! snapshot. It never reads storage; callers compute usage and write under the
//! same tenant lock.
//!
//! ```rust
//! use chrono::Utc;
//! use socialflow_org::{authorize, GatedAction, SubscriptionState, UsageSnapshot};
//!
//! let now = Utc::now();
//! let subscription = SubscriptionState::trial(now);
//!
//! let mut usage = UsageSnapshot::default();
//! assert!(authorize(&subscription, GatedAction::CreatePost, &usage, now).is_ok());
//!
//! usage.posts_this_month = 10;
//! let denial = authorize(&subscription, GatedAction::CreatePost, &usage, now).unwrap_err();
//! assert_eq!(denial.limit, Some(10));
//! ```

pub mod context;
pub mod entitlement;
pub mod invite;
pub mod membership;
pub mod plans;
pub mod roles;
pub mod settings;
pub mod subscription;
pub mod tenant;

pub use context::UserContext;
pub use entitlement::{
    authorize, authorize_invite, Denial, DenialReason, Feature, GatedAction, UsageCounter,
    UsageSnapshot,
};
pub use invite::{normalize_email, Invite, InviteError, InviteStatus, INVITE_TTL_DAYS};
pub use membership::Membership;
pub use plans::{Limit, Plan, PlanFeatures, PlanId, PlanLimits};
pub use roles::WorkspaceRole;
pub use settings::{BrandingSettings, NotificationSettings, SettingsPatch, TenantSettings};
pub use subscription::{SubscriptionState, SubscriptionStatus, PAID_PERIOD_DAYS, TRIAL_DAYS};
pub use tenant::{Tenant, TenantSummary};
