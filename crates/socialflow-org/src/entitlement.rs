//! Entitlement gate
//!
//! Decides whether a tenant may perform an action right now, given its
//! subscription and a freshly computed [`UsageSnapshot`]. Pure: no storage
//! access and no side effects.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! - general actions: expiry, then feature flag, then numeric limit
//! - invites ([`authorize_invite`]): inviter role, then team size, then expiry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::plans::{Plan, PlanId};
use crate::roles::WorkspaceRole;
use crate::subscription::SubscriptionState;

/// Per-tenant usage counters derived from stored data.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UsageCounter {
    PostsThisMonth,
    Templates,
    LandingPages,
    AiGenerationsThisMonth,
    SocialAccounts,
    TeamMembers,
}

impl UsageCounter {
    pub fn all() -> &'static [UsageCounter] {
        &[
            UsageCounter::PostsThisMonth,
            UsageCounter::Templates,
            UsageCounter::LandingPages,
            UsageCounter::AiGenerationsThisMonth,
            UsageCounter::SocialAccounts,
            UsageCounter::TeamMembers,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UsageCounter::PostsThisMonth => "posts_per_month",
            UsageCounter::Templates => "templates",
            UsageCounter::LandingPages => "landing_pages",
            UsageCounter::AiGenerationsThisMonth => "ai_generations_per_month",
            UsageCounter::SocialAccounts => "social_accounts",
            UsageCounter::TeamMembers => "team_members",
        }
    }
}

/// Boolean plan features.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    AiContent,
    LeadCapture,
    WhiteLabel,
    ApiAccess,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::AiContent => "ai_content",
            Feature::LeadCapture => "lead_capture",
            Feature::WhiteLabel => "white_label",
            Feature::ApiAccess => "api_access",
        }
    }
}

/// Every tenant-scoped action the gate knows about.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GatedAction {
    CreatePost,
    CreateTemplate,
    CreateLandingPage,
    ConnectSocialAccount,
    GenerateAi,
    InviteMember,
    AcceptInvite,
    /// Public lead submission on one of the tenant's landing pages.
    CaptureLead,
    WhiteLabel,
    /// Read posts, templates, pages, accounts and the queue.
    ReadContent,
    /// Update or delete existing content.
    EditContent,
    PublishPost,
    RunScheduler,
    SyncSocialAccount,
    ReadMembers,
    ManageMembers,
    ReadSubscription,
    ChangePlan,
    ReadSettings,
    UpdateSettings,
}

impl GatedAction {
    /// The counter this action consumes, if any.
    pub fn counter(&self) -> Option<UsageCounter> {
        match self {
            GatedAction::CreatePost => Some(UsageCounter::PostsThisMonth),
            GatedAction::CreateTemplate => Some(UsageCounter::Templates),
            GatedAction::CreateLandingPage => Some(UsageCounter::LandingPages),
            GatedAction::ConnectSocialAccount => Some(UsageCounter::SocialAccounts),
            GatedAction::GenerateAi => Some(UsageCounter::AiGenerationsThisMonth),
            GatedAction::InviteMember | GatedAction::AcceptInvite => Some(UsageCounter::TeamMembers),
            _ => None,
        }
    }

    /// The plan feature this action requires, if any.
    pub fn feature(&self) -> Option<Feature> {
        match self {
            GatedAction::GenerateAi => Some(Feature::AiContent),
            GatedAction::CaptureLead => Some(Feature::LeadCapture),
            GatedAction::WhiteLabel => Some(Feature::WhiteLabel),
            _ => None,
        }
    }

    /// Actions still permitted once the subscription has expired, so that a
    /// locked-out tenant can always see its state and upgrade.
    pub fn allowed_when_expired(&self) -> bool {
        matches!(
            self,
            GatedAction::ReadSubscription
                | GatedAction::ChangePlan
                | GatedAction::ReadSettings
                | GatedAction::UpdateSettings
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GatedAction::CreatePost => "create_post",
            GatedAction::CreateTemplate => "create_template",
            GatedAction::CreateLandingPage => "create_landing_page",
            GatedAction::ConnectSocialAccount => "connect_social_account",
            GatedAction::GenerateAi => "generate_ai",
            GatedAction::InviteMember => "invite_member",
            GatedAction::AcceptInvite => "accept_invite",
            GatedAction::CaptureLead => "capture_lead",
            GatedAction::WhiteLabel => "white_label",
            GatedAction::ReadContent => "read_content",
            GatedAction::EditContent => "edit_content",
            GatedAction::PublishPost => "publish_post",
            GatedAction::RunScheduler => "run_scheduler",
            GatedAction::SyncSocialAccount => "sync_social_account",
            GatedAction::ReadMembers => "read_members",
            GatedAction::ManageMembers => "manage_members",
            GatedAction::ReadSubscription => "read_subscription",
            GatedAction::ChangePlan => "change_plan",
            GatedAction::ReadSettings => "read_settings",
            GatedAction::UpdateSettings => "update_settings",
        }
    }
}

impl fmt::Display for GatedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts for a tenant at a point in time.
///
/// Monthly counters cover the UTC calendar month containing the instant the
/// snapshot was taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub posts_this_month: u64,
    pub templates: u64,
    pub landing_pages: u64,
    pub ai_generations_this_month: u64,
    pub social_accounts: u64,
    pub team_members: u64,
}

impl UsageSnapshot {
    pub fn get(&self, counter: UsageCounter) -> u64 {
        match counter {
            UsageCounter::PostsThisMonth => self.posts_this_month,
            UsageCounter::Templates => self.templates,
            UsageCounter::LandingPages => self.landing_pages,
            UsageCounter::AiGenerationsThisMonth => self.ai_generations_this_month,
            UsageCounter::SocialAccounts => self.social_accounts,
            UsageCounter::TeamMembers => self.team_members,
        }
    }

    pub fn set(&mut self, counter: UsageCounter, value: u64) {
        match counter {
            UsageCounter::PostsThisMonth => self.posts_this_month = value,
            UsageCounter::Templates => self.templates = value,
            UsageCounter::LandingPages => self.landing_pages = value,
            UsageCounter::AiGenerationsThisMonth => self.ai_generations_this_month = value,
            UsageCounter::SocialAccounts => self.social_accounts = value,
            UsageCounter::TeamMembers => self.team_members = value,
        }
    }
}

/// Why the gate said no.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    Expired,
    LimitReached,
    FeatureDisabled,
    InsufficientRole,
}

impl DenialReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenialReason::Expired => "expired",
            DenialReason::LimitReached => "limit_reached",
            DenialReason::FeatureDisabled => "feature_disabled",
            DenialReason::InsufficientRole => "insufficient_role",
        }
    }
}

/// A structured refusal, detailed enough for a client to render a specific
/// upgrade prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Denial {
    pub reason: DenialReason,

    /// Gated action or `resource:action` permission that was refused
    pub action: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter: Option<UsageCounter>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<Feature>,

    /// Cheapest plan under which the action would pass
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_plan: Option<PlanId>,

    /// Human-readable summary
    pub message: String,
}

impl Denial {
    pub fn expired(action: GatedAction) -> Self {
        Self {
            reason: DenialReason::Expired,
            action: action.to_string(),
            counter: None,
            usage: None,
            limit: None,
            feature: None,
            required_plan: None,
            message: "Your subscription has expired. Choose a plan to continue.".to_string(),
        }
    }

    pub fn limit_reached(action: GatedAction, counter: UsageCounter, usage: u64, limit: u32) -> Self {
        Self {
            reason: DenialReason::LimitReached,
            action: action.to_string(),
            counter: Some(counter),
            usage: Some(usage),
            limit: Some(limit),
            feature: None,
            required_plan: cheapest_plan_for_usage(counter, usage),
            message: format!(
                "Plan limit reached for {}: {usage} of {limit} used.",
                counter.as_str()
            ),
        }
    }

    pub fn feature_disabled(action: GatedAction, feature: Feature) -> Self {
        Self {
            reason: DenialReason::FeatureDisabled,
            action: action.to_string(),
            counter: None,
            usage: None,
            limit: None,
            feature: Some(feature),
            required_plan: cheapest_plan_with_feature(feature),
            message: format!("{} is not included in your plan.", feature.as_str()),
        }
    }

    /// Role refusal for `action`, which may be a gated action name or a
    /// `resource:action` permission.
    pub fn insufficient_role(action: impl Into<String>, role: WorkspaceRole) -> Self {
        let action = action.into();
        Self {
            message: format!("The {} role may not perform {action}.", role.as_str()),
            reason: DenialReason::InsufficientRole,
            action,
            counter: None,
            usage: None,
            limit: None,
            feature: None,
            required_plan: None,
        }
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.reason.as_str())
    }
}

/// Decide whether `action` is allowed.
///
/// An action with a counter is allowed only while `usage < limit`; the
/// prospective new item is not yet counted.
pub fn authorize(
    subscription: &SubscriptionState,
    action: GatedAction,
    usage: &UsageSnapshot,
    now: DateTime<Utc>,
) -> Result<(), Denial> {
    if subscription.is_expired(now) && !action.allowed_when_expired() {
        return Err(Denial::expired(action));
    }

    let plan = subscription.plan.plan();

    if let Some(feature) = action.feature() {
        if !plan.has_feature(feature) {
            return Err(Denial::feature_disabled(action, feature));
        }
    }

    if let Some(counter) = action.counter() {
        check_limit(&plan, action, counter, usage)?;
    }

    Ok(())
}

/// Decide whether a member holding `inviter_role` may invite someone.
pub fn authorize_invite(
    inviter_role: WorkspaceRole,
    subscription: &SubscriptionState,
    usage: &UsageSnapshot,
    now: DateTime<Utc>,
) -> Result<(), Denial> {
    let action = GatedAction::InviteMember;

    if !inviter_role.can_manage_members() {
        return Err(Denial::insufficient_role(action.as_str(), inviter_role));
    }

    check_limit(
        &subscription.plan.plan(),
        action,
        UsageCounter::TeamMembers,
        usage,
    )?;

    if subscription.is_expired(now) {
        return Err(Denial::expired(action));
    }

    Ok(())
}

fn check_limit(
    plan: &Plan,
    action: GatedAction,
    counter: UsageCounter,
    usage: &UsageSnapshot,
) -> Result<(), Denial> {
    let limit = plan.limit(counter);
    let used = usage.get(counter);
    if limit.allows(used) {
        return Ok(());
    }
    // allows() only fails for capped limits
    let cap = limit.cap().unwrap_or_default();
    Err(Denial::limit_reached(action, counter, used, cap))
}

fn cheapest_plan_for_usage(counter: UsageCounter, usage: u64) -> Option<PlanId> {
    PlanId::all()
        .iter()
        .copied()
        .find(|id| id.plan().limit(counter).allows(usage))
}

fn cheapest_plan_with_feature(feature: Feature) -> Option<PlanId> {
    PlanId::all()
        .iter()
        .copied()
        .find(|id| id.plan().has_feature(feature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn on_plan(plan: PlanId) -> SubscriptionState {
        SubscriptionState::active(plan, now())
    }

    fn usage_of(counter: UsageCounter, value: u64) -> UsageSnapshot {
        let mut usage = UsageSnapshot::default();
        usage.set(counter, value);
        usage
    }

    #[test]
    fn test_limit_boundary_for_every_counted_action() {
        let actions = [
            GatedAction::CreatePost,
            GatedAction::CreateTemplate,
            GatedAction::CreateLandingPage,
            GatedAction::ConnectSocialAccount,
            GatedAction::GenerateAi,
            GatedAction::AcceptInvite,
        ];
        for plan in [PlanId::Free, PlanId::Starter, PlanId::Professional] {
            let sub = on_plan(plan);
            for action in actions {
                let counter = action.counter().unwrap();
                let cap = u64::from(plan.plan().limit(counter).cap().unwrap());

                assert!(authorize(&sub, action, &usage_of(counter, cap - 1), now()).is_ok());

                let denial = authorize(&sub, action, &usage_of(counter, cap), now()).unwrap_err();
                assert_eq!(denial.reason, DenialReason::LimitReached);
                assert_eq!(denial.counter, Some(counter));
                assert_eq!(denial.usage, Some(cap));
            }
        }
    }

    #[test]
    fn test_unlimited_never_denies() {
        let sub = on_plan(PlanId::Enterprise);
        let usage = usage_of(UsageCounter::PostsThisMonth, 1_000_000);
        assert!(authorize(&sub, GatedAction::CreatePost, &usage, now()).is_ok());
    }

    #[test]
    fn test_denial_suggests_cheapest_sufficient_plan() {
        let sub = on_plan(PlanId::Free);
        let denial = authorize(
            &sub,
            GatedAction::CreatePost,
            &usage_of(UsageCounter::PostsThisMonth, 10),
            now(),
        )
        .unwrap_err();
        assert_eq!(denial.limit, Some(10));
        assert_eq!(denial.required_plan, Some(PlanId::Starter));

        let sub = on_plan(PlanId::Starter);
        let denial = authorize(
            &sub,
            GatedAction::CreatePost,
            &usage_of(UsageCounter::PostsThisMonth, 500),
            now(),
        )
        .unwrap_err();
        assert_eq!(denial.required_plan, Some(PlanId::Enterprise));
    }

    #[test]
    fn test_expired_allows_only_allow_list() {
        let mut sub = on_plan(PlanId::Professional);
        sub.expire(now());
        let usage = UsageSnapshot::default();

        let allowed = [
            GatedAction::ReadSubscription,
            GatedAction::ChangePlan,
            GatedAction::ReadSettings,
            GatedAction::UpdateSettings,
        ];
        for action in allowed {
            assert!(authorize(&sub, action, &usage, now()).is_ok(), "{action}");
        }

        let denied = [
            GatedAction::CreatePost,
            GatedAction::ReadContent,
            GatedAction::EditContent,
            GatedAction::PublishPost,
            GatedAction::RunScheduler,
            GatedAction::GenerateAi,
            GatedAction::CaptureLead,
            GatedAction::AcceptInvite,
            GatedAction::ReadMembers,
            GatedAction::ManageMembers,
        ];
        for action in denied {
            let denial = authorize(&sub, action, &usage, now()).unwrap_err();
            assert_eq!(denial.reason, DenialReason::Expired, "{action}");
        }
    }

    #[test]
    fn test_trial_expires_by_clock() {
        let sub = SubscriptionState::trial(now());
        let usage = UsageSnapshot::default();
        let later = now() + Duration::days(14);

        assert!(authorize(&sub, GatedAction::CreatePost, &usage, now()).is_ok());
        let denial = authorize(&sub, GatedAction::CreatePost, &usage, later).unwrap_err();
        assert_eq!(denial.reason, DenialReason::Expired);
    }

    #[test]
    fn test_feature_flag_checked_before_usage() {
        let mut sub = on_plan(PlanId::Free);
        let denial =
            authorize(&sub, GatedAction::CaptureLead, &UsageSnapshot::default(), now()).unwrap_err();
        assert_eq!(denial.reason, DenialReason::FeatureDisabled);
        assert_eq!(denial.feature, Some(Feature::LeadCapture));
        assert_eq!(denial.required_plan, Some(PlanId::Starter));

        sub.change_plan(PlanId::Starter, now());
        assert!(authorize(&sub, GatedAction::CaptureLead, &UsageSnapshot::default(), now()).is_ok());

        let denial =
            authorize(&sub, GatedAction::WhiteLabel, &UsageSnapshot::default(), now()).unwrap_err();
        assert_eq!(denial.required_plan, Some(PlanId::Enterprise));
    }

    #[test]
    fn test_invite_role_checked_first() {
        let mut sub = on_plan(PlanId::Starter);
        sub.expire(now());
        let full = usage_of(UsageCounter::TeamMembers, 3);

        let denial = authorize_invite(WorkspaceRole::Editor, &sub, &full, now()).unwrap_err();
        assert_eq!(denial.reason, DenialReason::InsufficientRole);

        let denial = authorize_invite(WorkspaceRole::Admin, &sub, &full, now()).unwrap_err();
        assert_eq!(denial.reason, DenialReason::LimitReached);

        let roomy = usage_of(UsageCounter::TeamMembers, 2);
        let denial = authorize_invite(WorkspaceRole::Owner, &sub, &roomy, now()).unwrap_err();
        assert_eq!(denial.reason, DenialReason::Expired);
    }

    #[test]
    fn test_team_limit_then_upgrade() {
        let mut sub = on_plan(PlanId::Starter);
        let usage = usage_of(UsageCounter::TeamMembers, 3);

        let denial = authorize_invite(WorkspaceRole::Owner, &sub, &usage, now()).unwrap_err();
        assert_eq!(denial.reason, DenialReason::LimitReached);
        assert_eq!(denial.limit, Some(3));
        assert_eq!(denial.required_plan, Some(PlanId::Professional));

        sub.change_plan(PlanId::Professional, now());
        assert!(authorize_invite(WorkspaceRole::Owner, &sub, &usage, now()).is_ok());
    }

    #[test]
    fn test_denial_serializes_for_clients() {
        let denial = Denial::limit_reached(GatedAction::CreateTemplate, UsageCounter::Templates, 5, 5);
        let json = serde_json::to_value(&denial).unwrap();
        assert_eq!(json["reason"], "limit_reached");
        assert_eq!(json["action"], "create_template");
        assert_eq!(json["counter"], "templates");
        assert_eq!(json["usage"], 5);
        assert_eq!(json["limit"], 5);
        assert_eq!(json["required_plan"], "starter");
        assert!(json.get("feature").is_none());
    }
}
