//! Subscription state
//!
//! Each tenant carries one [`SubscriptionState`]. Whether it is expired is
//! always derived from the stored expiry and the caller's clock; the stored
//! status only says which kind of period the tenant is in.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::plans::PlanId;

/// Length of the trial granted to new workspaces.
pub const TRIAL_DAYS: i64 = 14;

/// Length of a paid period after a plan change.
pub const PAID_PERIOD_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Trialing,
    Active,
    Expired,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Expired => "expired",
        }
    }
}

/// A tenant's plan and the period it is paid (or trialing) through.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, Utc};
/// use socialflow_org::{PlanId, SubscriptionState, SubscriptionStatus};
///
/// let now = Utc::now();
/// let sub = SubscriptionState::trial(now);
/// assert_eq!(sub.plan, PlanId::Free);
/// assert_eq!(sub.days_remaining(now), 14);
/// assert!(sub.is_expired(now + Duration::days(15)));
/// assert_eq!(sub.effective_status(now + Duration::days(15)), SubscriptionStatus::Expired);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionState {
    /// Active plan
    pub plan: PlanId,

    /// Stored status; see [`effective_status`](Self::effective_status)
    pub status: SubscriptionStatus,

    /// End of the current trial or paid period
    pub expires_at: DateTime<Utc>,

    /// Last plan change or renewal
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionState {
    /// Default state for a new workspace: free plan, trialing.
    pub fn trial(now: DateTime<Utc>) -> Self {
        Self {
            plan: PlanId::Free,
            status: SubscriptionStatus::Trialing,
            expires_at: now + Duration::days(TRIAL_DAYS),
            updated_at: now,
        }
    }

    /// An active paid period starting at `now`.
    pub fn active(plan: PlanId, now: DateTime<Utc>) -> Self {
        Self {
            plan,
            status: SubscriptionStatus::Active,
            expires_at: now + Duration::days(PAID_PERIOD_DAYS),
            updated_at: now,
        }
    }

    /// Switch plan and start a fresh paid period.
    ///
    /// Payment is settled elsewhere; this records the result.
    pub fn change_plan(&mut self, plan: PlanId, now: DateTime<Utc>) {
        *self = Self::active(plan, now);
    }

    /// Extend the current plan by one paid period from `now`.
    pub fn renew(&mut self, now: DateTime<Utc>) {
        self.change_plan(self.plan, now);
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Expired || now >= self.expires_at
    }

    /// Whole days left in the period, never negative.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        if self.is_expired(now) {
            return 0;
        }
        (self.expires_at - now).num_days().max(0)
    }

    /// Status with expiry applied at `now`.
    pub fn effective_status(&self, now: DateTime<Utc>) -> SubscriptionStatus {
        if self.is_expired(now) {
            SubscriptionStatus::Expired
        } else {
            self.status
        }
    }

    /// Force the subscription into the expired state.
    pub fn expire(&mut self, now: DateTime<Utc>) {
        self.status = SubscriptionStatus::Expired;
        self.expires_at = self.expires_at.min(now);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hours: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap_or_default() + Duration::hours(hours)
    }

    #[test]
    fn test_trial_defaults() {
        let sub = SubscriptionState::trial(at(0));
        assert_eq!(sub.plan, PlanId::Free);
        assert_eq!(sub.status, SubscriptionStatus::Trialing);
        assert_eq!(sub.expires_at, at(24 * 14));
    }

    #[test]
    fn test_expiry_boundary() {
        let sub = SubscriptionState::trial(at(0));
        assert!(!sub.is_expired(at(24 * 14 - 1)));
        assert!(sub.is_expired(at(24 * 14)));
    }

    #[test]
    fn test_days_remaining() {
        let sub = SubscriptionState::trial(at(0));
        assert_eq!(sub.days_remaining(at(0)), 14);
        assert_eq!(sub.days_remaining(at(24 * 13 + 1)), 0);
        assert_eq!(sub.days_remaining(at(24 * 12)), 2);
        assert_eq!(sub.days_remaining(at(24 * 30)), 0);
    }

    #[test]
    fn test_change_plan_starts_paid_period() {
        let mut sub = SubscriptionState::trial(at(0));
        sub.change_plan(PlanId::Professional, at(24 * 20));

        assert_eq!(sub.plan, PlanId::Professional);
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert!(!sub.is_expired(at(24 * 20)));
        assert_eq!(sub.days_remaining(at(24 * 20)), PAID_PERIOD_DAYS);
    }

    #[test]
    fn test_explicit_expire() {
        let mut sub = SubscriptionState::active(PlanId::Starter, at(0));
        sub.expire(at(1));
        assert!(sub.is_expired(at(1)));
        assert_eq!(sub.effective_status(at(0)), SubscriptionStatus::Expired);

        sub.renew(at(2));
        assert_eq!(sub.plan, PlanId::Starter);
        assert_eq!(sub.effective_status(at(2)), SubscriptionStatus::Active);
    }
}
