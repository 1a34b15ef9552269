//! Plan catalog
//!
//! The four subscription plans and the limits attached to each. Values are
//! fixed at build time; a tenant only ever points at a [`PlanId`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entitlement::{Feature, UsageCounter};

/// A numeric plan limit.
///
/// Serialized as an integer where `-1` means unlimited, which is the form
/// clients already consume.
///
/// ```
/// use socialflow_org::Limit;
///
/// assert!(Limit::Capped(3).allows(2));
/// assert!(!Limit::Capped(3).allows(3));
/// assert!(Limit::Unlimited.allows(u64::MAX));
/// assert_eq!(serde_json::to_string(&Limit::Unlimited).unwrap(), "-1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Limit {
    Capped(u32),
    Unlimited,
}

impl Limit {
    /// Sentinel used on the wire for [`Limit::Unlimited`].
    pub const UNLIMITED: i64 = -1;

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Limit::Unlimited)
    }

    /// True when one more unit may be created on top of `usage`.
    pub fn allows(&self, usage: u64) -> bool {
        match self {
            Limit::Capped(max) => usage < u64::from(*max),
            Limit::Unlimited => true,
        }
    }

    /// The cap, or `None` when unlimited.
    pub fn cap(&self) -> Option<u32> {
        match self {
            Limit::Capped(max) => Some(*max),
            Limit::Unlimited => None,
        }
    }
}

impl From<Limit> for i64 {
    fn from(limit: Limit) -> Self {
        match limit {
            Limit::Capped(max) => i64::from(max),
            Limit::Unlimited => Limit::UNLIMITED,
        }
    }
}

impl TryFrom<i64> for Limit {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            Limit::UNLIMITED => Ok(Limit::Unlimited),
            v => u32::try_from(v)
                .map(Limit::Capped)
                .map_err(|_| format!("invalid plan limit {v}: expected -1 or a non-negative integer")),
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Capped(max) => write!(f, "{max}"),
            Limit::Unlimited => f.write_str("unlimited"),
        }
    }
}

/// Identifier of a plan in the catalog.
///
/// Declaration order is price order, so `Ord` ranks plans cheapest first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlanId {
    Free,
    Starter,
    Professional,
    Enterprise,
}

impl PlanId {
    /// Every plan, cheapest first.
    pub fn all() -> &'static [PlanId] {
        &[
            PlanId::Free,
            PlanId::Starter,
            PlanId::Professional,
            PlanId::Enterprise,
        ]
    }

    /// Look up the catalog entry for this plan.
    pub fn plan(&self) -> Plan {
        match self {
            PlanId::Free => Plan {
                id: *self,
                name: self.display_name().to_string(),
                price_cents: 0,
                limits: PlanLimits {
                    posts_per_month: Limit::Capped(10),
                    templates: Limit::Capped(5),
                    landing_pages: Limit::Capped(1),
                    ai_generations_per_month: Limit::Capped(10),
                    social_accounts: Limit::Capped(2),
                    team_members: Limit::Capped(1),
                },
                features: PlanFeatures {
                    ai_content: true,
                    ..PlanFeatures::default()
                },
            },
            PlanId::Starter => Plan {
                id: *self,
                name: self.display_name().to_string(),
                price_cents: 1_900,
                limits: PlanLimits {
                    posts_per_month: Limit::Capped(100),
                    templates: Limit::Capped(20),
                    landing_pages: Limit::Capped(5),
                    ai_generations_per_month: Limit::Capped(100),
                    social_accounts: Limit::Capped(5),
                    team_members: Limit::Capped(3),
                },
                features: PlanFeatures {
                    ai_content: true,
                    lead_capture: true,
                    ..PlanFeatures::default()
                },
            },
            PlanId::Professional => Plan {
                id: *self,
                name: self.display_name().to_string(),
                price_cents: 4_900,
                limits: PlanLimits {
                    posts_per_month: Limit::Capped(500),
                    templates: Limit::Capped(100),
                    landing_pages: Limit::Capped(20),
                    ai_generations_per_month: Limit::Capped(500),
                    social_accounts: Limit::Capped(15),
                    team_members: Limit::Capped(10),
                },
                features: PlanFeatures {
                    ai_content: true,
                    lead_capture: true,
                    white_label: false,
                    api_access: true,
                },
            },
            PlanId::Enterprise => Plan {
                id: *self,
                name: self.display_name().to_string(),
                price_cents: 14_900,
                limits: PlanLimits::unlimited(),
                features: PlanFeatures {
                    ai_content: true,
                    lead_capture: true,
                    white_label: true,
                    api_access: true,
                },
            },
        }
    }

    /// Parse plan id from string representation (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "free" => Some(PlanId::Free),
            "starter" => Some(PlanId::Starter),
            "professional" | "pro" => Some(PlanId::Professional),
            "enterprise" => Some(PlanId::Enterprise),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanId::Free => "free",
            PlanId::Starter => "starter",
            PlanId::Professional => "professional",
            PlanId::Enterprise => "enterprise",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PlanId::Free => "Free",
            PlanId::Starter => "Starter",
            PlanId::Professional => "Professional",
            PlanId::Enterprise => "Enterprise",
        }
    }
}

impl Default for PlanId {
    fn default() -> Self {
        PlanId::Free
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,

    /// Display name
    pub name: String,

    /// Monthly price in cents (USD)
    pub price_cents: u32,

    pub limits: PlanLimits,

    pub features: PlanFeatures,
}

impl Plan {
    /// Every plan, cheapest first.
    pub fn all() -> Vec<Plan> {
        PlanId::all().iter().map(PlanId::plan).collect()
    }

    /// Look up a plan by its string id.
    ///
    /// ```
    /// use socialflow_org::{Plan, PlanId};
    ///
    /// assert_eq!(Plan::by_id("starter").map(|p| p.id), Some(PlanId::Starter));
    /// assert!(Plan::by_id("platinum").is_none());
    /// ```
    pub fn by_id(id: &str) -> Option<Plan> {
        PlanId::parse(id).map(|id| id.plan())
    }

    /// The limit that applies to `counter`.
    pub fn limit(&self, counter: UsageCounter) -> Limit {
        self.limits.get(counter)
    }

    /// Whether `feature` is included.
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.enabled(feature)
    }
}

/// Numeric limits of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    /// Posts created per calendar month
    pub posts_per_month: Limit,

    /// Templates owned
    pub templates: Limit,

    /// Landing pages owned
    pub landing_pages: Limit,

    /// AI generations per calendar month
    pub ai_generations_per_month: Limit,

    /// Connected social accounts
    pub social_accounts: Limit,

    /// Workspace members, owner included
    pub team_members: Limit,
}

impl PlanLimits {
    pub fn unlimited() -> Self {
        Self {
            posts_per_month: Limit::Unlimited,
            templates: Limit::Unlimited,
            landing_pages: Limit::Unlimited,
            ai_generations_per_month: Limit::Unlimited,
            social_accounts: Limit::Unlimited,
            team_members: Limit::Unlimited,
        }
    }

    pub fn get(&self, counter: UsageCounter) -> Limit {
        match counter {
            UsageCounter::PostsThisMonth => self.posts_per_month,
            UsageCounter::Templates => self.templates,
            UsageCounter::LandingPages => self.landing_pages,
            UsageCounter::AiGenerationsThisMonth => self.ai_generations_per_month,
            UsageCounter::SocialAccounts => self.social_accounts,
            UsageCounter::TeamMembers => self.team_members,
        }
    }
}

/// Boolean feature flags of a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFeatures {
    pub ai_content: bool,
    pub lead_capture: bool,
    pub white_label: bool,
    pub api_access: bool,
}

impl PlanFeatures {
    pub fn enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::AiContent => self.ai_content,
            Feature::LeadCapture => self.lead_capture,
            Feature::WhiteLabel => self.white_label,
            Feature::ApiAccess => self.api_access,
        }
    }
}
