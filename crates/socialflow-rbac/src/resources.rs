//! # Resource Types
//!
//! Everything inside a workspace that a role can be granted access to.

use serde::{Deserialize, Serialize};

/// Resource types that can have permissions assigned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// Social media posts.
    Post,
    /// Design templates.
    Template,
    /// Landing pages.
    LandingPage,
    /// Contacts captured through landing pages.
    Lead,
    /// Workspace-wide aggregates.
    Analytics,
    /// Connected social accounts.
    SocialAccount,
    /// AI-generated content.
    AiContent,
    /// Scheduled post queue.
    Scheduler,
    /// Workspace members.
    Member,
    /// Pending workspace invites.
    Invite,
    /// Subscription and billing.
    Subscription,
    /// Workspace settings.
    Settings,
}

impl ResourceType {
    /// Get the string representation of the resource type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Post => "post",
            ResourceType::Template => "template",
            ResourceType::LandingPage => "landing_page",
            ResourceType::Lead => "lead",
            ResourceType::Analytics => "analytics",
            ResourceType::SocialAccount => "social_account",
            ResourceType::AiContent => "ai_content",
            ResourceType::Scheduler => "scheduler",
            ResourceType::Member => "member",
            ResourceType::Invite => "invite",
            ResourceType::Subscription => "subscription",
            ResourceType::Settings => "settings",
        }
    }

    /// Parse resource type from string representation.
    ///
    /// Accepts both `snake_case` and `kebab-case`, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "post" => Some(ResourceType::Post),
            "template" => Some(ResourceType::Template),
            "landing_page" => Some(ResourceType::LandingPage),
            "lead" | "leads" => Some(ResourceType::Lead),
            "analytics" => Some(ResourceType::Analytics),
            "social_account" => Some(ResourceType::SocialAccount),
            "ai_content" | "ai" => Some(ResourceType::AiContent),
            "scheduler" => Some(ResourceType::Scheduler),
            "member" => Some(ResourceType::Member),
            "invite" => Some(ResourceType::Invite),
            "subscription" | "billing" => Some(ResourceType::Subscription),
            "settings" => Some(ResourceType::Settings),
            _ => None,
        }
    }

    /// Content resources that editors may author.
    pub fn content() -> &'static [ResourceType] {
        &[
            ResourceType::Post,
            ResourceType::Template,
            ResourceType::LandingPage,
            ResourceType::Lead,
        ]
    }

    /// Get all resource types.
    pub fn all() -> &'static [ResourceType] {
        &[
            ResourceType::Post,
            ResourceType::Template,
            ResourceType::LandingPage,
            ResourceType::Lead,
            ResourceType::Analytics,
            ResourceType::SocialAccount,
            ResourceType::AiContent,
            ResourceType::Scheduler,
            ResourceType::Member,
            ResourceType::Invite,
            ResourceType::Subscription,
            ResourceType::Settings,
        ]
    }
}
