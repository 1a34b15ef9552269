//! Domain event types
//!
//! Every state change worth telling the rest of the system about is wrapped in
//! an [`Event`] envelope. Typed enums below build the envelope with a stable
//! dotted topic such as `post.published`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event ID
    pub id: Uuid,

    /// Dotted event type, also the topic (e.g. "post.published")
    pub event_type: String,

    /// When the event was created
    pub timestamp: DateTime<Utc>,

    /// Workspace the event belongs to
    pub tenant_id: Option<Uuid>,

    /// User who triggered the event
    pub user_id: Option<Uuid>,

    /// Event version for schema evolution
    pub version: u32,

    pub payload: serde_json::Value,
}

impl Event {
    pub fn new(event_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::now_v7(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            tenant_id: None,
            user_id: None,
            version: 1,
            payload,
        }
    }

    pub fn with_tenant(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Topic used for routing.
    pub fn topic(&self) -> &str {
        &self.event_type
    }

    /// Parse the payload into a specific type.
    pub fn parse_payload<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

fn envelope<T: Serialize>(event_type: &str, tenant_id: Uuid, body: &T) -> Event {
    let payload = serde_json::to_value(body).unwrap_or(serde_json::Value::Null);
    Event::new(event_type, payload).with_tenant(tenant_id)
}

// ============================================================================
// Post Events
// ============================================================================

/// Post lifecycle events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PostEvent {
    Created {
        post_id: Uuid,
        status: String,
    },
    Scheduled {
        post_id: Uuid,
        scheduled_at: DateTime<Utc>,
    },
    Published {
        post_id: Uuid,
        platforms: Vec<String>,
        total_reach: u64,
    },
    Failed {
        post_id: Uuid,
        error: String,
        retryable: bool,
    },
    Deleted {
        post_id: Uuid,
    },
}

impl PostEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            PostEvent::Created { .. } => "post.created",
            PostEvent::Scheduled { .. } => "post.scheduled",
            PostEvent::Published { .. } => "post.published",
            PostEvent::Failed { .. } => "post.failed",
            PostEvent::Deleted { .. } => "post.deleted",
        }
    }

    /// Convert to an envelope scoped to `tenant_id`.
    pub fn to_event(&self, tenant_id: Uuid) -> Event {
        envelope(self.event_type(), tenant_id, self)
    }
}

// ============================================================================
// Workspace Events
// ============================================================================

/// Workspace membership and settings events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkspaceEvent {
    Created {
        name: String,
        owner_id: Uuid,
    },
    MemberInvited {
        invite_id: Uuid,
        email: String,
        role: String,
    },
    InviteAccepted {
        invite_id: Uuid,
        user_id: Uuid,
    },
    InviteDeclined {
        invite_id: Uuid,
    },
    MemberRoleChanged {
        user_id: Uuid,
        from: String,
        to: String,
    },
    MemberRemoved {
        user_id: Uuid,
    },
    SettingsUpdated,
}

impl WorkspaceEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            WorkspaceEvent::Created { .. } => "workspace.created",
            WorkspaceEvent::MemberInvited { .. } => "workspace.member_invited",
            WorkspaceEvent::InviteAccepted { .. } => "workspace.invite_accepted",
            WorkspaceEvent::InviteDeclined { .. } => "workspace.invite_declined",
            WorkspaceEvent::MemberRoleChanged { .. } => "workspace.member_role_changed",
            WorkspaceEvent::MemberRemoved { .. } => "workspace.member_removed",
            WorkspaceEvent::SettingsUpdated => "workspace.settings_updated",
        }
    }

    pub fn to_event(&self, tenant_id: Uuid) -> Event {
        envelope(self.event_type(), tenant_id, self)
    }
}

// ============================================================================
// Subscription Events
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubscriptionEvent {
    PlanChanged {
        from: String,
        to: String,
        expires_at: DateTime<Utc>,
    },
}

impl SubscriptionEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            SubscriptionEvent::PlanChanged { .. } => "subscription.plan_changed",
        }
    }

    pub fn to_event(&self, tenant_id: Uuid) -> Event {
        envelope(self.event_type(), tenant_id, self)
    }
}

// ============================================================================
// Content Events
// ============================================================================

/// Social account, template, landing page, lead and AI events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentEvent {
    AccountConnected {
        account_id: Uuid,
        platform: String,
    },
    AccountDisconnected {
        account_id: Uuid,
    },
    AccountSynced {
        account_id: Uuid,
        followers: u64,
    },
    TemplateCreated {
        template_id: Uuid,
    },
    LandingPageCreated {
        page_id: Uuid,
        slug: String,
    },
    LeadCaptured {
        lead_id: Uuid,
        page_id: Uuid,
    },
    AiGenerated {
        generation_id: Uuid,
        kind: String,
    },
}

impl ContentEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            ContentEvent::AccountConnected { .. } => "social_account.connected",
            ContentEvent::AccountDisconnected { .. } => "social_account.disconnected",
            ContentEvent::AccountSynced { .. } => "social_account.synced",
            ContentEvent::TemplateCreated { .. } => "template.created",
            ContentEvent::LandingPageCreated { .. } => "landing_page.created",
            ContentEvent::LeadCaptured { .. } => "lead.captured",
            ContentEvent::AiGenerated { .. } => "ai.generated",
        }
    }

    pub fn to_event(&self, tenant_id: Uuid) -> Event {
        envelope(self.event_type(), tenant_id, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_event_envelope() {
        let tenant = Uuid::now_v7();
        let post_id = Uuid::now_v7();
        let event = PostEvent::Failed {
            post_id,
            error: "timeout".to_string(),
            retryable: true,
        }
        .to_event(tenant);

        assert_eq!(event.topic(), "post.failed");
        assert_eq!(event.tenant_id, Some(tenant));
        assert_eq!(event.payload["type"], "failed");
        assert_eq!(event.payload["retryable"], true);

        let parsed: PostEvent = event.parse_payload().unwrap();
        assert!(matches!(parsed, PostEvent::Failed { retryable: true, .. }));
    }

    #[test]
    fn test_unit_variant_payload() {
        let event = WorkspaceEvent::SettingsUpdated.to_event(Uuid::now_v7());
        assert_eq!(event.event_type, "workspace.settings_updated");
        assert_eq!(event.payload["type"], "settings_updated");
    }

    #[test]
    fn test_with_user() {
        let user = Uuid::now_v7();
        let event = Event::new("custom.thing", serde_json::json!({})).with_user(user);
        assert_eq!(event.user_id, Some(user));
        assert!(event.tenant_id.is_none());
        assert_eq!(event.version, 1);
    }
}
