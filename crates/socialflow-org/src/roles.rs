//! Workspace roles
//!
//! Roles form a flat, ordered enum. What each role may do is an explicit
//! permission matrix built from `socialflow-rbac` permission sets.

use serde::{Deserialize, Serialize};
use socialflow_rbac::{Action, PermissionSet, ResourceType};

/// A member's role within a workspace.
///
/// The ordering is Viewer < Editor < Admin < Owner. Every workspace has exactly
/// one Owner, assigned at creation and never transferable through invites or
/// role updates.
///
/// # Examples
///
/// ```
/// use socialflow_org::WorkspaceRole;
/// use socialflow_rbac::{Action, ResourceType};
///
/// let editor = WorkspaceRole::Editor;
/// assert!(editor.permissions().allows(ResourceType::Post, Action::Publish));
/// assert!(!editor.can_manage_members());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceRole {
    /// Read-only access to workspace content
    ///
    /// Sees posts, the queue, accounts, members, leads and analytics,
    /// but cannot change anything.
    Viewer = 1,

    /// Creates, schedules and publishes content
    ///
    /// Manages posts, templates, landing pages and leads; may run the
    /// scheduler, generate AI content and sync accounts.
    Editor = 2,

    /// Manages members, invites, accounts and settings
    ///
    /// Everything except changing the plan.
    Admin = 3,

    /// Full control including billing
    ///
    /// Exactly one per workspace; cannot be removed or demoted.
    Owner = 4,
}

impl WorkspaceRole {
    /// The explicit capability set for this role.
    ///
    /// # Returns
    ///
    /// A [`PermissionSet`] listing every resource/action pair the role holds.
    pub fn permissions(&self) -> PermissionSet {
        match self {
            Self::Owner => PermissionSet::new().with_each(ResourceType::all(), Action::Manage),
            Self::Admin => PermissionSet::new()
                .with_each(ResourceType::all(), Action::Manage)
                .without_resource(ResourceType::Subscription)
                .with(ResourceType::Subscription, Action::Read),
            Self::Editor => PermissionSet::new()
                .with_each(ResourceType::all(), Action::Read)
                .with_each(ResourceType::content(), Action::Manage)
                .with(ResourceType::AiContent, Action::Execute)
                .with(ResourceType::Scheduler, Action::Execute)
                .with(ResourceType::SocialAccount, Action::Update),
            Self::Viewer => PermissionSet::new().with_each(ResourceType::all(), Action::Read),
        }
    }

    /// Shorthand for checking a single capability.
    ///
    /// # Arguments
    ///
    /// * `resource` - The resource being accessed
    /// * `action` - The action being performed
    ///
    /// # Returns
    ///
    /// `true` if the role's permission set allows the pair
    ///
    /// ```
    /// use socialflow_org::WorkspaceRole;
    /// use socialflow_rbac::{Action, ResourceType};
    ///
    /// assert!(WorkspaceRole::Editor.can(ResourceType::Lead, Action::Update));
    /// assert!(WorkspaceRole::Viewer.can(ResourceType::Analytics, Action::Read));
    /// assert!(!WorkspaceRole::Viewer.can(ResourceType::Lead, Action::Update));
    /// ```
    pub fn can(&self, resource: ResourceType, action: Action) -> bool {
        self.permissions().allows(resource, action)
    }

    /// Invite, remove, and change the role of members.
    pub fn can_manage_members(&self) -> bool {
        self.can(ResourceType::Member, Action::Manage)
    }

    /// Change the workspace plan.
    pub fn can_manage_billing(&self) -> bool {
        self.can(ResourceType::Subscription, Action::Manage)
    }

    /// Update workspace settings.
    pub fn can_manage_settings(&self) -> bool {
        self.can(ResourceType::Settings, Action::Update)
    }

    /// Roles that may be granted by invite or role update.
    pub fn is_assignable(&self) -> bool {
        !matches!(self, Self::Owner)
    }

    /// Parse role from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - Role name (case-insensitive, surrounding whitespace ignored)
    ///
    /// # Returns
    ///
    /// `Some(WorkspaceRole)` if valid, `None` otherwise
    ///
    /// ```
    /// use socialflow_org::WorkspaceRole;
    ///
    /// assert_eq!(WorkspaceRole::parse("Admin"), Some(WorkspaceRole::Admin));
    /// assert_eq!(WorkspaceRole::parse("guest"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "viewer" => Some(Self::Viewer),
            "editor" => Some(Self::Editor),
            "admin" => Some(Self::Admin),
            "owner" => Some(Self::Owner),
            _ => None,
        }
    }

    /// Get the string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Editor => "editor",
            Self::Admin => "admin",
            Self::Owner => "owner",
        }
    }

    /// Human-readable name for UI display.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Viewer => "Viewer",
            Self::Editor => "Editor",
            Self::Admin => "Admin",
            Self::Owner => "Owner",
        }
    }
}

impl Default for WorkspaceRole {
    fn default() -> Self {
        Self::Viewer
    }
}
