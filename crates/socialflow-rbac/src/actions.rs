//! # Actions
//!
//! Operations a workspace member can perform on a resource.
//! Actions are paired with a [`crate::ResourceType`] to form a permission.

use serde::{Deserialize, Serialize};

/// Actions that can be performed on resources.
///
/// Actions represent different levels of access and operations:
/// - **Read**: View resource data
/// - **Create**: Create new resource instances
/// - **Update**: Modify existing resources
/// - **Delete**: Remove resources
/// - **Publish**: Push content out to a social platform
/// - **Execute**: Trigger a process (scheduler sweep, AI generation)
/// - **Manage**: Administer the resource; implies every other action
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Read/view resource.
    ///
    /// Grants access to view and list resources of a workspace.
    Read,

    /// Create new resource.
    ///
    /// Grants permission to create new instances. Creation is also
    /// subject to the plan's limits.
    Create,

    /// Update existing resource.
    ///
    /// Grants permission to modify existing resource data, such as a
    /// post caption or a lead's status.
    Update,

    /// Delete resource.
    ///
    /// Grants permission to remove resources.
    Delete,

    /// Publish content to an external platform.
    ///
    /// Grants permission to push a post out through a connector.
    Publish,

    /// Trigger a process.
    ///
    /// Grants permission to run the scheduler sweep or an AI generation.
    Execute,

    /// Manage resource settings.
    ///
    /// Grants administrative access to the resource. Implies every
    /// other action.
    Manage,
}

impl Action {
    /// Get the string representation of the action.
    ///
    /// # Returns
    ///
    /// A static string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Publish => "publish",
            Action::Execute => "execute",
            Action::Manage => "manage",
        }
    }

    /// Parse action from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive, supports aliases)
    ///
    /// # Returns
    ///
    /// `Some(Action)` if valid, `None` otherwise
    ///
    /// # Example
    ///
    /// ```
    /// use socialflow_rbac::Action;
    ///
    /// assert_eq!(Action::parse("read"), Some(Action::Read));
    /// assert_eq!(Action::parse("view"), Some(Action::Read));
    /// assert_eq!(Action::parse("edit"), Some(Action::Update));
    /// assert_eq!(Action::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "read" | "view" | "get" | "list" => Some(Action::Read),
            "create" | "add" | "new" => Some(Action::Create),
            "update" | "edit" | "write" => Some(Action::Update),
            "delete" | "remove" => Some(Action::Delete),
            "publish" | "post" => Some(Action::Publish),
            "execute" | "run" | "trigger" => Some(Action::Execute),
            "manage" | "admin" => Some(Action::Manage),
            _ => None,
        }
    }

    /// Get all actions.
    pub fn all() -> Vec<Self> {
        vec![
            Action::Read,
            Action::Create,
            Action::Update,
            Action::Delete,
            Action::Publish,
            Action::Execute,
            Action::Manage,
        ]
    }

    /// Check if this action implies another action.
    ///
    /// `Manage` implies everything; every write except `Execute` implies
    /// `Read`.
    ///
    /// # Arguments
    ///
    /// * `other` - The action being checked for
    ///
    /// # Returns
    ///
    /// `true` if holding `self` also grants `other`
    ///
    /// ```
    /// use socialflow_rbac::Action;
    ///
    /// assert!(Action::Manage.implies(Action::Publish));
    /// assert!(Action::Update.implies(Action::Read));
    /// assert!(!Action::Read.implies(Action::Update));
    /// ```
    pub fn implies(&self, other: Action) -> bool {
        match self {
            Action::Manage => true,
            Action::Create | Action::Update | Action::Delete | Action::Publish => {
                other == Action::Read
            }
            _ => false,
        }
    }

    /// Check if this action modifies data.
    pub fn is_write(&self) -> bool {
        !matches!(self, Action::Read)
    }
}
