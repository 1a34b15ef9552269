//! # Permissions
//!
//! A permission pairs a resource type with an action. Grants are scoped to a
//! single workspace; the workspace itself is carried by the membership, not the
//! permission.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::actions::Action;
use crate::resources::ResourceType;

/// A resource + action pair, written as `resource:action`.
///
/// ```
/// use socialflow_rbac::{Action, Permission, ResourceType};
///
/// let perm = Permission::new(ResourceType::LandingPage, Action::Create);
/// assert_eq!(perm.to_string(), "landing_page:create");
/// assert_eq!(Permission::parse("landing_page:create"), Some(perm));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Permission {
    /// The resource type this permission applies to.
    pub resource: ResourceType,
    /// The action allowed on the resource.
    pub action: Action,
}

impl Permission {
    /// Create a new permission.
    pub const fn new(resource: ResourceType, action: Action) -> Self {
        Self { resource, action }
    }

    /// Parse from the `resource:action` form.
    pub fn parse(s: &str) -> Option<Self> {
        let (resource, action) = s.split_once(':')?;
        Some(Self {
            resource: ResourceType::parse(resource)?,
            action: Action::parse(action)?,
        })
    }

    /// True when holding `self` grants `other`.
    pub fn matches(&self, other: &Permission) -> bool {
        self.resource == other.resource
            && (self.action == other.action || self.action.implies(other.action))
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource.as_str(), self.action.as_str())
    }
}

/// The set of permissions granted to a role.
///
/// `has` honors action implication, so a set holding `post:manage`
/// answers true for `post:publish` and `post:read`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    permissions: BTreeSet<Permission>,
}

impl PermissionSet {
    /// Create a new empty permission set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a permission to the set.
    pub fn add(&mut self, permission: Permission) {
        self.permissions.insert(permission);
    }

    /// Builder form of [`add`](Self::add).
    pub fn with(mut self, resource: ResourceType, action: Action) -> Self {
        self.add(Permission::new(resource, action));
        self
    }

    /// Grant `action` on each of `resources`.
    pub fn with_each(mut self, resources: &[ResourceType], action: Action) -> Self {
        for resource in resources {
            self.add(Permission::new(*resource, action));
        }
        self
    }

    /// Drop every permission on `resource`.
    pub fn without_resource(mut self, resource: ResourceType) -> Self {
        self.permissions.retain(|perm| perm.resource != resource);
        self
    }

    /// Remove a permission. Returns whether it was present.
    pub fn remove(&mut self, permission: &Permission) -> bool {
        self.permissions.remove(permission)
    }

    /// Check if the set grants a permission, directly or by implication.
    pub fn has(&self, permission: &Permission) -> bool {
        self.permissions.iter().any(|held| held.matches(permission))
    }

    /// Shorthand for `has(&Permission::new(resource, action))`.
    pub fn allows(&self, resource: ResourceType, action: Action) -> bool {
        self.has(&Permission::new(resource, action))
    }

    /// Merge another permission set into this one.
    pub fn merge(&mut self, other: &PermissionSet) {
        self.permissions.extend(other.permissions.iter().copied());
    }

    /// Build from `resource:action` strings, skipping any that do not parse.
    ///
    /// ```
    /// use socialflow_rbac::PermissionSet;
    ///
    /// let set = PermissionSet::from_strings(&["post:create", "template:read", "bogus"]);
    /// assert_eq!(set.len(), 2);
    /// ```
    pub fn from_strings(perms: &[&str]) -> Self {
        perms.iter().filter_map(|p| Permission::parse(p)).collect()
    }

    /// Every granted permission, in stable order.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.iter()
    }

    /// Get the count of permissions.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// True when every permission of `other` is granted here.
    pub fn contains_all(&self, other: &PermissionSet) -> bool {
        other.iter().all(|perm| self.has(perm))
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        Self {
            permissions: iter.into_iter().collect(),
        }
    }
}
