//! # SocialFlow RBAC
//!
//! Permission primitives for workspace role checks.
//!
//! ## Overview
//!
//! - **Resources**: Everything a workspace owns (posts, templates, members, ...)
//! - **Actions**: Operations that can be performed on resources
//! - **Permissions**: Resource + Action combinations
//! - **Permission Sets**: The capability set granted to a role
//!
//! ```text
//! Permission = Resource + Action
//!
//! Examples:
//!   "post:publish"        - Publish posts
//!   "member:manage"       - Full management of workspace members
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use socialflow_rbac::{Action, Permission, PermissionSet, ResourceType};
//!
//! let mut set = PermissionSet::new();
//! set.add(Permission::new(ResourceType::Post, Action::Create));
//!
//! assert!(set.has(&Permission::new(ResourceType::Post, Action::Create)));
//! // Create implies Read
//! assert!(set.has(&Permission::new(ResourceType::Post, Action::Read)));
//! ```
//!
//! ## Action Implications
//!
//! - `Manage` implies all actions
//! - `Create`, `Update`, `Delete`, `Publish` imply `Read`
//!
//! Role-to-permission-set mapping lives with the role type in `socialflow-org`.

pub mod actions;
pub mod permissions;
pub mod resources;

pub use actions::Action;
pub use permissions::{Permission, PermissionSet};
pub use resources::ResourceType;
