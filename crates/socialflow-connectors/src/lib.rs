//! # SocialFlow Connectors
//!
//! Outbound integrations behind async traits:
//!
//! - [`PublishConnector`]: publish a post to one platform account and fetch
//!   account stats. [`MockConnector`] simulates every platform;
//!   [`MetaConnector`] talks to the Meta Graph API for Facebook pages and
//!   Instagram business accounts.
//! - [`ContentGenerator`]: caption, hashtag and image generation through an
//!   OpenAI-compatible API ([`HttpContentGenerator`]).
//!
//! Connectors are picked per account by [`ConnectionKind`] through a
//! [`ConnectorRegistry`]. Every publish failure is a [`PublishError`] that
//! knows whether a later attempt may succeed.

pub mod config;
pub mod connector;
pub mod error;
pub mod generator;
pub mod meta;
pub mod mock;
pub mod stats;
pub mod types;

pub use config::ConnectorConfig;
pub use connector::{ConnectorRegistry, PublishConnector};
pub use error::{GenerationError, PublishError};
pub use generator::{
    ContentGenerator, GeneratedContent, GenerationKind, HttpContentGenerator, StaticGenerator,
};
pub use meta::MetaConnector;
pub use mock::MockConnector;
pub use stats::{FixedStats, RandomStats, StatsSource};
pub use types::{AccountStats, AccountTarget, ConnectionKind, Platform, PlatformOutcome, PublishRequest};
