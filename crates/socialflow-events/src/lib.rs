//! # SocialFlow Events
//!
//! In-process domain event bus. Services publish an event after each state
//! change they commit (post published, member invited, plan changed, ...);
//! subscribers and handlers pick them up by topic pattern.
//!
//! ## Publishing
//!
//! ```rust,no_run
//! use socialflow_events::{EventBus, MemoryEventBus, PostEvent};
//! use uuid::Uuid;
//!
//! async fn publish_example() {
//!     let bus = MemoryEventBus::new();
//!     let event = PostEvent::Deleted { post_id: Uuid::now_v7() };
//!     bus.publish(event.to_event(Uuid::now_v7())).await.unwrap();
//! }
//! ```
//!
//! ## Topic Patterns
//!
//! Topics are the dotted event type:
//! - `post.published` - a specific event
//! - `post.*` - all post events
//! - `#` - everything
//!
//! `*` matches exactly one segment, `#` matches zero or more.

pub mod bus;
pub mod types;

pub use bus::{
    EventBus, EventBusError, EventBusResult, EventBusStats, EventHandler, LoggingHandler,
    MemoryEventBus, Subscription,
};
pub use types::{ContentEvent, Event, PostEvent, SubscriptionEvent, WorkspaceEvent};
