//! Event bus
//!
//! Publish/subscribe over [`Event`]s with wildcard topic patterns. The only
//! backend is in-process; services hold it behind `Arc<dyn EventBus>`.

use crate::types::Event;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};

/// Event bus error types.
#[derive(Debug, Error)]
pub enum EventBusError {
    #[error("Failed to publish event: {0}")]
    PublishError(String),

    #[error("Failed to subscribe: {0}")]
    SubscribeError(String),

    #[error("Channel closed")]
    ChannelClosed,
}

pub type EventBusResult<T> = Result<T, EventBusError>;

/// Subscription handle for receiving events.
pub struct Subscription {
    pub id: String,
    /// Topic pattern
    pub topic: String,
    receiver: broadcast::Receiver<Event>,
}

impl Subscription {
    /// Receive the next event.
    pub async fn recv(&mut self) -> EventBusResult<Event> {
        self.receiver
            .recv()
            .await
            .map_err(|_| EventBusError::ChannelClosed)
    }

    /// Receive without waiting; `None` when nothing is queued.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.receiver.try_recv().ok()
    }
}

/// Async event processor registered on a bus.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: Event) -> EventBusResult<()>;

    /// Topic patterns this handler is interested in.
    fn topics(&self) -> Vec<String>;
}

#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, event: Event) -> EventBusResult<()>;

    /// Subscribe to a topic pattern.
    ///
    /// - `*` matches exactly one segment
    /// - `#` matches zero or more segments
    ///
    /// `post.*` matches `post.published`; `#` matches everything.
    async fn subscribe(&self, topic: &str) -> EventBusResult<Subscription>;

    async fn register_handler(&self, handler: Arc<dyn EventHandler>) -> EventBusResult<()>;

    async fn stats(&self) -> EventBusStats;
}

#[derive(Debug, Clone, Default)]
pub struct EventBusStats {
    pub events_published: u64,
    pub events_delivered: u64,
    pub active_subscriptions: usize,
    pub registered_handlers: usize,
}

/// In-memory event bus.
pub struct MemoryEventBus {
    subscribers: Arc<RwLock<HashMap<String, broadcast::Sender<Event>>>>,
    handlers: Arc<RwLock<Vec<Arc<dyn EventHandler>>>>,
    stats: Arc<RwLock<EventBusStats>>,
    channel_capacity: usize,
}

impl std::fmt::Debug for MemoryEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEventBus")
            .field("channel_capacity", &self.channel_capacity)
            .finish()
    }
}

impl MemoryEventBus {
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            handlers: Arc::new(RwLock::new(Vec::new())),
            stats: Arc::new(RwLock::new(EventBusStats::default())),
            channel_capacity: capacity,
        }
    }

    /// Check if a topic matches a pattern.
    pub fn topic_matches(pattern: &str, topic: &str) -> bool {
        let pattern: Vec<&str> = pattern.split('.').collect();
        let topic: Vec<&str> = topic.split('.').collect();
        segments_match(&pattern, &topic)
    }
}

fn segments_match(pattern: &[&str], topic: &[&str]) -> bool {
    match (pattern.split_first(), topic.split_first()) {
        (None, None) => true,
        (Some((&"#", rest)), _) => {
            // zero or more segments
            (0..=topic.len()).any(|skip| segments_match(rest, &topic[skip..]))
        }
        (Some((&"*", rest)), Some((_, topic_rest))) => segments_match(rest, topic_rest),
        (Some((segment, rest)), Some((head, topic_rest))) => {
            segment == head && segments_match(rest, topic_rest)
        }
        _ => false,
    }
}

impl Default for MemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for MemoryEventBus {
    async fn publish(&self, event: Event) -> EventBusResult<()> {
        let topic = event.topic().to_string();
        let mut delivered = 0u64;

        {
            let subscribers = self.subscribers.read().await;
            for (pattern, sender) in subscribers.iter() {
                if Self::topic_matches(pattern, &topic) && sender.send(event.clone()).is_ok() {
                    delivered += 1;
                }
            }
        }

        {
            let handlers = self.handlers.read().await;
            for handler in handlers.iter() {
                if handler
                    .topics()
                    .iter()
                    .any(|pattern| Self::topic_matches(pattern, &topic))
                {
                    let handler = handler.clone();
                    let event = event.clone();
                    delivered += 1;
                    tokio::spawn(async move {
                        if let Err(e) = handler.handle(event).await {
                            tracing::warn!(error = %e, "Event handler failed");
                        }
                    });
                }
            }
        }

        let mut stats = self.stats.write().await;
        stats.events_published += 1;
        stats.events_delivered += delivered;

        tracing::trace!(topic = %topic, delivered, "Event published");
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> EventBusResult<Subscription> {
        let receiver = {
            let mut subscribers = self.subscribers.write().await;
            match subscribers.get(topic) {
                Some(sender) => sender.subscribe(),
                None => {
                    let (sender, receiver) = broadcast::channel(self.channel_capacity);
                    subscribers.insert(topic.to_string(), sender);
                    receiver
                }
            }
        };

        self.stats.write().await.active_subscriptions += 1;

        Ok(Subscription {
            id: uuid::Uuid::now_v7().to_string(),
            topic: topic.to_string(),
            receiver,
        })
    }

    async fn register_handler(&self, handler: Arc<dyn EventHandler>) -> EventBusResult<()> {
        self.handlers.write().await.push(handler);
        self.stats.write().await.registered_handlers += 1;
        Ok(())
    }

    async fn stats(&self) -> EventBusStats {
        self.stats.read().await.clone()
    }
}

/// Handler that writes every matching event to the tracing log.
#[derive(Debug, Clone)]
pub struct LoggingHandler {
    patterns: Vec<String>,
}

impl LoggingHandler {
    /// Log every event.
    pub fn all() -> Self {
        Self::for_topics(["#"])
    }

    pub fn for_topics<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl EventHandler for LoggingHandler {
    async fn handle(&self, event: Event) -> EventBusResult<()> {
        tracing::info!(
            event_id = %event.id,
            topic = %event.event_type,
            tenant_id = ?event.tenant_id,
            payload = %event.payload,
            "Domain event"
        );
        Ok(())
    }

    fn topics(&self) -> Vec<String> {
        self.patterns.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PostEvent;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use uuid::Uuid;

    struct CountingHandler {
        count: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl EventHandler for CountingHandler {
        async fn handle(&self, _event: Event) -> EventBusResult<()> {
            self.count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn topics(&self) -> Vec<String> {
            vec!["post.*".to_string()]
        }
    }

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = MemoryEventBus::new();
        let mut sub = bus.subscribe("post.*").await.unwrap();

        let event = PostEvent::Deleted {
            post_id: Uuid::now_v7(),
        }
        .to_event(Uuid::now_v7());
        bus.publish(event.clone()).await.unwrap();

        let received = tokio::time::timeout(Duration::from_millis(100), sub.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received.id, event.id);
    }

    #[tokio::test]
    async fn test_non_matching_subscription_gets_nothing() {
        let bus = MemoryEventBus::new();
        let mut sub = bus.subscribe("workspace.#").await.unwrap();

        bus.publish(Event::new("post.created", serde_json::json!({})))
            .await
            .unwrap();

        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn test_topic_matching() {
        assert!(MemoryEventBus::topic_matches("post.published", "post.published"));
        assert!(MemoryEventBus::topic_matches("post.*", "post.published"));
        assert!(MemoryEventBus::topic_matches("*.published", "post.published"));
        assert!(MemoryEventBus::topic_matches("#", "post.published"));
        assert!(MemoryEventBus::topic_matches("post.#", "post.published"));
        assert!(MemoryEventBus::topic_matches("post.#", "post"));
        assert!(MemoryEventBus::topic_matches("#.published", "post.published"));

        assert!(!MemoryEventBus::topic_matches("post.*", "post"));
        assert!(!MemoryEventBus::topic_matches("post.failed", "post.published"));
        assert!(!MemoryEventBus::topic_matches("workspace.*", "post.published"));
        assert!(!MemoryEventBus::topic_matches("post", "post.published"));
    }

    #[tokio::test]
    async fn test_handler_invoked_once_per_event() {
        let bus = MemoryEventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        bus.register_handler(Arc::new(CountingHandler {
            count: count.clone(),
        }))
        .await
        .unwrap();

        bus.publish(Event::new("post.created", serde_json::json!({})))
            .await
            .unwrap();
        bus.publish(Event::new("workspace.created", serde_json::json!({})))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stats() {
        let bus = MemoryEventBus::new();
        assert_eq!(bus.stats().await.events_published, 0);

        let _sub = bus.subscribe("#").await.unwrap();
        bus.register_handler(Arc::new(LoggingHandler::all()))
            .await
            .unwrap();
        bus.publish(Event::new("post.created", serde_json::json!({})))
            .await
            .unwrap();

        let stats = bus.stats().await;
        assert_eq!(stats.events_published, 1);
        assert_eq!(stats.events_delivered, 2);
        assert_eq!(stats.active_subscriptions, 1);
        assert_eq!(stats.registered_handlers, 1);
    }
}
