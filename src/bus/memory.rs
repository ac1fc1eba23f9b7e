//! In-process message bus
//!
//! One `tokio::sync::broadcast` channel per topic. Used when no NATS server is
//! configured (local mode) and by tests, where the publish counter doubles as
//! a spy on bus traffic.

use super::{MessageBus, Subscription};
use crate::error::RelayError;
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use futures::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Default per-topic buffer before a slow subscriber starts lagging
pub const DEFAULT_CAPACITY: usize = 256;

pub struct InMemoryBus {
    topics: DashMap<String, broadcast::Sender<Bytes>>,
    capacity: usize,
    messages_published: AtomicU64,
}

impl InMemoryBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            topics: DashMap::new(),
            capacity: capacity.max(1),
            messages_published: AtomicU64::new(0),
        }
    }

    /// Total publish calls accepted, with or without subscribers
    pub fn messages_published(&self) -> u64 {
        self.messages_published.load(Ordering::Relaxed)
    }

    /// Live subscriptions on a topic
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .get(topic)
            .map_or(0, |sender| sender.receiver_count())
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn publish(&self, topic: &str, payload: Bytes) -> Result<(), RelayError> {
        self.messages_published.fetch_add(1, Ordering::Relaxed);

        let sender = self.topics.get(topic).map(|entry| entry.value().clone());
        match sender.map(|sender| sender.send(payload)) {
            Some(Ok(receivers)) => debug!(topic, receivers, "Payload published"),
            // Pub/sub semantics: nobody listening, nothing retained
            _ => debug!(topic, "Payload dropped (no subscribers)"),
        }
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<Subscription, RelayError> {
        let receiver = self
            .topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe();

        let name = topic.to_string();
        let deliveries = futures::stream::unfold(receiver, move |mut receiver| {
            let topic = name.clone();
            async move {
                loop {
                    match receiver.recv().await {
                        Ok(payload) => return Some((payload, receiver)),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(topic = %topic, skipped, "Subscriber lagged, payloads dropped");
                        }
                        Err(broadcast::error::RecvError::Closed) => return None,
                    }
                }
            }
        })
        .boxed();

        debug!(topic, "Subscribed to topic");
        Ok(Subscription::new(topic, deliveries))
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
