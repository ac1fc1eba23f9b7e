//! Message bus integration
//!
//! Topic-based publish/subscribe. Delivery is at-least-once and unordered
//! across publishers; the relay consumes it as delivered.

mod memory;
mod nats;

pub use memory::{InMemoryBus, DEFAULT_CAPACITY};
pub use nats::NatsBus;

use crate::error::RelayError;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::debug;

/// Topic publish/subscribe shared by the publish gateway and all sessions
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Publish a raw payload on a topic. No acknowledgement, no retry.
    async fn publish(&self, topic: &str, payload: Bytes) -> Result<(), RelayError>;

    /// Open a private subscription to a topic
    async fn subscribe(&self, topic: &str) -> Result<Subscription, RelayError>;

    /// Check if the bus connection is usable
    fn is_connected(&self) -> bool;

    /// Short name for health and logs
    fn kind(&self) -> &'static str;

    /// Graceful shutdown
    async fn close(&self) {}
}

/// A live subscription owned by exactly one stream session.
///
/// Dropping it unsubscribes from the bus.
pub struct Subscription {
    topic: String,
    deliveries: BoxStream<'static, Bytes>,
}

impl Subscription {
    pub fn new(topic: impl Into<String>, deliveries: BoxStream<'static, Bytes>) -> Self {
        Self {
            topic: topic.into(),
            deliveries,
        }
    }

    /// Wait for the next delivered payload.
    ///
    /// Returns `None` once the bus has ended the subscription. Cancel-safe:
    /// dropping the future before completion loses no delivery.
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.deliveries.next().await
    }

    /// Release the subscription
    pub fn release(self) {
        debug!(topic = %self.topic, "Releasing subscription");
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .finish_non_exhaustive()
    }
}
