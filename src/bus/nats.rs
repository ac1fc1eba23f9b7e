//! NATS message bus
//!
//! Core NATS publish/subscribe: topics map 1:1 onto subjects. Publishes are
//! fire-and-forget, matching the relay's no-acknowledgement contract.

use super::{MessageBus, Subscription};
use crate::error::RelayError;
use async_nats::connection::State;
use async_nats::Client;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// NATS-backed bus shared by every publish call and session
pub struct NatsBus {
    client: Client,
    closed: AtomicBool,
}

impl NatsBus {
    /// Connect to NATS server(s), comma-separated
    pub async fn connect(servers: &str) -> Result<Arc<Self>, RelayError> {
        info!(servers, "Connecting to NATS");

        let client = async_nats::connect(servers)
            .await
            .map_err(|e| RelayError::BusConnectionFailed(Box::new(e)))?;

        info!("Connected to NATS");

        Ok(Arc::new(Self {
            client,
            closed: AtomicBool::new(false),
        }))
    }
}

#[async_trait]
impl MessageBus for NatsBus {
    async fn publish(&self, topic: &str, payload: Bytes) -> Result<(), RelayError> {
        match self.client.publish(topic.to_string(), payload).await {
            Ok(()) => {
                debug!(topic, "Payload published");
                Ok(())
            }
            Err(e) => {
                warn!(topic, error = %e, "Failed to publish payload");
                Err(RelayError::PublishFailed {
                    topic: topic.to_string(),
                    source: Box::new(e),
                })
            }
        }
    }

    async fn subscribe(&self, topic: &str) -> Result<Subscription, RelayError> {
        let subscriber = self
            .client
            .subscribe(topic.to_string())
            .await
            .map_err(|e| RelayError::SubscribeFailed {
                topic: topic.to_string(),
                source: Box::new(e),
            })?;

        debug!(topic, "Subscribed to subject");

        // Dropping the subscriber sends UNSUB
        let deliveries = subscriber.map(|message| message.payload).boxed();
        Ok(Subscription::new(topic, deliveries))
    }

    fn is_connected(&self) -> bool {
        !self.closed.load(Ordering::SeqCst) && self.client.connection_state() == State::Connected
    }

    fn kind(&self) -> &'static str {
        "nats"
    }

    async fn close(&self) {
        info!("Closing NATS connection");
        self.closed.store(true, Ordering::SeqCst);
        if let Err(e) = self.client.flush().await {
            warn!(error = %e, "Failed to flush pending publishes");
        }
        // async-nats handles cleanup on drop
    }
}
