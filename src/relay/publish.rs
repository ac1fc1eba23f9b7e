//! Publish gateway
//!
//! Validates a topic/message pair, stamps it with the next delivery id and
//! hands it to the bus exactly once.

use super::id::IdGenerator;
use super::validate::validate_message;
use crate::bus::MessageBus;
use crate::error::RelayError;
use crate::events::BusPayload;
use std::sync::Arc;
use tracing::info;

pub struct PublishGateway {
    bus: Arc<dyn MessageBus>,
    ids: IdGenerator,
}

impl PublishGateway {
    pub fn new(bus: Arc<dyn MessageBus>) -> Self {
        Self {
            bus,
            ids: IdGenerator::new(),
        }
    }

    /// Publish `body` on `topic`, returning the id it was stamped with.
    ///
    /// Invalid input is rejected before an id is taken or the bus is touched.
    /// Bus failures are reported once and never retried here.
    pub async fn publish(&self, topic: &str, body: &str) -> Result<u64, RelayError> {
        validate_message(topic, body)?;

        let id = self.ids.next_id();
        let payload = BusPayload::new(id, body)
            .encode()
            .map_err(|source| RelayError::SerializationFailed {
                topic: topic.to_string(),
                source,
            })?;

        info!(topic, id, msg = body, "Publishing message");
        self.bus.publish(topic, payload).await?;
        Ok(id)
    }

    /// Most recently issued id
    pub fn last_id(&self) -> u64 {
        self.ids.last_issued()
    }
}
