//! Bus wire format
//!
//! Every message travels the bus as a two-field JSON object `{"Msg": .., "Id": ..}`.
//! The field names and order are a compatibility contract with other
//! publishers and subscribers on the same topics.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A message as serialized onto the bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusPayload {
    #[serde(rename = "Msg")]
    pub msg: String,
    #[serde(rename = "Id")]
    pub id: u64,
}

impl BusPayload {
    pub fn new(id: u64, msg: impl Into<String>) -> Self {
        Self { msg: msg.into(), id }
    }

    /// Serialize for publishing
    pub fn encode(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(self).map(Bytes::from)
    }

    /// Parse a delivered payload
    pub fn decode(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }
}
