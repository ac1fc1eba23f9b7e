//! Event frame encoding for the consumer stream
//!
//! Frames use the `text/event-stream` field syntax. Message frames end with a
//! blank line; the terminal timeout frame carries no `id` field and no
//! trailing blank line, which existing consumers rely on.

use super::payload::BusPayload;
use bytes::Bytes;
use std::fmt;
use std::time::Duration;

/// Event type tag of a delivered message
pub const MESSAGE_EVENT: &str = "msg";
/// Event type tag of the terminal frame
pub const TIMEOUT_EVENT: &str = "timeout";

/// One frame written to a consumer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Message { id: u64, body: String },
    Timeout { max_secs: u64 },
}

impl Frame {
    pub fn message(payload: BusPayload) -> Self {
        Self::Message {
            id: payload.id,
            body: payload.msg,
        }
    }

    /// Terminal frame reporting the configured session lifetime
    pub fn timeout(max_duration: Duration) -> Self {
        Self::Timeout {
            max_secs: max_duration.as_secs(),
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Message { .. } => MESSAGE_EVENT,
            Self::Timeout { .. } => TIMEOUT_EVENT,
        }
    }

    pub fn encode(&self) -> Bytes {
        Bytes::from(self.to_string())
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message { id, body } => {
                write!(f, "id: {id}\nevent: {MESSAGE_EVENT}\ndata: {body}\n\n")
            }
            Self::Timeout { max_secs } => write!(f, "event: {TIMEOUT_EVENT}\ndata: {max_secs}s\n"),
        }
    }
}
