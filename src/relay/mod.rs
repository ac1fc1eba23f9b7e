//! Relay core
//!
//! Publish side: validation, id stamping, bus publish.
//! Consume side: one stream session per consumer connection.

pub mod id;
pub mod publish;
pub mod session;
pub mod sink;
pub mod validate;

pub use id::IdGenerator;
pub use publish::PublishGateway;
pub use session::{SessionEnd, SessionReport, SessionState, StreamSession};
pub use sink::{ChannelSink, FrameSink, SinkClosed};
pub use validate::{validate_message, validate_topic, ValidationError};
