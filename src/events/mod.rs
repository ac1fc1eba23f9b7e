//! Event handling module
//!
//! Bus wire format for published messages and the frame encoding written to
//! stream consumers.

pub mod frame;
pub mod payload;

pub use frame::{Frame, MESSAGE_EVENT, TIMEOUT_EVENT};
pub use payload::BusPayload;
