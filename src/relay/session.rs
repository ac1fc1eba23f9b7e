//! Stream session
//!
//! Drives one consumer connection on one topic for a bounded lifetime:
//!
//! ```text
//!             delivery ──► decode ──► message frame ──┐
//!                │            │                        │
//!   STREAMING ◄──┴────────────┼────────────────────────┘
//!      │  │                   └─ decode/write failure ──► CLOSED
//!      │  └─ cancel / disconnect / bus closed ──────────► CLOSED
//!      └─ deadline ──► timeout frame ───────────────────► TIMED_OUT
//! ```
//!
//! The task suspends on all wakeup sources at once and never polls. The
//! deadline is checked ahead of deliveries, so the timeout frame is written
//! at most once and is always the last frame. A frame write that has started
//! is never cut short by the deadline; it only races cancellation and the
//! write grace. The subscription is released on every exit path.

use super::sink::{FrameSink, SinkClosed};
use crate::bus::Subscription;
use crate::error::RelayError;
use crate::events::{BusPayload, Frame};
use bytes::Bytes;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// How long a consumer gets to accept any single frame
pub const FRAME_WRITE_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Streaming,
    TimedOut,
    Closed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Streaming)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Streaming => "streaming",
            Self::TimedOut => "timed_out",
            Self::Closed => "closed",
        }
    }
}

/// Why a session stopped
#[derive(Debug)]
pub enum SessionEnd {
    /// Deadline reached, timeout frame written
    TimedOut,
    /// Consumer disconnected while idle
    Disconnected,
    /// Owner cancelled the session (server shutdown)
    Cancelled,
    /// Bus ended the subscription
    BusClosed,
    /// Decode or write failure
    Failed(RelayError),
}

impl SessionEnd {
    pub fn state(&self) -> SessionState {
        match self {
            Self::TimedOut => SessionState::TimedOut,
            _ => SessionState::Closed,
        }
    }

    /// Metrics/log label
    pub fn label(&self) -> &'static str {
        match self {
            Self::TimedOut => "timed_out",
            Self::Disconnected => "disconnected",
            Self::Cancelled => "cancelled",
            Self::BusClosed => "bus_closed",
            Self::Failed(e) => e.error_type_label(),
        }
    }

    pub fn error(&self) -> Option<&RelayError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Summary handed back to the connection owner
#[derive(Debug)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub topic: String,
    pub state: SessionState,
    pub end: SessionEnd,
    pub frames_written: u64,
    pub elapsed: Duration,
}

enum Wakeup {
    Cancelled,
    Deadline,
    Disconnected,
    Delivery(Option<Bytes>),
}

enum Write {
    Written,
    Cancelled,
    LimitReached,
    Failed(SinkClosed),
}

pub struct StreamSession {
    session_id: Uuid,
    topic: String,
    connected_at: Instant,
    deadline: Instant,
    max_duration: Duration,
    state: SessionState,
    frames_written: u64,
}

impl StreamSession {
    /// Start the session clock now
    pub fn new(topic: impl Into<String>, max_duration: Duration) -> Self {
        let connected_at = Instant::now();
        Self {
            session_id: Uuid::new_v4(),
            topic: topic.into(),
            connected_at,
            deadline: connected_at + max_duration,
            max_duration,
            state: SessionState::Streaming,
            frames_written: 0,
        }
    }

    pub fn connected_at(&self) -> Instant {
        self.connected_at
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Relay deliveries from `subscription` to `sink` until the session ends.
    ///
    /// Consumes the subscription and always releases it before returning.
    /// The transport itself is left to the caller.
    pub async fn run<S: FrameSink>(
        mut self,
        mut subscription: Subscription,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> SessionReport {
        info!(
            session_id = %self.session_id,
            topic = %self.topic,
            max_secs = self.max_duration.as_secs(),
            "Stream session started"
        );

        let end = self.stream(&mut subscription, sink, cancel).await;
        subscription.release();
        self.state = end.state();

        let elapsed = self.connected_at.elapsed();
        match end.error() {
            Some(e) => warn!(
                session_id = %self.session_id,
                topic = %self.topic,
                state = self.state.as_str(),
                outcome = end.label(),
                frames = self.frames_written,
                error = %e,
                "Stream session failed"
            ),
            None => info!(
                session_id = %self.session_id,
                topic = %self.topic,
                state = self.state.as_str(),
                outcome = end.label(),
                frames = self.frames_written,
                elapsed_ms = elapsed.as_millis() as u64,
                "Stream session ended"
            ),
        }

        SessionReport {
            session_id: self.session_id,
            topic: self.topic,
            state: self.state,
            end,
            frames_written: self.frames_written,
            elapsed,
        }
    }

    async fn stream<S: FrameSink>(
        &mut self,
        subscription: &mut Subscription,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> SessionEnd {
        loop {
            let wakeup = tokio::select! {
                biased;
                _ = cancel.cancelled() => Wakeup::Cancelled,
                _ = sleep_until(self.deadline) => Wakeup::Deadline,
                _ = sink.closed() => Wakeup::Disconnected,
                delivery = subscription.recv() => Wakeup::Delivery(delivery),
            };

            match wakeup {
                Wakeup::Cancelled => return SessionEnd::Cancelled,
                Wakeup::Disconnected => return SessionEnd::Disconnected,
                Wakeup::Deadline => return self.time_out(sink, cancel).await,
                Wakeup::Delivery(None) => return SessionEnd::BusClosed,
                Wakeup::Delivery(Some(payload)) => {
                    if let Some(end) = self.deliver(&payload, sink, cancel).await {
                        return end;
                    }
                }
            }
        }
    }

    async fn deliver<S: FrameSink>(
        &mut self,
        payload: &[u8],
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Option<SessionEnd> {
        if self.is_expired() {
            return Some(self.time_out(sink, cancel).await);
        }

        let message = match BusPayload::decode(payload) {
            Ok(message) => message,
            Err(source) => {
                return Some(SessionEnd::Failed(RelayError::DecodeFailed {
                    topic: self.topic.clone(),
                    source,
                }))
            }
        };

        debug!(session_id = %self.session_id, topic = %self.topic, id = message.id, "Delivering message");

        // Once started, the frame is finished even if the deadline passes
        let frame = Frame::message(message).encode();
        match self.write(sink, frame, cancel).await {
            Write::Written => None,
            Write::Cancelled => Some(SessionEnd::Cancelled),
            Write::LimitReached => Some(self.write_stalled("message frame")),
            Write::Failed(e) => Some(self.write_failed(e)),
        }
    }

    async fn time_out<S: FrameSink>(&mut self, sink: &mut S, cancel: &CancellationToken) -> SessionEnd {
        let frame = Frame::timeout(self.max_duration).encode();

        match self.write(sink, frame, cancel).await {
            Write::Written => {
                debug!(session_id = %self.session_id, topic = %self.topic, "Timeout frame written");
                SessionEnd::TimedOut
            }
            Write::Cancelled => SessionEnd::Cancelled,
            Write::LimitReached => self.write_stalled("timeout frame"),
            Write::Failed(e) => self.write_failed(e),
        }
    }

    async fn write<S: FrameSink>(
        &mut self,
        sink: &mut S,
        frame: Bytes,
        cancel: &CancellationToken,
    ) -> Write {
        let limit = Instant::now() + FRAME_WRITE_GRACE;
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Write::Cancelled,
            _ = sleep_until(limit) => Write::LimitReached,
            result = sink.send(frame) => match result {
                Ok(()) => Write::Written,
                Err(e) => Write::Failed(e),
            },
        };

        if matches!(outcome, Write::Written) {
            self.frames_written += 1;
        }
        outcome
    }

    /// A stalled write may have left a partial frame, so nothing follows it
    fn write_stalled(&self, frame: &str) -> SessionEnd {
        SessionEnd::Failed(RelayError::WriteFailed {
            topic: self.topic.clone(),
            source: format!("{frame} not accepted within grace period").into(),
        })
    }

    fn write_failed(&self, e: SinkClosed) -> SessionEnd {
        SessionEnd::Failed(RelayError::WriteFailed {
            topic: self.topic.clone(),
            source: Box::new(e),
        })
    }
}
