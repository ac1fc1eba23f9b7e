//! Consumer-side frame sink
//!
//! A session only needs three things from its consumer connection: write a
//! frame and flush it, and notice when the consumer is gone.

use async_trait::async_trait;
use bytes::Bytes;
use std::convert::Infallible;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// The consumer went away; nothing more can be written
#[derive(Debug, Error)]
#[error("consumer disconnected")]
pub struct SinkClosed;

#[async_trait]
pub trait FrameSink: Send + Sync {
    /// Write one whole frame and flush it to the consumer
    async fn send(&mut self, frame: Bytes) -> Result<(), SinkClosed>;

    /// Resolves once the consumer has disconnected
    async fn closed(&self);
}

/// Sink feeding an HTTP response body through a channel of one frame.
///
/// The body stream yields each frame as its own chunk, so a frame handed
/// over is flushed as soon as the HTTP stack polls it. Dropping the body
/// (client disconnect) closes the sink.
pub struct ChannelSink {
    tx: mpsc::Sender<Result<Bytes, Infallible>>,
}

/// Create a sink and the body stream it feeds
pub fn channel() -> (ChannelSink, ReceiverStream<Result<Bytes, Infallible>>) {
    let (tx, rx) = mpsc::channel(1);
    (ChannelSink { tx }, ReceiverStream::new(rx))
}

#[async_trait]
impl FrameSink for ChannelSink {
    async fn send(&mut self, frame: Bytes) -> Result<(), SinkClosed> {
        self.tx.send(Ok(frame)).await.map_err(|_| SinkClosed)
    }

    async fn closed(&self) {
        self.tx.closed().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_frames_arrive_in_order() {
        let (mut sink, mut body) = channel();

        let writer = tokio::spawn(async move {
            sink.send(Bytes::from_static(b"one")).await.unwrap();
            sink.send(Bytes::from_static(b"two")).await.unwrap();
        });

        assert_eq!(body.next().await.unwrap().unwrap(), Bytes::from_static(b"one"));
        assert_eq!(body.next().await.unwrap().unwrap(), Bytes::from_static(b"two"));
        writer.await.unwrap();
        assert!(body.next().await.is_none());
    }

    #[tokio::test]
    async fn test_dropped_body_closes_sink() {
        let (mut sink, body) = channel();
        drop(body);

        sink.closed().await;
        assert!(sink.send(Bytes::from_static(b"late")).await.is_err());
    }
}
