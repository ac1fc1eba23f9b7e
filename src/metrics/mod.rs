//! Prometheus metrics module

use crate::error::RelayError;
use crate::relay::SessionReport;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;

/// Relay metrics collector
#[derive(Clone)]
pub struct RelayMetrics {
    handle: Arc<PrometheusHandle>,
}

impl RelayMetrics {
    /// Install the global Prometheus recorder and return a handle to it
    pub fn install() -> Result<Self, RelayError> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| RelayError::MetricsInstall(e.to_string()))?;

        // Register metric descriptions
        Self::register_metrics();

        Ok(Self {
            handle: Arc::new(handle),
        })
    }

    /// Recorder that is not installed globally; recordings are discarded.
    ///
    /// Lets tests build any number of routers in one process.
    pub fn detached() -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        Self {
            handle: Arc::new(recorder.handle()),
        }
    }

    /// Register metric descriptions
    fn register_metrics() {
        describe_counter!(
            "relay_messages_published_total",
            Unit::Count,
            "Messages accepted by the publish gateway and handed to the bus"
        );
        describe_counter!(
            "relay_publish_failures_total",
            Unit::Count,
            "Publish calls rejected or failed, by error type"
        );
        describe_counter!(
            "relay_sessions_started_total",
            Unit::Count,
            "Consumer stream sessions started"
        );
        describe_counter!(
            "relay_sessions_ended_total",
            Unit::Count,
            "Consumer stream sessions ended, by outcome"
        );
        describe_counter!(
            "relay_frames_written_total",
            Unit::Count,
            "Frames written to consumers"
        );

        describe_histogram!(
            "relay_session_duration_seconds",
            Unit::Seconds,
            "Lifetime of consumer stream sessions"
        );

        describe_gauge!(
            "relay_sessions_active",
            Unit::Count,
            "Consumer stream sessions currently open"
        );
        describe_gauge!(
            "relay_bus_connected",
            Unit::Count,
            "Bus connection status (1=connected, 0=disconnected)"
        );
    }

    /// Record a message handed to the bus
    pub fn record_publish(&self) {
        counter!("relay_messages_published_total").increment(1);
    }

    /// Record a rejected or failed publish
    pub fn record_publish_failure(&self, error: &RelayError) {
        counter!(
            "relay_publish_failures_total",
            "error_type" => error.error_type_label()
        )
        .increment(1);
    }

    /// Record a session starting
    pub fn record_session_start(&self) {
        counter!("relay_sessions_started_total").increment(1);
        gauge!("relay_sessions_active").increment(1.0);
    }

    /// Record a finished session
    pub fn record_session_end(&self, report: &SessionReport) {
        gauge!("relay_sessions_active").decrement(1.0);

        counter!(
            "relay_sessions_ended_total",
            "outcome" => report.end.label()
        )
        .increment(1);

        counter!("relay_frames_written_total").increment(report.frames_written);

        histogram!("relay_session_duration_seconds").record(report.elapsed.as_secs_f64());
    }

    /// Set bus connection status
    pub fn set_bus_connected(&self, connected: bool) {
        gauge!("relay_bus_connected").set(if connected { 1.0 } else { 0.0 });
    }

    /// Render metrics in Prometheus format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}
