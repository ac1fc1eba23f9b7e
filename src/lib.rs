//! info-center - topic-addressed message relay
//!
//! Producers POST short letter-only messages to a topic; consumers GET the same
//! topic and receive every message published to it as an event stream until
//! the session lifetime runs out.
//!
//! - Publishes are validated, stamped with a process-wide increasing id and
//!   handed to the bus (NATS, or an in-process bus in local mode)
//! - Each consumer gets its own stream session with a private subscription
//! - Exposes health/ready endpoints and Prometheus metrics

pub mod bus;
pub mod config;
pub mod error;
pub mod events;
pub mod metrics;
pub mod relay;
pub mod routes;

pub use config::RelayConfig;
pub use error::RelayError;
