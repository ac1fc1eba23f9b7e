//! Domain error types for the info-center relay
//!
//! main.rs is the ONLY module allowed to use anyhow::Result (process boundary).
//! All application code returns Result<T, RelayError>.

use crate::relay::validate::ValidationError;
use axum::http::StatusCode;
use thiserror::Error;

/// Relay domain errors
///
/// Every variant carries structured context fields for diagnostics.
/// Errors are local to the publish call or stream session that raised them;
/// none of them is fatal to the process.
///
/// Example log output:
/// ```text
/// RelayError::DecodeFailed { topic: "news", .. }
/// → "bus payload on topic 'news' could not be decoded"
/// ```
#[derive(Error, Debug)]
pub enum RelayError {
    /// Topic or message failed the letters-only rule (client error)
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Bus publish failed for a specific topic
    #[error("bus publish failed for topic '{topic}'")]
    PublishFailed {
        topic: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Bus subscribe failed for a specific topic
    #[error("bus subscribe failed for topic '{topic}'")]
    SubscribeFailed {
        topic: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Bus connection failed
    #[error("bus connection failed")]
    BusConnectionFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Message could not be serialized into the bus wire format
    #[error("payload serialization failed for topic '{topic}'")]
    SerializationFailed {
        topic: String,
        #[source]
        source: serde_json::Error,
    },

    /// Delivered bus payload is not a valid `{Msg, Id}` structure
    #[error("bus payload on topic '{topic}' could not be decoded")]
    DecodeFailed {
        topic: String,
        #[source]
        source: serde_json::Error,
    },

    /// Writing a frame to the consumer failed
    #[error("frame write failed for topic '{topic}'")]
    WriteFailed {
        topic: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration error (environment variable missing or invalid)
    #[error("configuration error: {0}")]
    Config(String),

    /// Prometheus recorder could not be installed
    #[error("metrics recorder installation failed: {0}")]
    MetricsInstall(String),
}

impl RelayError {
    /// Returns a static label string suitable for Prometheus metrics.
    ///
    /// Used as the `error_type` label on `relay_publish_failures_total`
    /// and as the session outcome label for failed sessions.
    pub fn error_type_label(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::PublishFailed { .. } => "bus_publish",
            Self::SubscribeFailed { .. } => "bus_subscribe",
            Self::BusConnectionFailed(_) => "bus_connection",
            Self::SerializationFailed { .. } => "serialization",
            Self::DecodeFailed { .. } => "decode",
            Self::WriteFailed { .. } => "write",
            Self::Config(_) => "config",
            Self::MetricsInstall(_) => "metrics_install",
        }
    }

    /// HTTP status reported to the caller when this error ends a request.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::PublishFailed { .. }
            | Self::SubscribeFailed { .. }
            | Self::BusConnectionFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for failures of the bus itself (publish, subscribe, connect).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::PublishFailed { .. } | Self::SubscribeFailed { .. } | Self::BusConnectionFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::validate::validate_message;

    fn test_error() -> Box<dyn std::error::Error + Send + Sync> {
        Box::new(std::io::Error::new(std::io::ErrorKind::Other, "test"))
    }

    fn json_error() -> serde_json::Error {
        serde_json::from_str::<()>("invalid").unwrap_err()
    }

    fn all_variants() -> Vec<RelayError> {
        vec![
            RelayError::Validation(validate_message("", "").unwrap_err()),
            RelayError::PublishFailed {
                topic: "news".to_string(),
                source: test_error(),
            },
            RelayError::SubscribeFailed {
                topic: "news".to_string(),
                source: test_error(),
            },
            RelayError::BusConnectionFailed(test_error()),
            RelayError::SerializationFailed {
                topic: "news".to_string(),
                source: json_error(),
            },
            RelayError::DecodeFailed {
                topic: "news".to_string(),
                source: json_error(),
            },
            RelayError::WriteFailed {
                topic: "news".to_string(),
                source: test_error(),
            },
            RelayError::Config("test".to_string()),
            RelayError::MetricsInstall("test".to_string()),
        ]
    }

    #[test]
    fn every_variant_has_distinct_error_type_label() {
        let labels: Vec<_> = all_variants().iter().map(RelayError::error_type_label).collect();

        let mut unique = labels.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(labels.len(), unique.len(), "Duplicate error_type_label found");
    }

    #[test]
    fn error_messages_contain_context() {
        let err = RelayError::PublishFailed {
            topic: "weather".to_string(),
            source: test_error(),
        };
        assert!(err.to_string().contains("weather"));

        let err = RelayError::DecodeFailed {
            topic: "sports".to_string(),
            source: json_error(),
        };
        assert!(err.to_string().contains("sports"));
    }

    #[test]
    fn validation_error_is_rendered_verbatim() {
        let err = RelayError::from(validate_message("news", "").unwrap_err());
        assert_eq!(err.to_string(), "msg: non zero value required");
    }

    #[test]
    fn status_codes_split_client_and_transport_failures() {
        for err in all_variants() {
            let expected = match err.error_type_label() {
                "validation" => StatusCode::BAD_REQUEST,
                "bus_publish" | "bus_subscribe" | "bus_connection" => {
                    assert!(err.is_transport());
                    StatusCode::SERVICE_UNAVAILABLE
                }
                _ => {
                    assert!(!err.is_transport());
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            assert_eq!(err.status_code(), expected, "{}", err.error_type_label());
        }
    }

    #[test]
    fn config_error_preserves_message() {
        let err = RelayError::Config("MAX_SESSION_SECS must be greater than zero".to_string());
        assert_eq!(
            err.to_string(),
            "configuration error: MAX_SESSION_SECS must be greater than zero"
        );
    }
}
