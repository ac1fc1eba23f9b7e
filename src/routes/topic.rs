//! Topic endpoints
//!
//! `POST /info-center/{topic}` publishes the `msg` form field, read from a
//! urlencoded or multipart body. Any other body counts as a missing `msg`.
//! `GET /info-center/{topic}` streams the topic until the session deadline.

use super::AppState;
use crate::error::RelayError;
use crate::relay::validate::MSG_FIELD;
use crate::relay::{sink, validate_topic, StreamSession};
use axum::{
    body::Body,
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::debug;

/// Publish request body
#[derive(Debug, Default, Deserialize)]
pub struct PublishForm {
    #[serde(default)]
    pub msg: String,
}

impl PublishForm {
    async fn from_multipart(mut multipart: Multipart) -> Self {
        while let Ok(Some(field)) = multipart.next_field().await {
            if field.name() == Some(MSG_FIELD) {
                return Self {
                    msg: field.text().await.unwrap_or_default(),
                };
            }
        }
        Self::default()
    }
}

/// Never rejects: an unreadable body leaves `msg` empty and validation
/// answers with a 400.
impl<S> FromRequest<S> for PublishForm
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if is_multipart {
            return Ok(match Multipart::from_request(req, state).await {
                Ok(multipart) => Self::from_multipart(multipart).await,
                Err(rejection) => {
                    debug!(error = %rejection, "Unreadable multipart publish body");
                    Self::default()
                }
            });
        }

        Ok(match Form::<Self>::from_request(req, state).await {
            Ok(Form(form)) => form,
            Err(rejection) => {
                debug!(error = %rejection, "Publish body is not a form");
                Self::default()
            }
        })
    }
}

pub(super) async fn publish_handler(
    State(state): State<AppState>,
    Path(topic): Path<String>,
    form: PublishForm,
) -> Result<StatusCode, RelayError> {
    match state.gateway.publish(&topic, &form.msg).await {
        Ok(_) => {
            state.metrics.record_publish();
            Ok(StatusCode::NO_CONTENT)
        }
        Err(e) => {
            state.metrics.record_publish_failure(&e);
            Err(e)
        }
    }
}

pub(super) async fn stream_handler(
    State(state): State<AppState>,
    Path(topic): Path<String>,
) -> Result<Response, RelayError> {
    validate_topic(&topic)?;

    // Subscribe before the response starts so a bus failure is still a 503
    let subscription = state.bus.subscribe(&topic).await?;

    let session = StreamSession::new(topic, state.max_session);
    let (mut frames, body) = sink::channel();
    let cancel = state.shutdown.child_token();
    let metrics = Arc::clone(&state.metrics);

    metrics.record_session_start();
    tokio::spawn(async move {
        let report = session.run(subscription, &mut frames, &cancel).await;
        metrics.record_session_end(&report);
    });

    Ok((
        [
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CONNECTION, "keep-alive"),
        ],
        Body::from_stream(body),
    )
        .into_response())
}
