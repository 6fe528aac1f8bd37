//! Signal patch events and client-signal ingestion.
//!
//! Signals are the client's reactive state, exchanged as JSON. The send
//! side emits `datastar-patch-signals` events; the read side decodes the
//! client's current signals from an inbound request, either from the
//! reserved `datastar` query key (GET) or from the request body (anything
//! else).

use std::time::Duration;

use axum::async_trait;
use axum::extract::{FromRequest, Request};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::consts::{
    DATASTAR_KEY, DEFAULT_SSE_RETRY_DURATION, ONLY_IF_MISSING_DATALINE_LITERAL,
    SIGNALS_DATALINE_LITERAL,
};
use crate::error::{ReadSignalsError, SseError};
use crate::event::{EventType, SseEventOptions};
use crate::sse::ServerSentEventGenerator;

/// Options for one signal patch event.
#[derive(Debug, Clone)]
pub struct PatchSignalsOptions {
    /// Optional event id (sets the client's `lastEventId`).
    pub event_id: Option<String>,
    /// Retry hint; omitted from the wire at the default.
    pub retry_duration: Duration,
    /// Only patch signals the client does not already have.
    pub only_if_missing: bool,
}

impl Default for PatchSignalsOptions {
    fn default() -> Self {
        Self {
            event_id: None,
            retry_duration: DEFAULT_SSE_RETRY_DURATION,
            only_if_missing: false,
        }
    }
}

impl PatchSignalsOptions {
    /// Set the event id.
    pub fn event_id(mut self, id: impl Into<String>) -> Self {
        self.event_id = Some(id.into());
        self
    }

    /// Override the retry duration.
    pub fn retry_duration(mut self, retry: Duration) -> Self {
        self.retry_duration = retry;
        self
    }

    /// Only patch signals the client is missing.
    pub fn only_if_missing(mut self, only_if_missing: bool) -> Self {
        self.only_if_missing = only_if_missing;
        self
    }
}

impl ServerSentEventGenerator {
    /// Send a raw JSON signals payload to the client.
    ///
    /// The payload is split on line breaks; each physical line becomes one
    /// `signals` dataline. Pre-serialized values should be compact,
    /// single-line JSON unless a multi-line form is intended.
    pub async fn patch_signals(
        &self,
        signals: &str,
        options: PatchSignalsOptions,
    ) -> Result<(), SseError> {
        let mut data_lines = Vec::with_capacity(4);
        if options.only_if_missing {
            data_lines.push(format!("{ONLY_IF_MISSING_DATALINE_LITERAL}true"));
        }
        for line in signals.split('\n') {
            data_lines.push(format!("{SIGNALS_DATALINE_LITERAL}{line}"));
        }

        let event_options = SseEventOptions {
            event_id: options.event_id,
            retry_duration: options.retry_duration,
        };
        self.send(EventType::PatchSignals, &data_lines, event_options)
            .await
    }

    /// Serialize `signals` to compact JSON and send it as a signal patch.
    pub async fn patch_signals_json<T: Serialize>(
        &self,
        signals: &T,
        options: PatchSignalsOptions,
    ) -> Result<(), SseError> {
        let json = serde_json::to_string(signals).map_err(SseError::SignalsSerialize)?;
        self.patch_signals(&json, options).await
    }

    /// Serialize `signals` and patch only the signals the client is
    /// missing.
    pub async fn patch_signals_if_missing<T: Serialize>(&self, signals: &T) -> Result<(), SseError> {
        self.patch_signals_json(signals, PatchSignalsOptions::default().only_if_missing(true))
            .await
    }
}

/// Decode client signals from already-extracted request parts.
///
/// GET requests carry signals in the reserved `datastar` query key as
/// URL-encoded JSON; an absent or empty key decodes as the target's
/// default (no error). Other methods carry JSON in the request body.
pub fn read_signals_from_parts<T>(
    method: &Method,
    uri: &Uri,
    body: &[u8],
) -> Result<T, ReadSignalsError>
where
    T: DeserializeOwned + Default,
{
    if method == Method::GET {
        let Some(raw) = query_value(uri.query().unwrap_or(""), DATASTAR_KEY) else {
            return Ok(T::default());
        };
        if raw.is_empty() {
            return Ok(T::default());
        }
        return serde_json::from_str(&raw).map_err(ReadSignalsError::Decode);
    }

    if body.is_empty() {
        // An empty non-GET body usually means something upstream already
        // drained it; surface the ordering mistake instead of a JSON error.
        return Err(ReadSignalsError::BodyAlreadyConsumed);
    }
    serde_json::from_slice(body).map_err(ReadSignalsError::Decode)
}

fn query_value(query: &str, key: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        let k = urldecode(k);
        if k == key {
            Some(urldecode(v))
        } else {
            None
        }
    })
}

// Query components encode spaces as '+' before percent-decoding.
fn urldecode(s: &str) -> String {
    let plus_decoded = s.replace('+', " ");
    match urlencoding::decode(&plus_decoded) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => plus_decoded,
    }
}

/// Axum extractor that decodes client signals into `T`.
///
/// Rejections respond with `400 Bad Request`. Extract signals before
/// starting the event stream; the extractor consumes the request body.
#[derive(Debug, Clone)]
pub struct ReadSignals<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ReadSignals<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = ReadSignalsError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();

        if parts.method == Method::GET {
            return read_signals_from_parts(&parts.method, &parts.uri, &[]).map(ReadSignals);
        }

        let bytes = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(ReadSignalsError::BodyRead)?;
        read_signals_from_parts(&parts.method, &parts.uri, &bytes).map(ReadSignals)
    }
}

impl IntoResponse for ReadSignalsError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}
