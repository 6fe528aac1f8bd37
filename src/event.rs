//! Event frame encoding for the SSE wire format.
//!
//! Every event is rendered as a fixed-order sequence of prefixed lines
//! terminated by a single blank line:
//!
//! ```text
//! event: <kind-token>
//! id: <event-id>          (only when an id was supplied)
//! retry: <milliseconds>   (only when differing from the default)
//! data: <line>            (one per dataline, in order)
//!                         (blank line terminates the event)
//! ```
//!
//! The encoder is pure: it appends bytes to a caller-supplied buffer and
//! never performs I/O. One dataline is one wire line; callers must
//! pre-split multi-line payloads.

use std::time::Duration;

use bytes::BytesMut;

use crate::consts::{
    DATA_LINE_PREFIX, DEFAULT_SSE_RETRY_DURATION, EVENT_LINE_PREFIX, EVENT_TYPE_PATCH_ELEMENTS,
    EVENT_TYPE_PATCH_SIGNALS, ID_LINE_PREFIX, RETRY_LINE_PREFIX,
};

/// The closed set of Datastar event kinds.
///
/// Script execution is not a distinct kind on the wire; it is emitted as a
/// specialized [`PatchElements`](EventType::PatchElements) frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    /// Patch HTML elements into the client's DOM.
    PatchElements,
    /// Patch client-side signals.
    PatchSignals,
}

impl EventType {
    /// The wire token for this event kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::PatchElements => EVENT_TYPE_PATCH_ELEMENTS,
            EventType::PatchSignals => EVENT_TYPE_PATCH_SIGNALS,
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-event options shared by every send operation.
#[derive(Debug, Clone)]
pub struct SseEventOptions {
    /// Optional event id. Sets the client's `lastEventId`, which persists
    /// across subsequent events until the next id is supplied.
    pub event_id: Option<String>,
    /// Reconnection retry hint. Omitted from the wire when equal to
    /// [`DEFAULT_SSE_RETRY_DURATION`].
    pub retry_duration: Duration,
}

impl Default for SseEventOptions {
    fn default() -> Self {
        Self {
            event_id: None,
            retry_duration: DEFAULT_SSE_RETRY_DURATION,
        }
    }
}

impl SseEventOptions {
    /// Set the event id for this event.
    pub fn event_id(mut self, id: impl Into<String>) -> Self {
        self.event_id = Some(id.into());
        self
    }

    /// Override the retry duration for this event.
    pub fn retry_duration(mut self, retry: Duration) -> Self {
        self.retry_duration = retry;
        self
    }
}

/// Encode one event frame into `buf`.
///
/// Datalines must not contain embedded newlines; the encoder emits them
/// verbatim, one wire line each.
pub fn encode_event(
    event_type: EventType,
    data_lines: &[String],
    options: &SseEventOptions,
    buf: &mut BytesMut,
) {
    buf.extend_from_slice(EVENT_LINE_PREFIX.as_bytes());
    buf.extend_from_slice(event_type.as_str().as_bytes());
    buf.extend_from_slice(b"\n");

    if let Some(id) = options.event_id.as_deref() {
        if !id.is_empty() {
            buf.extend_from_slice(ID_LINE_PREFIX.as_bytes());
            buf.extend_from_slice(id.as_bytes());
            buf.extend_from_slice(b"\n");
        }
    }

    let retry_ms = options.retry_duration.as_millis();
    if retry_ms > 0 && retry_ms != DEFAULT_SSE_RETRY_DURATION.as_millis() {
        buf.extend_from_slice(RETRY_LINE_PREFIX.as_bytes());
        buf.extend_from_slice(retry_ms.to_string().as_bytes());
        buf.extend_from_slice(b"\n");
    }

    for line in data_lines {
        buf.extend_from_slice(DATA_LINE_PREFIX.as_bytes());
        buf.extend_from_slice(line.as_bytes());
        buf.extend_from_slice(b"\n");
    }

    buf.extend_from_slice(b"\n");
}
