//! Error types for the streaming and signal-reading sides of the SDK.
//!
//! Every failure is surfaced as an explicit `Result`; nothing is retried
//! internally. A `Send`-side failure is terminal for that stream since a
//! partially written frame cannot be resumed.

use std::io;

use thiserror::Error;

/// Errors produced while opening or writing an event stream.
#[derive(Debug, Error)]
pub enum SseError {
    /// The transport could not flush response headers at stream open.
    ///
    /// This indicates an environment that cannot support streaming at all
    /// and is not recoverable by the caller.
    #[error("transport failed to flush response headers: {0}")]
    HeaderFlush(#[source] io::Error),

    /// The connection's cancellation token fired before the send started.
    /// No bytes were written.
    #[error("connection closed")]
    ConnectionClosed,

    /// Writing the encoded frame to the sink failed.
    #[error("failed to write event frame: {0}")]
    FrameWrite(#[source] io::Error),

    /// Flushing the compression layer after a frame write failed.
    #[error("failed to flush compression layer: {0}")]
    CompressionFlush(#[source] io::Error),

    /// Flushing the underlying transport after a frame write failed.
    #[error("failed to flush transport: {0}")]
    TransportFlush(#[source] io::Error),

    /// Shutting the stream down (finalizing any compression trailer)
    /// failed.
    #[error("failed to shut down stream: {0}")]
    Shutdown(#[source] io::Error),

    /// A caller-supplied signals value could not be serialized to JSON.
    #[error("failed to serialize signals to JSON: {0}")]
    SignalsSerialize(#[source] serde_json::Error),
}

impl SseError {
    /// True if the error means the peer is gone and the caller should stop
    /// producing events.
    pub fn is_connection_closed(&self) -> bool {
        matches!(self, SseError::ConnectionClosed)
    }
}

/// Errors produced while extracting signals from an inbound request.
#[derive(Debug, Error)]
pub enum ReadSignalsError {
    /// Reading the request body failed.
    #[error("failed to read request body: {0}")]
    BodyRead(#[source] axum::Error),

    /// The request body was already consumed, typically because the event
    /// stream was started before reading signals.
    #[error("request body already consumed; read signals before starting the event stream")]
    BodyAlreadyConsumed,

    /// The payload was present but not valid JSON for the target shape.
    #[error("failed to decode signals: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Rejection for a string that names no known element patch mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid element patch mode: {0:?}")]
pub struct InvalidPatchModeError(pub String);
