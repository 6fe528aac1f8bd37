//! The server-sent event generator: the live end of one stream.
//!
//! A [`ServerSentEventGenerator`] owns exactly one output sink, one
//! cancellation token, and one lock. `send` is the single synchronization
//! point: each call encodes a full frame, writes it, and flushes before the
//! next call proceeds, so concurrent producers never interleave partial
//! frames. The generator never spawns background tasks and never retries.

use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::compression::{parse_encodings, BoxSink, CompressionConfig};
use crate::error::SseError;
use crate::event::{encode_event, EventType, SseEventOptions};

/// Stream-open options.
#[derive(Default)]
pub struct SseOptions {
    /// Optional compression negotiation. `None` means the stream is never
    /// compressed.
    pub compression: Option<CompressionConfig>,
}

impl SseOptions {
    /// Enable compression negotiation with the given configuration.
    pub fn compression(mut self, config: CompressionConfig) -> Self {
        self.compression = Some(config);
        self
    }
}

/// Streams Datastar events into an output sink, flushing after every event.
///
/// One generator is bound to exactly one outbound connection. The chosen
/// content encoding is fixed at open and may be read without holding the
/// send lock.
pub struct ServerSentEventGenerator {
    token: CancellationToken,
    writer: Mutex<BoxSink>,
    encoding: Option<&'static str>,
}

impl ServerSentEventGenerator {
    /// Open a stream over `sink`.
    ///
    /// The sink is flushed once up front, standing in for the header flush
    /// on an HTTP transport; failure here means the transport cannot
    /// support streaming and surfaces as the non-recoverable
    /// [`SseError::HeaderFlush`]. Compression negotiation (if configured)
    /// then wraps the sink before any event bytes are written.
    ///
    /// `accept_encoding` is the client's raw `Accept-Encoding` header
    /// value, or empty when absent.
    pub async fn open<W>(
        sink: W,
        token: CancellationToken,
        accept_encoding: &str,
        options: SseOptions,
    ) -> Result<Self, SseError>
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let mut sink: BoxSink = Box::new(sink);
        sink.flush().await.map_err(SseError::HeaderFlush)?;

        let mut encoding = None;
        if let Some(config) = options.compression {
            let client_encodings = parse_encodings(accept_encoding);
            if let Some(compressor) = config.select(&client_encodings) {
                debug!(
                    encoding = compressor.encoding(),
                    "negotiated stream compression"
                );
                encoding = Some(compressor.encoding());
                sink = compressor.wrap(sink);
            } else {
                debug!("no acceptable compression encoding, streaming uncompressed");
            }
        }

        Ok(Self {
            token,
            writer: Mutex::new(sink),
            encoding,
        })
    }

    /// The negotiated content-encoding token, if any. Set once at open.
    pub fn encoding(&self) -> Option<&'static str> {
        self.encoding
    }

    /// The cancellation token bound to this stream's connection.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    /// True once the connection's cancellation token has fired (peer
    /// disconnect, server shutdown, or handler-side cancel).
    ///
    /// Cheap and side-effect-free; lets callers skip expensive work before
    /// attempting a send.
    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait until the connection is closed.
    ///
    /// Useful to hold a handler open until the peer disconnects while
    /// other tasks produce events.
    pub async fn closed(&self) {
        self.token.cancelled().await;
    }

    /// Emit one event to the client. Safe for concurrent use.
    ///
    /// Fails fast with [`SseError::ConnectionClosed`] once the stream is
    /// closed, writing nothing. Any write or flush failure is terminal for
    /// the stream; the generator never retries.
    pub async fn send(
        &self,
        event_type: EventType,
        data_lines: &[String],
        options: SseEventOptions,
    ) -> Result<(), SseError> {
        if self.token.is_cancelled() {
            return Err(SseError::ConnectionClosed);
        }

        let mut writer = self.writer.lock().await;

        let mut buf = BytesMut::with_capacity(256);
        encode_event(event_type, data_lines, &options, &mut buf);

        writer.write_all(&buf).await.map_err(SseError::FrameWrite)?;
        writer.flush().await.map_err(|err| {
            // With a compressor in place the flush drains the compression
            // layer into the transport; without one it is the transport
            // flush itself.
            if self.encoding.is_some() {
                SseError::CompressionFlush(err)
            } else {
                SseError::TransportFlush(err)
            }
        })?;

        trace!(
            event_type = event_type.as_str(),
            frame_bytes = buf.len(),
            "sent event frame"
        );
        Ok(())
    }

    /// Gracefully end the stream, finalizing any compression trailer and
    /// shutting down the sink.
    ///
    /// Optional: dropping the generator ends the stream too, but without a
    /// trailer a decoder cannot verify the compressed stream as complete.
    pub async fn shutdown(&self) -> Result<(), SseError> {
        let mut writer = self.writer.lock().await;
        writer.shutdown().await.map_err(SseError::Shutdown)
    }
}

impl std::fmt::Debug for ServerSentEventGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerSentEventGenerator")
            .field("encoding", &self.encoding)
            .field("closed", &self.is_closed())
            .finish()
    }
}
