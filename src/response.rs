//! Axum integration: turn a request into a streaming SSE response.
//!
//! The generator's sink is the write half of an in-process duplex pipe;
//! the read half backs the response body. When axum drops the body (peer
//! disconnect or server shutdown) a drop guard cancels the generator's
//! token, so producers observe the close through `is_closed` / failed
//! sends. Handlers typically return the response immediately and drive the
//! generator from a spawned task.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Version};
use axum::response::Response;
use bytes::Bytes;
use futures_util::Stream;
use tokio::io::DuplexStream;
use tokio_util::io::ReaderStream;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

use crate::error::SseError;
use crate::sse::{ServerSentEventGenerator, SseOptions};

// Per-connection pipe capacity; a full pipe applies backpressure to send.
const DUPLEX_BUFFER_SIZE: usize = 64 * 1024;

/// Response body that cancels the stream's token when dropped.
struct SseBody {
    inner: ReaderStream<DuplexStream>,
    _guard: DropGuard,
}

impl Stream for SseBody {
    type Item = Result<Bytes, io::Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// Upgrade a connection to a Datastar event stream.
///
/// Returns the generator and the response to hand back to axum. The
/// response carries the streaming headers (`Cache-Control: no-cache`, the
/// event-stream media type, `Connection: keep-alive` on HTTP/1.x, and the
/// negotiated `Content-Encoding` when compression was selected); they are
/// sent before any event bytes.
///
/// `version` and `request_headers` come from the inbound request; the
/// `Accept-Encoding` header feeds compression negotiation.
///
/// # Example
///
/// ```ignore
/// async fn feed(version: Version, headers: HeaderMap) -> Response {
///     let (sse, response) = sse_response(version, &headers, SseOptions::default())
///         .await
///         .expect("streaming transport");
///     tokio::spawn(async move {
///         let _ = sse.patch_elements("<div id=\"now\">tick</div>", Default::default()).await;
///         sse.closed().await;
///     });
///     response
/// }
/// ```
pub async fn sse_response(
    version: Version,
    request_headers: &HeaderMap,
    options: SseOptions,
) -> Result<(ServerSentEventGenerator, Response), SseError> {
    let token = CancellationToken::new();

    let (writer, reader) = tokio::io::duplex(DUPLEX_BUFFER_SIZE);
    let accept_encoding = request_headers
        .get(header::ACCEPT_ENCODING)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    let generator =
        ServerSentEventGenerator::open(writer, token.clone(), accept_encoding, options).await?;

    let body = Body::from_stream(SseBody {
        inner: ReaderStream::new(reader),
        _guard: token.drop_guard(),
    });

    let mut response = Response::new(body);
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/event-stream"),
    );
    if version < Version::HTTP_2 {
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    }
    if let Some(encoding) = generator.encoding() {
        headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static(encoding));
    }

    debug!(?version, encoding = ?generator.encoding(), "opened event stream");
    Ok((generator, response))
}
