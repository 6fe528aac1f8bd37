//! Datastar SSE SDK: push typed patch events to a browser over a
//! long-lived HTTP response, and read client-submitted signals back.
//!
//! The core is [`ServerSentEventGenerator`], which owns one outbound
//! connection, frames events in the Datastar SSE wire format, optionally
//! compresses the stream, and serializes concurrent sends. Axum handlers
//! get a ready-made response via [`sse_response`] and decode inbound
//! signals with the [`ReadSignals`] extractor.

pub mod compression;
pub mod consts;
pub mod elements;
pub mod error;
pub mod event;
pub mod response;
pub mod script;
pub mod signals;
pub mod sse;

pub use compression::{
    BrotliCompressor, CompressionConfig, CompressionStrategy, Compressor, DeflateCompressor,
    GzipCompressor, ZstdCompressor,
};
pub use elements::{ElementPatchMode, PatchElementsOptions, VALID_ELEMENT_PATCH_MODES};
pub use error::{InvalidPatchModeError, ReadSignalsError, SseError};
pub use event::{EventType, SseEventOptions};
pub use response::sse_response;
pub use script::ExecuteScriptOptions;
pub use signals::{read_signals_from_parts, PatchSignalsOptions, ReadSignals};
pub use sse::{ServerSentEventGenerator, SseOptions};
