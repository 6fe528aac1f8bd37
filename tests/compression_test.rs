//! Compression negotiation on a live generator and compressed round-trips.

mod common;

use async_compression::tokio::bufread::{GzipDecoder, ZstdDecoder};
use common::SharedSink;
use datastar_sse::{
    BrotliCompressor, CompressionConfig, CompressionStrategy, GzipCompressor, PatchSignalsOptions,
    ServerSentEventGenerator, SseOptions, ZstdCompressor,
};
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

fn config_br_then_gzip(strategy: CompressionStrategy) -> CompressionConfig {
    CompressionConfig::new()
        .strategy(strategy)
        .compressor(BrotliCompressor::default())
        .compressor(GzipCompressor::default())
}

async fn open_with(
    accept_encoding: &str,
    config: CompressionConfig,
) -> (ServerSentEventGenerator, SharedSink) {
    let sink = SharedSink::new();
    let sse = ServerSentEventGenerator::open(
        sink.clone(),
        CancellationToken::new(),
        accept_encoding,
        SseOptions::default().compression(config),
    )
    .await
    .unwrap();
    (sse, sink)
}

#[tokio::test]
async fn client_priority_picks_first_client_token() {
    let (sse, _) = open_with(
        "gzip, br",
        config_br_then_gzip(CompressionStrategy::ClientPriority),
    )
    .await;
    assert_eq!(sse.encoding(), Some("gzip"));
}

#[tokio::test]
async fn server_priority_picks_first_server_compressor() {
    let (sse, _) = open_with(
        "gzip, br",
        config_br_then_gzip(CompressionStrategy::ServerPriority),
    )
    .await;
    assert_eq!(sse.encoding(), Some("br"));
}

#[tokio::test]
async fn forced_picks_first_configured_compressor() {
    let (sse, _) = open_with("identity", config_br_then_gzip(CompressionStrategy::Forced)).await;
    assert_eq!(sse.encoding(), Some("br"));
}

#[tokio::test]
async fn no_match_streams_uncompressed() {
    let (sse, sink) = open_with(
        "identity",
        config_br_then_gzip(CompressionStrategy::ClientPriority),
    )
    .await;
    assert_eq!(sse.encoding(), None);

    sse.patch_signals(r#"{"a":1}"#, PatchSignalsOptions::default())
        .await
        .unwrap();
    assert_eq!(
        sink.as_string(),
        "event: datastar-patch-signals\ndata: signals {\"a\":1}\n\n"
    );
}

#[tokio::test]
async fn quality_weights_are_ignored() {
    let (sse, _) = open_with(
        "br;q=0.5, gzip;q=1.0",
        config_br_then_gzip(CompressionStrategy::ClientPriority),
    )
    .await;
    // First-listed client token wins regardless of q-values.
    assert_eq!(sse.encoding(), Some("br"));
}

#[tokio::test]
async fn gzip_round_trip_reproduces_frames() {
    let (sse, sink) = open_with(
        "gzip",
        CompressionConfig::new().compressor(GzipCompressor::default()),
    )
    .await;
    assert_eq!(sse.encoding(), Some("gzip"));

    sse.patch_signals(r#"{"a":1}"#, PatchSignalsOptions::default())
        .await
        .unwrap();
    sse.patch_signals(r#"{"b":2}"#, PatchSignalsOptions::default())
        .await
        .unwrap();
    sse.shutdown().await.unwrap();

    let compressed = sink.bytes();
    assert_ne!(compressed.len(), 0);

    let mut decoder = GzipDecoder::new(&compressed[..]);
    let mut decoded = Vec::new();
    decoder.read_to_end(&mut decoded).await.unwrap();

    assert_eq!(
        String::from_utf8(decoded).unwrap(),
        "event: datastar-patch-signals\ndata: signals {\"a\":1}\n\n\
         event: datastar-patch-signals\ndata: signals {\"b\":2}\n\n"
    );
}

#[tokio::test]
async fn each_event_is_decodable_as_flushed() {
    // Flushing after every send must drain the compression layer, so a
    // decoder can recover the first frame before the stream ends.
    let (sse, sink) = open_with(
        "zstd",
        CompressionConfig::new().compressor(ZstdCompressor::default()),
    )
    .await;

    sse.patch_signals(r#"{"tick":1}"#, PatchSignalsOptions::default())
        .await
        .unwrap();

    let flushed = sink.bytes();
    assert_ne!(flushed.len(), 0);

    let expected = "event: datastar-patch-signals\ndata: signals {\"tick\":1}\n\n";
    let mut decoder = ZstdDecoder::new(&flushed[..]);
    let mut decoded = Vec::new();
    let mut chunk = [0u8; 64];
    while decoded.len() < expected.len() {
        match decoder.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => decoded.extend_from_slice(&chunk[..n]),
            // The stream is mid-frame (no trailer yet); everything before
            // the cut must already have been recovered.
            Err(_) => break,
        }
    }
    assert_eq!(String::from_utf8(decoded).unwrap(), expected);
}
