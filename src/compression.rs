//! Content-encoding negotiation and compressor adapters.
//!
//! A [`Compressor`] wraps the stream's output sink with a write-side
//! encoder. Selection happens once, at stream open, according to the
//! configured [`CompressionStrategy`] and the client's `Accept-Encoding`
//! tokens; after that the chosen encoding never changes. Selecting no
//! compressor is a valid outcome and leaves the sink untouched.

use async_compression::tokio::write::{BrotliEncoder, GzipEncoder, ZlibEncoder, ZstdEncoder};
use async_compression::Level;
use tokio::io::AsyncWrite;

/// The boxed byte sink a generator writes frames into.
pub type BoxSink = Box<dyn AsyncWrite + Send + Unpin>;

/// Strategy for choosing a compression algorithm at stream open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionStrategy {
    /// Iterate the client's advertised tokens in order; the first token
    /// any configured compressor supports wins.
    #[default]
    ClientPriority,
    /// Iterate the configured compressors in order; the first one the
    /// client advertises wins.
    ServerPriority,
    /// Use the first configured compressor regardless of client support.
    Forced,
}

impl CompressionStrategy {
    /// The configuration token naming this strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionStrategy::ClientPriority => "client_priority",
            CompressionStrategy::ServerPriority => "server_priority",
            CompressionStrategy::Forced => "forced",
        }
    }
}

/// A content-encoding algorithm that can wrap the stream's sink.
///
/// Implementations must flush buffered compressed bytes to the inner sink
/// on `flush`, since each event frame is delivered incrementally.
pub trait Compressor: Send + Sync {
    /// The `Content-Encoding` token this compressor advertises.
    fn encoding(&self) -> &'static str;

    /// Wrap `sink` with this algorithm's write-side encoder.
    fn wrap(&self, sink: BoxSink) -> BoxSink;
}

/// Gzip compressor.
#[derive(Debug, Clone, Copy)]
pub struct GzipCompressor {
    /// Compression level; higher trades CPU for smaller output.
    pub level: Level,
}

impl Default for GzipCompressor {
    fn default() -> Self {
        Self {
            level: Level::Default,
        }
    }
}

impl Compressor for GzipCompressor {
    fn encoding(&self) -> &'static str {
        "gzip"
    }

    fn wrap(&self, sink: BoxSink) -> BoxSink {
        Box::new(GzipEncoder::with_quality(sink, self.level))
    }
}

/// Deflate (zlib-wrapped) compressor.
#[derive(Debug, Clone, Copy)]
pub struct DeflateCompressor {
    /// Compression level; higher trades CPU for smaller output.
    pub level: Level,
}

impl Default for DeflateCompressor {
    fn default() -> Self {
        Self {
            level: Level::Default,
        }
    }
}

impl Compressor for DeflateCompressor {
    fn encoding(&self) -> &'static str {
        "deflate"
    }

    fn wrap(&self, sink: BoxSink) -> BoxSink {
        Box::new(ZlibEncoder::with_quality(sink, self.level))
    }
}

/// Brotli compressor.
#[derive(Debug, Clone, Copy)]
pub struct BrotliCompressor {
    /// Quality level, 0 (fastest) to 11 (best ratio).
    pub level: Level,
}

impl Default for BrotliCompressor {
    fn default() -> Self {
        Self {
            level: Level::Default,
        }
    }
}

impl Compressor for BrotliCompressor {
    fn encoding(&self) -> &'static str {
        "br"
    }

    fn wrap(&self, sink: BoxSink) -> BoxSink {
        Box::new(BrotliEncoder::with_quality(sink, self.level))
    }
}

/// Zstandard compressor.
#[derive(Debug, Clone, Copy)]
pub struct ZstdCompressor {
    /// Compression level; higher trades CPU for smaller output.
    pub level: Level,
}

impl Default for ZstdCompressor {
    fn default() -> Self {
        Self {
            level: Level::Default,
        }
    }
}

impl Compressor for ZstdCompressor {
    fn encoding(&self) -> &'static str {
        "zstd"
    }

    fn wrap(&self, sink: BoxSink) -> BoxSink {
        Box::new(ZstdEncoder::with_quality(sink, self.level))
    }
}

/// Compression configuration for one stream.
///
/// The compressor list order is significant: it breaks ties under
/// [`ServerPriority`](CompressionStrategy::ServerPriority) and determines
/// the single selection under [`Forced`](CompressionStrategy::Forced).
/// An empty list falls back to the built-in ordering (best ratio first):
/// brotli, zstd, gzip, deflate.
#[derive(Default)]
pub struct CompressionConfig {
    strategy: CompressionStrategy,
    compressors: Vec<Box<dyn Compressor>>,
}

impl CompressionConfig {
    /// Start an empty configuration with the default strategy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selection strategy.
    pub fn strategy(mut self, strategy: CompressionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Append a compressor to the ordered list.
    pub fn compressor(mut self, compressor: impl Compressor + 'static) -> Self {
        self.compressors.push(Box::new(compressor));
        self
    }

    /// Select one compressor per the strategy, consuming the config.
    ///
    /// Returns `None` when no configured compressor matches the client's
    /// tokens (uncompressed passthrough, not an error).
    pub(crate) fn select(mut self, client_encodings: &[String]) -> Option<Box<dyn Compressor>> {
        if self.compressors.is_empty() {
            self.compressors = default_compressors();
        }

        let index = match self.strategy {
            CompressionStrategy::ClientPriority => client_encodings.iter().find_map(|enc| {
                self.compressors
                    .iter()
                    .position(|comp| comp.encoding() == enc)
            }),
            CompressionStrategy::ServerPriority => self
                .compressors
                .iter()
                .position(|comp| client_encodings.iter().any(|enc| enc == comp.encoding())),
            CompressionStrategy::Forced => Some(0),
        }?;

        Some(self.compressors.swap_remove(index))
    }
}

fn default_compressors() -> Vec<Box<dyn Compressor>> {
    vec![
        Box::new(BrotliCompressor::default()),
        Box::new(ZstdCompressor::default()),
        Box::new(GzipCompressor::default()),
        Box::new(DeflateCompressor::default()),
    ]
}

/// Parse an `Accept-Encoding` header value into its encoding tokens.
///
/// Tokens are split on commas and trimmed; any quality weighting after a
/// semicolon is discarded. Client order is preserved.
pub fn parse_encodings(header: &str) -> Vec<String> {
    header
        .split(',')
        .filter_map(|part| {
            let token = part.trim().split(';').next().unwrap_or("").trim();
            if token.is_empty() {
                None
            } else {
                Some(token.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_encodings_splits_and_trims() {
        assert_eq!(
            parse_encodings("gzip, br;q=0.8, zstd"),
            vec!["gzip", "br", "zstd"]
        );
    }

    #[test]
    fn test_parse_encodings_discards_empty_tokens() {
        assert_eq!(parse_encodings(""), Vec::<String>::new());
        assert_eq!(parse_encodings(" , gzip ,,"), vec!["gzip"]);
    }

    #[test]
    fn test_client_priority_first_client_token_wins() {
        let config = CompressionConfig::new()
            .strategy(CompressionStrategy::ClientPriority)
            .compressor(BrotliCompressor::default())
            .compressor(GzipCompressor::default());
        let chosen = config.select(&tokens(&["gzip", "br"])).unwrap();
        assert_eq!(chosen.encoding(), "gzip");
    }

    #[test]
    fn test_server_priority_first_server_compressor_wins() {
        let config = CompressionConfig::new()
            .strategy(CompressionStrategy::ServerPriority)
            .compressor(BrotliCompressor::default())
            .compressor(GzipCompressor::default());
        let chosen = config.select(&tokens(&["gzip", "br"])).unwrap();
        assert_eq!(chosen.encoding(), "br");
    }

    #[test]
    fn test_forced_ignores_client_tokens() {
        let config = CompressionConfig::new()
            .strategy(CompressionStrategy::Forced)
            .compressor(BrotliCompressor::default())
            .compressor(GzipCompressor::default());
        let chosen = config.select(&tokens(&["identity"])).unwrap();
        assert_eq!(chosen.encoding(), "br");
    }

    #[test]
    fn test_no_match_is_passthrough() {
        let config = CompressionConfig::new().compressor(GzipCompressor::default());
        assert!(config.select(&tokens(&["identity"])).is_none());
    }

    #[test]
    fn test_default_ordering_best_ratio_first() {
        let config = CompressionConfig::new().strategy(CompressionStrategy::Forced);
        let chosen = config.select(&[]).unwrap();
        assert_eq!(chosen.encoding(), "br");
    }

    #[test]
    fn test_strategy_tokens() {
        assert_eq!(CompressionStrategy::ClientPriority.as_str(), "client_priority");
        assert_eq!(CompressionStrategy::ServerPriority.as_str(), "server_priority");
        assert_eq!(CompressionStrategy::Forced.as_str(), "forced");
    }
}
