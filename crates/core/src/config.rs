//! Global configuration constants for blastkb.
//!
//! Ranking parameters, input limits, and server defaults are defined here.
//! These are compile-time constants; runtime configuration is handled via CLI
//! options and JSON files in the server crate.

/// BM25 term frequency saturation parameter.
///
/// Fixed at 1.5. Higher values let repeated terms keep adding score for longer.
pub const BM25_K1: f64 = 1.5;

/// BM25 document length normalization parameter.
///
/// Fixed at 0.75. 0.0 = no normalization, 1.0 = full normalization.
pub const BM25_B: f64 = 0.75;

/// Smoothing added to document frequency in the IDF numerator and denominator.
pub const IDF_SMOOTHING: f64 = 0.5;

/// Maximum number of documents accepted in a corpus file.
pub const MAX_CORPUS_DOCUMENTS: usize = 10_000;

/// Maximum length of a query or chat message in bytes.
pub const MAX_QUERY_LEN: usize = 4_096;

/// Default number of results returned by `POST /search`.
pub const DEFAULT_K: usize = 10;

/// Maximum number of results (`k`) per search request.
pub const MAX_K: usize = 1_000;

/// Default HTTP server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Per-request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Maximum HTTP request body size in bytes (64 KB).
pub const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Maximum number of concurrent in-flight requests.
pub const MAX_CONCURRENT_REQUESTS: usize = 256;

/// Graceful shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 10;
