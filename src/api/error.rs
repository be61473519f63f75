// Typed errors for the API layer.
//
// The library exposes a closed taxonomy so callers can tell transport
// failures apart from server-reported ones. The binary wraps these in
// anyhow at its boundary; the feed collapses them into user-facing
// message strings.

use thiserror::Error;

/// Everything that can go wrong between building a request and handing
/// back a decoded payload.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure: DNS, connect, TLS, timeout.
    #[error("network unavailable: {0}")]
    Network(#[source] reqwest::Error),

    /// Non-2xx response without a decodable server message.
    #[error("server returned status {0}")]
    InvalidResponse(u16),

    /// A 2xx response whose body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decoding(#[source] reqwest::Error),

    /// Structured error message supplied by the server.
    #[error("{0}")]
    Server(String),

    /// An authenticated operation was attempted without a bearer token.
    #[error("operation requires authentication")]
    MissingCredentials,
}
