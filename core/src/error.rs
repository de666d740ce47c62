//! Error types for the drink API client.
//!
//! # Design
//! The taxonomy is closed: every failure a request can hit lands in exactly
//! one of five variants. `Display` is the message a host shows next to its
//! retry button, so each variant renders as a complete sentence fragment.

use thiserror::Error;

/// Errors returned by `DrinkClient` build/parse methods and by transports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request URL could not be constructed from the inputs.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The server answered 2xx with an empty body.
    #[error("No data received")]
    NoData,

    /// The response body did not match the drink schema.
    #[error("Failed to decode data: {0}")]
    Decoding(String),

    /// The request never produced a response (DNS, connect, TLS, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// The server returned a non-2xx status.
    #[error("Server error with code: {0}")]
    ServerStatus(u16),
}
