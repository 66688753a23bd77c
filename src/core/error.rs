use thiserror::Error;

/// The primary error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum AlpacaError {
    /// A filter, symbol or time frame was rejected before any request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The request could not be completed at the transport level (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server kept answering `429 Too Many Requests` after all retries were spent.
    #[error("rate limited at {url}")]
    RateLimited {
        /// The URL that was rate limited.
        url: String,
    },

    /// The server returned a non-2xx status other than 429.
    #[error("Unexpected response status: {status} at {url}: {message}")]
    Server {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error.
        url: String,
        /// The response body, as returned by the server.
        message: String,
    },

    /// A page could not be decoded, or the cursor misbehaved.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl AlpacaError {
    /// Returns `true` for errors that make every further request pointless,
    /// such as rejected credentials.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Server { status: 401 | 403, .. })
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
