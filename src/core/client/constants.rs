//! Centralized constants for default endpoints, UA and engine sizing.

/// Identifies the client to the upstream API.
pub(crate) const USER_AGENT: &str = concat!("alpaca-data-rs/", env!("CARGO_PKG_VERSION"));

/// Market data API base (versioned paths are appended).
pub(crate) const DEFAULT_BASE_DATA: &str = "https://data.alpaca.markets/";

/// Symbols fetched concurrently in per-symbol fan-out.
pub(crate) const DEFAULT_MAX_CONCURRENCY: usize = 16;

/// Records buffered between producers and a slow stream consumer.
pub(crate) const DEFAULT_STREAM_BUFFER: usize = 16;

/* environment variables read by `AlpacaClientBuilder::with_env` */
pub(crate) const ENV_KEY_ID: &str = "APCA_API_KEY_ID";
pub(crate) const ENV_SECRET_KEY: &str = "APCA_API_SECRET_KEY";
pub(crate) const ENV_OAUTH: &str = "APCA_API_OAUTH";
pub(crate) const ENV_DATA_URL: &str = "APCA_API_DATA_URL";
