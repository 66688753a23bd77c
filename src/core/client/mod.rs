//! Public client surface + builder.
//! Internals are split into `auth` (credential headers), `constants` (UA + defaults)
//! and `retry` (backoff policy + send loop).

mod auth;
mod constants;
mod retry;

pub use auth::Credentials;
pub use retry::{Backoff, RetryConfig};

use crate::core::AlpacaError;
use constants::{
    DEFAULT_BASE_DATA, DEFAULT_MAX_CONCURRENCY, DEFAULT_STREAM_BUFFER, ENV_DATA_URL, ENV_KEY_ID,
    ENV_OAUTH, ENV_SECRET_KEY, USER_AGENT,
};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Handle to the market data API.
///
/// Cheap to clone; clones share the underlying connection pool. Holds
/// configuration only, so concurrent calls never observe each other.
#[derive(Debug, Clone)]
pub struct AlpacaClient {
    http: Client,
    base_data: Url,
    credentials: Arc<Credentials>,
    retry: RetryConfig,
    max_concurrency: usize,
    stream_buffer: usize,
    feed: Option<String>,
}

impl AlpacaClient {
    /// Create a new builder.
    #[must_use]
    pub fn builder() -> AlpacaClientBuilder {
        AlpacaClientBuilder::default()
    }

    /// Builds a client configured from the `APCA_API_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `APCA_API_DATA_URL` is not a valid URL or the HTTP
    /// client cannot be created.
    pub fn from_env() -> Result<Self, AlpacaError> {
        Self::builder().with_env()?.build()
    }

    /// The retry policy used when a call does not override it.
    #[must_use]
    pub const fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /* -------- internal getters used by other modules -------- */

    pub(crate) const fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) const fn base_data(&self) -> &Url {
        &self.base_data
    }

    pub(crate) const fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub(crate) const fn stream_buffer(&self) -> usize {
        self.stream_buffer
    }

    pub(crate) fn default_feed(&self) -> Option<String> {
        self.feed.clone()
    }
}

/* ----------------------- Builder ----------------------- */

#[derive(Debug, Default)]
pub struct AlpacaClientBuilder {
    user_agent: Option<String>,
    base_data: Option<Url>,
    credentials: Credentials,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    retry: Option<RetryConfig>,
    max_concurrency: Option<usize>,
    stream_buffer: Option<usize>,
    feed: Option<String>,
}

impl AlpacaClientBuilder {
    /// Reads credentials and the base URL from the environment.
    ///
    /// `APCA_API_OAUTH` wins over `APCA_API_KEY_ID`/`APCA_API_SECRET_KEY` when both are set.
    /// Unset variables leave the current settings untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if `APCA_API_DATA_URL` is set but is not a valid URL.
    pub fn with_env(mut self) -> Result<Self, AlpacaError> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        if let Some(token) = var(ENV_OAUTH) {
            self.credentials = Credentials::OAuth(token);
        } else if let (Some(key_id), Some(secret_key)) = (var(ENV_KEY_ID), var(ENV_SECRET_KEY)) {
            self.credentials = Credentials::KeyPair { key_id, secret_key };
        }
        if let Some(url) = var(ENV_DATA_URL) {
            self.base_data = Some(Url::parse(&url)?);
        }
        Ok(self)
    }

    /// Override the User-Agent.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Override the data API base (e.g., `https://data.alpaca.markets/`).
    ///
    /// Versioned paths such as `v2/stocks/AAPL/trades` are appended below its
    /// path, so a prefix like `http://host/proxy` is kept with or without a
    /// trailing `/`.
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_data = Some(url);
        self
    }

    /// Authenticate with an API key pair.
    #[must_use]
    pub fn key_pair(mut self, key_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        self.credentials = Credentials::KeyPair {
            key_id: key_id.into(),
            secret_key: secret_key.into(),
        };
        self
    }

    /// Authenticate with an OAuth access token.
    #[must_use]
    pub fn oauth_token(mut self, token: impl Into<String>) -> Self {
        self.credentials = Credentials::OAuth(token.into());
        self
    }

    /// Set credentials directly.
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set a global request timeout (overall). Default: none.
    #[must_use]
    pub const fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: none.
    #[must_use]
    pub const fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// Sets the default retry policy for every call made through the client.
    #[must_use]
    pub fn retry_config(mut self, cfg: RetryConfig) -> Self {
        self.retry = Some(cfg);
        self
    }

    /// Symbols fetched concurrently by per-symbol fan-out. Default: 16.
    #[must_use]
    pub const fn max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = Some(n);
        self
    }

    /// Records buffered ahead of a slow stream consumer. Default: 16.
    #[must_use]
    pub const fn stream_buffer(mut self, n: usize) -> Self {
        self.stream_buffer = Some(n);
        self
    }

    /// Default data feed (e.g. `iex`, `sip`) applied to stock requests that do not set one.
    #[must_use]
    pub fn feed(mut self, feed: impl Into<String>) -> Self {
        self.feed = Some(feed.into());
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the default base URL cannot be parsed or the HTTP
    /// client cannot be created.
    pub fn build(self) -> Result<AlpacaClient, AlpacaError> {
        let base_data = match self.base_data {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_DATA)?,
        };

        let mut httpb =
            reqwest::Client::builder().user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT));
        if let Some(t) = self.timeout {
            httpb = httpb.timeout(t);
        }
        if let Some(ct) = self.connect_timeout {
            httpb = httpb.connect_timeout(ct);
        }
        let http = httpb.build()?;

        Ok(AlpacaClient {
            http,
            base_data,
            credentials: Arc::new(self.credentials),
            retry: self.retry.unwrap_or_default(),
            max_concurrency: self.max_concurrency.unwrap_or(DEFAULT_MAX_CONCURRENCY).max(1),
            stream_buffer: self.stream_buffer.unwrap_or(DEFAULT_STREAM_BUFFER).max(1),
            feed: self.feed,
        })
    }
}
