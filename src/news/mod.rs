use chrono::{DateTime, Utc};

use crate::core::client::RetryConfig;
use crate::core::net::EndpointSource;
use crate::core::wire::decode_single;
use crate::core::{AlpacaClient, AlpacaError, Endpoint, News, PageLimits, QueryFilter, RecordKind, Sort, collect_all};

/// A builder for fetching news articles, optionally filtered by symbol.
///
/// The news endpoint pages over all requested symbols with a single cursor and
/// serves at most 50 articles per page.
#[derive(Debug, Clone)]
pub struct NewsBuilder {
    client: AlpacaClient,
    filter: QueryFilter,
    retry_override: Option<RetryConfig>,
}

impl NewsBuilder {
    /// Creates a new `NewsBuilder`; without symbols it returns news for all symbols.
    #[must_use]
    pub fn new(client: &AlpacaClient) -> Self {
        Self {
            client: client.clone(),
            filter: QueryFilter::default(),
            retry_override: None,
        }
    }

    /// Overrides the default retry policy for this specific API call.
    #[must_use]
    pub fn retry_policy(mut self, cfg: Option<RetryConfig>) -> Self {
        self.retry_override = cfg;
        self
    }

    /// Replaces the current list of symbols with a new list.
    #[must_use]
    pub fn symbols<I, S>(mut self, syms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter.symbols = syms.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the inclusive start of the window.
    #[must_use]
    pub const fn start(mut self, start: DateTime<Utc>) -> Self {
        self.filter.start = Some(start);
        self
    }

    /// Sets the inclusive end of the window.
    #[must_use]
    pub const fn end(mut self, end: DateTime<Utc>) -> Self {
        self.filter.end = Some(end);
        self
    }

    /// Sets both ends of the window.
    #[must_use]
    pub const fn between(self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start(start).end(end)
    }

    /// Caps the number of articles returned. `0` means no cap.
    #[must_use]
    pub const fn total_limit(mut self, n: usize) -> Self {
        self.filter.total_limit = Some(n);
        self
    }

    /// Caps the number of articles requested per page (at most 50).
    #[must_use]
    pub const fn page_limit(mut self, n: usize) -> Self {
        self.filter.page_limit = Some(n);
        self
    }

    /// Sets the ordering by publication time. (Default: server side, newest first)
    #[must_use]
    pub const fn sort(mut self, sort: Sort) -> Self {
        self.filter.sort = Some(sort);
        self
    }

    /// Includes the full article body in `News::content`.
    #[must_use]
    pub const fn include_content(mut self, yes: bool) -> Self {
        self.filter.include_content = Some(yes);
        self
    }

    /// Skips articles that have no content.
    #[must_use]
    pub const fn exclude_contentless(mut self, yes: bool) -> Self {
        self.filter.exclude_contentless = Some(yes);
        self
    }

    /// Executes the request and fetches the articles across all pages.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` before any request if the filter is invalid,
    /// otherwise the first error hit while paginating.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err, fields(symbols = ?self.filter.symbols)))]
    pub async fn fetch(self) -> Result<Vec<News>, AlpacaError> {
        let source = EndpointSource::new(
            &self.client,
            Endpoint::news(),
            &self.filter,
            self.retry_override,
            decode_single::<News>,
        )?;
        let limits = PageLimits::new(
            self.filter.page_cap(RecordKind::News),
            self.filter.total_limit,
        );
        collect_all(source, limits).await
    }
}
