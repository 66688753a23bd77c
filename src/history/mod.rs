//! Historical trades, quotes and bars for a single symbol.

use std::marker::PhantomData;

use chrono::{DateTime, NaiveDate, Utc};

use crate::core::client::RetryConfig;
use crate::core::net::EndpointSource;
use crate::core::wire::decode_single;
use crate::core::{
    Adjustment, AlpacaClient, AlpacaError, Bar, Endpoint, PageLimits, QueryFilter, Quote, Record,
    RecordKind, Sort, TimeFrame, Trade, collect_all,
};
use crate::stream::FetchStream;

/// Builder for trades of one symbol.
pub type TradesBuilder = HistoryBuilder<Trade>;
/// Builder for quotes of one symbol.
pub type QuotesBuilder = HistoryBuilder<Quote>;
/// Builder for bars of one symbol.
pub type BarsBuilder = HistoryBuilder<Bar>;

/// A builder for fetching historical records of one kind for a single symbol.
///
/// The record type selects the endpoint: `HistoryBuilder<Trade>` reads
/// `v2/stocks/{symbol}/trades`, and so on. Pages are followed until the server
/// runs out of data or `total_limit` records have been collected.
///
/// ```no_run
/// # async fn run() -> Result<(), alpaca_data_rs::AlpacaError> {
/// use alpaca_data_rs::{AlpacaClient, QuotesBuilder};
/// use chrono::{TimeZone, Utc};
///
/// let client = AlpacaClient::from_env()?;
/// let quotes = QuotesBuilder::new(&client, "TSLA")
///     .start(Utc.with_ymd_and_hms(2021, 8, 9, 13, 30, 0).unwrap())
///     .total_limit(30)
///     .fetch()
///     .await?;
/// assert!(quotes.len() <= 30);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HistoryBuilder<R> {
    client: AlpacaClient,
    filter: QueryFilter,
    retry_override: Option<RetryConfig>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> HistoryBuilder<R> {
    /// Creates a new builder for `symbol`, using the client's default feed.
    ///
    /// Bars default to the `1Day` time frame.
    pub fn new(client: &AlpacaClient, symbol: impl Into<String>) -> Self {
        Self {
            client: client.clone(),
            filter: QueryFilter {
                symbols: vec![symbol.into()],
                feed: client.default_feed(),
                timeframe: (R::KIND == RecordKind::Bars).then_some(TimeFrame::ONE_DAY),
                ..QueryFilter::default()
            },
            retry_override: None,
            _record: PhantomData,
        }
    }

    /// Overrides the default retry policy for this specific API call.
    #[must_use]
    pub fn retry_policy(mut self, cfg: Option<RetryConfig>) -> Self {
        self.retry_override = cfg;
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

    /// Caps the number of records returned across all pages. `0` means no cap.
    #[must_use]
    pub const fn total_limit(mut self, n: usize) -> Self {
        self.filter.total_limit = Some(n);
        self
    }

    /// Caps the number of records requested per page.
    #[must_use]
    pub const fn page_limit(mut self, n: usize) -> Self {
        self.filter.page_limit = Some(n);
        self
    }

    /// Selects the data feed (e.g. `sip`, `iex`).
    #[must_use]
    pub fn feed(mut self, feed: impl Into<String>) -> Self {
        self.filter.feed = Some(feed.into());
        self
    }

    /// Requests prices in another currency.
    #[must_use]
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.filter.currency = Some(currency.into());
        self
    }

    /// Resolves the symbol as it was named on `date`.
    #[must_use]
    pub const fn as_of(mut self, date: NaiveDate) -> Self {
        self.filter.as_of = Some(date);
        self
    }

    /// Sets the timestamp ordering.
    #[must_use]
    pub const fn sort(mut self, sort: Sort) -> Self {
        self.filter.sort = Some(sort);
        self
    }

    /// The filter as it will be sent.
    #[must_use]
    pub const fn filter(&self) -> &QueryFilter {
        &self.filter
    }

    fn source(&self) -> Result<EndpointSource<R>, AlpacaError> {
        EndpointSource::new(
            &self.client,
            Endpoint::single(R::KIND),
            &self.filter,
            self.retry_override.clone(),
            decode_single::<R>,
        )
    }

    fn limits(&self) -> PageLimits {
        PageLimits::new(self.filter.page_cap(R::KIND), self.filter.total_limit)
    }

    /// Executes the request, following every page, and returns all records in server order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` before any request if the filter is invalid,
    /// otherwise the first error hit while paginating.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err, fields(symbol = ?self.filter.symbols, kind = R::KIND.key())))]
    pub async fn fetch(self) -> Result<Vec<R>, AlpacaError> {
        let source = self.source()?;
        collect_all(source, self.limits()).await
    }

    /// Starts a background retrieval and returns its records as they arrive.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the filter is invalid; errors met while
    /// paginating are delivered through the stream.
    pub fn stream(self) -> Result<FetchStream<R>, AlpacaError> {
        let source = self.source()?;
        let symbol = self.filter.symbols.first().cloned().unwrap_or_default();
        Ok(FetchStream::spawn(
            vec![(symbol, source)],
            self.limits(),
            1,
            self.client.stream_buffer(),
        ))
    }
}

impl HistoryBuilder<Bar> {
    /// Sets the bar time frame. (Default: `1Day`)
    #[must_use]
    pub const fn timeframe(mut self, tf: TimeFrame) -> Self {
        self.filter.timeframe = Some(tf);
        self
    }

    /// Sets the corporate-action adjustment. (Default: server side, `raw`)
    #[must_use]
    pub const fn adjustment(mut self, adj: Adjustment) -> Self {
        self.filter.adjustment = Some(adj);
        self
    }
}
