use std::collections::HashMap;
use std::marker::PhantomData;

use chrono::{DateTime, NaiveDate, Utc};
use futures::StreamExt;

use crate::core::client::RetryConfig;
use crate::core::net::EndpointSource;
use crate::core::wire::{decode_multi, decode_single};
use crate::core::{
    Adjustment, AlpacaClient, AlpacaError, Bar, Endpoint, PageLimits, QueryFilter, Quote, Record,
    RecordKind, Sort, TimeFrame, Trade, collect_all,
};
use crate::stream::{FetchStream, merged_pages};

/// Builder for trades of several symbols.
pub type MultiTradesBuilder = DownloadBuilder<Trade>;
/// Builder for quotes of several symbols.
pub type MultiQuotesBuilder = DownloadBuilder<Quote>;
/// Builder for bars of several symbols.
pub type MultiBarsBuilder = DownloadBuilder<Bar>;

/// How a multi-symbol `fetch` spreads its requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanOut {
    /// One cursor over the multi-symbol endpoint; the server interleaves symbols.
    /// Fewest requests. (Default)
    #[default]
    SharedCursor,
    /// One cursor per symbol over the single-symbol endpoint, run concurrently.
    PerSymbol,
}

/// A builder for downloading historical records for multiple symbols.
///
/// `fetch` is all-or-nothing: it returns every symbol's records or the first
/// error, never a partial map. `stream` is the opposite: records arrive as they
/// are fetched and a failing symbol only ends its own part of the stream.
///
/// `total_limit` caps the records returned across all symbols combined.
#[derive(Debug, Clone)]
pub struct DownloadBuilder<R> {
    client: AlpacaClient,
    filter: QueryFilter,
    fan_out: FanOut,
    concurrency: Option<usize>,
    retry_override: Option<RetryConfig>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> DownloadBuilder<R> {
    /// Creates a new `DownloadBuilder` with no symbols.
    ///
    /// Bars default to the `1Day` time frame.
    #[must_use]
    pub fn new(client: &AlpacaClient) -> Self {
        Self {
            client: client.clone(),
            filter: QueryFilter {
                feed: client.default_feed(),
                timeframe: (R::KIND == RecordKind::Bars).then_some(TimeFrame::ONE_DAY),
                ..QueryFilter::default()
            },
            fan_out: FanOut::default(),
            concurrency: None,
            retry_override: None,
            _record: PhantomData,
        }
    }

    /// Overrides the default retry policy for all API calls made by this builder.
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

    /// Adds a single symbol to the list of symbols to download.
    #[must_use]
    pub fn add_symbol(mut self, sym: impl Into<String>) -> Self {
        self.filter.symbols.push(sym.into());
        self
    }

    /// Chooses the request strategy used by `fetch`. `stream` always runs per symbol.
    #[must_use]
    pub const fn fan_out(mut self, fan_out: FanOut) -> Self {
        self.fan_out = fan_out;
        self
    }

    /// Maximum symbols fetched at once in per-symbol mode. Defaults to the client setting.
    #[must_use]
    pub const fn concurrency(mut self, n: usize) -> Self {
        self.concurrency = Some(n);
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

    /// Caps the number of records returned across all symbols. `0` means no cap.
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

    /// Resolves symbols as they were named on `date`.
    #[must_use]
    pub const fn as_of(mut self, date: NaiveDate) -> Self {
        self.filter.as_of = Some(date);
        self
    }

    /// Sets the timestamp ordering within each symbol.
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

    fn limits(&self) -> PageLimits {
        PageLimits::new(self.filter.page_cap(R::KIND), self.filter.total_limit)
    }

    fn concurrency_limit(&self) -> usize {
        self.concurrency
            .unwrap_or_else(|| self.client.max_concurrency())
            .max(1)
    }

    fn per_symbol_sources(&self) -> Result<Vec<(String, EndpointSource<R>)>, AlpacaError> {
        let symbols = self.filter.unique_symbols();
        if symbols.is_empty() {
            return Err(AlpacaError::invalid("no symbols specified"));
        }
        symbols
            .into_iter()
            .map(|sym| {
                let filter = QueryFilter {
                    symbols: vec![sym.to_string()],
                    ..self.filter.clone()
                };
                let source = EndpointSource::new(
                    &self.client,
                    Endpoint::single(R::KIND),
                    &filter,
                    self.retry_override.clone(),
                    decode_single::<R>,
                )?;
                Ok((sym.to_string(), source))
            })
            .collect()
    }

    /// Executes the download and returns each symbol's records.
    ///
    /// Symbols without records are absent from the map.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` before any request if the filter is invalid,
    /// otherwise the first error hit by any symbol. In-flight requests for the
    /// other symbols are cancelled and nothing fetched so far is returned.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err, fields(symbols = ?self.filter.symbols, kind = R::KIND.key(), fan_out = ?self.fan_out)))]
    pub async fn fetch(self) -> Result<HashMap<String, Vec<R>>, AlpacaError> {
        match self.fan_out {
            FanOut::SharedCursor => self.fetch_shared_cursor().await,
            FanOut::PerSymbol => self.fetch_per_symbol().await,
        }
    }

    async fn fetch_shared_cursor(&self) -> Result<HashMap<String, Vec<R>>, AlpacaError> {
        let source = EndpointSource::new(
            &self.client,
            Endpoint::multi(R::KIND),
            &self.filter,
            self.retry_override.clone(),
            decode_multi::<R>,
        )?;

        let mut out: HashMap<String, Vec<R>> = HashMap::new();
        for (symbol, record) in collect_all(source, self.limits()).await? {
            out.entry(symbol).or_default().push(record);
        }
        Ok(out)
    }

    async fn fetch_per_symbol(&self) -> Result<HashMap<String, Vec<R>>, AlpacaError> {
        let sources = self.per_symbol_sources()?;
        let limits = self.limits();
        let mut pages = std::pin::pin!(merged_pages(sources, limits, self.concurrency_limit()));

        // Only this loop writes to `out`; producers hand pages over through the merged stream.
        let mut out: HashMap<String, Vec<R>> = HashMap::new();
        let mut collected = 0usize;
        while let Some((symbol, page)) = pages.next().await {
            let mut records = page?;
            if let Some(total) = limits.total {
                records.truncate(total.saturating_sub(collected));
            }
            collected += records.len();
            if !records.is_empty() {
                out.entry(symbol).or_default().extend(records);
            }
            if limits.total.is_some_and(|total| collected >= total) {
                break;
            }
        }
        Ok(out)
    }

    /// Starts one background retrieval per symbol and returns records as they arrive.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the filter is invalid; errors met while
    /// paginating are delivered through the stream, attributed to their symbol.
    pub fn stream(self) -> Result<FetchStream<R>, AlpacaError> {
        let sources = self.per_symbol_sources()?;
        Ok(FetchStream::spawn(
            sources,
            self.limits(),
            self.concurrency_limit(),
            self.client.stream_buffer(),
        ))
    }
}

impl DownloadBuilder<Bar> {
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
