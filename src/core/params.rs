//! Query parameters for the historical data endpoints.
//!
//! `QueryFilter` is what callers configure through the builders; `Endpoint`
//! describes where it is sent. `QueryFilter::to_params` turns the pair into the
//! ordered key/value list that goes on the wire (minus `limit`/`page_token`,
//! which belong to the pagination engine).

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::core::{AlpacaError, TimeFrame};

/// Largest page the stock endpoints accept.
pub(crate) const MAX_STOCK_PAGE_LIMIT: usize = 10_000;
/// Largest page the news endpoint accepts.
pub(crate) const MAX_NEWS_PAGE_LIMIT: usize = 50;
/// Most symbols a single multi-symbol stock request may carry.
pub(crate) const MAX_MULTI_SYMBOLS: usize = 1_000;

/// Corporate-action adjustment applied to bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Adjustment {
    /// No adjustment.
    #[default]
    Raw,
    /// Adjusted for splits.
    Split,
    /// Adjusted for dividends.
    Dividend,
    /// Adjusted for splits and dividends.
    All,
}

impl Adjustment {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Split => "split",
            Self::Dividend => "dividend",
            Self::All => "all",
        }
    }
}

/// Timestamp ordering of the returned records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sort {
    /// Oldest first (server default).
    #[default]
    Asc,
    /// Newest first.
    Desc,
}

impl Sort {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// The endpoint family a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Trade prints.
    Trades,
    /// NBBO quotes.
    Quotes,
    /// Aggregated OHLCV bars.
    Bars,
    /// News articles.
    News,
}

impl RecordKind {
    /// The JSON key the records are returned under.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Trades => "trades",
            Self::Quotes => "quotes",
            Self::Bars => "bars",
            Self::News => "news",
        }
    }

    /// The largest `limit` the endpoint accepts for one page.
    #[must_use]
    pub const fn max_page_limit(self) -> usize {
        match self {
            Self::News => MAX_NEWS_PAGE_LIMIT,
            Self::Trades | Self::Quotes | Self::Bars => MAX_STOCK_PAGE_LIMIT,
        }
    }
}

/// Describes one REST endpoint: which records it serves and whether the
/// symbols travel in the path (single) or in the `symbols` parameter (multi).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// Record family.
    pub kind: RecordKind,
    /// Whether the endpoint takes a `symbols` list.
    pub multi: bool,
}

impl Endpoint {
    /// `v2/stocks/{symbol}/{kind}`.
    #[must_use]
    pub const fn single(kind: RecordKind) -> Self {
        Self { kind, multi: false }
    }

    /// `v2/stocks/{kind}?symbols=...`.
    #[must_use]
    pub const fn multi(kind: RecordKind) -> Self {
        Self { kind, multi: true }
    }

    /// `v1beta1/news`.
    #[must_use]
    pub const fn news() -> Self {
        Self {
            kind: RecordKind::News,
            multi: true,
        }
    }

    /// Path segments relative to the data API base. The symbol, if any, is
    /// always exactly one segment.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if a single-symbol endpoint is given no symbol
    /// or an invalid one.
    pub fn segments<'a>(&self, symbol: Option<&'a str>) -> Result<Vec<&'a str>, AlpacaError> {
        if self.kind == RecordKind::News {
            return Ok(vec!["v1beta1", "news"]);
        }
        if self.multi {
            return Ok(vec!["v2", "stocks", self.kind.key()]);
        }
        let symbol =
            symbol.ok_or_else(|| AlpacaError::invalid("single-symbol endpoint needs a symbol"))?;
        validate_symbol(symbol)?;
        Ok(vec!["v2", "stocks", symbol, self.kind.key()])
    }

    /// Path relative to the data API base, e.g. `v2/stocks/AAPL/trades`.
    ///
    /// # Errors
    ///
    /// Same as [`Endpoint::segments`].
    pub fn path(&self, symbol: Option<&str>) -> Result<String, AlpacaError> {
        Ok(self.segments(symbol)?.join("/"))
    }

    /// Cap on the number of symbols per request, if the endpoint has one.
    #[must_use]
    pub const fn max_symbols(&self) -> Option<usize> {
        match (self.kind, self.multi) {
            (RecordKind::News, _) => None,
            (_, true) => Some(MAX_MULTI_SYMBOLS),
            (_, false) => Some(1),
        }
    }
}

/// Caller-side filter for a historical data request.
///
/// Every field is optional; unset fields are simply left off the request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryFilter {
    /// Symbols to query; duplicates are sent once.
    pub symbols: Vec<String>,
    /// Inclusive start of the window.
    pub start: Option<DateTime<Utc>>,
    /// Inclusive end of the window.
    pub end: Option<DateTime<Utc>>,
    /// Bars only.
    pub timeframe: Option<TimeFrame>,
    /// Bars only.
    pub adjustment: Option<Adjustment>,
    /// Data feed, e.g. `sip` or `iex`.
    pub feed: Option<String>,
    /// Price currency (ISO 4217), default USD server-side.
    pub currency: Option<String>,
    /// Point-in-time date for symbol mapping.
    pub as_of: Option<NaiveDate>,
    /// Timestamp ordering.
    pub sort: Option<Sort>,
    /// Maximum number of records returned across all pages; `0` means unbounded.
    pub total_limit: Option<usize>,
    /// Maximum records per request.
    pub page_limit: Option<usize>,
    /// News only: include the full article body.
    pub include_content: Option<bool>,
    /// News only: drop articles without content.
    pub exclude_contentless: Option<bool>,
}

impl QueryFilter {
    /// Symbols with duplicates removed, first occurrence kept.
    #[must_use]
    pub fn unique_symbols(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(self.symbols.len());
        for s in &self.symbols {
            if !out.contains(&s.as_str()) {
                out.push(s);
            }
        }
        out
    }

    /// Builds the ordered query parameters for `endpoint`.
    ///
    /// The order is fixed (`symbols, start, end, timeframe, adjustment, feed,
    /// currency, asof, sort, include_content, exclude_contentless`) so the same
    /// filter always renders identically.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for blank symbols, a symbol count the endpoint
    /// does not accept, `start` after `end`, a zero page limit, or a parameter
    /// that the endpoint does not understand.
    pub fn to_params(&self, endpoint: &Endpoint) -> Result<Vec<(&'static str, String)>, AlpacaError> {
        let kind = endpoint.kind;
        let symbols = self.unique_symbols();
        for s in &symbols {
            validate_symbol(s)?;
        }

        if !endpoint.multi && symbols.len() != 1 {
            return Err(AlpacaError::invalid(format!(
                "{} endpoint takes exactly one symbol, got {}",
                kind.key(),
                symbols.len()
            )));
        }
        if endpoint.multi && kind != RecordKind::News && symbols.is_empty() {
            return Err(AlpacaError::invalid("no symbols specified"));
        }
        if let Some(cap) = endpoint.max_symbols()
            && symbols.len() > cap
        {
            return Err(AlpacaError::invalid(format!(
                "{} symbols exceed the limit of {cap} per request",
                symbols.len()
            )));
        }
        if let (Some(start), Some(end)) = (self.start, self.end)
            && start > end
        {
            return Err(AlpacaError::invalid("start must not be after end"));
        }
        if self.page_limit == Some(0) {
            return Err(AlpacaError::invalid("page limit must be positive"));
        }

        let bars = kind == RecordKind::Bars;
        let stocks = kind != RecordKind::News;
        reject_unless(bars, self.timeframe.is_some(), "timeframe", kind)?;
        reject_unless(bars, self.adjustment.is_some(), "adjustment", kind)?;
        reject_unless(stocks, self.feed.is_some(), "feed", kind)?;
        reject_unless(stocks, self.currency.is_some(), "currency", kind)?;
        reject_unless(stocks, self.as_of.is_some(), "asof", kind)?;
        reject_unless(!stocks, self.include_content.is_some(), "include_content", kind)?;
        reject_unless(
            !stocks,
            self.exclude_contentless.is_some(),
            "exclude_contentless",
            kind,
        )?;

        let mut params = Vec::new();
        if endpoint.multi && !symbols.is_empty() {
            params.push(("symbols", symbols.join(",")));
        }
        if let Some(start) = self.start {
            params.push(("start", rfc3339(start)));
        }
        if let Some(end) = self.end {
            params.push(("end", rfc3339(end)));
        }
        if let Some(tf) = self.timeframe {
            params.push(("timeframe", tf.to_string()));
        }
        if let Some(adj) = self.adjustment {
            params.push(("adjustment", adj.as_str().to_string()));
        }
        if let Some(feed) = &self.feed {
            params.push(("feed", feed.clone()));
        }
        if let Some(currency) = &self.currency {
            params.push(("currency", currency.clone()));
        }
        if let Some(as_of) = self.as_of {
            params.push(("asof", as_of.format("%Y-%m-%d").to_string()));
        }
        if let Some(sort) = self.sort {
            params.push(("sort", sort.as_str().to_string()));
        }
        if let Some(yes) = self.include_content {
            params.push(("include_content", yes.to_string()));
        }
        if let Some(yes) = self.exclude_contentless {
            params.push(("exclude_contentless", yes.to_string()));
        }
        Ok(params)
    }

    /// Per-request page size cap for `kind`, clamped to what the endpoint accepts.
    #[must_use]
    pub fn page_cap(&self, kind: RecordKind) -> usize {
        let max = kind.max_page_limit();
        self.page_limit.map_or(max, |n| n.min(max))
    }
}

fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn reject_unless(
    allowed: bool,
    is_set: bool,
    name: &str,
    kind: RecordKind,
) -> Result<(), AlpacaError> {
    if is_set && !allowed {
        return Err(AlpacaError::invalid(format!(
            "`{name}` is not supported by the {} endpoint",
            kind.key()
        )));
    }
    Ok(())
}

pub(crate) fn validate_symbol(symbol: &str) -> Result<(), AlpacaError> {
    if symbol.trim().is_empty() {
        return Err(AlpacaError::invalid("symbol must not be empty"));
    }
    // `.` and `..` are path navigation, not tickers
    if symbol.chars().all(|c| c == '.') {
        return Err(AlpacaError::invalid(format!("invalid symbol `{symbol}`")));
    }
    if symbol
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, ',' | '/' | '?' | '#'))
    {
        return Err(AlpacaError::invalid(format!("invalid symbol `{symbol}`")));
    }
    Ok(())
}
