use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::params::RecordKind;

/* ----- STOCK RECORDS (shared by history/, download/ and stream/) ----- */

/// A single trade print.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Time of the trade.
    #[serde(rename = "t")]
    pub timestamp: DateTime<Utc>,
    /// Exchange code where the trade occurred.
    #[serde(rename = "x")]
    pub exchange: String,
    /// Trade price.
    #[serde(rename = "p")]
    pub price: f64,
    /// Trade size in shares.
    #[serde(rename = "s")]
    pub size: u32,
    /// Trade id, unique per exchange.
    #[serde(rename = "i")]
    pub id: i64,
    #[serde(rename = "c", default)]
    pub conditions: Vec<String>,
    #[serde(rename = "z", default)]
    pub tape: String,
    /// Correction/cancellation marker, if any.
    #[serde(rename = "u", default, skip_serializing_if = "Option::is_none")]
    pub update: Option<String>,
}

/// A single NBBO quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(rename = "t")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "bx")]
    pub bid_exchange: String,
    #[serde(rename = "bp")]
    pub bid_price: f64,
    #[serde(rename = "bs")]
    pub bid_size: u32,
    #[serde(rename = "ax")]
    pub ask_exchange: String,
    #[serde(rename = "ap")]
    pub ask_price: f64,
    #[serde(rename = "as")]
    pub ask_size: u32,
    #[serde(rename = "c", default)]
    pub conditions: Vec<String>,
    #[serde(rename = "z", default)]
    pub tape: String,
}

/// An OHLCV bar for one time-frame bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Start of the bucket.
    #[serde(rename = "t")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "o")]
    pub open: f64,
    #[serde(rename = "h")]
    pub high: f64,
    #[serde(rename = "l")]
    pub low: f64,
    #[serde(rename = "c")]
    pub close: f64,
    #[serde(rename = "v")]
    pub volume: u64,
    /// Number of trades in the bucket.
    #[serde(rename = "n", default)]
    pub trade_count: u64,
    /// Volume-weighted average price.
    #[serde(rename = "vw", default)]
    pub vwap: f64,
}

/* ----- NEWS ----- */

/// An image attached to a news article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsImage {
    /// Size label, e.g. `large`, `small` or `thumb`.
    pub size: String,
    pub url: String,
}

/// A news article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct News {
    pub id: i64,
    pub headline: String,
    #[serde(default)]
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub summary: String,
    /// Full article body; only populated when content was requested.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub images: Vec<NewsImage>,
    /// Symbols the article is tagged with.
    #[serde(default)]
    pub symbols: Vec<String>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub url: Option<String>,
}

/* ----- RECORD BINDING ----- */

/// A stock record type that can be retrieved page by page.
///
/// Ties each record to the endpoint family it is served from, so a single
/// builder and pagination engine can serve trades, quotes and bars.
pub trait Record: DeserializeOwned + Send + Sync + 'static {
    /// The endpoint family serving this record.
    const KIND: RecordKind;
}

impl Record for Trade {
    const KIND: RecordKind = RecordKind::Trades;
}

impl Record for Quote {
    const KIND: RecordKind = RecordKind::Quotes;
}

impl Record for Bar {
    const KIND: RecordKind = RecordKind::Bars;
}
