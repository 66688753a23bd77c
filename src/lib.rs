//! alpaca-data-rs: async client for the Alpaca market data REST API.
//!
//! Historical trades, quotes, bars and news, with transparent pagination,
//! concurrent multi-symbol retrieval and streaming delivery.
//!
//! ```no_run
//! # async fn run() -> Result<(), alpaca_data_rs::AlpacaError> {
//! use alpaca_data_rs::{AlpacaClient, MultiTradesBuilder};
//! use chrono::{TimeZone, Utc};
//!
//! let client = AlpacaClient::from_env()?;
//! let trades = MultiTradesBuilder::new(&client)
//!     .symbols(["AAPL", "MSFT"])
//!     .between(
//!         Utc.with_ymd_and_hms(2021, 8, 9, 13, 30, 0).unwrap(),
//!         Utc.with_ymd_and_hms(2021, 8, 9, 13, 30, 1).unwrap(),
//!     )
//!     .fetch()
//!     .await?;
//! for (symbol, rows) in &trades {
//!     println!("{symbol}: {} trades", rows.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod download;
pub mod history;
pub mod news;
pub mod stream;

pub use crate::core::client::{Backoff, Credentials, RetryConfig};
pub use crate::core::{
    Adjustment, AlpacaClient, AlpacaClientBuilder, AlpacaError, Bar, News, NewsImage, Quote,
    QueryFilter, Record, Sort, TimeFrame, TimeFrameUnit, Trade,
};
pub use download::{DownloadBuilder, FanOut, MultiBarsBuilder, MultiQuotesBuilder, MultiTradesBuilder};
pub use history::{BarsBuilder, HistoryBuilder, QuotesBuilder, TradesBuilder};
pub use news::NewsBuilder;
pub use stream::{FetchResult, FetchStream};

/// Installs a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Convenience for binaries and tests; does nothing if a global subscriber is already set.
#[cfg(feature = "tracing-subscriber")]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
