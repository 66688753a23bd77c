//! Core components of the `alpaca-data-rs` client.
//!
//! This module contains the foundational building blocks of the library, including:
//! - The main [`AlpacaClient`] and its builder.
//! - The primary [`AlpacaError`] type.
//! - Shared record models like [`Trade`] and [`Bar`], and the [`TimeFrame`] value type.
//! - The request builder ([`QueryFilter`]) and the pagination engine.

/// The main client (`AlpacaClient`), builder, credentials and retry configuration.
pub mod client;
/// The primary error type (`AlpacaError`) for the crate.
pub mod error;
/// Record models shared by every retrieval surface.
pub mod models;
/// Cursor-following pagination over any [`PageSource`].
pub mod paginate;
/// Query parameters and endpoint descriptors.
pub mod params;
/// Service traits abstracting a single page fetch.
pub mod services;
/// Bar aggregation time frames.
pub mod timeframe;

pub(crate) mod net;
pub(crate) mod wire;

// convenient re-exports so most code can just `use crate::core::AlpacaClient`
pub use client::{AlpacaClient, AlpacaClientBuilder};
pub use error::AlpacaError;
pub use models::{Bar, News, NewsImage, Quote, Record, Trade};
pub use paginate::{Page, PageLimits, collect_all, paginate};
pub use params::{Adjustment, Endpoint, QueryFilter, RecordKind, Sort};
pub use services::PageSource;
pub use timeframe::{TimeFrame, TimeFrameUnit};
