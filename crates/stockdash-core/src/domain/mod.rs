//! # Domain Models
//!
//! Canonical domain types for the dashboard pipeline.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Bar`] | One trading day of OHLCV, prices individually optional |
//! | [`BarSeries`] | Date-ordered, date-unique bars for a symbol |
//! | [`Metrics`] | Descriptive scalars (P/E, beta, market cap, ...) |
//! | [`NewsFeed`] | Up to five headlines, or an explicit "no articles" outcome |
//! | [`ImageAsset`] | Object-store artifact with its content type |
//! | [`AssetKey`] | Deterministic object key for forecast/benchmark images |
//! | [`Symbol`] | Validated ticker, case preserved |
//! | [`Industry`] | Catalog grouping name |
//! | [`Horizon`] | Short/long prediction horizon toggle |
//! | [`TradingDate`] | Calendar date of a session |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! Construction validates invariants:
//!
//! ```rust
//! use stockdash_core::{Bar, TradingDate, ValidationError};
//!
//! let date = TradingDate::parse("2024-01-02").unwrap();
//! let invalid = Bar::new(date, Some(100.0), Some(95.0), Some(105.0), Some(102.0), Some(1000));
//! assert!(matches!(invalid, Err(ValidationError::InvalidBarRange)));
//! ```

mod asset_key;
mod horizon;
mod models;
mod symbol;
mod timestamp;

pub use asset_key::{AssetKey, Industry};
pub use horizon::Horizon;
pub use models::{
    Bar, BarSeries, ImageAsset, Metrics, NewsFeed, NewsItem, NoArticlesReason,
};
pub use symbol::Symbol;
pub use timestamp::{TradingDate, UtcDateTime, EXCHANGE_UTC_OFFSET_SECS};
