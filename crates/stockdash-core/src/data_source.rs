//! Lookup traits consumed by the dashboard pipeline.
//!
//! Each external capability sits behind its own trait so tests and alternate
//! providers can be swapped in at construction.
//!
//! | Trait | Call | Success | Failure |
//! |-------|------|---------|---------|
//! | [`SeriesRepository`] | `fetch_series(symbol, start, end)` | [`BarSeries`] | [`FetchError`] |
//! | [`MetricsLookup`] | `fetch_metrics(symbol)` | [`Metrics`] | [`FetchError`] |
//! | [`NewsLookup`] | `fetch_news(symbol)` | [`NewsFeed`] | [`FetchError`] |
//! | [`AssetLookup`] | `fetch_asset(bucket, key)` | [`ImageAsset`] | [`LookupError`] |
//!
//! # Example
//!
//! ```rust,ignore
//! use stockdash_core::{SeriesRepository, Symbol, TradingDate, YahooAdapter};
//!
//! async fn closes(adapter: &YahooAdapter) -> Result<(), stockdash_core::FetchError> {
//!     let symbol = Symbol::parse("RELIANCE.NS").unwrap();
//!     let start = TradingDate::parse("2024-01-01").unwrap();
//!     let end = TradingDate::parse("2024-01-31").unwrap();
//!     let series = adapter.fetch_series(&symbol, start, end).await?;
//!     for bar in series.bars() {
//!         println!("{} {:?}", bar.date, bar.close);
//!     }
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::pin::Pin;

use crate::{
    AssetKey, BarSeries, FetchError, ImageAsset, LookupError, Metrics, NewsFeed, Symbol,
    TradingDate,
};

/// Daily bar history for a symbol.
///
/// Implementations return bars ascending by date with unique dates, limited
/// to the inclusive `[start, end]` range. `start > end` is an empty series,
/// not an error.
pub trait SeriesRepository: Send + Sync {
    fn fetch_series<'a>(
        &'a self,
        symbol: &'a Symbol,
        start: TradingDate,
        end: TradingDate,
    ) -> Pin<Box<dyn Future<Output = Result<BarSeries, FetchError>> + Send + 'a>>;
}

/// Descriptive scalars for a symbol. Missing fields never fail the call.
pub trait MetricsLookup: Send + Sync {
    fn fetch_metrics<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Metrics, FetchError>> + Send + 'a>>;
}

/// Recent headlines for a symbol, at most [`NewsFeed::MAX_ITEMS`].
pub trait NewsLookup: Send + Sync {
    fn fetch_news<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<NewsFeed, FetchError>> + Send + 'a>>;
}

/// Pre-rendered artifacts from an object store.
pub trait AssetLookup: Send + Sync {
    fn fetch_asset<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a AssetKey,
    ) -> Pin<Box<dyn Future<Output = Result<ImageAsset, LookupError>> + Send + 'a>>;
}
