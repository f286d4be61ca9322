//! Provider adapters.
//!
//! | Adapter | Implements |
//! |---------|------------|
//! | [`YahooAdapter`] | [`SeriesRepository`](crate::SeriesRepository), [`MetricsLookup`](crate::MetricsLookup), [`NewsLookup`](crate::NewsLookup) |
//! | [`S3AssetStore`] | [`AssetLookup`](crate::AssetLookup) |

mod s3;
mod yahoo;

pub use s3::S3AssetStore;
pub use yahoo::{YahooAdapter, YahooSession};
