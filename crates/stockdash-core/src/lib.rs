//! # Stockdash Core
//!
//! Retrieval and derived-metrics pipeline behind the stock dashboard.
//!
//! ## Overview
//!
//! - **Domain models** for daily bars, metrics, headlines and image artifacts
//! - **Lookup traits** for the market-data provider and the object store
//! - **Adapters** for Yahoo Finance and S3 (SigV4-signed)
//! - **Rolling average engine**, the only local computation
//! - **Dashboard** render cycle producing a serializable [`ViewModel`]
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo and S3 implementations of the lookup traits |
//! | [`catalog`] | Industry -> ticker table |
//! | [`config`] | Startup configuration |
//! | [`dashboard`] | Render cycle and view model |
//! | [`data_source`] | Lookup traits |
//! | [`domain`] | Domain models |
//! | [`error`] | Error types |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`rolling`] | Rolling mean |
//! | [`signing`] | AWS Signature Version 4 |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stockdash_core::{Catalog, Dashboard, DashboardConfig, DashboardInputs, ReqwestHttpClient, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DashboardConfig::from_env()?;
//!     let http = Arc::new(ReqwestHttpClient::new()?);
//!     let dashboard = Dashboard::from_config(&config, config.load_catalog()?, http)?;
//!
//!     let inputs = DashboardInputs::new(Symbol::parse("RELIANCE.NS")?).with_industry("Energy");
//!     let view = dashboard.render(&inputs).await;
//!     println!("{}", serde_json::to_string_pretty(&view)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ Presentation host│
//! └────────┬─────────┘
//!          │ render(inputs)
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │ Dashboard        │────▶│ Rolling average  │
//! └────────┬─────────┘     └──────────────────┘
//!          │ tokio::join!
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │ Lookup traits    │────▶│ HTTP client      │
//! │ (Yahoo, S3)      │     │ (reqwest)        │
//! └──────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Lookups fail with [`FetchError`] or [`LookupError`]; the dashboard turns
//! each failure into a panel-local message:
//!
//! ```rust
//! use stockdash_core::LookupError;
//!
//! fn describe(error: &LookupError) -> &'static str {
//!     match error {
//!         LookupError::NotFound { .. } => "notice",
//!         LookupError::AccessFailure(_) => "error banner",
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - Object-store secrets are held as `secrecy::SecretString` and never logged
//! - Logged URLs never carry credentials

pub mod adapters;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod rolling;
pub mod signing;

// Re-export commonly used types at crate root for convenience

// Adapter implementations
pub use adapters::{S3AssetStore, YahooAdapter, YahooSession};

// Catalog
pub use catalog::{Catalog, IndustryGroup};

// Configuration
pub use config::DashboardConfig;

// Dashboard
pub use dashboard::{
    ChartPoint, ChartView, Dashboard, DashboardInputs, MetricRow, MetricsView, Panel, Period,
    ResolvedPeriod, ViewModel,
};

// Lookup traits
pub use data_source::{AssetLookup, MetricsLookup, NewsLookup, SeriesRepository};

// Domain models
pub use domain::{
    AssetKey, Bar, BarSeries, Horizon, ImageAsset, Industry, Metrics, NewsFeed, NewsItem,
    NoArticlesReason, Symbol, TradingDate, UtcDateTime, EXCHANGE_UTC_OFFSET_SECS,
};

// Error types
pub use error::{CatalogError, ConfigError, FetchError, LookupError, ValidationError};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
};

// Rolling average
pub use rolling::{rolling_mean, DerivedPoint, DerivedSeries, RollingWindow};

// Signing
pub use signing::{AwsCredentials, SigV4Signer};
