//! One render cycle of the dashboard.
//!
//! [`Dashboard::render`] resolves the inputs, issues the five external calls
//! concurrently, computes the rolling mean once the series is in, and folds
//! every outcome into a panel of the returned [`ViewModel`]. A failing lookup
//! only affects its own panel.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info_span, Instrument};

use crate::adapters::{S3AssetStore, YahooAdapter};
use crate::config::DashboardConfig;
use crate::data_source::{AssetLookup, MetricsLookup, NewsLookup, SeriesRepository};
use crate::http_client::HttpClient;
use crate::rolling::{DerivedSeries, RollingWindow};
use crate::signing::SigV4Signer;
use crate::{
    AssetKey, Bar, BarSeries, Catalog, ConfigError, Horizon, ImageAsset, Industry, LookupError,
    Metrics, NewsFeed, NewsItem, NoArticlesReason, Symbol, TradingDate, ValidationError,
};

/// Number of trailing bars shown under the chart.
pub const RECENT_BARS: usize = 5;

const NOT_AVAILABLE: &str = "N/A";
const NO_SERIES_DATA: &str = "No data available for the selected date range.";
const FORECAST_NOT_FOUND: &str = "Forecast image not found.";
const COMPARISON_NOT_FOUND: &str = "Nifty comparison image not found.";
const SELECT_INDUSTRY: &str = "Select an industry to view forecast images.";
const SELECT_HORIZON: &str = "Select a prediction horizon to view the forecast image.";
const NO_NEWS: &str = "No news articles found for this stock.";
const NEWS_UNSUPPORTED: &str = "Failed to retrieve news. The provider does not support this feature.";

/// Date selection of a render: explicit dates or a horizon toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Range { start: TradingDate, end: TradingDate },
    Horizon(Horizon),
}

impl Default for Period {
    fn default() -> Self {
        Self::Horizon(Horizon::LongTerm)
    }
}

/// Inputs of one render cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardInputs {
    pub symbol: Symbol,
    pub industry: Option<String>,
    pub period: Period,
    pub window: RollingWindow,
}

impl DashboardInputs {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            industry: None,
            period: Period::default(),
            window: RollingWindow::default(),
        }
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    pub fn with_period(mut self, period: Period) -> Self {
        self.period = period;
        self
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = RollingWindow::new(window);
        self
    }
}

/// Concrete dates a render covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedPeriod {
    pub start: TradingDate,
    pub end: TradingDate,
    pub horizon: Option<Horizon>,
}

impl Period {
    /// Resolves against `today`. Inverted explicit ranges are rejected.
    pub fn resolve(self, today: TradingDate) -> Result<ResolvedPeriod, ValidationError> {
        match self {
            Self::Range { start, end } if start > end => Err(ValidationError::InvertedDateRange {
                start: start.to_string(),
                end: end.to_string(),
            }),
            Self::Range { start, end } => Ok(ResolvedPeriod {
                start,
                end,
                horizon: None,
            }),
            Self::Horizon(horizon) => Ok(ResolvedPeriod {
                start: horizon.lookback_start(today),
                end: today,
                horizon: Some(horizon),
            }),
        }
    }

    fn requested_bounds(self, today: TradingDate) -> (TradingDate, TradingDate, Option<Horizon>) {
        match self {
            Self::Range { start, end } => (start, end, None),
            Self::Horizon(horizon) => (horizon.lookback_start(today), today, Some(horizon)),
        }
    }
}

/// Outcome of one panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Panel<T> {
    Ready { data: T },
    /// Informational, not an error.
    Notice { message: String },
    Failed { message: String },
}

impl<T> Panel<T> {
    pub fn notice(message: impl Into<String>) -> Self {
        Self::Notice {
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Ready { data } => Some(data),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Ready { .. } => None,
            Self::Notice { message } | Self::Failed { message } => Some(message),
        }
    }
}

/// One chart row: the bar plus its rolling mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: TradingDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
    pub rolling_mean: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub window: RollingWindow,
    pub points: Vec<ChartPoint>,
    /// Last [`RECENT_BARS`] points.
    pub recent: Vec<ChartPoint>,
    pub caption: String,
}

impl ChartView {
    pub fn build(series: &BarSeries, window: RollingWindow) -> Self {
        let derived = DerivedSeries::from_series(series, window);
        let points: Vec<ChartPoint> = series
            .bars()
            .iter()
            .zip(derived.points())
            .map(|(bar, derived)| chart_point(bar, derived.value))
            .collect();
        let recent = points[points.len().saturating_sub(RECENT_BARS)..].to_vec();

        Self {
            window,
            points,
            recent,
            caption: format!(
                "The {}-day moving average can help identify trends. Use it with caution as it's a basic predictive measure.",
                window.get()
            ),
        }
    }
}

fn chart_point(bar: &Bar, rolling_mean: Option<f64>) -> ChartPoint {
    ChartPoint {
        date: bar.date,
        open: bar.open,
        high: bar.high,
        low: bar.low,
        close: bar.close,
        volume: bar.volume,
        rolling_mean,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsView {
    /// Headline price (previous close).
    pub price: String,
    pub rows: Vec<MetricRow>,
    pub as_of: TradingDate,
}

impl MetricsView {
    pub fn build(metrics: &Metrics) -> Self {
        let as_of = metrics.as_of.date();
        let row = |label, value: Option<String>| MetricRow {
            label,
            value: value.unwrap_or_else(|| String::from(NOT_AVAILABLE)),
        };

        Self {
            price: format_number(metrics.previous_close),
            rows: vec![
                row("P/E Ratio", metrics.trailing_pe.map(format_value)),
                row("Beta (5Y Monthly)", metrics.beta.map(format_value)),
                row("Market Cap", metrics.market_cap.map(format_value)),
                row("Forward P/E", metrics.forward_pe.map(format_value)),
                row("EPS (TTM)", metrics.trailing_eps.map(format_value)),
                row("Sector", metrics.sector.clone()),
                row("Industry", metrics.industry.clone()),
                row("Date", Some(as_of.to_string())),
            ],
            as_of,
        }
    }
}

fn format_number(value: Option<f64>) -> String {
    value
        .map(format_value)
        .unwrap_or_else(|| String::from(NOT_AVAILABLE))
}

/// Whole numbers (market caps) print without a fractional part.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// Everything the presentation host draws for one interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    /// Uppercased for display.
    pub symbol: String,
    pub industry: Option<String>,
    pub period: ResolvedPeriod,
    pub window: RollingWindow,
    pub chart: Panel<ChartView>,
    pub metrics: Panel<MetricsView>,
    pub forecast: Panel<ImageAsset>,
    pub comparison: Panel<ImageAsset>,
    pub news: Panel<Vec<NewsItem>>,
}

/// The dashboard pipeline wired to its lookups.
#[derive(Clone)]
pub struct Dashboard {
    series: Arc<dyn SeriesRepository>,
    metrics: Arc<dyn MetricsLookup>,
    news: Arc<dyn NewsLookup>,
    assets: Arc<dyn AssetLookup>,
    bucket: String,
    catalog: Arc<Catalog>,
}

impl Dashboard {
    pub fn new(
        series: Arc<dyn SeriesRepository>,
        metrics: Arc<dyn MetricsLookup>,
        news: Arc<dyn NewsLookup>,
        assets: Arc<dyn AssetLookup>,
        bucket: impl Into<String>,
        catalog: Catalog,
    ) -> Self {
        Self {
            series,
            metrics,
            news,
            assets,
            bucket: bucket.into(),
            catalog: Arc::new(catalog),
        }
    }

    /// Yahoo for market data, S3 for artifacts, both over `http_client`.
    pub fn from_config(
        config: &DashboardConfig,
        catalog: Catalog,
        http_client: Arc<dyn HttpClient>,
    ) -> Result<Self, ConfigError> {
        let yahoo = Arc::new(
            YahooAdapter::new(Arc::clone(&http_client)).with_timeout_ms(config.http_timeout_ms),
        );

        let signer = SigV4Signer::new(config.credentials.clone(), config.region.clone());
        let mut store =
            S3AssetStore::new(http_client, signer).with_timeout_ms(config.http_timeout_ms);
        if let Some(endpoint) = &config.s3_endpoint {
            store = store.with_endpoint(endpoint)?;
        }

        Ok(Self::new(
            yahoo.clone(),
            yahoo.clone(),
            yahoo,
            Arc::new(store),
            config.bucket.clone(),
            catalog,
        ))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub async fn render(&self, inputs: &DashboardInputs) -> ViewModel {
        self.render_at(inputs, TradingDate::today()).await
    }

    /// Renders with `today` anchoring horizon periods.
    pub async fn render_at(&self, inputs: &DashboardInputs, today: TradingDate) -> ViewModel {
        let span = info_span!("render", symbol = %inputs.symbol);
        self.render_inner(inputs, today).instrument(span).await
    }

    async fn render_inner(&self, inputs: &DashboardInputs, today: TradingDate) -> ViewModel {
        let window = inputs.window;
        let (start, end, horizon) = inputs.period.requested_bounds(today);
        let period = inputs.period.resolve(today);

        // Catalog spelling wins so object keys match what was rendered.
        let industry = inputs
            .industry
            .as_deref()
            .map(|name| self.resolve_industry(name, &inputs.symbol));
        let asset_symbol = match &industry {
            Some(Ok((_, symbol))) => symbol.clone(),
            _ => inputs.symbol.clone(),
        };

        let forecast_key = asset_target(&industry, |industry, symbol| {
            horizon
                .map(|horizon| AssetKey::forecast(industry, symbol, horizon))
                .ok_or(SELECT_HORIZON)
        });
        let comparison_key = asset_target(&industry, |industry, symbol| {
            Ok(AssetKey::benchmark_comparison(industry, symbol))
        });

        let (chart, metrics, news, forecast, comparison) = tokio::join!(
            self.chart_panel(&inputs.symbol, period, window),
            self.metrics_panel(&inputs.symbol),
            self.news_panel(&inputs.symbol),
            self.image_panel(forecast_key, FORECAST_NOT_FOUND),
            self.image_panel(comparison_key, COMPARISON_NOT_FOUND),
        );

        ViewModel {
            symbol: asset_symbol.display_name(),
            industry: match industry {
                Some(Ok((industry, _))) => Some(industry.as_str().to_owned()),
                _ => inputs.industry.clone(),
            },
            period: ResolvedPeriod {
                start,
                end,
                horizon,
            },
            window,
            chart,
            metrics,
            forecast,
            comparison,
            news,
        }
    }

    fn resolve_industry(
        &self,
        name: &str,
        symbol: &Symbol,
    ) -> Result<(Industry, Symbol), ValidationError> {
        let group = self
            .catalog
            .find(name)
            .ok_or_else(|| ValidationError::UnknownIndustry {
                value: name.to_owned(),
            })?;
        let member = self.catalog.member(&group.name, symbol).ok_or_else(|| {
            ValidationError::SymbolNotInIndustry {
                symbol: symbol.as_str().to_owned(),
                industry: group.name.as_str().to_owned(),
            }
        })?;
        Ok((group.name.clone(), member.clone()))
    }

    async fn chart_panel(
        &self,
        symbol: &Symbol,
        period: Result<ResolvedPeriod, ValidationError>,
        window: RollingWindow,
    ) -> Panel<ChartView> {
        let period = match period {
            Ok(period) => period,
            Err(error) => return Panel::failed(error.to_string()),
        };

        match self.series.fetch_series(symbol, period.start, period.end).await {
            Ok(series) if series.is_empty() => Panel::notice(NO_SERIES_DATA),
            Ok(series) => Panel::Ready {
                data: ChartView::build(&series, window),
            },
            Err(failure) => {
                error!(%symbol, error = %failure, "series panel failed");
                Panel::failed(format!("Unable to fetch stock data: {}", failure.message()))
            }
        }
    }

    async fn metrics_panel(&self, symbol: &Symbol) -> Panel<MetricsView> {
        match self.metrics.fetch_metrics(symbol).await {
            Ok(metrics) => Panel::Ready {
                data: MetricsView::build(&metrics),
            },
            Err(failure) => {
                error!(%symbol, error = %failure, "metrics panel failed");
                Panel::failed(format!(
                    "Error fetching metrics for {symbol}: {}",
                    failure.message()
                ))
            }
        }
    }

    async fn news_panel(&self, symbol: &Symbol) -> Panel<Vec<NewsItem>> {
        match self.news.fetch_news(symbol).await {
            Ok(NewsFeed::Articles { items }) => Panel::Ready { data: items },
            Ok(NewsFeed::NoArticles {
                reason: NoArticlesReason::Empty,
            }) => Panel::notice(NO_NEWS),
            Ok(NewsFeed::NoArticles {
                reason: NoArticlesReason::Unsupported,
            }) => Panel::notice(NEWS_UNSUPPORTED),
            Err(failure) => {
                error!(%symbol, error = %failure, "news panel failed");
                Panel::failed(format!("Error fetching news: {}", failure.message()))
            }
        }
    }

    async fn image_panel(
        &self,
        target: Result<AssetKey, AssetSkip>,
        not_found: &'static str,
    ) -> Panel<ImageAsset> {
        let key = match target {
            Ok(key) => key,
            Err(AssetSkip::Notice(message)) => return Panel::notice(message),
            Err(AssetSkip::Invalid(message)) => return Panel::failed(message),
        };

        match self.assets.fetch_asset(&self.bucket, &key).await {
            Ok(asset) => Panel::Ready { data: asset },
            Err(LookupError::NotFound { key }) => {
                debug!(%key, "artifact missing");
                Panel::notice(not_found)
            }
            Err(failure @ LookupError::AccessFailure(_)) => {
                error!(%key, error = %failure, "image panel failed");
                Panel::failed(format!("Error fetching image: {failure}"))
            }
        }
    }
}

/// Why an image panel issues no lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AssetSkip {
    Notice(&'static str),
    Invalid(String),
}

fn asset_target<F>(
    industry: &Option<Result<(Industry, Symbol), ValidationError>>,
    key: F,
) -> Result<AssetKey, AssetSkip>
where
    F: FnOnce(&Industry, &Symbol) -> Result<AssetKey, &'static str>,
{
    match industry {
        None => Err(AssetSkip::Notice(SELECT_INDUSTRY)),
        Some(Err(error)) => Err(AssetSkip::Invalid(error.to_string())),
        Some(Ok((industry, symbol))) => key(industry, symbol).map_err(AssetSkip::Notice),
    }
}
