use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, warn};

use crate::data_source::{MetricsLookup, NewsLookup, SeriesRepository};
use crate::http_client::{HttpClient, HttpRequest};
use crate::{
    Bar, BarSeries, FetchError, Metrics, NewsFeed, NewsItem, NoArticlesReason, Symbol,
    TradingDate, UtcDateTime,
};

const REFERER: &str = "https://finance.yahoo.com/";
const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URLS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];
const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const SEARCH_URL: &str = "https://query2.finance.yahoo.com/v1/finance/search";
const QUOTE_SUMMARY_MODULES: &str = "summaryDetail,defaultKeyStatistics,assetProfile,price";

const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const SESSION_TTL: Duration = Duration::from_secs(3600);

const NO_TITLE: &str = "No title available";
const NO_PUBLISHER: &str = "Unknown source";
const NO_LINK: &str = "No link available";

// ============================================================================
// Yahoo Session - cookie/crumb plumbing
// ============================================================================

/// Session crumb for Yahoo's query endpoints.
///
/// Yahoo hands out a session cookie from `fc.yahoo.com` (kept by the
/// transport's cookie jar) and a crumb token bound to it. The crumb is
/// reused until the TTL lapses or a 401 invalidates it.
///
/// The lock is held across negotiation, so concurrent callers wait for a
/// single cookie/crumb handshake instead of racing their own.
#[derive(Debug)]
pub struct YahooSession {
    crumb: AsyncMutex<Option<CachedCrumb>>,
    ttl: Duration,
}

#[derive(Debug, Clone)]
struct CachedCrumb {
    value: String,
    obtained_at: Instant,
}

impl CachedCrumb {
    fn fresh(&self, ttl: Duration) -> Option<String> {
        (self.obtained_at.elapsed() < ttl).then(|| self.value.clone())
    }
}

impl Default for YahooSession {
    fn default() -> Self {
        Self::with_ttl(SESSION_TTL)
    }
}

impl YahooSession {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            crumb: AsyncMutex::new(None),
            ttl,
        }
    }

    /// The crumb currently held, if it has not expired.
    pub async fn cached(&self) -> Option<String> {
        self.crumb
            .lock()
            .await
            .as_ref()
            .and_then(|cached| cached.fresh(self.ttl))
    }

    /// Drops the cached crumb so the next call negotiates a fresh one.
    pub async fn invalidate(&self) {
        *self.crumb.lock().await = None;
    }

    /// Returns the cached crumb or negotiates a new one.
    ///
    /// `None` means no crumb could be obtained; callers still issue the
    /// request and let the endpoint decide.
    pub async fn crumb(&self, http_client: &dyn HttpClient, timeout_ms: u64) -> Option<String> {
        let mut guard = self.crumb.lock().await;
        if let Some(crumb) = guard.as_ref().and_then(|cached| cached.fresh(self.ttl)) {
            return Some(crumb);
        }

        let value = negotiate(http_client, timeout_ms).await?;
        *guard = Some(CachedCrumb {
            value: value.clone(),
            obtained_at: Instant::now(),
        });
        Some(value)
    }
}

async fn negotiate(http_client: &dyn HttpClient, timeout_ms: u64) -> Option<String> {
    // Any status is fine here, only the Set-Cookie matters.
    let cookie_request = HttpRequest::get(COOKIE_URL)
        .with_header("referer", REFERER)
        .with_timeout_ms(timeout_ms);
    if let Err(error) = http_client.execute(cookie_request).await {
        warn!(error = %error, "yahoo session cookie request failed");
        return None;
    }

    for endpoint in CRUMB_URLS {
        let request = HttpRequest::get(endpoint)
            .with_header("referer", REFERER)
            .with_timeout_ms(timeout_ms);

        match http_client.execute(request).await {
            Ok(response) if response.is_success() => {
                let body = response.text();
                let body = body.trim();
                if is_plausible_crumb(body) {
                    debug!(endpoint, "obtained yahoo crumb");
                    return Some(body.to_owned());
                }
            }
            Ok(response) => {
                debug!(endpoint, status = response.status, "yahoo crumb endpoint refused");
            }
            Err(error) => {
                debug!(endpoint, error = %error, "yahoo crumb endpoint unreachable");
            }
        }
    }

    warn!("failed to obtain a yahoo crumb from any endpoint");
    None
}

fn is_plausible_crumb(body: &str) -> bool {
    !body.is_empty()
        && body.len() < 100
        && !body.contains(char::is_whitespace)
        && !body.contains('<')
        && !body.to_ascii_lowercase().contains("too many requests")
}

// ============================================================================
// Yahoo Adapter
// ============================================================================

/// Yahoo Finance provider backing the series, metrics and news lookups.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    session: Arc<YahooSession>,
    timeout_ms: u64,
}

impl YahooAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            session: Arc::new(YahooSession::default()),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_session(mut self, session: Arc<YahooSession>) -> Self {
        self.session = session;
        self
    }

    /// Issues a GET with the session crumb attached and decodes the JSON body.
    ///
    /// A 401 invalidates the session and fails the call; it is not retried.
    async fn get_json<T>(&self, url: String) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
    {
        let crumb = self
            .session
            .crumb(self.http_client.as_ref(), self.timeout_ms)
            .await;
        let full_url = match crumb {
            Some(crumb) => format!("{url}&crumb={}", urlencoding::encode(&crumb)),
            None => url.clone(),
        };

        debug!(url = %url, "yahoo request");
        let request = HttpRequest::get(full_url)
            .with_header("referer", REFERER)
            .with_timeout_ms(self.timeout_ms);

        let response = self.http_client.execute(request).await.map_err(|error| {
            FetchError::provider(format!("yahoo transport error: {error}"))
        })?;

        if response.status == 401 {
            self.session.invalidate().await;
            return Err(FetchError::provider(
                "yahoo rejected the session (status 401)",
            ));
        }

        if !response.is_success() {
            let detail = serde_json::from_slice::<YahooErrorEnvelope>(&response.body)
                .ok()
                .and_then(YahooErrorEnvelope::into_description);
            return Err(FetchError::provider(match detail {
                Some(detail) => format!("yahoo returned status {}: {detail}", response.status),
                None => format!("yahoo returned status {}", response.status),
            }));
        }

        serde_json::from_slice(&response.body)
            .map_err(|e| FetchError::provider(format!("failed to parse yahoo response: {e}")))
    }
}

impl SeriesRepository for YahooAdapter {
    fn fetch_series<'a>(
        &'a self,
        symbol: &'a Symbol,
        start: TradingDate,
        end: TradingDate,
    ) -> Pin<Box<dyn Future<Output = Result<BarSeries, FetchError>> + Send + 'a>> {
        Box::pin(async move {
            if start > end {
                debug!(%symbol, %start, %end, "inverted range, returning empty series");
                return Ok(BarSeries::empty(symbol.clone()));
            }

            // period2 is exclusive on Yahoo's side.
            let url = format!(
                "{CHART_URL}/{}?period1={}&period2={}&interval=1d&events=history",
                urlencoding::encode(symbol.as_str()),
                start.unix_midnight(),
                end.saturating_add_days(1).unix_midnight(),
            );
            let response: YahooChartResponse = self.get_json(url).await?;
            let series = parse_chart(symbol, response, start, end)?;

            if series.is_empty() {
                debug!(%symbol, %start, %end, "yahoo returned no bars in range");
            }
            Ok(series)
        })
    }
}

impl MetricsLookup for YahooAdapter {
    fn fetch_metrics<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Metrics, FetchError>> + Send + 'a>> {
        Box::pin(async move {
            let as_of = UtcDateTime::now();
            let url = format!(
                "{QUOTE_SUMMARY_URL}/{}?modules={QUOTE_SUMMARY_MODULES}",
                urlencoding::encode(symbol.as_str()),
            );
            let response: YahooQuoteSummaryResponse = self.get_json(url).await?;
            parse_quote_summary(symbol, response, as_of)
        })
    }
}

impl NewsLookup for YahooAdapter {
    fn fetch_news<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<NewsFeed, FetchError>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!(
                "{SEARCH_URL}?q={}&quotesCount=0&newsCount={}",
                urlencoding::encode(symbol.as_str()),
                NewsFeed::MAX_ITEMS,
            );
            let response: YahooSearchResponse = self.get_json(url).await?;
            let feed = parse_news(response);

            if let NewsFeed::NoArticles { reason } = &feed {
                debug!(%symbol, ?reason, "no news articles");
            }
            Ok(feed)
        })
    }
}

// ============================================================================
// Response normalization
// ============================================================================

fn parse_chart(
    symbol: &Symbol,
    response: YahooChartResponse,
    start: TradingDate,
    end: TradingDate,
) -> Result<BarSeries, FetchError> {
    if let Some(error) = response.chart.error {
        return Err(FetchError::provider(format!(
            "yahoo chart error: {}",
            error.describe()
        )));
    }

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| FetchError::provider("yahoo chart response carried no result"))?;

    // A valid symbol without sessions in range has no timestamp array.
    let Some(timestamps) = result.timestamp else {
        return Ok(BarSeries::empty(symbol.clone()));
    };

    let gmt_offset = result.meta.and_then(|meta| meta.gmtoffset).unwrap_or(0);
    let quote = result
        .indicators
        .and_then(|indicators| indicators.quote.into_iter().next())
        .unwrap_or_default();

    let mut rows = Vec::with_capacity(timestamps.len());
    for (index, ts) in timestamps.into_iter().enumerate() {
        let date = match TradingDate::from_unix_timestamp(ts, gmt_offset) {
            Ok(date) => date,
            Err(error) => {
                warn!(%symbol, ts, error = %error, "skipping row with unusable timestamp");
                continue;
            }
        };
        if date < start || date > end {
            continue;
        }

        let open = price_at(&quote.open, index);
        let high = price_at(&quote.high, index);
        let low = price_at(&quote.low, index);
        let close = price_at(&quote.close, index);
        let volume = quote
            .volume
            .get(index)
            .copied()
            .flatten()
            .and_then(|value| u64::try_from(value).ok());

        let bar = Bar::new(date, open, high, low, close, volume).unwrap_or_else(|error| {
            warn!(%symbol, %date, error = %error, "dropping inconsistent open/high/low, keeping close");
            Bar::close_only(date, close, volume)
        });
        rows.push(bar);
    }

    Ok(BarSeries::from_provider_rows(symbol.clone(), rows))
}

fn price_at(values: &[Option<f64>], index: usize) -> Option<f64> {
    values
        .get(index)
        .copied()
        .flatten()
        .filter(|value| value.is_finite())
}

fn parse_quote_summary(
    symbol: &Symbol,
    response: YahooQuoteSummaryResponse,
    as_of: UtcDateTime,
) -> Result<Metrics, FetchError> {
    if let Some(error) = response.quote_summary.error {
        return Err(FetchError::provider(format!(
            "yahoo quote summary error: {}",
            error.describe()
        )));
    }

    let result = response
        .quote_summary
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| FetchError::provider("yahoo quote summary carried no result"))?;

    let detail = result.summary_detail.unwrap_or_default();
    let stats = result.default_key_statistics.unwrap_or_default();
    let price = result.price.unwrap_or_default();
    let profile = result.asset_profile.unwrap_or_default();

    Ok(Metrics {
        symbol: symbol.clone(),
        as_of,
        trailing_pe: raw(&detail.trailing_pe),
        beta: raw(&detail.beta).or_else(|| raw(&stats.beta)),
        market_cap: raw(&detail.market_cap).or_else(|| raw(&price.market_cap)),
        forward_pe: raw(&detail.forward_pe).or_else(|| raw(&stats.forward_pe)),
        trailing_eps: raw(&stats.trailing_eps),
        previous_close: raw(&detail.previous_close)
            .or_else(|| raw(&price.regular_market_previous_close)),
        sector: non_blank(profile.sector),
        industry: non_blank(profile.industry),
    })
}

fn raw(value: &Option<YahooRawValue>) -> Option<f64> {
    value
        .as_ref()
        .and_then(|value| value.raw)
        .filter(|value| value.is_finite())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn parse_news(response: YahooSearchResponse) -> NewsFeed {
    let Some(news) = response.news else {
        return NewsFeed::NoArticles {
            reason: NoArticlesReason::Unsupported,
        };
    };

    let items = news
        .into_iter()
        .map(|item| NewsItem {
            title: non_blank(item.title).unwrap_or_else(|| String::from(NO_TITLE)),
            publisher: non_blank(item.publisher).unwrap_or_else(|| String::from(NO_PUBLISHER)),
            link: non_blank(item.link).unwrap_or_else(|| String::from(NO_LINK)),
        })
        .collect();

    NewsFeed::from_items(items)
}

// ============================================================================
// Yahoo Finance API response structures
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
struct YahooApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl YahooApiError {
    fn describe(&self) -> String {
        match (&self.code, &self.description) {
            (Some(code), Some(description)) => format!("{code}: {description}"),
            (None, Some(description)) => description.clone(),
            (Some(code), None) => code.clone(),
            (None, None) => String::from("unspecified error"),
        }
    }
}

/// Error bodies share the `{ "<section>": { "error": {...} } }` shape.
#[derive(Debug, Clone, Deserialize)]
struct YahooErrorEnvelope {
    #[serde(default)]
    chart: Option<YahooErrorSection>,
    #[serde(rename = "quoteSummary", default)]
    quote_summary: Option<YahooErrorSection>,
    #[serde(default)]
    finance: Option<YahooErrorSection>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooErrorSection {
    #[serde(default)]
    error: Option<YahooApiError>,
}

impl YahooErrorEnvelope {
    fn into_description(self) -> Option<String> {
        [self.chart, self.quote_summary, self.finance]
            .into_iter()
            .flatten()
            .find_map(|section| section.error)
            .map(|error| error.describe())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    meta: Option<YahooChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: Option<YahooChartIndicators>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartMeta {
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: YahooQuoteSummaryData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteSummaryData {
    #[serde(default)]
    result: Option<Vec<YahooQuoteSummaryResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteSummaryResult {
    #[serde(rename = "summaryDetail", default)]
    summary_detail: Option<YahooSummaryDetail>,
    #[serde(rename = "defaultKeyStatistics", default)]
    default_key_statistics: Option<YahooKeyStatistics>,
    #[serde(default)]
    price: Option<YahooPrice>,
    #[serde(rename = "assetProfile", default)]
    asset_profile: Option<YahooAssetProfile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooSummaryDetail {
    #[serde(rename = "trailingPE", default)]
    trailing_pe: Option<YahooRawValue>,
    #[serde(rename = "forwardPE", default)]
    forward_pe: Option<YahooRawValue>,
    #[serde(default)]
    beta: Option<YahooRawValue>,
    #[serde(rename = "marketCap", default)]
    market_cap: Option<YahooRawValue>,
    #[serde(rename = "previousClose", default)]
    previous_close: Option<YahooRawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooKeyStatistics {
    #[serde(rename = "forwardPE", default)]
    forward_pe: Option<YahooRawValue>,
    #[serde(default)]
    beta: Option<YahooRawValue>,
    #[serde(rename = "trailingEps", default)]
    trailing_eps: Option<YahooRawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooPrice {
    #[serde(rename = "marketCap", default)]
    market_cap: Option<YahooRawValue>,
    #[serde(rename = "regularMarketPreviousClose", default)]
    regular_market_previous_close: Option<YahooRawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooAssetProfile {
    #[serde(default)]
    sector: Option<String>,
    #[serde(default)]
    industry: Option<String>,
}

/// Yahoo wraps numbers as `{ "raw": 1.2, "fmt": "1.20" }`; absent values are `{}`.
#[derive(Debug, Clone, Deserialize)]
struct YahooRawValue {
    #[serde(default)]
    raw: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooSearchResponse {
    #[serde(default)]
    news: Option<Vec<YahooNewsItem>>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooNewsItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    publisher: Option<String>,
    #[serde(default)]
    link: Option<String>,
}
