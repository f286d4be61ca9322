use base64::prelude::{Engine, BASE64_STANDARD};
use serde::{Deserialize, Serialize, Serializer};

use crate::{Symbol, TradingDate, UtcDateTime, ValidationError};

/// One trading day of OHLCV data.
///
/// Prices the provider did not report stay `None` so the session is not
/// dropped from the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: TradingDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

impl Bar {
    pub fn new(
        date: TradingDate,
        open: Option<f64>,
        high: Option<f64>,
        low: Option<f64>,
        close: Option<f64>,
        volume: Option<u64>,
    ) -> Result<Self, ValidationError> {
        validate_optional_non_negative("open", open)?;
        validate_optional_non_negative("high", high)?;
        validate_optional_non_negative("low", low)?;
        validate_optional_non_negative("close", close)?;

        if let (Some(high), Some(low)) = (high, low) {
            if high < low {
                return Err(ValidationError::InvalidBarRange);
            }
            let outside = |value: Option<f64>| value.is_some_and(|v| v < low || v > high);
            if outside(open) || outside(close) {
                return Err(ValidationError::InvalidBarBounds);
            }
        }

        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    /// A session whose open/high/low disagree but whose close still counts.
    ///
    /// The close is kept only when it is finite and non-negative.
    pub fn close_only(date: TradingDate, close: Option<f64>, volume: Option<u64>) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close: close.filter(|value| value.is_finite() && *value >= 0.0),
            volume,
        }
    }

    /// A session the provider listed without usable prices.
    pub const fn missing(date: TradingDate, volume: Option<u64>) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close: None,
            volume,
        }
    }
}

/// Daily bars for one symbol, ascending by date with unique dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    pub symbol: Symbol,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Sorts provider rows by date and keeps the last row seen for each date.
    pub fn from_provider_rows(symbol: Symbol, mut rows: Vec<Bar>) -> Self {
        // Stable sort keeps provider order among equal dates.
        rows.sort_by_key(|bar| bar.date);

        let mut bars: Vec<Bar> = Vec::with_capacity(rows.len());
        for bar in rows {
            match bars.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => bars.push(bar),
            }
        }

        Self { symbol, bars }
    }

    pub fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            bars: Vec::new(),
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<Option<f64>> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }
}

/// Descriptive scalars for one symbol. Every field may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub symbol: Symbol,
    /// Moment of the lookup, never provider supplied.
    pub as_of: UtcDateTime,
    pub trailing_pe: Option<f64>,
    pub beta: Option<f64>,
    pub market_cap: Option<f64>,
    pub forward_pe: Option<f64>,
    pub trailing_eps: Option<f64>,
    pub previous_close: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
}

impl Metrics {
    pub fn empty(symbol: Symbol, as_of: UtcDateTime) -> Self {
        Self {
            symbol,
            as_of,
            trailing_pe: None,
            beta: None,
            market_cap: None,
            forward_pe: None,
            trailing_eps: None,
            previous_close: None,
            sector: None,
            industry: None,
        }
    }
}

/// A headline as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub publisher: String,
    pub link: String,
}

/// Why a news lookup produced no articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoArticlesReason {
    /// The provider answered with an empty list.
    Empty,
    /// The provider response carries no news section at all.
    Unsupported,
}

/// Result of a successful news lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NewsFeed {
    Articles { items: Vec<NewsItem> },
    NoArticles { reason: NoArticlesReason },
}

impl NewsFeed {
    pub const MAX_ITEMS: usize = 5;

    /// Keeps provider order and the first [`Self::MAX_ITEMS`] entries.
    pub fn from_items(mut items: Vec<NewsItem>) -> Self {
        if items.is_empty() {
            return Self::NoArticles {
                reason: NoArticlesReason::Empty,
            };
        }
        items.truncate(Self::MAX_ITEMS);
        Self::Articles { items }
    }
}

/// Binary artifact fetched from the object store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageAsset {
    pub key: String,
    pub content_type: String,
    #[serde(rename = "data_base64", serialize_with = "serialize_base64")]
    pub bytes: Vec<u8>,
}

impl ImageAsset {
    pub fn new(key: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            BASE64_STANDARD.encode(&self.bytes)
        )
    }
}

fn serialize_base64<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&BASE64_STANDARD.encode(bytes))
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

fn validate_optional_non_negative(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        validate_non_negative(field, value)?;
    }
    Ok(())
}
