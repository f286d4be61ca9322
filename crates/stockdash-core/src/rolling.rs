//! Rolling (simple moving) average over daily closes.
//!
//! Position `i` holds the mean of the `window` closes ending at `i`, or
//! `None` while the window is not yet full or when any close in it is
//! missing.
//!
//! ```rust
//! use stockdash_core::rolling_mean;
//!
//! let closes = [Some(10.0), Some(20.0), Some(30.0), Some(40.0), Some(50.0)];
//! assert_eq!(
//!     rolling_mean(&closes, 3),
//!     vec![None, None, Some(20.0), Some(30.0), Some(40.0)]
//! );
//! ```

use serde::{Deserialize, Serialize};

use crate::{BarSeries, TradingDate};

/// Window size accepted from the input surface, clamped into
/// [`RollingWindow::MIN`]`..=`[`RollingWindow::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "usize", into = "usize")]
pub struct RollingWindow(usize);

impl RollingWindow {
    pub const MIN: usize = 5;
    pub const MAX: usize = 50;
    pub const DEFAULT: usize = 20;

    pub fn new(value: usize) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl From<usize> for RollingWindow {
    fn from(value: usize) -> Self {
        Self::new(value)
    }
}

impl From<RollingWindow> for usize {
    fn from(value: RollingWindow) -> Self {
        value.0
    }
}

/// Windowed arithmetic mean of `closes`, aligned to the input.
///
/// Total over its domain: `window == 0` or `window > closes.len()` yields
/// all `None`. Non-finite closes count as missing.
pub fn rolling_mean(closes: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let n = closes.len();
    let mut result = vec![None; n];

    if window == 0 || n < window {
        return result;
    }

    for end in (window - 1)..n {
        let slice = &closes[end + 1 - window..=end];
        let sum = slice.iter().try_fold(0.0_f64, |acc, close| {
            close.filter(|value| value.is_finite()).map(|value| acc + value)
        });
        result[end] = sum.map(|sum| sum / window as f64);
    }

    result
}

/// One rolling-mean value keyed by its session date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedPoint {
    pub date: TradingDate,
    pub value: Option<f64>,
}

/// Rolling mean aligned by date to the bars it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSeries {
    pub window: RollingWindow,
    points: Vec<DerivedPoint>,
}

impl DerivedSeries {
    pub fn from_series(series: &BarSeries, window: RollingWindow) -> Self {
        let values = rolling_mean(&series.closes(), window.get());
        let points = series
            .bars()
            .iter()
            .zip(values)
            .map(|(bar, value)| DerivedPoint {
                date: bar.date,
                value,
            })
            .collect();

        Self { window, points }
    }

    pub fn points(&self) -> &[DerivedPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `true` when at least one window was filled.
    pub fn has_values(&self) -> bool {
        self.points.iter().any(|point| point.value.is_some())
    }
}
