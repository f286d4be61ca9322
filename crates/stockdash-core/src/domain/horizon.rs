use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{TradingDate, ValidationError};

/// Prediction horizon toggle of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    ShortTerm,
    LongTerm,
}

impl Horizon {
    pub const ALL: [Self; 2] = [Self::ShortTerm, Self::LongTerm];

    /// Lookback of the short-term view, in calendar days.
    pub const SHORT_TERM_LOOKBACK_DAYS: i64 = 30;

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ShortTerm => "short",
            Self::LongTerm => "long",
        }
    }

    /// File stem of the forecast artifact rendered for this horizon.
    pub const fn forecast_label(self) -> &'static str {
        match self {
            Self::ShortTerm => "7_day_forecast",
            Self::LongTerm => "30_day_forecast",
        }
    }

    /// First date of the series window implied by this horizon.
    pub fn lookback_start(self, today: TradingDate) -> TradingDate {
        match self {
            Self::ShortTerm => today.saturating_sub_days(Self::SHORT_TERM_LOOKBACK_DAYS),
            Self::LongTerm => long_term_origin(),
        }
    }
}

fn long_term_origin() -> TradingDate {
    TradingDate::new(time::macros::date!(2020 - 01 - 01))
}

impl Display for Horizon {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Horizon {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "short" | "short-term" | "short_term" => Ok(Self::ShortTerm),
            "long" | "long-term" | "long_term" => Ok(Self::LongTerm),
            other => Err(ValidationError::InvalidHorizon {
                value: other.to_owned(),
            }),
        }
    }
}
