use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{Horizon, Symbol, ValidationError};

const RESULTS_PREFIX: &str = "Results";
const BENCHMARK_STEM: &str = "nifty_compare";

/// Industry grouping name as it appears in the catalog and in object keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Industry(String);

impl Industry {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyIndustry);
        }
        if trimmed.contains('/') {
            return Err(ValidationError::IndustryInvalidChar {
                value: trimmed.to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Industry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Industry {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Industry> for String {
    fn from(value: Industry) -> Self {
        value.0
    }
}

/// Object-store key of a pre-rendered artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct AssetKey(String);

impl AssetKey {
    /// `Results/{industry}/{symbol}/{7_day_forecast|30_day_forecast}.png`
    pub fn forecast(industry: &Industry, symbol: &Symbol, horizon: Horizon) -> Self {
        Self::artifact(industry, symbol, horizon.forecast_label())
    }

    /// `Results/{industry}/{symbol}/nifty_compare.png`
    pub fn benchmark_comparison(industry: &Industry, symbol: &Symbol) -> Self {
        Self::artifact(industry, symbol, BENCHMARK_STEM)
    }

    fn artifact(industry: &Industry, symbol: &Symbol, stem: &str) -> Self {
        Self(format!("{RESULTS_PREFIX}/{industry}/{symbol}/{stem}.png"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AssetKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<AssetKey> for String {
    fn from(value: AssetKey) -> Self {
        value.0
    }
}
