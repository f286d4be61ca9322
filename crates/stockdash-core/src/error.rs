use thiserror::Error;

/// Validation and contract errors exposed by `stockdash-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("industry name cannot be empty")]
    EmptyIndustry,
    #[error("industry name must not contain '/': '{value}'")]
    IndustryInvalidChar { value: String },
    #[error("unknown industry '{value}'")]
    UnknownIndustry { value: String },
    #[error("symbol '{symbol}' is not listed under industry '{industry}'")]
    SymbolNotInIndustry { symbol: String, industry: String },

    #[error("invalid horizon '{value}', expected short or long")]
    InvalidHorizon { value: String },

    #[error("date must be formatted YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("start date {start} must not be after end date {end}")]
    InvertedDateRange { start: String, end: String },
    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("bar high must be >= low")]
    InvalidBarRange,
    #[error("bar open/close must be within high/low range")]
    InvalidBarBounds,
}

/// Failure of a market-data call (series, metrics or news).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("provider failure: {0}")]
    ProviderFailure(String),
}

impl FetchError {
    pub fn provider(message: impl Into<String>) -> Self {
        Self::ProviderFailure(message.into())
    }

    pub fn message(&self) -> &str {
        match self {
            Self::ProviderFailure(message) => message,
        }
    }
}

/// Failure of an object-store lookup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The key does not exist. Expected for symbols without rendered artifacts.
    #[error("object '{key}' not found")]
    NotFound { key: String },

    #[error("object store access failed: {0}")]
    AccessFailure(String),
}

impl LookupError {
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors raised while loading the industry catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("duplicate industry '{name}' in catalog")]
    DuplicateIndustry { name: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors raised while assembling [`DashboardConfig`](crate::config::DashboardConfig).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing environment variable {name}")]
    MissingVar { name: &'static str },

    #[error("environment variable {name} has invalid value '{value}'")]
    InvalidVar { name: &'static str, value: String },

    #[error("object store endpoint '{value}' must look like scheme://host[:port]")]
    InvalidEndpoint { value: String },
}
