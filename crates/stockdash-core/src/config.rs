//! Process configuration, read once at startup.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `STOCKDASH_BUCKET` | `isbfinanceproject` |
//! | `AWS_DEFAULT_REGION` | `us-east-1` |
//! | `AWS_ACCESS_KEY_ID` | required |
//! | `AWS_SECRET_ACCESS_KEY` | required |
//! | `AWS_SESSION_TOKEN` | unset |
//! | `STOCKDASH_S3_ENDPOINT` | unset (virtual-hosted AWS) |
//! | `STOCKDASH_HTTP_TIMEOUT_MS` | `10000` |
//! | `STOCKDASH_CATALOG` | unset (bundled table) |
//! | `STOCKDASH_BIND` | `127.0.0.1:8080` |

use std::net::SocketAddr;
use std::path::PathBuf;

use secrecy::SecretString;

use crate::signing::AwsCredentials;
use crate::{Catalog, CatalogError, ConfigError};

pub const DEFAULT_BUCKET: &str = "isbfinanceproject";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Explicit configuration handed to component constructors.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub bucket: String,
    pub region: String,
    pub credentials: AwsCredentials,
    pub s3_endpoint: Option<String>,
    pub http_timeout_ms: u64,
    pub catalog_path: Option<PathBuf>,
    pub bind: SocketAddr,
}

impl DashboardConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads variables through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let require = |name: &'static str| get(name).ok_or(ConfigError::MissingVar { name });

        let http_timeout_ms = match get("STOCKDASH_HTTP_TIMEOUT_MS") {
            Some(value) => value
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or(ConfigError::InvalidVar {
                    name: "STOCKDASH_HTTP_TIMEOUT_MS",
                    value,
                })?,
            None => DEFAULT_HTTP_TIMEOUT_MS,
        };

        let bind_value = get("STOCKDASH_BIND").unwrap_or_else(|| String::from(DEFAULT_BIND));
        let bind = bind_value
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidVar {
                name: "STOCKDASH_BIND",
                value: bind_value.clone(),
            })?;

        Ok(Self {
            bucket: get("STOCKDASH_BUCKET").unwrap_or_else(|| String::from(DEFAULT_BUCKET)),
            region: get("AWS_DEFAULT_REGION").unwrap_or_else(|| String::from(DEFAULT_REGION)),
            credentials: AwsCredentials {
                access_key_id: require("AWS_ACCESS_KEY_ID")?,
                secret_access_key: SecretString::from(require("AWS_SECRET_ACCESS_KEY")?),
                session_token: get("AWS_SESSION_TOKEN").map(SecretString::from),
            },
            s3_endpoint: get("STOCKDASH_S3_ENDPOINT"),
            http_timeout_ms,
            catalog_path: get("STOCKDASH_CATALOG").map(PathBuf::from),
            bind,
        })
    }

    /// Loads the configured catalog file, or the bundled table.
    pub fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        match &self.catalog_path {
            Some(path) => Catalog::from_path(path),
            None => Catalog::bundled(),
        }
    }
}
