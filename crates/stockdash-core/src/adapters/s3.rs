use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use time::OffsetDateTime;
use tracing::debug;

use crate::data_source::AssetLookup;
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::signing::{encode_key_path, SigV4Signer};
use crate::{AssetKey, ConfigError, ImageAsset, LookupError};

const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Where requests for a bucket are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Addressing {
    /// `https://{bucket}.s3.{region}.amazonaws.com/{key}`
    VirtualHosted,
    /// `{scheme}://{authority}/{bucket}/{key}` for S3-compatible endpoints.
    PathStyle { scheme: String, authority: String },
}

/// S3 object store serving the pre-rendered forecast artifacts.
#[derive(Clone)]
pub struct S3AssetStore {
    http_client: Arc<dyn HttpClient>,
    signer: SigV4Signer,
    addressing: Addressing,
    timeout_ms: u64,
}

impl S3AssetStore {
    pub fn new(http_client: Arc<dyn HttpClient>, signer: SigV4Signer) -> Self {
        Self {
            http_client,
            signer,
            addressing: Addressing::VirtualHosted,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Sends path-style requests to `endpoint` (for example `http://localhost:9000`).
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidEndpoint {
            value: endpoint.to_owned(),
        };
        let (scheme, rest) = endpoint.split_once("://").ok_or_else(invalid)?;
        let authority = rest.split('/').next().unwrap_or_default();
        if scheme.is_empty() || authority.is_empty() {
            return Err(invalid());
        }
        let scheme = scheme.to_ascii_lowercase();
        let authority = without_default_port(&scheme, authority).to_owned();
        self.addressing = Addressing::PathStyle { scheme, authority };
        Ok(self)
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn locate(&self, bucket: &str, key: &AssetKey) -> (String, String, String) {
        let encoded_key = encode_key_path(key.as_str());
        match &self.addressing {
            Addressing::VirtualHosted => {
                let host = format!("{bucket}.s3.{}.amazonaws.com", self.signer.region());
                let path = format!("/{encoded_key}");
                let url = format!("https://{host}{path}");
                (url, host, path)
            }
            Addressing::PathStyle { scheme, authority } => {
                let path = format!("/{bucket}/{encoded_key}");
                let url = format!("{scheme}://{authority}{path}");
                (url, authority.clone(), path)
            }
        }
    }
}

impl AssetLookup for S3AssetStore {
    fn fetch_asset<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a AssetKey,
    ) -> Pin<Box<dyn Future<Output = Result<ImageAsset, LookupError>> + Send + 'a>> {
        Box::pin(async move {
            validate_bucket(bucket)?;

            let (url, host, path) = self.locate(bucket, key);
            let headers = self
                .signer
                .sign_get(&host, &path, &[], OffsetDateTime::now_utc())
                .map_err(|e| LookupError::AccessFailure(format!("failed to sign request: {e}")))?;

            debug!(%url, "object store request");
            let request = HttpRequest::get(url)
                .with_headers(headers)
                .with_timeout_ms(self.timeout_ms);

            let response = self.http_client.execute(request).await.map_err(|error| {
                LookupError::AccessFailure(format!("object store transport error: {error}"))
            })?;

            classify_response(key, response)
        })
    }
}

fn classify_response(key: &AssetKey, response: HttpResponse) -> Result<ImageAsset, LookupError> {
    if response.is_success() {
        let content_type = response
            .header("content-type")
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_owned();
        return Ok(ImageAsset::new(key.as_str(), content_type, response.body));
    }

    let code = error_code(&response.text());
    if response.status == 404 || code.as_deref() == Some("NoSuchKey") {
        debug!(key = %key, "object not found");
        return Err(LookupError::NotFound {
            key: key.as_str().to_owned(),
        });
    }

    Err(LookupError::AccessFailure(match code {
        Some(code) => format!("object store returned status {} ({code})", response.status),
        None => format!("object store returned status {}", response.status),
    }))
}

/// Extracts `<Code>` from an S3 XML error body.
fn error_code(body: &str) -> Option<String> {
    let start = body.find("<Code>")? + "<Code>".len();
    let end = body[start..].find("</Code>")? + start;
    Some(body[start..end].trim().to_owned()).filter(|code| !code.is_empty())
}

/// The transport omits a scheme's default port from `Host`, so the signed
/// host must omit it too.
fn without_default_port<'a>(scheme: &str, authority: &'a str) -> &'a str {
    let default_port = match scheme {
        "http" => "80",
        "https" => "443",
        _ => return authority,
    };
    match authority.rsplit_once(':') {
        Some((host, port)) if port == default_port && !host.is_empty() => host,
        _ => authority,
    }
}

fn validate_bucket(bucket: &str) -> Result<(), LookupError> {
    let valid_len = (3..=63).contains(&bucket.len());
    let valid_chars = bucket
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' || ch == '.');
    let valid_edges = bucket
        .chars()
        .next()
        .zip(bucket.chars().last())
        .is_some_and(|(first, last)| first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric());

    if valid_len && valid_chars && valid_edges {
        Ok(())
    } else {
        Err(LookupError::AccessFailure(format!(
            "malformed bucket name '{bucket}'"
        )))
    }
}
