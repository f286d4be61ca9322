//! Shared fixtures for the behavior suites.
//!
//! [`FakeHttpClient`] answers by URL substring (first match wins), records
//! every request and replies 404 to anything unscripted. A
//! [`FakeHttpClient::yielding`] client yields to the scheduler before each
//! reply so joined callers interleave.

#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use secrecy::SecretString;
use stockdash_core::{
    AwsCredentials, HttpClient, HttpError, HttpRequest, HttpResponse, S3AssetStore, SigV4Signer,
    TradingDate, YahooAdapter,
};

pub const CRUMB: &str = "Xk9crumb";
pub const IST_OFFSET_SECS: i64 = 19_800;

#[derive(Debug, Default)]
pub struct FakeHttpClient {
    routes: Mutex<Vec<(String, Result<HttpResponse, HttpError>)>>,
    requests: Mutex<Vec<HttpRequest>>,
    yields: bool,
}

impl FakeHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fake client that already hands out a crumb.
    pub fn with_yahoo_session() -> Self {
        Self::new().route("getcrumb", Ok(HttpResponse::new(200, CRUMB)))
    }

    /// Yields once before answering each request.
    pub fn yielding(mut self) -> Self {
        self.yields = true;
        self
    }

    pub fn route(self, url_fragment: &str, reply: Result<HttpResponse, HttpError>) -> Self {
        self.routes
            .lock()
            .expect("routes lock")
            .push((url_fragment.to_owned(), reply));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    /// Requests whose URL contains `fragment`.
    pub fn requests_to(&self, fragment: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.url.contains(fragment))
            .collect()
    }
}

impl HttpClient for FakeHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            if self.yields {
                tokio::task::yield_now().await;
            }
            let reply = self
                .routes
                .lock()
                .expect("routes lock")
                .iter()
                .find(|(fragment, _)| request.url.contains(fragment.as_str()))
                .map(|(_, reply)| reply.clone())
                .unwrap_or_else(|| Ok(HttpResponse::new(404, "")));
            self.requests.lock().expect("requests lock").push(request);
            reply
        })
    }
}

pub fn date(value: &str) -> TradingDate {
    TradingDate::parse(value).expect("valid date")
}

/// 09:15 IST on `day`, reported by Yahoo as 03:45 UTC.
pub fn ist_open(day: &str) -> i64 {
    date(day).unix_midnight() + 13_500
}

/// One chart row: `(timestamp, open, high, low, close, volume)`.
pub type ChartRow = (i64, Option<f64>, Option<f64>, Option<f64>, Option<f64>, Option<i64>);

pub fn chart_json(rows: &[ChartRow]) -> String {
    let timestamps: Vec<i64> = rows.iter().map(|row| row.0).collect();
    let opens: Vec<Option<f64>> = rows.iter().map(|row| row.1).collect();
    let highs: Vec<Option<f64>> = rows.iter().map(|row| row.2).collect();
    let lows: Vec<Option<f64>> = rows.iter().map(|row| row.3).collect();
    let closes: Vec<Option<f64>> = rows.iter().map(|row| row.4).collect();
    let volumes: Vec<Option<i64>> = rows.iter().map(|row| row.5).collect();

    serde_json::json!({
        "chart": {
            "result": [{
                "meta": { "symbol": "RELIANCE.NS", "gmtoffset": IST_OFFSET_SECS },
                "timestamp": timestamps,
                "indicators": { "quote": [{
                    "open": opens,
                    "high": highs,
                    "low": lows,
                    "close": closes,
                    "volume": volumes,
                }]}
            }],
            "error": null
        }
    })
    .to_string()
}

/// A flat bar where every price equals `close`.
pub fn flat_row(day: &str, close: f64) -> ChartRow {
    (ist_open(day), Some(close), Some(close), Some(close), Some(close), Some(1_000))
}

pub fn yahoo(http: &Arc<FakeHttpClient>) -> YahooAdapter {
    YahooAdapter::new(Arc::clone(http) as Arc<dyn HttpClient>)
}

pub fn credentials() -> AwsCredentials {
    AwsCredentials {
        access_key_id: String::from("AKIDEXAMPLE"),
        secret_access_key: SecretString::from(String::from(
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
        )),
        session_token: None,
    }
}

pub fn s3_store(http: &Arc<FakeHttpClient>) -> S3AssetStore {
    S3AssetStore::new(
        Arc::clone(http) as Arc<dyn HttpClient>,
        SigV4Signer::new(credentials(), "us-east-1"),
    )
}

pub fn png_response() -> HttpResponse {
    HttpResponse::new(200, vec![0x89, b'P', b'N', b'G']).with_header("content-type", "image/png")
}
