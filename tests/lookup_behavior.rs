//! Behavior-driven tests for the metrics, news and asset lookups
//!
//! These tests verify HOW provider and object-store responses are normalized:
//! absent metrics, capped headlines, the two no-article outcomes and the
//! split between missing artifacts and access failures.

mod common;

use std::sync::Arc;

use common::{chart_json, date, flat_row, png_response, s3_store, yahoo, FakeHttpClient, CRUMB};
use stockdash_core::{
    AssetKey, AssetLookup, Horizon, HttpError, HttpResponse, Industry, LookupError, MetricsLookup,
    NewsFeed, NewsLookup, NoArticlesReason, SeriesRepository, Symbol,
};

fn symbol(value: &str) -> Symbol {
    Symbol::parse(value).expect("valid")
}

fn forecast_key(symbol_value: &str) -> AssetKey {
    AssetKey::forecast(
        &Industry::parse("Automobile").expect("valid"),
        &symbol(symbol_value),
        Horizon::LongTerm,
    )
}

// =============================================================================
// Metrics Lookup
// =============================================================================

#[tokio::test]
async fn when_provider_reports_all_fields_system_maps_each_metric() {
    // Given: A full quoteSummary payload
    let body = serde_json::json!({
        "quoteSummary": {
            "result": [{
                "summaryDetail": {
                    "trailingPE": { "raw": 27.4, "fmt": "27.40" },
                    "forwardPE": { "raw": 22.1, "fmt": "22.10" },
                    "beta": { "raw": 0.62, "fmt": "0.62" },
                    "marketCap": { "raw": 19_500_000_000_000.0_f64, "fmt": "19.5T" },
                    "previousClose": { "raw": 2890.5, "fmt": "2,890.50" }
                },
                "defaultKeyStatistics": { "trailingEps": { "raw": 105.3, "fmt": "105.30" } },
                "assetProfile": { "sector": "Energy", "industry": "Oil & Gas Refining & Marketing" },
                "price": {}
            }],
            "error": null
        }
    })
    .to_string();
    let http = Arc::new(
        FakeHttpClient::with_yahoo_session().route("/quoteSummary/", Ok(HttpResponse::ok_json(body))),
    );

    // When: The system looks up metrics
    let metrics = yahoo(&http)
        .fetch_metrics(&symbol("RELIANCE.NS"))
        .await
        .expect("metrics should parse");

    // Then: Every field is populated from the raw values
    assert_eq!(metrics.trailing_pe, Some(27.4));
    assert_eq!(metrics.forward_pe, Some(22.1));
    assert_eq!(metrics.beta, Some(0.62));
    assert_eq!(metrics.market_cap, Some(19_500_000_000_000.0));
    assert_eq!(metrics.trailing_eps, Some(105.3));
    assert_eq!(metrics.previous_close, Some(2890.5));
    assert_eq!(metrics.sector.as_deref(), Some("Energy"));
    assert_eq!(metrics.industry.as_deref(), Some("Oil & Gas Refining & Marketing"));
}

#[tokio::test]
async fn when_provider_omits_fields_system_marks_them_absent() {
    // Given: A payload with only the price module and an empty beta
    let body = serde_json::json!({
        "quoteSummary": {
            "result": [{
                "summaryDetail": { "beta": {} },
                "price": {
                    "marketCap": { "raw": 1_200_000_000.0_f64 },
                    "regularMarketPreviousClose": { "raw": 88.25 }
                }
            }],
            "error": null
        }
    })
    .to_string();
    let http = Arc::new(
        FakeHttpClient::with_yahoo_session().route("/quoteSummary/", Ok(HttpResponse::ok_json(body))),
    );

    // When: The system looks up metrics
    let metrics = yahoo(&http)
        .fetch_metrics(&symbol("SMALLCAP.NS"))
        .await
        .expect("partial metrics are not an error");

    // Then: Missing fields are None and fallbacks are used where available
    assert_eq!(metrics.beta, None);
    assert_eq!(metrics.trailing_pe, None);
    assert_eq!(metrics.sector, None);
    assert_eq!(metrics.market_cap, Some(1_200_000_000.0));
    assert_eq!(metrics.previous_close, Some(88.25));
}

#[tokio::test]
async fn when_metrics_symbol_is_unknown_system_reports_provider_failure() {
    let body = r#"{"quoteSummary":{"result":null,"error":{"code":"Not Found","description":"Quote not found for symbol: NOPE.NS"}}}"#;
    let http = Arc::new(
        FakeHttpClient::with_yahoo_session().route("/quoteSummary/", Ok(HttpResponse::new(404, body))),
    );

    let error = yahoo(&http)
        .fetch_metrics(&symbol("NOPE.NS"))
        .await
        .expect_err("unknown symbol must fail");

    assert!(error.message().contains("Quote not found"), "{}", error.message());
}

#[tokio::test]
async fn when_session_is_rejected_system_fails_once_and_renegotiates_next_call() {
    // Given: A provider that rejects the session with 401
    let http = Arc::new(
        FakeHttpClient::with_yahoo_session().route("/quoteSummary/", Ok(HttpResponse::new(401, ""))),
    );
    let adapter = yahoo(&http);

    // When: Two lookups are made
    let first = adapter.fetch_metrics(&symbol("TCS.NS")).await;
    let second = adapter.fetch_metrics(&symbol("TCS.NS")).await;

    // Then: Each fails without retry and a new crumb is fetched for the second
    assert!(first.is_err());
    assert!(second.is_err());
    assert_eq!(http.requests_to("/quoteSummary/").len(), 2);
    assert_eq!(http.requests_to("getcrumb").len(), 2);
}

#[tokio::test]
async fn when_lookups_start_together_system_negotiates_one_session() {
    // Given: A cold session over a transport that interleaves concurrent calls
    let http = Arc::new(
        FakeHttpClient::with_yahoo_session()
            .yielding()
            .route("/v8/finance/chart/", Ok(HttpResponse::ok_json(chart_json(&[flat_row("2024-01-02", 1.0)]))))
            .route("/quoteSummary/", Ok(HttpResponse::ok_json(r#"{"quoteSummary":{"result":[{}],"error":null}}"#)))
            .route("/v1/finance/search", Ok(HttpResponse::ok_json(r#"{"news":[]}"#))),
    );
    let adapter = yahoo(&http);
    let tcs = symbol("TCS.NS");

    // When: Series, metrics and news are fetched concurrently
    let (series, metrics, news) = tokio::join!(
        adapter.fetch_series(&tcs, date("2024-01-01"), date("2024-01-31")),
        adapter.fetch_metrics(&tcs),
        adapter.fetch_news(&tcs),
    );

    // Then: All three share a single cookie and crumb handshake
    assert!(series.is_ok() && metrics.is_ok() && news.is_ok());
    assert_eq!(http.requests_to("fc.yahoo.com").len(), 1);
    assert_eq!(http.requests_to("getcrumb").len(), 1);
    let crumbed = http
        .requests()
        .into_iter()
        .filter(|request| request.url.contains(&format!("crumb={CRUMB}")))
        .count();
    assert_eq!(crumbed, 3);
}

// =============================================================================
// News Lookup
// =============================================================================

#[tokio::test]
async fn when_provider_returns_many_headlines_system_keeps_the_first_five() {
    // Given: Eight headlines
    let news: Vec<serde_json::Value> = (1..=8)
        .map(|n| {
            serde_json::json!({
                "title": format!("Headline {n}"),
                "publisher": "Moneycontrol",
                "link": format!("https://news.test/{n}"),
            })
        })
        .collect();
    let body = serde_json::json!({ "quotes": [], "news": news }).to_string();
    let http = Arc::new(
        FakeHttpClient::with_yahoo_session().route("/v1/finance/search", Ok(HttpResponse::ok_json(body))),
    );

    // When: The system looks up news
    let feed = yahoo(&http)
        .fetch_news(&symbol("INFY.NS"))
        .await
        .expect("news should parse");

    // Then: Five headlines remain in provider order
    let items = match feed {
        NewsFeed::Articles { items } => items,
        other => panic!("expected articles, got {other:?}"),
    };
    assert_eq!(items.len(), NewsFeed::MAX_ITEMS);
    assert_eq!(items[0].title, "Headline 1");
    assert_eq!(items[4].link, "https://news.test/5");
}

#[tokio::test]
async fn when_headline_fields_are_missing_system_fills_placeholders() {
    let body = r#"{"news":[{"uuid":"a1"}]}"#;
    let http = Arc::new(
        FakeHttpClient::with_yahoo_session().route("/v1/finance/search", Ok(HttpResponse::ok_json(body))),
    );

    let feed = yahoo(&http)
        .fetch_news(&symbol("INFY.NS"))
        .await
        .expect("news should parse");

    let items = match feed {
        NewsFeed::Articles { items } => items,
        other => panic!("expected articles, got {other:?}"),
    };
    assert_eq!(items[0].title, "No title available");
    assert_eq!(items[0].publisher, "Unknown source");
    assert_eq!(items[0].link, "No link available");
}

#[tokio::test]
async fn when_provider_returns_an_empty_list_system_reports_no_articles() {
    let http = Arc::new(
        FakeHttpClient::with_yahoo_session()
            .route("/v1/finance/search", Ok(HttpResponse::ok_json(r#"{"news":[]}"#))),
    );

    let feed = yahoo(&http)
        .fetch_news(&symbol("INFY.NS"))
        .await
        .expect("empty list is not an error");

    assert_eq!(
        feed,
        NewsFeed::NoArticles {
            reason: NoArticlesReason::Empty
        }
    );
}

#[tokio::test]
async fn when_response_has_no_news_section_system_reports_unsupported() {
    let http = Arc::new(
        FakeHttpClient::with_yahoo_session()
            .route("/v1/finance/search", Ok(HttpResponse::ok_json(r#"{"quotes":[]}"#))),
    );

    let feed = yahoo(&http)
        .fetch_news(&symbol("INFY.NS"))
        .await
        .expect("missing section is not an error");

    assert_eq!(
        feed,
        NewsFeed::NoArticles {
            reason: NoArticlesReason::Unsupported
        }
    );
}

#[tokio::test]
async fn when_news_request_fails_system_reports_provider_failure() {
    let http = Arc::new(
        FakeHttpClient::with_yahoo_session()
            .route("/v1/finance/search", Err(HttpError::new("timed out"))),
    );

    let error = yahoo(&http)
        .fetch_news(&symbol("INFY.NS"))
        .await
        .expect_err("transport failure must fail");

    assert!(error.message().contains("timed out"), "{}", error.message());
}

// =============================================================================
// Asset Lookup
// =============================================================================

#[tokio::test]
async fn when_object_exists_system_returns_its_bytes_and_content_type() {
    // Given: An object store holding the forecast image
    let http = Arc::new(FakeHttpClient::new().route("30_day_forecast.png", Ok(png_response())));
    let key = forecast_key("TATAMOTORS.NS");

    // When: The system fetches the key
    let asset = s3_store(&http)
        .fetch_asset("isbfinanceproject", &key)
        .await
        .expect("object should be returned");

    // Then: Bytes and content type are carried through
    assert_eq!(asset.key, "Results/Automobile/TATAMOTORS.NS/30_day_forecast.png");
    assert_eq!(asset.content_type, "image/png");
    assert_eq!(asset.bytes, vec![0x89, b'P', b'N', b'G']);

    let requests = http.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].url,
        "https://isbfinanceproject.s3.us-east-1.amazonaws.com/Results/Automobile/TATAMOTORS.NS/30_day_forecast.png"
    );
    let authorization = requests[0]
        .headers
        .get("authorization")
        .expect("request must be signed");
    assert!(authorization.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/"));
    assert!(!requests[0].url.contains("wJalrXUtnFEMI"));
}

#[tokio::test]
async fn when_symbol_has_reserved_characters_system_percent_encodes_the_key() {
    let http = Arc::new(FakeHttpClient::new().route("forecast.png", Ok(png_response())));
    let key = forecast_key("M&M.NS");

    s3_store(&http)
        .fetch_asset("isbfinanceproject", &key)
        .await
        .expect("object should be returned");

    let url = &http.requests()[0].url;
    assert!(url.ends_with("/Results/Automobile/M%26M.NS/30_day_forecast.png"), "{url}");
}

#[tokio::test]
async fn when_object_is_missing_system_reports_not_found() {
    let body = "<?xml version=\"1.0\"?><Error><Code>NoSuchKey</Code><Message>The specified key does not exist.</Message></Error>";
    let http = Arc::new(FakeHttpClient::new().route("amazonaws.com", Ok(HttpResponse::new(404, body))));

    let error = s3_store(&http)
        .fetch_asset("isbfinanceproject", &forecast_key("TATAMOTORS.NS"))
        .await
        .expect_err("missing key must fail");

    assert!(error.is_not_found());
}

#[tokio::test]
async fn when_access_is_denied_system_reports_access_failure() {
    let body = "<Error><Code>AccessDenied</Code><Message>Access Denied</Message></Error>";
    let http = Arc::new(FakeHttpClient::new().route("amazonaws.com", Ok(HttpResponse::new(403, body))));

    let error = s3_store(&http)
        .fetch_asset("isbfinanceproject", &forecast_key("TATAMOTORS.NS"))
        .await
        .expect_err("denied access must fail");

    assert!(!error.is_not_found());
    assert!(error.to_string().contains("AccessDenied"), "{error}");
}

#[tokio::test]
async fn when_object_store_is_unreachable_system_reports_access_failure() {
    let http = Arc::new(
        FakeHttpClient::new().route("amazonaws.com", Err(HttpError::new("dns error: no such host"))),
    );

    let error = s3_store(&http)
        .fetch_asset("isbfinanceproject", &forecast_key("TATAMOTORS.NS"))
        .await
        .expect_err("transport failure must fail");

    assert!(matches!(error, LookupError::AccessFailure(message) if message.contains("dns error")));
}

#[tokio::test]
async fn when_bucket_name_is_malformed_system_fails_without_a_request() {
    let http = Arc::new(FakeHttpClient::new());

    let error = s3_store(&http)
        .fetch_asset("Bad_Bucket", &forecast_key("TATAMOTORS.NS"))
        .await
        .expect_err("malformed bucket must fail");

    assert!(matches!(error, LookupError::AccessFailure(_)));
    assert!(http.requests().is_empty());
}
