//! HTTP surface of the host.
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /health` | `ok` |
//! | `GET /api/catalog` | industries and their symbols |
//! | `GET /api/dashboard?symbol=&industry=&start=&end=&horizon=&window=` | [`ViewModel`](stockdash_core::ViewModel) |

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use stockdash_core::{
    Catalog, Dashboard, DashboardInputs, Horizon, Period, Symbol, TradingDate, ValidationError,
    ViewModel,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    dashboard: Arc<Dashboard>,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard: Arc::new(dashboard),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    Router::new()
        .route("/health", get(health))
        .route("/api/catalog", get(catalog))
        .route("/api/dashboard", get(dashboard))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn catalog(State(state): State<AppState>) -> Json<Catalog> {
    Json(state.dashboard.catalog().clone())
}

async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<ViewModel>, ApiError> {
    let inputs = query.into_inputs()?;
    Ok(Json(state.dashboard.render(&inputs).await))
}

/// Raw query string. Every field is optional text so malformed values
/// reach [`ApiError`] instead of axum's plain-text rejection.
#[derive(Debug, Default, Deserialize)]
struct DashboardQuery {
    symbol: Option<String>,
    industry: Option<String>,
    start: Option<String>,
    end: Option<String>,
    horizon: Option<String>,
    window: Option<String>,
}

impl DashboardQuery {
    fn into_inputs(self) -> Result<DashboardInputs, ApiError> {
        let symbol = present(self.symbol)
            .ok_or_else(|| ApiError::bad_request("missing query parameter 'symbol'"))?;
        let symbol = Symbol::parse(&symbol)?;

        let start = present(self.start);
        let end = present(self.end);
        let horizon = present(self.horizon);

        let period = match (start, end, horizon) {
            (None, None, None) => Period::default(),
            (None, None, Some(horizon)) => Period::Horizon(horizon.parse::<Horizon>()?),
            (Some(start), Some(end), None) => Period::Range {
                start: TradingDate::parse(&start)?,
                end: TradingDate::parse(&end)?,
            },
            (_, _, Some(_)) => {
                return Err(ApiError::bad_request(
                    "'horizon' cannot be combined with 'start'/'end'",
                ))
            }
            _ => {
                return Err(ApiError::bad_request(
                    "'start' and 'end' must be given together",
                ))
            }
        };

        let mut inputs = DashboardInputs::new(symbol).with_period(period);
        if let Some(industry) = present(self.industry) {
            inputs = inputs.with_industry(industry);
        }
        if let Some(window) = present(self.window) {
            let window = window.parse::<usize>().map_err(|_| {
                ApiError::bad_request(format!("window must be a positive integer: '{window}'"))
            })?;
            inputs = inputs.with_window(window);
        }

        Ok(inputs)
    }
}

/// Blank form fields count as absent.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        Self::bad_request(error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
