use std::time::Instant;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::clock;
use crate::fetch;
use crate::parser::{StockSnapshot, WeatherSnapshot};

#[derive(Clone)]
pub struct AppState {
    client: reqwest::Client,
    stocks_url: String,
    weather_url: String,
    started: Instant,
}

#[derive(Serialize)]
struct DataResponse {
    stocks: StockSnapshot,
    weather: WeatherSnapshot,
    #[serde(rename = "lastUpdated")]
    last_updated: String,
    timestamp: i64,
}

#[derive(Serialize)]
struct StocksResponse {
    stocks: StockSnapshot,
    #[serde(rename = "lastUpdated")]
    last_updated: String,
    timestamp: i64,
}

#[derive(Serialize)]
struct WeatherResponse {
    weather: WeatherSnapshot,
    #[serde(rename = "lastUpdated")]
    last_updated: String,
    timestamp: i64,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    uptime: f64,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// Upstream failure surfaced as HTTP 500 with the underlying message.
struct ApiError {
    message: &'static str,
    source: anyhow::Error,
}

impl ApiError {
    fn new(message: &'static str, source: anyhow::Error) -> Self {
        Self { message, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self.source, "Request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: self.message.to_string(),
                details: Some(self.source.to_string()),
            }),
        )
            .into_response()
    }
}

async fn data_handler(State(state): State<AppState>) -> Result<Json<DataResponse>, ApiError> {
    // Both pipelines run concurrently; either failure fails the request.
    let (stocks, weather) = tokio::try_join!(
        fetch::fetch_stocks_from(&state.client, &state.stocks_url),
        fetch::fetch_weather_from(&state.client, &state.weather_url),
    )
    .map_err(|e| ApiError::new("Gagal mengambil data. Silakan coba lagi nanti.", e))?;

    let now = clock::now_wib();
    Ok(Json(DataResponse {
        stocks,
        weather,
        last_updated: clock::format_display(now),
        timestamp: clock::epoch_millis(now),
    }))
}

async fn stocks_handler(State(state): State<AppState>) -> Result<Json<StocksResponse>, ApiError> {
    let stocks = fetch::fetch_stocks_from(&state.client, &state.stocks_url)
        .await
        .map_err(|e| ApiError::new("Gagal mengambil data stok.", e))?;

    let now = clock::now_wib();
    Ok(Json(StocksResponse {
        stocks,
        last_updated: clock::format_display(now),
        timestamp: clock::epoch_millis(now),
    }))
}

async fn weather_handler(State(state): State<AppState>) -> Result<Json<WeatherResponse>, ApiError> {
    let weather = fetch::fetch_weather_from(&state.client, &state.weather_url)
        .await
        .map_err(|e| ApiError::new("Gagal mengambil data cuaca.", e))?;

    let now = clock::now_wib();
    Ok(Json(WeatherResponse {
        weather,
        last_updated: clock::format_display(now),
        timestamp: clock::epoch_millis(now),
    }))
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: clock::format_display(clock::now_wib()),
        uptime: state.started.elapsed().as_secs_f64(),
    })
}

async fn not_found() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "Endpoint tidak ditemukan.".to_string(),
            details: None,
        }),
    )
}

pub fn build_router(client: reqwest::Client) -> Router {
    build_router_with_sources(
        client,
        fetch::STOCKS_URL.to_string(),
        fetch::WEATHER_URL.to_string(),
    )
}

/// Router with explicit upstream page URLs (tests point these at a stub).
pub fn build_router_with_sources(
    client: reqwest::Client,
    stocks_url: String,
    weather_url: String,
) -> Router {
    let state = AppState {
        client,
        stocks_url,
        weather_url,
        started: Instant::now(),
    };

    Router::new()
        .route("/api/data", get(data_handler))
        .route("/api/stocks", get(stocks_handler))
        .route("/api/weather", get(weather_handler))
        .route("/api/health", get(health_handler))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn serve(port: u16) -> Result<()> {
    let client = fetch::build_client()?;
    let app = build_router(client);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Garden API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutting down");
}

// ── Tests ──
