use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::parser::{self, StockSnapshot, WeatherSnapshot};

pub const STOCKS_URL: &str = "https://growagarden.gg/stocks";
pub const WEATHER_URL: &str = "https://growagarden.gg/weather";

// Browser-like User-Agent to avoid bot detection on the upstream site.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Shared HTTP client for all upstream fetches.
pub fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .context("Failed to create HTTP client")
}

/// GET a page and return its raw HTML. Single attempt, no retries; any
/// transport error or non-2xx status propagates to the caller.
pub async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String> {
    debug!(url = %url, "Fetching page");
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Request failed for {url}"))?;

    let status = response.status();
    if !status.is_success() {
        bail!("HTTP {} for {}", status, url);
    }

    response
        .text()
        .await
        .with_context(|| format!("Failed to read response body for {url}"))
}

/// Fetch a stock page and run the stock extraction cascade.
pub async fn fetch_stocks_from(client: &reqwest::Client, url: &str) -> Result<StockSnapshot> {
    let html = fetch_html(client, url).await?;
    let snapshot = parser::extract_stock_page(&html);
    info!(
        seeds = snapshot.seeds.len(),
        gears = snapshot.gears.len(),
        eggs = snapshot.eggs.len(),
        "Extracted stock snapshot"
    );
    Ok(snapshot)
}

/// Stock pipeline against the production source.
pub async fn fetch_stocks(client: &reqwest::Client) -> Result<StockSnapshot> {
    fetch_stocks_from(client, STOCKS_URL).await
}

/// Fetch a weather page and resolve the five weather fields.
pub async fn fetch_weather_from(client: &reqwest::Client, url: &str) -> Result<WeatherSnapshot> {
    let html = fetch_html(client, url).await?;
    let snapshot = parser::extract_weather_page(&html);
    info!(current = %snapshot.current, "Extracted weather snapshot");
    Ok(snapshot)
}

/// Weather pipeline against the production source.
pub async fn fetch_weather(client: &reqwest::Client) -> Result<WeatherSnapshot> {
    fetch_weather_from(client, WEATHER_URL).await
}

// ── Tests ──
