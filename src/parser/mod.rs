pub mod classify;
pub mod stock;
pub mod weather;

use scraper::{ElementRef, Html};
use serde::Serialize;

/// Fallback string substituted when no strategy recovers a weather field.
pub const PLACEHOLDER: &str = "Tidak tersedia";

/// Deduplicated shop stock per category, in first-discovery order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StockSnapshot {
    pub seeds: Vec<String>,
    pub gears: Vec<String>,
    pub eggs: Vec<String>,
}

/// Weather readings; every field is populated, with [`PLACEHOLDER`] standing
/// in for anything the page did not yield.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherSnapshot {
    pub current: String,
    pub temperature: String,
    pub humidity: String,
    pub wind: String,
    pub forecast: String,
}

/// Two-pass pipeline: raw HTML → parsed document → stock cascade.
pub fn extract_stock_page(html: &str) -> StockSnapshot {
    let doc = Html::parse_document(html);
    stock::extract_stock(&doc)
}

/// Two-pass pipeline: raw HTML → parsed document → per-field weather cascade.
pub fn extract_weather_page(html: &str) -> WeatherSnapshot {
    let doc = Html::parse_document(html);
    weather::extract_weather(&doc)
}

/// All text under an element, whitespace-normalized to single spaces.
pub(crate) fn element_text(el: ElementRef) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Next sibling that is an element (skipping text and comment nodes).
pub(crate) fn next_element(el: ElementRef) -> Option<ElementRef> {
    el.next_siblings().find_map(ElementRef::wrap)
}

/// Climb `depth` levels of enclosing elements.
pub(crate) fn ancestor(el: ElementRef, depth: usize) -> Option<ElementRef> {
    let mut current = el;
    for _ in 0..depth {
        current = current.parent().and_then(ElementRef::wrap)?;
    }
    Some(current)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    #[test]
    fn element_text_normalizes_whitespace() {
        let doc = Html::parse_document("<p>  Carrot \n\t Seed  </p>");
        let sel = Selector::parse("p").unwrap();
        let p = doc.select(&sel).next().unwrap();
        assert_eq!(element_text(p), "Carrot Seed");
    }

    #[test]
    fn next_element_skips_text_nodes() {
        let doc = Html::parse_document("<h3>Seeds</h3> stray text <ul><li>x</li></ul>");
        let sel = Selector::parse("h3").unwrap();
        let h3 = doc.select(&sel).next().unwrap();
        let sib = next_element(h3).unwrap();
        assert_eq!(sib.value().name(), "ul");
    }

    #[test]
    fn garbage_markup_yields_empty_and_placeholders() {
        let html = "<<<not really html>>>";
        let stocks = extract_stock_page(html);
        assert!(stocks.seeds.is_empty());
        assert!(stocks.gears.is_empty());
        assert!(stocks.eggs.is_empty());

        let weather = extract_weather_page(html);
        assert_eq!(weather.current, PLACEHOLDER);
        assert_eq!(weather.temperature, PLACEHOLDER);
        assert_eq!(weather.humidity, PLACEHOLDER);
        assert_eq!(weather.wind, PLACEHOLDER);
        assert_eq!(weather.forecast, PLACEHOLDER);
    }
}
