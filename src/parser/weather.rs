use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use super::{element_text, next_element, WeatherSnapshot, PLACEHOLDER};

static HEADING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4").unwrap());
static TEXT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p, div, span, li, td").unwrap());
static SCRIPT_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("script").unwrap());
// Quoted key naming "weather" with a quoted string value, e.g.
// "currentWeather":"Rainy" inside embedded page state.
static SCRIPT_WEATHER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)"[^"]*weather[^"]*"\s*:\s*"([^"]+)""#).unwrap());

/// One weather field: heading keywords for the adjacency probes (strategy A)
/// and keyword/symbol set for the text scan (strategy B).
struct FieldSpec {
    heading_keywords: &'static [&'static str],
    scan_keywords: &'static [&'static str],
}

const CURRENT: usize = 0;
const FIELD_COUNT: usize = 5;

// Order matches the snapshot: current, temperature, humidity, wind, forecast.
const FIELDS: [FieldSpec; FIELD_COUNT] = [
    FieldSpec {
        // Bare "Weather" would also match forecast headings; only the exact
        // pair label may resolve current conditions structurally.
        heading_keywords: &["Current Weather"],
        scan_keywords: &["Current Weather", "Weather:"],
    },
    FieldSpec {
        heading_keywords: &["Temperature"],
        scan_keywords: &["Temperature", "°"],
    },
    FieldSpec {
        heading_keywords: &["Humidity"],
        scan_keywords: &["Humidity", "%"],
    },
    FieldSpec {
        heading_keywords: &["Wind"],
        scan_keywords: &["Wind", "mph", "km/h"],
    },
    FieldSpec {
        heading_keywords: &["Weather Forecast", "Forecast"],
        scan_keywords: &["Forecast", "Next"],
    },
];

/// Resolve the five weather fields independently: heading/paragraph pairs,
/// then a last-match-wins keyword scan for whatever is still missing, then a
/// script scan for the current conditions, then the placeholder.
pub fn extract_weather(doc: &Html) -> WeatherSnapshot {
    let mut values: [Option<String>; FIELD_COUNT] = Default::default();

    // Strategy A: heading followed immediately by a paragraph.
    for (value, spec) in values.iter_mut().zip(&FIELDS) {
        *value = heading_pair(doc, spec.heading_keywords);
    }

    // Strategy B: keyword scan over text containers, only for fields strategy
    // A missed. Later matches overwrite earlier ones, so the last matching
    // container wins; if the page ever carries two genuine readings for one
    // field, the earlier one is shadowed. A single container may populate
    // several fields at once.
    let filled_by_pairs: Vec<bool> = values.iter().map(Option::is_some).collect();
    if filled_by_pairs.iter().any(|f| !f) {
        for el in doc.select(&TEXT_SEL) {
            let text = element_text(el);
            if text.is_empty() {
                continue;
            }
            for (i, spec) in FIELDS.iter().enumerate() {
                if filled_by_pairs[i] {
                    continue;
                }
                if spec.scan_keywords.iter().any(|kw| text.contains(kw)) {
                    values[i] = Some(text.clone());
                }
            }
        }
    }

    // Strategy C: embedded script state, for the current conditions only.
    if values[CURRENT].is_none() {
        values[CURRENT] = script_weather(doc);
    }

    let [current, temperature, humidity, wind, forecast] =
        values.map(|v| v.unwrap_or_else(|| PLACEHOLDER.to_string()));
    WeatherSnapshot {
        current,
        temperature,
        humidity,
        wind,
        forecast,
    }
}

/// First heading containing a keyword that is immediately followed by a
/// non-empty paragraph; keywords are tried in order.
fn heading_pair(doc: &Html, keywords: &[&str]) -> Option<String> {
    for keyword in keywords {
        for heading in doc.select(&HEADING_SEL) {
            if !element_text(heading).contains(keyword) {
                continue;
            }
            if let Some(sib) = next_element(heading) {
                if sib.value().name() == "p" {
                    let text = element_text(sib);
                    if !text.is_empty() {
                        return Some(text);
                    }
                }
            }
        }
    }
    None
}

fn script_weather(doc: &Html) -> Option<String> {
    for script in doc.select(&SCRIPT_SEL) {
        let body: String = script.text().collect();
        if let Some(caps) = SCRIPT_WEATHER_RE.captures(&body) {
            return Some(caps[1].to_string());
        }
    }
    None
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> WeatherSnapshot {
        extract_weather(&Html::parse_document(html))
    }

    #[test]
    fn weather_fixture_all_fields() {
        let html = std::fs::read_to_string("tests/fixtures/weather.html").unwrap();
        let w = extract(&html);
        assert_eq!(w.current, "Rainy");
        assert_eq!(w.temperature, "Temperature: 25°C");
        assert_eq!(w.humidity, "Humidity: 60%");
        assert_eq!(w.wind, "Wind: 10 km/h");
        assert_eq!(w.forecast, "Rain continuing into the evening");
    }

    #[test]
    fn last_matching_temperature_wins() {
        let w = extract("<p>Temperature: 22°C</p><p>Temperature: 25°C</p>");
        assert_eq!(w.temperature, "Temperature: 25°C");
    }

    #[test]
    fn heading_pair_beats_text_scan() {
        // Strategy A resolves `current`, so the scan never sees "Weather:".
        let w = extract(
            r#"<h2>Current Weather</h2><p>Sunny</p><p>Weather: stale banner text</p>"#,
        );
        assert_eq!(w.current, "Sunny");
    }

    #[test]
    fn fields_resolve_independently() {
        // `current` only via the script scan, `temperature` only via a
        // heading pair; the rest fall back to the placeholder.
        let w = extract(
            r#"<script>window.__state = {"currentWeather":"Thunderstorm"};</script>
               <h3>Temperature</h3><p>18°C</p>"#,
        );
        assert_eq!(w.current, "Thunderstorm");
        assert_eq!(w.temperature, "18°C");
        assert_eq!(w.humidity, PLACEHOLDER);
        assert_eq!(w.wind, PLACEHOLDER);
        assert_eq!(w.forecast, PLACEHOLDER);
    }

    #[test]
    fn forecast_heading_does_not_fill_current() {
        let w = extract("<h3>Weather Forecast</h3><p>Sunny tomorrow</p>");
        assert_eq!(w.forecast, "Sunny tomorrow");
        assert_eq!(w.current, PLACEHOLDER);
    }

    #[test]
    fn script_current_survives_forecast_heading() {
        // The forecast pair must not swallow `current`; the script scan is
        // still reached and supplies it.
        let w = extract(
            r#"<h3>Weather Forecast</h3><p>Cloudy later</p>
               <script>{"weatherNow":"Thunderstorm"}</script>"#,
        );
        assert_eq!(w.current, "Thunderstorm");
        assert_eq!(w.forecast, "Cloudy later");
    }

    #[test]
    fn one_container_populates_several_fields() {
        let w = extract("<p>Wind: 5 mph, Humidity: 40%</p>");
        assert_eq!(w.wind, "Wind: 5 mph, Humidity: 40%");
        assert_eq!(w.humidity, "Wind: 5 mph, Humidity: 40%");
    }

    #[test]
    fn empty_page_is_all_placeholders() {
        let w = extract("<html><body></body></html>");
        for field in [&w.current, &w.temperature, &w.humidity, &w.wind, &w.forecast] {
            assert_eq!(field, PLACEHOLDER);
        }
    }

    #[test]
    fn script_scan_matches_weather_key() {
        let doc = Html::parse_document(
            r#"<script>{"pageId":3,"weather_state":"Light Drizzle","other":"x"}</script>"#,
        );
        assert_eq!(script_weather(&doc).as_deref(), Some("Light Drizzle"));
    }
}
