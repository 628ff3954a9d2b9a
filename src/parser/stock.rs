use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::classify::{classify, classify_text, Category, ClassifyContext};
use super::{ancestor, element_text, next_element, StockSnapshot};

static LABELED_IMG_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img[alt]").unwrap());
static HEADING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4").unwrap());
static LIST_ITEM_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());
static TEXT_BLOCK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div, p, li, span").unwrap());
// "Carrot - Available Stock: 3" → rewritten as "[3x] Carrot"
static AVAILABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.*?)\s*-\s*available stock:\s*(\d+)").unwrap());

/// Raw per-category candidates from one strategy, before normalization.
#[derive(Default)]
struct RawLists {
    seeds: Vec<String>,
    gears: Vec<String>,
    eggs: Vec<String>,
}

impl RawLists {
    fn push(&mut self, cat: Category, label: &str) {
        let entry = rewrite_stock_entry(label);
        match cat {
            Category::Seed => self.seeds.push(entry),
            Category::Gear => self.gears.push(entry),
            Category::Egg => self.eggs.push(entry),
        }
    }

    fn has_any(&self) -> bool {
        !self.seeds.is_empty() || !self.gears.is_empty() || !self.eggs.is_empty()
    }
}

// Strategies in priority order; the first one yielding any category wins
// outright and later strategies are never consulted.
const STRATEGIES: [fn(&Html) -> RawLists; 3] =
    [labeled_images, structural_selectors, free_text];

/// Run the stock cascade over a parsed page. Never fails: a page that
/// matches nothing produces an empty snapshot.
pub fn extract_stock(doc: &Html) -> StockSnapshot {
    for strategy in STRATEGIES {
        let raw = strategy(doc);
        if raw.has_any() {
            return StockSnapshot {
                seeds: normalize(raw.seeds),
                gears: normalize(raw.gears),
                eggs: normalize(raw.eggs),
            };
        }
    }
    StockSnapshot::default()
}

/// Trim, drop empties, and keep the first occurrence of each exact string.
fn normalize(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

fn rewrite_stock_entry(text: &str) -> String {
    match AVAILABLE_RE.captures(text.trim()) {
        Some(caps) => format!("[{}x] {}", &caps[2], caps[1].trim()),
        None => text.trim().to_string(),
    }
}

// ── Strategy A: labeled-image scan ──

/// Every image with a descriptive alt text is a candidate; its enclosing
/// elements' text supplies the classification context.
fn labeled_images(doc: &Html) -> RawLists {
    let mut raw = RawLists::default();
    for img in doc.select(&LABELED_IMG_SEL) {
        let label = img.value().attr("alt").unwrap_or_default().trim();
        if label.is_empty() {
            continue;
        }
        let immediate = ancestor(img, 1).map(element_text).unwrap_or_default();
        let outer = ancestor(img, 2).map(element_text).unwrap_or_default();
        let ctx = ClassifyContext {
            label,
            immediate: &immediate,
            outer: &outer,
        };
        if let Some(cat) = classify(&ctx) {
            raw.push(cat, label);
        }
    }
    raw
}

// ── Strategy B: structural selector scan ──

fn structural_selectors(doc: &Html) -> RawLists {
    let mut raw = RawLists::default();
    for cat in Category::ALL {
        for label in probe_category(doc, cat.keyword()) {
            raw.push(cat, &label);
        }
    }
    raw
}

// Ordered structural probes per category; the first probe that yields
// anything settles that category.
const PROBES: [fn(&Html, &str) -> Vec<String>; 4] = [
    probe_heading_list,
    probe_heading_container,
    probe_class_hint,
    probe_testid_hint,
];

fn probe_category(doc: &Html, keyword: &str) -> Vec<String> {
    for probe in PROBES {
        let items = probe(doc, keyword);
        if !items.is_empty() {
            return items;
        }
    }
    Vec::new()
}

/// Heading mentioning the category, immediately followed by a list.
fn probe_heading_list(doc: &Html, keyword: &str) -> Vec<String> {
    for heading in matching_headings(doc, keyword) {
        if let Some(sib) = next_element(heading) {
            if matches!(sib.value().name(), "ul" | "ol") {
                let items = list_texts(sib);
                if !items.is_empty() {
                    return items;
                }
            }
        }
    }
    Vec::new()
}

/// Heading mentioning the category, followed by any container holding
/// labeled images or list items.
fn probe_heading_container(doc: &Html, keyword: &str) -> Vec<String> {
    for heading in matching_headings(doc, keyword) {
        if let Some(sib) = next_element(heading) {
            let items = container_items(sib);
            if !items.is_empty() {
                return items;
            }
        }
    }
    Vec::new()
}

fn probe_class_hint(doc: &Html, keyword: &str) -> Vec<String> {
    probe_attr_hint(doc, &format!("[class*=\"{keyword}\"]"))
}

fn probe_testid_hint(doc: &Html, keyword: &str) -> Vec<String> {
    probe_attr_hint(doc, &format!("[data-testid*=\"{keyword}\"]"))
}

fn probe_attr_hint(doc: &Html, selector: &str) -> Vec<String> {
    let Ok(sel) = Selector::parse(selector) else {
        return Vec::new();
    };
    for container in doc.select(&sel) {
        let items = container_items(container);
        if !items.is_empty() {
            return items;
        }
    }
    Vec::new()
}

fn matching_headings<'a>(
    doc: &'a Html,
    keyword: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    doc.select(&HEADING_SEL)
        .filter(move |h| element_text(*h).to_lowercase().contains(keyword))
}

/// Labeled images inside a container, else its list-item texts.
fn container_items(container: ElementRef) -> Vec<String> {
    let alts: Vec<String> = container
        .select(&LABELED_IMG_SEL)
        .filter_map(|img| img.value().attr("alt"))
        .map(|alt| alt.trim().to_string())
        .filter(|alt| !alt.is_empty())
        .collect();
    if !alts.is_empty() {
        return alts;
    }
    list_texts(container)
}

fn list_texts(el: ElementRef) -> Vec<String> {
    // An `li` root has no nested `li` to select; take its own text.
    if el.value().name() == "li" {
        let text = element_text(el);
        return if text.is_empty() { Vec::new() } else { vec![text] };
    }
    el.select(&LIST_ITEM_SEL)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect()
}

// ── Strategy C: free-text fallback ──

/// Last resort: short, purely alphabetic text blocks classified by the
/// indicator tables directly.
fn free_text(doc: &Html) -> RawLists {
    let mut raw = RawLists::default();
    for el in doc.select(&TEXT_BLOCK_SEL) {
        let text = element_text(el);
        let text = text.trim();
        if !(6..=99).contains(&text.chars().count()) {
            continue;
        }
        if !text.chars().all(|c| c.is_alphabetic() || c.is_whitespace()) {
            continue;
        }
        if let Some(cat) = classify_text(text) {
            raw.push(cat, text);
        }
    }
    raw
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> StockSnapshot {
        extract_stock(&Html::parse_document(html))
    }

    #[test]
    fn image_fixture_all_categories() {
        let html = std::fs::read_to_string("tests/fixtures/stocks_images.html").unwrap();
        let s = extract(&html);
        assert_eq!(s.seeds, vec!["Carrot Seed", "Blueberry", "Strawberry Plant"]);
        assert_eq!(s.gears, vec!["Watering Can", "Basic Sprinkler", "Trowel"]);
        assert_eq!(s.eggs, vec!["Common Egg", "Rare Egg"]);
    }

    #[test]
    fn list_fixture_uses_structural_scan() {
        let html = std::fs::read_to_string("tests/fixtures/stocks_lists.html").unwrap();
        let s = extract(&html);
        assert_eq!(s.seeds, vec!["[3x] Carrot", "[10x] Bamboo"]);
        assert_eq!(s.gears, vec!["[1x] Favorite Tool"]);
        assert_eq!(s.eggs, vec!["[2x] Common Egg"]);
    }

    #[test]
    fn labeled_image_in_seed_shop_div() {
        let s = extract(r#"<div class="seed-shop"><img alt="Carrot Seed"></div>"#);
        assert_eq!(s.seeds, vec!["Carrot Seed"]);
        assert!(s.gears.is_empty());
        assert!(s.eggs.is_empty());
    }

    #[test]
    fn cascade_short_circuits_after_image_scan() {
        // Strategy A finds one seed; the gear list below would only be seen
        // by strategy B, which must not run.
        let s = extract(
            r#"<div class="seed-shop"><div><img alt="Carrot Seed"></div></div>
               <h3>Current Gear Shop Stock</h3><ul><li>Trowel</li><li>Wrench</li></ul>"#,
        );
        assert_eq!(s.seeds, vec!["Carrot Seed"]);
        assert!(s.gears.is_empty());
    }

    #[test]
    fn duplicates_and_blank_labels_filtered() {
        let s = extract(
            r#"<div class="seed-shop">
                 <img alt="Carrot Seed"><img alt="Carrot Seed"><img alt="   ">
               </div>"#,
        );
        assert_eq!(s.seeds, vec!["Carrot Seed"]);
    }

    #[test]
    fn dedup_is_case_sensitive() {
        let s = extract(
            r#"<div class="seed-shop"><img alt="Carrot Seed"><img alt="carrot seed"></div>"#,
        );
        assert_eq!(s.seeds, vec!["Carrot Seed", "carrot seed"]);
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize(vec![
            " a seed ".into(),
            "a seed".into(),
            "  ".into(),
            "b".into(),
        ]);
        let twice = normalize(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once, vec!["a seed", "b"]);
    }

    #[test]
    fn available_stock_rewrite() {
        assert_eq!(rewrite_stock_entry("Carrot - Available Stock: 3"), "[3x] Carrot");
        assert_eq!(rewrite_stock_entry("Plain Carrot"), "Plain Carrot");
    }

    #[test]
    fn unclassified_images_are_dropped() {
        let s = extract(r#"<header><img alt="Site logo"></header>"#);
        assert!(s.seeds.is_empty() && s.gears.is_empty() && s.eggs.is_empty());
    }

    #[test]
    fn testid_hint_probe() {
        let s = extract(
            r#"<section data-testid="seed-stock-panel"><ul><li>Tulip Bulb</li></ul></section>"#,
        );
        assert_eq!(s.seeds, vec!["Tulip Bulb"]);
    }

    #[test]
    fn free_text_fallback_classifies_blocks() {
        let s = extract(
            r#"<p>Sunflower Seed Packet</p><p>Sturdy Garden Trowel</p>
               <p>x</p><p>Unrelated announcement text</p>"#,
        );
        assert_eq!(s.seeds, vec!["Sunflower Seed Packet"]);
        assert_eq!(s.gears, vec!["Sturdy Garden Trowel"]);
    }

    #[test]
    fn free_text_rejects_numbers_and_long_blocks() {
        let long = "seed ".repeat(30);
        let html = format!("<p>Seed count: 42</p><p>{long}</p>");
        let s = extract(&html);
        assert!(s.seeds.is_empty());
    }
}
