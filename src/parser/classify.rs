/// Shop category a candidate item can land in. Ordering of `ALL` is the
/// tie-break: a candidate mentioning both "seed" and "egg" is a seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Seed,
    Gear,
    Egg,
}

impl Category {
    /// Priority order for classification (first match wins).
    pub const ALL: [Category; 3] = [Category::Seed, Category::Gear, Category::Egg];

    /// Keyword used by the structural selector scan (headings, class hints).
    pub fn keyword(self) -> &'static str {
        match self {
            Category::Seed => "seed",
            Category::Gear => "gear",
            Category::Egg => "egg",
        }
    }

    fn indicators(self) -> &'static [&'static str] {
        match self {
            Category::Seed => SEED_INDICATORS,
            Category::Gear => GEAR_INDICATORS,
            Category::Egg => EGG_INDICATORS,
        }
    }
}

// Substring indicators, matched case-insensitively. Deliberately permissive:
// a false positive lands in the wrong list, a false negative drops the item.
const SEED_INDICATORS: &[&str] = &["seed", "berry", "fruit", "plant"];
const GEAR_INDICATORS: &[&str] = &[
    "gear",
    "tool",
    "sprinkler",
    "trowel",
    "watering",
    "wrench",
    "favorite",
];
const EGG_INDICATORS: &[&str] = &["egg", "pet"];

/// Candidate item plus the text of its surrounding containers. Built per
/// candidate during one extraction pass, never stored.
pub struct ClassifyContext<'a> {
    pub label: &'a str,
    pub immediate: &'a str,
    pub outer: &'a str,
}

/// Assign a candidate to a category, or `None` when nothing matches
/// (the item is then silently dropped).
pub fn classify(ctx: &ClassifyContext) -> Option<Category> {
    let label = ctx.label.to_lowercase();
    let immediate = ctx.immediate.to_lowercase();
    let outer = ctx.outer.to_lowercase();

    Category::ALL.into_iter().find(|cat| {
        cat.indicators()
            .iter()
            .any(|ind| label.contains(ind) || immediate.contains(ind) || outer.contains(ind))
    })
}

/// Same indicator tables applied to a single piece of text, no context
/// separation. Used by the free-text fallback.
pub fn classify_text(text: &str) -> Option<Category> {
    let lower = text.to_lowercase();
    Category::ALL
        .into_iter()
        .find(|cat| cat.indicators().iter().any(|ind| lower.contains(ind)))
}

// ── Tests ──
