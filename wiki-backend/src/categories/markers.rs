//! Extract `[[Category:Name]]` membership markers from page bodies.
//!
//! `[[:Category:Name]]` (leading colon) is an ordinary link, not membership.
//! An optional `|sort key` is accepted and ignored.

use regex::Regex;
use std::sync::LazyLock;

static CATEGORY_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[\s*(:)?\s*(?i:category)\s*:([^\]|#]+)(?:#[^\]|]*)?(?:\|[^\]]*)?\]\]")
        .expect("category marker regex")
});

/// Categories a body declares membership in, normalized and deduplicated in first-seen order.
pub fn extract_categories(body: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for caps in CATEGORY_MARKER_RE.captures_iter(body) {
        if caps.get(1).is_some() {
            continue;
        }
        let Some(name) = caps.get(2).map(|m| normalize_title(m.as_str())) else {
            continue;
        };
        if !name.is_empty() && !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

/// Collapse whitespace runs to `_` so marker names match URL titles.
pub fn normalize_title(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join("_")
}
