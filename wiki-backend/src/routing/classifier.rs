//! Path classification
//!
//! Maps the fragment after `/title/` to the strategy used to resolve it.
//! Rules are checked in a fixed order and the first match wins, so a title
//! such as `Help:Foo:Bar` is a help page even though it also contains `:`.

use regex::Regex;
use std::sync::LazyLock;

/// Title served for `/` and for an empty fragment
pub const MAIN_PAGE: &str = "Main_page";

const HELP_PREFIX: &str = "Help:";
const RANDOM_PREFIX: &str = "Special:Random";
const SPECIAL_PREFIX: &str = "Special:";

/// Identifier grammar: a route prefix must be followed by at least one of these characters.
static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9'_-]+").expect("identifier regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteKind {
    HelpPage(String),
    RandomPage,
    SpecialPage(String),
    CategoryPage(String),
    DefaultPage(String),
}

/// Classify a path fragment. Pure and total: every input maps to exactly one kind.
pub fn classify(fragment: &str) -> RouteKind {
    if let Some(rest) = fragment.strip_prefix(HELP_PREFIX) {
        return RouteKind::HelpPage(rest.trim().to_string());
    }
    // Must precede the generic Special: rule or it would never match.
    if fragment.starts_with(RANDOM_PREFIX) {
        return RouteKind::RandomPage;
    }
    if let Some(rest) = fragment.strip_prefix(SPECIAL_PREFIX) {
        return RouteKind::SpecialPage(rest.trim().to_string());
    }
    if let Some((_, name)) = fragment.split_once(':') {
        return RouteKind::CategoryPage(name.trim().to_string());
    }
    if fragment.is_empty() {
        return RouteKind::DefaultPage(MAIN_PAGE.to_string());
    }
    RouteKind::DefaultPage(fragment.to_string())
}

/// Leading identifier of a path tail, or None when the tail breaks the route grammar.
pub fn route_identifier(tail: &str) -> Option<&str> {
    IDENTIFIER_RE.find(tail).map(|m| m.as_str())
}
