//! Slug normalization for user-supplied competitive-unit selectors.

use std::sync::LazyLock;

use regex::Regex;

static NON_ALPHANUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("valid regex"));

/// Collapse every run of non-alphanumeric characters into a single `-`
/// and lowercase the result.
///
/// Leading and trailing separators are kept, so `"Any% (NMG)"` becomes
/// `"any-nmg-"`.
pub fn slugify(name: &str) -> String {
    NON_ALPHANUMERIC_RE
        .replace_all(name, "-")
        .to_lowercase()
}
