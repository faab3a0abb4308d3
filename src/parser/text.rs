use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NON_SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());
static CUSTOMER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bAmazon\s+Customer\b").unwrap());
static VERIFIED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bVerified\s+Purchase\b").unwrap());
static AI_SUMMARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bAI\s*[- ]?\s*Generated\s+from\s+the\s+text\s+of\s+customer\s+reviews\b\.?")
        .unwrap()
});
static AI_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bAI\s*[- ]?\s*Generated\b\.?").unwrap());

/// Collapse every whitespace run to one space and trim.
pub fn clean_ws(s: &str) -> String {
    WS_RE.replace_all(s, " ").trim().to_string()
}

/// Drop empty strings and exact duplicates, keeping the first occurrence.
pub fn uniq_keep_order<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    items.into_iter().filter(|s| !s.is_empty()).unique().collect()
}

pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

pub fn slugify(s: &str) -> String {
    let lower = s.to_lowercase();
    let slug = NON_SLUG_RE.replace_all(&lower, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "product".to_string()
    } else {
        slug.to_string()
    }
}

/// Remove marketplace boilerplate from user-facing snippets.
pub fn strip_marketplace_words(s: &str) -> String {
    let t = clean_ws(s);
    if t.is_empty() {
        return t;
    }
    let t = CUSTOMER_RE.replace_all(&t, "Customer");
    let t = VERIFIED_RE.replace_all(&t, "");
    let t = AI_SUMMARY_RE.replace_all(&t, "");
    let t = AI_TAG_RE.replace_all(&t, "");
    clean_ws(&t)
}
