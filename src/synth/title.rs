use std::sync::LazyLock;

use regex::Regex;

use super::rng;
use crate::lexicon::Lexicon;
use crate::parser::text::{clean_ws, uniq_keep_order};

static DISALLOWED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9 -]").unwrap());
static LEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^A-Za-z0-9]+").unwrap());
static HYPHEN_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").unwrap());
pub static VALID_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 -]*$").unwrap());

const FALLBACK: &str = "Product";
const WOMENS_FORMS: &[&str] = &["Women'S", "Women's", "women's", "Women\u{2019}s", "women\u{2019}s"];

/// Drop the brand: first as a `Brand -|–|:` prefix, then as a whole word.
pub fn remove_brand(title: &str, brand: &str) -> String {
    let t = clean_ws(title);
    let b = clean_ws(brand);
    if b.is_empty() {
        return t;
    }
    let escaped = regex::escape(&b);
    let mut t = t;
    if let Ok(prefix) = Regex::new(&format!(r"(?i)^\s*{}\s*[-–|:]\s*", escaped)) {
        t = prefix.replace(&t, "").trim().to_string();
    }
    if let Ok(word) = Regex::new(&format!(r"(?i)\b{}\b", escaped)) {
        t = word.replace_all(&t, "").trim().to_string();
    }
    clean_ws(&t)
}

fn core_type(low: &str, lexicon: &Lexicon) -> &'static str {
    if lexicon.heel_keywords.iter().any(|k| low.contains(k)) {
        if low.contains("pump") {
            "Pumps"
        } else if low.contains("sandal") {
            "Heeled Sandals"
        } else {
            "Heels"
        }
    } else if low.contains("jumpsuit") {
        "Jumpsuit"
    } else if ["maxi", "gown", "long"].iter().any(|k| low.contains(k)) {
        "Maxi Dress"
    } else {
        "Dress"
    }
}

/// Search-friendly title: `Womens <type>` plus up to six descriptors found in
/// the source title, in a per-product shuffled order.
pub fn rewrite(asin: &str, original: &str, brand: &str, category: &str, lexicon: &Lexicon) -> String {
    let base = remove_brand(original, brand);
    let low = base.to_lowercase();

    let found = lexicon
        .descriptors
        .iter()
        .filter(|kw| low.contains(*kw))
        .map(|kw| lexicon.descriptor_display(kw));
    let core = core_type(&low, lexicon);
    // "Maxi" is already part of "Maxi Dress"
    let mut tokens: Vec<String> = uniq_keep_order(found)
        .into_iter()
        .filter(|t| !core.split(' ').any(|w| w == t.as_str()))
        .collect();

    let key = format!("{}:{}:{}", asin, base, category);
    rng::shuffle(&mut rng::seeded("title4:", &key), &mut tokens);
    tokens.truncate(lexicon.limits.title_token_cap);

    let mut title = format!("Womens {}", core);
    if !tokens.is_empty() {
        title.push(' ');
        title.push_str(&tokens.join(" "));
    }
    sanitize(&title, lexicon.limits.title_max_words)
}

/// Force a title into `^[A-Za-z0-9][A-Za-z0-9 -]*$` with at most `max_words`
/// words. Anything that cannot be saved becomes `Product`.
pub fn sanitize(title: &str, max_words: usize) -> String {
    let mut t = clean_ws(title).replace(['\u{2014}', ','], " ");
    for form in WOMENS_FORMS {
        t = t.replace(form, "Womens");
    }
    t = t.replace(['\'', '\u{2019}', '"'], "");

    let t = DISALLOWED_RE.replace_all(&t, " ");
    let t = clean_ws(&t);
    let t = LEADING_RE.replace(&t, "");
    let t = clean_ws(&t);
    let t = HYPHEN_RUN_RE.replace_all(&t, "-");

    let t = t.split_whitespace().take(max_words).collect::<Vec<_>>().join(" ");
    if VALID_TITLE_RE.is_match(&t) {
        t
    } else {
        FALLBACK.to_string()
    }
}
