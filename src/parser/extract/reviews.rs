use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;
use serde::Serialize;

use super::{first_success, Strategy};
use crate::images::url::{force_hd, normalize, CANONICAL_MARKER};
use crate::parser::document::{select_first_in, select_in, text_of, SourceDocument};
use crate::parser::text::{clean_ws, strip_marketplace_words, uniq_keep_order};

static RATING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9](?:\.[0-9])?)").unwrap());
static COUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)").unwrap());
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bon\b\s*(.+)$").unwrap());
static SAYS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)customers\s+say").unwrap());
static SAYS_LEAD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bcustomers\s+say\b\s*").unwrap());
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*Customers\s+say\s*$").unwrap());
static AI_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bAI\s+Generated\b[^.]*\.?\s*").unwrap());
static GENERATED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bGenerated\s+from\s+the\s+text\s+of\s+customer\s+reviews\b\.?\s*").unwrap()
});
static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b\d+\s+customers\s+mention[^.]*\.?\s*").unwrap());
static SENTENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(Customers[^.]{20,260}\.)").unwrap());

const REVIEW_BLOCKS: &str = r#"div[data-hook="review"], div[id^="customer_review-"]"#;
const SUMMARY_WIDGETS: &str = "#cr-lighthouse-terms, #cr-summarization-attributes, \
    #cr-summarization-attributes-v2, [data-hook='cr-insights-widget'], \
    [data-hook='cr-summarization-widget'], [data-hook='cr-insights-widget-summary']";
const REVIEW_IMAGES: &str = r#"[data-hook="review-image-tile"] img, img[data-hook="review-image-tile"], .review-image-tile img, .review-image-container img"#;
const REVIEW_IMAGE_CAP: usize = 12;

const CUSTOMERS_SAY_STRATEGIES: &[Strategy<String>] = &[say_from_widgets, say_from_insight_card];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    pub title: String,
    pub body: String,
    pub author: String,
    pub rating: f64,
    pub date: String,
    pub verified: bool,
    pub images: Vec<String>,
}

/// Review blocks, cleaned of marketplace boilerplate, deduplicated on
/// (title, body, images) and capped.
pub fn extract(doc: &SourceDocument, cap: usize) -> Vec<Review> {
    let mut seen = HashSet::new();
    doc.select_all(REVIEW_BLOCKS)
        .into_iter()
        .filter_map(parse_block)
        .filter(|r| seen.insert((r.title.clone(), r.body.clone(), r.images.clone())))
        .take(cap)
        .collect()
}

fn first_text(el: ElementRef<'_>, selectors: &[&str]) -> Option<String> {
    selectors
        .iter()
        .find_map(|css| select_first_in(el, css).and_then(text_of))
}

fn parse_block(block: ElementRef<'_>) -> Option<Review> {
    let title = first_text(block, &[r#"[data-hook="review-title"]"#]).unwrap_or_else(|| "Review".into());
    let body = first_text(block, &[r#"[data-hook="review-body"]"#]).unwrap_or_default();
    let author = first_text(block, &[".a-profile-name"]).unwrap_or_default();
    let rating_text = first_text(
        block,
        &[
            r#"[data-hook="review-star-rating"]"#,
            r#"[data-hook="cmps-review-star-rating"]"#,
            "i.a-icon-star span.a-icon-alt",
        ],
    )
    .unwrap_or_default();
    let date_text = first_text(block, &[r#"[data-hook="review-date"]"#]).unwrap_or_default();
    let verified = select_first_in(
        block,
        r#"[data-hook="avp-badge"], [data-hook="verified-purchase-badge"]"#,
    )
    .is_some();

    let images = select_in(block, REVIEW_IMAGES)
        .into_iter()
        .filter_map(|im| im.value().attr("data-src").or_else(|| im.value().attr("src")))
        .map(normalize)
        .filter(|s| s.contains(CANONICAL_MARKER))
        .map(|s| force_hd(&s));
    let mut images = uniq_keep_order(images);
    images.truncate(REVIEW_IMAGE_CAP);

    let rating = RATING_RE
        .captures(&rating_text)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(0.0);

    let title = strip_marketplace_words(&title);
    let body = strip_marketplace_words(&body);
    let placeholder = author.eq_ignore_ascii_case("amazon customer");
    let mut author = strip_marketplace_words(&author);
    if author.is_empty() || placeholder {
        author = if verified { "Verified customer" } else { "Customer" }.to_string();
    }

    let date = if date_text.is_empty() {
        String::new()
    } else {
        let tail = DATE_RE
            .captures(&date_text)
            .map(|c| c[1].to_string())
            .unwrap_or(date_text);
        strip_marketplace_words(&tail)
    };

    if title.is_empty() && body.is_empty() {
        return None;
    }
    Some(Review {
        title,
        body,
        author,
        rating,
        date,
        verified,
        images,
    })
}

/// Star average and total review count from the summary widgets.
pub fn summary(doc: &SourceDocument) -> (Option<f64>, Option<u32>) {
    let avg = doc
        .select_first("#acrPopover span.a-icon-alt, i.a-icon-star span.a-icon-alt")
        .and_then(text_of)
        .and_then(|t| RATING_RE.captures(&t).and_then(|c| c[1].parse().ok()));
    let count = doc
        .select_first("#acrCustomerReviewText, [data-hook='total-review-count']")
        .and_then(text_of)
        .and_then(|t| {
            let t = t.replace(',', "");
            COUNT_RE.captures(&t).and_then(|c| c[1].parse().ok())
        });
    (avg, count)
}

/// One short paragraph of aggregated review sentiment.
pub fn customers_say(doc: &SourceDocument) -> Option<String> {
    first_success(doc, CUSTOMERS_SAY_STRATEGIES)
}

fn within(s: &str, lo: usize, hi: usize) -> bool {
    (lo..=hi).contains(&s.chars().count())
}

fn say_from_widgets(doc: &SourceDocument) -> Option<String> {
    doc.select_all(SUMMARY_WIDGETS).into_iter().find_map(|el| {
        let t = text_of(el)?;
        if !SAYS_RE.is_match(&t) {
            return None;
        }
        let t = SAYS_LEAD_RE.replace_all(&t, "");
        let t = strip_marketplace_words(t.trim());
        if !within(&t, 40, 500) {
            return None;
        }
        Some(t.chars().take(420).collect::<String>().trim_end().to_string())
    })
}

fn say_from_insight_card(doc: &SourceDocument) -> Option<String> {
    let root = doc.html.tree.root();
    let needle = root.descendants().find(|n| {
        n.value()
            .as_text()
            .is_some_and(|t| HEADING_RE.is_match(t))
    })?;
    let heading = needle.parent()?;

    let overall = root
        .descendants()
        .skip_while(|n| n.id() != heading.id())
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().attr("data-testid") == Some("overall-summary"));
    let scope = overall.or_else(|| heading.parent().and_then(ElementRef::wrap))?;

    let raw = strip_marketplace_words(&text_of(scope)?);
    let raw = AI_LINE_RE.replace_all(&raw, "");
    let raw = GENERATED_RE.replace_all(raw.trim(), "");
    let raw = MENTION_RE.replace_all(raw.trim(), "");
    let raw = clean_ws(&raw);

    let mut seen = HashSet::new();
    let sentences: Vec<String> = SENTENCE_RE
        .find_iter(&raw)
        .map(|m| clean_ws(m.as_str()))
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .take(3)
        .collect();
    if !sentences.is_empty() {
        let out = clean_ws(&sentences.join(" "));
        if within(&out, 40, 420) {
            return Some(out);
        }
    }

    let rest = SAYS_LEAD_RE.replace_all(&raw, "").trim().to_string();
    within(&rest, 40, 420).then_some(rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn doc(body: &str) -> SourceDocument {
        SourceDocument::from_text(Path::new("x.html"), body.to_string())
    }

    #[test]
    fn review_blocks_cleaned() {
        let d = doc(r#"
            <div data-hook="review">
              <a data-hook="review-title"><span>Love it</span></a>
              <i data-hook="review-star-rating"><span>5.0 out of 5 stars</span></i>
              <span class="a-profile-name">Amazon Customer</span>
              <span data-hook="review-date">Reviewed in the United States on March 3, 2024</span>
              <span data-hook="avp-badge">Verified Purchase</span>
              <span data-hook="review-body">Fits great. Verified Purchase</span>
              <div class="review-image-tile"><img src="https://m.media-amazon.com/images/I/REV1._SY88_.jpg"></div>
            </div>
            <div data-hook="review">
              <a data-hook="review-title"><span>Love it</span></a>
              <span data-hook="review-body">Fits great.</span>
              <div class="review-image-tile"><img src="https://m.media-amazon.com/images/I/REV1._SY88_.jpg"></div>
            </div>
            <div id="customer_review-R2"><span class="a-profile-name">Dana</span>
              <span data-hook="review-body">Runs small.</span></div>"#);
        let reviews = extract(&d, 12);
        assert_eq!(reviews.len(), 2);

        let r = &reviews[0];
        assert_eq!(r.title, "Love it");
        assert_eq!(r.body, "Fits great.");
        assert_eq!(r.author, "Verified customer");
        assert_eq!(r.rating, 5.0);
        assert_eq!(r.date, "March 3, 2024");
        assert!(r.verified);
        assert_eq!(r.images, vec!["https://m.media-amazon.com/images/I/REV1._SL1500_.jpg"]);

        assert_eq!(reviews[1].title, "Review");
        assert_eq!(reviews[1].author, "Dana");
        assert_eq!(reviews[1].rating, 0.0);
    }

    #[test]
    fn summary_values() {
        let d = doc(r#"<span id="acrPopover"><span class="a-icon-alt">4.3 out of 5 stars</span></span>
            <span id="acrCustomerReviewText">1,287 ratings</span>"#);
        assert_eq!(summary(&d), (Some(4.3), Some(1287)));
        assert_eq!(summary(&doc("<p></p>")), (None, None));
    }

    #[test]
    fn customers_say_widget() {
        let d = doc(r#"<div id="cr-summarization-attributes">Customers say the fabric is soft
            and the dress drapes nicely, though some find the length long.</div>"#);
        let t = customers_say(&d).unwrap();
        assert!(t.starts_with("the fabric is soft"));
    }

    #[test]
    fn customers_say_insight_card() {
        let d = doc(r#"<div><div><h3>Customers say</h3></div>
            <div data-testid="overall-summary"><p>Customers like the fit and find the fabric comfortable for long events.
            Customers mention the color matches the photos well. 12 customers mention "quality".
            AI Generated from the text of customer reviews</p></div></div>"#);
        let t = customers_say(&d).unwrap();
        assert_eq!(
            t,
            "Customers like the fit and find the fabric comfortable for long events. \
             Customers mention the color matches the photos well."
        );
    }

    #[test]
    fn customers_say_absent() {
        assert!(customers_say(&doc("<p>Customers say</p>")).is_none());
    }
}
