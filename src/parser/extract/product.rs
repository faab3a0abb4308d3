use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use super::{first_success, Strategy};
use crate::parser::document::{select_first_in, text_of, SourceDocument};
use crate::parser::text::{clean_ws, uniq_keep_order};

static BRAND_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^brand:\s*").unwrap());
static VISIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^visit\s+the\s+").unwrap());
static STORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\s+store\s*$").unwrap());
static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+(?:\.[0-9]{1,2})?)").unwrap());

const TITLE_STRATEGIES: &[Strategy<String>] = &[title_from_heading, title_from_og];

const PRICE_SELECTORS: &[&str] = &[
    "#priceToPay span.a-offscreen",
    "span.a-price span.a-offscreen",
    "#corePrice_feature_div span.a-offscreen",
];

const SPEC_TABLE_ROWS: &str =
    "#productDetails_techSpec_section_1 tr, #productDetails_detailBullets_sections1 tr";
const SPEC_BULLETS: &str = "#detailBullets_feature_div li";

pub fn title(doc: &SourceDocument) -> String {
    first_success(doc, TITLE_STRATEGIES).unwrap_or_default()
}

fn title_from_heading(doc: &SourceDocument) -> Option<String> {
    doc.select_first("#productTitle").and_then(text_of)
}

fn title_from_og(doc: &SourceDocument) -> Option<String> {
    doc.meta_property("og:title")
}

/// Byline text reduced to the bare brand ("Visit the X Store" → "X").
pub fn brand(doc: &SourceDocument) -> String {
    let Some(t) = doc
        .select_first("#bylineInfo, #brand, #bylineInfo_feature_div #bylineInfo")
        .and_then(text_of)
    else {
        return String::new();
    };
    let t = BRAND_LABEL_RE.replace(&t, "");
    let t = VISIT_RE.replace(t.trim(), "");
    let t = STORE_RE.replace(t.trim(), "");
    clean_ws(&t)
}

pub fn price(doc: &SourceDocument) -> Option<f64> {
    PRICE_SELECTORS.iter().find_map(|sel| {
        let text = doc.select_first(sel).and_then(text_of)?;
        parse_price(&text)
    })
}

/// First amount in a price label, thousands separators ignored.
pub fn parse_price(text: &str) -> Option<f64> {
    let digits = text.replace(',', "");
    PRICE_RE
        .captures(&digits)
        .and_then(|c| c[1].parse::<f64>().ok())
}

pub fn bullets(doc: &SourceDocument, cap: usize) -> Vec<String> {
    let items = doc
        .select_all("#feature-bullets ul li span")
        .into_iter()
        .filter_map(text_of)
        .filter(|t| t.chars().count() >= 4);
    let mut out = uniq_keep_order(items);
    out.truncate(cap);
    out
}

/// Spec rows from the detail tables, then `Key : Value` detail bullets.
/// The first value seen for a key is kept.
pub fn specs(doc: &SourceDocument) -> IndexMap<String, String> {
    let mut out = IndexMap::new();

    for tr in doc.select_all(SPEC_TABLE_ROWS) {
        let key = select_first_in(tr, "th").and_then(text_of).map(|s| strip_marks(&s));
        let value = select_first_in(tr, "td").and_then(text_of).map(|s| strip_marks(&s));
        if let (Some(k), Some(v)) = (key, value) {
            if !k.is_empty() && !v.is_empty() {
                out.entry(k).or_insert(v);
            }
        }
    }

    for li in doc.select_all(SPEC_BULLETS) {
        let Some(t) = text_of(li) else { continue };
        let Some((k, v)) = t.split_once(':') else {
            continue;
        };
        let (k, v) = (strip_marks(k), strip_marks(v));
        if !k.is_empty() && !v.is_empty() {
            out.entry(k).or_insert(v);
        }
    }
    out
}

/// Drop bidi control marks the detail widgets pad labels with.
fn strip_marks(s: &str) -> String {
    clean_ws(&s.replace(['\u{200e}', '\u{200f}'], " "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn doc(body: &str) -> SourceDocument {
        SourceDocument::from_text(Path::new("x.html"), body.to_string())
    }

    #[test]
    fn title_prefers_heading() {
        let d = doc(r#"<head><meta property="og:title" content="OG Title"></head>
            <body><span id="productTitle">  Blue  Maxi Dress </span></body>"#);
        assert_eq!(title(&d), "Blue Maxi Dress");
    }

    #[test]
    fn title_falls_back_to_og() {
        let d = doc(r#"<head><meta property="og:title" content="OG Title"></head><body></body>"#);
        assert_eq!(title(&d), "OG Title");
        assert_eq!(title(&doc("<p>none</p>")), "");
    }

    #[test]
    fn brand_byline_forms() {
        let d = doc(r#"<a id="bylineInfo">Visit the SAMPEEL Store</a>"#);
        assert_eq!(brand(&d), "SAMPEEL");
        let d = doc(r#"<a id="bylineInfo">Brand: Lulus</a>"#);
        assert_eq!(brand(&d), "Lulus");
        assert_eq!(brand(&doc("<p></p>")), "");
    }

    #[test]
    fn price_chain() {
        let d = doc(r#"<div id="corePrice_feature_div"><span class="a-offscreen">$1,249.99</span></div>"#);
        assert_eq!(price(&d), Some(1249.99));
        let d = doc(r#"<span class="a-price"><span class="a-offscreen">See price</span></span>
            <div id="corePrice_feature_div"><span class="a-offscreen">$35.5</span></div>"#);
        assert_eq!(price(&d), Some(35.5));
        assert_eq!(price(&doc("<p>$3</p>")), None);
    }

    #[test]
    fn price_fraction_limited_to_two_digits() {
        assert_eq!(parse_price("USD 19.999"), Some(19.99));
        assert_eq!(parse_price("free"), None);
    }

    #[test]
    fn bullets_dedup_and_min_length() {
        let d = doc(r#"<div id="feature-bullets"><ul>
            <li><span>Soft stretch fabric</span></li>
            <li><span>abc</span></li>
            <li><span>Soft stretch fabric</span></li>
            <li><span>Hidden zipper</span></li></ul></div>"#);
        assert_eq!(bullets(&d, 24), vec!["Soft stretch fabric", "Hidden zipper"]);
    }

    #[test]
    fn specs_tables_then_bullets() {
        let d = doc(
            "<table id=\"productDetails_techSpec_section_1\">\
               <tr><th>Fabric type</th><td>95% Polyester, 5% Spandex</td></tr>\
               <tr><th>Empty</th><td></td></tr></table>\
             <div id=\"detailBullets_feature_div\"><ul>\
               <li>Care instructions \u{200f}:\u{200e} Hand Wash Only</li>\
               <li>Fabric type : Cotton</li>\
               <li>No separator here</li></ul></div>",
        );
        let s = specs(&d);
        assert_eq!(s.get("Fabric type").map(String::as_str), Some("95% Polyester, 5% Spandex"));
        assert_eq!(s.get("Care instructions").map(String::as_str), Some("Hand Wash Only"));
        assert_eq!(s.len(), 2);
    }
}
