use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::images::url::{normalize, MEDIA_HOST};
use crate::lexicon::Lexicon;
use crate::parser::blob;
use crate::parser::document::{select_first_in, text_of, SourceDocument};
use crate::parser::text::{clean_ws, uniq_keep_order};

static CLICK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^click to select\s*").unwrap());
static LADDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,2}(?:\.5)?$").unwrap());
static DEPARTMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"clothing\s*,?\s*shoes\s*&\s*jewelry").unwrap());

const COLOR_ITEMS: &str = "[id*='variation_color_name'] li, [id*='variation_color'] li";
const SIZE_ITEMS: &str = "[id*='variation_size_name'] li, [id*='variation_size'] li";
const SIZE_OPTIONS: &str = "select#native_dropdown_selected_size_name option";
const COLOR_OPTIONS: &str = "select#native_dropdown_selected_color_name option";

const MAX_SIZE_LABEL: usize = 30;
const MAX_COLOR_LABEL: usize = 40;
const LETTER_SIZES: &[&str] = &["XS", "S", "M", "L", "XL", "XXL", "2XL"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeChart {
    pub label: String,
    pub href: Option<String>,
    pub html: Option<String>,
}

impl SizeChart {
    fn new(href: Option<String>, html: Option<String>) -> Self {
        SizeChart {
            label: "Size chart".to_string(),
            href,
            html,
        }
    }
}

fn fits(s: &str, max: usize) -> bool {
    !s.is_empty() && s.chars().count() <= max
}

fn swatch_label(li: scraper::ElementRef<'_>) -> String {
    let raw = li
        .value()
        .attr("title")
        .or_else(|| li.value().attr("aria-label"))
        .unwrap_or("");
    let label = clean_ws(raw);
    CLICK_RE.replace(&label, "").trim().to_string()
}

/// Sizes and colours merged from list widgets, dropdowns and the embedded
/// dimension map, deduplicated and capped.
pub fn extract(doc: &SourceDocument, lexicon: &Lexicon) -> (Vec<String>, Vec<String>) {
    let mut sizes = Vec::new();
    let mut colors = Vec::new();

    for li in doc.select_all(COLOR_ITEMS) {
        let mut label = swatch_label(li);
        if label.is_empty() {
            label = text_of(li).unwrap_or_default();
        }
        if fits(&label, MAX_COLOR_LABEL) {
            colors.push(label);
        }
    }

    for li in doc.select_all(SIZE_ITEMS) {
        if let Some(t) = text_of(li).filter(|t| fits(t, MAX_SIZE_LABEL)) {
            sizes.push(t);
        }
    }

    let options = |css: &str, max: usize| -> Vec<String> {
        doc.select_all(css)
            .into_iter()
            .filter_map(text_of)
            .filter(|t| !t.to_lowercase().contains("select") && fits(t, max))
            .collect()
    };
    sizes.extend(options(SIZE_OPTIONS, MAX_SIZE_LABEL));
    colors.extend(options(COLOR_OPTIONS, MAX_COLOR_LABEL));

    if let Some(dims) = blob::dimension_values(&doc.raw) {
        for (name, values) in &dims {
            let Some(values) = values.as_array() else {
                continue;
            };
            let name = name.to_lowercase();
            for v in values {
                let v = match v {
                    Value::String(s) => clean_ws(s),
                    other => clean_ws(&other.to_string()),
                };
                if name.contains("size") && fits(&v, MAX_SIZE_LABEL) {
                    sizes.push(v.clone());
                }
                if name.contains("color") && fits(&v, MAX_COLOR_LABEL) {
                    colors.push(v);
                }
            }
        }
    }

    let mut sizes = uniq_keep_order(sizes);
    sizes.truncate(lexicon.limits.size_cap);
    let mut colors = uniq_keep_order(colors);
    colors.truncate(lexicon.limits.color_cap);
    (sizes, colors)
}

/// Colour label → swatch thumbnail from the colour list widget.
pub fn swatches(doc: &SourceDocument) -> IndexMap<String, String> {
    let mut out = IndexMap::new();
    for li in doc.select_all(COLOR_ITEMS) {
        let Some(img) = select_first_in(li, "img") else {
            continue;
        };
        let mut label = swatch_label(li);
        if label.is_empty() {
            label = clean_ws(img.value().attr("alt").unwrap_or(""));
        }
        let src = img
            .value()
            .attr("src")
            .or_else(|| img.value().attr("data-src"))
            .map(normalize)
            .unwrap_or_default();
        if !label.is_empty() && !src.is_empty() && src.contains(MEDIA_HOST) {
            out.insert(label, src);
        }
    }
    out
}

/// Six or more whole/half sizes, all within 4–14: a footwear size ladder.
pub fn looks_like_footwear_ladder(values: &[String]) -> bool {
    let mut nums = Vec::new();
    for v in values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        if !LADDER_RE.is_match(v) {
            return false;
        }
        match v.parse::<f64>() {
            Ok(n) => nums.push(n),
            Err(_) => return false,
        }
    }
    nums.len() >= 6 && nums.iter().all(|n| (4.0..=14.0).contains(n))
}

/// Drop footwear-looking sizes on apparel listings, then infer when empty.
pub fn correct_sizes(
    sizes: Vec<String>,
    title: &str,
    category: &str,
    lexicon: &Lexicon,
) -> Vec<String> {
    let title_low = title.to_lowercase();
    let cat_low = category.to_lowercase();

    if !sizes.is_empty() && looks_like_footwear_ladder(&sizes) {
        let apparel = lexicon.has_apparel_keyword(&title_low) || cat_low.contains("dress");
        let footwear = lexicon.has_footwear_keyword(&title_low);
        if apparel && !footwear {
            return to_owned(lexicon.apparel_sizes);
        }
    }
    if sizes.is_empty() {
        return infer_sizes(&title_low, &cat_low, lexicon);
    }
    sizes
}

/// Size bucket from title keywords; the category only counts for footwear
/// and never through the generic department breadcrumb.
fn infer_sizes(title_low: &str, cat_low: &str, lexicon: &Lexicon) -> Vec<String> {
    if lexicon.has_apparel_keyword(title_low) {
        return to_owned(lexicon.apparel_sizes);
    }
    if lexicon.has_footwear_keyword(title_low) {
        return to_owned(lexicon.footwear_sizes);
    }
    if (cat_low.contains("shoe") || cat_low.contains("footwear")) && !DEPARTMENT_RE.is_match(cat_low)
    {
        return to_owned(lexicon.footwear_sizes);
    }
    vec![lexicon.generic_size.to_string()]
}

fn to_owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

type ChartStrategy = fn(&SourceDocument) -> Option<SizeChart>;

const CHART_STRATEGIES: &[ChartStrategy] = &[chart_from_popover, chart_from_link];

const CHART_IDS: &[&str] = &["size-chart", "sizeChart", "sizechart", "size_chart", "sizeChartModal"];

/// Size chart from the page, or the apparel table when the page has none
/// and the sizes are letter sizes.
pub fn size_chart(doc: &SourceDocument, sizes: &[String], lexicon: &Lexicon) -> Option<SizeChart> {
    let found = CHART_STRATEGIES.iter().find_map(|s| s(doc));
    let has_html = found.as_ref().is_some_and(|c| c.html.is_some());
    if !has_html && sizes.iter().any(|s| LETTER_SIZES.contains(&s.as_str())) {
        return Some(SizeChart::new(None, Some(lexicon.fallback_size_chart.to_string())));
    }
    found
}

fn chart_from_popover(doc: &SourceDocument) -> Option<SizeChart> {
    let pop = doc.select_first("#a-popover-sizeGuide")?;
    if let Some(tbl) = select_first_in(pop, "table").or_else(|| select_first_in(pop, "div.sizing-chart")) {
        return Some(SizeChart::new(
            Some("javascript:void(0)".to_string()),
            Some(tbl.html()),
        ));
    }
    let img = select_first_in(pop, "img")?;
    let src = img
        .value()
        .attr("src")
        .or_else(|| img.value().attr("data-src"))
        .map(normalize)
        .filter(|s| !s.is_empty())?;
    Some(SizeChart::new(Some(src), None))
}

fn chart_from_link(doc: &SourceDocument) -> Option<SizeChart> {
    let link = doc
        .select_all("a")
        .into_iter()
        .find(|a| text_of(*a).is_some_and(|t| t.to_lowercase().contains("size chart")))?;
    let attr = |k: &str| link.value().attr(k).map(str::trim).filter(|s| !s.is_empty());

    let href = attr("href").map(|h| {
        if h.starts_with('/') {
            format!("https://www.amazon.com{}", h)
        } else {
            h.to_string()
        }
    });

    let content_id = attr("data-a-popover")
        .or_else(|| attr("data-action"))
        .filter(|p| p.starts_with('{'))
        .and_then(|p| serde_json::from_str::<Value>(p).ok())
        .and_then(|v| {
            ["content", "contentId", "content_id"]
                .iter()
                .find_map(|k| v.get(*k).and_then(Value::as_str).map(str::to_string))
        })
        .or_else(|| {
            attr("data-a-popover-content")
                .or_else(|| attr("data-popover-content"))
                .map(str::to_string)
        });

    let mut ids = Vec::new();
    if let Some(id) = content_id.filter(|id| !id.contains('"')) {
        ids.push(id.clone());
        ids.push(format!("a-popover-content-{}", id));
    }
    ids.extend(CHART_IDS.iter().map(|s| s.to_string()));

    let html = ids
        .iter()
        .find_map(|id| doc.select_first(&format!("[id=\"{}\"]", id)))
        .map(|el| el.html());

    if href.is_none() && html.is_none() {
        return None;
    }
    Some(SizeChart::new(href, html))
}
