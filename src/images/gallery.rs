use std::collections::HashSet;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use super::url::{
    force_hd, image_key, is_description_image, is_product_image, normalize, upscale_resized,
    CANONICAL_MARKER,
};
use crate::lexicon::Lexicon;
use crate::parser::blob;
use crate::parser::document::SourceDocument;
use crate::parser::text::uniq_keep_order;

static SCRIPT_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://m\.media-amazon\.com/images/I/[A-Za-z0-9%._-]+\.(?:jpg|jpeg|png|webp)")
        .unwrap()
});

/// Description content scopes. The generic `img` scan is deliberately absent.
const DESCRIPTION_SCOPES: &[&str] = &[
    "#aplus_feature_div img",
    "#aplus3p_feature_div img",
    "#aplusBrandStory_feature_div img",
    "#aplus img",
    "div[id^='aplus'] img",
    ".aplus-v2 img",
    ".aplus-module img",
    ".aplus-module-wrapper img",
    "#productDescription img",
];

type GallerySource = fn(&SourceDocument, &Lexicon) -> Vec<String>;

/// Ordered gallery sources; the first non-empty one wins.
const GALLERY_SOURCES: &[GallerySource] = &[from_image_block, from_markup, from_og_image];

pub fn extract_gallery(doc: &SourceDocument, lexicon: &Lexicon) -> Vec<String> {
    GALLERY_SOURCES
        .iter()
        .map(|source| source(doc, lexicon))
        .find(|urls| !urls.is_empty())
        .unwrap_or_default()
}

/// Best URL of one image-block item: named sizes first, then the widest
/// entry of its `main` width map.
pub fn pick_best(item: &Value) -> Option<String> {
    for k in ["hiRes", "large", "lowRes"] {
        if let Some(u) = item.get(k).and_then(Value::as_str) {
            let u = u.trim();
            if !u.is_empty() {
                return Some(u.to_string());
            }
        }
    }

    let main = item.get("main")?.as_object()?;
    let mut best: Option<(i64, &str)> = None;
    for (width, v) in main {
        let Ok(w) = width.trim().parse::<i64>() else {
            continue;
        };
        let url = match v {
            Value::Array(arr) => arr.first().and_then(Value::as_str),
            other => other.as_str(),
        };
        if let Some(u) = url.filter(|u| !u.is_empty()) {
            if best.map_or(true, |(bw, _)| w > bw) {
                best = Some((w, u));
            }
        }
    }
    best.map(|(_, u)| u.to_string())
}

fn from_image_block(doc: &SourceDocument, _lexicon: &Lexicon) -> Vec<String> {
    let urls = blob::image_block_items(&doc.raw)
        .into_iter()
        .filter_map(|item| pick_best(&item))
        .map(|u| force_hd(&u));
    uniq_keep_order(urls)
}

fn from_markup(doc: &SourceDocument, lexicon: &Lexicon) -> Vec<String> {
    let mut raw = Vec::new();
    for img in doc.select_all("img") {
        if let Some(dynamic) = img.value().attr("data-a-dynamic-image") {
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(dynamic) {
                raw.extend(map.keys().cloned());
            }
        }
        if let Some(src) = img.value().attr("src").or_else(|| img.value().attr("data-src")) {
            raw.push(src.to_string());
        }
    }
    raw.extend(
        SCRIPT_IMAGE_RE
            .find_iter(&doc.raw)
            .map(|m| m.as_str().to_string()),
    );

    let hd = raw
        .iter()
        .map(|u| force_hd(u))
        .filter(|u| !u.is_empty() && is_product_image(u, lexicon));
    uniq_keep_order(hd)
}

fn from_og_image(doc: &SourceDocument, lexicon: &Lexicon) -> Vec<String> {
    doc.meta_property("og:image")
        .map(|u| force_hd(&u))
        .filter(|u| !u.is_empty() && is_product_image(u, lexicon))
        .into_iter()
        .collect()
}

/// Colour media carried by the string-quoted image payload.
#[derive(Debug, Default)]
pub struct ColorMedia {
    pub swatches: IndexMap<String, String>,
    pub images: IndexMap<String, Vec<String>>,
}

pub fn color_media(doc: &SourceDocument) -> ColorMedia {
    let mut media = ColorMedia::default();
    let Some(payload) = blob::image_block_payload(&doc.raw) else {
        return media;
    };
    let Some(by_color) = payload.get("colorImages").and_then(Value::as_object) else {
        return media;
    };

    for (color, items) in by_color {
        let Some(items) = items.as_array().filter(|a| !a.is_empty()) else {
            continue;
        };
        let mut imgs = Vec::new();
        for item in items.iter().filter(|i| i.is_object()) {
            let best = pick_best(item).unwrap_or_default();
            let hd = force_hd(&best);
            if !hd.is_empty() {
                imgs.push(hd);
            }
            if !media.swatches.contains_key(color) {
                let thumb = ["thumb", "large"]
                    .iter()
                    .find_map(|k| item.get(*k).and_then(Value::as_str))
                    .unwrap_or(&best);
                let thumb = normalize(thumb);
                if !thumb.is_empty() {
                    media.swatches.insert(color.clone(), thumb);
                }
            }
        }
        let imgs = uniq_keep_order(imgs);
        if !imgs.is_empty() {
            media.images.insert(color.clone(), imgs);
        }
    }
    media
}

/// Hero first, then each colour's first image, then the rest of the gallery,
/// then every remaining colour image. Guarantees colour navigation targets.
pub fn merge_color_images(
    gallery: &[String],
    color_images: &IndexMap<String, Vec<String>>,
    cap: usize,
) -> Vec<String> {
    if color_images.is_empty() {
        return gallery.iter().take(cap).cloned().collect();
    }
    let base = uniq_keep_order(gallery.iter().cloned());
    let firsts = color_images.values().filter_map(|v| v.first());
    let rest = color_images.values().flatten();

    let ordered = base
        .iter()
        .take(1)
        .chain(firsts)
        .chain(base.iter().skip(1))
        .chain(rest)
        .cloned();
    let mut merged = uniq_keep_order(ordered);
    merged.truncate(cap);
    merged
}

/// Colour → content key, kept only when the key resolves to a gallery image.
pub fn color_image_keys(
    gallery: &[String],
    color_images: &IndexMap<String, Vec<String>>,
    swatches: &IndexMap<String, String>,
) -> IndexMap<String, String> {
    let gallery_keys: HashSet<String> = gallery.iter().map(|u| image_key(u)).collect();
    let mut keys = IndexMap::new();

    for (color, imgs) in color_images {
        if let Some(first) = imgs.first() {
            let k = image_key(first);
            if gallery_keys.contains(&k) {
                keys.insert(color.clone(), k);
            }
        }
    }
    for (color, swatch) in swatches {
        if keys.contains_key(color) {
            continue;
        }
        let k = image_key(swatch);
        if gallery_keys.contains(&k) {
            keys.insert(color.clone(), k);
        }
    }
    keys
}

/// Images from description content only, HD where the convention allows.
pub fn description_candidates(doc: &SourceDocument, lexicon: &Lexicon) -> Vec<String> {
    let mut urls = Vec::new();
    for scope in DESCRIPTION_SCOPES {
        for img in doc.select_all(scope) {
            let attr = |k| img.value().attr(k).filter(|s: &&str| !s.is_empty());
            let src = attr("data-src")
                .or_else(|| attr("data-lazy-src"))
                .or_else(|| attr("src"))
                .unwrap_or("");
            let src = upscale_resized(src);
            if src.is_empty() || !is_description_image(&src, lexicon) {
                continue;
            }
            if src.contains(CANONICAL_MARKER) {
                urls.push(force_hd(&src));
            } else {
                urls.push(src);
            }
        }
    }
    let mut urls = uniq_keep_order(urls);
    urls.truncate(lexicon.limits.description_image_cap);
    urls
}

/// Remove anything the gallery already shows.
pub fn separate_from_gallery(candidates: Vec<String>, gallery: &[String]) -> Vec<String> {
    let shown: HashSet<String> = gallery.iter().map(|u| normalize(u)).collect();
    candidates
        .into_iter()
        .filter(|u| !shown.contains(&normalize(u)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    fn img(id: &str) -> String {
        format!("https://m.media-amazon.com/images/I/{}._SL1500_.jpg", id)
    }

    #[test]
    fn best_prefers_named_sizes() {
        let item = json!({"large": "L", "hiRes": "H"});
        assert_eq!(pick_best(&item).as_deref(), Some("H"));
        let item = json!({"hiRes": null, "main": {"300": ["a", 1], "1500": ["b"], "x": ["c"]}});
        assert_eq!(pick_best(&item).as_deref(), Some("b"));
        assert!(pick_best(&json!({})).is_none());
    }

    #[test]
    fn merge_puts_color_firsts_after_hero() {
        let gallery = vec![img("A"), img("B"), img("C")];
        let mut colors = IndexMap::new();
        colors.insert("Red".to_string(), vec![img("R1"), img("R2")]);
        colors.insert("Blue".to_string(), vec![img("B")]);
        let merged = merge_color_images(&gallery, &colors, 80);
        assert_eq!(merged, vec![img("A"), img("R1"), img("B"), img("C"), img("R2")]);
    }

    #[test]
    fn merge_respects_cap() {
        let gallery: Vec<String> = (0..100).map(|i| img(&format!("G{}", i))).collect();
        let mut colors = IndexMap::new();
        colors.insert("Red".to_string(), vec![img("R1")]);
        let merged = merge_color_images(&gallery, &colors, 80);
        assert_eq!(merged.len(), 80);
        assert_eq!(merged[1], img("R1"));
    }

    #[test]
    fn color_keys_only_for_gallery_assets() {
        let gallery = vec![img("A"), img("R1")];
        let mut colors = IndexMap::new();
        colors.insert("Red".to_string(), vec![img("R1")]);
        colors.insert("Green".to_string(), vec![img("MISSING")]);
        let mut swatches = IndexMap::new();
        swatches.insert(
            "Black".to_string(),
            "https://m.media-amazon.com/images/I/A._SS64_.jpg".to_string(),
        );
        let keys = color_image_keys(&gallery, &colors, &swatches);
        assert_eq!(keys.get("Red").map(String::as_str), Some("R1"));
        assert_eq!(keys.get("Black").map(String::as_str), Some("A"));
        assert!(!keys.contains_key("Green"));
    }

    #[test]
    fn description_excludes_gallery() {
        let gallery = vec![img("A")];
        let out = separate_from_gallery(vec![img("A"), img("D")], &gallery);
        assert_eq!(out, vec![img("D")]);
    }

    #[test]
    fn description_scope_ignores_gallery_markup() {
        let html = r#"<html><body>
            <div id="imgTagWrapperId"><img src="https://m.media-amazon.com/images/I/GAL._AC_SX679_.jpg"></div>
            <div id="aplus_feature_div">
              <img data-src="https://m.media-amazon.com/images/I/APL1._AC_SR300,300_.jpg">
              <img src="https://m.media-amazon.com/images/S/aplus-media/x__AC_SR166,182___.jpg">
              <img src="https://m.media-amazon.com/images/G/01/nav/logo.png">
            </div></body></html>"#;
        let doc = SourceDocument::from_text(Path::new("x.html"), html.to_string());
        let lex = Lexicon::default();
        let urls = description_candidates(&doc, &lex);
        assert_eq!(
            urls,
            vec![
                img("APL1"),
                "https://m.media-amazon.com/images/S/aplus-media/x__AC_SR1200,1200___.jpg"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn gallery_falls_back_to_markup() {
        let html = r#"<html><head></head>
            <body><img data-a-dynamic-image='{"https://m.media-amazon.com/images/I/DYN._AC_SY500_.jpg":[500,500]}'
                 src="https://m.media-amazon.com/images/I/DYN._AC_SY300_.jpg">
            <img src="https://m.media-amazon.com/images/I/icon-cart.png"></body></html>"#;
        let doc = SourceDocument::from_text(Path::new("x.html"), html.to_string());
        let gallery = extract_gallery(&doc, &Lexicon::default());
        assert_eq!(gallery, vec![img("DYN")]);
    }

    #[test]
    fn gallery_falls_back_to_og_image() {
        let html = r#"<html><head><meta property="og:image" content="//m.media-amazon.com/images/I/OG.jpg"></head><body></body></html>"#;
        let doc = SourceDocument::from_text(Path::new("x.html"), html.to_string());
        let gallery = extract_gallery(&doc, &Lexicon::default());
        assert_eq!(gallery, vec![img("OG")]);
    }
}
