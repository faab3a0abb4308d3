use std::sync::LazyLock;

use regex::Regex;

use crate::parser::document::{text_of, SourceDocument};
use crate::parser::text::{clean_ws, slugify};

static CHEVRON_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*›\s*").unwrap());
static SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*>\s*").unwrap());

const BREADCRUMBS: &str = "#wayfinding-breadcrumbs_feature_div, #wayfinding-breadcrumbs_container";

/// Breadcrumb trail as `A > B > C`, or empty.
pub fn extract(doc: &SourceDocument) -> String {
    doc.select_first(BREADCRUMBS)
        .and_then(text_of)
        .map(|t| CHEVRON_RE.replace_all(&t, " > ").into_owned())
        .unwrap_or_default()
}

/// Breadcrumb segments with adjacent repeats collapsed (case-insensitive).
pub fn path(category: &str) -> Vec<String> {
    if category.is_empty() {
        return Vec::new();
    }
    let t = category.replace('›', ">");
    let mut out: Vec<String> = Vec::new();
    for seg in SEGMENT_RE.split(&t).map(clean_ws).filter(|s| !s.is_empty()) {
        if out.last().is_some_and(|last| last.to_lowercase() == seg.to_lowercase()) {
            continue;
        }
        out.push(seg);
    }
    out
}

pub fn slug(path: &[String]) -> String {
    path.iter().map(|p| slugify(p)).collect::<Vec<_>>().join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn breadcrumb_text() {
        let html = r#"<div id="wayfinding-breadcrumbs_feature_div"><ul>
            <li><a>Clothing, Shoes &amp; Jewelry</a></li><li>›</li>
            <li><a>Women</a></li><li>›</li><li><a>Dresses</a></li></ul></div>"#;
        let doc = SourceDocument::from_text(Path::new("x.html"), html.to_string());
        assert_eq!(extract(&doc), "Clothing, Shoes & Jewelry > Women > Dresses");
    }

    #[test]
    fn path_collapses_repeats() {
        let p = path("Women > women > Dresses › Dresses > Casual");
        assert_eq!(p, vec!["Women", "Dresses", "Casual"]);
        assert!(path("").is_empty());
    }

    #[test]
    fn slug_joins_segments() {
        let p = path("Clothing, Shoes & Jewelry > Women > Dresses");
        assert_eq!(slug(&p), "clothing-shoes-jewelry/women/dresses");
        assert_eq!(slug(&[]), "");
    }
}
