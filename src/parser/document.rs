use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::text::clean_ws;
use crate::error::PipelineError;

static FILE_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b([A-Z0-9]{10})\b").unwrap());
static BODY_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""asin"\s*:\s*"([A-Z0-9]{10})""#).unwrap());

/// One captured product page: raw text plus its parsed tree.
pub struct SourceDocument {
    pub path: PathBuf,
    pub raw: String,
    pub html: Html,
}

impl SourceDocument {
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let bytes = std::fs::read(path).map_err(|source| PipelineError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let raw = String::from_utf8_lossy(&bytes).into_owned();
        Ok(Self::from_text(path, raw))
    }

    pub fn from_text(path: &Path, raw: String) -> Self {
        let html = Html::parse_document(&raw);
        SourceDocument {
            path: path.to_path_buf(),
            raw,
            html,
        }
    }

    /// Product identifier from the file name, else from an embedded field.
    pub fn identifier(&self) -> Option<String> {
        let from_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| FILE_ID_RE.captures(n))
            .map(|c| c[1].to_string());
        from_name.or_else(|| BODY_ID_RE.captures(&self.raw).map(|c| c[1].to_string()))
    }

    pub fn select_first(&self, css: &str) -> Option<ElementRef<'_>> {
        let sel = Selector::parse(css).ok()?;
        self.html.select(&sel).next()
    }

    pub fn select_all(&self, css: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(css) {
            Ok(sel) => self.html.select(&sel).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// `content` of the first `<meta property=...>` tag.
    pub fn meta_property(&self, property: &str) -> Option<String> {
        let css = format!("meta[property=\"{}\"]", property);
        self.select_first(&css)
            .and_then(|m| m.value().attr("content"))
            .map(clean_ws)
            .filter(|s| !s.is_empty())
    }
}

pub fn select_in<'a>(el: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(sel) => el.select(&sel).collect(),
        Err(_) => Vec::new(),
    }
}

pub fn select_first_in<'a>(el: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(css).ok()?;
    el.select(&sel).next()
}

/// Whitespace-normalized text content; `None` when empty.
pub fn text_of(el: ElementRef<'_>) -> Option<String> {
    let t = clean_ws(&el.text().collect::<Vec<_>>().join(" "));
    if t.is_empty() {
        None
    } else {
        Some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str, body: &str) -> SourceDocument {
        SourceDocument::from_text(Path::new(name), body.to_string())
    }

    #[test]
    fn identifier_from_file_name() {
        let d = doc("captures/B0C1234567 - Blue Dress.html", "<html></html>");
        assert_eq!(d.identifier().as_deref(), Some("B0C1234567"));
    }

    #[test]
    fn identifier_from_body() {
        let d = doc("page.html", r#"<script>var x = {"asin" : "B0BODY1234"};</script>"#);
        assert_eq!(d.identifier().as_deref(), Some("B0BODY1234"));
    }

    #[test]
    fn identifier_missing() {
        let d = doc("page.html", "<html><body>nothing</body></html>");
        assert!(d.identifier().is_none());
    }

    #[test]
    fn text_is_normalized() {
        let d = doc("x.html", "<p id='t'>  Hello \n <b>world</b> </p>");
        let el = d.select_first("#t").unwrap();
        assert_eq!(text_of(el).as_deref(), Some("Hello world"));
    }

    #[test]
    fn bad_selector_is_empty() {
        let d = doc("x.html", "<p>x</p>");
        assert!(d.select_all("p[[").is_empty());
        assert!(d.select_first("p[[").is_none());
    }
}
