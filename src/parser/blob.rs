//! Recover JSON literals embedded in script text that a DOM parser never
//! exposes as structure.

use serde_json::Value;
use tracing::debug;

/// Upper bound on bytes scanned after the opening delimiter.
pub const MAX_SCAN: usize = 400_000;

const ATF_MARKER: &str = "'colorImages': { 'initial':";
const BTF_MARKER: &str = "jQuery.parseJSON('";
const DIMENSIONS_MARKER: &str = "\"dimensionValuesDisplayData\"";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delim {
    Array,
    Object,
}

impl Delim {
    fn pair(self) -> (u8, u8) {
        match self {
            Delim::Array => (b'[', b']'),
            Delim::Object => (b'{', b'}'),
        }
    }
}

/// Slice of `text` holding the balanced literal that starts at the first
/// opening delimiter after `marker`.
pub fn balanced_after<'a>(text: &'a str, marker: &str, delim: Delim) -> Option<&'a str> {
    let (open, close) = delim.pair();
    let at = text.find(marker)?;
    let start = at + text[at..].find(open as char)?;
    let end = text.len().min(start + MAX_SCAN);
    let bytes = text.as_bytes();

    let mut depth = 0usize;
    let mut in_str = false;
    let mut esc = false;
    for (i, &b) in bytes.iter().enumerate().take(end).skip(start) {
        if in_str {
            if esc {
                esc = false;
            } else if b == b'\\' {
                esc = true;
            } else if b == b'"' {
                in_str = false;
            }
            continue;
        }
        if b == b'"' {
            in_str = true;
        } else if b == open {
            depth += 1;
        } else if b == close {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return Some(&text[start..=i]);
            }
        }
    }
    None
}

/// Decode a JSON literal, retrying once after HTML-entity unescaping.
pub fn decode(blob: &str) -> Option<Value> {
    serde_json::from_str(blob).ok().or_else(|| {
        let unescaped = html_escape::decode_html_entities(blob);
        serde_json::from_str(&unescaped).ok()
    })
}

pub fn json_after(text: &str, marker: &str, delim: Delim) -> Option<Value> {
    let blob = balanced_after(text, marker, delim)?;
    let value = decode(blob);
    if value.is_none() {
        debug!(marker, len = blob.len(), "embedded blob did not decode");
    }
    value
}

/// Body of the first single-quoted string after `marker`, with backslash
/// escapes resolved.
pub fn quoted_payload(text: &str, marker: &str) -> Option<String> {
    let at = text.find(marker)? + marker.len();
    let mut out = String::new();
    let mut esc = false;
    for ch in text[at..].chars() {
        if esc {
            out.push(ch);
            esc = false;
        } else if ch == '\\' {
            esc = true;
        } else if ch == '\'' {
            return Some(out);
        } else {
            out.push(ch);
        }
    }
    None
}

/// Item array of the high-resolution image block.
pub fn image_block_items(raw: &str) -> Vec<Value> {
    match json_after(raw, ATF_MARKER, Delim::Array) {
        Some(Value::Array(items)) => items.into_iter().filter(Value::is_object).collect(),
        _ => Vec::new(),
    }
}

/// Object carried by the string-quoted image payload.
pub fn image_block_payload(raw: &str) -> Option<Value> {
    let payload = quoted_payload(raw, BTF_MARKER)?;
    let blob = balanced_after(&payload, "", Delim::Object)?;
    decode(blob).filter(Value::is_object)
}

/// Dimension name → displayed values map.
pub fn dimension_values(raw: &str) -> Option<serde_json::Map<String, Value>> {
    match json_after(raw, DIMENSIONS_MARKER, Delim::Object)? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
