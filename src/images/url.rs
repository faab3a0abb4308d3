use std::sync::LazyLock;

use regex::Regex;

use crate::lexicon::Lexicon;

/// Path marker of the canonical product-image convention.
pub const CANONICAL_MARKER: &str = "/images/I/";
pub const MEDIA_HOST: &str = "media-amazon.com/images";

const HD_SUFFIX: &str = "._SL1500_";
const SR_TARGET: (u32, u32) = (1200, 1200);
const SR_THRESHOLD: u32 = 300;

static MODIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\._[A-Z0-9,]+_(\.[A-Z0-9]+)$").unwrap());
static ANY_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\._[^.]+_\.(jpg|jpeg|png|webp)$").unwrap());
static EXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png|webp)$").unwrap());
static SR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"__AC_SR(\d+),(\d+)__").unwrap());
static KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)/images/I/([^._/?]+)").unwrap());

/// Strip the query, absolutize protocol-relative URLs and drop a single size
/// modifier token sitting right before the extension.
pub fn normalize(url: &str) -> String {
    let u = url.trim();
    if u.is_empty() {
        return String::new();
    }
    let u = u.split('?').next().unwrap_or(u);
    let u = if u.starts_with("//") {
        format!("https:{}", u)
    } else {
        u.to_string()
    };
    MODIFIER_RE.replace(&u, "$1").into_owned()
}

/// Large variant of a canonical image; other URLs are only normalized.
pub fn force_hd(url: &str) -> String {
    let u = normalize(url);
    if u.is_empty() || !u.contains(CANONICAL_MARKER) {
        return u;
    }
    let base = ANY_SUFFIX_RE.replace(&u, ".$1");
    EXT_RE
        .replace(&base, format!("{}.$1", HD_SUFFIX).as_str())
        .into_owned()
}

/// Bump a `__AC_SRw,h__` thumbnail to the target size when it is small.
pub fn upscale_resized(url: &str) -> String {
    let u = normalize(url);
    let small = SR_RE.captures(&u).is_some_and(|c| {
        let w: u32 = c[1].parse().unwrap_or(u32::MAX);
        let h: u32 = c[2].parse().unwrap_or(u32::MAX);
        w < SR_THRESHOLD || h < SR_THRESHOLD
    });
    if !small {
        return u;
    }
    let target = format!("__AC_SR{},{}__", SR_TARGET.0, SR_TARGET.1);
    SR_RE.replace(&u, target.as_str()).into_owned()
}

/// Content-addressing key: the asset id after the canonical marker, stable
/// across resized variants. Non-canonical URLs key to themselves.
pub fn image_key(url: &str) -> String {
    KEY_RE
        .captures(url)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| url.to_string())
}

fn blocked(lowered: &str, lexicon: &Lexicon) -> bool {
    lexicon.image_blocklist.iter().any(|k| lowered.contains(k))
}

/// Gallery candidates: canonical product photos on the media host only.
pub fn is_product_image(url: &str, lexicon: &Lexicon) -> bool {
    let u = url.to_lowercase();
    !u.is_empty()
        && !u.contains("/images/g/")
        && u.contains(MEDIA_HOST)
        && u.contains("/images/i/")
        && !blocked(&u, lexicon)
}

/// Description-content images: canonical photos or A+ media assets.
pub fn is_description_image(url: &str, lexicon: &Lexicon) -> bool {
    let u = url.to_lowercase();
    if u.is_empty() || !u.contains(MEDIA_HOST) || blocked(&u, lexicon) {
        return false;
    }
    u.contains("/images/i/") || (u.contains("/images/s/") && u.contains("aplus"))
}
