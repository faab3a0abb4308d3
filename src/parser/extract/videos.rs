use std::collections::HashSet;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;

use crate::images::url::normalize;

static VIDEO_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""videoURL"\s*:\s*"([^"]+)""#).unwrap());
static MEDIA_MP4_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(https?://m\.media-amazon\.com/images/S/[^,"\s]+\.mp4[^,"\s]*)"#).unwrap()
});
static VIDEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/vse-vms-transcoding-artifact[^/]+/([^/]+)/").unwrap());
static POSTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""videoPreviewImageSrc"\s*:\s*"([^"]+)""#).unwrap());
static ANY_MP4_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)https?://[^"'\s]+\.mp4"#).unwrap());

const TRANSCODING_HOST: &str = "vse-vms-transcoding-artifact";
const HLS: &str = "application/x-mpegURL";
const MP4: &str = "video/mp4";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VideoSource {
    #[serde(rename = "type")]
    pub kind: String,
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Video {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub src: String,
    pub sources: Vec<VideoSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

fn source(kind: &str, src: &str) -> VideoSource {
    VideoSource {
        kind: kind.to_string(),
        src: src.to_string(),
    }
}

fn video_id(url: &str) -> String {
    VIDEO_ID_RE
        .captures(url)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| url.to_string())
}

/// Product videos from the page's player config, falling back to any
/// marketplace mp4 link. Deduplicated on the default source.
pub fn extract(raw: &str, cap: usize) -> Vec<Video> {
    let mut videos = from_player_config(raw);
    if videos.is_empty() {
        videos = ANY_MP4_RE
            .find_iter(raw)
            .map(|m| m.as_str())
            .filter(|u| u.contains("amazon"))
            .map(|u| Video {
                id: None,
                src: u.to_string(),
                sources: vec![source(MP4, u)],
                poster: None,
            })
            .collect();
    }
    let mut seen = HashSet::new();
    videos
        .into_iter()
        .filter(|v| !v.src.is_empty() && seen.insert(v.src.clone()))
        .take(cap)
        .collect()
}

fn from_player_config(raw: &str) -> Vec<Video> {
    let page = html_escape::decode_html_entities(raw);
    let mut by_id: IndexMap<String, Vec<VideoSource>> = IndexMap::new();

    let hls = VIDEO_URL_RE.captures_iter(&page).map(|c| (HLS, c.get(1)));
    let mp4 = MEDIA_MP4_RE.captures_iter(&page).map(|c| (MP4, c.get(1)));
    for (kind, m) in hls.chain(mp4) {
        let Some(url) = m.map(|m| m.as_str()) else {
            continue;
        };
        if !url.contains(TRANSCODING_HOST) {
            continue;
        }
        let sources = by_id.entry(video_id(url)).or_default();
        let s = source(kind, url);
        if !sources.contains(&s) {
            sources.push(s);
        }
    }

    let poster = POSTER_RE
        .captures(&page)
        .map(|c| normalize(&c[1]))
        .filter(|p| !p.is_empty());

    let mut out = Vec::new();
    for (id, sources) in by_id {
        let pick = |kind: &str| sources.iter().find(|s| s.kind == kind).map(|s| s.src.clone());
        let Some(src) = pick(MP4).or_else(|| pick(HLS)) else {
            continue;
        };
        out.push(Video {
            id: Some(id),
            src,
            sources,
            poster: poster.clone(),
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: &str = "https://m.media-amazon.com/images/S/vse-vms-transcoding-artifact-us-east-1-prod";

    #[test]
    fn groups_sources_by_video() {
        let raw = format!(
            r#"{{"videoURL":"{h}/abc123/default.jobtemplate.hls.m3u8","videoPreviewImageSrc":"https://m.media-amazon.com/images/I/POSTER._SX35_.jpg"}}
               "url": "{h}/abc123/default.vertical.mp4480.mp4"
               {{&quot;videoURL&quot;:&quot;{h}/xyz789/default.jobtemplate.hls.m3u8&quot;}}"#,
            h = HOST
        );
        let vids = extract(&raw, 12);
        assert_eq!(vids.len(), 2);

        assert_eq!(vids[0].id.as_deref(), Some("abc123"));
        assert!(vids[0].src.ends_with(".mp4"));
        assert_eq!(vids[0].sources.len(), 2);
        assert_eq!(vids[0].poster.as_deref(), Some("https://m.media-amazon.com/images/I/POSTER.jpg"));

        assert_eq!(vids[1].id.as_deref(), Some("xyz789"));
        assert!(vids[1].src.ends_with(".m3u8"));
    }

    #[test]
    fn mp4_fallback_dedups() {
        let raw = r#"<a href="https://m.media-amazon.com/clip.mp4">a</a>
            <a href="https://m.media-amazon.com/clip.mp4">b</a>
            <a href="https://example.com/other.mp4">c</a>"#;
        let vids = extract(raw, 12);
        assert_eq!(vids.len(), 1);
        assert_eq!(vids[0].sources[0].kind, MP4);
        assert!(vids[0].id.is_none());
    }

    #[test]
    fn no_videos() {
        assert!(extract("<html></html>", 12).is_empty());
    }
}
