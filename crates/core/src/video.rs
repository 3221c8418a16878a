//! Video identifier extraction from user-entered links.
//!
//! The identifier is informational only (the `video_id` field of an
//! annotation); identity always uses the full URL. A segment is only
//! loadable when an identifier resolves.

use std::sync::LazyLock;

use regex::Regex;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://(?P<host>[^/?#]*)(?P<path>[^?#]*)(?:\?(?P<query>[^#]*))?")
        .expect("valid regex")
});

static V_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]v=([^&]+)").expect("valid regex"));

static SHORT_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"youtu\.be/(.+)").expect("valid regex"));

static BARE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("valid regex"));

/// Extract a video identifier from a link or bare id.
///
/// Handles `watch?v=ID`, `youtu.be/ID`, `/embed/ID` and bare 11-character
/// ids. Returns `None` when nothing resolves.
pub fn extract_video_id(link: &str) -> Option<String> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }

    if let Some(caps) = URL_RE.captures(link) {
        let query = caps.name("query").map_or("", |m| m.as_str());
        if let Some(v) = query_param(query, "v") {
            return Some(v.to_string());
        }

        let host = caps.name("host").map_or("", |m| m.as_str());
        if host.contains("youtu") {
            let path = caps.name("path").map_or("", |m| m.as_str());
            if let Some(last) = path.split('/').filter(|s| !s.is_empty()).last() {
                return Some(last.to_string());
            }
        }
    }

    if let Some(caps) = V_PARAM_RE.captures(link) {
        return Some(caps[1].to_string());
    }
    if let Some(caps) = SHORT_LINK_RE.captures(link) {
        return Some(caps[1].to_string());
    }
    if BARE_ID_RE.is_match(link) {
        return Some(link.to_string());
    }
    None
}

/// The identifier for `video_url`, or the URL itself when none resolves.
pub fn video_id_or_url(video_url: &str) -> String {
    extract_video_id(video_url).unwrap_or_else(|| video_url.to_string())
}

fn query_param<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, v)| *k == key && !v.is_empty())
        .map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn short_link() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn embed_path() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/abc123").as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn v_param_on_other_hosts() {
        assert_eq!(
            extract_video_id("https://example.com/player?v=xyz").as_deref(),
            Some("xyz")
        );
    }

    #[test]
    fn schemeless_short_link() {
        assert_eq!(extract_video_id("youtu.be/abc").as_deref(), Some("abc"));
    }

    #[test]
    fn bare_id() {
        assert_eq!(extract_video_id(" dQw4w9WgXcQ ").as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn unresolvable_links() {
        assert_eq!(extract_video_id(""), None);
        assert_eq!(extract_video_id("https://example.com/video.mp4"), None);
        assert_eq!(extract_video_id("not a link"), None);
    }

    #[test]
    fn fallback_to_raw_url() {
        assert_eq!(
            video_id_or_url("https://example.com/video.mp4"),
            "https://example.com/video.mp4"
        );
        assert_eq!(video_id_or_url("https://youtu.be/abc"), "abc");
    }
}
