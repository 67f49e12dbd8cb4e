// Platform classification and URL helpers

use regex::Regex;
use url::Url;

use super::models::Platform;

/// Classify a URL by substring. Never touches the network.
pub fn detect_platform(url: &str) -> Platform {
    if url.contains("bilibili.com") || url.contains("b23.tv") {
        Platform::Bilibili
    } else if url.contains("youtube.com") || url.contains("youtu.be") {
        Platform::Youtube
    } else {
        Platform::Other
    }
}

/// `BV...` id embedded anywhere in a Bilibili URL
pub fn extract_bvid(url: &str) -> Option<String> {
    lazy_static::lazy_static! {
        static ref BVID_RE: Regex = Regex::new(r"BV([a-zA-Z0-9]+)").unwrap();
    }

    BVID_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| format!("BV{}", m.as_str()))
}

/// Value of the `list` query parameter, if present and non-empty
pub fn youtube_list_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "list")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Canonical item URL for an id coming from a flat listing
pub fn item_url_for_id(platform: Platform, id: &str) -> Option<String> {
    match platform {
        Platform::Youtube => Some(format!("https://www.youtube.com/watch?v={}", id)),
        Platform::Bilibili if id.starts_with("BV") => {
            Some(format!("https://www.bilibili.com/video/{}", id))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_platform() {
        assert_eq!(
            detect_platform("https://www.bilibili.com/video/BV1xx411c7mD"),
            Platform::Bilibili
        );
        assert_eq!(detect_platform("https://b23.tv/abc123"), Platform::Bilibili);
        assert_eq!(
            detect_platform("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Platform::Youtube
        );
        assert_eq!(detect_platform("https://youtu.be/dQw4w9WgXcQ"), Platform::Youtube);
        assert_eq!(detect_platform("https://vimeo.com/12345"), Platform::Other);
        assert_eq!(detect_platform(""), Platform::Other);
    }

    #[test]
    fn test_extract_bvid() {
        assert_eq!(
            extract_bvid("https://www.bilibili.com/video/BV1xx411c7mD?p=2"),
            Some("BV1xx411c7mD".to_string())
        );
        assert_eq!(extract_bvid("https://b23.tv/abc123"), None);
    }

    #[test]
    fn test_youtube_list_id() {
        assert_eq!(
            youtube_list_id("https://www.youtube.com/watch?v=ABC&list=XYZ"),
            Some("XYZ".to_string())
        );
        assert_eq!(
            youtube_list_id("https://www.youtube.com/playlist?list=PL123"),
            Some("PL123".to_string())
        );
        assert_eq!(youtube_list_id("https://www.youtube.com/watch?v=ABC"), None);
        assert_eq!(youtube_list_id("https://www.youtube.com/watch?v=ABC&list="), None);
        assert_eq!(youtube_list_id("not a url"), None);
    }

    #[test]
    fn test_item_url_for_id() {
        assert_eq!(
            item_url_for_id(Platform::Youtube, "abc").as_deref(),
            Some("https://www.youtube.com/watch?v=abc")
        );
        assert_eq!(
            item_url_for_id(Platform::Bilibili, "BV1xx").as_deref(),
            Some("https://www.bilibili.com/video/BV1xx")
        );
        assert_eq!(item_url_for_id(Platform::Bilibili, "12345"), None);
        assert_eq!(item_url_for_id(Platform::Other, "abc"), None);
    }
}
