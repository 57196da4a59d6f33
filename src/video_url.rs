//! Video URL to identifier resolution.

use crate::error::{Result, SvarError};
use url::Url;

/// Extract the video identifier from a YouTube URL.
///
/// Recognized forms:
/// - `https://youtu.be/<id>`
/// - `https://www.youtube.com/watch?v=<id>`
/// - `https://www.youtube.com/embed/<id>`
/// - `https://www.youtube.com/v/<id>` (legacy)
///
/// Anything else fails with [`SvarError::InvalidUrl`].
pub fn resolve_video_id(input: &str) -> Result<String> {
    let input = input.trim();
    let parsed = Url::parse(input).map_err(|_| SvarError::InvalidUrl(input.to_string()))?;

    let host = parsed
        .host_str()
        .ok_or_else(|| SvarError::InvalidUrl(input.to_string()))?
        .to_ascii_lowercase();

    if host == "youtu.be" || host == "www.youtu.be" {
        if let Some(id) = first_path_segment(&parsed) {
            return Ok(id);
        }
    }

    if host == "youtube.com" || host == "www.youtube.com" || host == "m.youtube.com" {
        if parsed.path() == "/watch" {
            if let Some(id) = query_param(&parsed, "v") {
                return Ok(id);
            }
        } else if parsed.path().starts_with("/embed/") || parsed.path().starts_with("/v/") {
            if let Some(id) = second_path_segment(&parsed) {
                return Ok(id);
            }
        }
    }

    Err(SvarError::InvalidUrl(input.to_string()))
}

fn first_path_segment(url: &Url) -> Option<String> {
    url.path_segments()
        .and_then(|mut segments| segments.next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn second_path_segment(url: &Url) -> Option<String> {
    url.path_segments()
        .and_then(|mut segments| segments.nth(1))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn query_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_video_id() {
        // Test various URL formats
        assert_eq!(
            resolve_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            resolve_video_id("https://youtu.be/dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            resolve_video_id("https://youtube.com/embed/dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            resolve_video_id("https://www.youtube.com/v/dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_short_ids_are_not_rejected() {
        // The resolver extracts whatever segment is present; it does not
        // validate identifier length.
        assert_eq!(resolve_video_id("https://youtu.be/abc123").unwrap(), "abc123");
    }

    #[test]
    fn test_watch_url_with_extra_params() {
        assert_eq!(
            resolve_video_id("https://www.youtube.com/watch?t=42&v=dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_mobile_host() {
        assert_eq!(
            resolve_video_id("https://m.youtube.com/watch?v=dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_invalid_urls() {
        // Unrecognized host
        assert!(matches!(
            resolve_video_id("https://vimeo.com/12345"),
            Err(SvarError::InvalidUrl(_))
        ));
        // Recognized host, missing the expected component
        assert!(matches!(
            resolve_video_id("https://www.youtube.com/watch"),
            Err(SvarError::InvalidUrl(_))
        ));
        assert!(matches!(
            resolve_video_id("https://youtu.be/"),
            Err(SvarError::InvalidUrl(_))
        ));
        // Unrecognized path on a recognized host
        assert!(matches!(
            resolve_video_id("https://www.youtube.com/playlist?list=PLtest"),
            Err(SvarError::InvalidUrl(_))
        ));
        // Not a URL at all
        assert!(matches!(
            resolve_video_id("not a url"),
            Err(SvarError::InvalidUrl(_))
        ));
    }
}
