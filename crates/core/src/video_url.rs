//! Source URL validation and scratch-file naming helpers.

use crate::error::CoreError;

/// Container extensions kept when naming scratch files.
pub const KNOWN_VIDEO_EXTENSIONS: &[&str] = &["mp4", "m4v", "mov", "mkv", "webm", "avi"];

/// Extension used when the URL does not name a known container.
pub const DEFAULT_VIDEO_EXTENSION: &str = "mp4";

/// Validate that a video URL is non-empty and starts with `http(s)://`.
pub fn validate_video_url(url: &str) -> Result<(), CoreError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "video_url must not be empty".to_string(),
        ));
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(CoreError::Validation(format!(
            "video_url must start with http:// or https://, got: '{trimmed}'"
        )));
    }
    Ok(())
}

/// Pick the scratch-file extension for a source URL.
///
/// Uses the extension of the last path segment when it is a known video
/// container, ignoring query strings and fragments. Falls back to
/// [`DEFAULT_VIDEO_EXTENSION`].
pub fn video_extension_from_url(url: &str) -> &'static str {
    let clean = url.split(['?', '#']).next().unwrap_or(url);

    let path = match clean
        .strip_prefix("https://")
        .or_else(|| clean.strip_prefix("http://"))
    {
        Some(rest) => rest.find('/').map(|i| &rest[i..]).unwrap_or(""),
        None => clean,
    };

    let segment = path.rsplit('/').find(|s| !s.is_empty()).unwrap_or("");
    let Some((_, ext)) = segment.rsplit_once('.') else {
        return DEFAULT_VIDEO_EXTENSION;
    };
    let ext = ext.to_ascii_lowercase();

    KNOWN_VIDEO_EXTENSIONS
        .iter()
        .find(|known| **known == ext)
        .copied()
        .unwrap_or(DEFAULT_VIDEO_EXTENSION)
}
