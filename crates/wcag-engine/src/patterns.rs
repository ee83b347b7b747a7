//! Patterns and word lists used by the content checks

use lazy_static::lazy_static;
use regex::Regex;

/// Alt text written by the auto-fixer when no description is available.
/// It is itself denylisted, so re-validation keeps the figure flagged.
pub const PLACEHOLDER_ALT_TEXT: &str = "[Image description needed - review required]";

/// Alt texts that describe nothing
pub const PLACEHOLDER_ALT_WORDS: &[&str] = &[
    "image",
    "picture",
    "photo",
    "graphic",
    "figure",
    "img",
    "icon",
    "logo",
    "chart",
    "untitled",
    "alt",
    "alt text",
    "placeholder",
    "spacer",
    "image description needed",
];

/// Link texts that do not describe the destination
pub const GENERIC_LINK_TEXTS: &[&str] = &[
    "click here",
    "here",
    "read more",
    "more",
    "link",
    "learn more",
    "this link",
    "click",
    "go",
];

lazy_static! {
    /// BCP 47 language tag, structural check only (primary subtag plus subtags)
    static ref LANGUAGE_TAG_PATTERN: Regex =
        Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{1,8})*$").unwrap();

    /// Camera and export file names ("IMG_0042.jpg", "DSC01234", "image1.png")
    static ref CAMERA_FILE_PATTERN: Regex =
        Regex::new(concat!(
            r"(?i)^(img|dsc|dscn|dcim|pxl|image|screenshot|scan)[_\- ]?\d+",
            r"(\.(jpe?g|png|gif|bmp|tiff?|heic|webp))?$",
        ))
        .unwrap();

    /// Any bare file name with an image extension
    static ref IMAGE_FILE_PATTERN: Regex =
        Regex::new(r"(?i)^[\w\-. ]+\.(jpe?g|png|gif|bmp|tiff?|heic|webp|svg)$").unwrap();
}

pub fn is_valid_language_tag(tag: &str) -> bool {
    LANGUAGE_TAG_PATTERN.is_match(tag.trim())
}

/// True when alt text is present but carries no description
pub fn is_placeholder_alt_text(alt: &str) -> bool {
    let normalized = normalize(alt);
    if normalized.is_empty() {
        return false;
    }
    if alt.trim() == PLACEHOLDER_ALT_TEXT {
        return true;
    }
    PLACEHOLDER_ALT_WORDS.contains(&normalized.as_str())
        || CAMERA_FILE_PATTERN.is_match(alt.trim())
        || IMAGE_FILE_PATTERN.is_match(alt.trim())
}

pub fn is_generic_link_text(text: &str) -> bool {
    GENERIC_LINK_TEXTS.contains(&normalize(text).as_str())
}

/// Lowercase, trim trailing punctuation, collapse whitespace
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c.is_ascii_punctuation())
        .trim()
        .to_lowercase()
}
