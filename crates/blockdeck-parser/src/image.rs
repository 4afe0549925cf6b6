//! Image reference detection: `![alt](url)`, `![[photo.png]]`, `[[photo.png]]`,
//! image URLs, `data:image/...` URIs and bare image paths.
//!
//! Detection is deliberately conservative about what counts as a path (no
//! whitespace, no brackets) but generous about where it looks: when the whole
//! text is not an image reference, embedded references and then individual
//! whitespace-separated tokens are tried.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Recognized image extensions (compared case-insensitively)
pub const IMAGE_EXTENSIONS: [&str; 12] = [
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "svg", "tif", "tiff", "avif", "heic", "heif",
];

/// Complete markdown image `![alt](target)`
static MARKDOWN_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!\[[^\]\n]*\]\([^)\n]+\)$").unwrap());

/// Complete embed `![[target]]`
static EMBED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^!\[\[[^\[\]\n]+\]\]$").unwrap());

/// Wikilink `[[target]]`
static WIKILINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\[([^\[\]\n]+)\]\]$").unwrap());

static HTTP_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^https?://\S+$").unwrap());

static DATA_URI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^data:image/[a-z0-9.+-]+[;,]\S*$").unwrap());

/// Markdown images and embeds anywhere in a line
static INLINE_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]\n]*\]\([^)\n]+\)|!\[\[[^\[\]\n]+\]\]").unwrap());

/// Characters that never appear in a bare path token
const NON_PATH_CHARS: [char; 9] = ['[', ']', '(', ')', '<', '>', '|', '"', '`'];

const TRAILING_PUNCTUATION: [char; 6] = ['.', ',', ';', ':', '!', '?'];

const QUOTE_PAIRS: [(&str, &str); 6] = [
    ("\"", "\""),
    ("'", "'"),
    ("`", "`"),
    ("\u{201c}", "\u{201d}"),
    ("(", ")"),
    ("<", ">"),
];

/// How a token denotes an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageTokenKind {
    /// `![alt](target)`
    MarkdownImage,
    /// `![[target]]`
    Embed,
    /// `[[target.png]]`
    Wikilink,
    /// `https://host/photo.png`
    Url,
    /// `data:image/png;base64,...`
    DataUri,
    /// `attachments/photo.png`
    Path,
}

/// Does the path end in a recognized image extension?
///
/// Query strings and fragments are ignored, so `https://x/a.png?w=200`
/// qualifies.
pub fn has_image_extension(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default().trim();
    let Some((stem, ext)) = path.rsplit_once('.') else {
        return false;
    };
    if stem.is_empty() || stem.ends_with(['/', '\\']) {
        return false;
    }
    IMAGE_EXTENSIONS
        .iter()
        .any(|known| ext.eq_ignore_ascii_case(known))
}

/// Is `text` a bare path to an image file?
///
/// Multi-line text, whitespace and bracket characters all disqualify.
pub fn is_image_path(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty()
        && !text.contains(char::is_whitespace)
        && !text.starts_with('!')
        && !text.contains("://")
        && !text.contains(NON_PATH_CHARS)
        && has_image_extension(text)
}

/// True when the text contains an image marker (`![` or `![[`)
pub fn contains_image_marker(text: &str) -> bool {
    text.contains("![")
}

/// Classify the whole trimmed text, in priority order
pub fn classify_image_token(text: &str) -> Option<ImageTokenKind> {
    let text = text.trim();
    if text.is_empty() || text.contains(['\n', '\r']) {
        return None;
    }

    if MARKDOWN_IMAGE.is_match(text) {
        return Some(ImageTokenKind::MarkdownImage);
    }
    if EMBED.is_match(text) {
        return Some(ImageTokenKind::Embed);
    }
    if let Some(caps) = WIKILINK.captures(text) {
        return wikilink_path(&caps[1])
            .filter(|p| has_image_extension(p))
            .map(|_| ImageTokenKind::Wikilink);
    }
    if HTTP_URL.is_match(text) {
        return has_image_extension(text).then_some(ImageTokenKind::Url);
    }
    if DATA_URI.is_match(text) {
        return Some(ImageTokenKind::DataUri);
    }
    is_image_path(text).then_some(ImageTokenKind::Path)
}

/// The file part of a wikilink target (`a.png|200` and `a.png#x` give `a.png`)
fn wikilink_path(inner: &str) -> Option<&str> {
    let path = inner.split(['|', '#']).next()?.trim();
    (!path.is_empty()).then_some(path)
}

/// Find the first image reference in a line of text.
///
/// Returns the raw matched substring, not the normalized embed.
///
/// # Example
/// ```
/// use blockdeck_parser::image::extract_first_image_token;
///
/// assert_eq!(extract_first_image_token("![[photo.png]]").as_deref(), Some("![[photo.png]]"));
/// assert_eq!(extract_first_image_token("See \"cover.jpg\".").as_deref(), Some("cover.jpg"));
/// assert_eq!(extract_first_image_token("no images here"), None);
/// ```
pub fn extract_first_image_token(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if classify_image_token(trimmed).is_some() {
        return Some(trimmed.to_string());
    }

    let inline = INLINE_IMAGE.find(trimmed);
    let token = first_passing_token(trimmed);

    // Whichever starts first wins; an inline image owns its own start offset
    match (inline, token) {
        (Some(found), Some((offset, _))) if found.start() <= offset => {
            Some(found.as_str().to_string())
        }
        (_, Some((_, token))) => Some(token.to_string()),
        (Some(found), None) => Some(found.as_str().to_string()),
        (None, None) => None,
    }
}

/// First whitespace-separated token that classifies, with its byte offset in `text`
fn first_passing_token(text: &str) -> Option<(usize, &str)> {
    let base = text.as_ptr() as usize;
    text.split_whitespace().find_map(|token| {
        let offset = token.as_ptr() as usize - base;
        if classify_image_token(token).is_some() {
            return Some((offset, token));
        }
        let stripped = strip_token_decorations(token);
        (stripped != token && classify_image_token(stripped).is_some())
            .then_some((offset, stripped))
    })
}

/// Strip trailing punctuation and matched surrounding quotes or brackets
fn strip_token_decorations(token: &str) -> &str {
    let mut current = token;
    loop {
        let before = current;
        current = current.trim_end_matches(TRAILING_PUNCTUATION);

        if current.ends_with(')') && !current.contains('(') {
            current = &current[..current.len() - 1];
        }
        if current.starts_with('(') && !current.contains(')') {
            current = &current[1..];
        }

        for (open, close) in QUOTE_PAIRS {
            if current.len() >= open.len() + close.len()
                && current.starts_with(open)
                && current.ends_with(close)
            {
                current = &current[open.len()..current.len() - close.len()];
                break;
            }
        }

        if current == before {
            return current;
        }
    }
}

/// Convert a detected token into canonical embed syntax.
///
/// Markdown images and embeds pass through unchanged, URLs and data URIs
/// become `![](url)`, wikilinks and bare paths become `![[path]]`.
///
/// # Example
/// ```
/// use blockdeck_parser::image::normalize_image_token;
///
/// assert_eq!(normalize_image_token("cover.jpg").as_deref(), Some("![[cover.jpg]]"));
/// assert_eq!(normalize_image_token("[[a.png|200]]").as_deref(), Some("![[a.png|200]]"));
/// assert_eq!(
///     normalize_image_token("https://x.org/a.webp").as_deref(),
///     Some("![](https://x.org/a.webp)")
/// );
/// assert_eq!(normalize_image_token("notes.md"), None);
/// ```
pub fn normalize_image_token(token: &str) -> Option<String> {
    let token = token.trim();
    match classify_image_token(token)? {
        ImageTokenKind::MarkdownImage | ImageTokenKind::Embed => Some(token.to_string()),
        ImageTokenKind::Url | ImageTokenKind::DataUri => Some(format!("![]({})", token)),
        ImageTokenKind::Wikilink => Some(format!("!{}", token)),
        ImageTokenKind::Path => Some(format!("![[{}]]", token)),
    }
}

/// Detect and normalize in one step
pub fn detect_image(text: &str) -> Option<String> {
    extract_first_image_token(text).and_then(|token| normalize_image_token(&token))
}

/// Whole-text detection: the entire value must be an image reference
pub fn detect_image_strict(text: &str) -> Option<String> {
    normalize_image_token(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extensions_case_insensitive() {
        for ext in IMAGE_EXTENSIONS {
            assert!(has_image_extension(&format!("photo.{}", ext)));
            assert!(has_image_extension(&format!("photo.{}", ext.to_uppercase())));
        }
        assert!(!has_image_extension("notes.md"));
        assert!(!has_image_extension(".png"));
        assert!(!has_image_extension("folder/.png"));
        assert!(has_image_extension("https://cdn.example.com/a.png?w=200"));
    }

    #[test]
    fn test_classification_priority() {
        assert_eq!(
            classify_image_token("![alt](photo.png)"),
            Some(ImageTokenKind::MarkdownImage)
        );
        assert_eq!(
            classify_image_token("![[photo.png]]"),
            Some(ImageTokenKind::Embed)
        );
        assert_eq!(
            classify_image_token("[[photo.png]]"),
            Some(ImageTokenKind::Wikilink)
        );
        assert_eq!(
            classify_image_token("https://example.com/photo.JPG"),
            Some(ImageTokenKind::Url)
        );
        assert_eq!(
            classify_image_token("data:image/png;base64,iVBORw0KGgo="),
            Some(ImageTokenKind::DataUri)
        );
        assert_eq!(
            classify_image_token("attachments/photo.png"),
            Some(ImageTokenKind::Path)
        );
    }

    #[test]
    fn test_classification_rejections() {
        assert_eq!(classify_image_token(""), None);
        assert_eq!(classify_image_token("   "), None);
        assert_eq!(classify_image_token("[[Some Note]]"), None);
        assert_eq!(classify_image_token("https://example.com/page"), None);
        assert_eq!(classify_image_token("my photo.png"), None);
        assert_eq!(classify_image_token("a.png\nb.png"), None);
        assert_eq!(classify_image_token("ftp://host/a.png"), None);
    }

    #[test]
    fn test_earliest_image_in_line_wins() {
        assert_eq!(
            extract_first_image_token("cover.png and ![[b.png]]").as_deref(),
            Some("cover.png")
        );
        assert_eq!(
            extract_first_image_token("see ![[b.png]] then https://x.org/c.jpg").as_deref(),
            Some("![[b.png]]")
        );
        assert_eq!(
            extract_first_image_token("[[a.gif]], ![alt text](b.png)").as_deref(),
            Some("[[a.gif]]")
        );
        assert_eq!(
            extract_first_image_token("before ![my photo](b.png) after.jpg").as_deref(),
            Some("![my photo](b.png)")
        );
    }

    #[test]
    fn test_embed_of_note_is_accepted() {
        // Embeds pass through whatever their target
        assert_eq!(classify_image_token("![[Other Note]]"), Some(ImageTokenKind::Embed));
    }

    #[test]
    fn test_extract_from_prose() {
        assert_eq!(
            extract_first_image_token("Look at ![[cat.png]] here").as_deref(),
            Some("![[cat.png]]")
        );
        assert_eq!(
            extract_first_image_token("Look at ![a cat](cat.png) here").as_deref(),
            Some("![a cat](cat.png)")
        );
        assert_eq!(
            extract_first_image_token("Cover: 'covers/one.webp',").as_deref(),
            Some("covers/one.webp")
        );
        assert_eq!(
            extract_first_image_token("(see https://x.org/a.gif)").as_deref(),
            Some("https://x.org/a.gif")
        );
        assert_eq!(extract_first_image_token("Plain prose, nothing else."), None);
    }

    #[test]
    fn test_extract_prefers_whole_string() {
        assert_eq!(
            extract_first_image_token("  [[diagram.svg|300]]  ").as_deref(),
            Some("[[diagram.svg|300]]")
        );
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize_image_token("![alt](a.png)").as_deref(),
            Some("![alt](a.png)")
        );
        assert_eq!(
            normalize_image_token("![[a.png]]").as_deref(),
            Some("![[a.png]]")
        );
        assert_eq!(
            normalize_image_token("[[a.png]]").as_deref(),
            Some("![[a.png]]")
        );
        assert_eq!(
            normalize_image_token("data:image/gif;base64,R0lG").as_deref(),
            Some("![](data:image/gif;base64,R0lG)")
        );
        assert_eq!(normalize_image_token("hello"), None);
        assert_eq!(normalize_image_token(""), None);
    }

    #[test]
    fn test_normalize_idempotent() {
        for input in [
            "![[a.png]]",
            "![](https://x.org/a.png)",
            "![alt](folder/b.jpg)",
            "cover.jpg",
            "[[c.webp]]",
            "https://x.org/d.avif",
        ] {
            let once = normalize_image_token(input).unwrap();
            let twice = normalize_image_token(&once).unwrap();
            assert_eq!(once, twice, "input {:?}", input);
        }
    }

    #[test]
    fn test_detect_image() {
        assert_eq!(detect_image("cover.jpg").as_deref(), Some("![[cover.jpg]]"));
        assert_eq!(detect_image("   "), None);
        assert_eq!(detect_image_strict("Cover: a.png"), None);
        assert_eq!(detect_image("Cover: a.png").as_deref(), Some("![[a.png]]"));
    }

    #[test]
    fn test_contains_image_marker() {
        assert!(contains_image_marker("x ![[a.png]]"));
        assert!(contains_image_marker("![](u)"));
        assert!(!contains_image_marker("[[a.png]]"));
    }
}
