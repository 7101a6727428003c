//! Output naming: extension inference and filename escaping

use url::form_urlencoded;

/// Extensions recognised at the end of an image URL, in priority order
pub const KNOWN_EXTENSIONS: [&str; 8] = [
    ".jpg", ".jpeg", ".gif", ".png", ".bmp", ".svg", ".webp", ".ico",
];

/// Extension used when the URL ends in none of [`KNOWN_EXTENSIONS`]
pub const DEFAULT_EXTENSION: &str = ".jpg";

/// Picks the file extension for an image URL
///
/// The first entry of [`KNOWN_EXTENSIONS`] the URL ends with wins. The match
/// is case-sensitive and looks at the raw URL, so a query string after the
/// extension falls back to [`DEFAULT_EXTENSION`].
pub fn pick_extension(image_url: &str) -> &'static str {
    KNOWN_EXTENSIONS
        .iter()
        .copied()
        .find(|ext| image_url.ends_with(ext))
        .unwrap_or(DEFAULT_EXTENSION)
}

/// Escapes text for use as a single path component
///
/// Uses form encoding: spaces become `+`, path separators and every other
/// byte outside `[A-Za-z0-9*-._]` are percent-encoded.
pub fn escape_component(text: &str) -> String {
    form_urlencoded::byte_serialize(text.as_bytes()).collect()
}

/// Builds the output filename for a record: escaped `title + extension`
///
/// Equal titles map to equal filenames; the later download overwrites the
/// earlier one.
pub fn output_file_name(title: &str, image_url: &str) -> String {
    escape_component(&format!("{}{}", title, pick_extension(image_url)))
}
