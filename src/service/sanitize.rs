//! Cleanup for text scraped from the remote quote API.

use regex::Regex;
use std::sync::LazyLock;

static PARAGRAPH_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?p(?:\s[^>]*)?>").expect("paragraph tag regex"));

/// Unescape HTML entities, drop `<p>`/`</p>` tags and trim.
pub fn clean_content(raw: &str) -> String {
    let unescaped = html_escape::decode_html_entities(raw);
    PARAGRAPH_TAG.replace_all(&unescaped, "").trim().to_string()
}

/// Unescape HTML entities and trim.
pub fn clean_title(raw: &str) -> String {
    html_escape::decode_html_entities(raw).trim().to_string()
}
