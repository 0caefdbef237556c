//! Utility functions and helpers.

pub mod date;
pub mod text;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> Option<String> {
    base.join(href.trim()).map(|u| u.to_string()).ok()
}

/// Read an integer query parameter from a (possibly relative) link.
pub fn query_index(base: &Url, href: &str, param: &str) -> Option<usize> {
    let url = base.join(href.trim()).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == param)
        .and_then(|(_, value)| value.parse().ok())
}

/// Whether the URL path ends with one of the given suffixes (case-insensitive).
pub fn has_suffix(url: &str, suffixes: &[String]) -> bool {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_lowercase(),
        Err(_) => url.to_lowercase(),
    };
    suffixes
        .iter()
        .any(|suffix| path.ends_with(&suffix.to_lowercase()))
}
