//! URL handling module for Sumi-Harvest
//!
//! The crawl never leaves the site it was started on. Only site-relative
//! hrefs (those starting with `/`) are followed, and they are resolved
//! against the configured base URL.

use url::Url;

/// Parses the configured base URL
pub fn parse_base_url(base_url: &str) -> Result<Url, url::ParseError> {
    Url::parse(base_url)
}

/// Resolves a raw href into a URL on the crawled site
///
/// Returns `None` for hrefs that must not be followed:
/// - empty hrefs
/// - the root self-reference `/`
/// - anything not starting with `/` (absolute, relative-path, `mailto:`,
///   fragment-only links); absolute links are dropped even when they point
///   back to the same host
/// - protocol-relative hrefs (`//host/path`) that resolve to another origin
///
/// # Examples
///
/// ```
/// use sumi_harvest::url::{parse_base_url, resolve_site_link};
///
/// let base = parse_base_url("https://www.example.com").unwrap();
/// assert_eq!(
///     resolve_site_link(&base, "/news/1").as_deref(),
///     Some("https://www.example.com/news/1")
/// );
/// assert_eq!(resolve_site_link(&base, "https://other.com/"), None);
/// ```
pub fn resolve_site_link(base: &Url, href: &str) -> Option<String> {
    if href.is_empty() || href == "/" || !href.starts_with('/') {
        return None;
    }

    let resolved = base.join(href).ok()?;
    if resolved.origin() != base.origin() {
        return None;
    }

    Some(resolved.to_string())
}
