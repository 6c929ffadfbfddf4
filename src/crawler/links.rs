//! Hyperlink extraction from rendered markup
//!
//! This module pulls link targets out of a rendered page in document order,
//! resolving relative hrefs against the page URL.

use scraper::{Html, Selector};
use url::Url;

/// Extracts all hyperlink targets from the markup, in document order
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links (same page anchors)
/// - `<a href="..." download>` targets
/// - Anything that fails to resolve against the page URL
///
/// Scheme and origin filtering happen later in the frontier; this function
/// only rejects hrefs that can never be pages.
///
/// # Arguments
///
/// * `html` - The rendered markup
/// * `base_url` - The page URL, for resolving relative links
///
/// # Returns
///
/// A vector of absolute URLs in the order they appear in the document
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);

    let Ok(anchor_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut links = Vec::new();
    for element in document.select(&anchor_selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        if let Some(href) = element.value().attr("href") {
            if let Some(url) = resolve_link(href, base_url) {
                links.push(url);
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL, or None if it should be excluded
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    // Skip special schemes
    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    // Skip fragment-only links (same page anchors)
    if href.starts_with('#') {
        return None;
    }

    base_url.join(href).ok()
}
