use crate::UrlError;
use url::Url;

/// Normalizes a URL string according to Kanso-Audit's normalization rules
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or relative
/// 2. Remove the fragment (everything after #)
///
/// Fragment removal is deliberately the only transform: two URLs that differ
/// in path, query, or case are treated as distinct pages. Anything stronger
/// (query sorting, trailing-slash folding) would merge pages that can render
/// differently, which is wrong for an accessibility audit.
///
/// # Arguments
///
/// * `url_str` - The URL string to normalize
///
/// # Returns
///
/// * `Ok(Url)` - Normalized absolute URL
/// * `Err(UrlError)` - Failed to parse the URL
///
/// # Examples
///
/// ```
/// use kanso_audit::url::normalize_url;
///
/// let url = normalize_url("https://example.com/page#main").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;
    Ok(normalize(&url))
}

/// Normalizes an already-parsed URL by stripping its fragment.
pub fn normalize(url: &Url) -> Url {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized
}
