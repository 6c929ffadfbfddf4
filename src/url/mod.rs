//! URL handling for Kanso-Audit
//!
//! This module provides URL normalization, origin comparison for same-site
//! filtering, and the content identifier that names per-URL artifacts across
//! pipeline stages.

mod normalize;

pub use normalize::{normalize, normalize_url};

use sha2::{Digest, Sha256};
use url::Url;

/// The origin of a URL: scheme + host + port
///
/// Two URLs belong to the same site exactly when their origins are equal.
/// The port is the effective port, so `https://a/` and `https://a:443/`
/// share an origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
}

impl Origin {
    /// Extracts the origin from a URL.
    ///
    /// Returns None for URLs without a host (e.g. `mailto:` or `data:`).
    pub fn of(url: &Url) -> Option<Self> {
        let host = url.host_str()?;
        Some(Self {
            scheme: url.scheme().to_string(),
            host: host.to_lowercase(),
            port: url.port_or_known_default(),
        })
    }
}

/// Returns true if both URLs have the same scheme, host, and effective port.
///
/// URLs without a host never match anything, including themselves.
pub fn same_origin(a: &Url, b: &Url) -> bool {
    match (Origin::of(a), Origin::of(b)) {
        (Some(oa), Some(ob)) => oa == ob,
        _ => false,
    }
}

/// Returns true if the URL uses the `http` or `https` scheme.
pub fn is_http_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Computes the content identifier for a normalized URL.
///
/// The identifier is the lowercase hex SHA-256 of the normalized URL string.
/// It is the stable join key between capture, analyze, and filter artifacts:
/// every stage names its per-URL output after this value, so stages share
/// data through the filesystem without a central index.
pub fn content_id(url: &Url) -> String {
    let normalized = normalize(url);
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_str().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_same_origin_identical() {
        let a = parse("https://example.com/a");
        let b = parse("https://example.com/b?q=1");
        assert!(same_origin(&a, &b));
    }

    #[test]
    fn test_same_origin_default_port() {
        let a = parse("https://example.com/");
        let b = parse("https://example.com:443/");
        assert!(same_origin(&a, &b));
    }

    #[test]
    fn test_different_host() {
        let a = parse("https://example.com/");
        let b = parse("https://other.com/");
        assert!(!same_origin(&a, &b));
    }

    #[test]
    fn test_different_scheme() {
        let a = parse("http://example.com/");
        let b = parse("https://example.com/");
        assert!(!same_origin(&a, &b));
    }

    #[test]
    fn test_different_port() {
        let a = parse("http://example.com:8080/");
        let b = parse("http://example.com:9090/");
        assert!(!same_origin(&a, &b));
    }

    #[test]
    fn test_host_case_insensitive() {
        let a = parse("https://EXAMPLE.com/");
        let b = parse("https://example.COM/");
        assert!(same_origin(&a, &b));
    }

    #[test]
    fn test_no_host_never_matches() {
        let a = parse("mailto:someone@example.com");
        assert!(!same_origin(&a, &a));
    }

    #[test]
    fn test_is_http_scheme() {
        assert!(is_http_scheme(&parse("http://example.com/")));
        assert!(is_http_scheme(&parse("https://example.com/")));
        assert!(!is_http_scheme(&parse("ftp://example.com/")));
        assert!(!is_http_scheme(&parse("mailto:a@b.com")));
    }

    #[test]
    fn test_content_id_is_stable() {
        let a = parse("https://example.com/page");
        let b = parse("https://example.com/page");
        assert_eq!(content_id(&a), content_id(&b));
        assert_eq!(content_id(&a).len(), 64);
    }

    #[test]
    fn test_content_id_ignores_fragment() {
        let a = parse("https://example.com/page");
        let b = parse("https://example.com/page#section");
        assert_eq!(content_id(&a), content_id(&b));
    }

    #[test]
    fn test_content_id_distinguishes_query() {
        let a = parse("https://example.com/page");
        let b = parse("https://example.com/page?q=1");
        assert_ne!(content_id(&a), content_id(&b));
    }
}
