//! The renderer seam for Kanso-Audit
//!
//! A `Renderer` is the external capability that loads a URL and hands back
//! the page markup. The crawler and the capture/analyze stages only ever talk
//! to this trait, so the HTTP-backed implementation here can be swapped for a
//! browser-backed one without touching the pipeline.
//!
//! The renderer also owns the best-effort login hook: authentication is an
//! optional pre-stage concern of the browsing session, never of the pipeline.

mod http;
mod login;

pub use http::{build_http_client, HttpRenderer};

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// A successfully rendered page
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Final URL after redirects
    pub url: Url,

    /// The rendered markup
    pub html: String,
}

/// Credentials for the optional authenticated-crawl mode
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Outcome of the best-effort login hook
///
/// None of these variants is fatal: a `Failed` login only means the audit
/// proceeds unauthenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// A login form was found and submitting it visibly redirected
    Success,

    /// No credentials were supplied; no request was made
    Skipped,

    /// The form could not be located or submitting it had no visible effect
    Failed,
}

/// Per-URL rendering errors
///
/// These are recovered locally by the stages: the URL gets a failure marker
/// artifact and processing continues with the next URL.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP error for {url}: {message}")]
    Http { url: String, message: String },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Non-HTML content type '{content_type}' for {url}")]
    ContentMismatch { url: String, content_type: String },
}

/// An opaque navigable-page service
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Navigates to the URL, waits for readiness, and returns the markup.
    ///
    /// Navigations are sequential by contract: the implementation owns a
    /// single browsing session whose state (cookies, current document) is
    /// shared across calls.
    async fn render(&self, url: &Url) -> Result<RenderedPage, RenderError>;

    /// Attempts a best-effort login with the given credentials.
    ///
    /// Implementations must never treat a failure as fatal.
    async fn attempt_login(&self, credentials: &Credentials) -> LoginOutcome;
}
