//! HTTP-backed renderer
//!
//! This renderer fetches markup with a plain HTTP client: readiness is
//! "response body received". It covers sites that render server-side, which
//! is the common case for the audit targets this tool was built for.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::renderer::login::{find_login_form, LoginForm};
use crate::renderer::{Credentials, LoginOutcome, RenderError, RenderedPage, Renderer};

/// Builds the shared HTTP client for the browsing session
///
/// The cookie store is enabled so a successful login carries over to every
/// later navigation in the same session.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let user_agent = format!(
        "{}/{} (accessibility audit)",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Renderer backed by a single reqwest client
pub struct HttpRenderer {
    client: Client,
    timeout: Duration,
    login_url: Option<Url>,
}

impl HttpRenderer {
    /// Creates a renderer with a per-URL navigation timeout.
    ///
    /// `login_url` is the page holding the login form; `attempt_login`
    /// returns `Failed` without it only when no form is found on the page.
    pub fn new(timeout: Duration, login_url: Option<Url>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client()?,
            timeout,
            login_url,
        })
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(&self, url: &Url) -> Result<RenderedPage, RenderError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.is_empty() && !content_type.contains("text/html") {
            return Err(RenderError::ContentMismatch {
                url: url.to_string(),
                content_type,
            });
        }

        let final_url = response.url().clone();
        let html = response.text().await.map_err(|e| RenderError::Http {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        debug!("Rendered {} ({} bytes)", final_url, html.len());

        Ok(RenderedPage {
            url: final_url,
            html,
        })
    }

    async fn attempt_login(&self, credentials: &Credentials) -> LoginOutcome {
        let Some(login_url) = &self.login_url else {
            debug!("No login-url configured, skipping login");
            return LoginOutcome::Skipped;
        };

        match self.try_login(login_url, credentials).await {
            Ok(outcome) => outcome,
            Err(e) => {
                // Login is best-effort: any error downgrades to a warning and
                // the audit proceeds unauthenticated.
                warn!("Login attempt failed: {e}; continuing unauthenticated");
                LoginOutcome::Failed
            }
        }
    }
}

impl HttpRenderer {
    async fn try_login(
        &self,
        login_url: &Url,
        credentials: &Credentials,
    ) -> Result<LoginOutcome, RenderError> {
        let page = self.render(login_url).await?;

        let Some(form) = find_login_form(&page.html, &page.url) else {
            warn!("No login form found at {login_url}; continuing unauthenticated");
            return Ok(LoginOutcome::Failed);
        };

        let outcome = self.submit_login_form(&form, credentials).await?;
        match outcome {
            LoginOutcome::Success => info!("Login succeeded via {}", form.action),
            _ => warn!("Login did not visibly redirect; continuing unauthenticated"),
        }
        Ok(outcome)
    }

    async fn submit_login_form(
        &self,
        form: &LoginForm,
        credentials: &Credentials,
    ) -> Result<LoginOutcome, RenderError> {
        let mut params: Vec<(String, String)> = form.hidden_fields.clone();
        params.push((form.username_field.clone(), credentials.username.clone()));
        params.push((form.password_field.clone(), credentials.password.clone()));

        let response = self
            .client
            .post(form.action.clone())
            .timeout(self.timeout)
            .form(&params)
            .send()
            .await
            .map_err(|e| classify_request_error(&form.action, e))?;

        // The client follows redirects, so a login that visibly redirected
        // ends up on a different URL than the form action.
        if response.url() != &form.action {
            Ok(LoginOutcome::Success)
        } else {
            Ok(LoginOutcome::Failed)
        }
    }
}

fn classify_request_error(url: &Url, error: reqwest::Error) -> RenderError {
    if error.is_timeout() {
        RenderError::Timeout {
            url: url.to_string(),
        }
    } else {
        RenderError::Http {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
