//! Login form discovery
//!
//! Locates a login form by probing the page for a form that contains a
//! password input. The probing is deliberately tolerant: sites name their
//! fields inconsistently, and a miss only means the audit runs
//! unauthenticated.

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A login form extracted from a page
#[derive(Debug, Clone)]
pub(crate) struct LoginForm {
    /// Absolute form submission target
    pub action: Url,

    /// Name of the username/email input
    pub username_field: String,

    /// Name of the password input
    pub password_field: String,

    /// Hidden inputs submitted alongside the credentials (CSRF tokens etc.)
    pub hidden_fields: Vec<(String, String)>,
}

/// Finds the first form on the page that contains a password input.
///
/// Returns None when no such form exists or when the form is missing the
/// pieces needed to submit it.
pub(crate) fn find_login_form(html: &str, base: &Url) -> Option<LoginForm> {
    let document = Html::parse_document(html);
    let form_selector = Selector::parse("form").ok()?;
    let password_selector = Selector::parse("input[type='password']").ok()?;

    for form in document.select(&form_selector) {
        let Some(password) = form.select(&password_selector).next() else {
            continue;
        };
        let Some(password_field) = password.value().attr("name") else {
            continue;
        };

        let Some(username_field) = find_username_field(&form) else {
            continue;
        };

        let action = match form.value().attr("action") {
            Some(action) if !action.trim().is_empty() => base.join(action.trim()).ok()?,
            _ => base.clone(),
        };

        return Some(LoginForm {
            action,
            username_field: username_field.to_string(),
            password_field: password_field.to_string(),
            hidden_fields: collect_hidden_fields(&form),
        });
    }

    None
}

/// Picks the username input: the first text/email input with a name, or any
/// named input that is not the password itself.
fn find_username_field<'a>(form: &ElementRef<'a>) -> Option<&'a str> {
    let text_selector = Selector::parse(
        "input[type='text'][name], input[type='email'][name], input:not([type])[name]",
    )
    .ok()?;

    form.select(&text_selector)
        .next()
        .and_then(|input| input.value().attr("name"))
}

fn collect_hidden_fields(form: &ElementRef<'_>) -> Vec<(String, String)> {
    let Ok(hidden_selector) = Selector::parse("input[type='hidden'][name]") else {
        return Vec::new();
    };

    form.select(&hidden_selector)
        .filter_map(|input| {
            let name = input.value().attr("name")?;
            let value = input.value().attr("value").unwrap_or("");
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}
