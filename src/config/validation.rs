use crate::config::types::Config;
use crate::ConfigError;
use url::Url;

/// Validates a parsed configuration
///
/// Configuration errors are fatal: they abort the process before any stage
/// runs, so nothing here is recoverable.
///
/// # Rules
///
/// - `base-url` must be an absolute URL with an `http` or `https` scheme
/// - `login-url` (when present) must satisfy the same constraint
/// - `output-dir` must be non-empty
/// - `timeout-secs` must be greater than zero
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_http_url("base-url", &config.global.base_url)?;

    if let Some(login_url) = &config.global.login_url {
        validate_http_url("login-url", login_url)?;
    }

    if config.global.output_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output-dir must not be empty".to_string(),
        ));
    }

    if config.global.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("{field} '{value}': {e}")))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{field} '{value}': scheme must be http or https"
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{field} '{value}': missing host"
        )));
    }

    Ok(())
}
