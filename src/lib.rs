//! Kanso-Audit: a resumable web accessibility audit pipeline
//!
//! This crate implements a five-stage audit pipeline (discovery, capture,
//! analyze, filter, report) over a single site. Stage progress is persisted
//! in the configuration file between invocations, so any stage can be re-run
//! without repeating the stages before it.

pub mod analyzer;
pub mod artifacts;
pub mod config;
pub mod crawler;
pub mod pipeline;
pub mod renderer;
pub mod report;
pub mod url;

use thiserror::Error;

/// Main error type for Kanso-Audit operations
#[derive(Debug, Error)]
pub enum KansoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Render error: {0}")]
    Render(#[from] renderer::RenderError),

    #[error("Artifact error: {0}")]
    Artifact(#[from] artifacts::ArtifactError),

    /// A required upstream artifact is absent; fatal to the current stage.
    #[error("{0}")]
    MissingInput(String),

    /// A stage attempt ran and failed; the underlying cause is in `message`.
    #[error("Stage '{stage}' failed: {message}")]
    StageFailed { stage: Stage, message: String },

    /// A previously failed stage blocks the pipeline until an explicit reset.
    #[error("Stage '{stage}' is marked failed; reset it before running again")]
    StageBlocked { stage: Stage },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),
}

/// Result type alias for Kanso-Audit operations
pub type Result<T> = std::result::Result<T, KansoError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use analyzer::{Analyzer, Impact, Violation};
pub use config::Config;
pub use pipeline::{Orchestrator, Stage, StageStatus};
pub use renderer::Renderer;
pub use url::{content_id, normalize_url, same_origin};
