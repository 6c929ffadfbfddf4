//! Configuration module for Kanso-Audit
//!
//! This module handles loading, validating, and rewriting the TOML
//! configuration file. The file is also the pipeline's task state store:
//! each stage section carries a `status` key that the orchestrator reads
//! before a stage runs and writes back afterwards.
//!
//! # Example
//!
//! ```no_run
//! use kanso_audit::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("audit.toml")).unwrap();
//! println!("Auditing: {}", config.global.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, GlobalConfig, StageSection, StageTable};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, save_config};
