use serde::{Deserialize, Serialize};

use crate::pipeline::{Stage, StageStatus};

/// Main configuration structure for Kanso-Audit
///
/// The configuration file doubles as the task state store: the `status` key
/// of each stage section is read before a stage runs and written back after,
/// so the file on disk is the resumability backbone of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub global: GlobalConfig,
    #[serde(default)]
    pub stages: StageTable,
}

/// Global audit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Seed URL; its origin bounds the crawl
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Root directory for all stage output artifacts
    #[serde(rename = "output-dir", default = "default_output_dir")]
    pub output_dir: String,

    /// Maximum number of pages discovery may attempt
    #[serde(rename = "page-budget", default = "default_page_budget")]
    pub page_budget: usize,

    /// Per-URL navigation timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Trailing-reset policy: when the whole pipeline has completed, pre-reset
    /// Analyze/Filter/Report to pending so the next invocation re-scans the
    /// captured pages without re-crawling. Discovery and Capture stay done.
    #[serde(default = "default_rescan")]
    pub rescan: bool,

    /// Optional page holding the login form, for the best-effort
    /// authenticated-crawl mode
    #[serde(rename = "login-url", default, skip_serializing_if = "Option::is_none")]
    pub login_url: Option<String>,
}

fn default_output_dir() -> String {
    "./audit-output".to_string()
}

fn default_page_budget() -> usize {
    25
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_rescan() -> bool {
    true
}

/// The five per-stage configuration sections, in execution order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageTable {
    #[serde(default)]
    pub discovery: StageSection,
    #[serde(default)]
    pub capture: StageSection,
    #[serde(default)]
    pub analyze: StageSection,
    #[serde(default)]
    pub filter: StageSection,
    #[serde(default)]
    pub report: StageSection,
}

/// One stage's persisted record: its status plus stage-specific options
///
/// Options are carried verbatim as a TOML table. The orchestrator never
/// interprets them; they are passed through to stage execution untouched and
/// survive every status rewrite unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageSection {
    #[serde(default)]
    pub status: StageStatus,

    #[serde(flatten)]
    pub options: toml::Table,
}

impl Config {
    /// Returns the section for a stage
    pub fn stage(&self, stage: Stage) -> &StageSection {
        match stage {
            Stage::Discovery => &self.stages.discovery,
            Stage::Capture => &self.stages.capture,
            Stage::Analyze => &self.stages.analyze,
            Stage::Filter => &self.stages.filter,
            Stage::Report => &self.stages.report,
        }
    }

    /// Returns the mutable section for a stage
    pub fn stage_mut(&mut self, stage: Stage) -> &mut StageSection {
        match stage {
            Stage::Discovery => &mut self.stages.discovery,
            Stage::Capture => &mut self.stages.capture,
            Stage::Analyze => &mut self.stages.analyze,
            Stage::Filter => &mut self.stages.filter,
            Stage::Report => &mut self.stages.report,
        }
    }
}

impl StageSection {
    /// Reads a boolean option, defaulting to false when absent or mistyped
    pub fn bool_option(&self, key: &str) -> bool {
        self.options.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
    }

    /// Reads a string-array option, defaulting to empty when absent
    pub fn string_list_option(&self, key: &str) -> Vec<String> {
        self.options
            .get(key)
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}
