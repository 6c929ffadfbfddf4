/// Stage and status definitions for the audit pipeline
///
/// This module defines the fixed, totally ordered set of pipeline stages and
/// the per-stage status values persisted in the configuration file.
use std::fmt;

use serde::{Deserialize, Serialize};

/// One discrete step of the fixed five-step pipeline.
///
/// The declaration order is the execution order and must never change:
/// every later stage consumes artifacts produced by an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Traverse the site from the seed URL and produce the page list
    Discovery,

    /// Render each discovered page and store its markup
    Capture,

    /// Run accessibility checks against each page
    Analyze,

    /// Reduce raw findings to the report-ready subset
    Filter,

    /// Render the HTML summary document
    Report,
}

impl Stage {
    /// Returns all stages in execution order
    pub fn all_stages() -> [Self; 5] {
        [
            Self::Discovery,
            Self::Capture,
            Self::Analyze,
            Self::Filter,
            Self::Report,
        ]
    }

    /// Converts the stage to its configuration section name
    pub fn as_config_str(&self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Capture => "capture",
            Self::Analyze => "analyze",
            Self::Filter => "filter",
            Self::Report => "report",
        }
    }

    /// Parses a stage from its configuration section name
    ///
    /// Returns None if the string doesn't match any known stage.
    pub fn from_config_str(s: &str) -> Option<Self> {
        match s {
            "discovery" => Some(Self::Discovery),
            "capture" => Some(Self::Capture),
            "analyze" => Some(Self::Analyze),
            "filter" => Some(Self::Filter),
            "report" => Some(Self::Report),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_config_str())
    }
}

/// The persisted status of a single stage
///
/// A stage's status is mutated only by the orchestrator, exactly twice per
/// execution attempt: to `Running` before invocation and to `Done` or
/// `Failed` after. A missing status in the configuration reads as `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    /// Stage has not run yet (or was reset)
    Pending,

    /// Stage was started; a restart treats this as resumable and re-runs it
    Running,

    /// Stage completed successfully
    Done,

    /// Stage failed; blocks the pipeline until an explicit reset
    Failed,
}

impl StageStatus {
    /// Returns true if the next-actionable scan may select a stage in this
    /// status.
    ///
    /// `Running` is actionable on purpose: a crash mid-stage leaves the
    /// status behind, and the stage is simply re-run from scratch.
    pub fn is_actionable(&self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }

    /// Converts the status to its configuration string representation
    pub fn as_config_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Parses a status from its configuration string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_config_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "running" => Some(Self::Running),
            "done" => Some(Self::Done),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl Default for StageStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_config_str())
    }
}
