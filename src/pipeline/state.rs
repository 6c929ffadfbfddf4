//! The pipeline run state and its persistence
//!
//! `PipelineState` is the explicit state object handed to the orchestrator:
//! the full configuration (including every stage's status) plus the path it
//! was loaded from. It is loaded once per invocation and saved at defined
//! checkpoints, after each stage transition.

use std::path::{Path, PathBuf};

use crate::config::{load_config, save_config, Config};
use crate::pipeline::{Stage, StageStatus};
use crate::ConfigResult;

/// The ordered collection of stage records plus global configuration
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub config: Config,
    path: PathBuf,
}

impl PipelineState {
    /// Loads and validates the state from the configuration file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let config = load_config(path)?;
        Ok(Self {
            config,
            path: path.to_path_buf(),
        })
    }

    /// Wraps an already-parsed configuration (used by tests)
    pub fn from_config(config: Config, path: PathBuf) -> Self {
        Self { config, path }
    }

    /// Writes the whole state back to the configuration file
    pub fn save(&self) -> ConfigResult<()> {
        save_config(&self.path, &self.config)
    }

    /// Returns the persisted status of a stage
    pub fn status(&self, stage: Stage) -> StageStatus {
        self.config.stage(stage).status
    }

    /// Sets a stage's status without checking transition legality.
    ///
    /// Legality is orchestrator policy, not a store invariant; the store
    /// records whatever it is told.
    pub fn set_status(&mut self, stage: Stage, status: StageStatus) {
        self.config.stage_mut(stage).status = status;
    }

    /// Finds the next stage the orchestrator may execute.
    ///
    /// Scans stages in the fixed order: the first actionable stage wins,
    /// `Done` stages are skipped, and a `Failed` stage stops the scan.
    /// Nothing after a failed stage is eligible until it is reset.
    pub fn next_actionable(&self) -> Option<Stage> {
        for stage in Stage::all_stages() {
            let status = self.status(stage);
            if status.is_actionable() {
                return Some(stage);
            }
            if status == StageStatus::Failed {
                return None;
            }
        }
        None
    }

    /// Returns the failed stage that currently blocks the pipeline, if any
    pub fn blocked_on(&self) -> Option<Stage> {
        for stage in Stage::all_stages() {
            let status = self.status(stage);
            if status == StageStatus::Failed {
                return Some(stage);
            }
            if status.is_actionable() {
                return None;
            }
        }
        None
    }

    /// True when every stage is `Done`
    pub fn all_done(&self) -> bool {
        Stage::all_stages()
            .iter()
            .all(|&s| self.status(s) == StageStatus::Done)
    }

    /// Force-resets every stage to `Pending`, regardless of prior state
    pub fn reset_all(&mut self) {
        for stage in Stage::all_stages() {
            self.set_status(stage, StageStatus::Pending);
        }
    }

    /// Resets the given stage and every stage after it to `Pending`
    pub fn reset_from(&mut self, from: Stage) {
        for stage in Stage::all_stages() {
            if stage >= from {
                self.set_status(stage, StageStatus::Pending);
            }
        }
    }
}
