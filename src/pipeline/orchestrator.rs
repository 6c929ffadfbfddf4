//! The pipeline orchestrator
//!
//! The control loop that drives the five stages: find the next actionable
//! stage, mark it running, execute it, record the result, and either stop
//! (single-step) or continue until the pipeline is complete or a stage
//! fails. Every status transition is persisted before and after execution,
//! which is what makes a later invocation resume where this one stopped.

use std::sync::Arc;

use tracing::{error, info};

use crate::analyzer::Analyzer;
use crate::artifacts::ArtifactStore;
use crate::pipeline::executor::{Overrides, StageExecutor};
use crate::pipeline::{PipelineState, Stage, StageStatus};
use crate::renderer::Renderer;
use crate::{KansoError, Result};

/// How one orchestrator invocation should behave
#[derive(Debug, Default, Clone)]
pub struct RunOptions {
    /// Run stages until the pipeline completes instead of stopping after one
    pub run_all: bool,

    /// Remove all prior stage output before running
    pub clean: bool,

    /// Once discovery succeeds, switch single-step mode into run-all for the
    /// rest of this invocation
    pub auto_continue: bool,
}

/// Single-threaded stage scheduler over the persisted pipeline state
pub struct Orchestrator {
    state: PipelineState,
    store: ArtifactStore,
    executor: StageExecutor,
}

impl Orchestrator {
    pub fn new(
        state: PipelineState,
        renderer: Arc<dyn Renderer>,
        analyzer: Arc<dyn Analyzer>,
        overrides: Overrides,
    ) -> Self {
        let store = ArtifactStore::new(state.config.global.output_dir.clone());
        let executor = StageExecutor::new(renderer, analyzer, store.clone(), overrides);
        Self {
            state,
            store,
            executor,
        }
    }

    /// Read access to the current (in-memory) pipeline state
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Force-resets every stage to pending and persists the change
    pub fn reset_all(&mut self) -> Result<()> {
        self.state.reset_all();
        self.state.save()?;
        info!("All stages reset to pending");
        Ok(())
    }

    /// Runs the pipeline according to the options.
    ///
    /// In run-all mode the loop halts at the first failure and nothing after
    /// the failed stage is attempted. In single-step mode exactly one
    /// actionable stage executes. Either way the failure (or a previously
    /// failed stage blocking the pipeline) surfaces as an error.
    pub async fn run(&mut self, options: RunOptions) -> Result<()> {
        if options.clean {
            info!("Cleaning prior output");
            self.store.clean()?;
        }

        let mut run_all = options.run_all;

        loop {
            if let Some(stage) = self.state.blocked_on() {
                error!("Stage '{stage}' previously failed; reset required");
                return Err(KansoError::StageBlocked { stage });
            }

            let Some(stage) = self.state.next_actionable() else {
                info!("No actionable stage remains");
                break;
            };

            self.execute_stage(stage).await?;

            if stage == Stage::Discovery && options.auto_continue {
                run_all = true;
            }
            if !run_all {
                break;
            }
        }

        self.apply_rescan_policy()?;
        Ok(())
    }

    /// Executes one stage with the two persisted transitions around it
    async fn execute_stage(&mut self, stage: Stage) -> Result<()> {
        info!("Running stage '{stage}'");
        self.state.set_status(stage, StageStatus::Running);
        self.state.save()?;

        match self.executor.execute(stage, &self.state.config).await {
            Ok(()) => {
                self.state.set_status(stage, StageStatus::Done);
                self.state.save()?;
                info!("Stage '{stage}' done");
                Ok(())
            }
            Err(e) => {
                self.state.set_status(stage, StageStatus::Failed);
                self.state.save()?;
                error!("Stage '{stage}' failed: {e}");
                Err(KansoError::StageFailed {
                    stage,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Trailing-reset policy: after a full pipeline completion, pre-reset
    /// the scan stages so the next invocation re-analyzes the already
    /// captured pages without re-crawling. Overridable via `rescan = false`.
    fn apply_rescan_policy(&mut self) -> Result<()> {
        if !self.state.config.global.rescan || !self.state.all_done() {
            return Ok(());
        }

        self.state.reset_from(Stage::Analyze);
        self.state.save()?;
        info!("Pipeline complete; analyze/filter/report reset to pending for the next run");
        Ok(())
    }
}
