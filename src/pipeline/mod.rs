//! The stateful audit pipeline
//!
//! This module contains the pipeline core, including:
//! - The fixed five-stage enumeration and per-stage status values
//! - The persisted run state (task state store)
//! - The uniform stage executor
//! - The orchestrator control loop

mod executor;
mod orchestrator;
mod stage;
mod state;

pub use executor::{Overrides, StageExecutor};
pub use orchestrator::{Orchestrator, RunOptions};
pub use stage::{Stage, StageStatus};
pub use state::PipelineState;
