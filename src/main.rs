//! Kanso-Audit main entry point
//!
//! This is the command-line interface for the audit pipeline. One invocation
//! runs the next actionable stage (the default), the whole remaining
//! pipeline (`--all`), or one of the maintenance operations (`--reset`,
//! `--clean`).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use kanso_audit::analyzer::MarkupAnalyzer;
use kanso_audit::config::compute_config_hash;
use kanso_audit::pipeline::{Orchestrator, Overrides, PipelineState, RunOptions};
use kanso_audit::renderer::HttpRenderer;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Kanso-Audit: a resumable web accessibility audit pipeline
///
/// Kanso-Audit discovers pages on a site, captures their markup, runs
/// accessibility checks, filters the findings, and renders an HTML report.
/// Stage progress is persisted in the configuration file, so interrupted or
/// failed runs resume where they left off.
#[derive(Parser, Debug)]
#[command(name = "kanso-audit")]
#[command(version)]
#[command(about = "A resumable web accessibility audit pipeline", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (also the persisted pipeline state)
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Run all remaining stages instead of just the next one
    #[arg(long)]
    all: bool,

    /// Reset every stage to pending and exit
    #[arg(long, conflicts_with_all = ["all", "clean", "continue_after_discovery"])]
    reset: bool,

    /// Remove all prior stage output before running
    #[arg(long)]
    clean: bool,

    /// After a successful discovery, keep going through the remaining stages
    #[arg(long, conflicts_with = "all")]
    continue_after_discovery: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let state = PipelineState::load(&cli.config)?;
    if let Ok(hash) = compute_config_hash(&cli.config) {
        tracing::debug!("Configuration hash: {hash}");
    }

    let timeout = Duration::from_secs(state.config.global.timeout_secs);
    let login_url = state
        .config
        .global
        .login_url
        .as_deref()
        .map(Url::parse)
        .transpose()?;

    let renderer = Arc::new(HttpRenderer::new(timeout, login_url)?);
    let analyzer = Arc::new(MarkupAnalyzer::new());
    let overrides = Overrides::from_env();

    let mut orchestrator = Orchestrator::new(state, renderer, analyzer, overrides);

    if cli.reset {
        orchestrator.reset_all()?;
        println!("All stages reset to pending.");
        return Ok(());
    }

    let options = RunOptions {
        run_all: cli.all,
        clean: cli.clean,
        auto_continue: cli.continue_after_discovery,
    };

    // A stage failure propagates as a non-zero exit, carrying the stage name
    // and the underlying cause.
    orchestrator.run(options).await?;

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kanso_audit=info,warn"),
            1 => EnvFilter::new("kanso_audit=debug,info"),
            2 => EnvFilter::new("kanso_audit=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
