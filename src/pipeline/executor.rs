//! Uniform stage execution
//!
//! One executor implements the dispatch contract for all five stages:
//! `execute(stage)` either completes or returns an error, and the
//! orchestrator does not care which stage body ran. The native crawl and
//! capture variants and the analyzer-backed variants all live behind this
//! single seam.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::OnceCell;
use tracing::{info, warn};
use url::Url;

use crate::analyzer::Analyzer;
use crate::artifacts::{AnalysisArtifact, ArtifactStore, CaptureArtifact, DiscoveryManifest};
use crate::config::Config;
use crate::crawler::discover;
use crate::pipeline::Stage;
use crate::renderer::{Credentials, Renderer};
use crate::report::{filter_violations, render_report, PageReport, ReportSummary};
use crate::url::normalize_url;
use crate::{KansoError, Result};

/// Environment-style overrides threaded through from the command surface
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    /// Externally supplied page list; discovery skips traversal when set
    pub pages: Option<Vec<String>>,

    /// Credentials for the best-effort authenticated-crawl mode
    pub credentials: Option<Credentials>,

    /// Reuse previously captured markup instead of live navigation during
    /// analysis
    pub reuse_capture: bool,
}

impl Overrides {
    /// Builds overrides from `KANSO_*` environment variables
    pub fn from_env() -> Self {
        let pages = std::env::var("KANSO_PAGES")
            .ok()
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|v: &Vec<String>| !v.is_empty());

        let credentials = match (
            std::env::var("KANSO_USERNAME"),
            std::env::var("KANSO_PASSWORD"),
        ) {
            (Ok(username), Ok(password)) => Some(Credentials { username, password }),
            _ => None,
        };

        let reuse_capture = std::env::var("KANSO_REUSE_CAPTURE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            pages,
            credentials,
            reuse_capture,
        }
    }
}

/// Executes stage bodies against the renderer, analyzer, and artifact store
pub struct StageExecutor {
    renderer: Arc<dyn Renderer>,
    analyzer: Arc<dyn Analyzer>,
    store: ArtifactStore,
    overrides: Overrides,
    login_attempted: OnceCell<()>,
}

impl StageExecutor {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        analyzer: Arc<dyn Analyzer>,
        store: ArtifactStore,
        overrides: Overrides,
    ) -> Self {
        Self {
            renderer,
            analyzer,
            store,
            overrides,
            login_attempted: OnceCell::new(),
        }
    }

    /// Runs one stage to completion.
    ///
    /// The contract is uniform across stages: success, or an error carrying
    /// the reason. Status bookkeeping belongs to the orchestrator.
    pub async fn execute(&self, stage: Stage, config: &Config) -> Result<()> {
        match stage {
            Stage::Discovery => self.run_discovery(config).await,
            Stage::Capture => self.run_capture(config).await,
            Stage::Analyze => self.run_analyze(config).await,
            Stage::Filter => self.run_filter(config).await,
            Stage::Report => self.run_report(config).await,
        }
    }

    /// Best-effort login, at most once per invocation, only with credentials
    async fn ensure_login(&self) {
        let Some(credentials) = &self.overrides.credentials else {
            return;
        };
        self.login_attempted
            .get_or_init(|| async {
                let outcome = self.renderer.attempt_login(credentials).await;
                info!("Login attempt outcome: {outcome:?}");
            })
            .await;
    }

    fn require_manifest(&self) -> Result<DiscoveryManifest> {
        self.store.read_manifest()?.ok_or_else(|| {
            KansoError::MissingInput(
                "no discovery output found; run the discovery stage first".to_string(),
            )
        })
    }

    async fn run_discovery(&self, config: &Config) -> Result<()> {
        let seed = normalize_url(&config.global.base_url)?;
        self.ensure_login().await;

        let pages: Vec<Url> = match &self.overrides.pages {
            Some(list) => {
                info!("Page list supplied externally ({} page(s)); skipping traversal", list.len());
                list.iter()
                    .map(|s| normalize_url(s))
                    .collect::<std::result::Result<_, _>>()?
            }
            None => discover(self.renderer.as_ref(), &seed, config.global.page_budget).await?,
        };

        let manifest = DiscoveryManifest {
            seed: seed.to_string(),
            pages: pages.iter().map(|u| u.to_string()).collect(),
            generated_at: Utc::now(),
        };
        self.store.write_manifest(&manifest)?;

        info!("Discovery wrote manifest with {} page(s)", manifest.pages.len());
        Ok(())
    }

    async fn run_capture(&self, _config: &Config) -> Result<()> {
        let manifest = self.require_manifest()?;
        self.ensure_login().await;

        let mut captured = 0usize;
        let mut failed = 0usize;

        for page in &manifest.pages {
            let url = normalize_url(page)?;
            let artifact = match self.renderer.render(&url).await {
                Ok(rendered) => {
                    captured += 1;
                    CaptureArtifact {
                        url: url.to_string(),
                        ok: true,
                        html: Some(rendered.html),
                        error: None,
                    }
                }
                Err(e) => {
                    // Per-URL failure: write the marker so downstream stages
                    // have a deterministic file, then keep going.
                    warn!("Capture failed for {url}: {e}");
                    failed += 1;
                    CaptureArtifact {
                        url: url.to_string(),
                        ok: false,
                        html: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            self.store.write_capture(&url, &artifact)?;
        }

        info!("Capture finished: {captured} page(s) captured, {failed} failed");
        Ok(())
    }

    async fn run_analyze(&self, config: &Config) -> Result<()> {
        let manifest = self.require_manifest()?;

        let reuse_capture =
            self.overrides.reuse_capture || config.stage(Stage::Analyze).bool_option("reuse-capture");
        if reuse_capture {
            info!("Analyzing previously captured markup");
        } else {
            self.ensure_login().await;
        }

        for page in &manifest.pages {
            let url = normalize_url(page)?;

            let markup = if reuse_capture {
                match self.store.read_capture(&url)? {
                    Some(capture) if capture.ok => capture.html,
                    Some(_) => None,
                    None => {
                        warn!("No capture artifact for {url}; marking analysis failed");
                        None
                    }
                }
            } else {
                match self.renderer.render(&url).await {
                    Ok(rendered) => Some(rendered.html),
                    Err(e) => {
                        warn!("Navigation failed for {url}: {e}");
                        None
                    }
                }
            };

            let artifact = match markup {
                Some(html) => match self.analyzer.analyze(&url, &html).await {
                    Ok(violations) => AnalysisArtifact {
                        url: url.to_string(),
                        ok: true,
                        violations,
                    },
                    Err(e) => {
                        warn!("Analysis failed for {url}: {e}");
                        failed_analysis(&url)
                    }
                },
                None => failed_analysis(&url),
            };

            self.store.write_analysis(&url, &artifact)?;
        }

        info!("Analyze finished: {} page(s)", manifest.pages.len());
        Ok(())
    }

    async fn run_filter(&self, config: &Config) -> Result<()> {
        let manifest = self.require_manifest()?;
        let tags = config.stage(Stage::Filter).string_list_option("tags");

        let mut kept = 0usize;
        for page in &manifest.pages {
            let url = normalize_url(page)?;
            let analysis = self.store.read_analysis(&url)?.ok_or_else(|| {
                KansoError::MissingInput(format!(
                    "missing analysis artifact for {url}; run the analyze stage first"
                ))
            })?;

            let violations = filter_violations(analysis.violations, &tags);
            kept += violations.len();

            self.store.write_filtered(
                &url,
                &AnalysisArtifact {
                    url: analysis.url,
                    ok: analysis.ok,
                    violations,
                },
            )?;
        }

        info!("Filter finished: {kept} violation(s) kept");
        Ok(())
    }

    async fn run_report(&self, _config: &Config) -> Result<()> {
        let manifest = self.require_manifest()?;

        let mut pages = Vec::with_capacity(manifest.pages.len());
        for page in &manifest.pages {
            let url = normalize_url(page)?;
            let filtered = self.store.read_filtered(&url)?.ok_or_else(|| {
                KansoError::MissingInput(format!(
                    "missing filtered artifact for {url}; run the filter stage first"
                ))
            })?;
            pages.push(PageReport {
                url: filtered.url,
                ok: filtered.ok,
                violations: filtered.violations,
            });
        }

        let summary = ReportSummary {
            seed: manifest.seed.clone(),
            generated_at: Utc::now(),
            pages,
        };

        let path = self.store.write_report(&render_report(&summary))?;
        info!("Report written to {}", path.display());
        Ok(())
    }
}

fn failed_analysis(url: &Url) -> AnalysisArtifact {
    AnalysisArtifact {
        url: url.to_string(),
        ok: false,
        violations: Vec::new(),
    }
}
