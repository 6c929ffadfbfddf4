//! Content-addressed artifact storage
//!
//! Every stage writes its per-URL output under `<output-dir>/<stage>/`,
//! named by the URL's content identifier. Stages are decoupled by this
//! filesystem contract instead of in-memory handoff, which is what makes it
//! possible to re-run a later stage without re-running an earlier one.
//!
//! Artifacts are written once by their producing stage and never mutated by
//! a later one.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::analyzer::Violation;
use crate::pipeline::Stage;
use crate::url::content_id;

/// Artifact storage errors
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ArtifactResult<T> = std::result::Result<T, ArtifactError>;

/// The discovery stage's output: the seed plus the ordered page list
///
/// Written once after discovery, read by every later stage that needs the
/// URL set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryManifest {
    pub seed: String,
    pub pages: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// The capture stage's per-URL output
///
/// A failed capture still produces an artifact (`ok = false`, no markup) so
/// downstream stages have a deterministic file to read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureArtifact {
    pub url: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-URL output of the analyze stage, and (with the reduced violation
/// list) of the filter stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisArtifact {
    pub url: String,
    pub ok: bool,
    pub violations: Vec<Violation>,
}

/// Filesystem-backed artifact store rooted at the configured output
/// directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding one stage's artifacts
    pub fn stage_dir(&self, stage: Stage) -> PathBuf {
        self.root.join(stage.as_config_str())
    }

    fn url_path(&self, stage: Stage, url: &Url) -> PathBuf {
        self.stage_dir(stage).join(format!("{}.json", content_id(url)))
    }

    /// Removes all prior stage output; missing directories are fine
    pub fn clean(&self) -> ArtifactResult<()> {
        for stage in Stage::all_stages() {
            let dir = self.stage_dir(stage);
            if dir.exists() {
                fs::remove_dir_all(&dir)?;
                debug!("Removed {}", dir.display());
            }
        }
        Ok(())
    }

    // ----- discovery -----

    pub fn write_manifest(&self, manifest: &DiscoveryManifest) -> ArtifactResult<()> {
        self.write_json(&self.manifest_path(), manifest)
    }

    /// Reads the discovery manifest; None when discovery has not produced one
    pub fn read_manifest(&self) -> ArtifactResult<Option<DiscoveryManifest>> {
        self.read_json(&self.manifest_path())
    }

    fn manifest_path(&self) -> PathBuf {
        self.stage_dir(Stage::Discovery).join("manifest.json")
    }

    // ----- capture -----

    pub fn write_capture(&self, url: &Url, artifact: &CaptureArtifact) -> ArtifactResult<()> {
        self.write_json(&self.url_path(Stage::Capture, url), artifact)
    }

    pub fn read_capture(&self, url: &Url) -> ArtifactResult<Option<CaptureArtifact>> {
        self.read_json(&self.url_path(Stage::Capture, url))
    }

    // ----- analyze -----

    pub fn write_analysis(&self, url: &Url, artifact: &AnalysisArtifact) -> ArtifactResult<()> {
        self.write_json(&self.url_path(Stage::Analyze, url), artifact)
    }

    pub fn read_analysis(&self, url: &Url) -> ArtifactResult<Option<AnalysisArtifact>> {
        self.read_json(&self.url_path(Stage::Analyze, url))
    }

    // ----- filter -----

    pub fn write_filtered(&self, url: &Url, artifact: &AnalysisArtifact) -> ArtifactResult<()> {
        self.write_json(&self.url_path(Stage::Filter, url), artifact)
    }

    pub fn read_filtered(&self, url: &Url) -> ArtifactResult<Option<AnalysisArtifact>> {
        self.read_json(&self.url_path(Stage::Filter, url))
    }

    // ----- report -----

    /// Writes the rendered HTML summary and returns its path
    pub fn write_report(&self, html: &str) -> ArtifactResult<PathBuf> {
        let path = self.stage_dir(Stage::Report).join("index.html");
        ensure_parent(&path)?;
        fs::write(&path, html)?;
        Ok(path)
    }

    // ----- helpers -----

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> ArtifactResult<()> {
        ensure_parent(path)?;
        let data = serde_json::to_vec_pretty(value)?;
        fs::write(path, data)?;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    fn read_json<T: for<'de> Deserialize<'de>>(&self, path: &Path) -> ArtifactResult<Option<T>> {
        match fs::read(path) {
            Ok(data) => Ok(Some(serde_json::from_slice(&data)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn ensure_parent(path: &Path) -> ArtifactResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
