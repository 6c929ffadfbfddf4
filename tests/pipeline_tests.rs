//! Integration tests for the audit pipeline
//!
//! These tests use wiremock to stand up a small site and drive the
//! orchestrator end-to-end: discovery, capture, analysis, filtering, and
//! report rendering, plus the resumption and failure-blocking behavior.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use kanso_audit::analyzer::MarkupAnalyzer;
use kanso_audit::config::load_config;
use kanso_audit::pipeline::{
    Orchestrator, Overrides, PipelineState, RunOptions, Stage, StageStatus,
};
use kanso_audit::renderer::HttpRenderer;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts a three-page site: a clean root, a page with violations, and a
/// linked page that 404s.
async fn mount_small_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                r#"<html lang="en"><head><title>Home</title></head><body>
                    <a href="/page1">Page 1</a>
                    <a href="/missing">Broken</a>
                    <a href="mailto:someone@example.com">Mail</a>
                    </body></html>"#,
                "text/html",
            ),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                r#"<html lang="en"><head><title>Page 1</title></head><body>
                    <img src="hero.png">
                    <a href="/">Home</a>
                    </body></html>"#,
                "text/html",
            ),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

struct TestPipeline {
    _workdir: TempDir,
    config_path: PathBuf,
    output_dir: PathBuf,
}

impl TestPipeline {
    fn new(base_url: &str, extra: &str) -> Self {
        let workdir = TempDir::new().unwrap();
        let output_dir = workdir.path().join("out");
        let config_path = workdir.path().join("audit.toml");

        let config = format!(
            r#"
[global]
base-url = "{base_url}"
output-dir = "{}"
page-budget = 10
timeout-secs = 5
{extra}

[stages.filter]
status = "pending"
tags = ["wcag2a"]
"#,
            output_dir.display()
        );
        fs::write(&config_path, config).unwrap();

        Self {
            _workdir: workdir,
            config_path,
            output_dir,
        }
    }

    fn orchestrator(&self) -> Orchestrator {
        let state = PipelineState::load(&self.config_path).unwrap();
        let renderer = Arc::new(HttpRenderer::new(Duration::from_secs(5), None).unwrap());
        Orchestrator::new(
            state,
            renderer,
            Arc::new(MarkupAnalyzer::new()),
            Overrides::default(),
        )
    }

    /// Reads a stage's status back from the persisted configuration
    fn persisted_status(&self, stage: Stage) -> StageStatus {
        let config = load_config(&self.config_path).unwrap();
        config.stage(stage).status
    }

    fn manifest_pages(&self) -> Vec<String> {
        let raw = fs::read(self.output_dir.join("discovery/manifest.json")).unwrap();
        let manifest: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        manifest["pages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    fn report_html(&self) -> String {
        fs::read_to_string(self.output_dir.join("report/index.html")).unwrap()
    }
}

fn run_all() -> RunOptions {
    RunOptions {
        run_all: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_full_pipeline_run_all() {
    let server = MockServer::start().await;
    mount_small_site(&server).await;

    let pipeline = TestPipeline::new(&format!("{}/", server.uri()), "");
    let mut orchestrator = pipeline.orchestrator();

    orchestrator.run(run_all()).await.unwrap();

    // The failed page still occupies a discovery slot; the mailto link never
    // entered the frontier.
    let pages = pipeline.manifest_pages();
    assert_eq!(
        pages,
        vec![
            format!("{}/", server.uri()),
            format!("{}/page1", server.uri()),
            format!("{}/missing", server.uri()),
        ]
    );

    // Discovery/Capture stay done; the trailing-reset policy pre-resets the
    // scan stages for the next invocation.
    assert_eq!(pipeline.persisted_status(Stage::Discovery), StageStatus::Done);
    assert_eq!(pipeline.persisted_status(Stage::Capture), StageStatus::Done);
    assert_eq!(pipeline.persisted_status(Stage::Analyze), StageStatus::Pending);
    assert_eq!(pipeline.persisted_status(Stage::Filter), StageStatus::Pending);
    assert_eq!(pipeline.persisted_status(Stage::Report), StageStatus::Pending);

    let report = pipeline.report_html();
    assert!(report.contains("image-alt"));
    assert!(report.contains("could not be loaded"));
}

#[tokio::test]
async fn test_rescan_policy_can_be_disabled() {
    let server = MockServer::start().await;
    mount_small_site(&server).await;

    let pipeline = TestPipeline::new(&format!("{}/", server.uri()), "rescan = false");
    let mut orchestrator = pipeline.orchestrator();

    orchestrator.run(run_all()).await.unwrap();

    for stage in Stage::all_stages() {
        assert_eq!(pipeline.persisted_status(stage), StageStatus::Done);
    }
}

#[tokio::test]
async fn test_single_step_gating() {
    let server = MockServer::start().await;
    mount_small_site(&server).await;

    let pipeline = TestPipeline::new(&format!("{}/", server.uri()), "");

    // First single step executes discovery and only discovery
    pipeline
        .orchestrator()
        .run(RunOptions::default())
        .await
        .unwrap();
    assert_eq!(pipeline.persisted_status(Stage::Discovery), StageStatus::Done);
    assert_eq!(pipeline.persisted_status(Stage::Capture), StageStatus::Pending);

    // Second single step (a fresh invocation) executes capture
    pipeline
        .orchestrator()
        .run(RunOptions::default())
        .await
        .unwrap();
    assert_eq!(pipeline.persisted_status(Stage::Capture), StageStatus::Done);
    assert_eq!(pipeline.persisted_status(Stage::Analyze), StageStatus::Pending);
}

#[tokio::test]
async fn test_failure_blocks_progress_until_reset() {
    let server = MockServer::start().await;
    mount_small_site(&server).await;

    let pipeline = TestPipeline::new(&format!("{}/", server.uri()), "");

    // Run discovery, then sabotage capture by removing its required input
    pipeline
        .orchestrator()
        .run(RunOptions::default())
        .await
        .unwrap();
    fs::remove_file(pipeline.output_dir.join("discovery/manifest.json")).unwrap();

    let err = pipeline
        .orchestrator()
        .run(run_all())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("capture"));
    assert_eq!(pipeline.persisted_status(Stage::Capture), StageStatus::Failed);
    assert_eq!(pipeline.persisted_status(Stage::Analyze), StageStatus::Pending);

    // A subsequent run-all halts without attempting analyze
    let err = pipeline.orchestrator().run(run_all()).await.unwrap_err();
    assert!(err.to_string().contains("reset"));
    assert_eq!(pipeline.persisted_status(Stage::Analyze), StageStatus::Pending);

    // An explicit reset unblocks everything
    let mut orchestrator = pipeline.orchestrator();
    orchestrator.reset_all().unwrap();
    for stage in Stage::all_stages() {
        assert_eq!(pipeline.persisted_status(stage), StageStatus::Pending);
    }
}

#[tokio::test]
async fn test_auto_continue_after_discovery() {
    let server = MockServer::start().await;
    mount_small_site(&server).await;

    let pipeline = TestPipeline::new(&format!("{}/", server.uri()), "rescan = false");
    let mut orchestrator = pipeline.orchestrator();

    orchestrator
        .run(RunOptions {
            auto_continue: true,
            ..Default::default()
        })
        .await
        .unwrap();

    // Single-step mode switched to run-all once discovery succeeded
    for stage in Stage::all_stages() {
        assert_eq!(pipeline.persisted_status(stage), StageStatus::Done);
    }
}

#[tokio::test]
async fn test_clean_removes_previous_output() {
    let server = MockServer::start().await;
    mount_small_site(&server).await;

    let pipeline = TestPipeline::new(&format!("{}/", server.uri()), "rescan = false");
    pipeline.orchestrator().run(run_all()).await.unwrap();
    assert!(pipeline.output_dir.join("report/index.html").exists());

    // Reset and re-run with clean: stale output disappears before stages run
    let mut orchestrator = pipeline.orchestrator();
    orchestrator.reset_all().unwrap();

    let mut orchestrator = pipeline.orchestrator();
    orchestrator
        .run(RunOptions {
            run_all: false,
            clean: true,
            auto_continue: false,
        })
        .await
        .unwrap();

    // Only discovery ran after the clean
    assert!(pipeline.output_dir.join("discovery/manifest.json").exists());
    assert!(!pipeline.output_dir.join("report/index.html").exists());
}

#[tokio::test]
async fn test_page_list_override_skips_traversal() {
    let server = MockServer::start().await;
    mount_small_site(&server).await;

    let pipeline = TestPipeline::new(&format!("{}/", server.uri()), "");
    let state = PipelineState::load(&pipeline.config_path).unwrap();
    let renderer = Arc::new(HttpRenderer::new(Duration::from_secs(5), None).unwrap());
    let overrides = Overrides {
        pages: Some(vec![format!("{}/page1", server.uri())]),
        ..Default::default()
    };
    let mut orchestrator = Orchestrator::new(
        state,
        renderer,
        Arc::new(MarkupAnalyzer::new()),
        overrides,
    );

    orchestrator.run(RunOptions::default()).await.unwrap();

    assert_eq!(
        pipeline.manifest_pages(),
        vec![format!("{}/page1", server.uri())]
    );
}

#[tokio::test]
async fn test_reuse_capture_avoids_live_navigation() {
    let server = MockServer::start().await;
    mount_small_site(&server).await;

    let pipeline = TestPipeline::new(&format!("{}/", server.uri()), "rescan = false");

    // Discovery + capture against the live server
    pipeline
        .orchestrator()
        .run(RunOptions::default())
        .await
        .unwrap();
    pipeline
        .orchestrator()
        .run(RunOptions::default())
        .await
        .unwrap();

    // Shut the site down; analysis must still succeed from captured markup
    drop(server);

    let state = PipelineState::load(&pipeline.config_path).unwrap();
    let renderer = Arc::new(HttpRenderer::new(Duration::from_secs(1), None).unwrap());
    let overrides = Overrides {
        reuse_capture: true,
        ..Default::default()
    };
    let mut orchestrator = Orchestrator::new(
        state,
        renderer,
        Arc::new(MarkupAnalyzer::new()),
        overrides,
    );

    orchestrator.run(run_all()).await.unwrap();

    let report = pipeline.report_html();
    assert!(report.contains("image-alt"));
}

#[tokio::test]
async fn test_login_success_via_redirect() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                r#"<html lang="en"><head><title>Login</title></head><body>
                    <form action="/session" method="post">
                        <input type="hidden" name="csrf" value="tok123">
                        <input type="text" name="user">
                        <input type="password" name="pass">
                    </form>
                    </body></html>"#,
                "text/html",
            ),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/session"))
        .and(body_string_contains("user=admin"))
        .and(body_string_contains("pass=secret"))
        .and(body_string_contains("csrf=tok123"))
        .respond_with(
            ResponseTemplate::new(303).insert_header("location", "/welcome"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/welcome"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><body>in</body></html>", "text/html"),
        )
        .mount(&server)
        .await;

    use kanso_audit::renderer::{Credentials, LoginOutcome, Renderer};

    let login_url = url::Url::parse(&format!("{}/login", server.uri())).unwrap();
    let renderer = HttpRenderer::new(Duration::from_secs(5), Some(login_url)).unwrap();
    let outcome = renderer
        .attempt_login(&Credentials {
            username: "admin".to_string(),
            password: "secret".to_string(),
        })
        .await;

    assert_eq!(outcome, LoginOutcome::Success);
}

#[tokio::test]
async fn test_login_failure_is_not_fatal_to_discovery() {
    let server = MockServer::start().await;
    mount_small_site(&server).await;

    // No form on the login page: the attempt fails, the audit proceeds
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><body>No form here</body></html>", "text/html"),
        )
        .mount(&server)
        .await;

    let pipeline = TestPipeline::new(
        &format!("{}/", server.uri()),
        &format!("login-url = \"{}/login\"", server.uri()),
    );

    let state = PipelineState::load(&pipeline.config_path).unwrap();
    let login_url = url::Url::parse(&format!("{}/login", server.uri())).unwrap();
    let renderer = Arc::new(HttpRenderer::new(Duration::from_secs(5), Some(login_url)).unwrap());
    let overrides = Overrides {
        credentials: Some(kanso_audit::renderer::Credentials {
            username: "admin".to_string(),
            password: "secret".to_string(),
        }),
        ..Default::default()
    };
    let mut orchestrator = Orchestrator::new(
        state,
        renderer,
        Arc::new(MarkupAnalyzer::new()),
        overrides,
    );

    orchestrator.run(RunOptions::default()).await.unwrap();

    assert_eq!(pipeline.persisted_status(Stage::Discovery), StageStatus::Done);
    assert_eq!(pipeline.manifest_pages().len(), 3);
}

#[tokio::test]
async fn test_capture_writes_failure_marker() {
    let server = MockServer::start().await;
    mount_small_site(&server).await;

    let pipeline = TestPipeline::new(&format!("{}/", server.uri()), "");
    pipeline
        .orchestrator()
        .run(RunOptions::default())
        .await
        .unwrap();
    pipeline
        .orchestrator()
        .run(RunOptions::default())
        .await
        .unwrap();

    // Every discovered page has a capture artifact, including the 404
    let capture_dir = pipeline.output_dir.join("capture");
    let artifacts: Vec<PathBuf> = fs::read_dir(&capture_dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(artifacts.len(), 3);

    let failed = artifacts
        .iter()
        .filter_map(|p| read_capture(p))
        .filter(|v| v["ok"] == serde_json::Value::Bool(false))
        .count();
    assert_eq!(failed, 1);
}

#[tokio::test]
async fn test_slow_page_times_out_and_capture_continues() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                r#"<html lang="en"><head><title>Home</title></head><body>
                    <a href="/slow">Slow</a>
                    </body></html>"#,
                "text/html",
            ),
        )
        .mount(&server)
        .await;

    // Responds well past the renderer's per-URL timeout
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    "<html lang=\"en\"><head><title>Slow</title></head><body></body></html>",
                    "text/html",
                )
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let pipeline = TestPipeline::new(&format!("{}/", server.uri()), "");
    let renderer = Arc::new(HttpRenderer::new(Duration::from_secs(1), None).unwrap());
    let run_stage = |renderer: Arc<HttpRenderer>| {
        let state = PipelineState::load(&pipeline.config_path).unwrap();
        Orchestrator::new(
            state,
            renderer,
            Arc::new(MarkupAnalyzer::new()),
            Overrides::default(),
        )
    };

    run_stage(renderer.clone())
        .run(RunOptions::default())
        .await
        .unwrap();
    run_stage(renderer)
        .run(RunOptions::default())
        .await
        .unwrap();

    // The slow page got a failure marker; the stage itself still completed
    assert_eq!(pipeline.persisted_status(Stage::Capture), StageStatus::Done);

    let artifacts: Vec<serde_json::Value> = fs::read_dir(pipeline.output_dir.join("capture"))
        .unwrap()
        .filter_map(|e| read_capture(&e.unwrap().path()))
        .collect();
    assert_eq!(artifacts.len(), 2);

    let timed_out = artifacts
        .iter()
        .find(|a| a["ok"] == serde_json::Value::Bool(false))
        .unwrap();
    assert!(timed_out["error"].as_str().unwrap().contains("timeout"));
}

fn read_capture(path: &Path) -> Option<serde_json::Value> {
    let raw = fs::read(path).ok()?;
    serde_json::from_slice(&raw).ok()
}
