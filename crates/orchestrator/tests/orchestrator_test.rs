//! Run-level behavior: ordering, fail-fast, and application shutdown

use async_trait::async_trait;
use indexmap::IndexMap;
use mockall::mock;
use sdkpack_common::{GeneratorError, Result, Stage};
use sdkpack_config::{ConfigStore, TargetSchema};
use sdkpack_generator::{output, GenerationContext, GeneratorRegistry, SdkGenerator};
use sdkpack_introspect::{AppRoute, BackendApp, DataLayer};
use sdkpack_orchestrator::{Orchestrator, Phase, RunState, SUCCESS_MESSAGE};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

mock! {
    pub App {}

    #[async_trait]
    impl BackendApp for App {
        async fn start(&mut self) -> Result<()>;
        async fn stop(&mut self) -> Result<()>;
        fn routes(&self) -> Vec<AppRoute>;
        fn api_prefix(&self) -> String;
        fn data_layer(&self) -> Option<DataLayer>;
    }
}

type Journal = Arc<Mutex<Vec<String>>>;

/// Target that writes `index.js` during build, or fails there
struct FakeTarget {
    name: &'static str,
    fail_build: bool,
    journal: Journal,
}

impl FakeTarget {
    fn record(&self, stage: Stage) {
        self.journal
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.name, stage));
    }
}

#[async_trait]
impl SdkGenerator for FakeTarget {
    fn id(&self) -> &str {
        self.name
    }

    async fn prepare(&mut self, _ctx: &GenerationContext) -> Result<()> {
        self.record(Stage::Prepare);
        Ok(())
    }

    async fn clean(&mut self, ctx: &GenerationContext) -> Result<()> {
        self.record(Stage::Clean);
        output::ensure_dir(ctx.config.output_path())?;
        output::purge(&ctx.config.deletion_scope)?;
        Ok(())
    }

    async fn build(&mut self, ctx: &GenerationContext) -> Result<()> {
        self.record(Stage::Build);
        if self.fail_build {
            return Err(GeneratorError::Render {
                template: "index.js".to_string(),
                message: "unexpected end of template".to_string(),
            });
        }
        std::fs::write(ctx.config.output_path().join("index.js"), "module.exports = {}")?;
        Ok(())
    }

    async fn test(&mut self, _ctx: &GenerationContext) -> Result<()> {
        self.record(Stage::Test);
        Ok(())
    }

    async fn publish(&mut self, _ctx: &GenerationContext) -> Result<()> {
        self.record(Stage::Publish);
        Ok(())
    }
}

fn registry(journal: &Journal, failing: &[&'static str]) -> GeneratorRegistry {
    let mut registry = GeneratorRegistry::new();
    for name in ["alpha", "beta", "gamma"] {
        let journal = journal.clone();
        let fail_build = failing.contains(&name);
        registry.register(
            TargetSchema::new(name),
            "fake target",
            Box::new(move || {
                Ok(Box::new(FakeTarget {
                    name,
                    fail_build,
                    journal: journal.clone(),
                }) as Box<dyn SdkGenerator>)
            }),
        );
    }
    registry
}

/// App expected to start once and stop exactly once
fn app(start_ok: bool, stop_ok: bool) -> MockApp {
    let mut app = MockApp::new();
    app.expect_start().times(1).returning(move || {
        if start_ok {
            Ok(())
        } else {
            Err(GeneratorError::Start("address in use".to_string()))
        }
    });
    app.expect_stop().times(1).returning(move || {
        if stop_ok {
            Ok(())
        } else {
            Err(GeneratorError::Stop("still busy".to_string()))
        }
    });
    app.expect_routes()
        .returning(|| vec![AppRoute::new("/api/v1/{model}", "*", "FootprintController.find")]);
    app.expect_api_prefix().returning(|| "/api/v1".to_string());
    app.expect_data_layer().returning(|| {
        Some(DataLayer {
            orm: "mongoose".to_string(),
            models: IndexMap::new(),
        })
    });
    app
}

fn write_config(dir: &Path, sdks: serde_json::Value) -> PathBuf {
    std::fs::create_dir_all(dir.join("app")).unwrap();
    std::fs::create_dir_all(dir.join("output")).unwrap();
    let path = dir.join("sdkpack.json");
    let doc = json!({
        "global": { "appPath": "app", "api": { "hostname": "localhost" } },
        "sdks": sdks
    });
    std::fs::write(&path, doc.to_string()).unwrap();
    path
}

fn orchestrator(dir: &TempDir, config: PathBuf, app: MockApp, registry: GeneratorRegistry) -> Orchestrator {
    let store = ConfigStore::new(registry.schemas())
        .unwrap()
        .with_base_dir(dir.path());
    Orchestrator::new(config, Box::new(app), registry, store)
}

#[tokio::test]
async fn test_all_targets_succeed_in_configuration_order() {
    let dir = TempDir::new().unwrap();
    let journal = Journal::default();
    let config = write_config(
        dir.path(),
        json!({ "beta": { "projectName": "beta-sdk" }, "alpha": {} }),
    );

    let mut run = orchestrator(&dir, config, app(true, true), registry(&journal, &[]));
    let report = run.run().await.unwrap();

    assert_eq!(report.targets, vec!["beta", "alpha"]);
    assert_eq!(report.message, SUCCESS_MESSAGE);
    assert_eq!(run.state(), RunState::Succeeded);

    let journal = journal.lock().unwrap();
    assert_eq!(journal.len(), 10);
    assert_eq!(journal[0], "beta:prepare");
    assert_eq!(journal[4], "beta:publish");
    assert_eq!(journal[5], "alpha:prepare");

    assert!(dir.path().join("output/beta-sdk/index.js").is_file());
    assert!(dir.path().join("output/api-sdk/index.js").is_file());
}

#[tokio::test]
async fn test_failing_target_aborts_the_run() {
    let dir = TempDir::new().unwrap();
    let journal = Journal::default();
    let config = write_config(
        dir.path(),
        json!({
            "alpha": { "projectName": "alpha-sdk" },
            "beta": { "projectName": "beta-sdk" },
            "gamma": { "projectName": "gamma-sdk" }
        }),
    );

    let mut run = orchestrator(&dir, config, app(true, true), registry(&journal, &["beta"]));
    let err = run.run().await.unwrap_err();

    assert_eq!(err.phase, Phase::Generation);
    assert_eq!(err.message, "Error during beta build stage");
    assert_eq!(run.state(), RunState::Aborted);

    let journal = journal.lock().unwrap();
    assert_eq!(journal.last().map(String::as_str), Some("beta:build"));
    assert!(!journal.iter().any(|entry| entry.starts_with("gamma")));

    assert!(dir.path().join("output/alpha-sdk/index.js").is_file());
    assert!(dir.path().join("output/beta-sdk").is_dir());
    assert!(!dir.path().join("output/beta-sdk/index.js").exists());
    assert!(!dir.path().join("output/gamma-sdk").exists());
}

#[tokio::test]
async fn test_start_failure_still_stops_once() {
    let dir = TempDir::new().unwrap();
    let journal = Journal::default();
    let config = write_config(dir.path(), json!({ "alpha": {} }));

    let mut run = orchestrator(&dir, config, app(false, true), registry(&journal, &[]));
    let err = run.run().await.unwrap_err();

    assert_eq!(err.phase, Phase::Start);
    assert_eq!(err.message, "Failed to start application");
    assert!(matches!(err.source, GeneratorError::Start(_)));
    assert!(journal.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_configuration_aborts_before_any_target() {
    let dir = TempDir::new().unwrap();
    let journal = Journal::default();
    std::fs::create_dir_all(dir.path().join("output")).unwrap();
    let config = dir.path().join("sdkpack.json");
    std::fs::write(
        &config,
        json!({ "global": { "api": { "hostname": "localhost" } }, "sdks": { "alpha": {} } })
            .to_string(),
    )
    .unwrap();

    let mut run = orchestrator(&dir, config, app(true, true), registry(&journal, &[]));
    let err = run.run().await.unwrap_err();

    assert_eq!(err.phase, Phase::Preparation);
    assert_eq!(err.message, "Error during preparation");
    match &err.source {
        GeneratorError::SchemaValidation(violations) => {
            assert!(violations.iter().any(|v| v.path == "/global/appPath"));
        }
        other => panic!("expected schema violations, got {:?}", other),
    }
    assert!(journal.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unsupported_orm_aborts_preparation() {
    let dir = TempDir::new().unwrap();
    let journal = Journal::default();
    let config = write_config(dir.path(), json!({ "alpha": {} }));

    let mut app = MockApp::new();
    app.expect_start().times(1).returning(|| Ok(()));
    app.expect_stop().times(1).returning(|| Ok(()));
    app.expect_routes().returning(Vec::new);
    app.expect_api_prefix().returning(String::new);
    app.expect_data_layer().returning(|| None);

    let mut run = orchestrator(&dir, config, app, registry(&journal, &[]));
    let err = run.run().await.unwrap_err();

    assert_eq!(err.phase, Phase::Preparation);
    assert!(matches!(err.source, GeneratorError::UnsupportedOrm(_)));
    assert!(journal.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_stop_failure_is_not_escalated() {
    let dir = TempDir::new().unwrap();
    let journal = Journal::default();
    let config = write_config(dir.path(), json!({ "alpha": {} }));

    let mut run = orchestrator(&dir, config, app(true, false), registry(&journal, &[]));
    let report = run.run().await.unwrap();

    assert_eq!(report.targets, vec!["alpha"]);
}

#[tokio::test]
async fn test_orchestrator_runs_once() {
    let dir = TempDir::new().unwrap();
    let journal = Journal::default();
    let config = write_config(dir.path(), json!({ "alpha": {} }));

    let mut run = orchestrator(&dir, config, app(true, true), registry(&journal, &[]));
    run.run().await.unwrap();

    let err = run.run().await.unwrap_err();
    assert_eq!(err.phase, Phase::Start);
    assert_eq!(run.state(), RunState::Succeeded);
}
