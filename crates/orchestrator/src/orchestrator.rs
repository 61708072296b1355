//! The run state machine

use crate::{Phase, RunError};
use sdkpack_common::{GeneratorError, Result};
use sdkpack_config::ConfigStore;
use sdkpack_generator::{run_lifecycle, GenerationContext, GeneratorRegistry};
use sdkpack_introspect::{AppIntrospector, BackendApp};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Message of a successful run
pub const SUCCESS_MESSAGE: &str = "All SDKs have been built!";

/// States of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Starting,
    Preparing,
    /// Driving target lifecycles, one at a time
    Generating,
    Succeeded,
    Aborted,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Targets that completed their lifecycle, in execution order
    pub targets: Vec<String>,
    pub message: String,
}

/// Owns the application and the targets for a single run
pub struct Orchestrator {
    config_path: PathBuf,
    store: ConfigStore,
    introspector: AppIntrospector,
    registry: GeneratorRegistry,
    state: RunState,
}

impl Orchestrator {
    pub fn new(
        config_path: PathBuf,
        app: Box<dyn BackendApp>,
        registry: GeneratorRegistry,
        store: ConfigStore,
    ) -> Self {
        Self {
            config_path,
            store,
            introspector: AppIntrospector::new(app),
            registry,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Execute the run
    ///
    /// The application is stopped exactly once before this returns, whatever
    /// the outcome. An orchestrator runs once; later calls fail without
    /// touching the application.
    pub async fn run(&mut self) -> std::result::Result<RunReport, RunError> {
        if self.state != RunState::Idle {
            return Err(RunError::new(
                Phase::Start,
                GeneratorError::Config("this orchestrator has already run".to_string()),
            ));
        }

        self.transition(RunState::Starting);
        if let Err(e) = self.introspector.start().await {
            return Err(self.abort(Phase::Start, e).await);
        }

        self.transition(RunState::Preparing);
        let contexts = match self.prepare() {
            Ok(contexts) => contexts,
            Err(e) => return Err(self.abort(Phase::Preparation, e).await),
        };

        self.transition(RunState::Generating);
        let mut completed = Vec::with_capacity(contexts.len());
        for ctx in &contexts {
            if let Err(e) = self.generate(ctx).await {
                return Err(self.abort(Phase::Generation, e).await);
            }
            completed.push(ctx.target().to_string());
        }

        self.shutdown().await;
        self.transition(RunState::Succeeded);
        info!(targets = completed.len(), "{}", SUCCESS_MESSAGE);

        Ok(RunReport {
            targets: completed,
            message: SUCCESS_MESSAGE.to_string(),
        })
    }

    /// Load configuration, introspect, and merge one context per target
    fn prepare(&self) -> Result<Vec<GenerationContext>> {
        let config = self.store.load(&self.config_path)?;
        let introspection = self.introspector.introspect()?;

        info!(
            routes = introspection.routes.len(),
            models = introspection.models.len(),
            "Introspected application"
        );

        config
            .target_names()
            .map(|name| -> Result<GenerationContext> {
                let target = self.store.merge(&config, name)?;
                debug!(sdk = %name, dest = %target.output_path().display(), "Resolved target");
                Ok(GenerationContext::new(target, &introspection))
            })
            .collect()
    }

    async fn generate(&self, ctx: &GenerationContext) -> Result<()> {
        info!(sdk = %ctx.target(), "Generating SDK");
        let mut generator = self.registry.create(ctx.target())?;
        run_lifecycle(generator.as_mut(), ctx).await
    }

    async fn abort(&mut self, phase: Phase, source: GeneratorError) -> RunError {
        let err = RunError::new(phase, source);
        error!(phase = %phase, error = %err.source, "{}", err.message);

        self.shutdown().await;
        self.transition(RunState::Aborted);
        err
    }

    /// Stop the application; failures are logged, never escalated
    async fn shutdown(&mut self) {
        if let Err(e) = self.introspector.stop().await {
            warn!(error = %e, "Ignoring failure to stop application");
        }
    }

    fn transition(&mut self, next: RunState) {
        debug!(from = ?self.state, to = ?next, "Run state change");
        self.state = next;
    }
}
