//! SDK generation for sdkpack
//!
//! This crate defines the five-stage lifecycle every SDK target implements,
//! builds the [`GenerationContext`] a target renders from, and ships the
//! built-in targets together with their templates.

mod context;
pub mod javascript_node;
pub mod output;
mod registry;
mod templates;

pub use context::GenerationContext;
pub use javascript_node::JavaScriptNode;
pub use registry::{GeneratorFactory, GeneratorRegistry};
pub use templates::load_templates;

use async_trait::async_trait;
use sdkpack_common::{GeneratorError, Result, Stage, StageError};
use tracing::{error, info};

/// One SDK target's generation lifecycle
///
/// Stages always run in the order prepare, clean, build, test, publish.
/// A stage may return its own [`StageError`] to supply a specific message;
/// any other error is tagged with the target and stage by
/// [`run_lifecycle`].
#[async_trait]
pub trait SdkGenerator: Send {
    /// Registered target name, e.g. `javascript-node`
    fn id(&self) -> &str;

    /// Compute target-local derived paths and strings
    async fn prepare(&mut self, ctx: &GenerationContext) -> Result<()>;

    /// Ensure the output directory exists and purge prior output
    async fn clean(&mut self, ctx: &GenerationContext) -> Result<()>;

    /// Render every artifact
    async fn build(&mut self, ctx: &GenerationContext) -> Result<()>;

    /// Validate the emitted output
    async fn test(&mut self, ctx: &GenerationContext) -> Result<()>;

    /// Persist or export the emitted output
    async fn publish(&mut self, ctx: &GenerationContext) -> Result<()>;
}

/// Drive a generator through all five stages
///
/// The first failing stage stops the lifecycle; its error is returned as a
/// [`GeneratorError::Stage`].
pub async fn run_lifecycle(generator: &mut dyn SdkGenerator, ctx: &GenerationContext) -> Result<()> {
    let sdk = generator.id().to_string();

    for stage in Stage::ALL {
        info!(sdk = %sdk, stage = %stage, "Running stage");

        let result = match stage {
            Stage::Prepare => generator.prepare(ctx).await,
            Stage::Clean => generator.clean(ctx).await,
            Stage::Build => generator.build(ctx).await,
            Stage::Test => generator.test(ctx).await,
            Stage::Publish => generator.publish(ctx).await,
        };

        if let Err(e) = result {
            let stage_err = match e {
                GeneratorError::Stage(stage_err) => stage_err,
                other => StageError::new(sdk.as_str(), stage, other),
            };
            error!(
                sdk = %sdk,
                stage = %stage,
                error = %stage_err.source,
                "{}",
                stage_err
            );
            return Err(stage_err.into());
        }
    }

    info!(sdk = %sdk, "SDK generated");
    Ok(())
}
