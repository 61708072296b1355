//! Run orchestration for sdkpack
//!
//! One [`Orchestrator`] run starts the backend application, loads and merges
//! the configuration, introspects the application, then drives every
//! configured SDK target through its lifecycle, strictly one after the other.
//!
//! # Examples
//!
//! ```no_run
//! use sdkpack_config::ConfigStore;
//! use sdkpack_generator::GeneratorRegistry;
//! use sdkpack_introspect::SnapshotApp;
//! use sdkpack_orchestrator::Orchestrator;
//! use std::path::{Path, PathBuf};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = GeneratorRegistry::builtin();
//! let store = ConfigStore::new(registry.schemas())?;
//! let app = SnapshotApp::new(Path::new("./app"));
//!
//! let mut orchestrator =
//!     Orchestrator::new(PathBuf::from("sdkpack.yaml"), Box::new(app), registry, store);
//! let report = orchestrator.run().await?;
//! println!("{}", report.message);
//! # Ok(())
//! # }
//! ```

mod orchestrator;

pub use orchestrator::{Orchestrator, RunReport, RunState, SUCCESS_MESSAGE};

use sdkpack_common::GeneratorError;
use std::fmt;
use thiserror::Error;

/// Phase of a run an abort is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Preparation,
    Generation,
}

impl Phase {
    /// Report message used when the error carries none of its own
    pub fn default_message(&self) -> &'static str {
        match self {
            Phase::Start => "Failed to start application",
            Phase::Preparation => "Error during preparation",
            Phase::Generation => "Error during SDK generation",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Start => "start",
            Phase::Preparation => "preparation",
            Phase::Generation => "generation",
        };
        f.write_str(name)
    }
}

/// Terminal failure of a run
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RunError {
    pub phase: Phase,
    pub message: String,
    #[source]
    pub source: GeneratorError,
}

impl RunError {
    /// Tag `source` with its phase, keeping any message it already carries
    pub fn new(phase: Phase, source: GeneratorError) -> Self {
        let message = source
            .abort_message()
            .unwrap_or_else(|| phase.default_message().to_string());
        Self {
            phase,
            message,
            source,
        }
    }
}
