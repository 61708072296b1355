//! Common types and utilities for sdkpack
//!
//! This crate contains the descriptor types produced by application
//! introspection, the generation stage enumeration, and the error taxonomy
//! shared by the config, introspect, generator, and orchestrator crates.

mod descriptors;

pub use descriptors::{
    HttpMethod, Introspection, ModelDescriptor, PropertyDescriptor, PropertyKind, RouteDescriptor,
};

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while generating SDKs
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Invalid path {}: {reason}", .path.display())]
    Path { path: PathBuf, reason: String },

    #[error("Configuration is invalid:\n{}", format_violations(.0))]
    SchemaValidation(Vec<Violation>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to start application: {0}")]
    Start(String),

    #[error("Failed to stop application: {0}")]
    Stop(String),

    #[error("Introspection error: {0}")]
    Introspection(String),

    #[error("Unsupported ORM: {0}")]
    UnsupportedOrm(String),

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error("Failed to render template {template}: {message}")]
    Render { template: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl GeneratorError {
    /// Message to report when this error aborts a run, if the error
    /// carries one of its own
    pub fn abort_message(&self) -> Option<String> {
        match self {
            GeneratorError::Stage(stage_err) => Some(stage_err.to_string()),
            _ => None,
        }
    }

    /// Shorthand for a path error
    pub fn path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        GeneratorError::Path {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// A single violated configuration constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer of the offending value (e.g. `/global/api/hostname`)
    pub path: String,
    /// Human-readable description of the constraint
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{}: {}", path, self.message)
    }
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("  - {}", v))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The five ordered stages of a target's generation lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Prepare,
    Clean,
    Build,
    Test,
    Publish,
}

impl Stage {
    /// Every stage, in execution order
    pub const ALL: [Stage; 5] = [
        Stage::Prepare,
        Stage::Clean,
        Stage::Build,
        Stage::Test,
        Stage::Publish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Prepare => "prepare",
            Stage::Clean => "clean",
            Stage::Build => "build",
            Stage::Test => "test",
            Stage::Publish => "publish",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of one lifecycle stage of one target
#[derive(Debug)]
pub struct StageError {
    pub target: String,
    pub stage: Stage,
    /// Stage-supplied message; replaces the default when present
    pub message: Option<String>,
    pub source: Box<GeneratorError>,
}

impl StageError {
    pub fn new(target: impl Into<String>, stage: Stage, source: GeneratorError) -> Self {
        Self {
            target: target.into(),
            stage,
            message: None,
            source: Box::new(source),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Default report message naming the target and stage
    pub fn default_message(&self) -> String {
        format!("Error during {} {} stage", self.target, self.stage)
    }
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => f.write_str(message),
            None => f.write_str(&self.default_message()),
        }
    }
}

impl std::error::Error for StageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}
