//! Registry of available SDK targets

use crate::javascript_node::JavaScriptNode;
use crate::SdkGenerator;
use indexmap::IndexMap;
use sdkpack_common::{GeneratorError, Result};
use sdkpack_config::TargetSchema;

/// Creates a fresh generator for one run of a target
pub type GeneratorFactory = Box<dyn Fn() -> Result<Box<dyn SdkGenerator>> + Send + Sync>;

struct TargetEntry {
    schema: TargetSchema,
    description: String,
    factory: GeneratorFactory,
}

/// Maps target names to their option schema and generator factory
#[derive(Default)]
pub struct GeneratorRegistry {
    entries: IndexMap<String, TargetEntry>,
}

impl GeneratorRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in target
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(
            JavaScriptNode::schema(),
            JavaScriptNode::DESCRIPTION,
            Box::new(|| Ok(Box::new(JavaScriptNode::new()?) as Box<dyn SdkGenerator>)),
        );
        registry
    }

    /// Add or replace a target
    pub fn register(
        &mut self,
        schema: TargetSchema,
        description: impl Into<String>,
        factory: GeneratorFactory,
    ) {
        self.entries.insert(
            schema.name.clone(),
            TargetEntry {
                schema,
                description: description.into(),
                factory,
            },
        );
    }

    /// Option schemas, for the configuration validator
    pub fn schemas(&self) -> Vec<TargetSchema> {
        self.entries.values().map(|e| e.schema.clone()).collect()
    }

    pub fn available_targets(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// `(name, description)` of every target, in registration order
    pub fn describe(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, e)| (name.as_str(), e.description.as_str()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Instantiate the generator of `name`
    pub fn create(&self, name: &str) -> Result<Box<dyn SdkGenerator>> {
        let entry = self.entries.get(name).ok_or_else(|| {
            GeneratorError::Config(format!(
                "Unknown SDK target: {} (available: {})",
                name,
                self.available_targets().join(", ")
            ))
        })?;
        (entry.factory)()
    }
}
