//! Loading configuration files from disk

use crate::merge;
use crate::schema::{validate_document, TargetSchema};
use crate::types::{Configuration, GlobalConfig, TargetConfig, TargetOverride};
use indexmap::IndexMap;
use sdkpack_common::{GeneratorError, Result};
use serde_json::Value;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(ConfigFormat::Json),
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            _ => Err(GeneratorError::path(
                path,
                "unsupported configuration format (expected .json, .yaml or .yml)",
            )),
        }
    }
}

/// Loads, validates, and merges configuration documents
///
/// Relative directories in a document resolve against `base_dir`, which
/// defaults to the process working directory.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    base_dir: PathBuf,
    targets: Vec<TargetSchema>,
}

impl ConfigStore {
    pub fn new(targets: Vec<TargetSchema>) -> Result<Self> {
        Ok(Self {
            base_dir: std::env::current_dir()?,
            targets,
        })
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Load and validate the configuration file at `path`
    pub fn load(&self, path: &Path) -> Result<Configuration> {
        let path = absolutize(&self.base_dir, path);
        tracing::info!("Loading configuration from {}", path.display());

        let content = fs::read_to_string(&path)
            .map_err(|e| GeneratorError::path(&path, format!("cannot read file: {}", e)))?;

        self.parse_str(&content, ConfigFormat::from_path(&path)?)
    }

    /// Parse and validate an in-memory configuration document
    pub fn parse_str(&self, content: &str, format: ConfigFormat) -> Result<Configuration> {
        let mut document: Value = match format {
            ConfigFormat::Json => serde_json::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        };

        validate_document(&mut document, &self.targets, &self.base_dir)
            .map_err(GeneratorError::SchemaValidation)?;

        let global = document
            .get("global")
            .cloned()
            .ok_or_else(|| GeneratorError::Config("missing global section".to_string()))?;
        let mut global: GlobalConfig = serde_json::from_value(global)?;
        global.app_path = absolutize(&self.base_dir, &global.app_path);
        global.dest = absolutize(&self.base_dir, &global.dest);

        let mut sdks = IndexMap::new();
        if let Some(Value::Object(sections)) = document.get("sdks") {
            for (name, section) in sections {
                sdks.insert(name.clone(), self.split_target(name, section));
            }
        }

        tracing::debug!(
            targets = sdks.len(),
            app_path = %global.app_path.display(),
            "Configuration validated"
        );

        Ok(Configuration { global, sdks })
    }

    /// Effective configuration of one declared target
    pub fn merge(&self, config: &Configuration, target: &str) -> Result<TargetConfig> {
        let section = config
            .sdks
            .get(target)
            .ok_or_else(|| GeneratorError::Config(format!("Unknown SDK target: {}", target)))?;
        merge::merge(&config.global, section)
    }

    fn split_target(&self, name: &str, section: &Value) -> TargetOverride {
        let schema = self.targets.iter().find(|t| t.name == name);
        let mut target = TargetOverride {
            name: name.to_string(),
            ..Default::default()
        };

        if let Value::Object(map) = section {
            for (key, value) in map {
                if schema.is_some_and(|s| s.has_option(key)) {
                    target.options.insert(key.clone(), value.clone());
                } else {
                    target.overrides.insert(key.clone(), value.clone());
                }
            }
        }
        target
    }
}

/// Join `path` onto `base` and normalize `.` and `..` lexically
fn absolutize(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("a.json")).unwrap(),
            ConfigFormat::Json
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("a.yml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert!(ConfigFormat::from_path(Path::new("a.toml")).is_err());
    }

    #[test]
    fn test_absolutize() {
        assert_eq!(
            absolutize(Path::new("/work"), Path::new("./output/../app")),
            PathBuf::from("/work/app")
        );
        assert_eq!(
            absolutize(Path::new("/work"), Path::new("/abs/dir")),
            PathBuf::from("/abs/dir")
        );
    }
}
