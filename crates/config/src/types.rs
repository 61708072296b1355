//! Typed view of a validated configuration document

use crate::scope::DeletionScope;
use indexmap::IndexMap;
use sdkpack_common::HttpMethod;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Validated configuration: the global section plus every declared target
#[derive(Debug, Clone)]
pub struct Configuration {
    pub global: GlobalConfig,
    /// Target overrides in declaration order
    pub sdks: IndexMap<String, TargetOverride>,
}

impl Configuration {
    /// Declared target names, in execution order
    pub fn target_names(&self) -> impl Iterator<Item = &str> {
        self.sdks.keys().map(String::as_str)
    }
}

/// Settings shared by every target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    pub app_path: PathBuf,
    pub dest: PathBuf,
    pub prefix: String,
    pub project_name: String,
    pub version: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bugs: Option<Bugs>,
    pub license: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Person>,
    pub keywords: Vec<String>,
    pub contributors: Vec<Person>,
    pub api: ApiConfig,
    pub routes: Vec<RouteOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<Repository>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Https,
}

/// Where the generated SDK will reach the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub protocol: Protocol,
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pathname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<IndexMap<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub email: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bugs {
    pub url: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

/// Declared route entry: renames a discovered route or adds a new one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteOverride {
    pub method: HttpMethod,
    pub path: String,
    pub name: String,
}

/// Raw section of one target, split into global-key overrides and
/// target-only options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetOverride {
    pub name: String,
    pub overrides: Map<String, Value>,
    pub options: Map<String, Value>,
}

/// Effective settings of one target after merging with the global section
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetConfig {
    #[serde(skip)]
    pub name: String,
    #[serde(flatten)]
    pub settings: GlobalConfig,
    /// Target-only options such as `private`
    #[serde(flatten)]
    pub options: Map<String, Value>,
    #[serde(rename = "delPattern")]
    pub deletion_scope: DeletionScope,
}

impl TargetConfig {
    /// Directory the target writes its artifacts into
    pub fn output_path(&self) -> &std::path::Path {
        &self.settings.dest
    }

    /// Boolean target option, falling back to `default` when absent
    pub fn option_bool(&self, key: &str, default: bool) -> bool {
        self.options
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }
}
