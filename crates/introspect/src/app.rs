//! The backend application boundary
//!
//! Anything that can report a routing table, a resource prefix, and an ORM
//! data layer can be introspected. Adapters binding to a real framework live
//! outside this crate; [`crate::SnapshotApp`] reads a recorded snapshot.

use async_trait::async_trait;
use indexmap::IndexMap;
use sdkpack_common::Result;
use serde::{Deserialize, Serialize};

/// Method spec of a source route: `"*"`, a single method, or a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteMethod {
    One(String),
    Many(Vec<String>),
}

impl RouteMethod {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, RouteMethod::One(m) if m == "*")
    }
}

/// One entry of the application's resolved routing table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRoute {
    pub path: String,
    pub method: RouteMethod,
    /// Handler identifier such as `UserController.find`
    pub handler: String,
}

impl AppRoute {
    pub fn new(
        path: impl Into<String>,
        method: impl Into<String>,
        handler: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            method: RouteMethod::One(method.into()),
            handler: handler.into(),
        }
    }
}

/// Schema-level model options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaOptions {
    #[serde(default)]
    pub timestamps: bool,
}

/// Model configuration object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub schema: Option<SchemaOptions>,
}

impl ModelConfig {
    pub fn tracks_timestamps(&self) -> bool {
        self.schema.as_ref().is_some_and(|s| s.timestamps)
    }
}

/// One declared field of an ORM schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub required: bool,
}

impl SchemaField {
    pub fn new(type_name: impl Into<String>, required: bool) -> Self {
        Self {
            type_name: type_name.into(),
            required,
        }
    }
}

/// A model as the ORM declares it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppModel {
    #[serde(default)]
    pub config: Option<ModelConfig>,
    /// Field name to field, in document order
    #[serde(default)]
    pub schema: Option<IndexMap<String, SchemaField>>,
}

/// The ORM layer backing the application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataLayer {
    pub orm: String,
    #[serde(default)]
    pub models: IndexMap<String, AppModel>,
}

/// A backend application that can be started, queried, and stopped
#[async_trait]
pub trait BackendApp: Send + Sync {
    /// Start the application; resolves once it is ready
    async fn start(&mut self) -> Result<()>;

    /// Stop the application
    async fn stop(&mut self) -> Result<()>;

    /// Resolved routing table, in registration order
    fn routes(&self) -> Vec<AppRoute>;

    /// Path segment the auto-generated REST endpoints are mounted under
    fn api_prefix(&self) -> String;

    /// ORM data layer, if the application has one
    fn data_layer(&self) -> Option<DataLayer>;
}
