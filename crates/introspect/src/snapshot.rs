//! Backend application read from a recorded introspection snapshot

use crate::app::{AppRoute, BackendApp, DataLayer};
use async_trait::async_trait;
use sdkpack_common::{GeneratorError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File name of the snapshot inside the application directory
pub const SNAPSHOT_FILE: &str = "sdkpack.introspection.json";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    #[serde(default)]
    api_prefix: String,
    #[serde(default)]
    routes: Vec<AppRoute>,
    #[serde(default)]
    data_layer: Option<DataLayer>,
}

/// Serves routes and models recorded from a running application
#[derive(Debug, Clone)]
pub struct SnapshotApp {
    path: PathBuf,
    snapshot: Option<Snapshot>,
}

impl SnapshotApp {
    /// Snapshot stored in `app_path`
    pub fn new(app_path: &Path) -> Self {
        Self {
            path: app_path.join(SNAPSHOT_FILE),
            snapshot: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn loaded(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }
}

#[async_trait]
impl BackendApp for SnapshotApp {
    async fn start(&mut self) -> Result<()> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            GeneratorError::Start(format!("cannot read {}: {}", self.path.display(), e))
        })?;

        let snapshot: Snapshot = serde_json::from_str(&content).map_err(|e| {
            GeneratorError::Start(format!("malformed snapshot {}: {}", self.path.display(), e))
        })?;

        tracing::debug!(
            path = %self.path.display(),
            routes = snapshot.routes.len(),
            "Loaded introspection snapshot"
        );
        self.snapshot = Some(snapshot);
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.snapshot = None;
        Ok(())
    }

    fn routes(&self) -> Vec<AppRoute> {
        self.loaded().map(|s| s.routes.clone()).unwrap_or_default()
    }

    fn api_prefix(&self) -> String {
        self.loaded().map(|s| s.api_prefix.clone()).unwrap_or_default()
    }

    fn data_layer(&self) -> Option<DataLayer> {
        self.loaded().and_then(|s| s.data_layer.clone())
    }
}
