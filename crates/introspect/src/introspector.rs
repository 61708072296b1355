//! Lifecycle and extraction entry point over a backend application

use crate::app::BackendApp;
use crate::{models, routes};
use indexmap::IndexMap;
use sdkpack_common::{GeneratorError, Introspection, ModelDescriptor, Result, RouteDescriptor};
use tracing::{debug, error, info};

/// Owns the backend application for one run
pub struct AppIntrospector {
    app: Box<dyn BackendApp>,
    running: bool,
}

impl AppIntrospector {
    pub fn new(app: Box<dyn BackendApp>) -> Self {
        Self {
            app,
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start the application
    pub async fn start(&mut self) -> Result<()> {
        debug!("Starting application");
        match self.app.start().await {
            Ok(()) => {
                self.running = true;
                info!("Application started");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Application failed to start");
                Err(match e {
                    GeneratorError::Start(_) => e,
                    other => GeneratorError::Start(other.to_string()),
                })
            }
        }
    }

    /// Stop the application
    ///
    /// Failures are logged and returned to the caller, which decides whether
    /// they matter.
    pub async fn stop(&mut self) -> Result<()> {
        debug!("Stopping application");
        let result = self.app.stop().await;
        self.running = false;
        match result {
            Ok(()) => {
                info!("Application stopped");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Application failed to stop");
                Err(match e {
                    GeneratorError::Stop(_) => e,
                    other => GeneratorError::Stop(other.to_string()),
                })
            }
        }
    }

    pub fn extract_routes(&self) -> Result<Vec<RouteDescriptor>> {
        self.ensure_running()?;
        let descriptors = routes::extract_routes(&self.app.routes());
        debug!(routes = descriptors.len(), "Extracted routes");
        Ok(descriptors)
    }

    pub fn extract_api_prefix(&self) -> Result<String> {
        self.ensure_running()?;
        Ok(self.app.api_prefix())
    }

    pub fn extract_models(&self) -> Result<IndexMap<String, ModelDescriptor>> {
        self.ensure_running()?;
        let descriptors = models::extract_models(self.app.data_layer().as_ref())?;
        debug!(models = descriptors.len(), "Extracted models");
        Ok(descriptors)
    }

    /// Run every extraction and bundle the results
    pub fn introspect(&self) -> Result<Introspection> {
        Ok(Introspection {
            api_pathname: self.extract_api_prefix()?,
            routes: self.extract_routes()?,
            models: self.extract_models()?,
        })
    }

    fn ensure_running(&self) -> Result<()> {
        if self.running {
            Ok(())
        } else {
            Err(GeneratorError::Introspection(
                "application is not running".to_string(),
            ))
        }
    }
}
