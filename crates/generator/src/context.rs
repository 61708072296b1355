//! The per-target object handed to a generator lifecycle

use indexmap::IndexMap;
use sdkpack_common::{Introspection, ModelDescriptor, Result, RouteDescriptor};
use sdkpack_config::{RouteOverride, TargetConfig};
use serde_json::Value;

/// Effective target configuration extended with the introspected API
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub config: TargetConfig,
    /// Resource prefix reported by the application
    pub api_pathname: String,
    /// Introspected routes with the declared overrides applied
    pub routes: Vec<RouteDescriptor>,
    pub models: IndexMap<String, ModelDescriptor>,
}

impl GenerationContext {
    /// Combine a merged target configuration with the run's introspection
    ///
    /// A declared route whose method and path match an introspected route
    /// renames it; any other declared route is appended.
    pub fn new(mut config: TargetConfig, introspection: &Introspection) -> Self {
        let declared = std::mem::take(&mut config.settings.routes);
        let routes = apply_route_overrides(introspection.routes.clone(), &declared);

        if config.settings.api.pathname.is_none() && !introspection.api_pathname.is_empty() {
            config.settings.api.pathname = Some(introspection.api_pathname.clone());
        }

        Self {
            config,
            api_pathname: introspection.api_pathname.clone(),
            routes,
            models: introspection.models.clone(),
        }
    }

    pub fn target(&self) -> &str {
        &self.config.name
    }

    /// Models that are exposed, i.e. not the empty descriptor
    pub fn exposed_models(&self) -> impl Iterator<Item = (&String, &ModelDescriptor)> {
        self.models.iter().filter(|(_, model)| !model.is_empty())
    }

    /// Flat JSON object templates render against
    ///
    /// Holds every configuration key (camelCase, plus `delPattern` and the
    /// target options) alongside `apiPathname`, `routes` and `models`.
    pub fn to_value(&self) -> Result<Value> {
        let mut value = serde_json::to_value(&self.config)?;
        if let Value::Object(map) = &mut value {
            map.insert("apiPathname".to_string(), Value::String(self.api_pathname.clone()));
            map.insert("routes".to_string(), serde_json::to_value(&self.routes)?);
            map.insert("models".to_string(), serde_json::to_value(&self.models)?);
        }
        Ok(value)
    }
}

fn apply_route_overrides(
    mut routes: Vec<RouteDescriptor>,
    declared: &[RouteOverride],
) -> Vec<RouteDescriptor> {
    for route in declared {
        match routes
            .iter_mut()
            .find(|r| r.method == route.method && r.path == route.path)
        {
            Some(existing) => existing.name = route.name.clone(),
            None => routes.push(RouteDescriptor {
                path: route.path.clone(),
                method: route.method,
                name: route.name.clone(),
            }),
        }
    }
    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdkpack_common::HttpMethod;

    fn route(method: HttpMethod, path: &str, name: &str) -> RouteDescriptor {
        RouteDescriptor {
            path: path.to_string(),
            method,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_declared_routes_rename_or_append() {
        let introspected = vec![
            route(HttpMethod::Get, "/user/me", "userMe"),
            route(HttpMethod::Post, "/user/me", "userMe"),
        ];
        let declared = vec![
            RouteOverride {
                method: HttpMethod::Get,
                path: "/user/me".to_string(),
                name: "currentUser".to_string(),
            },
            RouteOverride {
                method: HttpMethod::Get,
                path: "/health".to_string(),
                name: "health".to_string(),
            },
        ];

        let routes = apply_route_overrides(introspected, &declared);

        assert_eq!(routes.len(), 3);
        assert_eq!(routes[0].name, "currentUser");
        assert_eq!(routes[1].name, "userMe");
        assert_eq!(routes[2], route(HttpMethod::Get, "/health", "health"));
    }
}
