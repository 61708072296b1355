//! Route extraction from the application's routing table

use crate::app::{AppRoute, RouteMethod};
use sdkpack_common::{HttpMethod, RouteDescriptor};
use tracing::{debug, warn};

/// Handler of the authentication callback, never exposed in an SDK
pub const AUTH_CALLBACK_HANDLER: &str = "AuthController.callback";

const RESOURCE_SUFFIX: &str = "Footprint";
const RESOURCE_REPLACEMENT: &str = "Model";
const CONTROLLER_SUFFIX: &str = "Controller";

/// Translate a routing table into route descriptors
///
/// Wildcard and multi-method routes produce one descriptor per method, named
/// with the lower-cased method as prefix.
pub fn extract_routes(routes: &[AppRoute]) -> Vec<RouteDescriptor> {
    let mut descriptors = Vec::with_capacity(routes.len());

    for route in routes {
        if route.handler == AUTH_CALLBACK_HANDLER {
            debug!(path = %route.path, "Skipping authentication callback route");
            continue;
        }

        let name = route_name(&route.handler);

        match &route.method {
            method if method.is_wildcard() => {
                for method in HttpMethod::ALL {
                    descriptors.push(expanded(route, method, &name));
                }
            }
            RouteMethod::Many(methods) => {
                for raw in methods {
                    if let Some(method) = parse_method(raw, route) {
                        descriptors.push(expanded(route, method, &name));
                    }
                }
            }
            RouteMethod::One(raw) => {
                if let Some(method) = parse_method(raw, route) {
                    descriptors.push(RouteDescriptor {
                        path: route.path.clone(),
                        method,
                        name,
                    });
                }
            }
        }
    }

    descriptors
}

/// Derive a route name from a handler identifier
///
/// `FootprintController.find` becomes `modelFind`, `UserController.me`
/// becomes `userMe`.
pub fn route_name(handler: &str) -> String {
    let name = handler
        .replacen(RESOURCE_SUFFIX, RESOURCE_REPLACEMENT, 1)
        .replacen(CONTROLLER_SUFFIX, "", 1)
        .replacen('.', "-", 1);
    camelize(&name)
}

/// Lower camel case: separators (`-`, `_`, whitespace) are dropped and the
/// following character upper-cased, then the first character is lowered
pub fn camelize(input: &str) -> String {
    let mut camel = String::with_capacity(input.len());
    let mut upper_next = false;

    for ch in input.chars() {
        if ch == '-' || ch == '_' || ch.is_whitespace() {
            upper_next = true;
        } else if upper_next {
            camel.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            camel.push(ch);
        }
    }

    let mut chars = camel.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn expanded(route: &AppRoute, method: HttpMethod, name: &str) -> RouteDescriptor {
    let prefixed = format!("{}-{}", method.as_str().to_lowercase(), name);
    RouteDescriptor {
        path: route.path.clone(),
        method,
        name: camelize(&prefixed),
    }
}

fn parse_method(raw: &str, route: &AppRoute) -> Option<HttpMethod> {
    match raw.parse() {
        Ok(method) => Some(method),
        Err(_) => {
            warn!(
                method = %raw,
                path = %route.path,
                handler = %route.handler,
                "Skipping route with unsupported method"
            );
            None
        }
    }
}
