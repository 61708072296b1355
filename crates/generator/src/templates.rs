//! Template loading and management

use heck::{ToKebabCase, ToUpperCamelCase};
use sdkpack_common::{GeneratorError, Result};
use std::collections::HashMap;
use tera::{Tera, Value};

/// Embedded templates of the javascript-node target, by name
const JAVASCRIPT_NODE: &[(&str, &str)] = &[
    (
        "javascript-node/package.json",
        include_str!("../templates/javascript-node/package.json.tera"),
    ),
    (
        "javascript-node/base-model.js",
        include_str!("../templates/javascript-node/base-model.js.tera"),
    ),
    (
        "javascript-node/client.js",
        include_str!("../templates/javascript-node/client.js.tera"),
    ),
    (
        "javascript-node/schema.js",
        include_str!("../templates/javascript-node/schema.js.tera"),
    ),
    (
        "javascript-node/model.js",
        include_str!("../templates/javascript-node/model.js.tera"),
    ),
];

/// Load all templates
pub fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();

    // Register custom filters
    tera.register_filter("kebab", kebab_filter);
    tera.register_filter("pascal", pascal_filter);
    tera.register_filter("json", json_filter);

    for (name, source) in JAVASCRIPT_NODE {
        tera.add_raw_template(name, source)
            .map_err(|e| render_error(name, &e))?;
    }

    Ok(tera)
}

/// Convert a tera error, including its causes, into a render error
pub fn render_error(template: &str, error: &tera::Error) -> GeneratorError {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    GeneratorError::Render {
        template: template.to_string(),
        message,
    }
}

/// Filter to convert a name to kebab-case
fn kebab_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("kebab filter expects a string"))?;

    Ok(Value::String(s.to_kebab_case()))
}

/// Filter to convert a name to PascalCase
fn pascal_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("pascal filter expects a string"))?;

    Ok(Value::String(s.to_upper_camel_case()))
}

/// Filter to embed any value as a JSON literal
fn json_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    serde_json::to_string(value)
        .map(Value::String)
        .map_err(|e| tera::Error::msg(format!("json filter failed: {}", e)))
}
