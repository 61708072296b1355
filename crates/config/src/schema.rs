//! Declarative configuration schema and its validator
//!
//! The validator walks a parsed document, injects defaults for absent
//! fields, and collects every violated constraint instead of stopping at the
//! first one.

use crate::formats;
use sdkpack_common::Violation;
use serde_json::{json, Value};
use std::path::Path;

/// String formats understood by the validator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Url,
    Email,
    Version,
    License,
    Hostname,
    AbsPath,
    DirPath,
    /// A single directory name
    PathSegment,
}

impl Format {
    fn describe(&self) -> &'static str {
        match self {
            Format::Url => "URL",
            Format::Email => "email address",
            Format::Version => "semantic version",
            Format::License => "SPDX license expression",
            Format::Hostname => "hostname or IP address",
            Format::AbsPath => "absolute path",
            Format::DirPath => "existing directory",
            Format::PathSegment => "directory name (one path segment)",
        }
    }
}

/// Constraint on a single value
#[derive(Debug, Clone)]
pub enum Rule {
    String(Option<Format>),
    Integer { min: i64, max: i64 },
    Boolean,
    OneOf(&'static [&'static str]),
    Array(Box<Rule>),
    /// Object with a closed set of fields
    Object(Vec<Field>),
    /// Object whose values are all strings, all numbers, or all booleans
    ScalarMap,
}

/// A named field of an object rule
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub rule: Rule,
    pub required: bool,
    pub default: Option<Value>,
}

impl Field {
    pub fn required(name: impl Into<String>, rule: Rule) -> Self {
        Self {
            name: name.into(),
            rule,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, rule: Rule) -> Self {
        Self {
            name: name.into(),
            rule,
            required: false,
            default: None,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Schema of one registered SDK target: its name and target-only options
#[derive(Debug, Clone)]
pub struct TargetSchema {
    pub name: String,
    pub options: Vec<Field>,
}

impl TargetSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
        }
    }

    pub fn option(mut self, field: Field) -> Self {
        self.options.push(field);
        self
    }

    pub fn has_option(&self, key: &str) -> bool {
        self.options.iter().any(|f| f.name == key)
    }
}

const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "HEAD", "DELETE"];
const PROTOCOLS: &[&str] = &["http", "https"];

/// Keys of the global section a target may not override
const GLOBAL_ONLY_KEYS: &[&str] = &["appPath", "dest"];

fn string(format: Option<Format>) -> Rule {
    Rule::String(format)
}

fn person() -> Rule {
    Rule::Object(vec![
        Field::required("name", string(None)),
        Field::required("email", string(Some(Format::Email))),
        Field::required("url", string(Some(Format::Url))),
    ])
}

fn api() -> Rule {
    Rule::Object(vec![
        Field::required("protocol", Rule::OneOf(PROTOCOLS)).with_default(json!("http")),
        Field::optional("port", Rule::Integer { min: 1, max: 65535 }),
        Field::optional("auth", string(None)),
        Field::required("hostname", string(Some(Format::Hostname))),
        Field::optional("pathname", string(Some(Format::AbsPath))),
        Field::optional("query", Rule::ScalarMap),
    ])
}

fn route() -> Rule {
    Rule::Object(vec![
        Field::required("method", Rule::OneOf(HTTP_METHODS)).with_default(json!("GET")),
        Field::required("path", string(Some(Format::AbsPath))).with_default(json!("/")),
        Field::required("name", string(None)),
    ])
}

fn repository() -> Rule {
    Rule::Object(vec![
        Field::required("type", string(None)).with_default(json!("git")),
        Field::required("url", string(Some(Format::Url))),
    ])
}

/// Fields of the `global` section
pub fn global_fields() -> Vec<Field> {
    vec![
        Field::required("appPath", string(Some(Format::DirPath))),
        Field::required("dest", string(Some(Format::DirPath))).with_default(json!("./output")),
        Field::required("prefix", string(None)).with_default(json!("Api")),
        Field::required("projectName", string(Some(Format::PathSegment)))
            .with_default(json!("api-sdk")),
        Field::required("version", string(Some(Format::Version))).with_default(json!("1.0.0")),
        Field::required("description", string(None)).with_default(json!("")),
        Field::optional("homepage", string(Some(Format::Url))),
        Field::optional(
            "bugs",
            Rule::Object(vec![
                Field::required("url", string(Some(Format::Url))),
                Field::required("email", string(Some(Format::Email))),
            ]),
        ),
        Field::required("license", string(Some(Format::License))).with_default(json!("MIT")),
        Field::optional("author", person()),
        Field::required("keywords", Rule::Array(Box::new(string(None))))
            .with_default(json!(["api", "sdk"])),
        Field::required("contributors", Rule::Array(Box::new(person()))).with_default(json!([])),
        Field::required("api", api()),
        Field::required("routes", Rule::Array(Box::new(route()))).with_default(json!([])),
        Field::optional("repository", repository()),
    ]
}

/// Fields accepted in one target's section
///
/// Every global field except the global-only ones, all optional and without
/// top-level defaults, followed by the target's own options.
pub fn target_fields(target: &TargetSchema) -> Vec<Field> {
    global_fields()
        .into_iter()
        .filter(|f| !GLOBAL_ONLY_KEYS.contains(&f.name.as_str()))
        .map(|mut f| {
            f.required = false;
            f.default = None;
            f
        })
        .chain(target.options.iter().cloned())
        .collect()
}

/// Validate a whole configuration document in place
///
/// Returns every violation found; defaults are injected even when other
/// violations exist.
pub fn validate_document(
    document: &mut Value,
    targets: &[TargetSchema],
    base_dir: &Path,
) -> Result<(), Vec<Violation>> {
    let mut validator = Validator::new(base_dir);

    match document.as_object_mut() {
        None => validator.report("", "must be an object"),
        Some(root) => {
            for key in root.keys() {
                if key != "global" && key != "sdks" {
                    validator.report(&child_pointer("", key), "is not an allowed property");
                }
            }

            match root.get_mut("global") {
                Some(global) => validator.check_object(global, &global_fields(), "/global"),
                None => validator.report("/global", "is required"),
            }

            match root.get_mut("sdks") {
                Some(sdks) => validator.check_targets(sdks, targets),
                None => validator.report("/sdks", "is required"),
            }
        }
    }

    validator.finish()
}

struct Validator<'a> {
    base_dir: &'a Path,
    violations: Vec<Violation>,
}

impl<'a> Validator<'a> {
    fn new(base_dir: &'a Path) -> Self {
        Self {
            base_dir,
            violations: Vec::new(),
        }
    }

    fn finish(self) -> Result<(), Vec<Violation>> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(self.violations)
        }
    }

    fn report(&mut self, pointer: &str, message: impl Into<String>) {
        self.violations.push(Violation::new(pointer, message));
    }

    fn check_targets(&mut self, sdks: &mut Value, targets: &[TargetSchema]) {
        let Some(map) = sdks.as_object_mut() else {
            self.report("/sdks", "must be an object");
            return;
        };

        if map.is_empty() {
            self.report("/sdks", "must declare at least one SDK target");
        }

        for (name, section) in map.iter_mut() {
            let pointer = child_pointer("/sdks", name);
            match targets.iter().find(|t| &t.name == name) {
                Some(target) => self.check_object(section, &target_fields(target), &pointer),
                None => {
                    let available: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
                    self.report(
                        &pointer,
                        format!(
                            "is not a registered SDK target (available: {})",
                            available.join(", ")
                        ),
                    );
                }
            }
        }
    }

    fn check(&mut self, value: &mut Value, rule: &Rule, pointer: &str) {
        match rule {
            Rule::String(format) => match value.as_str() {
                Some(s) => {
                    if let Some(format) = format {
                        if !self.format_matches(*format, s) {
                            self.report(pointer, format!("must be a valid {}", format.describe()));
                        }
                    }
                }
                None => self.report(pointer, "must be a string"),
            },
            Rule::Integer { min, max } => match value.as_i64() {
                Some(n) if n < *min => self.report(pointer, format!("must be >= {}", min)),
                Some(n) if n > *max => self.report(pointer, format!("must be <= {}", max)),
                Some(_) => {}
                None => self.report(pointer, "must be an integer"),
            },
            Rule::Boolean => {
                if !value.is_boolean() {
                    self.report(pointer, "must be a boolean");
                }
            }
            Rule::OneOf(allowed) => match value.as_str() {
                Some(s) if allowed.contains(&s) => {}
                _ => self.report(pointer, format!("must be one of: {}", allowed.join(", "))),
            },
            Rule::Array(item_rule) => match value.as_array_mut() {
                Some(items) => {
                    for (index, item) in items.iter_mut().enumerate() {
                        let item_pointer = format!("{}/{}", pointer, index);
                        self.check(item, item_rule, &item_pointer);
                    }
                }
                None => self.report(pointer, "must be an array"),
            },
            Rule::Object(fields) => self.check_object(value, fields, pointer),
            Rule::ScalarMap => self.check_scalar_map(value, pointer),
        }
    }

    fn check_object(&mut self, value: &mut Value, fields: &[Field], pointer: &str) {
        let Some(map) = value.as_object_mut() else {
            self.report(pointer, "must be an object");
            return;
        };

        let unknown: Vec<String> = map
            .keys()
            .filter(|key| !fields.iter().any(|f| &f.name == *key))
            .cloned()
            .collect();
        for key in unknown {
            self.report(&child_pointer(pointer, &key), "is not an allowed property");
        }

        for field in fields {
            let field_pointer = child_pointer(pointer, &field.name);

            if !map.contains_key(&field.name) {
                match &field.default {
                    Some(default) => {
                        map.insert(field.name.clone(), default.clone());
                    }
                    None if field.required => {
                        self.report(&field_pointer, "is required");
                        continue;
                    }
                    None => continue,
                }
            }

            if let Some(field_value) = map.get_mut(&field.name) {
                self.check(field_value, &field.rule, &field_pointer);
            }
        }
    }

    fn check_scalar_map(&mut self, value: &Value, pointer: &str) {
        let Some(map) = value.as_object() else {
            self.report(pointer, "must be an object");
            return;
        };

        let all_strings = map.values().all(Value::is_string);
        let all_numbers = map.values().all(Value::is_number);
        let all_booleans = map.values().all(Value::is_boolean);

        if !(all_strings || all_numbers || all_booleans) {
            self.report(
                pointer,
                "values must be all strings, all numbers, or all booleans",
            );
        }
    }

    fn format_matches(&self, format: Format, value: &str) -> bool {
        match format {
            Format::Url => formats::is_url(value),
            Format::Email => formats::is_email(value),
            Format::Version => formats::is_version(value),
            Format::License => formats::is_license(value),
            Format::Hostname => formats::is_hostname(value),
            Format::AbsPath => formats::is_abs_path(value),
            Format::DirPath => formats::is_dir(self.base_dir, value),
            Format::PathSegment => formats::is_path_segment(value),
        }
    }
}

/// Append an escaped reference token to a JSON pointer
fn child_pointer(parent: &str, key: &str) -> String {
    format!("{}/{}", parent, key.replace('~', "~0").replace('/', "~1"))
}
