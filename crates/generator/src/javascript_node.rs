//! The `javascript-node` SDK target
//!
//! Emits an npm package: `package.json`, a `client.js` exposing one method
//! per route, a shared `base-model.js`, and for every exposed model a JSON
//! schema module under `schema/` plus a model class under `models/`.

use crate::context::GenerationContext;
use crate::output;
use crate::templates::{load_templates, render_error};
use crate::SdkGenerator;
use async_trait::async_trait;
use futures::future::try_join_all;
use heck::{ToKebabCase, ToUpperCamelCase};
use regex::Regex;
use sdkpack_common::{GeneratorError, Result, Stage, StageError};
use sdkpack_config::{Field, Protocol, Rule, TargetConfig, TargetSchema};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tera::Tera;
use tracing::{debug, info, warn};

const TARGET: &str = "javascript-node";

/// Route names become method names on the generated client
static JS_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid identifier regex")
});

/// How one template is emitted
struct TemplateSpec {
    template: &'static str,
    /// File name; `{modelPrefix}` and `{modelName}` are substituted per model
    file_name: &'static str,
    /// Directory relative to the target's output path
    dest: &'static str,
    per_model: bool,
}

const TEMPLATES: &[TemplateSpec] = &[
    TemplateSpec {
        template: "javascript-node/package.json",
        file_name: "package.json",
        dest: ".",
        per_model: false,
    },
    TemplateSpec {
        template: "javascript-node/base-model.js",
        file_name: "base-model.js",
        dest: ".",
        per_model: false,
    },
    TemplateSpec {
        template: "javascript-node/client.js",
        file_name: "client.js",
        dest: ".",
        per_model: false,
    },
    TemplateSpec {
        template: "javascript-node/schema.js",
        file_name: "{modelPrefix}-{modelName}.js",
        dest: "schema",
        per_model: true,
    },
    TemplateSpec {
        template: "javascript-node/model.js",
        file_name: "{modelPrefix}-{modelName}.js",
        dest: "models",
        per_model: true,
    },
];

/// Values computed by the prepare stage
#[derive(Debug, Clone, Default)]
struct Prepared {
    keywords_string: String,
    contributors_string: String,
    base_url: String,
    /// De-duplicated template output directories
    template_dirs: Vec<PathBuf>,
}

/// One file to render during build
struct RenderJob {
    template: &'static str,
    output: PathBuf,
    context: tera::Context,
}

/// Generator of the `javascript-node` npm package
pub struct JavaScriptNode {
    tera: Tera,
    prepared: Option<Prepared>,
    emitted: Vec<PathBuf>,
}

impl JavaScriptNode {
    pub const DESCRIPTION: &'static str = "JavaScript client for Node.js, packaged for npm";

    pub fn new() -> Result<Self> {
        Ok(Self {
            tera: load_templates()?,
            prepared: None,
            emitted: Vec::new(),
        })
    }

    /// Target name and options accepted in its configuration section
    pub fn schema() -> TargetSchema {
        TargetSchema::new(TARGET)
            .option(Field::required("private", Rule::Boolean).with_default(json!(true)))
    }

    /// Files written by the last build
    pub fn emitted(&self) -> &[PathBuf] {
        &self.emitted
    }

    fn prepared(&self, stage: Stage) -> Result<&Prepared> {
        self.prepared.as_ref().ok_or_else(|| {
            StageError::new(
                TARGET,
                stage,
                GeneratorError::Config("prepare stage has not run".to_string()),
            )
            .into()
        })
    }

    fn render_jobs(&self, ctx: &GenerationContext, prepared: &Prepared) -> Result<Vec<RenderJob>> {
        let mut base = ctx.to_value()?;
        if let Value::Object(map) = &mut base {
            map.insert(
                "keywordsString".to_string(),
                Value::String(prepared.keywords_string.clone()),
            );
            map.insert(
                "contributorsString".to_string(),
                Value::String(prepared.contributors_string.clone()),
            );
            map.insert("baseUrl".to_string(), Value::String(prepared.base_url.clone()));
            map.insert("clientQuery".to_string(), client_query(&ctx.config));
        }
        let base_context = tera::Context::from_value(base)
            .map_err(|e| render_error("javascript-node", &e))?;

        let root = ctx.config.output_path();
        let prefix = &ctx.config.settings.prefix;
        let mut jobs = Vec::new();

        for spec in TEMPLATES {
            if !spec.per_model {
                jobs.push(RenderJob {
                    template: spec.template,
                    output: normalize(&root.join(spec.dest)).join(spec.file_name),
                    context: base_context.clone(),
                });
                continue;
            }

            for (name, model) in ctx.exposed_models() {
                let mut data = serde_json::to_value(model)?;
                if spec.template == "javascript-node/model.js" {
                    if let Value::Object(map) = &mut data {
                        map.insert("modelPrefix".to_string(), Value::String(prefix.clone()));
                        map.insert(
                            "modelName".to_string(),
                            Value::String(name.to_upper_camel_case()),
                        );
                    }
                }

                let file_name = spec
                    .file_name
                    .replace("{modelPrefix}", &prefix.to_kebab_case())
                    .replace("{modelName}", &name.to_kebab_case());

                jobs.push(RenderJob {
                    template: spec.template,
                    output: normalize(&root.join(spec.dest)).join(file_name),
                    context: tera::Context::from_value(data)
                        .map_err(|e| render_error(spec.template, &e))?,
                });
            }
        }

        Ok(jobs)
    }

    async fn render(&self, job: RenderJob) -> Result<(PathBuf, String)> {
        let rendered = self
            .tera
            .render(job.template, &job.context)
            .map_err(|e| render_failure(&job.output, render_error(job.template, &e)))?;
        Ok((job.output, rendered))
    }

    /// Write rendered files, removing the ones already written if any write fails
    async fn write_all(files: Vec<(PathBuf, String)>) -> Result<Vec<PathBuf>> {
        let mut written: Vec<PathBuf> = Vec::with_capacity(files.len());

        for (path, content) in files {
            if let Err(e) = tokio::fs::write(&path, content).await {
                for file in &written {
                    if let Err(remove_err) = tokio::fs::remove_file(file).await {
                        warn!(
                            file = %file.display(),
                            error = %remove_err,
                            "Failed to remove partial output"
                        );
                    }
                }
                return Err(render_failure(&path, e.into()));
            }
            debug!(file = %path.display(), "Built file");
            written.push(path);
        }

        Ok(written)
    }
}

#[async_trait]
impl SdkGenerator for JavaScriptNode {
    fn id(&self) -> &str {
        TARGET
    }

    async fn prepare(&mut self, ctx: &GenerationContext) -> Result<()> {
        let settings = &ctx.config.settings;
        let root = ctx.config.output_path();

        let mut template_dirs: Vec<PathBuf> = Vec::new();
        for spec in TEMPLATES {
            let dir = normalize(&root.join(spec.dest));
            if !template_dirs.contains(&dir) {
                template_dirs.push(dir);
            }
        }

        let prepared = Prepared {
            keywords_string: serde_json::to_string(&settings.keywords)?,
            contributors_string: serde_json::to_string(&settings.contributors)?,
            base_url: base_url(&ctx.config),
            template_dirs,
        };

        debug!(
            dirs = prepared.template_dirs.len(),
            base_url = %prepared.base_url,
            "Prepared javascript-node resources"
        );
        self.prepared = Some(prepared);
        self.emitted.clear();
        Ok(())
    }

    async fn clean(&mut self, ctx: &GenerationContext) -> Result<()> {
        let prepared = self.prepared(Stage::Clean)?;
        let root = ctx.config.output_path();

        output::ensure_dir(root)?;
        let removed = output::purge(&ctx.config.deletion_scope)?;
        for dir in &prepared.template_dirs {
            output::ensure_dir(dir)?;
        }

        info!(path = %root.display(), removed, "Cleaned output directory");
        Ok(())
    }

    async fn build(&mut self, ctx: &GenerationContext) -> Result<()> {
        let prepared = self.prepared(Stage::Build)?;
        let jobs = self.render_jobs(ctx, prepared)?;
        let count = jobs.len();

        // Nothing touches the disk unless every template renders
        let files = try_join_all(jobs.into_iter().map(|job| self.render(job))).await?;
        let emitted = Self::write_all(files).await?;

        info!(files = count, "Built javascript-node SDK");
        self.emitted = emitted;
        Ok(())
    }

    async fn test(&mut self, ctx: &GenerationContext) -> Result<()> {
        if let Some(route) = ctx.routes.iter().find(|r| !JS_IDENTIFIER.is_match(&r.name)) {
            return Err(StageError::new(
                TARGET,
                Stage::Test,
                GeneratorError::Config(format!("invalid route name {:?}", route.name)),
            )
            .with_message(format!(
                "Route name {} is not a valid JavaScript identifier",
                route.name
            ))
            .into());
        }

        if self.emitted.is_empty() {
            return Err(StageError::new(
                TARGET,
                Stage::Test,
                GeneratorError::Config("build emitted no files".to_string()),
            )
            .with_message(format!("{} build produced no output", TARGET))
            .into());
        }

        for file in &self.emitted {
            let metadata = tokio::fs::metadata(file)
                .await
                .map_err(|e| GeneratorError::path(file, e.to_string()))?;
            if metadata.len() == 0 {
                return Err(GeneratorError::path(file, "emitted file is empty"));
            }
        }

        let manifest = ctx.config.output_path().join("package.json");
        let content = tokio::fs::read_to_string(&manifest).await?;
        serde_json::from_str::<Value>(&content).map_err(|e| {
            StageError::new(TARGET, Stage::Test, e.into())
                .with_message(format!("{} is not valid JSON", manifest.display()))
        })?;

        info!(files = self.emitted.len(), "Verified javascript-node output");
        Ok(())
    }

    async fn publish(&mut self, ctx: &GenerationContext) -> Result<()> {
        match &ctx.config.settings.repository {
            Some(repository) => info!(
                repository = %repository.url,
                files = self.emitted.len(),
                path = %ctx.config.output_path().display(),
                "Output ready to publish"
            ),
            None => info!(
                files = self.emitted.len(),
                path = %ctx.config.output_path().display(),
                "No repository configured, output left in place"
            ),
        }
        Ok(())
    }
}

fn render_failure(output: &Path, source: GeneratorError) -> GeneratorError {
    let file = output
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    StageError::new(TARGET, Stage::Build, source)
        .with_message(format!("Error building {} for {}", file, TARGET))
        .into()
}

/// `protocol://[auth@]hostname[:port][pathname]`
fn base_url(config: &TargetConfig) -> String {
    let api = &config.settings.api;
    let protocol = match api.protocol {
        Protocol::Http => "http",
        Protocol::Https => "https",
    };

    let mut url = format!("{}://", protocol);
    if let Some(auth) = &api.auth {
        url.push_str(auth);
        url.push('@');
    }
    url.push_str(&api.hostname);
    if let Some(port) = api.port {
        url.push_str(&format!(":{}", port));
    }
    if let Some(pathname) = &api.pathname {
        url.push_str(pathname.trim_end_matches('/'));
    }
    url
}

fn client_query(config: &TargetConfig) -> Value {
    let query: Map<String, Value> = config
        .settings
        .api
        .query
        .iter()
        .flatten()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Value::Object(query)
}

/// Drop `.` components so `root/.` and `root` compare equal
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .collect()
}
