//! sdkpack CLI
//!
//! Command-line interface for generating client SDKs from a backend application.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use sdkpack_common::GeneratorError;
use sdkpack_config::ConfigStore;
use sdkpack_generator::GeneratorRegistry;
use sdkpack_introspect::SnapshotApp;
use sdkpack_orchestrator::{Orchestrator, RunError};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sdkpack")]
#[command(version, about = "Generate client SDKs from a backend application", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build every SDK target declared in a configuration file
    #[command(after_help = "EXAMPLES:\n  \
        # Build all targets from a YAML configuration\n  \
        sdkpack build --config sdkpack.yaml\n\n  \
        # Show generator progress\n  \
        sdkpack build --config sdkpack.json --log-level info\n\n  \
        # RUST_LOG overrides --log-level\n  \
        RUST_LOG=sdkpack_generator=debug sdkpack build -c sdkpack.yaml")]
    Build {
        /// Path to the configuration file (.json, .yaml or .yml)
        #[arg(short, long)]
        config: PathBuf,

        /// Log level written to stderr
        #[arg(long, value_enum, default_value = "warn")]
        log_level: LogLevel,
    },

    /// List the SDK targets this build knows about
    List,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { config, log_level } => {
            init_logging(log_level);
            build_command(config.as_path(), cli.verbose).await?;
        }
        Commands::List => list_command(cli.verbose),
    }

    Ok(())
}

fn init_logging(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str())),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn build_command(config_path: &Path, verbose: bool) -> Result<()> {
    println!(
        "{} Loading configuration: {}",
        "→".cyan(),
        config_path.display()
    );

    let registry = GeneratorRegistry::builtin();
    let store = ConfigStore::new(registry.schemas())
        .context("Failed to resolve the working directory")?;

    // The application has to be located before the run can start it
    let config = match store.load(config_path) {
        Ok(config) => config,
        Err(e) => {
            report_error(&e);
            return Err(e).context("Failed to load configuration");
        }
    };
    let app = SnapshotApp::new(&config.global.app_path);

    if verbose {
        println!("  Application: {}", config.global.app_path.display());
        println!("  Snapshot: {}", app.path().display());
        println!("  Output root: {}", config.global.dest.display());
        let targets: Vec<&str> = config.target_names().collect();
        println!("  Targets: {}", targets.join(", ").yellow());
    }

    println!("{} Starting application", "→".cyan());
    let mut orchestrator =
        Orchestrator::new(config_path.to_path_buf(), Box::new(app), registry, store);

    match orchestrator.run().await {
        Ok(report) => {
            println!("\n{}", format!("✓ {}", report.message).green().bold());
            for target in &report.targets {
                println!("  • {}", target.cyan());
            }
            Ok(())
        }
        Err(err) => {
            print_abort(&err);
            let phase = err.phase;
            Err(anyhow::Error::new(err)
                .context(format!("SDK generation aborted during {}", phase)))
        }
    }
}

fn print_abort(err: &RunError) {
    println!("\n{}", format!("✗ {}", err.message).red().bold());
    println!("  Phase: {}", err.phase.to_string().yellow());
    report_error(&err.source);
}

fn report_error(err: &GeneratorError) {
    if let GeneratorError::SchemaValidation(violations) = err {
        println!("\n{}", "Configuration errors:".bold());
        for violation in violations {
            println!("  • {} {}", violation.path.yellow(), violation.message);
        }
    }
}

fn list_command(verbose: bool) {
    let registry = GeneratorRegistry::builtin();

    println!("{}", "Available SDK targets:".bold());
    for (name, description) in registry.describe() {
        if verbose {
            println!("  • {} - {}", name.cyan(), description);
        } else {
            println!("  • {}", name.cyan());
        }
    }
}
