//! Image Publisher CLI
//!
//! Builds the game-server images listed in the build manifest and optionally
//! pushes their tags to the registry.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use image_publisher::security::credentials::reject_non_unicode;
use image_publisher::{
    BatchPublisher, ConfigLoadOptions, ConfigLoader, ConfigOverrides, EngineLoader, Manifest,
    RunConfig, RunError,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Build and publish tagged game-server images
#[derive(Parser)]
#[command(name = "image-publisher")]
#[command(version)]
#[command(about = "Build and publish tagged game-server images", long_about = None)]
struct Cli {
    /// Push tags to the registry after building
    #[arg(long)]
    push_tags: bool,

    /// Tags to build (defaults to every tag in the manifest)
    #[arg(long, num_args = 1.., value_name = "TAG")]
    tags: Option<Vec<String>>,

    /// Project directory holding the manifest and build context (defaults to current directory)
    #[arg(long, value_name = "DIR")]
    project_dir: Option<PathBuf>,

    /// Build manifest path
    #[arg(long, value_name = "PATH")]
    manifest: Option<PathBuf>,

    /// Build-context template directory
    #[arg(long, value_name = "DIR")]
    context_dir: Option<PathBuf>,

    /// Repository the tags are qualified in
    #[arg(long)]
    namespace: Option<String>,

    /// Container engine (docker, podman)
    #[arg(long)]
    engine: Option<String>,

    /// Keep build contexts on disk after each build
    #[arg(long)]
    keep_context: bool,

    /// Print engine commands instead of running them
    #[arg(long)]
    dry_run: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            namespace: self.namespace.clone(),
            manifest: self.manifest.clone(),
            context_dir: self.context_dir.clone(),
            engine: self.engine.clone(),
            keep_context: self.keep_context.then_some(true),
            ..Default::default()
        }
    }

    fn run_config(&self) -> RunConfig {
        RunConfig {
            requested_tags: self.tags.clone(),
            should_publish: self.push_tags,
            dry_run: self.dry_run,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("\n❌ Error");
        eprintln!("{}", e);
        if let Some(run_error) = e.downcast_ref::<RunError>() {
            eprintln!("\nCode: {}", run_error.code());
            for action in run_error.suggested_actions() {
                eprintln!("  → {}", action);
            }
        }
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("image_publisher={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Process environment as UTF-8 pairs; non-UTF-8 entries are left out
fn process_env() -> HashMap<String, String> {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

async fn run(cli: Cli) -> Result<()> {
    println!("\n📦 image-publisher\n");

    let project_path = match &cli.project_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let env = process_env();

    let config = ConfigLoader::load(ConfigLoadOptions {
        project_path,
        cli_args: Some(cli.config_overrides()),
        env: env.clone(),
    })
    .await
    .map_err(RunError::from)?;

    let run_config = cli.run_config();
    if run_config.should_publish {
        reject_non_unicode(
            std::env::vars_os(),
            &[config.username_env.as_str(), config.password_env.as_str()],
        )
        .map_err(RunError::from)?;
    }
    if run_config.dry_run {
        println!("🔎 Dry run: commands are printed, not executed\n");
    }

    let manifest = Manifest::load(&config.manifest)
        .await
        .map_err(RunError::from)?;
    println!(
        "Loaded {} version(s) from {}",
        manifest.len(),
        config.manifest.display()
    );

    let engine = EngineLoader::new()
        .load(&config.engine, run_config.dry_run)
        .map_err(RunError::from)?;

    let report = BatchPublisher::new(engine, config)
        .run(&manifest, &run_config, &env)
        .await?;

    report.print_summary();
    println!("✅ Done");
    Ok(())
}
