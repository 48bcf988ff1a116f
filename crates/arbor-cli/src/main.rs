//! Arbor CLI
//!
//! Rebuilds trees from flat JSON records and renders them as HTML, JSON or
//! indented text.

mod config;
mod pipeline;

use anyhow::{bail, Context, Result};
use arbor_core::CyclePolicy;
use arbor_render::{OutputFormat, TextStyle};
use clap::{Parser, Subcommand};
use config::ArborConfig;
use pipeline::{InputReport, RenderSettings};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "Arbor - rebuild trees from flat parent-linked records")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.arbor/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and render trees from JSON record files
    Render {
        /// Input files, `-` for stdin
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output format: html, json or text
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Connector style for text output: unicode or ascii
        #[arg(long)]
        style: Option<TextStyle>,

        /// Render only the descendants of this id (numeric values are integer ids)
        #[arg(long)]
        root: Option<String>,

        /// Render only the descendants of this text id, even if it looks numeric
        #[arg(long, conflicts_with = "root")]
        root_text: Option<String>,

        /// Cycle handling: strict fails, permissive emits cyclic nodes without children
        #[arg(long)]
        cycle_policy: Option<CyclePolicy>,

        /// Fail on duplicate ids, orphans or cycles
        #[arg(long)]
        strict: bool,

        /// Maximum tree depth
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// Report duplicate ids, orphans and cycles
    Check {
        /// Input files, `-` for stdin
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_error) =
        ArborConfig::resolve(cli.config.as_deref(), &config::default_config_path())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Some(e) = config_error {
        tracing::warn!("Ignoring config file, using defaults: {:#}", e);
    }

    match cli.command {
        Commands::Render {
            inputs,
            format,
            style,
            root,
            root_text,
            cycle_policy,
            strict,
            max_depth,
        } => {
            let mut options = config.materialize_options();
            if let Some(policy) = cycle_policy {
                options.cycle_policy = policy;
            }
            if max_depth.is_some() {
                options.max_depth = max_depth;
            }

            let settings = RenderSettings {
                format: format.unwrap_or(config.format),
                text_style: style.unwrap_or(config.text_style),
                root: pipeline::root_id(root.as_deref(), root_text.as_deref()),
                options,
                strict: strict || config.strict,
            };
            cmd_render(inputs, settings).await
        }
        Commands::Check { inputs, json } => cmd_check(inputs, json).await,
        Commands::Config => cmd_config(&config),
    }
}

async fn cmd_render(inputs: Vec<String>, settings: RenderSettings) -> Result<()> {
    let settings = Arc::new(settings);
    let mut tasks = Vec::with_capacity(inputs.len());

    // Each input is an independent snapshot built on its own blocking task
    for input in inputs {
        let content = pipeline::read_input(&input).await?;
        let settings = Arc::clone(&settings);
        let task = tokio::task::spawn_blocking(move || {
            pipeline::render_input(&input, &content, &settings)
        });
        tasks.push(task);
    }

    for task in tasks {
        let output = task.await.context("Render task failed")??;
        print!("{}", output);
        if !output.ends_with('\n') {
            println!();
        }
    }

    Ok(())
}

async fn cmd_check(inputs: Vec<String>, json: bool) -> Result<()> {
    let mut tasks = Vec::with_capacity(inputs.len());

    for input in inputs {
        let content = pipeline::read_input(&input).await?;
        let task = tokio::task::spawn_blocking(move || {
            let report = pipeline::check_input(&input, &content);
            (input, report)
        });
        tasks.push(task);
    }

    let mut failed = 0;
    let mut reports = Vec::new();
    for task in tasks {
        let (input, report) = task.await.context("Check task failed")?;
        let report = report?;

        if !report.is_clean() {
            failed += 1;
        }

        if json {
            reports.push(InputReport { input, report });
        } else if report.is_clean() {
            println!(
                "✓ {}: {} records, all reachable",
                input, report.record_count
            );
        } else {
            println!("✗ {}: {}", input, pipeline::summarize(&report));
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    if failed > 0 {
        bail!("{} input(s) have data-quality issues", failed);
    }
    Ok(())
}

fn cmd_config(config: &ArborConfig) -> Result<()> {
    print!("{}", serde_yaml::to_string(config)?);
    Ok(())
}
