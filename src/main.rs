//! Floorplan Layout - command line entry point
//!
//! `generate` runs the full generate/snap/validate loop against an LLM
//! provider, `validate` and `snap` run the deterministic stages on a
//! layout file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use floorplan_layout::core::error::Result;
use floorplan_layout::layout::{GeneratedLayout, PerimeterGraph};
use floorplan_layout::llm::LlmLayoutProvider;
use floorplan_layout::spatial::{snap_layout, validate_layout_with};
use floorplan_layout::{generate_validated_layout, GenerationConfig};

/// Floorplan Layout - generate and check interior layouts
#[derive(Parser, Debug)]
#[command(name = "floorplan-layout")]
#[command(about = "Generate interior layouts and check them against spatial constraints")]
struct Args {
    /// TOML configuration file (environment overrides still apply)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a validated layout for a perimeter
    Generate {
        /// Perimeter graph JSON from ingestion
        #[arg(long)]
        perimeter: PathBuf,

        /// Natural-language description of the rooms
        #[arg(long)]
        prompt: String,

        /// Write the generation result here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate a layout JSON file
    Validate {
        #[arg(long)]
        layout: PathBuf,
    },

    /// Snap a layout JSON file to the construction grid
    Snap {
        #[arg(long)]
        layout: PathBuf,

        /// Grid size in mm (defaults to the configured grid)
        #[arg(long)]
        grid: Option<u32>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("floorplan_layout=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => GenerationConfig::load(path)?,
        None => GenerationConfig::from_env()?,
    };

    match args.command {
        Command::Generate {
            perimeter,
            prompt,
            output,
        } => {
            let perimeter: PerimeterGraph = read_json(&perimeter)?;
            let provider = Arc::new(LlmLayoutProvider::from_env()?);

            let rt = Runtime::new()?;
            let result = rt.block_on(generate_validated_layout(
                provider,
                &perimeter,
                &prompt,
                &config,
            ))?;

            if !result.success {
                tracing::warn!(
                    reason = result.error_message.as_deref().unwrap_or_default(),
                    "Returning best failed layout"
                );
            }
            let json = serde_json::to_string_pretty(&result)?;
            match output {
                Some(path) => fs::write(path, json)?,
                None => println!("{}", json),
            }
        }
        Command::Validate { layout } => {
            let layout: GeneratedLayout = read_json(&layout)?;
            let result = validate_layout_with(&layout, &config.constraints);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Snap { layout, grid } => {
            let layout: GeneratedLayout = read_json(&layout)?;
            let snapped = snap_layout(&layout, grid.unwrap_or(config.grid_size_mm));
            println!("{}", snapped.to_json_pretty()?);
        }
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
