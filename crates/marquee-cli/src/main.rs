//! Command-line driver for the marquee rotation overlay.
//!
//! Reads intake messages as JSON lines, renders frames to the terminal.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::run::RunArgs;
use config::CliConfig;

#[derive(Parser)]
#[command(name = "marquee")]
#[command(about = "Marquee - rotating overlay coordinator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (defaults to ./marquee.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the coordinator, reading JSON-lines intake from stdin
    Run {
        /// Settings file used for the initial configuration
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Snapshot file loaded into the cache on startup
        #[arg(long)]
        snapshots: Option<PathBuf>,

        /// Swap entries without waiting for leave/enter animations
        #[arg(long)]
        no_animation: bool,
    },

    /// Print the rotation a settings file normalises to
    CheckSettings {
        /// Settings file (TOML or JSON)
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;

    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            settings,
            snapshots,
            no_animation,
        } => {
            let args = RunArgs {
                settings,
                snapshots,
                animate: !no_animation,
            };
            commands::run::run(args, config).await?;
        }
        Commands::CheckSettings { file } => {
            commands::check_settings::run(&file, &config)?;
        }
    }

    Ok(())
}
