//! MMPlayer CLI - Headless Media Player Tool
//!
//! Features:
//! - Timecode formatting and parsing
//! - Caption document inspection (inline HTML or TTML, local or remote)
//! - Playback simulation over the reference backends

use clap::{Parser, Subcommand};
use mmplayer_core::WidgetConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;
mod simulate;

/// MMPlayer CLI - Accessible media player toolkit
#[derive(Parser)]
#[command(name = "mmplayer")]
#[command(author = "WET Community")]
#[command(version)]
#[command(about = "Caption and playback toolkit for the accessible media player", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Output format (text, json, table)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Widget configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert between seconds and timecodes
    Time {
        #[command(subcommand)]
        action: TimeAction,
    },

    /// Parse a caption document
    Captions {
        /// Path or URL of the caption document
        source: String,

        /// Only show captions visible at this position (seconds or timecode)
        #[arg(short, long)]
        at: Option<String>,
    },

    /// Simulate playback through the media widget
    Simulate {
        /// Media duration in seconds
        #[arg(short, long, default_value = "30")]
        duration: f64,

        /// Seconds of playback per tick
        #[arg(short, long, default_value = "0.25")]
        tick: f64,

        /// Number of ticks to run
        #[arg(short = 'n', long, default_value = "40")]
        ticks: usize,

        /// Drive the plugin backend instead of the native one
        #[arg(long)]
        fallback: bool,

        /// Caption document to load (path or URL)
        #[arg(long)]
        captions: Option<String>,

        /// Stall playback for these tick numbers (e.g. 10-14)
        #[arg(long)]
        stall: Option<String>,
    },
}

#[derive(Subcommand)]
enum TimeAction {
    /// Format seconds as HH:MM:SS
    Format {
        seconds: f64,
    },
    /// Parse a timecode (`HH:MM:SS.sss` or `<n>s`) into seconds
    Parse {
        timecode: String,
    },
}

/// Log filter from `RUST_LOG` when it holds valid directives, otherwise
/// `info`, or `debug` with `--verbose`
fn log_filter(verbose: bool, directives: Option<String>) -> EnvFilter {
    let level = if verbose { "debug" } else { "info" };
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(level))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = log_filter(cli.verbose, std::env::var(EnvFilter::DEFAULT_ENV).ok());
    if cli.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    mmplayer_core::init();

    let config = match &cli.config {
        Some(path) => WidgetConfig::from_json(&tokio::fs::read_to_string(path).await?)?,
        None => WidgetConfig::default(),
    };

    match cli.command {
        Commands::Time { action } => match action {
            TimeAction::Format { seconds } => commands::time_format(seconds, &cli.format)?,
            TimeAction::Parse { timecode } => commands::time_parse(&timecode, &cli.format)?,
        },
        Commands::Captions { source, at } => {
            commands::captions(&source, at.as_deref(), &config, &cli.format).await?;
        }
        Commands::Simulate { duration, tick, ticks, fallback, captions, stall } => {
            let options = simulate::SimulationOptions {
                duration,
                tick,
                ticks,
                fallback,
                captions,
                stall: stall.as_deref().map(simulate::parse_tick_range).transpose()?,
            };
            simulate::run(options, &config, &cli.format).await?;
        }
    }

    Ok(())
}
