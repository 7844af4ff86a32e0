//! CutReel CLI: command-line interface for composition documents.
//!
//! Usage:
//!   cutreel init <NAME>               Create a starter composition
//!   cutreel info <PATH>               Show composition information
//!   cutreel validate <PATH>           Validate a composition document
//!   cutreel remove-silence <PATH>     Re-segment clips around speech
//!   cutreel gains <PATH>              Report per-source audio gains
//!   cutreel render-frame <PATH>       Rasterize one frame to a PPM file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "cutreel",
    about = "Timeline compositing and playback-sync engine tools",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new starter composition document
    Init {
        /// Composition name (used as the file name)
        name: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Canvas width
        #[arg(long, default_value = "1080")]
        width: u32,

        /// Canvas height
        #[arg(long, default_value = "1920")]
        height: u32,

        /// Frame rate
        #[arg(long, default_value = "30")]
        fps: u32,
    },

    /// Show composition information
    Info {
        /// Path to the composition JSON document
        path: PathBuf,
    },

    /// Validate a composition document
    Validate {
        /// Path to the composition JSON document
        path: PathBuf,
    },

    /// Remove silent regions by re-segmenting clips around speech
    RemoveSilence {
        /// Path to the composition JSON document
        path: PathBuf,

        /// Speech intervals JSON: `{ "<source>": [{"start": s, "end": e}, ...] }`
        #[arg(short, long)]
        speech: PathBuf,

        /// Symmetric padding added around each speech interval (seconds)
        #[arg(long, default_value = "0.0")]
        padding: f64,

        /// Write the result here instead of in place
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report the per-source audio gains at a timeline time
    Gains {
        /// Path to the composition JSON document
        path: PathBuf,

        /// Timeline time in seconds
        #[arg(short, long, default_value = "0.0")]
        time: f64,
    },

    /// Rasterize one frame to a binary PPM image
    RenderFrame {
        /// Path to the composition JSON document
        path: PathBuf,

        /// Timeline time in seconds
        #[arg(short, long, default_value = "0.0")]
        time: f64,

        /// Output image path
        #[arg(short, long, default_value = "frame.ppm")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    cutreel_common::logging::init_logging(&cutreel_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Init {
            name,
            output,
            width,
            height,
            fps,
        } => commands::init::run(name, output, width, height, fps),
        Commands::Info { path } => commands::info::run(path),
        Commands::Validate { path } => commands::validate::run(path),
        Commands::RemoveSilence {
            path,
            speech,
            padding,
            output,
        } => commands::remove_silence::run(path, speech, padding, output),
        Commands::Gains { path, time } => commands::gains::run(path, time),
        Commands::RenderFrame { path, time, output } => {
            commands::render_frame::run(path, time, output)
        }
    }
}
