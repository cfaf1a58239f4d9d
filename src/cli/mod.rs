use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod info;
mod render;
mod stats;
mod update_log;

/// roastlog - Artisan .alog parser and roast chart renderer
#[derive(Parser)]
#[command(name = "roastlog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a .alog file to a PNG profile chart
    Render {
        /// Input .alog file path
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output PNG path (defaults to the input path with a .png extension)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Load render settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output image width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Output image height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Trailing RoR window in seconds
        #[arg(long, value_name = "SECS")]
        ror_window: Option<f64>,

        /// Skip the roast-details caption block
        #[arg(long)]
        no_details: bool,

        /// Skip the JSON statistics printed after rendering
        #[arg(long)]
        no_json: bool,

        /// Only print JSON statistics, without rendering an image
        #[arg(long)]
        json_only: bool,
    },

    /// Print roast statistics for a .alog file as JSON
    Stats {
        /// Input .alog file path
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },

    /// Append a roast to the markdown roast-log table
    UpdateLog {
        /// Input .alog file path
        #[arg(value_name = "ALOG")]
        alog: PathBuf,

        /// Path to the rendered profile image, relative to the repo root
        #[arg(value_name = "IMAGE_PATH")]
        image_path: String,

        /// Path to the roast log markdown file
        #[arg(long, default_value = "roasts.md")]
        log: PathBuf,

        /// Base URL for raw repository content
        /// (e.g. https://raw.githubusercontent.com/user/repo/refs/heads/main)
        #[arg(long, value_name = "URL")]
        repo_url: Option<String>,
    },

    /// Display a human-readable summary of a .alog file
    Info {
        /// Input .alog file path
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Render {
            input,
            output,
            config,
            width,
            height,
            ror_window,
            no_details,
            no_json,
            json_only,
        } => render::run(
            input, output, config, width, height, ror_window, no_details, no_json, json_only,
        ),
        Commands::Stats { input } => stats::run(input),
        Commands::UpdateLog {
            alog,
            image_path,
            log,
            repo_url,
        } => update_log::run(alog, image_path, log, repo_url.as_deref()),
        Commands::Info { input } => info::run(input),
    }
}
