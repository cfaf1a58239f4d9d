//! # roastlog CLI
//!
//! Command-line tool for working with Artisan `.alog` roast logs.
//!
//! ## Usage
//!
//! ```bash
//! # Render a roast to PNG and print statistics JSON
//! roastlog render "roasts/batch 28.alog" -o renders/28.png
//!
//! # Statistics only
//! roastlog stats roasts/28.alog
//!
//! # Append the roast to the markdown log table
//! roastlog update-log roasts/28.alog renders/28.png --log roasts.md
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
