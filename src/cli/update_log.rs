use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use roastlog::alog::RoastProfile;
use roastlog::logtable::{self, LogEntry};

/// Append one roast to the markdown roast-log table.
///
/// Exits with status 1 when the batch already has a row, so CI wrappers
/// can tell "appended" from "already logged".
pub fn run(
    alog: PathBuf,
    image_path: String,
    log: PathBuf,
    repo_url: Option<&str>,
) -> Result<()> {
    if !alog.exists() {
        anyhow::bail!("Input file does not exist: {}", alog.display());
    }

    info!("parsing {}", alog.display());
    let profile = RoastProfile::open(&alog)
        .with_context(|| format!("Failed to parse {}", alog.display()))?;
    let entry = LogEntry::from_profile(&profile);
    info!("extracted metadata for roast {}", entry.roast_name);

    let updated = logtable::update(&log, &entry, &image_path, repo_url)
        .with_context(|| format!("Failed to update {}", log.display()))?;

    if updated {
        println!("Successfully updated {}", log.display());
        Ok(())
    } else {
        println!(
            "Roast {} already exists in log, skipping...",
            entry.roast_name
        );
        std::process::exit(1);
    }
}
