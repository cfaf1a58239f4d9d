use anyhow::{Context, Result};
use std::path::PathBuf;

use roastlog::alog::RoastProfile;
use roastlog::stats::RoastStats;

/// Print the statistics report for a .alog file as pretty JSON.
pub fn run(input: PathBuf) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    let profile = RoastProfile::open(&input)
        .with_context(|| format!("Failed to parse {}", input.display()))?;
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());
    let stats = RoastStats::from_profile(&profile, file_name.as_deref());
    println!(
        "{}",
        serde_json::to_string_pretty(&stats).context("Failed to serialize statistics")?
    );
    Ok(())
}
