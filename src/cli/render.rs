use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use roastlog::alog::RoastProfile;
use roastlog::render::{render_profile, Config, RenderConfig};
use roastlog::stats::RoastStats;

/// Render a .alog file to a PNG profile chart, then print statistics JSON
/// unless disabled.
pub fn run(
    input: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    width: Option<u32>,
    height: Option<u32>,
    ror_window: Option<f64>,
    no_details: bool,
    no_json: bool,
    json_only: bool,
) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    let output = output.unwrap_or_else(|| input.with_extension("png"));

    // Config file first, explicit flags on top
    let mut render_config = RenderConfig::default();
    if let Some(path) = config {
        let file = Config::from_file(&path)?;
        render_config.apply_file(&file.render);
    }
    if let Some(width) = width {
        render_config.width = width;
    }
    if let Some(height) = height {
        render_config.height = height;
    }
    if let Some(window) = ror_window {
        render_config.ror_window_secs = window;
    }
    if no_details {
        render_config.show_details = false;
    }
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());
    render_config.source_filename = file_name.clone();

    info!("parsing {}", input.display());
    let profile = RoastProfile::open(&input)
        .with_context(|| format!("Failed to parse {}", input.display()))?;

    if !json_only {
        render_profile(&profile, &output, &render_config)
            .with_context(|| format!("Failed to render {}", output.display()))?;
        println!("Rendered image saved to: {}", output.display());
    }

    if json_only || !no_json {
        let stats = RoastStats::from_profile(&profile, file_name.as_deref());
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).context("Failed to serialize statistics")?
        );
    }
    Ok(())
}
