//! TOML configuration file support for render settings.
//!
//! Instead of passing many CLI flags, users can keep chart settings in a
//! config file:
//!
//! ```toml
//! # roastlog.toml
//! [render]
//! width = 1400
//! height = 1100
//! ror_window_secs = 30.0
//! details = true
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Root configuration structure for roastlog.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Render-specific settings.
    #[serde(default)]
    pub render: RenderSection,
}

/// Settings for the render command.
#[derive(Debug, Default, Deserialize)]
pub struct RenderSection {
    /// Output image width in pixels.
    pub width: Option<u32>,

    /// Output image height in pixels.
    pub height: Option<u32>,

    /// Trailing window for RoR smoothing, in seconds.
    pub ror_window_secs: Option<f64>,

    /// Whether to draw the roast-details caption block.
    pub details: Option<bool>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}
