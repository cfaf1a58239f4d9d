//! Chart rendering for roast profiles
//!
//! [`chart`] draws the two-panel temperature/RoR PNG via plotters;
//! [`config`] loads render settings from a TOML file.

pub mod chart;
pub mod config;

pub use chart::{render_profile, roast_details, RenderConfig, RenderError};
pub use config::Config;
