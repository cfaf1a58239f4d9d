//! # roastlog - Artisan roast-log parsing and charting
//!
//! `roastlog` parses the `.alog` roast-log format written by the Artisan
//! roaster-monitoring software, computes the derived Rate-of-Rise (RoR)
//! series, renders a two-panel temperature/RoR chart to PNG, and maintains
//! a markdown roast-log table.
//!
//! ## Key pieces
//!
//! - **Literal parser**: a `.alog` file is a single Python dict literal;
//!   [`alog::value`] parses it safely without evaluating anything.
//!
//! - **Typed profile**: [`alog::RoastProfile`] decodes the literal into
//!   metadata, event timestamps, and parallel time/temperature series,
//!   handling Artisan's BT/ET channel ambiguity and the `-1.0`
//!   invalid-reading sentinel.
//!
//! - **Rate of Rise**: [`ror`] computes the windowed temperature
//!   derivative in degrees per minute, with turning-point masking and
//!   peak detection.
//!
//! - **Rendering**: [`render`] draws the profile chart with plotters.
//!
//! - **Roast log**: [`logtable`] appends one markdown row per roast,
//!   newest first, deduplicated by batch number.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use roastlog::alog::RoastProfile;
//! use roastlog::render::{render_profile, RenderConfig};
//! use roastlog::stats::RoastStats;
//!
//! let profile = RoastProfile::open("batch28.alog")?;
//! render_profile(&profile, Path::new("batch28.png"), &RenderConfig::default())?;
//!
//! let stats = RoastStats::from_profile(&profile, Some("batch28.alog"));
//! println!("{}", serde_json::to_string_pretty(&stats)?);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## The `.alog` format
//!
//! Artisan saves a roast as a Python dict. The keys this crate consumes:
//!
//! | Key | Type | Meaning |
//! |-----|------|---------|
//! | `timex` | list of float | Sample times in seconds |
//! | `temp1` / `temp2` | list of float | Thermocouple channels (ET/BT by convention) |
//! | `extratemp1` / `extratemp2` | list of lists | Extra-device channels (exhaust etc.) |
//! | `timeindex` | list of int | Event indices into `timex`; `[0]` is CHARGE |
//! | `computed` | dict | Save-time event times/temps, totals, phases |
//! | `specialevents*` | lists | Operator annotations (gas changes) |
//! | `title`, `beans`, `weight`, ... | scalars | Roast metadata |
//!
//! Invalid thermocouple readings are recorded as `-1.0` and filtered out
//! before charting.

pub mod alog;
pub mod logtable;
pub mod render;
pub mod ror;
pub mod stats;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::alog::{
        EventKind, ProfileError, RoastEvent, RoastProfile, TemperatureSeries, Value, ValueError,
    };
    pub use crate::logtable::{LogEntry, TableError};
    pub use crate::render::{render_profile, RenderConfig, RenderError};
    pub use crate::ror::{bt_ror, peak, ror_series, RorPeak, DEFAULT_WINDOW_SECS};
    pub use crate::stats::RoastStats;
}
