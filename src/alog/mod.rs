//! Parsing for the Artisan `.alog` roast-log format
//!
//! A `.alog` file is a single Python dict literal. [`value`] parses the
//! literal into a generic tree; [`profile`] decodes that tree into the
//! typed [`RoastProfile`] the rest of the crate works with.

pub mod profile;
pub mod value;

pub use profile::{
    gas_setting_mbar, Computed, EventKind, PhaseSummary, Phases, ProfileError, RoastEvent,
    RoastProfile, SpecialEvent, TemperatureSeries, INVALID_READING,
};
pub use value::{Value, ValueError};
