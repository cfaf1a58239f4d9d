//! Typed roast profile decoded from the raw literal tree
//!
//! [`RoastProfile`] is the immutable record consumed by the statistics,
//! rendering, and log-table units. Decoding is tolerant: Artisan writes
//! many optional keys, and absent metadata degrades to empty strings or
//! `None` rather than failing the whole file.

use std::fs;
use std::path::Path;

use log::{debug, warn};

use super::value::{Value, ValueError};

/// Invalid-reading sentinel used by Artisan for dropped thermocouple samples.
pub const INVALID_READING: f64 = -1.0;

/// Errors that can occur while reading a roast profile.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("literal parse error: {0}")]
    Parse(#[from] ValueError),

    #[error("profile root is not a dict")]
    NotADict,

    #[error("no valid temperature samples in profile")]
    NoValidSamples,
}

/// Standard named events in a roast timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Charge,
    TurningPoint,
    DryEnd,
    FirstCrackStart,
    FirstCrackEnd,
    SecondCrackStart,
    SecondCrackEnd,
    Drop,
}

impl EventKind {
    /// Display label matching the conventional roast-log abbreviations.
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Charge => "CHARGE",
            EventKind::TurningPoint => "TP",
            EventKind::DryEnd => "DRY END",
            EventKind::FirstCrackStart => "FCs",
            EventKind::FirstCrackEnd => "FCe",
            EventKind::SecondCrackStart => "SCs",
            EventKind::SecondCrackEnd => "SCe",
            EventKind::Drop => "DROP",
        }
    }

    /// Events tracked after CHARGE, in timeline order.
    pub const TIMELINE: [EventKind; 7] = [
        EventKind::TurningPoint,
        EventKind::DryEnd,
        EventKind::FirstCrackStart,
        EventKind::FirstCrackEnd,
        EventKind::SecondCrackStart,
        EventKind::SecondCrackEnd,
        EventKind::Drop,
    ];
}

/// A named event resolved against the roast timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct RoastEvent {
    pub kind: EventKind,
    /// Absolute recorder time in seconds.
    pub time_secs: f64,
    /// Seconds since CHARGE.
    pub relative_secs: f64,
    /// Bean temperature at the event, when Artisan recorded one.
    pub bt: Option<f64>,
}

/// An operator-annotated event (gas changes and similar), indexed into `timex`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecialEvent {
    /// Index into the time axis.
    pub index: usize,
    /// Raw event slider value.
    pub value: f64,
    /// Operator label, usually the gas setting in mbar.
    pub label: String,
}

/// Values Artisan pre-computes at save time (event times/temps, totals, phases).
///
/// Times are kept only when positive; Artisan writes `0` for events that
/// never happened.
#[derive(Debug, Clone, Default)]
pub struct Computed {
    pub charge_bt: Option<f64>,
    pub charge_et: Option<f64>,
    pub tp_time: Option<f64>,
    pub tp_bt: Option<f64>,
    pub dry_time: Option<f64>,
    pub dry_end_bt: Option<f64>,
    pub fcs_time: Option<f64>,
    pub fcs_bt: Option<f64>,
    pub fce_time: Option<f64>,
    pub fce_bt: Option<f64>,
    pub scs_time: Option<f64>,
    pub scs_bt: Option<f64>,
    pub sce_time: Option<f64>,
    pub sce_bt: Option<f64>,
    pub drop_time: Option<f64>,
    pub drop_bt: Option<f64>,
    /// Total roast time in seconds.
    pub total_time: f64,
    pub drying_duration: Option<f64>,
    pub maillard_duration: Option<f64>,
    pub development_duration: Option<f64>,
    pub drying_percent: Option<f64>,
    pub maillard_percent: Option<f64>,
    pub development_percent: Option<f64>,
}

impl Computed {
    fn from_value(raw: &Value) -> Self {
        let pos = |key: &str| raw.get(key).and_then(Value::as_f64).filter(|t| *t > 0.0);
        let durations = raw.get("phase_durations_s");
        let percentages = raw.get("phase_percentages");
        let phase = |dict: Option<&Value>, key: &str| {
            dict.and_then(|d| d.get(key))
                .and_then(Value::as_f64)
                .filter(|v| *v > 0.0)
        };
        Computed {
            charge_bt: pos("CHARGE_BT"),
            charge_et: pos("CHARGE_ET"),
            tp_time: pos("TP_time"),
            tp_bt: pos("TP_BT"),
            dry_time: pos("DRY_time"),
            dry_end_bt: pos("DRY_END_BT"),
            fcs_time: pos("FCs_time"),
            fcs_bt: pos("FCs_BT"),
            fce_time: pos("FCe_time"),
            fce_bt: pos("FCe_BT"),
            scs_time: pos("SCs_time"),
            scs_bt: pos("SCs_BT"),
            sce_time: pos("SCe_time"),
            sce_bt: pos("SCe_BT"),
            drop_time: pos("DROP_time"),
            drop_bt: pos("DROP_BT"),
            total_time: raw
                .get("totaltime")
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
            drying_duration: phase(durations, "drying"),
            maillard_duration: phase(durations, "maillard"),
            development_duration: phase(durations, "development"),
            drying_percent: phase(percentages, "drying"),
            maillard_percent: phase(percentages, "maillard"),
            development_percent: phase(percentages, "development"),
        }
    }

    /// Event time for a kind, when recorded.
    pub fn event_time(&self, kind: EventKind) -> Option<f64> {
        match kind {
            EventKind::Charge => None,
            EventKind::TurningPoint => self.tp_time,
            EventKind::DryEnd => self.dry_time,
            EventKind::FirstCrackStart => self.fcs_time,
            EventKind::FirstCrackEnd => self.fce_time,
            EventKind::SecondCrackStart => self.scs_time,
            EventKind::SecondCrackEnd => self.sce_time,
            EventKind::Drop => self.drop_time,
        }
    }

    /// Event bean temperature for a kind, when recorded.
    pub fn event_bt(&self, kind: EventKind) -> Option<f64> {
        match kind {
            EventKind::Charge => self.charge_bt,
            EventKind::TurningPoint => self.tp_bt,
            EventKind::DryEnd => self.dry_end_bt,
            EventKind::FirstCrackStart => self.fcs_bt,
            EventKind::FirstCrackEnd => self.fce_bt,
            EventKind::SecondCrackStart => self.scs_bt,
            EventKind::SecondCrackEnd => self.sce_bt,
            EventKind::Drop => self.drop_bt,
        }
    }
}

/// Duration and share of total roast time for one phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseSummary {
    pub duration_secs: f64,
    pub percent: f64,
}

/// The three conventional roast phases.
#[derive(Debug, Clone, Copy, Default)]
pub struct Phases {
    pub drying: Option<PhaseSummary>,
    pub maillard: Option<PhaseSummary>,
    pub development: Option<PhaseSummary>,
}

/// Parallel (time, BT, ET) samples with invalid readings removed and the
/// tail past DROP truncated.
///
/// Invariant: all vectors have equal length and times are non-decreasing.
#[derive(Debug, Clone, Default)]
pub struct TemperatureSeries {
    /// Sample times in seconds.
    pub times: Vec<f64>,
    /// Bean temperature channel.
    pub bt: Vec<f64>,
    /// Environment temperature channel.
    pub et: Vec<f64>,
    /// First extra-device channel (typically exhaust), aligned by index.
    /// `INVALID_READING` where the device recorded nothing.
    pub exhaust: Vec<f64>,
}

impl TemperatureSeries {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Sample times converted to minutes, for display axes.
    pub fn times_minutes(&self) -> Vec<f64> {
        self.times.iter().map(|t| t / 60.0).collect()
    }

    /// Index of the first sample at or after `time_secs`.
    pub fn index_at(&self, time_secs: f64) -> Option<usize> {
        self.times.iter().position(|t| *t >= time_secs)
    }
}

/// A complete parsed `.alog` roast profile.
#[derive(Debug, Clone)]
pub struct RoastProfile {
    pub title: String,
    /// Human-readable roast date as written by Artisan.
    pub roast_date: String,
    /// ISO `YYYY-MM-DD` roast date, when present.
    pub roast_iso_date: String,
    pub batch_prefix: String,
    pub batch_number: i64,
    pub beans: String,
    pub roaster_type: String,
    pub weight_in: f64,
    pub weight_out: f64,
    pub weight_unit: String,
    /// Raw recorder time axis in seconds.
    pub timex: Vec<f64>,
    /// Raw first thermocouple channel (ET by Artisan convention).
    pub temp1: Vec<f64>,
    /// Raw second thermocouple channel (BT by Artisan convention).
    pub temp2: Vec<f64>,
    /// First extra-device channel rows.
    pub extra1: Vec<f64>,
    pub extra2: Vec<f64>,
    /// Event indices into `timex`; `timeindex[0]` is CHARGE.
    pub timeindex: Vec<i64>,
    pub special_events: Vec<SpecialEvent>,
    pub computed: Computed,
}

impl RoastProfile {
    /// Read and decode a `.alog` file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ProfileError> {
        let content = fs::read_to_string(path.as_ref())?;
        let value = Value::parse(&content)?;
        debug!("parsed {}", path.as_ref().display());
        Self::from_value(&value)
    }

    /// Decode a parsed literal into a profile.
    pub fn from_value(value: &Value) -> Result<Self, ProfileError> {
        if !matches!(value, Value::Dict(_)) {
            return Err(ProfileError::NotADict);
        }

        let get_str = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string()
        };
        let get_f64_vec =
            |key: &str| value.get(key).and_then(Value::to_f64_vec).unwrap_or_default();

        // weight is a (in, out, unit) triple
        let weight = value.get("weight").and_then(Value::as_list);
        let weight_at = |i: usize| {
            weight
                .and_then(|w| w.get(i))
                .and_then(Value::as_f64)
                .unwrap_or(0.0)
        };
        let weight_unit = weight
            .and_then(|w| w.get(2))
            .and_then(Value::as_str)
            .unwrap_or("g")
            .to_string();

        // First row of each extra-device matrix
        let extra_row = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_list)
                .and_then(|rows| rows.first())
                .and_then(Value::to_f64_vec)
                .unwrap_or_default()
        };

        let timeindex = value
            .get("timeindex")
            .and_then(Value::as_list)
            .map(|items| {
                items
                    .iter()
                    .map(|v| v.as_i64().unwrap_or(0))
                    .collect()
            })
            .unwrap_or_default();

        let computed = value
            .get("computed")
            .map(Computed::from_value)
            .unwrap_or_default();

        let profile = RoastProfile {
            title: {
                let t = get_str("title");
                if t.is_empty() {
                    "Roast Profile".to_string()
                } else {
                    t
                }
            },
            roast_date: get_str("roastdate"),
            roast_iso_date: get_str("roastisodate"),
            batch_prefix: {
                let p = get_str("roastbatchprefix");
                if p.is_empty() {
                    "#".to_string()
                } else {
                    p
                }
            },
            batch_number: value
                .get("roastbatchnr")
                .and_then(Value::as_i64)
                .unwrap_or(0),
            beans: get_str("beans").trim().to_string(),
            roaster_type: get_str("roastertype"),
            weight_in: weight_at(0),
            weight_out: weight_at(1),
            weight_unit,
            timex: get_f64_vec("timex"),
            temp1: get_f64_vec("temp1"),
            temp2: get_f64_vec("temp2"),
            extra1: extra_row("extratemp1"),
            extra2: extra_row("extratemp2"),
            timeindex,
            special_events: decode_special_events(value),
            computed,
        };
        Ok(profile)
    }

    /// Roast name for logs and tables, e.g. `#28`.
    pub fn batch_name(&self) -> String {
        format!("{}{}", self.batch_prefix, self.batch_number)
    }

    /// Absolute CHARGE time in seconds (0.0 when the profile has none).
    pub fn charge_time(&self) -> f64 {
        match self.timeindex.first() {
            Some(&idx) if idx > 0 => self
                .timex
                .get(idx as usize)
                .copied()
                .unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Decide which raw channel is BT and which is ET.
    ///
    /// Artisan's save-time `CHARGE_BT`/`CHARGE_ET` values are matched against
    /// the channel readings shortly after charge. Without them, BT is the
    /// channel with the lower early average: the bean probe plunges on
    /// charge while the environment probe stays hot.
    pub fn assign_channels(&self) -> (&[f64], &[f64]) {
        let (temp1, temp2) = (self.temp1.as_slice(), self.temp2.as_slice());
        if let (Some(charge_bt), Some(charge_et)) =
            (self.computed.charge_bt, self.computed.charge_et)
        {
            if !temp1.is_empty() && !temp2.is_empty() {
                let idx = 10.min(temp1.len() - 1).min(temp2.len() - 1);
                let sample = |channel: &[f64]| {
                    if channel[idx] >= 0.0 {
                        channel[idx]
                    } else {
                        channel[0]
                    }
                };
                let s2 = sample(temp2);
                let temp2_is_bt = (s2 - charge_bt).abs() < (s2 - charge_et).abs();
                return if temp2_is_bt {
                    (temp2, temp1)
                } else {
                    (temp1, temp2)
                };
            }
        }

        if temp1.len() > 10 && temp2.len() > 10 {
            let early_avg = |channel: &[f64]| {
                let valid: Vec<f64> = channel
                    .iter()
                    .take(50)
                    .copied()
                    .filter(|t| *t >= 0.0)
                    .collect();
                if valid.is_empty() {
                    f64::MAX
                } else {
                    valid.iter().sum::<f64>() / valid.len() as f64
                }
            };
            if early_avg(temp2) < early_avg(temp1) {
                return (temp2, temp1);
            }
        }
        (temp1, temp2)
    }

    /// Build the cleaned temperature series: assign channels, drop samples
    /// where both probes read invalid, and truncate one sample past DROP.
    pub fn temperature_series(&self) -> Result<TemperatureSeries, ProfileError> {
        let (bt, et) = self.assign_channels();

        let mut series = TemperatureSeries::default();
        for (i, &t) in self.timex.iter().enumerate() {
            let bt_i = bt.get(i).copied().unwrap_or(INVALID_READING);
            let et_i = et.get(i).copied().unwrap_or(INVALID_READING);
            if bt_i >= 0.0 || et_i >= 0.0 {
                series.times.push(t);
                series.bt.push(bt_i);
                series.et.push(et_i);
                series
                    .exhaust
                    .push(self.extra1.get(i).copied().unwrap_or(INVALID_READING));
            }
        }
        if series.is_empty() {
            return Err(ProfileError::NoValidSamples);
        }

        if let Some(drop_time) = self.computed.drop_time {
            if let Some(idx) = series.index_at(drop_time) {
                series.times.truncate(idx + 1);
                series.bt.truncate(idx + 1);
                series.et.truncate(idx + 1);
                series.exhaust.truncate(idx + 1);
            }
        }

        if series
            .times
            .windows(2)
            .any(|pair| pair[1] < pair[0])
        {
            warn!("time axis is not monotonic; RoR values may be noisy");
        }
        Ok(series)
    }

    /// All named events present in the profile, chronological, with
    /// charge-relative times.
    pub fn events(&self) -> Vec<RoastEvent> {
        let charge_time = self.charge_time();
        let mut events = Vec::new();
        if self.timeindex.first().copied().unwrap_or(0) > 0 {
            events.push(RoastEvent {
                kind: EventKind::Charge,
                time_secs: charge_time,
                relative_secs: 0.0,
                bt: self.computed.charge_bt,
            });
        }
        for kind in EventKind::TIMELINE {
            if let Some(time) = self.computed.event_time(kind) {
                events.push(RoastEvent {
                    kind,
                    time_secs: time,
                    relative_secs: time - charge_time,
                    bt: self.computed.event_bt(kind),
                });
            }
        }
        events.sort_by(|a, b| {
            a.time_secs
                .partial_cmp(&b.time_secs)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        events
    }

    /// Development percentage: time after first crack as a share of total
    /// roast time. Falls back to event arithmetic when Artisan did not
    /// record it.
    pub fn development_percent(&self) -> Option<f64> {
        if let Some(pct) = self.computed.development_percent {
            return Some(pct);
        }
        let fcs = self.computed.fcs_time?;
        let drop = self.computed.drop_time?;
        let total = self.computed.total_time;
        if total > 0.0 {
            Some((drop - fcs) / total * 100.0)
        } else {
            None
        }
    }

    /// Weight loss across the roast, in percent.
    pub fn weight_loss_percent(&self) -> Option<f64> {
        if self.weight_in > 0.0 && self.weight_out > 0.0 {
            Some((self.weight_in - self.weight_out) / self.weight_in * 100.0)
        } else {
            None
        }
    }

    /// Phase durations and percentages, preferring Artisan's saved values
    /// and recomputing from event times otherwise.
    pub fn phases(&self) -> Phases {
        let charge = self.charge_time();
        let total = if self.computed.total_time > 0.0 {
            Some(self.computed.total_time)
        } else {
            self.computed.drop_time.map(|d| d - charge)
        };
        let summary = |duration: Option<f64>, percent: Option<f64>, span: Option<(f64, f64)>| {
            let duration = duration.or_else(|| {
                span.map(|(start, end)| end - start)
                    .filter(|d| *d > 0.0)
            })?;
            let percent = percent
                .or_else(|| total.map(|t| duration / t * 100.0))
                .unwrap_or(0.0);
            Some(PhaseSummary {
                duration_secs: duration,
                percent,
            })
        };
        let c = &self.computed;
        Phases {
            drying: summary(
                c.drying_duration,
                c.drying_percent,
                c.dry_time.map(|dry| (charge, dry)),
            ),
            maillard: summary(
                c.maillard_duration,
                c.maillard_percent,
                c.dry_time.zip(c.fcs_time),
            ),
            development: summary(
                c.development_duration,
                c.development_percent,
                c.fcs_time.zip(c.drop_time),
            ),
        }
    }

    /// Gas setting at charge, inferred from the first event slider value.
    pub fn charge_gas(&self) -> Option<&'static str> {
        self.special_events
            .first()
            .map(|e| gas_setting_mbar(e.value))
    }

    /// Gas-change annotations after charge: (charge-relative seconds, label).
    pub fn gas_changes(&self) -> Vec<(f64, String)> {
        let charge_time = self.charge_time();
        let mut changes: Vec<(f64, String)> = self
            .special_events
            .iter()
            .filter(|e| !e.label.trim().is_empty())
            .filter_map(|e| {
                self.timex
                    .get(e.index)
                    .map(|&t| (t - charge_time, e.label.clone()))
            })
            .collect();
        changes.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        changes
    }
}

/// Map an event slider value onto Artisan's gas-setting buckets (mbar).
pub fn gas_setting_mbar(value: f64) -> &'static str {
    if value < 1.3 {
        "5"
    } else if value < 1.8 {
        "10"
    } else if value < 2.3 {
        "15"
    } else if value < 2.8 {
        "20"
    } else if value < 3.3 {
        "25"
    } else if value < 3.8 {
        "30"
    } else {
        "35+"
    }
}

fn decode_special_events(value: &Value) -> Vec<SpecialEvent> {
    let indices = value.get("specialevents").and_then(Value::as_list);
    let values = value.get("specialeventsvalue").and_then(Value::as_list);
    let labels = value.get("specialeventsStrings").and_then(Value::as_list);
    let (Some(indices), Some(labels)) = (indices, labels) else {
        return Vec::new();
    };
    indices
        .iter()
        .enumerate()
        .filter_map(|(i, idx)| {
            let index = idx.as_i64().filter(|v| *v >= 0)? as usize;
            let label = labels.get(i)?.as_str().unwrap_or("").to_string();
            let value = values
                .and_then(|v| v.get(i))
                .and_then(Value::as_f64)
                .unwrap_or(0.0);
            Some(SpecialEvent {
                index,
                value,
                label,
            })
        })
        .collect()
}
