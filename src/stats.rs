//! Roast statistics report
//!
//! A serde-serializable summary of a parsed profile, printed as JSON by
//! the CLI so roast data can be piped into other tooling (CI annotations,
//! spreadsheets, dashboards).

use serde::{Deserialize, Serialize};

use crate::alog::{EventKind, PhaseSummary, RoastProfile};

/// Top-level statistics report for one roast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoastStats {
    /// Source filename, when known.
    pub file: Option<String>,
    pub title: String,
    pub roast_date: String,
    pub beans: String,
    pub roaster: String,
    pub weight: WeightStats,
    pub total_time_seconds: f64,
    /// Total time as `M:SS`, empty when unknown.
    pub total_time_formatted: String,
    pub phases: PhaseStats,
    /// Named events in chronological order, charge-relative.
    pub events: Vec<EventStats>,
    /// Gas changes after charge, chronological.
    pub gas_changes: Vec<GasChange>,
}

/// Green and roasted weight with computed loss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightStats {
    #[serde(rename = "in")]
    pub weight_in: f64,
    #[serde(rename = "out")]
    pub weight_out: f64,
    pub unit: String,
    pub loss_percent: f64,
}

/// Duration and share for the three conventional phases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseStats {
    pub drying: PhaseEntry,
    pub maillard: PhaseEntry,
    pub development: PhaseEntry,
}

/// One phase row in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseEntry {
    pub duration_seconds: f64,
    pub duration_formatted: String,
    pub percentage: f64,
}

impl Default for PhaseEntry {
    fn default() -> Self {
        PhaseEntry {
            duration_seconds: 0.0,
            duration_formatted: "0:00".to_string(),
            percentage: 0.0,
        }
    }
}

/// One named event in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventStats {
    pub name: String,
    pub time_seconds: i64,
    pub time_formatted: String,
    pub temperature_f: Option<f64>,
    /// Inferred gas setting, present on CHARGE only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_mbar: Option<String>,
}

/// A gas-setting change annotated by the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GasChange {
    pub time_seconds: i64,
    pub time_formatted: String,
    pub gas_mbar: String,
}

impl RoastStats {
    /// Build the report from a parsed profile.
    pub fn from_profile(profile: &RoastProfile, file: Option<&str>) -> RoastStats {
        let total_time = profile.computed.total_time;
        let phases = profile.phases();

        let mut events = Vec::new();
        // CHARGE is always reported, even for profiles without one, so the
        // report shape stays stable for consumers.
        events.push(EventStats {
            name: "CHARGE".to_string(),
            time_seconds: 0,
            time_formatted: "0:00".to_string(),
            temperature_f: profile.computed.charge_bt.map(round1),
            gas_mbar: Some(
                profile
                    .charge_gas()
                    .unwrap_or("Unknown")
                    .to_string(),
            ),
        });
        for event in profile.events() {
            if event.kind == EventKind::Charge {
                continue;
            }
            events.push(EventStats {
                name: stats_name(event.kind).to_string(),
                time_seconds: event.relative_secs as i64,
                time_formatted: format_mmss(event.relative_secs),
                temperature_f: event.bt.map(round1),
                gas_mbar: None,
            });
        }
        events.sort_by_key(|e| e.time_seconds);

        let gas_changes = profile
            .gas_changes()
            .into_iter()
            .map(|(secs, label)| GasChange {
                time_seconds: secs as i64,
                time_formatted: format_mmss(secs),
                gas_mbar: label,
            })
            .collect();

        RoastStats {
            file: file.map(str::to_string),
            title: profile.title.clone(),
            roast_date: profile.roast_date.clone(),
            beans: profile.beans.clone(),
            roaster: profile.roaster_type.clone(),
            weight: WeightStats {
                weight_in: profile.weight_in,
                weight_out: profile.weight_out,
                unit: profile.weight_unit.clone(),
                loss_percent: profile.weight_loss_percent().map(round1).unwrap_or(0.0),
            },
            total_time_seconds: total_time,
            total_time_formatted: if total_time > 0.0 {
                format_mmss(total_time)
            } else {
                String::new()
            },
            phases: PhaseStats {
                drying: phase_entry(phases.drying),
                maillard: phase_entry(phases.maillard),
                development: phase_entry(phases.development),
            },
            events,
            gas_changes,
        }
    }
}

/// Event names as they appear in the JSON report (DRY END is `DRY_END`).
fn stats_name(kind: EventKind) -> &'static str {
    match kind {
        EventKind::DryEnd => "DRY_END",
        other => other.label(),
    }
}

fn phase_entry(summary: Option<PhaseSummary>) -> PhaseEntry {
    match summary {
        Some(s) => PhaseEntry {
            duration_seconds: s.duration_secs,
            duration_formatted: format_mmss(s.duration_secs),
            percentage: round1(s.percent),
        },
        None => PhaseEntry::default(),
    }
}

/// Format seconds as `M:SS`.
pub fn format_mmss(secs: f64) -> String {
    let secs = secs.max(0.0);
    format!("{}:{:02}", (secs / 60.0) as i64, (secs % 60.0) as i64)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alog::Value;

    fn sample_stats() -> RoastStats {
        let literal = r#"{
            'title': 'Ethiopia Guji',
            'roastdate': 'Sat Mar 1 2025',
            'beans': 'Ethiopia Guji Natural',
            'roastertype': 'Kaleido M2',
            'weight': [380.0, 325.0, 'g'],
            'timex': [0.0, 30.0, 60.0, 120.0, 300.0, 480.0, 570.0],
            'temp1': [430.0, 425.0, 428.0, 440.0, 460.0, 470.0, 475.0],
            'temp2': [390.0, 215.0, 230.0, 280.0, 340.0, 395.0, 405.0],
            'timeindex': [1, 0, 0, 0, 0, 0, 0, 0],
            'specialevents': [1, 4],
            'specialeventsvalue': [2.5, 3.0],
            'specialeventsStrings': ['20', '25'],
            'computed': {
                'CHARGE_BT': 390.0,
                'CHARGE_ET': 430.0,
                'TP_time': 60.0,
                'TP_BT': 215.0,
                'DRY_time': 300.0,
                'DRY_END_BT': 340.0,
                'FCs_time': 480.0,
                'FCs_BT': 395.0,
                'DROP_time': 570.0,
                'DROP_BT': 405.0,
                'totaltime': 540.0,
                'phase_durations_s': {'drying': 270.0, 'maillard': 180.0, 'development': 90.0},
                'phase_percentages': {'drying': 50.0, 'maillard': 33.33, 'development': 16.67}
            }
        }"#;
        let profile =
            RoastProfile::from_value(&Value::parse(literal).unwrap()).unwrap();
        RoastStats::from_profile(&profile, Some("batch28.alog"))
    }

    #[test]
    fn test_report_metadata() {
        let stats = sample_stats();
        assert_eq!(stats.file.as_deref(), Some("batch28.alog"));
        assert_eq!(stats.title, "Ethiopia Guji");
        assert_eq!(stats.weight.loss_percent, 14.5);
        assert_eq!(stats.total_time_formatted, "9:00");
    }

    #[test]
    fn test_events_charge_first_with_gas() {
        let stats = sample_stats();
        assert_eq!(stats.events[0].name, "CHARGE");
        assert_eq!(stats.events[0].gas_mbar.as_deref(), Some("20"));
        assert_eq!(stats.events[0].temperature_f, Some(390.0));
        // charge at t=30: TP at 60 absolute is 0:30 relative
        let tp = stats.events.iter().find(|e| e.name == "TP").unwrap();
        assert_eq!(tp.time_seconds, 30);
        assert_eq!(tp.time_formatted, "0:30");
        assert!(tp.gas_mbar.is_none());
        let dry = stats.events.iter().find(|e| e.name == "DRY_END").unwrap();
        assert_eq!(dry.time_formatted, "4:30");
    }

    #[test]
    fn test_events_sorted() {
        let stats = sample_stats();
        let times: Vec<i64> = stats.events.iter().map(|e| e.time_seconds).collect();
        let mut sorted = times.clone();
        sorted.sort_unstable();
        assert_eq!(times, sorted);
    }

    #[test]
    fn test_phase_rows() {
        let stats = sample_stats();
        assert_eq!(stats.phases.drying.duration_formatted, "4:30");
        assert_eq!(stats.phases.drying.percentage, 50.0);
        assert_eq!(stats.phases.maillard.percentage, 33.3);
        assert_eq!(stats.phases.development.duration_seconds, 90.0);
    }

    #[test]
    fn test_gas_changes() {
        let stats = sample_stats();
        // second special event at timex[4]=300, charge at 30 -> 4:30
        assert_eq!(stats.gas_changes.len(), 2);
        assert_eq!(stats.gas_changes[1].time_formatted, "4:30");
        assert_eq!(stats.gas_changes[1].gas_mbar, "25");
    }

    #[test]
    fn test_json_shape() {
        let stats = sample_stats();
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["weight"]["in"], 380.0);
        assert_eq!(json["phases"]["development"]["duration_seconds"], 90.0);
        // gas_mbar omitted on non-charge events
        let tp = json["events"]
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["name"] == "TP")
            .unwrap();
        assert!(tp.get("gas_mbar").is_none());
    }

    #[test]
    fn test_format_mmss() {
        assert_eq!(format_mmss(0.0), "0:00");
        assert_eq!(format_mmss(65.0), "1:05");
        assert_eq!(format_mmss(600.0), "10:00");
        assert_eq!(format_mmss(-5.0), "0:00");
    }

    #[test]
    fn test_bare_profile_keeps_shape() {
        let profile =
            RoastProfile::from_value(&Value::parse("{'timex': [0.0], 'temp1': [400.0], 'temp2': [300.0]}").unwrap())
                .unwrap();
        let stats = RoastStats::from_profile(&profile, None);
        assert_eq!(stats.events.len(), 1);
        assert_eq!(stats.events[0].gas_mbar.as_deref(), Some("Unknown"));
        assert_eq!(stats.total_time_formatted, "");
        assert_eq!(stats.phases.drying.duration_formatted, "0:00");
    }
}
