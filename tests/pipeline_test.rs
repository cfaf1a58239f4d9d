//! Integration tests for roastlog
//!
//! These tests run the full pipeline on a synthetic but realistic roast:
//! parse, series extraction, RoR, statistics, rendering, and the markdown
//! log table.

use std::fs;

use roastlog::alog::{EventKind, RoastProfile};
use roastlog::logtable::{self, LogEntry};
use roastlog::render::{render_profile, RenderConfig, RenderError};
use roastlog::ror;
use roastlog::stats::RoastStats;
use tempfile::tempdir;

/// Build a plausible 9.5-minute roast as a .alog literal.
///
/// temp1 is the environment probe, temp2 the bean probe, matching the
/// Artisan channel convention. CHARGE lands at t=10s, DROP at t=570s.
fn synth_alog() -> String {
    let mut timex = Vec::new();
    let mut et = Vec::new();
    let mut bt = Vec::new();
    for i in 0..=285 {
        let t = (i * 2) as f64;
        timex.push(format!("{t:.1}"));
        et.push(format!("{:.1}", 425.0 + t * 0.08));
        let bean = if t < 60.0 {
            390.0 - 175.0 * (t / 60.0)
        } else {
            215.0 + 190.0 * ((t - 60.0) / 510.0)
        };
        bt.push(format!("{bean:.1}"));
    }
    format!(
        "{{'title': 'Integration Roast', \
          'roastdate': 'Sat Mar 1 2025', \
          'roastisodate': '2025-03-01', \
          'roastbatchprefix': '#', \
          'roastbatchnr': 42, \
          'beans': 'Colombia Huila', \
          'roastertype': 'Kaleido M2', \
          'weight': [380.0, 325.0, 'g'], \
          'timex': [{timex}], \
          'temp1': [{et}], \
          'temp2': [{bt}], \
          'timeindex': [5, 0, 0, 0, 0, 0, 285, 0], \
          'specialevents': [5, 100], \
          'specialeventsvalue': [2.5, 1.5], \
          'specialeventsStrings': ['20', '10'], \
          'computed': {{'CHARGE_BT': 390.0, 'CHARGE_ET': 425.0, \
            'TP_time': 60.0, 'TP_BT': 215.0, \
            'DRY_time': 300.0, 'DRY_END_BT': 304.4, \
            'FCs_time': 480.0, 'FCs_BT': 371.5, \
            'DROP_time': 570.0, 'DROP_BT': 405.0, \
            'totaltime': 560.0}}}}",
        timex = timex.join(", "),
        et = et.join(", "),
        bt = bt.join(", "),
    )
}

fn synth_profile() -> RoastProfile {
    let dir = tempdir().unwrap();
    let path = dir.path().join("batch42.alog");
    fs::write(&path, synth_alog()).unwrap();
    RoastProfile::open(&path).unwrap()
}

#[test]
fn test_parse_metadata() {
    let profile = synth_profile();
    assert_eq!(profile.title, "Integration Roast");
    assert_eq!(profile.batch_name(), "#42");
    assert_eq!(profile.beans, "Colombia Huila");
    assert_eq!(profile.timex.len(), 286);
    assert_eq!(profile.charge_time(), 10.0);
}

#[test]
fn test_series_invariants() {
    let profile = synth_profile();
    let series = profile.temperature_series().unwrap();

    assert_eq!(series.times.len(), series.bt.len());
    assert_eq!(series.times.len(), series.et.len());
    assert!(series
        .times
        .windows(2)
        .all(|pair| pair[1] >= pair[0]));
    // truncated at DROP
    assert_eq!(series.times.last().copied(), Some(570.0));
    // bean probe correctly identified despite the temp1/temp2 convention
    assert_eq!(series.bt[0], 390.0);
    assert_eq!(series.et[0], 425.0);
}

#[test]
fn test_ror_pipeline() {
    let profile = synth_profile();
    let series = profile.temperature_series().unwrap();
    let mut bt_ror = ror::bt_ror(&series);
    assert_eq!(bt_ror.len(), series.len());

    let tp_idx = series.index_at(60.0).unwrap();
    ror::zero_before(&mut bt_ror, tp_idx);
    assert!(bt_ror[..tp_idx].iter().all(|v| *v == 0.0));

    // after TP the synthetic bean curve climbs 190 degrees in 510 s,
    // about 22.4 deg/min
    let peak = ror::peak(&bt_ror, &series.times).unwrap();
    assert!(peak.value > 15.0 && peak.value < 30.0);
    assert!(peak.time_secs >= 60.0);
}

#[test]
fn test_stats_report() {
    let profile = synth_profile();
    let stats = RoastStats::from_profile(&profile, Some("batch42.alog"));

    let names: Vec<&str> = stats.events.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["CHARGE", "TP", "DRY_END", "FCs", "DROP"]);
    assert_eq!(stats.events[0].gas_mbar.as_deref(), Some("20"));
    assert_eq!(stats.total_time_formatted, "9:20");
    // (570 - 480) / 560
    assert!((stats.phases.development.percentage - 16.1).abs() < 0.2);

    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["weight"]["loss_percent"], 14.5);
}

#[test]
fn test_events_cover_timeline() {
    let profile = synth_profile();
    let events = profile.events();
    assert_eq!(events[0].kind, EventKind::Charge);
    assert_eq!(events.last().unwrap().kind, EventKind::Drop);
    // DROP at 570 absolute, charge at 10
    assert_eq!(events.last().unwrap().relative_secs, 560.0);
}

#[test]
fn test_render_writes_png() {
    let dir = tempdir().unwrap();
    let profile = synth_profile();
    let output = dir.path().join("batch42.png");
    let config = RenderConfig {
        width: 800,
        height: 640,
        ..RenderConfig::default()
    };
    match render_profile(&profile, &output, &config) {
        Ok(()) => {
            let len = fs::metadata(&output).unwrap().len();
            assert!(len > 1000, "suspiciously small PNG: {len} bytes");
        }
        // Headless CI images sometimes ship without fonts; drawing errors
        // there are not a pipeline failure.
        Err(RenderError::Draw(msg)) => {
            eprintln!("skipping render assertions: {msg}");
        }
        Err(other) => panic!("unexpected render error: {other}"),
    }
}

#[test]
fn test_update_log_roundtrip() {
    let dir = tempdir().unwrap();
    let profile = synth_profile();
    let log = dir.path().join("roasts.md");

    let entry = LogEntry::from_profile(&profile);
    assert_eq!(entry.roast_name, "#42");
    assert_eq!(entry.roast_iso_date, "2025-03-01");

    let added = logtable::update(&log, &entry, "renders/batch 42.png", None).unwrap();
    assert!(added);
    let content = fs::read_to_string(&log).unwrap();
    assert!(content.contains("| #42 |"));
    assert!(content.contains("![Profile](renders/batch%2042.png)"));

    // second run is a no-op
    assert!(!logtable::update(&log, &entry, "renders/batch 42.png", None).unwrap());
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.alog");
    fs::write(&path, "{'title': 'broken'").unwrap();
    assert!(RoastProfile::open(&path).is_err());

    fs::write(&path, "not a literal at all").unwrap();
    assert!(RoastProfile::open(&path).is_err());
}
