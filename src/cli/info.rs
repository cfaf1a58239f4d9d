use anyhow::{Context, Result};
use std::path::PathBuf;

use roastlog::alog::RoastProfile;
use roastlog::ror;
use roastlog::stats::format_mmss;

/// Display a human-readable summary of a parsed .alog file.
pub fn run(input: PathBuf) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    let profile = RoastProfile::open(&input)
        .with_context(|| format!("Failed to parse {}", input.display()))?;

    println!("Roast Profile Information");
    println!("=========================");
    println!("File: {}", input.display());
    println!();

    println!("Roast:");
    println!("  Batch: {}", profile.batch_name());
    println!("  Title: {}", profile.title);
    if !profile.roast_date.is_empty() {
        println!("  Date: {}", profile.roast_date);
    }
    if !profile.beans.is_empty() {
        println!("  Beans: {}", profile.beans);
    }
    if !profile.roaster_type.is_empty() {
        println!("  Roaster: {}", profile.roaster_type);
    }
    if profile.weight_in > 0.0 {
        print!(
            "  Weight: {}{u} -> {}{u}",
            profile.weight_in,
            profile.weight_out,
            u = profile.weight_unit
        );
        if let Some(loss) = profile.weight_loss_percent() {
            print!(" ({loss:.1}% loss)");
        }
        println!();
    }
    println!();

    let series = profile.temperature_series()?;
    println!("Data:");
    println!("  Samples: {} (of {} recorded)", series.len(), profile.timex.len());
    if let (Some(first), Some(last)) = (series.times.first(), series.times.last()) {
        println!(
            "  Span: {} to {}",
            format_mmss(*first),
            format_mmss(*last)
        );
    }
    let bt_ror = ror::bt_ror(&series);
    if let Some(peak) = ror::peak(&bt_ror, &series.times) {
        println!(
            "  Peak RoR: {:.1} deg/min at {}",
            peak.value,
            format_mmss(peak.time_secs)
        );
    }
    println!();

    let events = profile.events();
    if !events.is_empty() {
        println!("Events:");
        for event in events {
            match event.bt {
                Some(bt) => println!(
                    "  {:>5}  {:<8} {:.1}F",
                    format_mmss(event.relative_secs),
                    event.kind.label(),
                    bt
                ),
                None => println!(
                    "  {:>5}  {}",
                    format_mmss(event.relative_secs),
                    event.kind.label()
                ),
            }
        }
        println!();
    }

    let phases = profile.phases();
    let rows = [
        ("Drying", phases.drying),
        ("Maillard", phases.maillard),
        ("Development", phases.development),
    ];
    if rows.iter().any(|(_, p)| p.is_some()) {
        println!("Phases:");
        for (name, summary) in rows {
            if let Some(p) = summary {
                println!(
                    "  {:<12} {:>5} ({:.1}%)",
                    name,
                    format_mmss(p.duration_secs),
                    p.percent
                );
            }
        }
    }
    Ok(())
}
