//! Roast profile chart rendering
//!
//! Draws the two-panel PNG: temperature curves (BT, ET, exhaust) with
//! phase spans and event guides on top, the BT Rate-of-Rise with its peak
//! marked below, and an optional roast-details caption block under both.

use std::path::Path;

use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::alog::{EventKind, ProfileError, RoastProfile, TemperatureSeries};
use crate::ror::{self, RorPeak};
use crate::stats::format_mmss;

use super::config::RenderSection;

/// Errors that can occur while rendering a chart.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("profile error: {0}")]
    Profile(#[from] ProfileError),

    #[error("temperature series too short to chart")]
    EmptySeries,

    #[error("drawing error: {0}")]
    Draw(String),
}

/// Chart rendering settings.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Output image width in pixels.
    pub width: u32,
    /// Output image height in pixels.
    pub height: u32,
    /// Trailing window for RoR smoothing, in seconds.
    pub ror_window_secs: f64,
    /// Whether to draw the roast-details caption block.
    pub show_details: bool,
    /// Source filename shown in the image corner, when set.
    pub source_filename: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            width: 1400,
            height: 1100,
            ror_window_secs: ror::DEFAULT_WINDOW_SECS,
            show_details: true,
            source_filename: None,
        }
    }
}

impl RenderConfig {
    /// Overlay settings loaded from a config file; explicit values win.
    pub fn apply_file(&mut self, section: &RenderSection) {
        if let Some(width) = section.width {
            self.width = width;
        }
        if let Some(height) = section.height {
            self.height = height;
        }
        if let Some(window) = section.ror_window_secs {
            self.ror_window_secs = window;
        }
        if let Some(details) = section.details {
            self.show_details = details;
        }
    }
}

/// Render a parsed profile to a PNG at `output_path`.
pub fn render_profile(
    profile: &RoastProfile,
    output_path: &Path,
    config: &RenderConfig,
) -> Result<(), RenderError> {
    let series = profile.temperature_series()?;
    if series.len() < 2 {
        return Err(RenderError::EmptySeries);
    }

    let mut bt_ror = ror::ror_series(&series.times, &series.bt, config.ror_window_secs);
    // RoR before the turning point is charge transient, not roast signal
    if let Some(tp_time) = profile.computed.tp_time {
        if let Some(tp_idx) = series.index_at(tp_time) {
            ror::zero_before(&mut bt_ror, tp_idx);
        }
    }
    let ror_peak = ror::peak(&bt_ror, &series.times);

    let root = BitMapBackend::new(output_path, (config.width, config.height)).into_drawing_area();
    draw_chart(&root, profile, &series, &bt_ror, ror_peak, config)?;
    root.present().map_err(draw_err)?;
    info!("rendered {}", output_path.display());
    Ok(())
}

fn draw_err<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Draw(err.to_string())
}

fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    profile: &RoastProfile,
    series: &TemperatureSeries,
    bt_ror: &[f64],
    ror_peak: Option<RorPeak>,
    config: &RenderConfig,
) -> Result<(), RenderError> {
    root.fill(&WHITE).map_err(draw_err)?;

    let title = if profile.roast_date.is_empty() {
        profile.title.clone()
    } else {
        format!("{} - {}", profile.title, profile.roast_date)
    };
    let root = root.titled(&title, ("sans-serif", 30)).map_err(draw_err)?;

    if let Some(name) = &config.source_filename {
        root.draw(&Text::new(
            format!("File: {name}"),
            (8, 8),
            ("sans-serif", 13).into_font().color(&BLACK.mix(0.5)),
        ))
        .map_err(draw_err)?;
    }

    let details = if config.show_details {
        roast_details(profile)
    } else {
        Vec::new()
    };
    let (_, total_h) = root.dim_in_pixel();
    let details_px = if details.is_empty() {
        0
    } else {
        (details.len() as u32 * 18 + 20).min(total_h / 2)
    };
    let (plots, details_area) = root.split_vertically(total_h - details_px);
    let (_, plot_h) = plots.dim_in_pixel();
    let (temp_area, ror_area) = plots.split_vertically(plot_h * 55 / 100);

    let times_min = series.times_minutes();
    let x_max = times_min.last().copied().unwrap_or(0.0).max(0.5);

    draw_temperature_panel(&temp_area, profile, series, &times_min, x_max)?;
    draw_ror_panel(&ror_area, profile, series, bt_ror, ror_peak, &times_min, x_max)?;

    let caption_style = ("monospace", 15).into_font().color(&BLACK);
    for (i, line) in details.iter().enumerate() {
        details_area
            .draw(&Text::new(
                line.clone(),
                (16, 10 + i as i32 * 18),
                caption_style.clone(),
            ))
            .map_err(draw_err)?;
    }
    Ok(())
}

fn draw_temperature_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    profile: &RoastProfile,
    series: &TemperatureSeries,
    times_min: &[f64],
    x_max: f64,
) -> Result<(), RenderError> {
    // Y range over all valid readings, with headroom on top for phase spans
    let valid = series
        .bt
        .iter()
        .chain(series.et.iter())
        .copied()
        .filter(|t| *t >= 0.0)
        .chain(series.exhaust.iter().copied().filter(|t| *t > 0.0));
    let (mut t_min, mut t_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for t in valid {
        t_min = t_min.min(t);
        t_max = t_max.max(t);
    }
    if !t_min.is_finite() || t_max <= t_min {
        return Err(RenderError::EmptySeries);
    }
    let bar_h = ((t_max - t_min) * 0.05).max(1.0);
    let y_lo = t_min - bar_h;
    let y_hi = t_max + 2.5 * bar_h;

    let mut chart = ChartBuilder::on(area)
        .margin(12)
        .x_label_area_size(28)
        .y_label_area_size(60)
        .caption("Temperature Profile", ("sans-serif", 22))
        .build_cartesian_2d(0f64..x_max, y_lo..y_hi)
        .map_err(draw_err)?;
    chart
        .configure_mesh()
        .y_desc("Temperature (°F)")
        .label_style(("sans-serif", 14))
        .light_line_style(BLACK.mix(0.08))
        .draw()
        .map_err(draw_err)?;

    let bt_style = BLUE.stroke_width(2);
    chart
        .draw_series(LineSeries::new(
            valid_points(times_min, &series.bt),
            bt_style,
        ))
        .map_err(draw_err)?
        .label("BT (Bean Temp)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], BLUE.stroke_width(2)));

    chart
        .draw_series(LineSeries::new(
            valid_points(times_min, &series.et),
            RED.stroke_width(2),
        ))
        .map_err(draw_err)?
        .label("ET (Env Temp)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], RED.stroke_width(2)));

    if series.exhaust.iter().any(|t| *t > 0.0) {
        chart
            .draw_series(LineSeries::new(
                times_min
                    .iter()
                    .zip(series.exhaust.iter())
                    .filter(|(_, t)| **t > 0.0)
                    .map(|(&x, &t)| (x, t)),
                MAGENTA.mix(0.6).stroke_width(1),
            ))
            .map_err(draw_err)?
            .label("Exhaust Temp")
            .legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 24, y)], MAGENTA.mix(0.6).stroke_width(1))
            });
    }

    // Phase spans along the top headroom
    let phases = profile.phases();
    let c = &profile.computed;
    let span_lo = t_max + 0.5 * bar_h;
    let span_hi = t_max + 1.5 * bar_h;
    let mut draw_span = |start_min: f64,
                         end_min: f64,
                         name: &str,
                         percent: Option<f64>,
                         color: RGBColor|
     -> Result<(), RenderError> {
        if end_min <= start_min {
            return Ok(());
        }
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(start_min, span_lo), (end_min.min(x_max), span_hi)],
                color.mix(0.3).filled(),
            )))
            .map_err(draw_err)?;
        let label = match percent {
            Some(p) => format!("{name} {p:.1}%"),
            None => name.to_string(),
        };
        chart
            .draw_series(std::iter::once(Text::new(
                label,
                ((start_min + end_min.min(x_max)) / 2.0, span_lo + 0.2 * bar_h),
                ("sans-serif", 14).into_font().color(&color),
            )))
            .map_err(draw_err)?;
        Ok(())
    };
    let dry_min = c.dry_time.map(|t| t / 60.0);
    let fcs_min = c.fcs_time.map(|t| t / 60.0);
    let drop_min = c.drop_time.map(|t| t / 60.0).unwrap_or(x_max);
    if let Some(dry) = dry_min {
        draw_span(
            0.0,
            dry,
            "Drying",
            phases.drying.map(|p| p.percent),
            RGBColor(255, 140, 0),
        )?;
        if let Some(fcs) = fcs_min {
            draw_span(
                dry,
                fcs,
                "Maillard",
                phases.maillard.map(|p| p.percent),
                RGBColor(139, 69, 19),
            )?;
            draw_span(
                fcs,
                drop_min,
                "Development",
                phases.development.map(|p| p.percent),
                RGBColor(0, 128, 0),
            )?;
        }
    }

    // Event guides with BT annotations
    for event in profile.events() {
        let x = event.time_secs / 60.0;
        if x > x_max {
            continue;
        }
        let color = event_color(event.kind);
        chart
            .draw_series(DashedLineSeries::new(
                [(x, y_lo), (x, t_max)].iter().copied(),
                6,
                4,
                color.mix(0.7).stroke_width(2),
            ))
            .map_err(draw_err)?;
        chart
            .draw_series(std::iter::once(Text::new(
                event.kind.label().to_string(),
                (x + x_max * 0.004, y_lo + 0.2 * bar_h),
                ("sans-serif", 14).into_font().color(&color),
            )))
            .map_err(draw_err)?;
        if let Some(bt) = event.bt {
            chart
                .draw_series(std::iter::once(Text::new(
                    format!("{bt:.1}°F"),
                    (x + x_max * 0.004, bt),
                    ("sans-serif", 13).into_font().color(&color),
                )))
                .map_err(draw_err)?;
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK.mix(0.3))
        .label_font(("sans-serif", 14))
        .draw()
        .map_err(draw_err)?;
    Ok(())
}

fn draw_ror_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    profile: &RoastProfile,
    series: &TemperatureSeries,
    bt_ror: &[f64],
    ror_peak: Option<RorPeak>,
    times_min: &[f64],
    x_max: f64,
) -> Result<(), RenderError> {
    let max_ror = bt_ror.iter().copied().fold(0.0_f64, f64::max);
    let y_hi = if max_ror > 0.0 { max_ror * 1.1 } else { 10.0 };

    let mut chart = ChartBuilder::on(area)
        .margin(12)
        .x_label_area_size(34)
        .y_label_area_size(60)
        .caption("Rate of Rise", ("sans-serif", 22))
        .build_cartesian_2d(0f64..x_max, 0f64..y_hi)
        .map_err(draw_err)?;
    chart
        .configure_mesh()
        .x_desc("Time (minutes)")
        .y_desc("Rate of Rise (°F/min)")
        .label_style(("sans-serif", 14))
        .light_line_style(BLACK.mix(0.08))
        .draw()
        .map_err(draw_err)?;

    let ror_color = RGBColor(0, 128, 0);
    chart
        .draw_series(LineSeries::new(
            times_min.iter().copied().zip(bt_ror.iter().copied()),
            ror_color.stroke_width(2),
        ))
        .map_err(draw_err)?
        .label("BT RoR")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], ror_color.stroke_width(2)));

    if let Some(peak) = ror_peak {
        let x = peak.time_secs / 60.0;
        chart
            .draw_series(std::iter::once(Circle::new((x, peak.value), 5, RED.filled())))
            .map_err(draw_err)?;
        chart
            .draw_series(std::iter::once(Text::new(
                format!("Peak: {:.1}°F/min", peak.value),
                (x + x_max * 0.008, (peak.value * 1.02).min(y_hi * 0.97)),
                ("sans-serif", 14).into_font().color(&RED),
            )))
            .map_err(draw_err)?;
    }

    // Event guides with the RoR value at each event
    for event in profile.events() {
        let x = event.time_secs / 60.0;
        if x > x_max || event.kind == EventKind::Charge {
            continue;
        }
        let color = event_color(event.kind);
        chart
            .draw_series(DashedLineSeries::new(
                [(x, 0.0), (x, y_hi)].iter().copied(),
                6,
                4,
                color.mix(0.7).stroke_width(2),
            ))
            .map_err(draw_err)?;
        let idx = closest_index(&series.times, event.time_secs);
        let value = bt_ror.get(idx).copied().unwrap_or(0.0);
        if value > 0.0 {
            chart
                .draw_series(std::iter::once(Text::new(
                    format!("{value:.1}°F/min"),
                    (x + x_max * 0.004, value),
                    ("sans-serif", 13).into_font().color(&color),
                )))
                .map_err(draw_err)?;
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK.mix(0.3))
        .label_font(("sans-serif", 14))
        .draw()
        .map_err(draw_err)?;
    Ok(())
}

/// Guide color for each named event, matching the conventional palette.
fn event_color(kind: EventKind) -> RGBColor {
    match kind {
        EventKind::Charge => RGBColor(139, 69, 19),
        EventKind::TurningPoint => RGBColor(128, 128, 128),
        EventKind::DryEnd => RGBColor(255, 140, 0),
        EventKind::FirstCrackStart => RGBColor(0, 128, 0),
        EventKind::FirstCrackEnd => RGBColor(128, 0, 128),
        EventKind::SecondCrackStart => RGBColor(178, 34, 34),
        EventKind::SecondCrackEnd => RGBColor(139, 0, 0),
        EventKind::Drop => RGBColor(255, 0, 0),
    }
}

/// Index of the sample closest in time to `t`.
fn closest_index(times: &[f64], t: f64) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, &sample) in times.iter().enumerate() {
        let dist = (sample - t).abs();
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best
}

fn valid_points<'a>(
    times_min: &'a [f64],
    temps: &'a [f64],
) -> impl Iterator<Item = (f64, f64)> + 'a {
    times_min
        .iter()
        .zip(temps.iter())
        .filter(|(_, t)| **t >= 0.0)
        .map(|(&x, &t)| (x, t))
}

/// Caption lines for the roast-details block: metadata, phase breakdown,
/// and a merged chronological timeline of events and gas changes.
pub fn roast_details(profile: &RoastProfile) -> Vec<String> {
    let mut lines = Vec::new();

    if !profile.beans.is_empty() {
        lines.push(format!("Beans: {}", profile.beans));
    }
    if !profile.roaster_type.is_empty() {
        lines.push(format!("Roaster: {}", profile.roaster_type));
    }
    if profile.weight_in > 0.0 {
        lines.push(format!(
            "Weight: {}{u} → {}{u}",
            profile.weight_in,
            profile.weight_out,
            u = profile.weight_unit
        ));
        if let Some(loss) = profile.weight_loss_percent() {
            lines.push(format!("Loss: {loss:.1}%"));
        }
    }
    if profile.computed.total_time > 0.0 {
        lines.push(format!(
            "Total Time: {:.1} min",
            profile.computed.total_time / 60.0
        ));
    }

    let phases = profile.phases();
    for (name, summary) in [
        ("Drying", phases.drying),
        ("Maillard", phases.maillard),
        ("Development", phases.development),
    ] {
        if let Some(p) = summary {
            lines.push(format!(
                "{name}: {:.0}s ({:.1}%)",
                p.duration_secs, p.percent
            ));
        }
    }

    let mut timeline: Vec<(f64, String)> = Vec::new();
    for event in profile.events() {
        let text = match (event.kind, event.bt, profile.charge_gas()) {
            (EventKind::Charge, Some(bt), Some(gas)) => {
                format!("CHARGE (Gas: {gas}mbar, BT: {bt:.1}°F)")
            }
            (EventKind::Charge, None, Some(gas)) => format!("CHARGE (Gas: {gas}mbar)"),
            (kind, Some(bt), _) => format!("{} (BT: {bt:.1}°F)", kind.label()),
            (kind, None, _) => kind.label().to_string(),
        };
        timeline.push((event.relative_secs, text));
    }
    for (secs, label) in profile.gas_changes() {
        timeline.push((secs, format!("Gas → {label}mbar")));
    }
    timeline.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    if !timeline.is_empty() {
        lines.push(String::new());
        lines.push("Timeline:".to_string());
        for (secs, text) in timeline {
            lines.push(format!("  {} - {}", format_mmss(secs), text));
        }
    }
    lines
}
