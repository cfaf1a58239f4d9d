//! Markdown roast-log table maintenance
//!
//! The roast log is an append-only markdown artifact: one row per roast,
//! newest first, with an embedded profile image. Updating re-reads the
//! existing table so rows written by earlier runs (or by hand) survive,
//! and a batch number that already has a row is left alone.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use log::info;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::alog::RoastProfile;

/// Table column header, also used to detect the table inside the file.
const TABLE_HEADER: &str = "| Roast | Date | Time | Dev % | Profile |";
const TABLE_SEPARATOR: &str = "|-------|------|------|-------|----------|";

/// Percent-encoding matching `urllib.parse.quote` with `/` kept safe.
const IMAGE_PATH_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Errors that can occur while updating the roast log.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The data one roast contributes to the table.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Roast name, e.g. `#28`.
    pub roast_name: String,
    pub batch_number: i64,
    /// Human-readable date column text.
    pub roast_date: String,
    /// ISO `YYYY-MM-DD` date used for ordering; may be empty.
    pub roast_iso_date: String,
    pub total_time_min: f64,
    pub development_pct: f64,
}

impl LogEntry {
    /// Extract the log-table fields from a parsed profile.
    pub fn from_profile(profile: &RoastProfile) -> LogEntry {
        let total_time = profile.computed.total_time;
        LogEntry {
            roast_name: profile.batch_name(),
            batch_number: profile.batch_number,
            roast_date: profile.roast_date.clone(),
            roast_iso_date: profile.roast_iso_date.clone(),
            total_time_min: if total_time > 0.0 {
                total_time / 60.0
            } else {
                0.0
            },
            development_pct: profile.development_percent().unwrap_or(0.0),
        }
    }

    fn to_row(&self, image_url: &str) -> String {
        format!(
            "| {} | {} | {:.1} min | {:.1}% | ![Profile]({}) |\n",
            self.roast_name,
            self.roast_date,
            self.total_time_min,
            self.development_pct,
            image_url
        )
    }
}

/// A row recovered from an existing table, kept verbatim for rewriting.
#[derive(Debug, Clone)]
struct TableRow {
    batch_number: i64,
    iso_date: String,
    line: String,
}

/// Build the image URL for a table row.
///
/// With a repo URL the image path is appended percent-encoded (raw GitHub
/// content URLs need encoded spaces); without one the encoded relative
/// path is used directly.
pub fn image_url(image_path: &str, repo_url: Option<&str>) -> String {
    let encoded = utf8_percent_encode(image_path, IMAGE_PATH_SET).to_string();
    match repo_url {
        Some(base) => format!("{}/{}", base.trim_end_matches('/'), encoded),
        None => encoded,
    }
}

/// Insert `entry` into the log at `log_path`, creating the file when
/// missing. Returns `false` (without touching the file) when the batch
/// number already has a row.
pub fn update<P: AsRef<Path>>(
    log_path: P,
    entry: &LogEntry,
    image_path: &str,
    repo_url: Option<&str>,
) -> Result<bool, TableError> {
    let log_path = log_path.as_ref();

    let mut header_lines: Vec<String> = Vec::new();
    let mut rows: Vec<TableRow> = Vec::new();

    if log_path.exists() {
        let content = fs::read_to_string(log_path)?;
        let mut in_table = false;
        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with("| Roast") {
                in_table = true;
            } else if trimmed.starts_with("|---") {
                // separator
            } else if in_table && trimmed.starts_with('|') {
                if let Some(row) = parse_row(line) {
                    rows.push(row);
                }
            } else if !in_table {
                header_lines.push(line.to_string());
            }
        }
    } else {
        header_lines = vec![
            "# Roast Log".to_string(),
            String::new(),
            "A chronological log of all coffee roasts.".to_string(),
            String::new(),
        ];
    }

    if rows.iter().any(|r| r.batch_number == entry.batch_number) {
        info!(
            "roast {} already in {}, skipping",
            entry.roast_name,
            log_path.display()
        );
        return Ok(false);
    }

    let url = image_url(image_path, repo_url);
    rows.push(TableRow {
        batch_number: entry.batch_number,
        iso_date: entry.roast_iso_date.clone(),
        line: entry.to_row(&url),
    });

    // Newest first: by ISO date, batch number as tiebreaker. Rows with an
    // unparseable date sink to the bottom.
    rows.sort_by_key(|row| {
        std::cmp::Reverse((
            NaiveDate::parse_from_str(&row.iso_date, "%Y-%m-%d")
                .unwrap_or(NaiveDate::MIN),
            row.batch_number,
        ))
    });

    let mut out = String::new();
    for line in &header_lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(TABLE_HEADER);
    out.push('\n');
    out.push_str(TABLE_SEPARATOR);
    out.push('\n');
    for row in &rows {
        out.push_str(row.line.trim_end());
        out.push('\n');
    }
    fs::write(log_path, out)?;

    info!("added {} to {}", entry.roast_name, log_path.display());
    Ok(true)
}

/// Parse an existing markdown table row. Returns `None` for headers,
/// separators, and rows without a recognizable batch number.
fn parse_row(line: &str) -> Option<TableRow> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with("|---") || trimmed.starts_with("| Roast") {
        return None;
    }

    let cells: Vec<&str> = trimmed
        .trim_matches('|')
        .split('|')
        .map(str::trim)
        .collect();
    if cells.len() < 5 {
        return None;
    }

    // Batch number: digits after any prefix (e.g. "#28" -> 28)
    let digits: String = cells[0]
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let batch_number: i64 = digits.parse().ok()?;

    // ISO date: first YYYY-MM-DD token in the date cell
    let iso_date = cells[1]
        .split_whitespace()
        .find(|token| token.len() == 10 && NaiveDate::parse_from_str(token, "%Y-%m-%d").is_ok())
        .unwrap_or("")
        .to_string();

    Some(TableRow {
        batch_number,
        iso_date,
        line: format!("{}\n", trimmed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry(batch: i64, iso: &str) -> LogEntry {
        LogEntry {
            roast_name: format!("#{batch}"),
            batch_number: batch,
            roast_date: format!("{iso} 10:00"),
            roast_iso_date: iso.to_string(),
            total_time_min: 9.5,
            development_pct: 18.2,
        }
    }

    #[test]
    fn test_creates_file_with_header() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("roasts.md");
        let added = update(&log, &entry(28, "2025-03-01"), "renders/28.png", None).unwrap();
        assert!(added);

        let content = fs::read_to_string(&log).unwrap();
        assert!(content.starts_with("# Roast Log"));
        assert!(content.contains(TABLE_HEADER));
        assert!(content.contains("| #28 | 2025-03-01 10:00 | 9.5 min | 18.2% |"));
        assert!(content.contains("![Profile](renders/28.png)"));
    }

    #[test]
    fn test_duplicate_batch_skipped() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("roasts.md");
        assert!(update(&log, &entry(28, "2025-03-01"), "a.png", None).unwrap());
        let before = fs::read_to_string(&log).unwrap();
        assert!(!update(&log, &entry(28, "2025-03-08"), "b.png", None).unwrap());
        assert_eq!(fs::read_to_string(&log).unwrap(), before);
    }

    #[test]
    fn test_rows_sorted_newest_first() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("roasts.md");
        update(&log, &entry(26, "2025-02-15"), "26.png", None).unwrap();
        update(&log, &entry(28, "2025-03-01"), "28.png", None).unwrap();
        update(&log, &entry(27, "2025-02-22"), "27.png", None).unwrap();

        let content = fs::read_to_string(&log).unwrap();
        let pos28 = content.find("| #28 |").unwrap();
        let pos27 = content.find("| #27 |").unwrap();
        let pos26 = content.find("| #26 |").unwrap();
        assert!(pos28 < pos27 && pos27 < pos26);
    }

    #[test]
    fn test_same_date_breaks_tie_by_batch() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("roasts.md");
        update(&log, &entry(30, "2025-03-01"), "30.png", None).unwrap();
        update(&log, &entry(31, "2025-03-01"), "31.png", None).unwrap();
        let content = fs::read_to_string(&log).unwrap();
        assert!(content.find("| #31 |").unwrap() < content.find("| #30 |").unwrap());
    }

    #[test]
    fn test_preserves_existing_header_prose() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("roasts.md");
        fs::write(
            &log,
            "# My Roasts\n\nHand-written intro.\n\n| Roast | Date | Time | Dev % | Profile |\n|-------|------|------|-------|----------|\n| #5 | 2024-12-01 | 8.0 min | 15.0% | ![Profile](5.png) |\n",
        )
        .unwrap();
        update(&log, &entry(6, "2025-01-01"), "6.png", None).unwrap();
        let content = fs::read_to_string(&log).unwrap();
        assert!(content.starts_with("# My Roasts"));
        assert!(content.contains("Hand-written intro."));
        assert!(content.contains("| #5 |"));
        assert!(content.find("| #6 |").unwrap() < content.find("| #5 |").unwrap());
    }

    #[test]
    fn test_image_url_encoding() {
        assert_eq!(
            image_url("renders/batch 28.png", None),
            "renders/batch%2028.png"
        );
        assert_eq!(
            image_url(
                "renders/28.png",
                Some("https://raw.githubusercontent.com/u/r/refs/heads/main/")
            ),
            "https://raw.githubusercontent.com/u/r/refs/heads/main/renders/28.png"
        );
    }

    #[test]
    fn test_parse_row_tolerates_garbage() {
        assert!(parse_row("| Roast | Date | Time | Dev % | Profile |").is_none());
        assert!(parse_row("|-------|------|------|-------|----------|").is_none());
        assert!(parse_row("not a table line").is_none());
        assert!(parse_row("| no-number | x | y | z | w |").is_none());
        let row = parse_row("| #12 | roasted 2025-01-05 morning | 9.0 min | 17.0% | ![Profile](12.png) |")
            .unwrap();
        assert_eq!(row.batch_number, 12);
        assert_eq!(row.iso_date, "2025-01-05");
    }
}
