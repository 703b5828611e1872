//! CLI output formatting.
//!
//! # Project table
//!
//! ```text
//! Name   Path        Created           Last modified
//! blog   /home/me    2024-01-02 10:00  2024-01-03 09:12
//! ```
//!
//! Columns are padded to the widest cell. An empty registry prints
//! `no project created yet`.
//!
//! # Render progress
//!
//! ```text
//! about.html → output/about.html
//! ! missing.rest: template .../wide.html does not exist
//! 2 rendered, 1 unchanged, 1 failed (4 total)
//! ```
//!
//! Each concern has a `format_*` function (returns `Vec<String>` or
//! `String`) for testability and a `print_*` wrapper that writes to stdout.
//! Format functions are pure.

use crate::cache::RenderStats;
use crate::registry::ProjectRecord;
use chrono::{DateTime, Utc};
use std::path::Path;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";
const HEADERS: [&str; 4] = ["Name", "Path", "Created", "Last modified"];

fn format_timestamp(ts: Option<&DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
        None => "-".to_string(),
    }
}

/// Left-align every cell to its column width, two spaces between columns.
fn align(rows: &[[String; 4]]) -> Vec<String> {
    let mut widths = [0usize; 4];
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    rows.iter()
        .map(|row| {
            let cells: Vec<String> = row
                .iter()
                .zip(widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect();
            cells.join("  ").trim_end().to_string()
        })
        .collect()
}

pub fn format_project_table(records: &[ProjectRecord]) -> Vec<String> {
    if records.is_empty() {
        return vec!["no project created yet".to_string()];
    }
    let mut rows = vec![HEADERS.map(str::to_string)];
    rows.extend(records.iter().map(|record| {
        [
            record.name.clone(),
            record.path.display().to_string(),
            format_timestamp(record.created.as_ref()),
            format_timestamp(Some(&record.last_modified)),
        ]
    }));
    align(&rows)
}

pub fn print_project_table(records: &[ProjectRecord]) {
    for line in format_project_table(records) {
        println!("{}", line);
    }
}

/// One written page, shown relative to the project directory when possible.
pub fn format_render_line(output: &Path, project_dir: &Path) -> String {
    let shown = output.strip_prefix(project_dir).unwrap_or(output);
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{} → {}", name, shown.display())
}

pub fn format_render_failure(message: &str) -> String {
    format!("! {}", message)
}

pub fn format_render_summary(stats: &RenderStats) -> String {
    if stats.total() == 0 {
        "nothing to render".to_string()
    } else {
        stats.to_string()
    }
}

pub fn print_render_line(output: &Path, project_dir: &Path) {
    println!("{}", format_render_line(output, project_dir));
}

pub fn print_render_failure(message: &str) {
    println!("{}", format_render_failure(message));
}

pub fn print_render_summary(stats: &RenderStats) {
    println!("{}", format_render_summary(stats));
}
