// JobSleuth - core/report.rs
//
// Plain-text report of an analysis: header, states table, users table,
// per-job detail and, for Mastercard, the special subsystems. Also renders
// the history summary with the same table layout.
// Core layer: renders to a String or any Write trait object.

use crate::core::history::HistorySummary;
use crate::core::model::{AnalysisResult, Brand, CountMap};
use crate::util::constants;
use crate::util::error::ReportError;
use chrono::NaiveDateTime;
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

/// Render the report for `result`. `generated_at` is printed as-is.
pub fn render_report(result: &AnalysisResult, generated_at: NaiveDateTime) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "AS400 OCR report - {}", result.brand.label());
    let _ = writeln!(out, "Date: {}", generated_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "Total jobs: {}", result.summary.total);

    out.push('\n');
    render_table(
        &mut out,
        "States",
        &["State", "Count"],
        &count_rows(&result.states_by_count),
    );

    out.push('\n');
    render_table(
        &mut out,
        "Users",
        &["User", "Job count"],
        &count_rows(&result.users_by_count),
    );

    out.push('\n');
    let detail: Vec<Vec<String>> = result
        .records
        .iter()
        .map(|r| {
            vec![
                r.job_name.clone(),
                r.user.clone(),
                r.state.clone(),
                r.function.clone(),
            ]
        })
        .collect();
    render_table(&mut out, "Detail", &["Job", "User", "State", "Function"], &detail);

    if let (Brand::Mastercard, Some(subsystems)) = (result.brand, &result.special_subsystems) {
        out.push('\n');
        let rows: Vec<Vec<String>> = subsystems
            .iter()
            .map(|(tag, status)| vec![tag.to_string(), status.to_string()])
            .collect();
        render_table(&mut out, "Special subsystems", &["Subsystem", "Status"], &rows);
    }

    out
}

/// Render the summary of stored analyses.
pub fn render_history(summary: &HistorySummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "AS400 OCR history");
    let _ = writeln!(out, "Analyses: {}", summary.total);

    out.push('\n');
    render_table(
        &mut out,
        "Brands",
        &["Brand", "Analyses"],
        &count_rows(&summary.by_brand),
    );
    out.push('\n');
    render_table(&mut out, "States", &["State", "Count"], &count_rows(&summary.states));
    out.push('\n');
    render_table(
        &mut out,
        "Users",
        &["User", "Job count"],
        &count_rows(&summary.users),
    );
    out
}

/// Render and write the report. Any failure aborts the report.
pub fn write_report<W: Write>(
    result: &AnalysisResult,
    mut writer: W,
    report_path: &Path,
    generated_at: NaiveDateTime,
) -> Result<(), ReportError> {
    let text = render_report(result, generated_at);
    writer
        .write_all(text.as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| ReportError::Io {
            path: report_path.to_path_buf(),
            source: e,
        })?;

    tracing::debug!(
        path = %report_path.display(),
        bytes = text.len(),
        "Report written"
    );
    Ok(())
}

/// Count table rows; an empty map yields a single placeholder row.
fn count_rows(counts: &CountMap) -> Vec<Vec<String>> {
    if counts.is_empty() {
        return vec![vec![constants::NO_DATA_LABEL.to_string(), "0".to_string()]];
    }
    counts
        .iter()
        .map(|(key, count)| vec![key.clone(), count.to_string()])
        .collect()
}

fn render_table(out: &mut String, title: &str, headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let _ = writeln!(out, "{title}");
    push_row(out, headers.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("-+-"));
    for row in rows {
        push_row(out, row.iter().map(String::as_str), &widths);
    }
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(out, "{}", padded.join(" | ").trim_end());
}
