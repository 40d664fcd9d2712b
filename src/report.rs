//! Output formatting for ranked coverage results.

use std::fmt::Write;

use colored::{ColoredString, Colorize};

use crate::error::Result;
use crate::model::{AnalysisResult, AnalyzedFile, CoverageMetric};

/// Number of files listed under "Recommendations".
pub const RECOMMENDATION_COUNT: usize = 5;

const BRANCH_THRESHOLD: f64 = 50.0;
const FUNCTION_THRESHOLD: f64 = 70.0;
const LINE_THRESHOLD: f64 = 60.0;

/// A formatted result plus the `minLines` it was produced with, which the
/// table view mentions when nothing survived the filter.
pub struct RankedReport<'a> {
    pub result: &'a AnalysisResult,
    pub min_lines: i64,
}

impl RankedReport<'_> {
    /// Format using a specific formatter.
    pub fn format(&self, formatter: &dyn ReportFormatter) -> Result<String> {
        formatter.format(self)
    }
}

/// Trait for formatting ranked reports.
pub trait ReportFormatter {
    /// Format the report to a string.
    fn format(&self, report: &RankedReport<'_>) -> Result<String>;
}

/// Pretty-printed JSON mirroring the model's field names.
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &RankedReport<'_>) -> Result<String> {
        let mut out = serde_json::to_string_pretty(report.result)?;
        out.push('\n');
        Ok(out)
    }
}

/// Human-readable table with colored percentages and recommendations.
pub struct TableFormatter;

impl ReportFormatter for TableFormatter {
    fn format(&self, report: &RankedReport<'_>) -> Result<String> {
        let mut out = String::new();
        let overall = &report.result.overall;

        writeln!(out, "{}", "Coverage summary".bold())?;
        writeln!(out, "  Files:      {}", overall.file_count)?;
        write_metric(&mut out, "Lines:", &overall.lines)?;
        write_metric(&mut out, "Functions:", &overall.functions)?;
        write_metric(&mut out, "Branches:", &overall.branches)?;
        out.push('\n');

        let files = &report.result.files;
        if files.is_empty() {
            writeln!(out, "No files matched (minLines = {}).", report.min_lines)?;
            return Ok(out);
        }

        writeln!(out, "{}", "Files by testing priority".bold())?;
        writeln!(
            out,
            "{:>4}  {:<50} {:>8} {:>8} {:>8} {:>9}",
            "#", "FILE", "LINES", "FUNCS", "BRANCH", "SCORE"
        )?;
        writeln!(out, "{}", "-".repeat(92))?;
        for (i, f) in files.iter().enumerate() {
            writeln!(
                out,
                "{:>4}  {:<50} {} {} {} {:>9.2}",
                i + 1,
                truncate_path(&f.path, 50),
                pct_cell(f.lines.coverage_percent),
                pct_cell(f.functions.coverage_percent),
                pct_cell(f.branches.coverage_percent),
                f.priority_score
            )?;
        }

        out.push('\n');
        writeln!(out, "{}", "Recommendations".bold())?;
        for (i, f) in files.iter().take(RECOMMENDATION_COUNT).enumerate() {
            writeln!(out, "  {}. {}", i + 1, f.path)?;
            writeln!(out, "     {}", recommendation_reason(f))?;
        }

        Ok(out)
    }
}

fn write_metric(out: &mut String, label: &str, metric: &CoverageMetric) -> std::fmt::Result {
    let found = metric.found;
    let hit = metric.hit;
    let pct = colorize(metric.coverage_percent, format!("{:.2}%", metric.coverage_percent));
    writeln!(out, "  {label:<11} {pct} ({hit}/{found})")
}

/// Green at 90% and above, yellow at 80% and above, red below.
pub fn colorize(percent: f64, text: String) -> ColoredString {
    if percent >= 90.0 {
        text.green()
    } else if percent >= 80.0 {
        text.yellow()
    } else {
        text.red()
    }
}

// Padding is applied before coloring so escape codes do not skew alignment.
fn pct_cell(percent: f64) -> ColoredString {
    colorize(percent, format!("{:>7.1}%", percent))
}

fn truncate_path(path: &str, width: usize) -> String {
    let count = path.chars().count();
    if count <= width {
        return path.to_string();
    }
    let tail: String = path.chars().skip(count - (width - 3)).collect();
    format!("...{tail}")
}

/// Why a file deserves attention. Each threshold is checked independently.
pub fn recommendation_reason(file: &AnalyzedFile) -> String {
    let mut reasons = Vec::new();
    if file.branches.coverage_percent < BRANCH_THRESHOLD {
        reasons.push(format!(
            "branch coverage is {:.1}% (below {BRANCH_THRESHOLD}%)",
            file.branches.coverage_percent
        ));
    }
    if file.functions.coverage_percent < FUNCTION_THRESHOLD {
        reasons.push(format!(
            "function coverage is {:.1}% (below {FUNCTION_THRESHOLD}%)",
            file.functions.coverage_percent
        ));
    }
    if file.lines.coverage_percent < LINE_THRESHOLD {
        reasons.push(format!(
            "line coverage is {:.1}% (below {LINE_THRESHOLD}%)",
            file.lines.coverage_percent
        ));
    }

    if reasons.is_empty() {
        format!(
            "{} uncovered lines, {} uncovered branches",
            file.uncovered_lines, file.uncovered_branches
        )
    } else {
        reasons.join("; ")
    }
}
