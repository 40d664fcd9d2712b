//! Value types shared by the parser, the scorer and every front-end.
//! The parser produces `FileTally` records; the scorer turns them into an
//! `AnalysisResult`. Serialized field names are camelCase so the JSON
//! output mirrors the documented shape.

use serde::{Deserialize, Serialize};

/// Compute a coverage percentage, returning exactly 100.0 when nothing was
/// instrumented. No clamping: `hit > found` yields more than 100.
#[must_use]
pub fn percent(hit: i64, found: i64) -> f64 {
    if found > 0 {
        hit as f64 / found as f64 * 100.0
    } else {
        100.0
    }
}

/// Round to two decimal places, half away from zero.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Raw counters for one `SF:` ... `end_of_record` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTally {
    pub path: String,
    pub lines_found: i64,
    pub lines_hit: i64,
    pub functions_found: i64,
    pub functions_hit: i64,
    pub branches_found: i64,
    pub branches_hit: i64,
}

impl FileTally {
    pub fn new(path: String) -> Self {
        Self {
            path,
            ..Default::default()
        }
    }

    /// The same file with every instrumented unit marked as hit.
    #[must_use]
    pub fn fully_covered(&self) -> Self {
        Self {
            path: self.path.clone(),
            lines_found: self.lines_found,
            lines_hit: self.lines_found,
            functions_found: self.functions_found,
            functions_hit: self.functions_found,
            branches_found: self.branches_found,
            branches_hit: self.branches_found,
        }
    }
}

/// Raw multipliers applied to each category's coverage gap. Never
/// normalized, so they need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub branches: f64,
    pub functions: f64,
    pub lines: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            branches: 0.5,
            functions: 0.3,
            lines: 0.2,
        }
    }
}

impl std::fmt::Display for Weights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{}", self.branches, self.functions, self.lines)
    }
}

/// Found/hit pair plus the derived percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageMetric {
    pub found: i64,
    pub hit: i64,
    pub coverage_percent: f64,
}

impl CoverageMetric {
    /// Build a metric, rounding the percentage to two decimals.
    #[must_use]
    pub fn new(found: i64, hit: i64) -> Self {
        Self {
            found,
            hit,
            coverage_percent: round2(percent(hit, found)),
        }
    }
}

/// One ranked file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedFile {
    pub path: String,
    pub lines: CoverageMetric,
    pub functions: CoverageMetric,
    pub branches: CoverageMetric,
    pub priority_score: f64,
    pub uncovered_lines: i64,
    pub uncovered_branches: i64,
}

/// Totals across every parsed file, before any size filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallSummary {
    pub lines: CoverageMetric,
    pub functions: CoverageMetric,
    pub branches: CoverageMetric,
    pub file_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub overall: OverallSummary,
    pub files: Vec<AnalyzedFile>,
}

/// Percentage-point change in overall coverage per category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageDelta {
    pub lines: f64,
    pub functions: f64,
    pub branches: f64,
}

/// What the overall summary would look like if `covered` were fully tested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactEstimate {
    pub before: OverallSummary,
    pub after: OverallSummary,
    pub delta: CoverageDelta,
    /// Report paths that matched a target, in report order.
    pub covered: Vec<String>,
    /// Targets that matched nothing in the report.
    pub unmatched: Vec<String>,
    pub lines_gained: i64,
    pub branches_gained: i64,
    pub functions_gained: i64,
}
