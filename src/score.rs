//! Priority scoring: turns parsed tallies into a ranked list.
//!
//! A file's score is its weighted coverage gaps scaled by `log10` of its
//! size, so large, poorly tested files float to the top. Scores and
//! percentages are rounded to two decimals before ranking; ties keep report
//! order (the sort is stable).

use std::collections::HashSet;

use tracing::debug;

use crate::model::{
    percent, round2, AnalysisResult, AnalyzedFile, CoverageDelta, CoverageMetric, FileTally,
    ImpactEstimate, OverallSummary, Weights,
};

/// `log10(max(lines_found, 1) + 1)`: at least `log10(2)`, unbounded above.
#[must_use]
pub fn size_factor(lines_found: i64) -> f64 {
    (lines_found.max(1) as f64 + 1.0).log10()
}

/// Score a single file.
#[must_use]
pub fn score_file(tally: &FileTally, weights: &Weights) -> AnalyzedFile {
    let line_gap = 100.0 - percent(tally.lines_hit, tally.lines_found);
    let function_gap = 100.0 - percent(tally.functions_hit, tally.functions_found);
    let branch_gap = 100.0 - percent(tally.branches_hit, tally.branches_found);

    let raw = (branch_gap * weights.branches
        + function_gap * weights.functions
        + line_gap * weights.lines)
        * size_factor(tally.lines_found);

    AnalyzedFile {
        path: tally.path.clone(),
        lines: CoverageMetric::new(tally.lines_found, tally.lines_hit),
        functions: CoverageMetric::new(tally.functions_found, tally.functions_hit),
        branches: CoverageMetric::new(tally.branches_found, tally.branches_hit),
        priority_score: round2(raw),
        uncovered_lines: tally.lines_found.saturating_sub(tally.lines_hit),
        uncovered_branches: tally.branches_found.saturating_sub(tally.branches_hit),
    }
}

/// Sum every tally into one summary. No filtering.
#[must_use]
pub fn aggregate(tallies: &[FileTally]) -> OverallSummary {
    let mut lines = (0i64, 0i64);
    let mut functions = (0i64, 0i64);
    let mut branches = (0i64, 0i64);

    for t in tallies {
        lines.0 = lines.0.saturating_add(t.lines_found);
        lines.1 = lines.1.saturating_add(t.lines_hit);
        functions.0 = functions.0.saturating_add(t.functions_found);
        functions.1 = functions.1.saturating_add(t.functions_hit);
        branches.0 = branches.0.saturating_add(t.branches_found);
        branches.1 = branches.1.saturating_add(t.branches_hit);
    }

    OverallSummary {
        lines: CoverageMetric::new(lines.0, lines.1),
        functions: CoverageMetric::new(functions.0, functions.1),
        branches: CoverageMetric::new(branches.0, branches.1),
        file_count: tallies.len(),
    }
}

/// Score every file with all files ranked, highest priority first.
#[must_use]
pub fn rank(tallies: &[FileTally], weights: &Weights) -> Vec<AnalyzedFile> {
    let mut files: Vec<AnalyzedFile> = tallies.iter().map(|t| score_file(t, weights)).collect();
    files.sort_by(|a, b| b.priority_score.total_cmp(&a.priority_score));
    files
}

/// Full pipeline: aggregate (unfiltered), filter by `min_lines`, score,
/// sort, truncate to `top`. `top` of `None` or `Some(0)` keeps everything.
#[must_use]
pub fn analyze(
    tallies: &[FileTally],
    weights: &Weights,
    min_lines: i64,
    top: Option<usize>,
) -> AnalysisResult {
    let overall = aggregate(tallies);

    let eligible: Vec<FileTally> = tallies
        .iter()
        .filter(|t| t.lines_found >= min_lines)
        .cloned()
        .collect();
    let mut files = rank(&eligible, weights);

    if let Some(limit) = top.filter(|&n| n > 0) {
        files.truncate(limit);
    }

    debug!(
        parsed = tallies.len(),
        eligible = eligible.len(),
        returned = files.len(),
        min_lines,
        "analyzed coverage"
    );

    AnalysisResult { overall, files }
}

/// Whether a report path refers to `target`: exact match, or `target` is a
/// trailing run of whole path components (either separator).
#[must_use]
pub fn path_matches(path: &str, target: &str) -> bool {
    if target.is_empty() {
        return false;
    }
    if path == target {
        return true;
    }
    let target = target.trim_start_matches("./");
    match path.strip_suffix(target) {
        Some(prefix) => prefix.is_empty() || prefix.ends_with('/') || prefix.ends_with('\\'),
        None => false,
    }
}

/// Overall coverage before and after pretending every file matching one of
/// `targets` were fully covered.
#[must_use]
pub fn estimate_impact(tallies: &[FileTally], targets: &[String]) -> ImpactEstimate {
    let mut matched_targets: HashSet<&str> = HashSet::new();
    let mut covered = Vec::new();

    let projected: Vec<FileTally> = tallies
        .iter()
        .map(|t| {
            let hits: Vec<&String> = targets.iter().filter(|g| path_matches(&t.path, g)).collect();
            if hits.is_empty() {
                t.clone()
            } else {
                matched_targets.extend(hits.into_iter().map(String::as_str));
                covered.push(t.path.clone());
                t.fully_covered()
            }
        })
        .collect();

    let unmatched = targets
        .iter()
        .filter(|g| !matched_targets.contains(g.as_str()))
        .cloned()
        .collect();

    let before = aggregate(tallies);
    let after = aggregate(&projected);
    let delta = CoverageDelta {
        lines: round2(after.lines.coverage_percent - before.lines.coverage_percent),
        functions: round2(after.functions.coverage_percent - before.functions.coverage_percent),
        branches: round2(after.branches.coverage_percent - before.branches.coverage_percent),
    };

    ImpactEstimate {
        lines_gained: after.lines.hit.saturating_sub(before.lines.hit),
        functions_gained: after.functions.hit.saturating_sub(before.functions.hit),
        branches_gained: after.branches.hit.saturating_sub(before.branches.hit),
        before,
        after,
        delta,
        covered,
        unmatched,
    }
}
