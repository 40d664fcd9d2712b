//! Library entry points. Every front-end (CLI, tool server, embedders)
//! goes through these.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::cache::ReportCache;
use crate::config::{self, Overrides, Settings};
use crate::detect;
use crate::error::{CovrankError, Result};
use crate::model::{AnalysisResult, AnalyzedFile, FileTally, ImpactEstimate, Weights};
use crate::parsers::lcov;
use crate::score;

/// Analyze raw LCOV text with the given settings.
#[must_use]
pub fn analyze_text(text: &str, settings: &Settings) -> AnalysisResult {
    analyze_tallies(&lcov::parse(text), settings)
}

/// Analyze already-parsed tallies with the given settings.
#[must_use]
pub fn analyze_tallies(tallies: &[FileTally], settings: &Settings) -> AnalysisResult {
    score::analyze(tallies, &settings.weights, settings.min_lines, settings.top)
}

/// A project's parsed report together with the settings used to read it.
#[derive(Debug, Clone)]
pub struct LoadedProject {
    pub root: PathBuf,
    pub report_path: PathBuf,
    pub report_modified: Option<DateTime<Utc>>,
    pub config_source: Option<PathBuf>,
    pub settings: Settings,
    pub files: Arc<[FileTally]>,
}

impl LoadedProject {
    pub fn analyze(&self) -> AnalysisResult {
        analyze_tallies(&self.files, &self.settings)
    }
}

/// Resolve settings for `root`, locate and parse its report.
///
/// Fails when no report is found or it holds no complete records. When a
/// cache is supplied, unchanged reports are not re-parsed.
pub fn load_project(
    root: &Path,
    overrides: &Overrides,
    cache: Option<&mut ReportCache>,
) -> Result<LoadedProject> {
    let resolved = config::resolve(root, overrides)?;
    let report_path = detect::find_report(root, resolved.settings.coverage_file.as_deref())?;

    let (files, modified): (Arc<[FileTally]>, _) = match cache {
        Some(cache) => {
            let cached = cache.get_or_load(&report_path)?;
            (cached.files, Some(cached.modified))
        }
        None => {
            let text = detect::read_report(&report_path)?;
            let modified = std::fs::metadata(&report_path).and_then(|m| m.modified()).ok();
            (lcov::parse(&text).into(), modified)
        }
    };

    if files.is_empty() {
        return Err(CovrankError::EmptyReport(report_path));
    }

    info!(
        report = %report_path.display(),
        files = files.len(),
        "loaded coverage report"
    );

    Ok(LoadedProject {
        root: root.to_path_buf(),
        report_path,
        report_modified: modified.map(DateTime::<Utc>::from),
        config_source: resolved.source,
        settings: resolved.settings,
        files,
    })
}

/// One-call analysis of a project directory.
pub fn analyze_project(
    root: &Path,
    overrides: &Overrides,
    cache: Option<&mut ReportCache>,
) -> Result<AnalysisResult> {
    Ok(load_project(root, overrides, cache)?.analyze())
}

/// A single file's score and where it ranks among all files.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInspection {
    pub file: AnalyzedFile,
    /// 1-based position among every file in the report (no size filter).
    pub rank: usize,
    pub total_files: usize,
    pub raw: FileTally,
}

/// Look a file up by exact path, falling back to a unique suffix match.
///
/// A path listed more than once (one record per test name) is ambiguous.
pub fn inspect_file(tallies: &[FileTally], query: &str, weights: &Weights) -> Result<FileInspection> {
    let exact: Vec<usize> = matching_indices(tallies, |t| t.path == query);
    let index = match exact.as_slice() {
        [i] => *i,
        [] => match matching_indices(tallies, |t| score::path_matches(&t.path, query)).as_slice() {
            [i] => *i,
            [] => return Err(CovrankError::FileNotInReport(query.to_string())),
            many => {
                let paths: Vec<&str> = many.iter().map(|&i| tallies[i].path.as_str()).collect();
                return Err(CovrankError::Other(format!(
                    "'{query}' is ambiguous; matches: {}",
                    paths.join(", ")
                )));
            }
        },
        many => {
            return Err(CovrankError::Other(format!(
                "'{query}' is ambiguous; the report lists it {} times",
                many.len()
            )));
        }
    };

    let file = score::score_file(&tallies[index], weights);

    // Rank by index so duplicate paths cannot be confused. Same stable order
    // as `score::rank`.
    let scores: Vec<f64> = tallies
        .iter()
        .map(|t| score::score_file(t, weights).priority_score)
        .collect();
    let mut order: Vec<usize> = (0..tallies.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    let rank = order
        .iter()
        .position(|&i| i == index)
        .map_or(order.len(), |p| p + 1);

    Ok(FileInspection {
        file,
        rank,
        total_files: tallies.len(),
        raw: tallies[index].clone(),
    })
}

fn matching_indices(tallies: &[FileTally], pred: impl Fn(&FileTally) -> bool) -> Vec<usize> {
    tallies
        .iter()
        .enumerate()
        .filter(|(_, t)| pred(t))
        .map(|(i, _)| i)
        .collect()
}

/// Estimate overall coverage if the `targets` were fully covered.
#[must_use]
pub fn estimate_impact(tallies: &[FileTally], targets: &[String]) -> ImpactEstimate {
    score::estimate_impact(tallies, targets)
}
