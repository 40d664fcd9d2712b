//! Tool handlers. Each one resolves its project from the request's
//! `project_dir` and returns a JSON value.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api;
use crate::cache::ReportCache;
use crate::config::{Overrides, WeightsSpec};

/// State shared across tool calls
pub struct HandlerState {
    pub cache: ReportCache,
}

impl HandlerState {
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            cache: ReportCache::new(cache_capacity),
        }
    }

    fn load(&mut self, project_dir: &str, overrides: &Overrides) -> Result<api::LoadedProject> {
        let root = PathBuf::from(project_dir);
        if !root.is_dir() {
            anyhow::bail!("project_dir is not a directory: {project_dir}");
        }
        Ok(api::load_project(&root, overrides, Some(&mut self.cache))?)
    }
}

fn parse_args<T: DeserializeOwned>(args: &Value) -> Result<T> {
    serde_json::from_value(args.clone()).context("Invalid tool arguments")
}

#[derive(Debug, Deserialize)]
struct ProjectArgs {
    project_dir: String,
}

#[derive(Debug, Deserialize)]
struct RankArgs {
    project_dir: String,
    weights: Option<WeightsSpec>,
    min_lines: Option<i64>,
    top: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct FileArgs {
    project_dir: String,
    file: String,
}

#[derive(Debug, Deserialize)]
struct ImpactArgs {
    project_dir: String,
    files: Vec<String>,
}

pub fn handle_rank_files(state: &mut HandlerState, args: &Value) -> Result<Value> {
    let args: RankArgs = parse_args(args)?;
    let overrides = Overrides {
        weights: args.weights.as_ref().map(WeightsSpec::to_weights).transpose()?,
        min_lines: args.min_lines,
        top: args.top,
        ..Default::default()
    };
    let project = state.load(&args.project_dir, &overrides)?;
    let result = project.analyze();
    Ok(json!({
        "reportPath": project.report_path,
        "weights": project.settings.weights,
        "minLines": project.settings.min_lines,
        "overall": result.overall,
        "files": result.files,
    }))
}

pub fn handle_project_summary(state: &mut HandlerState, args: &Value) -> Result<Value> {
    let args: ProjectArgs = parse_args(args)?;
    let project = state.load(&args.project_dir, &Overrides::default())?;
    let overall = crate::score::aggregate(&project.files);
    Ok(json!({
        "reportPath": project.report_path,
        "reportModified": project.report_modified.map(|t| t.to_rfc3339()),
        "configFile": project.config_source,
        "overall": overall,
    }))
}

pub fn handle_file_details(state: &mut HandlerState, args: &Value) -> Result<Value> {
    let args: FileArgs = parse_args(args)?;
    let project = state.load(&args.project_dir, &Overrides::default())?;
    let inspection = api::inspect_file(&project.files, &args.file, &project.settings.weights)?;
    Ok(serde_json::to_value(inspection)?)
}

pub fn handle_estimate_impact(state: &mut HandlerState, args: &Value) -> Result<Value> {
    let args: ImpactArgs = parse_args(args)?;
    if args.files.is_empty() {
        anyhow::bail!("files must list at least one path");
    }
    let project = state.load(&args.project_dir, &Overrides::default())?;
    let estimate = api::estimate_impact(&project.files, &args.files);
    Ok(serde_json::to_value(estimate)?)
}
