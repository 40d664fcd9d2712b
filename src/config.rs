//! Configuration resolution.
//!
//! Three layers, resolved field by field: explicit overrides (CLI flags,
//! API options, server arguments) win over the settings file, which wins
//! over the built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CovrankError, Result};
use crate::model::Weights;

/// Settings file looked up in the project root when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = ".covrank.yml";

pub const DEFAULT_MIN_LINES: i64 = 10;

const CONFIG_TEMPLATE: &str = "\
# covrank settings. Command-line flags override anything set here.

# Multipliers for branch, function and line coverage gaps (branches,functions,lines).
# They are not normalized and need not sum to 1.
weights: \"0.5,0.3,0.2\"

# Files with fewer instrumented lines than this are left out of the ranking.
minLines: 10

# Output format: table or json.
format: table

# Keep only the N highest-priority files (0 keeps all).
top: 0

# Path to the LCOV report, relative to the project root. Leave unset to search
# the usual locations (coverage/lcov.info, lcov.info, ...).
# coverageFile: coverage/lcov.info
";

/// Output format for ranked results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Weights as written in a settings file or request: `"0.5,0.3,0.2"` or a
/// three-element list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WeightsSpec {
    Text(String),
    List(Vec<f64>),
}

impl WeightsSpec {
    pub fn to_weights(&self) -> Result<Weights> {
        match self {
            WeightsSpec::Text(s) => parse_weights(s),
            WeightsSpec::List(values) => {
                let text = values
                    .iter()
                    .map(f64::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                weights_from_values(values).ok_or(CovrankError::InvalidWeights(text))
            }
        }
    }
}

fn weights_from_values(values: &[f64]) -> Option<Weights> {
    match values {
        [b, f, l] if values.iter().all(|v| v.is_finite() && *v >= 0.0) => Some(Weights {
            branches: *b,
            functions: *f,
            lines: *l,
        }),
        _ => None,
    }
}

/// Parse a `branches,functions,lines` triple.
pub fn parse_weights(s: &str) -> Result<Weights> {
    let values: Vec<f64> = s
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| CovrankError::InvalidWeights(s.to_string()))?;
    weights_from_values(&values).ok_or_else(|| CovrankError::InvalidWeights(s.to_string()))
}

/// Contents of a settings file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileConfig {
    pub weights: Option<WeightsSpec>,
    pub min_lines: Option<i64>,
    pub format: Option<OutputFormat>,
    pub top: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage_file: Option<PathBuf>,
}

impl FileConfig {
    pub fn from_yaml(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents).map_err(|e| {
            CovrankError::InvalidConfig(format!("{}: {e}", path.display()))
        })
    }
}

/// Call-time overrides. `None` defers to the settings file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub weights: Option<Weights>,
    pub min_lines: Option<i64>,
    pub format: Option<OutputFormat>,
    pub top: Option<usize>,
    pub coverage_file: Option<PathBuf>,
    /// Explicit settings file; must exist when given.
    pub config_path: Option<PathBuf>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub weights: Weights,
    pub min_lines: i64,
    pub format: OutputFormat,
    /// `None` keeps every file.
    pub top: Option<usize>,
    pub coverage_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            min_lines: DEFAULT_MIN_LINES,
            format: OutputFormat::Table,
            top: None,
            coverage_file: None,
        }
    }
}

/// Settings plus the file they were read from, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub settings: Settings,
    pub source: Option<PathBuf>,
}

/// Merge defaults, the settings file (if any) and `overrides`.
pub fn resolve(root: &Path, overrides: &Overrides) -> Result<ResolvedConfig> {
    let (file, source) = match &overrides.config_path {
        Some(path) => {
            let path = if path.is_absolute() {
                path.clone()
            } else {
                root.join(path)
            };
            if !path.is_file() {
                return Err(CovrankError::InvalidConfig(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            (FileConfig::load(&path)?, Some(path))
        }
        None => {
            let path = root.join(CONFIG_FILE_NAME);
            if path.is_file() {
                (FileConfig::load(&path)?, Some(path))
            } else {
                (FileConfig::default(), None)
            }
        }
    };

    if let Some(path) = &source {
        debug!(path = %path.display(), "loaded settings file");
    }

    let settings = merge(&file, overrides)?;
    Ok(ResolvedConfig { settings, source })
}

/// Layer a settings file and overrides over the defaults.
pub fn merge(file: &FileConfig, overrides: &Overrides) -> Result<Settings> {
    let defaults = Settings::default();

    let weights = match (overrides.weights, &file.weights) {
        (Some(w), _) => w,
        (None, Some(spec)) => spec.to_weights()?,
        (None, None) => defaults.weights,
    };

    Ok(Settings {
        weights,
        min_lines: overrides
            .min_lines
            .or(file.min_lines)
            .unwrap_or(defaults.min_lines),
        format: overrides.format.or(file.format).unwrap_or(defaults.format),
        top: overrides.top.or(file.top).filter(|&n| n > 0),
        coverage_file: overrides
            .coverage_file
            .clone()
            .or_else(|| file.coverage_file.clone()),
    })
}

/// Write the default settings file into `root`.
pub fn init_config(root: &Path, force: bool) -> Result<PathBuf> {
    let path = root.join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        return Err(CovrankError::ConfigExists(path));
    }
    std::fs::write(&path, CONFIG_TEMPLATE)?;
    Ok(path)
}

/// Render resolved settings as YAML, in the settings-file key layout.
pub fn to_yaml(settings: &Settings) -> Result<String> {
    let file = FileConfig {
        weights: Some(WeightsSpec::Text(settings.weights.to_string())),
        min_lines: Some(settings.min_lines),
        format: Some(settings.format),
        top: Some(settings.top.unwrap_or(0)),
        coverage_file: settings.coverage_file.clone(),
    };
    Ok(serde_yaml::to_string(&file)?)
}
