//! Command handler functions for the covrank CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use std::fmt::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::api;
use crate::config::{self, OutputFormat, Overrides};
use crate::report::{JsonFormatter, RankedReport, ReportFormatter, TableFormatter};

/// Rank the project's files and render them in the configured format.
pub fn cmd_analyze(root: &Path, overrides: &Overrides) -> Result<String> {
    let project = api::load_project(root, overrides, None)?;
    let result = project.analyze();

    let formatter: &dyn ReportFormatter = match project.settings.format {
        OutputFormat::Json => &JsonFormatter,
        OutputFormat::Table => &TableFormatter,
    };
    let report = RankedReport {
        result: &result,
        min_lines: project.settings.min_lines,
    };
    Ok(report.format(formatter)?)
}

pub fn cmd_init_config(root: &Path, force: bool) -> Result<String> {
    let path = config::init_config(root, force)?;
    Ok(format!("Wrote default settings to {}\n", path.display()))
}

/// Print the resolved settings and where they came from.
pub fn cmd_show_config(root: &Path, overrides: &Overrides) -> Result<String> {
    let resolved = config::resolve(root, overrides)
        .with_context(|| format!("Failed to resolve settings for {}", root.display()))?;

    let mut out = String::new();
    match &resolved.source {
        Some(path) => writeln!(out, "# Settings file: {}", path.display())?,
        None => writeln!(out, "# Settings file: none (built-in defaults)")?,
    }
    out.push_str(&config::to_yaml(&resolved.settings)?);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const REPORT: &str = "\
TN:
SF:src/engine.ts
LF:300
LH:90
FNF:20
FNH:10
BRF:60
BRH:12
end_of_record
SF:src/helpers.ts
LF:40
LH:39
FNF:5
FNH:5
end_of_record
SF:src/tiny.ts
LF:3
LH:0
end_of_record
";

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lcov.info"), REPORT).unwrap();
        dir
    }

    #[test]
    fn test_cmd_analyze_table() {
        colored::control::set_override(false);
        let dir = project();
        let out = cmd_analyze(dir.path(), &Overrides::default()).unwrap();

        assert!(out.contains("Files:      3"));
        assert!(out.contains("src/engine.ts"));
        assert!(out.contains("src/helpers.ts"));
        // Below the default minimum of 10 lines.
        assert!(!out.contains("src/tiny.ts"));
        assert!(out.find("src/engine.ts").unwrap() < out.find("src/helpers.ts").unwrap());
    }

    #[test]
    fn test_cmd_analyze_json() {
        let dir = project();
        let overrides = Overrides {
            format: Some(OutputFormat::Json),
            min_lines: Some(0),
            top: Some(2),
            ..Default::default()
        };
        let out = cmd_analyze(dir.path(), &overrides).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["overall"]["fileCount"], 3);
        assert_eq!(value["files"].as_array().unwrap().len(), 2);
        assert_eq!(value["files"][0]["path"], "src/engine.ts");
    }

    #[test]
    fn test_cmd_analyze_settings_file() {
        let dir = project();
        std::fs::write(dir.path().join(".covrank.yml"), "format: json\nminLines: 1000\n").unwrap();
        let out = cmd_analyze(dir.path(), &Overrides::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["overall"]["fileCount"], 3);
        assert!(value["files"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_cmd_analyze_missing_report() {
        let dir = tempfile::tempdir().unwrap();
        let err = cmd_analyze(dir.path(), &Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("No coverage report found"));
    }

    #[test]
    fn test_cmd_analyze_explicit_report() {
        let dir = project();
        std::fs::write(dir.path().join("other.info"), "SF:x.ts\nLF:50\nLH:0\nend_of_record\n").unwrap();
        let overrides = Overrides {
            coverage_file: Some(PathBuf::from("other.info")),
            format: Some(OutputFormat::Json),
            ..Default::default()
        };
        let out = cmd_analyze(dir.path(), &overrides).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["files"][0]["path"], "x.ts");
    }

    #[test]
    fn test_cmd_init_and_show_config() {
        let dir = tempfile::tempdir().unwrap();
        let out = cmd_show_config(dir.path(), &Overrides::default()).unwrap();
        assert!(out.contains("built-in defaults"));
        assert!(out.contains("minLines: 10"));

        let out = cmd_init_config(dir.path(), false).unwrap();
        assert!(out.contains(".covrank.yml"));
        assert!(cmd_init_config(dir.path(), false).is_err());

        let overrides = Overrides {
            top: Some(7),
            ..Default::default()
        };
        let out = cmd_show_config(dir.path(), &overrides).unwrap();
        assert!(out.contains("# Settings file:"));
        assert!(out.contains(".covrank.yml"));
        assert!(out.contains("top: 7"));
    }
}
