/// Locating the LCOV report for a project.
///
/// Strategy:
///   1. An explicit path (CLI argument or `coverageFile` setting) wins
///   2. Otherwise probe the conventional locations in order; first hit wins
///   3. Content sniffing only warns; any text is handed to the parser
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{CovrankError, Result};

/// Conventional report locations, relative to the project root, in the
/// order they are probed.
pub const CANDIDATE_PATHS: &[&str] = &[
    "coverage/lcov.info",
    "coverage/lcov/lcov.info",
    "lcov.info",
    "coverage.lcov",
    ".coverage/lcov.info",
    "target/coverage/lcov.info",
    "target/llvm-cov/lcov.info",
    "build/coverage/lcov.info",
];

/// Resolve the report path: `explicit` (relative to `root` when not
/// absolute) or the first existing candidate.
pub fn find_report(root: &Path, explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        };
        if path.is_file() {
            return Ok(path);
        }
        return Err(CovrankError::ReportNotFound {
            root: root.to_path_buf(),
            searched: vec![path.display().to_string()],
        });
    }

    for candidate in CANDIDATE_PATHS {
        let path = root.join(candidate);
        if path.is_file() {
            debug!(path = %path.display(), "found coverage report");
            return Ok(path);
        }
    }

    Err(CovrankError::ReportNotFound {
        root: root.to_path_buf(),
        searched: CANDIDATE_PATHS.iter().map(|s| s.to_string()).collect(),
    })
}

/// Whether the head of `content` looks like LCOV: some line starts with
/// `SF:` once leading whitespace is dropped.
pub fn looks_like_lcov(content: &[u8]) -> bool {
    // We only need to look at the first few KB
    let head_len = content.len().min(4096);
    let head = String::from_utf8_lossy(&content[..head_len]);
    head.lines().any(|l| l.trim_start().starts_with("SF:"))
}

/// Read a report as text, warning when it does not look like LCOV.
pub fn read_report(path: &Path) -> Result<String> {
    let content = std::fs::read(path)?;
    if !looks_like_lcov(&content) {
        warn!(path = %path.display(), "file does not look like an LCOV report");
    }
    Ok(String::from_utf8_lossy(&content).into_owned())
}
