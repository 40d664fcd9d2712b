#![allow(dead_code)]

use std::path::Path;
use tempfile::TempDir;

/// A report with three files of very different priority.
pub const SAMPLE_LCOV: &str = "\
TN:unit
SF:src/engine.ts
FN:1,run
FNDA:4,run
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
BRF:0
BRH:0
end_of_record
SF:src/tiny.ts
LF:3
LH:0
end_of_record
";

/// Create a temporary project with `contents` at `relative_path`.
/// The caller must hold onto `TempDir` to keep the directory alive.
pub fn setup_project(relative_path: &str, contents: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), relative_path, contents);
    dir
}

pub fn write_file(root: &Path, relative_path: &str, contents: &str) {
    let path = root.join(relative_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// Render one well-formed record.
pub fn record(path: &str, counters: [i64; 6]) -> String {
    let [lf, lh, fnf, fnh, brf, brh] = counters;
    format!("SF:{path}\nLF:{lf}\nLH:{lh}\nFNF:{fnf}\nFNH:{fnh}\nBRF:{brf}\nBRH:{brh}\nend_of_record\n")
}
