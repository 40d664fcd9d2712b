mod common;

use assert_cmd::Command;
use serde_json::Value;

fn covrank() -> Command {
    let mut cmd = Command::cargo_bin("covrank").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn json_output_discovers_report() {
    let dir = common::setup_project("coverage/lcov.info", common::SAMPLE_LCOV);

    let output = covrank()
        .args(["--json", "--min-lines", "0", "--root"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let value = stdout_json(&output);
    assert_eq!(value["overall"]["fileCount"], 3);
    assert_eq!(value["files"].as_array().unwrap().len(), 3);
    assert_eq!(value["files"][0]["path"], "src/engine.ts");
}

#[test]
fn explicit_report_path_and_top() {
    let dir = common::setup_project("reports/custom.info", common::SAMPLE_LCOV);

    let output = covrank()
        .current_dir(dir.path())
        .args(["reports/custom.info", "--json", "--top", "1"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let value = stdout_json(&output);
    assert_eq!(value["files"].as_array().unwrap().len(), 1);
}

#[test]
fn weights_flag_changes_ranking() {
    let report = format!(
        "{}{}",
        common::record("branchy.ts", [20, 20, 2, 2, 40, 0]),
        common::record("liney.ts", [20, 0, 2, 2, 0, 0])
    );
    let dir = common::setup_project("lcov.info", &report);

    let rank = |weights: &str| -> String {
        let output = covrank()
            .args(["--json", "--weights", weights, "--root"])
            .arg(dir.path())
            .output()
            .unwrap();
        assert!(output.status.success());
        stdout_json(&output)["files"][0]["path"].as_str().unwrap().to_string()
    };

    assert_eq!(rank("1,0,0"), "branchy.ts");
    assert_eq!(rank("0,0,1"), "liney.ts");
}

#[test]
fn format_flag_overrides_settings_file() {
    let dir = common::setup_project("lcov.info", common::SAMPLE_LCOV);
    common::write_file(dir.path(), ".covrank.yml", "format: json\n");

    let output = covrank().arg("--root").arg(dir.path()).output().unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["overall"]["fileCount"], 3);

    let output = covrank()
        .args(["--format", "table", "--root"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.contains("Coverage summary"));
    assert!(text.contains("src/engine.ts"));
    assert!(serde_json::from_str::<Value>(&text).is_err());
}

#[test]
fn json_and_format_flags_conflict() {
    let dir = common::setup_project("lcov.info", common::SAMPLE_LCOV);
    covrank()
        .args(["--json", "--format", "table", "--root"])
        .arg(dir.path())
        .assert()
        .failure();
}

#[test]
fn invalid_weights_rejected() {
    let dir = common::setup_project("lcov.info", common::SAMPLE_LCOV);
    covrank()
        .args(["--weights", "0.5,0.5", "--root"])
        .arg(dir.path())
        .assert()
        .failure();
}

#[test]
fn missing_report_fails_with_message() {
    let dir = tempfile::tempdir().unwrap();
    let output = covrank().arg("--root").arg(dir.path()).output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No coverage report found"), "stderr: {stderr}");
}

#[test]
fn report_without_records_fails() {
    let dir = common::setup_project("lcov.info", "TN:nothing\n");
    let output = covrank().arg("--root").arg(dir.path()).output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no complete records"), "stderr: {stderr}");
}

#[test]
fn everything_filtered_is_still_success() {
    let dir = common::setup_project("lcov.info", common::SAMPLE_LCOV);
    let output = covrank()
        .args(["--min-lines", "100000", "--root"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No files matched (minLines = 100000)."));
}

#[test]
fn init_then_show_config() {
    let dir = tempfile::tempdir().unwrap();

    covrank()
        .args(["init-config", "--root"])
        .arg(dir.path())
        .assert()
        .success();
    assert!(dir.path().join(".covrank.yml").is_file());

    // Second init without --force refuses to overwrite.
    covrank()
        .args(["init-config", "--root"])
        .arg(dir.path())
        .assert()
        .failure();

    let output = covrank()
        .args(["show-config", "--root"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(".covrank.yml"));
    assert!(stdout.contains("minLines: 10"));
}

#[test]
fn serve_answers_over_stdio() {
    let dir = common::setup_project("coverage/lcov.info", common::SAMPLE_LCOV);
    let call = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 7,
        "method": "tools/call",
        "params": {
            "name": "rank_files",
            "arguments": { "project_dir": dir.path(), "top": 2, "min_lines": 0 }
        }
    });
    let input = format!(
        "{}\n{}\n{}\n",
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#,
        call,
        r#"{"jsonrpc":"2.0","id":8,"method":"shutdown"}"#
    );

    let output = covrank().arg("serve").write_stdin(input).output().unwrap();
    assert!(output.status.success());

    let replies: Vec<Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(replies.len(), 3);
    assert_eq!(replies[1]["id"], 7);

    let text = replies[1]["result"]["content"][0]["text"].as_str().unwrap();
    let ranked: Value = serde_json::from_str(text).unwrap();
    assert_eq!(ranked["files"].as_array().unwrap().len(), 2);
    assert_eq!(ranked["files"][0]["path"], "src/engine.ts");
}
