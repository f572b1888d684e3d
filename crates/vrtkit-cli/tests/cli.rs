use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;
use vrtkit_core::protocols::vrt::pack_data_header;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("vrtkit"))
}

/// One data packet per count on stream 1, each carrying a single I = 0.5
/// full-scale sample.
fn write_capture(dir: &Path, name: &str, counts: &[u8]) -> PathBuf {
    let mut words = Vec::new();
    for &count in counts {
        words.extend([pack_data_header(count, 7), 1, 0, 0, 0, 0x0000_4000, 0]);
    }
    write_words(dir, name, &words)
}

fn write_words(dir: &Path, name: &str, words: &[u32]) -> PathBuf {
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes()).collect();
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn stdout_json(args: &[&str]) -> serde_json::Value {
    let output = cmd().args(args).output().unwrap();
    assert!(output.status.success(), "{:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn help_mentions_analyse_and_alias() {
    cmd()
        .args(["capture", "analyse", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--reference-level"))
        .stdout(predicate::str::contains("Examples:"));

    cmd()
        .args(["capture", "analyze", "--help"])
        .assert()
        .success();
}

#[test]
fn missing_input_reports_error_and_hint() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.vrt");
    cmd()
        .args(["capture", "analyse", missing.to_str().unwrap(), "--stdout"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error: input file not found"))
        .stderr(predicate::str::contains("hint:"));
}

#[test]
fn stdout_report_is_versioned_json() {
    let dir = TempDir::new().unwrap();
    let input = write_capture(dir.path(), "clean.vrt", &[0, 1, 2]);

    let report = stdout_json(&["capture", "analyse", input.to_str().unwrap(), "--stdout"]);
    assert_eq!(report["report_version"], 1);
    assert_eq!(report["tool"]["name"], "vrtkit");
    assert_eq!(report["summary"]["data_packets"], 3);
    assert_eq!(report["streams"][0]["stream_id"], 1);
    assert_eq!(report["streams"][0]["sequence_gaps"], 0);
    assert!(report["issues"].as_array().unwrap().is_empty());
}

#[test]
fn reference_level_scales_peak() {
    let dir = TempDir::new().unwrap();
    let input = write_capture(dir.path(), "tone.vrt", &[0]);
    let path = input.to_str().unwrap();

    let unity = stdout_json(&["capture", "analyse", path, "--stdout"]);
    let peak = unity["streams"][0]["peak_magnitude"].as_f64().unwrap();
    assert!((peak - 0.5).abs() < 1e-6);

    let attenuated = stdout_json(&[
        "capture",
        "analyse",
        path,
        "--stdout",
        "--reference-level",
        "-20",
    ]);
    let peak = attenuated["streams"][0]["peak_magnitude"].as_f64().unwrap();
    assert!((peak - 0.05).abs() < 1e-6);
    assert_eq!(attenuated["streams"][0]["reference_level_dbm"], -20.0);
}

#[test]
fn report_file_is_written_with_ok_line() {
    let dir = TempDir::new().unwrap();
    let input = write_capture(dir.path(), "clean.vrt", &[0, 1]);
    let report = dir.path().join("out").join("report.json");

    cmd()
        .args(["capture", "analyse", input.to_str().unwrap()])
        .args(["-o", report.to_str().unwrap(), "--pretty"])
        .assert()
        .success()
        .stderr(predicate::str::contains("OK: report written"));

    let text = std::fs::read_to_string(&report).unwrap();
    assert!(text.contains("\n  \"report_version\": 1"));
}

#[test]
fn quiet_suppresses_ok_line() {
    let dir = TempDir::new().unwrap();
    let input = write_capture(dir.path(), "clean.vrt", &[0]);
    let report = dir.path().join("report.json");

    cmd()
        .args(["capture", "analyse", input.to_str().unwrap()])
        .args(["-o", report.to_str().unwrap(), "--quiet"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
    assert!(report.exists());
}

#[test]
fn stdout_conflicts_with_report() {
    cmd()
        .args(["capture", "analyse", "x.vrt", "--stdout", "-o", "r.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn pretty_conflicts_with_compact() {
    cmd()
        .args(["capture", "analyse", "x.vrt", "--stdout", "--pretty", "--compact"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn report_path_must_differ_from_input() {
    let dir = TempDir::new().unwrap();
    let input = write_capture(dir.path(), "clean.vrt", &[0]);
    let path = input.to_str().unwrap();

    cmd()
        .args(["capture", "analyse", path, "-o", path])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("report path must differ from input"));
}

#[test]
fn glob_must_match_exactly_one_file() {
    let dir = TempDir::new().unwrap();
    write_capture(dir.path(), "a.vrt", &[0]);
    write_capture(dir.path(), "b.vrt", &[0]);
    let pattern = dir.path().join("*.vrt");

    cmd()
        .args(["capture", "analyse", pattern.to_str().unwrap(), "--stdout"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("multiple files match pattern"));

    let single = dir.path().join("a.*");
    cmd()
        .args(["capture", "analyse", single.to_str().unwrap(), "--stdout"])
        .assert()
        .success();
}

#[test]
fn unaligned_capture_gets_a_hint() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("odd.vrt");
    std::fs::write(&input, [0u8; 5]).unwrap();

    cmd()
        .args(["capture", "analyse", input.to_str().unwrap(), "--stdout"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error: capture analysis failed"))
        .stderr(predicate::str::contains("whole 32-bit words"));
}

#[test]
fn strict_fails_when_issues_are_reported() {
    let dir = TempDir::new().unwrap();
    let mut words = vec![pack_data_header(0, 7), 1, 0, 0, 0, 0x0000_4000, 0];
    words.extend([0x7000_0006, 0, 0, 0, 0, 0]);
    let input = write_words(dir.path(), "bad.vrt", &words);
    let path = input.to_str().unwrap();

    cmd()
        .args(["capture", "analyse", path, "--stdout"])
        .assert()
        .success();

    cmd()
        .args(["capture", "analyse", path, "--stdout", "--strict", "--list-issues"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Issues:"))
        .stderr(predicate::str::contains("word 7 warning"))
        .stderr(predicate::str::contains("error: 1 issue(s) detected"));
}
