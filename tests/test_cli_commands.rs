mod common;

use common::{fixture, kickoff, stderr, stdout, stdout_json};

#[test]
fn validate_valid_config() {
    let path = fixture("quick_match.yaml");
    let output = kickoff(&["validate", path.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("ok"));
}

#[test]
fn validate_invalid_config_exits_with_config_error() {
    let path = fixture("invalid_match.yaml");
    let output = kickoff(&["validate", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));

    let out = stdout(&output);
    assert!(out.contains("invalid"));
    assert!(out.contains("clock.first_half"));
    assert!(out.contains("decisions.trigger_probability"));
    assert!(out.contains("tuning.random_factor"));
}

#[test]
fn validate_unknown_field_rejected() {
    let path = fixture("unknown_field.yaml");
    let output = kickoff(&["validate", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("overtime"));
}

#[test]
fn validate_reports_every_file_as_json() {
    let good = fixture("quick_match.yaml");
    let bad = fixture("invalid_match.yaml");
    let output = kickoff(&[
        "validate",
        "--format",
        "json",
        good.to_str().unwrap(),
        bad.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(2));

    let reports = stdout_json(&output);
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["valid"], true);
    assert_eq!(reports[1]["valid"], false);
    assert_eq!(reports[1]["errors"].as_array().unwrap().len(), 3);
}

#[test]
fn validate_strict_fails_on_warnings() {
    let path = fixture("no_event_window.yaml");
    let lenient = kickoff(&["validate", path.to_str().unwrap()]);
    assert!(lenient.status.success());
    assert!(stdout(&lenient).contains("warning"));

    let strict = kickoff(&["validate", "--strict", path.to_str().unwrap()]);
    assert_eq!(strict.status.code(), Some(2));
}

#[test]
fn validate_missing_file() {
    let output = kickoff(&["validate", "/tmp/kickoff_no_such_match.yaml"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("file not found"));
}

#[test]
fn catalog_json_lists_tables() {
    let output = kickoff(&["catalog", "--format", "json"]);
    assert!(output.status.success());
    let catalog = stdout_json(&output);
    assert_eq!(catalog["events"].as_array().unwrap().len(), 12);
    assert_eq!(catalog["responses"].as_array().unwrap().len(), 10);
}

#[test]
fn catalog_human() {
    let output = kickoff(&["catalog"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("EVENTS"));
    assert!(out.contains("Quick Free Kick"));
}

#[test]
fn version_json() {
    let output = kickoff(&["version", "--format", "json"]);
    assert!(output.status.success());
    let info = stdout_json(&output);
    assert_eq!(info["name"], "kickoff");
    assert_eq!(info["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn completions_bash() {
    let output = kickoff(&["completions", "bash"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("kickoff"));
}

#[test]
fn run_rejects_config_with_preset() {
    let path = fixture("quick_match.yaml");
    let output = kickoff(&["run", "--config", path.to_str().unwrap(), "--preset", "sprint"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("cannot be used with"));
}

#[test]
fn run_missing_config_exits_with_config_error() {
    let output = kickoff(&["run", "--config", "/tmp/kickoff_no_such_match.yaml", "-r", "first"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("file not found"));
}

#[test]
fn run_rejects_two_writers_on_stdout() {
    let output = kickoff(&[
        "run",
        "--preset",
        "sprint",
        "-r",
        "first",
        "--events-file",
        "-",
        "-f",
        "json",
    ]);
    assert_eq!(output.status.code(), Some(64));
    assert!(stderr(&output).contains("both write to stdout"));
}
