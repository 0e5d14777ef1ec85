use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
    path
}

fn rows() -> Value {
    json!([
        {"age": 23, "income": 41000.5, "region": "north"},
        {"age": 35, "income": 52000.0, "region": "south"},
        {"age": 51, "income": 38000.25, "region": "north"}
    ])
}

fn sanddance() -> Command {
    Command::cargo_bin("sanddance").unwrap()
}

#[test]
fn test_writes_document_to_stdout() {
    let dir = TempDir::new().unwrap();
    let insight = write(
        dir.path(),
        "insight.json",
        &json!({"chart": "scatterplot", "columns": {"x": "age", "y": "income"}}),
    );
    let data = write(dir.path(), "data.json", &rows());

    let output = sanddance()
        .arg("--insight")
        .arg(&insight)
        .arg("--data")
        .arg(&data)
        .arg("--check")
        .output()
        .unwrap();
    assert!(output.status.success());
    let document: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(document["data"][0], json!({"name": "origin"}));
    assert!(document["scales"]
        .as_array()
        .unwrap()
        .iter()
        .any(|s| s["name"] == "scale_x"));
}

#[test]
fn test_embeds_rows_into_output_file() {
    let dir = TempDir::new().unwrap();
    let insight = write(
        dir.path(),
        "insight.json",
        &json!({"chart": "barchartV", "columns": {"x": "region"}}),
    );
    let data = write(dir.path(), "data.json", &rows());
    let output = dir.path().join("spec.json");

    sanddance()
        .arg("--insight")
        .arg(&insight)
        .arg("--data")
        .arg(&data)
        .arg("--embed-data")
        .arg("--pretty")
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("\n  "));
    let document: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(document["data"][0]["values"], rows());
}

#[test]
fn test_explicit_columns_without_rows() {
    let dir = TempDir::new().unwrap();
    let insight = write(
        dir.path(),
        "insight.json",
        &json!({"chart": "treemap", "columns": {"size": "income"}}),
    );
    let columns = write(
        dir.path(),
        "columns.json",
        &json!([{"name": "income", "type": "number", "quantitative": true}]),
    );

    sanddance()
        .arg("--insight")
        .arg(&insight)
        .arg("--columns")
        .arg(&columns)
        .assert()
        .success()
        .stdout(predicate::str::contains("Chart_TreeMapMethodSignal"));
}

#[test]
fn test_validation_errors_exit_nonzero() {
    let dir = TempDir::new().unwrap();
    let insight = write(
        dir.path(),
        "insight.json",
        &json!({"chart": "scatterplot", "columns": {"x": "age"}}),
    );
    let data = write(dir.path(), "data.json", &rows());

    sanddance()
        .arg("--insight")
        .arg(&insight)
        .arg("--data")
        .arg(&data)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Field y is required."));
}

#[test]
fn test_unreadable_insight_reports_path() {
    let dir = TempDir::new().unwrap();
    let data = write(dir.path(), "data.json", &rows());

    sanddance()
        .arg("--insight")
        .arg(dir.path().join("missing.json"))
        .arg("--data")
        .arg(&data)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}
