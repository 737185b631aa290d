//! CLI integration tests
//!
//! Runs the built `p6gantt` binary against the sample export in
//! `tests/fixtures`. Exit code 0 means success, 1 means any error.

use std::path::PathBuf;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_p6gantt"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("P6GANTT_CONFIG")
        .output()
        .expect("failed to execute p6gantt")
}

fn schedule() -> String {
    fixture("tower_schedule.csv").display().to_string()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// =============================================================================
// columns
// =============================================================================

#[test]
fn columns_lists_detected_mapping() {
    let output = run(&["columns", &schedule()]);
    assert_eq!(output.status.code(), Some(0));
    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "id        Activity ID",
            "name      Activity Name",
            "start     Start",
            "finish    Finish",
            "duration  Original Duration",
            "category  Activity Code - Discipline",
        ]
    );
}

// =============================================================================
// inspect
// =============================================================================

#[test]
fn inspect_json_lists_every_row() {
    let output = run(&["inspect", &schedule(), "--format", "json"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let tasks = report["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 13);
    assert_eq!(tasks[0]["kind"], "header");
    assert_eq!(tasks[2]["id"], "P1_PL_1010");
    assert_eq!(tasks[2]["parent"], 1);
    assert_eq!(tasks[12]["start"], "2029-04-30");
    assert_eq!(report["bounds"]["start"], "2023-12-08");
    assert_eq!(report["hidden"], 0);
}

#[test]
fn inspect_high_level_view_hides_leaves() {
    let output = run(&["inspect", &schedule(), "-f", "json", "--high-level", "1"]);
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["hidden"], 7);
    let visible: Vec<u64> = report["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|t| t["visible"] == true)
        .map(|t| t["index"].as_u64().unwrap())
        .collect();
    assert_eq!(visible, vec![0, 1, 5, 8, 11, 12]);
}

#[test]
fn inspect_text_summary() {
    let output = run(&["inspect", &schedule(), "--collapse", "0"]);
    assert_eq!(output.status.code(), Some(0));
    let text = stdout(&output);
    assert!(text.starts_with("Chart: 2023-12-08 .. 2029-05-30\n"));
    assert!(text.contains("Category column: Activity Code - Discipline"));
    assert!(text.contains("Tasks: 13 (10 hidden)"));
}

#[test]
fn collapse_out_of_range_fails() {
    let output = run(&["inspect", &schedule(), "--collapse", "99"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Row 99 does not exist"));
}

#[test]
fn collapse_warns_only_for_rows_without_children() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = dir.path().join("plan.csv");
    std::fs::write(
        &sheet,
        "Activity ID,Activity Name,Start,Finish\n\
         Enabling,,,\n\
         Tower,,,\n  \
         P1_CV_10,Pour,01-Jan-24,10-Jan-24\n",
    )
    .unwrap();
    let sheet = sheet.to_str().unwrap();
    const WARNING: &str = "collapsing a row without children";

    // Empty header
    let output = run(&["inspect", sheet, "--collapse", "0"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(stderr(&output).contains(WARNING));

    // Header with an activity under it
    let output = run(&["inspect", sheet, "--collapse", "1"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(!stderr(&output).contains(WARNING));

    // Activity leaf
    let output = run(&["inspect", sheet, "--collapse", "2"]);
    assert!(stderr(&output).contains(WARNING));
}

// =============================================================================
// render
// =============================================================================

#[test]
fn render_html_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("chart.html");
    let output = run(&["render", &schedule(), "-o", out.to_str().unwrap(), "--dark"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    let html = std::fs::read_to_string(&out).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>tower_schedule - Gantt Chart</title>"));
    assert!(html.contains("Practical completion"));
    assert!(html.contains("#0f172a"));
}

#[test]
fn render_format_follows_extension() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("chart.svg");
    let output = run(&[
        "render",
        &schedule(),
        "-o",
        out.to_str().unwrap(),
        "--zoom",
        "year",
    ]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    let svg = std::fs::read_to_string(&out).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("Jan 2029 (M61)"));
}

#[test]
fn render_mermaid_to_stdout() {
    let output = run(&[
        "render",
        &schedule(),
        "--format",
        "mermaid",
        "--title",
        "Tower A",
        "--collapse",
        "8",
    ]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.starts_with("gantt\n    title Tower A\n"));
    assert!(text.contains("    section Tower A Works\n"));
    assert!(text.contains("Superstructure :done, Superstructure, 2024-05-06, 2024-08-02"));
    assert!(!text.contains("Podium columns"));
}

#[test]
fn render_rejects_unknown_zoom() {
    let output = run(&["render", &schedule(), "--zoom", "week"]);
    assert_eq!(output.status.code(), Some(2));
}

// =============================================================================
// Errors and configuration
// =============================================================================

#[test]
fn missing_input_exits_1() {
    let output = run(&["inspect", "no/such/file.csv"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to load no/such/file.csv"));
}

#[test]
fn workbook_input_is_unsupported() {
    let dir = tempfile::tempdir().unwrap();
    let book = dir.path().join("plan.xlsx");
    std::fs::write(&book, b"PK").unwrap();
    let output = run(&["columns", book.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("save the sheet as CSV"));
}

#[test]
fn config_changes_padding_and_colors() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("p6gantt.toml");
    std::fs::write(
        &config,
        "[ingest]\npad_months = 0\n\n[colors]\ndefault_color = \"#000000\"\nrules = []\npalette = []\n",
    )
    .unwrap();

    let output = run(&[
        "--config",
        config.to_str().unwrap(),
        "inspect",
        &schedule(),
        "-f",
        "json",
    ]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["bounds"]["start"], "2024-01-08");
    assert_eq!(report["bounds"]["end"], "2029-04-30");
    assert_eq!(report["tasks"][2]["color"], "#000000");
}

#[test]
fn invalid_activity_pattern_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("p6gantt.toml");
    std::fs::write(&config, "[ingest]\nactivity_id_pattern = \"(unclosed\"\n").unwrap();

    let output = run(&["-c", config.to_str().unwrap(), "columns", &schedule()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid [ingest] configuration"));
}
