//! Integration tests for pool-tiler CLI commands.
//!
//! These tests run the actual binary and verify end-to-end behavior.

use std::path::PathBuf;
use std::process::{Command, Output};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pool-tiler"))
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn run_json(args: &[&str]) -> serde_json::Value {
    let output = run(args);
    assert!(
        output.status.success(),
        "Command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("Output should be valid JSON")
}

#[test]
fn help_lists_commands() {
    let output = run(&["help"]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    for command in ["coping", "pave", "extend", "validate", "import"] {
        assert!(stderr.contains(command), "Usage should mention '{}'", command);
    }
}

#[test]
fn unknown_command_fails() {
    let output = run(&["tessellate"]);
    assert!(!output.status.success());
}

#[test]
fn coping_produces_json_layout() {
    let path = fixture("rect_pool.yaml");
    let json = run_json(&["coping", path.to_str().unwrap()]);

    let tiles = json["tiles"].as_array().expect("tiles array");
    assert!(!tiles.is_empty());
    assert_eq!(json["edges"].as_array().map(Vec::len), Some(4));
    let full = json["stats"]["fullCount"].as_u64().unwrap();
    let partial = json["stats"]["partialCount"].as_u64().unwrap();
    assert_eq!(full + partial, tiles.len() as u64);
}

#[test]
fn coping_svg_output() {
    let path = fixture("rect_pool.yaml");
    let output = run(&["coping", path.to_str().unwrap(), "--svg"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<svg"));
    assert!(stdout.contains("<polygon id=\"pool\""));
}

#[test]
fn pave_fills_square_boundary() {
    let path = fixture("paving.yaml");
    let json = run_json(&["pave", path.to_str().unwrap()]);

    assert_eq!(json["tiles"].as_array().map(Vec::len), Some(25));
    assert_eq!(json["stats"]["fullCount"], 25);
    assert_eq!(json["stats"]["partialCount"], 0);
    assert_eq!(json["stats"]["orderQuantity"], 28);
    assert!((json["boundaryAreaM2"].as_f64().unwrap() - 4.0).abs() < 1e-9);
}

#[test]
fn pave_writes_output_file() {
    let path = fixture("paving.yaml");
    let out = std::env::temp_dir().join(format!("pool-tiler-pave-{}.svg", std::process::id()));
    let output = run(&["pave", path.to_str().unwrap(), "-f", "svg", "-o", out.to_str().unwrap()]);
    assert!(output.status.success());

    let svg = std::fs::read_to_string(&out).expect("output file");
    assert_eq!(svg.matches("<rect ").count(), 25);
    let _ = std::fs::remove_file(&out);
}

#[test]
fn pave_reports_boundary_too_small() {
    let path = fixture("small.yaml");
    let output = run(&["pave", path.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"));
}

#[test]
fn validate_exit_codes() {
    let ok = fixture("paving.yaml");
    let output = run(&["validate", ok.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["valid"], true);

    let small = fixture("small.yaml");
    let output = run(&["validate", small.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["valid"], false);
    assert!(json["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[test]
fn missing_section_is_an_error() {
    let path = fixture("paving.yaml");
    let output = run(&["coping", path.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("pool"), "Error should name the missing section: {}", stderr);
}

#[test]
fn extend_adds_row_above_coping() {
    let path = fixture("rect_pool.yaml");
    let json = run_json(&["extend", path.to_str().unwrap()]);

    let added = json["added"].as_array().expect("added array");
    assert_eq!(added.len(), 7);
    assert!(added.iter().all(|t| t["origin"] == "autoExtended"));
    assert!(added.iter().all(|t| t["id"].as_str().unwrap().starts_with("ext-top-")));
}

#[test]
fn import_builds_job_from_svg() {
    let path = fixture("drawing.svg");
    let output = run(&["import", path.to_str().unwrap(), "--scale", "10"]);
    assert!(
        output.status.success(),
        "Import failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let yaml = String::from_utf8_lossy(&output.stdout);
    assert!(yaml.contains("pool:"));
    assert!(yaml.contains("paving:"));
    assert!(yaml.contains("exclude:"));
    assert!(yaml.contains("10000"), "Scale should convert units: {}", yaml);
}

#[test]
fn missing_input_file_fails() {
    let output = run(&["pave", "does-not-exist.yaml"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read"));
}
