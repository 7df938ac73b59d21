//! Binary-level tests through the installed CLI.

use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

const MATCHING: &str = "fn handle(cx: opentelemetry::Context) {\n    route(cx);\n}\n";

fn traceweave() -> Command {
    Command::cargo_bin("traceweave").unwrap()
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_overwrite_rewrites_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("handler.rs");
    fs::write(&path, MATCHING).unwrap();

    let output = traceweave()
        .arg("-w")
        .arg("-n")
        .arg("checkout")
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("1 patched"));

    let rewritten = fs::read_to_string(&path).unwrap();
    assert!(rewritten.contains("__tw_span"));
    assert!(rewritten.contains("\"checkout\""));
}

#[test]
fn test_dry_run_reports_without_writing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("handler.rs");
    fs::write(&path, MATCHING).unwrap();

    let output = traceweave().arg(&path).output().unwrap();
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("1 patched"));
    assert_eq!(fs::read_to_string(&path).unwrap(), MATCHING);
}

#[test]
fn test_directory_argument_walks_sources() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.rs"), MATCHING).unwrap();
    fs::write(dir.path().join("b.txt"), "not rust").unwrap();
    let nested = dir.path().join("nested");
    fs::create_dir(&nested).unwrap();
    fs::write(nested.join("c.rs"), "fn plain() {}\n").unwrap();

    let output = traceweave().arg(dir.path()).output().unwrap();
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("2 files"));
    assert!(stdout.contains("1 patched"));
}

#[test]
fn test_config_file_supplies_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("handler.rs");
    fs::write(&path, MATCHING).unwrap();
    let config = dir.path().join("traceweave.toml");
    fs::write(&config, "[trace]\napp = \"billing\"\noverwrite = true\n").unwrap();

    let output = traceweave()
        .arg("--config")
        .arg(&config)
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(fs::read_to_string(&path)
        .unwrap()
        .contains("\"billing\""));
}

#[test]
fn test_missing_path_fails() {
    let output = traceweave().arg("/no/such/path.rs").output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_paths_are_required() {
    let output = traceweave().output().unwrap();
    assert!(!output.status.success());
}
