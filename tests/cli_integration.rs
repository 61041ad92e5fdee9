//! CLI integration tests
//!
//! These tests run the built binary against temporary repositories and check
//! exit codes, output formats and in-place fixes.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper to get the path to the slimify binary
fn slimify_bin() -> PathBuf {
    let mut path = env::current_exe()
        .expect("Failed to get current executable path")
        .parent()
        .expect("No parent")
        .to_path_buf();

    // If we're in deps/, go up one more level
    if path.ends_with("deps") {
        path = path.parent().expect("No parent").to_path_buf();
    }

    path.join("slimify")
}

const CI_WORKFLOW: &str = "name: ci
on: push
jobs:
  lint:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - run: make lint
  images:
    runs-on: ubuntu-latest
    steps:
      - run: docker build -t app .
  deploy:
    runs-on: ubuntu-latest # production
    steps:
      - run: kubectl apply -f k8s/
";

fn create_repo(dir: &TempDir) -> PathBuf {
    let workflows = dir.path().join(".github/workflows");
    fs::create_dir_all(&workflows).expect("Failed to create workflow directory");
    fs::write(workflows.join("ci.yml"), CI_WORKFLOW).expect("Failed to write ci.yml");
    dir.path().to_path_buf()
}

fn run(args: &[&str]) -> Output {
    Command::new(slimify_bin())
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("SLIMIFY_WORKFLOW_DIR")
        .env_remove("SLIMIFY_COMPAT_TABLE")
        .env("SLIMIFY_LOG_LEVEL", "error")
        .output()
        .expect("Failed to execute slimify")
}

fn repo_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[test]
fn test_cli_help() {
    let output = run(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("slimify"));
    assert!(stdout.contains("scan"));
    assert!(stdout.contains("fix"));
}

#[test]
fn test_cli_version() {
    let output = run(&["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_scan_human_output() {
    let dir = TempDir::new().unwrap();
    let repo = create_repo(&dir);

    let output = run(&["scan", "-C", &repo_arg(&repo), "--skip-duration"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(".github/workflows/ci.yml\n"));
    assert!(stdout.contains("job \"lint\" (L4)"));
    assert!(stdout.contains("(last run: unknown)"));
    assert!(stdout.contains("ci.yml:4"));
    assert!(stdout.contains("job \"deploy\" (L13)"));
    assert!(stdout.contains("kubectl"));
    assert!(!stdout.contains("\"images\""));
    assert!(stdout.contains("Total: 2 job(s) can be safely migrated."));
}

#[test]
fn test_default_command_is_scan() {
    let dir = TempDir::new().unwrap();
    let repo = create_repo(&dir);

    let output = run(&["-C", &repo_arg(&repo), "--skip-duration"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Total: 2 job(s) can be safely migrated."));
}

#[test]
fn test_scan_verbose_lists_reasons() {
    let dir = TempDir::new().unwrap();
    let repo = create_repo(&dir);

    let output = run(&["scan", "-v", "-C", &repo_arg(&repo), "--skip-duration"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Ineligible jobs:"));
    assert!(stdout.contains("uses docker commands"));
}

#[test]
fn test_scan_json_output() {
    let dir = TempDir::new().unwrap();
    let repo = create_repo(&dir);

    let output = run(&[
        "scan",
        "-C",
        &repo_arg(&repo),
        "--skip-duration",
        "--format",
        "json",
    ]);

    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Output is not valid JSON");

    let candidates = report["candidates"].as_array().unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0]["job_id"], "lint");
    assert_eq!(candidates[1]["missing_commands"][0], "kubectl");
    assert_eq!(report["ineligible"][0]["job_id"], "images");
    assert!(report["already_slim"].as_array().unwrap().is_empty());
}

#[test]
fn test_scan_missing_workflow_dir_fails() {
    let dir = TempDir::new().unwrap();

    let output = run(&["scan", "-C", &repo_arg(dir.path()), "--skip-duration"]);

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_scan_nonexistent_repo_fails() {
    let output = run(&["scan", "-C", "/nonexistent/repo", "--skip-duration"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_invalid_format_rejected() {
    let output = run(&["scan", "--format", "xml"]);
    assert!(!output.status.success());
}

#[test]
fn test_fix_rewrites_safe_jobs_only() {
    let dir = TempDir::new().unwrap();
    let repo = create_repo(&dir);
    let path = repo.join(".github/workflows/ci.yml");

    let output = run(&["fix", "-C", &repo_arg(&repo), "--skip-duration"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 job(s) updated to ubuntu-slim"));
    assert!(stdout.contains("Skipped job \"deploy\""));

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("  lint:\n    runs-on: ubuntu-slim\n"));
    assert!(content.contains("  images:\n    runs-on: ubuntu-latest\n"));
    assert!(content.contains("  deploy:\n    runs-on: ubuntu-latest # production\n"));
}

#[test]
fn test_fix_force_includes_missing_commands() {
    let dir = TempDir::new().unwrap();
    let repo = create_repo(&dir);
    let path = repo.join(".github/workflows/ci.yml");

    let output = run(&["fix", "--force", "-C", &repo_arg(&repo), "--skip-duration"]);

    assert!(output.status.success());
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("  deploy:\n    runs-on: ubuntu-slim # production\n"));
    assert!(content.contains("  images:\n    runs-on: ubuntu-latest\n"));

    // Nothing left to do on a second run
    let output = run(&["fix", "--force", "-C", &repo_arg(&repo), "--skip-duration"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No workflows were changed."));
}

#[test]
fn test_custom_compatibility_table_from_env() {
    let dir = TempDir::new().unwrap();
    let repo = create_repo(&dir);
    let table = repo.join("table.yml");
    fs::write(&table, "- make\n").unwrap();

    let output = Command::new(slimify_bin())
        .args(["scan", "-C", &repo_arg(&repo), "--skip-duration", "-f", "json"])
        .env_remove("RUST_LOG")
        .env("SLIMIFY_LOG_LEVEL", "error")
        .env("SLIMIFY_COMPAT_TABLE", &table)
        .output()
        .expect("Failed to execute slimify");

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["candidates"][0]["missing_commands"][0], "make");
    assert!(report["candidates"][1].get("missing_commands").is_none());
}
