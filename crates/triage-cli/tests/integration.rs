#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Nothing listens on the discard port, so API calls fail fast.
const DEAD_API: &str = "http://127.0.0.1:9";

fn triage(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("triage").unwrap();
    cmd.current_dir(dir.path())
        .env("TRIAGE_ROOT", dir.path())
        .env_remove("TRIAGE_API_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

fn init_console(dir: &TempDir) {
    triage(dir)
        .args(["init", "--base-url", DEAD_API])
        .assert()
        .success();
}

fn write_config(dir: &TempDir, yaml: &str) {
    std::fs::create_dir_all(dir.path().join(".triage")).unwrap();
    std::fs::write(dir.path().join(".triage/config.yaml"), yaml).unwrap();
}

// ---------------------------------------------------------------------------
// triage init
// ---------------------------------------------------------------------------

#[test]
fn init_writes_default_config() {
    let dir = TempDir::new().unwrap();
    triage(&dir)
        .args(["init", "--base-url", "https://lms.example.edu/api"])
        .assert()
        .success()
        .stdout(predicate::str::contains("created: .triage/config.yaml"));

    let yaml = std::fs::read_to_string(dir.path().join(".triage/config.yaml")).unwrap();
    assert!(yaml.contains("https://lms.example.edu/api"));
    assert!(yaml.contains("{task_id}"));
}

#[test]
fn init_leaves_existing_config_alone() {
    let dir = TempDir::new().unwrap();
    init_console(&dir);
    triage(&dir)
        .args(["init", "--base-url", "https://other.example.edu"])
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:"));

    let yaml = std::fs::read_to_string(dir.path().join(".triage/config.yaml")).unwrap();
    assert!(yaml.contains(DEAD_API));
}

#[test]
fn init_rejects_non_http_base_url() {
    let dir = TempDir::new().unwrap();
    triage(&dir)
        .args(["init", "--base-url", "lms.example.edu"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must start with http"));
    assert!(!dir.path().join(".triage/config.yaml").exists());
}

// ---------------------------------------------------------------------------
// triage config
// ---------------------------------------------------------------------------

#[test]
fn config_validate_passes_after_init() {
    let dir = TempDir::new().unwrap();
    init_console(&dir);
    triage(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}

#[test]
fn config_validate_reports_missing_placeholder() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        "api:\n  base_url: https://lms.example.edu\nendpoints:\n  upload: /admin/tasks/submissions\n",
    );
    triage(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error]"))
        .stderr(predicate::str::contains("config validation found errors"));
}

#[test]
fn config_validate_json_lists_warnings() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        "api:\n  base_url: https://lms.example.edu\nactions:\n  timeout_secs: 0\n",
    );
    let output = triage(&dir)
        .args(["--json", "config", "validate"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let warnings = json["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["level"], "warning");
}

#[test]
fn config_show_masks_token() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        "api:\n  base_url: https://lms.example.edu\n  token: hunter2\n",
    );
    triage(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://lms.example.edu"))
        .stdout(predicate::str::contains("Token:             set"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn config_show_without_init_fails() {
    let dir = TempDir::new().unwrap();
    triage(&dir)
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

// ---------------------------------------------------------------------------
// API-backed commands against an unreachable server
// ---------------------------------------------------------------------------

#[test]
fn list_reports_load_failure() {
    let dir = TempDir::new().unwrap();
    init_console(&dir);
    triage(&dir)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load overdue submissions"));
}

#[test]
fn notify_reports_send_failure() {
    let dir = TempDir::new().unwrap();
    init_console(&dir);
    triage(&dir)
        .args(["notify", "9", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to send notification"));
}

#[test]
fn submit_missing_file_fails_before_any_request() {
    let dir = TempDir::new().unwrap();
    init_console(&dir);
    triage(&dir)
        .args(["submit", "1", "does-not-exist.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn list_with_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "api:\n  base_url: ''\n");
    triage(&dir)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("api.base_url is empty"));
}
