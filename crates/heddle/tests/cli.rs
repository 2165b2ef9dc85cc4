//! End-to-end tests that drive the `heddle` binary.

use rstest::{fixture, rstest};
use serde_json::Value;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_heddle"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute heddle binary")
}

fn run_with_stdin(dir: &Path, args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_heddle"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn heddle binary");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");
    child.wait_with_output().expect("Failed to wait for heddle")
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let output = run(dir, &full);
    assert!(
        output.status.success(),
        "heddle {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

fn create(dir: &Path, args: &[&str]) -> String {
    let mut full = vec!["create"];
    full.extend_from_slice(args);
    run_json(dir, &full)["id"]
        .as_str()
        .expect("created issue has an id")
        .to_string()
}

#[fixture]
fn repo() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let output = run(dir.path(), &["init", "--prefix", "cli", "--quiet"]);
    assert!(output.status.success());
    dir
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["init", "create", "ready", "close", "dep"] {
        assert!(stdout.contains(command), "help is missing {command}");
    }
}

#[test]
fn test_commands_require_init() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &["ready"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Not a heddle repository"));
}

#[rstest]
fn test_ready_workflow(repo: TempDir) {
    let dir = repo.path();
    let schema = create(dir, &["Design schema", "-p", "1"]);
    let api = create(dir, &["Build API", "--blocked-by", &schema]);

    let ready = run_json(dir, &["ready"]);
    let ready_ids: Vec<&str> = ready
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|issue| issue["id"].as_str())
        .collect();
    assert_eq!(ready_ids, vec![schema.as_str()]);

    let closed = run_json(dir, &["close", &schema]);
    assert_eq!(closed["issue"]["status"], "closed");
    assert_eq!(closed["unblocked"][0]["id"], api.as_str());

    let output = run(dir, &["ready"]);
    assert!(String::from_utf8_lossy(&output.stdout).contains("Build API"));
}

#[rstest]
fn test_dep_cycle_is_rejected(repo: TempDir) {
    let dir = repo.path();
    let a = create(dir, &["A"]);
    let b = create(dir, &["B", "--blocked-by", &a]);

    let output = run(dir, &["dep", "add", &a, &b]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("would create a cycle"));

    let listed = run_json(dir, &["dep", "list", &b]);
    assert_eq!(listed["blocked_by"][0], a.as_str());
}

#[rstest]
fn test_show_includes_chain(repo: TempDir) {
    let dir = repo.path();
    let a = create(dir, &["Root"]);
    let b = create(dir, &["Middle", "--blocked-by", &a]);
    let c = create(dir, &["Leaf", "--blocked-by", &b]);

    let shown = run_json(dir, &["show", &c]);
    let chain: Vec<&str> = shown["dependencies"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|issue| issue["id"].as_str())
        .collect();
    assert_eq!(chain, vec![a.as_str(), b.as_str()]);
}

#[rstest]
fn test_unknown_blocker_fails_create(repo: TempDir) {
    let output = run(repo.path(), &["create", "Orphan", "--blocked-by", "cli-zzzz"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("non-existent issue: cli-zzzz"));
}

#[rstest]
fn test_info_reports_counts(repo: TempDir) {
    let dir = repo.path();
    let a = create(dir, &["A"]);
    create(dir, &["B", "--blocked-by", &a]);

    let info = run_json(dir, &["info"]);
    assert_eq!(info["issue_prefix"], "cli");
    assert_eq!(info["issues"]["total"], 2);
    assert_eq!(info["issues"]["ready"], 1);
    assert_eq!(info["issues"]["dependencies"], 1);
}

#[rstest]
fn test_create_reads_description_from_file_and_stdin(repo: TempDir) {
    let dir = repo.path();
    std::fs::write(dir.join("notes.md"), "From a file").unwrap();

    let from_file = create(dir, &["Filed", "-f", "notes.md", "-D", "ignored"]);
    let shown = run_json(dir, &["show", &from_file]);
    assert_eq!(shown["issue"]["description"], "From a file");

    let output = run_with_stdin(dir, &["--json", "create", "Piped", "-f", "-"], "From stdin\n");
    assert!(output.status.success());
    let created: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(created["description"], "From stdin\n");

    let missing = run(dir, &["create", "Lost", "-f", "nope.md"]);
    assert!(!missing.status.success());
    assert!(String::from_utf8_lossy(&missing.stderr).contains("nope.md"));
}

#[rstest]
fn test_list_hides_closed_unless_all(repo: TempDir) {
    let dir = repo.path();
    let done = create(dir, &["Done"]);
    create(dir, &["Pending"]);
    run_json(dir, &["close", &done]);

    let count = |args: &[&str]| run_json(dir, args).as_array().unwrap().len();
    assert_eq!(count(&["list"]), 1);
    assert_eq!(count(&["list", "--all"]), 2);
    assert_eq!(count(&["list", "--status", "closed"]), 1);
    assert_eq!(count(&["list", "-a", "-n", "0"]), 2);
}

#[rstest]
fn test_show_fetch_deps_prints_blocker_content(repo: TempDir) {
    let dir = repo.path();
    let long = "detail ".repeat(220);
    let root = create(dir, &["Root", "-D", &long]);
    let leaf = create(dir, &["Leaf", "--blocked-by", &root]);

    let plain = run(dir, &["show", &leaf]);
    assert!(!String::from_utf8_lossy(&plain.stdout).contains("Dependencies"));

    let output = run(dir, &["show", &leaf, "--fetch-deps"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Dependencies (deepest first):"));
    assert!(stdout.contains(&format!("Use 'heddle show {root}' to see complete content")));
    assert!(stdout.find("Main issue:").unwrap() > stdout.find("Root").unwrap());
}

#[rstest]
fn test_info_reports_configured_data_file(repo: TempDir) {
    let dir = repo.path();
    let config_path = dir.join(".heddle/config.yaml");
    let config = std::fs::read_to_string(&config_path).unwrap();
    std::fs::write(
        &config_path,
        config.replace(".heddle/issues.jsonl", "tracker.jsonl"),
    )
    .unwrap();

    let info = run_json(dir, &["info"]);
    let data_file = info["data_file"].as_str().unwrap();
    assert!(data_file.ends_with("tracker.jsonl"), "got {data_file}");
}

#[rstest]
fn test_bad_line_is_reported_once(repo: TempDir) {
    let dir = repo.path();
    create(dir, &["Survivor"]);
    let data = dir.join(".heddle/issues.jsonl");
    let mut content = std::fs::read(&data).unwrap();
    content.extend_from_slice(b"{\"id\":\"cli-bad\",\"title\":\"\xff\xfe\"}\n");
    std::fs::write(&data, content).unwrap();

    let output = run(dir, &["list"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Survivor"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("line 2").count(), 1, "stderr: {stderr}");
}
