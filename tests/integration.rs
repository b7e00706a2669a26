use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{Days, Local};
use tempfile::TempDir;

fn jrag_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("jrag");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).unwrap();

    let files_dir = root.join("files");
    fs::create_dir_all(&files_dir).unwrap();

    // A MongoDB-flavored export: unquoted keys, single quotes, type wrappers.
    fs::write(
        files_dir.join("health.json"),
        r#"{readings: [{value: NumberInt(98), unit: 'mg/dL'}, {value: NumberInt(102), unit: 'mg/dL'}], device: ObjectId("64a1f2c3d4e5f60718293a4b")}"#,
    )
    .unwrap();

    fs::write(files_dir.join("broken.json"), "{{{ not json at all").unwrap();

    // A valid export whose object content carries yesterday's date, for
    // the direct lookup path.
    let yesterday = (Local::now().date_naive() - Days::new(1))
        .format("%Y-%m-%d")
        .to_string();
    fs::write(
        files_dir.join("activity.json"),
        format!(r#"{{"walk": {{"date": "{yesterday}", "steps": 9000}}}}"#),
    )
    .unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/jrag.sqlite"

[chunking]
max_items = 100

[retrieval]
direct_limit = 10
context_limit = 5

[llm]
provider = "disabled"
"#,
        root.display()
    );

    let config_path = config_dir.join("jrag.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_jrag(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = jrag_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run jrag binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn fixture(config_path: &Path, name: &str) -> String {
    config_path
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("files")
        .join(name)
        .to_str()
        .unwrap()
        .to_string()
}

#[test]
fn test_init_creates_database() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_jrag(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_jrag(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_jrag(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_ingest_repairs_and_chunks() {
    let (_tmp, config_path) = setup_test_env();
    run_jrag(&config_path, &["init"]);

    let file = fixture(&config_path, "health.json");
    let (stdout, stderr, success) = run_jrag(&config_path, &["ingest", &file]);
    assert!(success, "ingest failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("readings"));
    assert!(stdout.contains("device"));
    assert!(stdout.contains("total chunks: 2"));
}

#[test]
fn test_ingest_dry_run_writes_nothing() {
    let (_tmp, config_path) = setup_test_env();
    run_jrag(&config_path, &["init"]);

    let file = fixture(&config_path, "health.json");
    let (stdout, _, success) = run_jrag(&config_path, &["ingest", &file, "--dry-run"]);
    assert!(success);
    assert!(stdout.contains("dry-run"));
    assert!(stdout.contains("chunks: 2"));

    // Nothing was stored, so a direct date query has nothing to find and
    // the generative path answers (gateway disabled).
    let (stdout, _, success) = run_jrag(&config_path, &["ask", "glucose readings"]);
    assert!(success);
    assert!(stdout.contains("generative"));
}

#[test]
fn test_ingest_unrepairable_file_names_it() {
    let (_tmp, config_path) = setup_test_env();
    run_jrag(&config_path, &["init"]);

    let file = fixture(&config_path, "broken.json");
    let (stdout, stderr, success) = run_jrag(&config_path, &["ingest", &file]);
    assert!(!success, "ingest of invalid JSON should fail: {}", stdout);
    assert!(stderr.contains("broken.json"));
}

#[test]
fn test_ask_yesterday_answers_directly() {
    let (_tmp, config_path) = setup_test_env();
    run_jrag(&config_path, &["init"]);

    let file = fixture(&config_path, "activity.json");
    let (_, _, success) = run_jrag(&config_path, &["ingest", &file]);
    assert!(success);

    let (stdout, stderr, success) = run_jrag(&config_path, &["ask", "What happened yesterday?"]);
    assert!(success, "ask failed: stdout={}, stderr={}", stdout, stderr);
    assert!(
        stdout.contains("Found 1 records for the period"),
        "expected a direct answer, got: {}",
        stdout
    );
    assert!(stdout.contains("--- direct ---"));
    assert!(stdout.contains("date_query"));
}

#[test]
fn test_ask_always_produces_a_response() {
    let (_tmp, config_path) = setup_test_env();
    run_jrag(&config_path, &["init"]);

    let file = fixture(&config_path, "health.json");
    run_jrag(&config_path, &["ingest", &file]);

    // No date intent and the gateway is disabled; the command still
    // succeeds and reports the failure inside the response.
    let (stdout, stderr, success) =
        run_jrag(&config_path, &["ask", "Tell me about glucose readings"]);
    assert!(success, "ask failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Error generating response"));
    assert!(stdout.contains("--- generative ---"));
}

#[test]
fn test_get_roundtrip() {
    let (_tmp, config_path) = setup_test_env();
    run_jrag(&config_path, &["init"]);

    let file = fixture(&config_path, "health.json");
    let (stdout, _, success) = run_jrag(&config_path, &["ingest", &file]);
    assert!(success);

    // Receipt lines look like "  <uuid>  <chunk_type> (<n> items)".
    let id = stdout
        .lines()
        .find(|l| l.contains("readings ("))
        .and_then(|l| l.split_whitespace().next())
        .expect("ingest output should list chunk ids")
        .to_string();

    let (stdout, stderr, success) = run_jrag(&config_path, &["get", &id]);
    assert!(success, "get failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains(&id));
    assert!(stdout.contains("chunk_type:  readings"));
    assert!(stdout.contains("mg/dL"));
}

#[test]
fn test_get_missing_chunk_fails() {
    let (_tmp, config_path) = setup_test_env();
    run_jrag(&config_path, &["init"]);

    let (_, stderr, success) = run_jrag(&config_path, &["get", "no-such-id"]);
    assert!(!success);
    assert!(stderr.contains("chunk not found"));
}
