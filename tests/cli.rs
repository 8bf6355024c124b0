mod common;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::NaiveDate;
use tempfile::TempDir;

use common::pdf_with_pages;
use onboarding_copilot::logger::CsvLogger;
use onboarding_core::plan::parse_plan;

fn onboard_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("onboard");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::create_dir_all(root.join("data")).unwrap();

    let config_content = format!(
        r#"[index]
dir = "{root}/index"

[ingest]
data_dir = "{root}/data"
chunk_size = 800
chunk_overlap = 150

[retrieval]
top_k = 4

[logs]
dir = "{root}/logs"
"#,
        root = root.display()
    );

    let config_path = config_dir.join("onboard.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_onboard(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = onboard_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("GEMINI_API_KEY")
        .env_remove("GOOGLE_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run onboard binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_init_creates_index_and_logs() {
    let (tmp, config) = setup_test_env();
    let (stdout, stderr, success) = run_onboard(&config, &["init"]);
    assert!(success, "init failed: {}", stderr);
    assert!(stdout.contains("Index initialized"));

    assert!(tmp.path().join("index/index.sqlite").exists());
    let interactions = fs::read_to_string(tmp.path().join("logs/interactions.csv")).unwrap();
    assert_eq!(
        interactions.lines().next(),
        Some("timestamp,user_name,role,question,answer,category")
    );
    assert!(tmp.path().join("logs/tasks.csv").exists());
}

#[test]
fn test_init_is_idempotent() {
    let (tmp, config) = setup_test_env();
    assert!(run_onboard(&config, &["init"]).2);
    let (_, stderr, success) = run_onboard(&config, &["init"]);
    assert!(success, "second init failed: {}", stderr);

    let tasks = fs::read_to_string(tmp.path().join("logs/tasks.csv")).unwrap();
    assert_eq!(tasks.lines().count(), 1);
}

#[test]
fn test_stats_on_empty_logs() {
    let (_tmp, config) = setup_test_env();
    let (stdout, stderr, success) = run_onboard(&config, &["stats"]);
    assert!(success, "stats failed: {}", stderr);
    assert!(stdout.contains("No tasks generated yet."));
    assert!(stdout.contains("No questions logged yet."));
}

#[test]
fn test_stats_summarizes_logs() {
    let (tmp, config) = setup_test_env();
    let logger = CsvLogger::new(
        tmp.path().join("logs/interactions.csv"),
        tmp.path().join("logs/tasks.csv"),
    );
    let start = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
    let tasks = parse_plan(
        "Day 1 - [form] - Sign contract\nDay 2 - [tools] - Laptop setup\nDay 3 - [form] - Badge photo",
        start,
    );
    logger.log_tasks("Ada", "Engineer", start, &tasks).unwrap();
    logger
        .log_interaction("Ada", "Engineer", "Where is HR?", "Second floor.", "onboarding")
        .unwrap();

    let (stdout, stderr, success) = run_onboard(&config, &["stats"]);
    assert!(success, "stats failed: {}", stderr);
    assert!(stdout.contains("total: 3"));
    assert!(stdout.contains("pending: 3"));
    assert!(stdout.contains("form: 2"));
    assert!(stdout.contains("tools: 1"));
    assert!(stdout.contains("Where is HR?"));
}

#[test]
fn test_stats_tolerates_hand_edited_task_log() {
    let (tmp, config) = setup_test_env();
    fs::create_dir_all(tmp.path().join("logs")).unwrap();
    fs::write(
        tmp.path().join("logs/tasks.csv"),
        "task_id,user_name,role,start_date,title,day,due_date,type,status\n\
         T1,Ada,Engineer,2024-01-08,Sign contract,1,2024-01-08,form,Done\n\
         T2,Ada,Engineer,2024-01-08,Team lunch,2,2024-01-09,social,pending\n",
    )
    .unwrap();

    let (stdout, stderr, success) = run_onboard(&config, &["stats"]);
    assert!(success, "stats failed: {}", stderr);
    assert!(stdout.contains("total: 2"));
    assert!(stdout.contains("done: 1"));
    assert!(stdout.contains("other: 1"));
}

#[test]
fn test_ingest_dry_run_needs_no_api_key() {
    let (tmp, config) = setup_test_env();
    fs::write(
        tmp.path().join("data/handbook.pdf"),
        pdf_with_pages(&["Welcome to the team"]),
    )
    .unwrap();

    let (stdout, stderr, success) = run_onboard(&config, &["ingest", "--dry-run"]);
    assert!(success, "dry run failed: {}", stderr);
    assert!(stdout.contains("(dry-run)"));
    assert!(stdout.contains("files found: 1"));
    assert!(stdout.contains("files ingested: 1"));
    assert!(!tmp.path().join("index/index.sqlite").exists());
}

#[test]
fn test_ingest_dry_run_empty_directory() {
    let (_tmp, config) = setup_test_env();
    let (stdout, _, success) = run_onboard(&config, &["ingest", "--dry-run"]);
    assert!(success);
    assert!(stdout.contains("No PDF files found."));
}

#[test]
fn test_ask_without_api_key_fails() {
    let (_tmp, config) = setup_test_env();
    let (_, stderr, success) = run_onboard(&config, &["ask", "Where is HR?"]);
    assert!(!success);
    assert!(stderr.contains("GEMINI_API_KEY"), "stderr: {}", stderr);
}

#[test]
fn test_plan_rejects_bad_start_date() {
    let (_tmp, config) = setup_test_env();
    let (_, stderr, success) = run_onboard(
        &config,
        &["plan", "--name", "Ada", "--role", "Engineer", "--start", "08/01/2024"],
    );
    assert!(!success);
    assert!(stderr.contains("--start"), "stderr: {}", stderr);
}

#[test]
fn test_invalid_config_is_reported() {
    let (tmp, _) = setup_test_env();
    let bad = tmp.path().join("config/bad.toml");
    fs::write(&bad, "[ingest]\nchunk_size = 100\nchunk_overlap = 100\n").unwrap();

    let (_, stderr, success) = run_onboard(&bad, &["stats"]);
    assert!(!success);
    assert!(stderr.contains("chunk_overlap"), "stderr: {}", stderr);
}

#[test]
fn test_help_lists_commands() {
    let (_tmp, config) = setup_test_env();
    let (stdout, _, success) = run_onboard(&config, &["--help"]);
    assert!(success);
    for command in ["init", "ingest", "search", "ask", "plan", "stats"] {
        assert!(stdout.contains(command), "missing {}", command);
    }
}
