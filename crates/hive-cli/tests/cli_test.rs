//! Integration tests for the `hive` binary.
//!
//! Each test runs the built binary with `XDG_CONFIG_HOME` pointed at a
//! temporary directory so no user config leaks in.

use std::path::Path;
use std::process::{Command, Output};

use serde_json::{Value, json};
use tempfile::TempDir;

use hive_test_utils::{SAMPLE_REPLY, SAMPLE_ROSTER_TOML, scenario_113, scenario_217, write_scenario_file};

fn hive(config_home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hive"))
        .args(args)
        .env("XDG_CONFIG_HOME", config_home)
        .env_remove("HIVE_MODEL_ID")
        .env_remove("HIVE_MODEL_COMMAND")
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run hive binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// -----------------------------------------------------------------------
// hive validate
// -----------------------------------------------------------------------

#[test]
fn validate_clean_directory_exits_zero() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("scenarios");
    std::fs::create_dir(&data).unwrap();
    write_scenario_file(&data, "fmsr.json", &[scenario_113()]);
    write_scenario_file(&data, "tsfm.jsonl", &[scenario_217()]);

    let output = hive(tmp.path(), &["validate", data.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout(&output).contains("All 2 scenario(s) in 2 file(s) are valid."));
}

#[test]
fn validate_reports_errors_and_exits_one() {
    let tmp = TempDir::new().unwrap();
    let file = write_scenario_file(tmp.path(), "bad.json", &[scenario_113(), json!({"id": "999"})]);

    let output = hive(tmp.path(), &["validate", file.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("[1]: missing required field `text`"), "{out}");
    assert!(out.contains("1 error(s) in 1 of 1 file(s)."), "{out}");
}

#[test]
fn validate_json_report() {
    let tmp = TempDir::new().unwrap();
    let file = write_scenario_file(tmp.path(), "one.jsonl", &[json!({"text": "no id"})]);

    let output = hive(tmp.path(), &["validate", "--json", file.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let report: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["files"][0]["records"], json!(1));
    assert_eq!(report["files"][0]["errors"].as_array().unwrap().len(), 1);
}

// -----------------------------------------------------------------------
// hive prompt / hive plan
// -----------------------------------------------------------------------

fn write_inputs(dir: &Path) -> (String, String) {
    let roster = dir.join("agents.toml");
    std::fs::write(&roster, SAMPLE_ROSTER_TOML).unwrap();
    let reply = dir.join("reply.txt");
    std::fs::write(&reply, SAMPLE_REPLY).unwrap();
    (
        roster.to_str().unwrap().to_string(),
        reply.to_str().unwrap().to_string(),
    )
}

#[test]
fn prompt_prints_goal_and_agents() {
    let tmp = TempDir::new().unwrap();
    let (roster, _) = write_inputs(tmp.path());

    let output = hive(tmp.path(), &["prompt", "Find fouling sensors", "--agents", &roster]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Find fouling sensors"));
    assert!(out.contains("FMSRAGENT"));
}

#[test]
fn plan_from_reply_file_prints_tasks() {
    let tmp = TempDir::new().unwrap();
    let (roster, reply) = write_inputs(tmp.path());

    let output = hive(
        tmp.path(),
        &["plan", "Find fouling sensors", "--agents", &roster, "--reply-file", &reply],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let out = stdout(&output);
    assert!(out.contains("Plan: 3 task(s)"), "{out}");
    assert!(out.contains("3. [FMSRAgent] Identify sensors relevant to evaporator fouling"));
    assert!(out.contains("Depends on: #S1, #S2"));
}

#[test]
fn plan_json_and_save() {
    let tmp = TempDir::new().unwrap();
    let (roster, reply) = write_inputs(tmp.path());
    let audit = tmp.path().join("audit");

    let output = hive(
        tmp.path(),
        &[
            "plan",
            "Find fouling sensors",
            "--agents",
            &roster,
            "--reply-file",
            &reply,
            "--save-plan",
            audit.to_str().unwrap(),
            "--json",
        ],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let value: Value = serde_json::from_str(&stdout(&output)).unwrap();
    let tasks = value["plan"]["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[1]["context"], json!([0]));
    assert!(value["outcomes"].is_null());

    let saved = std::fs::read_to_string(tmp.path().join("audit.txt")).unwrap();
    assert!(saved.starts_with("Question: Find fouling sensors\nPlan:\n#Task1:"));
}

#[test]
fn plan_run_with_replay_executes_every_task() {
    let tmp = TempDir::new().unwrap();
    let (roster, reply) = write_inputs(tmp.path());

    let output = hive(
        tmp.path(),
        &[
            "plan",
            "Find fouling sensors",
            "--agents",
            &roster,
            "--reply-file",
            &reply,
            "--run",
            "--context",
            "all",
            "--json",
        ],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let value: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["outcomes"].as_array().unwrap().len(), 3);
}

#[test]
fn plan_context_without_run_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let (roster, reply) = write_inputs(tmp.path());

    let output = hive(
        tmp.path(),
        &["plan", "g", "--agents", &roster, "--reply-file", &reply, "--context", "all"],
    );
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--run"));
}

#[cfg(unix)]
#[test]
fn plan_without_reply_file_uses_configured_command() {
    let tmp = TempDir::new().unwrap();
    let (roster, _) = write_inputs(tmp.path());
    let config_dir = tmp.path().join("hive");
    std::fs::create_dir_all(&config_dir).unwrap();
    // `cat` echoes the prompt, whose format section is itself a two-step plan.
    std::fs::write(
        config_dir.join("config.toml"),
        "[model]\ncommand = \"cat\"\nargs = []\n",
    )
    .unwrap();

    let output = hive(tmp.path(), &["plan", "g", "--agents", &roster, "--json"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let value: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["plan"]["tasks"].as_array().unwrap().len(), 2);
    assert_eq!(value["plan"]["tasks"][1]["context"], json!([0]));
}

#[test]
fn plan_with_out_of_range_reference_fails() {
    let tmp = TempDir::new().unwrap();
    let (roster, _) = write_inputs(tmp.path());
    let reply = tmp.path().join("bad.txt");
    std::fs::write(&reply, "#Task1: a\n#Agent1: IoTAgent\n#Dependency1: #S4\n").unwrap();

    let output = hive(
        tmp.path(),
        &["plan", "g", "--agents", &roster, "--reply-file", reply.to_str().unwrap(), "--run"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("generated plan is invalid"));
}

#[test]
fn plan_rejects_empty_roster() {
    let tmp = TempDir::new().unwrap();
    let roster = tmp.path().join("agents.toml");
    std::fs::write(&roster, "").unwrap();

    let output = hive(tmp.path(), &["plan", "g", "--agents", roster.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("defines no agents"));
}

// -----------------------------------------------------------------------
// hive init
// -----------------------------------------------------------------------

#[test]
fn init_writes_config_and_refuses_overwrite() {
    let tmp = TempDir::new().unwrap();

    let first = hive(tmp.path(), &["init"]);
    assert!(first.status.success());
    let written = std::fs::read_to_string(tmp.path().join("hive/config.toml")).unwrap();
    assert!(written.contains("[planner]"));

    let second = hive(tmp.path(), &["init"]);
    assert!(!second.status.success());
    assert!(hive(tmp.path(), &["init", "--force"]).status.success());
}
