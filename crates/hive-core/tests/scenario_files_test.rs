//! Integration tests for scenario file validation.

use hive_core::scenario::{Scenario, find_json_files, validate_file, validate_paths};
use hive_test_utils::{scenario_113, scenario_217, write_scenario_file};
use serde_json::json;
use tempfile::TempDir;

#[test]
fn known_scenarios_validate_in_both_formats() {
    let dir = TempDir::new().unwrap();
    let records = [scenario_113(), scenario_217()];
    let json = write_scenario_file(dir.path(), "utterances.json", &records);
    let jsonl = write_scenario_file(dir.path(), "utterances.jsonl", &records);

    assert!(validate_file(&json).is_empty());
    assert!(validate_file(&jsonl).is_empty());
}

#[test]
fn scenario_217_exposes_its_type() {
    let scenario = Scenario::from_value(scenario_217()).unwrap();
    assert_eq!(scenario.id, "217");
    assert_eq!(scenario.kind.as_deref(), Some("TSFM"));
    assert_eq!(scenario.category.as_deref(), Some("Inference Query"));
    assert!(scenario.text.contains("chiller9_annotated_small_test.csv"));
}

#[test]
fn only_invalid_record_contributes_errors() {
    let dir = TempDir::new().unwrap();
    let path = write_scenario_file(
        dir.path(),
        "mixed.json",
        &[scenario_113(), json!({"id": "999"})],
    );

    let errors = validate_file(&path);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].contains("[1]"));
    assert!(errors[0].contains("text"));
}

#[test]
fn directory_scan_finds_only_data_files() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("test.json"), "[]").unwrap();
    std::fs::write(dir.path().join("test.jsonl"), "").unwrap();
    std::fs::write(dir.path().join("test.txt"), "not json").unwrap();
    std::fs::write(dir.path().join("test.py"), "print(\"hello\")").unwrap();

    let files = find_json_files(dir.path(), false).unwrap();
    assert_eq!(files.len(), 2);
    assert!(files.iter().any(|f| f.ends_with("test.json")));
    assert!(files.iter().any(|f| f.ends_with("test.jsonl")));
}

#[test]
fn batch_checks_every_file_before_reporting() {
    let dir = TempDir::new().unwrap();
    let single = dir.path().join("single_agent");
    let multi = dir.path().join("multi_agent");
    std::fs::create_dir_all(&single).unwrap();
    std::fs::create_dir_all(&multi).unwrap();

    write_scenario_file(&single, "fmsr.json", &[scenario_113()]);
    write_scenario_file(&single, "broken.jsonl", &[json!({"text": "no id"}), json!(42)]);
    write_scenario_file(&multi, "end2end.json", &[scenario_217(), json!({"id": 7})]);

    let report = validate_paths(&[dir.path()], true);
    assert_eq!(report.files.len(), 3);
    assert_eq!(report.total_records(), 5);
    assert_eq!(report.total_errors(), 3);

    let shallow = validate_paths(&[dir.path()], false);
    assert!(shallow.files.is_empty());
    assert!(shallow.is_clean());
}
