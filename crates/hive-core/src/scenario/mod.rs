//! Benchmark scenario validation.
//!
//! [`schema`] checks single records; [`files`] loads JSON/JSONL files,
//! scans directories and aggregates the results.

pub mod files;
pub mod schema;

pub use files::{
    DirectoryScan, FileReport, ScenarioError, ValidationReport, check_file, find_json_files,
    scan_json_files, validate_file, validate_paths,
};
pub use schema::{FieldKind, FieldSpec, SCENARIO_FIELDS, Scenario, validate_scenario};
