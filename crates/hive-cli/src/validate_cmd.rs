//! Handler for `hive validate`.

use std::path::PathBuf;

use anyhow::{Context, Result};

use hive_core::scenario::validate_paths;

/// Validate the given files and directories and print every error.
///
/// Returns `Ok(false)` when at least one error was reported.
pub fn run_validate(paths: &[PathBuf], recursive: bool, json: bool) -> Result<bool> {
    let report = validate_paths(paths, recursive);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialize report")?
        );
        return Ok(report.is_clean());
    }

    for error in report.errors() {
        println!("{error}");
    }

    if report.files.is_empty() {
        println!("No scenario files found.");
    } else if report.is_clean() {
        println!(
            "All {} scenario(s) in {} file(s) are valid.",
            report.total_records(),
            report.files.len()
        );
    } else {
        let failing = report.files.iter().filter(|f| !f.is_clean()).count();
        println!(
            "{} error(s) in {} of {} file(s).",
            report.total_errors(),
            failing,
            report.files.len()
        );
    }

    Ok(report.is_clean())
}
