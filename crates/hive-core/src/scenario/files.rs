//! Scenario file loading and batch validation.
//!
//! `.json` files hold a top-level array of records; `.jsonl` files hold
//! one record per non-empty line. Every problem becomes an error string
//! prefixed with the file path and either the array index
//! (`path[3]: ...`) or the 1-based line number (`path:4: ...`).

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::schema::validate_scenario;

/// Extensions recognised as scenario files.
pub const SCENARIO_EXTENSIONS: &[&str] = &["json", "jsonl"];

/// Errors from scanning a directory for scenario files.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("{path:?} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("failed to scan {path:?}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
}

/// Validation result for a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    /// Records found in the file, valid or not.
    pub records: usize,
    pub errors: Vec<String>,
}

impl FileReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Aggregated result of a batch validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub files: Vec<FileReport>,
}

impl ValidationReport {
    pub fn total_errors(&self) -> usize {
        self.files.iter().map(|f| f.errors.len()).sum()
    }

    pub fn total_records(&self) -> usize {
        self.files.iter().map(|f| f.records).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.files.iter().all(FileReport::is_clean)
    }

    /// All error strings in file order.
    pub fn errors(&self) -> impl Iterator<Item = &str> + '_ {
        self.files
            .iter()
            .flat_map(|f| f.errors.iter().map(String::as_str))
    }
}

fn has_scenario_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SCENARIO_EXTENSIONS.contains(&ext))
}

/// Validate every record in a `.json` or `.jsonl` file.
///
/// Never fails: unreadable files, malformed JSON, a non-array top level
/// and unsupported extensions are reported as error strings.
pub fn validate_file(path: &Path) -> Vec<String> {
    check_file(path).errors
}

/// Like [`validate_file`], but also reports how many records were seen.
pub fn check_file(path: &Path) -> FileReport {
    let label = path.display().to_string();
    let mut report = FileReport {
        path: path.to_path_buf(),
        records: 0,
        errors: Vec::new(),
    };

    if !has_scenario_extension(path) {
        report
            .errors
            .push(format!("{label}: unsupported file type (expected .json or .jsonl)"));
        return report;
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            report.errors.push(format!("{label}: failed to read file: {e}"));
            return report;
        }
    };

    if path.extension().is_some_and(|ext| ext == "jsonl") {
        check_jsonl(&label, &content, &mut report);
    } else {
        check_json(&label, &content, &mut report);
    }

    debug!(
        path = %label,
        records = report.records,
        errors = report.errors.len(),
        "validated scenario file"
    );
    report
}

fn check_json(label: &str, content: &str, report: &mut FileReport) {
    let value: Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(e) => {
            report.errors.push(format!("{label}: invalid JSON: {e}"));
            return;
        }
    };

    let Value::Array(records) = value else {
        report
            .errors
            .push(format!("{label}: expected a top-level JSON array of scenarios"));
        return;
    };

    report.records = records.len();
    for (index, record) in records.iter().enumerate() {
        report.errors.extend(
            validate_scenario(record)
                .into_iter()
                .map(|e| format!("{label}[{index}]: {e}")),
        );
    }
}

fn check_jsonl(label: &str, content: &str, report: &mut FileReport) {
    for (offset, line) in content.lines().enumerate() {
        let line_no = offset + 1;
        if line.trim().is_empty() {
            continue;
        }
        report.records += 1;
        match serde_json::from_str::<Value>(line) {
            Ok(record) => report.errors.extend(
                validate_scenario(&record)
                    .into_iter()
                    .map(|e| format!("{label}:{line_no}: {e}")),
            ),
            Err(e) => report
                .errors
                .push(format!("{label}:{line_no}: invalid JSON: {e}")),
        }
    }
}

/// Files found by [`scan_json_files`], plus the entries that could not be
/// read.
#[derive(Debug, Default)]
pub struct DirectoryScan {
    pub files: Vec<PathBuf>,
    pub errors: Vec<ScenarioError>,
}

/// Walk `dir` for `.json` and `.jsonl` files, sorted by path.
///
/// Symlinks are followed, so a linked scenario file is checked like any
/// other. An entry that cannot be read is recorded in
/// [`DirectoryScan::errors`] and the walk continues with its siblings.
/// Only direct children are considered unless `recursive` is set.
pub fn scan_json_files(dir: &Path, recursive: bool) -> Result<DirectoryScan, ScenarioError> {
    if !dir.is_dir() {
        return Err(ScenarioError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut scan = DirectoryScan::default();
    let walker = WalkDir::new(dir)
        .follow_links(true)
        .min_depth(1)
        .max_depth(max_depth);
    for entry in walker {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && has_scenario_extension(entry.path()) {
                    scan.files.push(entry.into_path());
                }
            }
            Err(source) => {
                let path = source
                    .path()
                    .map_or_else(|| dir.to_path_buf(), Path::to_path_buf);
                scan.errors.push(ScenarioError::Walk { path, source });
            }
        }
    }
    scan.files.sort();
    Ok(scan)
}

/// List the `.json` and `.jsonl` files under `dir`, sorted by path.
///
/// Unreadable entries are logged and skipped; use [`scan_json_files`] to
/// get them back.
pub fn find_json_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, ScenarioError> {
    let scan = scan_json_files(dir, recursive)?;
    for error in &scan.errors {
        warn!(%error, "skipping unreadable entry");
    }
    Ok(scan.files)
}

/// Validate a mix of files and directories.
///
/// Directories are expanded with [`scan_json_files`]. Every entry the scan
/// could not read becomes its own report carrying that error, so the rest
/// of the batch still runs and the overall result is not clean.
pub fn validate_paths<P: AsRef<Path>>(paths: &[P], recursive: bool) -> ValidationReport {
    let mut report = ValidationReport::default();
    for path in paths {
        let path = path.as_ref();
        if !path.is_dir() {
            report.files.push(check_file(path));
            continue;
        }
        match scan_json_files(path, recursive) {
            Ok(scan) => {
                report.files.extend(scan.files.iter().map(|f| check_file(f)));
                report.files.extend(scan.errors.into_iter().map(unreadable));
            }
            Err(e) => report.files.push(unreadable(e)),
        }
    }
    report
}

fn unreadable(error: ScenarioError) -> FileReport {
    let path = match &error {
        ScenarioError::NotADirectory { path } | ScenarioError::Walk { path, .. } => path.clone(),
    };
    FileReport {
        path,
        records: 0,
        errors: vec![error.to_string()],
    }
}
