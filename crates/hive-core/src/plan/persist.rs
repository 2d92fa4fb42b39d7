//! Audit copy of a planning exchange.
//!
//! The file holds the goal followed by the raw model reply. Nothing reads
//! it back; it exists for debugging prompts.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Return `path` with `.txt` appended unless it already ends in `.txt`.
pub fn plan_file_path(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == "txt") {
        return path.to_path_buf();
    }
    let mut name = OsString::from(path.as_os_str());
    name.push(".txt");
    PathBuf::from(name)
}

/// Write the goal and reply to `path` (with `.txt` appended when missing).
///
/// Returns the path actually written.
pub fn save_plan(path: &Path, goal: &str, reply: &str) -> std::io::Result<PathBuf> {
    let target = plan_file_path(path);
    std::fs::write(&target, format!("Question: {goal}\nPlan:\n{reply}"))?;
    Ok(target)
}
