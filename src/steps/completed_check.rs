//! Completion checks.
//!
//! A step is complete when every artifact it declares exists on disk.
//! Steps declaring no artifacts are never complete.

use std::path::{Path, PathBuf};

/// Result of running a completion check.
///
/// The `description` field is user-visible: it appears in skip messages
/// and in the run summary.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Whether the check passed (step is complete).
    pub complete: bool,

    /// Description of what was checked.
    pub description: String,

    /// Details about the check result.
    pub details: Option<String>,
}

impl CheckResult {
    /// Create a complete result.
    pub fn complete(description: impl Into<String>) -> Self {
        Self {
            complete: true,
            description: description.into(),
            details: None,
        }
    }

    /// Create an incomplete result.
    pub fn incomplete(description: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            complete: false,
            description: description.into(),
            details: Some(details.into()),
        }
    }
}

/// Check whether all declared outputs exist.
pub fn check_outputs(outputs: &[PathBuf]) -> CheckResult {
    let Some(primary) = outputs.first() else {
        return CheckResult::incomplete("No declared outputs", "Step always runs");
    };

    let missing = missing_paths(outputs);
    if missing.is_empty() {
        if outputs.len() == 1 {
            CheckResult::complete(format!("File exists: {}", primary.display()))
        } else {
            CheckResult::complete(format!("All {} outputs exist", outputs.len()))
        }
    } else {
        CheckResult::incomplete(
            format!("{}/{} outputs missing", missing.len(), outputs.len()),
            missing
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// Paths from `paths` that do not exist.
pub fn missing_paths(paths: &[PathBuf]) -> Vec<&Path> {
    paths
        .iter()
        .map(PathBuf::as_path)
        .filter(|p| !p.exists())
        .collect()
}
