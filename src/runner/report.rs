//! Run summary.

use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::runner::cleanup::CleanupReport;
use crate::steps::{StepResult, StepStatus};

/// Outcome of one step as recorded in the run report.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub name: String,
    pub status: StepStatus,
    pub duration_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub nofail: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepRecord {
    /// Record for a step that ended the run with an error.
    pub fn aborted(name: &str, error: &PipelineError) -> Self {
        Self {
            name: name.to_string(),
            status: StepStatus::Failed,
            duration_secs: 0.0,
            exit_code: None,
            nofail: false,
            error: Some(error.to_string()),
        }
    }
}

impl From<&StepResult> for StepRecord {
    fn from(result: &StepResult) -> Self {
        Self {
            name: result.name.clone(),
            status: result.status(),
            duration_secs: result.duration.as_secs_f64(),
            exit_code: result.exit_code,
            nofail: result.nofail,
            error: result.error.clone(),
        }
    }
}

/// Summary of one sample run.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowReport {
    pub sample: String,
    pub started_at: DateTime<Local>,
    pub duration_secs: f64,
    pub success: bool,
    pub exit_code: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub dry_run: bool,
    pub steps: Vec<StepRecord>,
    pub cleanup: CleanupReport,
}

impl WorkflowReport {
    /// Record for the named step, if it ran.
    pub fn step(&self, name: &str) -> Option<&StepRecord> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Number of steps that ended in `status`.
    pub fn count(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }

    /// Total run time.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_secs)
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(anyhow::Error::from)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)?;
        Ok(())
    }
}
