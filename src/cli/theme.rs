//! Terminal styling for command output.

use console::Style;

use crate::steps::{format_duration, StepResult, StepStatus};

/// Styles used by the `run` and `plan` commands.
#[derive(Debug, Clone)]
pub struct Theme {
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    pub dim: Style,
    pub header: Style,
    pub step_number: Style,
    pub command: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            header: Style::new().bold().magenta(),
            step_number: Style::new().dim(),
            command: Style::new().dim().italic(),
        }
    }
}

impl Theme {
    /// Format a success message (icon + text in green).
    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    /// Format a warning message (icon + text in orange).
    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    /// Format an error message (icon + text in red bold).
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Format a header banner.
    pub fn format_header(&self, title: &str) -> String {
        format!("{}", self.header.apply_to(title))
    }

    /// Format a `[n/total]` counter.
    pub fn format_counter(&self, index: usize, total: usize) -> String {
        format!("{}", self.step_number.apply_to(format!("[{}/{}]", index + 1, total)))
    }

    /// One line describing a finished step.
    pub fn format_result(&self, result: &StepResult) -> String {
        let line = result.summary_line();
        match result.status() {
            StepStatus::Completed => format!("{}", self.success.apply_to(line)),
            StepStatus::Skipped => format!("{}", self.dim.apply_to(line)),
            StepStatus::Failed if result.nofail => format!("{}", self.warning.apply_to(line)),
            StepStatus::Failed => format!("{}", self.error.apply_to(line)),
            _ => line,
        }
    }

    /// Closing line for a run.
    pub fn format_totals(
        &self,
        completed: usize,
        skipped: usize,
        failed: usize,
        secs: f64,
    ) -> String {
        format!(
            "{} completed, {} skipped, {} failed {}",
            completed,
            skipped,
            failed,
            self.dim.apply_to(format!(
                "({})",
                format_duration(std::time::Duration::from_secs_f64(secs))
            ))
        )
    }
}
