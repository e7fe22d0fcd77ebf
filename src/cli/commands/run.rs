//! Run command implementation.
//!
//! The `atacseq run` command processes one sample end to end.

use std::fs;
use std::time::Duration;

use tracing::{info, warn};

use crate::cli::args::RunArgs;
use crate::cli::theme::Theme;
use crate::config::InterpolationContext;
use crate::error::Result;
use crate::runner::{
    ContextSettings, ExecutionPlan, RunContext, RunProgress, WorkflowDriver, WorkflowReport,
};
use crate::shell::InterruptFlag;
use crate::steps::{LockPolicy, StepStatus};
use crate::tools::StandardTools;

use super::dispatcher::{Command, CommandResult};

/// The run command implementation.
pub struct RunCommand {
    args: RunArgs,
    theme: Theme,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(args: RunArgs, theme: Theme) -> Self {
        Self { args, theme }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    fn print_summary(&self, report: &WorkflowReport) {
        println!(
            "{}",
            self.theme.format_totals(
                report.count(StepStatus::Completed),
                report.count(StepStatus::Skipped),
                report.count(StepStatus::Failed),
                report.duration_secs,
            )
        );

        if report.success {
            let cleaned = if report.dry_run {
                "dry run, intermediates kept".to_string()
            } else {
                format!("{} intermediates removed", report.cleanup.removed.len())
            };
            println!(
                "{}",
                self.theme
                    .format_success(&format!("Sample {} finished ({})", report.sample, cleaned))
            );
        } else {
            let reason = report.error.as_deref().unwrap_or("unknown error");
            eprintln!(
                "{}",
                self.theme
                    .format_error(&format!("Sample {} failed: {}", report.sample, reason))
            );
        }
    }
}

impl Command for RunCommand {
    fn execute(&self) -> Result<CommandResult> {
        let handoff = super::load_checked(&self.args.handoff, &self.args.overrides)?;
        let plan = ExecutionPlan::resolve(&handoff, &InterpolationContext::from_process_env())?;

        println!(
            "{}",
            self.theme
                .format_header(&format!("Processing ATAC-seq sample {}", plan.sample_name))
        );

        let settings = ContextSettings {
            lock_timeout: Duration::from_secs(handoff.options.lock_timeout_secs),
            poll_interval: LockPolicy::default().poll_interval,
            verify_outputs: handoff.options.verify_outputs,
        };
        let ctx = RunContext::for_plan(&plan, &settings, InterruptFlag::process());
        let catalog = StandardTools;
        let driver = WorkflowDriver::new(&plan, &catalog);

        let report = driver.run_with_progress(ctx, |progress| match progress {
            RunProgress::StepStarting {
                name, index, total, ..
            } => {
                println!("{} {}", self.theme.format_counter(index, total), name);
            }
            RunProgress::StepFinished { result } => {
                println!("  {}", self.theme.format_result(result));
            }
        });

        if let Some(path) = &self.args.report {
            match report.write_json(path) {
                Ok(()) => info!("Run report written to {}", path.display()),
                Err(e) => warn!("Could not write run report {}: {}", path.display(), e),
            }
        }

        if report.success && self.args.consume_handoff && !report.dry_run {
            fs::remove_file(&self.args.handoff)?;
            info!("Removed handoff {}", self.args.handoff.display());
        }

        self.print_summary(&report);

        if report.success {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(report.exit_code))
        }
    }
}
