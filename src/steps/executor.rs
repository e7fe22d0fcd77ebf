//! Step execution engine.
//!
//! Runs a [`Step`] only when its declared outputs are missing, under the
//! lock named by the step, and reports the outcome as a [`StepResult`].

use crate::error::{PipelineError, Result};
use crate::shell::{execute, CommandOptions, InterruptFlag, OutputCallback, OutputLine};
use crate::steps::completed_check::{check_outputs, missing_paths, CheckResult};
use crate::steps::lock::LockNamespace;
use crate::steps::step::Step;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Number of stderr lines kept in failure messages.
const STDERR_TAIL_LINES: usize = 20;

/// Status of a step in the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Step is waiting to run.
    Pending,

    /// Step holds its lock and is about to run.
    Locked,

    /// Step is currently executing.
    Running,

    /// Step completed successfully.
    Completed,

    /// Step failed.
    Failed,

    /// Step was skipped (outputs already present).
    Skipped,
}

impl StepStatus {
    /// Check if this is a terminal state (no more changes expected).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepStatus::Completed | StepStatus::Failed | StepStatus::Skipped
        )
    }

    /// Get a display character for this status.
    pub fn display_char(&self) -> char {
        match self {
            StepStatus::Pending => '○',
            StepStatus::Locked => '◎',
            StepStatus::Running => '◉',
            StepStatus::Completed => '✓',
            StepStatus::Failed => '✗',
            StepStatus::Skipped => '⊘',
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StepStatus::Pending => "pending",
            StepStatus::Locked => "locked",
            StepStatus::Running => "running",
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
            StepStatus::Skipped => "skipped",
        };
        write!(f, "{}", s)
    }
}

/// Result of executing a step.
#[derive(Debug)]
pub struct StepResult {
    /// Step name.
    pub name: String,

    /// Terminal status.
    pub status: StepStatus,

    /// Execution duration.
    pub duration: Duration,

    /// Exit code (if command was run).
    pub exit_code: Option<i32>,

    /// Whether a failure is tolerated.
    pub nofail: bool,

    /// Completion check result (if skipped).
    pub check_result: Option<CheckResult>,

    /// Error message (if failed).
    pub error: Option<String>,

    /// Captured output (if available).
    pub output: Option<String>,
}

impl StepResult {
    /// Create a skipped result.
    pub fn skipped(name: &str, check_result: CheckResult) -> Self {
        Self {
            name: name.to_string(),
            status: StepStatus::Skipped,
            duration: Duration::ZERO,
            exit_code: None,
            nofail: false,
            check_result: Some(check_result),
            error: None,
            output: None,
        }
    }

    /// Create a success result.
    pub fn success(
        name: &str,
        duration: Duration,
        exit_code: Option<i32>,
        output: Option<String>,
    ) -> Self {
        Self {
            name: name.to_string(),
            status: StepStatus::Completed,
            duration,
            exit_code,
            nofail: false,
            check_result: None,
            error: None,
            output,
        }
    }

    /// Create a failure result.
    pub fn failure(
        name: &str,
        duration: Duration,
        exit_code: Option<i32>,
        error: String,
        nofail: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            status: StepStatus::Failed,
            duration,
            exit_code,
            nofail,
            check_result: None,
            error: Some(error),
            output: None,
        }
    }

    /// Get the status of this result.
    pub fn status(&self) -> StepStatus {
        self.status
    }

    /// Whether this result must abort the workflow.
    pub fn is_fatal(&self) -> bool {
        self.status == StepStatus::Failed && !self.nofail
    }

    /// Generate a summary line for display.
    pub fn summary_line(&self) -> String {
        let status = self.status();
        let duration_str = format_duration(self.duration);

        match status {
            StepStatus::Completed => {
                format!("{} {} ({})", status.display_char(), self.name, duration_str)
            }
            StepStatus::Skipped => {
                format!("{} {} (already complete)", status.display_char(), self.name)
            }
            StepStatus::Failed => {
                let error = self.error.as_deref().unwrap_or("unknown error");
                let tolerated = if self.nofail { " [tolerated]" } else { "" };
                format!(
                    "{} {} - {}{}",
                    status.display_char(),
                    self.name,
                    error,
                    tolerated
                )
            }
            _ => format!("{} {}", status.display_char(), self.name),
        }
    }
}

/// Format a duration for humans.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs == 0 {
        format!("{}ms", millis)
    } else if secs < 60 {
        format!("{}.{}s", secs, millis / 100)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

/// Options for step execution.
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Treat a zero exit with missing outputs as a failure.
    pub verify_outputs: bool,

    /// Working directory for commands.
    pub cwd: Option<PathBuf>,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            verify_outputs: true,
            cwd: None,
        }
    }
}

/// Runs steps against a lock namespace.
#[derive(Debug, Clone)]
pub struct StepExecutor {
    locks: LockNamespace,
    options: ExecutionOptions,
    interrupt: InterruptFlag,
}

impl StepExecutor {
    /// Create an executor.
    pub fn new(locks: LockNamespace, options: ExecutionOptions) -> Self {
        Self {
            locks,
            options,
            interrupt: InterruptFlag::new(),
        }
    }

    /// Observe `interrupt` while waiting for locks and running commands.
    pub fn with_interrupt(mut self, interrupt: InterruptFlag) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Lock namespace in use.
    pub fn locks(&self) -> &LockNamespace {
        &self.locks
    }

    /// Execution options in use.
    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    /// Interrupt flag observed by this executor.
    pub fn interrupt(&self) -> &InterruptFlag {
        &self.interrupt
    }

    /// Run one step.
    ///
    /// Returns `Err` only for conditions that abort the workflow whatever
    /// the step's `nofail` flag says: lock timeout, missing prerequisites,
    /// interruption and IO errors on the lock namespace. Tool failures
    /// come back as a [`StepStatus::Failed`] result.
    pub fn run(&self, step: &Step) -> Result<StepResult> {
        let check = check_outputs(&step.outputs);
        if check.complete {
            debug!("Step '{}' skipped: {}", step.name, check.description);
            return Ok(StepResult::skipped(&step.name, check));
        }

        let lock_id = step.resolved_lock_id();
        let guard = self
            .locks
            .acquire(&lock_id, &self.interrupt)
            .map_err(|e| match e {
                PipelineError::Interrupted { .. } => PipelineError::Interrupted {
                    step: step.name.clone(),
                },
                other => other,
            })?;
        debug!("Step '{}' is {}", step.name, StepStatus::Locked);

        // Another run may have finished the step while we waited.
        let check = check_outputs(&step.outputs);
        if check.complete {
            drop(guard);
            debug!("Step '{}' completed elsewhere while waiting", step.name);
            return Ok(StepResult::skipped(&step.name, check));
        }

        if let Some(missing) = missing_paths(&step.inputs).first() {
            return Err(PipelineError::MissingPrerequisite {
                step: step.name.clone(),
                path: missing.to_path_buf(),
            });
        }

        for parent in step.outputs.iter().filter_map(|p| p.parent()) {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let preexisting: Vec<PathBuf> = step
            .outputs
            .iter()
            .filter(|p| p.exists())
            .cloned()
            .collect();

        debug!("Step '{}' is {}: {}", step.name, StepStatus::Running, step.command);
        let start = Instant::now();
        let options = CommandOptions {
            cwd: self.options.cwd.clone(),
            capture_stdout: true,
            capture_stderr: true,
            ..Default::default()
        };
        let name = step.name.clone();
        let callback: OutputCallback = Arc::new(move |line| match line {
            OutputLine::Stdout(text) => debug!(step = %name, "{}", text),
            OutputLine::Stderr(text) => debug!(step = %name, "stderr: {}", text),
        });

        let result = match execute(&step.command, &options, &self.interrupt, Some(callback)) {
            Ok(result) => result,
            Err(e) => {
                warn!("Step '{}' could not start: {}", step.name, e);
                return Ok(StepResult::failure(
                    &step.name,
                    start.elapsed(),
                    None,
                    e.to_string(),
                    step.nofail,
                ));
            }
        };

        if result.interrupted {
            remove_new_outputs(step, &preexisting);
            drop(guard);
            return Err(PipelineError::Interrupted {
                step: step.name.clone(),
            });
        }

        if !result.success {
            remove_new_outputs(step, &preexisting);
            drop(guard);
            let failure = PipelineError::ToolFailure {
                step: step.name.clone(),
                command: step.command.to_string(),
                code: result.exit_code,
            };
            let tail = stderr_tail(&result.stderr);
            if !tail.is_empty() {
                warn!("Step '{}' stderr:\n{}", step.name, tail);
            }
            return Ok(StepResult::failure(
                &step.name,
                result.duration,
                result.exit_code,
                failure.to_string(),
                step.nofail,
            ));
        }

        if self.options.verify_outputs {
            if let Some(missing) = missing_paths(&step.outputs).first() {
                let failure = PipelineError::MissingOutput {
                    step: step.name.clone(),
                    path: missing.to_path_buf(),
                };
                remove_new_outputs(step, &preexisting);
                drop(guard);
                return Ok(StepResult::failure(
                    &step.name,
                    result.duration,
                    result.exit_code,
                    failure.to_string(),
                    step.nofail,
                ));
            }
        }

        drop(guard);
        Ok(StepResult::success(
            &step.name,
            result.duration,
            result.exit_code,
            Some(result.stdout),
        ))
    }
}

/// Delete outputs the failed command may have left half-written.
fn remove_new_outputs(step: &Step, preexisting: &[PathBuf]) {
    for path in &step.outputs {
        if preexisting.contains(path) || !path.exists() {
            continue;
        }
        let removed = if path.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        match removed {
            Ok(()) => debug!("Removed partial output {}", path.display()),
            Err(e) => warn!("Could not remove partial output {}: {}", path.display(), e),
        }
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
