//! Per-run context.

use std::time::Duration;

use crate::error::Result;
use crate::runner::cleanup::{CleanupReport, DisposalRegistry, RunEnd};
use crate::runner::plan::ExecutionPlan;
use crate::shell::InterruptFlag;
use crate::steps::{ExecutionOptions, LockNamespace, LockPolicy, Step, StepExecutor, StepResult};

/// Everything a step needs besides its own description: the executor
/// (and through it the lock namespace) and the disposal registry.
///
/// One context exists per sample run. It is passed explicitly to the
/// driver and consumed when the run finishes.
#[derive(Debug)]
pub struct RunContext {
    executor: StepExecutor,
    disposals: DisposalRegistry,
}

/// Knobs that shape a [`RunContext`].
#[derive(Debug, Clone)]
pub struct ContextSettings {
    /// Maximum lock wait. Zero fails immediately when a lock is held.
    pub lock_timeout: Duration,
    pub poll_interval: Duration,
    pub verify_outputs: bool,
}

impl Default for ContextSettings {
    fn default() -> Self {
        let policy = LockPolicy::default();
        Self {
            lock_timeout: policy.timeout,
            poll_interval: policy.poll_interval,
            verify_outputs: true,
        }
    }
}

impl RunContext {
    /// Wrap an executor with an empty disposal registry.
    pub fn new(executor: StepExecutor) -> Self {
        Self {
            executor,
            disposals: DisposalRegistry::new(),
        }
    }

    /// Build the context for `plan`.
    pub fn for_plan(
        plan: &ExecutionPlan,
        settings: &ContextSettings,
        interrupt: InterruptFlag,
    ) -> Self {
        let policy = if settings.lock_timeout.is_zero() {
            LockPolicy::no_wait()
        } else {
            LockPolicy {
                timeout: settings.lock_timeout,
                poll_interval: settings.poll_interval,
            }
        };
        let locks = LockNamespace::new(&plan.lock_dir).with_policy(policy);
        let options = ExecutionOptions {
            verify_outputs: settings.verify_outputs,
            cwd: Some(plan.layout.root.clone()),
        };
        Self::new(StepExecutor::new(locks, options).with_interrupt(interrupt))
    }

    pub fn executor(&self) -> &StepExecutor {
        &self.executor
    }

    pub fn disposals(&self) -> &DisposalRegistry {
        &self.disposals
    }

    /// Run one step through the executor.
    pub fn run_step(&self, step: &Step) -> Result<StepResult> {
        self.executor.run(step)
    }

    /// Register an intermediate for conditional deletion.
    pub fn dispose(&mut self, path: impl Into<std::path::PathBuf>) {
        self.disposals.add_conditional(path);
    }

    /// Whether the user asked the run to stop.
    pub fn interrupted(&self) -> bool {
        self.executor.interrupt().is_set()
    }

    /// Drain the disposal registry and end the context.
    pub fn finish(self, end: RunEnd) -> CleanupReport {
        self.disposals.drain(end)
    }
}
