//! Workflow orchestration.

use std::fs;
use std::time::Instant;

use chrono::Local;
use tracing::{debug, error, info, warn};

use crate::error::{PipelineError, Result};
use crate::steps::{format_duration, CheckResult, Step, StepResult, StepStatus};
use crate::tools::ToolCatalog;

use super::cleanup::RunEnd;
use super::context::RunContext;
use super::plan::{settled_steps, ExecutionPlan, PlannedStep, PostAction};
use super::report::{StepRecord, WorkflowReport};

/// Progress events emitted during workflow execution.
#[derive(Debug)]
pub enum RunProgress<'a> {
    /// A step is about to start.
    StepStarting {
        name: &'a str,
        title: &'a str,
        index: usize,
        total: usize,
    },
    /// A step finished (including skipped and tolerated failures).
    StepFinished { result: &'a StepResult },
}

/// Logs pipeline markers with wall-clock time and time since the last
/// marker.
struct Timestamps {
    last: Instant,
}

impl Timestamps {
    fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    fn mark(&mut self, title: &str) {
        let elapsed = self.last.elapsed();
        self.last = Instant::now();
        info!(
            "{} ({}) elapsed: {}",
            title,
            Local::now().format("%m-%d %H:%M:%S"),
            format_duration(elapsed)
        );
    }
}

/// Drives the linear step list of one sample.
pub struct WorkflowDriver<'a> {
    plan: &'a ExecutionPlan,
    catalog: &'a dyn ToolCatalog,
}

impl<'a> WorkflowDriver<'a> {
    /// Create a driver for `plan` using `catalog` for command lines.
    pub fn new(plan: &'a ExecutionPlan, catalog: &'a dyn ToolCatalog) -> Self {
        Self { plan, catalog }
    }

    /// The plan being driven.
    pub fn plan(&self) -> &ExecutionPlan {
        self.plan
    }

    /// Turn a planned step into an executable one.
    pub fn build_step(&self, planned: &PlannedStep) -> Step {
        let mut step = Step::from_tool(planned.name, self.catalog.build(&planned.request))
            .titled(planned.title)
            .inputs(planned.request.inputs());
        if let Some(id) = &planned.lock_id {
            step = step.locked_by(id.clone());
        }
        if planned.nofail {
            step = step.best_effort();
        }
        step
    }

    /// Every step of the plan, in order.
    pub fn steps(&self) -> Vec<Step> {
        self.plan
            .steps()
            .iter()
            .map(|planned| self.build_step(planned))
            .collect()
    }

    /// Run the workflow.
    pub fn run(&self, ctx: RunContext) -> WorkflowReport {
        self.run_with_progress(ctx, |_| {})
    }

    /// Run the workflow with a progress callback.
    ///
    /// Stops at the first fatal failure. Intermediates are deleted only
    /// when every step succeeded (or failed tolerably) and the run is not
    /// a dry run.
    /// Steps whose outputs were removed that way are skipped on a later run
    /// as long as every step reading them is done.
    pub fn run_with_progress(
        &self,
        mut ctx: RunContext,
        mut on_progress: impl FnMut(RunProgress<'_>),
    ) -> WorkflowReport {
        let started_at = Local::now();
        let start = Instant::now();
        let mut records = Vec::new();

        info!("Start processing ATAC-seq sample {}", self.plan.sample_name);
        let outcome = self.execute(&mut ctx, &mut records, &mut on_progress);

        let end = match &outcome {
            Ok(()) => RunEnd::Succeeded {
                dry_run: self.plan.dry_run,
            },
            Err(e) => {
                error!("Sample {} aborted: {}", self.plan.sample_name, e);
                RunEnd::Aborted
            }
        };
        let cleanup = ctx.finish(end);
        if outcome.is_ok() {
            info!(
                "Finished processing sample {} ({} intermediates removed)",
                self.plan.sample_name,
                cleanup.removed.len()
            );
        }

        WorkflowReport {
            sample: self.plan.sample_name.clone(),
            started_at,
            duration_secs: start.elapsed().as_secs_f64(),
            success: outcome.is_ok(),
            exit_code: outcome.as_ref().err().map_or(0, PipelineError::exit_code),
            error: outcome.err().map(|e| e.to_string()),
            dry_run: self.plan.dry_run,
            steps: records,
            cleanup,
        }
    }

    fn execute<F>(
        &self,
        ctx: &mut RunContext,
        records: &mut Vec<StepRecord>,
        on_progress: &mut F,
    ) -> Result<()>
    where
        F: FnMut(RunProgress<'_>),
    {
        fs::create_dir_all(&self.plan.layout.root)?;

        let planned = self.plan.steps();
        let settled = settled_steps(&planned);
        let total = planned.len();
        let mut clock = Timestamps::new();
        let mut last_title = "";

        for (index, planned) in planned.iter().enumerate() {
            if ctx.interrupted() {
                return Err(PipelineError::Interrupted {
                    step: planned.name.to_string(),
                });
            }

            if planned.title != last_title {
                clock.mark(planned.title);
                last_title = planned.title;
            }

            let step = self.build_step(planned);
            on_progress(RunProgress::StepStarting {
                name: planned.name,
                title: planned.title,
                index,
                total,
            });

            let result = if settled[index] {
                debug!(
                    "Step '{}' outputs were cleaned up after later steps finished",
                    planned.name
                );
                StepResult::skipped(
                    planned.name,
                    CheckResult::complete("Consumers already complete"),
                )
            } else {
                match ctx.run_step(&step) {
                    Ok(result) => result,
                    Err(e) => {
                        records.push(StepRecord::aborted(planned.name, &e));
                        return Err(e);
                    }
                }
            };
            records.push(StepRecord::from(&result));
            on_progress(RunProgress::StepFinished { result: &result });

            if result.is_fatal() {
                let message = result
                    .error
                    .clone()
                    .unwrap_or_else(|| format!("Step '{}' failed", planned.name));
                return Err(anyhow::anyhow!(message).into());
            }
            if result.status() == StepStatus::Failed {
                warn!(
                    "Best-effort step '{}' failed, continuing: {}",
                    planned.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
                continue;
            }

            for path in &planned.disposals {
                ctx.dispose(path);
            }
            if let Some(action) = &planned.after {
                apply(action)?;
            }
        }

        Ok(())
    }
}

fn apply(action: &PostAction) -> Result<()> {
    match action {
        PostAction::WriteFile { path, contents } => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, contents)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::interpolation::InterpolationContext;
    use crate::config::schema::{Handoff, ProjectConfig, RawInput, RunSettings, SampleConfig};
    use crate::shell::CommandSpec;
    use crate::steps::{ExecutionOptions, LockNamespace, LockPolicy, StepExecutor};
    use crate::tools::ToolRequest;
    use std::path::Path;
    use tempfile::TempDir;

    /// Writes every product of a request; fails for requests matching
    /// `fail`.
    struct Touch {
        fail: fn(&ToolRequest) -> bool,
    }

    impl ToolCatalog for Touch {
        fn command(&self, request: &ToolRequest) -> CommandSpec {
            if (self.fail)(request) {
                return CommandSpec::shell("exit 1");
            }
            let files: Vec<String> = request
                .products()
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            CommandSpec::shell(format!("touch {}", files.join(" ")))
        }
    }

    fn never(_: &ToolRequest) -> bool {
        false
    }

    fn plan(root: &Path) -> ExecutionPlan {
        let raw = root.join("raw.bam");
        fs::write(&raw, "").unwrap();
        let mut project = ProjectConfig {
            name: "atac".into(),
            root: root.display().to_string(),
            adapters: "/refs/adapters.fa".into(),
            ..Default::default()
        };
        project.genomes.insert("hg19".into(), "/refs/hg19".into());
        project.chrom_sizes.insert("hg19".into(), "/refs/hg19.sizes".into());
        let handoff = Handoff {
            project,
            sample: SampleConfig {
                name: "S1".into(),
                genome: "hg19".into(),
                paired: false,
                tagmented: false,
                root: Some(root.join("S1").display().to_string()),
                unmapped_bam: RawInput::Single(raw.display().to_string()),
                track_url: None,
                track_colour: "0,0,0".into(),
                paths: Default::default(),
            },
            options: RunSettings::default(),
        };
        ExecutionPlan::resolve(&handoff, &InterpolationContext::new()).unwrap()
    }

    fn context(plan: &ExecutionPlan) -> RunContext {
        let locks = LockNamespace::new(&plan.lock_dir).with_policy(LockPolicy::no_wait());
        RunContext::new(StepExecutor::new(locks, ExecutionOptions::default()))
    }

    #[test]
    fn single_end_run_completes_and_cleans() {
        let temp = TempDir::new().unwrap();
        let plan = plan(temp.path());
        let catalog = Touch { fail: never };

        let report = WorkflowDriver::new(&plan, &catalog).run(context(&plan));

        assert!(report.success, "{:?}", report.error);
        assert_eq!(report.count(StepStatus::Completed), plan.steps().len());
        assert!(plan.layout.peaks.exists());
        assert!(!plan.layout.fastq.exists());
        assert!(!plan.layout.mapped.exists());
        assert_eq!(report.cleanup.removed.len(), 3);
    }

    #[test]
    fn progress_reports_every_step() {
        let temp = TempDir::new().unwrap();
        let plan = plan(temp.path());
        let catalog = Touch { fail: never };
        let mut started = Vec::new();

        WorkflowDriver::new(&plan, &catalog).run_with_progress(context(&plan), |event| {
            if let RunProgress::StepStarting { name, index, total, .. } = event {
                started.push((name.to_string(), index, total));
            }
        });

        assert_eq!(started.len(), plan.steps().len());
        assert_eq!(started[0].0, "fastqc");
        assert_eq!(started.last().unwrap().1 + 1, started.last().unwrap().2);
    }

    #[test]
    fn fatal_failure_keeps_intermediates() {
        let temp = TempDir::new().unwrap();
        let plan = plan(temp.path());
        let catalog = Touch {
            fail: |r| matches!(r, ToolRequest::FilterReads { .. }),
        };

        let report = WorkflowDriver::new(&plan, &catalog).run(context(&plan));

        assert!(!report.success);
        assert_eq!(report.exit_code, 1);
        assert_eq!(report.steps.last().unwrap().name, "filter");
        assert!(plan.layout.mapped.exists());
        assert!(plan.layout.fastq.exists());
        assert!(!plan.layout.peaks.exists());
    }

    #[test]
    fn interrupted_before_start_runs_nothing() {
        let temp = TempDir::new().unwrap();
        let plan = plan(temp.path());
        let catalog = Touch { fail: never };
        let flag = crate::shell::InterruptFlag::new();
        flag.trigger();
        let locks = LockNamespace::new(&plan.lock_dir);
        let ctx = RunContext::new(
            StepExecutor::new(locks, ExecutionOptions::default()).with_interrupt(flag),
        );

        let report = WorkflowDriver::new(&plan, &catalog).run(ctx);

        assert_eq!(report.exit_code, 130);
        assert!(report.steps.is_empty());
    }

    #[test]
    fn built_steps_carry_lock_and_inputs() {
        let temp = TempDir::new().unwrap();
        let plan = plan(temp.path());
        let catalog = Touch { fail: never };
        let steps = WorkflowDriver::new(&plan, &catalog).steps();

        let filter = steps.iter().find(|s| s.name == "filter").unwrap();
        assert_eq!(filter.inputs, vec![plan.layout.mapped.clone()]);
        assert_eq!(filter.primary_output(), Some(plan.layout.filtered.as_path()));
        assert_eq!(filter.title, "Filtering reads for quality");

        let sizes = steps.iter().find(|s| s.name == "insert_sizes").unwrap();
        assert!(sizes.nofail);
    }
}
