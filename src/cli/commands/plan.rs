//! Plan command implementation.
//!
//! The `atacseq plan` command resolves a handoff and prints the steps a
//! run would take, marking the ones a run would skip.

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::args::PlanArgs;
use crate::cli::theme::Theme;
use crate::config::InterpolationContext;
use crate::error::Result;
use crate::runner::{settled_steps, ExecutionPlan, WorkflowDriver};
use crate::shell::CommandSpec;
use crate::steps::check_outputs;
use crate::tools::StandardTools;

use super::dispatcher::{Command, CommandResult};

/// The plan command implementation.
pub struct PlanCommand {
    args: PlanArgs,
    theme: Theme,
}

#[derive(Debug, Serialize)]
struct PlanView {
    sample: String,
    genome: String,
    paired: bool,
    tagmented: bool,
    trimmer: String,
    dry_run: bool,
    root: PathBuf,
    lock_dir: PathBuf,
    steps: Vec<PlanStepView>,
}

#[derive(Debug, Serialize)]
struct PlanStepView {
    name: String,
    title: String,
    command: CommandSpec,
    inputs: Vec<PathBuf>,
    outputs: Vec<PathBuf>,
    lock: String,
    nofail: bool,
    complete: bool,
    disposals: Vec<PathBuf>,
}

impl PlanCommand {
    /// Create a new plan command.
    pub fn new(args: PlanArgs, theme: Theme) -> Self {
        Self { args, theme }
    }

    fn view(plan: &ExecutionPlan) -> PlanView {
        let driver = WorkflowDriver::new(plan, &StandardTools);
        let planned = plan.steps();
        let settled = settled_steps(&planned);
        let steps = planned
            .iter()
            .zip(settled)
            .map(|(planned, settled)| {
                let step = driver.build_step(planned);
                PlanStepView {
                    complete: settled
                        || (!step.outputs.is_empty() && check_outputs(&step.outputs).complete),
                    lock: step.resolved_lock_id(),
                    name: step.name,
                    title: step.title,
                    command: step.command,
                    inputs: step.inputs,
                    outputs: step.outputs,
                    nofail: step.nofail,
                    disposals: planned.disposals.clone(),
                }
            })
            .collect();

        PlanView {
            sample: plan.sample_name.clone(),
            genome: plan.genome.clone(),
            paired: plan.paired,
            tagmented: plan.tagmented,
            trimmer: plan.trimmer.to_string(),
            dry_run: plan.dry_run,
            root: plan.layout.root.clone(),
            lock_dir: plan.lock_dir.clone(),
            steps,
        }
    }

    fn print(&self, view: &PlanView) {
        println!(
            "{}",
            self.theme
                .format_header(&format!("Plan for ATAC-seq sample {}", view.sample))
        );
        println!(
            "  genome {}, {}, {}, trimmer {}",
            view.genome,
            if view.paired { "paired-end" } else { "single-end" },
            if view.tagmented { "tagmented" } else { "not tagmented" },
            view.trimmer
        );
        println!("  root {}", view.root.display());
        println!("  locks {}", view.lock_dir.display());
        if view.dry_run {
            println!(
                "  {}",
                self.theme.format_warning("dry run: intermediates will be kept")
            );
        }
        println!();

        let total = view.steps.len();
        for (index, step) in view.steps.iter().enumerate() {
            let mut line = format!("{} {}", self.theme.format_counter(index, total), step.name);
            if step.nofail {
                line.push_str(" (best effort)");
            }
            if step.complete {
                line = format!("{} {}", line, self.theme.format_success("done"));
            }
            println!("{}", line);
            println!("    {}", self.theme.command.apply_to(&step.command));
            for output in &step.outputs {
                println!("    -> {}", output.display());
            }
            println!("    {}", self.theme.dim.apply_to(format!("lock {}", step.lock)));
            for path in &step.disposals {
                println!(
                    "    {}",
                    self.theme
                        .dim
                        .apply_to(format!("removes {} after success", path.display()))
                );
            }
        }
    }
}

impl Command for PlanCommand {
    fn execute(&self) -> Result<CommandResult> {
        let handoff = super::load_checked(&self.args.handoff, &self.args.overrides)?;
        let plan = ExecutionPlan::resolve(&handoff, &InterpolationContext::from_process_env())?;
        let view = Self::view(&plan);

        if self.args.json {
            let json = serde_json::to_string_pretty(&view)
                .map_err(|e| anyhow::anyhow!("Failed to serialize plan: {}", e))?;
            println!("{}", json);
        } else {
            self.print(&view);
        }

        Ok(CommandResult::success())
    }
}
