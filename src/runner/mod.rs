//! Sample workflow orchestration.
//!
//! - [`plan`] - Branch decisions resolved once per sample
//! - [`context`] - Lock namespace and disposal registry for one run
//! - [`workflow`] - The driver walking the step list
//! - [`cleanup`] - Intermediate disposal
//! - [`report`] - Run summary

pub mod cleanup;
pub mod context;
pub mod plan;
pub mod report;
pub mod workflow;

pub use cleanup::{CleanupReport, Disposal, DisposalRegistry, RunEnd};
pub use context::{ContextSettings, RunContext};
pub use plan::{settled_steps, ExecutionPlan, HubTarget, PlannedStep, PostAction};
pub use report::{StepRecord, WorkflowReport};
pub use workflow::{RunProgress, WorkflowDriver};
