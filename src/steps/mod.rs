//! Step description, locking and execution.
//!
//! This module provides the resumable execution core:
//!
//! - [`Step`] - One external command plus its declared artifacts
//! - [`check_outputs`] - Completion check used for resumability
//! - [`LockNamespace`] - File locks that serialize duplicate work
//! - [`StepExecutor`] - Skip, lock, run and report a step
//! - [`StepStatus`] / [`StepResult`] - Execution outcome
//!
//! # Example
//!
//! ```no_run
//! use atacseq::shell::CommandSpec;
//! use atacseq::steps::{ExecutionOptions, LockNamespace, Step, StepExecutor, StepStatus};
//!
//! let executor = StepExecutor::new(
//!     LockNamespace::new("/data/sample1/.locks"),
//!     ExecutionOptions::default(),
//! );
//! let step = Step::new("index", CommandSpec::argv(["samtools", "index", "a.bam"]))
//!     .output("a.bam.bai");
//!
//! match executor.run(&step).unwrap().status() {
//!     StepStatus::Completed => println!("indexed"),
//!     StepStatus::Skipped => println!("index already present"),
//!     StepStatus::Failed => println!("samtools failed"),
//!     _ => {}
//! }
//! ```

pub mod completed_check;
pub mod executor;
pub mod lock;
pub mod step;

pub use completed_check::{check_outputs, missing_paths, CheckResult};
pub use executor::{format_duration, ExecutionOptions, StepExecutor, StepResult, StepStatus};
pub use lock::{LockGuard, LockNamespace, LockOwner, LockPolicy};
pub use step::Step;
