//! Resumable ATAC-seq sample processing.
//!
//! Takes one sample described by a handoff file from unmapped reads to
//! called peaks. Every step is skipped when its outputs already exist, and
//! file locks keep concurrent runs over shared samples from duplicating
//! work.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Handoff loading, interpolation and validation
//! - [`error`] - Error types and exit codes
//! - [`runner`] - Execution plan, workflow driver and cleanup
//! - [`sample`] - Per-sample file layout
//! - [`shell`] - External command execution and interrupts
//! - [`steps`] - Step completion checks, locking and execution
//! - [`tools`] - Command lines for the external tools
//!
//! # Example
//!
//! ```
//! use atacseq::config::{InterpolationContext, resolve_string};
//!
//! let mut ctx = InterpolationContext::new();
//! ctx.set("sample_name", "S1");
//! let path = resolve_string("/data/${sample_name}/mapped.bam", &ctx).unwrap();
//! assert_eq!(path, "/data/S1/mapped.bam");
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
pub mod sample;
pub mod shell;
pub mod steps;
pub mod tools;

pub use error::{PipelineError, Result};
