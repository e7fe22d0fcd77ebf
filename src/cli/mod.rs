//! Command-line interface for the ATAC-seq pipeline.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations
//! - [`theme`] - Terminal styling

pub mod args;
pub mod commands;
pub mod theme;

pub use args::{Cli, Commands, OptionOverrides, PlanArgs, RunArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
pub use theme::Theme;
