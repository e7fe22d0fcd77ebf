//! External command execution and interrupt handling.

pub mod command;
pub mod signal;

pub use command::{
    execute, execute_quiet, CommandOptions, CommandResult, CommandSpec, OutputCallback, OutputLine,
};
pub use signal::{install_handlers, InterruptFlag};
