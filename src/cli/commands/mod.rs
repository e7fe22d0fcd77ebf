//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.

pub mod dispatcher;
pub mod plan;
pub mod run;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};

use std::path::Path;

use tracing::debug;

use crate::cli::args::OptionOverrides;
use crate::config::{load_handoff, validate, Handoff};
use crate::error::Result;

/// Load a handoff, apply CLI overrides and validate the result.
pub(crate) fn load_checked(path: &Path, overrides: &OptionOverrides) -> Result<Handoff> {
    let mut handoff = load_handoff(path)?;
    overrides.apply(&mut handoff.options);
    validate(&handoff)?;
    debug!(
        "Loaded handoff {} for sample {}",
        path.display(),
        handoff.sample.name
    );
    Ok(handoff)
}
