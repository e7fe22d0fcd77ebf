//! Step descriptor.
//!
//! A [`Step`] is one external command plus the artifacts that witness its
//! completion. Steps are built by the workflow driver immediately before
//! execution and are never persisted.

use crate::shell::CommandSpec;
use crate::tools::ToolCommand;
use std::path::{Path, PathBuf};

/// A unit of work ready for the executor.
#[derive(Debug, Clone)]
pub struct Step {
    /// Short machine name (e.g. `align`).
    pub name: String,

    /// Progress marker shown when the step starts.
    pub title: String,

    /// Command to execute.
    pub command: CommandSpec,

    /// Declared outputs. The first entry is the primary artifact.
    pub outputs: Vec<PathBuf>,

    /// Artifacts that must exist before the command runs.
    pub inputs: Vec<PathBuf>,

    /// Explicit lock id. Defaults to the primary artifact path.
    pub lock_id: Option<String>,

    /// Log failures and continue instead of aborting the workflow.
    pub nofail: bool,
}

impl Step {
    /// Create a step with no declared artifacts.
    pub fn new(name: impl Into<String>, command: CommandSpec) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            name,
            command,
            outputs: Vec::new(),
            inputs: Vec::new(),
            lock_id: None,
            nofail: false,
        }
    }

    /// Create a step from a catalog command, using its primary artifact
    /// (if any) as the first declared output.
    pub fn from_tool(name: impl Into<String>, tool: ToolCommand) -> Self {
        let mut step = Self::new(name, tool.command);
        step.outputs.extend(tool.primary);
        step
    }

    /// Set the progress marker.
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Declare an additional output artifact.
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.outputs.push(path.into());
        self
    }

    /// Declare an input artifact.
    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.inputs.push(path.into());
        self
    }

    /// Declare several input artifacts.
    pub fn inputs<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.inputs.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Use an explicit lock id instead of the primary artifact path.
    pub fn locked_by(mut self, id: impl Into<String>) -> Self {
        self.lock_id = Some(id.into());
        self
    }

    /// Mark this step as best-effort.
    pub fn best_effort(mut self) -> Self {
        self.nofail = true;
        self
    }

    /// The completion witness, if any.
    pub fn primary_output(&self) -> Option<&Path> {
        self.outputs.first().map(PathBuf::as_path)
    }

    /// Whether the command runs through the shell.
    pub fn shell(&self) -> bool {
        self.command.is_shell()
    }

    /// Name of the lock guarding this step.
    ///
    /// Explicit id, else the primary artifact path, else the step name.
    pub fn resolved_lock_id(&self) -> String {
        if let Some(id) = &self.lock_id {
            return id.clone();
        }
        match self.primary_output() {
            Some(path) => path.display().to_string(),
            None => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_id_defaults_to_primary_output() {
        let step = Step::new("align", CommandSpec::shell("true"))
            .output("/data/s1/mapped.bam")
            .output("/data/s1/mapped.log");
        assert_eq!(step.resolved_lock_id(), "/data/s1/mapped.bam");
        assert_eq!(step.primary_output(), Some(Path::new("/data/s1/mapped.bam")));
    }

    #[test]
    fn explicit_lock_id_wins() {
        let step = Step::new("hub", CommandSpec::shell("true"))
            .output("/x")
            .locked_by("s1addToTrackHub");
        assert_eq!(step.resolved_lock_id(), "s1addToTrackHub");
    }

    #[test]
    fn lock_id_falls_back_to_name() {
        let step = Step::new("hub", CommandSpec::shell("true"));
        assert_eq!(step.resolved_lock_id(), "hub");
        assert!(step.primary_output().is_none());
    }

    #[test]
    fn from_tool_uses_primary_artifact() {
        let tool = ToolCommand {
            command: CommandSpec::argv(["samtools", "index", "a.bam"]),
            primary: Some(PathBuf::from("a.bam.bai")),
        };
        let step = Step::from_tool("index", tool).best_effort();
        assert_eq!(step.outputs, vec![PathBuf::from("a.bam.bai")]);
        assert!(!step.shell());
        assert!(step.nofail);
        assert_eq!(step.title, "index");
    }
}
