//! Disposal of intermediate artifacts.
//!
//! Steps register the intermediates they produce; the registry is drained
//! once when the sample finishes. Deleting is best-effort: a file that is
//! already gone is fine and a file that cannot be removed is logged.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::PipelineError;

/// One registered artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disposal {
    pub path: PathBuf,
    /// Delete only after a successful run outside dry-run.
    pub conditional: bool,
}

/// How the run ended, as far as cleanup is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    /// Every step succeeded (or failed tolerably).
    Succeeded { dry_run: bool },
    /// The run aborted.
    Aborted,
}

/// Ordered set of artifacts to delete at the end of a run.
#[derive(Debug, Default)]
pub struct DisposalRegistry {
    entries: Vec<Disposal>,
}

impl DisposalRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an artifact. Registering the same path twice keeps the
    /// first entry.
    pub fn add(&mut self, path: impl Into<PathBuf>, conditional: bool) {
        let path = path.into();
        if self.entries.iter().any(|e| e.path == path) {
            return;
        }
        self.entries.push(Disposal { path, conditional });
    }

    /// Register an artifact for deletion after a successful, non-dry run.
    pub fn add_conditional(&mut self, path: impl Into<PathBuf>) {
        self.add(path, true);
    }

    /// Registered entries, in registration order.
    pub fn entries(&self) -> &[Disposal] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Delete what the run's outcome allows and consume the registry.
    ///
    /// Aborted runs delete nothing. Dry runs delete only unconditional
    /// entries.
    pub fn drain(self, end: RunEnd) -> CleanupReport {
        let mut report = CleanupReport::default();

        for entry in self.entries {
            let delete = match end {
                RunEnd::Aborted => false,
                RunEnd::Succeeded { dry_run } => !(entry.conditional && dry_run),
            };
            if !delete {
                report.kept.push(entry.path);
                continue;
            }

            match remove_path(&entry.path) {
                Ok(true) => {
                    debug!("Removed {}", entry.path.display());
                    report.removed.push(entry.path);
                }
                Ok(false) => report.missing.push(entry.path),
                Err(e) => {
                    let failure = PipelineError::CleanupFailure {
                        path: entry.path.clone(),
                        message: e.to_string(),
                    };
                    warn!("{}", failure);
                    report.failed.push(entry.path);
                }
            }
        }

        report
    }
}

/// Remove a file or directory. `Ok(false)` if it did not exist.
fn remove_path(path: &Path) -> io::Result<bool> {
    let removed = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    match removed {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// What the cleanup phase did.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    /// Registered but already absent.
    pub missing: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
    /// Left in place because of the run's outcome.
    pub kept: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn registry_with(temp: &TempDir, names: &[&str]) -> (DisposalRegistry, Vec<PathBuf>) {
        let mut registry = DisposalRegistry::new();
        let paths: Vec<PathBuf> = names.iter().map(|n| temp.path().join(n)).collect();
        for path in &paths {
            fs::write(path, "x").unwrap();
            registry.add_conditional(path);
        }
        (registry, paths)
    }

    #[test]
    fn success_deletes_conditional_entries() {
        let temp = TempDir::new().unwrap();
        let (registry, paths) = registry_with(&temp, &["a.fastq", "b.fastq"]);

        let report = registry.drain(RunEnd::Succeeded { dry_run: false });

        assert_eq!(report.removed.len(), 2);
        assert!(paths.iter().all(|p| !p.exists()));
    }

    #[test]
    fn dry_run_deletes_nothing_conditional() {
        let temp = TempDir::new().unwrap();
        let (registry, paths) = registry_with(&temp, &["a.fastq"]);

        let report = registry.drain(RunEnd::Succeeded { dry_run: true });

        assert!(report.removed.is_empty());
        assert_eq!(report.kept, paths);
        assert!(paths[0].exists());
    }

    #[test]
    fn dry_run_still_deletes_unconditional_entries() {
        let temp = TempDir::new().unwrap();
        let scratch = temp.path().join("scratch.tmp");
        fs::write(&scratch, "x").unwrap();
        let mut registry = DisposalRegistry::new();
        registry.add(&scratch, false);

        let report = registry.drain(RunEnd::Succeeded { dry_run: true });
        assert_eq!(report.removed, vec![scratch.clone()]);
        assert!(!scratch.exists());
    }

    #[test]
    fn aborted_run_deletes_nothing() {
        let temp = TempDir::new().unwrap();
        let (mut registry, paths) = registry_with(&temp, &["a.fastq"]);
        registry.add(temp.path().join("b.tmp"), false);

        let report = registry.drain(RunEnd::Aborted);

        assert_eq!(report.kept.len(), 2);
        assert!(paths[0].exists());
    }

    #[test]
    fn missing_artifacts_are_not_errors() {
        let temp = TempDir::new().unwrap();
        let mut registry = DisposalRegistry::new();
        registry.add_conditional(temp.path().join("never-made.bam"));

        let report = registry.drain(RunEnd::Succeeded { dry_run: false });

        assert_eq!(report.missing.len(), 1);
        assert!(report.failed.is_empty());
    }

    #[test]
    fn duplicate_registration_is_ignored() {
        let mut registry = DisposalRegistry::new();
        registry.add_conditional("/x/a.bam");
        registry.add_conditional("/x/a.bam");
        registry.add("/x/a.bam", false);

        assert_eq!(registry.len(), 1);
        assert!(registry.entries()[0].conditional);
    }

    #[test]
    fn directories_are_removed() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("tmpdir");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("f"), "x").unwrap();
        let mut registry = DisposalRegistry::new();
        registry.add_conditional(&dir);

        let report = registry.drain(RunEnd::Succeeded { dry_run: false });
        assert_eq!(report.removed, vec![dir.clone()]);
        assert!(!dir.exists());
    }
}
