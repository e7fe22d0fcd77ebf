//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::schema::{RunSettings, Trimmer};

/// ATAC-seq sample pipeline.
#[derive(Debug, Parser)]
#[command(name = "atacseq")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Process the sample described by a handoff file
    Run(RunArgs),

    /// Show the resolved step list without running anything
    Plan(PlanArgs),
}

/// Run option overrides shared by `run` and `plan`.
///
/// Anything given here replaces the handoff's `options` value.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct OptionOverrides {
    /// Keep intermediates and the handoff file after success
    #[arg(long)]
    pub dry_run: bool,

    /// Adapter trimming tool
    #[arg(long, value_enum)]
    pub trimmer: Option<Trimmer>,

    /// Threads for multi-threaded tools
    #[arg(long, value_name = "N")]
    pub cpus: Option<u32>,

    /// Minimum mapping quality kept by filtering
    #[arg(long, value_name = "Q")]
    pub quality: Option<u32>,

    /// Maximum fragment length accepted by the aligner
    #[arg(long, value_name = "BP")]
    pub max_insert: Option<u32>,

    /// Seconds to wait for a held lock (0 fails immediately)
    #[arg(long, value_name = "SECS")]
    pub lock_timeout: Option<u64>,

    /// Directory holding lock files
    #[arg(long, value_name = "DIR", env = "ATACSEQ_LOCK_DIR")]
    pub lock_dir: Option<PathBuf>,

    /// Accept a zero exit even if declared outputs are missing
    #[arg(long)]
    pub no_verify_outputs: bool,
}

impl OptionOverrides {
    /// Apply the overrides to handoff options.
    pub fn apply(&self, settings: &mut RunSettings) {
        if self.dry_run {
            settings.dry_run = true;
        }
        if let Some(trimmer) = self.trimmer {
            settings.trimmer = trimmer;
        }
        if let Some(cpus) = self.cpus {
            settings.cpus = cpus;
        }
        if let Some(quality) = self.quality {
            settings.quality = quality;
        }
        if let Some(max_insert) = self.max_insert {
            settings.max_insert = max_insert;
        }
        if let Some(timeout) = self.lock_timeout {
            settings.lock_timeout_secs = timeout;
        }
        if let Some(dir) = &self.lock_dir {
            settings.lock_dir = Some(dir.display().to_string());
        }
        if self.no_verify_outputs {
            settings.verify_outputs = false;
        }
    }
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, clap::Args)]
pub struct RunArgs {
    /// Handoff YAML describing project, sample and options
    pub handoff: PathBuf,

    #[command(flatten)]
    pub overrides: OptionOverrides,

    /// Delete the handoff file after a successful run
    #[arg(long)]
    pub consume_handoff: bool,

    /// Write a JSON run summary to this path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

/// Arguments for the `plan` command.
#[derive(Debug, Clone, clap::Args)]
pub struct PlanArgs {
    /// Handoff YAML describing project, sample and options
    pub handoff: PathBuf,

    #[command(flatten)]
    pub overrides: OptionOverrides,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_parses_overrides() {
        let cli = Cli::try_parse_from([
            "atacseq",
            "run",
            "S1.yml",
            "--trimmer",
            "skewer",
            "--cpus",
            "8",
            "--lock-timeout",
            "0",
            "--report",
            "out.json",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.handoff, PathBuf::from("S1.yml"));
        assert_eq!(args.overrides.trimmer, Some(Trimmer::Skewer));
        assert_eq!(args.report, Some(PathBuf::from("out.json")));

        let mut settings = RunSettings::default();
        args.overrides.apply(&mut settings);
        assert_eq!(settings.cpus, 8);
        assert_eq!(settings.lock_timeout_secs, 0);
        assert_eq!(settings.trimmer, Trimmer::Skewer);
        assert_eq!(settings.quality, 30);
    }

    #[test]
    fn overrides_leave_unset_options_alone() {
        let mut settings = RunSettings {
            dry_run: true,
            cpus: 2,
            ..Default::default()
        };
        OptionOverrides::default().apply(&mut settings);
        assert!(settings.dry_run);
        assert_eq!(settings.cpus, 2);
        assert!(settings.verify_outputs);
    }

    #[test]
    fn plan_accepts_json_flag() {
        let cli = Cli::try_parse_from(["atacseq", "plan", "S1.yml", "--json", "--debug"]).unwrap();
        assert!(cli.debug);
        assert!(matches!(cli.command, Commands::Plan(PlanArgs { json: true, .. })));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["atacseq"]).is_err());
    }
}
