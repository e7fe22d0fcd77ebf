//! Handoff document schema.
//!
//! A handoff describes one unit of work: the project a sample belongs
//! to, the sample itself and the run options. It maps to a YAML file
//! with `project`, `sample` and `options` sections.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root of a handoff document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Handoff {
    /// Project-wide references and locations.
    pub project: ProjectConfig,

    /// The sample to process.
    pub sample: SampleConfig,

    /// Run options.
    #[serde(default)]
    pub options: RunSettings,
}

/// Project configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name.
    pub name: String,

    /// Project root directory.
    pub root: String,

    /// Directory holding track hub files. Defaults to `${project_root}/html`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_dir: Option<String>,

    /// Public base URL the project is served from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Adapter sequences for trimming.
    pub adapters: String,

    /// Aligner index prefix per genome.
    pub genomes: BTreeMap<String, String>,

    /// Chromosome size table per genome.
    pub chrom_sizes: BTreeMap<String, String>,

    /// Genome window BED file per genome (coverage step only).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub genome_windows: BTreeMap<String, String>,
}

/// Raw input reads: one unmapped BAM or several technical replicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawInput {
    /// A single file.
    Single(String),

    /// Several files to be merged first.
    Multiple(Vec<String>),
}

impl RawInput {
    /// All raw files.
    pub fn files(&self) -> Vec<&str> {
        match self {
            RawInput::Single(path) => vec![path.as_str()],
            RawInput::Multiple(paths) => paths.iter().map(String::as_str).collect(),
        }
    }

    /// Whether the input needs merging before anything else runs.
    ///
    /// A one-element list is treated like a single file.
    pub fn needs_merge(&self) -> bool {
        matches!(self, RawInput::Multiple(paths) if paths.len() > 1)
    }
}

/// Sample descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleConfig {
    /// Sample name.
    pub name: String,

    /// Genome identifier (key into the project genome maps).
    pub genome: String,

    /// Paired-end sequencing.
    #[serde(default)]
    pub paired: bool,

    /// Tagmented library (reads get shifted).
    #[serde(default)]
    pub tagmented: bool,

    /// Sample output root. Defaults to `${project_root}/samples/${sample_name}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    /// Unmapped input reads.
    pub unmapped_bam: RawInput,

    /// Public URL of the signal track (track hub step only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_url: Option<String>,

    /// Track colour as `r,g,b`.
    #[serde(default = "default_track_colour")]
    pub track_colour: String,

    /// Overrides for the sample layout path templates.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub paths: BTreeMap<String, String>,
}

fn default_track_colour() -> String {
    "0,0,0".to_string()
}

/// Trimming tool choice.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Trimmer {
    /// Trimmomatic (separate unpaired outputs per mate).
    #[default]
    Trimmomatic,

    /// Skewer.
    Skewer,
}

impl std::fmt::Display for Trimmer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trimmer::Trimmomatic => write!(f, "trimmomatic"),
            Trimmer::Skewer => write!(f, "skewer"),
        }
    }
}

/// Run options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Keep every intermediate file and the handoff after success.
    pub dry_run: bool,

    /// Trimming tool.
    pub trimmer: Trimmer,

    /// Threads given to multi-threaded tools.
    pub cpus: u32,

    /// Minimum mapping quality kept by the filter step.
    pub quality: u32,

    /// Maximum fragment length accepted by the aligner.
    pub max_insert: u32,

    /// Bound on lock waits in seconds. Zero fails immediately.
    pub lock_timeout_secs: u64,

    /// Lock namespace directory. Defaults to `${project_root}/.locks`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_dir: Option<String>,

    /// Fail steps that exit zero without producing their outputs.
    pub verify_outputs: bool,

    /// Register the signal track in the project track hub.
    pub track_hub: bool,

    /// Compute genome-wide coverage.
    pub coverage: bool,

    /// Estimate signal/noise (NSC/RSC).
    pub signal_noise: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            dry_run: false,
            trimmer: Trimmer::default(),
            cpus: 4,
            quality: 30,
            max_insert: 2000,
            lock_timeout_secs: 6 * 60 * 60,
            lock_dir: None,
            verify_outputs: true,
            track_hub: false,
            coverage: false,
            signal_noise: false,
        }
    }
}
