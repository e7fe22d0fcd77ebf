//! Sample file layout.
//!
//! Every file a sample run reads or writes is derived from a path
//! template expanded against the sample (`${sample_root}`,
//! `${sample_name}`, `${genome}`). Templates can be overridden per sample
//! through the handoff's `sample.paths` map.

use crate::config::interpolation::{resolve_string, InterpolationContext};
use crate::config::schema::SampleConfig;
use crate::error::{PipelineError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default path templates, keyed by layout field.
const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    ("merged", "${sample_root}/unmapped/${sample_name}.bam"),
    ("fastqc", "${sample_root}/${sample_name}_fastqc.zip"),
    ("fastq", "${sample_root}/unmapped/${sample_name}.fastq"),
    ("fastq1", "${sample_root}/unmapped/${sample_name}.1.fastq"),
    ("fastq2", "${sample_root}/unmapped/${sample_name}.2.fastq"),
    ("fastq_unpaired", "${sample_root}/unmapped/${sample_name}.unpaired.fastq"),
    ("trimmed", "${sample_root}/unmapped/${sample_name}.trimmed.fastq"),
    ("trimmed1", "${sample_root}/unmapped/${sample_name}.1.trimmed.fastq"),
    ("trimmed2", "${sample_root}/unmapped/${sample_name}.2.trimmed.fastq"),
    ("trimmed1_unpaired", "${sample_root}/unmapped/${sample_name}.1_unpaired.trimmed.fastq"),
    ("trimmed2_unpaired", "${sample_root}/unmapped/${sample_name}.2_unpaired.trimmed.fastq"),
    ("trim_log", "${sample_root}/${sample_name}.trimlog.txt"),
    ("mapped", "${sample_root}/mapped/${sample_name}.trimmed.bowtie2.bam"),
    ("aln_rates", "${sample_root}/${sample_name}.alnRates.txt"),
    ("aln_metrics", "${sample_root}/${sample_name}.alnMetrics.txt"),
    ("filtered", "${sample_root}/mapped/${sample_name}.trimmed.bowtie2.filtered.bam"),
    ("dups_metrics", "${sample_root}/${sample_name}.duplicates.txt"),
    (
        "filtered_shifted",
        "${sample_root}/mapped/${sample_name}.trimmed.bowtie2.filtered.shifted.bam",
    ),
    ("bigwig", "${sample_root}/${sample_name}.bigWig"),
    ("insert_plot", "${sample_root}/${sample_name}_insertLengths.pdf"),
    ("insert_data", "${sample_root}/${sample_name}_insertLengths.csv"),
    ("coverage", "${sample_root}/coverage/${sample_name}.cov"),
    ("qc", "${sample_root}/${sample_name}_qc.tsv"),
    ("qc_plot", "${sample_root}/${sample_name}_qc.pdf"),
    ("peaks_dir", "${sample_root}/peaks"),
    ("peaks", "${sample_root}/peaks/${sample_name}_peaks.narrowPeak"),
    ("frip", "${sample_root}/${sample_name}_FRiP.txt"),
];

/// Resolved paths for one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleLayout {
    pub root: PathBuf,
    pub unmapped_dir: PathBuf,
    pub merged: PathBuf,
    pub fastqc: PathBuf,
    pub fastq: PathBuf,
    pub fastq1: PathBuf,
    pub fastq2: PathBuf,
    pub fastq_unpaired: PathBuf,
    pub trimmed: PathBuf,
    pub trimmed1: PathBuf,
    pub trimmed2: PathBuf,
    pub trimmed1_unpaired: PathBuf,
    pub trimmed2_unpaired: PathBuf,
    pub trim_log: PathBuf,
    pub mapped: PathBuf,
    pub aln_rates: PathBuf,
    pub aln_metrics: PathBuf,
    pub filtered: PathBuf,
    pub dups_metrics: PathBuf,
    pub filtered_shifted: PathBuf,
    pub bigwig: PathBuf,
    pub insert_plot: PathBuf,
    pub insert_data: PathBuf,
    pub coverage: PathBuf,
    pub qc: PathBuf,
    pub qc_plot: PathBuf,
    pub peaks_dir: PathBuf,
    pub peaks: PathBuf,
    pub frip: PathBuf,
}

impl SampleLayout {
    /// Expand the layout for `sample`.
    ///
    /// `sample.root` must already be resolved (see
    /// [`resolve_handoff`](crate::config::resolve_handoff)).
    pub fn resolve(sample: &SampleConfig, base: &InterpolationContext) -> Result<Self> {
        let root = sample
            .root
            .clone()
            .ok_or_else(|| PipelineError::ConfigValidationError {
                message: format!("Sample '{}' has no root directory", sample.name),
            })?;

        if let Some(unknown) = sample
            .paths
            .keys()
            .find(|k| !DEFAULT_TEMPLATES.iter().any(|(name, _)| *name == k.as_str()))
        {
            return Err(PipelineError::ConfigValidationError {
                message: format!("Unknown sample path '{}'", unknown),
            });
        }

        let ctx = base
            .clone()
            .with_var("sample_name", sample.name.clone())
            .with_var("sample_root", root.clone())
            .with_var("genome", sample.genome.clone());

        let mut resolved = BTreeMap::new();
        for (name, template) in DEFAULT_TEMPLATES {
            let template = sample
                .paths
                .get(*name)
                .map(String::as_str)
                .unwrap_or(*template);
            resolved.insert(*name, PathBuf::from(resolve_string(template, &ctx)?));
        }
        let mut take = |name: &str| resolved.remove(name).unwrap_or_default();

        let merged = take("merged");
        Ok(Self {
            root: PathBuf::from(&root),
            unmapped_dir: merged
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(&root)),
            merged,
            fastqc: take("fastqc"),
            fastq: take("fastq"),
            fastq1: take("fastq1"),
            fastq2: take("fastq2"),
            fastq_unpaired: take("fastq_unpaired"),
            trimmed: take("trimmed"),
            trimmed1: take("trimmed1"),
            trimmed2: take("trimmed2"),
            trimmed1_unpaired: take("trimmed1_unpaired"),
            trimmed2_unpaired: take("trimmed2_unpaired"),
            trim_log: take("trim_log"),
            mapped: take("mapped"),
            aln_rates: take("aln_rates"),
            aln_metrics: take("aln_metrics"),
            filtered: take("filtered"),
            dups_metrics: take("dups_metrics"),
            filtered_shifted: take("filtered_shifted"),
            bigwig: take("bigwig"),
            insert_plot: take("insert_plot"),
            insert_data: take("insert_data"),
            coverage: take("coverage"),
            qc: take("qc"),
            qc_plot: take("qc_plot"),
            peaks_dir: take("peaks_dir"),
            peaks: take("peaks"),
            frip: take("frip"),
        })
    }
}
