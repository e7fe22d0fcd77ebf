//! Execution plan.
//!
//! Every branch decision for a sample is taken once, here, from the
//! handoff: replicate merging, read layout, trimming tool, tagmentation
//! and the optional steps. The workflow driver only reads the plan.

use std::path::{Path, PathBuf};

use crate::config::interpolation::InterpolationContext;
use crate::config::schema::{Handoff, Trimmer};
use crate::error::{PipelineError, Result};
use crate::sample::SampleLayout;
use crate::tools::{track_hub_link, ReadPaths, ToolRequest};

/// Track hub locations for a sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubTarget {
    /// Hub file the sample track is appended to.
    pub hub_file: PathBuf,
    /// Public URL of the hub file.
    pub hub_url: String,
    /// Page linking the hub into the genome browser.
    pub link_page: PathBuf,
    /// Public URL of the sample's signal track.
    pub track_url: String,
    /// Track colour as `r,g,b`.
    pub colour: String,
}

/// Something done in-process once a step has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostAction {
    /// Write `contents` to `path`, replacing it.
    WriteFile { path: PathBuf, contents: String },
}

/// One entry of the ordered step list.
#[derive(Debug, Clone)]
pub struct PlannedStep {
    /// Machine name.
    pub name: &'static str,
    /// Progress marker.
    pub title: &'static str,
    /// Tool invocation.
    pub request: ToolRequest,
    /// Failure is logged and the workflow continues.
    pub nofail: bool,
    /// Lock id overriding the primary artifact path.
    pub lock_id: Option<String>,
    /// Intermediate artifacts to delete once the sample is done.
    pub disposals: Vec<PathBuf>,
    /// In-process follow-up.
    pub after: Option<PostAction>,
}

impl PlannedStep {
    fn new(name: &'static str, title: &'static str, request: ToolRequest) -> Self {
        Self {
            name,
            title,
            request,
            nofail: false,
            lock_id: None,
            disposals: Vec::new(),
            after: None,
        }
    }

    fn best_effort(mut self) -> Self {
        self.nofail = true;
        self
    }

    fn dispose<I: IntoIterator<Item = PathBuf>>(mut self, paths: I) -> Self {
        self.disposals.extend(paths);
        self
    }
}

/// Branch decisions and resolved paths for one sample.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    /// Sample name.
    pub sample_name: String,
    /// Genome identifier.
    pub genome: String,
    /// Paired-end reads.
    pub paired: bool,
    /// Tagmented library; reads get shifted.
    pub tagmented: bool,
    /// Adapter trimming tool.
    pub trimmer: Trimmer,
    /// Keep intermediates and the handoff after success.
    pub dry_run: bool,

    /// Replicates to merge before anything else.
    pub merge_inputs: Option<Vec<PathBuf>>,
    /// Unmapped BAM every later step reads from.
    pub input_bam: PathBuf,

    /// Reads converted from the input BAM.
    pub fastq: ReadPaths,
    /// Singleton reads from paired conversion.
    pub fastq_unpaired: Option<PathBuf>,

    /// Reads after adapter trimming.
    pub trimmed: ReadPaths,
    /// Trimmomatic orphans per mate.
    pub trimmed_unpaired: Option<(PathBuf, PathBuf)>,

    /// BAM read by track, coverage and peak steps.
    pub analysis_bam: PathBuf,

    /// Every per-sample path.
    pub layout: SampleLayout,

    /// Adapter sequences for trimming.
    pub adapters: PathBuf,
    /// Aligner index prefix.
    pub genome_index: PathBuf,
    /// Chromosome sizes file.
    pub chrom_sizes: PathBuf,
    /// Windows for genome-wide coverage, when enabled.
    pub genome_windows: Option<PathBuf>,
    /// Track hub registration, when enabled.
    pub hub: Option<HubTarget>,

    /// Threads for multi-threaded tools.
    pub cpus: u32,
    /// Minimum mapping quality kept by filtering.
    pub quality: u32,
    /// Maximum fragment length accepted by the aligner.
    pub max_insert: u32,
    /// Run the signal/noise estimator.
    pub signal_noise: bool,

    /// Directory holding the lock namespace.
    pub lock_dir: PathBuf,
}

impl ExecutionPlan {
    /// Resolve the plan for a loaded handoff.
    ///
    /// The handoff must already have passed validation; missing genome
    /// references are still reported as configuration errors.
    pub fn resolve(handoff: &Handoff, base: &InterpolationContext) -> Result<Self> {
        let project = &handoff.project;
        let sample = &handoff.sample;
        let options = &handoff.options;

        let ctx = base
            .clone()
            .with_var("project_name", project.name.clone())
            .with_var("project_root", project.root.clone());
        let layout = SampleLayout::resolve(sample, &ctx)?;

        let reference = |map: &std::collections::BTreeMap<String, String>, what: &str| {
            map.get(&sample.genome)
                .map(PathBuf::from)
                .ok_or_else(|| PipelineError::ConfigValidationError {
                    message: format!("No {} configured for genome '{}'", what, sample.genome),
                })
        };
        let genome_index = reference(&project.genomes, "aligner index")?;
        let chrom_sizes = reference(&project.chrom_sizes, "chromosome sizes")?;
        let genome_windows = if options.coverage {
            Some(reference(&project.genome_windows, "genome windows")?)
        } else {
            None
        };

        let (merge_inputs, input_bam) = if sample.unmapped_bam.needs_merge() {
            let inputs = sample
                .unmapped_bam
                .files()
                .into_iter()
                .map(PathBuf::from)
                .collect();
            (Some(inputs), layout.merged.clone())
        } else {
            let file = sample.unmapped_bam.files().first().copied().ok_or_else(|| {
                PipelineError::ConfigValidationError {
                    message: format!("Sample '{}' declares no unmapped input", sample.name),
                }
            })?;
            (None, PathBuf::from(file))
        };

        let (fastq, fastq_unpaired, trimmed) = if sample.paired {
            (
                ReadPaths::Paired(layout.fastq1.clone(), layout.fastq2.clone()),
                Some(layout.fastq_unpaired.clone()),
                ReadPaths::Paired(layout.trimmed1.clone(), layout.trimmed2.clone()),
            )
        } else {
            (
                ReadPaths::Single(layout.fastq.clone()),
                None,
                ReadPaths::Single(layout.trimmed.clone()),
            )
        };
        let trimmed_unpaired = (sample.paired && options.trimmer == Trimmer::Trimmomatic)
            .then(|| {
                (
                    layout.trimmed1_unpaired.clone(),
                    layout.trimmed2_unpaired.clone(),
                )
            });

        let analysis_bam = if sample.tagmented {
            layout.filtered_shifted.clone()
        } else {
            layout.filtered.clone()
        };

        let hub = if options.track_hub {
            Some(hub_target(handoff)?)
        } else {
            None
        };

        let lock_dir = options
            .lock_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| Path::new(&project.root).join(".locks"));

        Ok(Self {
            sample_name: sample.name.clone(),
            genome: sample.genome.clone(),
            paired: sample.paired,
            tagmented: sample.tagmented,
            trimmer: options.trimmer,
            dry_run: options.dry_run,
            merge_inputs,
            input_bam,
            fastq,
            fastq_unpaired,
            trimmed,
            trimmed_unpaired,
            analysis_bam,
            layout,
            adapters: PathBuf::from(&project.adapters),
            genome_index,
            chrom_sizes,
            genome_windows,
            hub,
            cpus: options.cpus,
            quality: options.quality,
            max_insert: options.max_insert,
            signal_noise: options.signal_noise,
            lock_dir,
        })
    }

    /// The ordered step list for this sample.
    pub fn steps(&self) -> Vec<PlannedStep> {
        let layout = &self.layout;
        let mut steps = Vec::new();

        if let Some(inputs) = &self.merge_inputs {
            steps.push(
                PlannedStep::new(
                    "merge",
                    "Merging bam files from replicates",
                    ToolRequest::MergeBams {
                        inputs: inputs.clone(),
                        output: layout.merged.clone(),
                    },
                )
                .dispose([layout.merged.clone()]),
            );
        }

        steps.push(PlannedStep::new(
            "fastqc",
            "Measuring sample quality with Fastqc",
            ToolRequest::Fastqc {
                input: self.input_bam.clone(),
                output: layout.fastqc.clone(),
            },
        ));

        let converted: Vec<PathBuf> = self
            .fastq
            .paths()
            .into_iter()
            .map(Path::to_path_buf)
            .chain(self.fastq_unpaired.clone())
            .collect();
        steps.push(
            PlannedStep::new(
                "bam_to_fastq",
                "Converting to Fastq format",
                ToolRequest::BamToFastq {
                    input: self.input_bam.clone(),
                    output: self.fastq.clone(),
                    unpaired: self.fastq_unpaired.clone(),
                },
            )
            .dispose(converted),
        );

        steps.push(self.trim_step());

        steps.push(
            PlannedStep::new(
                "align",
                "Mapping reads with Bowtie2",
                ToolRequest::Bowtie2Map {
                    input: self.trimmed.clone(),
                    output: layout.mapped.clone(),
                    log: layout.aln_rates.clone(),
                    metrics: layout.aln_metrics.clone(),
                    index: self.genome_index.clone(),
                    max_insert: self.max_insert,
                    cpus: self.cpus,
                },
            )
            .dispose([layout.mapped.clone()]),
        );

        steps.push(PlannedStep::new(
            "filter",
            "Filtering reads for quality",
            ToolRequest::FilterReads {
                input: layout.mapped.clone(),
                output: layout.filtered.clone(),
                metrics: layout.dups_metrics.clone(),
                paired: self.paired,
                quality: self.quality,
                cpus: self.cpus,
            },
        ));

        if self.tagmented {
            steps.push(PlannedStep::new(
                "shift",
                "Shifting reads of tagmented sample",
                ToolRequest::ShiftReads {
                    input: layout.filtered.clone(),
                    output: layout.filtered_shifted.clone(),
                    genome: self.genome.clone(),
                },
            ));
        }

        let mut indexed = vec![
            ("index_mapped", layout.mapped.clone()),
            ("index_filtered", layout.filtered.clone()),
        ];
        if self.tagmented {
            indexed.push(("index_shifted", layout.filtered_shifted.clone()));
        }
        for (name, bam) in indexed {
            steps.push(PlannedStep::new(
                name,
                "Indexing bamfiles with samtools",
                ToolRequest::IndexBam { input: bam },
            ));
        }

        steps.push(PlannedStep::new(
            "bigwig",
            "Making bigWig tracks from bam file",
            ToolRequest::BamToBigWig {
                input: self.analysis_bam.clone(),
                output: layout.bigwig.clone(),
                chrom_sizes: self.chrom_sizes.clone(),
            },
        ));

        if let Some(hub) = &self.hub {
            let mut step = PlannedStep::new(
                "track_hub",
                "Adding track to the project track hub",
                ToolRequest::AddTrackToHub {
                    sample_name: self.sample_name.clone(),
                    track_url: hub.track_url.clone(),
                    hub: hub.hub_file.clone(),
                    colour: hub.colour.clone(),
                },
            );
            step.lock_id = Some(format!("{}addToTrackHub", self.sample_name));
            step.after = Some(PostAction::WriteFile {
                path: hub.link_page.clone(),
                contents: track_hub_link(&hub.hub_url, &self.genome),
            });
            steps.push(step);
        }

        steps.push(
            PlannedStep::new(
                "insert_sizes",
                "Plotting insert size distribution",
                ToolRequest::InsertSizes {
                    input: layout.filtered.clone(),
                    plot: layout.insert_plot.clone(),
                    data: layout.insert_data.clone(),
                },
            )
            .best_effort(),
        );

        if let Some(windows) = &self.genome_windows {
            steps.push(PlannedStep::new(
                "coverage",
                "Calculating genome-wide coverage",
                ToolRequest::GenomeCoverage {
                    input: self.analysis_bam.clone(),
                    windows: windows.clone(),
                    output: layout.coverage.clone(),
                },
            ));
        }

        if self.signal_noise {
            steps.push(
                PlannedStep::new(
                    "signal_noise",
                    "Assessing signal/noise in sample",
                    ToolRequest::SignalNoise {
                        input: self.analysis_bam.clone(),
                        output: layout.qc.clone(),
                        plot: layout.qc_plot.clone(),
                        cpus: self.cpus,
                    },
                )
                .best_effort(),
            );
        }

        steps.push(PlannedStep::new(
            "call_peaks",
            "Calling peaks with MACS2",
            ToolRequest::CallPeaks {
                input: self.analysis_bam.clone(),
                output_dir: layout.peaks_dir.clone(),
                peaks: layout.peaks.clone(),
                sample_name: self.sample_name.clone(),
                genome: self.genome.clone(),
            },
        ));

        steps.push(PlannedStep::new(
            "frip",
            "Calculating fraction of reads in peaks (FRiP)",
            ToolRequest::Frip {
                input: self.analysis_bam.clone(),
                peaks: layout.peaks.clone(),
                output: layout.frip.clone(),
            },
        ));

        steps
    }

    fn trim_step(&self) -> PlannedStep {
        let layout = &self.layout;
        let request = match self.trimmer {
            Trimmer::Trimmomatic => ToolRequest::Trimmomatic {
                input: self.fastq.clone(),
                output: self.trimmed.clone(),
                unpaired: self.trimmed_unpaired.clone(),
                adapters: self.adapters.clone(),
                log: layout.trim_log.clone(),
                cpus: self.cpus,
            },
            Trimmer::Skewer => ToolRequest::Skewer {
                input: self.fastq.clone(),
                output: self.trimmed.clone(),
                prefix: layout.unmapped_dir.join(&self.sample_name),
                adapters: self.adapters.clone(),
                log: layout.trim_log.clone(),
                cpus: self.cpus,
            },
        };

        let mut disposals = Vec::new();
        match (&self.trimmed, &self.trimmed_unpaired) {
            (ReadPaths::Paired(first, second), Some((orphan1, orphan2))) => {
                disposals.extend([first.clone(), orphan1.clone(), second.clone(), orphan2.clone()]);
            }
            (trimmed, _) => {
                disposals.extend(trimmed.paths().into_iter().map(Path::to_path_buf));
            }
        }

        PlannedStep::new("trim", "Trimming adapters from sample", request).dispose(disposals)
    }
}

/// Marks the steps that need not run although their outputs are missing.
///
/// Cleanup removes the outputs of intermediate steps. Such a step is
/// settled when every later step reading its products is done, either
/// because its own primary output exists or because it is settled too.
/// Steps without disposals are never settled.
pub fn settled_steps(steps: &[PlannedStep]) -> Vec<bool> {
    let mut done = vec![false; steps.len()];
    let mut settled = vec![false; steps.len()];

    for index in (0..steps.len()).rev() {
        let step = &steps[index];
        if step.request.primary().is_some_and(|p| p.exists()) {
            done[index] = true;
            continue;
        }
        if step.disposals.is_empty() {
            continue;
        }

        let mut products = step.request.products();
        products.extend(step.disposals.iter().cloned());
        let readers: Vec<usize> = (index + 1..steps.len())
            .filter(|&later| {
                steps[later]
                    .request
                    .inputs()
                    .iter()
                    .any(|input| products.contains(input))
            })
            .collect();

        if !readers.is_empty() && readers.iter().all(|&reader| done[reader]) {
            settled[index] = true;
            done[index] = true;
        }
    }

    settled
}

fn hub_target(handoff: &Handoff) -> Result<HubTarget> {
    let project = &handoff.project;
    let sample = &handoff.sample;
    let missing = |what: &str| PipelineError::ConfigValidationError {
        message: format!("Track hub requested but {} is not set", what),
    };

    let url = project.url.as_deref().ok_or_else(|| missing("project 'url'"))?;
    let track_url = sample
        .track_url
        .clone()
        .ok_or_else(|| missing("sample 'track_url'"))?;

    let hub_name = format!("trackHub_{}.txt", sample.genome);
    let html_dir = project
        .html_dir
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(&project.root).join("html"));

    Ok(HubTarget {
        hub_file: html_dir.join(&hub_name),
        hub_url: [url.trim_end_matches('/'), project.name.as_str(), hub_name.as_str()].join("/"),
        link_page: Path::new(&project.root).join(format!("ucsc_tracks_{}.html", sample.genome)),
        track_url,
        colour: sample.track_colour.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ProjectConfig, RawInput, RunSettings, SampleConfig};

    fn handoff(paired: bool, tagmented: bool, raw: RawInput) -> Handoff {
        let mut project = ProjectConfig {
            name: "atac".into(),
            root: "/p".into(),
            adapters: "/refs/adapters.fa".into(),
            url: Some("http://host/projects/".into()),
            ..Default::default()
        };
        project.genomes.insert("hg19".into(), "/refs/hg19".into());
        project.chrom_sizes.insert("hg19".into(), "/refs/hg19.sizes".into());
        project.genome_windows.insert("hg19".into(), "/refs/hg19.windows.bed".into());

        Handoff {
            project,
            sample: SampleConfig {
                name: "S1".into(),
                genome: "hg19".into(),
                paired,
                tagmented,
                root: Some("/p/samples/S1".into()),
                unmapped_bam: raw,
                track_url: Some("http://host/S1.bigWig".into()),
                track_colour: "255,0,0".into(),
                paths: Default::default(),
            },
            options: RunSettings::default(),
        }
    }

    fn two_replicates() -> RawInput {
        RawInput::Multiple(vec!["/raw/a.bam".into(), "/raw/b.bam".into()])
    }

    fn plan(handoff: &Handoff) -> ExecutionPlan {
        ExecutionPlan::resolve(handoff, &InterpolationContext::new()).unwrap()
    }

    fn names(steps: &[PlannedStep]) -> Vec<&'static str> {
        steps.iter().map(|s| s.name).collect()
    }

    #[test]
    fn paired_tagmented_replicates_order() {
        let plan = plan(&handoff(true, true, two_replicates()));
        let steps = plan.steps();

        assert_eq!(
            names(&steps),
            vec![
                "merge",
                "fastqc",
                "bam_to_fastq",
                "trim",
                "align",
                "filter",
                "shift",
                "index_mapped",
                "index_filtered",
                "index_shifted",
                "bigwig",
                "insert_sizes",
                "call_peaks",
                "frip",
            ]
        );
        let disposals: usize = steps.iter().map(|s| s.disposals.len()).sum();
        assert_eq!(disposals, 9);
    }

    #[test]
    fn merged_bam_replaces_raw_input() {
        let plan = plan(&handoff(true, true, two_replicates()));
        assert_eq!(plan.input_bam, plan.layout.merged);

        let steps = plan.steps();
        let fastqc = steps.iter().find(|s| s.name == "fastqc").unwrap();
        assert_eq!(fastqc.request.inputs(), vec![plan.layout.merged.clone()]);
    }

    #[test]
    fn single_file_list_is_not_merged() {
        let plan = plan(&handoff(false, false, RawInput::Multiple(vec!["/raw/a.bam".into()])));
        assert!(plan.merge_inputs.is_none());
        assert_eq!(plan.input_bam, PathBuf::from("/raw/a.bam"));
        assert_ne!(plan.steps()[0].name, "merge");
    }

    #[test]
    fn untagmented_sample_uses_filtered_bam() {
        let plan = plan(&handoff(false, false, RawInput::Single("/raw/a.bam".into())));
        let steps = plan.steps();

        assert!(!names(&steps).contains(&"shift"));
        assert!(!names(&steps).contains(&"index_shifted"));
        assert_eq!(plan.analysis_bam, plan.layout.filtered);
        for name in ["bigwig", "call_peaks", "frip"] {
            let step = steps.iter().find(|s| s.name == name).unwrap();
            assert_eq!(step.request.inputs()[0], plan.layout.filtered);
        }
    }

    #[test]
    fn read_channels_follow_layout() {
        for (paired, channels) in [(true, 2), (false, 1)] {
            let plan = plan(&handoff(paired, false, RawInput::Single("/raw/a.bam".into())));
            let steps = plan.steps();
            let align = steps.iter().find(|s| s.name == "align").unwrap();
            assert_eq!(align.request.inputs().len(), channels);
            assert_eq!(plan.trimmed.channels(), channels);
        }
    }

    #[test]
    fn trimmer_changes_only_trim_step() {
        let mut h = handoff(true, true, two_replicates());
        let trimmomatic = plan(&h).steps();
        h.options.trimmer = Trimmer::Skewer;
        let skewer = plan(&h).steps();

        assert_eq!(names(&trimmomatic), names(&skewer));
        for (a, b) in trimmomatic.iter().zip(&skewer) {
            if a.name == "trim" {
                assert_ne!(a.request, b.request);
                assert_eq!(a.disposals.len(), 4);
                assert_eq!(b.disposals.len(), 2);
                assert_eq!(a.request.primary(), b.request.primary());
            } else {
                assert_eq!(a.request, b.request);
                assert_eq!(a.disposals, b.disposals);
            }
        }
    }

    #[test]
    fn deliverables_are_never_disposed() {
        let plan = plan(&handoff(true, true, two_replicates()));
        let disposed: Vec<PathBuf> = plan.steps().into_iter().flat_map(|s| s.disposals).collect();

        for deliverable in [
            &plan.layout.bigwig,
            &plan.layout.peaks,
            &plan.layout.filtered,
            &plan.layout.filtered_shifted,
        ] {
            assert!(!disposed.contains(deliverable));
        }
        assert!(!disposed.iter().any(|p| p.to_string_lossy().ends_with(".bai")));
    }

    #[test]
    fn optional_steps_slot_in_order() {
        let mut h = handoff(true, true, two_replicates());
        h.options.track_hub = true;
        h.options.coverage = true;
        h.options.signal_noise = true;
        let plan = plan(&h);
        let steps = plan.steps();
        let order = names(&steps);

        let pos = |n: &str| order.iter().position(|s| *s == n).unwrap();
        assert!(pos("bigwig") < pos("track_hub"));
        assert!(pos("track_hub") < pos("insert_sizes"));
        assert!(pos("insert_sizes") < pos("coverage"));
        assert!(pos("coverage") < pos("signal_noise"));
        assert!(pos("signal_noise") < pos("call_peaks"));

        let hub = &steps[pos("track_hub")];
        assert_eq!(hub.lock_id.as_deref(), Some("S1addToTrackHub"));
        assert!(hub.request.primary().is_none());
        assert!(steps[pos("signal_noise")].nofail);
    }

    #[test]
    fn hub_target_paths() {
        let mut h = handoff(false, false, RawInput::Single("/raw/a.bam".into()));
        h.options.track_hub = true;
        let hub = plan(&h).hub.unwrap();

        assert_eq!(hub.hub_file, PathBuf::from("/p/html/trackHub_hg19.txt"));
        assert_eq!(hub.hub_url, "http://host/projects/atac/trackHub_hg19.txt");
        assert_eq!(hub.link_page, PathBuf::from("/p/ucsc_tracks_hg19.html"));
    }

    #[test]
    fn unknown_genome_is_config_error() {
        let mut h = handoff(false, false, RawInput::Single("/raw/a.bam".into()));
        h.sample.genome = "mm10".into();
        let err = ExecutionPlan::resolve(&h, &InterpolationContext::new()).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigValidationError { .. }));
    }

    #[test]
    fn steps_settle_once_their_readers_are_done() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut h = handoff(true, true, two_replicates());
        h.sample.root = Some(temp.path().join("S1").display().to_string());
        let plan = plan(&h);
        let steps = plan.steps();
        assert!(settled_steps(&steps).iter().all(|s| !s));

        for step in steps.iter().filter(|s| s.disposals.is_empty()) {
            for path in step.request.products() {
                std::fs::create_dir_all(path.parent().unwrap()).unwrap();
                std::fs::write(&path, "").unwrap();
            }
        }
        let settled: Vec<&str> = steps
            .iter()
            .zip(settled_steps(&steps))
            .filter(|(_, settled)| *settled)
            .map(|(step, _)| step.name)
            .collect();
        assert_eq!(settled, vec!["merge", "bam_to_fastq", "trim", "align"]);

        std::fs::remove_file(&plan.layout.filtered).unwrap();
        assert!(settled_steps(&steps).iter().all(|s| !s));
    }

    #[test]
    fn lock_dir_defaults_under_project_root() {
        let plan = plan(&handoff(false, false, RawInput::Single("/raw/a.bam".into())));
        assert_eq!(plan.lock_dir, PathBuf::from("/p/.locks"));
    }
}
