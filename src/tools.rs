//! Command catalog.
//!
//! Each external tool the workflow drives is described by a typed
//! [`ToolRequest`]. A [`ToolCatalog`] turns a request into the command
//! line to run; the request itself knows which files the tool reads and
//! writes. Catalogs are pure: building a command touches nothing on disk.

use crate::shell::CommandSpec;
use std::path::{Path, PathBuf};

/// Read files handed between steps: one channel or two mates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadPaths {
    /// Single-end reads.
    Single(PathBuf),

    /// Paired-end mates.
    Paired(PathBuf, PathBuf),
}

impl ReadPaths {
    /// Every read file, mate 1 first.
    pub fn paths(&self) -> Vec<&Path> {
        match self {
            ReadPaths::Single(reads) => vec![reads.as_path()],
            ReadPaths::Paired(first, second) => vec![first.as_path(), second.as_path()],
        }
    }

    /// The file that witnesses the reads were written.
    pub fn first(&self) -> &Path {
        match self {
            ReadPaths::Single(reads) => reads,
            ReadPaths::Paired(first, _) => first,
        }
    }

    /// Number of read channels.
    pub fn channels(&self) -> usize {
        match self {
            ReadPaths::Single(_) => 1,
            ReadPaths::Paired(..) => 2,
        }
    }
}

/// One invocation of an external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolRequest {
    /// Merge technical replicate BAMs into one.
    MergeBams { inputs: Vec<PathBuf>, output: PathBuf },

    /// FastQC report, renamed to the sample name.
    Fastqc { input: PathBuf, output: PathBuf },

    /// Unmapped BAM to FASTQ.
    BamToFastq {
        input: PathBuf,
        output: ReadPaths,
        unpaired: Option<PathBuf>,
    },

    /// Adapter trimming with Trimmomatic.
    Trimmomatic {
        input: ReadPaths,
        output: ReadPaths,
        /// Mate 1 and mate 2 reads that lost their partner.
        unpaired: Option<(PathBuf, PathBuf)>,
        adapters: PathBuf,
        log: PathBuf,
        cpus: u32,
    },

    /// Adapter trimming with Skewer.
    Skewer {
        input: ReadPaths,
        output: ReadPaths,
        prefix: PathBuf,
        adapters: PathBuf,
        log: PathBuf,
        cpus: u32,
    },

    /// Alignment with Bowtie2 into a sorted BAM.
    Bowtie2Map {
        input: ReadPaths,
        output: PathBuf,
        log: PathBuf,
        metrics: PathBuf,
        index: PathBuf,
        max_insert: u32,
        cpus: u32,
    },

    /// Duplicate removal and mapping-quality filtering.
    FilterReads {
        input: PathBuf,
        output: PathBuf,
        metrics: PathBuf,
        paired: bool,
        quality: u32,
        cpus: u32,
    },

    /// Tn5 insertion offset correction.
    ShiftReads {
        input: PathBuf,
        output: PathBuf,
        genome: String,
    },

    /// BAM index.
    IndexBam { input: PathBuf },

    /// Normalised coverage track.
    BamToBigWig {
        input: PathBuf,
        output: PathBuf,
        chrom_sizes: PathBuf,
    },

    /// Append the sample track to the project track hub.
    AddTrackToHub {
        sample_name: String,
        track_url: String,
        hub: PathBuf,
        colour: String,
    },

    /// Fragment length distribution plot and table.
    InsertSizes {
        input: PathBuf,
        plot: PathBuf,
        data: PathBuf,
    },

    /// Read counts over fixed genome windows.
    GenomeCoverage {
        input: PathBuf,
        windows: PathBuf,
        output: PathBuf,
    },

    /// NSC/RSC signal-to-noise estimation.
    SignalNoise {
        input: PathBuf,
        output: PathBuf,
        plot: PathBuf,
        cpus: u32,
    },

    /// Peak calling with MACS2.
    CallPeaks {
        input: PathBuf,
        output_dir: PathBuf,
        peaks: PathBuf,
        sample_name: String,
        genome: String,
    },

    /// Fraction of reads in peaks.
    Frip {
        input: PathBuf,
        peaks: PathBuf,
        output: PathBuf,
    },
}

impl ToolRequest {
    /// The artifact whose existence marks the invocation as done.
    ///
    /// `None` for tools that update shared files in place.
    pub fn primary(&self) -> Option<PathBuf> {
        let primary = match self {
            ToolRequest::MergeBams { output, .. } => output.clone(),
            ToolRequest::Fastqc { output, .. } => output.clone(),
            ToolRequest::BamToFastq { output, .. } => output.first().to_path_buf(),
            ToolRequest::Trimmomatic { output, .. } => output.first().to_path_buf(),
            ToolRequest::Skewer { output, .. } => output.first().to_path_buf(),
            ToolRequest::Bowtie2Map { output, .. } => output.clone(),
            ToolRequest::FilterReads { output, .. } => output.clone(),
            ToolRequest::ShiftReads { output, .. } => output.clone(),
            ToolRequest::IndexBam { input } => bam_index(input),
            ToolRequest::BamToBigWig { output, .. } => output.clone(),
            ToolRequest::AddTrackToHub { .. } => return None,
            ToolRequest::InsertSizes { plot, .. } => plot.clone(),
            ToolRequest::GenomeCoverage { output, .. } => output.clone(),
            ToolRequest::SignalNoise { plot, .. } => plot.clone(),
            ToolRequest::CallPeaks { peaks, .. } => peaks.clone(),
            ToolRequest::Frip { output, .. } => output.clone(),
        };
        Some(primary)
    }

    /// Files that must exist before the tool can run.
    pub fn inputs(&self) -> Vec<PathBuf> {
        match self {
            ToolRequest::MergeBams { inputs, .. } => inputs.clone(),
            ToolRequest::Trimmomatic { input, .. }
            | ToolRequest::Skewer { input, .. }
            | ToolRequest::Bowtie2Map { input, .. } => owned(input.paths()),
            ToolRequest::Fastqc { input, .. }
            | ToolRequest::BamToFastq { input, .. }
            | ToolRequest::FilterReads { input, .. }
            | ToolRequest::ShiftReads { input, .. }
            | ToolRequest::IndexBam { input }
            | ToolRequest::BamToBigWig { input, .. }
            | ToolRequest::InsertSizes { input, .. }
            | ToolRequest::GenomeCoverage { input, .. }
            | ToolRequest::SignalNoise { input, .. }
            | ToolRequest::CallPeaks { input, .. } => vec![input.clone()],
            ToolRequest::Frip { input, peaks, .. } => vec![input.clone(), peaks.clone()],
            ToolRequest::AddTrackToHub { .. } => Vec::new(),
        }
    }

    /// Every file the tool writes, primary artifact first.
    pub fn products(&self) -> Vec<PathBuf> {
        let mut products: Vec<PathBuf> = self.primary().into_iter().collect();
        let extra: Vec<PathBuf> = match self {
            ToolRequest::BamToFastq {
                output, unpaired, ..
            } => owned(output.paths())
                .into_iter()
                .skip(1)
                .chain(unpaired.clone())
                .collect(),
            ToolRequest::Trimmomatic {
                output,
                unpaired,
                log,
                ..
            } => {
                let mut extra = owned(output.paths()).split_off(1);
                if let Some((first, second)) = unpaired {
                    extra.push(first.clone());
                    extra.push(second.clone());
                }
                extra.push(log.clone());
                extra
            }
            ToolRequest::Skewer { output, log, .. } => {
                let mut extra = owned(output.paths()).split_off(1);
                extra.push(log.clone());
                extra
            }
            ToolRequest::Bowtie2Map { log, metrics, .. } => vec![log.clone(), metrics.clone()],
            ToolRequest::FilterReads { metrics, .. } => vec![metrics.clone()],
            ToolRequest::AddTrackToHub { hub, .. } => vec![hub.clone()],
            ToolRequest::InsertSizes { data, .. } => vec![data.clone()],
            ToolRequest::SignalNoise { output, .. } => vec![output.clone()],
            _ => Vec::new(),
        };
        products.extend(extra);
        products
    }
}

/// A built command and the artifact that witnesses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub command: CommandSpec,
    pub primary: Option<PathBuf>,
}

/// Turns tool requests into command lines.
pub trait ToolCatalog: Send + Sync {
    /// Command line for `request`.
    fn command(&self, request: &ToolRequest) -> CommandSpec;

    /// Command plus primary artifact.
    fn build(&self, request: &ToolRequest) -> ToolCommand {
        ToolCommand {
            command: self.command(request),
            primary: request.primary(),
        }
    }
}

/// The tools found on a standard ATAC-seq analysis host.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTools;

impl ToolCatalog for StandardTools {
    fn command(&self, request: &ToolRequest) -> CommandSpec {
        match request {
            ToolRequest::MergeBams { inputs, output } => {
                let mut args = vec![
                    "samtools".to_string(),
                    "merge".to_string(),
                    "-f".to_string(),
                    path_arg(output),
                ];
                args.extend(inputs.iter().map(|p| path_arg(p)));
                CommandSpec::Argv(args)
            }
            ToolRequest::Fastqc { input, output } => fastqc(input, output),
            ToolRequest::BamToFastq {
                input,
                output,
                unpaired,
            } => bam_to_fastq(input, output, unpaired.as_deref()),
            ToolRequest::Trimmomatic {
                input,
                output,
                unpaired,
                adapters,
                log,
                cpus,
            } => trimmomatic(input, output, unpaired.as_ref(), adapters, log, *cpus),
            ToolRequest::Skewer {
                input,
                output,
                prefix,
                adapters,
                log,
                cpus,
            } => skewer(input, output, prefix, adapters, log, *cpus),
            ToolRequest::Bowtie2Map {
                input,
                output,
                log,
                metrics,
                index,
                max_insert,
                cpus,
            } => {
                let reads = match input {
                    ReadPaths::Single(reads) => format!("-U {}", quote(reads)),
                    ReadPaths::Paired(first, second) => {
                        format!("-1 {} -2 {}", quote(first), quote(second))
                    }
                };
                CommandSpec::shell(format!(
                    "bowtie2 --very-sensitive -p {cpus} -x {} --met-file {} {reads} -X {max_insert} 2> {} \
                     | samtools view -S -b - | samtools sort -@ {cpus} -o {} -",
                    quote(index),
                    quote(metrics),
                    quote(log),
                    quote(output),
                ))
            }
            ToolRequest::FilterReads {
                input,
                output,
                metrics,
                paired,
                quality,
                cpus,
            } => {
                let proper = if *paired { " -f 2" } else { "" };
                CommandSpec::shell(format!(
                    "samtools sort -n -@ {cpus} {} | samtools fixmate -m - - \
                     | samtools sort -@ {cpus} - | samtools markdup -r -s -f {} - - \
                     | samtools view -b -q {quality} -F 4{proper} -o {} -",
                    quote(input),
                    quote(metrics),
                    quote(output),
                ))
            }
            ToolRequest::ShiftReads {
                input,
                output,
                genome,
            } => CommandSpec::shell(format!(
                "samtools view -h {} | shift_reads.py {} | samtools view -S -b - | samtools sort -o {} -",
                quote(input),
                quote_str(genome),
                quote(output),
            )),
            ToolRequest::IndexBam { input } => {
                CommandSpec::argv(["samtools".to_string(), "index".to_string(), path_arg(input)])
            }
            ToolRequest::BamToBigWig {
                input,
                output,
                chrom_sizes,
            } => {
                let bedgraph = with_suffix(output, ".bedGraph");
                CommandSpec::shell(format!(
                    "reads=$(samtools view -c {bam}) && test \"$reads\" -gt 0 \
                     && scale=$(awk -v n=\"$reads\" 'BEGIN {{ print 1000000 / n }}') \
                     && bedtools bamtobed -i {bam} | bedtools slop -i stdin -g {sizes} -s -l 0 -r 130 \
                     | bedtools genomecov -i stdin -g {sizes} -bg -scale \"$scale\" \
                     | sort -k1,1 -k2,2n > {bg} && bedGraphToBigWig {bg} {sizes} {out} && rm -f {bg}",
                    bam = quote(input),
                    sizes = quote(chrom_sizes),
                    bg = quote(&bedgraph),
                    out = quote(output),
                ))
            }
            ToolRequest::AddTrackToHub {
                sample_name,
                track_url,
                hub,
                colour,
            } => {
                let line = format!(
                    "track type=bigWig name='{sample_name}' description='{sample_name}' \
                     visibility=3 maxHeightPixels=100:50:20 color={colour} bigDataUrl={track_url}"
                );
                CommandSpec::shell(format!(
                    "grep -qF {} {hub} 2>/dev/null || printf '%s\\n' {} >> {hub}",
                    quote_str(&format!("name='{sample_name}'")),
                    quote_str(&line),
                    hub = quote(hub),
                ))
            }
            ToolRequest::InsertSizes { input, plot, data } => CommandSpec::shell(format!(
                "samtools view -f 66 {} | awk '{{ s = $9 < 0 ? -$9 : $9; print s }}' | sort -n | uniq -c \
                 | awk 'BEGIN {{ print \"length,count\" }} {{ print $2\",\"$1 }}' > {data} \
                 && plot_insert_sizes.R {data} {}",
                quote(input),
                quote(plot),
                data = quote(data),
            )),
            ToolRequest::GenomeCoverage {
                input,
                windows,
                output,
            } => CommandSpec::shell(format!(
                "bedtools coverage -counts -abam {} -b {} > {}",
                quote(input),
                quote(windows),
                quote(output),
            )),
            ToolRequest::SignalNoise {
                input,
                output,
                plot,
                cpus,
            } => CommandSpec::shell(format!(
                "Rscript $(which run_spp.R) -rf -savp={} -out={} -c={} -p={cpus}",
                quote(plot),
                quote(output),
                quote(input),
            )),
            ToolRequest::CallPeaks {
                input,
                output_dir,
                sample_name,
                genome,
                ..
            } => CommandSpec::argv([
                "macs2".to_string(),
                "callpeak".to_string(),
                "-t".to_string(),
                path_arg(input),
                "--nomodel".to_string(),
                "--extsize".to_string(),
                "147".to_string(),
                "-g".to_string(),
                effective_genome_size(genome).to_string(),
                "-n".to_string(),
                sample_name.clone(),
                "--outdir".to_string(),
                path_arg(output_dir),
            ]),
            ToolRequest::Frip {
                input,
                peaks,
                output,
            } => CommandSpec::shell(format!(
                "in_peaks=$(samtools view -c -L {peaks} {bam}) && total=$(samtools view -c {bam}) \
                 && awk -v a=\"$in_peaks\" -v b=\"$total\" 'BEGIN {{ print a, b, (b > 0 ? a / b : 0) }}' > {out}",
                peaks = quote(peaks),
                bam = quote(input),
                out = quote(output),
            )),
        }
    }
}

fn fastqc(input: &Path, output: &Path) -> CommandSpec {
    let out_dir = output.parent().unwrap_or_else(|| Path::new("."));
    let mut line = format!(
        "fastqc --noextract --outdir {} {}",
        quote(out_dir),
        quote(input)
    );
    // FastQC names its report after the input file.
    let produced = out_dir.join(format!("{}_fastqc.zip", file_stem(input)));
    if produced != output {
        line.push_str(&format!(" && mv {} {}", quote(&produced), quote(output)));
        let html = out_dir.join(format!("{}_fastqc.html", file_stem(input)));
        line.push_str(&format!(
            " && mv {} {}",
            quote(&html),
            quote(&output.with_extension("html"))
        ));
    }
    CommandSpec::shell(line)
}

fn bam_to_fastq(input: &Path, output: &ReadPaths, unpaired: Option<&Path>) -> CommandSpec {
    match output {
        ReadPaths::Single(reads) => CommandSpec::shell(format!(
            "samtools fastq {} > {}",
            quote(input),
            quote(reads)
        )),
        ReadPaths::Paired(first, second) => {
            let singletons = unpaired.map(quote).unwrap_or_else(|| "/dev/null".into());
            CommandSpec::shell(format!(
                "samtools collate -u -O {} | samtools fastq -1 {} -2 {} -s {} -0 /dev/null -",
                quote(input),
                quote(first),
                quote(second),
                singletons,
            ))
        }
    }
}

fn trimmomatic(
    input: &ReadPaths,
    output: &ReadPaths,
    unpaired: Option<&(PathBuf, PathBuf)>,
    adapters: &Path,
    log: &Path,
    cpus: u32,
) -> CommandSpec {
    let steps = format!(
        "ILLUMINACLIP:{}:1:40:15:8:true LEADING:3 TRAILING:3 SLIDINGWINDOW:4:10 MINLEN:36",
        adapters.display()
    );
    let (mode, files) = match (input, output) {
        (ReadPaths::Paired(in1, in2), ReadPaths::Paired(out1, out2)) => {
            let (orphan1, orphan2) = match unpaired {
                Some((first, second)) => (quote(first), quote(second)),
                None => ("/dev/null".to_string(), "/dev/null".to_string()),
            };
            let files = format!(
                "{} {} {} {orphan1} {} {orphan2}",
                quote(in1),
                quote(in2),
                quote(out1),
                quote(out2),
            );
            ("PE", files)
        }
        (input, output) => (
            "SE",
            format!("{} {}", quote(input.first()), quote(output.first())),
        ),
    };
    CommandSpec::shell(format!(
        "trimmomatic {mode} -threads {cpus} -trimlog {} {files} {steps}",
        quote(log)
    ))
}

fn skewer(
    input: &ReadPaths,
    output: &ReadPaths,
    prefix: &Path,
    adapters: &Path,
    log: &Path,
    cpus: u32,
) -> CommandSpec {
    let produced = |suffix: &str| quote(&with_suffix(prefix, suffix));
    match (input, output) {
        (ReadPaths::Paired(in1, in2), ReadPaths::Paired(out1, out2)) => CommandSpec::shell(format!(
            "skewer --quiet -f sanger -t {cpus} -m pe -x {} -o {} {} {} > {} \
             && mv {} {} && mv {} {}",
            quote(adapters),
            quote(prefix),
            quote(in1),
            quote(in2),
            quote(log),
            produced("-trimmed-pair1.fastq"),
            quote(out1),
            produced("-trimmed-pair2.fastq"),
            quote(out2),
        )),
        (input, output) => CommandSpec::shell(format!(
            "skewer --quiet -f sanger -t {cpus} -m tail -x {} -o {} {} > {} \
             && mv {} {}",
            quote(adapters),
            quote(prefix),
            quote(input.first()),
            quote(log),
            produced("-trimmed.fastq"),
            quote(output.first()),
        )),
    }
}

/// Page linking the project track hub into the UCSC browser.
pub fn track_hub_link(hub_url: &str, genome: &str) -> String {
    format!(
        "<html>\n<head><title>{genome} tracks</title></head>\n<body>\n\
         <a href=\"http://genome.ucsc.edu/cgi-bin/hgTracks?db={genome}&hgt.customText={hub_url}\" \
         target=\"_blank\">Open {genome} tracks in the UCSC Genome Browser</a>\n\
         </body>\n</html>\n"
    )
}

/// MACS2 effective genome size for a genome id.
pub fn effective_genome_size(genome: &str) -> &str {
    if genome.starts_with("hg") || genome.starts_with("GRCh") {
        "hs"
    } else if genome.starts_with("mm") || genome.starts_with("GRCm") {
        "mm"
    } else {
        genome
    }
}

/// Index written next to a BAM.
pub fn bam_index(bam: &Path) -> PathBuf {
    with_suffix(bam, ".bai")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn owned(paths: Vec<&Path>) -> Vec<PathBuf> {
    paths.into_iter().map(Path::to_path_buf).collect()
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

/// Quote a path for the shell when it contains anything beyond plain
/// path characters.
fn quote(path: &Path) -> String {
    quote_str(&path.display().to_string())
}

fn quote_str(raw: &str) -> String {
    let plain = !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+,:=@%".contains(c));
    if plain {
        raw.to_string()
    } else {
        format!("'{}'", raw.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paired_reads() -> ReadPaths {
        ReadPaths::Paired("/s/S1.1.fastq".into(), "/s/S1.2.fastq".into())
    }

    #[test]
    fn index_primary_is_bai() {
        let req = ToolRequest::IndexBam {
            input: "/s/S1.bam".into(),
        };
        let tool = StandardTools.build(&req);
        assert_eq!(tool.primary, Some(PathBuf::from("/s/S1.bam.bai")));
        assert_eq!(tool.command, CommandSpec::argv(["samtools", "index", "/s/S1.bam"]));
    }

    #[test]
    fn track_hub_has_no_primary() {
        let req = ToolRequest::AddTrackToHub {
            sample_name: "S1".into(),
            track_url: "http://hub/S1.bigWig".into(),
            hub: "/html/trackHub_hg19.txt".into(),
            colour: "0,0,0".into(),
        };
        assert!(req.primary().is_none());
        assert_eq!(req.products(), vec![PathBuf::from("/html/trackHub_hg19.txt")]);
        let line = StandardTools.command(&req).to_string();
        assert!(line.contains("bigDataUrl=http://hub/S1.bigWig"));
        assert!(line.contains("grep -qF"));
    }

    #[test]
    fn paired_conversion_writes_three_files() {
        let req = ToolRequest::BamToFastq {
            input: "/raw/S1.bam".into(),
            output: paired_reads(),
            unpaired: Some("/s/S1.unpaired.fastq".into()),
        };
        assert_eq!(req.primary(), Some(PathBuf::from("/s/S1.1.fastq")));
        assert_eq!(req.products().len(), 3);
        assert!(StandardTools.command(&req).to_string().contains("-s /s/S1.unpaired.fastq"));
    }

    #[test]
    fn trimmomatic_modes_follow_read_layout() {
        let paired = ToolRequest::Trimmomatic {
            input: paired_reads(),
            output: ReadPaths::Paired("/s/t1.fq".into(), "/s/t2.fq".into()),
            unpaired: Some(("/s/u1.fq".into(), "/s/u2.fq".into())),
            adapters: "/refs/adapters.fa".into(),
            log: "/s/trim.log".into(),
            cpus: 8,
        };
        let line = StandardTools.command(&paired).to_string();
        assert!(line.starts_with("trimmomatic PE -threads 8 -trimlog /s/trim.log "));
        assert!(line.contains("/s/t1.fq /s/u1.fq /s/t2.fq /s/u2.fq"));
        assert!(line.contains("ILLUMINACLIP:/refs/adapters.fa"));

        let single = ToolRequest::Trimmomatic {
            input: ReadPaths::Single("/s/S1.fastq".into()),
            output: ReadPaths::Single("/s/t.fq".into()),
            unpaired: None,
            adapters: "/refs/adapters.fa".into(),
            log: "/s/trim.log".into(),
            cpus: 1,
        };
        let line = StandardTools.command(&single).to_string();
        assert!(line.starts_with("trimmomatic SE -threads 1"));
        assert!(line.contains("/s/S1.fastq /s/t.fq"));
    }

    #[test]
    fn skewer_renames_to_requested_outputs() {
        let req = ToolRequest::Skewer {
            input: paired_reads(),
            output: ReadPaths::Paired("/s/t1.fq".into(), "/s/t2.fq".into()),
            prefix: "/s/S1".into(),
            adapters: "/a.fa".into(),
            log: "/s/trim.log".into(),
            cpus: 2,
        };
        let line = StandardTools.command(&req).to_string();
        assert!(line.contains("-m pe"));
        assert!(line.contains("mv /s/S1-trimmed-pair1.fastq /s/t1.fq"));
        assert!(line.contains("mv /s/S1-trimmed-pair2.fastq /s/t2.fq"));
    }

    #[test]
    fn skewer_quotes_produced_files() {
        let req = ToolRequest::Skewer {
            input: ReadPaths::Single("/my data/S1.fastq".into()),
            output: ReadPaths::Single("/my data/S1.trimmed.fastq".into()),
            prefix: "/my data/S1".into(),
            adapters: "/a.fa".into(),
            log: "/my data/trim.log".into(),
            cpus: 1,
        };
        let line = StandardTools.command(&req).to_string();
        assert!(line.contains("mv '/my data/S1-trimmed.fastq' '/my data/S1.trimmed.fastq'"));
    }

    #[test]
    fn alignment_passes_both_mates() {
        let req = ToolRequest::Bowtie2Map {
            input: paired_reads(),
            output: "/s/mapped.bam".into(),
            log: "/s/rates.txt".into(),
            metrics: "/s/metrics.txt".into(),
            index: "/refs/hg19".into(),
            max_insert: 2000,
            cpus: 4,
        };
        assert_eq!(req.inputs().len(), 2);
        let line = StandardTools.command(&req).to_string();
        assert!(line.contains("-1 /s/S1.1.fastq -2 /s/S1.2.fastq"));
        assert!(line.contains("-X 2000"));
    }

    #[test]
    fn filter_requires_proper_pairs_only_when_paired() {
        let mut req = ToolRequest::FilterReads {
            input: "/s/m.bam".into(),
            output: "/s/f.bam".into(),
            metrics: "/s/d.txt".into(),
            paired: true,
            quality: 30,
            cpus: 4,
        };
        assert!(StandardTools.command(&req).to_string().contains("-q 30 -F 4 -f 2"));
        if let ToolRequest::FilterReads { paired, .. } = &mut req {
            *paired = false;
        }
        assert!(!StandardTools.command(&req).to_string().contains("-f 2"));
    }

    #[test]
    fn fastqc_renames_report_to_sample() {
        let req = ToolRequest::Fastqc {
            input: "/raw/run42.bam".into(),
            output: "/s/S1_fastqc.zip".into(),
        };
        let line = StandardTools.command(&req).to_string();
        assert!(line.contains("mv /s/run42_fastqc.zip /s/S1_fastqc.zip"));

        let req = ToolRequest::Fastqc {
            input: "/s/S1.bam".into(),
            output: "/s/S1_fastqc.zip".into(),
        };
        assert!(!StandardTools.command(&req).to_string().contains("mv"));
    }

    #[test]
    fn frip_needs_peaks_and_reads() {
        let req = ToolRequest::Frip {
            input: "/s/f.bam".into(),
            peaks: "/s/peaks/S1_peaks.narrowPeak".into(),
            output: "/s/S1_FRiP.txt".into(),
        };
        assert_eq!(req.inputs().len(), 2);
    }

    #[test]
    #[cfg(unix)]
    fn frip_fails_when_counting_fails() {
        use crate::shell::{execute, CommandOptions, InterruptFlag};
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::TempDir::new().unwrap();
        let bin = temp.path().join("bin");
        std::fs::create_dir(&bin).unwrap();
        let samtools = bin.join("samtools");
        std::fs::write(&samtools, "#!/bin/sh\nexit 1\n").unwrap();
        std::fs::set_permissions(&samtools, std::fs::Permissions::from_mode(0o755)).unwrap();

        let output = temp.path().join("S1_FRiP.txt");
        let req = ToolRequest::Frip {
            input: temp.path().join("f.bam"),
            peaks: temp.path().join("peaks.narrowPeak"),
            output: output.clone(),
        };
        let mut options = CommandOptions {
            capture_stdout: true,
            capture_stderr: true,
            ..Default::default()
        };
        let path = std::env::var("PATH").unwrap_or_default();
        options
            .env
            .insert("PATH".into(), format!("{}:{}", bin.display(), path));

        let result = execute(
            &StandardTools.command(&req),
            &options,
            &InterruptFlag::new(),
            None,
        )
        .unwrap();
        assert!(!result.success);
        assert!(!output.exists());
    }

    #[test]
    fn hub_entry_is_written_literally() {
        use crate::shell::execute_quiet;

        let temp = tempfile::TempDir::new().unwrap();
        let hub = temp.path().join("trackHub_hg19.txt");
        let marker = temp.path().join("injected");
        let sample_name = format!("S1\"$(touch {})", marker.display());
        let req = ToolRequest::AddTrackToHub {
            sample_name: sample_name.clone(),
            track_url: "http://hub/S1.bigWig?a=1&b=$HOME".into(),
            hub: hub.clone(),
            colour: "255,0,0".into(),
        };

        assert!(execute_quiet(&StandardTools.command(&req)).unwrap().success);
        assert!(execute_quiet(&StandardTools.command(&req)).unwrap().success);

        let content = std::fs::read_to_string(&hub).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains(&format!("name='{}'", sample_name)));
        assert!(content.contains("bigDataUrl=http://hub/S1.bigWig?a=1&b=$HOME"));
        assert!(!marker.exists());
    }

    #[test]
    fn peak_calling_uses_genome_size_alias() {
        assert_eq!(effective_genome_size("hg19"), "hs");
        assert_eq!(effective_genome_size("mm10"), "mm");
        assert_eq!(effective_genome_size("dm6"), "dm6");
    }

    #[test]
    fn quote_leaves_plain_paths_alone() {
        assert_eq!(quote(Path::new("/data/S1.bam")), "/data/S1.bam");
        assert_eq!(quote(Path::new("/data/my run/S1.bam")), "'/data/my run/S1.bam'");
        assert_eq!(quote(Path::new("/it's")), r"'/it'\''s'");
    }

    #[test]
    fn hub_link_points_at_hub_url() {
        let page = track_hub_link("http://x/p/trackHub_hg19.txt", "hg19");
        assert!(page.contains("db=hg19"));
        assert!(page.contains("hgt.customText=http://x/p/trackHub_hg19.txt"));
    }
}
