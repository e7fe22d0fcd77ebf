//! Handoff loading.
//!
//! Reads a handoff YAML file, parses it and expands `${var}` templates in
//! every path it contains. Project paths may use `project_name`,
//! `project_root` and environment variables; sample paths additionally
//! see `sample_name`, `sample_root` and `genome`.

use crate::config::interpolation::{resolve_string, InterpolationContext};
use crate::config::schema::{Handoff, RawInput};
use crate::error::{PipelineError, Result};
use std::fs;
use std::path::Path;

/// Load and resolve a handoff file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
/// Returns `ConfigValidationError` if a template variable is unknown.
pub fn load_handoff(path: &Path) -> Result<Handoff> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PipelineError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            PipelineError::Io(e)
        }
    })?;

    let handoff = parse_handoff(&content, path)?;
    resolve_handoff(handoff, &InterpolationContext::from_process_env())
}

/// Parse YAML content into a [`Handoff`].
///
/// # Arguments
///
/// * `content` - The YAML content to parse
/// * `source_path` - Path for error reporting
pub fn parse_handoff(content: &str, source_path: &Path) -> Result<Handoff> {
    serde_yaml::from_str(content).map_err(|e| PipelineError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Expand templates in every path of `handoff`.
///
/// Variables are added to a copy of `base` as they become known, so a
/// sample root can refer to the project root and sample paths can refer
/// to the sample root.
pub fn resolve_handoff(mut handoff: Handoff, base: &InterpolationContext) -> Result<Handoff> {
    let mut ctx = base
        .clone()
        .with_var("project_name", handoff.project.name.clone());

    let project = &mut handoff.project;
    project.root = resolve_string(&project.root, &ctx)?;
    ctx.set("project_root", project.root.clone());

    project.adapters = resolve_string(&project.adapters, &ctx)?;
    resolve_opt(&mut project.html_dir, &ctx)?;
    resolve_opt(&mut project.url, &ctx)?;
    for map in [
        &mut project.genomes,
        &mut project.chrom_sizes,
        &mut project.genome_windows,
    ] {
        for value in map.values_mut() {
            *value = resolve_string(value, &ctx)?;
        }
    }

    let sample = &mut handoff.sample;
    ctx.set("sample_name", sample.name.clone());
    ctx.set("genome", sample.genome.clone());

    let root = resolve_string(
        sample
            .root
            .as_deref()
            .unwrap_or("${project_root}/samples/${sample_name}"),
        &ctx,
    )?;
    ctx.set("sample_root", root.clone());
    sample.root = Some(root);

    let unmapped = match &sample.unmapped_bam {
        RawInput::Single(path) => RawInput::Single(resolve_string(path, &ctx)?),
        RawInput::Multiple(paths) => RawInput::Multiple(
            paths
                .iter()
                .map(|p| resolve_string(p, &ctx))
                .collect::<Result<Vec<_>>>()?,
        ),
    };
    sample.unmapped_bam = unmapped;
    resolve_opt(&mut sample.track_url, &ctx)?;

    let options = &mut handoff.options;
    resolve_opt(&mut options.lock_dir, &ctx)?;

    Ok(handoff)
}

fn resolve_opt(value: &mut Option<String>, ctx: &InterpolationContext) -> Result<()> {
    if let Some(v) = value.as_mut() {
        *v = resolve_string(v, ctx)?;
    }
    Ok(())
}
