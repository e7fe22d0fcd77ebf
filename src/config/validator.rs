//! Handoff validation rules.
//!
//! Every reference the workflow will need is checked before the first
//! step runs:
//! - the sample genome has an aligner index and chromosome sizes
//! - optional steps have the settings they depend on
//! - numeric options are usable
//! - raw inputs are declared

use crate::config::schema::Handoff;
use crate::error::{PipelineError, Result};

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    fn new(rule: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a handoff and return all errors.
///
/// This function collects all validation errors rather than stopping
/// at the first one, allowing users to fix multiple issues at once.
pub fn validate_handoff(handoff: &Handoff) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_references(handoff));
    errors.extend(validate_inputs(handoff));
    errors.extend(validate_options(handoff));

    errors
}

/// Genome-keyed references and optional-step settings.
fn validate_references(handoff: &Handoff) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let project = &handoff.project;
    let genome = &handoff.sample.genome;

    if !project.genomes.contains_key(genome) {
        errors.push(ValidationError::new(
            "unknown-genome-index",
            format!("No aligner index configured for genome '{}'", genome),
        ));
    }

    if !project.chrom_sizes.contains_key(genome) {
        errors.push(ValidationError::new(
            "unknown-chrom-sizes",
            format!("No chromosome sizes configured for genome '{}'", genome),
        ));
    }

    if handoff.options.coverage && !project.genome_windows.contains_key(genome) {
        errors.push(ValidationError::new(
            "unknown-genome-windows",
            format!(
                "Coverage requested but no genome windows configured for '{}'",
                genome
            ),
        ));
    }

    if handoff.options.track_hub {
        if project.url.is_none() {
            errors.push(ValidationError::new(
                "missing-project-url",
                "Track hub requested but project 'url' is not set",
            ));
        }
        if handoff.sample.track_url.is_none() {
            errors.push(ValidationError::new(
                "missing-track-url",
                format!(
                    "Track hub requested but sample '{}' has no 'track_url'",
                    handoff.sample.name
                ),
            ));
        }
    }

    if project.adapters.trim().is_empty() {
        errors.push(ValidationError::new(
            "missing-adapters",
            "Project 'adapters' is not set",
        ));
    }

    errors
}

fn validate_inputs(handoff: &Handoff) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let sample = &handoff.sample;

    if sample.name.trim().is_empty() {
        errors.push(ValidationError::new(
            "missing-sample-name",
            "Sample 'name' is empty",
        ));
    }

    let files = sample.unmapped_bam.files();
    if files.is_empty() || files.iter().any(|f| f.trim().is_empty()) {
        errors.push(ValidationError::new(
            "missing-raw-input",
            format!("Sample '{}' declares no unmapped input", sample.name),
        ));
    }

    errors
}

fn validate_options(handoff: &Handoff) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let options = &handoff.options;

    if options.cpus == 0 {
        errors.push(ValidationError::new("invalid-cpus", "'cpus' must be at least 1"));
    }

    if options.max_insert == 0 {
        errors.push(ValidationError::new(
            "invalid-max-insert",
            "'max_insert' must be at least 1",
        ));
    }

    errors
}

/// Validate a handoff, combining all errors into one.
pub fn validate(handoff: &Handoff) -> Result<()> {
    let errors = validate_handoff(handoff);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(PipelineError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ProjectConfig, RawInput, RunSettings, SampleConfig};

    fn handoff() -> Handoff {
        let mut project = ProjectConfig {
            name: "atac".into(),
            root: "/p".into(),
            adapters: "/refs/adapters.fa".into(),
            ..Default::default()
        };
        project.genomes.insert("hg19".into(), "/refs/hg19".into());
        project.chrom_sizes.insert("hg19".into(), "/refs/hg19.sizes".into());

        Handoff {
            project,
            sample: SampleConfig {
                name: "S1".into(),
                genome: "hg19".into(),
                paired: false,
                tagmented: false,
                root: Some("/p/samples/S1".into()),
                unmapped_bam: RawInput::Single("/raw/S1.bam".into()),
                track_url: None,
                track_colour: "0,0,0".into(),
                paths: Default::default(),
            },
            options: RunSettings::default(),
        }
    }

    fn rules(handoff: &Handoff) -> Vec<String> {
        validate_handoff(handoff).into_iter().map(|e| e.rule).collect()
    }

    #[test]
    fn valid_handoff_passes() {
        assert!(validate(&handoff()).is_ok());
    }

    #[test]
    fn unknown_genome_reports_both_maps() {
        let mut h = handoff();
        h.sample.genome = "mm10".into();
        let rules = rules(&h);
        assert!(rules.contains(&"unknown-genome-index".to_string()));
        assert!(rules.contains(&"unknown-chrom-sizes".to_string()));
    }

    #[test]
    fn coverage_requires_genome_windows() {
        let mut h = handoff();
        h.options.coverage = true;
        assert_eq!(rules(&h), vec!["unknown-genome-windows"]);
    }

    #[test]
    fn track_hub_requires_urls() {
        let mut h = handoff();
        h.options.track_hub = true;
        let rules = rules(&h);
        assert!(rules.contains(&"missing-project-url".to_string()));
        assert!(rules.contains(&"missing-track-url".to_string()));
    }

    #[test]
    fn zero_cpus_rejected() {
        let mut h = handoff();
        h.options.cpus = 0;
        assert_eq!(rules(&h), vec!["invalid-cpus"]);
    }

    #[test]
    fn empty_replicate_list_rejected() {
        let mut h = handoff();
        h.sample.unmapped_bam = RawInput::Multiple(vec![]);
        assert_eq!(rules(&h), vec!["missing-raw-input"]);
    }

    #[test]
    fn validate_joins_messages() {
        let mut h = handoff();
        h.options.cpus = 0;
        h.options.max_insert = 0;
        let err = validate(&h).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("cpus"));
        assert!(msg.contains("max_insert"));
    }
}
