//! Handoff loading, interpolation and validation.
//!
//! - Schema definitions in [`schema`]
//! - File loading and template expansion in [`loader`]
//! - Validation in [`validator`]
//! - Variable interpolation in [`interpolation`]
//!
//! # Example
//!
//! ```
//! use atacseq::config::{load_handoff, validate};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let path = temp.path().join("S1.yml");
//! fs::write(&path, r#"
//! project:
//!   name: atac
//!   root: /data/atac
//!   adapters: /refs/adapters.fa
//!   genomes: { hg19: /refs/hg19 }
//!   chrom_sizes: { hg19: /refs/hg19.sizes }
//! sample:
//!   name: S1
//!   genome: hg19
//!   unmapped_bam: /raw/S1.bam
//! "#).unwrap();
//!
//! let handoff = load_handoff(&path).unwrap();
//! validate(&handoff).unwrap();
//! assert_eq!(handoff.sample.root.as_deref(), Some("/data/atac/samples/S1"));
//! ```

pub mod interpolation;
pub mod loader;
pub mod schema;
pub mod validator;

pub use interpolation::{resolve_string, InterpolationContext};
pub use loader::{load_handoff, parse_handoff, resolve_handoff};
pub use schema::{Handoff, ProjectConfig, RawInput, RunSettings, SampleConfig, Trimmer};
pub use validator::{validate, validate_handoff, ValidationError};
