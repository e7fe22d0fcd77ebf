//! Variable interpolation for path templates.
//!
//! Paths in the handoff document and the sample layout templates use
//! `${variable}` syntax.
//!
//! # Syntax
//!
//! - `${variable_name}` - replaced with variable value
//! - `$${escaped}` - produces literal `${escaped}` in output
//!
//! # Example
//!
//! ```yaml
//! root: "${project_root}/samples/${sample_name}"
//! # With project_root=/data/atac and sample_name=S1: /data/atac/samples/S1
//! ```

use crate::error::{PipelineError, Result};
use std::collections::HashMap;

/// A segment of an interpolated string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text
    Literal(String),
    /// Variable reference: ${name}
    Variable(String),
}

/// Parse a string containing ${var} interpolations.
pub fn parse_interpolation(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut chars = input.chars().peekable();
    let mut current_literal = String::new();

    while let Some(c) = chars.next() {
        if c != '$' {
            current_literal.push(c);
            continue;
        }

        match chars.peek() {
            Some('$') => {
                chars.next();
                if chars.peek() == Some(&'{') {
                    // $${...} -> literal ${...}
                    chars.next();
                    current_literal.push_str("${");
                    for c in chars.by_ref() {
                        current_literal.push(c);
                        if c == '}' {
                            break;
                        }
                    }
                } else {
                    current_literal.push('$');
                }
            }
            Some('{') => {
                chars.next();

                if !current_literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut current_literal)));
                }

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                segments.push(Segment::Variable(var_name));
            }
            _ => current_literal.push(c),
        }
    }

    if !current_literal.is_empty() {
        segments.push(Segment::Literal(current_literal));
    }

    segments
}

/// Check if a string contains any interpolation.
pub fn has_interpolation(input: &str) -> bool {
    parse_interpolation(input)
        .iter()
        .any(|seg| matches!(seg, Segment::Variable(_)))
}

/// Context for variable resolution.
///
/// Variables are resolved in priority order:
/// 1. Sample and project variables (highest priority)
/// 2. Environment variables
#[derive(Debug, Default, Clone)]
pub struct InterpolationContext {
    /// Variables derived from the handoff (project_root, sample_name, ...)
    pub vars: HashMap<String, String>,

    /// Environment variables
    pub env: HashMap<String, String>,
}

impl InterpolationContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context seeded with the process environment.
    pub fn from_process_env() -> Self {
        Self {
            vars: HashMap::new(),
            env: std::env::vars().collect(),
        }
    }

    /// Add or replace a variable.
    pub fn with_var(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Add or replace a variable in place.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.vars.insert(name.to_string(), value.into());
    }

    /// Resolve a variable name to its value.
    pub fn resolve(&self, name: &str) -> Option<String> {
        self.vars.get(name).or_else(|| self.env.get(name)).cloned()
    }
}

/// Resolve all variables in an interpolated string.
///
/// # Errors
///
/// Returns `ConfigValidationError` if any variable is not found in the context.
pub fn resolve_string(input: &str, context: &InterpolationContext) -> Result<String> {
    let mut result = String::new();

    for segment in parse_interpolation(input) {
        match segment {
            Segment::Literal(text) => result.push_str(&text),
            Segment::Variable(name) => {
                let value =
                    context
                        .resolve(&name)
                        .ok_or_else(|| PipelineError::ConfigValidationError {
                            message: format!("Unresolved variable: ${{{}}} in '{}'", name, input),
                        })?;
                result.push_str(&value);
            }
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_literal_only() {
        let result = parse_interpolation("/data/s1.bam");
        assert_eq!(result, vec![Segment::Literal("/data/s1.bam".to_string())]);
    }

    #[test]
    fn parse_variable_with_surrounding_text() {
        let result = parse_interpolation("${sample_root}/mapped/${sample_name}.bam");
        assert_eq!(
            result,
            vec![
                Segment::Variable("sample_root".to_string()),
                Segment::Literal("/mapped/".to_string()),
                Segment::Variable("sample_name".to_string()),
                Segment::Literal(".bam".to_string()),
            ]
        );
    }

    #[test]
    fn parse_escaped_dollar_brace() {
        let result = parse_interpolation("$${NOT_INTERPOLATED}");
        assert_eq!(
            result,
            vec![Segment::Literal("${NOT_INTERPOLATED}".to_string())]
        );
    }

    #[test]
    fn parse_dollar_without_brace() {
        let result = parse_interpolation("price is $100");
        assert_eq!(result, vec![Segment::Literal("price is $100".to_string())]);
    }

    #[test]
    fn parse_empty_string() {
        assert!(parse_interpolation("").is_empty());
        assert!(!has_interpolation("plain"));
        assert!(has_interpolation("${x}"));
    }

    #[test]
    fn resolve_prefers_vars_over_env() {
        let mut ctx = InterpolationContext::new().with_var("genome", "hg19");
        ctx.env.insert("genome".into(), "mm10".into());
        ctx.env.insert("REFS".into(), "/refs".into());

        let out = resolve_string("${REFS}/${genome}.fa", &ctx).unwrap();
        assert_eq!(out, "/refs/hg19.fa");
    }

    #[test]
    fn resolve_missing_variable_errors() {
        let ctx = InterpolationContext::new();
        let err = resolve_string("${nope}/x", &ctx).unwrap_err();
        assert!(err.to_string().contains("nope"));
    }
}
