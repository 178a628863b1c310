//! Core data types used throughout tfsculpt.
//!
//! This module defines the structures shared across the pipeline:
//! - Pass outcomes and the aggregate optimize result
//! - Diagnostics emitted while passes skip over malformed input
//! - Report formats and severity levels

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Informational diagnostic
    Info,
    /// Warning - the pass continued but skipped something
    Warning,
    /// Error - the pass could not complete
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// A single diagnostic produced by a pass.
///
/// Passes record what they skipped instead of failing the run: a rule with
/// no matching block, a passthrough variable absent from the input, a
/// reference that could not be resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity of the diagnostic
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// File the diagnostic refers to, if any
    pub file: Option<PathBuf>,
}

impl Diagnostic {
    /// Create a warning diagnostic.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            file: None,
        }
    }

    /// Create an informational diagnostic.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
            file: None,
        }
    }

    /// Create an error diagnostic.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            file: None,
        }
    }

    /// Attach a file path to this diagnostic.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// The result of running one pass over the working tree.
///
/// Each pass returns the variables it extracted and the files it touched;
/// the orchestrator owns the catalog that accumulates the variables. A
/// pass never writes `variables.tf` or `terraform.tfvars` itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PassOutcome {
    /// Name of the pass, e.g. `rules_parameterization`
    pub name: String,

    /// Variables extracted by the pass, in extraction order
    pub variables: Vec<crate::catalog::ExtractedVariable>,

    /// Files created or rewritten by the pass
    pub files_written: Vec<PathBuf>,

    /// Non-fatal problems encountered by the pass
    pub diagnostics: Vec<Diagnostic>,
}

impl PassOutcome {
    /// Create an empty outcome for the named pass.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Whether the pass produced any warnings or errors.
    #[must_use]
    pub fn has_problems(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity >= Severity::Warning)
    }
}

/// Aggregate results from a full pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimizeResult {
    /// Per-pass outcomes, in execution order
    pub passes: Vec<PassOutcome>,

    /// Total number of variables added to the catalog
    pub variables_extracted: usize,

    /// All files created or rewritten, deduplicated
    pub files_written: Vec<PathBuf>,

    /// Passes skipped because of recoverable errors
    pub passes_skipped: Vec<String>,

    /// Directory the restructured project was written to
    pub output_dir: PathBuf,

    /// Timestamp of the run
    pub timestamp: Option<DateTime<Utc>>,
}

impl OptimizeResult {
    /// Record a completed pass.
    pub fn record(&mut self, outcome: PassOutcome) {
        self.variables_extracted += outcome.variables.len();
        for file in &outcome.files_written {
            if !self.files_written.contains(file) {
                self.files_written.push(file.clone());
            }
        }
        self.passes.push(outcome);
    }

    /// Whether any pass emitted an error-level diagnostic or was skipped.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.passes_skipped.is_empty()
            || self
                .passes
                .iter()
                .flat_map(|p| &p.diagnostics)
                .any(|d| d.severity == Severity::Error)
    }

    /// Total diagnostic count across all passes.
    #[must_use]
    pub fn diagnostic_count(&self) -> usize {
        self.passes.iter().map(|p| p.diagnostics.len()).sum()
    }
}

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Plain text format
    #[default]
    Text,
    /// JSON format
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deduplicates_files() {
        let mut result = OptimizeResult::default();

        let mut a = PassOutcome::new("first");
        a.files_written.push(PathBuf::from("rules.tf"));
        let mut b = PassOutcome::new("second");
        b.files_written.push(PathBuf::from("rules.tf"));
        b.files_written.push(PathBuf::from("variables.tf"));

        result.record(a);
        result.record(b);
        assert_eq!(result.files_written.len(), 2);
        assert_eq!(result.passes.len(), 2);
    }

    #[test]
    fn test_has_errors_on_skip() {
        let mut result = OptimizeResult::default();
        assert!(!result.has_errors());
        result.passes_skipped.push("rules_break_down".to_string());
        assert!(result.has_errors());
    }

    #[test]
    fn test_has_problems_severity_threshold() {
        let mut outcome = PassOutcome::new("p");
        outcome.diagnostics.push(Diagnostic::info("fine"));
        assert!(!outcome.has_problems());
        outcome.diagnostics.push(Diagnostic::warning("skipped a rule"));
        assert!(outcome.has_problems());
    }
}
