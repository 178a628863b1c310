//! JSON report generator.

use crate::config::Config;
use crate::error::Result;
use crate::reporter::ReportGenerator;
use crate::types::{Diagnostic, OptimizeResult, PassOutcome};
use serde::Serialize;

/// JSON report generator.
pub struct JsonReporter {
    /// Whether to pretty-print the output
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            pretty: config.output.pretty,
        }
    }
}

impl ReportGenerator for JsonReporter {
    fn generate(&self, result: &OptimizeResult) -> Result<String> {
        let report = JsonReport::from(result);

        let json = if self.pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        };
        Ok(json?)
    }
}

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    /// Report metadata
    pub metadata: ReportMetadata,
    /// Summary statistics
    pub summary: ReportSummary,
    /// Per-pass details
    pub passes: Vec<JsonPass>,
}

/// Report metadata.
#[derive(Debug, Serialize)]
pub struct ReportMetadata {
    /// Tool version
    pub version: String,
    /// Timestamp of the run, RFC 3339
    pub timestamp: Option<String>,
    /// Output directory
    pub output_dir: String,
}

/// Summary statistics.
#[derive(Debug, Serialize)]
pub struct ReportSummary {
    /// Number of passes that ran
    pub passes_run: usize,
    /// Passes skipped after recoverable errors
    pub passes_skipped: Vec<String>,
    /// Total variables extracted
    pub variables_extracted: usize,
    /// Total files created or rewritten
    pub files_written: usize,
    /// Total diagnostics across all passes
    pub diagnostics: usize,
}

/// One pass in the report.
#[derive(Debug, Serialize)]
pub struct JsonPass {
    /// Pass name
    pub name: String,
    /// Names of the variables the pass extracted
    pub variables: Vec<String>,
    /// Files the pass created or rewrote
    pub files_written: Vec<String>,
    /// Diagnostics the pass emitted
    pub diagnostics: Vec<Diagnostic>,
}

impl From<&PassOutcome> for JsonPass {
    fn from(outcome: &PassOutcome) -> Self {
        Self {
            name: outcome.name.clone(),
            variables: outcome.variables.iter().map(|v| v.name.clone()).collect(),
            files_written: outcome
                .files_written
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            diagnostics: outcome.diagnostics.clone(),
        }
    }
}

impl From<&OptimizeResult> for JsonReport {
    fn from(result: &OptimizeResult) -> Self {
        Self {
            metadata: ReportMetadata {
                version: env!("CARGO_PKG_VERSION").to_string(),
                timestamp: result.timestamp.map(|t| t.to_rfc3339()),
                output_dir: result.output_dir.display().to_string(),
            },
            summary: ReportSummary {
                passes_run: result.passes.len(),
                passes_skipped: result.passes_skipped.clone(),
                variables_extracted: result.variables_extracted,
                files_written: result.files_written.len(),
                diagnostics: result.diagnostic_count(),
            },
            passes: result.passes.iter().map(JsonPass::from).collect(),
        }
    }
}
