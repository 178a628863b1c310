//! Report generation module.
//!
//! Renders an [`OptimizeResult`] in two formats:
//! - Text: human-readable CLI summary
//! - JSON: machine-readable structured output

mod json;
mod text;

use crate::config::Config;
use crate::error::Result;
use crate::types::{OptimizeResult, ReportFormat};

pub use json::JsonReporter;
pub use text::TextReporter;

/// Generates reports from a pipeline result.
pub trait ReportGenerator {
    /// Render `result` to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if report generation fails.
    fn generate(&self, result: &OptimizeResult) -> Result<String>;
}

/// Report generator that supports multiple output formats.
pub struct Reporter {
    config: Config,
}

impl Reporter {
    /// Create a new reporter with the given configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Generate a report in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if report generation fails.
    pub fn generate(&self, result: &OptimizeResult, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Text => TextReporter::new(&self.config).generate(result),
            ReportFormat::Json => JsonReporter::new(&self.config).generate(result),
        }
    }
}
