//! Plain text report generator.

use crate::config::Config;
use crate::error::Result;
use crate::reporter::ReportGenerator;
use crate::types::{OptimizeResult, Severity};
use colored::Colorize;
use comfy_table::{Cell, Color, ContentArrangement, Table};

/// Text report generator for CLI output.
pub struct TextReporter {
    /// Whether to use colors
    use_colors: bool,
    /// Whether to show verbose output
    verbose: bool,
}

impl TextReporter {
    /// Create a new text reporter.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            use_colors: config.output.colored,
            verbose: config.output.verbose,
        }
    }
}

impl ReportGenerator for TextReporter {
    fn generate(&self, result: &OptimizeResult) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header());
        output.push('\n');

        output.push_str(&self.format_passes(result));
        output.push('\n');

        if result.diagnostic_count() > 0 {
            output.push_str(&self.format_diagnostics(result));
            output.push('\n');
        }

        if self.verbose && !result.files_written.is_empty() {
            output.push_str(&self.format_files(result));
            output.push('\n');
        }

        output.push_str(&self.format_footer(result));
        Ok(output)
    }
}

impl TextReporter {
    /// Format the report header.
    fn format_header(&self) -> String {
        let title = "TfSculpt Optimization";
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");

        if self.use_colors {
            format!(
                "\n{} {} {}\n{}\n",
                title.bright_white().bold(),
                version.dimmed(),
                format!("({timestamp})").dimmed(),
                "=".repeat(80).bright_blue(),
            )
        } else {
            format!("\n{title} {version} ({timestamp})\n{}\n", "=".repeat(80))
        }
    }

    /// Format the per-pass table.
    fn format_passes(&self, result: &OptimizeResult) -> String {
        let mut output = String::new();

        let section_title = if self.use_colors {
            "Passes".bright_cyan().bold().to_string()
        } else {
            "Passes".to_string()
        };
        output.push_str(&format!("\n{section_title}\n"));

        let mut table = Table::new();
        table
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Pass", "Variables", "Files", "Diagnostics"]);

        for pass in &result.passes {
            let diag_cell = if pass.has_problems() && self.use_colors {
                Cell::new(pass.diagnostics.len()).fg(Color::Yellow)
            } else {
                Cell::new(pass.diagnostics.len())
            };
            table.add_row(vec![
                Cell::new(&pass.name),
                Cell::new(pass.variables.len()),
                Cell::new(pass.files_written.len()),
                diag_cell,
            ]);
        }
        for skipped in &result.passes_skipped {
            let cell = if self.use_colors {
                Cell::new(format!("{skipped} (skipped)")).fg(Color::Red)
            } else {
                Cell::new(format!("{skipped} (skipped)"))
            };
            table.add_row(vec![cell, Cell::new("-"), Cell::new("-"), Cell::new("-")]);
        }

        output.push_str(&table.to_string());
        output.push('\n');
        output
    }

    /// Format the diagnostics section.
    fn format_diagnostics(&self, result: &OptimizeResult) -> String {
        let mut output = String::new();

        let section_title = if self.use_colors {
            "Diagnostics".bright_cyan().bold().to_string()
        } else {
            "Diagnostics".to_string()
        };
        output.push_str(&format!("\n{section_title}\n"));
        output.push_str(&"-".repeat(80));
        output.push('\n');

        for pass in &result.passes {
            for diag in &pass.diagnostics {
                let severity = if self.use_colors {
                    match diag.severity {
                        Severity::Error => diag.severity.to_string().bright_red().to_string(),
                        Severity::Warning => diag.severity.to_string().yellow().to_string(),
                        Severity::Info => diag.severity.to_string().dimmed().to_string(),
                    }
                } else {
                    diag.severity.to_string()
                };
                let location = diag
                    .file
                    .as_ref()
                    .map(|p| format!(" [{}]", p.display()))
                    .unwrap_or_default();
                output.push_str(&format!(
                    "  {severity:>7}  {}: {}{location}\n",
                    pass.name, diag.message
                ));
            }
        }
        output
    }

    /// Format the written-files list (verbose only).
    fn format_files(&self, result: &OptimizeResult) -> String {
        let mut output = String::new();

        let section_title = if self.use_colors {
            "Files Written".bright_cyan().bold().to_string()
        } else {
            "Files Written".to_string()
        };
        output.push_str(&format!("\n{section_title}\n"));
        output.push_str(&"-".repeat(80));
        output.push('\n');

        for file in &result.files_written {
            output.push_str(&format!("  {}\n", file.display()));
        }
        output
    }

    /// Format the report footer.
    fn format_footer(&self, result: &OptimizeResult) -> String {
        let summary = format!(
            "{} passes, {} variables extracted, {} files written -> {}",
            result.passes.len(),
            result.variables_extracted,
            result.files_written.len(),
            result.output_dir.display(),
        );

        if self.use_colors {
            let line = "=".repeat(80).bright_blue().to_string();
            if result.has_errors() {
                format!("{line}\n{}\n", summary.yellow())
            } else {
                format!("{line}\n{}\n", summary.bright_green())
            }
        } else {
            format!("{}\n{summary}\n", "=".repeat(80))
        }
    }
}
