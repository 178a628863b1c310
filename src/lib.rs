//! # TfSculpt
//!
//! A restructurer for flat Terraform property exports.
//!
//! TfSculpt takes the single-directory Terraform configuration exported for
//! an Akamai property and reworks it into a parameterized, multi-file
//! module layout. All rewriting is structural text manipulation over the
//! HCL source: blocks are located by balanced-brace scanning, literals are
//! extracted with their exact source spans, and every file is rewritten in
//! one validated edit pass.
//!
//! ## Features
//!
//! - **Literal extraction**: origin hostnames, CP codes, and PMUSER
//!   variables become Terraform variables with generated declarations and
//!   tfvars assignments
//! - **Rule tree splitting**: the rule hierarchy is partitioned across
//!   files at a configurable depth
//! - **Resource parameterization**: edge hostnames collapse into a
//!   `for_each` resource, the property and activations are rebuilt around
//!   variable references
//! - **Project layout**: the result lands as `modules/property` plus an
//!   `environments/prod` root with declarative `import {}` blocks
//!
//! ## Example
//!
//! ```rust,no_run
//! use tfsculpt::{Config, Optimizer, ReportFormat};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let optimizer = Optimizer::new(config.clone());
//!
//!     let result = optimizer.optimize("./export", "./result", None).await?;
//!
//!     let report = tfsculpt::reporter::Reporter::new(&config)
//!         .generate(&result, ReportFormat::Text)?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```

#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod catalog;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod passes;
pub mod reporter;
pub mod types;

// Re-export commonly used types at crate root
pub use catalog::{ExtractedVariable, VarValue, VariableCatalog};
pub use config::Config;
pub use error::{Result, TfSculptError};
pub use passes::{HyphenToDotResolver, ReferenceResolver};
pub use types::{Diagnostic, OptimizeResult, PassOutcome, ReportFormat, Severity};

use std::path::Path;

/// Main orchestrator that runs the optimization pipeline.
///
/// The `Optimizer` is the primary entry point for using TfSculpt as a
/// library. It owns the configuration and the variable catalog, runs the
/// passes in their fixed order, and flushes the catalog's increments to
/// `variables.tf` and `terraform.tfvars` after each pass that extracts
/// variables.
///
/// A pass that fails with a recoverable error (missing file, malformed
/// hierarchy, truncated block) is recorded as skipped and the pipeline
/// continues; I/O failures abort the run.
///
/// # Example
///
/// ```rust,no_run
/// use tfsculpt::{Config, Optimizer};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let optimizer = Optimizer::new(Config::default());
///     let result = optimizer.optimize("./export", "./result", Some(2)).await?;
///     println!("{} variables extracted", result.variables_extracted);
///     Ok(())
/// }
/// ```
pub struct Optimizer {
    config: Config,
    resolver: Box<dyn ReferenceResolver + Send + Sync>,
}

impl Optimizer {
    /// Create a new optimizer with the given configuration and the default
    /// edge-hostname reference resolver.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            resolver: Box::new(HyphenToDotResolver),
        }
    }

    /// Replace the edge-hostname reference resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Box<dyn ReferenceResolver + Send + Sync>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Run the full pipeline from `input_dir` into `output_dir`.
    ///
    /// `depth` overrides the configured split depth when given.
    ///
    /// # Errors
    ///
    /// Returns an error if the input directory does not exist, if an I/O
    /// operation fails, or if planned edits overlap.
    pub async fn optimize<P: AsRef<Path>>(
        &self,
        input_dir: P,
        output_dir: P,
        depth: Option<usize>,
    ) -> Result<OptimizeResult> {
        let input_dir = input_dir.as_ref();
        let output_dir = output_dir.as_ref();
        let depth = depth.unwrap_or(self.config.split.depth);

        if !tokio::fs::try_exists(input_dir).await.unwrap_or(false) {
            return Err(crate::err!(DirectoryNotFound {
                path: input_dir.to_path_buf(),
            }));
        }
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| TfSculptError::io(output_dir, e, file!(), line!()))?;

        tracing::info!(
            input = %input_dir.display(),
            output = %output_dir.display(),
            depth = depth,
            "starting optimization"
        );

        let mut result = OptimizeResult {
            output_dir: output_dir.to_path_buf(),
            timestamp: Some(chrono::Utc::now()),
            ..OptimizeResult::default()
        };
        let mut catalog = VariableCatalog::new();

        self.run_pass(passes::passthrough::NAME, &mut result, &mut catalog, output_dir, || {
            passes::passthrough::run(&self.config, input_dir)
        })?;
        self.run_pass(passes::pmuser::NAME, &mut result, &mut catalog, output_dir, || {
            passes::pmuser::run(&self.config, input_dir, output_dir)
        })?;
        self.run_pass(passes::rule_params::NAME, &mut result, &mut catalog, output_dir, || {
            passes::rule_params::run(&self.config, output_dir)
        })?;
        self.run_pass(passes::rules_split::NAME, &mut result, &mut catalog, output_dir, || {
            passes::rules_split::run(&self.config, output_dir, depth)
        })?;
        self.run_pass(passes::property_params::NAME, &mut result, &mut catalog, output_dir, || {
            passes::property_params::run(&self.config, input_dir, output_dir, self.resolver.as_ref())
        })?;
        self.run_pass(passes::scaffold::NAME, &mut result, &mut catalog, output_dir, || {
            passes::scaffold::run(&self.config, output_dir)
        })?;
        self.run_pass(passes::imports::NAME, &mut result, &mut catalog, output_dir, || {
            passes::imports::run(input_dir, output_dir)
        })?;
        self.run_pass(passes::restructure::NAME, &mut result, &mut catalog, output_dir, || {
            passes::restructure::run(&self.config, output_dir)
        })?;

        tracing::info!(
            passes = result.passes.len(),
            skipped = result.passes_skipped.len(),
            variables = result.variables_extracted,
            "optimization finished"
        );
        Ok(result)
    }

    /// Run one pass, flush its variables, and record the outcome.
    ///
    /// Recoverable pass errors mark the pass skipped and let the pipeline
    /// continue with the next one; anything else aborts the run.
    fn run_pass<F>(
        &self,
        name: &str,
        result: &mut OptimizeResult,
        catalog: &mut VariableCatalog,
        output_dir: &Path,
        pass: F,
    ) -> Result<()>
    where
        F: FnOnce() -> Result<PassOutcome>,
    {
        match pass() {
            Ok(outcome) => {
                catalog.extend(&outcome.variables);
                catalog.flush(output_dir)?;
                if !outcome.variables.is_empty() {
                    let tfvars = output_dir.join(passes::TERRAFORM_TFVARS);
                    if !result.files_written.contains(&tfvars) {
                        result.files_written.push(tfvars);
                        result
                            .files_written
                            .push(output_dir.join(passes::VARIABLES_TF));
                    }
                }
                result.record(outcome);
                Ok(())
            }
            Err(e) if e.is_recoverable() => {
                tracing::warn!(pass = name, error = %e, "pass skipped");
                result.passes_skipped.push(name.to_string());
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
