//! Configuration module for tfsculpt.
//!
//! This module handles loading and validating configuration from:
//! - YAML configuration files (`tfsculpt.yaml`)
//! - CLI arguments
//!
//! # Configuration File Format
//!
//! ```yaml
//! # tfsculpt.yaml
//!
//! # Literal extraction options
//! extraction:
//!   target_paths:
//!     - [origin, hostname]
//!     - [cp_code, value, id]
//!   pmuser_prefix: "PMUSER_"
//!   root_marker: "_rule_default"
//!   partition_marker: "_rule_"
//!
//! # Rule tree splitting
//! split:
//!   depth: 1
//!
//! # Variables forwarded from the input variables.tf into terraform.tfvars
//! passthrough:
//!   variables:
//!     - activate_latest_on_staging
//!     - activate_latest_on_production
//!
//! # Output options
//! output:
//!   colored: true
//!   pretty: true
//!   backup: true
//!   module_dir: modules/property
//!   environment_dir: environments/prod
//! ```

use crate::error::{Result, TfSculptError};
use serde::{Deserialize, Serialize};

/// Literal extraction options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionOptions {
    /// Nested key paths to extract from each rule's behavior blocks.
    pub target_paths: Vec<Vec<String>>,

    /// Prefix identifying property-manager user variables.
    pub pmuser_prefix: String,

    /// Substring marking the root rule block's name.
    pub root_marker: String,

    /// Marker whose suffix forms a rule's short partition name.
    pub partition_marker: String,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            target_paths: vec![
                vec!["origin".to_string(), "hostname".to_string()],
                vec!["cp_code".to_string(), "value".to_string(), "id".to_string()],
            ],
            pmuser_prefix: "PMUSER_".to_string(),
            root_marker: "_rule_default".to_string(),
            partition_marker: "_rule_".to_string(),
        }
    }
}

/// Rule tree splitting options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitOptions {
    /// Maximum hierarchy depth split into separate files.
    pub depth: usize,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self { depth: 1 }
    }
}

/// Passthrough variable options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PassthroughOptions {
    /// Variables whose defaults are copied from the input `variables.tf`
    /// into the generated `terraform.tfvars`.
    pub variables: Vec<String>,
}

impl Default for PassthroughOptions {
    fn default() -> Self {
        Self {
            variables: vec![
                "activate_latest_on_staging".to_string(),
                "activate_latest_on_production".to_string(),
            ],
        }
    }
}

/// Output options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    /// Use colored output.
    pub colored: bool,

    /// Pretty-print JSON output.
    pub pretty: bool,

    /// Verbose summary output.
    pub verbose: bool,

    /// Write a `.bak` copy before destructive rewrites.
    pub backup: bool,

    /// Directory (relative to the output dir) for the property module.
    pub module_dir: String,

    /// Directory (relative to the output dir) for the environment root.
    pub environment_dir: String,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            colored: true,
            pretty: true,
            verbose: false,
            backup: true,
            module_dir: "modules/property".to_string(),
            environment_dir: "environments/prod".to_string(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Literal extraction options.
    pub extraction: ExtractionOptions,
    /// Rule tree splitting options.
    pub split: SplitOptions,
    /// Passthrough variable options.
    pub passthrough: PassthroughOptions,
    /// Output options.
    pub output: OutputOptions,
}

impl Config {
    /// Parse a configuration from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or fails validation.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| TfSculptError::ConfigParse {
            message: e.to_string(),
            source: Some(Box::new(e)),
            src_path: file!(),
            src_line: line!(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigValue` error for out-of-range or empty values.
    pub fn validate(&self) -> Result<()> {
        if self.extraction.partition_marker.is_empty() {
            return Err(crate::err!(ConfigValue {
                key: "extraction.partition_marker".to_string(),
                message: "must not be empty".to_string(),
            }));
        }
        if self.extraction.root_marker.is_empty() {
            return Err(crate::err!(ConfigValue {
                key: "extraction.root_marker".to_string(),
                message: "must not be empty".to_string(),
            }));
        }
        for path in &self.extraction.target_paths {
            if path.len() < 2 {
                return Err(crate::err!(ConfigValue {
                    key: "extraction.target_paths".to_string(),
                    message: format!(
                        "path {:?} too short; need at least a behavior and a key",
                        path
                    ),
                }));
            }
        }
        Ok(())
    }

    /// An example YAML configuration with all defaults spelled out.
    #[must_use]
    pub fn example_yaml() -> String {
        let defaults = Self::default();
        format!(
            "# tfsculpt configuration\n\n{}",
            serde_yaml::to_string(&defaults).unwrap_or_default()
        )
    }
}
