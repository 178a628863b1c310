//! Command-line interface module.
//!
//! This module defines the CLI structure using Clap, including
//! all commands, arguments, and options.
//!
//! # Commands
//!
//! - `optimize`: Convert a flat property export into a module layout
//! - `init`: Create an example configuration file
//! - `validate`: Validate a configuration file
//!
//! # Example Usage
//!
//! ```bash
//! # Optimize an export in place
//! tfsculpt optimize -i ./export -o ./result
//!
//! # Split the rule tree two levels deep
//! tfsculpt optimize -i ./export -o ./result --depth 2
//!
//! # Machine-readable run summary
//! tfsculpt optimize -i ./export --format json --output run.json
//!
//! # Initialize configuration
//! tfsculpt init
//!
//! # Validate configuration
//! tfsculpt validate tfsculpt.yaml
//! ```

use crate::types::ReportFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// TfSculpt - Terraform property export restructurer.
#[derive(Parser, Debug)]
#[command(
    name = "tfsculpt",
    author,
    version,
    about = "Restructure flat Terraform property exports into parameterized modules",
    long_about = "TfSculpt takes the flat, hand-exported Terraform configuration of an Akamai \
                  property, extracts its hardcoded literals into variables, splits the rule \
                  tree across files by hierarchy depth, and lays the result out as a reusable \
                  module with per-environment roots."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        id = "config_file",
        short,
        long = "config",
        global = true,
        env = "TFSCULPT_CONFIG"
    )]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Restructure a flat property export into a parameterized module
    #[command(visible_alias = "o")]
    Optimize(OptimizeArgs),

    /// Create an example configuration file
    Init,

    /// Validate a configuration file
    Validate(ValidateArgs),
}

/// Arguments for the optimize command.
#[derive(Args, Debug)]
pub struct OptimizeArgs {
    /// Directory holding the exported configuration
    #[arg(short, long = "input-dir", value_name = "DIR")]
    pub input_dir: PathBuf,

    /// Maximum rule hierarchy depth split into separate files
    #[arg(short, long, value_name = "N")]
    pub depth: Option<usize>,

    /// Directory to write the restructured project to
    #[arg(short, long = "output-dir", value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Summary format
    #[arg(short, long, default_value = "text", value_enum)]
    pub format: ReportFormat,

    /// Summary file path (stdout if not specified)
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Arguments for the validate command.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(value_name = "FILE", default_value = "tfsculpt.yaml")]
    pub config: PathBuf,
}
