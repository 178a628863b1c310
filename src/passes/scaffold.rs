//! Environment scaffold generation.
//!
//! Reads the variable names assigned in the generated `terraform.tfvars`
//! and emits `main.tf` with a single call to the property module, wiring
//! every variable through as `name = var.name`.

use crate::config::Config;
use crate::passes::{read_file, write_file, MAIN_TF, TERRAFORM_TFVARS};
use crate::types::{Diagnostic, PassOutcome};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Pass name used in outcomes and logs.
pub const NAME: &str = "generate_main_tf";

static ASSIGNMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([a-zA-Z_][a-zA-Z0-9_-]*)\s*=").expect("Invalid regex")
});

/// Column the `=` signs align to in the generated module call.
const ASSIGNMENT_WIDTH: usize = 30;

/// Generate `output_dir/main.tf` from the tfvars assignments.
///
/// # Errors
///
/// Returns an I/O error if tfvars exists but cannot be read, or main.tf
/// cannot be written.
pub fn run(config: &Config, output_dir: &Path) -> crate::Result<PassOutcome> {
    let mut outcome = PassOutcome::new(NAME);

    let tfvars_path = output_dir.join(TERRAFORM_TFVARS);
    let content = match read_file(&tfvars_path) {
        Ok(content) => content,
        Err(e) if e.is_recoverable() => {
            outcome.diagnostics.push(
                Diagnostic::warning("terraform.tfvars not found, skipping main.tf")
                    .with_file(&tfvars_path),
            );
            return Ok(outcome);
        }
        Err(e) => return Err(e),
    };

    let names: Vec<&str> = ASSIGNMENT_PATTERN
        .captures_iter(&content)
        .map(|c| c.get(1).expect("group 1 always present").as_str())
        .collect();

    if names.is_empty() {
        outcome
            .diagnostics
            .push(Diagnostic::warning("no variables assigned in terraform.tfvars"));
        return Ok(outcome);
    }

    let mut module_block = String::from("module \"akamai_property\" {\n");
    module_block.push_str(&format!(
        "  source = \"../../{}\"\n",
        config.output.module_dir
    ));
    for name in &names {
        module_block.push_str(&format!("  {name:<ASSIGNMENT_WIDTH$} = var.{name}\n"));
    }
    module_block.push_str("}\n");

    let main_path = output_dir.join(MAIN_TF);
    write_file(&main_path, &module_block)?;
    tracing::info!(variables = names.len(), file = %main_path.display(), "main.tf generated");
    outcome.files_written.push(main_path);
    Ok(outcome)
}
