//! Passthrough variable forwarding.
//!
//! Copies the `default =` values of the configured passthrough variables
//! from the input `variables.tf` into the generated `terraform.tfvars`.
//! These variables (activation toggles in the stock configuration) keep
//! their declaration in the input tree; only the assignment moves.

use crate::catalog::{ExtractedVariable, VarValue};
use crate::config::Config;
use crate::engine::BlockLocator;
use crate::passes::{read_file, VARIABLES_TF};
use crate::types::{Diagnostic, PassOutcome};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Pass name used in outcomes and logs.
pub const NAME: &str = "passthrough";

static DEFAULT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"default\s*=\s*(.+)").expect("Invalid regex"));

/// Forward configured variable defaults from `input_dir/variables.tf`.
///
/// A missing input file or an absent variable is a diagnostic, not a
/// failure: exports without activation toggles are valid input.
///
/// # Errors
///
/// Returns an I/O error if the input file exists but cannot be read.
pub fn run(config: &Config, input_dir: &Path) -> crate::Result<PassOutcome> {
    let mut outcome = PassOutcome::new(NAME);

    let path = input_dir.join(VARIABLES_TF);
    let content = match read_file(&path) {
        Ok(content) => content,
        Err(e) if e.is_recoverable() => {
            tracing::warn!(path = %path.display(), "input variables.tf not found");
            outcome
                .diagnostics
                .push(Diagnostic::warning("input variables.tf not found").with_file(&path));
            return Ok(outcome);
        }
        Err(e) => return Err(e),
    };

    let locator = BlockLocator::for_header(r#"variable\s+"([^"]+)"\s*\{"#)?;

    for block in locator.find_blocks(&content) {
        if !config.passthrough.variables.contains(&block.label) {
            continue;
        }
        let Some(caps) = DEFAULT_PATTERN.captures(block.body(&content)) else {
            outcome.diagnostics.push(Diagnostic::warning(format!(
                "passthrough variable '{}' has no default",
                block.label
            )));
            continue;
        };
        let value = caps[1].trim().to_string();
        tracing::info!(name = %block.label, %value, "forwarding passthrough variable");
        outcome.variables.push(ExtractedVariable::assignment_only(
            &block.label,
            VarValue::Raw(value),
        ));
    }

    for name in &config.passthrough.variables {
        if !outcome.variables.iter().any(|v| &v.name == name) && !outcome.has_problems() {
            outcome.diagnostics.push(Diagnostic::info(format!(
                "passthrough variable '{name}' not present in input"
            )));
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_variables_tf(dir: &TempDir, content: &str) {
        std::fs::write(dir.path().join(VARIABLES_TF), content).unwrap();
    }

    #[test]
    fn test_forwards_configured_defaults() {
        let dir = TempDir::new().unwrap();
        write_variables_tf(
            &dir,
            r#"
variable "activate_latest_on_staging" {
  type    = bool
  default = true
}

variable "activate_latest_on_production" {
  type    = bool
  default = false
}

variable "unrelated" {
  type    = string
  default = "keep me out"
}
"#,
        );

        let outcome = run(&Config::default(), dir.path()).unwrap();
        assert_eq!(outcome.variables.len(), 2);
        assert_eq!(outcome.variables[0].name, "activate_latest_on_staging");
        assert_eq!(outcome.variables[0].value, VarValue::Raw("true".to_string()));
        assert!(outcome.variables[0].type_expr.is_none());
        assert_eq!(
            outcome.variables[1].render_assignment(),
            "activate_latest_on_production = false\n"
        );
    }

    #[test]
    fn test_variable_without_default_is_diagnostic() {
        let dir = TempDir::new().unwrap();
        write_variables_tf(
            &dir,
            "variable \"activate_latest_on_staging\" {\n  type = bool\n}\n",
        );

        let outcome = run(&Config::default(), dir.path()).unwrap();
        assert!(outcome.variables.is_empty());
        assert!(outcome.has_problems());
    }

    #[test]
    fn test_missing_input_file_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let outcome = run(&Config::default(), dir.path()).unwrap();
        assert!(outcome.variables.is_empty());
        assert!(outcome.has_problems());
    }
}
