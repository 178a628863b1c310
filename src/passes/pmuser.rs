//! PMUSER variable collapse.
//!
//! The root rule block of an Akamai export declares one `variable { ... }`
//! sub-block per property-manager user variable, each named with the
//! `PMUSER_` prefix. This pass collects them into a single map variable
//! and replaces the whole run of blocks with a `dynamic "variable"` block
//! iterating over that map. When the export declares none, `rules.tf` is
//! copied through unchanged.

use crate::catalog::{ExtractedVariable, VarValue};
use crate::config::Config;
use crate::engine::{BlockLocator, EditSet, Span};
use crate::passes::{backup_then_write, copy_through, read_file, RULES_TF};
use crate::types::{Diagnostic, PassOutcome};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Pass name used in outcomes and logs.
pub const NAME: &str = "pmuser";

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"name\s*=\s*"([^"]+)""#).expect("Invalid regex"));
static DESCRIPTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"description\s*=\s*"([^"]*)""#).expect("Invalid regex"));
static VALUE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"value\s*=\s*"([^"]*)""#).expect("Invalid regex"));
static HIDDEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"hidden\s*=\s*(true|false)").expect("Invalid regex"));
static SENSITIVE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sensitive\s*=\s*(true|false)").expect("Invalid regex"));

/// One PMUSER variable as declared in the export.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PmUserVariable {
    /// Key with the prefix stripped
    key: String,
    description: String,
    value: String,
    hidden: bool,
    sensitive: bool,
}

const DYNAMIC_BLOCK: &str = r#"dynamic "variable" {
      for_each = var.pmuser_variables
      content {
        name        = "PMUSER_${upper(variable.key)}"
        description = variable.value.description
        value       = variable.value.value
        hidden      = variable.value.hidden
        sensitive   = variable.value.sensitive
      }
    }"#;

/// Collapse PMUSER variable blocks in `input_dir/rules.tf`, writing the
/// result to `output_dir/rules.tf`.
///
/// # Errors
///
/// Returns an error on I/O failure or an invalid root-marker pattern.
pub fn run(config: &Config, input_dir: &Path, output_dir: &Path) -> crate::Result<PassOutcome> {
    let mut outcome = PassOutcome::new(NAME);

    let input_path = input_dir.join(RULES_TF);
    let content = read_file(&input_path)?;

    let root_pattern = format!(
        r#"data\s+"akamai_property_rules_builder"\s+"([^"]+{})"\s*\{{"#,
        regex::escape(&config.extraction.root_marker)
    );
    let root_locator = BlockLocator::for_header(&root_pattern)?;
    let variable_locator = BlockLocator::for_header(r"variable\s*\{")?;

    let mut collected: Vec<PmUserVariable> = Vec::new();
    let mut edits = EditSet::new();

    for root in root_locator.find_blocks(&content) {
        // Offsets below are relative to the root body, shifted back into
        // buffer coordinates before planning the edit.
        let body = root.body(&content);
        let mut run_start: Option<usize> = None;
        let mut run_end = 0usize;

        for var_block in variable_locator.find_blocks(body) {
            let text = var_block.text(body);
            let Some(name) = NAME_PATTERN.captures(text).map(|c| c[1].to_string()) else {
                continue;
            };
            let Some(key) = name.strip_prefix(&config.extraction.pmuser_prefix) else {
                continue;
            };

            collected.push(PmUserVariable {
                key: key.to_string(),
                description: capture_or_default(&DESCRIPTION_PATTERN, text),
                value: capture_or_default(&VALUE_PATTERN, text),
                hidden: capture_bool(&HIDDEN_PATTERN, text),
                sensitive: capture_bool(&SENSITIVE_PATTERN, text),
            });

            run_start.get_or_insert(var_block.span.start);
            run_end = run_end.max(var_block.span.end);
        }

        if let Some(start) = run_start {
            edits.replace(
                Span::new(root.body_span.start + start, root.body_span.start + run_end),
                DYNAMIC_BLOCK,
            );
            tracing::info!(rule = %root.label, "collapsing PMUSER variable blocks");
        }
    }

    let output_path = output_dir.join(RULES_TF);
    if collected.is_empty() {
        copy_through(input_dir, output_dir, RULES_TF)?;
        outcome.files_written.push(output_path);
        outcome
            .diagnostics
            .push(Diagnostic::info("no PMUSER variables found, rules.tf copied unchanged"));
        return Ok(outcome);
    }

    let rewritten = edits.apply(&content)?;
    let backup = backup_then_write(&output_path, &content, &rewritten, config.output.backup)?;
    if config.output.backup {
        outcome.files_written.push(backup);
    }
    outcome.files_written.push(output_path);

    outcome.variables.push(pmuser_map_variable(&collected));
    tracing::info!(count = collected.len(), "PMUSER variables extracted");
    Ok(outcome)
}

fn capture_or_default(pattern: &Regex, text: &str) -> String {
    pattern
        .captures(text)
        .map(|c| c[1].to_string())
        .unwrap_or_default()
}

fn capture_bool(pattern: &Regex, text: &str) -> bool {
    pattern.captures(text).is_some_and(|c| &c[1] == "true")
}

/// Render the collected variables as one `map(object(...))` entry.
fn pmuser_map_variable(collected: &[PmUserVariable]) -> ExtractedVariable {
    let mut map = String::from("{\n");
    for var in collected {
        map.push_str(&format!("  \"{}\" = {{\n", var.key));
        map.push_str(&format!("    description = \"{}\"\n", var.description));
        map.push_str(&format!("    value       = \"{}\"\n", var.value));
        map.push_str(&format!("    hidden      = {}\n", var.hidden));
        map.push_str(&format!("    sensitive   = {}\n", var.sensitive));
        map.push_str("  },\n");
    }
    map.push('}');

    ExtractedVariable {
        name: "pmuser_variables".to_string(),
        type_expr: Some(
            "map(object({\n    description = string\n    value       = string\n    hidden      = bool\n    sensitive   = bool\n  }))"
                .to_string(),
        ),
        description: Some(
            "Map of PMUSER variables with their descriptions and sensitivity settings".to_string(),
        ),
        value: VarValue::Raw(map),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const RULES_WITH_PMUSER: &str = r#"data "akamai_property_rules_builder" "www_example_com_rule_default" {
  rules_v2023_01_05 {
    name = "default"
    variable {
      name        = "PMUSER_ORIGIN"
      description = "Origin override"
      value       = "origin.example.com"
      hidden      = false
      sensitive   = false
    }
    variable {
      name        = "PMUSER_TOKEN"
      description = "Edge token"
      value       = ""
      hidden      = true
      sensitive   = true
    }
    behavior {
      caching {
        behavior = "MAX_AGE"
      }
    }
  }
}
"#;

    fn run_in(content: &str) -> (TempDir, TempDir, PassOutcome) {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        std::fs::write(input.path().join(RULES_TF), content).unwrap();
        let outcome = run(&Config::default(), input.path(), output.path()).unwrap();
        (input, output, outcome)
    }

    #[test]
    fn test_collects_and_collapses_variables() {
        let (_input, output, outcome) = run_in(RULES_WITH_PMUSER);

        assert_eq!(outcome.variables.len(), 1);
        let map = &outcome.variables[0];
        assert_eq!(map.name, "pmuser_variables");
        let rendered = map.value.render();
        assert!(rendered.contains("\"ORIGIN\""));
        assert!(rendered.contains("\"TOKEN\""));
        assert!(rendered.contains("sensitive   = true"));

        let rewritten =
            std::fs::read_to_string(output.path().join(RULES_TF)).unwrap();
        assert!(rewritten.contains("dynamic \"variable\""));
        assert!(rewritten.contains("for_each = var.pmuser_variables"));
        // Original per-variable blocks are gone, surrounding blocks survive
        assert!(!rewritten.contains("PMUSER_ORIGIN"));
        assert!(rewritten.contains("behavior"));
        assert!(rewritten.contains("MAX_AGE"));
    }

    #[test]
    fn test_backup_written_before_rewrite() {
        let (_input, output, outcome) = run_in(RULES_WITH_PMUSER);

        let backup_path = output.path().join("rules.tf.bak");
        assert!(backup_path.exists());
        let backup = std::fs::read_to_string(backup_path).unwrap();
        assert_eq!(backup, RULES_WITH_PMUSER);
        assert_eq!(outcome.files_written.len(), 2);
    }

    #[test]
    fn test_no_pmuser_variables_copies_through() {
        let plain = r#"data "akamai_property_rules_builder" "www_rule_default" {
  rules_v2023_01_05 {
    name = "default"
  }
}
"#;
        let (_input, output, outcome) = run_in(plain);

        assert!(outcome.variables.is_empty());
        let copied = std::fs::read_to_string(output.path().join(RULES_TF)).unwrap();
        assert_eq!(copied, plain);
        assert!(!output.path().join("rules.tf.bak").exists());
    }

    #[test]
    fn test_non_pmuser_variable_blocks_kept() {
        let mixed = r#"data "akamai_property_rules_builder" "www_rule_default" {
  rules_v2023_01_05 {
    variable {
      name  = "OTHER_VAR"
      value = "kept"
    }
    variable {
      name  = "PMUSER_ONE"
      value = "collapsed"
    }
  }
}
"#;
        let (_input, output, outcome) = run_in(mixed);

        assert_eq!(outcome.variables.len(), 1);
        let rewritten = std::fs::read_to_string(output.path().join(RULES_TF)).unwrap();
        assert!(!rewritten.contains("PMUSER_ONE"));
        assert!(rewritten.contains("dynamic \"variable\""));
    }
}
