//! Rule tree parameterization.
//!
//! Walks every rules-builder data block in the working `rules.tf`, descends
//! into its versioned `rules_v*` block, and extracts the configured target
//! paths (origin hostname, CP code id in the stock configuration) as
//! variables named `{rule_suffix}_{behavior}_{key}`. Each literal is then
//! replaced with the matching `var.` reference in one planned edit set.

use crate::catalog::{ExtractedVariable, VarValue};
use crate::config::Config;
use crate::engine::{extract_field, BlockLocator, EditSet, FieldValue};
use crate::passes::{backup_then_write, read_file, RULES_TF};
use crate::types::{Diagnostic, PassOutcome};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Pass name used in outcomes and logs.
pub const NAME: &str = "rules_parameterization";

static RULE_SUFFIX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"rule_(.+)$").expect("Invalid regex"));

/// Parameterize the rule tree in `output_dir/rules.tf` in place.
///
/// # Errors
///
/// Returns an error on I/O failure or when planned edits overlap.
pub fn run(config: &Config, output_dir: &Path) -> crate::Result<PassOutcome> {
    let mut outcome = PassOutcome::new(NAME);

    let path = output_dir.join(RULES_TF);
    let content = read_file(&path)?;

    let data_locator =
        BlockLocator::for_header(r#"data\s+"akamai_property_rules_builder"\s+"([^"]+)"\s*\{"#)?;
    let rules_locator = BlockLocator::for_header(r"rules_v[0-9_]+\s*\{")?;

    let mut edits = EditSet::new();

    for data_block in data_locator.find_blocks(&content) {
        let Some(suffix) = RULE_SUFFIX_PATTERN
            .captures(&data_block.label)
            .map(|c| c[1].to_string())
        else {
            outcome.diagnostics.push(Diagnostic::info(format!(
                "data block '{}' has no rule suffix, skipping",
                data_block.label
            )));
            continue;
        };

        // Scope the versioned rules block within this data block only
        let body = data_block.body(&content);
        let Some(rules_block) = rules_locator.find_first(body) else {
            outcome.diagnostics.push(Diagnostic::warning(format!(
                "no versioned rules block in '{}'",
                data_block.label
            )));
            continue;
        };
        // Shift back into buffer coordinates
        let rules_block = crate::engine::Block {
            label: rules_block.label,
            span: rules_block.span.offset(data_block.body_span.start),
            body_span: rules_block.body_span.offset(data_block.body_span.start),
        };

        for target in &config.extraction.target_paths {
            let path_refs: Vec<&str> = target.iter().map(String::as_str).collect();
            let Some(field) = extract_field(&content, &rules_block, &path_refs) else {
                continue;
            };

            let behavior = &target[0];
            let terminal = &target[target.len() - 1];
            let var_name = format!("{suffix}_{behavior}_{terminal}");

            tracing::info!(
                name = %var_name,
                value = %field.value.as_str(),
                "extracted rule literal"
            );
            edits.push(field.replacement_edit(&content, &format!("var.{var_name}")));

            let value = match &field.value {
                FieldValue::Str(s) => VarValue::Str(s.clone()),
                FieldValue::Int(n) => VarValue::Int(*n),
            };
            outcome.variables.push(
                ExtractedVariable::declared(var_name, value)
                    .with_description("Extracted from the property rule tree"),
            );
        }
    }

    if edits.is_empty() {
        outcome
            .diagnostics
            .push(Diagnostic::info("no rule literals matched the target paths"));
        return Ok(outcome);
    }

    let rewritten = edits.apply(&content)?;
    let backup = backup_then_write(&path, &content, &rewritten, config.output.backup)?;
    if config.output.backup {
        outcome.files_written.push(backup);
    }
    outcome.files_written.push(path);
    Ok(outcome)
}
