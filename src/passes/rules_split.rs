//! Rule tree splitting.
//!
//! Locates every rules-builder data block in the working `rules.tf`,
//! builds the rule hierarchy from the declared `children` references, and
//! writes one `<partition>.tf` per depth-cutoff partition under the module
//! directory. Blocks land in hierarchy discovery order, separated by blank
//! lines.

use crate::config::Config;
use crate::engine::{assign_partitions, Block, BlockLocator, HierarchyBuilder};
use crate::passes::write_file;
use crate::types::{Diagnostic, PassOutcome};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

/// Pass name used in outcomes and logs.
pub const NAME: &str = "rules_break_down";

static CHILD_REF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"data\.akamai_property_rules_builder\.([\w-]+)\.json").expect("Invalid regex")
});

/// Locate the data block declared with exactly `name`.
fn locate_rule(text: &str, name: &str) -> Option<Block> {
    let pattern = format!(
        r#"data\s+"akamai_property_rules_builder"\s+"{}"\s*\{{"#,
        regex::escape(name)
    );
    BlockLocator::for_header(&pattern).ok()?.find_first(text)
}

/// Child names referenced from a block body's `children` attribute.
fn extract_children(body: &str) -> Vec<String> {
    CHILD_REF_PATTERN
        .captures_iter(body)
        .map(|c| c[1].to_string())
        .collect()
}

/// Split `output_dir/rules.tf` into per-partition files under the module
/// directory at the configured depth.
///
/// # Errors
///
/// Returns an error on I/O failure or a malformed hierarchy (cycle or
/// duplicate parent).
pub fn run(config: &Config, output_dir: &Path, depth: usize) -> crate::Result<PassOutcome> {
    let mut outcome = PassOutcome::new(NAME);

    let rules_path = output_dir.join(crate::passes::RULES_TF);
    let content = crate::passes::read_file(&rules_path)?;
    let module_dir = output_dir.join(&config.output.module_dir);

    let declaration_locator =
        BlockLocator::for_header(r#"data\s+"akamai_property_rules_builder"\s+"([\w-]+)"\s*\{"#)?;
    let declared: Vec<String> = declaration_locator
        .find_blocks(&content)
        .map(|b| b.label)
        .collect();

    let Some(root) = declared
        .iter()
        .find(|name| name.contains(&config.extraction.root_marker))
    else {
        tracing::warn!(marker = %config.extraction.root_marker, "root rule not found");
        outcome.diagnostics.push(
            Diagnostic::error(format!(
                "no rule name contains the root marker '{}'",
                config.extraction.root_marker
            ))
            .with_file(&rules_path),
        );
        return Ok(outcome);
    };

    let builder = HierarchyBuilder::new(locate_rule, extract_children);
    let hierarchy = builder.build(&content, root)?;

    let marker = config.extraction.partition_marker.clone();
    let normalize = move |name: &str| {
        name.rsplit_once(marker.as_str())
            .map_or_else(|| name.to_string(), |(_, suffix)| suffix.to_string())
    };
    let assignment = assign_partitions(&hierarchy, depth, normalize);

    // Group block texts by partition, preserving discovery order within
    // each file
    let mut grouped: HashMap<&str, Vec<&str>> = HashMap::new();
    for node in hierarchy.iter() {
        let Some(key) = assignment.partition_for(&node.name) else {
            continue;
        };
        match locate_rule(&content, &node.name) {
            Some(block) => grouped.entry(key).or_default().push(block.text(&content)),
            None => {
                outcome.diagnostics.push(Diagnostic::warning(format!(
                    "rule '{}' referenced but its block was not found",
                    node.name
                )));
            }
        }
    }

    for key in assignment.partitions() {
        let Some(blocks) = grouped.get(key) else {
            continue;
        };
        let path = module_dir.join(format!("{key}.tf"));
        write_file(&path, &blocks.join("\n\n"))?;
        tracing::info!(
            file = %path.display(),
            rules = blocks.len(),
            "partition file written"
        );
        outcome.files_written.push(path);
    }

    tracing::info!(
        partitions = assignment.partition_count(),
        depth = depth,
        "rule tree split"
    );
    Ok(outcome)
}
