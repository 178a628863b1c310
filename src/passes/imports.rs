//! Import command translation.
//!
//! The export ships an `import.sh` of `terraform import` commands. This
//! pass translates each command into a declarative `import {}` block
//! targeting the resource's new address inside the property module, so the
//! restructured project can adopt existing state without running a script.

use crate::passes::{read_file, write_file, IMPORT_SH, IMPORT_TF};
use crate::types::{Diagnostic, PassOutcome};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Pass name used in outcomes and logs.
pub const NAME: &str = "convert_imports";

static IMPORT_COMMAND_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"terraform import ([\w_]+)\.([\w_.-]+) (.+)").expect("Invalid regex")
});

/// One parsed `terraform import` command.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ImportCommand {
    resource_type: String,
    resource_name: String,
    resource_id: String,
}

impl ImportCommand {
    /// The resource's address inside the property module. Edge hostnames
    /// key into the collapsed `for_each` map by resource name.
    fn module_address(&self) -> String {
        if self.resource_type == "akamai_edge_hostname" {
            format!(
                "module.akamai_property.akamai_edge_hostname.edge_hostnames[\"{}\"]",
                self.resource_name
            )
        } else {
            format!(
                "module.akamai_property.{}.{}",
                self.resource_type, self.resource_name
            )
        }
    }

    fn render(&self) -> String {
        format!(
            "import {{\n  to = {}\n  id = \"{}\"\n}}\n",
            self.module_address(),
            self.resource_id
        )
    }
}

/// Translate `input_dir/import.sh` into `output_dir/import.tf`.
///
/// # Errors
///
/// Returns an I/O error if the script exists but cannot be read, or the
/// output cannot be written.
pub fn run(input_dir: &Path, output_dir: &Path) -> crate::Result<PassOutcome> {
    let mut outcome = PassOutcome::new(NAME);

    let script_path = input_dir.join(IMPORT_SH);
    let content = match read_file(&script_path) {
        Ok(content) => content,
        Err(e) if e.is_recoverable() => {
            outcome.diagnostics.push(
                Diagnostic::info("no import.sh in input, skipping import.tf")
                    .with_file(&script_path),
            );
            return Ok(outcome);
        }
        Err(e) => return Err(e),
    };

    let commands: Vec<ImportCommand> = IMPORT_COMMAND_PATTERN
        .captures_iter(&content)
        .map(|caps| ImportCommand {
            resource_type: caps[1].to_string(),
            resource_name: caps[2].to_string(),
            resource_id: caps[3].trim().to_string(),
        })
        .collect();

    if commands.is_empty() {
        outcome
            .diagnostics
            .push(Diagnostic::warning("no import commands found in import.sh"));
        return Ok(outcome);
    }

    let blocks: Vec<String> = commands.iter().map(ImportCommand::render).collect();
    let output_path = output_dir.join(IMPORT_TF);
    write_file(&output_path, &blocks.join("\n"))?;
    tracing::info!(
        imports = commands.len(),
        file = %output_path.display(),
        "import.tf generated"
    );
    outcome.files_written.push(output_path);
    Ok(outcome)
}
