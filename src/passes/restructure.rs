//! Final project restructuring.
//!
//! Splits the shared `terraform` and `provider` blocks out of
//! `property.tf` into `versions.tf` and `provider.tf`, then lays out the
//! final tree: the environment root gets the provider config, module call,
//! import blocks and tfvars; the property module gets the property
//! resources, versions and variable declarations. The flat `rules.tf` and
//! all `.bak` backups are removed last.

use crate::config::Config;
use crate::engine::{BlockLocator, EditSet};
use crate::passes::{
    read_file, write_file, IMPORT_TF, MAIN_TF, PROPERTY_TF, PROVIDER_TF, RULES_TF,
    TERRAFORM_TFVARS, VARIABLES_TF, VERSIONS_TF,
};
use crate::types::{Diagnostic, PassOutcome};
use crate::error::TfSculptError;
use std::path::Path;
use walkdir::WalkDir;

/// Pass name used in outcomes and logs.
pub const NAME: &str = "restructure_project";

/// Restructure the working tree under `output_dir` into its final layout.
///
/// # Errors
///
/// Returns an I/O error if a file cannot be read, written, moved, or
/// removed.
pub fn run(config: &Config, output_dir: &Path) -> crate::Result<PassOutcome> {
    let mut outcome = PassOutcome::new(NAME);

    let environments_dir = output_dir.join(&config.output.environment_dir);
    let modules_dir = output_dir.join(&config.output.module_dir);

    split_property_tf(output_dir, &mut outcome)?;

    // Environment root: provider config, module call, imports, tfvars move
    // in; variable declarations and version pins are shared, so they copy
    std::fs::create_dir_all(&environments_dir)
        .map_err(|e| TfSculptError::io(&environments_dir, e, file!(), line!()))?;
    for name in [PROVIDER_TF, MAIN_TF, IMPORT_TF, TERRAFORM_TFVARS] {
        move_if_present(output_dir, &environments_dir, name, &mut outcome)?;
    }
    for name in [VARIABLES_TF, VERSIONS_TF] {
        copy_if_present(output_dir, &environments_dir, name, &mut outcome)?;
    }

    // Property module: the rewritten resources plus their declarations
    std::fs::create_dir_all(&modules_dir)
        .map_err(|e| TfSculptError::io(&modules_dir, e, file!(), line!()))?;
    for name in [PROPERTY_TF, VERSIONS_TF, VARIABLES_TF] {
        move_if_present(output_dir, &modules_dir, name, &mut outcome)?;
    }

    cleanup(output_dir)?;
    tracing::info!(
        environments = %environments_dir.display(),
        modules = %modules_dir.display(),
        "project restructured"
    );
    Ok(outcome)
}

/// Split the `terraform` and `provider` blocks out of `property.tf`.
fn split_property_tf(output_dir: &Path, outcome: &mut PassOutcome) -> crate::Result<()> {
    let property_path = output_dir.join(PROPERTY_TF);
    let content = match read_file(&property_path) {
        Ok(content) => content,
        Err(e) if e.is_recoverable() => {
            outcome.diagnostics.push(
                Diagnostic::warning("property.tf not found, skipping split")
                    .with_file(&property_path),
            );
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let terraform_locator = BlockLocator::for_header(r"(?m)^terraform\s*\{")?;
    let provider_locator = BlockLocator::for_header(r#"provider\s+"[^"]+"\s*\{"#)?;
    let mut edits = EditSet::new();

    if let Some(block) = terraform_locator.find_first(&content) {
        let versions_path = output_dir.join(VERSIONS_TF);
        write_file(
            &versions_path,
            &reframe("terraform", block.body(&content)),
        )?;
        outcome.files_written.push(versions_path);
        edits.replace(block.span, "");
    }

    if let Some(block) = provider_locator.find_first(&content) {
        let provider_path = output_dir.join(PROVIDER_TF);
        write_file(
            &provider_path,
            &reframe("provider \"akamai\"", block.body(&content)),
        )?;
        outcome.files_written.push(provider_path);
        edits.replace(block.span, "");
    }

    if edits.is_empty() {
        return Ok(());
    }

    let remaining = edits.apply(&content)?;
    write_file(&property_path, remaining.trim())?;
    outcome.files_written.push(property_path);
    Ok(())
}

/// Rebuild a standalone block file from a block body, keeping the body's
/// own indentation.
fn reframe(header: &str, body: &str) -> String {
    format!("{header} {{\n{}\n}}\n", body.trim_matches('\n').trim_end())
}

fn move_if_present(
    from_dir: &Path,
    to_dir: &Path,
    name: &str,
    outcome: &mut PassOutcome,
) -> crate::Result<()> {
    let src = from_dir.join(name);
    if !src.exists() {
        return Ok(());
    }
    let dst = to_dir.join(name);
    std::fs::rename(&src, &dst).map_err(|e| TfSculptError::io(&src, e, file!(), line!()))?;
    tracing::debug!(file = name, to = %to_dir.display(), "moved");
    outcome.files_written.push(dst);
    Ok(())
}

fn copy_if_present(
    from_dir: &Path,
    to_dir: &Path,
    name: &str,
    outcome: &mut PassOutcome,
) -> crate::Result<()> {
    let src = from_dir.join(name);
    if !src.exists() {
        return Ok(());
    }
    let dst = to_dir.join(name);
    std::fs::copy(&src, &dst).map_err(|e| TfSculptError::io(&src, e, file!(), line!()))?;
    tracing::debug!(file = name, to = %to_dir.display(), "copied");
    outcome.files_written.push(dst);
    Ok(())
}

/// Remove the flat `rules.tf` and every `.bak` backup in the tree.
fn cleanup(output_dir: &Path) -> crate::Result<()> {
    let rules_path = output_dir.join(RULES_TF);
    if rules_path.exists() {
        std::fs::remove_file(&rules_path)
            .map_err(|e| TfSculptError::io(&rules_path, e, file!(), line!()))?;
        tracing::debug!(file = %rules_path.display(), "removed");
    }

    for entry in WalkDir::new(output_dir).into_iter().filter_map(Result::ok) {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "bak") {
            std::fs::remove_file(path)
                .map_err(|e| TfSculptError::io(path, e, file!(), line!()))?;
            tracing::debug!(file = %path.display(), "backup removed");
        }
    }
    Ok(())
}
