//! The domain passes.
//!
//! Each pass reads from the input or working tree, plans its rewrites
//! through the engine, and returns a [`PassOutcome`](crate::types::PassOutcome)
//! with the variables it extracted and the files it touched. Passes never
//! write `variables.tf` or `terraform.tfvars` themselves; the orchestrator
//! flushes the shared catalog between passes.
//!
//! Pipeline order:
//!
//! 1. [`passthrough`]: forward selected variable defaults into tfvars
//! 2. [`pmuser`]: collapse PMUSER variable blocks into one dynamic block
//! 3. [`rule_params`]: extract rule-tree literals into variables
//! 4. [`rules_split`]: partition the rule tree across module files
//! 5. [`property_params`]: parameterize the property and edge hostnames
//! 6. [`scaffold`]: generate the module call in `main.tf`
//! 7. [`imports`]: translate `import.sh` into `import {}` blocks
//! 8. [`restructure`]: split shared files and lay out the final tree

pub mod imports;
pub mod passthrough;
pub mod pmuser;
pub mod property_params;
pub mod restructure;
pub mod rule_params;
pub mod rules_split;
pub mod scaffold;

pub use property_params::{HyphenToDotResolver, ReferenceResolver};

use crate::error::{Result, TfSculptError};
use std::path::{Path, PathBuf};

/// Well-known file names in the working tree.
pub const RULES_TF: &str = "rules.tf";
pub const VARIABLES_TF: &str = "variables.tf";
pub const TERRAFORM_TFVARS: &str = "terraform.tfvars";
pub const PROPERTY_TF: &str = "property.tf";
pub const MAIN_TF: &str = "main.tf";
pub const IMPORT_SH: &str = "import.sh";
pub const IMPORT_TF: &str = "import.tf";
pub const VERSIONS_TF: &str = "versions.tf";
pub const PROVIDER_TF: &str = "provider.tf";

/// Read a file, mapping a missing file to `FileNotFound`.
pub(crate) fn read_file(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(crate::err!(FileNotFound {
                path: path.to_path_buf(),
            }))
        }
        Err(e) => Err(TfSculptError::io(path, e, file!(), line!())),
    }
}

/// Write a file, creating parent directories as needed.
pub(crate) fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| TfSculptError::io(parent, e, file!(), line!()))?;
    }
    std::fs::write(path, content).map_err(|e| TfSculptError::io(path, e, file!(), line!()))
}

/// Write `path` after saving its pre-rewrite content to `path.bak`.
///
/// The backup carries the buffer passed as `original`, not whatever is on
/// disk, so a crash between the two writes still leaves a faithful copy.
pub(crate) fn backup_then_write(
    path: &Path,
    original: &str,
    content: &str,
    backup: bool,
) -> Result<PathBuf> {
    let backup_path = backup_path_for(path);
    if backup {
        write_file(&backup_path, original)?;
        tracing::debug!(backup = %backup_path.display(), "backup written");
    }
    write_file(path, content)?;
    Ok(backup_path)
}

/// The `.bak` sibling for a path.
pub(crate) fn backup_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// Copy a file from the input tree into the working tree unchanged.
pub(crate) fn copy_through(input_dir: &Path, output_dir: &Path, name: &str) -> Result<PathBuf> {
    let src = input_dir.join(name);
    let dst = output_dir.join(name);
    let content = read_file(&src)?;
    write_file(&dst, &content)?;
    Ok(dst)
}
