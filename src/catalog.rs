//! The variable catalog.
//!
//! Passes extract literals and return them as [`ExtractedVariable`]s; the
//! orchestrator owns a single [`VariableCatalog`] that accumulates them and
//! flushes the increments to `variables.tf` and `terraform.tfvars`. The
//! catalog appends rather than regenerates, and a name already declared in
//! the file on disk is skipped, so re-running the pipeline over its own
//! output never duplicates declarations.

use crate::error::{Result, TfSculptError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A variable's value, as it should appear in `terraform.tfvars`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VarValue {
    /// Quoted string
    Str(String),
    /// Bare integer
    Int(i64),
    /// Bare boolean
    Bool(bool),
    /// Pre-rendered HCL, written verbatim
    Raw(String),
}

impl VarValue {
    /// Render the value as HCL.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Str(s) => format!("\"{s}\""),
            Self::Int(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Raw(raw) => raw.clone(),
        }
    }

    /// The Terraform type keyword for this value, if it has a scalar one.
    #[must_use]
    pub fn type_keyword(&self) -> Option<&'static str> {
        match self {
            Self::Str(_) => Some("string"),
            Self::Int(_) => Some("number"),
            Self::Bool(_) => Some("bool"),
            Self::Raw(_) => None,
        }
    }
}

/// A variable extracted by a pass, ready for declaration and assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedVariable {
    /// Variable name, e.g. `default_origin_hostname`
    pub name: String,

    /// Terraform type expression for the `variable` block. `None` means
    /// the variable is assigned in `terraform.tfvars` only, with no
    /// declaration (callers declare it elsewhere).
    pub type_expr: Option<String>,

    /// Description for the `variable` block
    pub description: Option<String>,

    /// The extracted value
    pub value: VarValue,
}

impl ExtractedVariable {
    /// Create a declared variable with a scalar type inferred from the value.
    #[must_use]
    pub fn declared(name: impl Into<String>, value: VarValue) -> Self {
        let type_expr = value.type_keyword().map(str::to_string);
        Self {
            name: name.into(),
            type_expr,
            description: None,
            value,
        }
    }

    /// Create a tfvars-only assignment without a declaration.
    #[must_use]
    pub fn assignment_only(name: impl Into<String>, value: VarValue) -> Self {
        Self {
            name: name.into(),
            type_expr: None,
            description: None,
            value,
        }
    }

    /// Attach a description to the declaration.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Render the `variable` block, or `None` for tfvars-only entries.
    #[must_use]
    pub fn render_declaration(&self) -> Option<String> {
        let type_expr = self.type_expr.as_deref()?;
        let mut block = format!("variable \"{}\" {{\n  type = {}\n", self.name, type_expr);
        if let Some(description) = &self.description {
            block.push_str(&format!("  description = \"{description}\"\n"));
        }
        block.push_str("}\n");
        Some(block)
    }

    /// Render the `terraform.tfvars` assignment line.
    #[must_use]
    pub fn render_assignment(&self) -> String {
        format!("{} = {}\n", self.name, self.value.render())
    }
}

/// Accumulates extracted variables and flushes them to disk incrementally.
#[derive(Debug, Default)]
pub struct VariableCatalog {
    variables: Vec<ExtractedVariable>,
    // Index of the first variable not yet flushed
    flushed: usize,
}

impl VariableCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable. A name already present in the catalog is skipped
    /// and `false` is returned.
    pub fn add(&mut self, variable: ExtractedVariable) -> bool {
        if self.variables.iter().any(|v| v.name == variable.name) {
            tracing::debug!(name = %variable.name, "variable already cataloged, skipping");
            return false;
        }
        self.variables.push(variable);
        true
    }

    /// Add every variable from a pass outcome.
    pub fn extend(&mut self, variables: &[ExtractedVariable]) {
        for variable in variables {
            self.add(variable.clone());
        }
    }

    /// All cataloged variables, in insertion order.
    #[must_use]
    pub fn variables(&self) -> &[ExtractedVariable] {
        &self.variables
    }

    /// Number of cataloged variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Append the not-yet-flushed variables to `variables.tf` and
    /// `terraform.tfvars` under `dir`, creating the files when absent.
    /// Names already declared in the files on disk are skipped.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the files cannot be read or written.
    pub fn flush(&mut self, dir: &Path) -> Result<()> {
        if self.flushed == self.variables.len() {
            return Ok(());
        }
        let pending = &self.variables[self.flushed..];

        let variables_tf = dir.join(crate::passes::VARIABLES_TF);
        let tfvars = dir.join(crate::passes::TERRAFORM_TFVARS);

        let mut declarations = read_or_empty(&variables_tf)?;
        let mut assignments = read_or_empty(&tfvars)?;

        let mut added = 0usize;
        for variable in pending {
            if let Some(block) = variable.render_declaration() {
                if !declares(&declarations, &variable.name) {
                    if !declarations.is_empty() && !declarations.ends_with("\n\n") {
                        declarations.push('\n');
                    }
                    declarations.push_str(&block);
                    added += 1;
                }
            }
            if !assigns(&assignments, &variable.name) {
                assignments.push_str(&variable.render_assignment());
            }
        }

        std::fs::write(&variables_tf, &declarations)
            .map_err(|e| TfSculptError::io(&variables_tf, e, file!(), line!()))?;
        std::fs::write(&tfvars, &assignments)
            .map_err(|e| TfSculptError::io(&tfvars, e, file!(), line!()))?;

        tracing::debug!(
            pending = pending.len(),
            declared = added,
            dir = %dir.display(),
            "catalog increment flushed"
        );
        self.flushed = self.variables.len();
        Ok(())
    }
}

fn read_or_empty(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(TfSculptError::io(path, e, file!(), line!())),
    }
}

/// Whether `variables.tf` content already declares `name`.
fn declares(content: &str, name: &str) -> bool {
    content.contains(&format!("variable \"{name}\""))
}

/// Whether tfvars content already assigns `name` at the start of a line.
fn assigns(content: &str, name: &str) -> bool {
    let pattern = format!(r"(?m)^\s*{}\s*=", regex::escape(name));
    Regex::new(&pattern).map(|re| re.is_match(content)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_render_declaration_and_assignment() {
        let var = ExtractedVariable::declared(
            "default_origin_hostname",
            VarValue::Str("example.com".to_string()),
        )
        .with_description("Origin hostname");

        assert_eq!(
            var.render_declaration().unwrap(),
            "variable \"default_origin_hostname\" {\n  type = string\n  description = \"Origin hostname\"\n}\n"
        );
        assert_eq!(
            var.render_assignment(),
            "default_origin_hostname = \"example.com\"\n"
        );
    }

    #[test]
    fn test_assignment_only_has_no_declaration() {
        let var = ExtractedVariable::assignment_only(
            "activate_latest_on_staging",
            VarValue::Bool(true),
        );
        assert!(var.render_declaration().is_none());
        assert_eq!(
            var.render_assignment(),
            "activate_latest_on_staging = true\n"
        );
    }

    #[test]
    fn test_duplicate_names_skipped_in_memory() {
        let mut catalog = VariableCatalog::new();
        assert!(catalog.add(ExtractedVariable::declared("a", VarValue::Int(1))));
        assert!(!catalog.add(ExtractedVariable::declared("a", VarValue::Int(2))));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.variables()[0].value, VarValue::Int(1));
    }

    #[test]
    fn test_flush_appends_and_skips_existing() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("variables.tf"),
            "variable \"existing\" {\n  type = string\n}\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("terraform.tfvars"), "existing = \"x\"\n").unwrap();

        let mut catalog = VariableCatalog::new();
        catalog.add(ExtractedVariable::declared(
            "existing",
            VarValue::Str("y".to_string()),
        ));
        catalog.add(ExtractedVariable::declared(
            "fresh",
            VarValue::Int(8080),
        ));
        catalog.flush(dir.path()).unwrap();

        let declarations =
            std::fs::read_to_string(dir.path().join("variables.tf")).unwrap();
        let assignments =
            std::fs::read_to_string(dir.path().join("terraform.tfvars")).unwrap();

        assert_eq!(declarations.matches("variable \"existing\"").count(), 1);
        assert!(declarations.contains("variable \"fresh\""));
        assert_eq!(assignments.matches("existing =").count(), 1);
        assert!(assignments.contains("fresh = 8080"));
    }

    #[test]
    fn test_second_flush_writes_only_new_increment() {
        let dir = TempDir::new().unwrap();
        let mut catalog = VariableCatalog::new();

        catalog.add(ExtractedVariable::declared(
            "first",
            VarValue::Str("a".to_string()),
        ));
        catalog.flush(dir.path()).unwrap();

        catalog.add(ExtractedVariable::declared(
            "second",
            VarValue::Str("b".to_string()),
        ));
        catalog.flush(dir.path()).unwrap();

        let assignments =
            std::fs::read_to_string(dir.path().join("terraform.tfvars")).unwrap();
        assert_eq!(assignments.matches("first =").count(), 1);
        assert!(assignments.contains("second = \"b\""));
    }

    #[test]
    fn test_substring_names_do_not_collide_in_tfvars() {
        assert!(assigns("origin_hostname = \"x\"\n", "origin_hostname"));
        assert!(!assigns("origin_hostname_backup = \"x\"\n", "origin_hostname"));
    }
}
