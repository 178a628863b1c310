//! Property resource parameterization.
//!
//! Parses `property.tf` from the input tree, lifting the edge hostname
//! resources, the property resource's identifying fields, the hostname
//! mappings, and the activation contacts into structured variables. The
//! file is then rewritten: edge hostnames collapse into one `for_each`
//! resource, the property resource is rebuilt around variable references
//! and a `dynamic "hostnames"` block, and the staging/production
//! activation resources are regenerated against the activation toggles.

use crate::catalog::{ExtractedVariable, VarValue};
use crate::config::Config;
use crate::engine::{BlockLocator, EditSet};
use crate::passes::{backup_then_write, read_file, PROPERTY_TF};
use crate::types::{Diagnostic, PassOutcome};
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

/// Pass name used in outcomes and logs.
pub const NAME: &str = "property_parameterization";

static IP_BEHAVIOR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"ip_behavior\s*=\s*"([^"]+)""#).expect("Invalid regex"));
static EDGE_HOSTNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"edge_hostname\s*=\s*"([^"]+)""#).expect("Invalid regex"));
static CERTIFICATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"certificate\s*=\s*(\d+)").expect("Invalid regex"));
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"name\s*=\s*"([^"]+)""#).expect("Invalid regex"));
static PRODUCT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"product_id\s*=\s*"([^"]+)""#).expect("Invalid regex"));
static CNAME_FROM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"cname_from\s*=\s*"([^"]+)""#).expect("Invalid regex"));
static CNAME_TO_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"cname_to\s*=\s*([^\n]+)").expect("Invalid regex"));
static CERT_TYPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"cert_provisioning_type\s*=\s*"([^"]+)""#).expect("Invalid regex")
});
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+@[^"]+)""#).expect("Invalid regex"));

/// Resolves an edge-hostname resource reference to the hostname it stands
/// for when a `cname_to` points at a resource instead of a literal.
pub trait ReferenceResolver {
    /// Resolve `resource_name` (the label of an `akamai_edge_hostname`
    /// resource) to a concrete hostname.
    fn resolve(&self, resource_name: &str) -> String;
}

/// Default resolver for the Akamai export naming convention, where the
/// resource label is the hostname with dots replaced by hyphens.
#[derive(Debug, Default, Clone, Copy)]
pub struct HyphenToDotResolver;

impl ReferenceResolver for HyphenToDotResolver {
    fn resolve(&self, resource_name: &str) -> String {
        resource_name.replace('-', ".")
    }
}

#[derive(Debug, Clone, Default)]
struct EdgeHostname {
    resource_name: String,
    ip_behavior: Option<String>,
    edge_hostname: Option<String>,
    certificate: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct PropertyHostname {
    cname_from: Option<String>,
    cname_to: Option<String>,
    cert_provisioning_type: Option<String>,
}

/// Everything lifted out of `property.tf`.
#[derive(Debug, Default)]
struct PropertyInventory {
    edge_hostnames: Vec<EdgeHostname>,
    property_label: Option<String>,
    property_name: Option<String>,
    product_id: Option<String>,
    hostnames: Vec<PropertyHostname>,
    contacts: BTreeSet<String>,
}

/// Parameterize `property.tf`, reading from `input_dir` and writing the
/// rewritten file to `output_dir`.
///
/// # Errors
///
/// Returns an error on I/O failure or an internal pattern failure.
pub fn run(
    config: &Config,
    input_dir: &Path,
    output_dir: &Path,
    resolver: &dyn ReferenceResolver,
) -> crate::Result<PassOutcome> {
    let mut outcome = PassOutcome::new(NAME);

    let input_path = input_dir.join(PROPERTY_TF);
    let content = read_file(&input_path)?;

    let inventory = parse_inventory(&content, resolver)?;
    if inventory.property_label.is_none() {
        outcome.diagnostics.push(
            Diagnostic::warning("no akamai_property resource found").with_file(&input_path),
        );
    }

    outcome.variables = inventory_variables(&inventory);

    let rewritten = rewrite(&content, &inventory, config)?;
    let output_path = output_dir.join(PROPERTY_TF);
    let backup = backup_then_write(&output_path, &content, &rewritten, config.output.backup)?;
    if config.output.backup {
        outcome.files_written.push(backup);
    }
    outcome.files_written.push(output_path);

    tracing::info!(
        edge_hostnames = inventory.edge_hostnames.len(),
        hostnames = inventory.hostnames.len(),
        contacts = inventory.contacts.len(),
        "property parameterized"
    );
    Ok(outcome)
}

fn parse_inventory(
    content: &str,
    resolver: &dyn ReferenceResolver,
) -> crate::Result<PropertyInventory> {
    let mut inventory = PropertyInventory::default();

    let edge_locator =
        BlockLocator::for_header(r#"resource\s+"akamai_edge_hostname"\s+"([^"]+)"\s*\{"#)?;
    for block in edge_locator.find_blocks(content) {
        let text = block.text(content);
        inventory.edge_hostnames.push(EdgeHostname {
            resource_name: block.label,
            ip_behavior: capture(&IP_BEHAVIOR_PATTERN, text),
            edge_hostname: capture(&EDGE_HOSTNAME_PATTERN, text),
            certificate: capture(&CERTIFICATE_PATTERN, text),
        });
    }

    let property_locator =
        BlockLocator::for_header(r#"resource\s+"akamai_property"\s+"([^"]+)"\s*\{"#)?;
    let hostnames_locator = BlockLocator::for_header(r"hostnames\s*\{")?;
    if let Some(block) = property_locator.find_first(content) {
        let text = block.text(content);
        inventory.property_name = capture(&NAME_PATTERN, text);
        inventory.product_id = capture(&PRODUCT_ID_PATTERN, text);
        inventory.property_label = Some(block.label);

        for hostnames_block in hostnames_locator.find_blocks(text) {
            let body = hostnames_block.text(text);
            inventory.hostnames.push(PropertyHostname {
                cname_from: capture(&CNAME_FROM_PATTERN, body),
                cname_to: resolve_cname_to(body, resolver),
                cert_provisioning_type: capture(&CERT_TYPE_PATTERN, body),
            });
        }
    }

    let activation_locator =
        BlockLocator::for_header(r#"resource\s+"akamai_property_activation"\s+"([^"]+)"\s*\{"#)?;
    for block in activation_locator.find_blocks(content) {
        let label = block.label.to_lowercase();
        if !label.contains("staging") && !label.contains("production") {
            continue;
        }
        for caps in EMAIL_PATTERN.captures_iter(block.text(content)) {
            inventory.contacts.insert(caps[1].to_string());
        }
    }

    Ok(inventory)
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern.captures(text).map(|c| c[1].to_string())
}

/// A `cname_to` value is either a quoted literal or a reference to an
/// edge-hostname resource, which goes through the resolver.
fn resolve_cname_to(body: &str, resolver: &dyn ReferenceResolver) -> Option<String> {
    let raw = capture(&CNAME_TO_PATTERN, body)?;
    let value = raw.trim();
    if let Some(literal) = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        return Some(literal.to_string());
    }
    if value.contains("akamai_edge_hostname") {
        let resource_name = value.split('.').nth(1)?;
        return Some(resolver.resolve(resource_name));
    }
    None
}

fn inventory_variables(inventory: &PropertyInventory) -> Vec<ExtractedVariable> {
    let mut variables = Vec::new();

    if !inventory.edge_hostnames.is_empty() {
        let mut map = String::from("{\n");
        for eh in &inventory.edge_hostnames {
            map.push_str(&format!("  \"{}\" = {{\n", eh.resource_name));
            map.push_str(&format!(
                "    ip_behavior   = \"{}\"\n",
                eh.ip_behavior.as_deref().unwrap_or("IPV6_COMPLIANCE")
            ));
            map.push_str(&format!(
                "    edge_hostname = \"{}\"\n",
                eh.edge_hostname.as_deref().unwrap_or("")
            ));
            map.push_str(&format!(
                "    certificate   = {}\n",
                eh.certificate.as_deref().unwrap_or("0")
            ));
            map.push_str("  },\n");
        }
        map.push('}');
        variables.push(ExtractedVariable {
            name: "edge_hostnames".to_string(),
            type_expr: Some(
                "map(object({\n    ip_behavior   = string\n    edge_hostname = string\n    certificate   = number\n  }))"
                    .to_string(),
            ),
            description: Some("Edge hostnames configuration".to_string()),
            value: VarValue::Raw(map),
        });
    }

    if inventory.property_label.is_some() {
        let object = format!(
            "{{\n  name       = \"{}\"\n  product_id = \"{}\"\n}}",
            inventory.property_name.as_deref().unwrap_or(""),
            inventory.product_id.as_deref().unwrap_or("")
        );
        variables.push(ExtractedVariable {
            name: "property_config".to_string(),
            type_expr: Some(
                "object({\n    name       = string\n    product_id = string\n  })".to_string(),
            ),
            description: Some("Property configuration parameters".to_string()),
            value: VarValue::Raw(object),
        });
    }

    variables.push(
        ExtractedVariable::declared(
            "version_notes",
            VarValue::Str("Deployed by Terraform".to_string()),
        )
        .with_description("Property version notes"),
    );

    if !inventory.hostnames.is_empty() {
        let mut map = String::from("{\n");
        for (i, hostname) in inventory.hostnames.iter().enumerate() {
            map.push_str(&format!("  \"hostname_{}\" = {{\n", i + 1));
            map.push_str(&format!(
                "    cname_from             = \"{}\"\n",
                hostname.cname_from.as_deref().unwrap_or("")
            ));
            map.push_str(&format!(
                "    cname_to               = \"{}\"\n",
                hostname.cname_to.as_deref().unwrap_or("")
            ));
            map.push_str(&format!(
                "    cert_provisioning_type = \"{}\"\n",
                hostname
                    .cert_provisioning_type
                    .as_deref()
                    .unwrap_or("CPS_MANAGED")
            ));
            map.push_str("  },\n");
        }
        map.push('}');
        variables.push(ExtractedVariable {
            name: "property_hostnames".to_string(),
            type_expr: Some(
                "map(object({\n    cname_from             = string\n    cname_to               = string\n    cert_provisioning_type = string\n  }))"
                    .to_string(),
            ),
            description: Some("Hostnames for the property".to_string()),
            value: VarValue::Raw(map),
        });
    }

    if !inventory.contacts.is_empty() {
        let mut list = String::from("[\n");
        for contact in &inventory.contacts {
            list.push_str(&format!("  \"{contact}\",\n"));
        }
        list.push(']');
        variables.push(ExtractedVariable {
            name: "activation_contacts".to_string(),
            type_expr: Some("list(string)".to_string()),
            description: Some("Contacts for property activations".to_string()),
            value: VarValue::Raw(list),
        });
    }

    variables
}

fn edge_hostname_for_each_block() -> &'static str {
    r#"resource "akamai_edge_hostname" "edge_hostnames" {
  for_each      = var.edge_hostnames

  provider      = akamai
  contract_id   = var.contract_id
  group_id      = var.group_id
  ip_behavior   = each.value.ip_behavior
  edge_hostname = each.value.edge_hostname
  certificate   = each.value.certificate
}"#
}

fn property_block(label: &str, root_marker: &str) -> String {
    format!(
        r#"resource "akamai_property" "{label}" {{
  name        = var.property_config.name
  contract_id = var.contract_id
  group_id    = var.group_id
  product_id  = var.property_config.product_id

  dynamic "hostnames" {{
    for_each = var.property_hostnames
    content {{
      cname_from             = hostnames.value.cname_from
      cname_to               = hostnames.value.cname_to
      cert_provisioning_type = hostnames.value.cert_provisioning_type
    }}
  }}
  rule_format   = data.akamai_property_rules_builder.{label}{root_marker}.rule_format
  rules         = data.akamai_property_rules_builder.{label}{root_marker}.json
  version_notes = var.version_notes
}}"#
    )
}

fn activation_block(label: &str, network: &str) -> String {
    let toggle = format!("activate_latest_on_{}", network.to_lowercase());
    let fallback = format!("{}_version", network.to_lowercase());
    format!(
        r#"resource "akamai_property_activation" "{label}-{network_lower}" {{
  property_id                    = akamai_property.{label}.id
  contact                        = var.activation_contacts
  version                        = var.{toggle} ? akamai_property.{label}.latest_version : akamai_property.{label}.{fallback}
  network                        = "{network}"
  note                           = var.version_notes
  auto_acknowledge_rule_warnings = "true"
}}"#,
        network_lower = network.to_lowercase(),
    )
}

fn rewrite(
    content: &str,
    inventory: &PropertyInventory,
    config: &Config,
) -> crate::Result<String> {
    // Plan the structural deletions and the property replacement against
    // the original buffer, then apply in one pass
    let mut edits = EditSet::new();

    let edge_locator =
        BlockLocator::for_header(r#"resource\s+"akamai_edge_hostname"\s+"([^"]+)"\s*\{"#)?;
    for block in edge_locator.find_blocks(content) {
        edits.replace(block.span, "");
    }

    let hostname_resource_locator =
        BlockLocator::for_header(r#"resource\s+"akamai_property_hostname"\s+"([^"]+)"\s*\{"#)?;
    for block in hostname_resource_locator.find_blocks(content) {
        edits.replace(block.span, "");
    }

    let property_locator =
        BlockLocator::for_header(r#"resource\s+"akamai_property"\s+"([^"]+)"\s*\{"#)?;
    if let Some(label) = &inventory.property_label {
        if let Some(block) = property_locator.find_first(content) {
            edits.replace(
                block.span,
                property_block(label, &config.extraction.root_marker),
            );
        }
    }

    let mut updated = edits.apply(content)?;

    // The for_each edge-hostname resource lands right after the provider
    // block, or at the top when there is none
    if !inventory.edge_hostnames.is_empty() {
        let provider_locator = BlockLocator::for_header(r#"provider\s+"akamai"\s*\{"#)?;
        match provider_locator.find_first(&updated) {
            Some(provider) => {
                updated.insert_str(
                    provider.span.end,
                    &format!("\n\n{}", edge_hostname_for_each_block()),
                );
            }
            None => {
                updated = format!("{}\n\n{}", edge_hostname_for_each_block(), updated);
            }
        }
    }

    // Drop everything after the property resource and regenerate the
    // activation pair from the toggles
    if let Some(label) = &inventory.property_label {
        if let Some(block) = property_locator.find_first(&updated) {
            updated.truncate(block.span.end);
            updated = format!(
                "{}\n\n{}\n\n{}",
                updated.trim_end(),
                activation_block(label, "STAGING"),
                activation_block(label, "PRODUCTION"),
            );
        }
    }

    let squeeze = Regex::new(r"\n{3,}").expect("Invalid regex");
    Ok(squeeze.replace_all(&updated, "\n\n").into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const PROPERTY: &str = r#"terraform {
  required_providers {
    akamai = {
      source  = "akamai/akamai"
      version = ">= 5.0.0"
    }
  }
}

provider "akamai" {
  edgerc         = "~/.edgerc"
  config_section = "default"
}

resource "akamai_edge_hostname" "www-example-com-edgesuite-net" {
  contract_id   = "ctr_C-0000001"
  group_id      = "grp_000001"
  ip_behavior   = "IPV6_COMPLIANCE"
  edge_hostname = "www.example.com.edgesuite.net"
  certificate   = 123456
}

resource "akamai_property" "www-example-com" {
  name        = "www.example.com"
  contract_id = "ctr_C-0000001"
  group_id    = "grp_000001"
  product_id  = "prd_Fresca"
  hostnames {
    cname_from             = "www.example.com"
    cname_to               = akamai_edge_hostname.www-example-com-edgesuite-net.edge_hostname
    cert_provisioning_type = "CPS_MANAGED"
  }
  rule_format = data.akamai_property_rules_builder.www-example-com_rule_default.rule_format
  rules       = data.akamai_property_rules_builder.www-example-com_rule_default.json
}

resource "akamai_property_activation" "www-example-com-staging" {
  property_id = akamai_property.www-example-com.id
  contact     = ["ops@example.com"]
  version     = akamai_property.www-example-com.latest_version
  network     = "STAGING"
}

resource "akamai_property_activation" "www-example-com-production" {
  property_id = akamai_property.www-example-com.id
  contact     = ["ops@example.com", "oncall@example.com"]
  version     = akamai_property.www-example-com.latest_version
  network     = "PRODUCTION"
}
"#;

    fn run_in(content: &str) -> (TempDir, TempDir, PassOutcome) {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        std::fs::write(input.path().join(PROPERTY_TF), content).unwrap();
        let outcome = run(
            &Config::default(),
            input.path(),
            output.path(),
            &HyphenToDotResolver,
        )
        .unwrap();
        (input, output, outcome)
    }

    #[test]
    fn test_extracts_structured_variables() {
        let (_input, _output, outcome) = run_in(PROPERTY);

        let names: Vec<&str> = outcome.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "edge_hostnames",
                "property_config",
                "version_notes",
                "property_hostnames",
                "activation_contacts"
            ]
        );

        let edge = &outcome.variables[0];
        let rendered = edge.value.render();
        assert!(rendered.contains("\"www-example-com-edgesuite-net\""));
        assert!(rendered.contains("certificate   = 123456"));

        let config_var = &outcome.variables[1];
        assert!(config_var.value.render().contains("name       = \"www.example.com\""));
        assert!(config_var.value.render().contains("product_id = \"prd_Fresca\""));

        let contacts = &outcome.variables[4];
        let rendered = contacts.value.render();
        assert!(rendered.contains("\"ops@example.com\""));
        assert!(rendered.contains("\"oncall@example.com\""));
        // Duplicates across networks collapse
        assert_eq!(rendered.matches("ops@example.com").count(), 1);
    }

    #[test]
    fn test_reference_resolver_applied_to_cname_to() {
        let (_input, _output, outcome) = run_in(PROPERTY);

        let hostnames = outcome
            .variables
            .iter()
            .find(|v| v.name == "property_hostnames")
            .unwrap();
        assert!(hostnames
            .value
            .render()
            .contains("cname_to               = \"www.example.com.edgesuite.net\""));
    }

    #[test]
    fn test_rewrite_collapses_and_regenerates() {
        let (_input, output, _outcome) = run_in(PROPERTY);

        let rewritten =
            std::fs::read_to_string(output.path().join(PROPERTY_TF)).unwrap();

        // One for_each resource instead of per-hostname resources
        assert_eq!(rewritten.matches("resource \"akamai_edge_hostname\"").count(), 1);
        assert!(rewritten.contains("for_each      = var.edge_hostnames"));
        // Property rebuilt around variables
        assert!(rewritten.contains("name        = var.property_config.name"));
        assert!(rewritten.contains("dynamic \"hostnames\""));
        // Activation pair regenerated with the toggles
        assert!(rewritten.contains("var.activate_latest_on_staging"));
        assert!(rewritten.contains("var.activate_latest_on_production"));
        assert!(rewritten.contains("network                        = \"STAGING\""));
        // Original hardcoded contacts are gone from the activations
        assert!(rewritten.contains("contact                        = var.activation_contacts"));
        // terraform and provider blocks survive untouched
        assert!(rewritten.contains("required_providers"));
        assert!(rewritten.contains("provider \"akamai\""));
    }

    #[test]
    fn test_literal_cname_to_kept_verbatim() {
        let literal = PROPERTY.replace(
            "cname_to               = akamai_edge_hostname.www-example-com-edgesuite-net.edge_hostname",
            "cname_to               = \"static.example.net\"",
        );
        let (_input, _output, outcome) = run_in(&literal);

        let hostnames = outcome
            .variables
            .iter()
            .find(|v| v.name == "property_hostnames")
            .unwrap();
        assert!(hostnames
            .value
            .render()
            .contains("cname_to               = \"static.example.net\""));
    }

    #[test]
    fn test_missing_property_resource_is_diagnostic() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        std::fs::write(input.path().join(PROPERTY_TF), "# empty export\n").unwrap();

        let outcome = run(
            &Config::default(),
            input.path(),
            output.path(),
            &HyphenToDotResolver,
        )
        .unwrap();
        assert!(outcome.has_problems());
    }
}
