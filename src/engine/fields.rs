//! Nested scalar field extraction.
//!
//! Given a block and a dotted key path, the extractor navigates the
//! intermediate names as nested sub-blocks and matches the terminal key as
//! either a quoted-string or bare-integer assignment. It records the exact
//! source spans of both the value and the key text preceding it, so a
//! later edit can splice a variable reference in place of the literal
//! while preserving the original formatting of the key.

use crate::engine::edit::Edit;
use crate::engine::locator::Block;
use crate::engine::scanner::matching_brace;
use crate::engine::span::Span;
use regex::Regex;

/// The value of an extracted terminal field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// A quoted string, stored without the surrounding quotes.
    Str(String),
    /// A bare integer.
    Int(i64),
}

impl FieldValue {
    /// The value as it would appear unquoted.
    #[must_use]
    pub fn as_str(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Int(n) => n.to_string(),
        }
    }

    /// The Terraform type keyword for this value.
    #[must_use]
    pub const fn type_keyword(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Int(_) => "number",
        }
    }
}

/// A scalar field extracted from a block, with the spans needed to
/// rewrite it in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedField {
    /// Key path joined with underscores, e.g. `origin_hostname`.
    pub qualified_name: String,
    /// The extracted scalar.
    pub value: FieldValue,
    /// Exactly the value's source characters, excluding quotes for strings.
    pub value_span: Span,
    /// From the key token through just before the value begins (including
    /// `=` and whitespace, and the opening quote for strings).
    pub key_text_span: Span,
    /// The whole assignment: key through the end of the value, including
    /// the closing quote for strings.
    pub assignment_span: Span,
}

impl ExtractedField {
    /// Build the edit that replaces this field's literal with `reference`,
    /// keeping the original key text.
    #[must_use]
    pub fn replacement_edit(&self, buffer: &str, reference: &str) -> Edit {
        let key_text = self.key_text_span.slice(buffer);
        Edit::new(self.assignment_span, format!("{key_text}{reference}"))
    }
}

/// Extract the field at `path` inside `block`, scoped to `text`.
///
/// All but the last path element are navigated as nested `name {` blocks;
/// the terminal element must be a string or integer assignment (string
/// form attempted first). Returns `None` when any intermediate block or
/// the terminal key is absent — not all blocks populate all fields, so
/// absence is an expected outcome, not an error.
#[must_use]
pub fn extract_field(text: &str, block: &Block, path: &[&str]) -> Option<ExtractedField> {
    if path.is_empty() {
        return None;
    }

    let mut scope = block.body_span;
    for key in &path[..path.len() - 1] {
        scope = descend(text, scope, key)?;
    }

    let terminal = path[path.len() - 1];
    let field = match_terminal(text, scope, terminal)?;
    Some(ExtractedField {
        qualified_name: path.join("_"),
        ..field
    })
}

/// Resolve the body span of the sub-block `name { ... }` inside `scope`.
fn descend(text: &str, scope: Span, name: &str) -> Option<Span> {
    let header = Regex::new(&format!(r"\b{}\s*\{{", regex::escape(name))).ok()?;
    let body = scope.slice(text);
    let m = header.find(body)?;

    let open = scope.start + m.end() - 1;
    let close = matching_brace(text, open)?;
    Some(Span::new(open + 1, close - 1))
}

/// Match the terminal key inside `scope` as a string or integer
/// assignment. The string form wins when both could match; the two forms
/// are mutually exclusive per key in well-formed input.
fn match_terminal(text: &str, scope: Span, key: &str) -> Option<ExtractedField> {
    let body = scope.slice(text);
    let escaped = regex::escape(key);

    let string_form = Regex::new(&format!(r#"\b{escaped}\s*=\s*"([^"]*)""#)).ok()?;
    if let Some(caps) = string_form.captures(body) {
        let whole = caps.get(0)?;
        let value = caps.get(1)?;
        return Some(ExtractedField {
            qualified_name: key.to_string(),
            value: FieldValue::Str(value.as_str().to_string()),
            value_span: Span::new(scope.start + value.start(), scope.start + value.end()),
            // through the opening quote, so splicing a bare reference
            // after it drops both quotes
            key_text_span: Span::new(scope.start + whole.start(), scope.start + value.start() - 1),
            assignment_span: Span::new(scope.start + whole.start(), scope.start + whole.end()),
        });
    }

    let int_form = Regex::new(&format!(r"\b{escaped}\s*=\s*(\d+)")).ok()?;
    let caps = int_form.captures(body)?;
    let whole = caps.get(0)?;
    let value = caps.get(1)?;
    Some(ExtractedField {
        qualified_name: key.to_string(),
        value: FieldValue::Int(value.as_str().parse().ok()?),
        value_span: Span::new(scope.start + value.start(), scope.start + value.end()),
        key_text_span: Span::new(scope.start + whole.start(), scope.start + value.start()),
        assignment_span: Span::new(scope.start + whole.start(), scope.start + whole.end()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::edit::EditSet;
    use crate::engine::locator::BlockLocator;
    use pretty_assertions::assert_eq;

    fn origin_block(text: &str) -> Block {
        BlockLocator::for_header(r"\borigin\s*\{")
            .unwrap()
            .find_first(text)
            .unwrap()
    }

    #[test]
    fn test_extract_string_field() {
        let text = r#"origin { hostname = "example.com" }"#;
        let block = origin_block(text);

        let field = extract_field(text, &block, &["hostname"]).unwrap();
        assert_eq!(field.value, FieldValue::Str("example.com".to_string()));
        assert_eq!(field.value_span.slice(text), "example.com");
        assert_eq!(field.qualified_name, "hostname");
    }

    #[test]
    fn test_replacement_preserves_key_formatting() {
        let text = r#"origin { hostname = "example.com" }"#;
        let block = origin_block(text);

        let field = extract_field(text, &block, &["hostname"]).unwrap();
        let mut edits = EditSet::new();
        edits.push(field.replacement_edit(text, "var.origin_hostname"));
        let rewritten = edits.apply(text).unwrap();

        assert_eq!(rewritten, "origin { hostname = var.origin_hostname }");
    }

    #[test]
    fn test_extract_nested_integer_field() {
        let text = "cp_code {\n  value {\n    id = 12345\n    name = \"cp\"\n  }\n}";
        let block = BlockLocator::for_header(r"\bcp_code\s*\{")
            .unwrap()
            .find_first(text)
            .unwrap();

        let field = extract_field(text, &block, &["value", "id"]).unwrap();
        assert_eq!(field.value, FieldValue::Int(12345));
        assert_eq!(field.value_span.slice(text), "12345");
        assert_eq!(field.qualified_name, "value_id");
    }

    #[test]
    fn test_missing_intermediate_block() {
        let text = r#"origin { hostname = "example.com" }"#;
        let block = origin_block(text);
        assert!(extract_field(text, &block, &["missing", "hostname"]).is_none());
    }

    #[test]
    fn test_missing_terminal_key() {
        let text = r#"origin { hostname = "example.com" }"#;
        let block = origin_block(text);
        assert!(extract_field(text, &block, &["port"]).is_none());
    }

    #[test]
    fn test_key_not_matched_as_suffix_of_longer_identifier() {
        let text = r#"origin { forward_hostname = "other" hostname = "example.com" }"#;
        let block = origin_block(text);

        let field = extract_field(text, &block, &["hostname"]).unwrap();
        assert_eq!(field.value, FieldValue::Str("example.com".to_string()));
    }

    #[test]
    fn test_string_form_wins_over_integer() {
        let text = r#"cp_code { id = "808" }"#;
        let block = BlockLocator::for_header(r"\bcp_code\s*\{")
            .unwrap()
            .find_first(text)
            .unwrap();

        let field = extract_field(text, &block, &["id"]).unwrap();
        assert_eq!(field.value, FieldValue::Str("808".to_string()));
    }

    #[test]
    fn test_bool_terminal_is_absent() {
        // Neither string nor integer form: treated as field absent
        let text = "origin { enabled = true }";
        let block = origin_block(text);
        assert!(extract_field(text, &block, &["enabled"]).is_none());
    }

    #[test]
    fn test_integer_replacement_round_trip() {
        let text = "cp_code {\n  value {\n    id = 12345\n  }\n}";
        let block = BlockLocator::for_header(r"\bcp_code\s*\{")
            .unwrap()
            .find_first(text)
            .unwrap();

        let field = extract_field(text, &block, &["value", "id"]).unwrap();
        let mut forward = EditSet::new();
        forward.push(field.replacement_edit(text, "var.cp_code_id"));
        let rewritten = forward.apply(text).unwrap();
        assert!(rewritten.contains("id = var.cp_code_id"));
    }
}
