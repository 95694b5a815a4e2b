//! Display formatting for CLI output
//!
//! Provides structured display for:
//! - Attribute trees, one line per attribute with type and flags
//! - Validation issues

use console::style;
use crdform_schema::{Attribute, Attributes, ResourceSchema, ValidationIssue};

/// Render a resource schema as an indented tree
pub fn schema_tree(schema: &ResourceSchema) -> String {
    let mut out = format!(
        "{} ({}, kind {}, {})\n",
        style(&schema.type_name).cyan().bold(),
        schema.api_version(),
        schema.kind,
        schema.scope
    );
    if let Some(description) = &schema.description {
        out.push_str(&format!("  {}\n", style(description).dim()));
    }
    if let Some(warning) = &schema.deprecation {
        out.push_str(&format!("  {} {}\n", style("deprecated:").yellow().bold(), warning));
    }
    render_attributes(&schema.attributes, 1, &mut out);
    out
}

fn render_attributes(attributes: &Attributes, depth: usize, out: &mut String) {
    let width = attributes
        .keys()
        .map(|k| k.len())
        .max()
        .unwrap_or(0);

    for attribute in attributes.values() {
        let indent = "  ".repeat(depth);
        let mut line = format!(
            "{}{:<width$}  {:<14} {}",
            indent,
            attribute.display_name,
            attribute.type_.label(),
            flags(attribute),
            width = width
        );
        if attribute.wire_name != attribute.display_name {
            line.push_str(&format!(" (wire: {})", attribute.wire_name));
        }
        if let Some(default) = &attribute.default {
            line.push_str(&format!(" default={}", default));
        }
        if !attribute.validators.is_empty() {
            let rules: Vec<String> = attribute.validators.iter().map(|v| v.describe()).collect();
            line.push_str(&format!(" [{}]", rules.join("; ")));
        }
        out.push_str(line.trim_end());
        out.push('\n');

        if let Some(children) = attribute.children() {
            render_attributes(children, depth + 1, out);
        }
    }
}

fn flags(attribute: &Attribute) -> String {
    let mut flags = Vec::new();
    if attribute.required {
        flags.push("required");
    } else if attribute.optional && attribute.computed {
        flags.push("optional+computed");
    } else if attribute.computed {
        flags.push("computed");
    } else {
        flags.push("optional");
    }
    if attribute.requires_replace {
        flags.push("forces replacement");
    }
    flags.join(", ")
}

/// Print validation issues grouped under a header
pub fn print_issues(type_name: &str, issues: &[ValidationIssue]) {
    if issues.is_empty() {
        println!(
            "{} State is valid for {}",
            style("✓").green().bold(),
            style(type_name).cyan()
        );
        return;
    }

    println!(
        "{} {} issue(s) for {}",
        style("✗").red().bold(),
        issues.len(),
        style(type_name).cyan()
    );
    for issue in issues {
        println!("  {} {}: {}", style("-").red(), style(&issue.path).yellow(), issue.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crdform_schema::{CrdParser, SchemaBuilder};

    const CRD: &str = r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: backups.example.com
spec:
  group: example.com
  scope: Namespaced
  names:
    kind: Backup
    plural: backups
  versions:
    - name: v1
      served: true
      storage: true
      schema:
        openAPIV3Schema:
          type: object
          properties:
            spec:
              type: object
              required: [schedule]
              properties:
                schedule:
                  type: string
                  minLength: 1
                retentionDays:
                  type: integer
                  default: 7
                  maximum: 90
"#;

    #[test]
    fn test_schema_tree() {
        console::set_colors_enabled(false);
        let crd = CrdParser::parse(CRD).unwrap();
        let schema = SchemaBuilder::new("k8s").build(&crd, "v1").unwrap();
        insta::assert_snapshot!(schema_tree(&schema));
    }

    #[test]
    fn test_schema_tree_flags_deprecated_versions() {
        console::set_colors_enabled(false);
        let yaml = CRD.replace("storage: true", "storage: true\n      deprecated: true");
        let crd = CrdParser::parse(&yaml).unwrap();
        let schema = SchemaBuilder::new("k8s").build(&crd, "v1").unwrap();
        let tree = schema_tree(&schema);
        assert!(tree.contains("deprecated: example.com/v1 Backup is deprecated"));
    }
}
