//! Rust source rendering for the registered types.
//!
//! Output is deterministic: types sort by registry key, fields sort by
//! their JSON name. Running the generator twice over the same input yields
//! byte-identical files.

use indexmap::IndexMap;

use super::model::{FieldShape, TypeEntry, TypeKind, TypeRegistry};
use super::names;

const HEADER: &str = "//! Generated by `specimen generate`. Edits will be overwritten.\n";

/// User overrides applied while rendering.
#[derive(Debug, Clone, Copy)]
pub(super) struct RenderOptions<'a> {
    /// Full rendered type replacements, matched exactly.
    pub replace_types: &'a IndexMap<String, String>,
    /// Per-field forced types, keyed `Struct.field`.
    pub field_types: &'a IndexMap<String, String>,
}

/// Renders the registry as a complete Rust module file.
pub(super) fn render(registry: &TypeRegistry, options: &RenderOptions<'_>) -> String {
    let mut items: Vec<(String, TypeEntry)> = Vec::new();
    for (key, entry) in registry.entries() {
        // Composite fields need a named carrier struct; synthesize one per
        // field under a parent-qualified key.
        for (field, shape) in &entry.fields {
            if let TypeKind::Composite(parts) = &shape.kind {
                items.push((
                    format!("{key}.{field}"),
                    TypeEntry {
                        embedded: parts.clone(),
                        source: entry.source.clone(),
                        ..TypeEntry::default()
                    },
                ));
            }
        }
        items.push((key.clone(), entry.clone()));
    }
    items.sort_by(|left, right| left.0.cmp(&right.0));

    let mut out = String::from(HEADER);
    if items.is_empty() {
        return out;
    }
    out.push_str("\nuse serde::{Deserialize, Serialize};\n");
    for (key, entry) in &items {
        out.push('\n');
        render_type(&mut out, key, entry, options);
    }
    out
}

fn render_type(out: &mut String, key: &str, entry: &TypeEntry, options: &RenderOptions<'_>) {
    let name = names::type_ident(key);
    let source = entry.source.as_deref().unwrap_or("unknown");
    out.push_str(&format!("/// Generated from `{source}`.\n"));
    if let Some(description) = &entry.description {
        out.push_str("///\n");
        for line in description.lines() {
            out.push_str(&format!("/// {line}\n"));
        }
    }
    out.push_str("#[derive(Debug, Clone, Serialize, Deserialize)]\n");
    if entry.embedded.is_empty() && entry.fields.is_empty() {
        out.push_str(&format!("pub struct {name} {{}}\n"));
        return;
    }
    out.push_str(&format!("pub struct {name} {{\n"));
    for part in &entry.embedded {
        render_embedded(out, part);
    }
    let mut fields: Vec<(&String, &FieldShape)> = entry.fields.iter().collect();
    fields.sort_by(|left, right| left.0.cmp(right.0));
    for (field, shape) in fields {
        render_field(out, key, &name, field, shape, options);
    }
    out.push_str("}\n");
}

fn render_embedded(out: &mut String, part: &str) {
    let field = names::field_ident(part);
    let target = names::type_ident(part);
    out.push_str("    #[serde(flatten)]\n");
    out.push_str(&format!("    pub {field}: {target},\n"));
}

fn render_field(
    out: &mut String,
    key: &str,
    struct_name: &str,
    field: &str,
    shape: &FieldShape,
    options: &RenderOptions<'_>,
) {
    let ident = names::field_ident(field);
    if let Some(description) = &shape.description {
        for line in description.lines() {
            out.push_str(&format!("    /// {line}\n"));
        }
    }

    let base = match &shape.kind {
        TypeKind::Composite(_) => names::type_ident(&format!("{key}.{field}")),
        other => base_type(other),
    };
    let mut rendered = if shape.array {
        format!("Vec<{base}>")
    } else {
        base
    };
    if let Some(replacement) = options.replace_types.get(&rendered) {
        rendered = replacement.clone();
    }
    let override_key = format!("{struct_name}.{}", names::serde_name(&ident));
    if let Some(forced) = options.field_types.get(&override_key) {
        rendered = forced.clone();
    }
    // Unboxed self-recursion would have infinite size.
    if rendered == struct_name {
        rendered = format!("Box<{rendered}>");
    }

    if names::serde_name(&ident) != field {
        out.push_str(&format!("    #[serde(rename = \"{field}\")]\n"));
    }
    out.push_str(&format!("    pub {ident}: {rendered},\n"));
}

fn base_type(kind: &TypeKind) -> String {
    match kind {
        TypeKind::Unknown | TypeKind::Composite(_) => "serde_json::Value".to_string(),
        TypeKind::Bool => "bool".to_string(),
        TypeKind::Integer => "i64".to_string(),
        TypeKind::Float => "f64".to_string(),
        TypeKind::String => "String".to_string(),
        TypeKind::Named(target) => names::type_ident(target),
        TypeKind::Map(value) => {
            format!("std::collections::HashMap<String, {}>", base_type(value))
        }
    }
}
