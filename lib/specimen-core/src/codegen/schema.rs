//! Typed view of a schema document's `components.schemas` section.
//!
//! Only the subset the generator consumes is modelled; unknown keys are
//! ignored. Component names become registry keys as-is, so two schema
//! documents agree on their cross-references.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use super::error::CodegenError;
use super::model::{FieldShape, TypeEntry, TypeKind, TypeRegistry};

#[derive(Debug, Clone, Default, Deserialize)]
struct SchemaDocument {
    #[serde(default)]
    components: Components,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Components {
    #[serde(default)]
    schemas: IndexMap<String, ComponentSchema>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ComponentSchema {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    properties: IndexMap<String, PropertySchema>,
    #[serde(rename = "allOf", default)]
    all_of: Vec<RefOnly>,
    #[serde(rename = "oneOf", default)]
    one_of: Vec<RefOnly>,
    #[serde(rename = "anyOf", default)]
    any_of: Vec<RefOnly>,
}

/// A composite part; anything beyond a `$ref` is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
struct RefOnly {
    #[serde(rename = "$ref", default)]
    reference: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PropertySchema {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(rename = "$ref", default)]
    reference: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    items: Option<Box<PropertySchema>>,
    #[serde(rename = "additionalProperties", default)]
    additional: Option<AdditionalProperties>,
    #[serde(rename = "allOf", default)]
    all_of: Vec<RefOnly>,
    #[serde(rename = "oneOf", default)]
    one_of: Vec<RefOnly>,
    #[serde(rename = "anyOf", default)]
    any_of: Vec<RefOnly>,
}

/// `additionalProperties` is either a nested schema or a permission flag.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<PropertySchema>),
}

/// Loads every object or composite component of a schema document into the
/// registry, keyed by its component name.
pub(super) fn load_schema(file: &Path, registry: &mut TypeRegistry) -> Result<(), CodegenError> {
    let contents = fs::read_to_string(file)?;
    let deserializer = &mut serde_json::Deserializer::from_str(&contents);
    let document: SchemaDocument =
        serde_path_to_error::deserialize(deserializer).map_err(|err| CodegenError::DecodeError {
            file: file.display().to_string(),
            path: err.path().to_string(),
            error: err.into_inner(),
        })?;

    let label = file.display().to_string();
    for (name, component) in document.components.schemas {
        if let Some(entry) = component_entry(&name, component, &label) {
            registry.insert(name, entry);
        }
    }
    Ok(())
}

fn component_entry(name: &str, component: ComponentSchema, source: &str) -> Option<TypeEntry> {
    let parts = composite_parts(&component.all_of, &component.one_of, &component.any_of);
    if !parts.is_empty() {
        return Some(TypeEntry {
            embedded: parts,
            description: component.description,
            source: Some(source.to_string()),
            ..TypeEntry::default()
        });
    }

    match component.kind.as_deref() {
        Some("object") => {
            let fields = component
                .properties
                .into_iter()
                .map(|(field, property)| (field, resolve_property(&property)))
                .collect();
            Some(TypeEntry {
                fields,
                description: component.description,
                source: Some(source.to_string()),
                ..TypeEntry::default()
            })
        }
        other => {
            debug!(
                name,
                kind = other.unwrap_or("unspecified"),
                "skipping non-object component"
            );
            None
        }
    }
}

/// First non-empty composite list wins, `allOf` before `oneOf` before
/// `anyOf`.
fn composite_parts(all_of: &[RefOnly], one_of: &[RefOnly], any_of: &[RefOnly]) -> Vec<String> {
    let refs = if all_of.is_empty() {
        if one_of.is_empty() { any_of } else { one_of }
    } else {
        all_of
    };
    refs.iter()
        .filter_map(|part| part.reference.as_deref())
        .map(|reference| type_from_ref(reference).to_string())
        .collect()
}

fn type_from_ref(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

fn resolve_property(property: &PropertySchema) -> FieldShape {
    let mut shape = match property.kind.as_deref() {
        Some("array") => item_shape(property.items.as_deref()),
        Some("boolean") => FieldShape::plain(TypeKind::Bool),
        Some("integer") => FieldShape::plain(TypeKind::Integer),
        Some("number") => FieldShape::plain(TypeKind::Float),
        Some("string") => FieldShape::plain(TypeKind::String),
        _ => unresolved_shape(property),
    };
    shape.description = property.description.clone();
    shape
}

fn item_shape(items: Option<&PropertySchema>) -> FieldShape {
    let Some(items) = items else {
        return FieldShape::sequence(TypeKind::Unknown);
    };
    if let Some(reference) = items.reference.as_deref() {
        return FieldShape::sequence(TypeKind::Named(type_from_ref(reference).to_string()));
    }
    if items.kind.is_some() {
        let inner = resolve_property(items);
        return FieldShape {
            array: true,
            ..inner
        };
    }
    let parts = composite_parts(&items.all_of, &items.one_of, &items.any_of);
    if parts.is_empty() {
        FieldShape::sequence(TypeKind::Unknown)
    } else {
        FieldShape::sequence(TypeKind::Composite(parts))
    }
}

/// Resolution for `object`-typed and untyped properties.
fn unresolved_shape(property: &PropertySchema) -> FieldShape {
    let parts = composite_parts(&property.all_of, &property.one_of, &property.any_of);
    if !parts.is_empty() {
        return FieldShape::plain(TypeKind::Composite(parts));
    }
    match &property.additional {
        Some(AdditionalProperties::Schema(value)) => {
            return FieldShape::plain(TypeKind::Map(Box::new(map_value_kind(value))));
        }
        Some(AdditionalProperties::Allowed(true)) => {
            return FieldShape::plain(TypeKind::Map(Box::new(TypeKind::Unknown)));
        }
        Some(AdditionalProperties::Allowed(false)) | None => {}
    }
    if let Some(reference) = property.reference.as_deref() {
        return FieldShape::plain(TypeKind::Named(type_from_ref(reference).to_string()));
    }
    FieldShape::plain(TypeKind::Unknown)
}

/// Value kind of a string-keyed map; sequences degrade to a raw JSON
/// value.
fn map_value_kind(value: &PropertySchema) -> TypeKind {
    let inner = resolve_property(value);
    if inner.array {
        debug!("map of sequences degrades to a raw JSON value");
        return TypeKind::Unknown;
    }
    inner.kind
}
