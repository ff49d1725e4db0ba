//! Shape model shared by sample inference and schema loading.
//!
//! Both front ends reduce their input to the same structure: a registry of
//! named types, each holding an ordered field table. Rendering consumes the
//! registry without knowing which front end filled it.

use indexmap::IndexMap;
use tracing::debug;

/// Resolved kind of a single field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// Nothing usable could be inferred. Rendered as a raw JSON value.
    Unknown,
    /// `true` / `false`.
    Bool,
    /// A number without a fractional part.
    Integer,
    /// Any other number.
    Float,
    /// A plain string.
    String,
    /// A reference to another registered type, by registry key.
    Named(String),
    /// A string-keyed mapping with values of one kind.
    Map(Box<TypeKind>),
    /// Parts of an `allOf`/`anyOf`/`oneOf` schema, flattened on emission.
    Composite(Vec<String>),
}

/// A field's inferred or declared shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldShape {
    /// Kind of a single value.
    pub kind: TypeKind,
    /// Whether the field holds a sequence of that kind.
    pub array: bool,
    /// Documentation attached to the field, when the source provides any.
    pub description: Option<String>,
}

impl FieldShape {
    /// Shape holding a single value of `kind`.
    pub fn plain(kind: TypeKind) -> Self {
        Self {
            kind,
            array: false,
            description: None,
        }
    }

    /// Shape holding a sequence of `kind`.
    pub fn sequence(kind: TypeKind) -> Self {
        Self {
            kind,
            array: true,
            description: None,
        }
    }

    /// Combines two observations of the same field, when they agree.
    ///
    /// An unknown side defers to the typed one, and integers widen to
    /// floats when samples disagree on the fractional part. Everything
    /// else must match exactly, array-ness included.
    fn unified(&self, other: &Self) -> Option<Self> {
        if self.array != other.array {
            return None;
        }
        let kind = match (&self.kind, &other.kind) {
            (kind, TypeKind::Unknown) | (TypeKind::Unknown, kind) => kind.clone(),
            (TypeKind::Integer, TypeKind::Float) | (TypeKind::Float, TypeKind::Integer) => {
                TypeKind::Float
            }
            (ours, theirs) if ours == theirs => ours.clone(),
            _ => return None,
        };
        Some(Self {
            kind,
            array: self.array,
            description: self
                .description
                .clone()
                .or_else(|| other.description.clone()),
        })
    }
}

/// One registered type: its fields, or its composite parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeEntry {
    /// Ordered field table.
    pub fields: IndexMap<String, FieldShape>,
    /// Flattened parts when the whole type is an `allOf`/`anyOf`/`oneOf`.
    pub embedded: Vec<String>,
    /// Documentation attached to the type, when the source provides any.
    pub description: Option<String>,
    /// File the type was derived from.
    pub source: Option<String>,
}

/// Insertion-ordered collection of the types discovered so far.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: IndexMap<String, TypeEntry>,
}

impl TypeRegistry {
    /// Inserts or replaces a type under its exact key.
    ///
    /// Schema components carry unique names, so no merging is attempted.
    pub fn insert(&mut self, name: impl Into<String>, entry: TypeEntry) {
        self.types.insert(name.into(), entry);
    }

    /// Registers a type observed in a sample, merging it with previous
    /// observations of the same name.
    ///
    /// Matching field tables union their fields. A disagreeing field forces
    /// a fresh entry qualified by the enclosing type (`parent.name`), so
    /// both shapes survive. Returns the key the entry actually landed
    /// under.
    pub fn register(&mut self, name: &str, parent: &str, entry: TypeEntry) -> String {
        let Some(key) = self.matching_key(name) else {
            debug!(name, "registering new type");
            self.types.insert(name.to_string(), entry);
            return name.to_string();
        };

        let merged = self
            .types
            .get(&key)
            .and_then(|existing| merged_fields(existing, &entry));

        if let Some(fields) = merged {
            if let Some(existing) = self.types.get_mut(&key) {
                existing.fields = fields;
                if entry.source.is_some() {
                    existing.source = entry.source;
                }
                if existing.description.is_none() {
                    existing.description = entry.description;
                }
            }
            debug!(name, key = %key, "merged repeated observation");
            return key;
        }

        let qualified = format!("{parent}.{key}");
        debug!(name, qualified = %qualified, "conflicting shape, keeping both");
        self.types.insert(qualified.clone(), entry);
        qualified
    }

    /// Looks the name up directly, falling back to entries whose last
    /// dot-separated segment matches.
    fn matching_key(&self, name: &str) -> Option<String> {
        if self.types.contains_key(name) {
            return Some(name.to_string());
        }
        self.types
            .keys()
            .find(|key| key.rsplit('.').next() == Some(name))
            .cloned()
    }

    /// Registered types, in registration order.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &TypeEntry)> {
        self.types.iter()
    }

    /// Looks up a type by its exact key.
    pub fn get(&self, name: &str) -> Option<&TypeEntry> {
        self.types.get(name)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Union of both field tables, or `None` on the first unmergeable field.
fn merged_fields(
    existing: &TypeEntry,
    incoming: &TypeEntry,
) -> Option<IndexMap<String, FieldShape>> {
    let mut merged = existing.fields.clone();
    for (field, shape) in &incoming.fields {
        let unified = match merged.get(field) {
            Some(current) => current.unified(shape)?,
            None => shape.clone(),
        };
        merged.insert(field.clone(), unified);
    }
    Some(merged)
}
