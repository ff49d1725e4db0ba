//! Field-table inference from JSON sample files.
//!
//! Each file contributes one top-level type named after the file stem.
//! Nested objects register under their field name, arrays are typed by
//! their first element, and repeated observations of the same name merge
//! through the registry.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::error::CodegenError;
use super::model::{FieldShape, TypeEntry, TypeKind, TypeRegistry};
use super::names::NamePolicy;

/// Parent label used when two files disagree on a top-level type.
const TOP_LEVEL_PARENT: &str = "top_level";

/// Feeds every sample file into the registry.
pub(super) fn infer_samples(
    sources: &[PathBuf],
    policy: &NamePolicy,
    registry: &mut TypeRegistry,
) -> Result<(), CodegenError> {
    for file in expand_sources(sources)? {
        infer_file(&file, policy, registry)?;
    }
    Ok(())
}

/// Files pass through untouched; directories contribute their `.json`
/// entries in name order.
fn expand_sources(sources: &[PathBuf]) -> Result<Vec<PathBuf>, CodegenError> {
    let mut files = Vec::new();
    for source in sources {
        if !source.is_dir() {
            files.push(source.clone());
            continue;
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(source)? {
            let path = entry?.path();
            if path
                .extension()
                .is_some_and(|extension| extension.eq_ignore_ascii_case("json"))
            {
                entries.push(path);
            }
        }
        entries.sort();
        debug!(source = %source.display(), files = entries.len(), "expanded sample directory");
        files.append(&mut entries);
    }
    Ok(files)
}

fn infer_file(
    file: &Path,
    policy: &NamePolicy,
    registry: &mut TypeRegistry,
) -> Result<(), CodegenError> {
    debug!(file = %file.display(), "inferring from sample");
    let contents = fs::read_to_string(file)?;
    let value = decode(file, &contents)?;

    let records = match value {
        Value::Object(record) => vec![record],
        Value::Array(elements) => elements
            .into_iter()
            .filter_map(|element| match element {
                Value::Object(record) => Some(record),
                other => {
                    warn!(
                        file = %file.display(),
                        kind = json_kind(&other),
                        "ignoring non-object record"
                    );
                    None
                }
            })
            .collect(),
        other => {
            return Err(CodegenError::UnsupportedSource {
                file: file.display().to_string(),
                kind: json_kind(&other),
            });
        }
    };

    let key = policy.type_key(&type_stem(file));
    let label = file.display().to_string();
    for record in records {
        let entry = unwrap_record(&record, &key, &label, policy, registry);
        registry.register(&key, TOP_LEVEL_PARENT, entry);
    }
    Ok(())
}

fn decode(file: &Path, contents: &str) -> Result<Value, CodegenError> {
    let deserializer = &mut serde_json::Deserializer::from_str(contents);
    serde_path_to_error::deserialize(deserializer).map_err(|err| CodegenError::DecodeError {
        file: file.display().to_string(),
        path: err.path().to_string(),
        error: err.into_inner(),
    })
}

/// File name up to the first dot, as the raw type name.
fn type_stem(file: &Path) -> String {
    file.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.split('.').next())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("sample")
        .to_string()
}

fn unwrap_record(
    record: &Map<String, Value>,
    owner: &str,
    source: &str,
    policy: &NamePolicy,
    registry: &mut TypeRegistry,
) -> TypeEntry {
    let mut entry = TypeEntry {
        source: Some(source.to_string()),
        ..TypeEntry::default()
    };
    for (name, value) in record {
        let shape = field_shape(name, value, owner, source, policy, registry);
        entry.fields.insert(name.clone(), shape);
    }
    entry
}

fn field_shape(
    name: &str,
    value: &Value,
    owner: &str,
    source: &str,
    policy: &NamePolicy,
    registry: &mut TypeRegistry,
) -> FieldShape {
    match value {
        Value::Object(nested) => FieldShape::plain(TypeKind::Named(register_nested(
            nested, name, owner, source, policy, registry,
        ))),
        Value::Array(elements) => match elements.first() {
            None => FieldShape::sequence(TypeKind::Unknown),
            Some(Value::Object(nested)) => FieldShape::sequence(TypeKind::Named(register_nested(
                nested, name, owner, source, policy, registry,
            ))),
            Some(element) => FieldShape::sequence(scalar_kind(element)),
        },
        scalar => FieldShape::plain(scalar_kind(scalar)),
    }
}

/// Registers a nested object under its field name and returns the key it
/// landed under.
fn register_nested(
    nested: &Map<String, Value>,
    name: &str,
    owner: &str,
    source: &str,
    policy: &NamePolicy,
    registry: &mut TypeRegistry,
) -> String {
    let key = policy.type_key(name);
    let entry = unwrap_record(nested, &key, source, policy, registry);
    registry.register(&key, owner, entry)
}

fn scalar_kind(value: &Value) -> TypeKind {
    match value {
        Value::Bool(_) => TypeKind::Bool,
        Value::Number(number) if number.is_f64() => TypeKind::Float,
        Value::Number(_) => TypeKind::Integer,
        Value::String(_) => TypeKind::String,
        Value::Null | Value::Array(_) | Value::Object(_) => TypeKind::Unknown,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;

    fn write_sample(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).expect("sample file");
        path
    }

    fn infer(sources: &[PathBuf]) -> TypeRegistry {
        let mut registry = TypeRegistry::default();
        infer_samples(sources, &NamePolicy::default(), &mut registry).expect("inference");
        registry
    }

    #[test]
    fn should_derive_one_type_per_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = write_sample(
            dir.path(),
            "issue.json",
            r#"{"key": "PROJ-1", "count": 2, "open": true, "score": 1.5, "missing": null}"#,
        );

        let registry = infer(&[file]);

        assert_eq!(registry.len(), 1);
        let issue = registry.get("issue").expect("issue type");
        let kind_of = |name: &str| issue.fields.get(name).expect(name).kind.clone();
        assert_eq!(kind_of("key"), TypeKind::String);
        assert_eq!(kind_of("count"), TypeKind::Integer);
        assert_eq!(kind_of("open"), TypeKind::Bool);
        assert_eq!(kind_of("score"), TypeKind::Float);
        assert_eq!(kind_of("missing"), TypeKind::Unknown);
    }

    #[test]
    fn should_register_nested_objects_under_their_field_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = write_sample(
            dir.path(),
            "issue.json",
            r#"{"fields": {"summary": "crash", "votes": [{"count": 1}]}}"#,
        );

        let registry = infer(&[file]);

        assert_eq!(registry.len(), 3);
        let issue = registry.get("issue").expect("issue type");
        let fields = issue.fields.get("fields").expect("fields field");
        assert_eq!(fields.kind, TypeKind::Named("fields".to_string()));
        let votes = registry
            .get("fields")
            .and_then(|entry| entry.fields.get("votes"))
            .expect("votes field");
        assert!(votes.array);
        assert_eq!(votes.kind, TypeKind::Named("votes".to_string()));
    }

    #[test]
    fn should_merge_every_record_of_an_array_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = write_sample(
            dir.path(),
            "events.json",
            r#"[{"at": 1}, {"at": 2, "actor": "sam"}, "noise"]"#,
        );

        let registry = infer(&[file]);

        assert_eq!(registry.len(), 1);
        let events = registry.get("events").expect("events type");
        assert_eq!(events.fields.len(), 2);
    }

    #[test]
    fn should_qualify_nested_conflicts_by_their_owner() {
        let dir = tempfile::tempdir().expect("tempdir");
        let first = write_sample(dir.path(), "alpha.json", r#"{"status": {"code": 1}}"#);
        let second = write_sample(dir.path(), "beta.json", r#"{"status": {"code": "open"}}"#);

        let registry = infer(&[first, second]);

        assert!(registry.get("status").is_some());
        assert!(registry.get("beta.status").is_some());
        let beta = registry.get("beta").expect("beta type");
        let status = beta.fields.get("status").expect("status field");
        assert_eq!(status.kind, TypeKind::Named("beta.status".to_string()));
    }

    #[test]
    fn should_reject_scalar_top_level_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = write_sample(dir.path(), "count.json", "42");

        let mut registry = TypeRegistry::default();
        let result = infer_samples(&[file], &NamePolicy::default(), &mut registry);

        assert!(matches!(
            result,
            Err(CodegenError::UnsupportedSource { kind: "a number", .. })
        ));
    }

    #[test]
    fn should_report_the_location_of_broken_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = write_sample(dir.path(), "broken.json", r#"{"key": }"#);

        let mut registry = TypeRegistry::default();
        let result = infer_samples(&[file], &NamePolicy::default(), &mut registry);

        assert!(matches!(result, Err(CodegenError::DecodeError { .. })));
    }

    #[test]
    fn should_expand_directories_in_name_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_sample(dir.path(), "zulu.json", r#"{"id": 1}"#);
        write_sample(dir.path(), "alpha.json", r#"{"id": 2}"#);
        write_sample(dir.path(), "notes.txt", "not json");

        let registry = infer(&[dir.path().to_path_buf()]);

        let keys: Vec<&String> = registry.entries().map(|(key, _)| key).collect();
        assert_eq!(keys, ["alpha", "zulu"]);
    }

    #[test]
    fn should_name_types_from_the_stem_before_the_first_dot() {
        assert_eq!(type_stem(Path::new("jira/Issue.sample.json")), "Issue");
        assert_eq!(type_stem(Path::new("plain")), "plain");
    }

    #[test]
    fn should_type_arrays_from_their_first_element() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = write_sample(
            dir.path(),
            "board.json",
            r#"{"labels": ["bug", "ui"], "empty": [], "grid": [[1, 2]]}"#,
        );

        let registry = infer(&[file]);

        let board = registry.get("board").expect("board type");
        let shape_of = |name: &str| board.fields.get(name).expect(name).clone();
        assert_eq!(shape_of("labels"), FieldShape::sequence(TypeKind::String));
        assert_eq!(shape_of("empty"), FieldShape::sequence(TypeKind::Unknown));
        assert_eq!(shape_of("grid"), FieldShape::sequence(TypeKind::Unknown));
    }
}
