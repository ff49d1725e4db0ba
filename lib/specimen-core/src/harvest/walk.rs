//! Schema document traversal.
//!
//! Walks `paths → methods → responses` in document order and yields one
//! [`TypedExample`] per 200/201 response that declares both a schema
//! reference and a well-formed example payload. Entries missing any of
//! those pieces are skipped; a content-bearing response without an
//! `application/json` media type ends the walk with an error.

use serde_json::{Map, Value};
use tracing::{error, info};

use super::WalkError;

/// Response status codes whose examples are harvested.
const HARVESTED_STATUSES: [&str; 2] = ["200", "201"];

/// One example payload tied to the schema type it illustrates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedExample {
    /// Name of the referenced schema type, the last segment of its `$ref`.
    pub type_name: String,
    /// Canonical JSON text of the example payload.
    pub json: String,
}

/// Iterator over the examples embedded in a schema document.
///
/// Yields `Result` items so the one fatal precondition (a declared JSON
/// response without `application/json` content) can surface mid-walk;
/// recoverable gaps are counted and skipped instead, queryable through
/// [`skipped`](Self::skipped) afterwards.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use specimen_core::harvest::SchemaWalker;
///
/// let paths = json!({
///     "/user": {
///         "get": {
///             "responses": {
///                 "200": {
///                     "content": {
///                         "application/json": {
///                             "schema": {"$ref": "#/components/schemas/User"},
///                             "example": {"name": "mia"}
///                         }
///                     }
///                 }
///             }
///         }
///     }
/// });
/// let paths = paths.as_object().expect("an object");
///
/// let mut walker = SchemaWalker::new(paths);
/// let example = walker.next().expect("one example").expect("no error");
/// assert_eq!(example.type_name, "User");
/// ```
#[derive(Debug)]
pub struct SchemaWalker<'doc> {
    paths: serde_json::map::Iter<'doc>,
    operations: Option<OperationFrame<'doc>>,
    responses: Option<ResponseFrame<'doc>>,
    skipped: usize,
}

#[derive(Debug)]
struct OperationFrame<'doc> {
    path: &'doc str,
    methods: serde_json::map::Iter<'doc>,
}

#[derive(Debug)]
struct ResponseFrame<'doc> {
    path: &'doc str,
    method: &'doc str,
    responses: serde_json::map::Iter<'doc>,
}

impl<'doc> SchemaWalker<'doc> {
    /// Creates a walker over the document's `paths` mapping.
    pub fn new(paths: &'doc Map<String, Value>) -> Self {
        Self {
            paths: paths.iter(),
            operations: None,
            responses: None,
            skipped: 0,
        }
    }

    /// Number of response entries skipped so far for lack of content,
    /// schema reference, or usable example.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for SchemaWalker<'_> {
    type Item = Result<TypedExample, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(frame) = &mut self.responses {
                if let Some((status, response)) = frame.responses.next() {
                    if !HARVESTED_STATUSES.contains(&status.as_str()) {
                        continue;
                    }
                    info!(
                        path = frame.path,
                        method = frame.method,
                        status = status.as_str(),
                        "matched response"
                    );
                    match typed_example(frame.path, frame.method, status, response) {
                        Ok(Some(example)) => return Some(Ok(example)),
                        Ok(None) => {
                            self.skipped += 1;
                            continue;
                        }
                        Err(err) => return Some(Err(err)),
                    }
                }
                self.responses = None;
            }

            if let Some(frame) = &mut self.operations {
                if let Some((method, operation)) = frame.methods.next() {
                    info!(path = frame.path, method = method.as_str(), "scanning operation");
                    let Some(responses) =
                        operation.get("responses").and_then(Value::as_object)
                    else {
                        continue;
                    };
                    self.responses = Some(ResponseFrame {
                        path: frame.path,
                        method: method.as_str(),
                        responses: responses.iter(),
                    });
                    continue;
                }
                self.operations = None;
            }

            let (path, item) = self.paths.next()?;
            let Some(methods) = item.as_object() else {
                continue;
            };
            self.operations = Some(OperationFrame {
                path: path.as_str(),
                methods: methods.iter(),
            });
        }
    }
}

/// Extracts the example of one matched response, if it has everything
/// needed.
///
/// `Ok(None)` marks a recoverable skip; the only error is the missing
/// `application/json` precondition.
fn typed_example(
    path: &str,
    method: &str,
    status: &str,
    response: &Value,
) -> Result<Option<TypedExample>, WalkError> {
    // Empty-body responses declare no content at all.
    let Some(content) = response.get("content") else {
        return Ok(None);
    };
    let Some(media) = content.get(mime::APPLICATION_JSON.as_ref()) else {
        return Err(WalkError::MissingJsonContent {
            path: path.to_string(),
            method: method.to_string(),
            status: status.to_string(),
        });
    };
    let Some(type_name) = referenced_type(media.get("schema")) else {
        return Ok(None);
    };
    let Some(example) = media.get("example") else {
        return Ok(None);
    };
    let Some(json) = normalize_example(example)? else {
        return Ok(None);
    };
    Ok(Some(TypedExample {
        type_name: type_name.to_string(),
        json,
    }))
}

/// Resolves the schema's type reference, looking through `items` for
/// array-typed schemas.
fn referenced_type(schema: Option<&Value>) -> Option<&str> {
    let schema = schema?;
    let reference = if schema.get("type").and_then(Value::as_str) == Some("array") {
        schema.get("items")?.get("$ref")?
    } else {
        schema.get("$ref")?
    };
    reference.as_str().map(type_name_from_ref)
}

/// Last slash-delimited segment of a reference like
/// `#/components/schemas/IssueBean`.
fn type_name_from_ref(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

/// Re-serializes the example as canonical JSON text.
///
/// Structured values pass through; strings are parsed first. A string that
/// fails to parse is reported and dropped, never fatal.
fn normalize_example(example: &Value) -> Result<Option<String>, WalkError> {
    match example {
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(parsed) => Ok(Some(serde_json::to_string_pretty(&parsed)?)),
            Err(err) => {
                error!(%err, "could not parse example: {raw}");
                Ok(None)
            }
        },
        value => Ok(Some(serde_json::to_string_pretty(value)?)),
    }
}
