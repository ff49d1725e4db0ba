//! Identifier rules for generated Rust code.
//!
//! JSON names arrive in whatever casing the API uses; everything rendered
//! goes through here so type names come out PascalCase, field names come
//! out snake_case, and collisions with the language get escaped instead of
//! breaking the build.

use indexmap::IndexMap;

/// Keywords that need `r#` escaping when used as field names.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do", "dyn",
    "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in", "let",
    "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return",
    "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized", "use",
    "virtual", "where", "while", "yield",
];

/// Keywords the `r#` escape does not cover; these get an underscore suffix.
const UNESCAPABLE: &[&str] = &["crate", "self", "super"];

/// User-driven naming configuration applied before registration.
#[derive(Debug, Clone, Default)]
pub(super) struct NamePolicy {
    /// Module name whose prefix is trimmed off type names.
    pub module: String,
    /// Type renames, matched against the raw name before normalization.
    pub renames: IndexMap<String, String>,
}

impl NamePolicy {
    /// Registry key for a raw sample-derived name.
    pub fn type_key(&self, raw: &str) -> String {
        let renamed = self.renames.get(raw).map_or(raw, String::as_str);
        normalized_key(renamed, &self.module)
    }
}

/// snake_case registry key with the module prefix stutter trimmed.
///
/// A name that is nothing but the module prefix keeps its full form.
pub(super) fn normalized_key(raw: &str, module: &str) -> String {
    use cruet::*;
    let snake = raw.to_snake_case();
    let module_snake = module.to_snake_case();
    snake
        .strip_prefix(module_snake.as_str())
        .map(|rest| rest.trim_start_matches('_'))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(snake.as_str())
        .to_string()
}

/// PascalCase struct identifier for a registry key.
///
/// Parent-qualified keys (`fields.status`) collapse into a single name
/// (`FieldsStatus`).
pub(super) fn type_ident(key: &str) -> String {
    use cruet::*;
    let cleaned = key.replace(['.', '-', '\\'], "_");
    let pascal = cleaned.to_pascal_case();
    if pascal.is_empty() {
        return "Unnamed".to_string();
    }
    if pascal.chars().next().is_some_and(|ch| ch.is_ascii_digit()) {
        return format!("N{pascal}");
    }
    if pascal == "Self" {
        return "Self_".to_string();
    }
    pascal
}

/// snake_case field identifier, escaped against keywords and digits.
pub(super) fn field_ident(raw: &str) -> String {
    use cruet::*;
    let snake = raw.to_snake_case();
    let snake = if snake.is_empty() {
        "field".to_string()
    } else {
        snake
    };
    if snake.chars().next().is_some_and(|ch| ch.is_ascii_digit()) {
        return format!("n{snake}");
    }
    if UNESCAPABLE.contains(&snake.as_str()) {
        return format!("{snake}_");
    }
    if KEYWORDS.contains(&snake.as_str()) {
        return format!("r#{snake}");
    }
    snake
}

/// The name serde sees for a field identifier.
pub(super) fn serde_name(ident: &str) -> &str {
    ident.strip_prefix("r#").unwrap_or(ident)
}
