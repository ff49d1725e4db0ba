//! Rust model generation from harvested samples or a schema document.
//!
//! Two front ends feed one [`TypeRegistry`]: sample inference derives field
//! tables from harvested JSON files, and the schema loader reads
//! `components.schemas` from a schema document. Rendering is deterministic,
//! so regenerating from the same input yields the same file.
//!
//! # Example
//!
//! ```rust,no_run
//! use specimen_core::codegen::Generator;
//!
//! # fn example() -> Result<(), specimen_core::codegen::CodegenError> {
//! let models = Generator::default()
//!     .with_module("jira")
//!     .with_source("jira")
//!     .render()?;
//! println!("{models}");
//! # Ok(())
//! # }
//! ```

mod emit;
mod error;
mod infer;
mod model;
mod names;
mod schema;

use std::path::PathBuf;

use indexmap::IndexMap;
use tracing::{info, warn};

use self::names::NamePolicy;

pub use self::error::CodegenError;
pub use self::model::{FieldShape, TypeEntry, TypeKind, TypeRegistry};

/// Module name assumed when none is configured; its prefix is trimmed off
/// type names.
const DEFAULT_MODULE: &str = "models";

/// Turns JSON sample files or a schema document into Rust struct
/// definitions.
///
/// When a schema file is configured it takes precedence and sample sources
/// are ignored.
#[derive(Debug, Clone)]
pub struct Generator {
    sources: Vec<PathBuf>,
    schema_file: Option<PathBuf>,
    module: String,
    renames: IndexMap<String, String>,
    replace_types: IndexMap<String, String>,
    field_types: IndexMap<String, String>,
}

impl Default for Generator {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            schema_file: None,
            module: DEFAULT_MODULE.to_string(),
            renames: IndexMap::new(),
            replace_types: IndexMap::new(),
            field_types: IndexMap::new(),
        }
    }
}

impl Generator {
    /// Adds a sample file, or a directory whose `.json` entries are taken
    /// in name order.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.sources.push(source.into());
        self
    }

    /// Generates from a schema document instead of samples.
    #[must_use]
    pub fn with_schema_file(mut self, schema_file: impl Into<PathBuf>) -> Self {
        self.schema_file = Some(schema_file.into());
        self
    }

    /// Sets the module name whose prefix is trimmed off type names.
    #[must_use]
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    /// Renames a type, matched against the raw name before normalization.
    #[must_use]
    pub fn with_rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.renames.insert(from.into(), to.into());
        self
    }

    /// Replaces a rendered type, matched exactly (`f64` → `f32`).
    #[must_use]
    pub fn with_replace_type(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.replace_types.insert(from.into(), to.into());
        self
    }

    /// Forces the type of one generated field, keyed `Struct.field`.
    #[must_use]
    pub fn with_field_type(mut self, field: impl Into<String>, to: impl Into<String>) -> Self {
        self.field_types.insert(field.into(), to.into());
        self
    }

    /// Builds the registry and renders it as Rust source.
    ///
    /// # Errors
    ///
    /// Fails when a source cannot be read or decoded, or when a sample
    /// holds a top-level value no struct can be derived from.
    pub fn render(&self) -> Result<String, CodegenError> {
        let mut registry = TypeRegistry::default();
        if let Some(schema_file) = &self.schema_file {
            if !self.sources.is_empty() {
                warn!("schema file configured, ignoring sample sources");
            }
            info!(schema = %schema_file.display(), "loading schema document");
            schema::load_schema(schema_file, &mut registry)?;
        } else {
            info!(sources = self.sources.len(), "inferring from samples");
            let policy = NamePolicy {
                module: self.module.clone(),
                renames: self.renames.clone(),
            };
            infer::infer_samples(&self.sources, &policy, &mut registry)?;
        }
        info!(types = registry.len(), "rendering models");
        let options = emit::RenderOptions {
            replace_types: &self.replace_types,
            field_types: &self.field_types,
        };
        Ok(emit::render(&registry, &options))
    }
}
