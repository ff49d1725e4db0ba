use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::TypedExample;

/// Writes harvested examples as `<TypeName>.json` files.
///
/// Paths are keyed by type name only, so later examples for a recurring
/// type overwrite earlier ones.
#[derive(Debug, Clone)]
pub(super) struct ExampleWriter {
    out_dir: PathBuf,
}

impl ExampleWriter {
    pub(super) fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Creates the output directory, tolerating an existing one.
    pub(super) fn prepare(&self) -> io::Result<()> {
        fs::create_dir_all(&self.out_dir)
    }

    /// Writes one example, returning the file it landed in.
    pub(super) fn write(&self, example: &TypedExample) -> io::Result<PathBuf> {
        let path = self.out_dir.join(format!("{}.json", example.type_name));
        fs::write(&path, &example.json)?;
        debug!(path = %path.display(), "wrote example");
        Ok(path)
    }

    pub(super) fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}
