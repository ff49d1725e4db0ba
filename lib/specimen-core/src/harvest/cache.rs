use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Controls when an existing payload snapshot may be served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidationPolicy {
    /// A present snapshot is always served and never refreshed.
    #[default]
    Never,
    /// Any existing snapshot is ignored and rewritten from a fresh fetch.
    Refresh,
}

/// Local snapshot of the captured raw payload.
///
/// The snapshot exists purely to skip the network fetch and markup scan on
/// subsequent runs. With the default [`InvalidationPolicy::Never`] the file
/// is created once and served for as long as it exists; deleting it (or
/// running with [`InvalidationPolicy::Refresh`]) forces a new capture.
#[derive(Debug, Clone)]
pub struct PayloadCache {
    path: PathBuf,
    policy: InvalidationPolicy,
}

impl PayloadCache {
    /// Creates a cache around the given snapshot file with the default
    /// policy.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            policy: InvalidationPolicy::default(),
        }
    }

    /// Overrides the invalidation policy.
    #[must_use]
    pub fn with_policy(mut self, policy: InvalidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Location of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the snapshot contents when present and admitted by the
    /// policy.
    ///
    /// A missing file is a plain miss, not an error.
    ///
    /// # Errors
    ///
    /// Fails when the snapshot exists but cannot be read.
    pub fn load(&self) -> io::Result<Option<String>> {
        if self.policy == InvalidationPolicy::Refresh {
            debug!(path = %self.path.display(), "snapshot ignored by refresh policy");
            return Ok(None);
        }
        match fs::read_to_string(&self.path) {
            Ok(payload) => {
                debug!(path = %self.path.display(), bytes = payload.len(), "snapshot hit");
                Ok(Some(payload))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "snapshot miss");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Writes the captured payload verbatim.
    ///
    /// # Errors
    ///
    /// Fails when the snapshot file cannot be written.
    pub fn store(&self, payload: &str) -> io::Result<()> {
        debug!(path = %self.path.display(), bytes = payload.len(), "storing snapshot");
        fs::write(&self.path, payload)
    }
}
