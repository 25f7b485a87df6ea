//! JSON file source.

use std::fs;
use std::path::{Path, PathBuf};

use super::Source;
use crate::run::Run;
use crate::Result;

/// Loads runs from a JSON file holding an array of runs.
///
/// The encoding is the serde form of [`Run`]; temporal series are arrays of
/// `[step, value]` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonSource {
    path: PathBuf,
}

impl JsonSource {
    /// Create a source reading from `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write runs to `path` in the format [`JsonSource`] reads.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn save(path: impl AsRef<Path>, runs: &[Run]) -> Result<()> {
        let encoded = serde_json::to_string_pretty(runs)?;
        fs::write(path, encoded)?;
        Ok(())
    }
}

impl Source for JsonSource {
    fn load(&self) -> Result<Vec<Run>> {
        let raw = fs::read_to_string(&self.path)?;
        let runs: Vec<Run> = serde_json::from_str(&raw)?;
        tracing::debug!(path = %self.path.display(), runs = runs.len(), "loaded runs");
        Ok(runs)
    }
}
