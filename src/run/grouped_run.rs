//! Grouped Run - a bucket of runs sharing a grouping identity

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::Run;

/// A collection of runs grouped under a key/value pair.
///
/// `key` describes the grouping selector(s), e.g. `"model"` or `"model+seed"`.
/// `value` encodes the group identity. Runs keep the encounter order of the
/// list they were grouped from.
///
/// Runs are held as shared handles; cloning a `GroupedRun` shares the runs,
/// [`GroupedRun::detached`] copies them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupedRun {
    key: String,
    value: String,
    runs: Vec<Arc<Run>>,
}

impl GroupedRun {
    /// Create a new grouped run.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>, runs: Vec<Arc<Run>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            runs,
        }
    }

    /// Get the grouping key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the group identity.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Get the runs in this group.
    #[must_use]
    pub fn runs(&self) -> &[Arc<Run>] {
        &self.runs
    }

    /// Mutable access to the runs in this group.
    pub fn runs_mut(&mut self) -> &mut Vec<Arc<Run>> {
        &mut self.runs
    }

    /// Number of runs in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Whether the group holds no runs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Same key and value, different runs.
    #[must_use]
    pub(crate) fn with_runs(&self, runs: Vec<Arc<Run>>) -> Self {
        Self {
            key: self.key.clone(),
            value: self.value.clone(),
            runs,
        }
    }

    /// Deep copy: every run is cloned into a fresh handle.
    #[must_use]
    pub fn detached(&self) -> Self {
        self.with_runs(detach(&self.runs))
    }
}

/// Clone every run into a handle that shares nothing with the source.
pub(crate) fn detach(runs: &[Arc<Run>]) -> Vec<Arc<Run>> {
    runs.iter().map(|run| Arc::new(Run::clone(run))).collect()
}
