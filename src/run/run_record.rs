//! Run - one experiment execution

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Scalar;

/// Ordered `(step, value)` samples of one temporal metric.
pub type Series = Vec<(i64, f64)>;

/// Run represents a single execution of an experiment.
///
/// A run carries its parameters, the final scalar metrics, and optional
/// per-step time series. Runs are value objects: the query engine never
/// mutates a run it was handed, it either shares it or works on a copy.
///
/// The temporal map serializes as `{"name": [[step, value], ...]}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Run {
    id: String,
    #[serde(default)]
    params: BTreeMap<String, Scalar>,
    #[serde(default)]
    metrics: BTreeMap<String, f64>,
    #[serde(default)]
    temporal: BTreeMap<String, Series>,
}

impl Run {
    /// Create a new run with no parameters, metrics, or temporal data.
    ///
    /// # Arguments
    ///
    /// * `id` - Identifier of the run
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            params: BTreeMap::new(),
            metrics: BTreeMap::new(),
            temporal: BTreeMap::new(),
        }
    }

    /// Create a builder for constructing a run with parameters and metrics.
    #[must_use]
    pub fn builder(id: impl Into<String>) -> RunBuilder {
        RunBuilder::new(id)
    }

    /// Get the run ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Replace the run ID.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Get all parameters.
    #[must_use]
    pub const fn params(&self) -> &BTreeMap<String, Scalar> {
        &self.params
    }

    /// Get a single parameter, if present.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Scalar> {
        self.params.get(name)
    }

    /// Mutable access to the parameters.
    pub fn params_mut(&mut self) -> &mut BTreeMap<String, Scalar> {
        &mut self.params
    }

    /// Get all scalar metrics.
    #[must_use]
    pub const fn metrics(&self) -> &BTreeMap<String, f64> {
        &self.metrics
    }

    /// Get a single scalar metric, if present.
    #[must_use]
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    /// Mutable access to the scalar metrics.
    pub fn metrics_mut(&mut self) -> &mut BTreeMap<String, f64> {
        &mut self.metrics
    }

    /// Get all temporal series.
    #[must_use]
    pub const fn temporal(&self) -> &BTreeMap<String, Series> {
        &self.temporal
    }

    /// Get the samples of one temporal metric, if logged.
    #[must_use]
    pub fn series(&self, name: &str) -> Option<&[(i64, f64)]> {
        self.temporal.get(name).map(Vec::as_slice)
    }

    /// Mutable access to the temporal series.
    pub fn temporal_mut(&mut self) -> &mut BTreeMap<String, Series> {
        &mut self.temporal
    }
}

/// Builder for `Run`.
#[derive(Debug)]
pub struct RunBuilder {
    run: Run,
}

impl RunBuilder {
    /// Create a new builder with the required ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { run: Run::new(id) }
    }

    /// Set a parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.run.params.insert(name.into(), value.into());
        self
    }

    /// Set a scalar metric.
    #[must_use]
    pub fn metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.run.metrics.insert(name.into(), value);
        self
    }

    /// Set the temporal series of a metric.
    #[must_use]
    pub fn temporal(
        mut self,
        name: impl Into<String>,
        samples: impl IntoIterator<Item = (i64, f64)>,
    ) -> Self {
        self.run.temporal.insert(name.into(), samples.into_iter().collect());
        self
    }

    /// Build the `Run`.
    #[must_use]
    pub fn build(self) -> Run {
        self.run
    }
}
