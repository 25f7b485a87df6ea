//! Selectors - typed accessors over runs
//!
//! A selector reads one value out of a [`Run`]: its ID, a parameter, a scalar
//! metric, or a temporal metric reduced to one number. Selectors are the
//! vocabulary for every query operation: they drive filtering (through the
//! [`Compare`] builders), sorting, grouping and projection.
//!
//! Missing data never fails:
//! - a missing parameter reads as [`Scalar::Null`]
//! - a missing metric reads as `+inf` (`min`) or `-inf` (`max`), so it ranks
//!   last under "best first" ordering
//! - a missing or empty temporal series reads as NaN
//!
//! ## Example
//!
//! ```rust
//! use ablate_db::run::Run;
//! use ablate_db::selector::{Compare, Direction, Metric, Param};
//!
//! let run = Run::builder("run-42")
//!     .param("lr", 0.001)
//!     .metric("accuracy", 0.91)
//!     .metric("loss", 0.1)
//!     .build();
//!
//! let acc = Metric::new("accuracy", Direction::Max);
//! let loss = Metric::new("loss", Direction::Min);
//! let keep = acc.gt(0.8) & loss.lt(0.2) | Param::new("lr").equals(0.01);
//! assert!(keep.evaluate(&run));
//! ```

mod predicate;

pub use predicate::{CmpOp, Compare, Predicate, RunFilter};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::run::{Run, Scalar};
use crate::Error;

/// Whether lower or higher metric values are better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Lower is better.
    Min,
    /// Higher is better.
    Max,
}

impl Direction {
    /// Value reported for a run that lacks the metric.
    #[must_use]
    pub const fn missing(self) -> f64 {
        match self {
            Self::Min => f64::INFINITY,
            Self::Max => f64::NEG_INFINITY,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            other => Err(Error::InvalidDirection(other.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a temporal series collapses to one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reduction {
    /// Smallest sample.
    Min,
    /// Largest sample.
    Max,
    /// Sample at index 0.
    First,
    /// Last sample.
    Last,
}

impl Reduction {
    /// Reduce the samples of a series, NaN when there are none.
    #[must_use]
    pub fn reduce(self, samples: &[(i64, f64)]) -> f64 {
        let values = samples.iter().map(|&(_, value)| value);
        match self {
            Self::Min => values.reduce(f64::min),
            Self::Max => values.reduce(f64::max),
            Self::First => samples.first().map(|&(_, value)| value),
            Self::Last => samples.last().map(|&(_, value)| value),
        }
        .unwrap_or(f64::NAN)
    }
}

impl From<Direction> for Reduction {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Min => Self::Min,
            Direction::Max => Self::Max,
        }
    }
}

impl FromStr for Reduction {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            other => Err(Error::InvalidReduction(other.to_string())),
        }
    }
}

/// Selects the run ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Id {
    label: String,
}

impl Id {
    /// Name under which the ID is addressed.
    pub const NAME: &'static str = "id";

    /// Create an ID selector labelled `id`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            label: Self::NAME.to_string(),
        }
    }

    /// Set the display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

/// Selects one parameter; missing parameters read as [`Scalar::Null`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    name: String,
    label: String,
}

impl Param {
    /// Create a parameter selector labelled after the parameter.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
        }
    }

    /// Set the display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Read the parameter.
    #[must_use]
    pub fn value(&self, run: &Run) -> Scalar {
        run.param(&self.name).cloned().unwrap_or_default()
    }
}

/// Anything a run can be ranked by.
///
/// Implemented by [`Metric`] and [`TemporalMetric`]; `sort`, `topk`,
/// `bottomk` and `aggregate` accept any implementor.
pub trait Objective: fmt::Debug {
    /// Metric name.
    fn name(&self) -> &str;

    /// Whether lower or higher is better.
    fn direction(&self) -> Direction;

    /// Numeric value of the run under this objective.
    fn score(&self, run: &Run) -> f64;
}

/// Selects a scalar metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    name: String,
    label: String,
    direction: Direction,
}

impl Metric {
    /// Create a metric selector.
    #[must_use]
    pub fn new(name: impl Into<String>, direction: Direction) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            direction,
        }
    }

    /// Create a metric selector from a direction name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDirection`] unless `direction` is `min` or `max`.
    pub fn parse(name: impl Into<String>, direction: &str) -> crate::Result<Self> {
        Ok(Self::new(name, direction.parse()?))
    }

    /// Set the display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Read the metric, or the direction's sentinel when absent.
    #[must_use]
    pub fn value(&self, run: &Run) -> f64 {
        run.metric(&self.name)
            .unwrap_or_else(|| self.direction.missing())
    }
}

impl Objective for Metric {
    fn name(&self) -> &str {
        &self.name
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn score(&self, run: &Run) -> f64 {
        self.value(run)
    }
}

/// Selects a temporal metric reduced to one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalMetric {
    name: String,
    label: String,
    direction: Direction,
    reduction: Reduction,
}

impl TemporalMetric {
    /// Create a temporal metric selector reducing in its own direction.
    #[must_use]
    pub fn new(name: impl Into<String>, direction: Direction) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            direction,
            reduction: direction.into(),
        }
    }

    /// Create a temporal metric selector from direction and reduction names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDirection`] or [`Error::InvalidReduction`] when
    /// either name is outside its allowed set.
    pub fn parse(
        name: impl Into<String>,
        direction: &str,
        reduction: Option<&str>,
    ) -> crate::Result<Self> {
        let selector = Self::new(name, direction.parse()?);
        match reduction {
            Some(reduction) => Ok(selector.with_reduction(reduction.parse()?)),
            None => Ok(selector),
        }
    }

    /// Override the reduction.
    #[must_use]
    pub const fn with_reduction(mut self, reduction: Reduction) -> Self {
        self.reduction = reduction;
        self
    }

    /// Set the display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Get the reduction.
    #[must_use]
    pub const fn reduction(&self) -> Reduction {
        self.reduction
    }

    /// Reduce the series, NaN when absent or empty.
    #[must_use]
    pub fn value(&self, run: &Run) -> f64 {
        run.series(&self.name)
            .map_or(f64::NAN, |samples| self.reduction.reduce(samples))
    }
}

impl Objective for TemporalMetric {
    fn name(&self) -> &str {
        &self.name
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn score(&self, run: &Run) -> f64 {
        self.value(run)
    }
}

/// The closed set of selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Run ID
    Id(Id),
    /// Parameter
    Param(Param),
    /// Scalar metric
    Metric(Metric),
    /// Reduced temporal metric
    TemporalMetric(TemporalMetric),
}

impl Selector {
    /// Name of the field the selector reads.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Id(_) => Id::NAME,
            Self::Param(p) => &p.name,
            Self::Metric(m) => &m.name,
            Self::TemporalMetric(t) => &t.name,
        }
    }

    /// Display label (defaults to the name).
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Id(i) => &i.label,
            Self::Param(p) => &p.label,
            Self::Metric(m) => &m.label,
            Self::TemporalMetric(t) => &t.label,
        }
    }

    /// Direction of metric selectors, `None` for ID and parameters.
    #[must_use]
    pub const fn direction(&self) -> Option<Direction> {
        match self {
            Self::Id(_) | Self::Param(_) => None,
            Self::Metric(m) => Some(m.direction),
            Self::TemporalMetric(t) => Some(t.direction),
        }
    }

    /// Read the selected value from a run.
    #[must_use]
    pub fn select(&self, run: &Run) -> Scalar {
        match self {
            Self::Id(_) => Scalar::Str(run.id().to_string()),
            Self::Param(p) => p.value(run),
            Self::Metric(m) => Scalar::Float(m.value(run)),
            Self::TemporalMetric(t) => Scalar::Float(t.value(run)),
        }
    }
}

impl From<Id> for Selector {
    fn from(selector: Id) -> Self {
        Self::Id(selector)
    }
}

impl From<Param> for Selector {
    fn from(selector: Param) -> Self {
        Self::Param(selector)
    }
}

impl From<Metric> for Selector {
    fn from(selector: Metric) -> Self {
        Self::Metric(selector)
    }
}

impl From<TemporalMetric> for Selector {
    fn from(selector: TemporalMetric) -> Self {
        Self::TemporalMetric(selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parse() {
        assert_eq!("min".parse::<Direction>().unwrap(), Direction::Min);
        assert!(matches!(
            "best".parse::<Direction>(),
            Err(Error::InvalidDirection(d)) if d == "best"
        ));
    }

    #[test]
    fn test_reduction_defaults_to_direction() {
        assert_eq!(TemporalMetric::new("acc", Direction::Max).reduction(), Reduction::Max);
        assert_eq!(TemporalMetric::new("loss", Direction::Min).reduction(), Reduction::Min);
    }

    #[test]
    fn test_reduce_empty_is_nan() {
        for reduction in [Reduction::Min, Reduction::Max, Reduction::First, Reduction::Last] {
            assert!(reduction.reduce(&[]).is_nan());
        }
    }

    #[test]
    fn test_selector_names_and_labels() {
        let id: Selector = Id::new().into();
        assert_eq!(id.name(), "id");
        assert_eq!(id.label(), "id");

        let lr: Selector = Param::new("lr").with_label("Learning rate").into();
        assert_eq!(lr.name(), "lr");
        assert_eq!(lr.label(), "Learning rate");
        assert_eq!(lr.direction(), None);

        let acc: Selector = Metric::new("acc", Direction::Max).into();
        assert_eq!(acc.direction(), Some(Direction::Max));
    }
}
