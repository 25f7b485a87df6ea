//! Group aggregation
//!
//! Collapses each group of a `GroupedQuery` to one representative run.
//! `first`, `last`, `best` and `worst` pick an existing run; `mean` builds a
//! synthetic one with [`mean_run`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashMap;

use crate::run::{GroupedRun, Run, Scalar, Series};
use crate::Error;

/// Value kept for a parameter the runs of a group disagree on.
pub const DISAGREEMENT: &str = "#";

/// Supported aggregation methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateMethod {
    /// First run of each group
    First,
    /// Last run of each group
    Last,
    /// Best run of each group under a metric
    Best,
    /// Worst run of each group under a metric
    Worst,
    /// Synthetic mean run of each group
    Mean,
}

impl AggregateMethod {
    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Last => "last",
            Self::Best => "best",
            Self::Worst => "worst",
            Self::Mean => "mean",
        }
    }

    /// Whether the method ranks runs and therefore needs a metric.
    #[must_use]
    pub const fn needs_objective(self) -> bool {
        matches!(self, Self::Best | Self::Worst)
    }
}

impl FromStr for AggregateMethod {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            "best" => Ok(Self::Best),
            "worst" => Ok(Self::Worst),
            "mean" => Ok(Self::Mean),
            other => Err(Error::UnsupportedAggregation(other.to_string())),
        }
    }
}

impl fmt::Display for AggregateMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the mean run of a group.
///
/// - ID: `grouped:<key>:<value>`
/// - metrics: for every metric any run reports, the mean over the runs that
///   report it
/// - temporal: for every series name and every step seen under it, the mean
///   over the runs that logged that exact step; sorted by step, no
///   interpolation across differing step grids
/// - params: only keys every run has; a key keeps its value when all runs
///   stringify it identically and becomes [`DISAGREEMENT`] otherwise
#[must_use]
pub fn mean_run(group: &GroupedRun) -> Run {
    let runs: Vec<&Run> = group.runs().iter().map(|run| &**run).collect();

    let mut run = Run::new(format!("grouped:{}:{}", group.key(), group.value()));
    *run.params_mut() = common_params(&runs);
    *run.metrics_mut() = mean_metrics(&runs);
    *run.temporal_mut() = mean_temporal(&runs);
    run
}

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        return f64::NAN;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = count as f64;
    sum / count
}

fn mean_metrics(runs: &[&Run]) -> BTreeMap<String, f64> {
    let names: BTreeSet<&str> = runs
        .iter()
        .flat_map(|run| run.metrics().keys().map(String::as_str))
        .collect();

    names
        .into_iter()
        .map(|name| {
            let (sum, count) = runs
                .iter()
                .filter_map(|run| run.metric(name))
                .fold((0.0, 0), |(sum, count), value| (sum + value, count + 1));
            (name.to_string(), mean(sum, count))
        })
        .collect()
}

fn mean_temporal(runs: &[&Run]) -> BTreeMap<String, Series> {
    let mut accumulators: BTreeMap<&str, FxHashMap<i64, (f64, usize)>> = BTreeMap::new();

    for run in runs {
        for (name, samples) in run.temporal() {
            let steps = accumulators.entry(name.as_str()).or_default();
            for &(step, value) in samples {
                let slot = steps.entry(step).or_insert((0.0, 0));
                slot.0 += value;
                slot.1 += 1;
            }
        }
    }

    accumulators
        .into_iter()
        .map(|(name, steps)| {
            let mut series: Series = steps
                .into_iter()
                .map(|(step, (sum, count))| (step, mean(sum, count)))
                .collect();
            series.sort_by_key(|&(step, _)| step);
            (name.to_string(), series)
        })
        .collect()
}

fn common_params(runs: &[&Run]) -> BTreeMap<String, Scalar> {
    let Some((first, rest)) = runs.split_first() else {
        return BTreeMap::new();
    };

    first
        .params()
        .iter()
        .filter(|(name, _)| rest.iter().all(|run| run.params().contains_key(*name)))
        .map(|(name, value)| {
            let rendered = value.to_string();
            let agree = rest
                .iter()
                .filter_map(|run| run.param(name))
                .all(|other| other.to_string() == rendered);
            let collapsed = if agree {
                value.clone()
            } else {
                Scalar::from(DISAGREEMENT)
            };
            (name.clone(), collapsed)
        })
        .collect()
}
