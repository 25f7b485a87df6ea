//! Query pipelines over runs
//!
//! [`Query`] is a chainable, immutable pipeline over a flat list of runs;
//! [`GroupedQuery`] is its counterpart over groups. Every operation returns a
//! new pipeline and leaves the receiver untouched.
//!
//! ## Copy discipline
//!
//! Runs are held as `Arc<Run>`:
//! - shallow operations (`filter`, `sort`, `head`, `tail`, `topk`, `bottomk`,
//!   `copy`) share run handles with their source
//! - deep operations (`map`, `project`, `deepcopy`, `all`) hand out runs that
//!   share nothing with the source
//!
//! ## Example
//!
//! ```rust
//! use ablate_db::query::Query;
//! use ablate_db::run::Run;
//! use ablate_db::selector::{Direction, Metric, Param};
//!
//! let runs = vec![
//!     Run::builder("a").param("model", "resnet").param("seed", 1).metric("acc", 0.7).build(),
//!     Run::builder("b").param("model", "resnet").param("seed", 2).metric("acc", 0.8).build(),
//!     Run::builder("c").param("model", "vit").param("seed", 1).metric("acc", 0.6).build(),
//!     Run::builder("d").param("model", "vit").param("seed", 2).metric("acc", 0.9).build(),
//! ];
//!
//! let best = Query::new(runs)
//!     .groupby([Param::new("model")])
//!     .topk(&Metric::new("acc", Direction::Max), 1)
//!     .all();
//!
//! let ids: Vec<&str> = best.iter().map(|run| run.id()).collect();
//! assert_eq!(ids, ["b", "d"]);
//! ```

mod aggregate;
mod grouped;

pub use aggregate::{mean_run, AggregateMethod, DISAGREEMENT};
pub use grouped::GroupedQuery;

use std::collections::HashSet;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use sha2::{Digest, Sha256};

use crate::run::{detach, GroupedRun, Run, Scalar, ScalarKey};
use crate::selector::{Objective, RunFilter, Selector};
use crate::topk::{sort_indices, top_k_indices, SortOrder};

/// Hex characters kept from the `groupdiff` content hash.
pub const GROUP_HASH_LEN: usize = 8;

/// Chainable pipeline over a flat list of runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    runs: Vec<Arc<Run>>,
}

impl Query {
    /// Wrap a list of runs.
    #[must_use]
    pub fn new(runs: Vec<Run>) -> Self {
        Self::from_shared(runs.into_iter().map(Arc::new).collect())
    }

    /// Wrap a list of shared run handles without copying them.
    #[must_use]
    pub const fn from_shared(runs: Vec<Arc<Run>>) -> Self {
        Self { runs }
    }

    /// Shallow view of the runs currently held.
    #[must_use]
    pub fn runs(&self) -> &[Arc<Run>] {
        &self.runs
    }

    /// Keep the runs the predicate accepts, in order.
    #[must_use]
    pub fn filter<F: RunFilter>(&self, predicate: F) -> Self {
        let kept: Vec<Arc<Run>> = self
            .runs
            .iter()
            .filter(|run| predicate.matches(run))
            .cloned()
            .collect();
        tracing::trace!(before = self.runs.len(), after = kept.len(), "filter");
        Self::from_shared(kept)
    }

    /// Apply `transform` to a deep copy of every run.
    ///
    /// The transform owns its input, so mutating it cannot affect this query.
    #[must_use]
    pub fn map<F>(&self, mut transform: F) -> Self
    where
        F: FnMut(Run) -> Run,
    {
        Self::new(
            self.runs
                .iter()
                .map(|run| transform(Run::clone(run)))
                .collect(),
        )
    }

    /// Stable sort by a metric; `ascending == false` puts the highest first.
    #[must_use]
    pub fn sort<O: Objective + ?Sized>(&self, metric: &O, ascending: bool) -> Self {
        let order = if ascending {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        };
        Self::from_shared(sort_runs(&self.runs, metric, order))
    }

    /// Restrict every run's parameters to the selected names.
    ///
    /// Works on deep copies; metrics and temporal data are left as they are.
    #[must_use]
    pub fn project<I, S>(&self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Selector>,
    {
        let names = selector_names(selectors);
        Self::new(
            self.runs
                .iter()
                .map(|run| project_run(run, &names))
                .collect(),
        )
    }

    /// Partition runs by the tuple of selector outputs.
    ///
    /// Groups appear in order of first occurrence. A group's key is the
    /// selector names joined with `+`, its value the selected values joined
    /// with `|`.
    #[must_use]
    pub fn groupby<I, S>(&self, selectors: I) -> GroupedQuery
    where
        I: IntoIterator<Item = S>,
        S: Into<Selector>,
    {
        let selectors: Vec<Selector> = selectors.into_iter().map(Into::into).collect();
        let key = selectors
            .iter()
            .map(Selector::name)
            .collect::<Vec<_>>()
            .join("+");

        let partitions = partition(&self.runs, |run| {
            let values: Vec<Scalar> = selectors.iter().map(|s| s.select(run)).collect();
            let identity = values.iter().map(Scalar::key).collect::<Vec<_>>();
            (identity, values)
        });

        let groups: Vec<GroupedRun> = partitions
            .into_iter()
            .map(|(values, runs)| {
                let value = values
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("|");
                GroupedRun::new(key.clone(), value, runs)
            })
            .collect();

        tracing::debug!(key = %key, runs = self.runs.len(), groups = groups.len(), "groupby");
        GroupedQuery::new(groups)
    }

    /// Partition runs by every parameter except the selected ones.
    ///
    /// Runs land in the same group when they agree on all remaining
    /// parameters. A group's key is the excluded names joined with `-`, its
    /// value the first [`GROUP_HASH_LEN`] hex characters of a SHA-256 over the
    /// sorted `name=value` pairs.
    #[must_use]
    pub fn groupdiff<I, S>(&self, selectors: I) -> GroupedQuery
    where
        I: IntoIterator<Item = S>,
        S: Into<Selector>,
    {
        let selectors: Vec<Selector> = selectors.into_iter().map(Into::into).collect();
        let key = selectors
            .iter()
            .map(Selector::name)
            .collect::<Vec<_>>()
            .join("-");
        let excluded: HashSet<&str> = selectors.iter().map(Selector::name).collect();

        let partitions = partition(&self.runs, |run| {
            // params are a BTreeMap, so pairs come out sorted by name
            let rest: Vec<(&String, &Scalar)> = run
                .params()
                .iter()
                .filter(|(name, _)| !excluded.contains(name.as_str()))
                .collect();
            let identity: Vec<(String, ScalarKey)> = rest
                .iter()
                .map(|(name, value)| ((*name).clone(), value.key()))
                .collect();
            let rendered = rest
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join(",");
            (identity, rendered)
        });

        let groups: Vec<GroupedRun> = partitions
            .into_iter()
            .map(|(rendered, runs)| GroupedRun::new(key.clone(), short_hash(&rendered), runs))
            .collect();

        tracing::debug!(key = %key, runs = self.runs.len(), groups = groups.len(), "groupdiff");
        GroupedQuery::new(groups)
    }

    /// First `n` runs.
    #[must_use]
    pub fn head(&self, n: usize) -> Self {
        Self::from_shared(head(&self.runs, n).to_vec())
    }

    /// Last `n` runs.
    ///
    /// `tail(0)` is empty, and `n` past the end returns every run.
    #[must_use]
    pub fn tail(&self, n: usize) -> Self {
        Self::from_shared(tail(&self.runs, n).to_vec())
    }

    /// The `k` best runs under a metric, best first.
    #[must_use]
    pub fn topk<O: Objective + ?Sized>(&self, metric: &O, k: usize) -> Self {
        let order = SortOrder::best_first(metric.direction());
        Self::from_shared(select_runs(&self.runs, metric, k, order))
    }

    /// The `k` worst runs under a metric, worst first.
    #[must_use]
    pub fn bottomk<O: Objective + ?Sized>(&self, metric: &O, k: usize) -> Self {
        let order = SortOrder::worst_first(metric.direction());
        Self::from_shared(select_runs(&self.runs, metric, k, order))
    }

    /// Deep copy of every run, safe to hand to other code.
    #[must_use]
    pub fn all(&self) -> Vec<Run> {
        self.runs.iter().map(|run| Run::clone(run)).collect()
    }

    /// New query sharing the same runs.
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// New query with independent copies of every run.
    #[must_use]
    pub fn deepcopy(&self) -> Self {
        Self::from_shared(detach(&self.runs))
    }

    /// Number of runs held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Whether the query holds no runs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

impl From<Vec<Run>> for Query {
    fn from(runs: Vec<Run>) -> Self {
        Self::new(runs)
    }
}

/// Group runs by an identity, keeping first-occurrence order.
///
/// `identify` returns the hashable identity plus a payload describing the
/// group; the payload of the first run of each group is kept.
fn partition<K, P, F>(runs: &[Arc<Run>], mut identify: F) -> Vec<(P, Vec<Arc<Run>>)>
where
    K: std::hash::Hash + Eq,
    F: FnMut(&Run) -> (K, P),
{
    let mut index: FxHashMap<K, usize> = FxHashMap::default();
    let mut groups: Vec<(P, Vec<Arc<Run>>)> = Vec::new();

    for run in runs {
        let (identity, payload) = identify(&**run);
        let slot = *index.entry(identity).or_insert_with(|| {
            groups.push((payload, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(Arc::clone(run));
    }

    groups
}

fn short_hash(rendered: &str) -> String {
    let digest = Sha256::digest(rendered.as_bytes());
    let mut hex = format!("{digest:x}");
    hex.truncate(GROUP_HASH_LEN);
    hex
}

pub(crate) fn selector_names<I, S>(selectors: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<Selector>,
{
    selectors
        .into_iter()
        .map(|selector| selector.into().name().to_string())
        .collect()
}

pub(crate) fn project_run(run: &Run, names: &HashSet<String>) -> Run {
    let mut projected = Run::clone(run);
    projected.params_mut().retain(|name, _| names.contains(name));
    projected
}

pub(crate) fn head(runs: &[Arc<Run>], n: usize) -> &[Arc<Run>] {
    &runs[..n.min(runs.len())]
}

pub(crate) fn tail(runs: &[Arc<Run>], n: usize) -> &[Arc<Run>] {
    &runs[runs.len().saturating_sub(n)..]
}

fn scores<O: Objective + ?Sized>(runs: &[Arc<Run>], metric: &O) -> Vec<f64> {
    runs.iter().map(|run| metric.score(run)).collect()
}

pub(crate) fn sort_runs<O: Objective + ?Sized>(
    runs: &[Arc<Run>],
    metric: &O,
    order: SortOrder,
) -> Vec<Arc<Run>> {
    sort_indices(&scores(runs, metric), order)
        .into_iter()
        .map(|i| Arc::clone(&runs[i]))
        .collect()
}

pub(crate) fn select_runs<O: Objective + ?Sized>(
    runs: &[Arc<Run>],
    metric: &O,
    k: usize,
    order: SortOrder,
) -> Vec<Arc<Run>> {
    top_k_indices(&scores(runs, metric), k, order)
        .into_iter()
        .map(|i| Arc::clone(&runs[i]))
        .collect()
}
