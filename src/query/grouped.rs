//! Grouped query - pipeline over groups of runs

use std::sync::Arc;

use super::aggregate::{mean_run, AggregateMethod};
use super::{head, project_run, select_runs, selector_names, sort_runs, tail, Query};
use crate::run::{GroupedRun, Run};
use crate::selector::{Objective, Selector};
use crate::topk::SortOrder;
use crate::Error;

/// Chainable pipeline over grouped runs.
///
/// Operations that slice runs out of each group (`head`, `tail`, `topk`,
/// `bottomk`, `aggregate`) flatten the result back into a [`Query`]; the
/// grouping is discarded at that point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedQuery {
    groups: Vec<GroupedRun>,
}

impl GroupedQuery {
    /// Wrap a list of groups.
    #[must_use]
    pub const fn new(groups: Vec<GroupedRun>) -> Self {
        Self { groups }
    }

    /// The groups currently held.
    #[must_use]
    pub fn groups(&self) -> &[GroupedRun] {
        &self.groups
    }

    /// Keep the groups the predicate accepts, in order.
    #[must_use]
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&GroupedRun) -> bool,
    {
        Self::new(
            self.groups
                .iter()
                .filter(|group| predicate(group))
                .cloned()
                .collect(),
        )
    }

    /// Apply `transform` to a deep copy of every group.
    #[must_use]
    pub fn map<F>(&self, mut transform: F) -> Self
    where
        F: FnMut(GroupedRun) -> GroupedRun,
    {
        Self::new(
            self.groups
                .iter()
                .map(|group| transform(group.detached()))
                .collect(),
        )
    }

    /// Sort the runs inside each group; group order is unchanged.
    #[must_use]
    pub fn sort<O: Objective + ?Sized>(&self, metric: &O, ascending: bool) -> Self {
        let order = if ascending {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        };
        self.per_group(|runs| sort_runs(runs, metric, order))
    }

    /// Restrict the parameters of every run in every group.
    #[must_use]
    pub fn project<I, S>(&self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Selector>,
    {
        let names = selector_names(selectors);
        self.per_group(|runs| {
            runs.iter()
                .map(|run| Arc::new(project_run(run, &names)))
                .collect()
        })
    }

    /// First `n` runs of each group, flattened.
    #[must_use]
    pub fn head(&self, n: usize) -> Query {
        self.per_group(|runs| head(runs, n).to_vec()).flatten()
    }

    /// Last `n` runs of each group, flattened; `tail(0)` is empty.
    #[must_use]
    pub fn tail(&self, n: usize) -> Query {
        self.per_group(|runs| tail(runs, n).to_vec()).flatten()
    }

    /// The `k` best runs of each group, flattened.
    #[must_use]
    pub fn topk<O: Objective + ?Sized>(&self, metric: &O, k: usize) -> Query {
        let order = SortOrder::best_first(metric.direction());
        self.per_group(|runs| select_runs(runs, metric, k, order))
            .flatten()
    }

    /// The `k` worst runs of each group, flattened.
    #[must_use]
    pub fn bottomk<O: Objective + ?Sized>(&self, metric: &O, k: usize) -> Query {
        let order = SortOrder::worst_first(metric.direction());
        self.per_group(|runs| select_runs(runs, metric, k, order))
            .flatten()
    }

    /// Collapse every group to exactly one run.
    ///
    /// `over` is the metric `best` and `worst` rank by; the other methods
    /// ignore it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingObjective`] when `best` or `worst` is requested
    /// without `over`.
    pub fn aggregate(
        &self,
        method: AggregateMethod,
        over: Option<&dyn Objective>,
    ) -> crate::Result<Query> {
        tracing::debug!(method = %method, groups = self.groups.len(), "aggregate");

        let query = match method {
            AggregateMethod::First => self.head(1),
            AggregateMethod::Last => self.tail(1),
            AggregateMethod::Best => self.topk(required(method, over)?, 1),
            AggregateMethod::Worst => self.bottomk(required(method, over)?, 1),
            AggregateMethod::Mean => Query::new(self.groups.iter().map(mean_run).collect()),
        };
        Ok(query)
    }

    /// [`GroupedQuery::aggregate`] with the method given by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedAggregation`] for an unknown method name,
    /// or [`Error::MissingObjective`] as for `aggregate`.
    pub fn aggregate_by(&self, method: &str, over: Option<&dyn Objective>) -> crate::Result<Query> {
        self.aggregate(method.parse()?, over)
    }

    /// Flatten all groups into one query, sharing the runs.
    #[must_use]
    pub fn flatten(&self) -> Query {
        Query::from_shared(
            self.groups
                .iter()
                .flat_map(|group| group.runs().iter().cloned())
                .collect(),
        )
    }

    /// Deep copy of every run across all groups.
    #[must_use]
    pub fn all(&self) -> Vec<Run> {
        self.flatten().all()
    }

    /// New grouped query sharing the same runs.
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// New grouped query with independent copies of every group and run.
    #[must_use]
    pub fn deepcopy(&self) -> Self {
        Self::new(self.groups.iter().map(GroupedRun::detached).collect())
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn per_group<F>(&self, mut reshape: F) -> Self
    where
        F: FnMut(&[Arc<Run>]) -> Vec<Arc<Run>>,
    {
        Self::new(
            self.groups
                .iter()
                .map(|group| group.with_runs(reshape(group.runs())))
                .collect(),
        )
    }
}

fn required(
    method: AggregateMethod,
    over: Option<&dyn Objective>,
) -> crate::Result<&dyn Objective> {
    over.ok_or_else(|| Error::MissingObjective {
        method: method.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::{Direction, Metric};

    fn grouped() -> GroupedQuery {
        let runs = ["a", "b", "c"]
            .iter()
            .zip([0.2, 0.9, 0.5])
            .map(|(id, acc)| Arc::new(Run::builder(*id).metric("acc", acc).build()))
            .collect();
        GroupedQuery::new(vec![GroupedRun::new("model", "resnet", runs)])
    }

    #[test]
    fn test_sort_keeps_group_identity() {
        let sorted = grouped().sort(&Metric::new("acc", Direction::Max), true);
        let group = &sorted.groups()[0];
        assert_eq!(group.key(), "model");
        assert_eq!(group.value(), "resnet");
        let ids: Vec<&str> = group.runs().iter().map(|run| run.id()).collect();
        assert_eq!(ids, ["a", "c", "b"]);
    }

    #[test]
    fn test_aggregate_best_requires_objective() {
        let err = grouped().aggregate(AggregateMethod::Worst, None).unwrap_err();
        assert!(matches!(err, Error::MissingObjective { ref method } if method == "worst"));
    }

    #[test]
    fn test_aggregate_first_ignores_objective() {
        let metric = Metric::new("acc", Direction::Max);
        let first = grouped().aggregate(AggregateMethod::First, Some(&metric)).unwrap();
        assert_eq!(first.runs()[0].id(), "a");
    }
}
