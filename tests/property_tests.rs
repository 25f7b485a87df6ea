//! Property-based tests for ablate-db
//!
//! - Test ordering and partitioning invariants of the query pipeline
//! - Test the numeric guarantees of mean aggregation
//! - Run with ProptestConfig::with_cases(100)

use std::collections::BTreeSet;

use ablate_db::query::{mean_run, AggregateMethod, Query, GROUP_HASH_LEN};
use ablate_db::run::{Run, Scalar};
use ablate_db::selector::{Compare, Direction, Metric, Param};
use ablate_db::topk::{sort_indices, top_k_indices, SortOrder};
use proptest::prelude::*;

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Generate a run with a small model/seed/lr grid and an optional accuracy
fn arb_run(index: usize) -> impl Strategy<Value = Run> {
    (
        prop::sample::select(vec!["resnet", "vit", "mlp"]),
        0i64..3,
        prop::sample::select(vec![0.1, 0.01]),
        prop::option::weighted(0.9, 0.0f64..1.0),
        prop::collection::vec((1i64..6, 0.0f64..1.0), 0..5),
    )
        .prop_map(move |(model, seed, lr, acc, samples)| {
            let mut builder = Run::builder(format!("run-{index}"))
                .param("model", model)
                .param("seed", seed)
                .param("lr", lr)
                .temporal("acc", samples);
            if let Some(acc) = acc {
                builder = builder.metric("acc", acc);
            }
            builder.build()
        })
}

/// Generate up to `max` runs with unique IDs
fn arb_runs(max: usize) -> impl Strategy<Value = Vec<Run>> {
    (0..=max).prop_flat_map(|len| (0..len).map(arb_run).collect::<Vec<_>>())
}

/// Generate scores including NaN and infinities
fn arb_scores() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(
        prop_oneof![
            8 => -100.0f64..100.0,
            1 => Just(f64::NAN),
            1 => Just(f64::INFINITY),
            1 => Just(f64::NEG_INFINITY),
        ],
        0..40,
    )
}

fn ids(runs: &[Run]) -> Vec<String> {
    runs.iter().map(|run| run.id().to_string()).collect()
}

fn acc() -> Metric {
    Metric::new("acc", Direction::Max)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ========================================================================
    // Ranking Properties
    // ========================================================================

    /// Property: sort_indices is a permutation
    #[test]
    fn prop_sort_indices_is_permutation(scores in arb_scores()) {
        for order in [SortOrder::Ascending, SortOrder::Descending] {
            let mut indices = sort_indices(&scores, order);
            indices.sort_unstable();
            prop_assert_eq!(indices, (0..scores.len()).collect::<Vec<_>>());
        }
    }

    /// Property: heap selection equals the sorted prefix
    #[test]
    fn prop_top_k_is_sorted_prefix(scores in arb_scores(), k in 0usize..50) {
        for order in [SortOrder::Ascending, SortOrder::Descending] {
            let expected: Vec<usize> = sort_indices(&scores, order).into_iter().take(k).collect();
            prop_assert_eq!(top_k_indices(&scores, k, order), expected);
        }
    }

    /// Property: NaN never precedes a number
    #[test]
    fn prop_nan_ranks_last(scores in arb_scores()) {
        for order in [SortOrder::Ascending, SortOrder::Descending] {
            let ranked = sort_indices(&scores, order);
            let first_nan = ranked.iter().position(|&i| scores[i].is_nan()).unwrap_or(ranked.len());
            prop_assert!(ranked[first_nan..].iter().all(|&i| scores[i].is_nan()));
        }
    }

    // ========================================================================
    // Query Properties
    // ========================================================================

    /// Property: filter keeps exactly the matching runs in order
    #[test]
    fn prop_filter_exact_and_ordered(runs in arb_runs(20), threshold in 0.0f64..1.0) {
        let predicate = acc().gt(threshold);
        let expected: Vec<String> = runs
            .iter()
            .filter(|run| predicate.evaluate(run))
            .map(|run| run.id().to_string())
            .collect();
        let filtered = Query::new(runs).filter(predicate).all();
        prop_assert_eq!(ids(&filtered), expected);
    }

    /// Property: ascending sort is non-decreasing and stable
    #[test]
    fn prop_sort_ascending_stable(runs in arb_runs(20)) {
        let metric = acc();
        let positions: Vec<String> = ids(&runs);
        let sorted = Query::new(runs).sort(&metric, true).all();

        for pair in sorted.windows(2) {
            let (a, b) = (metric.value(&pair[0]), metric.value(&pair[1]));
            prop_assert!(a <= b);
            if a == b {
                let ia = positions.iter().position(|id| id == pair[0].id());
                let ib = positions.iter().position(|id| id == pair[1].id());
                prop_assert!(ia < ib);
            }
        }
    }

    /// Property: topk for a max metric is the k greatest, highest first
    #[test]
    fn prop_topk_max_is_greatest(runs in arb_runs(20), k in 0usize..25) {
        let metric = acc();
        let values: Vec<f64> = runs.iter().map(|run| metric.value(run)).collect();
        let top = Query::new(runs).topk(&metric, k).all();

        prop_assert_eq!(top.len(), k.min(values.len()));
        for pair in top.windows(2) {
            prop_assert!(metric.value(&pair[0]) >= metric.value(&pair[1]));
        }
        if let Some(last) = top.last() {
            let cutoff = metric.value(last);
            let better = values.iter().filter(|&&v| v > cutoff).count();
            prop_assert!(better < top.len());
        }
    }

    /// Property: groupby partitions runs by selector value
    #[test]
    fn prop_groupby_partitions(runs in arb_runs(20)) {
        let model = Param::new("model");
        let total = runs.len();
        let mut original = ids(&runs);
        let grouped = Query::new(runs).groupby([model.clone()]);

        let mut seen = Vec::new();
        for group in grouped.groups() {
            let values: BTreeSet<String> =
                group.runs().iter().map(|run| model.value(run).to_string()).collect();
            prop_assert_eq!(values.len(), 1);
            prop_assert_eq!(values.iter().next().map(String::as_str), Some(group.value()));
            seen.extend(group.runs().iter().map(|run| run.id().to_string()));
        }
        prop_assert_eq!(seen.len(), total);
        seen.sort();
        original.sort();
        prop_assert_eq!(seen, original);
    }

    /// Property: groupdiff groups agree on every other parameter
    #[test]
    fn prop_groupdiff_agrees_elsewhere(runs in arb_runs(20)) {
        let grouped = Query::new(runs).groupdiff([Param::new("seed")]);
        for group in grouped.groups() {
            prop_assert_eq!(group.value().len(), GROUP_HASH_LEN);
            let rest: BTreeSet<(String, String)> = group
                .runs()
                .iter()
                .map(|run| {
                    (
                        run.param("model").map(ToString::to_string).unwrap_or_default(),
                        run.param("lr").map(ToString::to_string).unwrap_or_default(),
                    )
                })
                .collect();
            prop_assert_eq!(rest.len(), 1);
        }
    }

    // ========================================================================
    // Aggregation Properties
    // ========================================================================

    /// Property: every aggregation yields one run per group
    #[test]
    fn prop_aggregate_one_per_group(runs in arb_runs(20)) {
        let metric = acc();
        let grouped = Query::new(runs).groupby([Param::new("model")]);
        for method in [
            AggregateMethod::First,
            AggregateMethod::Last,
            AggregateMethod::Best,
            AggregateMethod::Worst,
            AggregateMethod::Mean,
        ] {
            let result = grouped.aggregate(method, Some(&metric)).unwrap();
            prop_assert_eq!(result.len(), grouped.len());
        }
    }

    /// Property: mean metrics lie within the group's range
    #[test]
    fn prop_mean_within_bounds(runs in arb_runs(20)) {
        let grouped = Query::new(runs).groupby([Param::new("model")]);
        for group in grouped.groups() {
            let mean = mean_run(group);
            let reported: Vec<f64> = group.runs().iter().filter_map(|run| run.metric("acc")).collect();
            match mean.metric("acc") {
                Some(value) => {
                    let lo = reported.iter().copied().fold(f64::INFINITY, f64::min);
                    let hi = reported.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    prop_assert!(value >= lo - 1e-12 && value <= hi + 1e-12);
                }
                None => prop_assert!(reported.is_empty()),
            }
        }
    }

    /// Property: mean series steps are strictly increasing
    #[test]
    fn prop_mean_series_sorted_by_step(runs in arb_runs(20)) {
        let grouped = Query::new(runs).groupby([Param::new("model")]);
        for group in grouped.groups() {
            if let Some(series) = mean_run(group).series("acc") {
                prop_assert!(series.windows(2).all(|pair| pair[0].0 < pair[1].0));
            }
        }
    }

    /// Property: mean params keep agreement and mark disagreement
    #[test]
    fn prop_mean_params_agreement(runs in arb_runs(20)) {
        let grouped = Query::new(runs).groupby([Param::new("model")]);
        for group in grouped.groups() {
            let mean = mean_run(group);
            prop_assert_eq!(mean.param("model").map(ToString::to_string), Some(group.value().to_string()));

            let seeds: BTreeSet<String> = group
                .runs()
                .iter()
                .filter_map(|run| run.param("seed").map(ToString::to_string))
                .collect();
            let expected = if seeds.len() == 1 {
                group.runs()[0].param("seed").cloned()
            } else {
                Some(Scalar::from("#"))
            };
            prop_assert_eq!(mean.param("seed").cloned(), expected);
        }
    }

    /// Property: deepcopy is equal but independent
    #[test]
    fn prop_deepcopy_independent(runs in arb_runs(10)) {
        let query = Query::new(runs);
        let deep = query.deepcopy();
        prop_assert_eq!(&deep, &query);

        let mut handed_out = deep.all();
        for run in &mut handed_out {
            run.params_mut().clear();
        }
        prop_assert!(query.runs().iter().all(|run| run.params().len() == 3));
    }
}
