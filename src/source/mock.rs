//! Mock source - synthetic runs over a parameter grid.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Source;
use crate::run::{Run, Scalar, Series};
use crate::Result;

/// Generates one run per grid configuration and seed.
///
/// Every run gets string-valued parameters plus `seed`, an ID of the form
/// `model=vit_lr=0.1_seed=0`, and `accuracy`, `f1` and `loss` both as final
/// metrics and as temporal series over steps `1..=steps`. Curves follow a
/// logistic learning curve with noise seeded per run, so the output is
/// deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct Mock {
    grid: Vec<(String, Vec<Scalar>)>,
    num_seeds: u64,
    steps: i64,
}

impl Mock {
    /// Create a builder with one seed and 25 steps.
    #[must_use]
    pub fn builder() -> MockBuilder {
        MockBuilder::default()
    }

    /// Cartesian product of the grid, first parameter outermost.
    fn configurations(&self) -> Vec<Vec<(&str, &Scalar)>> {
        self.grid
            .iter()
            .fold(vec![Vec::new()], |partial, (name, values)| {
                partial
                    .iter()
                    .flat_map(|prefix| {
                        values.iter().map(move |value| {
                            let mut config = prefix.clone();
                            config.push((name.as_str(), value));
                            config
                        })
                    })
                    .collect()
            })
    }

    fn generate(&self, config: &[(&str, &Scalar)], local_seed: u64, global_seed: u64) -> Run {
        let mut rng = StdRng::seed_from_u64(global_seed);
        let mut builder = Run::builder(String::new());
        let mut id_parts = Vec::with_capacity(config.len() + 1);

        for (name, value) in config {
            let rendered = value.to_string();
            id_parts.push(format!("{name}={rendered}"));
            builder = builder.param(*name, rendered);
        }
        id_parts.push(format!("seed={local_seed}"));
        builder = builder.param("seed", local_seed.to_string());

        let mut accuracy = Series::new();
        let mut f1 = Series::new();
        let mut loss = Series::new();
        #[allow(clippy::cast_precision_loss)]
        for step in 1..=self.steps {
            let progress = step as f64 / self.steps as f64;
            let growth = 1.0 / (1.0 + (-6.0 * (progress - 0.5)).exp());
            let acc = (0.6 + 0.35 * growth + rng.gen_range(-0.02..0.02)).clamp(0.0, 1.0);
            let f = (acc - rng.gen_range(0.01..0.05)).clamp(0.0, 1.0);
            let l = (1.5 / (step as f64 + 1.0) + rng.gen_range(0.01..0.05)).max(1e-4);
            accuracy.push((step, acc));
            f1.push((step, f));
            loss.push((step, l));
        }

        let last = |series: &Series| series.last().map_or(f64::NAN, |&(_, v)| round4(v));
        let mut run = builder
            .metric("accuracy", last(&accuracy))
            .metric("f1", last(&f1))
            .metric("loss", last(&loss))
            .temporal("accuracy", accuracy)
            .temporal("f1", f1)
            .temporal("loss", loss)
            .build();
        run.set_id(id_parts.join("_"));
        run
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

impl Source for Mock {
    fn load(&self) -> Result<Vec<Run>> {
        let configurations = self.configurations();
        let mut runs = Vec::new();
        for (idx, config) in (0u64..).zip(&configurations) {
            for local_seed in 0..self.num_seeds {
                let global_seed = idx * self.num_seeds + local_seed;
                runs.push(self.generate(config, local_seed, global_seed));
            }
        }
        tracing::debug!(
            configurations = configurations.len(),
            runs = runs.len(),
            "generated mock runs"
        );
        Ok(runs)
    }
}

/// Builder for `Mock`.
#[derive(Debug, Clone)]
pub struct MockBuilder {
    grid: Vec<(String, Vec<Scalar>)>,
    num_seeds: u64,
    steps: i64,
}

impl Default for MockBuilder {
    fn default() -> Self {
        Self {
            grid: Vec::new(),
            num_seeds: 1,
            steps: 25,
        }
    }
}

impl MockBuilder {
    /// Add a grid axis.
    #[must_use]
    pub fn param<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        self.grid
            .push((name.into(), values.into_iter().map(Into::into).collect()));
        self
    }

    /// Set the number of seeds per configuration.
    #[must_use]
    pub const fn num_seeds(mut self, num_seeds: u64) -> Self {
        self.num_seeds = num_seeds;
        self
    }

    /// Set the number of temporal steps.
    #[must_use]
    pub const fn steps(mut self, steps: i64) -> Self {
        self.steps = steps;
        self
    }

    /// Build the `Mock`.
    #[must_use]
    pub fn build(self) -> Mock {
        Mock {
            grid: self.grid,
            num_seeds: self.num_seeds,
            steps: self.steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock() -> Mock {
        Mock::builder()
            .param("model", ["resnet", "vit"])
            .param("lr", [0.1, 0.01])
            .num_seeds(2)
            .steps(5)
            .build()
    }

    #[test]
    fn test_mock_grid_size_and_order() {
        let runs = mock().load().unwrap();
        assert_eq!(runs.len(), 8);
        assert_eq!(runs[0].id(), "model=resnet_lr=0.1_seed=0");
        assert_eq!(runs[1].id(), "model=resnet_lr=0.1_seed=1");
        assert_eq!(runs[2].id(), "model=resnet_lr=0.01_seed=0");
        assert_eq!(runs[7].id(), "model=vit_lr=0.01_seed=1");
    }

    #[test]
    fn test_mock_is_deterministic() {
        assert_eq!(mock().load().unwrap(), mock().load().unwrap());
    }

    #[test]
    fn test_mock_series_shape() {
        let runs = mock().load().unwrap();
        for run in &runs {
            for name in ["accuracy", "f1", "loss"] {
                let series = run.series(name).unwrap();
                assert_eq!(series.len(), 5);
                assert_eq!(series[0].0, 1);
                assert_eq!(series[4].0, 5);
                assert!((run.metric(name).unwrap() - series[4].1).abs() < 1e-4);
            }
            assert!(run.param("seed").and_then(Scalar::as_str).is_some());
        }
    }

    #[test]
    fn test_empty_grid_yields_seed_runs() {
        let runs = Mock::builder().num_seeds(3).build().load().unwrap();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[2].id(), "seed=2");
    }
}
