//! Ablation Report Example
//!
//! Generates a synthetic sweep over model and learning rate with three seeds,
//! then walks through the usual ablation questions: best run per model,
//! seed-averaged results per configuration, and the effect of the learning
//! rate with everything else held fixed.
//!
//! Run with: RUST_LOG=debug cargo run --example ablation_report

use std::io;

use ablate_db::query::{AggregateMethod, Query};
use ablate_db::report::{Report, Text};
use ablate_db::selector::{Compare, Direction, Metric, Param, TemporalMetric};
use ablate_db::source::{Mock, Source};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(anyhow::Error::msg)?;

    println!("=== Ablate-DB Ablation Report ===\n");

    let source = Mock::builder()
        .param("model", ["resnet", "vit"])
        .param("lr", [0.1, 0.01])
        .num_seeds(3)
        .steps(20)
        .build();
    let query = Query::new(source.load()?);
    println!("Loaded {} runs\n", query.len());

    let accuracy = Metric::new("accuracy", Direction::Max);
    let peak = TemporalMetric::new("accuracy", Direction::Max);

    // -------------------------------------------------------------------------
    // 1. Best run per model
    // -------------------------------------------------------------------------
    println!("1. Best run per model (final accuracy)");
    let best = query.groupby([Param::new("model")]).topk(&accuracy, 1);
    for run in best.runs() {
        println!("   {:<32} {:.4}", run.id(), accuracy.value(run));
    }

    // -------------------------------------------------------------------------
    // 2. Seed-averaged results per configuration
    // -------------------------------------------------------------------------
    println!("\n2. Mean over seeds per configuration");
    let means = query
        .groupdiff([Param::new("seed")])
        .aggregate(AggregateMethod::Mean, None)?
        .sort(&accuracy, false);
    for run in means.runs() {
        println!(
            "   {:<28} model={:<7} lr={:<5} seed={} acc={:.4}",
            run.id(),
            run.param("model").map(ToString::to_string).unwrap_or_default(),
            run.param("lr").map(ToString::to_string).unwrap_or_default(),
            run.param("seed").map(ToString::to_string).unwrap_or_default(),
            accuracy.value(run),
        );
    }

    // -------------------------------------------------------------------------
    // 3. Learning rate ablation with everything else fixed
    // -------------------------------------------------------------------------
    println!("\n3. Best learning rate per (model, seed)");
    let by_lr = query
        .filter(Param::new("model").equals("vit"))
        .groupdiff([Param::new("lr")])
        .aggregate(AggregateMethod::Best, Some(&peak))?;
    for run in by_lr.runs() {
        println!("   {:<32} peak={:.4}", run.id(), peak.value(run));
    }

    // -------------------------------------------------------------------------
    // 4. Report
    // -------------------------------------------------------------------------
    println!("\n4. Report blocks");
    let mut report = Report::new(means.all());
    report += Text::new("Seed-averaged accuracy per configuration");
    let report = &report + Text::new("Best vit runs").with_runs(by_lr.all());
    for block in report.build() {
        println!("   {block}");
    }

    Ok(())
}
