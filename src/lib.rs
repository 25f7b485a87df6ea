//! # Ablate-DB: Query Engine for Ablation Studies
//!
//! **Version**: 0.1.0
//!
//! Ablate-DB loads experiment runs (parameters, final metrics, and metric
//! curves over training steps) and answers ablation questions with a
//! chainable query pipeline: filter, sort, group by a parameter or by
//! "everything but" a parameter, pick the top runs per group, and collapse
//! groups by averaging over seeds.
//!
//! ## Design Principles
//!
//! - **Immutable pipelines**: every operation returns a new query
//! - **Explicit copies**: runs are shared `Arc` handles until an operation
//!   needs to hand out owned data
//! - **Missing data ranks last**: absent metrics never fail a query
//!
//! ## Example Usage
//!
//! ```rust
//! use ablate_db::query::{AggregateMethod, Query};
//! use ablate_db::run::Run;
//! use ablate_db::selector::{Compare, Direction, Metric, Param};
//!
//! let runs = vec![
//!     Run::builder("a").param("model", "resnet").param("seed", 1).metric("acc", 0.7).build(),
//!     Run::builder("b").param("model", "resnet").param("seed", 2).metric("acc", 0.8).build(),
//!     Run::builder("c").param("model", "vit").param("seed", 1).metric("acc", 0.6).build(),
//!     Run::builder("d").param("model", "vit").param("seed", 2).metric("acc", 0.9).build(),
//! ];
//!
//! let acc = Metric::new("acc", Direction::Max);
//! let means = Query::new(runs)
//!     .filter(acc.gt(0.5))
//!     .groupby([Param::new("model")])
//!     .aggregate(AggregateMethod::Mean, None)?;
//!
//! assert_eq!(means.len(), 2);
//! assert!((means.runs()[0].metric("acc").unwrap() - 0.75).abs() < 1e-9);
//! # Ok::<(), ablate_db::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod error;
pub mod query;
pub mod report;
pub mod run;
pub mod selector;
pub mod source;
pub mod topk;

pub use error::{Error, Result};
pub use query::{AggregateMethod, GroupedQuery, Query};
pub use run::{GroupedRun, Run, Scalar};
