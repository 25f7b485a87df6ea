//! Run model
//!
//! ## Schema Overview
//!
//! ```text
//! GroupedRun (key, value) ──< Run (N)
//!                              │
//!                              ├── params   name -> Scalar
//!                              ├── metrics  name -> f64
//!                              └── temporal name -> [(step, value)]
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use ablate_db::run::{Run, Scalar};
//!
//! let run = Run::builder("run-001")
//!     .param("model", "resnet")
//!     .param("seed", 1)
//!     .metric("accuracy", 0.91)
//!     .temporal("accuracy", [(1, 0.5), (2, 0.8), (3, 0.91)])
//!     .build();
//!
//! assert_eq!(run.param("model"), Some(&Scalar::from("resnet")));
//! ```

mod grouped_run;
mod run_record;
mod scalar;

pub use grouped_run::GroupedRun;
pub use run_record::{Run, RunBuilder, Series};
pub use scalar::Scalar;

pub(crate) use grouped_run::detach;
pub(crate) use scalar::ScalarKey;
