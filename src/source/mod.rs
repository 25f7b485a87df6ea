//! Run sources
//!
//! A source produces the list of runs a [`Query`](crate::query::Query)
//! starts from. Tracking-backend integrations implement [`Source`]; this
//! crate ships a JSON file source and, behind the `mock` feature, a
//! synthetic grid source for demos and benchmarks.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "mock")]
//! # fn main() -> ablate_db::Result<()> {
//! use ablate_db::query::Query;
//! use ablate_db::source::{Mock, Source};
//!
//! let source = Mock::builder()
//!     .param("model", ["resnet", "vit"])
//!     .num_seeds(3)
//!     .build();
//!
//! let query = Query::new(source.load()?);
//! assert_eq!(query.len(), 6);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "mock"))]
//! # fn main() {}
//! ```

mod json;
#[cfg(feature = "mock")]
mod mock;

pub use json::JsonSource;
#[cfg(feature = "mock")]
pub use mock::{Mock, MockBuilder};

use crate::run::Run;
use crate::Result;

/// Producer of runs.
pub trait Source {
    /// Load the runs with their parameters, metrics, and temporal data.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read or decoded.
    fn load(&self) -> Result<Vec<Run>>;
}
