//! Report - runs plus an ordered list of content blocks
//!
//! Blocks turn runs into an intermediate representation that exporters
//! render. Table and figure blocks live with the exporters; only [`Text`]
//! ships here.

use std::fmt;
use std::ops::{Add, AddAssign};
use std::sync::Arc;

use serde_json::{json, Value};

use crate::run::Run;

/// A content block of a report.
pub trait Block: fmt::Debug + Send + Sync {
    /// Runs this block uses instead of the report's runs, if any.
    fn runs(&self) -> Option<&[Run]> {
        None
    }

    /// Build the intermediate representation of the block.
    fn build(&self, runs: &[Run]) -> Value;
}

/// A free-form text block.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    text: String,
    runs: Option<Vec<Run>>,
}

impl Text {
    /// Create a text block.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            runs: None,
        }
    }

    /// Attach runs that override the report's runs for this block.
    #[must_use]
    pub fn with_runs(mut self, runs: Vec<Run>) -> Self {
        self.runs = Some(runs);
        self
    }

    /// Get the text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Block for Text {
    fn runs(&self) -> Option<&[Run]> {
        self.runs.as_deref()
    }

    fn build(&self, runs: &[Run]) -> Value {
        json!({ "type": "text", "text": self.text, "runs": runs.len() })
    }
}

/// Report mapping a list of runs to a list of blocks.
///
/// Cloning a report, or adding a block with `&report + block`, shares the
/// run list; only the block list is new.
#[derive(Debug, Clone)]
pub struct Report {
    runs: Arc<Vec<Run>>,
    blocks: Vec<Arc<dyn Block>>,
}

impl Report {
    /// Create a report without blocks.
    #[must_use]
    pub fn new(runs: Vec<Run>) -> Self {
        Self {
            runs: Arc::new(runs),
            blocks: Vec::new(),
        }
    }

    /// Get the report's runs.
    #[must_use]
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Get the blocks in order.
    #[must_use]
    pub fn blocks(&self) -> &[Arc<dyn Block>] {
        &self.blocks
    }

    /// Whether both reports share the same run list.
    #[must_use]
    pub fn shares_runs(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.runs, &other.runs)
    }

    /// Append one block.
    pub fn push(&mut self, block: impl Block + 'static) -> &mut Self {
        self.blocks.push(Arc::new(block));
        self
    }

    /// Append several blocks in order.
    pub fn extend<I>(&mut self, blocks: I) -> &mut Self
    where
        I: IntoIterator<Item = Arc<dyn Block>>,
    {
        self.blocks.extend(blocks);
        self
    }

    /// Build every block, each over its own runs or the report's.
    #[must_use]
    pub fn build(&self) -> Vec<Value> {
        self.blocks
            .iter()
            .map(|block| block.build(block.runs().unwrap_or(&self.runs)))
            .collect()
    }
}

impl<B: Block + 'static> AddAssign<B> for Report {
    fn add_assign(&mut self, block: B) {
        self.push(block);
    }
}

impl<B: Block + 'static> Add<B> for &Report {
    type Output = Report;

    fn add(self, block: B) -> Report {
        let mut report = self.clone();
        report.push(block);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_prefers_own_runs() {
        let mut report = Report::new(vec![Run::new("a"), Run::new("b")]);
        report.push(Text::new("all"));
        report.push(Text::new("one").with_runs(vec![Run::new("c")]));

        let built = report.build();
        assert_eq!(built[0]["runs"], 2);
        assert_eq!(built[1]["runs"], 1);
        assert_eq!(built[1]["text"], "one");
    }
}
