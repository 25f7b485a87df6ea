//! Predicates - composable boolean tests over runs

use std::cmp::Ordering;
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::sync::Arc;

use super::Selector;
use crate::run::{Run, Scalar};

/// Relational comparison between a selector output and a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CmpOp {
    /// Whether the comparison holds for the given ordering.
    ///
    /// Unordered operands (`None`) only satisfy `Ne`.
    #[must_use]
    pub const fn holds(self, ordering: Option<Ordering>) -> bool {
        match (self, ordering) {
            (Self::Eq, Some(Ordering::Equal)) => true,
            (Self::Ne, Some(Ordering::Equal)) => false,
            (Self::Ne, _) => true,
            (Self::Lt, Some(Ordering::Less)) => true,
            (Self::Le, Some(Ordering::Less | Ordering::Equal)) => true,
            (Self::Gt, Some(Ordering::Greater)) => true,
            (Self::Ge, Some(Ordering::Greater | Ordering::Equal)) => true,
            _ => false,
        }
    }

    /// Operator symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// A boolean test over a run.
///
/// Predicates close over their operands and are evaluated lazily. They are
/// cheap to clone and compose with [`Predicate::and`], [`Predicate::or`] and
/// [`Predicate::negate`] (or `&`, `|` and `!`).
#[derive(Clone)]
pub struct Predicate {
    test: Arc<dyn Fn(&Run) -> bool + Send + Sync>,
}

impl Predicate {
    /// Wrap an arbitrary test.
    pub fn new(test: impl Fn(&Run) -> bool + Send + Sync + 'static) -> Self {
        Self {
            test: Arc::new(test),
        }
    }

    /// Build `selector <op> literal`.
    #[must_use]
    pub fn compare(selector: Selector, op: CmpOp, literal: Scalar) -> Self {
        Self::new(move |run| op.holds(selector.select(run).compare(&literal)))
    }

    /// Evaluate the predicate on a run.
    #[must_use]
    pub fn evaluate(&self, run: &Run) -> bool {
        (self.test)(run)
    }

    /// Both predicates hold.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::new(move |run| self.evaluate(run) && other.evaluate(run))
    }

    /// Either predicate holds.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::new(move |run| self.evaluate(run) || other.evaluate(run))
    }

    /// The predicate does not hold.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::new(move |run| !self.evaluate(run))
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate").finish_non_exhaustive()
    }
}

impl BitAnd for Predicate {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.and(rhs)
    }
}

impl BitOr for Predicate {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.or(rhs)
    }
}

impl Not for Predicate {
    type Output = Self;

    fn not(self) -> Self {
        self.negate()
    }
}

/// Anything that can decide whether a run is kept by `Query::filter`.
pub trait RunFilter {
    /// Whether the run passes.
    fn matches(&self, run: &Run) -> bool;
}

impl RunFilter for Predicate {
    fn matches(&self, run: &Run) -> bool {
        self.evaluate(run)
    }
}

impl<F> RunFilter for F
where
    F: Fn(&Run) -> bool,
{
    fn matches(&self, run: &Run) -> bool {
        self(run)
    }
}

/// Comparison builders available on every selector.
///
/// Each method captures a copy of the selector and the literal and returns a
/// [`Predicate`]; nothing is evaluated until the predicate is applied.
pub trait Compare {
    /// Build `self <op> literal`.
    fn compare(&self, op: CmpOp, literal: impl Into<Scalar>) -> Predicate;

    /// `self == literal`
    fn equals(&self, literal: impl Into<Scalar>) -> Predicate {
        self.compare(CmpOp::Eq, literal)
    }

    /// `self != literal`
    fn not_equals(&self, literal: impl Into<Scalar>) -> Predicate {
        self.compare(CmpOp::Ne, literal)
    }

    /// `self < literal`
    fn lt(&self, literal: impl Into<Scalar>) -> Predicate {
        self.compare(CmpOp::Lt, literal)
    }

    /// `self <= literal`
    fn le(&self, literal: impl Into<Scalar>) -> Predicate {
        self.compare(CmpOp::Le, literal)
    }

    /// `self > literal`
    fn gt(&self, literal: impl Into<Scalar>) -> Predicate {
        self.compare(CmpOp::Gt, literal)
    }

    /// `self >= literal`
    fn ge(&self, literal: impl Into<Scalar>) -> Predicate {
        self.compare(CmpOp::Ge, literal)
    }
}

impl<T> Compare for T
where
    T: Clone + Into<Selector>,
{
    fn compare(&self, op: CmpOp, literal: impl Into<Scalar>) -> Predicate {
        Predicate::compare(self.clone().into(), op, literal.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmp_op_unordered_only_ne() {
        for op in [CmpOp::Eq, CmpOp::Lt, CmpOp::Le, CmpOp::Gt, CmpOp::Ge] {
            assert!(!op.holds(None), "{} should not hold when unordered", op.symbol());
        }
        assert!(CmpOp::Ne.holds(None));
    }

    #[test]
    fn test_cmp_op_table() {
        assert!(CmpOp::Le.holds(Some(Ordering::Equal)));
        assert!(CmpOp::Ge.holds(Some(Ordering::Greater)));
        assert!(!CmpOp::Lt.holds(Some(Ordering::Equal)));
        assert!(!CmpOp::Ne.holds(Some(Ordering::Equal)));
    }

    #[test]
    fn test_closure_is_run_filter() {
        let run = Run::new("a");
        let by_id = |r: &Run| r.id() == "a";
        assert!(by_id.matches(&run));
        assert!(!Predicate::new(|_| false).matches(&run));
    }
}
