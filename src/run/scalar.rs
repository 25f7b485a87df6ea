//! Scalar - parameter values and selector outputs

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single parameter value, or the value a selector reads out of a run.
///
/// Serialized untagged, so JSON `null`, `true`, `3`, `0.5` and `"adam"` map
/// directly onto the variants.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Absent value.
    #[default]
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Free-form string.
    Str(String),
}

impl Scalar {
    /// Whether this is the absent value.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view of the value (`Int` and `Float` only).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// String view of the value (`Str` only).
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Compare two scalars.
    ///
    /// Integers and floats compare numerically with each other, exactly:
    /// no integer is rounded to the nearest `f64` first. Values of
    /// incompatible kinds, and NaN, are unordered.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Null, Self::Null) => Some(Ordering::Equal),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Float(b)) => compare_int_float(*a, *b),
            (Self::Float(a), Self::Int(b)) => compare_int_float(*b, *a).map(Ordering::reverse),
            (Self::Str(a), Self::Str(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Hashable identity used when partitioning runs.
    pub(crate) fn key(&self) -> ScalarKey {
        match self {
            Self::Null => ScalarKey::Null,
            Self::Bool(b) => ScalarKey::Bool(*b),
            Self::Str(s) => ScalarKey::Str(s.clone()),
            Self::Int(i) => ScalarKey::Int(*i),
            // integral floats share the key of the equal integer, -0.0 included
            Self::Float(x) => exact_int(*x).map_or_else(
                || {
                    let canonical = if x.is_nan() { f64::NAN } else { *x };
                    ScalarKey::Float(canonical.to_bits())
                },
                ScalarKey::Int,
            ),
        }
    }
}

/// 2^63, the first float above `i64::MAX`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// The integer a float is exactly equal to, if any.
#[allow(clippy::cast_possible_truncation)]
fn exact_int(x: f64) -> Option<i64> {
    (x.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&x)).then(|| x as i64)
}

fn compare_int_float(i: i64, x: f64) -> Option<Ordering> {
    if x.is_nan() {
        return None;
    }
    if x >= I64_BOUND {
        return Some(Ordering::Less);
    }
    if x < -I64_BOUND {
        return Some(Ordering::Greater);
    }
    let whole = x.trunc();
    #[allow(clippy::cast_possible_truncation)]
    let truncated = whole as i64;
    match i.cmp(&truncated) {
        // i equals the integral part, so the fraction decides
        Ordering::Equal => whole.partial_cmp(&x),
        ordering => Some(ordering),
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

/// Grouping identity of a [`Scalar`]; numerically equal values share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ScalarKey {
    Null,
    Bool(bool),
    Int(i64),
    /// Bits of a non-integral float (NaN canonicalized).
    Float(u64),
    Str(String),
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
