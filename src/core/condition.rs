//! The closed condition model for eligibility decisions.
//!
//! Conditions are pure data: a tagged union of leaf predicates and logical
//! combinators forming a tree. Evaluation lives in the `eligibility` module;
//! nothing here touches a clock or a context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Comparison operator for [`Condition::NumericComparison`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Comparator {
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    Neq,
}

impl Comparator {
    /// Apply the comparator to a fact value and a threshold.
    ///
    /// # Example
    ///
    /// ```rust
    /// use billboard::core::Comparator;
    ///
    /// assert!(Comparator::Gte.holds(3.0, 3.0));
    /// assert!(!Comparator::Lt.holds(3.0, 3.0));
    /// assert!(Comparator::Neq.holds(1.0, 2.0));
    /// ```
    pub fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::Lt => value < threshold,
            Self::Lte => value <= threshold,
            Self::Gt => value > threshold,
            Self::Gte => value >= threshold,
            Self::Eq => value == threshold,
            Self::Neq => value != threshold,
        }
    }
}

/// A composable boolean condition tree.
///
/// The set of variants is closed: adding one is a crate change, and every
/// dispatch site matches exhaustively so the compiler flags the new variant.
/// Trees have no cycles by construction (children are owned).
///
/// # Example
///
/// ```rust
/// use billboard::core::{Condition, Context};
/// use billboard::eligibility::EligibilityResolver;
///
/// let condition = Condition::all_of(vec![
///     Condition::flag("beta_opt_in", true),
///     Condition::membership("plan", ["pro", "team"]),
/// ]);
///
/// let mut context = Context::new();
/// context.insert("beta_opt_in", true);
/// context.insert("plan", "pro");
///
/// let resolver = EligibilityResolver::new();
/// assert_eq!(resolver.evaluate(&condition, &context), Ok(true));
/// ```
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub enum Condition {
    /// Literal verdict, independent of any context.
    Constant(bool),
    /// Eligible while now is within `[start, end)` UTC.
    TimeRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// Stringified context value must be one of the allowed values.
    SetMembership { key: String, allowed: BTreeSet<String> },
    /// Context value (a string collection) must intersect the segments.
    AnySegment {
        key: String,
        segments: BTreeSet<String>,
    },
    /// Context value must be exactly a boolean equal to `expected`.
    BooleanFlag { key: String, expected: bool },
    /// Context value must be numeric and satisfy the comparator.
    NumericComparison {
        key: String,
        comparator: Comparator,
        threshold: f64,
    },
    /// Stringified context value must match the regex pattern.
    StringMatch {
        key: String,
        pattern: String,
        case_sensitive: bool,
    },
    /// All children eligible, in order, short-circuiting; empty is eligible.
    AllOf(Vec<Condition>),
    /// Any child eligible, in order, short-circuiting; empty is not eligible.
    AnyOf(Vec<Condition>),
    /// Inverse of the single child.
    Not(Box<Condition>),
}

impl Condition {
    /// Stable name of this variant, used in resolution errors.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Constant(_) => "Constant",
            Self::TimeRange { .. } => "TimeRange",
            Self::SetMembership { .. } => "SetMembership",
            Self::AnySegment { .. } => "AnySegment",
            Self::BooleanFlag { .. } => "BooleanFlag",
            Self::NumericComparison { .. } => "NumericComparison",
            Self::StringMatch { .. } => "StringMatch",
            Self::AllOf(_) => "AllOf",
            Self::AnyOf(_) => "AnyOf",
            Self::Not(_) => "Not",
        }
    }

    /// Condition that is always eligible.
    pub fn always() -> Self {
        Self::Constant(true)
    }

    /// Condition that is never eligible.
    pub fn never() -> Self {
        Self::Constant(false)
    }

    /// Eligible while now is within `[start, end)` UTC.
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::TimeRange { start, end }
    }

    /// Stringified context value under `key` must be one of `allowed`.
    pub fn membership<K, I, V>(key: K, allowed: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self::SetMembership {
            key: key.into(),
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// Context value under `key` must share at least one segment.
    pub fn segments<K, I, V>(key: K, segments: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self::AnySegment {
            key: key.into(),
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Context value under `key` must be exactly the expected boolean.
    pub fn flag<K: Into<String>>(key: K, expected: bool) -> Self {
        Self::BooleanFlag {
            key: key.into(),
            expected,
        }
    }

    /// Context value under `key` must satisfy `comparator` against `threshold`.
    pub fn compare<K: Into<String>>(key: K, comparator: Comparator, threshold: f64) -> Self {
        Self::NumericComparison {
            key: key.into(),
            comparator,
            threshold,
        }
    }

    /// Stringified context value under `key` must match the regex pattern.
    pub fn matches<K: Into<String>, P: Into<String>>(
        key: K,
        pattern: P,
        case_sensitive: bool,
    ) -> Self {
        Self::StringMatch {
            key: key.into(),
            pattern: pattern.into(),
            case_sensitive,
        }
    }

    /// Conjunction of children, evaluated in order.
    pub fn all_of(conditions: Vec<Condition>) -> Self {
        Self::AllOf(conditions)
    }

    /// Disjunction of children, evaluated in order.
    pub fn any_of(conditions: Vec<Condition>) -> Self {
        Self::AnyOf(conditions)
    }

    /// Negation of a single child.
    pub fn not(condition: Condition) -> Self {
        Self::Not(Box::new(condition))
    }
}
