//! Eligibility resolution error types.

use thiserror::Error;

/// Errors raised while resolving a condition tree.
///
/// Both variants denote a wiring defect in a custom rule registry, never a
/// data condition, so callers must propagate them instead of treating the
/// item as ineligible.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EligibilityError {
    /// No registered rule supports the condition variant.
    #[error("No rule registered for condition variant '{variant}'")]
    RuleNotFound { variant: &'static str },

    /// A rule was asked to evaluate a variant it does not support.
    #[error("Rule '{rule}' cannot evaluate condition variant '{variant}'")]
    RuleMismatch {
        rule: &'static str,
        variant: &'static str,
    },
}
