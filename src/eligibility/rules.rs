//! One stateless rule per condition variant.
//!
//! Rules are reentrant and hold no state; combinator rules recurse through
//! the resolver they are handed, so a custom registry sees its own rules
//! applied to nested conditions. A context value of the wrong shape is a
//! data condition and evaluates to not eligible; a missing rule is a wiring
//! defect and propagates as an error.

use crate::core::{Condition, Context};
use crate::eligibility::error::EligibilityError;
use crate::eligibility::resolver::EligibilityResolver;
use regex::RegexBuilder;

/// Stateless evaluator for one condition variant.
pub trait Rule: Send + Sync {
    /// Rule name used in mismatch errors.
    fn name(&self) -> &'static str;

    /// Whether this rule evaluates the given condition variant.
    fn supports(&self, condition: &Condition) -> bool;

    /// Evaluate the condition against the context, recursing through the
    /// resolver for nested conditions.
    fn evaluate(
        &self,
        condition: &Condition,
        context: &Context,
        resolver: &EligibilityResolver,
    ) -> Result<bool, EligibilityError>;
}

fn mismatch(rule: &dyn Rule, condition: &Condition) -> EligibilityError {
    EligibilityError::RuleMismatch {
        rule: rule.name(),
        variant: condition.variant_name(),
    }
}

/// `Constant(value)` is eligible iff `value`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConstantRule;

impl Rule for ConstantRule {
    fn name(&self) -> &'static str {
        "ConstantRule"
    }

    fn supports(&self, condition: &Condition) -> bool {
        matches!(condition, Condition::Constant(_))
    }

    fn evaluate(
        &self,
        condition: &Condition,
        _context: &Context,
        _resolver: &EligibilityResolver,
    ) -> Result<bool, EligibilityError> {
        match condition {
            Condition::Constant(value) => Ok(*value),
            other => Err(mismatch(self, other)),
        }
    }
}

/// Eligible while the resolver's clock reads within `[start, end)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimeRangeRule;

impl Rule for TimeRangeRule {
    fn name(&self) -> &'static str {
        "TimeRangeRule"
    }

    fn supports(&self, condition: &Condition) -> bool {
        matches!(condition, Condition::TimeRange { .. })
    }

    fn evaluate(
        &self,
        condition: &Condition,
        _context: &Context,
        resolver: &EligibilityResolver,
    ) -> Result<bool, EligibilityError> {
        match condition {
            Condition::TimeRange { start, end } => {
                let now = resolver.now();
                Ok(now >= *start && now < *end)
            }
            other => Err(mismatch(self, other)),
        }
    }
}

/// Stringified context value must be one of the allowed values.
#[derive(Clone, Copy, Debug, Default)]
pub struct SetMembershipRule;

impl Rule for SetMembershipRule {
    fn name(&self) -> &'static str {
        "SetMembershipRule"
    }

    fn supports(&self, condition: &Condition) -> bool {
        matches!(condition, Condition::SetMembership { .. })
    }

    fn evaluate(
        &self,
        condition: &Condition,
        context: &Context,
        _resolver: &EligibilityResolver,
    ) -> Result<bool, EligibilityError> {
        match condition {
            Condition::SetMembership { key, allowed } => Ok(context
                .get(key)
                .and_then(|fact| fact.as_scalar_string())
                .is_some_and(|value| allowed.contains(&value))),
            other => Err(mismatch(self, other)),
        }
    }
}

/// Context string collection must intersect the required segments.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnySegmentRule;

impl Rule for AnySegmentRule {
    fn name(&self) -> &'static str {
        "AnySegmentRule"
    }

    fn supports(&self, condition: &Condition) -> bool {
        matches!(condition, Condition::AnySegment { .. })
    }

    fn evaluate(
        &self,
        condition: &Condition,
        context: &Context,
        _resolver: &EligibilityResolver,
    ) -> Result<bool, EligibilityError> {
        match condition {
            Condition::AnySegment { key, segments } => Ok(context
                .get(key)
                .and_then(|fact| fact.as_list())
                .is_some_and(|values| values.iter().any(|value| segments.contains(value)))),
            other => Err(mismatch(self, other)),
        }
    }
}

/// Context value must be exactly a boolean equal to the expected one.
#[derive(Clone, Copy, Debug, Default)]
pub struct BooleanFlagRule;

impl Rule for BooleanFlagRule {
    fn name(&self) -> &'static str {
        "BooleanFlagRule"
    }

    fn supports(&self, condition: &Condition) -> bool {
        matches!(condition, Condition::BooleanFlag { .. })
    }

    fn evaluate(
        &self,
        condition: &Condition,
        context: &Context,
        _resolver: &EligibilityResolver,
    ) -> Result<bool, EligibilityError> {
        match condition {
            Condition::BooleanFlag { key, expected } => Ok(context
                .get(key)
                .and_then(|fact| fact.as_bool())
                .is_some_and(|value| value == *expected)),
            other => Err(mismatch(self, other)),
        }
    }
}

/// Context value must be numeric and satisfy the comparator.
#[derive(Clone, Copy, Debug, Default)]
pub struct NumericComparisonRule;

impl Rule for NumericComparisonRule {
    fn name(&self) -> &'static str {
        "NumericComparisonRule"
    }

    fn supports(&self, condition: &Condition) -> bool {
        matches!(condition, Condition::NumericComparison { .. })
    }

    fn evaluate(
        &self,
        condition: &Condition,
        context: &Context,
        _resolver: &EligibilityResolver,
    ) -> Result<bool, EligibilityError> {
        match condition {
            Condition::NumericComparison {
                key,
                comparator,
                threshold,
            } => Ok(context
                .get(key)
                .and_then(|fact| fact.as_number())
                .is_some_and(|value| comparator.holds(value, *threshold))),
            other => Err(mismatch(self, other)),
        }
    }
}

/// Stringified context value must match the regex pattern.
///
/// An unparsable pattern is authored data, not a wiring defect: it logs and
/// evaluates to not eligible.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringMatchRule;

impl Rule for StringMatchRule {
    fn name(&self) -> &'static str {
        "StringMatchRule"
    }

    fn supports(&self, condition: &Condition) -> bool {
        matches!(condition, Condition::StringMatch { .. })
    }

    fn evaluate(
        &self,
        condition: &Condition,
        context: &Context,
        _resolver: &EligibilityResolver,
    ) -> Result<bool, EligibilityError> {
        match condition {
            Condition::StringMatch {
                key,
                pattern,
                case_sensitive,
            } => {
                let Some(value) = context.get(key).and_then(|fact| fact.as_scalar_string())
                else {
                    return Ok(false);
                };
                let regex = RegexBuilder::new(pattern)
                    .case_insensitive(!case_sensitive)
                    .build();
                match regex {
                    Ok(regex) => Ok(regex.is_match(&value)),
                    Err(error) => {
                        tracing::warn!(pattern, %error, "invalid string-match pattern");
                        Ok(false)
                    }
                }
            }
            other => Err(mismatch(self, other)),
        }
    }
}

/// All children eligible, in order, short-circuiting; empty is eligible.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllOfRule;

impl Rule for AllOfRule {
    fn name(&self) -> &'static str {
        "AllOfRule"
    }

    fn supports(&self, condition: &Condition) -> bool {
        matches!(condition, Condition::AllOf(_))
    }

    fn evaluate(
        &self,
        condition: &Condition,
        context: &Context,
        resolver: &EligibilityResolver,
    ) -> Result<bool, EligibilityError> {
        match condition {
            Condition::AllOf(children) => {
                for child in children {
                    if !resolver.evaluate(child, context)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            other => Err(mismatch(self, other)),
        }
    }
}

/// Any child eligible, in order, short-circuiting; empty is not eligible.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnyOfRule;

impl Rule for AnyOfRule {
    fn name(&self) -> &'static str {
        "AnyOfRule"
    }

    fn supports(&self, condition: &Condition) -> bool {
        matches!(condition, Condition::AnyOf(_))
    }

    fn evaluate(
        &self,
        condition: &Condition,
        context: &Context,
        resolver: &EligibilityResolver,
    ) -> Result<bool, EligibilityError> {
        match condition {
            Condition::AnyOf(children) => {
                for child in children {
                    if resolver.evaluate(child, context)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            other => Err(mismatch(self, other)),
        }
    }
}

/// Inverse of the single child.
#[derive(Clone, Copy, Debug, Default)]
pub struct NotRule;

impl Rule for NotRule {
    fn name(&self) -> &'static str {
        "NotRule"
    }

    fn supports(&self, condition: &Condition) -> bool {
        matches!(condition, Condition::Not(_))
    }

    fn evaluate(
        &self,
        condition: &Condition,
        context: &Context,
        resolver: &EligibilityResolver,
    ) -> Result<bool, EligibilityError> {
        match condition {
            Condition::Not(child) => Ok(!resolver.evaluate(child, context)?),
            other => Err(mismatch(self, other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Comparator, FactValue};

    fn resolver() -> EligibilityResolver {
        EligibilityResolver::new()
    }

    #[test]
    fn set_membership_missing_key_is_false() {
        let condition = Condition::membership("plan", ["pro"]);
        let verdict = SetMembershipRule.evaluate(&condition, &Context::new(), &resolver());
        assert_eq!(verdict, Ok(false));
    }

    #[test]
    fn set_membership_stringifies_scalars() {
        let condition = Condition::membership("count", ["3"]);
        let mut context = Context::new();
        context.insert("count", 3);
        let verdict = SetMembershipRule.evaluate(&condition, &context, &resolver());
        assert_eq!(verdict, Ok(true));
    }

    #[test]
    fn set_membership_rejects_list_facts() {
        let condition = Condition::membership("tags", ["a"]);
        let mut context = Context::new();
        context.insert("tags", FactValue::list(["a"]));
        let verdict = SetMembershipRule.evaluate(&condition, &context, &resolver());
        assert_eq!(verdict, Ok(false));
    }

    #[test]
    fn any_segment_intersects() {
        let condition = Condition::segments("segments", ["beta", "staff"]);
        let mut context = Context::new();
        context.insert("segments", FactValue::list(["us", "beta"]));
        let verdict = AnySegmentRule.evaluate(&condition, &context, &resolver());
        assert_eq!(verdict, Ok(true));
    }

    #[test]
    fn any_segment_wrong_type_is_false() {
        let condition = Condition::segments("segments", ["beta"]);
        let mut context = Context::new();
        context.insert("segments", "beta");
        let verdict = AnySegmentRule.evaluate(&condition, &context, &resolver());
        assert_eq!(verdict, Ok(false));
    }

    #[test]
    fn boolean_flag_requires_exact_bool() {
        let condition = Condition::flag("enabled", true);

        let mut context = Context::new();
        context.insert("enabled", "true");
        let verdict = BooleanFlagRule.evaluate(&condition, &context, &resolver());
        assert_eq!(verdict, Ok(false));

        context.insert("enabled", true);
        let verdict = BooleanFlagRule.evaluate(&condition, &context, &resolver());
        assert_eq!(verdict, Ok(true));
    }

    #[test]
    fn numeric_comparison_rejects_text() {
        let condition = Condition::compare("count", Comparator::Gt, 2.0);
        let mut context = Context::new();
        context.insert("count", "3");
        let verdict = NumericComparisonRule.evaluate(&condition, &context, &resolver());
        assert_eq!(verdict, Ok(false));
    }

    #[test]
    fn numeric_comparison_accepts_integers() {
        let condition = Condition::compare("count", Comparator::Gte, 3.0);
        let mut context = Context::new();
        context.insert("count", 3);
        let verdict = NumericComparisonRule.evaluate(&condition, &context, &resolver());
        assert_eq!(verdict, Ok(true));
    }

    #[test]
    fn string_match_case_sensitivity() {
        let mut context = Context::new();
        context.insert("locale", "EN-us");

        let sensitive = Condition::matches("locale", "^en", true);
        let verdict = StringMatchRule.evaluate(&sensitive, &context, &resolver());
        assert_eq!(verdict, Ok(false));

        let insensitive = Condition::matches("locale", "^en", false);
        let verdict = StringMatchRule.evaluate(&insensitive, &context, &resolver());
        assert_eq!(verdict, Ok(true));
    }

    #[test]
    fn string_match_invalid_pattern_is_false() {
        let condition = Condition::matches("locale", "(unclosed", true);
        let mut context = Context::new();
        context.insert("locale", "en");
        let verdict = StringMatchRule.evaluate(&condition, &context, &resolver());
        assert_eq!(verdict, Ok(false));
    }

    #[test]
    fn rule_mismatch_is_reported() {
        let verdict = ConstantRule.evaluate(&Condition::all_of(vec![]), &Context::new(), &resolver());
        assert_eq!(
            verdict,
            Err(EligibilityError::RuleMismatch {
                rule: "ConstantRule",
                variant: "AllOf",
            })
        );
    }
}
