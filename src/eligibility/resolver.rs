//! Dispatches condition trees to their rules.

use crate::core::{Clock, Condition, Context, Item, SystemClock};
use crate::eligibility::error::EligibilityError;
use crate::eligibility::rules::{
    AllOfRule, AnyOfRule, AnySegmentRule, BooleanFlagRule, ConstantRule, NumericComparisonRule,
    NotRule, Rule, SetMembershipRule, StringMatchRule, TimeRangeRule,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// How conditions reach their rules.
///
/// The builtin set dispatches with an exhaustive match over the closed
/// condition enum, so an unmapped variant is a compile error rather than a
/// runtime scan miss. A custom registry scans `supports` in registration
/// order and surfaces a missing rule as [`EligibilityError::RuleNotFound`].
enum RuleSet {
    Builtin,
    Custom(Vec<Box<dyn Rule>>),
}

/// Evaluates an item's condition tree against a run context.
///
/// Stateless and reentrant: one resolver may serve many engines concurrently.
/// The clock is injectable so time-range conditions are testable.
///
/// # Example
///
/// ```rust
/// use billboard::core::{Condition, Context};
/// use billboard::eligibility::EligibilityResolver;
///
/// let resolver = EligibilityResolver::new();
/// let context = Context::new();
///
/// assert_eq!(resolver.evaluate(&Condition::all_of(vec![]), &context), Ok(true));
/// assert_eq!(resolver.evaluate(&Condition::any_of(vec![]), &context), Ok(false));
/// ```
pub struct EligibilityResolver {
    rules: RuleSet,
    clock: Arc<dyn Clock>,
}

impl Default for EligibilityResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl EligibilityResolver {
    /// Resolver with the builtin rule set and the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Builtin rule set with an injected clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            rules: RuleSet::Builtin,
            clock,
        }
    }

    /// Resolver over an explicit rule registry.
    ///
    /// Nested conditions recurse through this resolver, so combinators in a
    /// partial registry fail with [`EligibilityError::RuleNotFound`] when they
    /// reach a variant the registry does not cover.
    pub fn with_rules(rules: Vec<Box<dyn Rule>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            rules: RuleSet::Custom(rules),
            clock,
        }
    }

    /// Current instant from the injected clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Whether the item's condition tree holds against the context.
    pub fn is_eligible(&self, item: &Item, context: &Context) -> Result<bool, EligibilityError> {
        self.evaluate(item.condition(), context)
    }

    /// Evaluate one condition tree against the context.
    pub fn evaluate(
        &self,
        condition: &Condition,
        context: &Context,
    ) -> Result<bool, EligibilityError> {
        match &self.rules {
            RuleSet::Builtin => self.evaluate_builtin(condition, context),
            RuleSet::Custom(rules) => {
                let rule = rules
                    .iter()
                    .find(|rule| rule.supports(condition))
                    .ok_or(EligibilityError::RuleNotFound {
                        variant: condition.variant_name(),
                    })?;
                rule.evaluate(condition, context, self)
            }
        }
    }

    fn evaluate_builtin(
        &self,
        condition: &Condition,
        context: &Context,
    ) -> Result<bool, EligibilityError> {
        match condition {
            Condition::Constant(_) => ConstantRule.evaluate(condition, context, self),
            Condition::TimeRange { .. } => TimeRangeRule.evaluate(condition, context, self),
            Condition::SetMembership { .. } => {
                SetMembershipRule.evaluate(condition, context, self)
            }
            Condition::AnySegment { .. } => AnySegmentRule.evaluate(condition, context, self),
            Condition::BooleanFlag { .. } => BooleanFlagRule.evaluate(condition, context, self),
            Condition::NumericComparison { .. } => {
                NumericComparisonRule.evaluate(condition, context, self)
            }
            Condition::StringMatch { .. } => StringMatchRule.evaluate(condition, context, self),
            Condition::AllOf(_) => AllOfRule.evaluate(condition, context, self),
            Condition::AnyOf(_) => AnyOfRule.evaluate(condition, context, self),
            Condition::Not(_) => NotRule.evaluate(condition, context, self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Comparator, FixedClock, OptionPolicy, Payload};
    use chrono::TimeZone;

    fn fixed_resolver(now: DateTime<Utc>) -> EligibilityResolver {
        EligibilityResolver::with_clock(Arc::new(FixedClock::new(now)))
    }

    #[test]
    fn empty_all_of_is_eligible() {
        let resolver = EligibilityResolver::new();
        assert_eq!(
            resolver.evaluate(&Condition::all_of(vec![]), &Context::new()),
            Ok(true)
        );
    }

    #[test]
    fn empty_any_of_is_not_eligible() {
        let resolver = EligibilityResolver::new();
        assert_eq!(
            resolver.evaluate(&Condition::any_of(vec![]), &Context::new()),
            Ok(false)
        );
    }

    #[test]
    fn all_of_short_circuits_on_first_false() {
        let resolver = EligibilityResolver::new();
        let condition = Condition::all_of(vec![
            Condition::never(),
            // Would fail with RuleNotFound under a custom empty registry,
            // but short-circuiting means it is never reached.
            Condition::flag("unset", true),
        ]);
        assert_eq!(resolver.evaluate(&condition, &Context::new()), Ok(false));
    }

    #[test]
    fn any_of_short_circuits_on_first_true() {
        let resolver = EligibilityResolver::new();
        let condition =
            Condition::any_of(vec![Condition::always(), Condition::flag("unset", true)]);
        assert_eq!(resolver.evaluate(&condition, &Context::new()), Ok(true));
    }

    #[test]
    fn double_negation_matches_leaf() {
        let resolver = EligibilityResolver::new();
        let mut context = Context::new();
        context.insert("enabled", true);

        for leaf in [
            Condition::always(),
            Condition::never(),
            Condition::flag("enabled", true),
            Condition::flag("missing", true),
        ] {
            let direct = resolver.evaluate(&leaf, &context);
            let doubled = resolver.evaluate(
                &Condition::not(Condition::not(leaf.clone())),
                &context,
            );
            assert_eq!(direct, doubled);
        }
    }

    #[test]
    fn time_range_inclusive_start_exclusive_end() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        let condition = Condition::between(start, end);

        let at_start = fixed_resolver(start);
        assert_eq!(at_start.evaluate(&condition, &Context::new()), Ok(true));

        let at_end = fixed_resolver(end);
        assert_eq!(at_end.evaluate(&condition, &Context::new()), Ok(false));
    }

    #[test]
    fn missing_keys_are_false_for_all_keyed_variants() {
        let resolver = EligibilityResolver::new();
        let context = Context::new();
        let keyed = [
            Condition::membership("k", ["v"]),
            Condition::segments("k", ["v"]),
            Condition::flag("k", true),
            Condition::compare("k", Comparator::Gt, 0.0),
            Condition::matches("k", ".*", true),
        ];
        for condition in keyed {
            assert_eq!(resolver.evaluate(&condition, &context), Ok(false));
        }
    }

    #[test]
    fn empty_registry_reports_rule_not_found() {
        let resolver =
            EligibilityResolver::with_rules(Vec::new(), Arc::new(SystemClock));
        let verdict = resolver.evaluate(&Condition::always(), &Context::new());
        assert_eq!(
            verdict,
            Err(EligibilityError::RuleNotFound {
                variant: "Constant"
            })
        );
    }

    #[test]
    fn partial_registry_fails_on_nested_unmapped_variant() {
        let rules: Vec<Box<dyn Rule>> = vec![Box::new(AllOfRule), Box::new(ConstantRule)];
        let resolver = EligibilityResolver::with_rules(rules, Arc::new(SystemClock));

        let reachable = Condition::all_of(vec![Condition::always()]);
        assert_eq!(resolver.evaluate(&reachable, &Context::new()), Ok(true));

        let nested = Condition::all_of(vec![Condition::always(), Condition::flag("k", true)]);
        assert_eq!(
            resolver.evaluate(&nested, &Context::new()),
            Err(EligibilityError::RuleNotFound {
                variant: "BooleanFlag"
            })
        );
    }

    #[test]
    fn is_eligible_reads_item_condition() {
        let option = OptionPolicy::new("home", "standard");
        let payload =
            Payload::with_id("promo", 1, Condition::flag("beta", true)).option(option.clone());
        let item = Item::new(payload, option);

        let resolver = EligibilityResolver::new();
        let mut context = Context::new();
        assert_eq!(resolver.is_eligible(&item, &context), Ok(false));

        context.insert("beta", true);
        assert_eq!(resolver.is_eligible(&item, &context), Ok(true));
    }
}
