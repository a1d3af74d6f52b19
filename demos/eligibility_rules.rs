//! Eligibility Rules
//!
//! This example evaluates condition trees directly against a fact
//! context, without running the full engine.
//!
//! Key concepts:
//! - The closed condition vocabulary and its combinators
//! - Typed facts: mismatched shapes evaluate to false, not errors
//! - Injectable clocks for time-range conditions
//! - Custom rule registries and their failure mode
//!
//! Run with: cargo run --example eligibility_rules

use billboard::core::{Comparator, Condition, Context, FactValue, FixedClock};
use billboard::eligibility::EligibilityResolver;
use chrono::{TimeZone, Utc};
use std::sync::Arc;

fn main() {
    println!("=== Eligibility Rules Example ===\n");

    let mut context = Context::new();
    context.insert("plan", "pro");
    context.insert("session_count", 12);
    context.insert("segments", FactValue::list(["us", "beta-testers"]));
    context.insert("onboarded", true);

    let resolver = EligibilityResolver::new();

    println!("Evaluating leaf conditions:");
    let leaves = [
        ("plan in {pro, team}", Condition::membership("plan", ["pro", "team"])),
        ("any segment in {beta-testers}", Condition::segments("segments", ["beta-testers"])),
        ("onboarded == true", Condition::flag("onboarded", true)),
        ("session_count >= 10", Condition::compare("session_count", Comparator::Gte, 10.0)),
        ("plan matches ^pro$", Condition::matches("plan", "^pro$", true)),
    ];
    for (label, condition) in &leaves {
        let verdict = resolver.evaluate(condition, &context).unwrap();
        println!("  {label}: {verdict}");
    }

    println!("\nType mismatches are ineligibility, not errors:");
    let mismatched = Condition::flag("plan", true); // "plan" holds text, not a bool
    println!(
        "  flag check against a text fact: {:?}",
        resolver.evaluate(&mismatched, &context)
    );

    println!("\nCombinators compose with short-circuiting:");
    let gate = Condition::all_of(vec![
        Condition::membership("plan", ["pro", "team"]),
        Condition::not(Condition::flag("suspended", true)),
        Condition::any_of(vec![
            Condition::segments("segments", ["beta-testers"]),
            Condition::compare("session_count", Comparator::Gt, 100.0),
        ]),
    ]);
    println!("  composite gate: {}", resolver.evaluate(&gate, &context).unwrap());

    println!("\nTime ranges use the injected clock:");
    let start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
    let window = Condition::between(start, end);
    for (label, instant) in [
        ("inside the window", Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap()),
        ("at the exclusive end", end),
    ] {
        let pinned = EligibilityResolver::with_clock(Arc::new(FixedClock::new(instant)));
        println!("  {label}: {}", pinned.evaluate(&window, &context).unwrap());
    }

    println!("\nA custom registry surfaces unmapped variants as errors:");
    let empty = EligibilityResolver::with_rules(Vec::new(), Arc::new(FixedClock::new(start)));
    println!("  empty registry: {:?}", empty.evaluate(&Condition::always(), &context));

    println!("\nKey Takeaways:");
    println!("- The condition vocabulary is closed; combinators nest arbitrarily");
    println!("- Missing keys and mismatched fact shapes both read as ineligible");
    println!("- Clocks are injected, so time windows are deterministic under test");

    println!("\n=== Example Complete ===");
}
