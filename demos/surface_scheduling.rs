//! Surface Scheduling
//!
//! This example drives the engine through a full scheduling lifecycle:
//! admitting payloads, running the guard pipeline, reacting to an
//! eligibility flip, and observing published snapshots.
//!
//! Key concepts:
//! - Admission from payloads to schedulable items
//! - Guard pipeline composition (scheduling, sync, ineligibility removal)
//! - Diff-gated publication to observers
//! - Refresh triggers after external facts change
//!
//! Run with: cargo run --example surface_scheduling

use billboard::admission;
use billboard::core::{Condition, OptionPolicy, Payload, ScheduleState};
use billboard::eligibility::EligibilityResolver;
use billboard::engine::{Engine, StandardEnv};
use billboard::guards::{IneligibilityRemovalGuard, SchedulingGuard, SyncGuard};
use billboard::storage::{MemoryHistory, MemoryStorage};
use std::sync::{Arc, Mutex};

fn describe(state: &ScheduleState) {
    for surface in state.surfaces() {
        let active = state
            .active(surface)
            .map(|item| item.id())
            .unwrap_or("(none)");
        let queued: Vec<&str> = state.queue(surface).iter().map(|i| i.id()).collect();
        println!("  [{surface}] active: {active}, queued: {queued:?}");
    }
    if state.is_empty() {
        println!("  (no surfaces assigned)");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!("=== Surface Scheduling Example ===\n");

    // Content the host wants to promote. The campaign outranks the
    // evergreen banner but is gated on a beta flag.
    let campaign = Payload::with_id("spring-campaign", 10, Condition::flag("beta", true))
        .option(OptionPolicy::new("home_banner", "standard"))
        .metadata("headline", "Spring campaign is live");
    let evergreen = Payload::with_id("evergreen-tips", 1, Condition::always())
        .option(OptionPolicy::new("home_banner", "standard"));

    println!("Admitting payloads...");
    let items = admission::materialize(&[campaign, evergreen]);
    println!("  {} items materialized\n", items.len());

    // Host-side facts live outside the engine; the seed closure reads
    // them into every run's fresh context.
    let beta_enabled = Arc::new(Mutex::new(true));

    let resolver = Arc::new(EligibilityResolver::new());
    let mut engine = Engine::new(vec![
        Arc::new(SchedulingGuard::new()),
        Arc::new(SyncGuard::new()),
        Arc::new(IneligibilityRemovalGuard::new(resolver)),
    ]);

    let facts = Arc::clone(&beta_enabled);
    engine.seed_context(move |context| {
        let enabled = *facts.lock().unwrap();
        context.insert("beta", enabled);
    });
    engine.subscribe(|state| {
        println!("  (observer) new snapshot with {} surface(s)", state.surfaces().count());
    });

    let env = StandardEnv::new(
        Arc::new(MemoryStorage::new()),
        Arc::new(MemoryHistory::new()),
    );

    println!("First run, beta flag enabled:");
    engine.set_candidates(move |_, _| items);
    engine.run(&env).await.unwrap();
    describe(engine.state());

    println!("\nDisabling the beta flag and refreshing:");
    *beta_enabled.lock().unwrap() = false;
    engine.refresh();
    engine.run(&env).await.unwrap();
    describe(engine.state());

    println!("\nRefreshing again with nothing changed:");
    engine.refresh();
    engine.run(&env).await.unwrap();
    println!("  status: {:?} (no publication, observers stayed quiet)", engine.status());

    println!("\nKey Takeaways:");
    println!("- Guards run in declared order and hand one builder forward");
    println!("- The campaign wins on priority only while its condition holds");
    println!("- Unchanged runs publish nothing; observers fire only on change");

    println!("\n=== Example Complete ===");
}
