//! Billboard: eligibility rules and guard-pipeline scheduling for in-app
//! content surfaces.
//!
//! Billboard decides, for each named display location ("surface") in a host
//! application, which piece of promotable content is currently shown, which
//! items are queued behind it, and when a shown item must be evicted because
//! it is no longer eligible. The core follows a pure-core/effectful-shell
//! split: conditions, state, and diffing are pure data and pure functions,
//! while runs execute as effects against injected collaborators.
//!
//! # Core Concepts
//!
//! - **Condition**: a closed, composable boolean tree evaluated against a
//!   run-scoped fact context
//! - **Guards**: ordered pipeline stages that each take the state builder,
//!   mutate it, and hand it forward
//! - **Engine**: serializes runs, diffs the frozen result against the
//!   previous snapshot, and publishes only on change
//!
//! # Example
//!
//! ```rust
//! use billboard::admission;
//! use billboard::core::{Condition, OptionPolicy, Payload};
//! use billboard::eligibility::EligibilityResolver;
//! use billboard::engine::{Engine, StandardEnv};
//! use billboard::guards::{IneligibilityRemovalGuard, SchedulingGuard};
//! use billboard::storage::{MemoryHistory, MemoryStorage};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let resolver = Arc::new(EligibilityResolver::new());
//! let mut engine = Engine::new(vec![
//!     Arc::new(SchedulingGuard::new()),
//!     Arc::new(IneligibilityRemovalGuard::new(resolver)),
//! ]);
//! let env = StandardEnv::new(
//!     Arc::new(MemoryStorage::new()),
//!     Arc::new(MemoryHistory::new()),
//! );
//!
//! let payload = Payload::with_id("welcome", 10, Condition::always())
//!     .option(OptionPolicy::new("home_banner", "standard"));
//!
//! engine.set_candidates(|_, _| admission::materialize(&[payload]));
//! engine.run(&env).await.unwrap();
//!
//! assert_eq!(
//!     engine.state().active("home_banner").map(|item| item.id()),
//!     Some("welcome"),
//! );
//! # }
//! ```

pub mod admission;
pub mod core;
pub mod eligibility;
pub mod engine;
pub mod guards;
pub mod snapshot;
pub mod storage;

// Re-export commonly used types
pub use crate::core::{
    Condition, Context, FactValue, Item, ItemIdentity, OptionPolicy, Payload, ScheduleState, Slot,
    StateBuilder,
};
pub use eligibility::{EligibilityError, EligibilityResolver, Rule};
pub use engine::{Engine, EngineError, EngineStatus, RunOutcome, SchedulingEnv, StandardEnv};
pub use guards::{Guard, GuardError};
