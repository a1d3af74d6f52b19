//! The scheduling engine: serialized runs, diff-gated publication.

use crate::core::diff::states_equal;
use crate::core::{Context, Item, ScheduleState, StateBuilder};
use crate::engine::env::SchedulingEnv;
use crate::engine::error::EngineError;
use crate::guards::Guard;
use std::sync::Arc;
use stillwater::effect::BoxedEffect;
use stillwater::prelude::*;

/// Where the engine is in its run lifecycle.
///
/// `Idle → Running` on new candidates or a refresh trigger; a completed run
/// lands in `Updated` when it published a new snapshot, back in `Idle` when
/// the output was unchanged or the run failed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EngineStatus {
    Idle,
    Running,
    Updated,
}

/// What a completed run produced. Feed it back through [`Engine::apply`].
#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub state: ScheduleState,
    pub changed: bool,
}

type StateObserver = Arc<dyn Fn(&ScheduleState) + Send + Sync>;
type ErrorObserver = Arc<dyn Fn(&EngineError) + Send + Sync>;
type ContextSeed = Arc<dyn Fn(&mut Context) + Send + Sync>;

/// Owns the ordered guard list and the current candidate list; runs the full
/// chain on every trigger and publishes the frozen result to observers only
/// when it differs from the previous snapshot.
///
/// A run is one effect executed to completion: the engine seeds a builder
/// from the previous snapshot and a fresh context, then moves the builder
/// through the guards in declared order. Triggers arriving while a run is in
/// flight coalesce into a single follow-up run over the latest candidates —
/// [`Engine::apply`] reports whether one is owed. On failure the previous
/// snapshot is retained untouched and the error goes to the error observers.
///
/// # Example
///
/// ```rust
/// use billboard::core::{Condition, OptionPolicy, Payload};
/// use billboard::admission;
/// use billboard::engine::{Engine, StandardEnv};
/// use billboard::guards::SchedulingGuard;
/// use billboard::storage::{MemoryHistory, MemoryStorage};
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut engine = Engine::new(vec![Arc::new(SchedulingGuard::new())]);
/// let env = StandardEnv::new(
///     Arc::new(MemoryStorage::new()),
///     Arc::new(MemoryHistory::new()),
/// );
///
/// let payload = Payload::with_id("promo", 5, Condition::always())
///     .option(OptionPolicy::new("home", "standard"));
/// let candidates = admission::materialize(&[payload]);
///
/// engine.set_candidates(|_, _| candidates);
/// engine.run(&env).await.unwrap();
///
/// assert_eq!(engine.state().active("home").map(|i| i.id()), Some("promo"));
/// # }
/// ```
pub struct Engine {
    guards: Vec<Arc<dyn Guard>>,
    snapshot: ScheduleState,
    candidates: Vec<Item>,
    status: EngineStatus,
    pending: bool,
    seed: Option<ContextSeed>,
    observers: Vec<StateObserver>,
    error_observers: Vec<ErrorObserver>,
}

impl Engine {
    /// Engine over an ordered guard list. Order is the caller's declaration
    /// of pipeline composition; the engine never reorders it.
    pub fn new(guards: Vec<Arc<dyn Guard>>) -> Self {
        Self {
            guards,
            snapshot: ScheduleState::new(),
            candidates: Vec::new(),
            status: EngineStatus::Idle,
            pending: false,
            seed: None,
            observers: Vec::new(),
            error_observers: Vec::new(),
        }
    }

    /// Latest published snapshot; the last good state after a failed run.
    pub fn state(&self) -> &ScheduleState {
        &self.snapshot
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    pub fn candidates(&self) -> &[Item] {
        &self.candidates
    }

    /// Install the host's fact provider, invoked into every run's fresh
    /// context before the first guard.
    pub fn seed_context<F>(&mut self, seed: F)
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.seed = Some(Arc::new(seed));
    }

    /// Subscribe to published snapshots. Observers fire only on change.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: Fn(&ScheduleState) + Send + Sync + 'static,
    {
        self.observers.push(Arc::new(observer));
    }

    /// Subscribe to run failures.
    pub fn subscribe_errors<F>(&mut self, observer: F)
    where
        F: Fn(&EngineError) + Send + Sync + 'static,
    {
        self.error_observers.push(Arc::new(observer));
    }

    /// Sole entry point for new content: `transform` is a pure function of
    /// the previous candidate list and the current published state.
    ///
    /// Returns whether the caller should start a run now; `false` means a
    /// run is in flight and this trigger was coalesced behind it.
    pub fn set_candidates<F>(&mut self, transform: F) -> bool
    where
        F: FnOnce(&[Item], &ScheduleState) -> Vec<Item>,
    {
        self.candidates = transform(&self.candidates, &self.snapshot);
        self.request_run()
    }

    /// Re-run the pipeline without new candidates, for host-subscribed
    /// triggers (timers, foreground signals, dependent stores).
    pub fn refresh(&mut self) -> bool {
        self.request_run()
    }

    fn request_run(&mut self) -> bool {
        if self.status == EngineStatus::Running {
            self.pending = true;
            false
        } else {
            true
        }
    }

    /// Build the run effect over the current candidates.
    ///
    /// The effect captures clones of everything the run needs, so the engine
    /// is free while the caller executes it; feed the outcome back through
    /// [`Engine::apply`] (or use [`Engine::run`], which does both). A built
    /// effect must be landed through [`Engine::apply`] or [`Engine::fail`];
    /// dropping it unexecuted leaves the engine `Running` until
    /// [`Engine::reset`] is called.
    pub fn process<Env: SchedulingEnv>(&mut self) -> BoxedEffect<RunOutcome, EngineError, Env> {
        if self.status == EngineStatus::Running {
            return fail(EngineError::RunInFlight).boxed();
        }
        self.status = EngineStatus::Running;
        self.pending = false;

        let guards = self.guards.clone();
        let previous = self.snapshot.clone();
        let candidates = self.candidates.clone();
        let seed = self.seed.clone();

        from_fn(move |env: &Env| {
            tracing::debug!(candidates = candidates.len(), "scheduling run started");
            let mut context = Context::new();
            if let Some(seed) = &seed {
                seed(&mut context);
            }

            let mut builder = StateBuilder::from_state(&previous);
            for guard in &guards {
                builder = guard
                    .call(
                        env.storage(),
                        env.history(),
                        builder,
                        &candidates,
                        &mut context,
                    )
                    .map_err(|error| {
                        tracing::warn!(guard = guard.name(), %error, "guard failed, run aborted");
                        EngineError::from(error)
                    })?;
            }

            let state = builder.freeze();
            let changed = !states_equal(&previous, &state);
            if !changed {
                tracing::debug!("run produced no change");
            }
            Ok(RunOutcome { state, changed })
        })
        .boxed()
    }

    /// Land a completed run: publish on change, otherwise return to idle.
    ///
    /// Returns whether a coalesced follow-up run is owed.
    pub fn apply(&mut self, outcome: RunOutcome) -> bool {
        if outcome.changed {
            self.snapshot = outcome.state;
            self.status = EngineStatus::Updated;
            for observer in &self.observers {
                observer(&self.snapshot);
            }
        } else {
            self.status = EngineStatus::Idle;
        }
        std::mem::take(&mut self.pending)
    }

    /// Abandon a run whose effect was built but never executed, returning
    /// the engine to idle with the previous snapshot intact.
    ///
    /// Only for effects that were dropped without running; landing an
    /// executed effect goes through [`Engine::apply`] or [`Engine::fail`].
    pub fn reset(&mut self) {
        self.status = EngineStatus::Idle;
        self.pending = false;
    }

    /// Land a failed run: keep the previous snapshot, notify error
    /// observers, drop any coalesced trigger.
    pub fn fail(&mut self, error: &EngineError) {
        self.status = EngineStatus::Idle;
        self.pending = false;
        for observer in &self.error_observers {
            observer(error);
        }
    }

    /// Process-and-apply loop: runs the pipeline, lands the outcome, and
    /// repeats while coalesced follow-up runs are owed.
    pub async fn run<Env: SchedulingEnv>(&mut self, env: &Env) -> Result<(), EngineError> {
        loop {
            let outcome = match self.process::<Env>().run(env).await {
                Ok(outcome) => outcome,
                Err(error) => {
                    self.fail(&error);
                    return Err(error);
                }
            };
            if !self.apply(outcome) {
                return Ok(());
            }
        }
    }
}
