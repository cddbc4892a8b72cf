use super::{HandoffBuffer, Lifecycle, MachineError, HANDLE_SIZE};
use crate::alloc::{
    AllocationStrategy, Allocator, ExternalPool, InternalPool, Lazy, SharedPool, StateHandle,
};
use crate::checkpoint::Checkpoint;
use crate::core::{Member, StateId, StateSet, Transition};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Machine over the declared set `S`, obtaining instances through `A`.
///
/// # Example
///
/// ```rust
/// use stator::core::State;
/// use stator::machine::LazyMachine;
/// use stator::{state_set, transition};
///
/// #[derive(Default)]
/// struct Locked;
/// #[derive(Default)]
/// struct Unlocked;
///
/// impl State<u32> for Locked {
///     fn on_enter(&self, _: &mut u32) {}
///     fn on_exit(&self, _: &mut u32) {}
/// }
///
/// impl State<u32> for Unlocked {
///     fn on_enter(&self, _: &mut u32) {}
///     fn on_exit(&self, _: &mut u32) {}
/// }
///
/// transition!(Locked => Unlocked for u32, |coins| *coins += 1);
/// transition!(Unlocked => Locked for u32);
///
/// state_set! {
///     struct Turnstile: u32 {
///         Locked,
///         Unlocked,
///     }
/// }
///
/// let mut coins = 0;
/// let mut machine = LazyMachine::<Turnstile>::lazy();
///
/// machine.start::<Locked>(&mut coins).unwrap();
/// machine.transition::<Locked, Unlocked>(&mut coins).unwrap();
/// assert!(machine.is_in::<Unlocked>());
/// assert_eq!(coins, 1);
///
/// // Source does not match the current state: rejected, nothing runs.
/// assert!(machine.transition::<Locked, Unlocked>(&mut coins).is_err());
/// assert_eq!(coins, 1);
///
/// machine.stop(&mut coins);
/// assert!(machine.current_state_id().is_none());
/// ```
pub struct StateMachine<S: StateSet, A: Allocator<S> = Lazy> {
    allocator: A,
    current: Option<StateHandle<S::Context>>,
    lifecycle: Lifecycle,
}

/// Machine allocating a fresh instance per transition.
pub type LazyMachine<S> = StateMachine<S, Lazy>;

/// Machine reading instances from a caller-owned pool.
pub type ExternalMachine<S> = StateMachine<S, ExternalPool<<S as StateSet>::Context>>;

/// Machine sharing an engine-built pool.
pub type InternalMachine<S> = StateMachine<S, InternalPool<S>>;

impl<S: StateSet> StateMachine<S, Lazy> {
    pub fn lazy() -> Self {
        Self::new(Lazy)
    }
}

impl<S: StateSet> StateMachine<S, ExternalPool<S::Context>> {
    pub fn external(pool: ExternalPool<S::Context>) -> Self {
        Self::new(pool)
    }
}

impl<S: StateSet> StateMachine<S, InternalPool<S>> {
    pub fn internal(shared: Arc<SharedPool<S>>) -> Self {
        Self::new(InternalPool::new(shared))
    }
}

impl<S: StateSet, A: Allocator<S>> StateMachine<S, A> {
    /// Create an unstarted machine using `allocator` for its lifetime.
    pub fn new(allocator: A) -> Self {
        Self {
            allocator,
            current: None,
            lifecycle: Lifecycle::Unstarted,
        }
    }

    pub fn strategy(&self) -> AllocationStrategy {
        self.allocator.strategy()
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    /// Identifier tag of the current state.
    pub fn current_state_id(&self) -> Option<StateId> {
        self.current.as_ref().map(StateHandle::id)
    }

    /// Display name of the current state.
    pub fn current_state_name(&self) -> Option<&'static str> {
        self.current.as_ref().map(StateHandle::name)
    }

    /// The current instance viewed as `T`, if the machine is in `T`.
    pub fn current_state_as<T: Member<S>>(&self) -> Option<&T> {
        self.current
            .as_ref()
            .filter(|handle| handle.id() == T::state_id())
            .and_then(|handle| handle.state().downcast_ref::<T>())
    }

    pub fn is_in<T: Member<S>>(&self) -> bool {
        self.current_state_as::<T>().is_some()
    }

    /// Enter `T` as the initial state.
    ///
    /// Fails with [`MachineError::AlreadyRunning`] when a state is already
    /// current, and with [`MachineError::AllocationFailed`] when the
    /// allocator cannot produce `T`; neither failure runs any hook.
    pub fn start<T: Member<S>>(&mut self, ctx: &mut S::Context) -> Result<(), MachineError> {
        self.ensure_accepts_state()?;
        let handle = self.acquire(T::state_id())?;

        self.lifecycle = Lifecycle::Interrupted;
        let current = self.current.insert(handle);
        current.on_enter(ctx);
        self.lifecycle = Lifecycle::Running;

        debug!(
            set = S::NAME,
            state = current.name(),
            strategy = %self.allocator.strategy(),
            "machine started"
        );
        Ok(())
    }

    /// Move from `From` to `To`, running the registered effect.
    ///
    /// Only compiles for registered pairs. When the machine is not in
    /// `From` the call fails with [`MachineError::InvalidTransition`]
    /// before anything runs or is allocated.
    pub fn transition<From, To>(&mut self, ctx: &mut S::Context) -> Result<(), MachineError>
    where
        From: Member<S> + Transition<To, S::Context>,
        To: Member<S>,
    {
        self.step(
            From::state_id(),
            To::state_id(),
            <From as Transition<To, S::Context>>::on_transition,
            ctx,
        )
    }

    /// Move between states named by identifier, dispatching through the
    /// set's runtime transition table.
    pub fn transition_by_id(
        &mut self,
        from: StateId,
        to: StateId,
        ctx: &mut S::Context,
    ) -> Result<(), MachineError> {
        for id in [from, to] {
            if !S::contains(id) {
                return Err(MachineError::UnknownState { set: S::NAME, id });
            }
        }

        let edge = S::find_transition(from, to).ok_or(MachineError::UnregisteredTransition {
            set: S::NAME,
            from: S::name_of(from),
            to: S::name_of(to),
        })?;

        self.step(from, to, edge.effect(), ctx)
    }

    fn step(
        &mut self,
        from: StateId,
        to: StateId,
        effect: fn(&mut S::Context),
        ctx: &mut S::Context,
    ) -> Result<(), MachineError> {
        if self.lifecycle == Lifecycle::Interrupted {
            return Err(MachineError::Interrupted { set: S::NAME });
        }

        let current = self
            .current_state_id()
            .ok_or(MachineError::NotRunning { set: S::NAME })?;

        if current != from {
            debug!(
                set = S::NAME,
                from = S::name_of(from),
                to = S::name_of(to),
                current = S::name_of(current),
                "transition rejected"
            );
            return Err(MachineError::InvalidTransition {
                from: S::name_of(from),
                to: S::name_of(to),
                current: S::name_of(current),
            });
        }

        let next = self.acquire(to)?;

        self.lifecycle = Lifecycle::Interrupted;
        if let Some(previous) = self.current.replace(next) {
            previous.on_exit(ctx);
            self.allocator.release(previous);
        }
        effect(ctx);
        if let Some(entered) = &self.current {
            entered.on_enter(ctx);
        }
        self.lifecycle = Lifecycle::Running;

        debug!(
            set = S::NAME,
            from = S::name_of(from),
            to = S::name_of(to),
            "transition completed"
        );
        Ok(())
    }

    /// Leave the current state and release it.
    ///
    /// No-op on an unstarted or stopped machine. An interrupted machine is
    /// released without running `on_exit`. Pooled allocators detach from
    /// their pool, which releases it if this was the last owner.
    pub fn stop(&mut self, ctx: &mut S::Context) {
        match self.lifecycle {
            Lifecycle::Unstarted | Lifecycle::Stopped => return,
            Lifecycle::Running => {
                if let Some(current) = self.current.take() {
                    self.lifecycle = Lifecycle::Interrupted;
                    current.on_exit(ctx);
                    self.allocator.release(current);
                }
            }
            Lifecycle::Suspended | Lifecycle::Interrupted => {
                if let Some(current) = self.current.take() {
                    self.allocator.release(current);
                }
            }
        }

        self.allocator.release_pool();
        self.lifecycle = Lifecycle::Stopped;
        debug!(set = S::NAME, "machine stopped");
    }

    /// Drop the current state without running any hook and return to
    /// [`Lifecycle::Unstarted`].
    pub fn reset(&mut self) {
        if let Some(current) = self.current.take() {
            self.allocator.release(current);
        }
        self.allocator.release_pool();
        self.lifecycle = Lifecycle::Unstarted;
        debug!(set = S::NAME, "machine reset");
    }

    /// Hand the current state out into `buffer`, suspending the machine.
    ///
    /// Returns the number of bytes written, or 0 without changing anything
    /// when the buffer is too small or already occupied, or when the
    /// machine has no running state.
    pub fn save(&mut self, buffer: &mut HandoffBuffer<S>) -> usize {
        if !buffer.fits_handle() || !buffer.is_empty() || self.lifecycle != Lifecycle::Running {
            return 0;
        }
        let Some(handle) = self.current.take() else {
            return 0;
        };

        debug!(set = S::NAME, state = handle.name(), "machine suspended");
        buffer.store(handle);
        self.lifecycle = Lifecycle::Suspended;
        HANDLE_SIZE
    }

    /// Install the handle held in `buffer` as the current state without
    /// running its entry hook.
    ///
    /// Returns the number of bytes read, or 0 without changing anything
    /// when the buffer is too small or empty, or when the machine already
    /// holds a state.
    pub fn load(&mut self, buffer: &mut HandoffBuffer<S>) -> usize {
        if !buffer.fits_handle() || !self.lifecycle.accepts_state() {
            return 0;
        }
        let Some(handle) = buffer.take() else {
            return 0;
        };

        self.allocator.adopt(&handle);
        debug!(set = S::NAME, state = handle.name(), "machine resumed");
        self.current = Some(handle);
        self.lifecycle = Lifecycle::Running;
        HANDLE_SIZE
    }

    /// Record the current state as a portable [`Checkpoint`].
    pub fn checkpoint(&self) -> Result<Checkpoint, MachineError> {
        match (&self.current, self.lifecycle) {
            (Some(current), Lifecycle::Running) => {
                Ok(Checkpoint::capture::<S>(current.id(), self.strategy()))
            }
            (_, Lifecycle::Interrupted) => Err(MachineError::Interrupted { set: S::NAME }),
            _ => Err(MachineError::NotRunning { set: S::NAME }),
        }
    }

    /// Resume from `checkpoint`, building the recorded state through this
    /// machine's allocator. The entry hook does not run.
    pub fn restore(&mut self, checkpoint: &Checkpoint) -> Result<(), MachineError> {
        self.ensure_accepts_state()?;
        checkpoint.validate::<S>()?;

        let handle = self.acquire(checkpoint.state_id)?;
        debug!(
            set = S::NAME,
            state = handle.name(),
            checkpoint = %checkpoint.id,
            "machine restored from checkpoint"
        );
        self.current = Some(handle);
        self.lifecycle = Lifecycle::Running;
        Ok(())
    }

    fn ensure_accepts_state(&self) -> Result<(), MachineError> {
        match self.lifecycle {
            Lifecycle::Interrupted => Err(MachineError::Interrupted { set: S::NAME }),
            lifecycle if !lifecycle.accepts_state() => Err(MachineError::AlreadyRunning {
                set: S::NAME,
                state: self.current_state_id().map_or("<none>", S::name_of),
            }),
            _ => Ok(()),
        }
    }

    fn acquire(&mut self, id: StateId) -> Result<StateHandle<S::Context>, MachineError> {
        match self.allocator.acquire(id) {
            Some(handle) => Ok(handle),
            None => {
                let strategy = self.allocator.strategy();
                warn!(
                    set = S::NAME,
                    state = S::name_of(id),
                    %id,
                    %strategy,
                    "state allocation failed"
                );
                Err(MachineError::AllocationFailed {
                    state: S::name_of(id),
                    id,
                    strategy,
                })
            }
        }
    }
}

impl<S: StateSet, A: Allocator<S>> fmt::Debug for StateMachine<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("set", &S::NAME)
            .field("strategy", &self.strategy())
            .field("lifecycle", &self.lifecycle)
            .field("state", &self.current_state_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::slot;
    use crate::core::State;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[derive(Default)]
    struct Journal {
        events: Vec<&'static str>,
        fail_entry: bool,
        fail_effect: bool,
    }

    #[derive(Default)]
    struct Idle;
    #[derive(Default)]
    struct Active;
    #[derive(Default)]
    struct Fragile;

    impl State<Journal> for Idle {
        fn on_enter(&self, ctx: &mut Journal) {
            ctx.events.push("enter idle");
        }

        fn on_exit(&self, ctx: &mut Journal) {
            ctx.events.push("exit idle");
        }
    }

    impl State<Journal> for Active {
        fn on_enter(&self, ctx: &mut Journal) {
            ctx.events.push("enter active");
        }

        fn on_exit(&self, ctx: &mut Journal) {
            ctx.events.push("exit active");
        }
    }

    impl State<Journal> for Fragile {
        fn on_enter(&self, ctx: &mut Journal) {
            if ctx.fail_entry {
                panic!("fragile entry");
            }
            ctx.events.push("enter fragile");
        }

        fn on_exit(&self, ctx: &mut Journal) {
            ctx.events.push("exit fragile");
        }
    }

    crate::transition!(Idle => Active for Journal, |ctx| ctx.events.push("activate"));
    crate::transition!(Active => Idle for Journal, |ctx| {
        if ctx.fail_effect {
            panic!("deactivate effect");
        }
    });
    crate::transition!(Idle => Fragile for Journal);

    crate::state_set! {
        struct Worker: Journal {
            Idle,
            Active,
            Fragile,
        }
        transitions {
            Idle => Active,
            Active => Idle,
        }
    }

    #[test]
    fn start_enters_initial_state() {
        let mut journal = Journal::default();
        let mut machine = LazyMachine::<Worker>::lazy();

        machine.start::<Idle>(&mut journal).unwrap();

        assert_eq!(machine.lifecycle(), Lifecycle::Running);
        assert!(machine.is_in::<Idle>());
        assert_eq!(machine.current_state_name(), Some("Idle"));
        assert_eq!(journal.events, vec!["enter idle"]);
    }

    #[test]
    fn second_start_is_rejected_without_hooks() {
        let mut journal = Journal::default();
        let mut machine = LazyMachine::<Worker>::lazy();
        machine.start::<Idle>(&mut journal).unwrap();

        let result = machine.start::<Active>(&mut journal);

        assert!(matches!(
            result,
            Err(MachineError::AlreadyRunning { state: "Idle", .. })
        ));
        assert!(machine.is_in::<Idle>());
        assert_eq!(journal.events, vec!["enter idle"]);
    }

    #[test]
    fn transition_runs_exit_effect_entry_in_order() {
        let mut journal = Journal::default();
        let mut machine = LazyMachine::<Worker>::lazy();
        machine.start::<Idle>(&mut journal).unwrap();
        journal.events.clear();

        machine.transition::<Idle, Active>(&mut journal).unwrap();

        assert_eq!(journal.events, vec!["exit idle", "activate", "enter active"]);
        assert!(machine.current_state_as::<Active>().is_some());
        assert!(machine.current_state_as::<Idle>().is_none());
    }

    #[test]
    fn transition_before_start_reports_not_running() {
        let mut journal = Journal::default();
        let mut machine = LazyMachine::<Worker>::lazy();

        let result = machine.transition::<Idle, Active>(&mut journal);
        assert!(matches!(result, Err(MachineError::NotRunning { .. })));
        assert!(journal.events.is_empty());
    }

    #[test]
    fn transition_by_id_uses_runtime_table() {
        let mut journal = Journal::default();
        let mut machine = LazyMachine::<Worker>::lazy();
        machine.start::<Idle>(&mut journal).unwrap();

        let idle = <Idle as Member<Worker>>::state_id();
        let active = <Active as Member<Worker>>::state_id();
        let fragile = <Fragile as Member<Worker>>::state_id();

        machine.transition_by_id(idle, active, &mut journal).unwrap();
        assert!(machine.is_in::<Active>());

        // Registered through the trait but not listed in the table.
        let result = machine.transition_by_id(active, fragile, &mut journal);
        assert!(matches!(
            result,
            Err(MachineError::UnregisteredTransition {
                from: "Active",
                to: "Fragile",
                ..
            })
        ));

        let result = machine.transition_by_id(active, StateId::new(99), &mut journal);
        assert!(matches!(result, Err(MachineError::UnknownState { .. })));
        assert!(machine.is_in::<Active>());
    }

    #[test]
    fn failed_target_allocation_keeps_source_state() {
        let slots: Vec<Arc<dyn State<Journal>>> = vec![slot(Idle), slot(Active)];
        let mut machine = ExternalMachine::<Worker>::external(ExternalPool::new(slots));
        let mut journal = Journal::default();
        machine.start::<Idle>(&mut journal).unwrap();
        journal.events.clear();

        let result = machine.transition::<Idle, Fragile>(&mut journal);

        assert!(matches!(
            result,
            Err(MachineError::AllocationFailed {
                state: "Fragile",
                strategy: AllocationStrategy::ExternalPool,
                ..
            })
        ));
        assert!(journal.events.is_empty());
        assert!(machine.is_in::<Idle>());
        assert!(machine.is_running());
    }

    #[test]
    fn panicking_hook_interrupts_the_machine() {
        let mut journal = Journal::default();
        let mut machine = LazyMachine::<Worker>::lazy();
        machine.start::<Idle>(&mut journal).unwrap();
        journal.fail_entry = true;

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            machine.transition::<Idle, Fragile>(&mut journal)
        }));
        assert!(outcome.is_err());

        assert_eq!(machine.lifecycle(), Lifecycle::Interrupted);
        assert!(machine.is_in::<Fragile>());
        assert!(matches!(
            machine.transition::<Active, Idle>(&mut journal),
            Err(MachineError::Interrupted { .. })
        ));
        assert!(matches!(
            machine.start::<Idle>(&mut journal),
            Err(MachineError::Interrupted { .. })
        ));

        journal.events.clear();
        machine.stop(&mut journal);
        assert!(journal.events.is_empty());
        assert_eq!(machine.lifecycle(), Lifecycle::Stopped);

        journal.fail_entry = false;
        machine.start::<Idle>(&mut journal).unwrap();
        assert!(machine.is_in::<Idle>());
    }

    #[test]
    fn panicking_effect_leaves_target_current_without_entry() {
        let mut journal = Journal::default();
        let mut machine = LazyMachine::<Worker>::lazy();
        machine.start::<Active>(&mut journal).unwrap();
        journal.events.clear();
        journal.fail_effect = true;

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            machine.transition::<Active, Idle>(&mut journal)
        }));
        assert!(outcome.is_err());

        assert_eq!(journal.events, vec!["exit active"]);
        assert_eq!(machine.lifecycle(), Lifecycle::Interrupted);
        assert!(machine.is_in::<Idle>());
        assert!(matches!(
            machine.checkpoint(),
            Err(MachineError::Interrupted { .. })
        ));

        machine.stop(&mut journal);
        assert_eq!(journal.events, vec!["exit active"]);
        assert_eq!(machine.lifecycle(), Lifecycle::Stopped);
    }

    #[test]
    fn start_fails_when_the_pool_has_no_slot() {
        let slots: Vec<Arc<dyn State<Journal>>> = vec![slot(Idle), slot(Active)];
        let mut machine = ExternalMachine::<Worker>::external(ExternalPool::new(slots));
        let mut journal = Journal::default();

        let result = machine.start::<Fragile>(&mut journal);

        assert!(matches!(
            result,
            Err(MachineError::AllocationFailed {
                state: "Fragile",
                strategy: AllocationStrategy::ExternalPool,
                ..
            })
        ));
        assert_eq!(machine.lifecycle(), Lifecycle::Unstarted);
        assert!(machine.current_state_id().is_none());
        assert!(journal.events.is_empty());

        machine.start::<Idle>(&mut journal).unwrap();
        assert!(machine.is_in::<Idle>());
    }

    #[test]
    fn swapped_pool_slots_are_refused() {
        let slots: Vec<Arc<dyn State<Journal>>> = vec![slot(Active), slot(Idle), slot(Fragile)];
        let mut machine = ExternalMachine::<Worker>::external(ExternalPool::new(slots));
        let mut journal = Journal::default();

        let result = machine.start::<Idle>(&mut journal);
        assert!(matches!(
            result,
            Err(MachineError::AllocationFailed { state: "Idle", .. })
        ));
        assert_eq!(machine.lifecycle(), Lifecycle::Unstarted);

        machine.start::<Fragile>(&mut journal).unwrap();
        assert!(machine.is_in::<Fragile>());
        assert_eq!(journal.events, vec!["enter fragile"]);
    }

    #[test]
    fn stop_runs_exit_and_is_idempotent() {
        let mut journal = Journal::default();
        let mut machine = LazyMachine::<Worker>::lazy();
        machine.stop(&mut journal);
        assert_eq!(machine.lifecycle(), Lifecycle::Unstarted);

        machine.start::<Active>(&mut journal).unwrap();
        machine.stop(&mut journal);
        machine.stop(&mut journal);

        assert_eq!(journal.events, vec!["enter active", "exit active"]);
        assert_eq!(machine.lifecycle(), Lifecycle::Stopped);
        assert!(machine.current_state_id().is_none());
    }

    #[test]
    fn reset_skips_hooks() {
        let mut journal = Journal::default();
        let mut machine = LazyMachine::<Worker>::lazy();
        machine.start::<Idle>(&mut journal).unwrap();

        machine.reset();

        assert_eq!(journal.events, vec!["enter idle"]);
        assert_eq!(machine.lifecycle(), Lifecycle::Unstarted);
    }

    #[test]
    fn save_and_load_move_the_handle_without_hooks() {
        let mut journal = Journal::default();
        let mut source = LazyMachine::<Worker>::lazy();
        let mut target = LazyMachine::<Worker>::lazy();
        let mut buffer = HandoffBuffer::<Worker>::new();
        source.start::<Active>(&mut journal).unwrap();

        assert_eq!(source.save(&mut buffer), HANDLE_SIZE);
        assert_eq!(source.lifecycle(), Lifecycle::Suspended);
        assert!(source.current_state_id().is_none());
        assert_eq!(buffer.state_name(), Some("Active"));

        assert_eq!(target.load(&mut buffer), HANDLE_SIZE);
        assert!(target.is_in::<Active>());
        assert!(buffer.is_empty());
        assert_eq!(journal.events, vec!["enter active"]);

        assert!(matches!(
            source.transition::<Active, Idle>(&mut journal),
            Err(MachineError::NotRunning { .. })
        ));
    }

    #[test]
    fn save_and_load_soft_failures_change_nothing() {
        let mut journal = Journal::default();
        let mut machine = LazyMachine::<Worker>::lazy();
        let mut small = HandoffBuffer::<Worker>::with_capacity(HANDLE_SIZE - 1);
        let mut buffer = HandoffBuffer::<Worker>::new();

        assert_eq!(machine.save(&mut buffer), 0);
        assert_eq!(machine.load(&mut buffer), 0);

        machine.start::<Idle>(&mut journal).unwrap();
        assert_eq!(machine.save(&mut small), 0);
        assert!(machine.is_in::<Idle>());

        let mut other = LazyMachine::<Worker>::lazy();
        other.start::<Active>(&mut journal).unwrap();
        assert_eq!(other.save(&mut buffer), HANDLE_SIZE);

        // Occupied buffer, and a running machine refusing a load.
        assert_eq!(machine.save(&mut buffer), 0);
        assert_eq!(machine.load(&mut buffer), 0);
        assert_eq!(buffer.state_name(), Some("Active"));
        assert!(machine.is_in::<Idle>());
    }

    #[test]
    fn checkpoint_restore_skips_entry_hook() {
        let mut journal = Journal::default();
        let mut machine = LazyMachine::<Worker>::lazy();
        machine.start::<Active>(&mut journal).unwrap();

        let checkpoint = machine.checkpoint().unwrap();
        assert_eq!(checkpoint.state_name, "Active");
        assert_eq!(checkpoint.strategy, AllocationStrategy::Lazy);

        let shared = SharedPool::<Worker>::shared();
        let mut restored = InternalMachine::<Worker>::internal(Arc::clone(&shared));
        restored.restore(&checkpoint).unwrap();

        assert!(restored.is_in::<Active>());
        assert_eq!(journal.events, vec!["enter active"]);
        assert!(matches!(
            restored.restore(&checkpoint),
            Err(MachineError::AlreadyRunning { .. })
        ));
    }

    #[test]
    fn checkpoint_requires_a_running_state() {
        let machine = LazyMachine::<Worker>::lazy();
        assert!(matches!(
            machine.checkpoint(),
            Err(MachineError::NotRunning { .. })
        ));
    }
}
