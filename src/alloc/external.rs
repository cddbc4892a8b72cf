//! Caller-owned state pool.

use super::validation::{validate_slots, PoolError};
use super::{is_declared_as, AllocationStrategy, Allocator, StateHandle};
use crate::core::{State, StateId, StateSet};
use std::fmt;
use std::sync::Arc;
use stillwater::validation::Validation;
use tracing::warn;

/// Wrap a state instance as a pool slot.
pub fn slot<Ctx, T: State<Ctx>>(state: T) -> Arc<dyn State<Ctx>> {
    Arc::new(state)
}

/// Pool of instances owned by the caller, indexed by state identifier.
///
/// The engine only reads the array: `acquire` hands out the slot at the
/// requested identifier and `release` gives nothing back to free. The
/// caller keeps its own `Arc` to the array and decides when the instances
/// die.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use stator::alloc::{slot, ExternalPool};
/// use stator::core::State;
/// use stator::state_set;
///
/// #[derive(Default)]
/// struct On;
/// #[derive(Default)]
/// struct Off;
///
/// impl State<()> for On {
///     fn on_enter(&self, _: &mut ()) {}
///     fn on_exit(&self, _: &mut ()) {}
/// }
///
/// impl State<()> for Off {
///     fn on_enter(&self, _: &mut ()) {}
///     fn on_exit(&self, _: &mut ()) {}
/// }
///
/// state_set! {
///     struct Switch: () {
///         On,
///         Off,
///     }
/// }
///
/// let slots: Arc<[Arc<dyn State<()>>]> = Arc::from(vec![slot(On), slot(Off)]);
/// let pool = ExternalPool::validated::<Switch>(Arc::clone(&slots)).unwrap();
/// assert_eq!(pool.len(), 2);
/// ```
pub struct ExternalPool<Ctx> {
    slots: Arc<[Arc<dyn State<Ctx>>]>,
}

impl<Ctx: 'static> ExternalPool<Ctx> {
    /// Use `slots` as-is.
    ///
    /// A pool shorter than the declared set makes acquisition of the
    /// missing identifiers fail; the machine reports that as an
    /// allocation failure.
    pub fn new(slots: impl Into<Arc<[Arc<dyn State<Ctx>>]>>) -> Self {
        Self {
            slots: slots.into(),
        }
    }

    /// Use `slots` after checking them against the members of `S`.
    pub fn validated<S>(slots: impl Into<Arc<[Arc<dyn State<Ctx>>]>>) -> Result<Self, PoolError>
    where
        S: StateSet<Context = Ctx>,
    {
        let slots = slots.into();
        match validate_slots::<S>(&slots) {
            Validation::Success(()) => Ok(Self { slots }),
            Validation::Failure(violations) => {
                let error = PoolError::from_violations(&violations);
                warn!(set = S::NAME, %error, "external pool rejected");
                Err(error)
            }
        }
    }

    pub fn slots(&self) -> &Arc<[Arc<dyn State<Ctx>>]> {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<Ctx> Clone for ExternalPool<Ctx> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<Ctx> fmt::Debug for ExternalPool<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalPool")
            .field("slots", &self.slots.len())
            .finish()
    }
}

impl<S: StateSet> Allocator<S> for ExternalPool<S::Context> {
    fn strategy(&self) -> AllocationStrategy {
        AllocationStrategy::ExternalPool
    }

    fn acquire(&mut self, id: StateId) -> Option<StateHandle<S::Context>> {
        let state = self.slots.get(id.index())?;
        if !is_declared_as::<S>(id, &**state) {
            warn!(
                set = S::NAME,
                expected = S::name_of(id),
                found = state.name(),
                slot = id.index(),
                "external pool slot holds the wrong state type"
            );
            return None;
        }
        Some(StateHandle::shared(id, Arc::clone(state)))
    }
}
