//! State allocation strategies.
//!
//! A machine never constructs state instances itself. It asks its
//! [`Allocator`] for a handle to the requested state type and gives the
//! handle back when the state is left. Three backends are provided:
//!
//! - [`Lazy`]: a fresh heap instance per request, dropped on release
//! - [`ExternalPool`]: a caller-owned array indexed by state identifier
//! - [`InternalPool`]: an engine-built array shared through a
//!   [`SharedPool`], constructed on first use and torn down with its last
//!   owner
//!
//! [`DynAllocator`] wraps the three so the strategy can come from runtime
//! configuration.

mod dynamic;
mod external;
mod internal;
mod lazy;
pub mod validation;

pub use dynamic::DynAllocator;
pub use external::{slot, ExternalPool};
pub use internal::{InternalPool, SharedPool};
pub use lazy::Lazy;
pub use validation::{validate_slots, PoolError, PoolViolation};

use crate::core::{State, StateId, StateSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Which backend produces state instances.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStrategy {
    /// Heap allocation per transition.
    #[default]
    Lazy,
    /// Caller-owned array indexed by identifier.
    ExternalPool,
    /// Engine-owned array with a construct/release lifecycle.
    InternalPool,
}

impl AllocationStrategy {
    pub fn is_pooled(self) -> bool {
        !matches!(self, Self::Lazy)
    }
}

impl fmt::Display for AllocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lazy => "lazy",
            Self::ExternalPool => "external pool",
            Self::InternalPool => "internal pool",
        };
        f.write_str(name)
    }
}

/// Backend that turns a state identifier into a usable instance.
pub trait Allocator<S: StateSet> {
    fn strategy(&self) -> AllocationStrategy;

    /// Produce an instance of the state holding `id`, or `None` when this
    /// backend cannot.
    fn acquire(&mut self, id: StateId) -> Option<StateHandle<S::Context>>;

    /// Give back a handle obtained from `acquire`.
    fn release(&mut self, handle: StateHandle<S::Context>) {
        drop(handle);
    }

    /// Called when a handle produced elsewhere is installed in the machine
    /// owning this allocator.
    fn adopt(&mut self, _handle: &StateHandle<S::Context>) {}

    /// Collective teardown when the owning machine stops.
    fn release_pool(&mut self) {}
}

/// Whether `state` is an instance of the member `S` declares under `id`.
///
/// Pooled backends hand out whatever sits in a slot, so they check the
/// concrete type before tagging it with `id`.
pub(crate) fn is_declared_as<S: StateSet>(id: StateId, state: &dyn State<S::Context>) -> bool {
    S::info(id).is_some_and(|info| state.as_any().type_id() == info.type_id())
}

enum Instance<Ctx> {
    Owned(Box<dyn State<Ctx>>),
    Shared(Arc<dyn State<Ctx>>),
}

/// The current-state handle: an instance plus its identifier tag.
///
/// The tag is what the machine compares when it checks whether the
/// current state is of a given type.
pub struct StateHandle<Ctx> {
    id: StateId,
    instance: Instance<Ctx>,
}

impl<Ctx: 'static> StateHandle<Ctx> {
    /// Handle owning its instance.
    pub fn owned(id: StateId, state: Box<dyn State<Ctx>>) -> Self {
        Self {
            id,
            instance: Instance::Owned(state),
        }
    }

    /// Handle to an instance living in a pool.
    pub fn shared(id: StateId, state: Arc<dyn State<Ctx>>) -> Self {
        Self {
            id,
            instance: Instance::Shared(state),
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn state(&self) -> &dyn State<Ctx> {
        match &self.instance {
            Instance::Owned(state) => state.as_ref(),
            Instance::Shared(state) => state.as_ref(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.state().name()
    }

    /// Whether the instance lives in a pool.
    pub fn is_shared(&self) -> bool {
        matches!(self.instance, Instance::Shared(_))
    }

    /// Whether both handles point at the same instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(
            self.state() as *const dyn State<Ctx>,
            other.state() as *const dyn State<Ctx>,
        )
    }

    /// Whether this handle points at `slot`.
    pub fn points_to(&self, slot: &Arc<dyn State<Ctx>>) -> bool {
        std::ptr::addr_eq(self.state() as *const dyn State<Ctx>, Arc::as_ptr(slot))
    }

    pub(crate) fn on_enter(&self, ctx: &mut Ctx) {
        self.state().on_enter(ctx)
    }

    pub(crate) fn on_exit(&self, ctx: &mut Ctx) {
        self.state().on_exit(ctx)
    }
}

impl<Ctx: 'static> fmt::Debug for StateHandle<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateHandle")
            .field("id", &self.id)
            .field("state", &self.name())
            .field("shared", &self.is_shared())
            .finish()
    }
}
