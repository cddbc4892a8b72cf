//! Heap allocation per request.

use super::{AllocationStrategy, Allocator, StateHandle};
use crate::core::{StateId, StateSet};
use tracing::trace;

/// Builds a fresh instance on every `acquire` and drops it on `release`.
///
/// Has no pooling discipline and no limit on the number of state types;
/// costs one allocation and one deallocation per transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Lazy;

impl<S: StateSet> Allocator<S> for Lazy {
    fn strategy(&self) -> AllocationStrategy {
        AllocationStrategy::Lazy
    }

    fn acquire(&mut self, id: StateId) -> Option<StateHandle<S::Context>> {
        let info = S::info(id)?;
        Some(StateHandle::owned(id, info.construct()))
    }

    fn release(&mut self, handle: StateHandle<S::Context>) {
        trace!(set = S::NAME, state = handle.name(), "dropping state instance");
        drop(handle);
    }
}
