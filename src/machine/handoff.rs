//! Ownership hand-off buffer used by `save` and `load`.

use crate::alloc::StateHandle;
use crate::core::{StateId, StateSet};
use std::fmt;

/// Bytes one saved handle occupies in a [`HandoffBuffer`].
pub const HANDLE_SIZE: usize = std::mem::size_of::<usize>();

/// Holds at most one suspended state handle in transit between machines
/// over the same set `S`.
///
/// The buffer is an ownership token, valid only inside the process that
/// produced it. `capacity` mirrors the byte-sized buffers of embedded
/// hosts: a buffer smaller than [`HANDLE_SIZE`] can never hold a handle
/// and every `save`/`load` through it returns 0.
pub struct HandoffBuffer<S: StateSet> {
    capacity: usize,
    slot: Option<StateHandle<S::Context>>,
}

impl<S: StateSet> HandoffBuffer<S> {
    /// Buffer sized for exactly one handle.
    pub fn new() -> Self {
        Self::with_capacity(HANDLE_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            slot: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the buffer is large enough to carry a handle.
    pub fn fits_handle(&self) -> bool {
        self.capacity >= HANDLE_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    /// Identifier of the held handle.
    pub fn state_id(&self) -> Option<StateId> {
        self.slot.as_ref().map(StateHandle::id)
    }

    /// Name of the held state.
    pub fn state_name(&self) -> Option<&'static str> {
        self.slot.as_ref().map(StateHandle::name)
    }

    pub(crate) fn store(&mut self, handle: StateHandle<S::Context>) {
        self.slot = Some(handle);
    }

    pub(crate) fn take(&mut self) -> Option<StateHandle<S::Context>> {
        self.slot.take()
    }
}

impl<S: StateSet> Default for HandoffBuffer<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StateSet> fmt::Debug for HandoffBuffer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandoffBuffer")
            .field("set", &S::NAME)
            .field("capacity", &self.capacity)
            .field("state", &self.state_name())
            .finish()
    }
}
