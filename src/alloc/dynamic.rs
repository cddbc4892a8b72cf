use super::{AllocationStrategy, Allocator, ExternalPool, InternalPool, Lazy, StateHandle};
use crate::core::{StateId, StateSet};
use std::fmt;

/// Allocator whose backend is chosen at runtime.
///
/// Produced by [`StateMachineBuilder`](crate::builder::StateMachineBuilder)
/// when the strategy comes from configuration.
pub enum DynAllocator<S: StateSet> {
    Lazy(Lazy),
    External(ExternalPool<S::Context>),
    Internal(InternalPool<S>),
}

impl<S: StateSet> Allocator<S> for DynAllocator<S> {
    fn strategy(&self) -> AllocationStrategy {
        match self {
            Self::Lazy(inner) => Allocator::<S>::strategy(inner),
            Self::External(inner) => Allocator::<S>::strategy(inner),
            Self::Internal(inner) => inner.strategy(),
        }
    }

    fn acquire(&mut self, id: StateId) -> Option<StateHandle<S::Context>> {
        match self {
            Self::Lazy(inner) => Allocator::<S>::acquire(inner, id),
            Self::External(inner) => Allocator::<S>::acquire(inner, id),
            Self::Internal(inner) => inner.acquire(id),
        }
    }

    fn release(&mut self, handle: StateHandle<S::Context>) {
        match self {
            Self::Lazy(inner) => Allocator::<S>::release(inner, handle),
            Self::External(inner) => Allocator::<S>::release(inner, handle),
            Self::Internal(inner) => inner.release(handle),
        }
    }

    fn adopt(&mut self, handle: &StateHandle<S::Context>) {
        match self {
            Self::Lazy(inner) => Allocator::<S>::adopt(inner, handle),
            Self::External(inner) => Allocator::<S>::adopt(inner, handle),
            Self::Internal(inner) => inner.adopt(handle),
        }
    }

    fn release_pool(&mut self) {
        match self {
            Self::Lazy(inner) => Allocator::<S>::release_pool(inner),
            Self::External(inner) => Allocator::<S>::release_pool(inner),
            Self::Internal(inner) => inner.release_pool(),
        }
    }
}

impl<S: StateSet> From<Lazy> for DynAllocator<S> {
    fn from(inner: Lazy) -> Self {
        Self::Lazy(inner)
    }
}

impl<S: StateSet> From<ExternalPool<S::Context>> for DynAllocator<S> {
    fn from(inner: ExternalPool<S::Context>) -> Self {
        Self::External(inner)
    }
}

impl<S: StateSet> From<InternalPool<S>> for DynAllocator<S> {
    fn from(inner: InternalPool<S>) -> Self {
        Self::Internal(inner)
    }
}

impl<S: StateSet> fmt::Debug for DynAllocator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lazy(inner) => f.debug_tuple("Lazy").field(inner).finish(),
            Self::External(inner) => f.debug_tuple("External").field(inner).finish(),
            Self::Internal(inner) => f.debug_tuple("Internal").field(inner).finish(),
        }
    }
}
