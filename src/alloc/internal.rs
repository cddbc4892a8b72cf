//! Engine-owned state pool shared between machines.

use super::{is_declared_as, AllocationStrategy, Allocator, StateHandle};
use crate::core::{State, StateId, StateSet};
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace, warn};

type Slots<Ctx> = Arc<[Option<Arc<dyn State<Ctx>>>]>;

struct PoolInner<Ctx> {
    slots: Option<Slots<Ctx>>,
    owners: usize,
}

/// One instance of every member of `S`, built on first use.
///
/// The pool is an ordinary value: create it once, wrap it in an `Arc` and
/// hand it to every machine that should share it. Construction happens
/// under a lock, so concurrent first use builds the instances exactly
/// once. Machines attach on their first acquisition and detach when they
/// stop or are dropped; when the last owner detaches the instances are
/// released, and the next attach builds a fresh set.
pub struct SharedPool<S: StateSet> {
    inner: Mutex<PoolInner<S::Context>>,
    constructions: AtomicUsize,
    _set: PhantomData<fn() -> S>,
}

impl<S: StateSet> SharedPool<S> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(PoolInner {
                slots: None,
                owners: 0,
            }),
            constructions: AtomicUsize::new(0),
            _set: PhantomData,
        }
    }

    /// Create a pool ready to be shared.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Whether the instances currently exist.
    pub fn is_constructed(&self) -> bool {
        self.lock().slots.is_some()
    }

    /// Number of machines attached to the pool.
    pub fn owners(&self) -> usize {
        self.lock().owners
    }

    /// How many times the instances have been built.
    pub fn constructions(&self) -> usize {
        self.constructions.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, PoolInner<S::Context>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn attach(&self) -> Slots<S::Context> {
        let mut inner = self.lock();
        inner.owners += 1;
        let owners = inner.owners;
        let slots = inner.slots.get_or_insert_with(|| {
            self.constructions.fetch_add(1, Ordering::SeqCst);
            debug!(set = S::NAME, states = S::len(), "constructing internal state pool");
            build_slots::<S>()
        });
        trace!(set = S::NAME, owners, "attached to internal state pool");
        Arc::clone(slots)
    }

    pub(crate) fn detach(&self) {
        let mut inner = self.lock();
        inner.owners = inner.owners.saturating_sub(1);
        trace!(set = S::NAME, owners = inner.owners, "detached from internal state pool");
        if inner.owners == 0 && inner.slots.take().is_some() {
            debug!(set = S::NAME, "released internal state pool");
        }
    }
}

fn build_slots<S: StateSet>() -> Slots<S::Context> {
    let len = S::len();
    let mut slots: Vec<Option<Arc<dyn State<S::Context>>>> = vec![None; len];
    for (position, info) in S::catalog().iter().enumerate() {
        match S::ids().id_at(position) {
            Some(id) if id.index() < len => {
                slots[id.index()] = Some(Arc::from(info.construct()));
            }
            id => {
                warn!(
                    set = S::NAME,
                    state = info.name(),
                    ?id,
                    "state identifier does not fit the internal pool"
                );
            }
        }
    }
    Arc::from(slots)
}

impl<S: StateSet> Default for SharedPool<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StateSet> fmt::Debug for SharedPool<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("SharedPool")
            .field("set", &S::NAME)
            .field("constructed", &inner.slots.is_some())
            .field("owners", &inner.owners)
            .field("constructions", &self.constructions())
            .finish()
    }
}

/// Allocator backed by a [`SharedPool`].
///
/// Attaches to the pool on first use and keeps the slot array locally, so
/// transitions on an already attached allocator take no lock.
pub struct InternalPool<S: StateSet> {
    shared: Arc<SharedPool<S>>,
    slots: Option<Slots<S::Context>>,
}

impl<S: StateSet> InternalPool<S> {
    pub fn new(shared: Arc<SharedPool<S>>) -> Self {
        Self {
            shared,
            slots: None,
        }
    }

    pub fn shared(&self) -> &Arc<SharedPool<S>> {
        &self.shared
    }

    pub fn is_attached(&self) -> bool {
        self.slots.is_some()
    }

    fn attached_slots(&mut self) -> &Slots<S::Context> {
        let shared = &self.shared;
        self.slots.get_or_insert_with(|| shared.attach())
    }
}

impl<S: StateSet> Allocator<S> for InternalPool<S> {
    fn strategy(&self) -> AllocationStrategy {
        AllocationStrategy::InternalPool
    }

    fn acquire(&mut self, id: StateId) -> Option<StateHandle<S::Context>> {
        self.attached_slots()
            .get(id.index())
            .and_then(Option::as_ref)
            .filter(|state| is_declared_as::<S>(id, &***state))
            .map(|state| StateHandle::shared(id, Arc::clone(state)))
    }

    fn adopt(&mut self, _handle: &StateHandle<S::Context>) {
        self.attached_slots();
    }

    fn release_pool(&mut self) {
        if self.slots.take().is_some() {
            self.shared.detach();
        }
    }
}

impl<S: StateSet> Drop for InternalPool<S> {
    fn drop(&mut self) {
        if self.slots.take().is_some() {
            self.shared.detach();
        }
    }
}

impl<S: StateSet> fmt::Debug for InternalPool<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InternalPool")
            .field("set", &S::NAME)
            .field("attached", &self.is_attached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{IdAllocator, Member};

    #[derive(Default)]
    struct Alpha;
    #[derive(Default)]
    struct Beta;

    impl State<()> for Alpha {
        fn on_enter(&self, _: &mut ()) {}
        fn on_exit(&self, _: &mut ()) {}
    }

    impl State<()> for Beta {
        fn on_enter(&self, _: &mut ()) {}
        fn on_exit(&self, _: &mut ()) {}
    }

    crate::state_set! {
        struct Greek: () {
            Alpha,
            Beta,
        }
    }

    static SKEWED: IdAllocator = IdAllocator::new();

    crate::state_set! {
        struct Skewed: (), ids = SKEWED {
            Alpha,
            Beta,
        }
    }

    #[test]
    fn pool_is_built_lazily_on_first_acquire() {
        let shared = SharedPool::<Greek>::shared();
        let mut pool = InternalPool::new(Arc::clone(&shared));

        assert!(!shared.is_constructed());
        let handle = pool.acquire(<Beta as Member<Greek>>::state_id()).unwrap();

        assert!(shared.is_constructed());
        assert_eq!(shared.constructions(), 1);
        assert_eq!(shared.owners(), 1);
        assert!(handle.state().is::<Beta>());
    }

    #[test]
    fn repeated_acquire_returns_same_instance() {
        let shared = SharedPool::<Greek>::shared();
        let mut pool = InternalPool::new(shared);
        let id = <Alpha as Member<Greek>>::state_id();

        let first = pool.acquire(id).unwrap();
        let second = pool.acquire(id).unwrap();
        assert!(first.ptr_eq(&second));
    }

    #[test]
    fn two_allocators_share_one_construction() {
        let shared = SharedPool::<Greek>::shared();
        let mut left = InternalPool::new(Arc::clone(&shared));
        let mut right = InternalPool::new(Arc::clone(&shared));
        let id = <Alpha as Member<Greek>>::state_id();

        let a = left.acquire(id).unwrap();
        let b = right.acquire(id).unwrap();

        assert!(a.ptr_eq(&b));
        assert_eq!(shared.constructions(), 1);
        assert_eq!(shared.owners(), 2);
    }

    #[test]
    fn last_release_tears_down_and_next_use_rebuilds() {
        let shared = SharedPool::<Greek>::shared();
        let mut left = InternalPool::new(Arc::clone(&shared));
        let mut right = InternalPool::new(Arc::clone(&shared));
        let id = <Beta as Member<Greek>>::state_id();

        left.acquire(id).unwrap();
        right.acquire(id).unwrap();

        Allocator::<Greek>::release_pool(&mut left);
        assert!(shared.is_constructed());

        Allocator::<Greek>::release_pool(&mut right);
        assert!(!shared.is_constructed());
        assert_eq!(shared.owners(), 0);

        left.acquire(id).unwrap();
        assert!(shared.is_constructed());
        assert_eq!(shared.constructions(), 2);
    }

    #[test]
    fn dropping_an_attached_allocator_detaches() {
        let shared = SharedPool::<Greek>::shared();
        {
            let mut pool = InternalPool::new(Arc::clone(&shared));
            pool.acquire(<Alpha as Member<Greek>>::state_id()).unwrap();
            assert_eq!(shared.owners(), 1);
        }
        assert_eq!(shared.owners(), 0);
        assert!(!shared.is_constructed());
    }

    #[test]
    fn release_pool_without_attach_is_a_no_op() {
        let shared = SharedPool::<Greek>::shared();
        let mut pool = InternalPool::new(Arc::clone(&shared));
        Allocator::<Greek>::release_pool(&mut pool);
        assert_eq!(shared.owners(), 0);
    }

    #[test]
    fn ids_outside_the_pool_leave_slots_empty() {
        // Burn the first identifiers so the set's ids start past its length.
        SKEWED.next_id();
        SKEWED.next_id();

        let shared = SharedPool::<Skewed>::shared();
        let mut pool = InternalPool::new(shared);
        let id = <Alpha as Member<Skewed>>::state_id();

        assert!(id.index() >= Skewed::len());
        assert!(pool.acquire(id).is_none());
    }
}
