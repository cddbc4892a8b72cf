//! Dense type identifiers for declared states.
//!
//! Every state type in a declared set is given a small integer the first
//! time the set is referenced. Pooled allocators use that integer as an
//! array index, so the values must be dense, start at zero and never be
//! regenerated for the same set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Identifier of a state type within its declared set.
///
/// For pooled strategies the identifier doubles as the slot index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(usize);

impl StateId {
    /// Wrap a raw identifier.
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    /// Slot index for pooled strategies.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic identifier counter.
///
/// `next_id` returns the current value and then increments it, starting
/// at zero. A counter is meant to live in a `static` and be shared by
/// exactly one declared state set; feeding two unrelated sets from the
/// same counter gives the second set identifiers beyond its own length,
/// which pooled allocators then refuse as out of range.
///
/// # Example
///
/// ```rust
/// use stator::core::IdAllocator;
///
/// static IDS: IdAllocator = IdAllocator::new();
///
/// assert_eq!(IDS.next_id().index(), 0);
/// assert_eq!(IDS.next_id().index(), 1);
/// assert_eq!(IDS.peek(), 2);
/// ```
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: AtomicUsize,
}

impl IdAllocator {
    /// Create a counter starting at zero.
    pub const fn new() -> Self {
        Self {
            next: AtomicUsize::new(0),
        }
    }

    /// Take the next identifier.
    pub fn next_id(&self) -> StateId {
        StateId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Value the next call to `next_id` will return.
    pub fn peek(&self) -> usize {
        self.next.load(Ordering::Relaxed)
    }
}

/// Identifier table of one declared set, in declaration order.
///
/// Built once per set (the `state_set!` macro keeps it in a `OnceLock`)
/// and reused for the lifetime of the process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateIds {
    ids: Vec<StateId>,
}

impl StateIds {
    /// Draw `count` identifiers from `allocator`, one per declared member.
    pub fn generate(allocator: &IdAllocator, count: usize) -> Self {
        let ids = (0..count).map(|_| allocator.next_id()).collect();
        Self { ids }
    }

    /// Identifier of the member declared at `position`.
    pub fn id_at(&self, position: usize) -> Option<StateId> {
        self.ids.get(position).copied()
    }

    /// Declaration position of the member holding `id`.
    pub fn position(&self, id: StateId) -> Option<usize> {
        // Fast path for the common case of a private, fresh counter.
        match self.ids.get(id.index()) {
            Some(found) if *found == id => Some(id.index()),
            _ => self.ids.iter().position(|candidate| *candidate == id),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.ids.iter().copied()
    }
}
