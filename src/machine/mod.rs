//! State machine core.
//!
//! A [`StateMachine`] holds at most one current state handle, obtains
//! instances through its [`Allocator`](crate::alloc::Allocator) and runs
//! hooks and effects in a fixed order:
//!
//! 1. `on_exit` of the source
//! 2. the registered transition effect
//! 3. `on_enter` of the target
//!
//! Every operation runs synchronously on the caller's thread. The machine
//! does no locking of its own; share one across threads only behind a
//! caller-supplied lock.

mod engine;
mod error;
mod handoff;

pub use engine::{ExternalMachine, InternalMachine, LazyMachine, StateMachine};
pub use error::MachineError;
pub use handoff::{HandoffBuffer, HANDLE_SIZE};

use std::fmt;

/// Where a machine is in its own lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Never started, or reset.
    #[default]
    Unstarted,
    /// Holds a current state.
    Running,
    /// Stopped after running; exit hook already fired.
    Stopped,
    /// Current state handed out through `save`.
    Suspended,
    /// A hook or effect panicked part way through an operation.
    Interrupted,
}

impl Lifecycle {
    /// Whether `start`, `load` or `restore` may install a state.
    pub fn accepts_state(self) -> bool {
        matches!(self, Self::Unstarted | Self::Stopped | Self::Suspended)
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unstarted => "unstarted",
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Suspended => "suspended",
            Self::Interrupted => "interrupted",
        };
        f.write_str(name)
    }
}
